//! Common utilities and helpers

pub mod discovery;
pub mod path;
pub mod time;
