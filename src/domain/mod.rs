// Domain layer - Track model and selection rules

pub mod errors;
pub mod model;
pub mod rules;
