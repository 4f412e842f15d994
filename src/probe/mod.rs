//! Parsers for the text output of the inspection, extraction and transcoding tools
//!
//! Every parser here is a pure function over captured output lines. None of
//! them touch the file system or spawn processes.

pub mod inspector;
pub mod stream_prober;
pub mod timecodes;

pub use inspector::TrackInspector;
pub use stream_prober::StreamProber;
pub use timecodes::parse_initial_delay;
