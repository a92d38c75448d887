pub mod compose;
pub mod error;
pub mod invocation;
pub mod sequencer;
pub mod workdir;

pub use error::{Result, SequenceError};
