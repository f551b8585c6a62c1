pub mod error;
pub mod progress;

pub use error::{ComputeError, Result};
pub use progress::{ProgressAggregator, completion_percentage};
