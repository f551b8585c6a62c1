//! Transport types shared by the progress computation and the HTTP layer.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Topic tally for a unit or a subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TopicCounts {
    /// Topics with status `Completed`
    pub completed: u64,
    /// All topics in scope
    pub total: u64,
}

/// Completion percentage returned by the progress endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Progress {
    /// Whole percent, 0 to 100
    #[schema(minimum = 0, maximum = 100)]
    pub progress: u8,
}
