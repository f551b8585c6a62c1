pub mod entities;
pub mod error;
pub mod repository;

pub use error::RepositoryError;
pub use repository::HierarchyRepository;

// Re-export tracing for use in this crate
pub use tracing;
