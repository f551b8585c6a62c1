//! SeaORM entities for the study hierarchy:
//! users own subjects, subjects hold units, units hold topics and notes.

pub mod note;
pub mod subject;
pub mod topic;
pub mod unit;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::note::Entity as Note;
    pub use super::subject::Entity as Subject;
    pub use super::topic::Entity as Topic;
    pub use super::topic::TopicStatus;
    pub use super::unit::Entity as Unit;
    pub use super::user::Entity as User;
}
