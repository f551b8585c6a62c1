use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use thiserror::Error;

use super::unit;

/// Completion status of a topic. Stored as its display string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum TopicStatus {
    #[default]
    #[sea_orm(string_value = "Not Started")]
    NotStarted,
    #[sea_orm(string_value = "In Progress")]
    InProgress,
    #[sea_orm(string_value = "Completed")]
    Completed,
}

impl TopicStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopicStatus::NotStarted => "Not Started",
            TopicStatus::InProgress => "In Progress",
            TopicStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for TopicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a status string is not one of the three known values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid status: {0:?}")]
pub struct InvalidStatus(pub String);

impl FromStr for TopicStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Not Started" => Ok(TopicStatus::NotStarted),
            "In Progress" => Ok(TopicStatus::InProgress),
            "Completed" => Ok(TopicStatus::Completed),
            other => Err(InvalidStatus(other.to_string())),
        }
    }
}

/// Leaf item of the hierarchy with a tracked completion status.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "topics")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub unit_id: i32,
    pub name: String,
    pub status: TopicStatus,
    /// Last time the status was written.
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "unit::Entity",
        from = "Column::UnitId",
        to = "unit::Column::Id",
        on_delete = "Cascade"
    )]
    Unit,
}

impl Related<unit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Unit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
