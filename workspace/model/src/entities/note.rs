use sea_orm::entity::prelude::*;

use super::unit;

/// Free-text annotation attached to a unit. Notes are never edited,
/// only created and deleted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "notes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub unit_id: i32,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub created_at: DateTimeUtc,
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
