//! Earlier deployments kept unit notes in a `unit_notes` table with the
//! same columns as `notes`. Copy any such rows into `notes` and drop the
//! legacy table. Databases that never had it are left alone.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

use crate::m20240101_000001_create_tables::Notes;

const LEGACY_TABLE: &str = "unit_notes";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if !manager.has_table(LEGACY_TABLE).await? {
            return Ok(());
        }

        let copy = Query::insert()
            .into_table(Notes::Table)
            .columns([Notes::UnitId, Notes::Content, Notes::CreatedAt])
            .select_from(
                Query::select()
                    .columns([
                        Alias::new("unit_id"),
                        Alias::new("content"),
                        Alias::new("created_at"),
                    ])
                    .from(Alias::new(LEGACY_TABLE))
                    .order_by(Alias::new("id"), Order::Asc)
                    .to_owned(),
            )
            .map_err(|err| DbErr::Migration(err.to_string()))?
            .to_owned();
        let db = manager.get_connection();
        db.execute(db.get_database_backend().build(&copy)).await?;

        manager
            .drop_table(Table::drop().table(Alias::new(LEGACY_TABLE)).to_owned())
            .await
    }

    async fn down(&self, _manager: &SchemaManager) -> Result<(), DbErr> {
        // Folded rows stay in `notes`; the legacy table is not recreated.
        Ok(())
    }
}
