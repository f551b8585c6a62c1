use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Email).unique_key())
                    .col(string(Users::PasswordHash))
                    .to_owned(),
            )
            .await?;

        // Create subjects table
        manager
            .create_table(
                Table::create()
                    .table(Subjects::Table)
                    .if_not_exists()
                    .col(pk_auto(Subjects::Id))
                    .col(integer(Subjects::UserId))
                    .col(string(Subjects::Name))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subjects_user")
                            .from(Subjects::Table, Subjects::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create units table
        manager
            .create_table(
                Table::create()
                    .table(Units::Table)
                    .if_not_exists()
                    .col(pk_auto(Units::Id))
                    .col(integer(Units::SubjectId))
                    .col(string(Units::Name))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_units_subject")
                            .from(Units::Table, Units::SubjectId)
                            .to(Subjects::Table, Subjects::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create topics table
        manager
            .create_table(
                Table::create()
                    .table(Topics::Table)
                    .if_not_exists()
                    .col(pk_auto(Topics::Id))
                    .col(integer(Topics::UnitId))
                    .col(string(Topics::Name))
                    .col(string_len(Topics::Status, 16).default("Not Started"))
                    .col(
                        timestamp_with_time_zone(Topics::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_topics_unit")
                            .from(Topics::Table, Topics::UnitId)
                            .to(Units::Table, Units::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create notes table
        manager
            .create_table(
                Table::create()
                    .table(Notes::Table)
                    .if_not_exists()
                    .col(pk_auto(Notes::Id))
                    .col(integer(Notes::UnitId))
                    .col(text(Notes::Content))
                    .col(
                        timestamp_with_time_zone(Notes::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notes_unit")
                            .from(Notes::Table, Notes::UnitId)
                            .to(Units::Table, Units::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Foreign key lookups drive every listing and cascade
        for index in [
            Index::create()
                .name("idx_subjects_user_id")
                .table(Subjects::Table)
                .col(Subjects::UserId)
                .to_owned(),
            Index::create()
                .name("idx_units_subject_id")
                .table(Units::Table)
                .col(Units::SubjectId)
                .to_owned(),
            Index::create()
                .name("idx_topics_unit_id")
                .table(Topics::Table)
                .col(Topics::UnitId)
                .to_owned(),
            Index::create()
                .name("idx_notes_unit_id")
                .table(Notes::Table)
                .col(Notes::UnitId)
                .to_owned(),
        ] {
            manager.create_index(index).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Topics::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Units::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Subjects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    PasswordHash,
}

#[derive(DeriveIden)]
enum Subjects {
    Table,
    Id,
    UserId,
    Name,
}

#[derive(DeriveIden)]
enum Units {
    Table,
    Id,
    SubjectId,
    Name,
}

#[derive(DeriveIden)]
enum Topics {
    Table,
    Id,
    UnitId,
    Name,
    Status,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Notes {
    Table,
    Id,
    UnitId,
    Content,
    CreatedAt,
}
