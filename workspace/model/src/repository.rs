//! Data access for the Subject → Unit → Topic / Note hierarchy.
//!
//! The repository owns a pooled [`DatabaseConnection`]. Every call checks a
//! connection out for its own duration; multi-statement operations run in a
//! [`sea_orm::DatabaseTransaction`] that rolls back when dropped uncommitted,
//! so an early `?` return never leaves a half-applied cascade behind.

use chrono::Utc;
use sea_orm::sea_query::{Expr, Query, SelectStatement};
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, trace};

use crate::entities::topic::TopicStatus;
use crate::entities::{note, subject, topic, unit};
use crate::error::{RepositoryError, Result};

/// A unit together with its topics, both ordered by id.
pub type UnitWithTopics = (unit::Model, Vec<topic::Model>);

#[derive(Clone, Debug)]
pub struct HierarchyRepository {
    db: DatabaseConnection,
}

/// Rejects blank names and note bodies.
fn required(field: &str, value: &str) -> Result<String> {
    if value.trim().is_empty() {
        return Err(RepositoryError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

/// `SELECT id FROM units WHERE subject_id = ?`
fn unit_ids_of_subject(subject_id: i32) -> SelectStatement {
    Query::select()
        .column(unit::Column::Id)
        .from(unit::Entity)
        .and_where(unit::Column::SubjectId.eq(subject_id))
        .to_owned()
}

impl HierarchyRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // Subjects

    /// Subjects owned by `user_id`, ordered by id.
    #[instrument(skip(self))]
    pub async fn list_subjects(&self, user_id: i32) -> Result<Vec<subject::Model>> {
        let subjects = subject::Entity::find()
            .filter(subject::Column::UserId.eq(user_id))
            .order_by_asc(subject::Column::Id)
            .all(&self.db)
            .await?;
        debug!("Retrieved {} subjects for user {}", subjects.len(), user_id);
        Ok(subjects)
    }

    #[instrument(skip(self))]
    pub async fn create_subject(&self, user_id: i32, name: &str) -> Result<subject::Model> {
        let name = required("Name", name)?;
        let subject = subject::ActiveModel {
            user_id: Set(user_id),
            name: Set(name),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|err| RepositoryError::from_insert(err, "User"))?;
        info!("Created subject {} for user {}", subject.id, user_id);
        Ok(subject)
    }

    /// Removes a subject with all its units, topics and notes in one
    /// transaction. Missing ids are a no-op.
    #[instrument(skip(self))]
    pub async fn delete_subject(&self, subject_id: i32) -> Result<()> {
        trace!("Starting cascade delete for subject {}", subject_id);
        let txn = self.db.begin().await?;

        let topics = topic::Entity::delete_many()
            .filter(topic::Column::UnitId.in_subquery(unit_ids_of_subject(subject_id)))
            .exec(&txn)
            .await?;
        let notes = note::Entity::delete_many()
            .filter(note::Column::UnitId.in_subquery(unit_ids_of_subject(subject_id)))
            .exec(&txn)
            .await?;
        let units = unit::Entity::delete_many()
            .filter(unit::Column::SubjectId.eq(subject_id))
            .exec(&txn)
            .await?;
        let subjects = subject::Entity::delete_by_id(subject_id).exec(&txn).await?;

        txn.commit().await?;
        info!(
            "Deleted subject {} ({} rows): {} units, {} topics, {} notes",
            subject_id,
            subjects.rows_affected,
            units.rows_affected,
            topics.rows_affected,
            notes.rows_affected
        );
        Ok(())
    }

    // Units

    /// Units of a subject, each with its topics.
    #[instrument(skip(self))]
    pub async fn list_units(&self, subject_id: i32) -> Result<Vec<UnitWithTopics>> {
        let units = unit::Entity::find()
            .filter(unit::Column::SubjectId.eq(subject_id))
            .order_by_asc(unit::Column::Id)
            .find_with_related(topic::Entity)
            .order_by_asc(topic::Column::Id)
            .all(&self.db)
            .await?;
        debug!("Retrieved {} units for subject {}", units.len(), subject_id);
        Ok(units)
    }

    #[instrument(skip(self))]
    pub async fn create_unit(&self, subject_id: i32, name: &str) -> Result<unit::Model> {
        let name = required("Name", name)?;
        let unit = unit::ActiveModel {
            subject_id: Set(subject_id),
            name: Set(name),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|err| RepositoryError::from_insert(err, "Subject"))?;
        info!("Created unit {} under subject {}", unit.id, subject_id);
        Ok(unit)
    }

    /// Removes a unit with its topics and notes in one transaction.
    #[instrument(skip(self))]
    pub async fn delete_unit(&self, unit_id: i32) -> Result<()> {
        let txn = self.db.begin().await?;

        let topics = topic::Entity::delete_many()
            .filter(topic::Column::UnitId.eq(unit_id))
            .exec(&txn)
            .await?;
        let notes = note::Entity::delete_many()
            .filter(note::Column::UnitId.eq(unit_id))
            .exec(&txn)
            .await?;
        let units = unit::Entity::delete_by_id(unit_id).exec(&txn).await?;

        txn.commit().await?;
        info!(
            "Deleted unit {} ({} rows): {} topics, {} notes",
            unit_id, units.rows_affected, topics.rows_affected, notes.rows_affected
        );
        Ok(())
    }

    // Topics

    #[instrument(skip(self))]
    pub async fn list_topics_for_unit(&self, unit_id: i32) -> Result<Vec<topic::Model>> {
        let topics = topic::Entity::find()
            .filter(topic::Column::UnitId.eq(unit_id))
            .order_by_asc(topic::Column::Id)
            .all(&self.db)
            .await?;
        Ok(topics)
    }

    /// New topics always start as `Not Started`.
    #[instrument(skip(self))]
    pub async fn create_topic(&self, unit_id: i32, name: &str) -> Result<topic::Model> {
        let name = required("Name", name)?;
        let topic = topic::ActiveModel {
            unit_id: Set(unit_id),
            name: Set(name),
            status: Set(TopicStatus::NotStarted),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|err| RepositoryError::from_insert(err, "Unit"))?;
        info!("Created topic {} under unit {}", topic.id, unit_id);
        Ok(topic)
    }

    /// Parses `status` and stores it with a fresh `updated_at`.
    /// An unknown status is rejected before any write.
    #[instrument(skip(self))]
    pub async fn update_topic_status(&self, topic_id: i32, status: &str) -> Result<()> {
        let status: TopicStatus = status.parse()?;

        let txn = self.db.begin().await?;
        let result = topic::Entity::update_many()
            .col_expr(topic::Column::Status, Expr::value(status.to_value()))
            .col_expr(topic::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(topic::Column::Id.eq(topic_id))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        debug!(
            "Set topic {} to {:?} ({} rows)",
            topic_id, status, result.rows_affected
        );
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_topic(&self, topic_id: i32) -> Result<()> {
        let result = topic::Entity::delete_by_id(topic_id).exec(&self.db).await?;
        debug!("Deleted topic {} ({} rows)", topic_id, result.rows_affected);
        Ok(())
    }

    // Notes

    /// Notes of a unit, most recent first.
    #[instrument(skip(self))]
    pub async fn list_notes(&self, unit_id: i32) -> Result<Vec<note::Model>> {
        let notes = note::Entity::find()
            .filter(note::Column::UnitId.eq(unit_id))
            .order_by_desc(note::Column::CreatedAt)
            .order_by_desc(note::Column::Id)
            .all(&self.db)
            .await?;
        Ok(notes)
    }

    #[instrument(skip(self, content))]
    pub async fn create_note(&self, unit_id: i32, content: &str) -> Result<note::Model> {
        let content = required("Content", content)?;
        let note = note::ActiveModel {
            unit_id: Set(unit_id),
            content: Set(content),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|err| RepositoryError::from_insert(err, "Unit"))?;
        info!("Created note {} under unit {}", note.id, unit_id);
        Ok(note)
    }

    #[instrument(skip(self))]
    pub async fn delete_note(&self, note_id: i32) -> Result<()> {
        let result = note::Entity::delete_by_id(note_id).exec(&self.db).await?;
        debug!("Deleted note {} ({} rows)", note_id, result.rows_affected);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::user;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectionTrait, Database, DbErr, PaginatorTrait};

    async fn setup_db() -> Result<DatabaseConnection> {
        let db = Database::connect("sqlite::memory:").await?;
        Migrator::up(&db, None).await?;
        Ok(db)
    }

    async fn create_user(db: &DatabaseConnection, email: &str) -> std::result::Result<i32, DbErr> {
        let user = user::ActiveModel {
            email: Set(email.to_string()),
            password_hash: Set("not-a-real-hash".to_string()),
            ..Default::default()
        }
        .insert(db)
        .await?;
        Ok(user.id)
    }

    async fn topic_status(db: &DatabaseConnection, topic_id: i32) -> TopicStatus {
        topic::Entity::find_by_id(topic_id)
            .one(db)
            .await
            .unwrap()
            .expect("topic exists")
            .status
    }

    #[tokio::test]
    async fn test_list_subjects_is_scoped_to_owner() -> Result<()> {
        let db = setup_db().await?;
        let repo = HierarchyRepository::new(db.clone());
        let alice = create_user(&db, "alice@example.com").await?;
        let bob = create_user(&db, "bob@example.com").await?;

        let math = repo.create_subject(alice, "Math").await?;
        repo.create_subject(bob, "History").await?;
        let physics = repo.create_subject(alice, "Physics").await?;

        let subjects = repo.list_subjects(alice).await?;
        let ids: Vec<i32> = subjects.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![math.id, physics.id]);
        assert!(subjects.iter().all(|s| s.user_id == alice));

        let bobs = repo.list_subjects(bob).await?;
        assert_eq!(bobs.len(), 1);
        assert_eq!(bobs[0].name, "History");
        Ok(())
    }

    #[tokio::test]
    async fn test_create_rejects_blank_names() -> Result<()> {
        let db = setup_db().await?;
        let repo = HierarchyRepository::new(db.clone());
        let user_id = create_user(&db, "blank@example.com").await?;

        let err = repo.create_subject(user_id, "   ").await.unwrap_err();
        assert!(matches!(err, RepositoryError::Validation(_)));
        assert_eq!(subject::Entity::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_under_missing_parent_is_not_found() -> Result<()> {
        let db = setup_db().await?;
        let repo = HierarchyRepository::new(db);

        let err = repo.create_unit(999, "Orphan").await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound("Subject")));

        let err = repo.create_topic(999, "Orphan").await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound("Unit")));

        let err = repo.create_note(999, "Orphan").await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound("Unit")));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_units_nests_topics_in_id_order() -> Result<()> {
        let db = setup_db().await?;
        let repo = HierarchyRepository::new(db.clone());
        let user_id = create_user(&db, "units@example.com").await?;
        let subject = repo.create_subject(user_id, "Chemistry").await?;

        let organic = repo.create_unit(subject.id, "Organic").await?;
        let empty = repo.create_unit(subject.id, "Inorganic").await?;
        let alkanes = repo.create_topic(organic.id, "Alkanes").await?;
        let alkenes = repo.create_topic(organic.id, "Alkenes").await?;

        let units = repo.list_units(subject.id).await?;
        assert_eq!(units.len(), 2);

        let (first, topics) = &units[0];
        assert_eq!(first.id, organic.id);
        assert_eq!(
            topics.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![alkanes.id, alkenes.id]
        );
        assert!(topics.iter().all(|t| t.status == TopicStatus::NotStarted));

        let (second, topics) = &units[1];
        assert_eq!(second.id, empty.id);
        assert!(topics.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_subject_cascades_to_every_descendant() -> Result<()> {
        let db = setup_db().await?;
        let repo = HierarchyRepository::new(db.clone());
        let user_id = create_user(&db, "cascade@example.com").await?;

        let doomed = repo.create_subject(user_id, "Doomed").await?;
        let kept = repo.create_subject(user_id, "Kept").await?;

        let mut doomed_units = Vec::new();
        for unit_name in ["U1", "U2", "U3"] {
            let unit = repo.create_unit(doomed.id, unit_name).await?;
            for topic_name in ["T1", "T2"] {
                repo.create_topic(unit.id, topic_name).await?;
            }
            repo.create_note(unit.id, "remember this").await?;
            doomed_units.push(unit.id);
        }
        let kept_unit = repo.create_unit(kept.id, "Survivor").await?;
        repo.create_topic(kept_unit.id, "Still here").await?;
        repo.create_note(kept_unit.id, "Still here").await?;

        repo.delete_subject(doomed.id).await?;

        assert!(subject::Entity::find_by_id(doomed.id).one(&db).await?.is_none());
        assert_eq!(
            unit::Entity::find()
                .filter(unit::Column::SubjectId.eq(doomed.id))
                .count(&db)
                .await?,
            0
        );
        assert_eq!(
            topic::Entity::find()
                .filter(topic::Column::UnitId.is_in(doomed_units.clone()))
                .count(&db)
                .await?,
            0
        );
        assert_eq!(
            note::Entity::find()
                .filter(note::Column::UnitId.is_in(doomed_units))
                .count(&db)
                .await?,
            0
        );

        // The sibling subject is untouched
        assert_eq!(unit::Entity::find().count(&db).await?, 1);
        assert_eq!(topic::Entity::find().count(&db).await?, 1);
        assert_eq!(note::Entity::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_unit_cascades_to_topics_and_notes() -> Result<()> {
        let db = setup_db().await?;
        let repo = HierarchyRepository::new(db.clone());
        let user_id = create_user(&db, "unit-delete@example.com").await?;
        let subject = repo.create_subject(user_id, "Biology").await?;
        let cells = repo.create_unit(subject.id, "Cells").await?;
        let genetics = repo.create_unit(subject.id, "Genetics").await?;
        repo.create_topic(cells.id, "Mitosis").await?;
        repo.create_note(cells.id, "Draw the phases").await?;
        repo.create_topic(genetics.id, "Mendel").await?;

        repo.delete_unit(cells.id).await?;

        assert!(unit::Entity::find_by_id(cells.id).one(&db).await?.is_none());
        assert!(repo.list_topics_for_unit(cells.id).await?.is_empty());
        assert!(repo.list_notes(cells.id).await?.is_empty());
        assert_eq!(repo.list_topics_for_unit(genetics.id).await?.len(), 1);
        Ok(())
    }

    /// Builds one subject with a unit holding a topic and a note.
    async fn seed_branch(
        db: &DatabaseConnection,
        repo: &HierarchyRepository,
        email: &str,
    ) -> Result<(subject::Model, unit::Model)> {
        let user_id = create_user(db, email).await?;
        let subject = repo.create_subject(user_id, "Chemistry").await?;
        let unit = repo.create_unit(subject.id, "Bonds").await?;
        repo.create_topic(unit.id, "Covalent").await?;
        repo.create_note(unit.id, "Electron sharing").await?;
        Ok((subject, unit))
    }

    async fn branch_counts(db: &DatabaseConnection) -> Result<(u64, u64, u64, u64)> {
        Ok((
            subject::Entity::find().count(db).await?,
            unit::Entity::find().count(db).await?,
            topic::Entity::find().count(db).await?,
            note::Entity::find().count(db).await?,
        ))
    }

    #[tokio::test]
    async fn test_failed_subject_cascade_rolls_back() -> Result<()> {
        let db = setup_db().await?;
        let repo = HierarchyRepository::new(db.clone());
        let (subject, _) = seed_branch(&db, &repo, "rollback@example.com").await?;
        db.execute_unprepared(
            "CREATE TRIGGER boom BEFORE DELETE ON subjects BEGIN SELECT RAISE(ABORT, 'boom'); END;",
        )
        .await?;

        let result = repo.delete_subject(subject.id).await;

        assert!(matches!(result, Err(RepositoryError::Database(_))));
        assert_eq!(branch_counts(&db).await?, (1, 1, 1, 1));
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_unit_cascade_rolls_back() -> Result<()> {
        let db = setup_db().await?;
        let repo = HierarchyRepository::new(db.clone());
        let (_, unit) = seed_branch(&db, &repo, "unit-rollback@example.com").await?;
        db.execute_unprepared(
            "CREATE TRIGGER boom BEFORE DELETE ON units BEGIN SELECT RAISE(ABORT, 'boom'); END;",
        )
        .await?;

        let result = repo.delete_unit(unit.id).await;

        assert!(matches!(result, Err(RepositoryError::Database(_))));
        assert_eq!(branch_counts(&db).await?, (1, 1, 1, 1));
        assert_eq!(repo.list_topics_for_unit(unit.id).await?.len(), 1);
        assert_eq!(repo.list_notes(unit.id).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_deletes_of_missing_ids_succeed() -> Result<()> {
        let db = setup_db().await?;
        let repo = HierarchyRepository::new(db);

        repo.delete_subject(404).await?;
        repo.delete_unit(404).await?;
        repo.delete_topic(404).await?;
        repo.delete_note(404).await?;
        repo.update_topic_status(404, "Completed").await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_update_topic_status() -> Result<()> {
        let db = setup_db().await?;
        let repo = HierarchyRepository::new(db.clone());
        let user_id = create_user(&db, "status@example.com").await?;
        let subject = repo.create_subject(user_id, "Physics").await?;
        let unit = repo.create_unit(subject.id, "Optics").await?;
        let topic = repo.create_topic(unit.id, "Refraction").await?;

        repo.update_topic_status(topic.id, "In Progress").await?;
        assert_eq!(topic_status(&db, topic.id).await, TopicStatus::InProgress);

        repo.update_topic_status(topic.id, "Completed").await?;
        let stored = topic::Entity::find_by_id(topic.id).one(&db).await?.unwrap();
        assert_eq!(stored.status, TopicStatus::Completed);
        assert!(stored.updated_at >= topic.updated_at);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_status_leaves_topic_unchanged() -> Result<()> {
        let db = setup_db().await?;
        let repo = HierarchyRepository::new(db.clone());
        let user_id = create_user(&db, "invalid@example.com").await?;
        let subject = repo.create_subject(user_id, "Physics").await?;
        let unit = repo.create_unit(subject.id, "Optics").await?;
        let topic = repo.create_topic(unit.id, "Lenses").await?;
        repo.update_topic_status(topic.id, "In Progress").await?;

        for bad in ["Done", "completed", ""] {
            let err = repo.update_topic_status(topic.id, bad).await.unwrap_err();
            assert!(matches!(err, RepositoryError::Validation(ref msg) if msg == "Invalid status"));
        }
        assert_eq!(topic_status(&db, topic.id).await, TopicStatus::InProgress);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_notes_newest_first() -> Result<()> {
        let db = setup_db().await?;
        let repo = HierarchyRepository::new(db.clone());
        let user_id = create_user(&db, "notes@example.com").await?;
        let subject = repo.create_subject(user_id, "Literature").await?;
        let unit = repo.create_unit(subject.id, "Poetry").await?;

        let first = repo.create_note(unit.id, "first").await?;
        let second = repo.create_note(unit.id, "second").await?;
        let third = repo.create_note(unit.id, "third").await?;

        let notes = repo.list_notes(unit.id).await?;
        assert_eq!(
            notes.iter().map(|n| n.id).collect::<Vec<_>>(),
            vec![third.id, second.id, first.id]
        );

        repo.delete_note(second.id).await?;
        let notes = repo.list_notes(unit.id).await?;
        assert_eq!(
            notes.iter().map(|n| n.content.as_str()).collect::<Vec<_>>(),
            vec!["third", "first"]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_subject_creation_keeps_both_rows() -> Result<()> {
        let db = setup_db().await?;
        let repo = HierarchyRepository::new(db.clone());
        let user_id = create_user(&db, "concurrent@example.com").await?;

        let (a, b) = tokio::join!(
            repo.create_subject(user_id, "Algebra"),
            repo.create_subject(user_id, "Geometry")
        );
        let (a, b) = (a?, b?);
        assert_ne!(a.id, b.id);

        let names: Vec<String> = repo
            .list_subjects(user_id)
            .await?
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"Algebra".to_string()));
        assert!(names.contains(&"Geometry".to_string()));
        Ok(())
    }
}
