//! Completion percentages for units and subjects.
//!
//! A percentage is `round(100 * completed / total)` using round-half-to-even,
//! evaluated in integer arithmetic so that exact halves (`1/8` → 12.5) are
//! resolved deterministically. An empty scope has 0% progress.

use std::cmp::Ordering;

use common::{Progress, TopicCounts};
use model::entities::topic::TopicStatus;
use model::entities::{topic, unit};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, Select, TransactionTrait,
};
use tracing::{debug, instrument};

use crate::error::Result;

/// Converts a topic tally into a whole percentage.
pub fn completion_percentage(counts: TopicCounts) -> u8 {
    let TopicCounts { completed, total } = counts;
    if total == 0 {
        return 0;
    }

    let scaled = completed.min(total) * 100;
    let quotient = scaled / total;
    let remainder = scaled % total;

    let rounded = match (remainder * 2).cmp(&total) {
        Ordering::Less => quotient,
        Ordering::Greater => quotient + 1,
        // Exactly half: go to the even neighbour
        Ordering::Equal => quotient + quotient % 2,
    };
    rounded as u8
}

/// Counts all topics and completed topics matched by `scope`.
async fn count_topics<C>(conn: &C, scope: Select<topic::Entity>) -> Result<TopicCounts>
where
    C: ConnectionTrait,
{
    let total = scope.clone().count(conn).await?;
    let completed = scope
        .filter(topic::Column::Status.eq(TopicStatus::Completed))
        .count(conn)
        .await?;
    Ok(TopicCounts { completed, total })
}

/// Reads topic statuses and derives progress on demand. Nothing is cached.
#[derive(Clone, Debug)]
pub struct ProgressAggregator {
    db: DatabaseConnection,
}

impl ProgressAggregator {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Topic tally for one unit. Both counts come from one transaction.
    #[instrument(skip(self))]
    pub async fn unit_counts(&self, unit_id: i32) -> Result<TopicCounts> {
        let scope = topic::Entity::find().filter(topic::Column::UnitId.eq(unit_id));

        let txn = self.db.begin().await?;
        let counts = count_topics(&txn, scope).await?;
        txn.commit().await?;

        debug!("Unit {} has {:?}", unit_id, counts);
        Ok(counts)
    }

    /// Topic tally over every unit of a subject.
    #[instrument(skip(self))]
    pub async fn subject_counts(&self, subject_id: i32) -> Result<TopicCounts> {
        let scope = topic::Entity::find()
            .inner_join(unit::Entity)
            .filter(unit::Column::SubjectId.eq(subject_id));

        let txn = self.db.begin().await?;
        let counts = count_topics(&txn, scope).await?;
        txn.commit().await?;

        debug!("Subject {} has {:?}", subject_id, counts);
        Ok(counts)
    }

    pub async fn unit_progress(&self, unit_id: i32) -> Result<Progress> {
        let counts = self.unit_counts(unit_id).await?;
        Ok(Progress {
            progress: completion_percentage(counts),
        })
    }

    pub async fn subject_progress(&self, subject_id: i32) -> Result<Progress> {
        let counts = self.subject_counts(subject_id).await?;
        Ok(Progress {
            progress: completion_percentage(counts),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use model::HierarchyRepository;
    use model::entities::user;
    use sea_orm::{ActiveModelTrait, Database, Set};

    fn counts(completed: u64, total: u64) -> TopicCounts {
        TopicCounts { completed, total }
    }

    #[test]
    fn test_empty_scope_is_zero() {
        assert_eq!(completion_percentage(counts(0, 0)), 0);
    }

    #[test]
    fn test_bounds() {
        assert_eq!(completion_percentage(counts(0, 7)), 0);
        assert_eq!(completion_percentage(counts(7, 7)), 100);
        assert_eq!(completion_percentage(counts(1, 1)), 100);
    }

    #[test]
    fn test_rounds_to_nearest() {
        assert_eq!(completion_percentage(counts(1, 3)), 33);
        assert_eq!(completion_percentage(counts(2, 3)), 67);
        assert_eq!(completion_percentage(counts(1, 6)), 17);
        assert_eq!(completion_percentage(counts(1, 2)), 50);
    }

    #[test]
    fn test_exact_halves_round_to_even() {
        // 12.5 -> 12, 37.5 -> 38, 62.5 -> 62, 87.5 -> 88
        assert_eq!(completion_percentage(counts(1, 8)), 12);
        assert_eq!(completion_percentage(counts(3, 8)), 38);
        assert_eq!(completion_percentage(counts(5, 8)), 62);
        assert_eq!(completion_percentage(counts(7, 8)), 88);
        // 57.5 exactly, even though 0.575 * 100.0 is 57.4999... as a float
        assert_eq!(completion_percentage(counts(23, 40)), 58);
        // 0.5 -> 0, 1.5 -> 2
        assert_eq!(completion_percentage(counts(1, 200)), 0);
        assert_eq!(completion_percentage(counts(3, 200)), 2);
    }

    #[test]
    fn test_never_exceeds_one_hundred() {
        assert_eq!(completion_percentage(counts(5, 3)), 100);
    }

    async fn setup() -> (DatabaseConnection, HierarchyRepository, i32) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        let user = user::ActiveModel {
            email: Set("progress@example.com".to_string()),
            password_hash: Set("hash".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();
        let repo = HierarchyRepository::new(db.clone());
        (db, repo, user.id)
    }

    #[tokio::test]
    async fn test_unit_progress_from_topic_statuses() -> Result<()> {
        let (db, repo, user_id) = setup().await;
        let aggregator = ProgressAggregator::new(db);

        let subject = repo.create_subject(user_id, "Math").await.unwrap();
        let unit = repo.create_unit(subject.id, "Algebra").await.unwrap();
        assert_eq!(aggregator.unit_progress(unit.id).await?.progress, 0);

        let mut topic_ids = Vec::new();
        for name in ["Groups", "Rings", "Fields"] {
            topic_ids.push(repo.create_topic(unit.id, name).await.unwrap().id);
        }
        assert_eq!(aggregator.unit_progress(unit.id).await?.progress, 0);

        repo.update_topic_status(topic_ids[0], "Completed").await.unwrap();
        repo.update_topic_status(topic_ids[1], "In Progress").await.unwrap();
        assert_eq!(aggregator.unit_counts(unit.id).await?, counts(1, 3));
        assert_eq!(aggregator.unit_progress(unit.id).await?.progress, 33);

        for id in &topic_ids {
            repo.update_topic_status(*id, "Completed").await.unwrap();
        }
        assert_eq!(aggregator.unit_progress(unit.id).await?.progress, 100);
        Ok(())
    }

    #[tokio::test]
    async fn test_subject_progress_spans_all_units() -> Result<()> {
        let (db, repo, user_id) = setup().await;
        let aggregator = ProgressAggregator::new(db);

        let subject = repo.create_subject(user_id, "Physics").await.unwrap();
        let other = repo.create_subject(user_id, "Other").await.unwrap();
        assert_eq!(aggregator.subject_progress(subject.id).await?.progress, 0);

        let mechanics = repo.create_unit(subject.id, "Mechanics").await.unwrap();
        let optics = repo.create_unit(subject.id, "Optics").await.unwrap();
        let noise = repo.create_unit(other.id, "Noise").await.unwrap();

        let newton = repo.create_topic(mechanics.id, "Newton").await.unwrap();
        repo.create_topic(mechanics.id, "Kepler").await.unwrap();
        let lenses = repo.create_topic(optics.id, "Lenses").await.unwrap();
        repo.create_topic(optics.id, "Mirrors").await.unwrap();
        let unrelated = repo.create_topic(noise.id, "Unrelated").await.unwrap();

        repo.update_topic_status(newton.id, "Completed").await.unwrap();
        repo.update_topic_status(lenses.id, "Completed").await.unwrap();
        repo.update_topic_status(unrelated.id, "Completed").await.unwrap();

        assert_eq!(aggregator.subject_counts(subject.id).await?, counts(2, 4));
        assert_eq!(aggregator.subject_progress(subject.id).await?.progress, 50);
        assert_eq!(aggregator.subject_progress(other.id).await?.progress, 100);
        Ok(())
    }
}
