//! Repository for the `defenses` and `defense_participants` tables.

use sqlx::{PgConnection, PgPool};
use tesis_core::types::DbId;

use crate::models::defense::{DefenseRow, ParticipantRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, proposal_id, kind, status, scheduled_at, room";

pub struct DefenseRepo;

impl DefenseRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<DefenseRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM defenses WHERE id = $1");
        sqlx::query_as::<_, DefenseRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The defense of `kind` for a proposal. There is at most one.
    pub async fn find_for_proposal(
        pool: &PgPool,
        proposal_id: DbId,
        kind: &str,
    ) -> Result<Option<DefenseRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM defenses WHERE proposal_id = $1 AND kind = $2");
        sqlx::query_as::<_, DefenseRow>(&query)
            .bind(proposal_id)
            .bind(kind)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_proposals(
        pool: &PgPool,
        proposal_ids: &[DbId],
    ) -> Result<Vec<DefenseRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM defenses
             WHERE proposal_id = ANY($1)
             ORDER BY id"
        );
        sqlx::query_as::<_, DefenseRow>(&query)
            .bind(proposal_ids.to_vec())
            .fetch_all(pool)
            .await
    }

    /// Defenses where the evaluator is rostered or has submitted a grade,
    /// soonest scheduled first.
    pub async fn list_for_evaluator(
        pool: &PgPool,
        evaluator_id: DbId,
    ) -> Result<Vec<DefenseRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM defenses
             WHERE id IN (
                 SELECT defense_id FROM defense_participants WHERE evaluator_id = $1
                 UNION
                 SELECT defense_id FROM defense_evaluations WHERE evaluator_id = $1
             )
             ORDER BY scheduled_at NULLS LAST, id"
        );
        sqlx::query_as::<_, DefenseRow>(&query)
            .bind(evaluator_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_participants(
        pool: &PgPool,
        defense_ids: &[DbId],
    ) -> Result<Vec<ParticipantRow>, sqlx::Error> {
        sqlx::query_as::<_, ParticipantRow>(
            "SELECT defense_id, evaluator_id, role FROM defense_participants
             WHERE defense_id = ANY($1)
             ORDER BY defense_id, evaluator_id",
        )
        .bind(defense_ids.to_vec())
        .fetch_all(pool)
        .await
    }

    /// Lock a defense row for the rest of the transaction. Grade and
    /// finalization writes on the same defense serialize on this lock.
    pub async fn lock_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<DefenseRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM defenses WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, DefenseRow>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    pub async fn update_status(
        conn: &mut PgConnection,
        id: DbId,
        status: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE defenses SET status = $1, updated_at = now() WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
