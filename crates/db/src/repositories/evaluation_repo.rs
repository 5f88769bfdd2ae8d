//! Repository for the `defense_evaluations` table.

use sqlx::{PgConnection, PgPool};
use tesis_core::store::UpsertEvaluation;
use tesis_core::types::DbId;

use crate::models::evaluation::EvaluationRow;

const COLUMNS: &str = "id, defense_id, evaluator_id, evaluator_role, grade, comment, graded_at";

pub struct EvaluationRepo;

impl EvaluationRepo {
    /// Evaluations for the given defenses in submission order.
    pub async fn list_for_defenses(
        pool: &PgPool,
        defense_ids: &[DbId],
    ) -> Result<Vec<EvaluationRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM defense_evaluations
             WHERE defense_id = ANY($1)
             ORDER BY graded_at, id"
        );
        sqlx::query_as::<_, EvaluationRow>(&query)
            .bind(defense_ids.to_vec())
            .fetch_all(pool)
            .await
    }

    /// Insert or replace the evaluator's grade for a defense. A replaced
    /// evaluation keeps its id and gets a fresh `graded_at`.
    pub async fn upsert(
        conn: &mut PgConnection,
        input: &UpsertEvaluation,
    ) -> Result<EvaluationRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO defense_evaluations
                 (defense_id, evaluator_id, evaluator_role, grade, comment)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT ON CONSTRAINT uq_defense_evaluations_evaluator DO UPDATE SET
                 evaluator_role = EXCLUDED.evaluator_role,
                 grade = EXCLUDED.grade,
                 comment = EXCLUDED.comment,
                 graded_at = now()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EvaluationRow>(&query)
            .bind(input.defense_id)
            .bind(input.evaluator_id)
            .bind(input.evaluator_role.as_str())
            .bind(input.grade)
            .bind(&input.comment)
            .fetch_one(&mut *conn)
            .await
    }
}
