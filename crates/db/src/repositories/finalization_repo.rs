//! Repository for the `defense_finalizations` table.

use sqlx::{PgConnection, PgPool};
use tesis_core::store::FinalizeDefense;
use tesis_core::types::DbId;

use crate::models::evaluation::FinalizationRow;

const COLUMNS: &str =
    "id, defense_id, finalized_by, finalizer_role, final_status, comments, finalized_at";

pub struct FinalizationRepo;

impl FinalizationRepo {
    pub async fn list_for_defenses(
        pool: &PgPool,
        defense_ids: &[DbId],
    ) -> Result<Vec<FinalizationRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM defense_finalizations
             WHERE defense_id = ANY($1)"
        );
        sqlx::query_as::<_, FinalizationRow>(&query)
            .bind(defense_ids.to_vec())
            .fetch_all(pool)
            .await
    }

    pub async fn exists_for_defense(
        conn: &mut PgConnection,
        defense_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM defense_finalizations WHERE defense_id = $1)",
        )
        .bind(defense_id)
        .fetch_one(&mut *conn)
        .await
    }

    pub async fn insert(
        conn: &mut PgConnection,
        input: &FinalizeDefense,
    ) -> Result<FinalizationRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO defense_finalizations
                 (defense_id, finalized_by, finalizer_role, final_status, comments)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FinalizationRow>(&query)
            .bind(input.defense_id)
            .bind(input.finalized_by)
            .bind(input.finalizer_role.as_str())
            .bind(input.final_status.as_str())
            .bind(&input.comments)
            .fetch_one(&mut *conn)
            .await
    }
}
