//! Repository for the `proposals` table.

use sqlx::PgPool;
use tesis_core::types::DbId;

use crate::models::proposal::ProposalRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, student_id, title, career, status, created_at";

pub struct ProposalRepo;

impl ProposalRepo {
    /// List proposals in any of `statuses`, newest first.
    pub async fn list_by_statuses(
        pool: &PgPool,
        statuses: &[&str],
    ) -> Result<Vec<ProposalRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM proposals
             WHERE status = ANY($1)
             ORDER BY created_at DESC, id DESC"
        );
        let statuses: Vec<String> = statuses.iter().map(|s| s.to_string()).collect();
        sqlx::query_as::<_, ProposalRow>(&query)
            .bind(statuses)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ProposalRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM proposals WHERE id = $1");
        sqlx::query_as::<_, ProposalRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
