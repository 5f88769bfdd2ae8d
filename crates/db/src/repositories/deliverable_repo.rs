//! Repository for the `deliverables` table.

use sqlx::PgPool;
use tesis_core::types::DbId;

use crate::models::proposal::DeliverableRow;

const COLUMNS: &str = "id, proposal_id, kind, file_name, storage_key, is_active, uploaded_at";

pub struct DeliverableRepo;

impl DeliverableRepo {
    /// All deliverable versions for the given proposals, newest first.
    pub async fn list_for_proposals(
        pool: &PgPool,
        proposal_ids: &[DbId],
    ) -> Result<Vec<DeliverableRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM deliverables
             WHERE proposal_id = ANY($1)
             ORDER BY uploaded_at DESC, id DESC"
        );
        sqlx::query_as::<_, DeliverableRow>(&query)
            .bind(proposal_ids.to_vec())
            .fetch_all(pool)
            .await
    }
}
