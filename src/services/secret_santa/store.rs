use std::future::Future;

use anyhow::Context;
use chrono::Utc;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::models::{
    participant::{ParticipantProfile, ParticipantRecord, ParticipantRow},
    secret_santa::RecipientUpdate,
};

const PARTICIPANT_COLUMNS: &str = "id, display_name, email, partner_id, sibling_ids,
    in_secret_santa, previous_recipients, current_recipient, secret_santa_assigned_at";

/// Storage operations the draw depends on.
pub trait SecretSantaStore: Send + Sync {
    /// Every participant of the group with `in_secret_santa` set.
    fn load_eligible(
        &self,
        group_id: Uuid,
    ) -> impl Future<Output = anyhow::Result<Vec<ParticipantProfile>>> + Send;

    /// Write every update or none of them.
    fn commit_assignments(
        &self,
        group_id: Uuid,
        updates: &[RecipientUpdate],
    ) -> impl Future<Output = anyhow::Result<()>> + Send;

    fn fetch_participant(
        &self,
        group_id: Uuid,
        participant_id: Uuid,
    ) -> impl Future<Output = anyhow::Result<Option<ParticipantRecord>>> + Send;

    /// Returns false when no such participant exists in the group.
    fn set_participation(
        &self,
        group_id: Uuid,
        participant_id: Uuid,
        in_secret_santa: bool,
    ) -> impl Future<Output = anyhow::Result<bool>> + Send;

    /// Copy each eligible participant's current recipients into its
    /// previous recipients. Returns the number of records carried forward.
    fn archive_assignments(&self, group_id: Uuid) -> impl Future<Output = anyhow::Result<u64>> + Send;
}

#[derive(Clone)]
pub struct PgSecretSantaStore {
    pool: PgPool,
}

impl PgSecretSantaStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SecretSantaStore for PgSecretSantaStore {
    async fn load_eligible(&self, group_id: Uuid) -> anyhow::Result<Vec<ParticipantProfile>> {
        let rows = sqlx::query_as::<_, ParticipantRow>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants
             WHERE group_id = $1 AND in_secret_santa = TRUE
             ORDER BY created_at, id"
        ))
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| ParticipantRecord::from(row).profile)
            .collect())
    }

    async fn commit_assignments(
        &self,
        group_id: Uuid,
        updates: &[RecipientUpdate],
    ) -> anyhow::Result<()> {
        let assigned_at = Utc::now();
        let mut tx = self.pool.begin().await?;

        for update in updates {
            let result = sqlx::query(
                "UPDATE participants
                 SET current_recipient = $1,
                     secret_santa_assigned_at = $2,
                     updated_at = NOW()
                 WHERE id = $3 AND group_id = $4",
            )
            .bind(Json(&update.recipients))
            .bind(assigned_at)
            .bind(update.giver_id)
            .bind(group_id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("updating participant {}", update.giver_id))?;

            // Dropping `tx` on the early return rolls the whole batch back.
            if result.rows_affected() != 1 {
                anyhow::bail!("Participant {} no longer exists in group {}", update.giver_id, group_id);
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn fetch_participant(
        &self,
        group_id: Uuid,
        participant_id: Uuid,
    ) -> anyhow::Result<Option<ParticipantRecord>> {
        let row = sqlx::query_as::<_, ParticipantRow>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE id = $1 AND group_id = $2"
        ))
        .bind(participant_id)
        .bind(group_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(ParticipantRecord::from))
    }

    async fn set_participation(
        &self,
        group_id: Uuid,
        participant_id: Uuid,
        in_secret_santa: bool,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "UPDATE participants SET in_secret_santa = $1, updated_at = NOW()
             WHERE id = $2 AND group_id = $3",
        )
        .bind(in_secret_santa)
        .bind(participant_id)
        .bind(group_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn archive_assignments(&self, group_id: Uuid) -> anyhow::Result<u64> {
        let result = sqlx::query(
            "UPDATE participants
             SET previous_recipients = current_recipient, updated_at = NOW()
             WHERE group_id = $1
               AND in_secret_santa = TRUE
               AND jsonb_array_length(current_recipient) > 0",
        )
        .bind(group_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
