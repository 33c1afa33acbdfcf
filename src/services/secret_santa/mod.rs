//! Secret Santa draws: load eligible participants, collapse them into giving
//! units, search for a valid derangement, then commit every giver's new
//! recipients in one atomic batch.

pub mod error;
pub mod grouping;
pub mod matcher;
#[cfg(test)]
mod memory;
pub mod report;
pub mod store;

use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{
    participant::ParticipantRecord,
    secret_santa::{
        Assignment, GivingUnit, RecipientUpdate, ShuffleContext, ShuffleReport, ShuffleSummary,
        ShuffleVariant,
    },
};
use error::{SecretSantaError, SecretSantaResult};
use store::SecretSantaStore;

pub struct SecretSantaService;

impl SecretSantaService {
    /// Draw for adults: partners are merged into couples.
    pub async fn shuffle_for_adults<S: SecretSantaStore>(
        store: &S,
        ctx: ShuffleContext,
        max_attempts: u32,
    ) -> ShuffleReport {
        Self::run(store, ctx, ShuffleVariant::Adults, max_attempts).await
    }

    /// Draw for kids: siblings may not draw each other.
    pub async fn shuffle_for_kids<S: SecretSantaStore>(
        store: &S,
        ctx: ShuffleContext,
        max_attempts: u32,
    ) -> ShuffleReport {
        Self::run(store, ctx, ShuffleVariant::Kids, max_attempts).await
    }

    pub async fn run<S: SecretSantaStore>(
        store: &S,
        ctx: ShuffleContext,
        variant: ShuffleVariant,
        max_attempts: u32,
    ) -> ShuffleReport {
        let result = Self::shuffle(store, ctx, variant, max_attempts).await;
        report::report(&ctx, variant, &result)
    }

    /// The full draw pipeline. Nothing is written unless a valid matching
    /// was found, and then everything is written at once.
    pub async fn shuffle<S: SecretSantaStore>(
        store: &S,
        ctx: ShuffleContext,
        variant: ShuffleVariant,
        max_attempts: u32,
    ) -> SecretSantaResult<ShuffleSummary> {
        let participants = store
            .load_eligible(ctx.group_id)
            .await
            .map_err(SecretSantaError::LoadFailure)?;
        debug!(
            group_id = %ctx.group_id,
            acting_user = %ctx.acting_user_id,
            %variant,
            count = participants.len(),
            "loaded Secret Santa participants"
        );

        let units = grouping::form_units(variant, &participants)?;

        // The rng is not Send, keep it out of any await.
        let matching = {
            let mut rng = rand::thread_rng();
            matcher::find_matching(&units, max_attempts, &mut rng)?
        };

        let updates = recipient_updates(&units, &matching.assignments);
        store
            .commit_assignments(ctx.group_id, &updates)
            .await
            .map_err(SecretSantaError::PersistenceFailure)?;

        Ok(ShuffleSummary {
            variant,
            units: units.len(),
            givers: updates.len(),
            attempts: matching.attempts,
        })
    }

    /// Single-record read the UI uses to refresh a participant's badge.
    pub async fn participant<S: SecretSantaStore>(
        store: &S,
        group_id: Uuid,
        participant_id: Uuid,
    ) -> SecretSantaResult<ParticipantRecord> {
        store
            .fetch_participant(group_id, participant_id)
            .await
            .map_err(SecretSantaError::LoadFailure)?
            .ok_or(SecretSantaError::ParticipantNotFound(participant_id))
    }

    pub async fn set_participation<S: SecretSantaStore>(
        store: &S,
        ctx: ShuffleContext,
        participant_id: Uuid,
        in_secret_santa: bool,
    ) -> SecretSantaResult<()> {
        let found = store
            .set_participation(ctx.group_id, participant_id, in_secret_santa)
            .await
            .map_err(SecretSantaError::PersistenceFailure)?;
        if !found {
            return Err(SecretSantaError::ParticipantNotFound(participant_id));
        }
        info!(
            group_id = %ctx.group_id,
            acting_user = %ctx.acting_user_id,
            %participant_id,
            in_secret_santa,
            "Secret Santa participation updated"
        );
        Ok(())
    }

    /// Carry the current draw into next draw's exclusions.
    pub async fn archive<S: SecretSantaStore>(store: &S, ctx: ShuffleContext) -> SecretSantaResult<u64> {
        let carried = store
            .archive_assignments(ctx.group_id)
            .await
            .map_err(SecretSantaError::PersistenceFailure)?;
        info!(
            group_id = %ctx.group_id,
            acting_user = %ctx.acting_user_id,
            carried,
            "Secret Santa assignments archived"
        );
        Ok(carried)
    }
}

/// One write per giver member: both halves of a couple see the same
/// recipients.
fn recipient_updates(units: &[GivingUnit], assignments: &[Assignment]) -> Vec<RecipientUpdate> {
    assignments
        .iter()
        .flat_map(|a| {
            let recipients = &units[a.receiver].members;
            units[a.giver].member_ids().map(move |giver_id| RecipientUpdate {
                giver_id,
                recipients: recipients.clone(),
            })
        })
        .collect()
}
