use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};

use chrono::Utc;
use uuid::Uuid;

use super::store::SecretSantaStore;
use crate::models::{
    participant::{ParticipantProfile, ParticipantRecord, RecipientSummary},
    secret_santa::RecipientUpdate,
};

/// In-memory store used by the service tests. Each group is a list of
/// records kept in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    groups: Mutex<HashMap<Uuid, Vec<ParticipantRecord>>>,
    pub fail_loads: AtomicBool,
    pub fail_commits: AtomicBool,
    /// Participant deleted right before the next commit, as if another
    /// request removed it between load and write.
    pub remove_before_commit: Mutex<Option<Uuid>>,
}

impl MemoryStore {
    pub fn insert(&self, group_id: Uuid, profile: ParticipantProfile, in_secret_santa: bool) {
        self.groups
            .lock()
            .unwrap()
            .entry(group_id)
            .or_default()
            .push(ParticipantRecord {
                profile,
                in_secret_santa,
                assignment: Default::default(),
            });
    }

    pub fn recipients_of(&self, group_id: Uuid, participant_id: Uuid) -> Vec<RecipientSummary> {
        self.groups.lock().unwrap()[&group_id]
            .iter()
            .find(|r| r.profile.id == participant_id)
            .map(|r| r.assignment.recipients.clone())
            .unwrap_or_default()
    }

    pub fn snapshot(&self, group_id: Uuid) -> Vec<ParticipantRecord> {
        self.groups.lock().unwrap().get(&group_id).cloned().unwrap_or_default()
    }
}

impl SecretSantaStore for MemoryStore {
    async fn load_eligible(&self, group_id: Uuid) -> anyhow::Result<Vec<ParticipantProfile>> {
        if self.fail_loads.load(Ordering::SeqCst) {
            anyhow::bail!("store unavailable");
        }
        Ok(self
            .snapshot(group_id)
            .into_iter()
            .filter(|r| r.in_secret_santa)
            .map(|r| r.profile)
            .collect())
    }

    async fn commit_assignments(
        &self,
        group_id: Uuid,
        updates: &[RecipientUpdate],
    ) -> anyhow::Result<()> {
        if self.fail_commits.load(Ordering::SeqCst) {
            anyhow::bail!("batch rejected");
        }
        let mut groups = self.groups.lock().unwrap();
        let records = groups.entry(group_id).or_default();
        if let Some(id) = self.remove_before_commit.lock().unwrap().take() {
            records.retain(|r| r.profile.id != id);
        }

        // Validate the whole batch before touching anything.
        let mut staged = records.clone();
        let now = Utc::now();
        for update in updates {
            let record = staged
                .iter_mut()
                .find(|r| r.profile.id == update.giver_id)
                .ok_or_else(|| anyhow::anyhow!("Participant {} not found", update.giver_id))?;
            record.assignment.recipients = update.recipients.clone();
            record.assignment.assigned_at = Some(now);
        }
        *records = staged;
        Ok(())
    }

    async fn fetch_participant(
        &self,
        group_id: Uuid,
        participant_id: Uuid,
    ) -> anyhow::Result<Option<ParticipantRecord>> {
        Ok(self
            .snapshot(group_id)
            .into_iter()
            .find(|r| r.profile.id == participant_id))
    }

    async fn set_participation(
        &self,
        group_id: Uuid,
        participant_id: Uuid,
        in_secret_santa: bool,
    ) -> anyhow::Result<bool> {
        let mut groups = self.groups.lock().unwrap();
        let record = groups
            .get_mut(&group_id)
            .and_then(|records| records.iter_mut().find(|r| r.profile.id == participant_id));
        Ok(match record {
            Some(record) => {
                record.in_secret_santa = in_secret_santa;
                true
            }
            None => false,
        })
    }

    async fn archive_assignments(&self, group_id: Uuid) -> anyhow::Result<u64> {
        let mut groups = self.groups.lock().unwrap();
        let mut carried = 0;
        for record in groups.get_mut(&group_id).into_iter().flatten() {
            if record.in_secret_santa && !record.assignment.recipients.is_empty() {
                record.profile.previous_recipient_ids =
                    record.assignment.recipients.iter().map(|r| r.id).collect();
                carried += 1;
            }
        }
        Ok(carried)
    }
}
