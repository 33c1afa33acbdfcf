use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

/// Adults carry a login-capable contact channel; children do not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParticipantKind {
    Adult { contact_email: String },
    Child,
}

impl ParticipantKind {
    /// A blank email is treated the same as a missing one.
    pub fn from_email(email: Option<String>) -> Self {
        match email.filter(|e| !e.trim().is_empty()) {
            Some(contact_email) => ParticipantKind::Adult { contact_email },
            None => ParticipantKind::Child,
        }
    }

    pub fn is_adult(&self) -> bool {
        matches!(self, ParticipantKind::Adult { .. })
    }
}

/// Name + id pair stored in `current_recipient` and shown on the badge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecipientSummary {
    pub id: Uuid,
    pub name: String,
}

/// Entry of `previous_recipients`: older rows hold bare ids, archived
/// draws hold full recipient records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecipientRef {
    Id(Uuid),
    Record(RecipientSummary),
}

impl RecipientRef {
    pub fn id(&self) -> Uuid {
        match self {
            RecipientRef::Id(id) => *id,
            RecipientRef::Record(r) => r.id,
        }
    }
}

/// Identity and exclusion metadata. Immutable for the duration of a draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantProfile {
    pub id: Uuid,
    pub display_name: String,
    pub kind: ParticipantKind,
    pub partner_id: Option<Uuid>,
    pub sibling_ids: Vec<Uuid>,
    pub previous_recipient_ids: Vec<Uuid>,
}

impl ParticipantProfile {
    pub fn summary(&self) -> RecipientSummary {
        RecipientSummary {
            id: self.id,
            name: self.display_name.clone(),
        }
    }
}

/// The mutable half of a participant record, written by each draw.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssignmentState {
    pub recipients: Vec<RecipientSummary>,
    pub assigned_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticipantRecord {
    pub profile: ParticipantProfile,
    pub in_secret_santa: bool,
    pub assignment: AssignmentState,
}

/// DB row struct for the `participants` table.
#[derive(Debug, Clone, FromRow)]
pub struct ParticipantRow {
    pub id: Uuid,
    pub display_name: String,
    pub email: Option<String>,
    pub partner_id: Option<Uuid>,
    pub sibling_ids: Vec<Uuid>,
    pub in_secret_santa: bool,
    pub previous_recipients: Json<Vec<RecipientRef>>,
    pub current_recipient: Json<Vec<RecipientSummary>>,
    pub secret_santa_assigned_at: Option<DateTime<Utc>>,
}

impl From<ParticipantRow> for ParticipantRecord {
    fn from(row: ParticipantRow) -> Self {
        let previous_recipient_ids = row.previous_recipients.0.iter().map(RecipientRef::id).collect();
        ParticipantRecord {
            profile: ParticipantProfile {
                id: row.id,
                display_name: row.display_name,
                kind: ParticipantKind::from_email(row.email),
                partner_id: row.partner_id,
                sibling_ids: row.sibling_ids,
                previous_recipient_ids,
            },
            in_secret_santa: row.in_secret_santa,
            assignment: AssignmentState {
                recipients: row.current_recipient.0,
                assigned_at: row.secret_santa_assigned_at,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetParticipationRequest {
    pub in_secret_santa: bool,
}
