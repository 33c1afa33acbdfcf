use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::participant::{ParticipantKind, RecipientSummary};

/// Which half of the group a draw runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShuffleVariant {
    /// Participants with a contact channel, partners merged into couples.
    #[serde(alias = "couples")]
    Adults,
    /// Participants without a contact channel, siblings excluded.
    Kids,
}

impl ShuffleVariant {
    pub fn admits(&self, kind: &ParticipantKind) -> bool {
        match self {
            ShuffleVariant::Adults => kind.is_adult(),
            ShuffleVariant::Kids => !kind.is_adult(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShuffleVariant::Adults => "adults",
            ShuffleVariant::Kids => "kids",
        }
    }
}

impl std::fmt::Display for ShuffleVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ShuffleVariant {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "adults" | "couples" => Ok(ShuffleVariant::Adults),
            "kids" => Ok(ShuffleVariant::Kids),
            _ => Err(anyhow::anyhow!("Unknown variant: {s}")),
        }
    }
}

/// Who is running the draw, and for which group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShuffleContext {
    pub group_id: Uuid,
    pub acting_user_id: Uuid,
}

/// One node of the matching round: a single person or a linked couple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GivingUnit {
    pub members: Vec<RecipientSummary>,
    pub exclusion_ids: HashSet<Uuid>,
}

impl GivingUnit {
    pub fn member_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.members.iter().map(|m| m.id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.members.iter().any(|m| m.id == id)
    }
}

/// Giver unit index -> receiver unit index, over the unit list a matching
/// was computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub giver: usize,
    pub receiver: usize,
}

/// A single `current_recipient` write in the commit batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientUpdate {
    pub giver_id: Uuid,
    pub recipients: Vec<RecipientSummary>,
}

/// Internal outcome of a successful draw; only logged, never returned over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShuffleSummary {
    pub variant: ShuffleVariant,
    pub units: usize,
    pub givers: usize,
    pub attempts: u32,
}

/// What callers of a draw get back.
#[derive(Debug, Clone, Serialize)]
pub struct ShuffleReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}
