use rand::{seq::SliceRandom, Rng};
use tracing::{debug, trace, warn};
use uuid::Uuid;

use super::error::{SecretSantaError, SecretSantaResult};
use crate::models::secret_santa::{Assignment, GivingUnit};

/// Attempt budget used when no other value is configured.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1000;

/// Why a candidate pairing was thrown away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    SelfAssignment,
    SharedMember(Uuid),
    Excluded(Uuid),
}

/// A complete, validated giver -> receiver mapping over a unit list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matching {
    pub assignments: Vec<Assignment>,
    pub attempts: u32,
}

/// Check one (giver, receiver) pair against the draw rules.
pub fn check_pair(
    giver_index: usize,
    giver: &GivingUnit,
    receiver_index: usize,
    receiver: &GivingUnit,
) -> Option<Violation> {
    if giver_index == receiver_index {
        return Some(Violation::SelfAssignment);
    }
    if let Some(id) = receiver.member_ids().find(|id| giver.contains(*id)) {
        return Some(Violation::SharedMember(id));
    }
    receiver
        .member_ids()
        .find(|id| giver.exclusion_ids.contains(id))
        .map(Violation::Excluded)
}

/// Shuffle `order` until no index maps to itself. Needs at least two
/// entries; a uniform shuffle of n >= 2 is deranged with probability > 1/3.
fn derange<R: Rng + ?Sized>(order: &mut [usize], rng: &mut R) {
    debug_assert!(order.len() >= 2);
    loop {
        order.shuffle(rng);
        if order.iter().enumerate().all(|(i, &j)| i != j) {
            return;
        }
    }
}

/// Randomized-restart search for a derangement of `units` that satisfies
/// every exclusion. Each attempt draws one fixed-point-free candidate, where
/// the receiver of giver `i` is the unit at position `i`, and then checks the
/// exclusion rules. Only those candidates count against `max_attempts`.
///
/// Returns `MatchExhausted` once `max_attempts` candidates were rejected.
pub fn find_matching<R: Rng + ?Sized>(
    units: &[GivingUnit],
    max_attempts: u32,
    rng: &mut R,
) -> SecretSantaResult<Matching> {
    if units.len() < 2 {
        return Err(SecretSantaError::InsufficientParticipants { units: units.len() });
    }

    let mut receivers: Vec<usize> = (0..units.len()).collect();

    for attempt in 1..=max_attempts {
        derange(&mut receivers, rng);

        let violation = receivers.iter().enumerate().find_map(|(giver, &receiver)| {
            check_pair(giver, &units[giver], receiver, &units[receiver])
        });

        match violation {
            Some(v) => trace!(attempt, ?v, "rejected Secret Santa candidate"),
            None => {
                debug!(attempt, units = units.len(), "found valid Secret Santa matching");
                let assignments = receivers
                    .iter()
                    .enumerate()
                    .map(|(giver, &receiver)| Assignment { giver, receiver })
                    .collect();
                return Ok(Matching { assignments, attempts: attempt });
            }
        }
    }

    warn!(units = units.len(), max_attempts, "Secret Santa attempt budget exhausted");
    Err(SecretSantaError::MatchExhausted { attempts: max_attempts })
}
