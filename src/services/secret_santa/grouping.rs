use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use super::error::{SecretSantaError, SecretSantaResult};
use crate::models::{
    participant::ParticipantProfile,
    secret_santa::{GivingUnit, ShuffleVariant},
};

/// Filter eligible participants down to the variant's half of the group and
/// partition them into giving units. Fails when fewer than two units remain.
pub fn form_units(
    variant: ShuffleVariant,
    participants: &[ParticipantProfile],
) -> SecretSantaResult<Vec<GivingUnit>> {
    let admitted: Vec<&ParticipantProfile> = participants
        .iter()
        .filter(|p| variant.admits(&p.kind))
        .collect();

    let units = match variant {
        ShuffleVariant::Adults => group_couples(&admitted),
        ShuffleVariant::Kids => group_kids(&admitted),
    };

    if units.len() < 2 {
        return Err(SecretSantaError::InsufficientParticipants { units: units.len() });
    }
    Ok(units)
}

/// Merge linked partners into two-member units, in input order. A partner
/// link only counts when the partner is in the same admitted set and not
/// already placed in another unit.
pub fn group_couples(participants: &[&ParticipantProfile]) -> Vec<GivingUnit> {
    let by_id: HashMap<Uuid, &ParticipantProfile> =
        participants.iter().map(|p| (p.id, *p)).collect();
    let mut placed: HashSet<Uuid> = HashSet::with_capacity(participants.len());
    let mut units = Vec::new();

    for p in participants {
        if !placed.insert(p.id) {
            continue;
        }

        let partner = p
            .partner_id
            .filter(|id| *id != p.id && !placed.contains(id))
            .and_then(|id| by_id.get(&id).copied());

        let unit = match partner {
            Some(partner) => {
                placed.insert(partner.id);
                GivingUnit {
                    members: vec![p.summary(), partner.summary()],
                    exclusion_ids: p
                        .previous_recipient_ids
                        .iter()
                        .chain(&partner.previous_recipient_ids)
                        .copied()
                        .collect(),
                }
            }
            None => GivingUnit {
                members: vec![p.summary()],
                exclusion_ids: p.previous_recipient_ids.iter().copied().collect(),
            },
        };
        units.push(unit);
    }

    units
}

/// Every kid is a unit of its own, excluded from its siblings and from last
/// draw's recipients.
pub fn group_kids(participants: &[&ParticipantProfile]) -> Vec<GivingUnit> {
    let mut seen = HashSet::with_capacity(participants.len());
    participants
        .iter()
        .filter(|p| seen.insert(p.id))
        .map(|p| GivingUnit {
            members: vec![p.summary()],
            exclusion_ids: p
                .sibling_ids
                .iter()
                .chain(&p.previous_recipient_ids)
                .copied()
                .collect(),
        })
        .collect()
}
