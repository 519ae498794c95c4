#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that seats a party and an encounter roster onto slot markers.

use std::collections::BTreeMap;

use campaign_trail_core::{
    DispatchError, Formation, FormationSlot, MonsterEntry, Occupant, PartyMember, SlotIndex,
    SlotKind, SlotMarker,
};
use campaign_trail_system_encounters::EncounterRegistry;
use tracing::debug;

/// Builds battle formations from the slot markers of an arena region.
#[derive(Clone, Copy, Debug, Default)]
pub struct SlotAssigner;

impl SlotAssigner {
    /// Creates a new slot assigner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Seats the party on player slots and the roster on monster slots.
    ///
    /// Both sides are seated in ascending slot order: the first party member
    /// takes the lowest player slot and the first roster entry the lowest
    /// monster slot. Every declared slot appears in the result, occupied or
    /// not. Duplicate slot numbers are reported before missing capacity.
    pub fn assign(
        &self,
        markers: &[SlotMarker],
        party: &[PartyMember],
        roster: &[MonsterEntry],
    ) -> Result<Formation, DispatchError> {
        let mut declared: BTreeMap<(SlotKind, SlotIndex), SlotMarker> = BTreeMap::new();
        let mut ordered = markers.to_vec();
        ordered.sort_by_key(|marker| (marker.kind, marker.index, marker.cell));
        for marker in ordered {
            if declared.insert((marker.kind, marker.index), marker).is_some() {
                return Err(DispatchError::DuplicateSlotIndex {
                    kind: marker.kind,
                    index: marker.index,
                });
            }
        }

        let players: Vec<SlotMarker> = side(&declared, SlotKind::Player);
        let monsters: Vec<SlotMarker> = side(&declared, SlotKind::Monster);
        ensure_capacity(SlotKind::Monster, roster.len(), monsters.len())?;
        ensure_capacity(SlotKind::Player, party.len(), players.len())?;

        let seated_players = seat(players, party.iter().cloned().map(Occupant::Party));
        let seated_monsters = seat(monsters, roster.iter().cloned().map(Occupant::Monster));
        let formation = Formation::from_slots(seated_players.chain(seated_monsters).collect());

        debug!(
            slots = formation.len(),
            occupied = formation.occupied_count(),
            "formation assigned"
        );
        Ok(formation)
    }
}

/// Resolves `id` and seats its roster opposite the party.
///
/// Fails without producing a partial formation when the encounter is unknown
/// or the markers cannot seat everyone.
pub fn formation_for_encounter(
    registry: &EncounterRegistry,
    id: &str,
    markers: &[SlotMarker],
    party: &[PartyMember],
) -> Result<Formation, DispatchError> {
    let definition = registry.resolve(id)?;
    SlotAssigner::new().assign(markers, party, definition.roster())
}

fn side(declared: &BTreeMap<(SlotKind, SlotIndex), SlotMarker>, kind: SlotKind) -> Vec<SlotMarker> {
    declared
        .values()
        .filter(|marker| marker.kind == kind)
        .copied()
        .collect()
}

fn ensure_capacity(kind: SlotKind, required: usize, available: usize) -> Result<(), DispatchError> {
    if required > available {
        return Err(DispatchError::InsufficientSlots {
            kind,
            required,
            available,
        });
    }
    Ok(())
}

fn seat(
    markers: Vec<SlotMarker>,
    occupants: impl Iterator<Item = Occupant>,
) -> impl Iterator<Item = FormationSlot> {
    let mut occupants = occupants.fuse();
    markers.into_iter().map(move |marker| FormationSlot {
        kind: marker.kind,
        index: marker.index,
        cell: marker.cell,
        occupant: occupants.next(),
    })
}
