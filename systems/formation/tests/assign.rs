use campaign_trail_core::{
    CellCoord, Difficulty, DispatchError, EncounterDefinition, EncounterId, MonsterEntry,
    Occupant, PartyMember, SlotIndex, SlotKind, SlotMarker,
};
use campaign_trail_system_encounters::EncounterRegistry;
use campaign_trail_system_formation::{formation_for_encounter, SlotAssigner};

fn index(value: u8) -> SlotIndex {
    SlotIndex::new(value).expect("slot index in range")
}

fn marker(kind: SlotKind, slot: u8, column: u32) -> SlotMarker {
    SlotMarker {
        kind,
        index: index(slot),
        cell: CellCoord::new(column, 0),
    }
}

fn duo() -> Vec<MonsterEntry> {
    vec![MonsterEntry::new("Intern", 2), MonsterEntry::new("Lobbyist", 3)]
}

fn party() -> Vec<PartyMember> {
    vec![PartyMember::new("Player")]
}

#[test]
fn roster_fills_lowest_monster_slots_first() {
    let markers = vec![
        marker(SlotKind::Monster, 4, 3),
        marker(SlotKind::Monster, 1, 0),
        marker(SlotKind::Monster, 3, 2),
        marker(SlotKind::Player, 1, 5),
    ];
    let formation = SlotAssigner::new()
        .assign(&markers, &party(), &duo())
        .expect("formation fits");

    assert_eq!(
        formation.occupant(SlotKind::Monster, index(1)),
        Some(&Occupant::Monster(MonsterEntry::new("Intern", 2)))
    );
    assert_eq!(
        formation.occupant(SlotKind::Monster, index(3)),
        Some(&Occupant::Monster(MonsterEntry::new("Lobbyist", 3)))
    );
    assert!(
        formation.slot(SlotKind::Monster, index(4)).is_some(),
        "surplus slot 4 is still declared"
    );
    assert_eq!(formation.occupant(SlotKind::Monster, index(4)), None);
    assert_eq!(
        formation.occupant(SlotKind::Player, index(1)),
        Some(&Occupant::Party(PartyMember::new("Player")))
    );
    assert_eq!(formation.len(), 4);
    assert_eq!(formation.occupied_count(), 3);
}

#[test]
fn formation_lists_players_before_monsters() {
    let markers = vec![
        marker(SlotKind::Monster, 2, 1),
        marker(SlotKind::Player, 2, 6),
        marker(SlotKind::Monster, 1, 0),
        marker(SlotKind::Player, 1, 5),
    ];
    let formation = SlotAssigner::new()
        .assign(&markers, &party(), &duo())
        .expect("formation fits");

    let order: Vec<_> = formation
        .iter()
        .map(|slot| (slot.kind, slot.index.get(), slot.cell.column()))
        .collect();
    assert_eq!(
        order,
        vec![
            (SlotKind::Player, 1, 5),
            (SlotKind::Player, 2, 6),
            (SlotKind::Monster, 1, 0),
            (SlotKind::Monster, 2, 1),
        ]
    );
}

#[test]
fn every_roster_entry_is_seated_exactly_once() {
    let markers: Vec<_> = (1..=4)
        .map(|slot| marker(SlotKind::Monster, slot, u32::from(slot)))
        .collect();
    let roster = duo();
    let formation = SlotAssigner::new()
        .assign(&markers, &[], &roster)
        .expect("formation fits");

    let seated: Vec<_> = formation
        .iter()
        .filter_map(|slot| match &slot.occupant {
            Some(Occupant::Monster(entry)) => Some(entry.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(seated, roster, "roster order must be preserved");
    assert_eq!(formation.len(), 4);
}

#[test]
fn too_few_monster_slots_fail() {
    let markers = vec![marker(SlotKind::Monster, 1, 0), marker(SlotKind::Player, 1, 5)];
    assert_eq!(
        SlotAssigner::new().assign(&markers, &party(), &duo()),
        Err(DispatchError::InsufficientSlots {
            kind: SlotKind::Monster,
            required: 2,
            available: 1,
        })
    );
}

#[test]
fn party_larger_than_player_slots_fails() {
    let markers = vec![marker(SlotKind::Monster, 1, 0), marker(SlotKind::Monster, 2, 1)];
    assert_eq!(
        SlotAssigner::new().assign(&markers, &party(), &duo()),
        Err(DispatchError::InsufficientSlots {
            kind: SlotKind::Player,
            required: 1,
            available: 0,
        })
    );
}

#[test]
fn duplicate_slot_numbers_are_reported_before_capacity() {
    let markers = vec![marker(SlotKind::Monster, 2, 0), marker(SlotKind::Monster, 2, 4)];
    let roster: Vec<_> = (1..=4).map(|level| MonsterEntry::new("Staffer", level)).collect();
    assert_eq!(
        SlotAssigner::new().assign(&markers, &[], &roster),
        Err(DispatchError::DuplicateSlotIndex {
            kind: SlotKind::Monster,
            index: index(2),
        })
    );
}

#[test]
fn same_number_on_opposite_sides_is_not_a_duplicate() {
    let markers = vec![marker(SlotKind::Monster, 1, 0), marker(SlotKind::Player, 1, 1)];
    let formation = SlotAssigner::new()
        .assign(&markers, &party(), &duo()[..1])
        .expect("formation fits");
    assert_eq!(formation.occupied_count(), 2);
}

#[test]
fn dispatch_resolves_then_assigns() {
    let mut registry = EncounterRegistry::new();
    registry
        .register(
            EncounterId::new("P-easy-01"),
            EncounterDefinition::new(Difficulty::Easy, duo()),
        )
        .expect("registers");
    let markers = vec![
        marker(SlotKind::Monster, 1, 0),
        marker(SlotKind::Monster, 2, 1),
        marker(SlotKind::Player, 1, 5),
    ];

    let formation =
        formation_for_encounter(&registry, "P-easy-01", &markers, &party()).expect("dispatches");
    assert_eq!(formation.occupied_count(), 3);

    assert_eq!(
        formation_for_encounter(&registry, "P-hard-07", &markers, &party()),
        Err(DispatchError::UnknownEncounter(EncounterId::new("P-hard-07")))
    );
}
