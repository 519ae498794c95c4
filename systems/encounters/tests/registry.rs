use campaign_trail_catalog::{CatalogSource, TileCatalog, TileSource};
use campaign_trail_core::{
    Difficulty, DispatchError, EncounterDefinition, EncounterId, LoadError, MonsterEntry, TileId,
};
use campaign_trail_system_encounters::{EncounterRegistry, EncounterTable};

fn politician_duo() -> EncounterDefinition {
    EncounterDefinition::new(
        Difficulty::Easy,
        vec![
            MonsterEntry::new("Intern", 2),
            MonsterEntry::new("Lobbyist", 3),
        ],
    )
    .with_rewards(10, vec!["Pamphlet".to_owned()])
}

#[test]
fn registered_encounters_resolve() {
    let mut registry = EncounterRegistry::new();
    registry
        .register(EncounterId::new("P-easy-01"), politician_duo())
        .expect("first registration succeeds");

    let definition = registry.resolve("P-easy-01").expect("registered");
    assert_eq!(definition, &politician_duo());
    assert_eq!(definition.roster()[1].archetype(), "Lobbyist");
    assert!(registry.contains("P-easy-01"));
}

#[test]
fn unknown_encounters_fail_to_resolve() {
    let registry = EncounterRegistry::new();
    assert_eq!(
        registry.resolve("P-hard-09"),
        Err(DispatchError::UnknownEncounter(EncounterId::new("P-hard-09")))
    );
}

#[test]
fn duplicate_registration_keeps_the_original() {
    let mut registry = EncounterRegistry::new();
    registry
        .register(EncounterId::new("P-easy-01"), politician_duo())
        .expect("first registration succeeds");

    let replacement = EncounterDefinition::new(Difficulty::Boss, Vec::new());
    assert_eq!(
        registry.register(EncounterId::new("P-easy-01"), replacement),
        Err(LoadError::DuplicateEncounter(EncounterId::new("P-easy-01")))
    );
    assert_eq!(
        registry.resolve("P-easy-01").map(EncounterDefinition::difficulty),
        Ok(Difficulty::Easy)
    );
    assert_eq!(registry.len(), 1);
}

#[test]
fn rosters_larger_than_a_formation_are_rejected() {
    let roster = (1..=5)
        .map(|level| MonsterEntry::new("Staffer", level))
        .collect();
    let mut registry = EncounterRegistry::new();
    assert_eq!(
        registry.register(
            EncounterId::new("P-boss-01"),
            EncounterDefinition::new(Difficulty::Boss, roster)
        ),
        Err(LoadError::OversizedRoster {
            id: EncounterId::new("P-boss-01"),
            found: 5,
        })
    );
    assert!(registry.is_empty());
}

#[test]
fn table_entries_register_in_order() {
    let text = r#"
        [[encounter]]
        id = "P-easy-01"
        difficulty = "easy"
        xp = 10
        drops = ["Pamphlet"]
        monsters = [
            { archetype = "Intern", level = 2 },
            { archetype = "Lobbyist", level = 3 },
        ]

        [[encounter]]
        id = "P-boss-01"
        difficulty = "boss"
        monsters = [{ archetype = "Senator", level = 9 }]
    "#;
    let table: EncounterTable = toml::from_str(text).expect("table parses");
    let registry = EncounterRegistry::from_table(&table).expect("table registers");

    assert_eq!(registry.resolve("P-easy-01"), Ok(&politician_duo()));
    let boss = registry.resolve("P-boss-01").expect("boss registered");
    assert_eq!(boss.experience(), 0);
    assert!(boss.drops().is_empty());

    let ids: Vec<_> = registry.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["P-boss-01", "P-easy-01"]);
}

#[test]
fn duplicate_table_entries_fail_the_load() {
    let text = r#"
        [[encounter]]
        id = "P-easy-01"
        difficulty = "easy"

        [[encounter]]
        id = "P-easy-01"
        difficulty = "hard"
    "#;
    let table: EncounterTable = toml::from_str(text).expect("table parses");
    assert_eq!(
        EncounterRegistry::from_table(&table).unwrap_err(),
        LoadError::DuplicateEncounter(EncounterId::new("P-easy-01"))
    );
}

#[test]
fn catalog_references_must_be_registered() {
    let source = CatalogSource::default()
        .with_tile(TileSource::new(1).character("Politician001").encounter("P-easy-01"))
        .with_tile(TileSource::new(7).encounter("P-easy-02"));
    let catalog = TileCatalog::load(&source).expect("catalog loads");

    let mut registry = EncounterRegistry::new();
    registry
        .register(EncounterId::new("P-easy-01"), politician_duo())
        .expect("registers");

    assert_eq!(
        registry.validate_catalog(&catalog),
        Err(LoadError::DanglingEncounterReference {
            tile: TileId::new(7),
            encounter: EncounterId::new("P-easy-02"),
        })
    );

    registry
        .register(
            EncounterId::new("P-easy-02"),
            EncounterDefinition::new(Difficulty::Normal, Vec::new()),
        )
        .expect("registers");
    registry
        .register(
            EncounterId::new("P-unused"),
            EncounterDefinition::new(Difficulty::Normal, Vec::new()),
        )
        .expect("registers");
    assert_eq!(registry.validate_catalog(&catalog), Ok(()));
}
