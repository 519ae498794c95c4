use std::sync::Arc;

use campaign_trail_catalog::{CatalogSource, TileCatalog, TileSource};
use campaign_trail_core::{
    ActorId, CellCoord, Command, Difficulty, Direction, EncounterDefinition, EncounterId, Event,
    TerrainClassId, TileId,
};
use campaign_trail_system_encounters::EncounterRegistry;
use campaign_trail_system_terrain::{ResolverConfig, TerrainResolver};
use campaign_trail_world::{self as world, query, MapInstance, MapLayout};

const GRASS: TerrainClassId = TerrainClassId::new(0);
const WATER: TerrainClassId = TerrainClassId::new(1);

#[test]
fn deterministic_replay_produces_identical_outcomes() {
    let first = replay(scripted_commands());
    let second = replay(scripted_commands());

    assert_eq!(first, second, "replay diverged between runs");
    assert!(
        first
            .events
            .iter()
            .any(|event| matches!(event, Event::Triggered { .. })),
        "script should walk into the candidate"
    );
}

#[test]
fn shared_data_backs_independent_maps() {
    let (catalog, resolver, registry) = shared();
    let mut left = MapInstance::new(
        Arc::clone(&catalog),
        Arc::clone(&resolver),
        Arc::clone(&registry),
        MapLayout::blank(6, 4),
    )
    .expect("map loads");
    let right = MapInstance::new(catalog, resolver, registry, MapLayout::blank(6, 4))
        .expect("map loads");
    let untouched = query::fingerprint(&right);

    for command in scripted_commands() {
        let mut events = Vec::new();
        world::apply(&mut left, command, &mut events);
    }

    assert_eq!(query::fingerprint(&right), untouched);
    assert_ne!(query::fingerprint(&left), untouched);
}

#[derive(Debug, PartialEq, Eq)]
struct ReplayOutcome {
    fingerprint: u64,
    ground: Vec<Option<TileId>>,
    events: Vec<Event>,
}

fn replay(commands: Vec<Command>) -> ReplayOutcome {
    let (catalog, resolver, registry) = shared();
    let mut map = MapInstance::new(catalog, resolver, registry, MapLayout::blank(6, 4))
        .expect("map loads");
    let mut log = Vec::new();

    for command in commands {
        let mut events = Vec::new();
        world::apply(&mut map, command, &mut events);
        log.extend(events);
    }

    ReplayOutcome {
        fingerprint: query::fingerprint(&map),
        ground: query::ground_tiles(&map),
        events: log,
    }
}

fn shared() -> (
    Arc<TileCatalog>,
    Arc<TerrainResolver>,
    Arc<EncounterRegistry>,
) {
    let source = CatalogSource::new(["Grass", "Water"])
        .with_tile(TileSource::new(1).terrain(["Grass"; 4]))
        .with_tile(TileSource::new(2).terrain(["Water"; 4]))
        .with_tile(TileSource::new(3).terrain(["Grass", "Grass", "Water", "Water"]))
        .with_tile(TileSource::new(4).terrain(["Water", "Water", "Grass", "Grass"]))
        .with_tile(TileSource::new(5).terrain(["Grass", "Water", "Grass", "Water"]))
        .with_tile(TileSource::new(6).terrain(["Water", "Grass", "Water", "Grass"]))
        .with_tile(
            TileSource::new(30)
                .character("Candidate")
                .encounter("debate-01"),
        );
    let catalog = TileCatalog::load(&source).expect("catalog loads");
    let resolver = TerrainResolver::new(&catalog, ResolverConfig::new(GRASS));

    let mut registry = EncounterRegistry::new();
    registry
        .register(
            EncounterId::new("debate-01"),
            EncounterDefinition::new(Difficulty::Normal, Vec::new()),
        )
        .expect("registers");
    registry.validate_catalog(&catalog).expect("catalog references resolve");

    (Arc::new(catalog), Arc::new(resolver), Arc::new(registry))
}

fn scripted_commands() -> Vec<Command> {
    let mut commands = Vec::new();
    for row in 0..4 {
        for column in 0..6 {
            let class = if column >= 3 { WATER } else { GRASS };
            commands.push(Command::PaintTerrain {
                cell: CellCoord::new(column, row),
                class,
            });
        }
    }
    commands.push(Command::PaintTerrain {
        cell: CellCoord::new(2, 2),
        class: WATER,
    });
    commands.push(Command::EraseTerrain {
        cell: CellCoord::new(5, 0),
    });
    commands.push(Command::PlaceMarker {
        cell: CellCoord::new(3, 1),
        tile: Some(TileId::new(30)),
    });
    commands.push(Command::SpawnActor {
        cell: CellCoord::new(0, 1),
    });
    for _ in 0..3 {
        commands.push(Command::StepActor {
            actor: ActorId::new(0),
            direction: Direction::East,
        });
    }
    commands.push(Command::StepActor {
        actor: ActorId::new(0),
        direction: Direction::North,
    });
    commands
}
