#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for inspecting tilesets, resolving maps and
//! dispatching encounters.

mod layout_transfer;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use campaign_trail_catalog::TileCatalog;
use campaign_trail_core::{
    CellCoord, CellRect, CellRectSize, Event, Formation, Occupant, PartyMember, TileTag,
};
use campaign_trail_system_formation::formation_for_encounter;
use campaign_trail_tiled::{Project, Tileset};
use campaign_trail_world::{self as world, query, MapInstance, MapLayout};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::layout_transfer::TerrainLayoutSnapshot;

/// Campaign Trail tile engine tools.
#[derive(Debug, Parser)]
#[command(name = "campaign-trail", version)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Prints the terrain classes, terrain tiles and tagged tiles of a tileset.
    Inspect {
        /// Path to a `.tsx` tileset.
        tileset: PathBuf,
    },
    /// Loads a map, resolves its terrain and prints the ground tiles.
    Render {
        /// Project file declaring tilesets and encounters.
        #[arg(long)]
        project: PathBuf,
        /// Path to a `.tmx` map.
        #[arg(long)]
        map: PathBuf,
    },
    /// Builds the battle formation for an encounter on an arena map.
    Battle {
        /// Project file declaring tilesets and encounters.
        #[arg(long)]
        project: PathBuf,
        /// Path to the arena `.tmx` map.
        #[arg(long)]
        arena: PathBuf,
        /// Encounter identifier, e.g. `P-easy-01`.
        #[arg(long)]
        encounter: String,
        /// Party members in seating order. Defaults to the project party.
        #[arg(long = "party")]
        party: Vec<String>,
        /// Arena region as `column,row,width,height`. Defaults to the whole map.
        #[arg(long, value_parser = parse_region)]
        region: Option<CellRect>,
    },
    /// Paints a layout transfer string onto a blank map and prints the result.
    Paint {
        /// Project file declaring tilesets and encounters.
        #[arg(long)]
        project: PathBuf,
        /// Layout string produced by `snapshot`.
        #[arg(long)]
        layout: String,
    },
    /// Encodes the painted terrain of a map as a layout transfer string.
    Snapshot {
        /// Project file declaring tilesets and encounters.
        #[arg(long)]
        project: PathBuf,
        /// Path to a `.tmx` map.
        #[arg(long)]
        map: PathBuf,
    },
}

/// Entry point for the Campaign Trail command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        CliCommand::Inspect { tileset } => inspect(&tileset),
        CliCommand::Render { project, map } => render(&project, &map),
        CliCommand::Battle {
            project,
            arena,
            encounter,
            party,
            region,
        } => battle(&project, &arena, &encounter, party, region),
        CliCommand::Paint { project, layout } => paint(&project, &layout),
        CliCommand::Snapshot { project, map } => snapshot(&project, &map),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn inspect(path: &Path) -> Result<()> {
    let tileset = Tileset::load(path)?;
    let catalog = TileCatalog::load(&tileset.to_catalog_source())
        .with_context(|| format!("tileset {} is not a valid catalog", path.display()))?;

    println!("tileset {} ({} tiles)", tileset.name(), catalog.len());
    println!("terrain classes:");
    for class in catalog.terrain_classes() {
        println!("  {:>3}  {}", class.id().get(), class.name());
    }

    println!("terrain tiles (top-left, top-right, bottom-left, bottom-right):");
    for (tile, vector) in catalog.terrain_tiles() {
        let corners: Vec<&str> = vector
            .as_array()
            .into_iter()
            .map(|corner| {
                corner
                    .and_then(|class| catalog.terrain_class(class))
                    .map_or("-", |class| class.name())
            })
            .collect();
        println!("  {tile:>4}  {}", corners.join(", "));
    }

    println!("tagged tiles:");
    for tile in catalog.tiles() {
        if let Some(tag) = tile.tag() {
            println!("  {:>4}  {}", tile.id(), describe_tag(tag));
        }
    }
    Ok(())
}

fn render(project: &Path, map: &Path) -> Result<()> {
    let project = Project::load(project)?;
    let map = project.load_map(map)?;

    print_grid(&map);
    if let Some(spawn) = query::spawn_point(&map) {
        println!("spawn point: {spawn}");
    }
    for (cell, tile) in query::trigger_cells(&map) {
        println!("trigger at {cell}: tile {tile}");
    }
    println!("fingerprint: {:016x}", query::fingerprint(&map));
    Ok(())
}

fn battle(
    project: &Path,
    arena: &Path,
    encounter: &str,
    party: Vec<String>,
    region: Option<CellRect>,
) -> Result<()> {
    let project = Project::load(project)?;
    let map = project.load_map(arena)?;

    let (columns, rows) = query::dimensions(&map);
    let region = region.unwrap_or_else(|| {
        CellRect::from_origin_and_size(CellCoord::new(0, 0), CellRectSize::new(columns, rows))
    });
    let markers = query::slot_markers(&map, region);
    let party: Vec<PartyMember> = if party.is_empty() {
        project.party().to_vec()
    } else {
        party.into_iter().map(PartyMember::new).collect()
    };

    let formation = formation_for_encounter(project.registry(), encounter, &markers, &party)
        .with_context(|| format!("encounter `{encounter}` cannot be dispatched"))?;
    info!(
        encounter,
        slots = formation.len(),
        seated = formation.occupied_count(),
        "formation built"
    );
    print_formation(&formation);
    Ok(())
}

fn paint(project: &Path, layout: &str) -> Result<()> {
    let project = Project::load(project)?;
    let snapshot = TerrainLayoutSnapshot::decode(layout).context("invalid layout string")?;
    let commands = snapshot.paint_commands(project.catalog())?;

    let (columns, rows) = snapshot.dimensions();
    let mut map = project.instantiate(MapLayout::blank(columns, rows))?;
    let mut events = Vec::new();
    for command in commands {
        world::apply(&mut map, command, &mut events);
    }
    if let Some(reason) = events.iter().find_map(|event| match event {
        Event::CommandRejected { reason } => Some(reason),
        _ => None,
    }) {
        bail!("layout could not be painted: {reason:?}");
    }

    let resolved = events
        .iter()
        .filter(|event| matches!(event, Event::TileResolved { .. }))
        .count();
    info!(resolved, "layout painted");
    print_grid(&map);
    println!("fingerprint: {:016x}", query::fingerprint(&map));
    Ok(())
}

fn snapshot(project: &Path, map: &Path) -> Result<()> {
    let project = Project::load(project)?;
    let map = project.load_map(map)?;
    let snapshot = TerrainLayoutSnapshot::capture(&map, project.catalog());
    println!("{}", snapshot.encode()?);
    Ok(())
}

fn print_grid(map: &MapInstance) {
    let (columns, rows) = query::dimensions(map);
    let tiles = query::ground_tiles(map);
    let width = tiles
        .iter()
        .flatten()
        .map(|tile| tile.to_string().len())
        .max()
        .unwrap_or(1);

    println!("{columns}x{rows}");
    for row in tiles.chunks(columns.max(1) as usize) {
        let line: Vec<String> = row
            .iter()
            .map(|tile| match tile {
                Some(tile) => format!("{tile:>width$}"),
                None => format!("{:>width$}", "."),
            })
            .collect();
        println!("{}", line.join(" "));
    }
}

fn print_formation(formation: &Formation) {
    for slot in formation.iter() {
        let occupant = match &slot.occupant {
            Some(Occupant::Party(member)) => member.name().to_owned(),
            Some(Occupant::Monster(monster)) => {
                format!("{} (level {})", monster.archetype(), monster.level())
            }
            None => "empty".to_owned(),
        };
        println!("{} {} at {}: {occupant}", slot.kind, slot.index, slot.cell);
    }
}

fn describe_tag(tag: &TileTag) -> String {
    match tag {
        TileTag::Character {
            name,
            encounter: Some(encounter),
        } => format!("character {name}, encounter {encounter}"),
        TileTag::Character {
            name,
            encounter: None,
        } => format!("character {name}"),
        TileTag::Encounter(encounter) => format!("encounter {encounter}"),
        TileTag::PlayerSlot(index) => format!("player slot {index}"),
        TileTag::MonsterSlot(index) => format!("monster slot {index}"),
    }
}

fn parse_region(value: &str) -> Result<CellRect, String> {
    let parts: Vec<u32> = value
        .split(',')
        .map(|part| part.trim().parse::<u32>())
        .collect::<Result<_, _>>()
        .map_err(|error| format!("region `{value}` is not four numbers: {error}"))?;
    match parts.as_slice() {
        [column, row, width, height] => Ok(CellRect::from_origin_and_size(
            CellCoord::new(*column, *row),
            CellRectSize::new(*width, *height),
        )),
        _ => Err(format!(
            "region `{value}` must be `column,row,width,height`"
        )),
    }
}
