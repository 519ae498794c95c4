//! TOML project files tying tilesets, encounters and resolver settings together.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use campaign_trail_catalog::TileCatalog;
use campaign_trail_core::{PartyMember, TerrainClassId};
use campaign_trail_system_encounters::{EncounterRegistry, EncounterTable};
use campaign_trail_system_terrain::{CornerVote, ResolverConfig, TerrainResolver};
use campaign_trail_world::{MapInstance, MapLayout};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{map::TiledMap, tileset::Tileset, TilesetBundle};

/// Project file contents. Relative paths are resolved against the file's
/// directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Tilesets in `[[tileset]]` order.
    #[serde(rename = "tileset", default)]
    pub tilesets: Vec<TilesetEntry>,
    /// Encounter table, if the project declares encounters.
    #[serde(default)]
    pub encounters: Option<PathBuf>,
    /// Terrain class assigned to corners without painted neighbours.
    pub exterior: String,
    /// Corner voting rule.
    #[serde(default)]
    pub vote: VoteRule,
    /// Party seated on player slots, in seating order.
    #[serde(default)]
    pub party: Vec<String>,
}

impl ProjectConfig {
    /// Parses a project file.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("project file is not valid TOML")
    }
}

/// Tileset reference within a project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilesetEntry {
    /// Path to the `.tsx` file.
    pub source: PathBuf,
    /// Global id of the tileset's first tile.
    #[serde(default = "default_firstgid")]
    pub firstgid: u32,
}

/// Corner voting rule by class name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteRule {
    /// Most votes wins; ties go to the first-declared class.
    #[default]
    Majority,
    /// The named class claims every corner it touches.
    Dominant(String),
}

fn default_firstgid() -> u32 {
    1
}

/// Loaded project with its shared read-only data.
#[derive(Clone, Debug)]
pub struct Project {
    catalog: Arc<TileCatalog>,
    resolver: Arc<TerrainResolver>,
    registry: Arc<EncounterRegistry>,
    party: Vec<PartyMember>,
}

impl Project {
    /// Reads a project file and everything it references.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read project {}", path.display()))?;
        let config = ProjectConfig::from_toml_str(&text)
            .with_context(|| format!("failed to parse project {}", path.display()))?;
        let root = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_config(&config, root)
    }

    /// Builds the project from an already parsed configuration.
    ///
    /// Encounter references are validated against the catalog before the
    /// resolver is built.
    pub fn from_config(config: &ProjectConfig, root: &Path) -> Result<Self> {
        let mut bundle = TilesetBundle::new();
        for entry in &config.tilesets {
            let tileset = Tileset::load(&root.join(&entry.source))?;
            bundle.add(entry.firstgid, &tileset)?;
        }
        let catalog = TileCatalog::load(&bundle.into_source()).context("invalid tile catalog")?;

        let registry = match &config.encounters {
            Some(path) => {
                let path = root.join(path);
                let text = fs::read_to_string(&path)
                    .with_context(|| format!("failed to read encounters {}", path.display()))?;
                let table: EncounterTable = toml::from_str(&text)
                    .with_context(|| format!("failed to parse encounters {}", path.display()))?;
                EncounterRegistry::from_table(&table)
                    .with_context(|| format!("invalid encounters in {}", path.display()))?
            }
            None => EncounterRegistry::new(),
        };
        registry
            .validate_catalog(&catalog)
            .context("catalog references unknown encounters")?;

        let exterior = class_named(&catalog, &config.exterior)?;
        let vote = match &config.vote {
            VoteRule::Majority => CornerVote::Majority,
            VoteRule::Dominant(name) => CornerVote::Dominant(class_named(&catalog, name)?),
        };
        let resolver = TerrainResolver::new(&catalog, ResolverConfig::new(exterior).with_vote(vote));

        debug!(
            tilesets = config.tilesets.len(),
            tiles = catalog.len(),
            encounters = registry.len(),
            "project loaded"
        );

        Ok(Self {
            catalog: Arc::new(catalog),
            resolver: Arc::new(resolver),
            registry: Arc::new(registry),
            party: config.party.iter().map(PartyMember::new).collect(),
        })
    }

    /// Shared tile catalog.
    #[must_use]
    pub fn catalog(&self) -> &Arc<TileCatalog> {
        &self.catalog
    }

    /// Shared terrain resolver.
    #[must_use]
    pub fn resolver(&self) -> &Arc<TerrainResolver> {
        &self.resolver
    }

    /// Shared encounter registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<EncounterRegistry> {
        &self.registry
    }

    /// Default party in seating order.
    #[must_use]
    pub fn party(&self) -> &[PartyMember] {
        &self.party
    }

    /// Creates a map instance backed by this project's shared data.
    pub fn instantiate(&self, layout: MapLayout) -> Result<MapInstance> {
        let map = MapInstance::new(
            Arc::clone(&self.catalog),
            Arc::clone(&self.resolver),
            Arc::clone(&self.registry),
            layout,
        )?;
        Ok(map)
    }

    /// Loads a `.tmx` map and instantiates it.
    pub fn load_map(&self, path: &Path) -> Result<MapInstance> {
        let tiled = TiledMap::load(path)?;
        let layout = tiled.layout(&self.catalog)?;
        self.instantiate(layout)
            .with_context(|| format!("map {} failed validation", path.display()))
    }
}

fn class_named(catalog: &TileCatalog, name: &str) -> Result<TerrainClassId> {
    catalog
        .terrain_class_by_name(name)
        .with_context(|| format!("terrain class `{name}` is not declared by any tileset"))
}
