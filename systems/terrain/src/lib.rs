#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure terrain resolution system that selects tile variants from corner classes.
//!
//! Every map cell has four corners and each corner is shared by up to four
//! cells. The resolver settles each corner to a single class by voting among
//! the painted cells that share it. It then looks up the tile whose terrain
//! vector matches the resulting [`CornerSignature`] position by position, in
//! top-left, top-right, bottom-left, bottom-right order. Signatures without an
//! exact match fall back to the tile with the fewest mismatched corners, and
//! the lowest tile id breaks any tie. Resolution therefore never fails and is
//! a pure function of the signature.

mod queue;

use std::collections::HashMap;

use campaign_trail_catalog::TileCatalog;
use campaign_trail_core::{CellCoord, Corner, CornerSignature, TerrainClassId, TerrainVector, TileId};
use tracing::debug;

pub use queue::ResolveQueue;

/// Rule used to settle a corner shared by cells of different classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CornerVote {
    /// The class with the most votes wins; ties go to the first-declared class.
    Majority,
    /// The provided class wins whenever any voter carries it, otherwise
    /// [`CornerVote::Majority`] applies.
    Dominant(TerrainClassId),
}

/// Configuration parameters required to construct the resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolverConfig {
    exterior: TerrainClassId,
    vote: CornerVote,
}

impl ResolverConfig {
    /// Creates a majority-vote configuration with the provided exterior class.
    ///
    /// The exterior class is assigned to corners that no painted cell votes on.
    #[must_use]
    pub const fn new(exterior: TerrainClassId) -> Self {
        Self {
            exterior,
            vote: CornerVote::Majority,
        }
    }

    /// Overrides the corner voting rule.
    #[must_use]
    pub const fn with_vote(mut self, vote: CornerVote) -> Self {
        self.vote = vote;
        self
    }

    /// Class assigned to corners without voters.
    #[must_use]
    pub const fn exterior(&self) -> TerrainClassId {
        self.exterior
    }

    /// Rule used to settle contested corners.
    #[must_use]
    pub const fn vote(&self) -> CornerVote {
        self.vote
    }
}

/// Outcome of resolving a single corner signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// A tile declares exactly the requested signature.
    Exact(TileId),
    /// No tile matches exactly; this is the closest one.
    Fallback {
        /// Selected tile.
        tile: TileId,
        /// Number of corners that differ from the requested signature.
        mismatches: u8,
    },
}

impl Resolution {
    /// Tile selected by the resolution.
    #[must_use]
    pub const fn tile(&self) -> TileId {
        match self {
            Self::Exact(tile) => *tile,
            Self::Fallback { tile, .. } => *tile,
        }
    }

    /// Reports whether the tile matched every corner.
    #[must_use]
    pub const fn is_exact(&self) -> bool {
        matches!(self, Self::Exact(_))
    }
}

/// Read-only terrain resolver derived from a catalog.
#[derive(Clone, Debug)]
pub struct TerrainResolver {
    config: ResolverConfig,
    exact: HashMap<CornerSignature, TileId>,
    candidates: Vec<(TileId, TerrainVector)>,
}

impl TerrainResolver {
    /// Indexes the catalog's terrain tiles.
    #[must_use]
    pub fn new(catalog: &TileCatalog, config: ResolverConfig) -> Self {
        let candidates: Vec<(TileId, TerrainVector)> = catalog
            .terrain_tiles()
            .map(|(tile, vector)| (tile, *vector))
            .collect();

        let mut exact = HashMap::with_capacity(candidates.len());
        for (tile, vector) in &candidates {
            if let Some(signature) = vector.signature() {
                let _ = exact.entry(signature).or_insert(*tile);
            }
        }

        debug!(
            candidates = candidates.len(),
            signatures = exact.len(),
            "terrain resolver indexed"
        );

        Self {
            config,
            exact,
            candidates,
        }
    }

    /// Configuration the resolver was built with.
    #[must_use]
    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Reports whether the catalog declares any terrain tile at all.
    #[must_use]
    pub fn has_terrain_tiles(&self) -> bool {
        !self.candidates.is_empty()
    }

    /// Selects the tile for the provided signature.
    ///
    /// Returns `None` only when the catalog declares no terrain tiles, in
    /// which case callers keep the cell's current tile.
    #[must_use]
    pub fn resolve(&self, signature: &CornerSignature) -> Option<TileId> {
        self.classify(signature).map(|resolution| resolution.tile())
    }

    /// Selects the tile for the provided signature and reports match quality.
    #[must_use]
    pub fn classify(&self, signature: &CornerSignature) -> Option<Resolution> {
        if let Some(tile) = self.exact.get(signature) {
            return Some(Resolution::Exact(*tile));
        }

        let mut best: Option<(u8, TileId)> = None;
        for (tile, vector) in &self.candidates {
            let mismatches = vector.mismatches(signature);
            match best {
                Some((fewest, _)) if fewest <= mismatches => {}
                _ => best = Some((mismatches, *tile)),
            }
        }

        best.map(|(mismatches, tile)| Resolution::Fallback { tile, mismatches })
    }

    /// Settles a single corner from the classes of the cells sharing it.
    ///
    /// Unpainted or out-of-bounds cells are simply absent from `voters`.
    #[must_use]
    pub fn corner_class<I>(&self, voters: I) -> TerrainClassId
    where
        I: IntoIterator<Item = TerrainClassId>,
    {
        let mut ballots = [None; 4];
        for (ballot, voter) in ballots.iter_mut().zip(voters) {
            *ballot = Some(voter);
        }
        let votes: Vec<TerrainClassId> = ballots.into_iter().flatten().collect();

        if let CornerVote::Dominant(dominant) = self.config.vote {
            if votes.contains(&dominant) {
                return dominant;
            }
        }

        majority(&votes).unwrap_or(self.config.exterior)
    }

    /// Computes the corner signature of a cell.
    ///
    /// `class_at` must return the painted class of an in-bounds cell and
    /// `None` for unpainted or out-of-bounds cells.
    #[must_use]
    pub fn signature_at<F>(&self, cell: CellCoord, mut class_at: F) -> CornerSignature
    where
        F: FnMut(CellCoord) -> Option<TerrainClassId>,
    {
        let mut corners = [self.config.exterior; 4];
        for corner in Corner::ALL {
            let voters = corner
                .sharing_offsets()
                .into_iter()
                .filter_map(|(columns, rows)| cell.offset(columns, rows))
                .filter_map(&mut class_at);
            corners[corner.index()] = self.corner_class(voters);
        }
        CornerSignature::from_array(corners)
    }
}

fn majority(votes: &[TerrainClassId]) -> Option<TerrainClassId> {
    let mut best: Option<(usize, TerrainClassId)> = None;
    for &candidate in votes {
        let count = votes.iter().filter(|vote| **vote == candidate).count();
        match best {
            Some((best_count, best_class))
                if best_count > count || (best_count == count && best_class <= candidate) => {}
            _ => best = Some((count, candidate)),
        }
    }
    best.map(|(_, class)| class)
}
