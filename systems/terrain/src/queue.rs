use std::collections::VecDeque;

use campaign_trail_core::CellCoord;

/// Deduplicating work list of cells awaiting terrain re-resolution.
///
/// A cell is accepted at most once per drain. The queue starts a fresh
/// generation whenever it empties, so repeated edits are always processed but
/// a single propagation pass never revisits a cell.
#[derive(Clone, Debug)]
pub struct ResolveQueue {
    columns: u32,
    rows: u32,
    pending: VecDeque<CellCoord>,
    stamps: Vec<u32>,
    generation: u32,
}

impl ResolveQueue {
    /// Creates an empty queue for a grid of the provided dimensions.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        let cells = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            columns,
            rows,
            pending: VecDeque::new(),
            stamps: vec![0; cells],
            generation: 1,
        }
    }

    /// Queues a single cell.
    ///
    /// Returns `false` when the cell lies outside the grid or is already
    /// queued in the current pass.
    pub fn push(&mut self, cell: CellCoord) -> bool {
        let Some(index) = self.index(cell) else {
            return false;
        };
        if self.stamps[index] == self.generation {
            return false;
        }
        self.stamps[index] = self.generation;
        self.pending.push_back(cell);
        true
    }

    /// Queues every in-bounds cell that shares a corner with `cell`.
    ///
    /// This is the 3x3 block centred on the cell, visited in row-major order.
    pub fn push_neighbourhood(&mut self, cell: CellCoord) {
        for rows in -1..=1 {
            for columns in -1..=1 {
                if let Some(neighbour) = cell.offset(columns, rows) {
                    let _ = self.push(neighbour);
                }
            }
        }
    }

    /// Removes the next cell to re-resolve.
    pub fn pop(&mut self) -> Option<CellCoord> {
        let next = self.pending.pop_front();
        if self.pending.is_empty() {
            self.generation = self.generation.wrapping_add(1);
            if self.generation == 0 {
                self.stamps.fill(0);
                self.generation = 1;
            }
        }
        next
    }

    /// Number of queued cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Reports whether no cell is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        let index = u64::from(cell.row()) * u64::from(self.columns) + u64::from(cell.column());
        usize::try_from(index).ok()
    }
}
