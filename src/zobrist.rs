//! Zobrist keys for incremental position hashing.

use core::fmt::{self, Debug, Formatter};
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use std::sync::Arc;

/// Fixed seed so that two boards of the same size share their keys and
/// therefore produce comparable hashes.
const ZOBRIST_SEED: u64 = 0x5649_4552_4745_5749;

/// Bits a cell key is rotated per player id.
const PLAYER_ROTATION: u32 = 9;

/// Random keys, one per cell. The key of `(cell, player)` is the cell key
/// rotated by a player dependent amount, which keeps the table at one word
/// per cell even for the largest boards.
#[derive(Clone)]
pub(crate) struct ZobristKeys {
    cells: Arc<[u64]>,
}

impl ZobristKeys {
    pub(crate) fn new(cell_count: usize) -> Self {
        let mut rng = SmallRng::seed_from_u64(ZOBRIST_SEED);
        let cells = (0..cell_count)
            .map(|_| rng.next_u64())
            .collect::<Vec<_>>()
            .into();
        Self { cells }
    }

    #[inline]
    pub(crate) fn key(&self, cell: usize, player: u8) -> u64 {
        self.cells[cell].rotate_left(u32::from(player) * PLAYER_ROTATION)
    }
}

impl PartialEq for ZobristKeys {
    fn eq(&self, other: &Self) -> bool {
        // keys are a pure function of the cell count
        self.cells.len() == other.cells.len()
    }
}

impl Eq for ZobristKeys {}

impl Debug for ZobristKeys {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZobristKeys")
            .field("cells", &self.cells.len())
            .finish()
    }
}
