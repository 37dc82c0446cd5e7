//! Transposition table shared by all search workers.

use crate::game::Game;
use parking_lot::Mutex;
use std::collections::HashMap;

/// How the stored score relates to the true value of the position.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Bound {
    Exact,
    /// The search failed high; the value is at least the score.
    LowerBound,
    /// The search failed low; the value is at most the score.
    UpperBound,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Entry {
    pub score: i32,
    /// Remaining plies the score was searched with.
    pub depth: u8,
    pub bound: Bound,
}

/// Identifies a position: cell contents, the player to move and the player
/// the search runs for.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct PositionKey {
    pub hash: u64,
    pub to_move: u8,
    /// Player whose opponents are searched as one side. `0` in two-player
    /// games, where both sides are the same for either root.
    pub root: u8,
}

impl PositionKey {
    #[must_use]
    pub const fn of(game: &Game, root: u8) -> Self {
        Self {
            hash: game.board().hash(),
            to_move: game.current_player(),
            root: if game.number_of_players() == 2 { 0 } else { root },
        }
    }
}

/// Hash map split into independently locked shards, so that workers
/// searching different subtrees rarely contend.
#[derive(Debug)]
pub struct TranspositionTable {
    shards: Box<[Mutex<HashMap<PositionKey, Entry>>]>,
}

impl TranspositionTable {
    /// `shards` must not be zero.
    #[must_use]
    pub fn new(shards: usize) -> Self {
        debug_assert!(shards > 0);
        Self {
            shards: (0..shards.max(1)).map(|_| Mutex::default()).collect(),
        }
    }

    fn shard(&self, key: PositionKey) -> &Mutex<HashMap<PositionKey, Entry>> {
        // high bits, the low ones select the bucket inside the map
        let index = (key.hash >> 32) as usize % self.shards.len();
        &self.shards[index]
    }

    #[must_use]
    pub fn get(&self, key: PositionKey) -> Option<Entry> {
        self.shard(key).lock().get(&key).copied()
    }

    /// Stores the entry unless a deeper search of the same position is
    /// already known.
    pub fn store(&self, key: PositionKey, entry: Entry) {
        let mut shard = self.shard(key).lock();
        match shard.get(&key) {
            Some(old) if old.depth > entry.depth => {}
            _ => {
                shard.insert(key, entry);
            }
        }
    }

    pub fn clear(&self) {
        for shard in &self.shards {
            shard.lock().clear();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.lock().len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
