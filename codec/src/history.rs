//! Decoded snapshot history.
//!
//! Snapshots live in a small ring indexed by server frame number; their
//! entity payloads live in a shared circular arena addressed by an
//! ever-incrementing cursor. Both structures are allocated once and only
//! ever overwritten, so a reference that has fallen out of the window reads
//! stale data rather than failing. [`FrameHistory::states_in_window`] is the
//! staleness check callers run before trusting a reference.

use wire::{ENTITY_STATE_BACKUP, ENTITY_STATE_MASK, FRAME_BACKUP, FRAME_MASK};

use crate::types::{EntityState, Snapshot};

/// Ring of decoded snapshots plus the entity state arena behind them.
#[derive(Debug, Clone)]
pub struct FrameHistory {
    frames: Vec<Snapshot>,
    states: Vec<EntityState>,
    next_state: u32,
}

impl FrameHistory {
    /// Creates an empty history with all slots zeroed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames: vec![Snapshot::default(); FRAME_BACKUP],
            states: vec![EntityState::default(); ENTITY_STATE_BACKUP],
            next_state: 0,
        }
    }

    /// Returns the arena cursor: the index the next pushed state will get.
    #[must_use]
    pub const fn next_state(&self) -> u32 {
        self.next_state
    }

    /// Returns the ring slot `server_frame` maps onto, whatever it holds.
    #[must_use]
    pub fn slot(&self, server_frame: i32) -> &Snapshot {
        &self.frames[(server_frame & FRAME_MASK as i32) as usize]
    }

    /// Returns the stored snapshot for `server_frame`, or `None` if its slot
    /// has been reused for a newer frame.
    ///
    /// Invalid snapshots are still returned; callers that need a delta
    /// reference check `valid` themselves.
    #[must_use]
    pub fn get(&self, server_frame: i32) -> Option<&Snapshot> {
        let slot = self.slot(server_frame);
        (slot.server_frame == server_frame).then_some(slot)
    }

    /// Stores a decoded snapshot at its ring slot.
    pub fn store(&mut self, snapshot: Snapshot) {
        self.frames[(snapshot.server_frame & FRAME_MASK as i32) as usize] = snapshot;
    }

    /// Appends a state to the arena and returns its cursor index.
    pub fn push_state(&mut self, state: EntityState) -> u32 {
        let index = self.next_state;
        self.states[(index & ENTITY_STATE_MASK as u32) as usize] = state;
        self.next_state = self.next_state.wrapping_add(1);
        index
    }

    /// Copies the state at an arena cursor index.
    #[must_use]
    pub fn state_at(&self, index: u32) -> EntityState {
        self.states[(index & ENTITY_STATE_MASK as u32) as usize]
    }

    /// Iterates a snapshot's entities in wire order.
    pub fn entities(&self, snapshot: &Snapshot) -> impl Iterator<Item = EntityState> + '_ {
        let first = snapshot.first_entity;
        (0..u32::from(snapshot.num_entities)).map(move |i| self.state_at(first.wrapping_add(i)))
    }

    /// Returns `true` while the arena still holds `snapshot`'s entities.
    ///
    /// The margin of one frame's worth of states keeps a reference usable
    /// while the current frame is itself being pushed.
    #[must_use]
    pub fn states_in_window(&self, snapshot: &Snapshot) -> bool {
        self.next_state.wrapping_sub(snapshot.first_entity)
            <= (ENTITY_STATE_BACKUP - FRAME_BACKUP) as u32
    }
}

impl Default for FrameHistory {
    fn default() -> Self {
        Self::new()
    }
}
