//! Fixed protocol capacities.
//!
//! These values are part of the wire contract: both sides size their tables
//! from them, and the ring masks below require the backup counts to stay
//! powers of two.

/// Maximum number of addressable entities. Valid entity numbers are
/// `1..MAX_ENTITIES`; number 0 terminates an entity run.
pub const MAX_ENTITIES: u16 = 1024;

/// Maximum number of entities one snapshot may carry.
pub const MAX_SNAPSHOT_ENTITIES: usize = 64;

/// Number of snapshots retained for delta references.
pub const FRAME_BACKUP: usize = 16;

/// Mask mapping a server frame number onto its ring slot.
pub const FRAME_MASK: usize = FRAME_BACKUP - 1;

/// Capacity of the circular entity state arena backing the snapshot ring.
pub const ENTITY_STATE_BACKUP: usize = FRAME_BACKUP * MAX_SNAPSHOT_ENTITIES;

/// Mask mapping the ever-incrementing entity state cursor onto the arena.
pub const ENTITY_STATE_MASK: usize = ENTITY_STATE_BACKUP - 1;

/// Number of player stat slots addressed by the stat mask.
pub const MAX_STATS: usize = 32;

/// Maximum size of a snapshot's area visibility bit set, in bytes.
pub const MAX_AREA_BYTES: usize = 32;

/// Largest server message the transport is expected to carry. Frames that
/// exceed this will not survive a single UDP datagram on common paths.
pub const MAX_MSG_LEN: usize = 1400;
