//! Wire vocabulary for the qsnap protocol.
//!
//! This crate defines the binary shape of frame messages: delta field masks,
//! record headers, the frame header, and the fixed protocol capacities. It
//! does not reconstruct state, only the structure of what travels.
//!
//! # Design Principles
//!
//! - **Stable wire format** - Masks and capacities are part of the protocol contract.
//! - **Bounded decoding** - Length fields are validated before use.
//! - **Symmetric** - Every read has a byte-identical write counterpart.
//!
//! See `WIRE_FORMAT.md` for the complete layout.

mod entity;
mod error;
mod frame;
mod limits;
mod player;

pub use entity::{
    read_entity_header, write_entity_header, EntityBits, EntityEffects, EVENT_FALL,
    EVENT_FALL_FAR, EVENT_FALL_SHORT, EVENT_FOOTSTEP, EVENT_ITEM_RESPAWN, EVENT_NONE,
    EVENT_TELEPORT,
};
pub use error::{WireError, WireResult};
pub use frame::{read_frame_header, write_frame_header, FrameHeader};
pub use limits::{
    ENTITY_STATE_BACKUP, ENTITY_STATE_MASK, FRAME_BACKUP, FRAME_MASK, MAX_AREA_BYTES,
    MAX_ENTITIES, MAX_MSG_LEN, MAX_SNAPSHOT_ENTITIES, MAX_STATS,
};
pub use player::{PlayerBits, PM_DEAD, PM_FREEZE, PM_NORMAL, PM_SPECTATOR};
