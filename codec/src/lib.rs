//! Snapshot reconstruction and delta decoding for the qsnap protocol.
//!
//! This is the main codec crate. It ties together msg and wire to turn a
//! stream of server frame messages into fully reconstructed world snapshots,
//! and provides the matching server-side emitter.
//!
//! # Features
//!
//! - Frame decoding with delta reconstruction against a reference snapshot
//! - Spawn baseline management for entities entering a frame
//! - Snapshot and entity state history rings for delta references
//! - Interpolation bookkeeping (previous/current state pairs per entity)
//! - Sorted-merge frame emission for servers and test harnesses
//!
//! # Design Principles
//!
//! - **Correctness first** - All invariants are documented and tested.
//! - **No steady-state allocations** - History rings are allocated once.
//! - **Deterministic** - Same inputs produce same outputs.
//!
//! The entry point is [`ClientSession`]: feed it baselines via
//! [`ClientSession::parse_baseline`] and frames via
//! [`ClientSession::parse_frame`], then read reconstructed state through
//! [`ClientSession::snapshot`] and [`ClientSession::entity`].

mod delta;
mod emit;
mod error;
mod history;
mod player;
mod session;
mod table;
mod types;

pub use delta::{decode_entity_delta, encode_entity_delta, encode_entity_remove};
pub use emit::{emit_baseline, emit_entities, emit_frame};
pub use error::{CodecError, CodecResult};
pub use history::FrameHistory;
pub use player::{decode_player_state, encode_player_state};
pub use session::{ClientSession, FrameStatus};
pub use table::{is_discontinuous, Entity, EntityTable, DISCONTINUITY_THRESHOLD};
pub use types::{EntityState, PlayerState, PmoveState, Snapshot};
