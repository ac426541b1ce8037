//! Server-side frame emission.
//!
//! Produces the byte stream [`crate::ClientSession::parse_frame`] consumes.
//! Entity runs are emitted as a sorted merge against the reference run:
//! unchanged entities are skipped entirely (the decoder carries them over),
//! changed ones delta against their reference state, entering ones delta
//! against their baseline with a forced record, and leaving ones become
//! removal records.

use msg::MsgWriter;
use wire::{write_entity_header, write_frame_header, EntityBits, FrameHeader};

use crate::delta::{encode_entity_delta, encode_entity_remove};
use crate::player::encode_player_state;
use crate::types::{EntityState, PlayerState};

/// Emits one complete frame message.
///
/// `from_ps` and `from_entities` describe the reference snapshot the client
/// will delta against; keyframes pass the default player state and an empty
/// run. Both entity runs must be sorted by entity number. `baselines` is
/// indexed by entity number; missing slots fall back to the null state.
pub fn emit_frame(
    msg: &mut MsgWriter,
    header: &FrameHeader,
    from_ps: &PlayerState,
    to_ps: &PlayerState,
    from_entities: &[EntityState],
    to_entities: &[EntityState],
    baselines: &[EntityState],
) {
    write_frame_header(msg, header);
    encode_player_state(msg, from_ps, to_ps);
    emit_entities(msg, from_entities, to_entities, baselines);
}

/// Emits an entity run as a merge against the reference run, terminator
/// included.
pub fn emit_entities(
    msg: &mut MsgWriter,
    from: &[EntityState],
    to: &[EntityState],
    baselines: &[EntityState],
) {
    let mut old_index = 0usize;
    let mut new_index = 0usize;

    loop {
        match (from.get(old_index), to.get(new_index)) {
            (None, None) => break,
            (Some(old), None) => {
                encode_entity_remove(msg, old.number);
                old_index += 1;
            }
            (None, Some(new)) => {
                let base = baseline_for(baselines, new.number);
                encode_entity_delta(msg, &base, new, true);
                new_index += 1;
            }
            (Some(old), Some(new)) => {
                if old.number == new.number {
                    encode_entity_delta(msg, old, new, false);
                    old_index += 1;
                    new_index += 1;
                } else if new.number < old.number {
                    let base = baseline_for(baselines, new.number);
                    encode_entity_delta(msg, &base, new, true);
                    new_index += 1;
                } else {
                    encode_entity_remove(msg, old.number);
                    old_index += 1;
                }
            }
        }
    }

    write_entity_header(msg, EntityBits::empty(), 0);
}

/// Emits a spawn baseline record for `state`.
pub fn emit_baseline(msg: &mut MsgWriter, state: &EntityState) {
    encode_entity_delta(msg, &EntityState::default(), state, true);
}

fn baseline_for(baselines: &[EntityState], number: u16) -> EntityState {
    baselines
        .get(usize::from(number))
        .copied()
        .unwrap_or_default()
}
