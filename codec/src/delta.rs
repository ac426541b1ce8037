//! Entity delta records: decoding against a base state and the mirroring
//! encoder.
//!
//! A record patches a base `EntityState` field by field under the control of
//! its [`EntityBits`] mask. Fields without a bit keep the base's value
//! byte for byte, with two exceptions the wire relies on:
//!
//! - `old_origin` backfills from the base's `origin` unless the base is a
//!   beam, whose `old_origin` is a live endpoint rather than history.
//! - `event` zeroes when absent; events fire for exactly one snapshot.

use msg::{MsgReader, MsgWriter};
use wire::{write_entity_header, EntityBits, EntityEffects};

use crate::error::CodecResult;
use crate::types::EntityState;

/// Decodes one entity record against `from`, producing the new state.
///
/// `bits` and `number` come from the record header. The reader must be
/// positioned on the first field byte.
pub fn decode_entity_delta(
    msg: &mut MsgReader<'_>,
    from: &EntityState,
    number: u16,
    bits: EntityBits,
) -> CodecResult<EntityState> {
    let mut to = *from;
    to.number = number;

    if !from.effects.is_beam() {
        to.old_origin = from.origin;
    }

    if bits.has(EntityBits::MODEL) {
        to.model_index = msg.read_u8()?;
    }
    if bits.has(EntityBits::MODEL2) {
        to.model_index2 = msg.read_u8()?;
    }
    if bits.has(EntityBits::MODEL3) {
        to.model_index3 = msg.read_u8()?;
    }
    if bits.has(EntityBits::MODEL4) {
        to.model_index4 = msg.read_u8()?;
    }

    if bits.has(EntityBits::FRAME) {
        to.frame = msg.read_u8()?;
    }

    // The narrow form wins if an encoder ever sets both widths.
    if bits.has(EntityBits::SKIN8) {
        to.skin = u16::from(msg.read_u8()?);
    } else if bits.has(EntityBits::SKIN16) {
        to.skin = msg.read_i16()? as u16;
    }

    if bits.has(EntityBits::EFFECTS8) {
        to.effects = EntityEffects::from_raw(u16::from(msg.read_u8()?));
    } else if bits.has(EntityBits::EFFECTS16) {
        to.effects = EntityEffects::from_raw(msg.read_i16()? as u16);
    }

    if bits.has(EntityBits::ORIGIN_X) {
        to.origin[0] = msg.read_coord()?;
    }
    if bits.has(EntityBits::ORIGIN_Y) {
        to.origin[1] = msg.read_coord()?;
    }
    if bits.has(EntityBits::ORIGIN_Z) {
        to.origin[2] = msg.read_coord()?;
    }

    if bits.has(EntityBits::ANGLE_PITCH) {
        to.angles[0] = msg.read_angle()?;
    }
    if bits.has(EntityBits::ANGLE_YAW) {
        to.angles[1] = msg.read_angle()?;
    }
    if bits.has(EntityBits::ANGLE_ROLL) {
        to.angles[2] = msg.read_angle()?;
    }

    if bits.has(EntityBits::OLD_ORIGIN) {
        to.old_origin = msg.read_pos()?;
    }

    if bits.has(EntityBits::SOUND) {
        to.sound = msg.read_u8()?;
    }

    if bits.has(EntityBits::EVENT) {
        to.event = msg.read_u8()?;
    } else {
        to.event = 0;
    }

    if bits.has(EntityBits::SOLID) {
        to.solid = msg.read_i16()? as u16;
    }

    Ok(to)
}

/// Encodes the difference between `from` and `to` as one entity record.
///
/// An identical pair writes nothing unless `force` is set; forcing emits at
/// least the record header so the entity exists in the stream (used when an
/// entity enters a snapshot). Beams always restate their endpoint.
pub fn encode_entity_delta(msg: &mut MsgWriter, from: &EntityState, to: &EntityState, force: bool) {
    let mut bits = EntityBits::empty();

    if to.origin[0] != from.origin[0] {
        bits |= EntityBits::ORIGIN_X;
    }
    if to.origin[1] != from.origin[1] {
        bits |= EntityBits::ORIGIN_Y;
    }
    if to.origin[2] != from.origin[2] {
        bits |= EntityBits::ORIGIN_Z;
    }

    if to.angles[0] != from.angles[0] {
        bits |= EntityBits::ANGLE_PITCH;
    }
    if to.angles[1] != from.angles[1] {
        bits |= EntityBits::ANGLE_YAW;
    }
    if to.angles[2] != from.angles[2] {
        bits |= EntityBits::ANGLE_ROLL;
    }

    if to.frame != from.frame {
        bits |= EntityBits::FRAME;
    }
    if to.event != 0 {
        bits |= EntityBits::EVENT;
    }

    if to.model_index != from.model_index {
        bits |= EntityBits::MODEL;
    }
    if to.model_index2 != from.model_index2 {
        bits |= EntityBits::MODEL2;
    }
    if to.model_index3 != from.model_index3 {
        bits |= EntityBits::MODEL3;
    }
    if to.model_index4 != from.model_index4 {
        bits |= EntityBits::MODEL4;
    }

    if to.skin != from.skin {
        bits |= if to.skin <= 0xFF {
            EntityBits::SKIN8
        } else {
            EntityBits::SKIN16
        };
    }

    if to.effects != from.effects {
        bits |= if to.effects.raw() <= 0xFF {
            EntityBits::EFFECTS8
        } else {
            EntityBits::EFFECTS16
        };
    }

    if to.sound != from.sound {
        bits |= EntityBits::SOUND;
    }
    if to.solid != from.solid {
        bits |= EntityBits::SOLID;
    }

    if to.effects.is_beam() {
        bits |= EntityBits::OLD_ORIGIN;
    }

    if bits.is_empty() && !force {
        return;
    }

    write_entity_header(msg, bits, to.number);

    if bits.has(EntityBits::MODEL) {
        msg.write_u8(to.model_index);
    }
    if bits.has(EntityBits::MODEL2) {
        msg.write_u8(to.model_index2);
    }
    if bits.has(EntityBits::MODEL3) {
        msg.write_u8(to.model_index3);
    }
    if bits.has(EntityBits::MODEL4) {
        msg.write_u8(to.model_index4);
    }

    if bits.has(EntityBits::FRAME) {
        msg.write_u8(to.frame);
    }

    if bits.has(EntityBits::SKIN8) {
        msg.write_u8(to.skin as u8);
    } else if bits.has(EntityBits::SKIN16) {
        msg.write_i16(to.skin as i16);
    }

    if bits.has(EntityBits::EFFECTS8) {
        msg.write_u8(to.effects.raw() as u8);
    } else if bits.has(EntityBits::EFFECTS16) {
        msg.write_i16(to.effects.raw() as i16);
    }

    if bits.has(EntityBits::ORIGIN_X) {
        msg.write_coord(to.origin[0]);
    }
    if bits.has(EntityBits::ORIGIN_Y) {
        msg.write_coord(to.origin[1]);
    }
    if bits.has(EntityBits::ORIGIN_Z) {
        msg.write_coord(to.origin[2]);
    }

    if bits.has(EntityBits::ANGLE_PITCH) {
        msg.write_angle(to.angles[0]);
    }
    if bits.has(EntityBits::ANGLE_YAW) {
        msg.write_angle(to.angles[1]);
    }
    if bits.has(EntityBits::ANGLE_ROLL) {
        msg.write_angle(to.angles[2]);
    }

    if bits.has(EntityBits::OLD_ORIGIN) {
        msg.write_pos(to.old_origin);
    }

    if bits.has(EntityBits::SOUND) {
        msg.write_u8(to.sound);
    }

    if bits.has(EntityBits::EVENT) {
        msg.write_u8(to.event);
    }

    if bits.has(EntityBits::SOLID) {
        msg.write_i16(to.solid as i16);
    }
}

/// Writes a removal record for `number`.
pub fn encode_entity_remove(msg: &mut MsgWriter, number: u16) {
    write_entity_header(msg, EntityBits::REMOVE, number);
}
