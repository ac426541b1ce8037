//! Player state records.
//!
//! Unlike entity records, a player record is always present in a frame: the
//! presence byte and the stat mask are read unconditionally, so an unchanged
//! player still costs five bytes.

use msg::{MsgReader, MsgWriter};
use wire::{PlayerBits, MAX_STATS};

use crate::error::CodecResult;
use crate::types::PlayerState;

/// Decodes a player record against `from`.
///
/// Keyframes pass the default state as `from`.
pub fn decode_player_state(
    msg: &mut MsgReader<'_>,
    from: &PlayerState,
) -> CodecResult<PlayerState> {
    let mut to = *from;

    let bits = PlayerBits::read(msg)?;

    if bits.has(PlayerBits::PM_TYPE) {
        to.pmove.pm_type = msg.read_u8()?;
    }

    if bits.has(PlayerBits::PM_ORIGIN) {
        to.pmove.origin[0] = msg.read_i16()?;
        to.pmove.origin[1] = msg.read_i16()?;
        to.pmove.origin[2] = msg.read_i16()?;
    }

    if bits.has(PlayerBits::PM_VELOCITY) {
        to.pmove.velocity[0] = msg.read_i16()?;
        to.pmove.velocity[1] = msg.read_i16()?;
        to.pmove.velocity[2] = msg.read_i16()?;
    }

    if bits.has(PlayerBits::PM_TIME) {
        to.pmove.pm_time = msg.read_u8()?;
    }

    if bits.has(PlayerBits::PM_FLAGS) {
        to.pmove.pm_flags = msg.read_i16()? as u16;
    }

    if bits.has(PlayerBits::PM_DELTA_ANGLES) {
        to.pmove.delta_angles[0] = msg.read_i16()?;
        to.pmove.delta_angles[1] = msg.read_i16()?;
        to.pmove.delta_angles[2] = msg.read_i16()?;
    }

    if bits.has(PlayerBits::VIEW_ANGLES) {
        to.view_angles[0] = msg.read_angle16()?;
        to.view_angles[1] = msg.read_angle16()?;
        to.view_angles[2] = msg.read_angle16()?;
    }

    let stat_bits = msg.read_i32()?;
    for i in 0..MAX_STATS {
        if (stat_bits & (1 << i)) != 0 {
            to.stats[i] = msg.read_i16()?;
        }
    }

    Ok(to)
}

/// Encodes the difference between two player states.
pub fn encode_player_state(msg: &mut MsgWriter, from: &PlayerState, to: &PlayerState) {
    let mut bits = PlayerBits::empty();

    if to.pmove.pm_type != from.pmove.pm_type {
        bits |= PlayerBits::PM_TYPE;
    }
    if to.pmove.origin != from.pmove.origin {
        bits |= PlayerBits::PM_ORIGIN;
    }
    if to.pmove.velocity != from.pmove.velocity {
        bits |= PlayerBits::PM_VELOCITY;
    }
    if to.pmove.pm_time != from.pmove.pm_time {
        bits |= PlayerBits::PM_TIME;
    }
    if to.pmove.pm_flags != from.pmove.pm_flags {
        bits |= PlayerBits::PM_FLAGS;
    }
    if to.pmove.delta_angles != from.pmove.delta_angles {
        bits |= PlayerBits::PM_DELTA_ANGLES;
    }
    if to.view_angles != from.view_angles {
        bits |= PlayerBits::VIEW_ANGLES;
    }

    bits.write(msg);

    if bits.has(PlayerBits::PM_TYPE) {
        msg.write_u8(to.pmove.pm_type);
    }

    if bits.has(PlayerBits::PM_ORIGIN) {
        msg.write_i16(to.pmove.origin[0]);
        msg.write_i16(to.pmove.origin[1]);
        msg.write_i16(to.pmove.origin[2]);
    }

    if bits.has(PlayerBits::PM_VELOCITY) {
        msg.write_i16(to.pmove.velocity[0]);
        msg.write_i16(to.pmove.velocity[1]);
        msg.write_i16(to.pmove.velocity[2]);
    }

    if bits.has(PlayerBits::PM_TIME) {
        msg.write_u8(to.pmove.pm_time);
    }

    if bits.has(PlayerBits::PM_FLAGS) {
        msg.write_i16(to.pmove.pm_flags as i16);
    }

    if bits.has(PlayerBits::PM_DELTA_ANGLES) {
        msg.write_i16(to.pmove.delta_angles[0]);
        msg.write_i16(to.pmove.delta_angles[1]);
        msg.write_i16(to.pmove.delta_angles[2]);
    }

    if bits.has(PlayerBits::VIEW_ANGLES) {
        msg.write_angle16(to.view_angles[0]);
        msg.write_angle16(to.view_angles[1]);
        msg.write_angle16(to.view_angles[2]);
    }

    let mut stat_bits: i32 = 0;
    for i in 0..MAX_STATS {
        if to.stats[i] != from.stats[i] {
            stat_bits |= 1 << i;
        }
    }
    msg.write_i32(stat_bits);
    for i in 0..MAX_STATS {
        if (stat_bits & (1 << i)) != 0 {
            msg.write_i16(to.stats[i]);
        }
    }
}
