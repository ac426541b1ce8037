//! Entity delta records: field masks and record headers.

use std::ops::{BitOr, BitOrAssign};

use msg::{MsgReader, MsgResult, MsgWriter};

/// Field presence mask for one entity delta record.
///
/// The first mask byte always travels. Each `MORE_*` bit pulls in one further
/// mask byte, so a record spends only as many header bytes as its highest
/// changed field requires. Bytes accumulate little-endian into a `u32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EntityBits(u32);

impl EntityBits {
    // First byte: the most volatile fields, cheap to send alone.
    pub const ORIGIN_X: Self = Self(1 << 0);
    pub const ORIGIN_Y: Self = Self(1 << 1);
    pub const ANGLE_YAW: Self = Self(1 << 2);
    pub const ANGLE_ROLL: Self = Self(1 << 3);
    pub const FRAME: Self = Self(1 << 4);
    pub const EVENT: Self = Self(1 << 5);
    pub const REMOVE: Self = Self(1 << 6);
    pub const MORE_1: Self = Self(1 << 7);

    // Second byte.
    pub const NUMBER16: Self = Self(1 << 8);
    pub const ORIGIN_Z: Self = Self(1 << 9);
    pub const ANGLE_PITCH: Self = Self(1 << 10);
    pub const MODEL: Self = Self(1 << 11);
    pub const MODEL2: Self = Self(1 << 12);
    pub const EFFECTS8: Self = Self(1 << 13);
    pub const SOUND: Self = Self(1 << 14);
    pub const MORE_2: Self = Self(1 << 15);

    // Third byte.
    pub const SKIN8: Self = Self(1 << 16);
    pub const EFFECTS16: Self = Self(1 << 17);
    pub const MODEL3: Self = Self(1 << 18);
    pub const MODEL4: Self = Self(1 << 19);
    pub const SOLID: Self = Self(1 << 20);
    pub const MORE_3: Self = Self(1 << 23);

    // Fourth byte.
    pub const OLD_ORIGIN: Self = Self(1 << 24);
    pub const SKIN16: Self = Self(1 << 25);

    /// Creates an empty mask.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Creates a mask from raw bits.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw mask bits.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns `true` if no field bits are set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if `flag` is set.
    #[must_use]
    pub const fn has(self, flag: Self) -> bool {
        self.0 & flag.0 != 0
    }

    /// Reads a mask, following the extension flags byte by byte.
    pub fn read(msg: &mut MsgReader<'_>) -> MsgResult<Self> {
        let mut bits = u32::from(msg.read_u8()?);
        if bits & Self::MORE_1.0 != 0 {
            bits |= u32::from(msg.read_u8()?) << 8;
        }
        if bits & Self::MORE_2.0 != 0 {
            bits |= u32::from(msg.read_u8()?) << 16;
        }
        if bits & Self::MORE_3.0 != 0 {
            bits |= u32::from(msg.read_u8()?) << 24;
        }
        Ok(Self(bits))
    }

    /// Writes the mask, setting extension flags for every populated byte.
    pub fn write(self, msg: &mut MsgWriter) {
        let mut bits = self.0;
        if bits & 0xFF00_0000 != 0 {
            bits |= Self::MORE_3.0 | Self::MORE_2.0 | Self::MORE_1.0;
        } else if bits & 0x00FF_0000 != 0 {
            bits |= Self::MORE_2.0 | Self::MORE_1.0;
        } else if bits & 0x0000_FF00 != 0 {
            bits |= Self::MORE_1.0;
        }

        msg.write_u8(bits as u8);
        if bits & Self::MORE_1.0 != 0 {
            msg.write_u8((bits >> 8) as u8);
        }
        if bits & Self::MORE_2.0 != 0 {
            msg.write_u8((bits >> 16) as u8);
        }
        if bits & Self::MORE_3.0 != 0 {
            msg.write_u8((bits >> 24) as u8);
        }
    }
}

impl BitOr for EntityBits {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for EntityBits {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Reads an entity record header: field mask plus entity number.
///
/// The number travels as one byte unless [`EntityBits::NUMBER16`] widens it
/// to a 16-bit integer. A header of two zero bytes (empty mask, number 0)
/// terminates the entity run.
pub fn read_entity_header(msg: &mut MsgReader<'_>) -> MsgResult<(EntityBits, u16)> {
    let bits = EntityBits::read(msg)?;
    let number = if bits.has(EntityBits::NUMBER16) {
        msg.read_i16()? as u16
    } else {
        u16::from(msg.read_u8()?)
    };
    Ok((bits, number))
}

/// Writes an entity record header, widening the number field as needed.
pub fn write_entity_header(msg: &mut MsgWriter, bits: EntityBits, number: u16) {
    let bits = if number > 0xFF {
        bits | EntityBits::NUMBER16
    } else {
        bits
    };
    bits.write(msg);
    if bits.has(EntityBits::NUMBER16) {
        msg.write_i16(number as i16);
    } else {
        msg.write_u8(number as u8);
    }
}

/// Renderer-facing effect flags carried in an entity state.
///
/// The codec only interprets [`BEAM`](Self::BEAM); the rest pass through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EntityEffects(u16);

impl EntityEffects {
    pub const ROTATE: Self = Self(1 << 0);
    pub const BOB: Self = Self(1 << 1);
    pub const PULSE: Self = Self(1 << 2);
    pub const ANIMATE: Self = Self(1 << 3);
    pub const ANIMATE_FAST: Self = Self(1 << 4);
    /// The entity is a beam: `old_origin` is its far endpoint, not a
    /// previous position, and must never be backfilled from the base.
    pub const BEAM: Self = Self(1 << 5);

    /// Creates effects from raw bits.
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Returns the raw effect bits.
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Returns `true` if no effects are set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if all bits of `other` are set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if the beam flag is set.
    #[must_use]
    pub const fn is_beam(self) -> bool {
        self.contains(Self::BEAM)
    }
}

impl BitOr for EntityEffects {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

// Entity event codes. Events fire for exactly one snapshot; an absent EVENT
// field decodes as EVENT_NONE regardless of the base state.
pub const EVENT_NONE: u8 = 0;
pub const EVENT_ITEM_RESPAWN: u8 = 1;
pub const EVENT_FOOTSTEP: u8 = 2;
pub const EVENT_FALL_SHORT: u8 = 3;
pub const EVENT_FALL: u8 = 4;
pub const EVENT_FALL_FAR: u8 = 5;
pub const EVENT_TELEPORT: u8 = 6;
