//! Player state presence mask.

use std::ops::{BitOr, BitOrAssign};

use msg::{MsgReader, MsgResult, MsgWriter};

/// Presence mask for the player state groups of a frame.
///
/// A single byte; each bit announces one group of fields. Player stats are
/// not covered here; they follow the groups under their own 32-bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PlayerBits(u8);

impl PlayerBits {
    pub const PM_TYPE: Self = Self(1 << 0);
    pub const PM_ORIGIN: Self = Self(1 << 1);
    pub const PM_VELOCITY: Self = Self(1 << 2);
    pub const PM_TIME: Self = Self(1 << 3);
    pub const PM_FLAGS: Self = Self(1 << 4);
    pub const PM_DELTA_ANGLES: Self = Self(1 << 5);
    pub const VIEW_ANGLES: Self = Self(1 << 6);

    /// Creates an empty mask.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Creates a mask from a raw byte.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// Returns the raw mask byte.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Returns `true` if no groups are present.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if `flag` is set.
    #[must_use]
    pub const fn has(self, flag: Self) -> bool {
        self.0 & flag.0 != 0
    }

    /// Reads the presence byte.
    pub fn read(msg: &mut MsgReader<'_>) -> MsgResult<Self> {
        Ok(Self(msg.read_u8()?))
    }

    /// Writes the presence byte.
    pub fn write(self, msg: &mut MsgWriter) {
        msg.write_u8(self.0);
    }
}

impl BitOr for PlayerBits {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for PlayerBits {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

// Movement kinds carried in the PM_TYPE group. Unknown values pass through
// to the consumer untouched.
pub const PM_NORMAL: u8 = 0;
pub const PM_SPECTATOR: u8 = 1;
pub const PM_DEAD: u8 = 2;
pub const PM_FREEZE: u8 = 3;
