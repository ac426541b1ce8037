//! Core state types reconstructed by the codec.

use msg::COORD_UNIT;
use wire::{EntityEffects, MAX_AREA_BYTES, MAX_STATS};

/// The replicated state of one entity at one server frame.
///
/// Field widths match their wire encodings: what cannot travel is not
/// stored. Coordinates and angles are kept as decoded `f32` world values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EntityState {
    /// Entity number, `1..MAX_ENTITIES`. Zero means "no entity".
    pub number: u16,
    pub model_index: u8,
    pub model_index2: u8,
    pub model_index3: u8,
    pub model_index4: u8,
    /// Animation frame.
    pub frame: u8,
    pub skin: u16,
    pub effects: EntityEffects,
    pub origin: [f32; 3],
    /// Euler angles in degrees, ordered pitch, yaw, roll.
    pub angles: [f32; 3],
    /// Previous-frame origin for most entities; the far endpoint for beams.
    pub old_origin: [f32; 3],
    pub sound: u8,
    /// One-shot event code, cleared every snapshot it is not re-sent.
    pub event: u8,
    pub solid: u16,
}

/// Movement state replicated for the local player.
///
/// Positions and velocities stay in their fixed-point eighth-unit wire form
/// so prediction code can run exact integer math on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PmoveState {
    pub pm_type: u8,
    pub origin: [i16; 3],
    pub velocity: [i16; 3],
    pub pm_time: u8,
    pub pm_flags: u16,
    /// Offsets the server applies to the client's view angles, in
    /// high-resolution angle steps.
    pub delta_angles: [i16; 3],
}

impl PmoveState {
    /// Returns the origin converted to world units.
    #[must_use]
    pub fn origin_world(&self) -> [f32; 3] {
        [
            f32::from(self.origin[0]) * COORD_UNIT,
            f32::from(self.origin[1]) * COORD_UNIT,
            f32::from(self.origin[2]) * COORD_UNIT,
        ]
    }
}

/// The full player state carried by each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerState {
    pub pmove: PmoveState,
    /// View angles in degrees, ordered pitch, yaw, roll.
    pub view_angles: [f32; 3],
    /// HUD and game stats, addressed by the frame's stat mask.
    pub stats: [i16; MAX_STATS],
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            pmove: PmoveState::default(),
            view_angles: [0.0; 3],
            stats: [0; MAX_STATS],
        }
    }
}

/// One reconstructed frame: header fields plus the decoded player state and
/// the location of its entity run in the history arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    /// `false` when the frame was decoded against a reference this client
    /// no longer holds; such snapshots are stored but never surfaced.
    pub valid: bool,
    pub server_frame: i32,
    /// Frame this one was delta-compressed against; zero or negative for
    /// keyframes.
    pub delta_frame: i32,
    /// Server time of this frame in milliseconds.
    pub server_time: u32,
    /// Messages the server rate-suppressed since the previous frame.
    pub suppress_count: u8,
    /// Area visibility bits, zero-padded.
    pub area_bits: [u8; MAX_AREA_BYTES],
    pub ps: PlayerState,
    /// Number of entities in this snapshot.
    pub num_entities: u16,
    /// Unmasked arena cursor of this snapshot's first entity.
    pub first_entity: u32,
}

impl Snapshot {
    /// Returns `true` if this frame carried no delta reference.
    #[must_use]
    pub const fn is_keyframe(&self) -> bool {
        self.delta_frame <= 0
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            valid: false,
            server_frame: 0,
            delta_frame: 0,
            server_time: 0,
            suppress_count: 0,
            area_bits: [0; MAX_AREA_BYTES],
            ps: PlayerState::default(),
            num_entities: 0,
            first_entity: 0,
        }
    }
}
