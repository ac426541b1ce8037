//! World entity table.
//!
//! One slot per addressable entity number, holding the server baseline, the
//! two most recent states for interpolation and the animation markers. The
//! table persists across snapshots; slots for entities absent from the
//! current snapshot simply stop advancing.

use wire::{EVENT_TELEPORT, MAX_ENTITIES};

use crate::types::EntityState;

/// Origin step, in world units per axis, beyond which interpolation is
/// suppressed and the entity snaps.
pub const DISCONTINUITY_THRESHOLD: f32 = 512.0;

/// Returns `true` if interpolating from `old` to `new` would be wrong:
/// a model swap, a teleport event or an origin step larger than
/// [`DISCONTINUITY_THRESHOLD`].
#[must_use]
pub fn is_discontinuous(old: &EntityState, new: &EntityState) -> bool {
    if new.model_index != old.model_index
        || new.model_index2 != old.model_index2
        || new.model_index3 != old.model_index3
        || new.model_index4 != old.model_index4
    {
        return true;
    }

    if new.event == EVENT_TELEPORT {
        return true;
    }

    (new.origin[0] - old.origin[0]).abs() > DISCONTINUITY_THRESHOLD
        || (new.origin[1] - old.origin[1]).abs() > DISCONTINUITY_THRESHOLD
        || (new.origin[2] - old.origin[2]).abs() > DISCONTINUITY_THRESHOLD
}

/// One entity's slot in the world table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entity {
    baseline: EntityState,
    current: EntityState,
    prev: EntityState,
    frame_num: i32,
    anim_time: u32,
    anim_frame: u8,
}

impl Entity {
    /// The server-sent spawn state entering deltas decode against.
    #[must_use]
    pub const fn baseline(&self) -> &EntityState {
        &self.baseline
    }

    /// The state from the most recent snapshot that carried this entity.
    #[must_use]
    pub const fn current(&self) -> &EntityState {
        &self.current
    }

    /// The interpolation partner of [`Entity::current`].
    ///
    /// After a gap or a discontinuity this duplicates `current` (with its
    /// origin rewound to `old_origin`), which turns the render lerp into a
    /// snap.
    #[must_use]
    pub const fn previous(&self) -> &EntityState {
        &self.prev
    }

    /// The last server frame that updated this slot.
    #[must_use]
    pub const fn frame_num(&self) -> i32 {
        self.frame_num
    }

    /// Returns `true` if the slot was updated by `server_frame`.
    #[must_use]
    pub const fn in_frame(&self, server_frame: i32) -> bool {
        self.frame_num == server_frame
    }

    /// Server time at which the animation frame last changed.
    #[must_use]
    pub const fn anim_time(&self) -> u32 {
        self.anim_time
    }

    /// Animation frame that was current before the last change.
    #[must_use]
    pub const fn anim_frame(&self) -> u8 {
        self.anim_frame
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self {
            baseline: EntityState::default(),
            current: EntityState::default(),
            prev: EntityState::default(),
            // Fresh slots must not pair with a phantom previous frame.
            frame_num: -1,
            anim_time: 0,
            anim_frame: 0,
        }
    }
}

/// Table of all entity slots, indexed by entity number.
#[derive(Debug, Clone)]
pub struct EntityTable {
    slots: Vec<Entity>,
}

impl EntityTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: vec![Entity::default(); usize::from(MAX_ENTITIES)],
        }
    }

    /// Returns the slot for `number`, or `None` if out of table range.
    #[must_use]
    pub fn get(&self, number: u16) -> Option<&Entity> {
        self.slots.get(usize::from(number))
    }

    /// Installs a spawn baseline. The caller has validated `number`.
    pub(crate) fn set_baseline(&mut self, number: u16, state: EntityState) {
        self.slots[usize::from(number)].baseline = state;
    }

    /// Copies out the baseline for `number`. The caller has validated it.
    pub(crate) fn baseline_state(&self, number: u16) -> EntityState {
        self.slots[usize::from(number)].baseline
    }

    /// Applies a freshly decoded state to its slot.
    ///
    /// Consecutive-frame updates without a discontinuity shuffle `current`
    /// into `prev` so the pair brackets one server frame; anything else
    /// duplicates the new state and rewinds its origin, making interpolation
    /// start from `old_origin`.
    pub(crate) fn update(&mut self, state: EntityState, server_frame: i32, server_time: u32) {
        let ent = &mut self.slots[usize::from(state.number)];

        if ent.frame_num == server_frame - 1 && !is_discontinuous(&ent.current, &state) {
            ent.prev = ent.current;
        } else {
            ent.prev = state;
            ent.prev.origin = state.old_origin;
        }

        ent.frame_num = server_frame;
        ent.current = state;

        if ent.current.frame != ent.prev.frame {
            ent.anim_time = server_time;
            ent.anim_frame = ent.prev.frame;
        }
    }
}

impl Default for EntityTable {
    fn default() -> Self {
        Self::new()
    }
}
