//! Scenario generation and benchmarking for the qsnap codec.
//!
//! This crate provides:
//!
//! - A deterministic server simulation (movement, bursts, animation)
//! - Frame emission against the last acknowledged snapshot
//! - Shared scenario plumbing for the simbench binary and benches
//!
//! # Design Principles
//!
//! - **Reproducible** - All scenarios are deterministic given a seed.
//! - **Realistic** - Scenarios model real FPS game patterns.
//! - **Measurable** - Output format suitable for CI regression tracking.

use codec::{emit_baseline, emit_frame, ClientSession, EntityState, PlayerState};
use msg::{MsgReader, MsgWriter, ANGLE16_UNIT, ANGLE_UNIT, COORD_UNIT};
use wire::{EntityEffects, FrameHeader, EVENT_FOOTSTEP, MAX_AREA_BYTES, MAX_SNAPSHOT_ENTITIES};

// Positions and velocities are simulated in eighth-unit fixed point so every
// value survives the wire exactly.
const POS_Q_LIMIT: i32 = 32_000;
const VEL_Q_LIMIT: i32 = 400;

/// Scenario parameters.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// Number of simulated entities, capped at the snapshot limit.
    pub entities: u16,
    /// RNG seed.
    pub seed: u64,
    /// Fire a dense burst of changes every N ticks.
    pub burst_every: Option<u32>,
    /// Server frame rate used for timestamps.
    pub server_hz: u16,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            entities: 16,
            seed: 1,
            burst_every: None,
            server_hz: 20,
        }
    }
}

/// Deterministic linear congruential generator.
pub struct Rng {
    state: u64,
}

impl Rng {
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1);
        (self.state >> 32) as u32
    }

    pub fn range_i32(&mut self, min: i32, max: i32) -> i32 {
        let span = (max - min).unsigned_abs().max(1) + 1;
        let value = self.next_u32() % span;
        min + value as i32
    }
}

#[derive(Debug, Clone, Copy)]
struct SimEntity {
    number: u16,
    pos_q: [i32; 3],
    vel_q: [i32; 3],
    yaw_bin: u8,
    anim_frame: u8,
    skin: u16,
    rotating: bool,
    event: u8,
}

impl SimEntity {
    fn to_state(self) -> EntityState {
        let mut state = EntityState::default();
        state.number = self.number;
        state.model_index = 1 + (self.number % 3) as u8;
        state.frame = self.anim_frame;
        state.skin = self.skin;
        state.origin = [
            self.pos_q[0] as f32 * COORD_UNIT,
            self.pos_q[1] as f32 * COORD_UNIT,
            self.pos_q[2] as f32 * COORD_UNIT,
        ];
        state.angles = [0.0, f32::from(self.yaw_bin) * ANGLE_UNIT, 0.0];
        if self.rotating {
            state.effects = EntityEffects::ROTATE;
        }
        state.event = self.event;
        state
    }
}

/// A simulated server: steps a small world and emits frame messages against
/// the last acknowledged snapshot.
pub struct SimServer {
    rng: Rng,
    config: SimConfig,
    entities: Vec<SimEntity>,
    baselines: Vec<EntityState>,
    ps: PlayerState,
    frame: i32,
    acked: Option<(i32, Vec<EntityState>, PlayerState)>,
}

impl SimServer {
    #[must_use]
    pub fn new(config: SimConfig) -> Self {
        let count = config.entities.clamp(1, MAX_SNAPSHOT_ENTITIES as u16);
        let mut rng = Rng::new(config.seed);

        let mut entities = Vec::with_capacity(usize::from(count));
        for number in 1..=count {
            entities.push(SimEntity {
                number,
                pos_q: [
                    rng.range_i32(-POS_Q_LIMIT / 2, POS_Q_LIMIT / 2),
                    rng.range_i32(-POS_Q_LIMIT / 2, POS_Q_LIMIT / 2),
                    rng.range_i32(-POS_Q_LIMIT / 2, POS_Q_LIMIT / 2),
                ],
                vel_q: [
                    rng.range_i32(-VEL_Q_LIMIT / 4, VEL_Q_LIMIT / 4),
                    rng.range_i32(-VEL_Q_LIMIT / 4, VEL_Q_LIMIT / 4),
                    rng.range_i32(-VEL_Q_LIMIT / 4, VEL_Q_LIMIT / 4),
                ],
                yaw_bin: (rng.next_u32() % 256) as u8,
                anim_frame: 0,
                skin: 0,
                rotating: false,
                event: 0,
            });
        }

        let mut baselines = vec![EntityState::default(); usize::from(count) + 1];
        for entity in &entities {
            baselines[usize::from(entity.number)] = entity.to_state();
        }

        Self {
            rng,
            config,
            entities,
            baselines,
            ps: PlayerState::default(),
            frame: 0,
            acked: None,
        }
    }

    #[must_use]
    pub const fn frame(&self) -> i32 {
        self.frame
    }

    #[must_use]
    pub const fn player(&self) -> &PlayerState {
        &self.ps
    }

    #[must_use]
    pub fn world_run(&self) -> Vec<EntityState> {
        self.entities
            .iter()
            .map(|entity| entity.to_state())
            .collect()
    }

    /// Feeds the server rate and all spawn baselines into a fresh session.
    pub fn seed_session(&self, session: &mut ClientSession) -> codec::CodecResult<()> {
        session.set_server_rate(self.config.server_hz);
        for entity in &self.entities {
            let mut msg = MsgWriter::new();
            emit_baseline(&mut msg, &self.baselines[usize::from(entity.number)]);
            let bytes = msg.finish();
            session.parse_baseline(&mut MsgReader::new(&bytes))?;
        }
        Ok(())
    }

    /// Advances the simulation one tick.
    pub fn step(&mut self) {
        self.frame += 1;
        let burst_now = self
            .config
            .burst_every
            .is_some_and(|every| every > 0 && self.frame as u32 % every == 0);

        for entity in &mut self.entities {
            entity.event = 0;
            for axis in 0..3 {
                if self.rng.next_u32() % 20 == 0 {
                    let kick = self.rng.range_i32(-50, 50);
                    entity.vel_q[axis] =
                        (entity.vel_q[axis] + kick).clamp(-VEL_Q_LIMIT, VEL_Q_LIMIT);
                }
                entity.pos_q[axis] =
                    (entity.pos_q[axis] + entity.vel_q[axis]).clamp(-POS_Q_LIMIT, POS_Q_LIMIT);
                if entity.pos_q[axis].abs() == POS_Q_LIMIT {
                    entity.vel_q[axis] = -entity.vel_q[axis];
                }
            }
            entity.yaw_bin = entity
                .yaw_bin
                .wrapping_add((self.rng.next_u32() % 13) as u8);
            if burst_now {
                entity.anim_frame = entity.anim_frame.wrapping_add(1);
                entity.skin ^= 1;
                entity.yaw_bin = entity.yaw_bin.wrapping_add(97);
                entity.event = EVENT_FOOTSTEP;
            }
            if self.rng.next_u32() % 50 == 0 {
                entity.rotating = !entity.rotating;
            }
        }

        let axis = (self.rng.next_u32() % 3) as usize;
        self.ps.pmove.origin[axis] = self.ps.pmove.origin[axis].wrapping_add(8);
        self.ps.view_angles[1] = f32::from(self.rng.next_u32() as i16) * ANGLE16_UNIT;
        if self.rng.next_u32() % 4 == 0 {
            let stat = (self.rng.next_u32() % 32) as usize;
            self.ps.stats[stat] = self.rng.next_u32() as i16;
        }
    }

    /// Emits the current frame against the last acknowledged snapshot, or a
    /// keyframe when nothing has been acknowledged yet.
    #[must_use]
    pub fn emit(&self) -> Vec<u8> {
        let run = self.world_run();
        let (delta_frame, from_run, from_ps) = match &self.acked {
            Some((frame, run, ps)) => (*frame, run.as_slice(), *ps),
            None => (-1, &[][..], PlayerState::default()),
        };

        let mut header = FrameHeader {
            server_frame: self.frame,
            delta_frame,
            suppress_count: 0,
            area_len: 1,
            area_bits: [0; MAX_AREA_BYTES],
        };
        header.area_bits[0] = 0x01;

        let mut writer = MsgWriter::new();
        emit_frame(
            &mut writer,
            &header,
            &from_ps,
            &self.ps,
            from_run,
            &run,
            &self.baselines,
        );
        writer.finish()
    }

    /// Marks the current frame as acknowledged by the client.
    pub fn ack(&mut self) {
        self.acked = Some((self.frame, self.world_run(), self.ps));
    }
}
