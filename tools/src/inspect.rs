//! Structure inspection for capture streams.
//!
//! Walks every block without maintaining session state, so it works on
//! captures whose reference frames are missing or damaged. Field values are
//! not reported, only where the bytes went.

use anyhow::{Context, Result};
use codec::{decode_entity_delta, decode_player_state, EntityState, PlayerState};
use msg::MsgReader;
use serde::Serialize;
use wire::{read_entity_header, read_frame_header, EntityBits};

use crate::capture::{CaptureReader, ServerCommand};

/// Byte accounting for one capture stream.
#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub total_bytes: usize,
    pub server_rate: Option<u16>,
    pub baseline_count: usize,
    pub frames: Vec<FrameInspect>,
}

/// Byte accounting for one frame block.
#[derive(Debug, Serialize)]
pub struct FrameInspect {
    pub server_frame: i32,
    pub delta_frame: i32,
    pub keyframe: bool,
    pub suppress_count: u8,
    pub block_bytes: usize,
    pub header_bytes: usize,
    pub player_bytes: usize,
    pub records: Vec<RecordInspect>,
}

/// One entity record inside a frame block.
#[derive(Debug, Serialize)]
pub struct RecordInspect {
    pub number: u16,
    pub bits: u32,
    pub remove: bool,
    pub byte_len: usize,
}

/// Inspects a complete capture stream.
pub fn inspect_capture(bytes: &[u8]) -> Result<InspectReport> {
    let mut capture = CaptureReader::new(bytes);
    let mut report = InspectReport {
        total_bytes: bytes.len(),
        server_rate: None,
        baseline_count: 0,
        frames: Vec::new(),
    };

    while let Some((command, payload)) = capture.next_block()? {
        match command {
            ServerCommand::ServerInfo => {
                let mut msg = MsgReader::new(payload);
                report.server_rate = Some(msg.read_i16().context("server info block")? as u16);
            }
            ServerCommand::Baseline => {
                report.baseline_count += 1;
            }
            ServerCommand::Frame => {
                let frame = inspect_frame(payload)
                    .with_context(|| format!("frame block ending at offset {}", capture.offset()))?;
                report.frames.push(frame);
            }
        }
    }

    Ok(report)
}

fn inspect_frame(payload: &[u8]) -> Result<FrameInspect> {
    let mut msg = MsgReader::new(payload);
    let header = read_frame_header(&mut msg)?;
    let header_bytes = msg.position();

    // Decoding against the null state walks exactly the bytes the record
    // carries; the resulting values are not meaningful here.
    let before = msg.position();
    decode_player_state(&mut msg, &PlayerState::default())?;
    let player_bytes = msg.position() - before;

    let mut records = Vec::new();
    loop {
        let start = msg.position();
        let (bits, number) = read_entity_header(&mut msg)?;
        if number == 0 {
            break;
        }
        if !bits.has(EntityBits::REMOVE) {
            decode_entity_delta(&mut msg, &EntityState::default(), number, bits)?;
        }
        records.push(RecordInspect {
            number,
            bits: bits.raw(),
            remove: bits.has(EntityBits::REMOVE),
            byte_len: msg.position() - start,
        });
    }

    Ok(FrameInspect {
        server_frame: header.server_frame,
        delta_frame: header.delta_frame,
        keyframe: header.is_keyframe(),
        suppress_count: header.suppress_count,
        block_bytes: payload.len(),
        header_bytes,
        player_bytes,
        records,
    })
}

/// Names the bits set in an entity record header, wire order.
#[must_use]
pub fn describe_bits(bits: EntityBits) -> String {
    const NAMES: &[(EntityBits, &str)] = &[
        (EntityBits::REMOVE, "remove"),
        (EntityBits::MODEL, "model"),
        (EntityBits::MODEL2, "model2"),
        (EntityBits::MODEL3, "model3"),
        (EntityBits::MODEL4, "model4"),
        (EntityBits::FRAME, "frame"),
        (EntityBits::SKIN8, "skin8"),
        (EntityBits::SKIN16, "skin16"),
        (EntityBits::EFFECTS8, "effects8"),
        (EntityBits::EFFECTS16, "effects16"),
        (EntityBits::ORIGIN_X, "origin_x"),
        (EntityBits::ORIGIN_Y, "origin_y"),
        (EntityBits::ORIGIN_Z, "origin_z"),
        (EntityBits::ANGLE_PITCH, "angle_pitch"),
        (EntityBits::ANGLE_YAW, "angle_yaw"),
        (EntityBits::ANGLE_ROLL, "angle_roll"),
        (EntityBits::OLD_ORIGIN, "old_origin"),
        (EntityBits::SOUND, "sound"),
        (EntityBits::EVENT, "event"),
        (EntityBits::SOLID, "solid"),
    ];

    let mut names = Vec::new();
    for (bit, name) in NAMES {
        if bits.has(*bit) {
            names.push(*name);
        }
    }
    names.join(" ")
}
