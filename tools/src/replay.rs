//! Replays a capture through a client session.
//!
//! Unlike [`crate::inspect_capture`], this path exercises the real decoder:
//! baselines seed the entity table, frames run through delta reconstruction,
//! and the report carries the reconstructed snapshots, invalid ones included.

use anyhow::{bail, Context, Result};
use codec::{ClientSession, FrameStatus, Snapshot};
use log::debug;
use msg::MsgReader;
use serde::Serialize;
use wire::read_frame_header;

use crate::capture::{CaptureReader, ServerCommand};

/// Reconstructed state for one capture stream.
#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub server_rate: u16,
    pub baselines: usize,
    pub frames: Vec<FrameReplay>,
}

/// Reconstructed state for one frame.
#[derive(Debug, Serialize)]
pub struct FrameReplay {
    pub server_frame: i32,
    pub delta_frame: i32,
    pub server_time: u32,
    pub status: &'static str,
    pub suppress_count: u8,
    pub entities: Vec<EntityReplay>,
    pub player: PlayerReplay,
}

#[derive(Debug, Serialize)]
pub struct EntityReplay {
    pub number: u16,
    pub model_index: u8,
    pub frame: u8,
    pub skin: u16,
    pub effects: u16,
    pub origin: [f32; 3],
    pub angles: [f32; 3],
    pub event: u8,
}

#[derive(Debug, Serialize)]
pub struct PlayerReplay {
    pub pm_type: u8,
    pub origin: [f32; 3],
    pub view_angles: [f32; 3],
    pub stats: [i16; 32],
}

const fn status_name(status: FrameStatus) -> &'static str {
    match status {
        FrameStatus::Valid => "valid",
        FrameStatus::Invalid => "invalid",
        FrameStatus::NeedReconnect => "need_reconnect",
    }
}

/// Replays a complete capture stream.
pub fn replay_capture(bytes: &[u8]) -> Result<ReplayReport> {
    let mut capture = CaptureReader::new(bytes);
    let mut session = ClientSession::new();
    let mut report = ReplayReport {
        server_rate: 0,
        baselines: 0,
        frames: Vec::new(),
    };

    while let Some((command, payload)) = capture.next_block()? {
        match command {
            ServerCommand::ServerInfo => {
                let mut msg = MsgReader::new(payload);
                let rate = msg.read_i16().context("server info block")? as u16;
                session.set_server_rate(rate);
                report.server_rate = rate;
            }
            ServerCommand::Baseline => {
                let mut msg = MsgReader::new(payload);
                session
                    .parse_baseline(&mut msg)
                    .context("baseline block")?;
                report.baselines += 1;
            }
            ServerCommand::Frame => {
                let header = read_frame_header(&mut MsgReader::new(payload))
                    .context("frame header")?;

                let mut msg = MsgReader::new(payload);
                let status = session
                    .parse_frame(&mut msg)
                    .with_context(|| format!("frame {}", header.server_frame))?;
                if status == FrameStatus::NeedReconnect {
                    bail!(
                        "frame {} arrived before a server info block",
                        header.server_frame
                    );
                }

                let Some(snapshot) = session.get_snapshot(header.server_frame).copied() else {
                    bail!(
                        "frame {} missing from history after parse",
                        header.server_frame
                    );
                };
                debug!(
                    "frame {} ({}): {} entities",
                    header.server_frame,
                    status_name(status),
                    snapshot.num_entities
                );
                report.frames.push(frame_replay(&session, &snapshot, status));
            }
        }
    }

    Ok(report)
}

fn frame_replay(session: &ClientSession, snapshot: &Snapshot, status: FrameStatus) -> FrameReplay {
    let entities = session
        .snapshot_entities(snapshot)
        .map(|state| EntityReplay {
            number: state.number,
            model_index: state.model_index,
            frame: state.frame,
            skin: state.skin,
            effects: state.effects.raw(),
            origin: state.origin,
            angles: state.angles,
            event: state.event,
        })
        .collect();

    FrameReplay {
        server_frame: snapshot.server_frame,
        delta_frame: snapshot.delta_frame,
        server_time: snapshot.server_time,
        status: status_name(status),
        suppress_count: snapshot.suppress_count,
        entities,
        player: PlayerReplay {
            pm_type: snapshot.ps.pmove.pm_type,
            origin: snapshot.ps.pmove.origin_world(),
            view_angles: snapshot.ps.view_angles,
            stats: snapshot.ps.stats,
        },
    }
}
