use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use codec::{ClientSession, EntityState, FrameStatus};
use msg::{MsgReader, MsgWriter};
use serde::Serialize;
use simbench::{SimConfig, SimServer};
use wire::MAX_MSG_LEN;

#[derive(Parser)]
#[command(
    name = "simbench",
    version,
    about = "qsnap simulation benchmark harness"
)]
struct Cli {
    /// Number of simulated entities.
    #[arg(long, default_value_t = 16)]
    entities: u16,
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 300)]
    ticks: u32,
    /// RNG seed for deterministic results.
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Optional burst event cadence.
    #[arg(long)]
    burst_every: Option<u32>,
    /// Output directory for summary.json.
    #[arg(long, default_value = "target/simbench")]
    out_dir: PathBuf,
    /// Fail if p95 delta frame size exceeds this value.
    #[arg(long)]
    max_p95_delta_bytes: Option<u64>,
    /// Fail if average delta frame size exceeds this value.
    #[arg(long)]
    max_avg_delta_bytes: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("create output dir {}", cli.out_dir.display()))?;

    let config = SimConfig {
        entities: cli.entities,
        seed: cli.seed,
        burst_every: cli.burst_every,
        ..SimConfig::default()
    };
    let mut server = SimServer::new(config);
    let mut session = ClientSession::new();
    server.seed_session(&mut session).context("seed session")?;

    let mut summary = Summary::new(&cli);

    for tick in 1..=cli.ticks {
        server.step();

        let start = Instant::now();
        let bytes = server.emit();
        let encode_elapsed = start.elapsed();

        let start = Instant::now();
        let status = session
            .parse_frame(&mut MsgReader::new(&bytes))
            .context("parse frame")?;
        let decode_elapsed = start.elapsed();

        if status != FrameStatus::Valid {
            anyhow::bail!("frame {} did not validate", server.frame());
        }
        verify_tick(&session, &server)?;

        let run = server.world_run();
        summary.full_bincode_bytes_total += encode_bincode_run(&run)? as u64;

        if tick == 1 {
            summary.full_bytes_total += bytes.len() as u64;
            summary.full_count += 1;
        } else {
            summary.delta_bytes_total += bytes.len() as u64;
            summary.delta_count += 1;
            summary.delta_sizes.push(bytes.len() as u64);
            summary.encode_us.push(encode_elapsed.as_micros() as u64);
            summary.decode_us.push(decode_elapsed.as_micros() as u64);
            summary.delta_naive_bytes_total += encode_naive_delta(&summary.prev_run, &run) as u64;
        }

        summary.prev_run = run;
        server.ack();
    }

    summary.finalize();
    summary.assert_budgets(cli.max_p95_delta_bytes, cli.max_avg_delta_bytes)?;
    write_summary_json(&cli.out_dir, &summary)?;

    // Frames that blow the transport budget would fragment on the real wire.
    if summary.p95_delta_bytes > MAX_MSG_LEN as u64 {
        anyhow::bail!(
            "p95 delta bytes {} exceeds transport budget {}",
            summary.p95_delta_bytes,
            MAX_MSG_LEN
        );
    }

    Ok(())
}

fn verify_tick(session: &ClientSession, server: &SimServer) -> Result<()> {
    let snapshot = session.snapshot();
    let want = server.world_run();
    if usize::from(snapshot.num_entities) != want.len() {
        anyhow::bail!("entity count diverged at frame {}", server.frame());
    }
    for (mut client, want) in session.snapshot_entities(snapshot).zip(want) {
        // The decoder rebuilds old_origin from the reference run; the sim
        // does not model it.
        client.old_origin = [0.0; 3];
        if client != want {
            anyhow::bail!("entity {} diverged at frame {}", want.number, server.frame());
        }
    }
    if snapshot.ps != *server.player() {
        anyhow::bail!("player state diverged at frame {}", server.frame());
    }
    Ok(())
}

fn write_summary_json(out_dir: &Path, summary: &Summary) -> Result<()> {
    let path = out_dir.join("summary.json");
    let contents = serde_json::to_string_pretty(summary).context("serialize summary")?;
    fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn encode_bincode_run(run: &[EntityState]) -> Result<usize> {
    let snapshot = SerdeRun {
        entities: run
            .iter()
            .map(|state| SerdeEntity {
                number: state.number,
                model_index: state.model_index,
                frame: state.frame,
                skin: state.skin,
                effects: state.effects.raw(),
                origin: state.origin,
                angles: state.angles,
                event: state.event,
                solid: state.solid,
            })
            .collect(),
    };
    let bytes = bincode::serialize(&snapshot).context("bincode run")?;
    Ok(bytes.len())
}

// Field masks are the whole trick; this measures what a maskless codec would
// pay for the same changes.
fn encode_naive_delta(from: &[EntityState], to: &[EntityState]) -> usize {
    let mut writer = MsgWriter::new();
    for state in to {
        let unchanged = from
            .iter()
            .find(|old| old.number == state.number)
            .is_some_and(|old| old == state);
        if unchanged {
            continue;
        }
        write_full_state(&mut writer, state);
    }
    for old in from {
        if !to.iter().any(|state| state.number == old.number) {
            writer.write_i16(old.number as i16);
        }
    }
    writer.finish().len()
}

fn write_full_state(writer: &mut MsgWriter, state: &EntityState) {
    writer.write_i16(state.number as i16);
    writer.write_u8(state.model_index);
    writer.write_u8(state.model_index2);
    writer.write_u8(state.model_index3);
    writer.write_u8(state.model_index4);
    writer.write_u8(state.frame);
    writer.write_i16(state.skin as i16);
    writer.write_i16(state.effects.raw() as i16);
    writer.write_pos(state.origin);
    writer.write_angle(state.angles[0]);
    writer.write_angle(state.angles[1]);
    writer.write_angle(state.angles[2]);
    writer.write_pos(state.old_origin);
    writer.write_u8(state.sound);
    writer.write_u8(state.event);
    writer.write_i16(state.solid as i16);
}

#[derive(Debug, Serialize)]
struct Summary {
    entities: u16,
    ticks: u32,
    seed: u64,
    burst_every: Option<u32>,
    full_count: u32,
    delta_count: u32,
    full_bytes_total: u64,
    delta_bytes_total: u64,
    full_bincode_bytes_total: u64,
    delta_naive_bytes_total: u64,
    avg_bytes_per_tick: u64,
    avg_delta_bytes: u64,
    p95_delta_bytes: u64,
    avg_full_bincode_bytes: u64,
    avg_delta_naive_bytes: u64,
    avg_encode_us: u64,
    p95_encode_us: u64,
    avg_decode_us: u64,
    p95_decode_us: u64,
    #[serde(skip)]
    delta_sizes: Vec<u64>,
    #[serde(skip)]
    encode_us: Vec<u64>,
    #[serde(skip)]
    decode_us: Vec<u64>,
    #[serde(skip)]
    prev_run: Vec<EntityState>,
}

impl Summary {
    fn new(cli: &Cli) -> Self {
        Self {
            entities: cli.entities,
            ticks: cli.ticks,
            seed: cli.seed,
            burst_every: cli.burst_every,
            full_count: 0,
            delta_count: 0,
            full_bytes_total: 0,
            delta_bytes_total: 0,
            full_bincode_bytes_total: 0,
            delta_naive_bytes_total: 0,
            avg_bytes_per_tick: 0,
            avg_delta_bytes: 0,
            p95_delta_bytes: 0,
            avg_full_bincode_bytes: 0,
            avg_delta_naive_bytes: 0,
            avg_encode_us: 0,
            p95_encode_us: 0,
            avg_decode_us: 0,
            p95_decode_us: 0,
            delta_sizes: Vec::new(),
            encode_us: Vec::new(),
            decode_us: Vec::new(),
            prev_run: Vec::new(),
        }
    }

    fn finalize(&mut self) {
        if self.ticks > 0 {
            self.avg_bytes_per_tick =
                (self.full_bytes_total + self.delta_bytes_total) / u64::from(self.ticks);
            self.avg_full_bincode_bytes = self.full_bincode_bytes_total / u64::from(self.ticks);
        }
        if self.delta_count > 0 {
            self.avg_delta_bytes = self.delta_bytes_total / u64::from(self.delta_count);
            self.p95_delta_bytes = p95(&mut self.delta_sizes);
            self.avg_delta_naive_bytes =
                self.delta_naive_bytes_total / u64::from(self.delta_count);
        }
        if !self.encode_us.is_empty() {
            let total: u64 = self.encode_us.iter().sum();
            self.avg_encode_us = total / self.encode_us.len() as u64;
            self.p95_encode_us = p95(&mut self.encode_us);
        }
        if !self.decode_us.is_empty() {
            let total: u64 = self.decode_us.iter().sum();
            self.avg_decode_us = total / self.decode_us.len() as u64;
            self.p95_decode_us = p95(&mut self.decode_us);
        }
    }

    fn assert_budgets(&self, max_p95: Option<u64>, max_avg: Option<u64>) -> Result<()> {
        if let Some(max_p95) = max_p95 {
            if self.p95_delta_bytes > max_p95 {
                anyhow::bail!(
                    "p95 delta bytes {} exceeds budget {}",
                    self.p95_delta_bytes,
                    max_p95
                );
            }
        }
        if let Some(max_avg) = max_avg {
            if self.avg_delta_bytes > max_avg {
                anyhow::bail!(
                    "avg delta bytes {} exceeds budget {}",
                    self.avg_delta_bytes,
                    max_avg
                );
            }
        }
        Ok(())
    }
}

fn p95(values: &mut [u64]) -> u64 {
    values.sort_unstable();
    let idx = ((values.len() as f64) * 0.95).ceil() as usize;
    let idx = idx.saturating_sub(1).min(values.len() - 1);
    values[idx]
}

#[derive(Debug, Serialize)]
struct SerdeRun {
    entities: Vec<SerdeEntity>,
}

#[derive(Debug, Serialize)]
struct SerdeEntity {
    number: u16,
    model_index: u8,
    frame: u8,
    skin: u16,
    effects: u16,
    origin: [f32; 3],
    angles: [f32; 3],
    event: u8,
    solid: u16,
}
