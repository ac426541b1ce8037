use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use glob::Pattern;
use tools::{
    describe_bits, inspect_capture, replay_capture, FrameReplay, InspectReport, ReplayReport,
};
use wire::EntityBits;

#[derive(Parser)]
#[command(
    name = "qsnap-tools",
    version,
    about = "qsnap capture inspection and decoding tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Inspect capture structure and per-record sizes.
    Inspect {
        /// Path to a capture file or a directory of captures.
        capture_path: PathBuf,
        /// Optional glob filter when inspecting a directory.
        #[arg(long)]
        glob: Option<String>,
        /// Sort inspected captures.
        #[arg(long, value_enum)]
        sort: Option<InspectSort>,
        /// Limit the number of inspected captures (after sorting).
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Replay a capture and print the reconstructed snapshots.
    Decode {
        /// Path to the capture file.
        capture_file: PathBuf,
        /// Output format.
        #[arg(long, value_enum, default_value_t = DecodeFormat::Json)]
        format: DecodeFormat,
        /// Only print this server frame.
        #[arg(long)]
        frame: Option<i32>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InspectSort {
    Size,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DecodeFormat {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Inspect {
            capture_path,
            glob,
            sort,
            limit,
        } => {
            if capture_path.is_dir() {
                let entries = collect_capture_entries(&capture_path, glob.as_deref())?;
                let mut entries = maybe_sort_entries(entries, sort);
                let limit = limit.or(sort.map(|InspectSort::Size| 10));
                if let Some(limit) = limit {
                    entries.truncate(limit);
                }
                for entry in entries {
                    let bytes = fs::read(&entry.path)
                        .with_context(|| format!("read capture {}", entry.path.display()))?;
                    let report = inspect_capture(&bytes)?;
                    println!("== {} ({} bytes) ==", entry.path.display(), entry.size);
                    print_inspect_report(&report);
                }
            } else {
                let bytes = fs::read(&capture_path)
                    .with_context(|| format!("read capture {}", capture_path.display()))?;
                let report = inspect_capture(&bytes)?;
                print_inspect_report(&report);
            }
        }
        Command::Decode {
            capture_file,
            format,
            frame,
        } => {
            let bytes = fs::read(&capture_file)
                .with_context(|| format!("read capture {}", capture_file.display()))?;
            let mut report = replay_capture(&bytes)?;
            if let Some(frame) = frame {
                report.frames.retain(|f| f.server_frame == frame);
            }
            match format {
                DecodeFormat::Json => {
                    let json = serde_json::to_string_pretty(&report).context("serialize json")?;
                    println!("{json}");
                }
                DecodeFormat::Pretty => {
                    print_replay_report(&report);
                }
            }
        }
    }
    Ok(())
}

struct CaptureEntry {
    path: PathBuf,
    size: u64,
}

fn collect_capture_entries(dir: &PathBuf, glob: Option<&str>) -> Result<Vec<CaptureEntry>> {
    let mut entries = Vec::new();
    let pattern = match glob {
        Some(value) => Some(Pattern::new(value).context("invalid glob pattern")?),
        None => None,
    };

    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(pattern) = &pattern {
            let matches_path = pattern.matches_path(&path);
            let matches_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name));
            if !matches_path && !matches_name {
                continue;
            }
        }
        let size = entry.metadata()?.len();
        entries.push(CaptureEntry { path, size });
    }
    Ok(entries)
}

fn maybe_sort_entries(
    mut entries: Vec<CaptureEntry>,
    sort: Option<InspectSort>,
) -> Vec<CaptureEntry> {
    match sort {
        Some(InspectSort::Size) => {
            entries.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
        }
        None => {}
    }
    entries
}

fn print_inspect_report(report: &InspectReport) {
    match report.server_rate {
        Some(rate) => println!("server rate: {rate} hz"),
        None => println!("server rate: not announced"),
    }
    println!(
        "baselines: {}  frames: {}  total: {} bytes",
        report.baseline_count,
        report.frames.len(),
        report.total_bytes
    );
    for frame in &report.frames {
        let kind = if frame.keyframe {
            "keyframe".to_string()
        } else {
            format!("delta from {}", frame.delta_frame)
        };
        let record_bytes: usize = frame.records.iter().map(|record| record.byte_len).sum();
        println!(
            "frame {} ({kind}): {} bytes = header {} + player {} + entities {}",
            frame.server_frame, frame.block_bytes, frame.header_bytes, frame.player_bytes,
            record_bytes
        );
        for record in &frame.records {
            let bits = describe_bits(EntityBits::from_raw(record.bits));
            let label = if bits.is_empty() { "no fields" } else { &bits };
            println!("  {}: {label} ({} bytes)", record.number, record.byte_len);
        }
        if frame.suppress_count > 0 {
            println!("  suppressed: {} frames", frame.suppress_count);
        }
    }
}

fn print_replay_report(report: &ReplayReport) {
    println!(
        "server rate: {} hz  baselines: {}",
        report.server_rate, report.baselines
    );
    for frame in &report.frames {
        print_frame_replay(frame);
    }
}

fn print_frame_replay(frame: &FrameReplay) {
    println!(
        "frame {} [{}] time {} ms: {} entities",
        frame.server_frame,
        frame.status,
        frame.server_time,
        frame.entities.len()
    );
    println!(
        "  player: pm_type {} origin ({:.1} {:.1} {:.1}) view ({:.1} {:.1} {:.1})",
        frame.player.pm_type,
        frame.player.origin[0],
        frame.player.origin[1],
        frame.player.origin[2],
        frame.player.view_angles[0],
        frame.player.view_angles[1],
        frame.player.view_angles[2]
    );
    for entity in &frame.entities {
        println!(
            "  {}: model {} frame {} origin ({:.1} {:.1} {:.1})",
            entity.number,
            entity.model_index,
            entity.frame,
            entity.origin[0],
            entity.origin[1],
            entity.origin[2]
        );
    }
}
