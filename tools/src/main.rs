use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client::{ClientConfig, Credentials, Listener, ListenerEvent, Session};
use codec::{BoardView, DeltaPolicy, ProtocolError};
use ctflink_tools::{
    decode_capture, format_decode_pretty, format_view_pretty, inspect_frames, FrameKind,
    InspectReport,
};
use glob::Pattern;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "ctflink",
    version,
    about = "ctflink grid client and capture tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Connection flags shared by the live subcommands. Flags override the config file.
#[derive(clap::Args)]
struct ConnectArgs {
    /// TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Server address, `host:port`.
    #[arg(long)]
    addr: Option<String>,
    /// Room type for the room request.
    #[arg(long)]
    room: Option<u8>,
    /// Credentials as `user:pass`.
    #[arg(long)]
    login: Option<String>,
    /// Read timeout in milliseconds; 0 disables it.
    #[arg(long)]
    read_timeout_ms: Option<u64>,
    /// Apply deltas that arrive before the first snapshot.
    #[arg(long)]
    allow_early_delta: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Start a game and step it with a fixed action.
    Play {
        #[command(flatten)]
        connect: ConnectArgs,
        /// Action sent before each frame.
        #[arg(long, default_value_t = 0)]
        action: u8,
        /// Number of request/frame steps.
        #[arg(long, default_value_t = 1)]
        steps: usize,
        /// Print each board as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Start a game and print frames as the server pushes them.
    Listen {
        #[command(flatten)]
        connect: ConnectArgs,
        /// Stop after this many frames.
        #[arg(long)]
        frames: Option<usize>,
        /// Print each board as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Inspect frame structure and sizes in capture files.
    Inspect {
        /// Capture file, or a directory of captures.
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
    /// Replay a capture and print what each frame did to the board.
    Decode {
        /// Capture file.
        capture_file: PathBuf,
        /// Output format.
        #[arg(long, value_enum, default_value_t = DecodeFormat::Json)]
        format: DecodeFormat,
        /// Apply deltas that arrive before the first snapshot.
        #[arg(long)]
        allow_early_delta: bool,
    },
}

const LISTEN_STOP_WAIT: Duration = Duration::from_millis(500);

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
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Play {
            connect,
            action,
            steps,
            json,
        } => {
            let config = connect.resolve()?;
            let mut session = Session::connect(&config)
                .with_context(|| format!("connect to {}", config.addr))?;
            session
                .start_game(config.room_type)
                .context("start game")?;
            for step in 0..steps {
                let view = session
                    .request_frame(action)
                    .with_context(|| format!("step {step}"))?;
                print_view(&view, json)?;
            }
        }
        Command::Listen {
            connect,
            frames,
            json,
        } => {
            let config = connect.resolve()?;
            let mut session = Session::connect(&config)
                .with_context(|| format!("connect to {}", config.addr))?;
            session
                .start_game(config.room_type)
                .context("start game")?;
            let listener = Listener::spawn(session);
            let mut seen = 0usize;
            while frames.map_or(true, |limit| seen < limit) {
                match listener.recv() {
                    Some(ListenerEvent::Frame(view)) => {
                        seen += 1;
                        print_view(&view, json)?;
                    }
                    Some(ListenerEvent::Rejected(err)) => eprintln!("frame rejected: {err}"),
                    Some(ListenerEvent::Ended(err)) => {
                        info!(frames = seen, "listener ended");
                        if err.is_fatal() && err != ProtocolError::Closed {
                            bail!("connection lost: {err}");
                        }
                        break;
                    }
                    None => break,
                }
            }
            // With no read timeout the reader may be parked in a read; do not wait on it.
            let _ = listener.stop_timeout(LISTEN_STOP_WAIT);
        }
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
                    println!("== {} ({} bytes) ==", entry.path.display(), entry.size);
                    print_inspect_report(&inspect_frames(&bytes));
                }
            } else {
                let bytes = fs::read(&capture_path)
                    .with_context(|| format!("read capture {}", capture_path.display()))?;
                print_inspect_report(&inspect_frames(&bytes));
            }
        }
        Command::Decode {
            capture_file,
            format,
            allow_early_delta,
        } => {
            let bytes = fs::read(&capture_file)
                .with_context(|| format!("read capture {}", capture_file.display()))?;
            let output = decode_capture(&bytes, delta_policy(allow_early_delta));
            match format {
                DecodeFormat::Json => {
                    let json = serde_json::to_string_pretty(&output).context("serialize json")?;
                    println!("{json}");
                }
                DecodeFormat::Pretty => {
                    print!("{}", format_decode_pretty(&output));
                }
            }
        }
    }
    Ok(())
}

impl ConnectArgs {
    fn resolve(self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ClientConfig::default(),
        };
        if let Some(addr) = self.addr {
            config.addr = addr;
        }
        if let Some(room) = self.room {
            config.room_type = room;
        }
        if let Some(pair) = self.login {
            let Some(creds) = Credentials::parse(&pair) else {
                bail!("--login expects user:pass");
            };
            config.login = Some(creds);
        }
        if let Some(ms) = self.read_timeout_ms {
            config.read_timeout = (ms > 0).then_some(Duration::from_millis(ms));
        }
        if self.allow_early_delta {
            config.delta_policy = DeltaPolicy::PatchDefault;
        }
        Ok(config)
    }
}

fn load_config(path: &Path) -> Result<ClientConfig> {
    ClientConfig::load(path).with_context(|| format!("load config {}", path.display()))
}

const fn delta_policy(allow_early_delta: bool) -> DeltaPolicy {
    if allow_early_delta {
        DeltaPolicy::PatchDefault
    } else {
        DeltaPolicy::RequireSnapshot
    }
}

fn print_view(view: &BoardView, json: bool) -> Result<()> {
    if json {
        let line = serde_json::to_string(view).context("serialize json")?;
        println!("{line}");
    } else {
        println!("{}", format_view_pretty(view));
    }
    Ok(())
}

struct CaptureEntry {
    path: PathBuf,
    size: u64,
}

fn collect_capture_entries(dir: &Path, glob: Option<&str>) -> Result<Vec<CaptureEntry>> {
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
        None => entries.sort_by(|a, b| a.path.cmp(&b.path)),
    }
    entries
}

fn print_inspect_report(report: &InspectReport) {
    println!(
        "frames: {} ({} snapshot, {} delta) in {} bytes",
        report.frames.len(),
        report.count(FrameKind::Snapshot),
        report.count(FrameKind::Delta),
        report.total_bytes
    );
    for frame in &report.frames {
        let body = match frame.kind {
            FrameKind::Snapshot => format!("{} rle bytes", frame.body_len),
            FrameKind::Delta => format!("{} patches", frame.body_len),
        };
        let sequence = frame
            .sequence
            .map(|seq| format!(" seq {seq}"))
            .unwrap_or_default();
        println!(
            "  @{:<6} {:?}{sequence}: score {}-{}, {body} ({} bytes)",
            frame.offset, frame.kind, frame.score.own, frame.score.opponent, frame.byte_len
        );
    }
    if let Some(stopped) = &report.stopped {
        println!("stopped {stopped}");
    }
}
