//! head-gesture — replay recorded head orientation traces through the
//! gesture detector and print the resulting events.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use tracing::info;

use head_gesture::config;
use head_gesture::motion::{
    DetectorConfig, MotionEvent, MotionSession, MotionSource, PitchSignConvention, ReplaySource,
    UnavailableSource,
};

#[derive(Parser, Debug)]
#[command(name = "head-gesture", about = "Detect head gestures in an orientation trace")]
struct Cli {
    /// Trace file with `<seconds> <pitch> <yaw>` lines ("-" for stdin)
    #[arg(default_value = "-")]
    input: PathBuf,

    /// Detector config as an s-expression plist
    #[arg(long)]
    config: Option<PathBuf>,

    /// Minimum pitch delta per sample, radians
    #[arg(long)]
    pitch_threshold: Option<f64>,

    /// Minimum yaw delta per sample, radians
    #[arg(long)]
    yaw_threshold: Option<f64>,

    /// Refractory period after each gesture, milliseconds
    #[arg(long)]
    cooldown_ms: Option<u64>,

    /// Pitch polarity: positive-is-up or positive-is-down
    #[arg(long)]
    pitch_sign: Option<String>,

    /// Emit a diagnostic every N samples (0 disables)
    #[arg(long)]
    diagnostic_interval: Option<u32>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Sexp)]
    format: OutputFormat,

    /// Run without a motion device (reports unavailability and exits)
    #[arg(long)]
    no_device: bool,

    /// Show version and exit
    #[arg(long)]
    version: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Sexp,
    Text,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("head-gesture {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Logs go to stderr so stdout carries only events.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "head_gesture=info".into()),
        )
        .init();

    info!("head-gesture v{} starting", env!("CARGO_PKG_VERSION"));

    let detector_config = build_config(&cli)?;
    info!("config: {}", detector_config.to_sexp());

    if cli.no_device {
        let session = MotionSession::new(UnavailableSource, detector_config);
        return run(session, cli.format);
    }

    let reader: Box<dyn BufRead> = if cli.input.as_os_str() == "-" {
        info!("reading samples from stdin");
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(&cli.input)
            .with_context(|| format!("failed to open trace {}", cli.input.display()))?;
        info!("reading samples from {}", cli.input.display());
        Box::new(BufReader::new(file))
    };

    let session = MotionSession::new(ReplaySource::new(reader), detector_config);
    run(session, cli.format)
}

/// Merge the config file (if any) with command-line overrides.
fn build_config(cli: &Cli) -> anyhow::Result<DetectorConfig> {
    let sign = match cli.pitch_sign.as_deref() {
        Some(s) => match PitchSignConvention::from_str(s) {
            Some(sign) => Some(sign),
            None => bail!("unknown pitch sign {s:?}; use positive-is-up or positive-is-down"),
        },
        None => None,
    };

    let mut cfg = match (&cli.config, sign) {
        (Some(path), _) => config::load_config(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        (None, Some(sign)) => DetectorConfig::new(sign),
        (None, None) => bail!("pitch sign convention required: pass --pitch-sign or --config"),
    };

    if let Some(sign) = sign {
        cfg.pitch_sign_convention = sign;
    }
    if let Some(v) = cli.pitch_threshold {
        cfg.pitch_threshold = v;
    }
    if let Some(v) = cli.yaw_threshold {
        cfg.yaw_threshold = v;
    }
    if let Some(ms) = cli.cooldown_ms {
        cfg.cooldown = Duration::from_millis(ms);
    }
    if let Some(n) = cli.diagnostic_interval {
        cfg.diagnostic_interval = (n > 0).then_some(n);
    }
    cfg.validate()?;
    Ok(cfg)
}

/// Start the session and print events until the source ends.
fn run<S: MotionSource>(mut session: MotionSession<S>, format: OutputFormat) -> anyhow::Result<()> {
    let started = session.start()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for event in &started {
        print_event(&mut out, event, format)?;
    }
    while let Some(batch) = session.step() {
        for event in &batch {
            print_event(&mut out, event, format)?;
        }
    }
    out.flush()?;

    info!("replay finished: {}", session.status_sexp());
    session.stop();
    Ok(())
}

fn print_event(out: &mut impl Write, event: &MotionEvent, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Sexp => writeln!(out, "{}", event.to_sexp()),
        OutputFormat::Text => match event {
            MotionEvent::Gesture { gesture, timestamp } => {
                writeln!(out, "{:>9.3}  {}", timestamp.as_secs_f64(), gesture)
            }
            MotionEvent::Diagnostic(d) => writeln!(out, "{:>9}  {}", "·", d),
        },
    }
}
