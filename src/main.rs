use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand};
use kinect_pins::frame_pipeline::{
    open_first_camera, CaptureConfig, CaptureSession, DisplayWorker, FrameMailbox,
    FrameProcessor, NullSink, PreviewCompression, SyntheticDriver, TiffPreviewSink,
};
use kinect_pins::logger;

use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "kinect_pins")]
#[command(about = "Downsample depth/color camera frames into 64x48 pin grids and CSV snapshots")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory receiving depthmapN.csv / colormapN.csv (must exist)
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Write the latest display buffers as TIFF files into this directory
    #[arg(long, global = true)]
    preview_dir: Option<PathBuf>,

    /// Process frames without writing CSV snapshots
    #[arg(long, global = true)]
    no_persist: bool,

    /// Debug logging unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream frames until Ctrl+C or the time limit
    Live {
        /// Stop after this many seconds
        #[arg(short, long)]
        seconds: Option<u64>,

        /// Process and persist every captured frame
        #[arg(long)]
        process_live: bool,
    },
    /// Run a fixed number of capture-process-persist cycles, then exit
    Batch {
        #[arg(short, long, default_value = "240")]
        iterations: usize,

        /// Pause between cycles in milliseconds
        #[arg(short, long, default_value = "66")]
        delay_ms: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init_with_default(if cli.verbose { "debug" } else { "info" });

    info!("Starting kinect_pins...");

    let mut builder = CaptureConfig::builder().persist(!cli.no_persist);
    if let Some(dir) = &cli.output_dir {
        builder = builder.output_dir(dir);
    }
    let (mode, builder) = match cli.command {
        Some(Commands::Batch { iterations, delay_ms }) => (
            Mode::Batch,
            builder
                .batch_iterations(iterations)
                .batch_delay(Duration::from_millis(delay_ms)),
        ),
        Some(Commands::Live { seconds, process_live }) => {
            (Mode::Live(seconds.map(Duration::from_secs)), builder.process_live(process_live))
        }
        None => (Mode::Live(None), builder),
    };
    let config = builder.build();

    info!("Snapshot directory: {}", config.output_dir.display());
    if config.persist && !config.output_dir.is_dir() {
        warn!(
            "{} does not exist; snapshots will fail until it is created",
            config.output_dir.display()
        );
    }

    let driver = SyntheticDriver::default();
    let camera = match open_first_camera(&driver) {
        Ok(camera) => camera,
        Err(e) => {
            error!("{}", e);
            return Err(e).context("cannot start without a camera");
        }
    };

    let mailbox = Arc::new(FrameMailbox::new());
    let display = match &cli.preview_dir {
        Some(dir) => DisplayWorker::spawn(
            Arc::clone(&mailbox),
            TiffPreviewSink::new(dir, PreviewCompression::Lzw)
                .with_context(|| format!("preview directory {}", dir.display()))?,
        )?,
        None => DisplayWorker::spawn(Arc::clone(&mailbox), NullSink::default())?,
    };

    let stop_timeout = config.stop_timeout;
    let processor = FrameProcessor::new(&config);
    let session = CaptureSession::start(camera, processor, mailbox, config)?;

    match mode {
        Mode::Batch => {
            let report = session.run_batch()?;
            info!(
                "Batch finished: {} cycles, {} files, {} failed writes",
                report.cycles, report.files_written, report.persist_failures
            );
        }
        Mode::Live(limit) => run_live(&session, limit)?,
    }

    let stats = session.stats();
    if !session.shutdown() {
        warn!("Capture thread still running at exit");
    }
    if !display.stop(stop_timeout) {
        warn!("Display thread still running at exit");
    }
    info!(
        "Captured {} frame sets ({} failed pulls)",
        stats.ticks, stats.pull_failures
    );

    Ok(())
}

enum Mode {
    Live(Option<Duration>),
    Batch,
}

fn run_live(session: &CaptureSession, limit: Option<Duration>) -> anyhow::Result<()> {
    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_clone = stop_flag.clone();
    ctrlc::set_handler(move || {
        stop_flag_clone.store(true, Ordering::SeqCst);
    })?;

    info!("Streaming... (press Ctrl+C to stop)");
    let start = Instant::now();
    while !stop_flag.load(Ordering::SeqCst) {
        if limit.is_some_and(|limit| start.elapsed() >= limit) {
            break;
        }
        if !session.is_capturing() {
            warn!("Capture thread ended early");
            break;
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    Ok(())
}
