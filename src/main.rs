use anyhow::{Context, Result};
use burstcam::config::{DEFAULT_INTERVAL, LOG_ROTATION_LIMIT};
use burstcam::{
    AppPaths, BurstOutcome, CancellationToken, CaptureConfig, CaptureSession, FailurePolicy,
    LogRotator, OutputFormat, Resolution, Scheduler, SystemTimer, WebcamCapture,
};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Application directory; images/ and logs/ are created inside it
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Input webcam device index
    #[arg(short, long, default_value_t = 0)]
    device: u32,

    /// Requested capture resolution
    #[arg(short, long, value_enum, default_value_t = Resolution::Wide)]
    resolution: Resolution,

    /// Photos per burst (1-10)
    #[arg(short = 'n', long, default_value_t = 1)]
    count: u32,

    /// Seconds to wait between photos of a burst (0-5)
    #[arg(long, default_value_t = 1.0)]
    delay: f64,

    /// Artifact format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Jpeg)]
    format: OutputFormat,

    /// Seconds between the starts of two bursts
    #[arg(short, long, default_value_t = DEFAULT_INTERVAL.as_secs())]
    interval: u64,

    /// Number of retired log files to keep
    #[arg(long, default_value_t = LOG_ROTATION_LIMIT)]
    log_rotation_limit: usize,

    /// What to do with the rest of a burst after a frame fails to save
    #[arg(long, value_enum, default_value_t = FailurePolicy::Abort)]
    on_persist_error: FailurePolicy,

    /// JPEG quality, also used for images embedded in PDFs
    #[arg(long, default_value_t = 90, value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: u8,

    /// Run a single burst and exit
    #[arg(long)]
    once: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let config = CaptureConfig::new(args.resolution, args.count, args.delay, args.format)
        .context("Invalid capture settings")?
        .with_failure_policy(args.on_persist_error)
        .with_jpeg_quality(args.jpeg_quality);

    let paths = AppPaths::new(&args.root);
    let log = LogRotator::new(paths.logs_dir(), args.log_rotation_limit)
        .context("Invalid log settings")?;

    tracing::info!("Burstcam starting in {}", paths.root().display());
    let (width, height) = config.resolution().dimensions();
    tracing::info!("Capture: {}x{}", width, height);
    tracing::info!(
        "Burst: {} x {} every {:.1}s",
        config.photo_count(),
        config.format().extension(),
        config.delay().as_secs_f64()
    );

    let session = CaptureSession::new(config, &paths, log);
    let mut camera = WebcamCapture::new(args.device);
    let timer = SystemTimer::new();
    let cancel = CancellationToken::new();
    ctrlc::set_handler(cancel.canceller()).context("Failed to install Ctrl+C handler")?;

    if args.once {
        let report = session.run_burst(&mut camera, &timer, &cancel);
        return match report.outcome {
            BurstOutcome::Aborted(err) => Err(err).context("Burst aborted"),
            BurstOutcome::Completed | BurstOutcome::Cancelled => Ok(()),
        };
    }

    let scheduler = Scheduler::new(Duration::from_secs(args.interval))
        .context("Invalid schedule")?;

    tracing::info!("Press Ctrl+C to stop");
    scheduler.run(&timer, &cancel, || {
        let report = session.run_burst(&mut camera, &timer, &cancel);
        if let BurstOutcome::Aborted(err) = &report.outcome {
            tracing::warn!("Burst aborted, waiting for next run: {}", err);
        }
    });

    drop(camera);
    tracing::info!("Burstcam stopped");
    Ok(())
}
