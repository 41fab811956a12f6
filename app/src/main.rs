mod capture;

use std::{error::Error, io::Write, path::PathBuf, sync::Arc};

use chrono::Local;
use clap::Parser;
use crossbeam::channel::{unbounded, Sender};
use env_logger::Builder;
use log::LevelFilter;

use pcd_capture::{spawn_session_worker, IngestConfig, ScanSession, SessionEvent};
use pcd_exporter::{config::DEFAULT_FILE_NAME, ExportConfig, Exporter};

#[derive(Parser, Debug)]
#[command(
    name = "Point Scan",
    about = "A tool for replaying recorded AR captures into a colored PLY point cloud",
    author = "MIERUNE Inc.",
    version = "0.0.1"
)]
struct Cli {
    #[arg(short, long, required = true, num_args = 1.., value_name = "FILE")]
    input: Vec<PathBuf>,

    /// Defaults to the system temp directory
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_FILE_NAME)]
    file_name: String,

    /// Color vertices on the calling thread instead of the rayon pool
    #[arg(long)]
    sequential: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn replay_all(inputs: &[PathBuf], sender: &Sender<SessionEvent>) -> Result<usize, Box<dyn Error>> {
    let mut total = 0;
    for input in inputs {
        let count = capture::replay_file(input, sender)?;
        log::info!("replayed {} events from {:?}", count, input);
        total += count;
    }
    Ok(total)
}

fn run(args: Cli) -> Result<(), Box<dyn Error>> {
    log::info!("input files: {:?}", args.input);

    let mut config = ExportConfig::default().with_file_name(args.file_name);
    if let Some(output) = args.output {
        config.output_dir = output;
    }
    log::info!("output file: {:?}", config.output_path());

    let start = std::time::Instant::now();

    log::info!("start replaying...");
    let session = Arc::new(ScanSession::new(IngestConfig {
        parallel: !args.sequential,
    }));
    let (sender, receiver) = unbounded();
    let worker = spawn_session_worker(Arc::clone(&session), receiver)?;

    let replayed = replay_all(&args.input, &sender);
    // closing the channel lets the worker drain and stop
    drop(sender);
    let appended = worker.join().map_err(|_| "scan session worker panicked")?;
    let events = replayed?;
    log::info!(
        "finish replaying {} events ({} points) in {:?}",
        events,
        appended,
        start.elapsed()
    );

    log::info!("start exporting...");
    let start_local = std::time::Instant::now();
    let exporter = Exporter::new(config);
    let path = exporter.export(session.freeze())?;
    log::info!("finish exporting {:?} in {:?}", path, start_local.elapsed());

    log::info!("Elapsed: {:?}", start.elapsed());
    Ok(())
}

fn main() {
    let args = Cli::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, level)
        .init();

    if let Err(e) = run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
