use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use xfer_core::config::{TransferConfig, DEFAULT_CHUNK_SIZE};
use xfer_core::fixture::create_sample_file;
use xfer_core::progress::{format_bytes, LogSink, ProgressSink};
use xfer_core::transfer::{Transfer, TransferSummary};
use xfer_core::transport::{LocalBucket, ReplaySource, TransferSource};
use xfer_core::types::{Direction, TransferError};

mod sinks;
use sinks::{ConsoleSink, JsonSink, TerminalSink};

#[derive(Parser)]
#[command(name = "xfer", about = "Object transfers with progress reporting")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// How progress is printed
    #[arg(short, long, value_enum, default_value_t = Output::Console, global = true)]
    output: Output,

    /// Read/write chunk size in bytes
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE, global = true)]
    chunk_size: usize,

    /// Give up on a transfer after this many seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Bucket directory (defaults to $XFER_BUCKET_DIR, then ./xfer-bucket)
    #[arg(short, long, global = true)]
    bucket: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Create a sample file, upload it, then download it back
    Demo {
        #[arg(short, long, default_value = "object-get-progress-sample")]
        key: String,
    },
    /// Upload a local file into the bucket
    Put {
        file: PathBuf,
        /// Object key (defaults to the file name)
        #[arg(short, long)]
        key: Option<String>,
    },
    /// Download an object from the bucket
    Get { key: String, file: PathBuf },
    /// Feed a recorded JSON-lines event log through the aggregator
    Replay {
        events: PathBuf,
        #[arg(short, long, value_enum, default_value_t = DirectionArg::Upload)]
        direction: DirectionArg,
        /// Pause between events, in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Output {
    Console,
    Json,
    Bar,
}

#[derive(Clone, Copy, ValueEnum)]
enum DirectionArg {
    Upload,
    Download,
}

impl From<DirectionArg> for Direction {
    fn from(d: DirectionArg) -> Self {
        match d {
            DirectionArg::Upload => Direction::Upload,
            DirectionArg::Download => Direction::Download,
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("Transfer failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), TransferError> {
    let config = TransferConfig::builder()
        .with_chunk_size(args.chunk_size)
        .with_timeout(args.timeout_secs.map(Duration::from_secs))
        .build();
    let bucket = match args.bucket {
        Some(dir) => LocalBucket::new(dir),
        None => LocalBucket::from_env(),
    }
    .with_config(&config);
    let output = args.output;

    match args.command {
        Command::Demo { key } => {
            let sample = create_sample_file()?;
            let path = sample.path().to_path_buf();

            let put = bucket.put(&key, &path)?;
            execute(Arc::new(put), &key, output, &config).await?;

            let get = bucket.get(&key, &path)?;
            execute(Arc::new(get), &key, output, &config).await?;
        }
        Command::Put { file, key } => {
            let key = match key {
                Some(k) => k,
                None => file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            };
            let put = bucket.put(&key, &file)?;
            execute(Arc::new(put), &key, output, &config).await?;
        }
        Command::Get { key, file } => {
            let get = bucket.get(&key, &file)?;
            execute(Arc::new(get), &key, output, &config).await?;
        }
        Command::Replay {
            events,
            direction,
            delay_ms,
        } => {
            let mut source = ReplaySource::from_file(&events, direction.into()).await?;
            if let Some(ms) = delay_ms {
                source = source.with_delay(Duration::from_millis(ms));
            }
            let label = events.display().to_string();
            execute(Arc::new(source), &label, output, &config).await?;
        }
    }

    Ok(())
}

async fn execute(
    source: Arc<dyn TransferSource>,
    label: &str,
    output: Output,
    config: &TransferConfig,
) -> Result<TransferSummary, TransferError> {
    let mut transfer = Transfer::new(source, config.clone());
    transfer.add_sink(Box::new(LogSink::labelled(label)));
    transfer.add_sink(output_sink(output, label));

    let summary = transfer.run().await?;
    if matches!(output, Output::Console) {
        println!(
            "{} {} in {:.2}s",
            label,
            format_bytes(summary.state.bytes_so_far),
            summary.elapsed.as_secs_f64()
        );
    }
    Ok(summary)
}

fn output_sink(output: Output, label: &str) -> Box<dyn ProgressSink> {
    match output {
        Output::Console => Box::new(ConsoleSink),
        Output::Json => Box::new(JsonSink),
        Output::Bar => Box::new(TerminalSink::new(label)),
    }
}
