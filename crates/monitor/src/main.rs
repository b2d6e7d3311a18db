//! Drowsiness Monitor - Main Entry Point

use std::path::PathBuf;

use alerting::LogAlarmSink;
use clap::Parser;
use monitor::{init_logging, run, AppConfig, JsonLinesSource};
use tokio::io::{AsyncBufRead, BufReader};
use tracing::info;

/// Driver drowsiness detection over a stream of facial landmarks
#[derive(Parser, Debug)]
#[command(name = "drowsiness-monitor", version, about)]
struct Args {
    /// Configuration file (TOML, JSON or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON-lines landmark frames; reads stdin when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.json_logs)?;

    info!("=== Drowsiness Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load(args.config.as_deref())?;

    let reader: Box<dyn AsyncBufRead + Unpin> = match &args.input {
        Some(path) => {
            info!("Reading landmark frames from {}", path.display());
            Box::new(BufReader::new(tokio::fs::File::open(path).await?))
        }
        None => {
            info!("Reading landmark frames from stdin");
            Box::new(BufReader::new(tokio::io::stdin()))
        }
    };

    let mut source = JsonLinesSource::new(reader);
    let mut stdout = tokio::io::stdout();
    let mut sink = LogAlarmSink::default();
    let shutdown = async {
        // Without a signal handler there is no shutdown trigger besides end of input
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    let summary = run(&config, &mut source, &mut stdout, &mut sink, shutdown).await?;
    if source.skipped() > 0 {
        info!("Skipped {} malformed input lines", source.skipped());
    }
    info!("Processed {} frames", summary.frames);

    Ok(())
}
