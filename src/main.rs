use std::{future, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use log::{error, info};
use netspeed::{
    config::{Config, PrecisionMode},
    logging,
    modules::{
        monitor::{IntervalScheduler, Monitor},
        network::{InterfaceFilter, SampleReader},
        output::{OutputFormat, WriterSink},
        speed::SpeedFormatter,
    },
};
use tokio::signal;

#[derive(Parser, Debug)]
#[command(name = "netspeed", version, about = "Aggregate network throughput for status bars")]
struct Opt {
    /// TOML config file. Command-line options take precedence.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Seconds between samples.
    #[arg(short, long)]
    interval: Option<u64>,
    /// Counter source in /proc/net/dev format.
    #[arg(long)]
    source: Option<PathBuf>,
    #[arg(short, long, value_enum)]
    precision: Option<PrecisionMode>,
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,
    /// Extra interface glob to ignore (repeatable).
    #[arg(short = 'x', long)]
    exclude: Vec<String>,
    /// strftime format prefixed to each line, e.g. "%H:%M:%S".
    #[arg(short, long)]
    timestamp: Option<String>,
    /// Print a single line after one interval and exit.
    #[arg(long)]
    once: bool,
    /// Only log warnings and errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Opt {
    fn into_config(self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(interval) = self.interval {
            config.interval = interval;
        }
        if let Some(source) = self.source {
            config.source = source;
        }
        if let Some(precision) = self.precision {
            config.precision = precision;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if self.timestamp.is_some() {
            config.timestamp = self.timestamp;
        }
        config.exclude.extend(self.exclude);
        config.validate()?;
        Ok(config)
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("failed to listen for ctrl-c: {}", err);
            future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(err) => {
                error!("failed to listen for SIGTERM: {}", err);
                future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let opt = Opt::parse();
    let once = opt.once;
    logging::init(opt.quiet);

    let config = opt.into_config().context("invalid configuration")?;
    let filter = InterfaceFilter::with_extra(&config.exclude)?;
    let reader = SampleReader::new(&config.source, filter);
    let source = reader.source().display().to_string();
    let sink = WriterSink::stdout(config.output, config.timestamp.clone());
    let mut monitor = Monitor::new(
        reader,
        SpeedFormatter::new(config.precision()),
        config.period(),
        sink,
    );
    let mut scheduler = IntervalScheduler::new(config.period());

    if once {
        monitor.run_once(&mut scheduler).await;
        return Ok(());
    }

    info!("sampling {} every {}s", source, config.interval);
    monitor.run(&mut scheduler, shutdown_signal()).await;
    info!("stopped");
    Ok(())
}
