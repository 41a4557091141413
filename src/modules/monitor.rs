use std::{future::Future, ops::ControlFlow, time::Duration};

use log::{debug, error, info, warn};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use super::{
    network::SampleReader,
    output::Sink,
    rate::{RateCalculator, SpeedPair},
    speed::SpeedFormatter,
};

/// Shown until the first sample has been rendered.
pub const PLACEHOLDER: &str = "-";

pub trait Scheduler {
    /// Resolves when the next tick is due.
    fn tick(&mut self) -> impl Future<Output = ()>;
}

pub struct IntervalScheduler {
    interval: Interval,
}

impl IntervalScheduler {
    /// The first tick fires one full period after creation.
    pub fn new(period: Duration) -> Self {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

impl Scheduler for IntervalScheduler {
    async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

/// One monitoring session. Rate state exists only between `start` and `stop`.
pub struct Monitor<S: Sink> {
    reader: SampleReader,
    formatter: SpeedFormatter,
    period: Duration,
    sink: S,
    rate: RateCalculator,
    running: bool,
}

impl<S: Sink> Monitor<S> {
    pub fn new(reader: SampleReader, formatter: SpeedFormatter, period: Duration, sink: S) -> Self {
        Self {
            reader,
            formatter,
            period,
            sink,
            rate: RateCalculator::new(),
            running: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn rate(&self) -> &RateCalculator {
        &self.rate
    }

    pub fn start(&mut self) {
        self.begin();
        self.display(PLACEHOLDER);
    }

    pub fn stop(&mut self) {
        self.rate.reset();
        self.running = false;
    }

    fn begin(&mut self) {
        self.rate.reset();
        self.running = true;
    }

    /// Reads the counters and advances the rate state. A failed read is
    /// logged and reported as no traffic, leaving the baseline untouched.
    pub fn sample(&mut self) -> SpeedPair {
        if !self.running {
            return SpeedPair::default();
        }
        match self.reader.read_totals() {
            Ok(totals) => {
                let speed = self.rate.compute(totals, self.period);
                if let Some(at) = self.rate.state().sampled_at {
                    debug!("{:?} at {}", totals, at.format("%H:%M:%S%.3f"));
                }
                speed
            }
            Err(err) => {
                error!("{}", err);
                SpeedPair::default()
            }
        }
    }

    pub fn tick(&mut self) -> ControlFlow<()> {
        if !self.is_running() {
            return ControlFlow::Break(());
        }
        let speed = self.sample();
        let text = self.formatter.line(speed);
        info!("{}", text);
        self.display(&text);
        ControlFlow::Continue(())
    }

    /// Ticks until `shutdown` resolves.
    pub async fn run<T, F>(&mut self, scheduler: &mut T, shutdown: F)
    where
        T: Scheduler,
        F: Future<Output = ()>,
    {
        self.start();
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = scheduler.tick() => {
                    if self.tick().is_break() {
                        break;
                    }
                }
            }
        }
        self.stop();
    }

    /// Takes a baseline, waits one tick and renders a single line.
    pub async fn run_once<T: Scheduler>(&mut self, scheduler: &mut T) {
        self.begin();
        self.sample();
        scheduler.tick().await;
        let _ = self.tick();
        self.stop();
    }

    fn display(&mut self, text: &str) {
        if let Err(err) = self.sink.show(text) {
            warn!("{}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::Result,
        modules::{
            network::{
                tests::{dev_line, HEADER},
                AggregateTotals, InterfaceFilter,
            },
            rate::RateState,
            speed::Precision,
        },
    };
    use std::{fs, path::PathBuf};
    use tokio::sync::oneshot;

    impl Sink for Vec<String> {
        fn show(&mut self, text: &str) -> Result<()> {
            self.push(text.to_string());
            Ok(())
        }
    }

    /// Rewrites the counter source before each tick and signals shutdown
    /// once every snapshot has been served.
    struct Snapshots {
        path: PathBuf,
        contents: Vec<String>,
        done: Option<oneshot::Sender<()>>,
    }

    impl Scheduler for Snapshots {
        async fn tick(&mut self) {
            if self.contents.is_empty() {
                if let Some(done) = self.done.take() {
                    let _ = done.send(());
                }
                std::future::pending::<()>().await;
            }
            let next = self.contents.remove(0);
            fs::write(&self.path, next).unwrap();
        }
    }

    fn monitor(path: &std::path::Path, precision: Precision) -> Monitor<Vec<String>> {
        Monitor::new(
            SampleReader::new(path, InterfaceFilter::default()),
            SpeedFormatter::new(precision),
            Duration::from_secs(1),
            Vec::new(),
        )
    }

    async fn run_snapshots(monitor: &mut Monitor<Vec<String>>, path: PathBuf, contents: Vec<String>) {
        let (done, shutdown) = oneshot::channel();
        let mut scheduler = Snapshots {
            path,
            contents,
            done: Some(done),
        };
        monitor
            .run(&mut scheduler, async {
                let _ = shutdown.await;
            })
            .await;
    }

    fn net_dev(lines: &[(&str, u64, u64)]) -> String {
        let mut content = HEADER.to_string();
        for (name, rx, tx) in lines {
            content.push_str(&dev_line(name, *rx, *tx));
        }
        content
    }

    #[tokio::test]
    async fn reports_download_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dev");
        let mut monitor = monitor(&path, Precision::default());

        run_snapshots(
            &mut monitor,
            path,
            vec![
                net_dev(&[("lo", 50, 50), ("eth0", 1_000_000, 0)]),
                net_dev(&[("lo", 90, 90), ("eth0", 2_000_000, 0)]),
            ],
        )
        .await;

        assert_eq!(
            monitor.sink(),
            &vec![
                PLACEHOLDER.to_string(),
                "↓ 0.00 B/s ↑ 0.00 B/s".to_string(),
                "↓ 1.00 M/s ↑ 0.00 B/s".to_string(),
            ]
        );
        assert!(!monitor.is_running());
    }

    #[tokio::test]
    async fn loopback_traffic_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dev");
        let mut monitor = monitor(&path, Precision::default());

        run_snapshots(
            &mut monitor,
            path,
            vec![
                net_dev(&[("lo", 1_000, 1_000)]),
                net_dev(&[("lo", 9_000_000, 9_000_000)]),
            ],
        )
        .await;

        assert_eq!(&monitor.sink()[1..], ["↓ 0.00 B/s ↑ 0.00 B/s"; 2]);
    }

    #[tokio::test]
    async fn counter_reset_renders_negative() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dev");
        let mut monitor = monitor(&path, Precision::Adaptive);

        run_snapshots(
            &mut monitor,
            path,
            vec![
                net_dev(&[("eth0", 5_000, 5_000)]),
                net_dev(&[("eth0", 2_000, 6_500)]),
            ],
        )
        .await;

        assert_eq!(monitor.sink()[2], "↓ -3000 B/s ↑ 1.50 K/s");
    }

    #[test]
    fn read_failure_keeps_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dev");
        let mut monitor = monitor(&path, Precision::default());
        monitor.start();

        fs::write(&path, net_dev(&[("eth0", 1_000, 1_000)])).unwrap();
        assert!(monitor.tick().is_continue());

        fs::remove_file(&path).unwrap();
        assert!(monitor.tick().is_continue());

        fs::write(&path, net_dev(&[("eth0", 3_000, 1_500)])).unwrap();
        assert!(monitor.tick().is_continue());

        assert_eq!(
            monitor.sink(),
            &vec![
                PLACEHOLDER.to_string(),
                "↓ 0.00 B/s ↑ 0.00 B/s".to_string(),
                "↓ 0.00 B/s ↑ 0.00 B/s".to_string(),
                "↓ 2.00 K/s ↑ 500.00 B/s".to_string(),
            ]
        );
    }

    #[test]
    fn restart_discards_previous_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dev");
        let mut monitor = monitor(&path, Precision::default());

        fs::write(&path, net_dev(&[("eth0", 1_000, 1_000)])).unwrap();
        monitor.start();
        let _ = monitor.tick();
        assert!(monitor.rate().state().sampled_at.is_some());
        monitor.stop();
        assert_eq!(monitor.rate().state(), &RateState::default());
        assert!(monitor.tick().is_break());

        fs::write(&path, net_dev(&[("eth0", 900_000, 900_000)])).unwrap();
        monitor.start();
        let _ = monitor.tick();

        assert_eq!(monitor.sink().last().unwrap(), "↓ 0.00 B/s ↑ 0.00 B/s");
        assert_eq!(monitor.sink().len(), 4);
    }

    #[test]
    fn start_while_running_takes_new_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dev");
        let mut monitor = monitor(&path, Precision::default());

        fs::write(&path, net_dev(&[("eth0", 1_000, 1_000)])).unwrap();
        monitor.start();
        let _ = monitor.tick();
        assert_eq!(
            monitor.rate().state().previous,
            AggregateTotals::new(1_000, 1_000)
        );

        monitor.start();
        assert_eq!(monitor.rate().state(), &RateState::default());

        fs::write(&path, net_dev(&[("eth0", 50_000, 50_000)])).unwrap();
        let _ = monitor.tick();
        assert_eq!(monitor.sink().last().unwrap(), "↓ 0.00 B/s ↑ 0.00 B/s");
    }

    #[tokio::test]
    async fn run_once_renders_single_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dev");
        fs::write(&path, net_dev(&[("eth0", 1_000, 1_000)])).unwrap();
        let mut monitor = monitor(&path, Precision::default());

        let (done, _shutdown) = oneshot::channel();
        let mut scheduler = Snapshots {
            path: path.clone(),
            contents: vec![net_dev(&[("eth0", 4_000, 1_000)])],
            done: Some(done),
        };
        monitor.run_once(&mut scheduler).await;

        assert_eq!(monitor.sink(), &vec!["↓ 3.00 K/s ↑ 0.00 B/s".to_string()]);
        assert!(!monitor.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn interval_waits_a_full_period() {
        let period = Duration::from_secs(1);
        let started = Instant::now();
        let mut scheduler = IntervalScheduler::new(period);

        scheduler.tick().await;
        assert_eq!(started.elapsed(), period);
        scheduler.tick().await;
        assert_eq!(started.elapsed(), period * 2);
    }
}
