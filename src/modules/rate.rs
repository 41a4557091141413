use std::time::Duration;

use chrono::{DateTime, Local};

use super::network::AggregateTotals;

/// Bytes per second. Negative after a counter reset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpeedPair {
    pub download: f64,
    pub upload: f64,
}

/// Totals seen on the previous tick. Zero means unset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RateState {
    pub previous: AggregateTotals,
    pub sampled_at: Option<DateTime<Local>>,
}

#[derive(Debug, Default)]
pub struct RateCalculator {
    state: RateState,
}

impl RateCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RateState {
        &self.state
    }

    pub fn reset(&mut self) {
        self.state = RateState::default();
    }

    pub fn compute(&mut self, current: AggregateTotals, elapsed: Duration) -> SpeedPair {
        let previous = &mut self.state.previous;
        // an unset side takes the current reading as its baseline
        if previous.received == 0 {
            previous.received = current.received;
        }
        if previous.transmitted == 0 {
            previous.transmitted = current.transmitted;
        }

        let secs = elapsed.as_secs_f64();
        let speed = SpeedPair {
            download: delta(current.received, previous.received) / secs,
            upload: delta(current.transmitted, previous.transmitted) / secs,
        };

        self.state = RateState {
            previous: current,
            sampled_at: Some(Local::now()),
        };
        speed
    }
}

fn delta(current: u64, previous: u64) -> f64 {
    (i128::from(current) - i128::from(previous)) as f64
}
