use super::rate::SpeedPair;

pub const UNITS: [&str; 9] = [
    "B/s", "K/s", "M/s", "G/s", "T/s", "P/s", "E/s", "Z/s", "Y/s",
];

const STEP: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// Always the same number of decimals.
    Fixed(usize),
    /// Fewer decimals as the scaled value grows: `0.42`, `4.20`, `42.0`, `420`.
    Adaptive,
}

impl Default for Precision {
    fn default() -> Self {
        Self::Fixed(2)
    }
}

impl Precision {
    fn decimals(self, value: f64) -> usize {
        match self {
            Self::Fixed(decimals) => decimals,
            Self::Adaptive => {
                let magnitude = value.abs();
                if magnitude >= 100.0 || magnitude < 0.01 {
                    0
                } else if magnitude >= 10.0 {
                    1
                } else {
                    2
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpeedFormatter {
    precision: Precision,
}

impl SpeedFormatter {
    pub fn new(precision: Precision) -> Self {
        Self { precision }
    }

    pub fn format(&self, amount: f64) -> String {
        let mut amount = amount;
        let mut unit = 0;
        while amount >= STEP && unit < UNITS.len() - 1 {
            amount /= STEP;
            unit += 1;
        }

        let decimals = self.precision.decimals(amount);
        format!("{:.*} {}", decimals, amount, UNITS[unit])
    }

    pub fn line(&self, speed: SpeedPair) -> String {
        format!(
            "↓ {} ↑ {}",
            self.format(speed.download),
            self.format(speed.upload)
        )
    }
}
