use std::{
    fs,
    path::{Path, PathBuf},
};

use glob::Pattern;

use crate::error::{MonitorError, Result};

pub const PROC_NET_DEV: &str = "/proc/net/dev";

/// Loopback, bridge, tunnel and other virtual interfaces. Their traffic is
/// already counted on a physical interface.
const EXCLUDED: [&str; 8] = [
    "lo",
    "ifb[0-9]*",
    "lxdbr[0-9]*",
    "virbr[0-9]*",
    "br[0-9]*",
    "vnet[0-9]*",
    "tun[0-9]*",
    "tap[0-9]*",
];

const NAME_FIELD: usize = 0;
const RX_BYTES_FIELD: usize = 1;
const TX_BYTES_FIELD: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceSample {
    pub name: String,
    pub received: u64,
    pub transmitted: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateTotals {
    pub received: u64,
    pub transmitted: u64,
}

impl AggregateTotals {
    pub fn new(received: u64, transmitted: u64) -> Self {
        Self {
            received,
            transmitted,
        }
    }

    fn add(&mut self, sample: &InterfaceSample) {
        self.received = self.received.saturating_add(sample.received);
        self.transmitted = self.transmitted.saturating_add(sample.transmitted);
    }
}

#[derive(Debug, Clone)]
pub struct InterfaceFilter {
    excluded: Vec<Pattern>,
}

impl InterfaceFilter {
    /// Built-in exclusions plus any extra glob patterns.
    pub fn with_extra<S: AsRef<str>>(extra: &[S]) -> Result<Self> {
        let mut excluded = EXCLUDED
            .iter()
            .map(|pattern| compile(pattern))
            .collect::<Result<Vec<_>>>()?;
        for pattern in extra {
            excluded.push(compile(pattern.as_ref())?);
        }
        Ok(Self { excluded })
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded.iter().any(|pattern| pattern.matches(name))
    }
}

impl Default for InterfaceFilter {
    fn default() -> Self {
        let excluded = EXCLUDED
            .iter()
            .filter_map(|pattern| compile(pattern).ok())
            .collect();
        Self { excluded }
    }
}

fn compile(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).map_err(|source| MonitorError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Splits one `/proc/net/dev` line. Any run of non-word characters is a
/// separator, so both `eth0: 123` and `eth0:123` yield `eth0` then `123`.
pub fn parse_line(line: &str) -> Option<InterfaceSample> {
    let fields: Vec<&str> = line
        .trim()
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|field| !field.is_empty())
        .collect();
    if fields.len() <= 2 {
        return None;
    }

    let received = fields.get(RX_BYTES_FIELD)?.parse::<u64>().ok()?;
    let transmitted = fields.get(TX_BYTES_FIELD)?.parse::<u64>().ok()?;
    Some(InterfaceSample {
        name: fields[NAME_FIELD].to_string(),
        received,
        transmitted,
    })
}

pub fn parse_net_dev(content: &str, filter: &InterfaceFilter) -> AggregateTotals {
    content
        .lines()
        .filter_map(parse_line)
        .filter(|sample| !filter.is_excluded(&sample.name))
        .fold(AggregateTotals::default(), |mut totals, sample| {
            totals.add(&sample);
            totals
        })
}

#[derive(Debug, Clone)]
pub struct SampleReader {
    source: PathBuf,
    filter: InterfaceFilter,
}

impl SampleReader {
    pub fn new(source: impl Into<PathBuf>, filter: InterfaceFilter) -> Self {
        Self {
            source: source.into(),
            filter,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn read_totals(&self) -> Result<AggregateTotals> {
        let content =
            fs::read_to_string(&self.source).map_err(|source| MonitorError::SourceRead {
                path: self.source.clone(),
                source,
            })?;
        Ok(parse_net_dev(&content, &self.filter))
    }
}
