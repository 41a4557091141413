use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use super::time::current_time;
use crate::error::Result;

/// Where the status line goes once per tick.
pub trait Sink {
    fn show(&mut self, text: &str) -> Result<()>;
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Plain,
    /// One `{"text": ...}` object per line, as waybar custom modules expect.
    Json,
}

#[derive(Serialize)]
struct StatusLine<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    time: Option<String>,
}

pub struct WriterSink<W: Write> {
    writer: W,
    output: OutputFormat,
    timestamp: Option<String>,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W, output: OutputFormat, timestamp: Option<String>) -> Self {
        Self {
            writer,
            output,
            timestamp,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl WriterSink<io::Stdout> {
    pub fn stdout(output: OutputFormat, timestamp: Option<String>) -> Self {
        Self::new(io::stdout(), output, timestamp)
    }
}

impl<W: Write> Sink for WriterSink<W> {
    fn show(&mut self, text: &str) -> Result<()> {
        let time = self.timestamp.as_deref().map(current_time);
        match self.output {
            OutputFormat::Plain => match time {
                Some(time) => writeln!(self.writer, "{} {}", time, text)?,
                None => writeln!(self.writer, "{}", text)?,
            },
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.writer, &StatusLine { text, time })
                    .map_err(io::Error::from)?;
                writeln!(self.writer)?;
            }
        }
        // bars read line by line from a pipe
        self.writer.flush()?;
        Ok(())
    }
}
