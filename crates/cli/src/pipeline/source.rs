//! NDJSON event source - one JSON event object per line.

use std::path::Path;

use contracts::Event;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::warn;

use crate::error::{CliError, Result};

/// Reads events line by line; malformed lines are logged and skipped
pub struct EventSource {
    lines: Lines<Box<dyn AsyncBufRead + Send + Unpin>>,
    line_number: u64,
    skipped: u64,
}

impl EventSource {
    /// Read from `path`, or stdin when `None`
    pub async fn open(path: Option<&Path>) -> Result<Self> {
        let reader: Box<dyn AsyncBufRead + Send + Unpin> = match path {
            Some(path) => {
                let file = tokio::fs::File::open(path)
                    .await
                    .map_err(|e| CliError::input_open(path.display().to_string(), e))?;
                Box::new(BufReader::new(file))
            }
            None => Box::new(BufReader::new(tokio::io::stdin())),
        };

        Ok(Self::from_reader(reader))
    }

    pub fn from_reader(reader: Box<dyn AsyncBufRead + Send + Unpin>) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
            skipped: 0,
        }
    }

    /// Next event, `None` at end of input
    pub async fn next_event(&mut self) -> Result<Option<Event>> {
        while let Some(line) = self.lines.next_line().await? {
            self.line_number += 1;
            if line.trim().is_empty() {
                continue;
            }

            match Event::from_json_line(&line) {
                Ok(event) => return Ok(Some(event)),
                Err(e) => {
                    self.skipped += 1;
                    warn!(line = self.line_number, error = %e, "Skipping malformed event");
                }
            }
        }

        Ok(None)
    }

    /// Number of malformed lines skipped so far
    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}
