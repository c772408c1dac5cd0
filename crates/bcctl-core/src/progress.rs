use std::{io::Write, sync::Mutex};

use tracing::warn;

/// Out-of-band progress channel, e.g. a CI build log.
pub trait ProgressReporter: Send + Sync {
    fn report_progress(&self, message: &str);
}

/// Discards progress messages.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report_progress(&self, _message: &str) {}
}

/// Writes TeamCity `progressMessage` service messages.
pub struct TeamCityProgress<W> {
    out: Mutex<W>,
}

impl TeamCityProgress<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TeamCityProgress<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> ProgressReporter for TeamCityProgress<W> {
    fn report_progress(&self, message: &str) {
        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        };
        let line = format!("##teamcity[progressMessage '{}']", teamcity_escape(message));
        if let Err(e) = writeln!(out, "{line}").and_then(|_| out.flush()) {
            warn!(error = %e, "failed to write progress message");
        }
    }
}

/// Escape a value for a TeamCity service message.
pub fn teamcity_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '|' => escaped.push_str("||"),
            '\'' => escaped.push_str("|'"),
            '[' => escaped.push_str("|["),
            ']' => escaped.push_str("|]"),
            '\n' => escaped.push_str("|n"),
            '\r' => escaped.push_str("|r"),
            c => escaped.push(c),
        }
    }
    escaped
}
