//! Summarization progress reporting.
//!
//! Reports progress while chunks are summarized so users can see how far
//! along a long document is. Progress is emitted on **stderr** so stdout
//! remains parseable for scripts.

use std::io::Write;

/// A single progress event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgressEvent {
    /// `completed` of `total` chunks are done (summarized, skipped, or failed).
    Chunk { completed: usize, total: usize },
    /// The request finished successfully.
    Finished { cached: bool },
}

/// Receives progress events. Called synchronously from the pipeline.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Human-friendly progress on stderr: "summarize  chunk 3 / 7  (43%)".
pub struct StderrProgress;

impl ProgressReporter for StderrProgress {
    fn report(&self, event: ProgressEvent) {
        let line = match &event {
            ProgressEvent::Chunk { completed, total } => format!(
                "summarize  chunk {} / {}  ({}%)\n",
                completed,
                total,
                percent(*completed, *total)
            ),
            ProgressEvent::Finished { cached: true } => "summarize  done (cached)\n".to_string(),
            ProgressEvent::Finished { cached: false } => "summarize  done\n".to_string(),
        };
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ProgressReporter for JsonProgress {
    fn report(&self, event: ProgressEvent) {
        if let Ok(line) = serde_json::to_string(&event_json(&event)) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{}", line);
            let _ = stderr.flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

fn event_json(event: &ProgressEvent) -> serde_json::Value {
    match event {
        ProgressEvent::Chunk { completed, total } => serde_json::json!({
            "event": "progress",
            "completed": completed,
            "total": total,
            "fraction": fraction(*completed, *total),
        }),
        ProgressEvent::Finished { cached } => serde_json::json!({
            "event": "done",
            "cached": cached,
        }),
    }
}

fn fraction(completed: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        completed as f64 / total as f64
    }
}

fn percent(completed: usize, total: usize) -> u32 {
    (fraction(completed, total) * 100.0).round() as u32
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds() {
        assert_eq!(percent(0, 3), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(3, 3), 100);
        assert_eq!(percent(0, 0), 100);
    }

    #[test]
    fn json_event_shape() {
        let v = event_json(&ProgressEvent::Chunk {
            completed: 1,
            total: 4,
        });
        assert_eq!(v["event"], "progress");
        assert_eq!(v["completed"], 1);
        assert_eq!(v["total"], 4);
        assert_eq!(v["fraction"], 0.25);

        let done = event_json(&ProgressEvent::Finished { cached: true });
        assert_eq!(done["event"], "done");
        assert_eq!(done["cached"], true);
    }
}
