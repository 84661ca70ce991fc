use std::io::Write;

use anyhow::{Context, Result};
use mw_audio::capture::CaptureStatus;
use mw_core::frame::{FeatureVector, TickReport};
use mw_core::mood::Mood;
use mw_scene::scene::SceneSummary;
use serde::Serialize;

/// One output line.
#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Record<'a> {
    Classified {
        tick: u64,
        mood: Mood,
        label: &'static str,
        changed: bool,
        intensity: f64,
        features: &'a FeatureVector,
    },
    Cycled {
        tick: u64,
        mood: Mood,
        label: &'static str,
    },
    Status {
        status: &'static str,
        message: &'static str,
    },
    Finished {
        ticks: u64,
        scene: &'a SceneSummary,
    },
}

fn status_name(status: CaptureStatus) -> &'static str {
    match status {
        CaptureStatus::Analyzing => "analyzing",
        CaptureStatus::Muted => "muted",
        CaptureStatus::Unavailable => "unavailable",
    }
}

/// Sends run events to the log and, with `--json`, as JSON lines to `out`.
pub struct Reporter<W> {
    out: W,
    json: bool,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, json: bool) -> Self {
        Self { out, json }
    }

    /// Report an engine tick. Only classification ticks produce output.
    ///
    /// # Errors
    /// Returns an error if the output cannot be written.
    pub fn tick(&mut self, report: &TickReport) -> Result<()> {
        if !report.classified {
            return Ok(());
        }
        if report.changed {
            log::info!(
                "Mood {} ({}) at tick {}, intensity {:.2}",
                report.mood,
                report.mood.label(),
                report.tick,
                report.intensity
            );
        }
        self.emit(&Record::Classified {
            tick: report.tick,
            mood: report.mood,
            label: report.mood.label(),
            changed: report.changed,
            intensity: report.intensity,
            features: &report.features,
        })
    }

    /// Report a timed mood pick.
    ///
    /// # Errors
    /// Returns an error if the output cannot be written.
    pub fn cycled(&mut self, tick: u64, mood: Mood) -> Result<()> {
        log::info!("Idle cycle picked {mood} ({}) at tick {tick}", mood.label());
        self.emit(&Record::Cycled {
            tick,
            mood,
            label: mood.label(),
        })
    }

    /// Report a capture status change.
    ///
    /// # Errors
    /// Returns an error if the output cannot be written.
    pub fn status(&mut self, status: CaptureStatus) -> Result<()> {
        match status {
            CaptureStatus::Unavailable => log::warn!("{}", status.message()),
            _ => log::info!("{}", status.message()),
        }
        self.emit(&Record::Status {
            status: status_name(status),
            message: status.message(),
        })
    }

    /// Report the end of a run.
    ///
    /// # Errors
    /// Returns an error if the output cannot be written.
    pub fn finished(&mut self, ticks: u64, scene: &SceneSummary) -> Result<()> {
        log::info!(
            "Stopped after {ticks} ticks on {} ({} entities)",
            scene.mood,
            scene.entities
        );
        self.emit(&Record::Finished { ticks, scene })?;
        self.out.flush().context("Cannot flush report output")
    }

    fn emit(&mut self, record: &Record<'_>) -> Result<()> {
        if !self.json {
            return Ok(());
        }
        serde_json::to_writer(&mut self.out, record).context("Cannot encode report")?;
        self.out
            .write_all(b"\n")
            .context("Cannot write report output")
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
