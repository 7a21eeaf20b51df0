mod tracker;

use anyhow::Result;
use ferry_transfer::{ProgressStatus, TransferComplete, TransferError, TransferResult};
use serde::Serialize;

pub use tracker::{ProgressTracker, ProgressTrackerConfig, Tracker};

/// Presents transfer events either as a progress bar or as JSON lines.
pub enum Reporter {
    Json,
    Bar(Option<ProgressTracker>),
}

impl Reporter {
    pub fn new(json: bool) -> Self {
        if json { Reporter::Json } else { Reporter::Bar(None) }
    }

    pub fn progress(&mut self, progress: &ProgressStatus) -> Result<()> {
        match self {
            Reporter::Json => print_json(&TransferResult::Ongoing(*progress)),
            Reporter::Bar(tracker) => {
                tracker
                    .get_or_insert_with(|| {
                        ProgressTracker::new(ProgressTrackerConfig {
                            len: progress.content_length.filter(|_| progress.length_computable),
                        })
                    })
                    .update(progress);
                Ok(())
            }
        }
    }

    pub fn complete(&mut self, complete: &TransferComplete) -> Result<()> {
        match self {
            Reporter::Json => print_json(&TransferResult::Complete(complete.clone())),
            Reporter::Bar(tracker) => {
                if let Some(tracker) = tracker.take() {
                    tracker.finish(Some(format!("HTTP {}", complete.response_code())));
                }
                if let Some(body) = &complete.response_body {
                    println!("{body}");
                }
                Ok(())
            }
        }
    }

    pub fn failed(&mut self, err: &TransferError) -> Result<()> {
        match self {
            Reporter::Json => print_json(err),
            Reporter::Bar(tracker) => {
                if let Some(tracker) = tracker.take() {
                    tracker.abandon(err.code());
                }
                Ok(())
            }
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
