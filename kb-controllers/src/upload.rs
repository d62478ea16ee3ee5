//! Document upload with simulated progress.
//!
//! `Idle -> Uploading -> {Succeeded, Failed} -> Idle`
//!
//! The transport reports no progress, so while the request is in flight a
//! ticker bumps a cosmetic percentage every [`UploadTiming::tick`], never
//! past [`UploadTiming::cap`]. The real response sets 100 (success) or 0
//! (failure); after [`UploadTiming::settle`] the bar drops back to 0 and the
//! phase returns to `Idle`, keeping the last result or error for display.

use std::time::Duration;

use kb_api_client::{ApiClient, FileUpload, UploadResult};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::errors::error_text;
use crate::generation::{Dispatch, Ticket, ViewCell};

/// Timing of the cosmetic progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTiming {
    /// Interval between simulated progress bumps.
    pub tick: Duration,
    /// Delay after completion before the bar resets to 0.
    pub settle: Duration,
    /// Highest percentage shown before the response arrives.
    pub cap: u8,
}

impl Default for UploadTiming {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(180),
            settle: Duration::from_millis(700),
            cap: 98,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UploadPhase {
    #[default]
    Idle,
    Uploading,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadView {
    pub phase: UploadPhase,
    /// Displayed percentage, 0..=100.
    pub progress: u8,
    pub file_name: Option<String>,
    pub result: Option<UploadResult>,
    pub error: Option<String>,
}

impl UploadView {
    /// Inputs are disabled while an upload is in flight.
    pub fn is_busy(&self) -> bool {
        self.phase == UploadPhase::Uploading
    }

    /// The progress bar is shown while uploading and until it settles.
    pub fn shows_progress(&self) -> bool {
        self.is_busy() || self.progress > 0
    }
}

#[derive(Debug, Clone)]
pub struct UploadController {
    client: ApiClient,
    view: ViewCell<UploadView>,
    timing: UploadTiming,
}

impl UploadController {
    pub fn new(client: ApiClient) -> Self {
        Self::with_timing(client, UploadTiming::default())
    }

    pub fn with_timing(client: ApiClient, timing: UploadTiming) -> Self {
        Self {
            client,
            view: ViewCell::default(),
            timing,
        }
    }

    pub fn view(&self) -> UploadView {
        self.view.snapshot()
    }

    /// Handles a drop or picker selection; only the first file is used.
    pub async fn select(&self, files: Vec<FileUpload>) -> Dispatch {
        let total = files.len();
        let Some(file) = files.into_iter().next() else {
            return Dispatch::Skipped;
        };
        if total > 1 {
            debug!(ignored = total - 1, "multiple files selected, using the first");
        }
        self.upload(file).await
    }

    /// Uploads one file. Skipped while another upload is in flight.
    pub async fn upload(&self, file: FileUpload) -> Dispatch {
        let Some(ticket) = self.view.try_begin(
            |v| !v.is_busy(),
            |v| {
                *v = UploadView {
                    phase: UploadPhase::Uploading,
                    progress: 0,
                    file_name: Some(file.file_name.clone()),
                    result: None,
                    error: None,
                };
            },
        ) else {
            debug!(file_name = %file.file_name, "upload already in flight, ignoring selection");
            return Dispatch::Skipped;
        };

        info!(file_name = %file.file_name, bytes = file.len(), "upload started");
        let ticker = tokio::spawn(simulate_progress(self.view.clone(), ticket, self.timing));

        let outcome = self.client.upload_file(&file).await;
        ticker.abort();

        let applied = self.view.apply(ticket, |v| match outcome {
            Ok(result) => {
                info!(file_name = %file.file_name, "upload succeeded");
                v.phase = UploadPhase::Succeeded;
                v.progress = 100;
                v.result = Some(result);
            }
            Err(e) => {
                warn!(file_name = %file.file_name, error = %e, "upload failed");
                v.phase = UploadPhase::Failed;
                v.progress = 0;
                v.error = Some(error_text(&e, "Upload failed"));
            }
        });

        tokio::spawn(settle(self.view.clone(), ticket, self.timing.settle));

        match applied {
            Some(()) => Dispatch::Applied,
            None => Dispatch::Stale,
        }
    }
}

async fn simulate_progress(view: ViewCell<UploadView>, ticket: Ticket, timing: UploadTiming) {
    let mut interval = tokio::time::interval(timing.tick);
    // The first tick completes immediately.
    interval.tick().await;
    let mut accumulated = 0.0_f64;

    loop {
        interval.tick().await;
        accumulated += rand::thread_rng().gen_range(7.0..24.0);
        let shown = accumulated.floor().min(f64::from(timing.cap)) as u8;

        let still_uploading = view.apply(ticket, |v| {
            if v.phase == UploadPhase::Uploading {
                v.progress = shown;
                true
            } else {
                false
            }
        });
        if still_uploading != Some(true) {
            break;
        }
    }
}

async fn settle(view: ViewCell<UploadView>, ticket: Ticket, delay: Duration) {
    tokio::time::sleep(delay).await;
    view.apply(ticket, |v| {
        v.progress = 0;
        v.phase = UploadPhase::Idle;
    });
}
