//! View-state controllers for the knowledge-base assistant.
//!
//! Each controller owns its view state and the async operations that
//! change it: [`UploadController`], [`QueryController`], [`ChartViewer`],
//! [`ReferenceViewer`], [`HistoryViewer`] and [`AdminPanel`], plus the
//! synchronous [`OnboardingFlow`]. Controllers talk to the backend only
//! through [`kb_api_client::ApiClient`] and never read each other's state.
//!
//! Every issued request carries a generation [`Ticket`]; a response is
//! written to the view only if no newer request was started since.

pub mod admin;
pub mod chart;
mod errors;
pub mod flag_store;
mod generation;
pub mod history;
pub mod onboarding;
pub mod query;
pub mod references;
pub mod upload;

pub use admin::{AdminAction, AdminConfig, AdminPanel, AdminSession, AdminView, DemoGate};
pub use chart::{ChartKind, ChartSeries, ChartView, ChartViewer};
pub use errors::{ControllerError, ControllerResult, StoreError};
pub use flag_store::{FlagStore, JsonFileFlagStore, MemoryFlagStore};
pub use generation::{Dispatch, Ticket, ViewCell};
pub use history::{HistoryEntry, HistoryView, HistoryViewer};
pub use onboarding::{ONBOARDING_FLAG, OnboardingFlow, OnboardingStep};
pub use query::{QueryController, QueryView};
pub use references::{ReferenceView, ReferenceViewer};
pub use upload::{UploadController, UploadPhase, UploadTiming, UploadView};
