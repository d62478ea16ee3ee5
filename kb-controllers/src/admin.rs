//! Admin panel: demo password gate, dashboard and quick actions.
//!
//! `LoggedOut -> (password match) -> LoggedIn -> (logout | close) -> LoggedOut`
//!
//! The password check happens entirely on the client against a configured
//! string. It is a demo gate only and protects nothing; real authorization
//! has to be enforced by the backend.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use kb_api_client::ApiClient;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::errors::{ControllerError, ControllerResult};
use crate::generation::{Dispatch, ViewCell};

/// Demo-gate secret used when `KB_ADMIN_PASSWORD` is unset.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Non-cryptographic client-side access check. NOT a security boundary.
#[derive(Clone)]
pub struct DemoGate {
    secret: String,
}

impl fmt::Debug for DemoGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DemoGate").field("secret", &"<redacted>").finish()
    }
}

impl Default for DemoGate {
    fn default() -> Self {
        Self::new(DEFAULT_ADMIN_PASSWORD)
    }
}

impl DemoGate {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Plain string equality.
    pub fn admits(&self, attempt: &str) -> bool {
        attempt == self.secret
    }
}

/// One entry of the quick-action menu: button label and request payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminAction {
    pub label: String,
    pub action: String,
}

impl AdminAction {
    pub fn new(label: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: action.into(),
        }
    }
}

pub fn default_actions() -> Vec<AdminAction> {
    vec![
        AdminAction::new("Reprocess All Uploads", "reprocess_uploads"),
        AdminAction::new("List All Users", "list_users"),
        AdminAction::new("Download Server Logs", "download_logs"),
        AdminAction::new("Clear Query History", "clear_history"),
    ]
}

/// Static admin configuration, loaded once at startup.
///
/// # Environment variables
/// - `KB_ADMIN_PASSWORD`     = demo-gate secret (default `admin123`)
/// - `KB_ADMIN_ACTIONS_FILE` = optional JSON `[{"label": .., "action": ..}]`
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub gate: DemoGate,
    pub actions: Vec<AdminAction>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            gate: DemoGate::default(),
            actions: default_actions(),
        }
    }
}

impl AdminConfig {
    pub fn from_env() -> ControllerResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> ControllerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let gate = read("KB_ADMIN_PASSWORD")
            .map(DemoGate::new)
            .unwrap_or_default();
        let actions = match read("KB_ADMIN_ACTIONS_FILE") {
            Some(path) => load_actions_file(Path::new(path.trim()))?,
            None => default_actions(),
        };

        Ok(Self { gate, actions })
    }

    pub fn find_action(&self, action: &str) -> Option<&AdminAction> {
        self.actions.iter().find(|a| a.action == action)
    }
}

/// Reads a JSON action menu from disk.
pub fn load_actions_file(path: &Path) -> ControllerResult<Vec<AdminAction>> {
    let action_file_error = |reason: String| ControllerError::ActionFile {
        path: path.display().to_string(),
        reason,
    };
    let bytes = std::fs::read(path).map_err(|e| action_file_error(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| action_file_error(e.to_string()))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AdminSession {
    #[default]
    LoggedOut,
    LoggedIn,
}

/// Feedback for one quick action, independent of the others.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionFeedback {
    pub loading: bool,
    /// Pretty-printed JSON result of the last successful dispatch.
    pub message: Option<String>,
    pub error: Option<String>,
    seq: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminView {
    pub open: bool,
    pub session: AdminSession,
    pub password_input: String,
    pub login_error: Option<String>,
    pub dashboard_loading: bool,
    /// Dashboard payload; on failure `{"error": ".."}`.
    pub dashboard: Option<Value>,
    /// Keyed by action id.
    pub actions: BTreeMap<String, ActionFeedback>,
}

impl AdminView {
    pub fn is_authenticated(&self) -> bool {
        self.session == AdminSession::LoggedIn
    }

    pub fn dashboard_error(&self) -> Option<&str> {
        self.dashboard.as_ref()?.get("error")?.as_str()
    }

    pub fn action(&self, action: &str) -> Option<&ActionFeedback> {
        self.actions.get(action)
    }
}

#[derive(Debug, Clone)]
pub struct AdminPanel {
    client: ApiClient,
    config: Arc<AdminConfig>,
    view: ViewCell<AdminView>,
}

impl AdminPanel {
    pub fn new(client: ApiClient, config: AdminConfig) -> Self {
        Self {
            client,
            config: Arc::new(config),
            view: ViewCell::default(),
        }
    }

    pub fn view(&self) -> AdminView {
        self.view.snapshot()
    }

    pub fn actions(&self) -> &[AdminAction] {
        &self.config.actions
    }

    /// Opens the panel at the login prompt. No-op if already open.
    pub fn open(&self) {
        if self.view.read(|v| v.open) {
            return;
        }
        self.view.invalidate(|v| {
            *v = AdminView {
                open: true,
                ..AdminView::default()
            };
        });
    }

    /// Closes the panel and discards everything fetched.
    pub fn close(&self) {
        self.view.invalidate(|v| *v = AdminView::default());
        info!("admin panel closed");
    }

    /// Logs out, keeping the panel open at the login prompt.
    pub fn logout(&self) {
        self.view.invalidate(|v| {
            let open = v.open;
            *v = AdminView {
                open,
                ..AdminView::default()
            };
        });
        info!("admin logged out");
    }

    /// Edits the password field; any login error is cleared.
    pub fn set_password_input(&self, text: &str) {
        self.view.update(|v| {
            v.password_input = text.to_string();
            v.login_error = None;
        });
    }

    /// Types `attempt` into the password field and submits it.
    pub async fn login(&self, attempt: &str) -> Dispatch {
        self.set_password_input(attempt);
        self.submit_login().await
    }

    /// Checks the password field against the demo gate.
    ///
    /// The field is cleared either way. On a match the session becomes
    /// `LoggedIn` and the dashboard is fetched once.
    pub async fn submit_login(&self) -> Dispatch {
        let gate = &self.config.gate;
        let ticket = self.view.try_begin(
            |v| v.open && !v.is_authenticated() && gate.admits(&v.password_input),
            |v| {
                v.session = AdminSession::LoggedIn;
                v.password_input.clear();
                v.login_error = None;
                v.dashboard = None;
                v.dashboard_loading = true;
                v.actions.clear();
            },
        );

        let Some(ticket) = ticket else {
            self.view.update(|v| {
                v.password_input.clear();
                if v.open && !v.is_authenticated() {
                    v.login_error = Some("Incorrect password.".to_string());
                    warn!("admin login rejected");
                }
            });
            return Dispatch::Skipped;
        };

        info!("admin logged in, loading dashboard");
        let outcome = self.client.get_admin_data().await;

        let applied = self.view.apply(ticket, |v| {
            v.dashboard_loading = false;
            v.dashboard = Some(match outcome {
                Ok(data) => data,
                Err(e) => {
                    warn!(error = %e, "admin dashboard request failed");
                    json!({ "error": format!("Failed to load admin data: {e}") })
                }
            });
        });

        match applied {
            Some(()) => Dispatch::Applied,
            None => {
                warn!("dropping stale admin dashboard response");
                Dispatch::Stale
            }
        }
    }

    /// Dispatches one quick action from the configured menu.
    ///
    /// Other actions stay available while this one is in flight; only a
    /// repeat of the same action supersedes its earlier response.
    pub async fn perform(&self, action: &str) -> Dispatch {
        if self.config.find_action(action).is_none() {
            warn!(action, "unknown admin action");
            return Dispatch::Skipped;
        }

        let started = self.view.update(|v| {
            if !v.open || !v.is_authenticated() {
                return None;
            }
            let feedback = v.actions.entry(action.to_string()).or_default();
            feedback.seq += 1;
            feedback.loading = true;
            feedback.message = None;
            feedback.error = None;
            Some(feedback.seq)
        });
        let Some(seq) = started else {
            return Dispatch::Skipped;
        };
        let session = self.view.current();

        info!(action, "dispatching admin action");
        let outcome = self.client.perform_admin_action(action).await;

        let applied = self.view.apply(session, |v| {
            let Some(feedback) = v.actions.get_mut(action).filter(|f| f.seq == seq) else {
                return false;
            };
            feedback.loading = false;
            match outcome {
                Ok(result) => {
                    feedback.message = Some(
                        serde_json::to_string_pretty(&result).unwrap_or_else(|_| result.to_string()),
                    );
                }
                Err(e) => {
                    warn!(action, error = %e, "admin action failed");
                    feedback.error = Some(format!("Admin action failed: {e}"));
                }
            }
            true
        });

        if applied == Some(true) {
            Dispatch::Applied
        } else {
            warn!(action, "dropping stale admin action response");
            Dispatch::Stale
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn gate_is_plain_equality() {
        let gate = DemoGate::default();
        assert!(gate.admits("admin123"));
        assert!(!gate.admits("Admin123"));
        assert!(!gate.admits("admin123 "));
        assert!(!format!("{gate:?}").contains("admin123"));
    }

    #[test]
    fn default_menu_has_four_actions() {
        let ids: Vec<_> = default_actions().into_iter().map(|a| a.action).collect();
        assert_eq!(
            ids,
            ["reprocess_uploads", "list_users", "download_logs", "clear_history"]
        );
    }

    #[test]
    fn config_reads_password_and_action_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("actions.json");
        std::fs::write(&path, r#"[{"label": "Rebuild Index", "action": "rebuild_index"}]"#).unwrap();

        let vars: HashMap<&str, String> = HashMap::from([
            ("KB_ADMIN_PASSWORD", "s3cret".to_string()),
            ("KB_ADMIN_ACTIONS_FILE", path.display().to_string()),
        ]);
        let cfg = AdminConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();

        assert!(cfg.gate.admits("s3cret"));
        assert_eq!(cfg.actions, vec![AdminAction::new("Rebuild Index", "rebuild_index")]);
        assert!(cfg.find_action("list_users").is_none());
    }

    #[test]
    fn config_reports_bad_action_file() {
        let err = AdminConfig::from_lookup(|k| {
            (k == "KB_ADMIN_ACTIONS_FILE").then(|| "/nonexistent/actions.json".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ControllerError::ActionFile { .. }));
    }

    #[test]
    fn dashboard_error_is_read_from_payload() {
        let view = AdminView {
            dashboard: Some(json!({ "error": "Failed to load admin data: down" })),
            ..AdminView::default()
        };
        assert_eq!(view.dashboard_error(), Some("Failed to load admin data: down"));
    }
}
