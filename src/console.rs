//! Line-oriented console hosting all controllers.
//!
//! The console plays the part of the page container: it owns one instance
//! of every controller, shows the onboarding tour first when it has not
//! been completed, loads references and chart data on start, and maps
//! typed commands onto controller operations.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use kb_api_client::{ApiClient, FileUpload};
use kb_controllers::{
    AdminPanel, ChartKind, ChartViewer, Dispatch, FlagStore, HistoryViewer, JsonFileFlagStore,
    OnboardingFlow, QueryController, ReferenceViewer, UploadController,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info};

use crate::config::AppConfig;
use crate::render;

const PROGRESS_REFRESH: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryCommand {
    Open,
    Close,
    Toggle(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnboardingCommand {
    Next,
    Back,
    Finish,
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    Open,
    Close,
    Password(String),
    Login(Option<String>),
    Action(String),
    Logout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Upload(PathBuf),
    Ask(String),
    Refs,
    Chart {
        kind: ChartKind,
        filter: Option<String>,
    },
    History(HistoryCommand),
    Onboarding(OnboardingCommand),
    Admin(AdminCommand),
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let (sub, arg) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        let arg = arg.trim();
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

        match head.to_ascii_lowercase().as_str() {
            "upload" => non_empty(rest)
                .map(|p| Command::Upload(PathBuf::from(p)))
                .ok_or_else(|| "usage: upload <path>".to_string()),
            // Blank questions are passed through; the controller ignores them.
            "ask" => Ok(Command::Ask(rest.to_string())),
            "refs" => Ok(Command::Refs),
            "chart" => {
                let kind = if sub.is_empty() { ChartKind::default() } else { sub.parse::<ChartKind>()? };
                Ok(Command::Chart {
                    kind,
                    filter: non_empty(arg),
                })
            }
            "history" => match sub {
                "open" => Ok(Command::History(HistoryCommand::Open)),
                "close" => Ok(Command::History(HistoryCommand::Close)),
                "toggle" => arg
                    .parse()
                    .map(|idx| Command::History(HistoryCommand::Toggle(idx)))
                    .map_err(|_| "usage: history toggle <n>".to_string()),
                _ => Err("usage: history open|close|toggle <n>".to_string()),
            },
            "onboarding" | "tour" => match sub {
                "next" => Ok(Command::Onboarding(OnboardingCommand::Next)),
                "back" => Ok(Command::Onboarding(OnboardingCommand::Back)),
                "finish" => Ok(Command::Onboarding(OnboardingCommand::Finish)),
                "skip" => Ok(Command::Onboarding(OnboardingCommand::Skip)),
                _ => Err("usage: onboarding next|back|finish|skip".to_string()),
            },
            "next" => Ok(Command::Onboarding(OnboardingCommand::Next)),
            "back" => Ok(Command::Onboarding(OnboardingCommand::Back)),
            "finish" => Ok(Command::Onboarding(OnboardingCommand::Finish)),
            "skip" => Ok(Command::Onboarding(OnboardingCommand::Skip)),
            "admin" => match sub {
                "open" => Ok(Command::Admin(AdminCommand::Open)),
                "close" => Ok(Command::Admin(AdminCommand::Close)),
                "password" => Ok(Command::Admin(AdminCommand::Password(arg.to_string()))),
                "login" => Ok(Command::Admin(AdminCommand::Login(non_empty(arg)))),
                "action" => non_empty(arg)
                    .map(|a| Command::Admin(AdminCommand::Action(a)))
                    .ok_or_else(|| "usage: admin action <id>".to_string()),
                "logout" => Ok(Command::Admin(AdminCommand::Logout)),
                _ => Err("usage: admin open|close|password <text>|login [password]|action <id>|logout".to_string()),
            },
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("unknown command: {other} (try `help`)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Quit,
}

pub struct Console<W> {
    out: W,
    upload: UploadController,
    query: QueryController,
    chart: ChartViewer,
    references: ReferenceViewer,
    history: HistoryViewer,
    admin: AdminPanel,
    onboarding: OnboardingFlow,
}

impl<W> Console<W>
where
    W: AsyncWrite + Unpin,
{
    /// Builds every controller on one shared client and a file-backed flag store.
    pub fn new(cfg: &AppConfig, out: W) -> Result<Self> {
        let store: Arc<dyn FlagStore> = Arc::new(JsonFileFlagStore::new(cfg.flags_path()));
        Self::with_store(cfg, store, out)
    }

    pub fn with_store(cfg: &AppConfig, store: Arc<dyn FlagStore>, out: W) -> Result<Self> {
        let client = ApiClient::new(&cfg.api)?;
        let onboarding = OnboardingFlow::new(store)?.on_complete(|| info!("onboarding dismissed"));

        Ok(Self {
            out,
            upload: UploadController::new(client.clone()),
            query: QueryController::new(client.clone()),
            chart: ChartViewer::new(client.clone()),
            references: ReferenceViewer::new(client.clone()),
            history: HistoryViewer::new(client.clone()),
            admin: AdminPanel::new(client, cfg.admin.clone()),
            onboarding,
        })
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Reads commands line by line until `quit` or end of input.
    pub async fn run<R>(&mut self, input: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        self.start().await?;

        let mut lines = input.lines();
        loop {
            self.write("> ").await?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<Command>() {
                Ok(cmd) => {
                    if self.execute(cmd).await? == Step::Quit {
                        break;
                    }
                }
                Err(msg) => self.write(&format!("{}\n", msg.red())).await?,
            }
        }
        info!("console closed");
        Ok(())
    }

    /// Initial screen: the tour if pending, then references and chart.
    pub async fn start(&mut self) -> Result<()> {
        if self.onboarding.is_open() {
            let tour = render::onboarding(&self.onboarding);
            self.write(&tour).await?;
        }
        tokio::join!(self.references.load(), self.chart.load(ChartKind::default(), None));
        let screen = format!(
            "{}{}",
            render::references(&self.references.view()),
            render::chart(&self.chart.view())
        );
        self.write(&screen).await
    }

    pub async fn execute(&mut self, cmd: Command) -> Result<Step> {
        debug!(?cmd, "console command");

        if self.onboarding.is_open() && !matches!(cmd, Command::Onboarding(_) | Command::Help | Command::Quit) {
            self.write("Finish or skip the tour first (next | back | skip).\n").await?;
            return Ok(Step::Continue);
        }

        match cmd {
            Command::Upload(path) => self.upload_path(path).await?,
            Command::Ask(question) => {
                if self.query.submit(&question).await != Dispatch::Skipped {
                    let text = render::query(&self.query.view());
                    self.write(&text).await?;
                }
            }
            Command::Refs => {
                self.references.load().await;
                let text = render::references(&self.references.view());
                self.write(&text).await?;
            }
            Command::Chart { kind, filter } => {
                self.chart.load(kind, filter.as_deref()).await;
                let text = render::chart(&self.chart.view());
                self.write(&text).await?;
            }
            Command::History(cmd) => self.history_command(cmd).await?,
            Command::Onboarding(cmd) => self.onboarding_command(cmd).await?,
            Command::Admin(cmd) => self.admin_command(cmd).await?,
            Command::Help => self.write(&format!("{}\n", render::HELP)).await?,
            Command::Quit => return Ok(Step::Quit),
        }
        Ok(Step::Continue)
    }

    async fn upload_path(&mut self, path: PathBuf) -> Result<()> {
        let file = match FileUpload::from_path(&path).await {
            Ok(file) => file,
            Err(e) => {
                error!(path = %path.display(), error = %e, "cannot read upload");
                let msg = format!("Cannot read {}: {e}", path.display());
                return self.write(&format!("{}\n", msg.red())).await;
            }
        };

        let task = tokio::spawn({
            let upload = self.upload.clone();
            async move { upload.select(vec![file]).await }
        });

        let mut refresh = tokio::time::interval(PROGRESS_REFRESH);
        let mut last_shown = None;
        while !task.is_finished() {
            refresh.tick().await;
            let view = self.upload.view();
            if view.is_busy() && last_shown != Some(view.progress) {
                last_shown = Some(view.progress);
                self.write(&format!("uploading... {}%\n", view.progress)).await?;
            }
        }

        if task.await? == Dispatch::Skipped {
            return self.write("An upload is already in progress.\n").await;
        }
        let text = render::upload(&self.upload.view());
        self.write(&text).await
    }

    async fn history_command(&mut self, cmd: HistoryCommand) -> Result<()> {
        match cmd {
            HistoryCommand::Open => {
                self.history.open().await;
            }
            HistoryCommand::Close => {
                self.history.close();
                return self.write("History closed.\n").await;
            }
            HistoryCommand::Toggle(idx) => {
                if !self.history.toggle(idx) {
                    return self.write(&format!("No history entry {idx}.\n")).await;
                }
            }
        }
        let text = render::history(&self.history.view());
        self.write(&text).await
    }

    async fn onboarding_command(&mut self, cmd: OnboardingCommand) -> Result<()> {
        if !self.onboarding.is_open() {
            return self.write("The tour is already completed.\n").await;
        }
        let closed = match cmd {
            OnboardingCommand::Next if !self.onboarding.is_last_step() => {
                self.onboarding.advance();
                false
            }
            OnboardingCommand::Back => {
                self.onboarding.retreat();
                false
            }
            OnboardingCommand::Next | OnboardingCommand::Finish => {
                self.onboarding.finish()?;
                true
            }
            OnboardingCommand::Skip => {
                self.onboarding.skip()?;
                true
            }
        };
        if closed {
            self.write("Tour closed. Type `help` for commands.\n").await
        } else {
            let text = render::onboarding(&self.onboarding);
            self.write(&text).await
        }
    }

    async fn admin_command(&mut self, cmd: AdminCommand) -> Result<()> {
        match cmd {
            AdminCommand::Open => self.admin.open(),
            AdminCommand::Close => {
                self.admin.close();
                return self.write("Admin panel closed.\n").await;
            }
            AdminCommand::Password(text) => self.admin.set_password_input(&text),
            AdminCommand::Login(Some(attempt)) => {
                self.admin.login(&attempt).await;
            }
            AdminCommand::Login(None) => {
                self.admin.submit_login().await;
            }
            AdminCommand::Action(action) => {
                if self.admin.perform(&action).await == Dispatch::Skipped {
                    let msg = format!("Action `{action}` is not available.");
                    self.write(&format!("{}\n", msg.yellow())).await?;
                }
            }
            AdminCommand::Logout => self.admin.logout(),
        }
        let text = render::admin(&self.admin.view(), self.admin.actions());
        self.write(&text).await
    }

    async fn write(&mut self, text: &str) -> Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kb_api_client::ApiConfig;
    use kb_controllers::{AdminConfig, MemoryFlagStore, ONBOARDING_FLAG};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn parses_commands() {
        assert_eq!("upload ./a b.pdf".parse(), Ok(Command::Upload(PathBuf::from("./a b.pdf"))));
        assert_eq!("ask  what is it? ".parse(), Ok(Command::Ask("what is it?".into())));
        assert_eq!(
            "chart line revenue by month".parse(),
            Ok(Command::Chart {
                kind: ChartKind::Line,
                filter: Some("revenue by month".into())
            })
        );
        assert_eq!(
            "chart".parse(),
            Ok(Command::Chart {
                kind: ChartKind::Bar,
                filter: None
            })
        );
        assert_eq!("history toggle 2".parse(), Ok(Command::History(HistoryCommand::Toggle(2))));
        assert_eq!("skip".parse(), Ok(Command::Onboarding(OnboardingCommand::Skip)));
        assert_eq!("admin login".parse(), Ok(Command::Admin(AdminCommand::Login(None))));
        assert_eq!(
            "admin action list_users".parse(),
            Ok(Command::Admin(AdminCommand::Action("list_users".into())))
        );
    }

    #[test]
    fn rejects_bad_commands() {
        assert!("upload".parse::<Command>().is_err());
        assert!("chart pie".parse::<Command>().is_err());
        assert!("history toggle x".parse::<Command>().is_err());
        assert!("dance".parse::<Command>().is_err());
    }

    fn config_for(server: &MockServer) -> AppConfig {
        AppConfig {
            api: ApiConfig::with_base_url(server.uri()).unwrap(),
            state_dir: PathBuf::from("unused"),
            admin: AdminConfig::default(),
        }
    }

    #[tokio::test]
    async fn tour_blocks_commands_until_dismissed() {
        colored::control::set_override(false);
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/references"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "references": ["a.pdf"] })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/chart-data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "labels": ["A"], "values": [3] })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "answer": "Forty-two." })))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryFlagStore::new());
        let mut console = Console::with_store(&config_for(&server), store.clone(), Vec::new()).unwrap();
        console
            .run(&b"ask too early\nnext\nskip\nask meaning of life\nquit\n"[..])
            .await
            .unwrap();

        let out = String::from_utf8(console.into_inner()).unwrap();
        assert!(out.contains("Step 1 of 6"));
        assert!(out.contains("a.pdf"));
        assert!(out.contains("Finish or skip the tour first"));
        assert!(out.contains("Step 2 of 6"));
        assert!(out.contains("Answer:\nForty-two."));
        assert!(store.get(ONBOARDING_FLAG).unwrap());
    }

    #[tokio::test]
    async fn admin_flow_over_console() {
        colored::control::set_override(false);
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "uploads": 7 })))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryFlagStore::with_flag(ONBOARDING_FLAG, true));
        let mut console = Console::with_store(&config_for(&server), store, Vec::new()).unwrap();
        for line in ["admin open", "admin login nope", "admin password admin123", "admin login"] {
            console.execute(line.parse().unwrap()).await.unwrap();
        }

        let out = String::from_utf8(console.into_inner()).unwrap();
        assert!(out.contains("Incorrect password."));
        assert!(out.contains("\"uploads\": 7"));
        assert!(out.contains("Quick actions:"));
    }
}
