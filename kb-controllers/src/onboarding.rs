//! First-run guided tour.
//!
//! A fixed, linear list of steps. Finishing or skipping sets a persisted
//! flag so the tour is not shown on later launches.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::errors::ControllerResult;
use crate::flag_store::FlagStore;

/// Flag key marking the tour as completed.
pub const ONBOARDING_FLAG: &str = "onboarding_complete";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingStep {
    pub title: &'static str,
    pub lines: &'static [&'static str],
}

pub const DEFAULT_STEPS: &[OnboardingStep] = &[
    OnboardingStep {
        title: "Welcome to Knowledge Base Assistant!",
        lines: &[
            "This app helps you upload documents, ask questions about them, and view answers with references and visualizations.",
            "Let's take a 1-minute tour. Choose Next to continue!",
        ],
    },
    OnboardingStep {
        title: "Upload Documents",
        lines: &[
            "Drop or browse to upload PDF, DOCX, or TXT files.",
            "Your documents are analyzed for your personalized Q&A experience.",
        ],
    },
    OnboardingStep {
        title: "Ask Questions",
        lines: &[
            "Type a natural language question, e.g. \"What's the project about?\"",
            "Get instant answers based on your uploaded content.",
        ],
    },
    OnboardingStep {
        title: "See Answers, References & Charts",
        lines: &[
            "View the answer, sources, and follow-up questions.",
            "Use charts to visualize key data extracted from your files.",
        ],
    },
    OnboardingStep {
        title: "Review Query History",
        lines: &[
            "Open the history panel to browse past questions and results.",
            "Great for tracking your research progress!",
        ],
    },
    OnboardingStep {
        title: "All Set!",
        lines: &[
            "You're ready to start using the Knowledge Base Assistant.",
            "Have fun exploring!",
        ],
    },
];

type CompletionHook = Box<dyn Fn() + Send + Sync>;

pub struct OnboardingFlow {
    steps: Vec<OnboardingStep>,
    index: usize,
    open: bool,
    store: Arc<dyn FlagStore>,
    on_complete: Option<CompletionHook>,
}

impl fmt::Debug for OnboardingFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnboardingFlow")
            .field("steps", &self.steps.len())
            .field("index", &self.index)
            .field("open", &self.open)
            .field("store", &self.store)
            .finish()
    }
}

impl OnboardingFlow {
    /// Creates the tour with [`DEFAULT_STEPS`]; it starts open unless the
    /// completion flag is already set.
    pub fn new(store: Arc<dyn FlagStore>) -> ControllerResult<Self> {
        Self::with_steps(store, DEFAULT_STEPS.to_vec())
    }

    pub fn with_steps(store: Arc<dyn FlagStore>, steps: Vec<OnboardingStep>) -> ControllerResult<Self> {
        let completed = store.get(ONBOARDING_FLAG)?;
        Ok(Self {
            steps,
            index: 0,
            open: !completed,
            store,
            on_complete: None,
        })
    }

    /// Registers a hook run on finish or skip.
    pub fn on_complete(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Box::new(hook));
        self
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn current(&self) -> Option<&OnboardingStep> {
        self.steps.get(self.index)
    }

    pub fn can_go_back(&self) -> bool {
        self.index > 0
    }

    pub fn is_last_step(&self) -> bool {
        self.index + 1 >= self.steps.len()
    }

    /// Moves to the next step, staying on the last one.
    pub fn advance(&mut self) -> usize {
        self.index = (self.index + 1).min(self.steps.len().saturating_sub(1));
        self.index
    }

    /// Moves to the previous step, staying on the first one.
    pub fn retreat(&mut self) -> usize {
        self.index = self.index.saturating_sub(1);
        self.index
    }

    /// Persists completion, closes the tour and runs the completion hook.
    pub fn finish(&mut self) -> ControllerResult<()> {
        self.store.set(ONBOARDING_FLAG, true)?;
        self.open = false;
        info!(step = self.index, "onboarding completed");
        if let Some(hook) = &self.on_complete {
            hook();
        }
        Ok(())
    }

    /// Dismissing the tour counts as finishing it.
    pub fn skip(&mut self) -> ControllerResult<()> {
        self.finish()
    }
}
