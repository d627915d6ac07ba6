use trackrak_shared::{ActivationProgress, ActivationRun, Masked, Offer, SessionIds};

/// Which panel the widget is showing
#[derive(Debug, Clone, PartialEq)]
pub enum FlowState {
    /// Not mounted at all
    Closed,
    /// A message left behind by the previous run, shown before anything else
    PendingMessage { message: String },
    LoginRequired { notice: Option<LoginNotice> },
    UpgradeRequired,
    /// Signed in, but the current page is not the in-store offers page
    NavigationPrompt,
    IdentityMissing { gap: IdentityGap },
    ReadyToActivate,
    /// `progress` is `None` while the catalog is still loading
    Activating { progress: Option<ActivationProgress> },
    Completed(Completion),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    NoCards,
    Finished { done: usize },
}

/// Why the rewards-site identifiers are not available
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityGap {
    SignedOut,
    /// A retry found the user still signed out
    StillSignedOut,
    /// Identifiers disappeared between "Activate" and the first request
    LostDuringActivation,
}

/// Error line shown above the login form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginNotice {
    MissingCredentials,
    InvalidCredentials,
    Failed,
    TimedOut,
    NotPersisted,
}

/// What came back from one login attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Premium,
    NotPremium,
    InvalidCredentials,
    Failed,
    TimedOut,
    /// Premium confirmed but the flag could not be written
    NotPersisted,
}

impl LoginOutcome {
    pub fn notice(&self) -> Option<LoginNotice> {
        match self {
            LoginOutcome::Premium | LoginOutcome::NotPremium => None,
            LoginOutcome::InvalidCredentials => Some(LoginNotice::InvalidCredentials),
            LoginOutcome::Failed => Some(LoginNotice::Failed),
            LoginOutcome::TimedOut => Some(LoginNotice::TimedOut),
            LoginOutcome::NotPersisted => Some(LoginNotice::NotPersisted),
        }
    }
}

/// What the controller learned from the page the widget is mounted in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContext {
    pub on_activation_page: bool,
    pub identity: SessionIds,
}

/// Everything needed to decide the first panel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryContext {
    pub widget_closed: bool,
    pub pending_message: Option<String>,
    pub is_premium: bool,
    pub page: PageContext,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlowEvent {
    Opened(EntryContext),
    Dismissed,
    LoginSubmitted { email: String, password: Masked<String> },
    LoginFinished { outcome: LoginOutcome, page: PageContext },
    NavigateRequested,
    RetryRequested,
    PageInspected(PageContext),
    ActivateRequested,
    CatalogLoaded { offers: Vec<Offer>, identity: SessionIds },
    Progressed(ActivationProgress),
    ActivationFinished(ActivationRun),
}

impl FlowEvent {
    pub fn name(&self) -> &'static str {
        match self {
            FlowEvent::Opened(_) => "opened",
            FlowEvent::Dismissed => "dismissed",
            FlowEvent::LoginSubmitted { .. } => "login_submitted",
            FlowEvent::LoginFinished { .. } => "login_finished",
            FlowEvent::NavigateRequested => "navigate_requested",
            FlowEvent::RetryRequested => "retry_requested",
            FlowEvent::PageInspected(_) => "page_inspected",
            FlowEvent::ActivateRequested => "activate_requested",
            FlowEvent::CatalogLoaded { .. } => "catalog_loaded",
            FlowEvent::Progressed(_) => "progressed",
            FlowEvent::ActivationFinished(_) => "activation_finished",
        }
    }
}

/// Side effects requested by a transition, carried out by the controller
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    MarkClosed,
    ClearPendingMessage,
    Authenticate { email: String, password: Masked<String> },
    PersistIdentity(SessionIds),
    OpenActivationPage,
    InspectPage,
    LoadCatalog,
    RunActivation { offers: Vec<Offer>, identity: SessionIds },
    StoreCompletionMessage(String),
    ScheduleReload,
}

pub fn completion_message(done: usize) -> String {
    format!("Offer activation finished. {} offers added.", done)
}
