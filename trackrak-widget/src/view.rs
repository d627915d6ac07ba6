use crate::state::{completion_message, Completion, FlowState, IdentityGap, LoginNotice};

/// Button offered by a panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    Dismiss,
    Login,
    OpenActivationPage,
    Retry,
    Activate,
}

impl PanelAction {
    pub fn label(&self) -> &'static str {
        match self {
            PanelAction::Dismiss => "Dismiss",
            PanelAction::Login => "Login",
            PanelAction::OpenActivationPage => "Go to Rakuten In-Store",
            PanelAction::Retry => "Try Again",
            PanelAction::Activate => "Activate Offers",
        }
    }
}

impl LoginNotice {
    pub fn text(&self) -> &'static str {
        match self {
            LoginNotice::MissingCredentials => "Please enter email and password.",
            LoginNotice::InvalidCredentials => "Invalid credentials, please try again.",
            LoginNotice::Failed => "An error occurred during login. Please try again.",
            LoginNotice::TimedOut => "Login timed out. Check network or try again.",
            LoginNotice::NotPersisted => {
                "Login succeeded but we could not persist the session. Try again or reload the page."
            }
        }
    }
}

/// Render-ready projection of a [`FlowState`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelView {
    pub text: String,
    pub action: Option<PanelAction>,
    pub login_form: bool,
    pub progress_percent: Option<u8>,
}

impl PanelView {
    fn message(text: impl Into<String>, action: Option<PanelAction>) -> Self {
        Self {
            text: text.into(),
            action,
            login_form: false,
            progress_percent: None,
        }
    }

    /// `None` means nothing is mounted.
    pub fn project(state: &FlowState) -> Option<PanelView> {
        let view = match state {
            FlowState::Closed => return None,
            FlowState::PendingMessage { message } => {
                Self::message(message.clone(), Some(PanelAction::Dismiss))
            }
            FlowState::LoginRequired { notice } => PanelView {
                text: notice.map(|n| n.text()).unwrap_or_default().to_string(),
                action: Some(PanelAction::Login),
                login_form: true,
                progress_percent: None,
            },
            FlowState::UpgradeRequired => Self::message(
                "Upgrade your plan to Premium to add Rakuten In-Store offers.",
                None,
            ),
            FlowState::NavigationPrompt => Self::message(
                "Click below to navigate to the Rakuten In-Store page.",
                Some(PanelAction::OpenActivationPage),
            ),
            FlowState::IdentityMissing { gap } => {
                let text = match gap {
                    IdentityGap::SignedOut => "Please sign in to your Rakuten account.",
                    IdentityGap::StillSignedOut => {
                        "Still not signed in. Please sign in on Rakuten to proceed."
                    }
                    IdentityGap::LostDuringActivation => {
                        "You must be signed in to your Rakuten account to continue. Sign in to Rakuten, then re-open this extension to activate your In-Store offers."
                    }
                };
                Self::message(text, Some(PanelAction::Retry))
            }
            FlowState::ReadyToActivate => {
                Self::message("Click below to activate offers.", Some(PanelAction::Activate))
            }
            FlowState::Activating { progress: None } => PanelView {
                progress_percent: Some(0),
                ..Self::message("Preparing to activate offers...", None)
            },
            FlowState::Activating { progress: Some(progress) } => {
                let text = if progress.is_complete() {
                    format!("All {} offers have been activated.", progress.total)
                } else {
                    format!(
                        "{} / {} activated. Current: {}",
                        progress.done, progress.total, progress.current_offer_name
                    )
                };
                PanelView {
                    progress_percent: Some(progress.percent()),
                    ..Self::message(text, None)
                }
            }
            FlowState::Completed(Completion::NoCards) => Self::message(
                "Unable to activate offers. Add at least one card to your Rakuten wallet, refresh the page, and try again.",
                None,
            ),
            FlowState::Completed(Completion::Finished { done }) => {
                Self::message(completion_message(*done), None)
            }
        };
        Some(view)
    }
}
