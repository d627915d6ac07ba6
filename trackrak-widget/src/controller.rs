use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use trackrak_catalog::{filter_available, CatalogClient};
use trackrak_core::identity::ACTIVATION_PAGE_URL;
use trackrak_core::{AuthClient, IdentityResolver};
use trackrak_offer::ActivationOrchestrator;
use trackrak_shared::{Masked, SessionIds};
use trackrak_store::SessionStore;

use crate::host::{ControlSignal, WidgetHost};
use crate::lifecycle::{Lifecycle, MountToken};
use crate::state::{Effect, EntryContext, FlowEvent, FlowState, LoginOutcome, PageContext};
use crate::transition::transition;
use crate::view::PanelView;

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("A widget is already mounted on this page")]
    AlreadyMounted,
}

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub activation_page_url: String,
    pub auth_timeout: Duration,
    pub reload_delay: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            activation_page_url: ACTIVATION_PAGE_URL.to_string(),
            auth_timeout: Duration::from_secs(15),
            reload_delay: Duration::from_millis(800),
        }
    }
}

/// Runs the widget flow: feeds events through [`transition`], carries out
/// the resulting effects and keeps the host's panel in sync with the state.
pub struct WidgetFlowController {
    state: FlowState,
    visible: bool,
    _mount: MountToken,
    session: SessionStore,
    resolver: IdentityResolver,
    auth: Arc<dyn AuthClient>,
    catalog: Arc<CatalogClient>,
    orchestrator: Arc<ActivationOrchestrator>,
    host: Arc<dyn WidgetHost>,
    settings: ControllerSettings,
}

impl WidgetFlowController {
    pub fn new(
        lifecycle: &Lifecycle,
        session: SessionStore,
        resolver: IdentityResolver,
        auth: Arc<dyn AuthClient>,
        catalog: Arc<CatalogClient>,
        orchestrator: Arc<ActivationOrchestrator>,
        host: Arc<dyn WidgetHost>,
    ) -> Result<Self, ControllerError> {
        let mount = lifecycle.acquire().ok_or(ControllerError::AlreadyMounted)?;
        Ok(Self {
            state: FlowState::Closed,
            visible: false,
            _mount: mount,
            session,
            resolver,
            auth,
            catalog,
            orchestrator,
            host,
            settings: ControllerSettings::default(),
        })
    }

    pub fn with_settings(mut self, settings: ControllerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Decide the first panel from persisted state and the current page.
    pub async fn start(&mut self) {
        let stored = self.session.load().await;
        let page = if stored.widget_closed {
            PageContext::default()
        } else {
            self.inspect_page().await
        };

        let entry = EntryContext {
            widget_closed: stored.widget_closed,
            pending_message: stored.pending_message,
            is_premium: stored.is_premium,
            page,
        };
        self.dispatch(FlowEvent::Opened(entry)).await;
    }

    /// Explicit request to show the widget again after it was dismissed.
    pub async fn reopen(&mut self) {
        if let Err(e) = self.session.set_widget_closed(false).await {
            tracing::error!("Could not clear widget closed flag: {}", e);
        }
        self.start().await;
    }

    pub async fn dismiss(&mut self) {
        self.dispatch(FlowEvent::Dismissed).await;
    }

    pub async fn submit_login(&mut self, email: &str, password: Masked<String>) {
        self.dispatch(FlowEvent::LoginSubmitted {
            email: email.trim().to_string(),
            password,
        })
        .await;
    }

    pub async fn navigate(&mut self) {
        self.dispatch(FlowEvent::NavigateRequested).await;
    }

    pub async fn retry(&mut self) {
        self.dispatch(FlowEvent::RetryRequested).await;
    }

    pub async fn activate(&mut self) {
        self.dispatch(FlowEvent::ActivateRequested).await;
    }

    pub async fn handle_signal(&mut self, signal: ControlSignal) {
        tracing::debug!(?signal, "Control signal received");
        match signal {
            ControlSignal::Reopen => self.reopen().await,
            ControlSignal::Close => self.dismiss().await,
            ControlSignal::Reload => self.start().await,
        }
    }

    /// Serve control signals until every sender is gone.
    pub async fn run_signals(&mut self, mut signals: mpsc::Receiver<ControlSignal>) {
        while let Some(signal) = signals.recv().await {
            self.handle_signal(signal).await;
        }
    }

    async fn dispatch(&mut self, event: FlowEvent) {
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            let name = event.name();
            let step = transition(&self.state, event);
            if step.next != self.state {
                tracing::debug!(event = name, from = ?self.state, to = ?step.next, "Widget state changed");
            }
            self.state = step.next;
            render(self.host.as_ref(), &mut self.visible, &self.state);

            for effect in step.effects {
                if let Some(follow_up) = self.execute(effect).await {
                    queue.push_back(follow_up);
                }
            }
        }
    }

    async fn execute(&mut self, effect: Effect) -> Option<FlowEvent> {
        match effect {
            Effect::MarkClosed => {
                if let Err(e) = self.session.set_widget_closed(true).await {
                    tracing::error!("Could not persist widget closed flag: {}", e);
                }
                None
            }
            Effect::ClearPendingMessage => {
                if let Err(e) = self.session.clear_pending_message().await {
                    tracing::warn!("Could not clear pending message: {}", e);
                }
                None
            }
            Effect::Authenticate { email, password } => {
                let outcome = self.authenticate(&email, &password).await;
                let page = self.inspect_page().await;
                Some(FlowEvent::LoginFinished { outcome, page })
            }
            Effect::PersistIdentity(ids) => {
                if let Err(e) = self.session.set_identity(&ids).await {
                    tracing::warn!("Could not persist session identifiers: {}", e);
                }
                None
            }
            Effect::OpenActivationPage => {
                self.host.open_in_new_context(&self.settings.activation_page_url);
                None
            }
            Effect::InspectPage => Some(FlowEvent::PageInspected(self.inspect_page().await)),
            Effect::LoadCatalog => {
                let offers = filter_available(self.catalog.fetch_all_offers().await);
                let identity = match self.session.identity().await {
                    Ok(ids) => ids,
                    Err(e) => {
                        tracing::error!("Could not read session identifiers: {}", e);
                        SessionIds::empty()
                    }
                };
                Some(FlowEvent::CatalogLoaded { offers, identity })
            }
            Effect::RunActivation { offers, identity } => {
                let token = Masked(identity.euid.unwrap_or_default());
                let user = identity.eutid.unwrap_or_default();

                let orchestrator = Arc::clone(&self.orchestrator);
                let host = Arc::clone(&self.host);
                let state = &mut self.state;
                let visible = &mut self.visible;

                let run = orchestrator
                    .run(&offers, &token, &user, |progress| {
                        let step = transition(state, FlowEvent::Progressed(progress));
                        *state = step.next;
                        render(host.as_ref(), visible, state);
                    })
                    .await;
                Some(FlowEvent::ActivationFinished(run))
            }
            Effect::StoreCompletionMessage(message) => {
                if let Err(e) = self.session.set_pending_message(&message).await {
                    tracing::warn!("Could not store completion message: {}", e);
                }
                None
            }
            Effect::ScheduleReload => {
                self.host.schedule_reload(self.settings.reload_delay);
                None
            }
        }
    }

    async fn authenticate(&self, email: &str, password: &Masked<String>) -> LoginOutcome {
        let response =
            match tokio::time::timeout(self.settings.auth_timeout, self.auth.login(email, password))
                .await
            {
                Ok(response) => response,
                Err(_) => {
                    tracing::error!(timeout = ?self.settings.auth_timeout, "Login timed out");
                    return LoginOutcome::TimedOut;
                }
            };

        let Some(response) = response else {
            return LoginOutcome::Failed;
        };

        if response.is_unauthorized() {
            return LoginOutcome::InvalidCredentials;
        }

        if response.is_authorized_premium() {
            return match self.session.set_premium(true).await {
                Ok(()) => {
                    tracing::info!("Premium login confirmed");
                    LoginOutcome::Premium
                }
                Err(e) => {
                    tracing::error!("Could not persist premium flag: {}", e);
                    LoginOutcome::NotPersisted
                }
            };
        }

        if response.is_success() {
            if let Err(e) = self.session.set_premium(false).await {
                tracing::warn!("Could not persist premium flag: {}", e);
            }
            return LoginOutcome::NotPremium;
        }

        tracing::warn!(status = response.status, "Unexpected login response");
        LoginOutcome::Failed
    }

    async fn inspect_page(&self) -> PageContext {
        let page = self.host.current_page().await;
        if !self.resolver.is_activation_page(&page.url) {
            return PageContext::default();
        }
        PageContext {
            on_activation_page: true,
            identity: self.resolver.resolve_identifiers(&page),
        }
    }
}

/// Bring the host in line with `state`; mount and unmount are idempotent.
fn render(host: &dyn WidgetHost, visible: &mut bool, state: &FlowState) {
    match PanelView::project(state) {
        Some(view) => {
            if !*visible {
                host.mount();
                *visible = true;
            }
            host.render(&view);
        }
        None => {
            if *visible {
                host.unmount();
                *visible = false;
            }
        }
    }
}
