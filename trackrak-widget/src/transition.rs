use trackrak_core::auth::validate_credentials;

use crate::state::{
    completion_message, Completion, Effect, EntryContext, FlowEvent, FlowState, IdentityGap,
    LoginNotice, LoginOutcome, PageContext,
};

/// Next state plus the effects the controller must carry out, in order
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub next: FlowState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(next: FlowState) -> Self {
        Self { next, effects: Vec::new() }
    }

    fn with(next: FlowState, effects: Vec<Effect>) -> Self {
        Self { next, effects }
    }
}

/// Pure reducer for the widget flow.
///
/// Events that make no sense in the current state leave it untouched.
pub fn transition(state: &FlowState, event: FlowEvent) -> Transition {
    match (state, event) {
        // A run in flight owns the panel until it finishes
        (FlowState::Activating { .. }, FlowEvent::Opened(_)) => Transition::to(state.clone()),
        (_, FlowEvent::Opened(ctx)) => enter(ctx),

        (FlowState::Closed, FlowEvent::Dismissed) => Transition::to(FlowState::Closed),
        (FlowState::PendingMessage { .. }, FlowEvent::Dismissed) => Transition::with(
            FlowState::Closed,
            vec![Effect::ClearPendingMessage, Effect::MarkClosed],
        ),
        (_, FlowEvent::Dismissed) => Transition::with(FlowState::Closed, vec![Effect::MarkClosed]),

        (FlowState::LoginRequired { .. }, FlowEvent::LoginSubmitted { email, password }) => {
            match validate_credentials(&email, password.expose()) {
                Ok(()) => Transition::with(
                    FlowState::LoginRequired { notice: None },
                    vec![Effect::Authenticate { email, password }],
                ),
                Err(_) => Transition::to(FlowState::LoginRequired {
                    notice: Some(LoginNotice::MissingCredentials),
                }),
            }
        }
        (FlowState::LoginRequired { .. }, FlowEvent::LoginFinished { outcome, page }) => match outcome {
            LoginOutcome::Premium => after_auth(page, IdentityGap::SignedOut),
            LoginOutcome::NotPremium => Transition::to(FlowState::UpgradeRequired),
            failed => Transition::to(FlowState::LoginRequired { notice: failed.notice() }),
        },

        (FlowState::NavigationPrompt, FlowEvent::NavigateRequested) => {
            Transition::with(FlowState::NavigationPrompt, vec![Effect::OpenActivationPage])
        }

        (FlowState::IdentityMissing { .. }, FlowEvent::RetryRequested) => {
            Transition::with(state.clone(), vec![Effect::InspectPage])
        }
        (FlowState::IdentityMissing { gap }, FlowEvent::PageInspected(page)) => {
            let still_missing = match gap {
                IdentityGap::LostDuringActivation => IdentityGap::SignedOut,
                IdentityGap::SignedOut | IdentityGap::StillSignedOut => IdentityGap::StillSignedOut,
            };
            after_auth(page, still_missing)
        }

        (FlowState::ReadyToActivate, FlowEvent::ActivateRequested) => Transition::with(
            FlowState::Activating { progress: None },
            vec![Effect::LoadCatalog],
        ),

        (FlowState::Activating { .. }, FlowEvent::CatalogLoaded { offers, identity }) => {
            if !identity.is_complete() {
                return Transition::to(FlowState::IdentityMissing {
                    gap: IdentityGap::LostDuringActivation,
                });
            }
            Transition::with(
                FlowState::Activating { progress: None },
                vec![Effect::RunActivation { offers, identity }],
            )
        }
        (FlowState::Activating { .. }, FlowEvent::Progressed(progress)) => {
            Transition::to(FlowState::Activating { progress: Some(progress) })
        }
        (FlowState::Activating { .. }, FlowEvent::ActivationFinished(run)) => {
            if run.no_cards {
                return Transition::to(FlowState::Completed(Completion::NoCards));
            }
            Transition::with(
                FlowState::Completed(Completion::Finished { done: run.done }),
                vec![
                    Effect::StoreCompletionMessage(completion_message(run.done)),
                    Effect::ScheduleReload,
                ],
            )
        }

        (state, event) => {
            tracing::debug!(state = ?state, event = event.name(), "Event ignored in current state");
            Transition::to(state.clone())
        }
    }
}

fn enter(ctx: EntryContext) -> Transition {
    if ctx.widget_closed {
        return Transition::to(FlowState::Closed);
    }
    if let Some(message) = ctx.pending_message.filter(|m| !m.is_empty()) {
        return Transition::to(FlowState::PendingMessage { message });
    }
    if !ctx.is_premium {
        return Transition::to(FlowState::LoginRequired { notice: None });
    }
    after_auth(ctx.page, IdentityGap::SignedOut)
}

/// Where a premium user lands: navigation prompt off the offers page,
/// otherwise ready or blocked on the site identifiers.
fn after_auth(page: PageContext, missing: IdentityGap) -> Transition {
    if !page.on_activation_page {
        return Transition::to(FlowState::NavigationPrompt);
    }
    if page.identity.is_complete() {
        return Transition::with(
            FlowState::ReadyToActivate,
            vec![Effect::PersistIdentity(page.identity)],
        );
    }
    Transition::to(FlowState::IdentityMissing { gap: missing })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use trackrak_shared::{ActivationProgress, ActivationRun, Masked, Offer, SessionIds};

    fn on_page(ids: SessionIds) -> PageContext {
        PageContext { on_activation_page: true, identity: ids }
    }

    fn open(ctx: EntryContext) -> Transition {
        transition(&FlowState::Closed, FlowEvent::Opened(ctx))
    }

    #[test]
    fn test_closed_flag_keeps_widget_closed() {
        let t = open(EntryContext {
            widget_closed: true,
            is_premium: true,
            pending_message: Some("left over".into()),
            page: on_page(SessionIds::new("a", "b")),
        });
        assert_eq!(t.next, FlowState::Closed);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_pending_message_shown_first() {
        let t = open(EntryContext {
            pending_message: Some("Offer activation finished. 3 offers added.".into()),
            is_premium: true,
            ..Default::default()
        });
        assert_eq!(
            t.next,
            FlowState::PendingMessage { message: "Offer activation finished. 3 offers added.".into() }
        );

        let t = transition(&t.next, FlowEvent::Dismissed);
        assert_eq!(t.next, FlowState::Closed);
        assert_eq!(t.effects, vec![Effect::ClearPendingMessage, Effect::MarkClosed]);
    }

    #[test]
    fn test_entry_routing_for_premium_user() {
        let t = open(EntryContext { is_premium: false, ..Default::default() });
        assert_eq!(t.next, FlowState::LoginRequired { notice: None });

        let t = open(EntryContext { is_premium: true, ..Default::default() });
        assert_eq!(t.next, FlowState::NavigationPrompt);

        let t = open(EntryContext {
            is_premium: true,
            page: on_page(SessionIds::empty()),
            ..Default::default()
        });
        assert_eq!(t.next, FlowState::IdentityMissing { gap: IdentityGap::SignedOut });

        let ids = SessionIds::new("eb", "guid");
        let t = open(EntryContext { is_premium: true, page: on_page(ids.clone()), ..Default::default() });
        assert_eq!(t.next, FlowState::ReadyToActivate);
        assert_eq!(t.effects, vec![Effect::PersistIdentity(ids)]);
    }

    #[test]
    fn test_blank_credentials_never_authenticate() {
        let login = FlowState::LoginRequired { notice: None };
        let t = transition(
            &login,
            FlowEvent::LoginSubmitted { email: "  ".into(), password: Masked::from("secret") },
        );
        assert_eq!(t.next, FlowState::LoginRequired { notice: Some(LoginNotice::MissingCredentials) });
        assert!(t.effects.is_empty());

        let t = transition(
            &login,
            FlowEvent::LoginSubmitted { email: "a@b.c".into(), password: Masked::from("secret") },
        );
        assert!(matches!(t.effects.as_slice(), [Effect::Authenticate { .. }]));
    }

    #[test]
    fn test_login_outcomes() {
        let login = FlowState::LoginRequired { notice: None };
        let finish = |outcome| FlowEvent::LoginFinished { outcome, page: PageContext::default() };

        assert_eq!(transition(&login, finish(LoginOutcome::Premium)).next, FlowState::NavigationPrompt);
        assert_eq!(transition(&login, finish(LoginOutcome::NotPremium)).next, FlowState::UpgradeRequired);
        assert_eq!(
            transition(&login, finish(LoginOutcome::InvalidCredentials)).next,
            FlowState::LoginRequired { notice: Some(LoginNotice::InvalidCredentials) }
        );
        assert_eq!(
            transition(&login, finish(LoginOutcome::TimedOut)).next,
            FlowState::LoginRequired { notice: Some(LoginNotice::TimedOut) }
        );
        assert_eq!(
            transition(&login, finish(LoginOutcome::NotPersisted)).next,
            FlowState::LoginRequired { notice: Some(LoginNotice::NotPersisted) }
        );
    }

    #[test]
    fn test_retry_escalates_identity_gap() {
        let missing = FlowState::IdentityMissing { gap: IdentityGap::SignedOut };
        let t = transition(&missing, FlowEvent::RetryRequested);
        assert_eq!(t.effects, vec![Effect::InspectPage]);

        let t = transition(&missing, FlowEvent::PageInspected(on_page(SessionIds::empty())));
        assert_eq!(t.next, FlowState::IdentityMissing { gap: IdentityGap::StillSignedOut });

        let lost = FlowState::IdentityMissing { gap: IdentityGap::LostDuringActivation };
        let t = transition(&lost, FlowEvent::PageInspected(on_page(SessionIds::empty())));
        assert_eq!(t.next, FlowState::IdentityMissing { gap: IdentityGap::SignedOut });

        let t = transition(&missing, FlowEvent::PageInspected(on_page(SessionIds::new("eb", "guid"))));
        assert_eq!(t.next, FlowState::ReadyToActivate);
    }

    #[test]
    fn test_activation_path() {
        let t = transition(&FlowState::ReadyToActivate, FlowEvent::ActivateRequested);
        assert_eq!(t.next, FlowState::Activating { progress: None });
        assert_eq!(t.effects, vec![Effect::LoadCatalog]);

        let offers = vec![Offer::from_item_data(json!({ "id": 1, "offer_status": "available" }))];
        let t = transition(
            &t.next,
            FlowEvent::CatalogLoaded { offers: offers.clone(), identity: SessionIds::empty() },
        );
        assert_eq!(t.next, FlowState::IdentityMissing { gap: IdentityGap::LostDuringActivation });

        let ids = SessionIds::new("eb", "guid");
        let activating = FlowState::Activating { progress: None };
        let t = transition(&activating, FlowEvent::CatalogLoaded { offers: offers.clone(), identity: ids.clone() });
        assert_eq!(t.effects, vec![Effect::RunActivation { offers, identity: ids }]);

        let progress = ActivationProgress { done: 1, total: 1, current_offer_name: "Target".into() };
        let t = transition(&activating, FlowEvent::Progressed(progress.clone()));
        assert_eq!(t.next, FlowState::Activating { progress: Some(progress) });
    }

    #[test]
    fn test_activation_finished() {
        let activating = FlowState::Activating { progress: None };

        let mut run = ActivationRun::new(4);
        run.done = 4;
        let t = transition(&activating, FlowEvent::ActivationFinished(run));
        assert_eq!(t.next, FlowState::Completed(Completion::Finished { done: 4 }));
        assert_eq!(
            t.effects,
            vec![
                Effect::StoreCompletionMessage("Offer activation finished. 4 offers added.".into()),
                Effect::ScheduleReload,
            ]
        );

        let mut run = ActivationRun::new(4);
        run.done = 1;
        run.no_cards = true;
        let t = transition(&activating, FlowEvent::ActivationFinished(run));
        assert_eq!(t.next, FlowState::Completed(Completion::NoCards));
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_reopen_ignored_while_activating() {
        let activating = FlowState::Activating { progress: None };
        let t = transition(&activating, FlowEvent::Opened(EntryContext::default()));
        assert_eq!(t.next, activating);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_unexpected_events_leave_state_alone() {
        let t = transition(&FlowState::UpgradeRequired, FlowEvent::ActivateRequested);
        assert_eq!(t.next, FlowState::UpgradeRequired);
        assert!(t.effects.is_empty());

        let t = transition(&FlowState::Closed, FlowEvent::Dismissed);
        assert!(t.effects.is_empty());
    }
}
