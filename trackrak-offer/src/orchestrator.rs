use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use trackrak_core::ActivationLedger;
use trackrak_shared::{ActivationProgress, ActivationRun, Masked, Offer};

use crate::activation::OfferActivator;

/// Drives the activator across a list of offers, one request at a time.
///
/// Requests are never issued concurrently; the service must see them
/// back-to-back with a fixed pause in between. The run stops early only when
/// a response reports that the user has no card to link.
pub struct ActivationOrchestrator {
    activator: Arc<dyn OfferActivator>,
    ledger: Option<Arc<dyn ActivationLedger>>,
    request_delay: Duration,
}

impl ActivationOrchestrator {
    pub fn new(activator: Arc<dyn OfferActivator>) -> Self {
        Self {
            activator,
            ledger: None,
            request_delay: Duration::from_millis(120),
        }
    }

    /// Where the completion timestamp of a successful run is recorded
    pub fn with_ledger(mut self, ledger: Arc<dyn ActivationLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn with_request_delay(mut self, request_delay: Duration) -> Self {
        self.request_delay = request_delay;
        self
    }

    pub async fn run<F>(
        &self,
        offers: &[Offer],
        session_token: &Masked<String>,
        user_identifier: &str,
        mut on_progress: F,
    ) -> ActivationRun
    where
        F: FnMut(ActivationProgress) + Send,
    {
        let mut run = ActivationRun::new(offers.len());
        if offers.is_empty() {
            return run;
        }

        let span = tracing::info_span!("activation_run", run_id = %run.run_id, total = run.total);
        async {
            tracing::info!("Activation run started");

            for offer in offers {
                let result = self
                    .activator
                    .activate(offer, session_token, user_identifier)
                    .await;

                if let Some(status) = result.no_card_status() {
                    tracing::warn!(
                        done = run.done,
                        status,
                        "Activation stopped: No-Cards detected in response"
                    );
                    run.no_cards = true;
                    run.first_response_body = result.body.clone();
                    return;
                }

                if !result.accepted {
                    tracing::warn!(offer_id = %offer.id, error = ?result.error, "Activation request not delivered");
                }

                run.done += 1;
                on_progress(ActivationProgress {
                    done: run.done,
                    total: run.total,
                    current_offer_name: offer.merchant_name.clone(),
                });

                if !self.request_delay.is_zero() {
                    tokio::time::sleep(self.request_delay).await;
                }
            }

            let finished_at = Utc::now();
            run.finished_at = Some(finished_at);

            if let Some(ledger) = &self.ledger {
                if let Err(e) = ledger.record_last_activation(finished_at).await {
                    tracing::warn!("Could not record last activation time: {}", e);
                }
            }

            tracing::info!(done = run.done, "Activation run finished");
        }
        .instrument(span)
        .await;

        run
    }
}
