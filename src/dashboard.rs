//! Submission controller.
//!
//! Runs one form submission through builder, client, insight engine and
//! reducer, then projects the new state onto the sink. The state lock is
//! never held across the remote call.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::client::PredictionClient;
use crate::error::{PipelineError, PipelineResult};
use crate::features::{self, RawForm};
use crate::insights::derive_insights;
use crate::render::{project, RenderSink};
use crate::state::{reduce, DashboardEvent, RequestTicket, VisualizationState};
use crate::trend::TrendSource;
use crate::types::PredictionResult;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SubmitOutcome {
    /// The prediction is what the dashboard now shows.
    Applied(PredictionResult),
    /// A newer submission was issued before this one returned.
    Superseded {
        ticket: RequestTicket,
        result: PredictionResult,
    },
}

struct Inner<S> {
    state: VisualizationState,
    sink: S,
}

impl<S: RenderSink> Inner<S> {
    fn apply(&mut self, event: DashboardEvent) {
        let next = reduce(self.state.clone(), event);
        project(Some(&self.state), &next, &mut self.sink);
        self.state = next;
    }
}

pub struct Dashboard<S> {
    client: Arc<dyn PredictionClient>,
    inner: Mutex<Inner<S>>,
}

impl<S: RenderSink> Dashboard<S> {
    /// Loads the trend series once and draws the initial (hidden) state.
    pub fn new(client: Arc<dyn PredictionClient>, trend: &dyn TrendSource, mut sink: S) -> Self {
        let state = VisualizationState::initial(trend.load());
        project(None, &state, &mut sink);
        tracing::info!("dashboard ready; scoring via {}", client.name());
        Self {
            client,
            inner: Mutex::new(Inner { state, sink }),
        }
    }

    pub async fn submit(&self, form: &RawForm) -> PipelineResult<SubmitOutcome> {
        let ticket = {
            let mut inner = self.inner.lock();
            let ticket = inner.state.latest_ticket.next();
            inner.apply(DashboardEvent::SubmitStarted { ticket });
            ticket
        };

        let (input, vector) = match features::build(form) {
            Ok(built) => built,
            Err(e) => {
                tracing::warn!("submission {} rejected: {}", ticket.0, e);
                return Err(self.fail(ticket, e.into()));
            }
        };
        tracing::info!(
            "submission {} tenure={} charges={} contract={}",
            ticket.0,
            input.tenure_months,
            input.monthly_charges,
            input.contract
        );

        let result = match self.client.predict(vector).await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("submission {} failed: {}", ticket.0, e);
                return Err(self.fail(ticket, e.into()));
            }
        };

        let insights = derive_insights(&input, &result);
        let mut inner = self.inner.lock();
        if !inner.state.accepts(ticket) {
            tracing::debug!(
                "dropping stale result for submission {} (latest {})",
                ticket.0,
                inner.state.latest_ticket.0
            );
            return Ok(SubmitOutcome::Superseded { ticket, result });
        }

        tracing::info!(
            "submission {} -> {} p={:.3}",
            ticket.0,
            result.label,
            result.probability
        );
        inner.apply(DashboardEvent::PredictionSucceeded {
            ticket,
            result,
            insights,
        });
        Ok(SubmitOutcome::Applied(result))
    }

    fn fail(&self, ticket: RequestTicket, error: PipelineError) -> PipelineError {
        let mut inner = self.inner.lock();
        if !inner.state.accepts(ticket) {
            tracing::debug!("stale failure for submission {} not shown", ticket.0);
            return error;
        }
        inner.apply(DashboardEvent::PredictionFailed {
            ticket,
            error: error.clone(),
        });
        error
    }

    pub fn snapshot(&self) -> VisualizationState {
        self.inner.lock().state.clone()
    }

    pub fn predictions_today(&self) -> u64 {
        self.inner.lock().state.predictions_today.get()
    }

    pub fn with_sink<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.inner.lock().sink)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use tokio::sync::oneshot;

    use super::*;
    use crate::error::{FormField, PredictionError};
    use crate::render::{ChartSlot, TracingSink};
    use crate::trend::TrendSeries;
    use crate::types::{FeatureVector, PredictionLabel};

    struct FixedTrend;

    impl TrendSource for FixedTrend {
        fn load(&self) -> TrendSeries {
            TrendSeries {
                labels: vec!["Jun 1".into()],
                churn: vec![15.0],
                retention: vec![85.0],
            }
        }
    }

    /// Replays canned outcomes in call order and records what it was sent.
    struct ScriptedClient {
        replies: Mutex<VecDeque<Result<PredictionResult, PredictionError>>>,
        seen: Mutex<Vec<FeatureVector>>,
    }

    impl ScriptedClient {
        fn new(replies: Vec<Result<PredictionResult, PredictionError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl PredictionClient for ScriptedClient {
        async fn predict(&self, vector: FeatureVector) -> Result<PredictionResult, PredictionError> {
            self.seen.lock().push(vector);
            self.replies
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(PredictionError::Network("script exhausted".into())))
        }
    }

    /// Each call waits on its own channel so tests decide arrival order.
    struct GatedClient {
        gates: Mutex<VecDeque<oneshot::Receiver<Result<PredictionResult, PredictionError>>>>,
    }

    #[async_trait]
    impl PredictionClient for GatedClient {
        async fn predict(&self, _: FeatureVector) -> Result<PredictionResult, PredictionError> {
            let gate = self.gates.lock().pop_front().expect("no gate for call");
            gate.await
                .unwrap_or_else(|_| Err(PredictionError::Network("gate dropped".into())))
        }
    }

    fn churn(p: f64) -> PredictionResult {
        PredictionResult {
            label: PredictionLabel::Churn,
            probability: p,
        }
    }

    fn no_churn(p: f64) -> PredictionResult {
        PredictionResult {
            label: PredictionLabel::NoChurn,
            probability: p,
        }
    }

    fn dashboard(client: Arc<dyn PredictionClient>) -> Dashboard<TracingSink> {
        Dashboard::new(client, &FixedTrend, TracingSink::new())
    }

    #[tokio::test]
    async fn success_updates_state_and_sink() {
        let client = ScriptedClient::new(vec![Ok(churn(0.82))]);
        let dash = dashboard(client.clone());

        let out = dash
            .submit(&RawForm::new("3", "85", "Month-to-month"))
            .await
            .unwrap();
        assert_eq!(out, SubmitOutcome::Applied(churn(0.82)));

        let s = dash.snapshot();
        assert_eq!(s.risk_factors.len(), 4);
        assert_eq!(s.recommendations.len(), 4);
        assert_eq!(s.predictions_today.get(), 1);
        assert!(!s.loading);

        assert_eq!(client.seen.lock()[0].to_array(), [3.0, 85.0, 0.0]);
        dash.with_sink(|sink| {
            assert!(sink.chart(ChartSlot::Prediction).is_some());
            assert_eq!(
                sink.panel().unwrap().probability_bar.as_ref().unwrap().label,
                "82.0%"
            );
        });
    }

    #[tokio::test]
    async fn validation_error_never_reaches_client() {
        let client = ScriptedClient::new(vec![Ok(churn(0.9))]);
        let dash = dashboard(client.clone());

        let err = dash
            .submit(&RawForm::new("three", "85", "Month-to-month"))
            .await
            .unwrap_err();
        match err {
            PipelineError::Validation(v) => assert_eq!(v.field, FormField::Tenure),
            other => panic!("unexpected {:?}", other),
        }
        assert!(client.seen.lock().is_empty());

        let s = dash.snapshot();
        assert_eq!(s.badge.as_ref().unwrap().text, "❌ Invalid Input (tenure)");
        assert_eq!(s.predictions_today.get(), 0);
    }

    #[tokio::test]
    async fn failures_do_not_count() {
        let client = ScriptedClient::new(vec![
            Ok(no_churn(0.1)),
            Err(PredictionError::Service { status: 500 }),
            Ok(churn(0.8)),
            Err(PredictionError::Network("refused".into())),
        ]);
        let dash = dashboard(client);
        let form = RawForm::new("24", "55.5", "One year");

        assert!(dash.submit(&form).await.is_ok());
        assert!(dash.submit(&form).await.is_err());
        assert!(dash.submit(&form).await.is_ok());
        assert!(dash.submit(&form).await.is_err());

        assert_eq!(dash.predictions_today(), 2);
        let s = dash.snapshot();
        assert!(!s.probability_bar_visible);
        assert_eq!(s.badge.as_ref().unwrap().text, "❌ Connection Error");
    }

    #[tokio::test]
    async fn late_response_from_older_submission_is_dropped() {
        let (tx1, rx1) = oneshot::channel();
        let (tx2, rx2) = oneshot::channel();
        let client = Arc::new(GatedClient {
            gates: Mutex::new(VecDeque::from(vec![rx1, rx2])),
        });
        let dash = dashboard(client);
        let older = RawForm::new("3", "85", "Month-to-month");
        let newer = RawForm::new("40", "30", "Two year");

        let first = dash.submit(&older);
        futures::pin_mut!(first);
        assert!(futures::poll!(first.as_mut()).is_pending());

        tx2.send(Ok(no_churn(0.12))).unwrap();
        let second = dash.submit(&newer).await.unwrap();
        assert_eq!(second, SubmitOutcome::Applied(no_churn(0.12)));

        tx1.send(Ok(churn(0.95))).unwrap();
        let first = first.await.unwrap();
        assert!(matches!(first, SubmitOutcome::Superseded { ticket: RequestTicket(1), .. }));

        let s = dash.snapshot();
        assert_eq!(s.badge.as_ref().unwrap().text, "✅ No Churn");
        assert_eq!(s.probability_label(), "12.0%");
        assert_eq!(s.predictions_today.get(), 1);
    }

    #[tokio::test]
    async fn late_failure_from_older_submission_is_not_shown() {
        let (tx1, rx1) = oneshot::channel();
        let (tx2, rx2) = oneshot::channel();
        let client = Arc::new(GatedClient {
            gates: Mutex::new(VecDeque::from(vec![rx1, rx2])),
        });
        let dash = dashboard(client);
        let form = RawForm::new("10", "75", "One year");

        let first = dash.submit(&form);
        futures::pin_mut!(first);
        assert!(futures::poll!(first.as_mut()).is_pending());

        tx2.send(Ok(churn(0.66))).unwrap();
        dash.submit(&form).await.unwrap();

        tx1.send(Err(PredictionError::Service { status: 502 })).unwrap();
        // Caller still learns about the failure.
        assert_eq!(
            first.await.unwrap_err(),
            PipelineError::Prediction(PredictionError::Service { status: 502 })
        );

        let s = dash.snapshot();
        assert_eq!(s.badge.as_ref().unwrap().text, "⚠️ Churn");
        assert!(s.probability_bar_visible);
    }
}
