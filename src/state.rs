//! Observable dashboard state and the reducer that drives it.
//!
//! `reduce` is pure: it never renders. Rendering is a separate projection
//! (see `render::project`) so transitions can be tested without a sink.

use serde::Serialize;

use crate::error::{PipelineError, PredictionError};
use crate::insights::Insights;
use crate::session::SessionCounter;
use crate::trend::TrendSeries;
use crate::types::{PredictionLabel, PredictionResult, Recommendation, RiskFactor};

/// Identifies one submission. Issued in increasing order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestTicket(pub u64);

impl RequestTicket {
    pub fn next(self) -> Self {
        RequestTicket(self.0 + 1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Warning,
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Badge {
    pub text: String,
    pub severity: Severity,
}

impl Badge {
    pub fn for_label(label: PredictionLabel) -> Self {
        match label {
            PredictionLabel::Churn => Badge {
                text: "⚠️ Churn".to_string(),
                severity: Severity::Warning,
            },
            PredictionLabel::NoChurn => Badge {
                text: "✅ No Churn".to_string(),
                severity: Severity::Success,
            },
        }
    }

    pub fn for_error(err: &PipelineError) -> Self {
        let text = match err {
            PipelineError::Prediction(PredictionError::Network(_)) => {
                "❌ Connection Error".to_string()
            }
            PipelineError::Prediction(PredictionError::Service { status }) => {
                format!("❌ Service Error (HTTP {})", status)
            }
            PipelineError::Validation(v) => format!("❌ Invalid Input ({})", v.field),
        };
        Badge {
            text,
            severity: Severity::Error,
        }
    }
}

/// `[churn %, retention %]`; the two always sum to 100.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DoughnutSeries(pub [f64; 2]);

impl DoughnutSeries {
    pub fn from_probability(probability: f64) -> Self {
        DoughnutSeries([probability * 100.0, (1.0 - probability) * 100.0])
    }

    pub fn churn_pct(&self) -> f64 {
        self.0[0]
    }

    pub fn retention_pct(&self) -> f64 {
        self.0[1]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VisualizationState {
    pub result_visible: bool,
    pub badge: Option<Badge>,
    pub probability_bar_visible: bool,
    /// Rounded to one decimal.
    pub probability_percent: f64,
    pub risk_factors: Vec<RiskFactor>,
    pub recommendations: Vec<Recommendation>,
    pub doughnut_series: Option<DoughnutSeries>,
    pub trend_series: TrendSeries,
    pub predictions_today: SessionCounter,
    pub loading: bool,
    /// Latest ticket issued; outcomes for older tickets are ignored.
    pub latest_ticket: RequestTicket,
    /// Bumped on every applied success so the doughnut is rebuilt even when
    /// the series repeats.
    pub revision: u64,
    #[serde(skip)]
    pub last_error: Option<PipelineError>,
}

impl VisualizationState {
    /// Everything hidden; trend series fixed for the rest of the session.
    pub fn initial(trend_series: TrendSeries) -> Self {
        Self {
            result_visible: false,
            badge: None,
            probability_bar_visible: false,
            probability_percent: 0.0,
            risk_factors: Vec::new(),
            recommendations: Vec::new(),
            doughnut_series: None,
            trend_series,
            predictions_today: SessionCounter::new(),
            loading: false,
            latest_ticket: RequestTicket::default(),
            revision: 0,
            last_error: None,
        }
    }

    pub fn probability_label(&self) -> String {
        format!("{:.1}%", self.probability_percent)
    }

    /// Whether an outcome for `ticket` may still change the state.
    pub fn accepts(&self, ticket: RequestTicket) -> bool {
        ticket == self.latest_ticket
    }
}

#[derive(Clone, Debug)]
pub enum DashboardEvent {
    SubmitStarted {
        ticket: RequestTicket,
    },
    PredictionSucceeded {
        ticket: RequestTicket,
        result: PredictionResult,
        insights: Insights,
    },
    PredictionFailed {
        ticket: RequestTicket,
        error: PipelineError,
    },
}

pub fn round_one_decimal(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Apply one event. Outcomes whose ticket is not the latest leave the state
/// as it was.
pub fn reduce(mut state: VisualizationState, event: DashboardEvent) -> VisualizationState {
    match event {
        DashboardEvent::SubmitStarted { ticket } => {
            if ticket > state.latest_ticket {
                state.latest_ticket = ticket;
            }
            state.loading = true;
        }
        DashboardEvent::PredictionSucceeded {
            ticket,
            result,
            insights,
        } => {
            if !state.accepts(ticket) {
                return state;
            }
            state.loading = false;
            state.result_visible = true;
            state.badge = Some(Badge::for_label(result.label));
            state.probability_bar_visible = true;
            state.probability_percent = round_one_decimal(result.probability * 100.0);
            state.risk_factors = insights.risk_factors;
            state.recommendations = insights.recommendations;
            state.doughnut_series = Some(DoughnutSeries::from_probability(result.probability));
            state.predictions_today.increment();
            state.revision += 1;
            state.last_error = None;
        }
        DashboardEvent::PredictionFailed { ticket, error } => {
            if !state.accepts(ticket) {
                return state;
            }
            state.loading = false;
            state.result_visible = true;
            state.badge = Some(Badge::for_error(&error));
            state.probability_bar_visible = false;
            // Clear everything derived from the previous result together.
            state.probability_percent = 0.0;
            state.risk_factors.clear();
            state.recommendations.clear();
            state.doughnut_series = None;
            state.last_error = Some(error);
        }
    }
    state
}
