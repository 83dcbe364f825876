//! Projection of `VisualizationState` onto a rendering sink.
//!
//! Charts live in named slots. Rendering into a slot replaces whatever was
//! there; nothing is updated incrementally.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::state::{Badge, DoughnutSeries, VisualizationState};
use crate::trend::TrendSeries;
use crate::types::{Recommendation, RiskFactor};

const RED_FILL: &str = "rgba(239, 68, 68, 0.8)";
const RED_LINE: &str = "rgba(239, 68, 68, 1)";
const RED_AREA: &str = "rgba(239, 68, 68, 0.1)";
const GREEN_FILL: &str = "rgba(16, 185, 129, 0.8)";
const GREEN_LINE: &str = "rgba(16, 185, 129, 1)";
const GREEN_AREA: &str = "rgba(16, 185, 129, 0.1)";

// ---------- Chart specs ----------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartSlot {
    Prediction,
    Trend,
}

impl fmt::Display for ChartSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartSlot::Prediction => write!(f, "prediction"),
            ChartSlot::Trend => write!(f, "trend"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    Doughnut,
    Line,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeriesStyle {
    pub border_colors: Vec<String>,
    pub background_colors: Vec<String>,
    pub border_width: u32,
    pub fill: bool,
    pub tension: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    pub style: SeriesStyle,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

pub fn doughnut_spec(series: &DoughnutSeries) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Doughnut,
        labels: vec!["Churn Risk".into(), "Retention Likelihood".into()],
        datasets: vec![Dataset {
            label: "Prediction".into(),
            data: series.0.to_vec(),
            style: SeriesStyle {
                border_colors: vec![RED_LINE.into(), GREEN_LINE.into()],
                background_colors: vec![RED_FILL.into(), GREEN_FILL.into()],
                border_width: 2,
                fill: true,
                tension: 0.0,
            },
        }],
    }
}

pub fn trend_spec(series: &TrendSeries) -> ChartSpec {
    let line = |label: &str, data: &[f64], stroke: &str, area: &str| Dataset {
        label: label.into(),
        data: data.to_vec(),
        style: SeriesStyle {
            border_colors: vec![stroke.into()],
            background_colors: vec![area.into()],
            border_width: 2,
            fill: true,
            tension: 0.4,
        },
    };
    ChartSpec {
        kind: ChartKind::Line,
        labels: series.labels.clone(),
        datasets: vec![
            line("Churn Rate %", &series.churn, RED_LINE, RED_AREA),
            line("Retention Rate %", &series.retention, GREEN_LINE, GREEN_AREA),
        ],
    }
}

// ---------- Result panel ----------

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProbabilityBar {
    /// Fill width in percent.
    pub percent: f64,
    pub label: String,
}

/// Everything outside the charts, as one snapshot.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResultPanel {
    pub visible: bool,
    pub loading: bool,
    pub badge: Option<Badge>,
    pub probability_bar: Option<ProbabilityBar>,
    pub risk_factors: Vec<RiskFactor>,
    pub recommendations: Vec<Recommendation>,
    pub predictions_today: u64,
}

impl ResultPanel {
    pub fn from_state(state: &VisualizationState) -> Self {
        let probability_bar = state.probability_bar_visible.then(|| ProbabilityBar {
            percent: state.probability_percent,
            label: state.probability_label(),
        });
        Self {
            visible: state.result_visible,
            loading: state.loading,
            badge: state.badge.clone(),
            probability_bar,
            risk_factors: state.risk_factors.clone(),
            recommendations: state.recommendations.clone(),
            predictions_today: state.predictions_today.get(),
        }
    }
}

// ---------- Sink ----------

pub trait RenderSink: Send {
    /// Tear down whatever the slot shows, then draw `spec`.
    fn render_chart(&mut self, slot: ChartSlot, spec: &ChartSpec);

    fn clear_chart(&mut self, slot: ChartSlot);

    fn render_panel(&mut self, panel: &ResultPanel);
}

/// Push `next` to the sink. With no `prev` this is the initial render,
/// which is the only time the trend chart is drawn.
pub fn project<S: RenderSink + ?Sized>(
    prev: Option<&VisualizationState>,
    next: &VisualizationState,
    sink: &mut S,
) {
    let Some(prev) = prev else {
        sink.render_chart(ChartSlot::Trend, &trend_spec(&next.trend_series));
        if let Some(series) = &next.doughnut_series {
            sink.render_chart(ChartSlot::Prediction, &doughnut_spec(series));
        }
        sink.render_panel(&ResultPanel::from_state(next));
        return;
    };

    if prev == next {
        return;
    }

    match &next.doughnut_series {
        Some(series) if next.revision != prev.revision => {
            sink.render_chart(ChartSlot::Prediction, &doughnut_spec(series));
        }
        None if prev.doughnut_series.is_some() => sink.clear_chart(ChartSlot::Prediction),
        _ => {}
    }

    sink.render_panel(&ResultPanel::from_state(next));
}

/// Sink that keeps the current chart per slot and the last panel, and logs
/// every change. Used by the console and anywhere a real display is absent.
#[derive(Default)]
pub struct TracingSink {
    charts: HashMap<ChartSlot, ChartSpec>,
    panel: Option<ResultPanel>,
    rebuilds: u64,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chart(&self, slot: ChartSlot) -> Option<&ChartSpec> {
        self.charts.get(&slot)
    }

    pub fn panel(&self) -> Option<&ResultPanel> {
        self.panel.as_ref()
    }

    /// How many times an existing chart instance was torn down and replaced.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }
}

impl RenderSink for TracingSink {
    fn render_chart(&mut self, slot: ChartSlot, spec: &ChartSpec) {
        if self.charts.remove(&slot).is_some() {
            self.rebuilds += 1;
            tracing::debug!("destroyed previous {} chart", slot);
        }
        tracing::info!(
            "render {} chart kind={:?} points={}",
            slot,
            spec.kind,
            spec.labels.len()
        );
        self.charts.insert(slot, spec.clone());
    }

    fn clear_chart(&mut self, slot: ChartSlot) {
        if self.charts.remove(&slot).is_some() {
            tracing::info!("cleared {} chart", slot);
        }
    }

    fn render_panel(&mut self, panel: &ResultPanel) {
        tracing::info!(
            "panel visible={} badge={:?} bar={:?} risks={} recs={} today={}",
            panel.visible,
            panel.badge.as_ref().map(|b| b.text.as_str()),
            panel.probability_bar.as_ref().map(|b| b.label.as_str()),
            panel.risk_factors.len(),
            panel.recommendations.len(),
            panel.predictions_today
        );
        self.panel = Some(panel.clone());
    }
}
