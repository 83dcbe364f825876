//! Churn prediction dashboard pipeline.
//!
//! Form input is parsed into a feature vector, scored by a remote service,
//! turned into risk factors and recommendations, and reduced into a
//! `VisualizationState` that is projected onto a rendering sink.

pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod features;
pub mod insights;
pub mod render;
pub mod service;
pub mod session;
pub mod state;
pub mod trend;
pub mod types;

pub use client::{HttpPredictionClient, PredictionClient};
pub use dashboard::{Dashboard, SubmitOutcome};
pub use error::{PipelineError, PredictionError, ValidationError};
pub use features::RawForm;
pub use state::VisualizationState;
