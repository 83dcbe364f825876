//! Rule-based risk factors and recommended actions.
//!
//! Pure functions of the customer input and the returned prediction. Each
//! rule is checked independently, in a fixed order; that order is what the
//! panels display.

use crate::types::{
    ContractType, CustomerInput, Icon, Insight, PredictionLabel, PredictionResult,
    Recommendation, RiskFactor,
};

/// Monthly charges above this are flagged as high.
pub const HIGH_CHARGES_THRESHOLD: f64 = 70.0;
/// Tenure below this many months is the early lifecycle.
pub const SHORT_TENURE_MONTHS: u32 = 12;
/// Probability above this is critical regardless of inputs.
pub const CRITICAL_PROBABILITY: f64 = 0.7;

/// Both panels for one prediction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Insights {
    pub risk_factors: Vec<RiskFactor>,
    pub recommendations: Vec<Recommendation>,
}

pub fn derive_insights(input: &CustomerInput, result: &PredictionResult) -> Insights {
    Insights {
        risk_factors: derive_risk_factors(input, result.probability),
        recommendations: derive_recommendations(result.label, input),
    }
}

pub fn derive_risk_factors(input: &CustomerInput, probability: f64) -> Vec<RiskFactor> {
    let mut factors = Vec::new();

    // Static figure, not computed.
    if input.contract == ContractType::MonthToMonth {
        factors.push(Insight::new(
            Icon::CalendarTimes,
            "Month-to-month contract increases churn risk by 45%",
        ));
    }

    if input.monthly_charges > HIGH_CHARGES_THRESHOLD {
        factors.push(Insight::new(
            Icon::DollarSign,
            format!("High monthly charges (${}) above average", input.monthly_charges),
        ));
    }

    if input.tenure_months < SHORT_TENURE_MONTHS {
        factors.push(Insight::new(
            Icon::Clock,
            format!(
                "Short tenure ({} months) - early customer lifecycle",
                input.tenure_months
            ),
        ));
    }

    if probability > CRITICAL_PROBABILITY {
        factors.push(Insight::new(
            Icon::ExclamationCircle,
            "Critical risk level - immediate action required",
        ));
    }

    factors
}

pub fn derive_recommendations(label: PredictionLabel, input: &CustomerInput) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    match label {
        PredictionLabel::Churn => {
            recs.push(Insight::new(
                Icon::Phone,
                "Schedule immediate retention call with account manager",
            ));
            if input.contract == ContractType::MonthToMonth {
                recs.push(Insight::new(
                    Icon::Gift,
                    "Offer 15% discount for annual contract upgrade",
                ));
            }
            if input.monthly_charges > HIGH_CHARGES_THRESHOLD {
                recs.push(Insight::new(
                    Icon::Tags,
                    "Present customized pricing plan to reduce monthly cost",
                ));
            }
            // Loyalty offer always closes the churn list.
            recs.push(Insight::new(
                Icon::Star,
                "Enroll in VIP loyalty program with exclusive benefits",
            ));
        }
        PredictionLabel::NoChurn => {
            recs.push(Insight::new(
                Icon::CheckCircle,
                "Customer retention status: Healthy",
            ));
            recs.push(Insight::new(
                Icon::ChartLine,
                "Continue monitoring engagement metrics monthly",
            ));
            if input.contract != ContractType::TwoYear {
                recs.push(Insight::new(
                    Icon::ArrowUp,
                    "Opportunity: Upsell to longer contract term",
                ));
            }
        }
    }

    recs
}
