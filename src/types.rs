use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeTuple;
use serde::{Serialize, Serializer};

// ---------- Customer input ----------

/// Contract tier. Declaration order fixes the wire code (0, 1, 2).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContractType {
    MonthToMonth,
    OneYear,
    TwoYear,
}

impl ContractType {
    pub const ALL: [ContractType; 3] = [
        ContractType::MonthToMonth,
        ContractType::OneYear,
        ContractType::TwoYear,
    ];

    /// Integer code the scoring service expects in the third feature slot.
    pub fn code(self) -> u8 {
        match self {
            ContractType::MonthToMonth => 0,
            ContractType::OneYear => 1,
            ContractType::TwoYear => 2,
        }
    }

    /// Label as submitted by the form.
    pub fn label(self) -> &'static str {
        match self {
            ContractType::MonthToMonth => "Month-to-month",
            ContractType::OneYear => "One year",
            ContractType::TwoYear => "Two year",
        }
    }
}

impl FromStr for ContractType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContractType::ALL
            .into_iter()
            .find(|c| c.label() == s.trim())
            .ok_or(())
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Validated customer attributes for one submission.
#[derive(Clone, Debug, PartialEq)]
pub struct CustomerInput {
    pub tenure_months: u32,
    pub monthly_charges: f64,
    pub contract: ContractType,
}

// ---------- Wire vector ----------

/// Ordered `[tenure, monthly_charges, contract_code]`.
///
/// Serializes as a bare JSON array; reordering the fields breaks the
/// scoring service contract.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureVector {
    pub tenure: u32,
    pub monthly_charges: f64,
    pub contract_code: u8,
}

impl FeatureVector {
    pub const LEN: usize = 3;

    pub fn to_array(self) -> [f64; Self::LEN] {
        [
            f64::from(self.tenure),
            self.monthly_charges,
            f64::from(self.contract_code),
        ]
    }
}

impl From<&CustomerInput> for FeatureVector {
    fn from(input: &CustomerInput) -> Self {
        Self {
            tenure: input.tenure_months,
            monthly_charges: input.monthly_charges,
            contract_code: input.contract.code(),
        }
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tup = serializer.serialize_tuple(Self::LEN)?;
        tup.serialize_element(&self.tenure)?;
        tup.serialize_element(&self.monthly_charges)?;
        tup.serialize_element(&self.contract_code)?;
        tup.end()
    }
}

// ---------- Prediction ----------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PredictionLabel {
    Churn,
    NoChurn,
}

impl PredictionLabel {
    /// Service convention: `1` is churn, anything else is not.
    pub fn from_wire(prediction: f64) -> Self {
        if prediction == 1.0 {
            PredictionLabel::Churn
        } else {
            PredictionLabel::NoChurn
        }
    }
}

impl fmt::Display for PredictionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionLabel::Churn => write!(f, "Churn"),
            PredictionLabel::NoChurn => write!(f, "No Churn"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PredictionResult {
    pub label: PredictionLabel,
    pub probability: f64, // in [0, 1]
}

// ---------- Derived insights ----------

/// Symbolic icon ids; the strings are the dashboard's icon classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Icon {
    CalendarTimes,
    DollarSign,
    Clock,
    ExclamationCircle,
    Phone,
    Gift,
    Tags,
    Star,
    CheckCircle,
    ChartLine,
    ArrowUp,
}

impl Icon {
    pub fn as_str(self) -> &'static str {
        match self {
            Icon::CalendarTimes => "fa-calendar-times",
            Icon::DollarSign => "fa-dollar-sign",
            Icon::Clock => "fa-clock",
            Icon::ExclamationCircle => "fa-exclamation-circle",
            Icon::Phone => "fa-phone",
            Icon::Gift => "fa-gift",
            Icon::Tags => "fa-tags",
            Icon::Star => "fa-star",
            Icon::CheckCircle => "fa-check-circle",
            Icon::ChartLine => "fa-chart-line",
            Icon::ArrowUp => "fa-arrow-up",
        }
    }
}

impl Serialize for Icon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One line in the risk-factor or recommendation panel.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Insight {
    pub icon: Icon,
    pub text: String,
}

impl Insight {
    pub fn new(icon: Icon, text: impl Into<String>) -> Self {
        Self {
            icon,
            text: text.into(),
        }
    }
}

pub type RiskFactor = Insight;
pub type Recommendation = Insight;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_codes_follow_declaration_order() {
        let codes: Vec<u8> = ContractType::ALL.iter().map(|c| c.code()).collect();
        assert_eq!(codes, vec![0, 1, 2]);
    }

    #[test]
    fn contract_parses_form_labels() {
        assert_eq!("Month-to-month".parse::<ContractType>(), Ok(ContractType::MonthToMonth));
        assert_eq!(" One year ".parse::<ContractType>(), Ok(ContractType::OneYear));
        assert_eq!("Two year".parse::<ContractType>(), Ok(ContractType::TwoYear));
        assert!("Three year".parse::<ContractType>().is_err());
    }

    #[test]
    fn feature_vector_serializes_as_ordered_array() {
        let v = FeatureVector {
            tenure: 3,
            monthly_charges: 85.5,
            contract_code: 0,
        };
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "[3,85.5,0]");
        assert_eq!(v.to_array(), [3.0, 85.5, 0.0]);
    }

    #[test]
    fn only_one_maps_to_churn() {
        assert_eq!(PredictionLabel::from_wire(1.0), PredictionLabel::Churn);
        assert_eq!(PredictionLabel::from_wire(0.0), PredictionLabel::NoChurn);
        assert_eq!(PredictionLabel::from_wire(7.0), PredictionLabel::NoChurn);
        assert_eq!(PredictionLabel::from_wire(1.5), PredictionLabel::NoChurn);
    }
}
