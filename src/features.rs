use serde::Deserialize;

use crate::error::{FormField, ValidationError};
use crate::types::{ContractType, CustomerInput, FeatureVector};

/// Raw field values as they arrive from the form, before any parsing.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawForm {
    pub tenure: String,
    pub monthly_charges: String,
    pub contract: String,
}

impl RawForm {
    pub fn new(
        tenure: impl Into<String>,
        monthly_charges: impl Into<String>,
        contract: impl Into<String>,
    ) -> Self {
        Self {
            tenure: tenure.into(),
            monthly_charges: monthly_charges.into(),
            contract: contract.into(),
        }
    }
}

/// Parse the form into a typed input. No range interpretation happens
/// here beyond what the target types require.
pub fn parse_input(form: &RawForm) -> Result<CustomerInput, ValidationError> {
    let tenure_months = form
        .tenure
        .trim()
        .parse::<u32>()
        .map_err(|_| invalid(FormField::Tenure, &form.tenure))?;

    let monthly_charges = form
        .monthly_charges
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .ok_or_else(|| invalid(FormField::MonthlyCharges, &form.monthly_charges))?;

    let contract = form
        .contract
        .parse::<ContractType>()
        .map_err(|_| invalid(FormField::Contract, &form.contract))?;

    Ok(CustomerInput {
        tenure_months,
        monthly_charges,
        contract,
    })
}

/// Parse and encode in one step: the input (for the insight engine) and
/// its wire vector (for the client).
pub fn build(form: &RawForm) -> Result<(CustomerInput, FeatureVector), ValidationError> {
    let input = parse_input(form)?;
    let vector = FeatureVector::from(&input);
    Ok((input, vector))
}

fn invalid(field: FormField, value: &str) -> ValidationError {
    ValidationError {
        field,
        value: value.to_string(),
    }
}
