//! Validated registration bundle and its hand-off contract.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::Result;
use crate::form::catalog::{ActivityCatalog, ActivityId};
use crate::form::state::{FieldId, FormState, JobRole, PaymentMethod, ShirtDesign, ShirtSize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedActivity {
    pub id: ActivityId,
    pub name: String,
    pub cost: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum PaymentDetails {
    CreditCard {
        card_number: String,
        zip_code: String,
        cvv: String,
    },
    Paypal,
    Bitcoin,
}

/// Everything a successful submit hands to the [`SubmissionSink`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrationBundle {
    pub registration_id: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub name: String,
    pub email: String,
    pub job_role: JobRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_job_role: Option<String>,
    pub shirt_size: ShirtSize,
    pub shirt_design: ShirtDesign,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shirt_color: Option<String>,
    pub activities: Vec<SelectedActivity>,
    pub total_cost: u32,
    pub payment: PaymentDetails,
}

impl RegistrationBundle {
    pub fn from_state(state: &FormState, catalog: &ActivityCatalog) -> Self {
        // Catalog order, not selection order.
        let activities = catalog
            .iter()
            .filter(|activity| state.is_selected(&activity.id))
            .map(|activity| SelectedActivity {
                id: activity.id.clone(),
                name: activity.display_name.clone(),
                cost: activity.cost,
            })
            .collect();

        let other_job_role = (state.job_role == JobRole::Other)
            .then(|| state.other_job_role.trim().to_string())
            .filter(|text| !text.is_empty());

        let payment = match state.payment_method {
            PaymentMethod::CreditCard => PaymentDetails::CreditCard {
                card_number: state.card_number.clone(),
                zip_code: state.zip_code.clone(),
                cvv: state.cvv.clone(),
            },
            PaymentMethod::Paypal => PaymentDetails::Paypal,
            PaymentMethod::Bitcoin => PaymentDetails::Bitcoin,
        };

        Self {
            registration_id: Uuid::new_v4(),
            submitted_at: Utc::now(),
            name: state.name.clone(),
            email: state.email.clone(),
            job_role: state.job_role,
            other_job_role,
            shirt_size: state.shirt_size,
            shirt_design: state.shirt_design,
            shirt_color: state.shirt_color.clone(),
            activities,
            total_cost: state.total_cost,
            payment,
        }
    }
}

/// Result of a submit attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Accepted(RegistrationBundle),
    Rejected { invalid_fields: Vec<FieldId> },
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted(_))
    }
}

/// External collaborator receiving validated bundles. It is never called
/// for an invalid form.
pub trait SubmissionSink {
    fn accept(&mut self, bundle: &RegistrationBundle) -> Result<()>;
}

/// Keeps accepted bundles in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    bundles: Vec<RegistrationBundle>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bundles(&self) -> &[RegistrationBundle] {
        &self.bundles
    }
}

impl SubmissionSink for MemorySink {
    fn accept(&mut self, bundle: &RegistrationBundle) -> Result<()> {
        self.bundles.push(bundle.clone());
        Ok(())
    }
}
