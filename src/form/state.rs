//! Form-state aggregate and the closed option sets feeding it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::form::catalog::ActivityId;
use crate::form::surface::ElementId;

/// Job role selector options, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobRole {
    #[default]
    Unset,
    FullStackJs,
    FrontEnd,
    BackEnd,
    Designer,
    Student,
    Other,
}

impl JobRole {
    /// Roles a user can pick; `Unset` is the hidden "Select Job Role" entry.
    pub const SELECTABLE: [JobRole; 6] = [
        JobRole::FullStackJs,
        JobRole::FrontEnd,
        JobRole::BackEnd,
        JobRole::Designer,
        JobRole::Student,
        JobRole::Other,
    ];

    pub fn value(self) -> &'static str {
        match self {
            JobRole::Unset => "",
            JobRole::FullStackJs => "full-stack js developer",
            JobRole::FrontEnd => "front-end developer",
            JobRole::BackEnd => "back-end developer",
            JobRole::Designer => "designer",
            JobRole::Student => "student",
            JobRole::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            JobRole::Unset => "Select Job Role",
            JobRole::FullStackJs => "Full Stack JavaScript Developer",
            JobRole::FrontEnd => "Front End Developer",
            JobRole::BackEnd => "Back End Developer",
            JobRole::Designer => "Designer",
            JobRole::Student => "Student",
            JobRole::Other => "Other",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            JobRole::Unset => &[],
            JobRole::FullStackJs => &["full-stack-js", "fullstack"],
            JobRole::FrontEnd => &["front-end", "frontend"],
            JobRole::BackEnd => &["back-end", "backend"],
            JobRole::Designer => &[],
            JobRole::Student => &[],
            JobRole::Other => &[],
        }
    }

    /// Single-word spelling accepted by [`JobRole::parse`].
    pub fn token(self) -> &'static str {
        self.aliases().first().copied().unwrap_or(self.value())
    }

    pub fn parse(input: &str) -> Option<Self> {
        let needle = input.trim().to_ascii_lowercase();
        Self::SELECTABLE.into_iter().find(|role| {
            role.value() == needle
                || role.label().to_ascii_lowercase() == needle
                || role.aliases().contains(&needle.as_str())
        })
    }
}

/// T-shirt theme selector options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShirtDesign {
    #[default]
    Unset,
    JsPuns,
    HeartJs,
}

impl ShirtDesign {
    pub const SELECTABLE: [ShirtDesign; 2] = [ShirtDesign::JsPuns, ShirtDesign::HeartJs];

    pub fn value(self) -> &'static str {
        match self {
            ShirtDesign::Unset => "",
            ShirtDesign::JsPuns => "js puns",
            ShirtDesign::HeartJs => "heart js",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ShirtDesign::Unset => "Select Theme",
            ShirtDesign::JsPuns => "Theme - JS Puns",
            ShirtDesign::HeartJs => "Theme - I \u{2665} JS",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        let needle = input.trim().to_ascii_lowercase().replace('-', " ");
        Self::SELECTABLE
            .into_iter()
            .find(|design| design.value() == needle || design.value().replace(' ', "") == needle)
    }
}

/// T-shirt size selector; it has no dependent fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShirtSize {
    Small,
    #[default]
    Medium,
    Large,
    ExtraLarge,
    DoubleExtraLarge,
}

impl ShirtSize {
    pub const ALL: [ShirtSize; 5] = [
        ShirtSize::Small,
        ShirtSize::Medium,
        ShirtSize::Large,
        ShirtSize::ExtraLarge,
        ShirtSize::DoubleExtraLarge,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ShirtSize::Small => "S",
            ShirtSize::Medium => "M",
            ShirtSize::Large => "L",
            ShirtSize::ExtraLarge => "XL",
            ShirtSize::DoubleExtraLarge => "XXL",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        let needle = input.trim();
        Self::ALL
            .into_iter()
            .find(|size| size.label().eq_ignore_ascii_case(needle))
    }
}

/// Payment selector options; credit card is preselected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    #[default]
    CreditCard,
    Paypal,
    Bitcoin,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [
        PaymentMethod::CreditCard,
        PaymentMethod::Paypal,
        PaymentMethod::Bitcoin,
    ];

    pub fn value(self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "credit-card",
            PaymentMethod::Paypal => "paypal",
            PaymentMethod::Bitcoin => "bitcoin",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "Credit Card",
            PaymentMethod::Paypal => "PayPal",
            PaymentMethod::Bitcoin => "Bitcoin",
        }
    }

    /// Detail panel shown while this method is selected.
    pub fn panel(self) -> ElementId {
        match self {
            PaymentMethod::CreditCard => ElementId::CreditCardPanel,
            PaymentMethod::Paypal => ElementId::PaypalPanel,
            PaymentMethod::Bitcoin => ElementId::BitcoinPanel,
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        let needle = input.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|method| {
            method.value() == needle
                || method.label().to_ascii_lowercase() == needle
                || (needle == "card" && *method == PaymentMethod::CreditCard)
        })
    }
}

/// Fields carrying a validation rule, in declaration (and focus) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldId {
    Name,
    Email,
    Activities,
    CardNumber,
    ZipCode,
    Cvv,
}

impl FieldId {
    pub const ALL: [FieldId; 6] = [
        FieldId::Name,
        FieldId::Email,
        FieldId::Activities,
        FieldId::CardNumber,
        FieldId::ZipCode,
        FieldId::Cvv,
    ];

    /// Card fields are only evaluated while paying by credit card.
    pub fn is_payment_field(self) -> bool {
        matches!(self, FieldId::CardNumber | FieldId::ZipCode | FieldId::Cvv)
    }

    pub fn applies_to(self, method: PaymentMethod) -> bool {
        !self.is_payment_field() || method == PaymentMethod::CreditCard
    }

    /// Element that carries the validity marker and receives focus.
    pub fn input(self) -> ElementId {
        match self {
            FieldId::Name => ElementId::Name,
            FieldId::Email => ElementId::Email,
            FieldId::Activities => ElementId::ActivitiesBox,
            FieldId::CardNumber => ElementId::CardNumber,
            FieldId::ZipCode => ElementId::ZipCode,
            FieldId::Cvv => ElementId::Cvv,
        }
    }

    pub fn hint(self) -> ElementId {
        ElementId::Hint(self)
    }

    /// Hint shown for an invalid value. A non-blank name fails on its
    /// characters, not on being empty.
    pub fn hint_for(self, state: &FormState) -> &'static str {
        match self {
            FieldId::Name if !state.name.trim().is_empty() => {
                "Name must start with a letter and contain only letters and spaces"
            }
            _ => self.hint_message(),
        }
    }

    pub fn hint_message(self) -> &'static str {
        match self {
            FieldId::Name => "Name field cannot be blank",
            FieldId::Email => "Email address must be formatted correctly",
            FieldId::Activities => "Please select at least one activity.",
            FieldId::CardNumber => "Please enter a number between 13 and 16 digits.",
            FieldId::ZipCode => "Enter a 5 digit ZIP code.",
            FieldId::Cvv => "Enter a 3 digit CVV number.",
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FieldId::Name => "name",
            FieldId::Email => "email",
            FieldId::Activities => "activities",
            FieldId::CardNumber => "card number",
            FieldId::ZipCode => "zip code",
            FieldId::Cvv => "cvv",
        };
        write!(f, "{label}")
    }
}

/// Per-field validation state. Once evaluated a field never returns to
/// `Unvalidated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Validity {
    #[default]
    Unvalidated,
    Valid,
    Invalid,
}

impl From<bool> for Validity {
    fn from(valid: bool) -> Self {
        if valid {
            Validity::Valid
        } else {
            Validity::Invalid
        }
    }
}

/// The single mutable aggregate behind one registration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormState {
    pub name: String,
    pub email: String,
    pub job_role: JobRole,
    pub other_job_role: String,
    pub shirt_size: ShirtSize,
    pub shirt_design: ShirtDesign,
    pub shirt_color: Option<String>,
    pub selected_activities: BTreeSet<ActivityId>,
    pub total_cost: u32,
    pub payment_method: PaymentMethod,
    pub card_number: String,
    pub zip_code: String,
    pub cvv: String,
    field_validity: BTreeMap<FieldId, Validity>,
    hint_text: BTreeMap<FieldId, &'static str>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validity(&self, field: FieldId) -> Validity {
        self.field_validity
            .get(&field)
            .copied()
            .unwrap_or_default()
    }

    /// Stores a freshly computed validity and returns the previous one.
    pub fn record_validity(&mut self, field: FieldId, validity: Validity) -> Validity {
        self.field_validity
            .insert(field, validity)
            .unwrap_or_default()
    }

    /// Stores the hint text shown for `field`; true when it differs from
    /// what is already displayed.
    pub fn record_hint(&mut self, field: FieldId, text: &'static str) -> bool {
        let shown = self
            .hint_text
            .insert(field, text)
            .unwrap_or(field.hint_message());
        shown != text
    }

    /// Fields currently flagged invalid, in declaration order.
    pub fn invalid_fields(&self) -> Vec<FieldId> {
        FieldId::ALL
            .into_iter()
            .filter(|field| self.validity(*field) == Validity::Invalid)
            .collect()
    }

    pub fn is_selected(&self, id: &ActivityId) -> bool {
        self.selected_activities.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_initial_presentation() {
        let state = FormState::new();
        assert_eq!(state.job_role, JobRole::Unset);
        assert_eq!(state.shirt_design, ShirtDesign::Unset);
        assert_eq!(state.shirt_color, None);
        assert_eq!(state.shirt_size, ShirtSize::Medium);
        assert_eq!(state.payment_method, PaymentMethod::CreditCard);
        assert_eq!(state.total_cost, 0);
        assert!(state.selected_activities.is_empty());
        for field in FieldId::ALL {
            assert_eq!(state.validity(field), Validity::Unvalidated);
        }
    }

    #[test]
    fn record_validity_returns_previous_state() {
        let mut state = FormState::new();
        assert_eq!(
            state.record_validity(FieldId::Email, Validity::Invalid),
            Validity::Unvalidated
        );
        assert_eq!(
            state.record_validity(FieldId::Email, Validity::Valid),
            Validity::Invalid
        );
        assert_eq!(state.validity(FieldId::Email), Validity::Valid);
    }

    #[test]
    fn option_parsers_accept_values_and_labels() {
        assert_eq!(JobRole::parse("other"), Some(JobRole::Other));
        assert_eq!(JobRole::parse("Front End Developer"), Some(JobRole::FrontEnd));
        assert_eq!(JobRole::parse("backend"), Some(JobRole::BackEnd));
        assert_eq!(JobRole::parse(""), None);
        assert_eq!(ShirtDesign::parse("js-puns"), Some(ShirtDesign::JsPuns));
        assert_eq!(ShirtDesign::parse("heart js"), Some(ShirtDesign::HeartJs));
        assert_eq!(ShirtDesign::parse("heartjs"), Some(ShirtDesign::HeartJs));
        assert_eq!(ShirtSize::parse("xl"), Some(ShirtSize::ExtraLarge));
        assert_eq!(PaymentMethod::parse("PayPal"), Some(PaymentMethod::Paypal));
        assert_eq!(PaymentMethod::parse("card"), Some(PaymentMethod::CreditCard));
        assert_eq!(PaymentMethod::parse("cash"), None);
    }

    #[test]
    fn payment_fields_only_apply_to_credit_card() {
        assert!(FieldId::Name.applies_to(PaymentMethod::Bitcoin));
        assert!(FieldId::Cvv.applies_to(PaymentMethod::CreditCard));
        assert!(!FieldId::ZipCode.applies_to(PaymentMethod::Paypal));
    }
}
