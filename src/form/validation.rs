//! Field rules, per-field validity tracking and submit gating.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::errors::Result;
use crate::form::state::{FieldId, FormState, Validity};
use crate::form::surface::{Marker, PresentationSurface};

// Character classes are spelled out in ASCII: `\w` and `\d` are
// Unicode-aware in `regex`, while these rules only admit ASCII.
static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z\s]+$").expect("name pattern compiles"));
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+@[A-Za-z0-9_]+\.[A-Za-z0-9_]+$").expect("email pattern compiles")
});
static CARD_NUMBER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{13,16}$").expect("card pattern compiles"));
static ZIP_CODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{5}$").expect("zip pattern compiles"));
static CVV_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{3}$").expect("cvv pattern compiles"));

/// Letters and whitespace only, and no leading whitespace.
pub fn is_valid_name(value: &str) -> bool {
    !value.starts_with(char::is_whitespace) && NAME_PATTERN.is_match(value)
}

/// `word@word.word`; deliberately permissive.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

pub fn is_valid_card_number(value: &str) -> bool {
    CARD_NUMBER_PATTERN.is_match(value)
}

pub fn is_valid_zip_code(value: &str) -> bool {
    ZIP_CODE_PATTERN.is_match(value)
}

pub fn is_valid_cvv(value: &str) -> bool {
    CVV_PATTERN.is_match(value)
}

/// Validation rule attached to each validated field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    PersonName,
    EmailAddress,
    AtLeastOneActivity,
    CardNumber,
    ZipCode,
    Cvv,
}

impl Rule {
    pub fn for_field(field: FieldId) -> Self {
        match field {
            FieldId::Name => Rule::PersonName,
            FieldId::Email => Rule::EmailAddress,
            FieldId::Activities => Rule::AtLeastOneActivity,
            FieldId::CardNumber => Rule::CardNumber,
            FieldId::ZipCode => Rule::ZipCode,
            FieldId::Cvv => Rule::Cvv,
        }
    }

    pub fn check(self, state: &FormState) -> bool {
        match self {
            Rule::PersonName => is_valid_name(&state.name),
            Rule::EmailAddress => is_valid_email(&state.email),
            Rule::AtLeastOneActivity => !state.selected_activities.is_empty(),
            Rule::CardNumber => is_valid_card_number(&state.card_number),
            Rule::ZipCode => is_valid_zip_code(&state.zip_code),
            Rule::Cvv => is_valid_cvv(&state.cvv),
        }
    }
}

/// Evaluates rules, records validity and reflects it on the surface.
#[derive(Debug, Default, Clone, Copy)]
pub struct ValidationEngine;

impl ValidationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Evaluates one field. Marker and hint are only rewritten when the
    /// validity differs from the recorded one, so re-validating an unchanged
    /// value is silent.
    pub fn validate_field<S>(
        &self,
        state: &mut FormState,
        surface: &mut S,
        field: FieldId,
    ) -> Result<bool>
    where
        S: PresentationSurface + ?Sized,
    {
        let valid = Rule::for_field(field).check(state);
        let next = Validity::from(valid);
        let previous = state.record_validity(field, next);
        if previous != next {
            debug!(%field, ?previous, ?next, "field validity changed");
            let marker = if valid { Marker::Valid } else { Marker::NotValid };
            surface.set_marker(&field.input(), marker)?;
            surface.set_visible(&field.hint(), !valid)?;
        }
        if !valid {
            let text = field.hint_for(state);
            if state.record_hint(field, text) {
                surface.set_text(&field.hint(), text)?;
            }
        }
        Ok(valid)
    }

    /// Evaluates every applicable field (no short-circuit, so every hint is
    /// refreshed) and returns their conjunction. Card fields are skipped,
    /// and count as valid, unless paying by credit card.
    pub fn validate_form<S>(&self, state: &mut FormState, surface: &mut S) -> Result<bool>
    where
        S: PresentationSurface + ?Sized,
    {
        let mut all_valid = true;
        for field in FieldId::ALL {
            if !field.applies_to(state.payment_method) {
                continue;
            }
            let valid = self.validate_field(state, surface, field)?;
            all_valid &= valid;
        }
        Ok(all_valid)
    }

    /// First applicable field flagged invalid, in declaration order.
    pub fn first_invalid_field(&self, state: &FormState) -> Option<FieldId> {
        state
            .invalid_fields()
            .into_iter()
            .find(|field| field.applies_to(state.payment_method))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::catalog::{ActivityCatalog, ActivityId};
    use crate::form::state::PaymentMethod;
    use crate::form::surface::{InMemorySurface, SurfaceCall};

    #[test]
    fn name_rule() {
        assert!(is_valid_name("John Smith"));
        assert!(is_valid_name("ada"));
        assert!(is_valid_name("Ada "));
        assert!(!is_valid_name("John3"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name(" John"));
        assert!(!is_valid_name("   "));
        assert!(!is_valid_name("Jos\u{e9}"));
    }

    #[test]
    fn email_rule() {
        assert!(is_valid_email("a@b.c"));
        assert!(is_valid_email("jane_doe@example.com"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a.b@c.d"));
        assert!(!is_valid_email("a@b.c.d"));
        assert!(!is_valid_email("@b.c"));
        assert!(!is_valid_email("a@b.c\n"));
    }

    #[test]
    fn card_rules() {
        assert!(is_valid_card_number("1234567890123"));
        assert!(is_valid_card_number("1234567890123456"));
        assert!(!is_valid_card_number("123456789012"));
        assert!(!is_valid_card_number("12345678901234567"));
        assert!(!is_valid_card_number("1234 5678 9012 3"));
        assert!(is_valid_zip_code("90210"));
        assert!(!is_valid_zip_code("9021"));
        assert!(!is_valid_zip_code("902100"));
        assert!(is_valid_cvv("123"));
        assert!(!is_valid_cvv("12a"));
        assert!(!is_valid_cvv("\u{661}23"));
    }

    #[test]
    fn revalidating_unchanged_value_is_silent() {
        let engine = ValidationEngine::new();
        let mut state = FormState::new();
        let mut surface = InMemorySurface::for_catalog(&ActivityCatalog::conference());
        state.name = "John3".into();

        assert!(!engine
            .validate_field(&mut state, &mut surface, FieldId::Name)
            .unwrap());
        assert_eq!(surface.calls().len(), 3);
        assert!(surface.is_visible(&FieldId::Name.hint()));

        surface.clear_calls();
        assert!(!engine
            .validate_field(&mut state, &mut surface, FieldId::Name)
            .unwrap());
        assert!(surface.calls().is_empty());

        state.name = "John".into();
        assert!(engine
            .validate_field(&mut state, &mut surface, FieldId::Name)
            .unwrap());
        assert_eq!(
            surface.calls(),
            &[
                SurfaceCall::Marker(FieldId::Name.input(), Marker::Valid),
                SurfaceCall::Visible(FieldId::Name.hint(), false),
            ]
        );
    }

    #[test]
    fn name_hint_separates_blank_from_malformed() {
        let engine = ValidationEngine::new();
        let mut state = FormState::new();
        let mut surface = InMemorySurface::for_catalog(&ActivityCatalog::conference());
        let hint = FieldId::Name.hint();

        state.name = "R2D2".into();
        engine
            .validate_field(&mut state, &mut surface, FieldId::Name)
            .unwrap();
        assert_eq!(
            surface.text(&hint),
            Some("Name must start with a letter and contain only letters and spaces")
        );

        state.name = "   ".into();
        engine
            .validate_field(&mut state, &mut surface, FieldId::Name)
            .unwrap();
        assert_eq!(surface.text(&hint), Some("Name field cannot be blank"));
        assert_eq!(
            surface.calls().last(),
            Some(&SurfaceCall::Text(hint.clone(), "Name field cannot be blank".into()))
        );

        surface.clear_calls();
        state.name = String::new();
        engine
            .validate_field(&mut state, &mut surface, FieldId::Name)
            .unwrap();
        assert!(surface.calls().is_empty());
    }

    #[test]
    fn form_skips_card_fields_for_other_methods() {
        let engine = ValidationEngine::new();
        let mut state = FormState::new();
        let mut surface = InMemorySurface::for_catalog(&ActivityCatalog::conference());
        state.name = "Ada".into();
        state.email = "ada@lovelace.org".into();
        state.selected_activities.insert(ActivityId::from("all"));

        assert!(!engine.validate_form(&mut state, &mut surface).unwrap());
        assert_eq!(engine.first_invalid_field(&state), Some(FieldId::CardNumber));

        state.payment_method = PaymentMethod::Bitcoin;
        assert!(engine.validate_form(&mut state, &mut surface).unwrap());
        assert_eq!(engine.first_invalid_field(&state), None);
    }

    #[test]
    fn form_evaluates_every_field() {
        let engine = ValidationEngine::new();
        let mut state = FormState::new();
        let mut surface = InMemorySurface::for_catalog(&ActivityCatalog::conference());
        assert!(!engine.validate_form(&mut state, &mut surface).unwrap());
        for field in FieldId::ALL {
            assert_eq!(state.validity(field), Validity::Invalid);
            assert!(surface.is_visible(&field.hint()));
        }
        assert_eq!(engine.first_invalid_field(&state), Some(FieldId::Name));
    }
}
