//! Presentation surface contract and an in-memory implementation.
//!
//! The engines never touch a rendering layer directly. They address elements
//! by [`ElementId`] through [`PresentationSurface`]; a lookup for an element
//! the surface does not know is a broken contract and fails with
//! [`RegistrationError::ElementNotFound`].

use std::collections::BTreeMap;
use std::fmt;

use crate::errors::{RegistrationError, Result};
use crate::form::catalog::{ActivityCatalog, ActivityId, COLOR_OPTIONS};
use crate::form::state::FieldId;

/// Stable identifiers for every element the core addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementId {
    Name,
    Email,
    JobRole,
    OtherJobRole,
    ShirtSize,
    ShirtDesign,
    ShirtColor,
    ColorOption(String),
    ActivitiesBox,
    Activity(ActivityId),
    ActivitiesCost,
    Payment,
    CreditCardPanel,
    PaypalPanel,
    BitcoinPanel,
    CardNumber,
    ZipCode,
    Cvv,
    Hint(FieldId),
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementId::Name => f.write_str("name"),
            ElementId::Email => f.write_str("email"),
            ElementId::JobRole => f.write_str("title"),
            ElementId::OtherJobRole => f.write_str("other-job-role"),
            ElementId::ShirtSize => f.write_str("size"),
            ElementId::ShirtDesign => f.write_str("design"),
            ElementId::ShirtColor => f.write_str("color"),
            ElementId::ColorOption(value) => write!(f, "color[{value}]"),
            ElementId::ActivitiesBox => f.write_str("activities-box"),
            ElementId::Activity(id) => write!(f, "activity[{id}]"),
            ElementId::ActivitiesCost => f.write_str("activities-cost"),
            ElementId::Payment => f.write_str("payment"),
            ElementId::CreditCardPanel => f.write_str("credit-card"),
            ElementId::PaypalPanel => f.write_str("paypal"),
            ElementId::BitcoinPanel => f.write_str("bitcoin"),
            ElementId::CardNumber => f.write_str("cc-num"),
            ElementId::ZipCode => f.write_str("zip"),
            ElementId::Cvv => f.write_str("cvv"),
            ElementId::Hint(field) => {
                let prefix = match field {
                    FieldId::Name => "name",
                    FieldId::Email => "email",
                    FieldId::Activities => "activities",
                    FieldId::CardNumber => "cc",
                    FieldId::ZipCode => "zip",
                    FieldId::Cvv => "cvv",
                };
                write!(f, "{prefix}-hint")
            }
        }
    }
}

/// Validity marker applied to a field's container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Valid,
    NotValid,
}

impl Marker {
    pub fn class_name(self) -> &'static str {
        match self {
            Marker::Valid => "valid",
            Marker::NotValid => "not-valid",
        }
    }
}

/// Blocking acknowledgements raised by the submit flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    SubmitAccepted,
    SubmitRejected,
}

impl Notice {
    pub fn message(self) -> &'static str {
        match self {
            Notice::SubmitAccepted => "Form submitted successfully!",
            Notice::SubmitRejected => "Please fix the errors in the form before submitting.",
        }
    }
}

/// Capabilities the engines need from the rendering layer.
pub trait PresentationSurface {
    fn set_visible(&mut self, element: &ElementId, visible: bool) -> Result<()>;

    fn set_enabled(&mut self, element: &ElementId, enabled: bool) -> Result<()>;

    fn set_checked(&mut self, element: &ElementId, checked: bool) -> Result<()>;

    fn set_text(&mut self, element: &ElementId, text: &str) -> Result<()>;

    fn set_marker(&mut self, element: &ElementId, marker: Marker) -> Result<()>;

    fn focus(&mut self, element: &ElementId) -> Result<()>;

    fn notify(&mut self, notice: Notice) -> Result<()>;
}

/// Snapshot of one element held by [`InMemorySurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementState {
    pub visible: bool,
    pub enabled: bool,
    pub checked: bool,
    pub text: String,
    pub marker: Option<Marker>,
}

impl Default for ElementState {
    fn default() -> Self {
        Self {
            visible: true,
            enabled: true,
            checked: false,
            text: String::new(),
            marker: None,
        }
    }
}

/// A single mutating call, recorded in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    Visible(ElementId, bool),
    Enabled(ElementId, bool),
    Checked(ElementId, bool),
    Text(ElementId, String),
    Marker(ElementId, Marker),
    Focus(ElementId),
    Notify(Notice),
}

/// Element table plus call log. Used as the test double for the engines and
/// as the backing model of the terminal front-end.
#[derive(Debug, Clone, Default)]
pub struct InMemorySurface {
    elements: BTreeMap<ElementId, ElementState>,
    focused: Option<ElementId>,
    notices: Vec<Notice>,
    calls: Vec<SurfaceCall>,
}

impl InMemorySurface {
    /// Registers every element of the registration form for `catalog`.
    pub fn for_catalog(catalog: &ActivityCatalog) -> Self {
        let mut surface = Self::default();
        let fixed = [
            ElementId::Name,
            ElementId::Email,
            ElementId::JobRole,
            ElementId::OtherJobRole,
            ElementId::ShirtSize,
            ElementId::ShirtDesign,
            ElementId::ShirtColor,
            ElementId::ActivitiesBox,
            ElementId::ActivitiesCost,
            ElementId::Payment,
            ElementId::CreditCardPanel,
            ElementId::PaypalPanel,
            ElementId::BitcoinPanel,
            ElementId::CardNumber,
            ElementId::ZipCode,
            ElementId::Cvv,
        ];
        for element in fixed {
            surface.register(element);
        }
        for option in COLOR_OPTIONS {
            surface.register(ElementId::ColorOption(option.value.to_string()));
        }
        for activity in catalog.iter() {
            surface.register(ElementId::Activity(activity.id.clone()));
        }
        for field in FieldId::ALL {
            surface.elements.insert(
                field.hint(),
                ElementState {
                    visible: false,
                    text: field.hint_message().to_string(),
                    ..ElementState::default()
                },
            );
        }
        surface
    }

    pub fn register(&mut self, element: ElementId) {
        self.elements.entry(element).or_default();
    }

    /// Drops an element, e.g. to exercise a surface that lacks it.
    pub fn without(mut self, element: &ElementId) -> Self {
        self.elements.remove(element);
        self
    }

    pub fn element(&self, element: &ElementId) -> Option<&ElementState> {
        self.elements.get(element)
    }

    pub fn is_visible(&self, element: &ElementId) -> bool {
        self.element(element).map(|e| e.visible).unwrap_or(false)
    }

    pub fn is_enabled(&self, element: &ElementId) -> bool {
        self.element(element).map(|e| e.enabled).unwrap_or(false)
    }

    pub fn is_checked(&self, element: &ElementId) -> bool {
        self.element(element).map(|e| e.checked).unwrap_or(false)
    }

    pub fn text(&self, element: &ElementId) -> Option<&str> {
        self.element(element).map(|e| e.text.as_str())
    }

    pub fn marker(&self, element: &ElementId) -> Option<Marker> {
        self.element(element).and_then(|e| e.marker)
    }

    pub fn focused(&self) -> Option<&ElementId> {
        self.focused.as_ref()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    fn lookup(&mut self, element: &ElementId) -> Result<&mut ElementState> {
        self.elements
            .get_mut(element)
            .ok_or_else(|| RegistrationError::ElementNotFound(element.to_string()))
    }
}

impl PresentationSurface for InMemorySurface {
    fn set_visible(&mut self, element: &ElementId, visible: bool) -> Result<()> {
        self.lookup(element)?.visible = visible;
        self.calls.push(SurfaceCall::Visible(element.clone(), visible));
        Ok(())
    }

    fn set_enabled(&mut self, element: &ElementId, enabled: bool) -> Result<()> {
        self.lookup(element)?.enabled = enabled;
        self.calls.push(SurfaceCall::Enabled(element.clone(), enabled));
        Ok(())
    }

    fn set_checked(&mut self, element: &ElementId, checked: bool) -> Result<()> {
        self.lookup(element)?.checked = checked;
        self.calls.push(SurfaceCall::Checked(element.clone(), checked));
        Ok(())
    }

    fn set_text(&mut self, element: &ElementId, text: &str) -> Result<()> {
        self.lookup(element)?.text = text.to_string();
        self.calls
            .push(SurfaceCall::Text(element.clone(), text.to_string()));
        Ok(())
    }

    fn set_marker(&mut self, element: &ElementId, marker: Marker) -> Result<()> {
        self.lookup(element)?.marker = Some(marker);
        self.calls.push(SurfaceCall::Marker(element.clone(), marker));
        Ok(())
    }

    fn focus(&mut self, element: &ElementId) -> Result<()> {
        self.lookup(element)?;
        self.focused = Some(element.clone());
        self.calls.push(SurfaceCall::Focus(element.clone()));
        Ok(())
    }

    fn notify(&mut self, notice: Notice) -> Result<()> {
        self.notices.push(notice);
        self.calls.push(SurfaceCall::Notify(notice));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_ids_render_like_form_ids() {
        assert_eq!(ElementId::JobRole.to_string(), "title");
        assert_eq!(ElementId::CardNumber.to_string(), "cc-num");
        assert_eq!(ElementId::Hint(FieldId::CardNumber).to_string(), "cc-hint");
        assert_eq!(
            ElementId::Activity(ActivityId::from("npm")).to_string(),
            "activity[npm]"
        );
    }

    #[test]
    fn hints_start_hidden() {
        let surface = InMemorySurface::for_catalog(&ActivityCatalog::conference());
        for field in FieldId::ALL {
            assert!(!surface.is_visible(&field.hint()));
        }
        assert!(surface.is_visible(&ElementId::Name));
    }

    #[test]
    fn missing_element_fails_loudly() {
        let mut surface = InMemorySurface::for_catalog(&ActivityCatalog::conference())
            .without(&ElementId::PaypalPanel);
        let err = surface
            .set_visible(&ElementId::PaypalPanel, true)
            .unwrap_err();
        assert!(matches!(err, RegistrationError::ElementNotFound(id) if id == "paypal"));
        assert!(surface.calls().is_empty());
    }
}
