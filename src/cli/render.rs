//! Terminal presentation surface and text rendering of the form.

use std::io;

use dialoguer::Input;

use crate::cli::output;
use crate::errors::{RegistrationError, Result};
use crate::form::{
    ActivityCatalog, ElementId, FieldId, FormState, InMemorySurface, Marker, Notice, PaymentMethod,
    PresentationSurface, COLOR_OPTIONS,
};

/// Surface backed by an [`InMemorySurface`] element table. Notices and focus
/// changes are echoed to the terminal; notices block for an acknowledgement
/// when a user is at the keyboard.
pub struct TerminalSurface {
    elements: InMemorySurface,
    acknowledge_notices: bool,
}

impl TerminalSurface {
    pub fn new(catalog: &ActivityCatalog, acknowledge_notices: bool) -> Self {
        Self {
            elements: InMemorySurface::for_catalog(catalog),
            acknowledge_notices,
        }
    }

    pub fn elements(&self) -> &InMemorySurface {
        &self.elements
    }

    fn acknowledge(&self) -> Result<()> {
        if !self.acknowledge_notices {
            return Ok(());
        }
        Input::<String>::new()
            .with_prompt("Press Enter to continue")
            .allow_empty(true)
            .interact_text()
            .map(|_| ())
            .map_err(|err| {
                RegistrationError::Io(io::Error::new(io::ErrorKind::Other, err.to_string()))
            })
    }
}

impl PresentationSurface for TerminalSurface {
    fn set_visible(&mut self, element: &ElementId, visible: bool) -> Result<()> {
        self.elements.set_visible(element, visible)
    }

    fn set_enabled(&mut self, element: &ElementId, enabled: bool) -> Result<()> {
        self.elements.set_enabled(element, enabled)
    }

    fn set_checked(&mut self, element: &ElementId, checked: bool) -> Result<()> {
        self.elements.set_checked(element, checked)
    }

    fn set_text(&mut self, element: &ElementId, text: &str) -> Result<()> {
        self.elements.set_text(element, text)
    }

    fn set_marker(&mut self, element: &ElementId, marker: Marker) -> Result<()> {
        self.elements.set_marker(element, marker)
    }

    fn focus(&mut self, element: &ElementId) -> Result<()> {
        self.elements.focus(element)?;
        output::info(format!("Focus: {element}"));
        Ok(())
    }

    fn notify(&mut self, notice: Notice) -> Result<()> {
        self.elements.notify(notice)?;
        match notice {
            Notice::SubmitAccepted => output::success(notice.message()),
            Notice::SubmitRejected => output::error(notice.message()),
        }
        self.acknowledge()
    }
}

fn marker_suffix(surface: &InMemorySurface, element: &ElementId) -> &'static str {
    match surface.marker(element) {
        Some(Marker::Valid) => "  (valid)",
        Some(Marker::NotValid) => "  (not valid)",
        None => "",
    }
}

fn push_hint(lines: &mut Vec<RenderedLine>, surface: &InMemorySurface, field: FieldId) {
    let hint = field.hint();
    if surface.is_visible(&hint) {
        let text = surface.text(&hint).unwrap_or(field.hint_message());
        lines.push(RenderedLine::Hint(format!("    {text}")));
    }
}

fn or_blank(value: &str) -> &str {
    if value.is_empty() {
        "<blank>"
    } else {
        value
    }
}

/// One rendered line with its presentation role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedLine {
    Section(String),
    Field(String),
    Hint(String),
}

impl RenderedLine {
    pub fn text(&self) -> &str {
        match self {
            RenderedLine::Section(text) | RenderedLine::Field(text) | RenderedLine::Hint(text) => {
                text
            }
        }
    }
}

/// Renders what the surface currently shows. Hidden elements are omitted.
pub fn render_form(
    surface: &InMemorySurface,
    state: &FormState,
    catalog: &ActivityCatalog,
) -> Vec<RenderedLine> {
    let mut lines = Vec::new();

    lines.push(RenderedLine::Section("Basic Info".into()));
    lines.push(RenderedLine::Field(format!(
        "  Name: {}{}",
        or_blank(&state.name),
        marker_suffix(surface, &ElementId::Name)
    )));
    push_hint(&mut lines, surface, FieldId::Name);
    lines.push(RenderedLine::Field(format!(
        "  Email: {}{}",
        or_blank(&state.email),
        marker_suffix(surface, &ElementId::Email)
    )));
    push_hint(&mut lines, surface, FieldId::Email);
    lines.push(RenderedLine::Field(format!("  Job Role: {}", state.job_role.label())));
    if surface.is_visible(&ElementId::OtherJobRole) {
        lines.push(RenderedLine::Field(format!(
            "  Other job role: {}",
            or_blank(&state.other_job_role)
        )));
    }

    lines.push(RenderedLine::Section("T-Shirt Info".into()));
    lines.push(RenderedLine::Field(format!("  Size: {}", state.shirt_size.label())));
    lines.push(RenderedLine::Field(format!("  Design: {}", state.shirt_design.label())));
    let color_text = surface.text(&ElementId::ShirtColor).unwrap_or_default();
    if surface.is_enabled(&ElementId::ShirtColor) {
        lines.push(RenderedLine::Field(format!("  Color: {color_text}")));
        let options: Vec<&str> = COLOR_OPTIONS
            .iter()
            .filter(|option| {
                surface.is_visible(&ElementId::ColorOption(option.value.to_string()))
            })
            .map(|option| option.value)
            .collect();
        lines.push(RenderedLine::Field(format!(
            "    options: {}",
            options.join(", ")
        )));
    } else {
        lines.push(RenderedLine::Field(format!("  Color: {color_text} (disabled)")));
    }

    lines.push(RenderedLine::Section("Register for Activities".into()));
    for activity in catalog.iter() {
        let element = ElementId::Activity(activity.id.clone());
        let mark = if surface.is_checked(&element) { "[x]" } else { "[ ]" };
        let slot = activity
            .time_slot
            .as_deref()
            .map(|slot| format!(" - {slot}"))
            .unwrap_or_default();
        let unavailable = if surface.is_enabled(&element) {
            ""
        } else {
            "  (unavailable)"
        };
        lines.push(RenderedLine::Field(format!(
            "  {mark} {} <{}>{slot}  ${}{unavailable}",
            activity.display_name, activity.id, activity.cost
        )));
    }
    lines.push(RenderedLine::Field(format!(
        "  {}{}",
        surface.text(&ElementId::ActivitiesCost).unwrap_or_default(),
        marker_suffix(surface, &ElementId::ActivitiesBox)
    )));
    push_hint(&mut lines, surface, FieldId::Activities);

    lines.push(RenderedLine::Section("Payment Info".into()));
    lines.push(RenderedLine::Field(format!(
        "  I'm going to pay with: {}",
        state.payment_method.label()
    )));
    if surface.is_visible(&PaymentMethod::CreditCard.panel()) {
        let card_fields = [
            ("Card Number", &state.card_number, FieldId::CardNumber),
            ("ZIP Code", &state.zip_code, FieldId::ZipCode),
            ("CVV", &state.cvv, FieldId::Cvv),
        ];
        for (label, value, field) in card_fields {
            lines.push(RenderedLine::Field(format!(
                "  {label}: {}{}",
                or_blank(value),
                marker_suffix(surface, &field.input())
            )));
            push_hint(&mut lines, surface, field);
        }
    }
    if surface.is_visible(&PaymentMethod::Paypal.panel()) {
        lines.push(RenderedLine::Field(
            "  PayPal account information will be provided after submitting the form.".into(),
        ));
    }
    if surface.is_visible(&PaymentMethod::Bitcoin.panel()) {
        lines.push(RenderedLine::Field(
            "  Bitcoin wallet information will be provided after submitting the form.".into(),
        ));
    }

    lines
}

pub fn print_form(lines: &[RenderedLine]) {
    for line in lines {
        match line {
            RenderedLine::Section(title) => output::section(title),
            RenderedLine::Field(text) => output::plain(text),
            RenderedLine::Hint(text) => output::hint(text.trim_start()),
        }
    }
}
