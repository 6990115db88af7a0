//! Show/hide and enable/disable rules between linked fields.

use tracing::{debug, warn};

use crate::errors::{RegistrationError, Result};
use crate::form::catalog::{find_color, COLOR_OPTIONS};
use crate::form::state::{FormState, JobRole, PaymentMethod, ShirtDesign};
use crate::form::surface::{ElementId, PresentationSurface};

/// Placeholder shown before any design is chosen.
pub const DESIGN_FIRST_PLACEHOLDER: &str = "Select a design theme above";
/// Placeholder shown after every design change.
pub const COLOR_PLACEHOLDER: &str = "Select a color";

/// Stateless: every decision is a function of the controlling value.
#[derive(Debug, Default, Clone, Copy)]
pub struct FieldDependencyEngine;

impl FieldDependencyEngine {
    pub fn new() -> Self {
        Self
    }

    /// Brings the surface in line with `state` before any event arrives.
    pub fn apply_initial<S>(&self, state: &mut FormState, surface: &mut S) -> Result<()>
    where
        S: PresentationSurface + ?Sized,
    {
        surface.set_visible(&ElementId::OtherJobRole, state.job_role == JobRole::Other)?;

        if state.shirt_design == ShirtDesign::Unset {
            surface.set_enabled(&ElementId::ShirtColor, false)?;
            for option in COLOR_OPTIONS {
                surface.set_visible(&ElementId::ColorOption(option.value.to_string()), false)?;
            }
            state.shirt_color = None;
            surface.set_text(&ElementId::ShirtColor, DESIGN_FIRST_PLACEHOLDER)?;
        } else {
            let design = state.shirt_design;
            self.on_shirt_design_changed(state, surface, design)?;
        }

        self.show_payment_panel(surface, state.payment_method)
    }

    pub fn on_job_role_changed<S>(
        &self,
        state: &mut FormState,
        surface: &mut S,
        role: JobRole,
    ) -> Result<()>
    where
        S: PresentationSurface + ?Sized,
    {
        state.job_role = role;
        let visible = role == JobRole::Other;
        debug!(role = role.value(), other_visible = visible, "job role changed");
        // The typed text survives while hidden; it is only inert.
        surface.set_visible(&ElementId::OtherJobRole, visible)
    }

    pub fn on_shirt_design_changed<S>(
        &self,
        state: &mut FormState,
        surface: &mut S,
        design: ShirtDesign,
    ) -> Result<()>
    where
        S: PresentationSurface + ?Sized,
    {
        state.shirt_design = design;
        surface.set_enabled(&ElementId::ShirtColor, design != ShirtDesign::Unset)?;
        for option in COLOR_OPTIONS {
            surface.set_visible(
                &ElementId::ColorOption(option.value.to_string()),
                option.design == design,
            )?;
        }

        state.shirt_color = None;
        surface.set_text(&ElementId::ShirtColor, COLOR_PLACEHOLDER)?;
        debug!(design = design.value(), "shirt design changed, color reset");
        Ok(())
    }

    /// Selects a color; it must belong to the active design.
    pub fn on_shirt_color_changed<S>(
        &self,
        state: &mut FormState,
        surface: &mut S,
        value: &str,
    ) -> Result<()>
    where
        S: PresentationSurface + ?Sized,
    {
        let option = find_color(value).filter(|option| option.design == state.shirt_design);
        let Some(option) = option else {
            warn!(
                color = value,
                design = state.shirt_design.value(),
                "color rejected for active design"
            );
            return Err(RegistrationError::InvalidOption {
                field: "color",
                value: value.to_string(),
            });
        };

        state.shirt_color = Some(option.value.to_string());
        surface.set_text(&ElementId::ShirtColor, option.label)
    }

    pub fn on_payment_method_changed<S>(
        &self,
        state: &mut FormState,
        surface: &mut S,
        method: PaymentMethod,
    ) -> Result<()>
    where
        S: PresentationSurface + ?Sized,
    {
        state.payment_method = method;
        debug!(method = method.value(), "payment method changed");
        self.show_payment_panel(surface, method)
    }

    fn show_payment_panel<S>(&self, surface: &mut S, method: PaymentMethod) -> Result<()>
    where
        S: PresentationSurface + ?Sized,
    {
        for candidate in PaymentMethod::ALL {
            surface.set_visible(&candidate.panel(), candidate == method)?;
        }
        Ok(())
    }
}
