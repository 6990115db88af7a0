//! Activity selection: running total and time-slot conflicts.

use std::collections::BTreeSet;

use tracing::debug;

use crate::errors::{RegistrationError, Result};
use crate::form::catalog::{ActivityCatalog, ActivityId};
use crate::form::state::FormState;
use crate::form::surface::{ElementId, PresentationSurface};

/// Text shown in the running-total element.
pub fn format_total(total: u32) -> String {
    format!("Total: ${total}")
}

/// Owns the catalog and the set of activities disabled by a conflict.
#[derive(Debug, Clone)]
pub struct ActivitySelectionEngine {
    catalog: ActivityCatalog,
    disabled: BTreeSet<ActivityId>,
}

impl ActivitySelectionEngine {
    pub fn new(catalog: ActivityCatalog) -> Self {
        Self {
            catalog,
            disabled: BTreeSet::new(),
        }
    }

    pub fn catalog(&self) -> &ActivityCatalog {
        &self.catalog
    }

    pub fn is_disabled(&self, id: &ActivityId) -> bool {
        self.disabled.contains(id)
    }

    pub fn disabled_activities(&self) -> impl Iterator<Item = &ActivityId> {
        self.disabled.iter()
    }

    pub fn apply_initial<S>(&self, state: &FormState, surface: &mut S) -> Result<()>
    where
        S: PresentationSurface + ?Sized,
    {
        for activity in self.catalog.iter() {
            let element = ElementId::Activity(activity.id.clone());
            surface.set_checked(&element, state.is_selected(&activity.id))?;
            surface.set_enabled(&element, !self.is_disabled(&activity.id))?;
        }
        surface.set_text(&ElementId::ActivitiesCost, &format_total(state.total_cost))
    }

    /// Handles a checkbox change.
    ///
    /// Repeated identical events leave the selection and the total untouched.
    /// Conflicting siblings get `disabled == checked`; a sibling that was
    /// already checked stays checked (and keeps counting toward the total).
    pub fn on_activity_toggled<S>(
        &mut self,
        state: &mut FormState,
        surface: &mut S,
        id: &ActivityId,
        checked: bool,
    ) -> Result<()>
    where
        S: PresentationSurface + ?Sized,
    {
        let cost = self
            .catalog
            .get(id)
            .map(|activity| activity.cost)
            .ok_or_else(|| RegistrationError::UnknownActivity(id.to_string()))?;

        if self.is_disabled(id) {
            debug!(activity = %id, "toggle received on a disabled activity");
        }

        let changed = if checked {
            state.selected_activities.insert(id.clone())
        } else {
            state.selected_activities.remove(id)
        };
        if changed {
            if checked {
                state.total_cost += cost;
            } else {
                state.total_cost -= cost;
            }
        }
        debug_assert_eq!(state.total_cost, self.recompute_total(state));

        surface.set_checked(&ElementId::Activity(id.clone()), checked)?;
        surface.set_text(&ElementId::ActivitiesCost, &format_total(state.total_cost))?;

        let siblings: Vec<ActivityId> = self
            .catalog
            .conflicts_of(id)
            .into_iter()
            .map(|activity| activity.id.clone())
            .collect();
        for sibling in siblings {
            if checked {
                self.disabled.insert(sibling.clone());
            } else {
                self.disabled.remove(&sibling);
            }
            surface.set_enabled(&ElementId::Activity(sibling), !checked)?;
        }

        debug!(
            activity = %id,
            checked,
            changed,
            total = state.total_cost,
            "activity toggled"
        );
        Ok(())
    }

    /// Full resum of the selection, independent of the running total.
    pub fn recompute_total(&self, state: &FormState) -> u32 {
        self.catalog.total_for(&state.selected_activities)
    }
}
