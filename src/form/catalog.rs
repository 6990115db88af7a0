//! Static option catalogs: conference activities and shirt colors.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{RegistrationError, Result};
use crate::form::state::ShirtDesign;

/// Stable identifier of an activity checkbox (its `name` attribute).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityId(String);

impl ActivityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActivityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A selectable conference activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub display_name: String,
    pub cost: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_slot: Option<String>,
}

impl Activity {
    pub fn new(id: &str, display_name: &str, cost: u32, time_slot: Option<&str>) -> Self {
        Self {
            id: ActivityId::new(id),
            display_name: display_name.to_string(),
            cost,
            time_slot: time_slot.map(str::to_string),
        }
    }

    fn slot(&self) -> Option<&str> {
        self.time_slot.as_deref().filter(|slot| !slot.is_empty())
    }

    /// Two distinct activities conflict when both carry the same non-empty slot.
    pub fn conflicts_with(&self, other: &Activity) -> bool {
        if self.id == other.id {
            return false;
        }
        match (self.slot(), other.slot()) {
            (Some(left), Some(right)) => left == right,
            _ => false,
        }
    }
}

/// Ordered activity catalog. Ids are unique; order is presentation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityCatalog {
    activities: Vec<Activity>,
}

impl ActivityCatalog {
    pub fn new(activities: Vec<Activity>) -> Result<Self> {
        let mut seen = HashSet::new();
        for activity in &activities {
            if activity.id.as_str().trim().is_empty() {
                return Err(RegistrationError::InvalidCatalog(
                    "activity id cannot be empty".into(),
                ));
            }
            if !seen.insert(activity.id.clone()) {
                return Err(RegistrationError::InvalidCatalog(format!(
                    "duplicate activity id `{}`",
                    activity.id
                )));
            }
        }
        // Every selection total must fit, so the running sum never overflows.
        activities
            .iter()
            .try_fold(0u32, |total, activity| total.checked_add(activity.cost))
            .ok_or_else(|| {
                RegistrationError::InvalidCatalog(
                    "combined activity cost exceeds the supported total".into(),
                )
            })?;
        Ok(Self { activities })
    }

    /// The conference's published schedule.
    pub fn conference() -> Self {
        Self {
            activities: vec![
                Activity::new("all", "Main Conference", 200, None),
                Activity::new(
                    "js-libs",
                    "JavaScript Libraries Workshop",
                    100,
                    Some("Tuesday 9am-12pm"),
                ),
                Activity::new("node", "Node.js Workshop", 100, Some("Tuesday 1pm-4pm")),
                Activity::new(
                    "js-frameworks",
                    "JavaScript Frameworks Workshop",
                    100,
                    Some("Tuesday 9am-12pm"),
                ),
                Activity::new(
                    "build-tools",
                    "Build tools Workshop",
                    100,
                    Some("Tuesday 1pm-4pm"),
                ),
                Activity::new("npm", "npm Workshop", 100, Some("Wednesday 9am-12pm")),
                Activity::new("express", "Express Workshop", 100, Some("Wednesday 1pm-4pm")),
            ],
        }
    }

    /// Parses a catalog from its JSON form (`{"activities": [...]}`).
    pub fn from_json(raw: &str) -> Result<Self> {
        let parsed: ActivityCatalog = serde_json::from_str(raw)?;
        Self::new(parsed.activities)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn get(&self, id: &ActivityId) -> Option<&Activity> {
        self.activities.iter().find(|activity| &activity.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Activity> {
        self.activities.iter()
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    /// Activities sharing a time slot with `id`, excluding `id` itself.
    pub fn conflicts_of<'a>(&'a self, id: &ActivityId) -> Vec<&'a Activity> {
        let Some(target) = self.get(id) else {
            return Vec::new();
        };
        self.activities
            .iter()
            .filter(|candidate| target.conflicts_with(candidate))
            .collect()
    }

    /// Full recomputation of the cost of a selection.
    pub fn total_for<'a>(&self, selected: impl IntoIterator<Item = &'a ActivityId>) -> u32 {
        selected
            .into_iter()
            .filter_map(|id| self.get(id))
            .map(|activity| activity.cost)
            .sum()
    }
}

impl Default for ActivityCatalog {
    fn default() -> Self {
        Self::conference()
    }
}

/// One entry of the shirt color selector, tagged with its design.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorOption {
    pub value: &'static str,
    pub label: &'static str,
    pub design: ShirtDesign,
}

pub const COLOR_OPTIONS: &[ColorOption] = &[
    ColorOption {
        value: "cornflowerblue",
        label: "Cornflower Blue (JS Puns shirt only)",
        design: ShirtDesign::JsPuns,
    },
    ColorOption {
        value: "darkslategrey",
        label: "Dark Slate Grey (JS Puns shirt only)",
        design: ShirtDesign::JsPuns,
    },
    ColorOption {
        value: "gold",
        label: "Gold (JS Puns shirt only)",
        design: ShirtDesign::JsPuns,
    },
    ColorOption {
        value: "tomato",
        label: "Tomato (I \u{2665} JS shirt only)",
        design: ShirtDesign::HeartJs,
    },
    ColorOption {
        value: "steelblue",
        label: "Steel Blue (I \u{2665} JS shirt only)",
        design: ShirtDesign::HeartJs,
    },
    ColorOption {
        value: "dimgrey",
        label: "Dim Grey (I \u{2665} JS shirt only)",
        design: ShirtDesign::HeartJs,
    },
];

pub fn colors_for(design: ShirtDesign) -> impl Iterator<Item = &'static ColorOption> {
    COLOR_OPTIONS
        .iter()
        .filter(move |option| option.design == design)
}

pub fn find_color(value: &str) -> Option<&'static ColorOption> {
    let needle = value.trim().to_ascii_lowercase();
    COLOR_OPTIONS.iter().find(|option| option.value == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conference_catalog_pairs_workshops_by_slot() {
        let catalog = ActivityCatalog::conference();
        let conflicts: Vec<&str> = catalog
            .conflicts_of(&ActivityId::from("js-libs"))
            .into_iter()
            .map(|activity| activity.id.as_str())
            .collect();
        assert_eq!(conflicts, vec!["js-frameworks"]);
        assert!(catalog.conflicts_of(&ActivityId::from("all")).is_empty());
        assert!(catalog.conflicts_of(&ActivityId::from("missing")).is_empty());
    }

    #[test]
    fn empty_slots_never_conflict() {
        let a = Activity::new("a", "A", 10, Some(""));
        let b = Activity::new("b", "B", 10, Some(""));
        let c = Activity::new("c", "C", 10, None);
        assert!(!a.conflicts_with(&b));
        assert!(!c.conflicts_with(&c.clone()));
        let d = Activity::new("d", "D", 10, Some("Monday"));
        assert!(!d.conflicts_with(&d.clone()));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = ActivityCatalog::new(vec![
            Activity::new("x", "X", 1, None),
            Activity::new("x", "Y", 2, None),
        ])
        .unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidCatalog(_)));
    }

    #[test]
    fn catalog_whose_full_selection_overflows_is_rejected() {
        let err = ActivityCatalog::new(vec![
            Activity::new("a", "A", 3_000_000_000, None),
            Activity::new("b", "B", 3_000_000_000, Some("Friday")),
        ])
        .unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidCatalog(_)));

        let at_limit = ActivityCatalog::new(vec![
            Activity::new("a", "A", u32::MAX - 1, None),
            Activity::new("b", "B", 1, None),
        ])
        .unwrap();
        let everything = at_limit.iter().map(|activity| &activity.id);
        assert_eq!(at_limit.total_for(everything), u32::MAX);
    }

    #[test]
    fn catalog_parses_from_json() {
        let raw = r#"{"activities": [
            {"id": "keynote", "display_name": "Keynote", "cost": 50},
            {"id": "rust", "display_name": "Rust Workshop", "cost": 75, "time_slot": "Friday 9am"}
        ]}"#;
        let catalog = ActivityCatalog::from_json(raw).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.get(&ActivityId::from("rust")).unwrap().time_slot.as_deref(),
            Some("Friday 9am")
        );
    }

    #[test]
    fn colors_are_partitioned_by_design() {
        assert_eq!(colors_for(ShirtDesign::JsPuns).count(), 3);
        assert_eq!(colors_for(ShirtDesign::HeartJs).count(), 3);
        assert_eq!(colors_for(ShirtDesign::Unset).count(), 0);
        assert_eq!(find_color("Tomato").map(|c| c.design), Some(ShirtDesign::HeartJs));
    }
}
