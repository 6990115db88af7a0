//! Conference registration form core.
//!
//! [`RegistrationForm`] owns a [`FormState`] and routes each [`FormEvent`]
//! to one of three engines:
//!
//! * [`FieldDependencyEngine`] keeps dependent fields (other job role, shirt
//!   colors, payment panels) consistent with their controlling selector.
//! * [`ActivitySelectionEngine`] maintains the selected activities, the
//!   running total and the time-slot conflicts.
//! * [`ValidationEngine`] evaluates field rules and gates submission.
//!
//! Rendering is delegated to a [`PresentationSurface`]; a valid submission is
//! handed to a [`SubmissionSink`].

pub mod activities;
pub mod catalog;
pub mod controller;
pub mod dependency;
pub mod state;
pub mod submission;
pub mod surface;
pub mod validation;

pub use activities::{format_total, ActivitySelectionEngine};
pub use catalog::{Activity, ActivityCatalog, ActivityId, ColorOption, COLOR_OPTIONS};
pub use controller::{Dispatch, FormEvent, Key, RegistrationForm};
pub use dependency::FieldDependencyEngine;
pub use state::{FieldId, FormState, JobRole, PaymentMethod, ShirtDesign, ShirtSize, Validity};
pub use submission::{
    MemorySink, PaymentDetails, RegistrationBundle, SubmissionSink, SubmitOutcome,
};
pub use surface::{ElementId, InMemorySurface, Marker, Notice, PresentationSurface};
pub use validation::{Rule, ValidationEngine};
