//! Event dispatch over the three engines.

use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::form::activities::ActivitySelectionEngine;
use crate::form::catalog::{ActivityCatalog, ActivityId};
use crate::form::dependency::FieldDependencyEngine;
use crate::form::state::{
    FieldId, FormState, JobRole, PaymentMethod, ShirtDesign, ShirtSize,
};
use crate::form::submission::{RegistrationBundle, SubmissionSink, SubmitOutcome};
use crate::form::surface::{ElementId, Notice, PresentationSurface};
use crate::form::validation::ValidationEngine;

/// Keys the activity checkboxes react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Space,
    Tab,
}

/// One discrete user action delivered by the presentation surface.
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    NameEdited(String),
    EmailEdited(String),
    JobRoleChanged(JobRole),
    OtherJobRoleEdited(String),
    ShirtSizeChanged(ShirtSize),
    ShirtDesignChanged(ShirtDesign),
    ShirtColorChanged(String),
    ActivityToggled { id: ActivityId, checked: bool },
    ActivityKeyPressed { id: ActivityId, key: Key },
    PaymentMethodChanged(PaymentMethod),
    CardNumberEdited(String),
    ZipCodeEdited(String),
    CvvEdited(String),
    Submit,
}

/// What a dispatched event led to.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Applied,
    /// The event had no effect (for instance after a terminal submit).
    Ignored,
    Submitted(SubmitOutcome),
}

/// One registration: owns the state, the engines, the surface and the sink
/// for its whole lifetime. Every handler runs to completion under `&mut self`.
pub struct RegistrationForm<S, K> {
    state: FormState,
    dependencies: FieldDependencyEngine,
    activities: ActivitySelectionEngine,
    validation: ValidationEngine,
    surface: S,
    sink: K,
    submitted: bool,
}

impl<S, K> RegistrationForm<S, K>
where
    S: PresentationSurface,
    K: SubmissionSink,
{
    /// Creates the form and performs the initial presentation pass.
    pub fn new(catalog: ActivityCatalog, surface: S, sink: K) -> Result<Self> {
        let mut form = Self {
            state: FormState::new(),
            dependencies: FieldDependencyEngine::new(),
            activities: ActivitySelectionEngine::new(catalog),
            validation: ValidationEngine::new(),
            surface,
            sink,
            submitted: false,
        };
        form.initialize()?;
        Ok(form)
    }

    fn initialize(&mut self) -> Result<()> {
        self.dependencies
            .apply_initial(&mut self.state, &mut self.surface)?;
        self.activities
            .apply_initial(&self.state, &mut self.surface)?;
        for field in FieldId::ALL {
            self.surface.set_visible(&field.hint(), false)?;
        }
        self.surface.focus(&ElementId::Name)?;
        debug!(
            activities = self.activities.catalog().len(),
            "registration form initialized"
        );
        Ok(())
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn catalog(&self) -> &ActivityCatalog {
        self.activities.catalog()
    }

    pub fn activities(&self) -> &ActivitySelectionEngine {
        &self.activities
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn handle(&mut self, event: FormEvent) -> Result<Dispatch> {
        if self.submitted {
            warn!(?event, "event after submit ignored");
            return Ok(Dispatch::Ignored);
        }

        match event {
            FormEvent::NameEdited(value) => {
                self.state.name = value;
                self.validate(FieldId::Name)?;
            }
            FormEvent::EmailEdited(value) => {
                self.state.email = value;
                self.validate(FieldId::Email)?;
            }
            FormEvent::JobRoleChanged(role) => {
                self.dependencies
                    .on_job_role_changed(&mut self.state, &mut self.surface, role)?;
            }
            FormEvent::OtherJobRoleEdited(value) => {
                self.state.other_job_role = value;
            }
            FormEvent::ShirtSizeChanged(size) => {
                self.state.shirt_size = size;
            }
            FormEvent::ShirtDesignChanged(design) => {
                self.dependencies
                    .on_shirt_design_changed(&mut self.state, &mut self.surface, design)?;
            }
            FormEvent::ShirtColorChanged(value) => {
                self.dependencies
                    .on_shirt_color_changed(&mut self.state, &mut self.surface, &value)?;
            }
            FormEvent::ActivityToggled { id, checked } => {
                self.activities
                    .on_activity_toggled(&mut self.state, &mut self.surface, &id, checked)?;
                self.validate(FieldId::Activities)?;
            }
            FormEvent::ActivityKeyPressed { id, key } => {
                return self.on_activity_key(id, key);
            }
            FormEvent::PaymentMethodChanged(method) => {
                self.dependencies
                    .on_payment_method_changed(&mut self.state, &mut self.surface, method)?;
            }
            FormEvent::CardNumberEdited(value) => {
                self.state.card_number = value;
                self.validate_payment_field(FieldId::CardNumber)?;
            }
            FormEvent::ZipCodeEdited(value) => {
                self.state.zip_code = value;
                self.validate_payment_field(FieldId::ZipCode)?;
            }
            FormEvent::CvvEdited(value) => {
                self.state.cvv = value;
                self.validate_payment_field(FieldId::Cvv)?;
            }
            FormEvent::Submit => {
                return self.submit().map(Dispatch::Submitted);
            }
        }
        Ok(Dispatch::Applied)
    }

    fn validate(&mut self, field: FieldId) -> Result<bool> {
        self.validation
            .validate_field(&mut self.state, &mut self.surface, field)
    }

    fn validate_payment_field(&mut self, field: FieldId) -> Result<()> {
        if self.state.payment_method == PaymentMethod::CreditCard {
            self.validate(field)?;
        }
        Ok(())
    }

    /// Enter on a focused checkbox flips it instead of submitting the form.
    fn on_activity_key(&mut self, id: ActivityId, key: Key) -> Result<Dispatch> {
        if key != Key::Enter {
            return Ok(Dispatch::Ignored);
        }
        if self.activities.is_disabled(&id) {
            debug!(activity = %id, "enter on a disabled activity ignored");
            return Ok(Dispatch::Ignored);
        }
        let checked = !self.state.is_selected(&id);
        self.activities
            .on_activity_toggled(&mut self.state, &mut self.surface, &id, checked)?;
        self.validate(FieldId::Activities)?;
        Ok(Dispatch::Applied)
    }

    /// Validates everything; hands the bundle off only when the form is valid.
    pub fn submit(&mut self) -> Result<SubmitOutcome> {
        if self
            .validation
            .validate_form(&mut self.state, &mut self.surface)?
        {
            let bundle = RegistrationBundle::from_state(&self.state, self.activities.catalog());
            self.sink.accept(&bundle)?;
            self.submitted = true;
            self.surface.notify(Notice::SubmitAccepted)?;
            info!(
                registration_id = %bundle.registration_id,
                total = bundle.total_cost,
                "registration submitted"
            );
            return Ok(SubmitOutcome::Accepted(bundle));
        }

        let invalid_fields: Vec<FieldId> = self
            .state
            .invalid_fields()
            .into_iter()
            .filter(|field| field.applies_to(self.state.payment_method))
            .collect();
        self.surface.notify(Notice::SubmitRejected)?;
        if let Some(first) = self.validation.first_invalid_field(&self.state) {
            self.surface.focus(&first.input())?;
        }
        info!(invalid = invalid_fields.len(), "submit blocked by validation");
        Ok(SubmitOutcome::Rejected { invalid_fields })
    }

    /// Consumes the form, returning the surface and sink.
    pub fn into_parts(self) -> (S, K) {
        (self.surface, self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RegistrationError;
    use crate::form::submission::MemorySink;
    use crate::form::surface::InMemorySurface;

    fn form() -> RegistrationForm<InMemorySurface, MemorySink> {
        let catalog = ActivityCatalog::conference();
        let surface = InMemorySurface::for_catalog(&catalog);
        RegistrationForm::new(catalog, surface, MemorySink::new()).unwrap()
    }

    struct UnreachableSink;

    impl SubmissionSink for UnreachableSink {
        fn accept(&mut self, _bundle: &RegistrationBundle) -> Result<()> {
            Err(RegistrationError::Io(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "registration backend offline",
            )))
        }
    }

    fn fill_valid<S, K>(form: &mut RegistrationForm<S, K>)
    where
        S: PresentationSurface,
        K: SubmissionSink,
    {
        form.handle(FormEvent::NameEdited("Ada Lovelace".into()))
            .unwrap();
        form.handle(FormEvent::EmailEdited("ada@analytical.engine".into()))
            .unwrap();
        form.handle(FormEvent::ActivityToggled {
            id: ActivityId::from("all"),
            checked: true,
        })
        .unwrap();
        form.handle(FormEvent::PaymentMethodChanged(PaymentMethod::Bitcoin))
            .unwrap();
    }

    #[test]
    fn initialization_focuses_name() {
        let form = form();
        assert_eq!(form.surface().focused(), Some(&ElementId::Name));
        assert_eq!(
            form.surface().text(&ElementId::ActivitiesCost),
            Some("Total: $0")
        );
    }

    #[test]
    fn enter_toggles_activity_without_submitting() {
        let mut form = form();
        let id = ActivityId::from("express");
        let dispatch = form
            .handle(FormEvent::ActivityKeyPressed {
                id: id.clone(),
                key: Key::Enter,
            })
            .unwrap();
        assert_eq!(dispatch, Dispatch::Applied);
        assert!(form.state().is_selected(&id));
        assert!(form.surface().is_checked(&ElementId::Activity(id.clone())));
        assert_eq!(form.state().total_cost, 100);
        assert!(form.surface().notices().is_empty());

        form.handle(FormEvent::ActivityKeyPressed {
            id: id.clone(),
            key: Key::Enter,
        })
        .unwrap();
        assert!(!form.state().is_selected(&id));
        assert_eq!(form.state().total_cost, 0);

        let ignored = form
            .handle(FormEvent::ActivityKeyPressed { id, key: Key::Tab })
            .unwrap();
        assert_eq!(ignored, Dispatch::Ignored);
    }

    #[test]
    fn enter_on_disabled_activity_is_ignored() {
        let mut form = form();
        form.handle(FormEvent::ActivityToggled {
            id: ActivityId::from("npm"),
            checked: true,
        })
        .unwrap();
        let dispatch = form
            .handle(FormEvent::ActivityKeyPressed {
                id: ActivityId::from("npm"),
                key: Key::Enter,
            })
            .unwrap();
        assert_eq!(dispatch, Dispatch::Applied);

        form.handle(FormEvent::ActivityToggled {
            id: ActivityId::from("js-libs"),
            checked: true,
        })
        .unwrap();
        let dispatch = form
            .handle(FormEvent::ActivityKeyPressed {
                id: ActivityId::from("js-frameworks"),
                key: Key::Enter,
            })
            .unwrap();
        assert_eq!(dispatch, Dispatch::Ignored);
        assert_eq!(form.state().total_cost, 100);
    }

    #[test]
    fn card_edits_are_not_validated_for_paypal() {
        let mut form = form();
        form.handle(FormEvent::PaymentMethodChanged(PaymentMethod::Paypal))
            .unwrap();
        form.handle(FormEvent::CardNumberEdited("12".into())).unwrap();
        assert_eq!(
            form.state().validity(FieldId::CardNumber),
            crate::form::state::Validity::Unvalidated
        );

        form.handle(FormEvent::PaymentMethodChanged(PaymentMethod::CreditCard))
            .unwrap();
        form.handle(FormEvent::CardNumberEdited("123".into())).unwrap();
        assert_eq!(
            form.state().validity(FieldId::CardNumber),
            crate::form::state::Validity::Invalid
        );
    }

    #[test]
    fn events_after_accepted_submit_are_ignored() {
        let mut form = form();
        fill_valid(&mut form);

        let outcome = form.handle(FormEvent::Submit).unwrap();
        assert!(matches!(outcome, Dispatch::Submitted(SubmitOutcome::Accepted(_))));
        assert!(form.is_submitted());
        assert_eq!(form.sink().bundles().len(), 1);

        let after = form.handle(FormEvent::NameEdited("Bob".into())).unwrap();
        assert_eq!(after, Dispatch::Ignored);
        assert_eq!(form.state().name, "Ada Lovelace");
    }

    #[test]
    fn failed_handoff_announces_nothing_and_keeps_form_open() {
        let catalog = ActivityCatalog::conference();
        let surface = InMemorySurface::for_catalog(&catalog);
        let mut form = RegistrationForm::new(catalog, surface, UnreachableSink).unwrap();
        fill_valid(&mut form);

        let err = form.handle(FormEvent::Submit).unwrap_err();
        assert!(matches!(err, RegistrationError::Io(_)));
        assert!(!form.is_submitted());
        assert!(form.surface().notices().is_empty());

        let retry = form.handle(FormEvent::NameEdited("Ada King".into())).unwrap();
        assert_eq!(retry, Dispatch::Applied);
    }
}
