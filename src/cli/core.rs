//! Command dispatch for the registration shell.

use std::collections::BTreeMap;
use std::io;

use dialoguer::{theme::ColorfulTheme, Confirm};
use rustyline::error::ReadlineError;
use thiserror::Error;
use tracing::debug;

use crate::cli::output;
use crate::cli::render::{print_form, render_form, TerminalSurface};
use crate::config::{Config, ConfigManager};
use crate::errors::RegistrationError;
use crate::form::{
    ActivityId, Dispatch, FormEvent, JobRole, Key, PaymentMethod, RegistrationBundle,
    RegistrationForm, ShirtDesign, ShirtSize, SubmissionSink, SubmitOutcome, COLOR_OPTIONS,
};
use crate::utils::build_info;

/// Errors that abort the shell.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Registration(#[from] RegistrationError),
    #[error("Readline error: {0}")]
    Readline(#[from] ReadlineError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Prompt failed: {0}")]
    Prompt(String),
}

/// Errors raised by a single command; most are reported and the loop goes on.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Unknown command `{command}`{}", suggestion_suffix(.suggestion))]
    Unknown {
        command: String,
        suggestion: Option<&'static str>,
    },
    #[error("`{value}` is not a valid {field}")]
    InvalidValue { field: &'static str, value: String },
    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

fn suggestion_suffix(suggestion: &Option<&'static str>) -> String {
    suggestion
        .map(|name| format!(" (did you mean `{name}`?)"))
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

/// Prints accepted bundles as pretty JSON on stdout.
#[derive(Debug, Default)]
pub struct StdoutSink {
    accepted: usize,
}

impl StdoutSink {
    pub fn accepted(&self) -> usize {
        self.accepted
    }
}

impl SubmissionSink for StdoutSink {
    fn accept(&mut self, bundle: &RegistrationBundle) -> Result<(), RegistrationError> {
        let json = serde_json::to_string_pretty(bundle)?;
        println!("{json}");
        self.accepted += 1;
        Ok(())
    }
}

pub type CliForm = RegistrationForm<TerminalSurface, StdoutSink>;

struct CommandSpec {
    name: &'static str,
    usage: &'static str,
    summary: &'static str,
}

const COMMANDS: &[CommandSpec] = &[
    CommandSpec { name: "show", usage: "show", summary: "Render the form" },
    CommandSpec { name: "name", usage: "name <text>", summary: "Type into the name field" },
    CommandSpec { name: "email", usage: "email <text>", summary: "Type into the email field" },
    CommandSpec { name: "role", usage: "role <job role>", summary: "Pick a job role" },
    CommandSpec {
        name: "other-role",
        usage: "other-role <text>",
        summary: "Type into the other job role field",
    },
    CommandSpec { name: "size", usage: "size <S|M|L|XL|XXL>", summary: "Pick a shirt size" },
    CommandSpec {
        name: "design",
        usage: "design <js-puns|heart-js>",
        summary: "Pick a shirt design",
    },
    CommandSpec { name: "color", usage: "color <color>", summary: "Pick a shirt color" },
    CommandSpec { name: "activities", usage: "activities", summary: "List activity ids" },
    CommandSpec { name: "check", usage: "check <activity>", summary: "Check an activity" },
    CommandSpec { name: "uncheck", usage: "uncheck <activity>", summary: "Uncheck an activity" },
    CommandSpec {
        name: "enter",
        usage: "enter <activity>",
        summary: "Press Enter on an activity checkbox",
    },
    CommandSpec {
        name: "pay",
        usage: "pay <credit-card|paypal|bitcoin>",
        summary: "Pick a payment method",
    },
    CommandSpec { name: "card", usage: "card <digits>", summary: "Type the card number" },
    CommandSpec { name: "zip", usage: "zip <digits>", summary: "Type the ZIP code" },
    CommandSpec { name: "cvv", usage: "cvv <digits>", summary: "Type the CVV" },
    CommandSpec { name: "submit", usage: "submit", summary: "Validate and submit" },
    CommandSpec { name: "config", usage: "config", summary: "Show the active configuration" },
    CommandSpec { name: "version", usage: "version", summary: "Show build information" },
    CommandSpec { name: "help", usage: "help", summary: "List commands" },
    CommandSpec { name: "exit", usage: "exit", summary: "Leave without submitting" },
];

/// State shared across shell iterations.
pub struct ShellContext {
    pub mode: CliMode,
    pub running: bool,
    config: Config,
    form: CliForm,
    theme: ColorfulTheme,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let config = ConfigManager::new()?.load()?;
        Self::with_config(mode, config)
    }

    pub fn with_config(mode: CliMode, config: Config) -> Result<Self, CliError> {
        output::set_preferences(config.output);
        let catalog = config.load_catalog()?;
        let surface = TerminalSurface::new(&catalog, mode == CliMode::Interactive);
        let form = RegistrationForm::new(catalog, surface, StdoutSink::default())?;
        Ok(Self {
            mode,
            running: true,
            config,
            form,
            theme: ColorfulTheme::default(),
        })
    }

    pub fn form(&self) -> &CliForm {
        &self.form
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        COMMANDS.iter().map(|spec| spec.name).collect()
    }

    /// Values offered when completing the argument of each command.
    pub fn argument_candidates(&self) -> BTreeMap<&'static str, Vec<String>> {
        let activities: Vec<String> = self
            .form
            .catalog()
            .iter()
            .map(|activity| activity.id.to_string())
            .collect();

        let mut table = BTreeMap::new();
        table.insert("role", owned(JobRole::SELECTABLE.map(JobRole::token)));
        table.insert("size", owned(ShirtSize::ALL.map(ShirtSize::label)));
        table.insert(
            "design",
            ShirtDesign::SELECTABLE
                .iter()
                .map(|design| design.value().replace(' ', "-"))
                .collect(),
        );
        table.insert("color", owned(COLOR_OPTIONS.iter().map(|option| option.value)));
        table.insert("pay", owned(PaymentMethod::ALL.map(PaymentMethod::value)));
        for command in ["check", "uncheck", "enter"] {
            table.insert(command, activities.clone());
        }
        table
    }

    pub fn prompt(&self) -> String {
        let total = self.form.state().total_cost;
        format!("registration [${total}]> ")
    }

    pub fn print_warning(&self, message: &str) {
        output::warning(message);
    }

    pub fn render(&self) {
        let lines = render_form(
            self.form.surface().elements(),
            self.form.state(),
            self.form.catalog(),
        );
        print_form(&lines);
    }

    /// Reports a command failure. Broken surface contracts abort the shell.
    pub fn report_error(&mut self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::Registration(
                err @ (RegistrationError::ElementNotFound(_) | RegistrationError::UnknownActivity(_)),
            ) => Err(CliError::Registration(err)),
            CommandError::Registration(RegistrationError::InvalidOption { field, value }) => {
                output::warning(format!(
                    "`{value}` is not available for the {field} field with the current selection"
                ));
                Ok(())
            }
            other => {
                output::error(other);
                Ok(())
            }
        }
    }

    pub fn confirm_exit(&self) -> Result<bool, CliError> {
        Confirm::with_theme(&self.theme)
            .with_prompt("Discard this registration and exit?")
            .default(false)
            .interact()
            .map_err(|err| CliError::Prompt(err.to_string()))
    }

    pub fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        debug!(command, args = args.len(), "dispatching command");
        let event = match command {
            "show" => {
                self.render();
                return Ok(LoopControl::Continue);
            }
            "help" | "?" => {
                self.print_help();
                return Ok(LoopControl::Continue);
            }
            "activities" => {
                self.print_activities();
                return Ok(LoopControl::Continue);
            }
            "config" => {
                self.print_config();
                return Ok(LoopControl::Continue);
            }
            "version" => {
                output::info(build_info::current().summary());
                return Ok(LoopControl::Continue);
            }
            "exit" | "quit" => return Ok(LoopControl::Exit),
            "name" => FormEvent::NameEdited(args.join(" ")),
            "email" => FormEvent::EmailEdited(args.join(" ")),
            "other-role" => FormEvent::OtherJobRoleEdited(args.join(" ")),
            "role" => {
                let value = required(args, "role <job role>")?;
                let role = JobRole::parse(&value).ok_or(CommandError::InvalidValue {
                    field: "job role",
                    value,
                })?;
                FormEvent::JobRoleChanged(role)
            }
            "size" => {
                let value = required(args, "size <S|M|L|XL|XXL>")?;
                let size = ShirtSize::parse(&value).ok_or(CommandError::InvalidValue {
                    field: "shirt size",
                    value,
                })?;
                FormEvent::ShirtSizeChanged(size)
            }
            "design" => {
                let value = required(args, "design <js-puns|heart-js>")?;
                let design = ShirtDesign::parse(&value).ok_or(CommandError::InvalidValue {
                    field: "shirt design",
                    value,
                })?;
                FormEvent::ShirtDesignChanged(design)
            }
            "color" => FormEvent::ShirtColorChanged(required(args, "color <color>")?),
            "check" | "uncheck" => {
                let id = self.activity_arg(args, "check <activity>")?;
                FormEvent::ActivityToggled {
                    id,
                    checked: command == "check",
                }
            }
            "enter" => FormEvent::ActivityKeyPressed {
                id: self.activity_arg(args, "enter <activity>")?,
                key: Key::Enter,
            },
            "pay" => {
                let value = required(args, "pay <credit-card|paypal|bitcoin>")?;
                let method = PaymentMethod::parse(&value).ok_or(CommandError::InvalidValue {
                    field: "payment method",
                    value,
                })?;
                FormEvent::PaymentMethodChanged(method)
            }
            "card" => FormEvent::CardNumberEdited(args.join("")),
            "zip" => FormEvent::ZipCodeEdited(args.join("")),
            "cvv" => FormEvent::CvvEdited(args.join("")),
            "submit" => FormEvent::Submit,
            _ => {
                return Err(CommandError::Unknown {
                    command: raw.to_string(),
                    suggestion: suggest(command),
                })
            }
        };

        self.apply(event)
    }

    fn apply(&mut self, event: FormEvent) -> Result<LoopControl, CommandError> {
        match self.form.handle(event)? {
            Dispatch::Submitted(SubmitOutcome::Accepted(bundle)) => {
                output::info(format!("Registration {} handed off.", bundle.registration_id));
                Ok(LoopControl::Exit)
            }
            Dispatch::Submitted(SubmitOutcome::Rejected { invalid_fields }) => {
                let names: Vec<String> =
                    invalid_fields.iter().map(ToString::to_string).collect();
                output::warning(format!("Invalid fields: {}", names.join(", ")));
                Ok(LoopControl::Continue)
            }
            Dispatch::Ignored => {
                output::warning("Nothing changed.");
                Ok(LoopControl::Continue)
            }
            Dispatch::Applied => {
                if self.mode == CliMode::Interactive && self.config.render_after_command {
                    self.render();
                }
                Ok(LoopControl::Continue)
            }
        }
    }

    fn activity_arg(
        &self,
        args: &[&str],
        usage: &'static str,
    ) -> Result<ActivityId, CommandError> {
        let value = required(args, usage)?;
        let id = ActivityId::new(value.clone());
        if self.form.catalog().get(&id).is_none() {
            return Err(CommandError::InvalidValue {
                field: "activity",
                value,
            });
        }
        Ok(id)
    }

    fn print_help(&self) {
        output::section("Commands");
        for spec in COMMANDS {
            output::plain(format!("  {:<36} {}", spec.usage, spec.summary));
        }
    }

    fn print_activities(&self) {
        output::section("Activities");
        for activity in self.form.catalog().iter() {
            let slot = activity.time_slot.as_deref().unwrap_or("any time");
            output::plain(format!(
                "  {:<16} {:<34} {:<20} ${}",
                activity.id, activity.display_name, slot, activity.cost
            ));
        }
    }

    fn print_config(&self) {
        match serde_json::to_string_pretty(&self.config) {
            Ok(json) => output::plain(json),
            Err(err) => output::error(err),
        }
    }
}

fn owned<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    values.into_iter().map(str::to_string).collect()
}

fn required(args: &[&str], usage: &'static str) -> Result<String, CommandError> {
    if args.is_empty() {
        return Err(CommandError::Usage(usage));
    }
    Ok(args.join(" "))
}

fn suggest(input: &str) -> Option<&'static str> {
    COMMANDS
        .iter()
        .map(|spec| (spec.name, strsim::levenshtein(input, spec.name)))
        .filter(|(_, distance)| *distance <= 2)
        .min_by_key(|(_, distance)| *distance)
        .map(|(name, _)| name)
}
