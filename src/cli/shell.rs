use std::{
    collections::BTreeMap,
    io::{self, BufRead},
};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    history::DefaultHistory,
    Cmd, Context as ReadlineContext, Editor, Helper, Highlighter, Hinter, KeyEvent, Validator,
};

use crate::cli::core::{CliError, CliMode, LoopControl, ShellContext};
use crate::cli::output;

const SCRIPT_MODE_VAR: &str = "REGISTRATION_CLI_SCRIPT";

/// One read from whichever input drives the form.
enum Input {
    Line(String),
    Interrupted,
    Closed,
}

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_MODE_VAR).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;
    tracing::debug!(?mode, "registration shell starting");

    match mode {
        CliMode::Interactive => {
            let mut editor = Editor::<CommandHelper, DefaultHistory>::new()?;
            editor.set_helper(Some(CommandHelper::new(
                context.command_names(),
                context.argument_candidates(),
            )));
            editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);

            context.render();
            output::info("Type `help` to list commands.");
            drive(&mut context, |context| {
                match editor.readline(&context.prompt()) {
                    Ok(line) => {
                        if !line.trim().is_empty() {
                            editor.add_history_entry(line.trim()).ok();
                        }
                        Ok(Input::Line(line))
                    }
                    Err(ReadlineError::Interrupted) => Ok(Input::Interrupted),
                    Err(ReadlineError::Eof) => Ok(Input::Closed),
                    Err(err) => Err(err.into()),
                }
            })
        }
        CliMode::Script => {
            let mut lines = io::stdin().lock().lines();
            drive(&mut context, |_| match lines.next() {
                Some(line) => Ok(Input::Line(line?)),
                None => Ok(Input::Closed),
            })
        }
    }
}

/// Feeds lines into the form until it is submitted, the user leaves, or
/// input runs out.
fn drive<F>(context: &mut ShellContext, mut next: F) -> Result<(), CliError>
where
    F: FnMut(&ShellContext) -> Result<Input, CliError>,
{
    while context.running {
        match next(context)? {
            Input::Line(line) => {
                if run_line(context, &line)? == LoopControl::Exit {
                    context.running = false;
                }
            }
            Input::Interrupted => {
                if context.confirm_exit()? {
                    context.running = false;
                }
            }
            Input::Closed => {
                if context.mode == CliMode::Interactive {
                    output::info("Leaving without submitting.");
                }
                context.running = false;
            }
        }
    }
    Ok(())
}

/// Runs one command line. Command failures are reported and the session
/// continues; only broken form contracts end it.
fn run_line(context: &mut ShellContext, line: &str) -> Result<LoopControl, CliError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(LoopControl::Continue);
    }

    let tokens = match shell_words::split(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            context.print_warning(&format!("Could not read `{line}`: {err}"));
            return Ok(LoopControl::Continue);
        }
    };
    let Some((raw, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();

    match context.dispatch(&raw.to_lowercase(), raw, &args) {
        Ok(control) => Ok(control),
        Err(err) => {
            context.report_error(err)?;
            Ok(LoopControl::Continue)
        }
    }
}

/// Completes command names, then the values a command accepts (activity
/// ids, colors, sizes and so on).
#[derive(Helper, Highlighter, Hinter, Validator)]
struct CommandHelper {
    commands: Vec<&'static str>,
    arguments: BTreeMap<&'static str, Vec<String>>,
}

impl CommandHelper {
    fn new(
        mut commands: Vec<&'static str>,
        arguments: BTreeMap<&'static str, Vec<String>>,
    ) -> Self {
        commands.sort_unstable();
        commands.dedup();
        Self {
            commands,
            arguments,
        }
    }

    fn candidates(&self, line: &str) -> (usize, Vec<String>) {
        let start = line
            .rfind(char::is_whitespace)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let needle = line[start..].to_ascii_lowercase();
        let mut words = line[..start].split_whitespace();

        let options: Vec<String> = match (words.next(), words.next()) {
            (None, _) => self.commands.iter().map(|name| name.to_string()).collect(),
            (Some(command), None) => self
                .arguments
                .get(command.to_ascii_lowercase().as_str())
                .cloned()
                .unwrap_or_default(),
            _ => Vec::new(),
        };
        let matches = options
            .into_iter()
            .filter(|option| option.to_ascii_lowercase().starts_with(&needle))
            .collect();
        (start, matches)
    }
}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, matches) = self.candidates(&line[..pos]);
        let pairs = matches
            .into_iter()
            .map(|value| Pair {
                display: value.clone(),
                replacement: value,
            })
            .collect();
        Ok((start, pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn helper() -> CommandHelper {
        let mut arguments = BTreeMap::new();
        arguments.insert("check", vec!["js-libs".to_string(), "node".to_string()]);
        arguments.insert("size", vec!["S".to_string(), "XL".to_string(), "XXL".to_string()]);
        CommandHelper::new(vec!["submit", "size", "show", "check", "size"], arguments)
    }

    #[test]
    fn first_word_completes_commands() {
        let (start, matches) = helper().candidates("s");
        assert_eq!(start, 0);
        assert_eq!(matches, vec!["show", "size", "submit"]);
    }

    #[test]
    fn second_word_completes_command_values() {
        let (start, matches) = helper().candidates("check j");
        assert_eq!(start, 6);
        assert_eq!(matches, vec!["js-libs"]);

        let (_, matches) = helper().candidates("SIZE x");
        assert_eq!(matches, vec!["XL", "XXL"]);

        let (_, matches) = helper().candidates("check node ");
        assert!(matches.is_empty());
        let (_, matches) = helper().candidates("submit ");
        assert!(matches.is_empty());
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        let mut context = ShellContext::with_config(CliMode::Script, Default::default()).unwrap();
        assert_eq!(run_line(&mut context, "   ").unwrap(), LoopControl::Continue);
        assert_eq!(
            run_line(&mut context, "# name Ada").unwrap(),
            LoopControl::Continue
        );
        assert!(context.form().state().name.is_empty());
    }

    #[test]
    fn quoted_arguments_and_bad_quoting() {
        let mut context = ShellContext::with_config(CliMode::Script, Default::default()).unwrap();
        run_line(&mut context, r#"name "John Smith""#).unwrap();
        assert_eq!(context.form().state().name, "John Smith");

        let control = run_line(&mut context, r#"email "ada@example.com"#).unwrap();
        assert_eq!(control, LoopControl::Continue);
        assert!(context.form().state().email.is_empty());
    }

    #[test]
    fn exit_and_command_errors_control_the_loop() {
        let mut context = ShellContext::with_config(CliMode::Script, Default::default()).unwrap();
        assert_eq!(run_line(&mut context, "sumbit").unwrap(), LoopControl::Continue);
        assert_eq!(run_line(&mut context, "quit").unwrap(), LoopControl::Exit);
    }
}
