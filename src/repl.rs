// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Interactive console over one running script.
//!
//! Bare input is read as a host event (`TARGET:NAME[:ARG,...]`); dot
//! commands inspect and drive the session.

use std::borrow::Cow;
use std::path::PathBuf;

use maki_host::{HostEvent, Session, SessionError};
use owo_colors::OwoColorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Editor, Helper};

use crate::inspect::{self, format_value, type_label};

const HISTORY_FILE: &str = ".maki_history";
const MAX_HISTORY_SIZE: usize = 1000;

/// Console commands, written with a dot prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Exit,
    Clear,
    Event,
    Tick,
    Vars,
    Classes,
    Mutations,
    Start,
    Unload,
}

impl ReplCommand {
    /// Parses `.command [argument]`.
    pub fn parse(input: &str) -> Option<(Self, Option<&str>)> {
        let input = input.trim();
        let rest = input.strip_prefix('.')?;

        let mut parts = rest.splitn(2, char::is_whitespace);
        let cmd = parts.next()?.to_lowercase();
        let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

        let command = match cmd.as_str() {
            "help" | "h" | "?" => ReplCommand::Help,
            "exit" | "quit" | "q" => ReplCommand::Exit,
            "clear" | "cls" => ReplCommand::Clear,
            "event" | "e" => ReplCommand::Event,
            "tick" | "t" => ReplCommand::Tick,
            "vars" | "v" => ReplCommand::Vars,
            "classes" | "class" => ReplCommand::Classes,
            "mutations" | "m" => ReplCommand::Mutations,
            "start" => ReplCommand::Start,
            "unload" => ReplCommand::Unload,
            _ => return None,
        };
        Some((command, arg))
    }

    /// Commands and their descriptions, for help and completion.
    pub fn all_commands() -> &'static [(&'static str, &'static str)] {
        &[
            (".help", "Show this help message"),
            (".exit", "Unload the script and leave"),
            (".clear", "Clear the screen"),
            (".event <EVENT>", "Deliver TARGET:NAME[:ARG,...]"),
            (".tick [MS]", "Advance the clock by MS or one tick"),
            (".vars", "Show script variables"),
            (".classes [NAME]", "List the catalog or describe a class"),
            (".mutations", "Show and clear host property changes"),
            (".start", "Deliver onScriptLoaded if not yet started"),
            (".unload", "Deliver onScriptUnloading and drop instances"),
        ]
    }
}

/// Completion and hints over commands and the script's method names.
struct ConsoleHelper {
    words: Vec<String>,
}

impl ConsoleHelper {
    fn new(session: &Session) -> Self {
        let mut words: Vec<String> = ReplCommand::all_commands()
            .iter()
            .filter_map(|(cmd, _)| cmd.split_whitespace().next())
            .map(String::from)
            .collect();
        words.push("system".to_string());
        for method in session.vm().program().methods() {
            if !words.contains(&method.name) {
                words.push(method.name.clone());
            }
        }
        Self { words }
    }

    fn word_start(line: &str) -> usize {
        line.rfind(|c: char| !c.is_alphanumeric() && c != '_' && c != '.')
            .map(|i| i + 1)
            .unwrap_or(0)
    }
}

impl Completer for ConsoleHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = Self::word_start(&line[..pos]);
        let word = &line[start..pos];
        if word.is_empty() {
            return Ok((pos, vec![]));
        }

        let matches = self
            .words
            .iter()
            .filter(|w| w.starts_with(word))
            .map(|w| Pair {
                display: w.clone(),
                replacement: w[word.len()..].to_string(),
            })
            .collect();
        Ok((pos, matches))
    }
}

impl Hinter for ConsoleHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<Self::Hint> {
        if pos < line.len() {
            return None;
        }
        let word = &line[Self::word_start(line)..];
        if word.len() < 2 {
            return None;
        }
        self.words
            .iter()
            .find(|w| w.starts_with(word) && w.len() > word.len())
            .map(|w| w[word.len()..].to_string().dimmed().to_string())
    }
}

impl Highlighter for ConsoleHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('.') {
            let split = line.find(char::is_whitespace).unwrap_or(line.len());
            let (cmd, rest) = line.split_at(split);
            return Cow::Owned(format!("{}{}", cmd.magenta(), rest));
        }

        // TARGET:NAME:ARGS
        let mut parts = line.splitn(3, ':');
        let mut out = String::with_capacity(line.len() * 2);
        if let Some(target) = parts.next() {
            out.push_str(&target.cyan().to_string());
        }
        if let Some(name) = parts.next() {
            out.push(':');
            out.push_str(&name.green().to_string());
        }
        if let Some(args) = parts.next() {
            out.push(':');
            out.push_str(&args.yellow().to_string());
        }
        Cow::Owned(out)
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Validator for ConsoleHelper {
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        // An argument list may continue on the next line.
        if ctx.input().trim_end().ends_with(',') {
            return Ok(ValidationResult::Incomplete);
        }
        Ok(ValidationResult::Valid(None))
    }
}

impl Helper for ConsoleHelper {}

/// The interactive console.
pub struct Repl {
    session: Session,
    editor: Editor<ConsoleHelper, DefaultHistory>,
    history_path: PathBuf,
    tick_ms: u64,
}

impl Repl {
    /// Creates a console over `session`; the script is not started yet.
    pub fn new(session: Session, config: &maki_host::Config) -> rustyline::Result<Self> {
        let editor_config = rustyline::Config::builder()
            .history_ignore_dups(true)?
            .history_ignore_space(true)
            .max_history_size(MAX_HISTORY_SIZE)?
            .auto_add_history(true)
            .build();

        let mut editor = Editor::with_config(editor_config)?;
        editor.set_helper(Some(ConsoleHelper::new(&session)));

        let history_path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("maki")
            .join(HISTORY_FILE);
        if let Some(parent) = history_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = editor.load_history(&history_path);

        Ok(Self {
            session,
            editor,
            history_path,
            tick_ms: config.tick_interval_ms,
        })
    }

    /// Starts the script and reads commands until `.exit` or end of input.
    pub fn run(&mut self) -> rustyline::Result<()> {
        self.print_banner();
        let started = self.session.start();
        self.report(started);

        loop {
            let prompt = format!("{} ", "maki>".bright_green().bold());
            match self.editor.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    if let Some((cmd, arg)) = ReplCommand::parse(trimmed) {
                        match self.execute_command(cmd, arg) {
                            CommandResult::Continue => continue,
                            CommandResult::Exit => break,
                        }
                    }
                    if trimmed.starts_with('.') {
                        eprintln!(
                            "{}: unknown command {}, try {}",
                            "Error".red().bold(),
                            trimmed.cyan(),
                            ".help".cyan()
                        );
                        continue;
                    }
                    self.send_event(trimmed);
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "^C".dimmed());
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("{}", "^D".dimmed());
                    break;
                }
                Err(err) => {
                    eprintln!("{}: {:?}", "Error".red().bold(), err);
                    break;
                }
            }
        }

        if self.session.is_started() {
            let unloaded = self.session.unload();
            self.report(unloaded);
        }
        let _ = self.editor.save_history(&self.history_path);
        Ok(())
    }

    fn print_banner(&self) {
        let program = self.session.vm().program();
        println!();
        println!(
            "  {} {} {}",
            "MAKI console".white().bold(),
            "v".dimmed(),
            env!("CARGO_PKG_VERSION").bright_yellow()
        );
        println!(
            "  {}",
            format!(
                "{} classes, {} methods, {} variables, {} handlers",
                program.classes().len(),
                program.methods().len(),
                program.variables().len(),
                program.bindings().len()
            )
            .dimmed()
        );
        println!(
            "  {} {} {}",
            "Type".dimmed(),
            ".help".cyan(),
            "for available commands".dimmed()
        );
        println!();
    }

    fn execute_command(&mut self, cmd: ReplCommand, arg: Option<&str>) -> CommandResult {
        match cmd {
            ReplCommand::Help => self.print_help(),
            ReplCommand::Exit => return CommandResult::Exit,
            ReplCommand::Clear => print!("\x1B[2J\x1B[H"),
            ReplCommand::Event => match arg {
                Some(event) => self.send_event(event),
                None => missing_argument(".event", "an event"),
            },
            ReplCommand::Tick => match arg.map(str::parse::<u64>) {
                None => self.advance(self.tick_ms),
                Some(Ok(ms)) => self.advance(ms),
                Some(Err(_)) => missing_argument(".tick", "a number of milliseconds"),
            },
            ReplCommand::Vars => self.print_variables(),
            ReplCommand::Classes => {
                if let Err(e) = inspect::print_classes(arg) {
                    eprintln!("{}: {}", "Error".red().bold(), e);
                }
            }
            ReplCommand::Mutations => {
                for m in self.session.bridge_mut().take_mutations() {
                    let args: Vec<_> = m.args.iter().map(format_value).collect();
                    println!(
                        "  #{} {} = {}",
                        m.element.0,
                        m.property.green(),
                        args.join(", ")
                    );
                }
            }
            ReplCommand::Start => {
                let outcome = self.session.start();
                self.report(outcome);
            }
            ReplCommand::Unload => {
                let outcome = self.session.unload();
                self.report(outcome);
            }
        }
        CommandResult::Continue
    }

    fn send_event(&mut self, text: &str) {
        let outcome = text
            .parse::<HostEvent>()
            .and_then(|event| self.session.dispatch(&event));
        match outcome {
            Ok(value) => println!("{}", format_value(&value)),
            Err(e) => print_error(&e),
        }
    }

    fn advance(&mut self, ms: u64) {
        let outcome = self.session.advance(ms);
        self.report(outcome);
        println!("{}", format!("clock {}ms", self.session.clock_ms()).dimmed());
    }

    fn print_variables(&self) {
        let vm = self.session.vm();
        for (i, (decl, value)) in vm
            .program()
            .variables()
            .iter()
            .zip(vm.variables())
            .enumerate()
        {
            let detail = match value.as_object() {
                Some(r) => match vm.model().class_name_of(r) {
                    Ok(class) => format!(" ({class})"),
                    Err(_) => " (dead)".to_string(),
                },
                None => String::new(),
            };
            println!(
                "  {:>4}  {:<12} {}{}",
                i,
                type_label(decl.ty).yellow(),
                format_value(value),
                detail.dimmed()
            );
        }
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Console Commands:".white().bold());
        println!();
        for (cmd, desc) in ReplCommand::all_commands() {
            println!("  {:18} {}", cmd.cyan(), desc.dimmed());
        }
        println!();
        println!("{}", "Events:".white().bold());
        println!();
        println!("  {:18} {}", "system:onQuit".cyan(), "System instance".dimmed());
        println!("  {:18} {}", "3:onLeftClick".cyan(), "Object in variable 3".dimmed());
        println!(
            "  {:18} {}",
            "#2:onResize:0,0,9,9".cyan(),
            "Host element 2, with arguments".dimmed()
        );
        println!();
    }

    fn report(&self, outcome: maki_host::Result<()>) {
        if let Err(e) = outcome {
            print_error(&e);
        }
    }
}

/// Result of executing a console command.
enum CommandResult {
    Continue,
    Exit,
}

fn missing_argument(command: &str, what: &str) {
    eprintln!(
        "{}: {} {}",
        "Error".red().bold(),
        command.cyan(),
        format!("requires {what}").dimmed()
    );
}

fn print_error(error: &SessionError) {
    let label = if error.is_fault() { "Fault" } else { "Error" };
    eprintln!("{}: {}", label.red().bold(), error);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repl_command_parse() {
        assert!(matches!(
            ReplCommand::parse(".help"),
            Some((ReplCommand::Help, None))
        ));
        assert!(matches!(
            ReplCommand::parse(".quit"),
            Some((ReplCommand::Exit, None))
        ));
        assert!(matches!(
            ReplCommand::parse(".event system:onQuit"),
            Some((ReplCommand::Event, Some("system:onQuit")))
        ));
        assert!(matches!(
            ReplCommand::parse("  .TICK   250 "),
            Some((ReplCommand::Tick, Some("250")))
        ));
        assert!(ReplCommand::parse(".bogus").is_none());
        assert!(ReplCommand::parse("system:onQuit").is_none());
    }

    #[test]
    fn test_every_listed_command_parses() {
        for (usage, _) in ReplCommand::all_commands() {
            let name = usage.split_whitespace().next().unwrap();
            assert!(ReplCommand::parse(name).is_some(), "{name}");
        }
    }
}
