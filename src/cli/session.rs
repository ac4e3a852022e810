//! Line-based drag-and-drop session
//!
//! Each input line is one gesture: `drag <id>` starts a drag, `drop <id>`
//! completes it. Output is plain text so it can be captured in tests.

use std::io::{BufRead, Write};
use std::str::FromStr;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, DragSession, TreeService};
use crate::cli::error::{CliError, CliResult};
use crate::domain::render_forest;
use crate::infrastructure::InfraError;

pub const HELP: &str = "\
commands:
  drag <id>                 start dragging an item
  drop <id>                 drop the dragged item onto <id> (becomes its last child)
  cancel                    abandon the current drag
  add <label...> [@parent]  add an item, optionally under @parent
  show                      print the tree
  export                    print the tree as seed TOML
  help                      show this help
  quit                      leave the session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Drag(String),
    Drop(String),
    Cancel,
    Add { label: String, parent: Option<String> },
    Show,
    Export,
    Help,
    Quit,
}

impl FromStr for SessionCommand {
    type Err = CliError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default();
        let args: Vec<&str> = words.collect();

        let single_id = |name: &str| match args.as_slice() {
            [id] => Ok(id.to_string()),
            _ => Err(CliError::Usage(format!("usage: {name} <id>"))),
        };

        match command {
            "drag" => single_id("drag").map(SessionCommand::Drag),
            "drop" => single_id("drop").map(SessionCommand::Drop),
            "cancel" => Ok(SessionCommand::Cancel),
            "add" => parse_add(&args),
            "show" | "tree" => Ok(SessionCommand::Show),
            "export" => Ok(SessionCommand::Export),
            "help" | "?" => Ok(SessionCommand::Help),
            "quit" | "exit" => Ok(SessionCommand::Quit),
            other => Err(CliError::Usage(format!(
                "unknown command: {other} (try 'help')"
            ))),
        }
    }
}

fn parse_add(args: &[&str]) -> CliResult<SessionCommand> {
    let (parent, label_words) = match args.split_last() {
        Some((last, rest)) if last.starts_with('@') => {
            (Some(last.trim_start_matches('@').to_string()), rest)
        }
        _ => (None, args),
    };
    if label_words.is_empty() || parent.as_deref() == Some("") {
        return Err(CliError::Usage(
            "usage: add <label...> [@parent]".to_string(),
        ));
    }
    Ok(SessionCommand::Add {
        label: label_words.join(" "),
        parent,
    })
}

/// Runs the session until `quit` or end of input.
///
/// Command errors are reported on `out` and the session continues; only
/// I/O failures end it.
#[instrument(level = "debug", skip_all)]
pub fn run_session<R: BufRead, W: Write>(
    session: &mut DragSession,
    service: &TreeService,
    input: R,
    out: &mut W,
) -> CliResult<()> {
    let show_ids = service.settings().show_ids;
    print_tree(session, show_ids, out)?;

    for line in input.lines() {
        let line = line.map_err(|e| InfraError::io("read session input", e))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        debug!(%line, "session input");

        let command = match line.parse::<SessionCommand>() {
            Ok(command) => command,
            Err(e) => {
                write_line(out, &format!("error: {e}"))?;
                continue;
            }
        };
        if command == SessionCommand::Quit {
            break;
        }
        if let Err(e) = apply(session, service, command, out) {
            match e {
                CliError::Application(_) | CliError::Usage(_) => {
                    write_line(out, &format!("error: {e}"))?
                }
                CliError::Infra(_) => return Err(e),
            }
        }
    }
    Ok(())
}

fn apply<W: Write>(
    session: &mut DragSession,
    service: &TreeService,
    command: SessionCommand,
    out: &mut W,
) -> CliResult<()> {
    let show_ids = service.settings().show_ids;
    match command {
        SessionCommand::Drag(id) => {
            session.begin_move(&id)?;
            write_line(out, &format!("dragging {id}"))?;
            print_tree(session, show_ids, out)
        }
        SessionCommand::Drop(target) => {
            let outcome = session.complete_move(&target)?;
            write_line(out, &outcome.to_string())?;
            print_tree(session, show_ids, out)
        }
        SessionCommand::Cancel => match session.cancel() {
            Some(id) => write_line(out, &format!("cancelled drag of {id}")),
            None => Err(ApplicationError::NoActiveDrag.into()),
        },
        SessionCommand::Add { label, parent } => {
            let id = service.add_item(session.tree_mut(), &label, parent.as_deref())?;
            write_line(out, &format!("added {id}"))?;
            print_tree(session, show_ids, out)
        }
        SessionCommand::Show => print_tree(session, show_ids, out),
        SessionCommand::Export => {
            let toml = service.export_toml(session.tree())?;
            write_line(out, toml.trim_end())
        }
        SessionCommand::Help => write_line(out, HELP),
        SessionCommand::Quit => Ok(()),
    }
}

fn print_tree<W: Write>(session: &DragSession, show_ids: bool, out: &mut W) -> CliResult<()> {
    let rendered = render_forest(session.tree(), &session.render_options(show_ids));
    write!(out, "{rendered}").map_err(|e| InfraError::io("write session output", e))?;
    Ok(())
}

fn write_line<W: Write>(out: &mut W, text: &str) -> CliResult<()> {
    writeln!(out, "{text}").map_err(|e| InfraError::io("write session output", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_add_with_parent_when_parsing_then_splits_label_and_parent() {
        let command: SessionCommand = "add Shopping list @1-2".parse().unwrap();
        assert_eq!(
            command,
            SessionCommand::Add {
                label: "Shopping list".to_string(),
                parent: Some("1-2".to_string()),
            }
        );
    }

    #[test]
    fn given_add_without_label_when_parsing_then_usage_error() {
        assert!(matches!(
            "add @1".parse::<SessionCommand>(),
            Err(CliError::Usage(_))
        ));
    }

    #[test]
    fn given_drag_without_id_when_parsing_then_usage_error() {
        assert!("drag".parse::<SessionCommand>().is_err());
        assert!("drag 1 2".parse::<SessionCommand>().is_err());
        assert_eq!(
            "drag 1".parse::<SessionCommand>().unwrap(),
            SessionCommand::Drag("1".to_string())
        );
    }

    #[test]
    fn given_unknown_word_when_parsing_then_mentions_help() {
        let err = "fly 1".parse::<SessionCommand>().unwrap_err();
        assert!(err.to_string().contains("try 'help'"));
    }
}
