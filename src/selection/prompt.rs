use super::{Candidate, SelectionController};
use crate::error::Result;
use colored::Colorize;
use std::io::{BufRead, Write};

/// One line of input inside the selection modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalCommand {
    /// 1-based row in the visible list
    Toggle(usize),
    ToggleAll,
    Filter(String),
    ClearFilter,
    Commit,
    Cancel,
    Help,
}

impl ModalCommand {
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if let Some(query) = input.strip_prefix('/') {
            return Some(if query.trim().is_empty() {
                ModalCommand::ClearFilter
            } else {
                ModalCommand::Filter(query.trim().to_string())
            });
        }
        match input.to_lowercase().as_str() {
            "a" | "all" => Some(ModalCommand::ToggleAll),
            "c" | "commit" | "save" => Some(ModalCommand::Commit),
            "q" | "quit" | "cancel" => Some(ModalCommand::Cancel),
            "?" | "help" => Some(ModalCommand::Help),
            other => match other.parse::<usize>() {
                Ok(n) if n > 0 => Some(ModalCommand::Toggle(n)),
                _ => None,
            },
        }
    }
}

const HELP: &str = "  <n>     toggle row n\n  a       select / deselect all shown\n  /text   filter rows\n  /       clear filter\n  c       commit\n  q       cancel";

/// Run the modal over `input` until the user commits or cancels.
///
/// Returns the committed ids, or `None` if the user cancelled (or input ended),
/// in which case the working selection is reverted.
pub fn run_modal<C, R, W>(
    title: &str,
    controller: &mut SelectionController<C>,
    mut input: R,
    mut output: W,
) -> Result<Option<Vec<String>>>
where
    C: Candidate,
    R: BufRead,
    W: Write,
{
    writeln!(output, "\n{}", title.bright_cyan().bold())?;
    render(controller, &mut output)?;

    loop {
        write!(output, "{} ", "Select (? for help):".dimmed())?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            controller.cancel();
            return Ok(None);
        }
        if line.trim().is_empty() {
            continue;
        }

        match ModalCommand::parse(&line) {
            Some(ModalCommand::Toggle(row)) => {
                let id = controller
                    .filtered()
                    .get(row - 1)
                    .map(|c| c.id().to_string());
                match id {
                    Some(id) => {
                        controller.toggle(&id);
                        render(controller, &mut output)?;
                    }
                    None => writeln!(output, "{}", format!("No row {}", row).red())?,
                }
            }
            Some(ModalCommand::ToggleAll) => {
                controller.toggle_all_filtered();
                render(controller, &mut output)?;
            }
            Some(ModalCommand::Filter(query)) => {
                controller.set_filter(query);
                render(controller, &mut output)?;
            }
            Some(ModalCommand::ClearFilter) => {
                controller.clear_filter();
                render(controller, &mut output)?;
            }
            Some(ModalCommand::Commit) => return Ok(Some(controller.commit())),
            Some(ModalCommand::Cancel) => {
                if controller.is_dirty() {
                    writeln!(output, "{}", "Changes discarded.".yellow())?;
                }
                controller.cancel();
                return Ok(None);
            }
            Some(ModalCommand::Help) => writeln!(output, "{}", HELP.dimmed())?,
            None => writeln!(output, "{}", "Invalid selection".red())?,
        }
    }
}

fn render<C: Candidate, W: Write>(controller: &SelectionController<C>, output: &mut W) -> Result<()> {
    writeln!(output)?;
    let rows = controller.filtered();
    if rows.is_empty() {
        writeln!(output, "  {}", "Nothing matches the filter.".yellow())?;
    }
    for (i, candidate) in rows.iter().enumerate() {
        let mark = if controller.is_selected(candidate.id()) {
            "[x]".bright_green().bold()
        } else {
            "[ ]".normal()
        };
        let detail = candidate
            .detail()
            .map(|d| format!(" ({})", d).dimmed().to_string())
            .unwrap_or_default();
        writeln!(
            output,
            "  {} {} {}{}",
            format!("{:>3}.", i + 1).bright_white(),
            mark,
            candidate.label(),
            detail
        )?;
    }

    let filter = if controller.query().is_empty() {
        String::new()
    } else {
        format!(" · filter \"{}\"", controller.query())
    };
    writeln!(output, "\n  {}{}", controller.summary().to_string().bright_cyan(), filter.dimmed())?;
    Ok(())
}
