use super::client::{CloseReason, LiveEvent};
use super::commands::HELP;
use super::protocol::Activity;
use super::room::{RoomMode, RoomState};
use colored::Colorize;

/// Full screen for the current room state.
pub fn render(room: &RoomState) -> String {
    let mut out = String::new();

    match room.mode() {
        RoomMode::Connecting => out.push_str(&format!("{}\n", "Connecting to class...".dimmed())),
        RoomMode::Waiting => out.push_str(&format!(
            "{}\n{}\n",
            "Connected.".bright_green().bold(),
            "Waiting for your teacher to push an activity...".dimmed()
        )),
        RoomMode::Closed => out.push_str(&format!("{}\n", "Class has ended.".bright_yellow())),
        RoomMode::Quiz | RoomMode::Poll | RoomMode::Material => {
            if let Some(activity) = room.activity() {
                out.push_str(&render_activity(activity, room.selected(), room.submitted()));
            }
        }
    }

    if room.hand_raised() && room.mode().is_connected() {
        out.push_str(&format!("{}\n", "✋ Hand raised".bright_magenta()));
    }
    out
}

fn render_activity(activity: &Activity, selected: Option<usize>, submitted: bool) -> String {
    let mut out = String::new();
    let (label, text) = match activity {
        Activity::Quiz { text, .. } => ("Quiz", text),
        Activity::Poll { text, .. } => ("Poll", text),
        Activity::Material { title, content, url } => {
            out.push_str(&format!("{} {}\n", "Material".bright_cyan().bold(), title.bold()));
            if let Some(content) = content {
                out.push_str(&format!("\n{}\n", content));
            }
            if let Some(url) = url {
                out.push_str(&format!("{} {}\n", "Link:".dimmed(), url.underline()));
            }
            return out;
        }
    };

    out.push_str(&format!("{} {}\n\n", format!("{}:", label).bright_cyan().bold(), text.bold()));
    for (i, option) in activity.options().iter().enumerate() {
        let marker = format!("[{}]", i + 1);
        if selected == Some(i) {
            out.push_str(&format!("  {} {}\n", marker.bright_green().bold(), option.bright_green()));
        } else {
            out.push_str(&format!("  {} {}\n", marker.bright_white(), option));
        }
    }
    out.push('\n');
    if submitted {
        out.push_str(&format!("{}\n", "Answer submitted. Waiting for the next activity...".dimmed()));
    } else {
        out.push_str(&format!("{}\n", "Type an option number to answer.".dimmed()));
    }
    out
}

/// One-line status for connection events that do not change the main screen.
pub fn status_line(event: &LiveEvent) -> Option<String> {
    match event {
        LiveEvent::Disconnected { reason } => {
            Some(format!("{} {}", "Connection lost:".bright_yellow(), reason))
        }
        LiveEvent::Reconnecting {
            attempt,
            max_attempts,
            delay,
        } => Some(
            format!(
                "Reconnecting in {:?}... (attempt {}/{})",
                delay, attempt, max_attempts
            )
            .dimmed()
            .to_string(),
        ),
        LiveEvent::Closed(CloseReason::RetriesExhausted { attempts }) => Some(format!(
            "{} gave up after {} attempt{}. Run the command again to rejoin.",
            "Connection lost:".bright_red().bold(),
            attempts,
            if *attempts == 1 { "" } else { "s" }
        )),
        _ => None,
    }
}

pub fn help() -> String {
    HELP.iter()
        .map(|(keys, what)| format!("  {:<10} {}", keys.bright_green(), what.dimmed()))
        .collect::<Vec<_>>()
        .join("\n")
}
