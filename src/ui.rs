use crate::error::{LiveroomError, Result};
use colored::Colorize;
use std::io::{self, IsTerminal, Write};

/// Message severity levels for consistent toast feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSeverity {
    /// Recoverable issues, e.g. a fallback to default data
    Warning,
    /// Actual failures (network, IO, parsing errors)
    Error,
    Info,
    Success,
}

impl MessageSeverity {
    pub fn prefix(&self) -> colored::ColoredString {
        match self {
            Self::Warning => "Warning:".bright_yellow().bold(),
            Self::Error => "Error:".bright_red().bold(),
            Self::Info => "Info:".bright_cyan().bold(),
            Self::Success => "Success:".bright_green().bold(),
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Warning => "!",
            Self::Error => "✗",
            Self::Info => "i",
            Self::Success => "✓",
        }
    }
}

/// Transient user notification. Errors and warnings go to stderr.
pub fn toast(severity: MessageSeverity, message: impl AsRef<str>) {
    let line = format!(
        "{} {} {}",
        severity.icon(),
        severity.prefix(),
        message.as_ref()
    );
    match severity {
        MessageSeverity::Warning | MessageSeverity::Error => eprintln!("{}", line),
        MessageSeverity::Info | MessageSeverity::Success => println!("{}", line),
    }
}

pub fn heading(title: &str) {
    println!("\n{}", title.bright_cyan().bold());
    println!("{}", "─".repeat(title.chars().count().max(12)).dimmed());
}

/// Read a secret without echoing it. Falls back to a plain line when stdin is
/// not a terminal.
pub fn read_password(prompt: &str) -> Result<String> {
    use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
    use crossterm::terminal;

    print!("{} ", prompt.bright_cyan());
    io::stdout().flush()?;

    if !io::stdin().is_terminal() {
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        return Ok(line.trim_end_matches(['\r', '\n']).to_string());
    }

    terminal::enable_raw_mode()?;
    let entered = (|| -> io::Result<Option<String>> {
        let mut secret = String::new();
        loop {
            if let Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) = event::read()?
            {
                if kind == KeyEventKind::Release {
                    continue;
                }
                match code {
                    KeyCode::Enter => return Ok(Some(secret)),
                    KeyCode::Esc => return Ok(None),
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(None)
                    }
                    KeyCode::Backspace => {
                        secret.pop();
                    }
                    KeyCode::Char(c) => secret.push(c),
                    _ => {}
                }
            }
        }
    })();
    terminal::disable_raw_mode()?;
    println!();

    entered?.ok_or_else(|| {
        LiveroomError::Io(io::Error::new(
            io::ErrorKind::Interrupted,
            "password entry cancelled",
        ))
    })
}

/// Human-friendly relative time for a unix timestamp in seconds.
pub fn format_timestamp(timestamp: u64) -> String {
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(timestamp);
    let diff = now.saturating_sub(timestamp);

    if diff < 60 {
        "just now".to_string()
    } else if diff < 3600 {
        let mins = diff / 60;
        format!("{} min{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if diff < 86400 {
        let hours = diff / 3600;
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if diff < 604800 {
        let days = diff / 86400;
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else {
        use chrono::{DateTime, Utc};
        let dt = DateTime::<Utc>::from(UNIX_EPOCH + Duration::from_secs(timestamp));
        dt.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    #[test]
    fn test_relative_timestamps() {
        assert_eq!(format_timestamp(now()), "just now");
        assert_eq!(format_timestamp(now() - 60), "1 min ago");
        assert_eq!(format_timestamp(now() - 2 * 3600), "2 hours ago");
        assert_eq!(format_timestamp(now() - 86400), "1 day ago");
    }

    #[test]
    fn test_old_timestamps_use_calendar_date() {
        assert_eq!(format_timestamp(0), "1970-01-01");
    }

    #[test]
    fn test_future_timestamp_does_not_underflow() {
        assert_eq!(format_timestamp(now() + 500), "just now");
    }
}
