/// Input typed by the student while in a live room
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomCommand {
    /// Zero-based option index
    Answer(usize),
    RaiseHand,
    Help,
    Quit,
}

impl RoomCommand {
    /// Options are shown 1-based, so `"2"` selects index 1.
    pub fn parse(s: &str) -> Option<Self> {
        let input = s.trim().to_lowercase();
        match input.as_str() {
            "/quit" | "/exit" | "/q" | "q" => Some(RoomCommand::Quit),
            "/hand" | "h" => Some(RoomCommand::RaiseHand),
            "/help" | "?" => Some(RoomCommand::Help),
            _ => match input.parse::<usize>() {
                Ok(n) if n > 0 => Some(RoomCommand::Answer(n - 1)),
                _ => None,
            },
        }
    }
}

pub const HELP: &[(&str, &str)] = &[
    ("<n>", "answer with option n"),
    ("h, /hand", "raise your hand"),
    ("?, /help", "show this help"),
    ("q, /quit", "leave the room"),
];
