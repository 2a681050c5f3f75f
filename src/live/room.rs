use super::protocol::{Activity, Outbound};

/// What the room view is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomMode {
    Connecting,
    Waiting,
    Quiz,
    Poll,
    Material,
    /// Terminal: the connection is gone and will not be retried
    Closed,
}

impl RoomMode {
    pub fn is_connected(&self) -> bool {
        matches!(
            self,
            RoomMode::Waiting | RoomMode::Quiz | RoomMode::Poll | RoomMode::Material
        )
    }
}

/// Room state machine driven by connection events and pushed activities.
///
/// `CONNECTING -> WAITING -> {QUIZ | POLL | MATERIAL} -> WAITING | CONNECTING`,
/// with `CLOSED` terminal.
#[derive(Debug, Clone)]
pub struct RoomState {
    participant_id: String,
    mode: RoomMode,
    activity: Option<Activity>,
    selected: Option<usize>,
    submitted: bool,
    hand_raised: bool,
}

impl RoomState {
    pub fn new(participant_id: impl Into<String>) -> Self {
        Self {
            participant_id: participant_id.into(),
            mode: RoomMode::Connecting,
            activity: None,
            selected: None,
            submitted: false,
            hand_raised: false,
        }
    }

    pub fn mode(&self) -> RoomMode {
        self.mode
    }

    pub fn activity(&self) -> Option<&Activity> {
        self.activity.as_ref()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn submitted(&self) -> bool {
        self.submitted
    }

    pub fn hand_raised(&self) -> bool {
        self.hand_raised
    }

    pub fn on_connecting(&mut self) {
        if self.mode != RoomMode::Closed {
            self.mode = RoomMode::Connecting;
        }
    }

    /// A fresh connection shows the waiting screen; the previous activity is gone.
    pub fn on_open(&mut self) {
        if self.mode == RoomMode::Closed {
            return;
        }
        self.mode = RoomMode::Waiting;
        self.clear_activity();
        self.hand_raised = false;
    }

    pub fn on_push(&mut self, activity: Activity) {
        if !self.mode.is_connected() {
            tracing::debug!(mode = ?self.mode, "Ignoring activity outside a live connection");
            return;
        }
        self.mode = match activity {
            Activity::Quiz { .. } => RoomMode::Quiz,
            Activity::Poll { .. } => RoomMode::Poll,
            Activity::Material { .. } => RoomMode::Material,
        };
        self.activity = Some(activity);
        self.selected = None;
        self.submitted = false;
    }

    pub fn on_closed(&mut self) {
        self.mode = RoomMode::Closed;
        self.clear_activity();
    }

    /// Record the answer for the current quiz or poll and build the frame to send.
    ///
    /// Only the first valid submission per pushed activity is accepted; later
    /// calls return `None` and leave the recorded answer untouched.
    pub fn submit(&mut self, index: usize) -> Option<Outbound> {
        if self.submitted {
            return None;
        }
        let option = self.activity.as_ref()?.options().get(index)?.clone();
        let outbound = match self.mode {
            RoomMode::Quiz => Outbound::SubmitAnswer { answer: option },
            RoomMode::Poll => Outbound::SubmitPoll { option },
            _ => return None,
        };
        self.selected = Some(index);
        self.submitted = true;
        Some(outbound)
    }

    pub fn raise_hand(&mut self) -> Option<Outbound> {
        if !self.mode.is_connected() {
            return None;
        }
        self.hand_raised = true;
        Some(Outbound::RaiseHand {
            student_id: self.participant_id.clone(),
        })
    }

    fn clear_activity(&mut self) {
        self.activity = None;
        self.selected = None;
        self.submitted = false;
    }
}
