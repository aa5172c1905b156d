use chrono::{DateTime, Local};

pub type MessageId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Authored locally
    Me,
    /// The simulated counterpart
    Other,
}

/// Delivery status of a self-authored message. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DeliveryState {
    Sent,
    Delivered,
    Read,
}

impl DeliveryState {
    pub fn next(self) -> Option<DeliveryState> {
        match self {
            DeliveryState::Sent => Some(DeliveryState::Delivered),
            DeliveryState::Delivered => Some(DeliveryState::Read),
            DeliveryState::Read => None,
        }
    }

    pub fn tick_glyph(self) -> &'static str {
        match self {
            DeliveryState::Sent => "✓",
            DeliveryState::Delivered => "✓✓",
            DeliveryState::Read => "✓✓ read",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reaction {
    #[default]
    None,
    Liked,
    Disliked,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub id: MessageId,
    pub author: String,
    pub text: String,
    pub timestamp: DateTime<Local>,
    pub origin: Origin,
    pub delivery: DeliveryState,
    pub reaction: Reaction,
}

impl Message {
    pub fn mine(id: MessageId, text: impl Into<String>, timestamp: DateTime<Local>) -> Self {
        Self {
            id,
            author: "You".to_string(),
            text: text.into(),
            timestamp,
            origin: Origin::Me,
            delivery: DeliveryState::Sent,
            reaction: Reaction::None,
        }
    }

    pub fn theirs(
        id: MessageId,
        author: impl Into<String>,
        text: impl Into<String>,
        timestamp: DateTime<Local>,
    ) -> Self {
        Self {
            id,
            author: author.into(),
            text: text.into(),
            timestamp,
            origin: Origin::Other,
            // Not tracked for incoming messages
            delivery: DeliveryState::Read,
            reaction: Reaction::None,
        }
    }

    /// `HH:MM` in local time
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }

    /// Advance delivery to `target` only if it is the immediate successor.
    pub fn advance_delivery(&mut self, target: DeliveryState) -> bool {
        if self.origin != Origin::Me || self.delivery.next() != Some(target) {
            return false;
        }
        self.delivery = target;
        true
    }
}

/// A run of consecutive same-origin messages, as index range into the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Group {
    pub origin: Origin,
    pub start: usize,
    pub len: usize,
}

/// Derive visual groups from a transcript.
pub fn groups(messages: &[Message]) -> Vec<Group> {
    let mut out: Vec<Group> = Vec::new();
    for (i, msg) in messages.iter().enumerate() {
        match out.last_mut() {
            Some(group) if group.origin == msg.origin => group.len += 1,
            _ => out.push(Group {
                origin: msg.origin,
                start: i,
                len: 1,
            }),
        }
    }
    out
}
