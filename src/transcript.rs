use chrono::{DateTime, Local};

/// Generic apology shown when a send fails. Matches the inline error entry
/// the web front end appended on a failed request.
pub const SEND_FAILED_TEXT: &str = "Oops! Something went wrong. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sender {
    User,
    Bot,
}

/// One entry in the chat log.
#[derive(Debug, Clone)]
pub struct ChatEntry {
    pub sender: Sender,
    pub text: String,
    /// Bot-side entry produced by a failed send rather than a real reply.
    pub error: bool,
    pub at: DateTime<Local>,
}

/// Append-only ordered chat log for the session. Display order is append
/// order; nothing is ever edited in place, only trimmed from the front.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<ChatEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, sender: Sender, text: &str, error: bool) {
        self.entries.push(ChatEntry {
            sender,
            text: text.to_string(),
            error,
            at: Local::now(),
        });
    }

    pub fn push_user(&mut self, text: &str) {
        self.push(Sender::User, text, false);
    }

    pub fn push_bot(&mut self, text: &str) {
        self.push(Sender::Bot, text, false);
    }

    /// Record a failed send as a single bot-side error entry.
    pub fn push_error(&mut self) {
        self.push(Sender::Bot, SEND_FAILED_TEXT, true);
    }

    /// Trim to at most `max` entries, dropping the oldest exchange pairs first.
    pub fn trim(&mut self, max: usize) {
        while self.entries.len() > max {
            if self.entries.len() >= 2 {
                self.entries.drain(..2);
            } else {
                self.entries.remove(0);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatEntry> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
