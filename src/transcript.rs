//! Display log for the chat view.
//!
//! The transcript is what the user actually sees: session messages
//! interleaved with transient entries that never enter `ChatSession` --
//! error banners and the single "thinking" placeholder shown while a
//! request is outstanding. Entries keep their chronological position, so a
//! banner stays between the messages it happened between.

/// One visible entry in the chat log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEntry {
    /// Literal user text. Never interpreted as markup.
    User(String),
    /// Assistant reply, rendered as markdown.
    Assistant(String),
    /// Error banner. Not part of the session, never replayed or retried.
    Error(String),
    /// Thinking placeholder. At most one at a time, removed unconditionally
    /// once the response arrives.
    Loading,
}

#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn push_user(&mut self, content: String) {
        self.entries.push(TranscriptEntry::User(content));
    }

    pub fn push_assistant(&mut self, content: String) {
        self.entries.push(TranscriptEntry::Assistant(content));
    }

    pub fn push_error(&mut self, message: String) {
        self.entries.push(TranscriptEntry::Error(message));
    }

    /// Show the thinking placeholder. A second placeholder is never stacked
    /// on top of an existing one.
    pub fn show_loading(&mut self) {
        if !self.is_loading() {
            self.entries.push(TranscriptEntry::Loading);
        }
    }

    /// Remove the placeholder wherever it is. Safe to call when none is up.
    pub fn clear_loading(&mut self) {
        self.entries.retain(|e| *e != TranscriptEntry::Loading);
    }

    pub fn is_loading(&self) -> bool {
        self.entries.contains(&TranscriptEntry::Loading)
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }
}
