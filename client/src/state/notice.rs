//! Transient, dismissible notifications.
//!
//! Every page carries one `Notice` slot; a newer message replaces the older
//! one, matching the single snackbar each screen shows.

#[cfg(test)]
#[path = "notice_test.rs"]
mod notice_test;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NoticeSlot {
    current: Option<Notice>,
}

impl NoticeSlot {
    pub fn success(&mut self, message: impl Into<String>) {
        self.current = Some(Notice { message: message.into(), severity: Severity::Success });
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.current = Some(Notice { message: message.into(), severity: Severity::Error });
    }

    #[must_use]
    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }

    /// Close the notice, returning it.
    pub fn dismiss(&mut self) -> Option<Notice> {
        self.current.take()
    }
}
