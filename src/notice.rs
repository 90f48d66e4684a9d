//! Transient user-facing notices.
//!
//! Persistence and merge operations report their outcome through a
//! [`Notifier`] instead of returning errors to the caller. The CLI prints
//! notices; tests record them.

use std::sync::Mutex;

/// A short message for the user about an operation that just finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Draft canvas written to the remote store.
    Saved,
    /// Final canvas written to the remote store.
    FinalSaved,
    /// Remote save failed; the canvas is still unsaved.
    SaveFailed { message: String },
    /// Final save refused because the customer profile is empty.
    EmptyCanvas,
    /// Loading from the remote store failed.
    LoadFailed { message: String },
    /// AI suggestions imported.
    Imported { count: usize },
    /// Every AI suggestion was already on the canvas.
    AlreadyAdded,
}

impl Notice {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Notice::SaveFailed { .. } | Notice::LoadFailed { .. } | Notice::EmptyCanvas
        )
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::Saved => write!(f, "Canvas saved"),
            Notice::FinalSaved => write!(f, "Final version saved"),
            Notice::SaveFailed { message } => write!(f, "Failed to save canvas: {}", message),
            Notice::EmptyCanvas => write!(
                f,
                "Add at least one customer job, pain or gain before saving the final version"
            ),
            Notice::LoadFailed { message } => write!(f, "Failed to load canvas: {}", message),
            Notice::Imported { count } => write!(f, "Added {} AI suggestion(s)", count),
            Notice::AlreadyAdded => write!(f, "All suggestions have already been added"),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Sends notices to the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        if notice.is_error() {
            tracing::warn!(%notice, "notice");
        } else {
            tracing::info!(%notice, "notice");
        }
    }
}

/// Prints notices to the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        if notice.is_error() {
            eprintln!("{}", notice);
        } else {
            println!("{}", notice);
        }
    }
}

/// Keeps every notice in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices().pop()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Notice::Saved);
        notifier.notify(Notice::AlreadyAdded);
        assert_eq!(notifier.notices(), vec![Notice::Saved, Notice::AlreadyAdded]);
        assert_eq!(notifier.last(), Some(Notice::AlreadyAdded));
    }

    #[test]
    fn test_error_classification() {
        assert!(Notice::EmptyCanvas.is_error());
        assert!(!Notice::Imported { count: 2 }.is_error());
    }

    #[test]
    fn test_display_includes_details() {
        let msg = Notice::SaveFailed {
            message: "disk full".to_string(),
        }
        .to_string();
        assert!(msg.contains("disk full"));
        assert!(Notice::Imported { count: 3 }.to_string().contains('3'));
    }
}
