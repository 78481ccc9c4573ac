//! Notification surface: the only place that turns outcomes into user text.

use crate::{
    ActionKind, ErrorKind, SyncError, CODE_ALREADY_APPLIED, CODE_ALREADY_SAVED, CODE_JOB_CLOSED,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Failure,
}

/// One toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    /// Kind of the error behind a failure notice.
    pub error: Option<ErrorKind>,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
            error: None,
        }
    }

    pub fn failure(text: impl Into<String>, error: ErrorKind) -> Self {
        Self {
            level: NoticeLevel::Failure,
            text: text.into(),
            error: Some(error),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.level == NoticeLevel::Failure
    }
}

/// Terminal outcome of an action or a load.
#[derive(Debug, Clone, Copy)]
pub enum Outcome<'a> {
    Committed {
        action: ActionKind,
        server_message: Option<&'a str>,
    },
    Failed {
        action: ActionKind,
        error: &'a SyncError,
    },
    LoadFailed {
        what: &'a str,
        error: &'a SyncError,
    },
}

/// Maps an outcome to exactly one notice.
pub fn report(outcome: Outcome<'_>) -> Notice {
    match outcome {
        Outcome::Committed {
            action,
            server_message,
        } => {
            let text = server_message
                .map(str::trim)
                .filter(|message| !message.is_empty())
                .map(ToOwned::to_owned)
                .unwrap_or_else(|| success_text(action).to_string());
            Notice::success(text)
        }
        Outcome::Failed { action, error } => Notice::failure(failure_text(action, error), error.kind),
        Outcome::LoadFailed { what, error } => {
            Notice::failure(format!("Failed to load {what}."), error.kind)
        }
    }
}

fn failure_text(action: ActionKind, error: &SyncError) -> String {
    if let ErrorKind::Conflict(_) = error.kind {
        if let Some(text) = already_text(error) {
            return text.to_string();
        }
        return format!("Duplicate {} request ignored.", action.noun());
    }
    if action == ActionKind::Apply && error.has_code(CODE_JOB_CLOSED) {
        return "This job is no longer accepting applications.".to_string();
    }
    if error.kind == ErrorKind::Validation {
        if !error.field_errors.is_empty() {
            return error.field_errors.join(", ");
        }
        if let Some(message) = error.message.as_deref().filter(|m| !m.trim().is_empty()) {
            return message.to_string();
        }
    }
    generic_failure_text(action).to_string()
}

/// Wording follows the server's signal, whichever action triggered it.
fn already_text(error: &SyncError) -> Option<&'static str> {
    if error.has_code(CODE_ALREADY_APPLIED) || error.message_contains("already applied") {
        Some("You've already applied to this job.")
    } else if error.has_code(CODE_ALREADY_SAVED) || error.message_contains("already saved") {
        Some("You have already saved this job.")
    } else {
        None
    }
}

fn success_text(action: ActionKind) -> &'static str {
    match action {
        ActionKind::Save => "Job saved successfully!",
        ActionKind::Unsave => "Saved job removed.",
        ActionKind::Apply => "Successfully applied for the job!",
        ActionKind::RemoveApplication => "Application removed!",
        ActionKind::MarkRead => "Notification marked as read.",
        ActionKind::MarkUnread => "Notification marked as unread.",
        ActionKind::DeleteNotification => "Notification deleted.",
        ActionKind::DeleteAllNotifications => "All notifications cleared.",
    }
}

fn generic_failure_text(action: ActionKind) -> &'static str {
    match action {
        ActionKind::Save => "Failed to save job.",
        ActionKind::Unsave => "Failed to remove saved job.",
        ActionKind::Apply => "Failed to apply. Please check your data or login again.",
        ActionKind::RemoveApplication => "Failed to remove application.",
        ActionKind::MarkRead => "Failed to mark notification as read.",
        ActionKind::MarkUnread => "Failed to mark notification as unread.",
        ActionKind::DeleteNotification => "Failed to delete notification.",
        ActionKind::DeleteAllNotifications => "Failed to clear notifications.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConflictKind;

    fn failed(action: ActionKind, error: &SyncError) -> Notice {
        report(Outcome::Failed { action, error })
    }

    #[test]
    fn already_applied_code_wins_over_everything() {
        let error = SyncError::duplicate_resource(CODE_ALREADY_APPLIED, "dup");
        let notice = failed(ActionKind::Apply, &error);
        assert_eq!(notice.text, "You've already applied to this job.");
        assert_eq!(
            notice.error,
            Some(ErrorKind::Conflict(ConflictKind::DuplicateResource))
        );
    }

    #[test]
    fn already_saved_is_detected_from_server_text() {
        let error = SyncError::new(ErrorKind::Conflict(ConflictKind::DuplicateResource))
            .with_message("You have already saved this job");
        assert_eq!(
            failed(ActionKind::Save, &error).text,
            "You have already saved this job."
        );
    }

    #[test]
    fn already_signal_wins_regardless_of_action() {
        let applied = SyncError::duplicate_resource(CODE_ALREADY_APPLIED, "dup");
        assert_eq!(
            failed(ActionKind::Save, &applied).text,
            "You've already applied to this job."
        );

        let saved = SyncError::new(ErrorKind::Conflict(ConflictKind::DuplicateResource))
            .with_message("Job already saved");
        assert_eq!(
            failed(ActionKind::Apply, &saved).text,
            "You have already saved this job."
        );
    }

    #[test]
    fn generic_conflict_gets_duplicate_text() {
        let error = SyncError::duplicate_in_flight();
        assert_eq!(
            failed(ActionKind::MarkRead, &error).text,
            "Duplicate notification request ignored."
        );
    }

    #[test]
    fn validation_joins_field_errors() {
        let error = SyncError::new(ErrorKind::Validation).with_field_errors(vec![
            "cover_letter_text: This field is required.".to_string(),
            "resume_form: Invalid.".to_string(),
        ]);
        assert_eq!(
            failed(ActionKind::Apply, &error).text,
            "cover_letter_text: This field is required., resume_form: Invalid."
        );
    }

    #[test]
    fn closed_job_has_its_own_text() {
        let error = SyncError::new(ErrorKind::Validation).with_code(CODE_JOB_CLOSED);
        assert_eq!(
            failed(ActionKind::Apply, &error).text,
            "This job is no longer accepting applications."
        );
    }

    #[test]
    fn other_kinds_get_generic_text() {
        for kind in [ErrorKind::Network, ErrorKind::Auth, ErrorKind::NotFound, ErrorKind::Unknown] {
            let notice = failed(ActionKind::Save, &SyncError::new(kind).with_message("boom"));
            assert_eq!(notice.text, "Failed to save job.");
            assert!(notice.is_failure());
        }
    }

    #[test]
    fn success_prefers_server_message() {
        let notice = report(Outcome::Committed {
            action: ActionKind::Save,
            server_message: Some("Job 'Engineer' has been saved successfully."),
        });
        assert_eq!(notice.level, NoticeLevel::Success);
        assert_eq!(notice.text, "Job 'Engineer' has been saved successfully.");

        let fallback = report(Outcome::Committed {
            action: ActionKind::Save,
            server_message: Some("  "),
        });
        assert_eq!(fallback.text, "Job saved successfully!");
    }
}
