use std::fmt::Write;

use jobboard_core::{AppViewModel, Notice, NoticeLevel, SessionState};

pub fn render_notice(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Success => format!("✔ {}", notice.text),
        NoticeLevel::Failure => format!("✖ {}", notice.text),
    }
}

/// One-line summary printed whenever the state changes.
pub fn status_line(view: &AppViewModel) -> String {
    let who = match &view.session {
        SessionState::SignedOut => "signed out".to_string(),
        SessionState::SignedIn { user_id } => format!("user {user_id}"),
    };
    let mut line = format!(
        "[{who}] saved {} | applications {} | notifications {} ({} unread)",
        view.saved_jobs.len(),
        view.applications.len(),
        view.counts.total,
        view.counts.unread
    );
    if view.pending_actions > 0 {
        let _ = write!(line, " | {} pending", view.pending_actions);
    }
    if !view.loading.is_empty() {
        let families: Vec<&str> = view.loading.iter().map(|family| family.label()).collect();
        let _ = write!(line, " | loading {}", families.join(", "));
    }
    line
}

pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", status_line(view));

    if !view.search_results.is_empty() {
        let _ = writeln!(out, "\nsearch results:");
        for job in &view.search_results {
            let location = job.location.as_deref().unwrap_or("-");
            let _ = writeln!(out, "  {:<8} {} ({})", job.id, job.title, location);
        }
    }

    let _ = writeln!(out, "\nsaved jobs:");
    for row in &view.saved_jobs {
        let _ = writeln!(
            out,
            "  {:<8} {} @ {}{}{}",
            row.id,
            row.title,
            row.employer,
            if row.is_applied { " [applied]" } else { "" },
            pending_mark(row.pending)
        );
    }

    let _ = writeln!(out, "\napplications:");
    for row in &view.applications {
        let applied = row
            .applied_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "  {:<8} {} @ {} {} {}{}",
            row.id,
            row.title,
            row.employer,
            applied,
            row.status,
            pending_mark(row.pending)
        );
    }

    let _ = writeln!(out, "\nnotifications:");
    for row in &view.notifications {
        let _ = writeln!(
            out,
            "  {} {:<8} {}{}",
            if row.is_read { " " } else { "*" },
            row.id,
            row.message,
            pending_mark(row.pending)
        );
    }

    if let Some(detail) = &view.application_detail {
        let _ = writeln!(out, "\napplication {}:", detail.entry.id);
        let _ = writeln!(
            out,
            "  {} @ {} ({})",
            detail.entry.job.title,
            detail.entry.job.employer_or_unknown(),
            detail.entry.status
        );
        if let Some(cover_letter) = &detail.cover_letter_text {
            let _ = writeln!(out, "  cover letter: {cover_letter}");
        }
    }

    if let Some(entry) = &view.saved_job_detail {
        let _ = writeln!(out, "\nsaved job {}:", entry.id);
        let _ = writeln!(
            out,
            "  {} {} @ {}{}",
            entry.job.id,
            entry.job.title,
            entry.job.employer_or_unknown(),
            if entry.is_applied { " [applied]" } else { "" }
        );
    }
    out
}

fn pending_mark(pending: bool) -> &'static str {
    if pending {
        " (pending)"
    } else {
        ""
    }
}
