use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type JobId = String;
pub type EntryId = String;
/// Identifies one user action for its whole Pending lifetime.
pub type Ticket = u64;

/// A named group of endpoints operating on one entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Family {
    SavedJobs,
    Applications,
    Notifications,
}

impl Family {
    pub const ALL: [Family; 3] = [Family::SavedJobs, Family::Applications, Family::Notifications];

    pub fn label(self) -> &'static str {
        match self {
            Family::SavedJobs => "saved jobs",
            Family::Applications => "applications",
            Family::Notifications => "notifications",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Read-only projection of a job posting. Owned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobSummary {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: JobId,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub employer: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub salary: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub deadline: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub category_name: Option<String>,
}

impl JobSummary {
    pub fn new(id: impl Into<JobId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_employer(mut self, employer: impl Into<String>) -> Self {
        self.employer = Some(employer.into());
        self
    }

    /// Employer name for display; the backend omits it on some list payloads.
    pub fn employer_or_unknown(&self) -> &str {
        self.employer.as_deref().unwrap_or("Unknown")
    }
}

/// A job the user bookmarked.
///
/// The backend sends the applied flag as `is_applied`, either on the entry or
/// nested inside `job`; some payloads use `isApplied`. All forms normalize
/// into [`SavedJobEntry::is_applied`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawSavedJob")]
pub struct SavedJobEntry {
    pub id: EntryId,
    pub job: JobSummary,
    pub is_applied: bool,
}

#[derive(Deserialize)]
struct RawSavedJob {
    #[serde(deserialize_with = "lenient_string")]
    id: EntryId,
    #[serde(default)]
    job: Option<RawSavedJobJob>,
    #[serde(default)]
    is_applied: Option<bool>,
    #[serde(default, rename = "isApplied")]
    is_applied_camel: Option<bool>,
}

#[derive(Deserialize)]
struct RawSavedJobJob {
    #[serde(flatten)]
    summary: JobSummary,
    #[serde(default)]
    is_applied: Option<bool>,
    #[serde(default, rename = "isApplied")]
    is_applied_camel: Option<bool>,
}

impl From<RawSavedJob> for SavedJobEntry {
    fn from(raw: RawSavedJob) -> Self {
        let (job, nested) = match raw.job {
            Some(job) => (job.summary, job.is_applied.or(job.is_applied_camel)),
            None => (JobSummary::default(), None),
        };
        let is_applied = raw
            .is_applied
            .or(raw.is_applied_camel)
            .or(nested)
            .unwrap_or(false);
        Self {
            id: raw.id,
            job,
            is_applied,
        }
    }
}

/// Review state of an application. Only the backend advances it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Reviewed,
    Rejected,
    Shortlisted,
    Hired,
}

impl ApplicationStatus {
    const NAMES: &'static [&'static str] = &["Pending", "Reviewed", "Rejected", "Shortlisted", "Hired"];

    /// Accepts the backend short codes as well as the full names.
    pub fn from_code(code: &str) -> Option<Self> {
        let status = match code.trim().to_ascii_uppercase().as_str() {
            "P" | "PENDING" => ApplicationStatus::Pending,
            "RV" | "REVIEWED" => ApplicationStatus::Reviewed,
            "RJ" | "REJECT" | "REJECTED" => ApplicationStatus::Rejected,
            "AC" | "SL" | "ACCEPT" | "SHORTLISTED" => ApplicationStatus::Shortlisted,
            "H" | "HR" | "HIRED" => ApplicationStatus::Hired,
            _ => return None,
        };
        Some(status)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Reviewed => "Reviewed",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Shortlisted => "Shortlisted",
            ApplicationStatus::Hired => "Hired",
        };
        f.write_str(name)
    }
}

impl<'de> Deserialize<'de> for ApplicationStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(ApplicationStatus::Pending),
            Some(code) => ApplicationStatus::from_code(code)
                .ok_or_else(|| de::Error::unknown_variant(code, Self::NAMES)),
        }
    }
}

/// One job application as listed for the job seeker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub id: EntryId,
    #[serde(default)]
    pub job: JobSummary,
    #[serde(default)]
    pub applied_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDetail {
    #[serde(flatten)]
    pub entry: ApplicationEntry,
    #[serde(default)]
    pub cover_letter_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub id: EntryId,
    #[serde(default, alias = "isRead")]
    pub is_read: bool,
    /// Every other field the backend sends, kept verbatim.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl NotificationEntry {
    pub fn new(id: impl Into<EntryId>, is_read: bool) -> Self {
        Self {
            id: id.into(),
            is_read,
            payload: Map::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.payload
            .insert("message".to_string(), Value::String(message.into()));
        self
    }

    pub fn message(&self) -> Option<&str> {
        ["message", "title", "verb"]
            .iter()
            .find_map(|key| self.payload.get(*key).and_then(Value::as_str))
    }
}

/// Read/unread partition of a notification collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Counts {
    pub total: usize,
    pub read: usize,
    pub unread: usize,
}

impl Counts {
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a NotificationEntry>) -> Self {
        entries.into_iter().fold(Counts::default(), |mut counts, entry| {
            counts.total += 1;
            if entry.is_read {
                counts.read += 1;
            } else {
                counts.unread += 1;
            }
            counts
        })
    }
}

/// Body of `GET /notifications/`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NotificationPage {
    #[serde(default)]
    pub all_list: Vec<NotificationEntry>,
    #[serde(default)]
    pub counts: Option<Counts>,
}

/// Body of the job search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobSearchPage {
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub results: Vec<JobSummary>,
}

// Ids arrive as UUID strings from the backend but as numbers in some fixtures.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(Value::Bool(flag)) => Ok(Some(flag.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
