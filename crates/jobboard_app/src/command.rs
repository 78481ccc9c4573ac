//! Line commands typed at the prompt, parsed into core messages.

use chrono::{DateTime, Utc};
use jobboard_core::{AppState, JobSummary, Msg};
use jobboard_remote::Credentials;
use thiserror::Error;

pub const HELP: &str = "\
commands:
  login <user_id> [token] [csrf] [sessionid]   start a session (use - to skip a value)
  logout                                       end the session
  search [query] [@location]                   search open jobs
  save <job_id> / unsave <saved_id>            bookmark or drop a job
  apply <job_id> [cover letter...]             apply to a job
  withdraw <application_id>                    remove an application
  detail <application_id>                      show one application
  saved <saved_id>                             show one saved job
  read|unread|delete <notification_id>         update a notification
  clear                                        delete all notifications
  refresh | show | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Dispatch(Msg),
    Login {
        user_id: String,
        credentials: Credentials,
    },
    Logout,
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command {0:?}, type help")]
    Unknown(String),
    #[error("{command} needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
}

/// `state` resolves job ids against search results and mirrors; `now`
/// stamps new applications.
pub fn parse(line: &str, state: &AppState, now: DateTime<Utc>) -> Result<Command, CommandError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err(CommandError::Empty);
    };
    let rest: Vec<&str> = words.collect();

    let command = match head.to_ascii_lowercase().as_str() {
        "login" => {
            let user_id = required(&rest, "login", "a user id")?;
            let credentials = Credentials {
                access_token: optional(&rest, 1),
                csrf_token: optional(&rest, 2),
                session_cookie: optional(&rest, 3),
            };
            Command::Login {
                user_id,
                credentials,
            }
        }
        "logout" => Command::Logout,
        "search" => {
            let (query, location) = split_location(&rest);
            Command::Dispatch(Msg::SearchSubmitted { query, location })
        }
        "save" => {
            let job_id = required(&rest, "save", "a job id")?;
            Command::Dispatch(Msg::SaveClicked {
                job: lookup_job(state, job_id),
            })
        }
        "unsave" => Command::Dispatch(Msg::UnsaveClicked {
            entry_id: required(&rest, "unsave", "a saved job id")?,
        }),
        "apply" => {
            let job_id = required(&rest, "apply", "a job id")?;
            Command::Dispatch(Msg::ApplyClicked {
                job: lookup_job(state, job_id),
                cover_letter: rest[1..].join(" "),
                applied_at: now,
            })
        }
        "withdraw" => Command::Dispatch(Msg::RemoveApplicationClicked {
            entry_id: required(&rest, "withdraw", "an application id")?,
        }),
        "detail" => Command::Dispatch(Msg::ApplicationDetailRequested {
            id: required(&rest, "detail", "an application id")?,
        }),
        "saved" => Command::Dispatch(Msg::SavedJobDetailRequested {
            id: required(&rest, "saved", "a saved job id")?,
        }),
        "read" => Command::Dispatch(Msg::MarkReadClicked {
            id: required(&rest, "read", "a notification id")?,
        }),
        "unread" => Command::Dispatch(Msg::MarkUnreadClicked {
            id: required(&rest, "unread", "a notification id")?,
        }),
        "delete" => Command::Dispatch(Msg::DeleteNotificationClicked {
            id: required(&rest, "delete", "a notification id")?,
        }),
        "clear" => Command::Dispatch(Msg::DeleteAllNotificationsClicked),
        "refresh" => Command::Dispatch(Msg::RefreshRequested),
        "show" | "ls" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(command)
}

fn required(
    rest: &[&str],
    command: &'static str,
    argument: &'static str,
) -> Result<String, CommandError> {
    rest.first()
        .map(|word| word.to_string())
        .ok_or(CommandError::MissingArgument { command, argument })
}

fn optional(rest: &[&str], index: usize) -> Option<String> {
    rest.get(index)
        .filter(|word| **word != "-")
        .map(|word| word.to_string())
}

/// Everything from the first `@word` on is the location.
fn split_location(rest: &[&str]) -> (String, Option<String>) {
    match rest.iter().position(|word| word.starts_with('@')) {
        Some(at) => {
            let mut location = rest[at..].join(" ");
            location.remove(0);
            (rest[..at].join(" "), Some(location))
        }
        None => (rest.join(" "), None),
    }
}

fn lookup_job(state: &AppState, job_id: String) -> JobSummary {
    state
        .find_job(&job_id)
        .unwrap_or_else(|| JobSummary::new(job_id, ""))
}
