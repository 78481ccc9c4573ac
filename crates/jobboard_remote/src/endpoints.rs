use url::Url;

use crate::client::RemoteError;

/// URL builder for every backend route. Ids are pushed as path segments so
/// they are percent-encoded; every route keeps Django's trailing slash.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    pub fn new(base_url: &str) -> Result<Self, RemoteError> {
        let base = Url::parse(base_url)
            .map_err(|err| RemoteError::InvalidBaseUrl(format!("{base_url}: {err}")))?;
        if base.cannot_be_a_base() {
            return Err(RemoteError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn saved_jobs(&self) -> Url {
        self.route(&["saved", "jobs"])
    }

    pub fn save_job(&self, job_id: &str) -> Url {
        self.route(&["save", "job", job_id])
    }

    pub fn remove_saved_job(&self, entry_id: &str) -> Url {
        self.route(&["saved", "job", "remove", entry_id])
    }

    pub fn saved_job_detail(&self, entry_id: &str) -> Url {
        self.route(&["saved", "job", "detail", entry_id])
    }

    pub fn applications(&self) -> Url {
        self.route(&["application", "apply", "jobs", "list"])
    }

    pub fn apply(&self, job_id: &str) -> Url {
        self.route(&["application", job_id, "apply"])
    }

    pub fn remove_application(&self, entry_id: &str) -> Url {
        self.route(&["apply", "job", "remove", entry_id])
    }

    pub fn application_detail(&self, entry_id: &str) -> Url {
        self.route(&["apply", "job", "detail", entry_id])
    }

    pub fn notifications(&self) -> Url {
        self.route(&["notifications"])
    }

    pub fn mark_read(&self, id: &str) -> Url {
        self.route(&["notifications", "mark-read", id])
    }

    pub fn mark_unread(&self, id: &str) -> Url {
        self.route(&["notifications", "mark-unread", id])
    }

    pub fn delete_notification(&self, id: &str) -> Url {
        self.route(&["notifications", "delete", id])
    }

    pub fn delete_all_notifications(&self) -> Url {
        self.route(&["notifications", "delete-all"])
    }

    pub fn search_jobs(&self, query: &str, location: Option<&str>) -> Url {
        let mut url = self.route(&["jobs", "search"]);
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", query);
            if let Some(location) = location {
                pairs.append_pair("loc", location);
            }
        }
        url
    }

    fn route(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        // `new` rejects cannot-be-a-base urls, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments).push("");
        }
        url
    }
}
