use std::sync::Arc;

use jobboard_core::{
    ApplicationDetail, ApplicationEntry, EchoEntry, ErrorKind, JobSearchPage, JobSummary,
    NotificationPage, RemoteEcho, SavedJobEntry, SyncError,
};
use jobboard_logging::{board_debug, board_info, board_warn};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use url::Url;

use crate::classify::{classify_status, map_reqwest_error};
use crate::credentials::RequestInterceptor;
use crate::{ClientSettings, Endpoints};

/// Sent in place of an empty cover letter; the backend rejects blank text.
const EMPTY_COVER_LETTER: &str = "No cover letter provided.";

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("invalid base url {0}")]
    InvalidBaseUrl(String),
    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Typed operations against the three resource families and job search.
#[async_trait::async_trait]
pub trait ResourceClient: Send + Sync {
    async fn list_saved_jobs(&self) -> Result<Vec<SavedJobEntry>, SyncError>;
    async fn save_job(&self, job_id: &str) -> Result<RemoteEcho, SyncError>;
    async fn remove_saved_job(&self, entry_id: &str) -> Result<RemoteEcho, SyncError>;
    async fn saved_job_detail(&self, entry_id: &str) -> Result<SavedJobEntry, SyncError>;

    async fn list_applications(&self) -> Result<Vec<ApplicationEntry>, SyncError>;
    async fn apply(&self, job_id: &str, cover_letter: &str) -> Result<RemoteEcho, SyncError>;
    async fn application_detail(&self, entry_id: &str) -> Result<ApplicationDetail, SyncError>;
    async fn remove_application(&self, entry_id: &str) -> Result<RemoteEcho, SyncError>;

    async fn list_notifications(&self) -> Result<NotificationPage, SyncError>;
    async fn mark_read(&self, id: &str) -> Result<RemoteEcho, SyncError>;
    async fn mark_unread(&self, id: &str) -> Result<RemoteEcho, SyncError>;
    async fn delete_notification(&self, id: &str) -> Result<RemoteEcho, SyncError>;
    async fn delete_all_notifications(&self) -> Result<RemoteEcho, SyncError>;

    async fn search_jobs(
        &self,
        query: &str,
        location: Option<&str>,
    ) -> Result<Vec<JobSummary>, SyncError>;
}

pub struct HttpResourceClient {
    http: reqwest::Client,
    endpoints: Endpoints,
    interceptor: Arc<dyn RequestInterceptor>,
}

#[derive(Deserialize)]
struct SavedJobsBody {
    #[serde(default)]
    s_savejobs: Vec<SavedJobEntry>,
}

#[derive(Deserialize)]
struct SavedJobDetailBody {
    saved_job: SavedJobEntry,
}

#[derive(Deserialize)]
struct ApplicationsBody {
    #[serde(default)]
    apply_jobs: Vec<ApplicationEntry>,
}

#[derive(Deserialize)]
struct ApplicationDetailBody {
    application_detail: ApplicationDetail,
}

/// Acknowledgement of a mutating call. Removal views answer with `Message`.
#[derive(Default, Deserialize)]
struct AckBody {
    #[serde(default, alias = "Message")]
    message: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

impl HttpResourceClient {
    pub fn new(
        settings: &ClientSettings,
        interceptor: Arc<dyn RequestInterceptor>,
    ) -> Result<Self, RemoteError> {
        let endpoints = Endpoints::new(&settings.base_url)?;
        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self {
            http,
            endpoints,
            interceptor,
        })
    }

    async fn send(&self, method: Method, url: Url, body: Option<Value>) -> Result<Vec<u8>, SyncError> {
        let label = format!("{} {}", method, url.path());
        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let request = self.interceptor.intercept(request);

        let response = request.send().await.map_err(|err| {
            board_warn!("{} failed: {}", label, err);
            map_reqwest_error(err)
        })?;
        self.interceptor.observe(&response);

        let status = response.status();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        board_debug!("{} -> {}", label, status.as_u16());

        if !status.is_success() {
            let error = classify_status(status, &bytes);
            board_info!("{} rejected: {}", label, error);
            return Err(error);
        }
        Ok(bytes.to_vec())
    }

    async fn fetch<T: DeserializeOwned>(&self, url: Url) -> Result<T, SyncError> {
        let bytes = self.send(Method::GET, url, None).await?;
        decode(&bytes)
    }

    async fn mutate(&self, method: Method, url: Url, body: Option<Value>) -> Result<AckBody, SyncError> {
        let bytes = self.send(method, url, body).await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(AckBody::default());
        }
        // A non-JSON success body still means success.
        Ok(serde_json::from_slice(&bytes).unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl ResourceClient for HttpResourceClient {
    async fn list_saved_jobs(&self) -> Result<Vec<SavedJobEntry>, SyncError> {
        let body: SavedJobsBody = self.fetch(self.endpoints.saved_jobs()).await?;
        Ok(body.s_savejobs)
    }

    async fn save_job(&self, job_id: &str) -> Result<RemoteEcho, SyncError> {
        let ack = self
            .mutate(Method::POST, self.endpoints.save_job(job_id), None)
            .await?;
        Ok(echo(ack, |data| {
            serde_json::from_value(data).map(EchoEntry::SavedJob)
        }))
    }

    async fn remove_saved_job(&self, entry_id: &str) -> Result<RemoteEcho, SyncError> {
        let ack = self
            .mutate(Method::DELETE, self.endpoints.remove_saved_job(entry_id), None)
            .await?;
        Ok(plain_echo(ack))
    }

    async fn saved_job_detail(&self, entry_id: &str) -> Result<SavedJobEntry, SyncError> {
        let body: SavedJobDetailBody = self.fetch(self.endpoints.saved_job_detail(entry_id)).await?;
        Ok(body.saved_job)
    }

    async fn list_applications(&self) -> Result<Vec<ApplicationEntry>, SyncError> {
        let body: ApplicationsBody = self.fetch(self.endpoints.applications()).await?;
        Ok(body.apply_jobs)
    }

    async fn apply(&self, job_id: &str, cover_letter: &str) -> Result<RemoteEcho, SyncError> {
        let cover_letter = match cover_letter.trim() {
            "" => EMPTY_COVER_LETTER,
            text => text,
        };
        let body = json!({
            "cover_letter_text": cover_letter,
            "resume_form": { "basic": true },
        });
        let ack = self
            .mutate(Method::POST, self.endpoints.apply(job_id), Some(body))
            .await?;
        Ok(echo(ack, |data| {
            serde_json::from_value(data).map(EchoEntry::Application)
        }))
    }

    async fn application_detail(&self, entry_id: &str) -> Result<ApplicationDetail, SyncError> {
        let body: ApplicationDetailBody =
            self.fetch(self.endpoints.application_detail(entry_id)).await?;
        Ok(body.application_detail)
    }

    async fn remove_application(&self, entry_id: &str) -> Result<RemoteEcho, SyncError> {
        let ack = self
            .mutate(Method::DELETE, self.endpoints.remove_application(entry_id), None)
            .await?;
        Ok(plain_echo(ack))
    }

    async fn list_notifications(&self) -> Result<NotificationPage, SyncError> {
        self.fetch(self.endpoints.notifications()).await
    }

    async fn mark_read(&self, id: &str) -> Result<RemoteEcho, SyncError> {
        let ack = self
            .mutate(Method::POST, self.endpoints.mark_read(id), None)
            .await?;
        Ok(plain_echo(ack))
    }

    async fn mark_unread(&self, id: &str) -> Result<RemoteEcho, SyncError> {
        let ack = self
            .mutate(Method::POST, self.endpoints.mark_unread(id), None)
            .await?;
        Ok(plain_echo(ack))
    }

    async fn delete_notification(&self, id: &str) -> Result<RemoteEcho, SyncError> {
        let ack = self
            .mutate(Method::DELETE, self.endpoints.delete_notification(id), None)
            .await?;
        Ok(plain_echo(ack))
    }

    async fn delete_all_notifications(&self) -> Result<RemoteEcho, SyncError> {
        let ack = self
            .mutate(Method::DELETE, self.endpoints.delete_all_notifications(), None)
            .await?;
        Ok(plain_echo(ack))
    }

    async fn search_jobs(
        &self,
        query: &str,
        location: Option<&str>,
    ) -> Result<Vec<JobSummary>, SyncError> {
        let page: JobSearchPage = self
            .fetch(self.endpoints.search_jobs(query, location))
            .await?;
        if page.count != page.results.len() {
            board_debug!(
                "search reported {} results but sent {}",
                page.count,
                page.results.len()
            );
        }
        Ok(page.results)
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SyncError> {
    serde_json::from_slice(bytes).map_err(|err| {
        board_warn!("unexpected response body: {}", err);
        SyncError::new(ErrorKind::Unknown).with_message(format!("unexpected response body: {err}"))
    })
}

fn plain_echo(ack: AckBody) -> RemoteEcho {
    RemoteEcho {
        message: ack.message,
        entry: None,
    }
}

/// Builds the echo of a create call; an unreadable `data` only costs the
/// canonical entry, the placeholder stays until the next refresh.
fn echo(
    ack: AckBody,
    parse: impl FnOnce(Value) -> Result<EchoEntry, serde_json::Error>,
) -> RemoteEcho {
    let entry = ack.data.and_then(|data| match parse(data) {
        Ok(entry) => Some(entry),
        Err(err) => {
            board_debug!("echoed entry not usable: {}", err);
            None
        }
    });
    RemoteEcho {
        message: ack.message,
        entry,
    }
}
