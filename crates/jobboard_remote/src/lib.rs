//! Job board remote: HTTP resource client and the engine that runs effects.
mod classify;
mod client;
mod credentials;
mod endpoints;
mod engine;
mod settings;
mod types;

pub use classify::{classify_status, map_reqwest_error};
pub use client::{HttpResourceClient, RemoteError, ResourceClient};
pub use credentials::{
    cookie_value, CredentialInterceptor, CredentialStore, Credentials, RequestInterceptor,
    CSRF_COOKIE, CSRF_HEADER, SESSION_COOKIE,
};
pub use endpoints::Endpoints;
pub use engine::{execute_call, execute_load, ChannelEventSink, EngineHandle, EventSink};
pub use settings::ClientSettings;
pub use types::{LoadedPayload, RemoteEvent};
