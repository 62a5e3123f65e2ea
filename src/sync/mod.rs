//! Best-effort sync with the remote profile service.
//!
//! Gating decisions are made from local persisted state first; the remote
//! record is an overlay applied when the network cooperates. A failed fetch
//! or push degrades silently — a WARN line, nothing user-facing, and local
//! state stays authoritative.

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::bus::EventBus;
use crate::config::AppConfig;
use crate::profile::ProfileRecord;
use crate::store::ProfileStore;

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("profile service request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("profile service returned {0}")]
    Status(StatusCode),
    #[error("no remote profile exists yet")]
    NotFound,
}

// ─── ProfileApi ───────────────────────────────────────────────────────────────

/// Remote profile service surface. Trait-shaped so tests run against a fake
/// instead of the network.
#[async_trait]
pub trait ProfileApi: Send + Sync {
    async fn fetch(&self) -> Result<ProfileRecord, SyncError>;
    async fn update(&self, record: &ProfileRecord) -> Result<(), SyncError>;
}

/// `GET /api/profile` / `PATCH /api/profile` over HTTP with a bearer token.
pub struct HttpProfileApi {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpProfileApi {
    pub fn new(config: &AppConfig) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.sync_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            auth_token: config.auth_token.clone(),
        })
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

#[async_trait]
impl ProfileApi for HttpProfileApi {
    async fn fetch(&self) -> Result<ProfileRecord, SyncError> {
        let url = format!("{}/api/profile", self.base_url);
        let resp = self.authed(self.client.get(&url)).send().await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Err(SyncError::NotFound),
            status if !status.is_success() => Err(SyncError::Status(status)),
            _ => Ok(resp.json().await?),
        }
    }

    async fn update(&self, record: &ProfileRecord) -> Result<(), SyncError> {
        let url = format!("{}/api/profile", self.base_url);
        let resp = self.authed(self.client.patch(&url)).json(record).send().await?;
        if !resp.status().is_success() {
            return Err(SyncError::Status(resp.status()));
        }
        Ok(())
    }
}

// ─── Synchronizer ─────────────────────────────────────────────────────────────

/// What a refresh attempt did to local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Remote record differed; local store updated and workflow republished.
    Updated,
    /// Remote record matched local state.
    Unchanged,
    /// Remote unavailable; local state untouched and still authoritative.
    Unavailable,
}

/// Applies the remote overlay to the local store and republishes the
/// workflow topic when anything changed.
pub struct Synchronizer<A: ProfileApi> {
    api: A,
    store: ProfileStore,
    bus: EventBus,
}

impl<A: ProfileApi> Synchronizer<A> {
    pub fn new(api: A, store: ProfileStore, bus: EventBus) -> Self {
        Self { api, store, bus }
    }

    /// Fetches the remote record and overlays it on the local store.
    /// Never fails from the caller's perspective.
    pub async fn refresh(&self) -> SyncOutcome {
        let remote = match self.api.fetch().await {
            Ok(record) => record,
            Err(SyncError::NotFound) => {
                debug!("no remote profile yet — nothing to overlay");
                return SyncOutcome::Unchanged;
            }
            Err(e) => {
                warn!("profile sync unavailable — local state stays authoritative: {e}");
                return SyncOutcome::Unavailable;
            }
        };

        if self.store.load().as_ref() == Some(&remote) {
            return SyncOutcome::Unchanged;
        }

        self.store.save(&remote);
        self.bus.publish_workflow_changed();
        info!("remote profile overlay applied");
        SyncOutcome::Updated
    }

    /// Pushes the local record to the remote service, fire-and-forget.
    /// A failure is logged and swallowed; the local save already happened.
    pub async fn push(&self, record: &ProfileRecord) {
        if let Err(e) = self.api.update(record).await {
            warn!("profile push failed — will reconcile on a later sync: {e}");
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
