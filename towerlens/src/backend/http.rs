//! reqwest-based tower backend.

use std::time::Duration;

use reqwest::{StatusCode, Url};
use tracing::{debug, trace};

use super::wire::decode_towers;
use super::{BackendError, BoxFuture, Existence, TowerBackend, TowerQuery};
use crate::tower::{RadioFilter, TowerKey, TowerRecord};

/// Default base URL of the tower service.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080/api";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Tower backend speaking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTowerBackend {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTowerBackend {
    /// Creates a backend rooted at `base_url` with the default timeout.
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a backend rooted at `base_url` with a custom request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let base_url = parse_base_url(base_url)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("towerlens/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BackendError::Client(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response, BackendError> {
        trace!(url = %url, "GET");
        self.client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| BackendError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    async fn fetch(&self, query: &TowerQuery) -> Result<Vec<TowerRecord>, BackendError> {
        let url = towers_url(&self.base_url, query)?;
        let response = self.get(url.clone()).await?;
        let status = response.status();

        if status == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(BackendError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| BackendError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let towers = decode_towers(&body).map_err(|e| BackendError::Decode(e.to_string()))?;
        debug!(count = towers.len(), bbox = %query.bounds.to_bbox_param(), "Fetched towers");
        Ok(towers)
    }

    async fn exists(&self, key: &TowerKey) -> Result<Existence, BackendError> {
        let url = tower_url(&self.base_url, key)?;
        let response = self.get(url).await?;
        Ok(existence_from_status(response.status().as_u16()))
    }
}

impl TowerBackend for HttpTowerBackend {
    fn fetch_towers<'a>(
        &'a self,
        query: &'a TowerQuery,
    ) -> BoxFuture<'a, Result<Vec<TowerRecord>, BackendError>> {
        Box::pin(self.fetch(query))
    }

    fn check_tower_exists<'a>(
        &'a self,
        key: &'a TowerKey,
    ) -> BoxFuture<'a, Result<Existence, BackendError>> {
        Box::pin(self.exists(key))
    }
}

/// Parses a base URL, making sure it ends in a slash so joins append.
fn parse_base_url(base: &str) -> Result<Url, BackendError> {
    let normalized = if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{}/", base)
    };
    Url::parse(&normalized).map_err(|e| BackendError::Client(format!("invalid base URL {}: {}", base, e)))
}

fn join(base: &Url, path: &str) -> Result<Url, BackendError> {
    base.join(path)
        .map_err(|e| BackendError::Client(format!("invalid path {}: {}", path, e)))
}

/// `{base}/towers?bbox=W,S,E,N[&radio=..][&mcc=..&mnc=..]&source=..`
pub(crate) fn towers_url(base: &Url, query: &TowerQuery) -> Result<Url, BackendError> {
    let mut url = join(base, "towers")?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("bbox", &query.bounds.to_bbox_param());
        if let RadioFilter::Only(radio) = query.params.radio {
            pairs.append_pair("radio", radio.as_str());
        }
        if let Some(op) = query.params.operator {
            pairs.append_pair("mcc", &op.mcc.to_string());
            pairs.append_pair("mnc", &op.mnc.to_string());
        }
        pairs.append_pair("source", &query.params.source);
    }
    Ok(url)
}

/// `{base}/towers/{radio}/{mcc}/{mnc}/{area}/{cell}`
pub(crate) fn tower_url(base: &Url, key: &TowerKey) -> Result<Url, BackendError> {
    let id = &key.identity;
    join(
        base,
        &format!(
            "towers/{}/{}/{}/{}/{}",
            key.radio.as_str(),
            id.mcc,
            id.mnc,
            id.area,
            id.cell_id
        ),
    )
}

pub(crate) fn existence_from_status(status: u16) -> Existence {
    match status {
        200 => Existence::Found,
        204 | 404 => Existence::NotFound,
        other => Existence::Unexpected(other),
    }
}
