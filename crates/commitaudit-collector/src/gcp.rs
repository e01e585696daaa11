//! GCP compute REST client.
//!
//! Bearer-token auth, follows `nextPageToken` until the listing is
//! exhausted. Only list endpoints are used; the audit never writes.

use std::time::Duration;

use commitaudit_core::{AuditConfig, Error, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::*;

pub struct GcpComputeClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl GcpComputeClient {
    /// Build a client from the audit config. Requires an access token.
    pub fn new(config: &AuditConfig) -> Result<Self> {
        let access_token = config
            .access_token
            .clone()
            .ok_or_else(|| Error::Config("no access token configured".into()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::Http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            access_token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Fetch every page of a list endpoint.
    async fn list_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let url = self.url(path);
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let mut request = self.client.get(&url).bearer_auth(&self.access_token);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| Error::Http(format!("GET {} failed: {}", url, e)))?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| Error::Http(format!("Reading {} failed: {}", url, e)))?;
            if !status.is_success() {
                return Err(Error::Api {
                    status: status.as_u16(),
                    body,
                });
            }

            let page: ListPage<T> = decode_page(&body)?;
            pages += 1;
            items.extend(page.items);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!("GET {}: {} items over {} pages", url, items.len(), pages);
        Ok(items)
    }
}

fn decode_page<T: DeserializeOwned>(body: &str) -> Result<ListPage<T>> {
    Ok(serde_json::from_str(body)?)
}

impl ComputeApi for GcpComputeClient {
    async fn list_regions(&self, project: &str) -> Result<Vec<Region>> {
        self.list_all(&format!("projects/{}/regions", project)).await
    }

    async fn list_commitments(
        &self,
        project: &str,
        region: &str,
    ) -> Result<Vec<CommitmentRecord>> {
        self.list_all(&format!("projects/{}/regions/{}/commitments", project, region))
            .await
    }

    async fn list_instances(&self, project: &str, zone: &str) -> Result<Vec<InstanceRecord>> {
        self.list_all(&format!("projects/{}/zones/{}/instances", project, zone))
            .await
    }

    async fn list_machine_types(
        &self,
        project: &str,
        zone: &str,
    ) -> Result<Vec<MachineTypeRecord>> {
        self.list_all(&format!("projects/{}/zones/{}/machineTypes", project, zone))
            .await
    }
}
