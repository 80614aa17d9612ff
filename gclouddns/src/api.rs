use std::sync::Arc;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::{
    credentials::TokenSource,
    error::{Error, Result},
    types::{
        Change, ErrorResponse, ManagedZone, ManagedZonesListResponse, ResourceRecordSet,
        ResourceRecordSetsListResponse,
    },
};

pub const DEFAULT_API_BASE: &str = "https://dns.googleapis.com/dns/v1";

/// Thin client for the Cloud DNS v1 REST API, scoped to one project
#[derive(Clone)]
pub struct CloudDns {
    client: Client,
    base: String,
    project: String,
    tokens: Arc<dyn TokenSource>,
}

impl CloudDns {
    pub fn new(client: Client, base: &str, project: &str, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            client,
            base: base.trim_end_matches('/').to_string(),
            project: project.to_string(),
            tokens,
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    fn zones_url(&self) -> String {
        format!("{}/projects/{}/managedZones", self.base, self.project)
    }

    fn zone_url(&self, zone: &str) -> String {
        format!("{}/{}", self.zones_url(), zone)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let authorization = self.tokens.authorization().await?;
        let resp = request.header("Authorization", authorization).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(parsed) => parsed.error.message,
                Err(_) => body,
            };
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp.json().await?)
    }

    /// Lists every managed zone of the project, following pagination.
    pub async fn managed_zones(&self) -> Result<Vec<ManagedZone>> {
        let url = self.zones_url();
        let mut zones = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self.client.get(&url);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }
            let page: ManagedZonesListResponse = self.send(request).await?;
            trace!(count = page.managed_zones.len(), "managed zones page");
            zones.extend(page.managed_zones);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => return Ok(zones),
            }
        }
    }

    /// Lists every record set in `zone`, following pagination.
    pub async fn record_sets(&self, zone: &str) -> Result<Vec<ResourceRecordSet>> {
        let url = format!("{}/rrsets", self.zone_url(zone));
        let mut rrsets = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self.client.get(&url);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }
            let page: ResourceRecordSetsListResponse = self.send(request).await?;
            rrsets.extend(page.rrsets);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => return Ok(rrsets),
            }
        }
    }

    pub async fn create_change(&self, zone: &str, change: &Change) -> Result<Change> {
        debug!(
            zone,
            additions = change.additions.len(),
            deletions = change.deletions.len(),
            "creating change"
        );
        let url = format!("{}/changes", self.zone_url(zone));
        self.send(self.client.post(url).json(change)).await
    }

    pub async fn change(&self, zone: &str, change_id: &str) -> Result<Change> {
        let url = format!("{}/changes/{}", self.zone_url(zone), change_id);
        self.send(self.client.get(url)).await
    }
}
