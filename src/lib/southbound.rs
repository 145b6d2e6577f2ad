// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use reqwest::header::CACHE_CONTROL;
use reqwest::{Method, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::deserializer::u64_or_string;
use crate::{
    AggregateFlowStats, ErrorKind, FlowDeleteRequest, FlowEntry,
    FlowTableReply, Host, Link, SdnError, SouthboundConfig, SwitchDescriptor,
};

const PATH_SWITCHES: &str = "stats/switches";
const PATH_TOPOLOGY_LINKS: &str = "v1.0/topology/links";
const PATH_TOPOLOGY_HOSTS: &str = "v1.0/topology/hosts";
const PATH_FLOW: &str = "stats/flow";
const PATH_DESC: &str = "stats/desc";
const PATH_AGGREGATE_FLOW: &str = "stats/aggregateflow";
const PATH_FLOW_ENTRY_ADD: &str = "stats/flowentry/add";
const PATH_FLOW_ENTRY_DELETE: &str = "stats/flowentry/delete";

#[derive(Deserialize)]
struct SwitchIdReply(#[serde(deserialize_with = "u64_or_string")] u64);

#[derive(Debug, Clone)]
/// Typed client of the controller REST API.
///
/// Transport and shape normalization only: no retry, no interpretation.
/// Every request is bounded by [SouthboundConfig::request_timeout_ms].
pub struct SouthboundClient {
    http: reqwest::Client,
    base_url: Url,
}

impl SouthboundClient {
    pub fn new(config: &SouthboundConfig) -> Result<Self, SdnError> {
        let mut url = config.url.trim().to_string();
        // Without trailing slash, Url::join() replaces the last path segment
        if !url.ends_with('/') {
            url.push('/');
        }
        let base_url = Url::parse(&url).map_err(|e| {
            SdnError::new(
                ErrorKind::InvalidArgument,
                format!("Invalid controller URL {}: {e}", config.url),
            )
        })?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn list_switches(&self) -> Result<Vec<u64>, SdnError> {
        let ids: Vec<SwitchIdReply> = self.get_array(PATH_SWITCHES).await?;
        Ok(ids.into_iter().map(|i| i.0).collect())
    }

    pub async fn get_topology_links(&self) -> Result<Vec<Link>, SdnError> {
        self.get_array(PATH_TOPOLOGY_LINKS).await
    }

    pub async fn get_topology_hosts(&self) -> Result<Vec<Host>, SdnError> {
        self.get_array(PATH_TOPOLOGY_HOSTS).await
    }

    /// The controller may wrap entries under the dpid key, the reply shape
    /// is resolved here into [FlowTableReply].
    pub async fn get_switch_flow_table(
        &self,
        switch_id: u64,
    ) -> Result<FlowTableReply, SdnError> {
        let value = self.get_value(&format!("{PATH_FLOW}/{switch_id}")).await?;
        FlowTableReply::from_value(value)
    }

    pub async fn get_switch_descriptor(
        &self,
        switch_id: u64,
    ) -> Result<BTreeMap<String, SwitchDescriptor>, SdnError> {
        let value = self.get_value(&format!("{PATH_DESC}/{switch_id}")).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn get_switch_aggregate(
        &self,
        switch_id: u64,
    ) -> Result<BTreeMap<String, Vec<AggregateFlowStats>>, SdnError> {
        let value = self
            .get_value(&format!("{PATH_AGGREGATE_FLOW}/{switch_id}"))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Install a flow entry. The `dpid` of the entry is always replaced by
    /// `switch_id`.
    pub async fn add_flow_entry(
        &self,
        switch_id: u64,
        entry: &FlowEntry,
    ) -> Result<(), SdnError> {
        let mut entry = entry.clone();
        entry.dpid = Some(switch_id);
        self.post(PATH_FLOW_ENTRY_ADD, &entry).await
    }

    /// Delete flow entries matching the request. The `dpid` of the request
    /// is always replaced by `switch_id`.
    pub async fn delete_flow_entry(
        &self,
        switch_id: u64,
        request: &FlowDeleteRequest,
    ) -> Result<(), SdnError> {
        let mut request = request.clone();
        request.dpid = switch_id;
        self.post(PATH_FLOW_ENTRY_DELETE, &request).await
    }

    fn url(&self, path: &str) -> Result<Url, SdnError> {
        self.base_url.join(path).map_err(|e| {
            SdnError::new(
                ErrorKind::InvalidArgument,
                format!("Invalid request path {path}: {e}"),
            )
        })
    }

    async fn get_value(&self, path: &str) -> Result<Value, SdnError> {
        let url = self.url(path)?;
        log::debug!("GET {url}");
        let reply = self
            .http
            .get(url.clone())
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await?;
        let reply = check_status(Method::GET, &url, reply).await?;
        Ok(reply.json::<Value>().await?)
    }

    async fn get_array<T>(&self, path: &str) -> Result<Vec<T>, SdnError>
    where
        T: DeserializeOwned,
    {
        let value = self.get_value(path).await?;
        if !value.is_array() {
            return Err(SdnError::new(
                ErrorKind::SchemaViolation,
                format!("Expecting array from {path}, but got {value}"),
            ));
        }
        Ok(serde_json::from_value(value)?)
    }

    async fn post<T>(&self, path: &str, body: &T) -> Result<(), SdnError>
    where
        T: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        if log::log_enabled!(log::Level::Debug) {
            log::debug!(
                "POST {url} {}",
                serde_json::to_string(body).unwrap_or_default()
            );
        }
        let reply = self
            .http
            .post(url.clone())
            .header(CACHE_CONTROL, "no-store")
            .json(body)
            .send()
            .await?;
        check_status(Method::POST, &url, reply).await?;
        Ok(())
    }
}

async fn check_status(
    method: Method,
    url: &Url,
    reply: reqwest::Response,
) -> Result<reqwest::Response, SdnError> {
    let status = reply.status();
    if status.is_success() {
        Ok(reply)
    } else {
        let body = reply.text().await.unwrap_or_default();
        let e = SdnError::new(
            ErrorKind::UpstreamError,
            format!("{method} {url} failed with {status}: {}", body.trim()),
        );
        log::debug!("{e}");
        Err(e)
    }
}
