// Copyright 2023-, Edge & Node, GraphOps, and Semiotic Labs.
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use artblocks_query::{deployment_status_query, DeploymentStatusQuery};
use graphql_client::GraphQLQuery;
use reqwest::Url;
use thegraph_core::DeploymentId;
use tokio::sync::watch::Receiver;

use crate::watcher::new_watcher;

const STATUS_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Health of a subgraph deployment on a local graph-node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DeploymentStatus {
    pub synced: bool,
    pub healthy: bool,
}

impl DeploymentStatus {
    pub fn is_queryable(&self) -> bool {
        self.synced && self.healthy
    }
}

pub async fn monitor_deployment_status(
    deployment: DeploymentId,
    status_url: Url,
) -> anyhow::Result<Receiver<DeploymentStatus>> {
    new_watcher(STATUS_POLL_INTERVAL, move || {
        check_deployment_status(deployment, status_url.clone())
    })
    .await
}

pub async fn check_deployment_status(
    deployment: DeploymentId,
    status_url: Url,
) -> anyhow::Result<DeploymentStatus> {
    let req_body = DeploymentStatusQuery::build_query(deployment_status_query::Variables {
        ids: vec![deployment.to_string()],
    });
    let client = reqwest::Client::new();
    let response = client.post(status_url).json(&req_body).send().await?;
    let graphql_response: graphql_client::Response<deployment_status_query::ResponseData> =
        response.json().await?;

    let data = graphql_response
        .data
        .ok_or_else(|| anyhow::anyhow!("Failed to query status of deployment `{deployment}`"))?;

    data.indexing_statuses
        .first()
        .map(|status| DeploymentStatus {
            synced: status.synced,
            healthy: matches!(status.health, deployment_status_query::Health::healthy),
        })
        .ok_or_else(|| anyhow::anyhow!("Deployment `{deployment}` not found"))
}
