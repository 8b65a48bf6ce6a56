// Copyright 2023-, Edge & Node, GraphOps, and Semiotic Labs.
// SPDX-License-Identifier: Apache-2.0

use anyhow::anyhow;
use graphql_client::GraphQLQuery;
use reqwest::{header, Url};
use thegraph_core::DeploymentId;
use tokio::sync::watch::Receiver;
use tracing::warn;

use super::monitor::{monitor_deployment_status, DeploymentStatus};

const USER_AGENT: &str = concat!("artblocks-sync/", env!("CARGO_PKG_VERSION"));

/// Where a subgraph deployment can be queried, and how to decide whether
/// it is safe to do so.
#[derive(Debug, Clone)]
pub struct DeploymentDetails {
    deployment: Option<DeploymentId>,
    status_url: Option<Url>,
    query_url: Url,
    query_auth_token: Option<String>,
}

impl DeploymentDetails {
    /// A deployment on a local graph-node, gated by its indexing status.
    pub fn for_graph_node_url(
        graph_node_status_url: Url,
        graph_node_base_url: Url,
        deployment: DeploymentId,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            deployment: Some(deployment),
            status_url: Some(graph_node_status_url),
            query_url: graph_node_base_url.join(&format!("subgraphs/id/{deployment}"))?,
            query_auth_token: None,
        })
    }

    pub fn for_query_url(query_url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            deployment: None,
            status_url: None,
            query_url: Url::parse(query_url)?,
            query_auth_token: None,
        })
    }

    pub fn for_query_url_with_token(query_url: Url, query_auth_token: Option<String>) -> Self {
        Self {
            deployment: None,
            status_url: None,
            query_url,
            query_auth_token,
        }
    }
}

struct DeploymentClient {
    http_client: reqwest::Client,
    status: Option<Receiver<DeploymentStatus>>,
    query_url: Url,
    query_auth_token: Option<String>,
}

impl DeploymentClient {
    async fn new(http_client: reqwest::Client, details: DeploymentDetails) -> anyhow::Result<Self> {
        let status = match details.deployment.zip(details.status_url) {
            Some((deployment, url)) => Some(monitor_deployment_status(deployment, url).await?),
            None => None,
        };
        Ok(Self {
            http_client,
            status,
            query_url: details.query_url,
            query_auth_token: details.query_auth_token,
        })
    }

    async fn query<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> anyhow::Result<Q::ResponseData> {
        if let Some(ref status) = self.status {
            let deployment_status = *status.borrow();
            if !deployment_status.is_queryable() {
                return Err(anyhow!(
                    "Deployment `{}` is not synced or healthy enough to be queried",
                    self.query_url
                ));
            }
        }

        let body = Q::build_query(variables);
        let mut req = self
            .http_client
            .post(self.query_url.as_ref())
            .header(header::USER_AGENT, USER_AGENT)
            .json(&body);

        if let Some(token) = self.query_auth_token.as_ref() {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let response: graphql_client::Response<Q::ResponseData> =
            req.send().await?.error_for_status()?.json().await?;

        match (response.data, response.errors) {
            (Some(data), None) => Ok(data),
            (_, Some(errors)) => Err(anyhow!("Subgraph returned errors: {errors:?}")),
            (None, None) => Err(anyhow!(
                "Subgraph returned neither data nor errors, endpoint: {}",
                self.query_url
            )),
        }
    }
}

/// Client for a subgraph that prefers a local graph-node deployment and
/// falls back to a remote query endpoint when the local one is missing,
/// unhealthy, or lagging.
pub struct SubgraphClient {
    local_client: Option<DeploymentClient>,
    remote_client: DeploymentClient,
}

impl SubgraphClient {
    pub async fn new(
        http_client: reqwest::Client,
        local_deployment: Option<DeploymentDetails>,
        remote_deployment: DeploymentDetails,
    ) -> anyhow::Result<Self> {
        let local_client = match local_deployment {
            Some(details) => Some(DeploymentClient::new(http_client.clone(), details).await?),
            None => None,
        };
        Ok(Self {
            local_client,
            remote_client: DeploymentClient::new(http_client, remote_deployment).await?,
        })
    }

    pub async fn query<Q, V>(&self, variables: Q::Variables) -> anyhow::Result<Q::ResponseData>
    where
        Q: GraphQLQuery<Variables = V>,
        V: Clone,
    {
        // Try the local deployment first; on failure, log and fall back to
        // the remote endpoint with the same variables.
        if let Some(ref local_client) = self.local_client {
            match local_client.query::<Q>(variables.clone()).await {
                Ok(response) => return Ok(response),
                Err(err) => warn!(
                    local = %local_client.query_url,
                    error = %err,
                    "Local subgraph deployment failed, trying remote endpoint next"
                ),
            }
        }

        self.remote_client.query::<Q>(variables).await.map_err(|err| {
            warn!(
                remote = %self.remote_client.query_url,
                error = %err,
                "Remote subgraph endpoint failed"
            );
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use artblocks_query::core_contracts::{self, CoreContracts};
    use artblocks_test_assets::{
        contracts_page, core_contract_node, indexing_statuses_response, CORE_V0_ADDRESS,
        CORE_V3_ADDRESS, SUBGRAPH_DEPLOYMENT,
    };
    use wiremock::{
        matchers::{header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    struct FallbackMocks {
        status: MockServer,
        local: MockServer,
        remote: MockServer,
    }

    async fn fallback_mocks(synced: bool, health: &str) -> FallbackMocks {
        let status = MockServer::start().await;
        status
            .register(Mock::given(method("POST")).respond_with(
                ResponseTemplate::new(200).set_body_json(indexing_statuses_response(synced, health)),
            ))
            .await;

        let local = MockServer::start().await;
        local
            .register(
                Mock::given(method("POST"))
                    .and(path(format!("/subgraphs/id/{SUBGRAPH_DEPLOYMENT}")))
                    .respond_with(ResponseTemplate::new(200).set_body_json(contracts_page(&[
                        core_contract_node(CORE_V0_ADDRESS, "GenArt721CoreV0"),
                    ]))),
            )
            .await;

        let remote = MockServer::start().await;
        remote
            .register(
                Mock::given(method("POST"))
                    .and(path(format!("/subgraphs/id/{SUBGRAPH_DEPLOYMENT}")))
                    .respond_with(ResponseTemplate::new(200).set_body_json(contracts_page(&[
                        core_contract_node(CORE_V3_ADDRESS, "GenArt721CoreV3"),
                    ]))),
            )
            .await;

        FallbackMocks {
            status,
            local,
            remote,
        }
    }

    async fn fallback_client(mocks: &FallbackMocks) -> SubgraphClient {
        SubgraphClient::new(
            reqwest::Client::new(),
            Some(
                DeploymentDetails::for_graph_node_url(
                    mocks.status.uri().parse().unwrap(),
                    mocks.local.uri().parse().unwrap(),
                    SUBGRAPH_DEPLOYMENT,
                )
                .unwrap(),
            ),
            DeploymentDetails::for_query_url(&format!(
                "{}/subgraphs/id/{SUBGRAPH_DEPLOYMENT}",
                mocks.remote.uri()
            ))
            .unwrap(),
        )
        .await
        .unwrap()
    }

    async fn first_contract_id(client: &SubgraphClient) -> String {
        let data = client
            .query::<CoreContracts, _>(core_contracts::Variables { first: 10, skip: 0 })
            .await
            .expect("query should succeed");
        data.contracts.first().expect("one contract").id.clone()
    }

    #[test_log::test(tokio::test)]
    async fn test_uses_local_deployment_if_healthy_and_synced() {
        let mocks = fallback_mocks(true, "healthy").await;
        let client = fallback_client(&mocks).await;

        let id = first_contract_id(&client).await;
        assert_eq!(id, CORE_V0_ADDRESS.to_string().to_lowercase());
    }

    #[test_log::test(tokio::test)]
    async fn test_uses_query_url_if_local_deployment_is_unhealthy() {
        let mocks = fallback_mocks(true, "failed").await;
        let client = fallback_client(&mocks).await;

        let id = first_contract_id(&client).await;
        assert_eq!(id, CORE_V3_ADDRESS.to_string().to_lowercase());
    }

    #[test_log::test(tokio::test)]
    async fn test_uses_query_url_if_local_deployment_is_not_synced() {
        let mocks = fallback_mocks(false, "healthy").await;
        let client = fallback_client(&mocks).await;

        let id = first_contract_id(&client).await;
        assert_eq!(id, CORE_V3_ADDRESS.to_string().to_lowercase());
    }

    #[test_log::test(tokio::test)]
    async fn test_sends_bearer_token_to_remote_endpoint() {
        let remote = MockServer::start().await;
        remote
            .register(
                Mock::given(method("POST"))
                    .and(header("authorization", "Bearer secret-token"))
                    .respond_with(ResponseTemplate::new(200).set_body_json(contracts_page(&[]))),
            )
            .await;

        let client = SubgraphClient::new(
            reqwest::Client::new(),
            None,
            DeploymentDetails::for_query_url_with_token(
                remote.uri().parse().unwrap(),
                Some("secret-token".to_string()),
            ),
        )
        .await
        .unwrap();

        let data = client
            .query::<CoreContracts, _>(core_contracts::Variables { first: 10, skip: 0 })
            .await
            .expect("authorized query should succeed");
        assert!(data.contracts.is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_graphql_errors_are_surfaced() {
        let remote = MockServer::start().await;
        remote
            .register(Mock::given(method("POST")).respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "errors": [{ "message": "no block with that number" }]
                })),
            ))
            .await;

        let client = SubgraphClient::new(
            reqwest::Client::new(),
            None,
            DeploymentDetails::for_query_url(&remote.uri()).unwrap(),
        )
        .await
        .unwrap();

        let result = client
            .query::<CoreContracts, _>(core_contracts::Variables { first: 10, skip: 0 })
            .await;
        assert!(result.is_err());
    }
}
