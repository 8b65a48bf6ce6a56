// Copyright 2023-, Edge & Node, GraphOps, and Semiotic Labs.
// SPDX-License-Identifier: Apache-2.0

mod metadata_client;
mod monitor;
mod subgraph_client;

pub use metadata_client::{MetadataClient, MetadataClientError};
pub use subgraph_client::{DeploymentDetails, SubgraphClient};

use artblocks_config::{GraphNodeConfig, MetadataConfig, SubgraphConfig};

/// Creates a static reference to the Art Blocks subgraph client.
///
/// A local graph-node deployment is only used when both a graph-node and a
/// deployment id are configured; otherwise every query goes to the remote
/// endpoint directly.
pub async fn create_subgraph_client(
    http_client: reqwest::Client,
    graph_node: Option<&GraphNodeConfig>,
    subgraph_config: &SubgraphConfig,
) -> anyhow::Result<&'static SubgraphClient> {
    let local_deployment = match (graph_node, subgraph_config.deployment_id) {
        (Some(graph_node), Some(deployment)) => Some(DeploymentDetails::for_graph_node_url(
            graph_node.status_url.clone(),
            graph_node.query_url.clone(),
            deployment,
        )?),
        _ => None,
    };

    let client = SubgraphClient::new(
        http_client,
        local_deployment,
        DeploymentDetails::for_query_url_with_token(
            subgraph_config.query_url.clone(),
            subgraph_config.query_auth_token.clone(),
        ),
    )
    .await?;

    Ok(Box::leak(Box::new(client)))
}

/// Hasura execution client for the metadata database.
pub fn create_metadata_client(
    http_client: reqwest::Client,
    metadata: &MetadataConfig,
) -> MetadataClient {
    MetadataClient::builder()
        .http_client(http_client)
        .endpoint(metadata.endpoint.clone())
        .maybe_admin_secret(metadata.admin_secret.clone())
        .build()
}
