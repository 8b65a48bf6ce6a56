// Copyright 2023-, Edge & Node, GraphOps, and Semiotic Labs.
// SPDX-License-Identifier: Apache-2.0

use graphql_client::GraphQLQuery;
use reqwest::header;
use thiserror::Error;
use url::Url;

const USER_AGENT: &str = concat!("artblocks-sync/", env!("CARGO_PKG_VERSION"));

/// Hasura authenticates privileged clients through this header rather than
/// a bearer token.
const HASURA_ADMIN_SECRET_HEADER: &str = "x-hasura-admin-secret";

#[derive(Debug, Error)]
pub enum MetadataClientError {
    #[error("Failed to reach the metadata endpoint: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Metadata endpoint returned errors: {0:?}")]
    GraphQl(Vec<graphql_client::Error>),
    #[error("Metadata endpoint returned a partial response: {0:?}")]
    PartialResponse(Vec<graphql_client::Error>),
    #[error("Metadata endpoint returned neither data nor errors")]
    EmptyResponse,
}

/// Execution client for the Hasura-backed metadata database.
///
/// This client only guarantees shape agreement between variables and
/// response through the typed documents it executes; retries and batching
/// are up to the caller.
#[derive(Clone, Debug, bon::Builder)]
pub struct MetadataClient {
    #[builder(default)]
    http_client: reqwest::Client,
    endpoint: Url,
    admin_secret: Option<String>,
}

impl MetadataClient {
    pub async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, MetadataClientError> {
        let body = Q::build_query(variables);
        let mut req = self
            .http_client
            .post(self.endpoint.clone())
            .header(header::USER_AGENT, USER_AGENT)
            .json(&body);

        if let Some(secret) = self.admin_secret.as_ref() {
            req = req.header(HASURA_ADMIN_SECRET_HEADER, secret);
        }

        let response: graphql_client::Response<Q::ResponseData> =
            req.send().await?.error_for_status()?.json().await?;

        match (response.data, response.errors) {
            (Some(data), None) => Ok(data),
            (Some(_), Some(errors)) => Err(MetadataClientError::PartialResponse(errors)),
            (None, Some(errors)) => Err(MetadataClientError::GraphQl(errors)),
            (None, None) => Err(MetadataClientError::EmptyResponse),
        }
    }
}
