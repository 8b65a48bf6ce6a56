// Copyright 2023-, Edge & Node, GraphOps, and Semiotic Labs.
// SPDX-License-Identifier: Apache-2.0

use artblocks_contract::{ContractMetadata, MetadataError};
use artblocks_monitor::{MetadataClient, MetadataClientError};
use artblocks_query::contracts_metadata_by_address::{self, ContractsMetadataByAddress};
use artblocks_query::contracts_metadata_details::{self, ContractsMetadataDetails};
use artblocks_query::insert_contracts_metadata::{self, InsertContractsMetadata};
use async_trait::async_trait;
use itertools::Itertools;
use thegraph_core::alloy::primitives::Address;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Client(#[from] MetadataClientError),
    #[error("The upsert mutation returned no payload")]
    MissingPayload,
    #[error("Stored row could not be decoded: {0}")]
    InvalidRow(#[from] MetadataError),
}

/// Store of `contracts_metadata` rows.
#[async_trait]
pub trait ContractsMetadataStore {
    async fn list(&self) -> Result<Vec<ContractMetadata>, StoreError>;

    async fn get(&self, address: Address) -> Result<Option<ContractMetadata>, StoreError>;

    /// Upserts the given rows in one call. A collision on the address
    /// primary key overwrites `bucket_name` and `contract_type` in place
    /// (plus a no-op rewrite of `address` itself); every other stored
    /// column is left untouched. Returns one row per distinct address,
    /// freshly inserted and updated alike.
    async fn upsert_many(
        &self,
        rows: Vec<ContractMetadata>,
    ) -> Result<Vec<ContractMetadata>, StoreError>;
}

/// Store backed by the Hasura GraphQL layer in front of the metadata
/// database.
#[derive(Clone, Debug)]
pub struct HasuraContractsMetadataStore {
    client: MetadataClient,
}

impl HasuraContractsMetadataStore {
    pub fn new(client: MetadataClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ContractsMetadataStore for HasuraContractsMetadataStore {
    async fn list(&self) -> Result<Vec<ContractMetadata>, StoreError> {
        let data = self
            .client
            .execute::<ContractsMetadataDetails>(contracts_metadata_details::Variables {
                limit: None,
                offset: None,
            })
            .await?;

        data.contracts_metadata
            .into_iter()
            .map(|row| {
                ContractMetadata::try_from(row)
                    .map_err(StoreError::from)
            })
            .collect()
    }

    async fn get(&self, address: Address) -> Result<Option<ContractMetadata>, StoreError> {
        let data = self
            .client
            .execute::<ContractsMetadataByAddress>(contracts_metadata_by_address::Variables {
                address: address.to_string(),
            })
            .await?;

        data.contracts_metadata_by_pk
            .map(ContractMetadata::try_from)
            .transpose()
            .map_err(Into::into)
    }

    async fn upsert_many(
        &self,
        rows: Vec<ContractMetadata>,
    ) -> Result<Vec<ContractMetadata>, StoreError> {
        let rows = dedup_by_address(rows);
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let variables = insert_contracts_metadata::Variables {
            contracts_metadata: rows.iter().map(ContractMetadata::to_insert_input).collect(),
        };

        let data = self
            .client
            .execute::<InsertContractsMetadata>(variables)
            .await?;

        // insert_contracts_metadata is nullable to represent "the whole
        // operation did not return a payload"
        let response = data
            .insert_contracts_metadata
            .ok_or(StoreError::MissingPayload)?;

        response
            .returning
            .into_iter()
            .map(|row| {
                ContractMetadata::try_from(row)
                    .map_err(StoreError::from)
            })
            .collect()
    }
}

/// Collapses duplicate addresses keeping the last occurrence, so the
/// conflict target never sees the same key twice within one statement.
fn dedup_by_address(rows: Vec<ContractMetadata>) -> Vec<ContractMetadata> {
    let mut deduped: Vec<ContractMetadata> = rows
        .into_iter()
        .rev()
        .unique_by(|row| row.address)
        .collect();
    deduped.reverse();
    deduped
}
