// Copyright 2023-, Edge & Node, GraphOps, and Semiotic Labs.
// SPDX-License-Identifier: Apache-2.0

//! Domain types for Art Blocks core contracts and their off-chain metadata
//! rows, plus conversions from the generated GraphQL types.
//!
//! `graphql_client` generates one set of types per operation document, so the
//! same schema enum (`contract_type_names_enum`) and the same fragment shape
//! exist once per module. The shared types here are the single place both
//! sides convert into, which keeps field-identical fragments interchangeable.

use std::{fmt, str::FromStr};

use artblocks_query::{core_contracts, insert_contracts_metadata};
use thegraph_core::alloy::primitives::Address;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetadataError {
    #[error("invalid contract address `{0}`")]
    InvalidAddress(String),
    #[error("unknown contract type `{0}`")]
    UnknownContractType(String),
    #[error("invalid big integer `{0}`")]
    InvalidBigInt(String),
}

/// Core contract version tags, spelled exactly as the
/// `contract_type_names_enum` table stores them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContractType {
    GenArt721CoreV0,
    GenArt721CoreV1,
    GenArt721CoreV2EngineFlex,
    GenArt721CoreV2Pbab,
    GenArt721CoreV3,
    GenArt721CoreV3Engine,
    GenArt721CoreV3EngineFlex,
    GenArt721CoreV3Explorations,
}

impl ContractType {
    pub const ALL: [ContractType; 8] = [
        ContractType::GenArt721CoreV0,
        ContractType::GenArt721CoreV1,
        ContractType::GenArt721CoreV2EngineFlex,
        ContractType::GenArt721CoreV2Pbab,
        ContractType::GenArt721CoreV3,
        ContractType::GenArt721CoreV3Engine,
        ContractType::GenArt721CoreV3EngineFlex,
        ContractType::GenArt721CoreV3Explorations,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContractType::GenArt721CoreV0 => "GenArt721CoreV0",
            ContractType::GenArt721CoreV1 => "GenArt721CoreV1",
            ContractType::GenArt721CoreV2EngineFlex => "GenArt721CoreV2_ENGINE_FLEX",
            ContractType::GenArt721CoreV2Pbab => "GenArt721CoreV2_PBAB",
            ContractType::GenArt721CoreV3 => "GenArt721CoreV3",
            ContractType::GenArt721CoreV3Engine => "GenArt721CoreV3_Engine",
            ContractType::GenArt721CoreV3EngineFlex => "GenArt721CoreV3_Engine_Flex",
            ContractType::GenArt721CoreV3Explorations => "GenArt721CoreV3_Explorations",
        }
    }

    /// Engine cores are third-party deployments (the PBAB line and the V3
    /// engine line), as opposed to the flagship cores.
    pub fn is_engine(&self) -> bool {
        matches!(
            self,
            ContractType::GenArt721CoreV2EngineFlex
                | ContractType::GenArt721CoreV2Pbab
                | ContractType::GenArt721CoreV3Engine
                | ContractType::GenArt721CoreV3EngineFlex
        )
    }

    /// Flex cores support external asset dependencies.
    pub fn is_flex(&self) -> bool {
        matches!(
            self,
            ContractType::GenArt721CoreV2EngineFlex | ContractType::GenArt721CoreV3EngineFlex
        )
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractType {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GenArt721CoreV0" => Ok(ContractType::GenArt721CoreV0),
            "GenArt721CoreV1" => Ok(ContractType::GenArt721CoreV1),
            "GenArt721CoreV2_ENGINE_FLEX" => Ok(ContractType::GenArt721CoreV2EngineFlex),
            "GenArt721CoreV2_PBAB" => Ok(ContractType::GenArt721CoreV2Pbab),
            "GenArt721CoreV3" => Ok(ContractType::GenArt721CoreV3),
            "GenArt721CoreV3_Engine" => Ok(ContractType::GenArt721CoreV3Engine),
            "GenArt721CoreV3_Engine_Flex" => Ok(ContractType::GenArt721CoreV3EngineFlex),
            "GenArt721CoreV3_Explorations" => Ok(ContractType::GenArt721CoreV3Explorations),
            other => Err(MetadataError::UnknownContractType(other.to_string())),
        }
    }
}

// `graphql_client` regenerates the schema enum once per derive module, so the
// exchange impls are stamped out per generated type.
macro_rules! impl_contract_type_wire {
    ($($wire:ident)::+) => {
        impl From<ContractType> for $($wire)::+ {
            fn from(value: ContractType) -> Self {
                match value {
                    ContractType::GenArt721CoreV0 => $($wire)::+::GenArt721CoreV0,
                    ContractType::GenArt721CoreV1 => $($wire)::+::GenArt721CoreV1,
                    ContractType::GenArt721CoreV2EngineFlex => {
                        $($wire)::+::GenArt721CoreV2_ENGINE_FLEX
                    }
                    ContractType::GenArt721CoreV2Pbab => $($wire)::+::GenArt721CoreV2_PBAB,
                    ContractType::GenArt721CoreV3 => $($wire)::+::GenArt721CoreV3,
                    ContractType::GenArt721CoreV3Engine => $($wire)::+::GenArt721CoreV3_Engine,
                    ContractType::GenArt721CoreV3EngineFlex => {
                        $($wire)::+::GenArt721CoreV3_Engine_Flex
                    }
                    ContractType::GenArt721CoreV3Explorations => {
                        $($wire)::+::GenArt721CoreV3_Explorations
                    }
                }
            }
        }

        impl TryFrom<$($wire)::+> for ContractType {
            type Error = MetadataError;

            fn try_from(value: $($wire)::+) -> Result<Self, Self::Error> {
                match value {
                    $($wire)::+::GenArt721CoreV0 => Ok(ContractType::GenArt721CoreV0),
                    $($wire)::+::GenArt721CoreV1 => Ok(ContractType::GenArt721CoreV1),
                    $($wire)::+::GenArt721CoreV2_ENGINE_FLEX => {
                        Ok(ContractType::GenArt721CoreV2EngineFlex)
                    }
                    $($wire)::+::GenArt721CoreV2_PBAB => Ok(ContractType::GenArt721CoreV2Pbab),
                    $($wire)::+::GenArt721CoreV3 => Ok(ContractType::GenArt721CoreV3),
                    $($wire)::+::GenArt721CoreV3_Engine => Ok(ContractType::GenArt721CoreV3Engine),
                    $($wire)::+::GenArt721CoreV3_Engine_Flex => {
                        Ok(ContractType::GenArt721CoreV3EngineFlex)
                    }
                    $($wire)::+::GenArt721CoreV3_Explorations => {
                        Ok(ContractType::GenArt721CoreV3Explorations)
                    }
                    $($wire)::+::Other(other) => Err(MetadataError::UnknownContractType(other)),
                }
            }
        }
    };
}

impl_contract_type_wire!(artblocks_query::core_contracts::CoreType);
impl_contract_type_wire!(artblocks_query::insert_contracts_metadata::contract_type_names_enum);
impl_contract_type_wire!(artblocks_query::contracts_metadata_details::contract_type_names_enum);
impl_contract_type_wire!(artblocks_query::contracts_metadata_by_address::contract_type_names_enum);

/// One row of the `contracts_metadata` table, restricted to the columns the
/// upsert mutation reads and writes. `address` is the primary key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractMetadata {
    pub address: Address,
    pub bucket_name: Option<String>,
    pub contract_type: ContractType,
}

impl ContractMetadata {
    pub fn new(address: Address, contract_type: ContractType) -> Self {
        Self {
            address,
            bucket_name: None,
            contract_type,
        }
    }

    pub fn with_bucket_name(mut self, bucket_name: impl Into<String>) -> Self {
        self.bucket_name = Some(bucket_name.into());
        self
    }

    /// Insert-input row for the upsert mutation. Columns outside the three
    /// the mutation updates stay unset and are never sent on the wire.
    pub fn to_insert_input(&self) -> insert_contracts_metadata::contracts_metadata_insert_input {
        insert_contracts_metadata::contracts_metadata_insert_input {
            address: Some(self.address.to_string()),
            admin: None,
            bucket_name: self.bucket_name.clone(),
            contract_type: Some(self.contract_type.into()),
            created_at: None,
            minter_filter_address: None,
            render_provider_address: None,
            render_provider_percentage: None,
            updated_at: None,
        }
    }
}

// Both metadata fragments and the by-pk lookup select the same three
// columns; converting each generated shape into `ContractMetadata` is what
// makes them interchangeable.
macro_rules! impl_metadata_row {
    ($($row:ident)::+) => {
        impl TryFrom<$($row)::+> for ContractMetadata {
            type Error = MetadataError;

            fn try_from(row: $($row)::+) -> Result<Self, Self::Error> {
                Ok(Self {
                    address: parse_address(&row.address)?,
                    bucket_name: row.bucket_name,
                    contract_type: ContractType::try_from(row.contract_type)?,
                })
            }
        }
    };
}

impl_metadata_row!(artblocks_query::insert_contracts_metadata::InsertContractsMetaResponse);
impl_metadata_row!(artblocks_query::contracts_metadata_details::ContractMetadataUpdateInfo);
impl_metadata_row!(
    artblocks_query::contracts_metadata_by_address::ContractsMetadataByAddressContractsMetadataByPk
);

/// A core contract as observed on chain through the subgraph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoreContract {
    pub address: Address,
    pub contract_type: ContractType,
    pub render_provider_address: Address,
    pub render_provider_percentage: u64,
    pub new_projects_forbidden: bool,
    pub updated_at: u64,
}

impl TryFrom<core_contracts::CoreContractsContracts> for CoreContract {
    type Error = MetadataError;

    fn try_from(value: core_contracts::CoreContractsContracts) -> Result<Self, Self::Error> {
        Ok(Self {
            address: parse_address(&value.id)?,
            // graphql_client renames the reserved `type` field to `type_`
            contract_type: ContractType::try_from(value.type_)?,
            render_provider_address: parse_address(&value.render_provider_address)?,
            render_provider_percentage: parse_big_int(&value.render_provider_percentage)?,
            new_projects_forbidden: value.new_projects_forbidden,
            updated_at: parse_big_int(&value.updated_at)?,
        })
    }
}

fn parse_address(raw: &str) -> Result<Address, MetadataError> {
    raw.parse()
        .map_err(|_| MetadataError::InvalidAddress(raw.to_string()))
}

fn parse_big_int(raw: &str) -> Result<u64, MetadataError> {
    raw.parse()
        .map_err(|_| MetadataError::InvalidBigInt(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use artblocks_query::{contracts_metadata_details, insert_contracts_metadata};
    use serde_json::json;
    use thegraph_core::alloy::primitives::address;

    use super::*;

    const CORE_V3: Address = address!("99a9B7c1116f9ceEB1652de04d5969CcE509B069");

    #[test]
    fn contract_type_round_trips_through_wire_spelling() {
        for contract_type in ContractType::ALL {
            let parsed: ContractType = contract_type.as_str().parse().unwrap();
            assert_eq!(parsed, contract_type);
        }
    }

    #[test]
    fn contract_type_serializes_to_enum_table_value() {
        for contract_type in ContractType::ALL {
            let wire: insert_contracts_metadata::contract_type_names_enum = contract_type.into();
            assert_eq!(serde_json::to_value(&wire).unwrap(), json!(contract_type.as_str()));

            let back = ContractType::try_from(wire).unwrap();
            assert_eq!(back, contract_type);
        }
    }

    #[test]
    fn unknown_contract_type_is_rejected() {
        let wire =
            insert_contracts_metadata::contract_type_names_enum::Other("GenArt999".to_string());
        assert_eq!(
            ContractType::try_from(wire),
            Err(MetadataError::UnknownContractType("GenArt999".to_string()))
        );
    }

    #[test]
    fn field_identical_fragments_are_interchangeable() {
        // The mutation document and the details query each declare their own
        // three-field fragment on contracts_metadata. The same response row
        // must decode through either one into the same domain value.
        let row = json!({
            "address": CORE_V3.to_string(),
            "bucket_name": "genart721corev3-mainnet",
            "contract_type": "GenArt721CoreV3"
        });

        let from_insert: insert_contracts_metadata::InsertContractsMetaResponse =
            serde_json::from_value(row.clone()).unwrap();
        let from_details: contracts_metadata_details::ContractMetadataUpdateInfo =
            serde_json::from_value(row).unwrap();

        let left = ContractMetadata::try_from(from_insert).unwrap();
        let right = ContractMetadata::try_from(from_details).unwrap();
        assert_eq!(left, right);
        assert_eq!(left.address, CORE_V3);
        assert_eq!(left.bucket_name.as_deref(), Some("genart721corev3-mainnet"));
        assert_eq!(left.contract_type, ContractType::GenArt721CoreV3);
    }

    #[test]
    fn insert_input_only_carries_upsert_columns() {
        let row = ContractMetadata::new(CORE_V3, ContractType::GenArt721CoreV3)
            .with_bucket_name("genart721corev3-mainnet");

        let input = row.to_insert_input();
        let value = serde_json::to_value(&input).unwrap();

        // skip_serializing_none keeps unset columns off the wire entirely
        assert_eq!(
            value,
            json!({
                "address": CORE_V3.to_string(),
                "bucket_name": "genart721corev3-mainnet",
                "contract_type": "GenArt721CoreV3"
            })
        );
    }

    #[test]
    fn core_contract_parses_subgraph_node() {
        let node = core_contracts::CoreContractsContracts {
            id: "0x99a9b7c1116f9ceeb1652de04d5969cce509b069".to_string(),
            type_: core_contracts::CoreType::GenArt721CoreV3,
            render_provider_address: "0xf7a55108a6e830a809e88e74cbf5f5de9d930153".to_string(),
            render_provider_percentage: "10".to_string(),
            new_projects_forbidden: false,
            updated_at: "1702400000".to_string(),
        };

        let contract = CoreContract::try_from(node).unwrap();
        assert_eq!(contract.address, CORE_V3);
        assert_eq!(contract.contract_type, ContractType::GenArt721CoreV3);
        assert_eq!(contract.render_provider_percentage, 10);
        assert!(!contract.new_projects_forbidden);
    }

    #[test]
    fn malformed_address_is_rejected() {
        let node = core_contracts::CoreContractsContracts {
            id: "not-an-address".to_string(),
            type_: core_contracts::CoreType::GenArt721CoreV0,
            render_provider_address: "0xf7a55108a6e830a809e88e74cbf5f5de9d930153".to_string(),
            render_provider_percentage: "10".to_string(),
            new_projects_forbidden: false,
            updated_at: "0".to_string(),
        };

        assert_eq!(
            CoreContract::try_from(node),
            Err(MetadataError::InvalidAddress("not-an-address".to_string()))
        );
    }
}
