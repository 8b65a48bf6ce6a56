// Copyright 2023-, Edge & Node, GraphOps, and Semiotic Labs.
// SPDX-License-Identifier: Apache-2.0

//! Shared fixtures for monitor and sync tests: well-known contract
//! addresses and canned GraphQL response bodies for wiremock servers.

use serde_json::{json, Value};
use thegraph_core::{
    alloy::primitives::{address, Address},
    deployment_id, DeploymentId,
};

/// The mainnet GenArt721CoreV0 contract
pub const CORE_V0_ADDRESS: Address = address!("059EDD72Cd353dF5106D2B9cC5ab83a52287aC3a");

/// The mainnet GenArt721CoreV1 contract
pub const CORE_V1_ADDRESS: Address = address!("a7d8d9ef8D8Ce8992Df33D8b8CF4Aebabd5bD270");

/// The mainnet GenArt721CoreV3 contract
pub const CORE_V3_ADDRESS: Address = address!("99a9B7c1116f9ceEB1652de04d5969CcE509B069");

/// Render provider (Art Blocks) payout address used across fixtures
pub const RENDER_PROVIDER_ADDRESS: Address = address!("f7A55108A6E830a809e88e74cBf5f5DE9D930153");

pub const SUBGRAPH_DEPLOYMENT: DeploymentId =
    deployment_id!("QmAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA");

/// A `contracts` node as the Art Blocks subgraph returns it.
pub fn core_contract_node(contract_address: Address, contract_type: &str) -> Value {
    json!({
        "id": contract_address.to_string().to_lowercase(),
        "type": contract_type,
        "renderProviderAddress": RENDER_PROVIDER_ADDRESS.to_string().to_lowercase(),
        "renderProviderPercentage": "10",
        "newProjectsForbidden": false,
        "updatedAt": "1702400000"
    })
}

pub fn contracts_page(contracts: &[Value]) -> Value {
    json!({ "data": { "contracts": contracts } })
}

/// A `contracts_metadata` row as Hasura returns it through the
/// three-column fragments.
pub fn metadata_row(contract_address: Address, bucket_name: Option<&str>, contract_type: &str) -> Value {
    json!({
        "address": contract_address.to_string(),
        "bucket_name": bucket_name,
        "contract_type": contract_type
    })
}

pub fn metadata_details_response(rows: &[Value]) -> Value {
    json!({ "data": { "contracts_metadata": rows } })
}

pub fn insert_metadata_response(rows: &[Value]) -> Value {
    json!({ "data": { "insert_contracts_metadata": { "returning": rows } } })
}

pub fn indexing_statuses_response(synced: bool, health: &str) -> Value {
    json!({
        "data": {
            "indexingStatuses": [
                { "synced": synced, "health": health }
            ]
        }
    })
}
