// Copyright 2023-, Edge & Node, GraphOps, and Semiotic Labs.
// SPDX-License-Identifier: Apache-2.0

use std::{collections::HashMap, time::Duration};

use artblocks_contract::CoreContract;
use artblocks_query::core_contracts::{self, CoreContracts};
use thegraph_core::alloy::primitives::Address;
use tokio::sync::watch::Receiver;

use crate::{client::SubgraphClient, watcher::new_watcher};

/// Receiver of the map from contract address to core contract
pub type CoreContractsWatcher = Receiver<HashMap<Address, CoreContract>>;

/// An always up-to-date view of the core contracts registered in the
/// Art Blocks subgraph.
pub async fn core_contracts(
    subgraph: &'static SubgraphClient,
    interval: Duration,
    page_size: u32,
) -> anyhow::Result<CoreContractsWatcher> {
    new_watcher(interval, move || fetch_core_contracts(subgraph, page_size)).await
}

async fn fetch_core_contracts(
    subgraph: &'static SubgraphClient,
    page_size: u32,
) -> anyhow::Result<HashMap<Address, CoreContract>> {
    let page_size = i64::from(page_size);
    let mut contracts = HashMap::new();
    let mut skip = 0;

    loop {
        let data = subgraph
            .query::<CoreContracts, _>(core_contracts::Variables {
                first: page_size,
                skip,
            })
            .await?;

        let page_len = data.contracts.len();
        for node in data.contracts {
            let id = node.id.clone();
            match CoreContract::try_from(node) {
                Ok(contract) => {
                    contracts.insert(contract.address, contract);
                }
                // one malformed entity must not wedge the whole watcher
                Err(err) => {
                    tracing::warn!(contract = %id, error = %err, "Skipping unparseable core contract")
                }
            }
        }

        if (page_len as i64) < page_size {
            break;
        }
        skip += page_size;
    }

    Ok(contracts)
}

#[cfg(test)]
mod tests {
    use artblocks_contract::ContractType;
    use artblocks_test_assets::{
        contracts_page, core_contract_node, CORE_V0_ADDRESS, CORE_V1_ADDRESS, CORE_V3_ADDRESS,
    };
    use wiremock::{
        matchers::{body_partial_json, method},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;
    use crate::client::DeploymentDetails;

    async fn static_client(mock_server: &MockServer) -> &'static SubgraphClient {
        let client = SubgraphClient::new(
            reqwest::Client::new(),
            None,
            DeploymentDetails::for_query_url(&mock_server.uri()).unwrap(),
        )
        .await
        .unwrap();
        Box::leak(Box::new(client))
    }

    #[tokio::test]
    async fn test_pages_through_all_contracts() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "variables": { "first": 2, "skip": 0 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(contracts_page(&[
                core_contract_node(CORE_V0_ADDRESS, "GenArt721CoreV0"),
                core_contract_node(CORE_V1_ADDRESS, "GenArt721CoreV1"),
            ])))
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "variables": { "first": 2, "skip": 2 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(contracts_page(&[
                core_contract_node(CORE_V3_ADDRESS, "GenArt721CoreV3"),
            ])))
            .mount(&mock_server)
            .await;

        let subgraph = static_client(&mock_server).await;
        let contracts = fetch_core_contracts(subgraph, 2).await.unwrap();

        assert_eq!(contracts.len(), 3);
        assert_eq!(
            contracts[&CORE_V3_ADDRESS].contract_type,
            ContractType::GenArt721CoreV3
        );
    }

    #[tokio::test]
    async fn test_unknown_contract_types_are_skipped() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(contracts_page(&[
                core_contract_node(CORE_V0_ADDRESS, "GenArt721CoreV0"),
                core_contract_node(CORE_V1_ADDRESS, "GenArt721CoreV99"),
            ])))
            .mount(&mock_server)
            .await;

        let subgraph = static_client(&mock_server).await;
        let contracts = fetch_core_contracts(subgraph, 10).await.unwrap();

        assert_eq!(contracts.len(), 1);
        assert!(contracts.contains_key(&CORE_V0_ADDRESS));
    }
}
