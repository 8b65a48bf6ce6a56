// Copyright 2023-, Edge & Node, GraphOps, and Semiotic Labs.
// SPDX-License-Identifier: Apache-2.0

mod client;
mod contracts;
pub mod watcher;

pub use crate::{
    client::{
        create_metadata_client, create_subgraph_client, DeploymentDetails, MetadataClient,
        MetadataClientError, SubgraphClient,
    },
    contracts::{core_contracts, CoreContractsWatcher},
};
