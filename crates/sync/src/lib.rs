// Copyright 2023-, Edge & Node, GraphOps, and Semiotic Labs.
// SPDX-License-Identifier: Apache-2.0

mod bucket;
mod cli;
mod metrics;
mod reconcile;
mod store;
pub mod service;

pub use store::{ContractsMetadataStore, HasuraContractsMetadataStore, StoreError};
