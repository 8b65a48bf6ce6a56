// Copyright 2023-, Edge & Node, GraphOps, and Semiotic Labs.
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use artblocks_contract::{ContractMetadata, CoreContract};
use thegraph_core::alloy::primitives::Address;

use crate::{
    bucket::default_bucket_name,
    metrics,
    store::{ContractsMetadataStore, StoreError},
};

/// The rows the metadata table should contain for the observed contracts,
/// ordered by address so batches are deterministic.
pub fn desired_rows(
    contracts: &HashMap<Address, CoreContract>,
    network: &str,
) -> Vec<ContractMetadata> {
    let mut rows: Vec<ContractMetadata> = contracts
        .values()
        .map(|contract| {
            ContractMetadata::new(contract.address, contract.contract_type)
                .with_bucket_name(default_bucket_name(contract.contract_type, network))
        })
        .collect();
    rows.sort_by_key(|row| row.address);
    rows
}

/// Rows that are missing from or stale in the stored table.
///
/// A bucket name that was set upstream is never clobbered with the derived
/// default; only rows without any bucket get one. Columns outside the
/// mutation's update list are left alone by the upsert either way.
pub fn pending_writes(
    desired: &[ContractMetadata],
    existing: &[ContractMetadata],
) -> Vec<ContractMetadata> {
    let existing_by_address: HashMap<Address, &ContractMetadata> =
        existing.iter().map(|row| (row.address, row)).collect();

    desired
        .iter()
        .filter_map(|row| match existing_by_address.get(&row.address) {
            None => Some(row.clone()),
            Some(stored) => {
                let changed = stored.contract_type != row.contract_type
                    || stored.bucket_name.is_none();
                changed.then(|| ContractMetadata {
                    address: row.address,
                    bucket_name: stored.bucket_name.clone().or_else(|| row.bucket_name.clone()),
                    contract_type: row.contract_type,
                })
            }
        })
        .collect()
}

/// One reconcile pass: read the table, compute the delta, upsert it.
pub async fn reconcile_once<S: ContractsMetadataStore>(
    store: &S,
    contracts: &HashMap<Address, CoreContract>,
    network: &str,
    dry_run: bool,
) -> Result<usize, StoreError> {
    let desired = desired_rows(contracts, network);
    if desired.is_empty() {
        tracing::debug!("No core contracts observed yet, nothing to reconcile");
        return Ok(0);
    }

    let existing = store.list().await?;
    let pending = pending_writes(&desired, &existing);
    if pending.is_empty() {
        tracing::debug!(contracts = desired.len(), "Metadata table is in sync");
        return Ok(0);
    }

    if dry_run {
        for row in &pending {
            tracing::info!(
                address = %row.address,
                contract_type = %row.contract_type,
                bucket_name = row.bucket_name.as_deref().unwrap_or_default(),
                "Would upsert contract metadata (dry run)"
            );
        }
        return Ok(0);
    }

    let written = store.upsert_many(pending).await?;
    metrics::CONTRACTS_UPSERTED.inc_by(written.len() as u64);
    tracing::info!(rows = written.len(), "Upserted contract metadata rows");
    Ok(written.len())
}
