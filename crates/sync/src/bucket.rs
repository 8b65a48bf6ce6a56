// Copyright 2023-, Edge & Node, GraphOps, and Semiotic Labs.
// SPDX-License-Identifier: Apache-2.0

use artblocks_contract::ContractType;

/// Default storage bucket for a contract's cached media, derived from the
/// contract type and the network tag, e.g. `genart721corev3-mainnet`.
///
/// A bucket name that was set upstream always wins over this default; the
/// reconcile step only fills it in for rows that have none.
pub fn default_bucket_name(contract_type: ContractType, network: &str) -> String {
    format!("{}-{}", sanitize(contract_type.as_str()), network)
}

// Bucket names must be lowercase alphanumeric with single hyphens
fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_was_hyphen = true; // also strips leading separators
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            out.push('-');
            last_was_hyphen = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}
