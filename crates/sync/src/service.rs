// Copyright 2023-, Edge & Node, GraphOps, and Semiotic Labs.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use artblocks_config::Config;
use artblocks_monitor::{
    core_contracts, create_metadata_client, create_subgraph_client, watcher::watch_pipe,
};
use tokio::signal::unix::{signal, SignalKind};

use crate::{cli, metrics, reconcile, store::HasuraContractsMetadataStore};

pub async fn run() -> anyhow::Result<()> {
    let config = cli::load_config()?;
    let config: &'static Config = Box::leak(Box::new(config));

    let http_client = reqwest::Client::new();
    let subgraph = create_subgraph_client(
        http_client.clone(),
        config.graph_node.as_ref(),
        &config.subgraph,
    )
    .await?;
    let metadata_client = create_metadata_client(http_client, &config.metadata);
    let store = Arc::new(HasuraContractsMetadataStore::new(metadata_client));

    tokio::spawn(metrics::run_server(config.metrics.port));
    tracing::info!(port = config.metrics.port, "Metrics server started");

    let contracts = core_contracts(
        subgraph,
        config.subgraph.syncing_interval_secs,
        config.subgraph.page_size,
    )
    .await?;
    tracing::info!(network = %config.network.name, "Watching Art Blocks core contracts");

    let sync_handle = watch_pipe(contracts, move |contracts| {
        let contracts = contracts.clone();
        let store = store.clone();
        async move {
            let outcome = reconcile::reconcile_once(
                store.as_ref(),
                &contracts,
                &config.network.name,
                config.sync.dry_run,
            )
            .await;
            match outcome {
                Ok(_) => metrics::RECONCILE_RUNS.with_label_values(&["ok"]).inc(),
                Err(err) => {
                    metrics::RECONCILE_RUNS.with_label_values(&["failed"]).inc();
                    tracing::error!(error = %err, "Reconcile pass failed");
                }
            }
        }
    });

    // Wait for SIGTERM or SIGINT, or for the pipeline to die.
    let mut signal_sigint = signal(SignalKind::interrupt())?;
    let mut signal_sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = sync_handle => tracing::error!("Sync pipeline stopped unexpectedly"),
        _ = signal_sigint.recv() => tracing::debug!("Received SIGINT."),
        _ = signal_sigterm.recv() => tracing::debug!("Received SIGTERM."),
    }

    tracing::info!("Shutting down...");
    Ok(())
}
