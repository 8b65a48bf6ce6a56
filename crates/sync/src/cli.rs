// Copyright 2023-, Edge & Node, GraphOps, and Semiotic Labs.
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use artblocks_config::Config;
use clap::Parser;

#[derive(Parser)]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

pub fn load_config() -> anyhow::Result<Config> {
    let cli = Cli::parse();
    Config::parse(cli.config.as_ref()).map_err(|e| {
        tracing::error!(
            "Invalid configuration file `{}`: {}, environment variables with \
            the ARTBLOCKS_SYNC_ prefix can fill in missing values",
            cli.config.unwrap_or_default().display(),
            e
        );
        anyhow::anyhow!(e)
    })
}
