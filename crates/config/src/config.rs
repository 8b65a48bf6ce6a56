// Copyright 2023-, Edge & Node, GraphOps, and Semiotic Labs.
// SPDX-License-Identifier: Apache-2.0

use std::{env, path::PathBuf, time::Duration};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use regex::Regex;
use serde::Deserialize;
use serde_with::{serde_as, DurationSecondsWithFrac};
use thegraph_core::DeploymentId;
use url::Url;

const PREFIX: &str = "ARTBLOCKS_SYNC_";
const SHARED_PREFIX: &str = "ARTBLOCKS_";

// The subgraph rejects page sizes above this
const MAX_PAGE_SIZE: u32 = 1000;

#[derive(Debug, Deserialize)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Config {
    pub metadata: MetadataConfig,
    pub subgraph: SubgraphConfig,
    pub graph_node: Option<GraphNodeConfig>,
    pub network: NetworkConfig,
    pub sync: SyncConfig,
    pub metrics: MetricsConfig,
}

// Newtype wrapping Config to be able use serde_ignored with Figment
#[derive(Debug)]
#[cfg_attr(test, derive(PartialEq))]
pub struct ConfigWrapper(pub Config);

// Custom Deserializer for ConfigWrapper
// This is needed to warn about unknown fields
impl<'de> Deserialize<'de> for ConfigWrapper {
    fn deserialize<D>(deserializer: D) -> Result<ConfigWrapper, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let config: Config = serde_ignored::deserialize(deserializer, |path| {
            tracing::warn!("Ignoring unknown configuration field: {}", path);
        })?;

        Ok(ConfigWrapper(config))
    }
}

impl Config {
    pub fn parse(filename: Option<&PathBuf>) -> Result<Self, String> {
        let config_defaults = include_str!("../default_values.toml");

        let mut figment_config = Figment::new().merge(Toml::string(config_defaults));

        if let Some(path) = filename {
            let mut config_content = std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read config file: {e}"))?;
            config_content = Self::substitute_env_vars(config_content)?;
            figment_config = figment_config.merge(Toml::string(&config_content));
        }

        let config: ConfigWrapper = figment_config
            .merge(Self::from_env_ignore_empty(PREFIX))
            .merge(Self::from_env_ignore_empty(SHARED_PREFIX))
            .extract()
            .map_err(|e| e.to_string())?;

        config.0.validate()?;
        Ok(config.0)
    }

    fn from_env_ignore_empty(prefix: &str) -> Env {
        let prefixed_env = Env::prefixed(prefix).split("__");
        let ignore_prefixed: Vec<_> = prefixed_env
            .iter()
            .filter_map(|(key, value)| {
                if value.is_empty() {
                    Some(key.into_string())
                } else {
                    None
                }
            })
            .collect();
        let ref_ignore = ignore_prefixed
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>();
        prefixed_env.ignore(&ref_ignore)
    }

    fn substitute_env_vars(content: String) -> Result<String, String> {
        let reg = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| e.to_string())?;
        let mut missing_vars = Vec::new();
        let mut result = String::new();

        for line in content.lines() {
            if !line.trim_start().starts_with('#') {
                let processed_line = reg.replace_all(line, |caps: &regex::Captures| {
                    let var_name = &caps[1];
                    match env::var(var_name) {
                        Ok(value) => value,
                        Err(_) => {
                            missing_vars.push(var_name.to_string());
                            format!("${{{var_name}}}")
                        }
                    }
                });
                result.push_str(&processed_line);
                result.push('\n');
            }
        }

        if !missing_vars.is_empty() {
            return Err(format!(
                "Missing environment variables: {}",
                missing_vars.join(", ")
            ));
        }

        Ok(result.trim_end().to_string())
    }

    // custom validation of the values
    fn validate(&self) -> Result<(), String> {
        if self.subgraph.syncing_interval_secs == Duration::ZERO {
            return Err("subgraph.syncing_interval_secs must be greater than 0".to_string());
        }

        if self.subgraph.syncing_interval_secs < Duration::from_secs(10) {
            tracing::warn!(
                "Your `subgraph.syncing_interval_secs` value is too low. \
                This may overload the subgraph endpoint, \
                a recommended value is about 120 seconds."
            );
        }

        if self.subgraph.syncing_interval_secs > Duration::from_secs(3600) {
            tracing::warn!(
                "Your `subgraph.syncing_interval_secs` value is too high. \
                Newly deployed contracts will take a long time to show up in \
                the metadata database, a recommended value is about 120 seconds."
            );
        }

        if self.subgraph.page_size == 0 {
            return Err("subgraph.page_size must be greater than 0".to_string());
        }

        if self.subgraph.page_size > MAX_PAGE_SIZE {
            return Err(format!(
                "subgraph.page_size must not be greater than {MAX_PAGE_SIZE}"
            ));
        }

        if self.network.name.is_empty() {
            return Err("network.name must not be empty".to_string());
        }

        if self
            .network
            .name
            .chars()
            .any(|c| !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '-')
        {
            return Err(format!(
                "network.name `{}` must be lowercase alphanumeric (it is used \
                as a storage bucket name suffix)",
                self.network.name
            ));
        }

        Ok(())
    }
}

/// Hasura endpoint for the metadata database.
#[derive(Clone, Debug, Deserialize)]
#[cfg_attr(test, derive(PartialEq))]
pub struct MetadataConfig {
    pub endpoint: Url,
    pub admin_secret: Option<String>,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize)]
#[cfg_attr(test, derive(PartialEq))]
pub struct SubgraphConfig {
    pub query_url: Url,
    pub query_auth_token: Option<String>,
    /// Deployment of the Art Blocks subgraph, used to query a local
    /// graph-node instead of the remote endpoint whenever it is healthy.
    pub deployment_id: Option<DeploymentId>,
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub syncing_interval_secs: Duration,
    pub page_size: u32,
}

/// A local graph-node that may have the subgraph deployed.
#[derive(Clone, Debug, Deserialize)]
#[cfg_attr(test, derive(PartialEq))]
pub struct GraphNodeConfig {
    pub query_url: Url,
    pub status_url: Url,
}

#[derive(Clone, Debug, Deserialize)]
#[cfg_attr(test, derive(PartialEq))]
pub struct NetworkConfig {
    /// Network tag appended to derived bucket names, e.g. `mainnet`
    pub name: String,
}

#[derive(Clone, Debug, Deserialize)]
#[cfg_attr(test, derive(PartialEq))]
pub struct SyncConfig {
    /// Log pending writes instead of sending them to Hasura
    pub dry_run: bool,
}

#[derive(Clone, Debug, Deserialize)]
#[cfg_attr(test, derive(PartialEq))]
pub struct MetricsConfig {
    pub port: u16,
}
