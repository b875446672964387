//! CLI command implementations.

pub mod process;
pub mod stages;
pub mod stress;

use std::path::PathBuf;

use cadena_chain::{ChainConfig, ChainOrder, StageKind};
use clap::Args;

/// Chain options shared by the commands that build a processor.
#[derive(Args, Debug)]
pub struct ChainArgs {
    /// Chain config file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Initial stage order (e.g., "ladder,phaser,chorus,overdrive,eq")
    #[arg(short, long)]
    pub order: Option<ChainOrder>,

    /// Stage to bypass (repeatable)
    #[arg(long, number_of_values = 1)]
    pub bypass: Vec<StageKind>,

    /// Parameter value by id (e.g., "ladder_cutoff_hz=800")
    #[arg(long, value_parser = parse_key_val, number_of_values = 1)]
    pub param: Vec<(String, f32)>,
}

impl ChainArgs {
    /// Load the config file (or defaults) and layer the command-line
    /// overrides on top.
    pub fn to_config(&self) -> anyhow::Result<ChainConfig> {
        let mut config = match &self.config {
            Some(path) => ChainConfig::load(path)?,
            None => ChainConfig::default(),
        };
        if let Some(order) = &self.order {
            config = config.with_initial_order(order);
        }
        for &kind in &self.bypass {
            if !config.bypass.contains(&kind) {
                config.bypass.push(kind);
            }
        }
        for (id, value) in &self.param {
            config.params.insert(id.clone(), *value);
        }
        Ok(config)
    }
}

fn parse_key_val(s: &str) -> Result<(String, f32), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid parameter format: '{}' (expected id=value)", s))?;
    let value = value
        .trim()
        .parse::<f32>()
        .map_err(|e| format!("Invalid value for '{}': {}", key, e))?;
    Ok((key.trim().to_string(), value))
}
