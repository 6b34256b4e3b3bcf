use mdtree_compiler_html::RenderOptions;
use mdtree_parser::ParseOptions;
use mdtree_runtime::{RuntimeConfig, DEFAULT_GC_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "mdtree.config.json";

/// mdtree configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Source directory containing .md files
    #[serde(default = "default_src_dir")]
    pub src_dir: String,

    /// Output directory for rendered files
    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    /// Default output format ("html" or "markdown")
    #[serde(default = "default_target")]
    pub target: String,

    #[serde(default)]
    pub parse: ParseOptions,

    #[serde(default)]
    pub render: RenderOptions,

    /// Wrappers allocated between collections
    #[serde(default = "default_gc_threshold")]
    pub gc_threshold: usize,
}

fn default_src_dir() -> String {
    "src".to_string()
}

fn default_out_dir() -> String {
    "dist".to_string()
}

fn default_target() -> String {
    "html".to_string()
}

fn default_gc_threshold() -> usize {
    DEFAULT_GC_THRESHOLD
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            tracing::debug!(path = %config_path.display(), "loaded config");
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Get absolute path to source directory
    pub fn get_src_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.src_dir)
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            parse: self.parse.clone(),
            render: self.render.clone(),
            gc_threshold: self.gc_threshold,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            src_dir: default_src_dir(),
            out_dir: default_out_dir(),
            target: default_target(),
            parse: ParseOptions::default(),
            render: RenderOptions::default(),
            gc_threshold: default_gc_threshold(),
        }
    }
}
