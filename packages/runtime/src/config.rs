use mdtree_compiler_html::RenderOptions;
use mdtree_parser::ParseOptions;
use serde::{Deserialize, Serialize};

/// Wrappers allocated between automatic collections.
pub const DEFAULT_GC_THRESHOLD: usize = 1024;

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuntimeConfig {
    /// Options used by `Runtime::parse_document`
    pub parse: ParseOptions,

    /// Options used by `Runtime::render_html`
    pub render: RenderOptions,

    /// `maybe_collect` runs a collection once this many wrappers have been
    /// allocated since the previous one
    pub gc_threshold: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            parse: ParseOptions::default(),
            render: RenderOptions::default(),
            gc_threshold: DEFAULT_GC_THRESHOLD,
        }
    }
}
