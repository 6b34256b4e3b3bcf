use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_NESTING: usize = 128;

/// Options controlling how markdown text is turned into a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParseOptions {
    /// Convert straight quotes, `--`, `---` and `...` into typographic
    /// punctuation.
    pub smart: bool,

    /// Deepest allowed nesting of block quotes and list items.
    pub max_nesting: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            smart: false,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let options: ParseOptions = serde_json::from_str(r#"{ "smart": true }"#).unwrap();
        assert!(options.smart);
        assert_eq!(options.max_nesting, DEFAULT_MAX_NESTING);
    }
}
