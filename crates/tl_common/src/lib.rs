//! Shared types for the typeless pipeline.
//!
//! Holds the dialect/source-kind descriptors, the error taxonomy, and the
//! byte-range edit machinery that the erasure and import-pruning passes
//! both build on.

pub mod edit;
pub mod error;

pub use edit::{normalize_blank_lines, EditSet};
pub use error::{Error, Result};

use serde::{Deserialize, Serialize};

/// Which flavour of script source the parser should accept.
///
/// `markup` enables the inline-tag (JSX/TSX) extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dialect {
    pub markup: bool,
}

impl Dialect {
    pub fn ts() -> Self {
        Self { markup: false }
    }

    pub fn tsx() -> Self {
        Self { markup: true }
    }
}

/// How an input file is routed through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A plain script file, typed or not.
    Script(Dialect),
    /// A multi-section document with an embedded script section.
    Container,
}

impl SourceKind {
    /// Map a file extension (or a path, whose extension is taken) to a
    /// source kind.
    ///
    /// Unknown extensions are a caller misconfiguration, not something to
    /// silently downgrade.
    pub fn from_extension(path: &str) -> Result<Self> {
        let ext = std::path::Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or(path);
        match ext {
            "ts" | "mts" | "cts" | "js" | "mjs" | "cjs" => Ok(Self::Script(Dialect::ts())),
            "tsx" | "jsx" => Ok(Self::Script(Dialect::tsx())),
            "vue" | "svelte" => Ok(Self::Container),
            other => Err(Error::UnsupportedDialect(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_routing() {
        assert_eq!(
            SourceKind::from_extension("ts").unwrap(),
            SourceKind::Script(Dialect::ts())
        );
        assert_eq!(
            SourceKind::from_extension("tsx").unwrap(),
            SourceKind::Script(Dialect::tsx())
        );
        assert_eq!(
            SourceKind::from_extension("vue").unwrap(),
            SourceKind::Container
        );
    }

    #[test]
    fn full_paths_are_accepted() {
        assert_eq!(
            SourceKind::from_extension("src/app/main.mts").unwrap(),
            SourceKind::Script(Dialect::ts())
        );
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let err = SourceKind::from_extension("coffee").unwrap_err();
        assert!(matches!(err, Error::UnsupportedDialect(ref e) if e == "coffee"));
    }
}
