//! Configuration errors raised by the generation engine.
//!
//! These are the "fatal, raised eagerly" half of the error taxonomy: a schema
//! that cannot be satisfied, or a node that asks for a capability the caller
//! never installed. The other half — oracle disagreements — carries no error
//! type of its own; it is reported data, not a failure to construct a
//! generator (see `schemafuzz_runner::driver`).

use thiserror::Error;

/// A schema cannot be turned into a generator, or a generator cannot produce
/// a value satisfying its own constraints.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenError {
    #[error("schema node at {path} declares more than one non-null type: {types:?}")]
    MultipleTypeTags { path: String, types: Vec<String> },

    #[error("allOf branch at {path} is not typed as object (found {found})")]
    AllOfNonObjectBranch { path: String, found: String },

    #[error("duplicate property {name:?} while merging schemas at {path}")]
    DuplicateProperty { path: String, name: String },

    #[error(
        "multiple_of={multiple_of} has no satisfying multiple in [{lo}, {hi}] at {path}"
    )]
    MultipleOfUnsatisfiable {
        path: String,
        multiple_of: f64,
        lo: f64,
        hi: f64,
    },

    #[error(
        "array at {path} could not draw {count} unique items within {retries} retries (unique_items=true)"
    )]
    UniqueItemsExhausted {
        path: String,
        count: u64,
        retries: u32,
    },

    #[error("pattern/format at {path} requires pattern_func but none is installed")]
    PatternFuncMissing { path: String },

    #[error("pattern_func at {path} failed: {message}")]
    PatternFuncFailed { path: String, message: String },

    #[error("invalid schema document at {path}: {message}")]
    InvalidSchema { path: String, message: String },
}

impl GenError {
    /// Re-anchor an error raised deeper in the recursion to a prefixed path,
    /// so a caller several frames up can report "object.items[2].pattern"
    /// instead of just "pattern".
    #[must_use]
    pub fn with_path_prefix(self, prefix: &str) -> Self {
        fn prefixed(prefix: &str, path: &str) -> String {
            if path.is_empty() {
                prefix.to_string()
            } else {
                format!("{prefix}.{path}")
            }
        }
        match self {
            Self::MultipleTypeTags { path, types } => Self::MultipleTypeTags {
                path: prefixed(prefix, &path),
                types,
            },
            Self::AllOfNonObjectBranch { path, found } => Self::AllOfNonObjectBranch {
                path: prefixed(prefix, &path),
                found,
            },
            Self::DuplicateProperty { path, name } => Self::DuplicateProperty {
                path: prefixed(prefix, &path),
                name,
            },
            Self::MultipleOfUnsatisfiable {
                path,
                multiple_of,
                lo,
                hi,
            } => Self::MultipleOfUnsatisfiable {
                path: prefixed(prefix, &path),
                multiple_of,
                lo,
                hi,
            },
            Self::UniqueItemsExhausted {
                path,
                count,
                retries,
            } => Self::UniqueItemsExhausted {
                path: prefixed(prefix, &path),
                count,
                retries,
            },
            Self::PatternFuncMissing { path } => Self::PatternFuncMissing {
                path: prefixed(prefix, &path),
            },
            Self::PatternFuncFailed { path, message } => Self::PatternFuncFailed {
                path: prefixed(prefix, &path),
                message,
            },
            Self::InvalidSchema { path, message } => Self::InvalidSchema {
                path: prefixed(prefix, &path),
                message,
            },
        }
    }
}
