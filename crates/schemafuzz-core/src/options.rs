//! Generation options (§3.2) and the `pattern_func` plug-in point.

use std::sync::Arc;

use crate::error::GenError;
use crate::model::StringFormat;
use crate::random::RandomSource;

/// Default upper bound on recursive descent for the untyped *any* generator.
pub const DEFAULT_MAX_DEPTH: u32 = 10;
/// Default upper bound on ad-hoc keys added when additional properties are
/// permitted.
pub const DEFAULT_ADDITIONAL_PROPERTIES_MAX: u32 = 10;
/// Default clamp for `multiple_of` on floats (§3.2, §9 open question (b)).
pub const DEFAULT_MULTIPLE_OF_FLOAT_CLAMP: (f64, f64) = (-2_000_000.0, 20_000_000.0);

/// The arguments `pattern_func` receives: the literal `pattern` (already
/// resolved to a suggested regex for named formats, §4.2 step 2), and the
/// string-length bounds the result must respect.
pub struct PatternRequest<'a> {
    pub pattern: &'a str,
    pub format: Option<StringFormat>,
    pub min_len: u64,
    pub max_len: u64,
}

/// `(pattern, format, min_len, max_len, random) → string` (§3.2).
pub type PatternFunc =
    Arc<dyn Fn(&PatternRequest, &mut dyn RandomSource) -> Result<String, GenError> + Send + Sync>;

/// Immutable generation options, threaded explicitly through every
/// generator constructor (§5, §9: "no global state").
#[derive(Clone)]
pub struct GenOptions {
    pub max_depth: u32,
    pub additional_properties_max: u32,
    pub multiple_of_float_clamp: (f64, f64),
    pattern_func: Option<PatternFunc>,
}

impl std::fmt::Debug for GenOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenOptions")
            .field("max_depth", &self.max_depth)
            .field(
                "additional_properties_max",
                &self.additional_properties_max,
            )
            .field("multiple_of_float_clamp", &self.multiple_of_float_clamp)
            .field("pattern_func", &self.pattern_func.is_some())
            .finish()
    }
}

impl Default for GenOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            additional_properties_max: DEFAULT_ADDITIONAL_PROPERTIES_MAX,
            multiple_of_float_clamp: DEFAULT_MULTIPLE_OF_FLOAT_CLAMP,
            pattern_func: None,
        }
    }
}

impl GenOptions {
    /// Install the regex-to-string delegate (§6 public surface:
    /// `options.with_pattern_func(fn)`).
    #[must_use]
    pub fn with_pattern_func(mut self, f: PatternFunc) -> Self {
        self.pattern_func = Some(f);
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_additional_properties_max(mut self, max: u32) -> Self {
        self.additional_properties_max = max;
        self
    }

    #[must_use]
    pub fn with_multiple_of_float_clamp(mut self, lo: f64, hi: f64) -> Self {
        self.multiple_of_float_clamp = (lo, hi);
        self
    }

    #[must_use]
    pub fn pattern_func(&self) -> Option<&PatternFunc> {
        self.pattern_func.as_ref()
    }
}

/// `make_options()` (§6): default options with no `pattern_func` installed.
/// Callers that only ever generate schemas without `pattern`/regex-shaped
/// formats can use this directly; `schemafuzz_core::engine::default_options()`
/// additionally installs the shipped `rand_regex`-backed default (§11.5).
#[must_use]
pub fn make_options() -> GenOptions {
    GenOptions::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_have_no_pattern_func() {
        let opts = make_options();
        assert!(opts.pattern_func().is_none());
        assert_eq!(opts.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn with_pattern_func_installs_it() {
        let opts = make_options().with_pattern_func(Arc::new(|req, _rng| {
            Ok(format!("matched:{}", req.pattern))
        }));
        assert!(opts.pattern_func().is_some());
    }

    #[test]
    fn builder_methods_override_defaults() {
        let opts = make_options()
            .with_max_depth(3)
            .with_additional_properties_max(2)
            .with_multiple_of_float_clamp(-1.0, 1.0);
        assert_eq!(opts.max_depth, 3);
        assert_eq!(opts.additional_properties_max, 2);
        assert_eq!(opts.multiple_of_float_clamp, (-1.0, 1.0));
    }
}
