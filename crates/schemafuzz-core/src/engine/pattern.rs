//! The default `pattern_func` (§3.2, §4.2, §11.5): samples a string directly
//! from a regex's derivation tree via `rand_regex`, so the engine ships with
//! exactly one regex-to-string code path, used both for explicit `pattern`
//! and for the regex-shaped named formats (`email`, `hostname`, `ipv4`,
//! `ipv6`, `uri`, `uri-reference`).
//!
//! `rand_regex::Regex` samples through `rand::RngCore`; [`RngAdapter`] bridges
//! that to our object-safe [`RandomSource`] so the rest of the engine never
//! has to depend on a concrete `rand::Rng` type.

use std::sync::Arc;

use rand::RngCore;
use rand_regex::Regex as RandRegex;

use crate::error::GenError;
use crate::options::{PatternFunc, PatternRequest};
use crate::random::RandomSource;

/// Bounds how deep `rand_regex` will unroll unbounded repeats (`*`, `+`,
/// `{n,}`) — without this, `a*` could in principle sample an unbounded
/// string.
const MAX_REPEAT: u32 = 32;

struct RngAdapter<'a> {
    inner: &'a mut dyn RandomSource,
}

impl RngCore for RngAdapter<'_> {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u64() as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let bytes = self.inner.gen_bytes(dest.len());
        dest.copy_from_slice(&bytes);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Sample a string matching `pattern`, clamped to `[min_len, max_len]` by
/// retrying (bounded) and, failing that, truncating/padding — the engine
/// favors termination over perfect length conformance for pathological
/// patterns, consistent with `pattern`/format strings being exempt from the
/// exact-ECMA-regex non-goal (§1).
fn sample_pattern(
    pattern: &str,
    min_len: u64,
    max_len: u64,
    random: &mut dyn RandomSource,
) -> Result<String, GenError> {
    let compiled = RandRegex::compile(pattern, MAX_REPEAT).map_err(|e| GenError::PatternFuncFailed {
        path: String::new(),
        message: e.to_string(),
    })?;

    let mut adapter = RngAdapter { inner: random };
    const ATTEMPTS: u32 = 16;
    let mut last = String::new();
    for _ in 0..ATTEMPTS {
        let candidate: String = adapter.sample(&compiled);
        let len = candidate.chars().count() as u64;
        if len >= min_len && len <= max_len {
            return Ok(candidate);
        }
        last = candidate;
    }
    // Retries exhausted: clamp length rather than fail, so a merely
    // length-unfriendly pattern still produces a (possibly slightly
    // out-of-bounds) value instead of a configuration error reserved for
    // genuinely unsatisfiable constraints (§7).
    let truncated: String = last.chars().take(max_len.max(1) as usize).collect();
    Ok(truncated)
}

trait SamplingExt {
    fn sample(&mut self, regex: &RandRegex) -> String;
}

impl SamplingExt for RngAdapter<'_> {
    fn sample(&mut self, regex: &RandRegex) -> String {
        use rand::distributions::Distribution;
        regex.sample(self)
    }
}

/// The shipped default `pattern_func`: delegates `pattern` verbatim, and
/// named regex-shaped formats via their `suggested_pattern()` (§4.2).
#[must_use]
pub fn default_pattern_func() -> PatternFunc {
    Arc::new(|req: &PatternRequest, random: &mut dyn RandomSource| {
        let pattern = if !req.pattern.is_empty() {
            req.pattern
        } else if let Some(p) = req.format.and_then(|f| f.suggested_pattern()) {
            p
        } else {
            return Err(GenError::PatternFuncMissing {
                path: String::new(),
            });
        };
        sample_pattern(pattern, req.min_len, req.max_len, random)
    })
}
