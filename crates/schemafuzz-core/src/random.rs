//! The shrinking-capable random source adapter (§2, §9: "the generator
//! contract requires that the random source can be rewound to drive
//! shrinking").
//!
//! Generators never touch `rand::Rng` directly; they draw through the
//! object-safe [`RandomSource`] trait. Two implementations are provided:
//! [`TapeRecorder`], which wraps any `rand::Rng` and records every draw onto
//! a flat tape of `u64`s, and [`TapeReplay`], which replays a (possibly
//! shrunk) tape and falls back to fresh randomness once the tape is
//! exhausted. A failing draw's tape can be fed to a shrinker (see
//! `schemafuzz_runner::property`) that monotonically reduces tape entries
//! and replays the same generator, keeping any reduction that still
//! reproduces the failure.

use rand::Rng;

/// Capability every generator is built from: a pure function of a random
/// source. Object-safe so `pattern_func` can be stored as `dyn Fn(..., &mut
/// dyn RandomSource) -> ...`.
pub trait RandomSource {
    /// Draw a raw `u64`. The lowest-level primitive; every other method is
    /// implementable in terms of it, but implementors may override them for
    /// better distribution or tape economy.
    fn next_u64(&mut self) -> u64;

    /// Uniform integer in `[lo, hi]` inclusive. `lo > hi` returns `lo`.
    fn gen_range_i64(&mut self, lo: i64, hi: i64) -> i64 {
        if lo >= hi {
            return lo;
        }
        let span = (hi - lo) as u64 + 1;
        lo + (self.next_u64() % span) as i64
    }

    /// Uniform unsigned integer in `[lo, hi]` inclusive.
    fn gen_range_u64(&mut self, lo: u64, hi: u64) -> u64 {
        if lo >= hi {
            return lo;
        }
        let span = hi - lo + 1;
        lo + (self.next_u64() % span)
    }

    /// Uniform `f64` in `[lo, hi)`.
    fn gen_range_f64(&mut self, lo: f64, hi: f64) -> f64 {
        if !(hi > lo) {
            return lo;
        }
        let frac = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        lo + frac * (hi - lo)
    }

    /// `true` with probability `p` (clamped to `[0, 1]`).
    fn gen_bool(&mut self, p: f64) -> bool {
        let p = p.clamp(0.0, 1.0);
        self.gen_range_f64(0.0, 1.0) < p
    }

    /// Pick an index in `[0, len)`. `len == 0` returns `0`.
    fn choose_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.gen_range_u64(0, (len - 1) as u64) as usize
    }

    /// Draw `n` raw bytes.
    fn gen_bytes(&mut self, n: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(n);
        while out.len() < n {
            out.extend_from_slice(&self.next_u64().to_le_bytes());
        }
        out.truncate(n);
        out
    }
}

/// Wraps any `rand::Rng` and records every raw draw, so a failing generation
/// can be replayed (and shrunk) deterministically afterward.
pub struct TapeRecorder<R: Rng> {
    rng: R,
    tape: Vec<u64>,
}

impl<R: Rng> TapeRecorder<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            tape: Vec::new(),
        }
    }

    /// Consume the recorder, returning the recorded tape.
    #[must_use]
    pub fn into_tape(self) -> Vec<u64> {
        self.tape
    }

    #[must_use]
    pub fn tape(&self) -> &[u64] {
        &self.tape
    }
}

impl<R: Rng> RandomSource for TapeRecorder<R> {
    fn next_u64(&mut self) -> u64 {
        let v = self.rng.gen::<u64>();
        self.tape.push(v);
        v
    }
}

/// Replays a recorded (or shrunk) tape; once exhausted, falls back to a
/// supplied `rand::Rng` so a generator that draws more values than the
/// original tape held (e.g. after editing) still terminates.
pub struct TapeReplay<R: Rng> {
    tape: Vec<u64>,
    pos: usize,
    fallback: R,
}

impl<R: Rng> TapeReplay<R> {
    pub fn new(tape: Vec<u64>, fallback: R) -> Self {
        Self {
            tape,
            pos: 0,
            fallback,
        }
    }
}

impl<R: Rng> RandomSource for TapeReplay<R> {
    fn next_u64(&mut self) -> u64 {
        if let Some(&v) = self.tape.get(self.pos) {
            self.pos += 1;
            v
        } else {
            self.fallback.gen::<u64>()
        }
    }
}
