//! schemafuzz-runner: API fuzz execution engines

pub mod datagen;
pub mod native;

pub use native::{FuzzLevel, NativeError, NativeRunner};
