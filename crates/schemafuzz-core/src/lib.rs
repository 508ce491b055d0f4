//! schemafuzz-core: the schema-directed JSON generation engine, plus the
//! config, verdict, and dump types shared by the fuzz runner and CLI.

pub mod config;
pub mod convert;
pub mod driver;
pub mod dryrun;
pub mod dump;
pub mod engine;
pub mod error;
pub mod generator;
pub mod model;
pub mod options;
pub mod random;
pub mod schema;
pub mod status;
pub mod verdict;

pub use config::{Config, ConfigError, Probe};
pub use convert::classify_failures;
pub use driver::{Disagreement, SchemaSource, SchemaTarget, Validator, run_property_loop};
pub use dryrun::DryRunPlan;
pub use dump::{DumpError, DumpIndex};
pub use engine::{Generator, default_options, gen_from_schema};
pub use error::GenError;
pub use generator::to_http_file;
pub use model::{AdditionalProperties, NumberFormat, SchemaNode, StringFormat, Type};
pub use options::{GenOptions, PatternFunc, PatternRequest, make_options};
pub use random::{RandomSource, TapeRecorder, TapeReplay};
pub use schema::RunOutput;
pub use status::StatusAnalysis;
pub use verdict::{
    Failure, FailureType, RequestSnapshot, ResponseSnapshot, Severity, Verdict, VerdictPolicy,
    VerdictStatus,
};
