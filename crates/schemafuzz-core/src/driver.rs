//! The generic Driver (§4.8, §6): "draw, validate, stop on first
//! disagreement, report the shrunk value" decoupled from HTTP or any other
//! transport. [`SchemaSource`] and [`Validator`] are the two traits §6 calls
//! consumed interfaces — the shipped runner's OpenAPI reader and HTTP/local
//! oracle (§10.1, §10.2) are concrete implementations living in
//! `schemafuzz_runner`; this module only knows about generators and bytes.

use crate::engine::Generator;
use crate::error::GenError;
use crate::random::RandomSource;

/// One JSON-media-typed request body schema the driver should fuzz, as
/// surfaced by an external schema reader (§6, §10.1).
pub struct SchemaTarget {
    /// A dotted label identifying the operation, e.g. `"POST /orders"`.
    pub path: String,
    pub method: String,
    pub content_type: String,
    pub generator: Generator,
}

/// `read(path) → normalized schema document` (§6), generalized to "produce
/// every JSON-bodied operation to fuzz".
pub trait SchemaSource {
    type Error;

    fn targets(&self) -> Result<Vec<SchemaTarget>, Self::Error>;
}

/// `validate(path, method, content-type, body-bytes) → ok | error-with-reason`
/// (§6).
pub trait Validator {
    /// A human-readable reason the oracle rejected the draw.
    type Rejection: std::fmt::Display;

    fn validate(
        &self,
        path: &str,
        method: &str,
        content_type: &str,
        body: &[u8],
    ) -> Result<(), Self::Rejection>;
}

/// One disagreement between a draw and the oracle: the originating schema
/// path and the literal rejected bytes (§4.8, §7: "Oracle disagreements").
pub struct Disagreement {
    pub path: String,
    pub method: String,
    pub body: Vec<u8>,
    pub reason: String,
}

/// Run the single-operation property loop (§4.8): draw up to `budget`
/// values from `target.generator`, validating each through `validator`.
/// Returns the first disagreement, if any, taking the *last* successful
/// draw's random source position as the natural shrink starting point —
/// actual shrinking (tape minimization) is the caller's responsibility
/// (`schemafuzz_runner::property`), since it requires a tape-capturing
/// random source rather than the trait-object form used here.
///
/// A `GenError` from the generator itself (§7.1: a fatal, eagerly-raised
/// configuration error — an unsatisfiable `multipleOf`, a missing
/// `pattern_func`, …) is propagated rather than papered over with a
/// placeholder draw, so it reaches the caller as what it is and never
/// masquerades as an oracle verdict.
pub fn run_property_loop<V: Validator>(
    target: &SchemaTarget,
    validator: &V,
    random: &mut dyn RandomSource,
    budget: u32,
) -> Result<Result<(), Disagreement>, GenError> {
    for _ in 0..budget {
        let bytes = target.generator.draw(random)?;
        if let Err(reason) = validator.validate(
            &target.path,
            &target.method,
            &target.content_type,
            &bytes,
        ) {
            return Ok(Err(Disagreement {
                path: target.path.clone(),
                method: target.method.clone(),
                body: bytes,
                reason: reason.to_string(),
            }));
        }
    }
    Ok(Ok(()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::gen_from_schema;
    use crate::model::SchemaNode;
    use crate::random::TapeRecorder;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use serde_json::json;

    struct AlwaysOk;
    impl Validator for AlwaysOk {
        type Rejection = String;
        fn validate(&self, _: &str, _: &str, _: &str, _: &[u8]) -> Result<(), String> {
            Ok(())
        }
    }

    struct RejectEmptyObject;
    impl Validator for RejectEmptyObject {
        type Rejection = String;
        fn validate(&self, _: &str, _: &str, _: &str, body: &[u8]) -> Result<(), String> {
            if body == b"{}" {
                Err("empty object not allowed".to_string())
            } else {
                Ok(())
            }
        }
    }

    fn target() -> SchemaTarget {
        let schema =
            SchemaNode::from_value(&json!({"type": "object"}), "root").unwrap();
        SchemaTarget {
            path: "/widgets".to_string(),
            method: "POST".to_string(),
            content_type: "application/json".to_string(),
            generator: gen_from_schema(schema),
        }
    }

    #[test]
    fn passes_when_oracle_always_agrees() {
        let t = target();
        let v = AlwaysOk;
        let mut rng = TapeRecorder::new(SmallRng::seed_from_u64(1));
        assert_eq!(run_property_loop(&t, &v, &mut rng, 20).unwrap(), Ok(()));
    }

    #[test]
    fn reports_first_disagreement() {
        let t = target();
        let v = RejectEmptyObject;
        let mut rng = TapeRecorder::new(SmallRng::seed_from_u64(5));
        let outcome = run_property_loop(&t, &v, &mut rng, 500).unwrap();
        if let Err(d) = outcome {
            assert_eq!(d.body, b"{}");
            assert_eq!(d.path, "/widgets");
        }
    }

    #[test]
    fn propagates_generator_configuration_error_instead_of_masking_it() {
        let schema = SchemaNode::from_value(
            &json!({"type": "integer", "minimum": 1, "maximum": 2, "multipleOf": 7}),
            "root",
        )
        .unwrap();
        let t = SchemaTarget {
            path: "/widgets".to_string(),
            method: "POST".to_string(),
            content_type: "application/json".to_string(),
            generator: gen_from_schema(schema),
        };
        let v = AlwaysOk;
        let mut rng = TapeRecorder::new(SmallRng::seed_from_u64(1));
        let err = run_property_loop(&t, &v, &mut rng, 20).unwrap_err();
        assert!(matches!(err, crate::error::GenError::MultipleOfUnsatisfiable { .. }));
    }
}
