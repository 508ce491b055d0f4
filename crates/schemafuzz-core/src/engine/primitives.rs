//! Primitive generators (§4.2): `integer`, `number`, `boolean`, `null`.

use serde_json::Value;

use crate::error::GenError;
use crate::model::{NumberFormat, SchemaNode};
use crate::options::GenOptions;
use crate::random::RandomSource;

/// `[min_int64, max_int64]`, narrowed by `format=int32` (§4.2).
const I64_MIN: i64 = i64::MIN;
const I64_MAX: i64 = i64::MAX;
const I32_MIN: i64 = i32::MIN as i64;
const I32_MAX: i64 = i32::MAX as i64;

pub fn gen_integer(
    node: &SchemaNode,
    path: &str,
    random: &mut dyn RandomSource,
) -> Result<Value, GenError> {
    if let Some(values) = &node.enum_values {
        return Ok(sample_enum(values, random));
    }

    let (mut lo, mut hi) = (I64_MIN, I64_MAX);
    if let Some(min) = node.minimum {
        let mut bound = min.ceil() as i64;
        if node.exclusive_minimum {
            bound = bound.saturating_add(1);
        }
        lo = lo.max(bound);
    }
    if let Some(max) = node.maximum {
        let mut bound = max.floor() as i64;
        if node.exclusive_maximum {
            bound = bound.saturating_sub(1);
        }
        hi = hi.min(bound);
    }
    if node.number_format == Some(NumberFormat::Int32) {
        lo = lo.max(I32_MIN);
        hi = hi.min(I32_MAX);
    }

    if let Some(m) = node.multiple_of {
        if m <= 0.0 {
            return Err(GenError::MultipleOfUnsatisfiable {
                path: path.to_string(),
                multiple_of: m,
                lo: lo as f64,
                hi: hi as f64,
            });
        }
        let m_i = m.round() as i64;
        let m_i = if m_i == 0 { 1 } else { m_i };
        let k_lo = lo.div_euclid(m_i);
        let k_hi = hi.div_euclid(m_i);
        if k_lo > k_hi {
            return Err(GenError::MultipleOfUnsatisfiable {
                path: path.to_string(),
                multiple_of: m,
                lo: lo as f64,
                hi: hi as f64,
            });
        }
        let k = random.gen_range_i64(k_lo, k_hi);
        return Ok(Value::from(k * m_i));
    }

    if lo > hi {
        return Err(GenError::MultipleOfUnsatisfiable {
            path: path.to_string(),
            multiple_of: 1.0,
            lo: lo as f64,
            hi: hi as f64,
        });
    }

    Ok(Value::from(random.gen_range_i64(lo, hi)))
}

pub fn gen_number(
    node: &SchemaNode,
    path: &str,
    options: &GenOptions,
    random: &mut dyn RandomSource,
) -> Result<Value, GenError> {
    if let Some(values) = &node.enum_values {
        return Ok(sample_enum(values, random));
    }

    let mut lo = node.minimum.unwrap_or(-1.0e6);
    let mut hi = node.maximum.unwrap_or(1.0e6);
    if node.exclusive_minimum {
        lo = next_up(lo);
    }
    if node.exclusive_maximum {
        hi = next_down(hi);
    }

    if let Some(m) = node.multiple_of {
        if m == 0.0 {
            return Err(GenError::MultipleOfUnsatisfiable {
                path: path.to_string(),
                multiple_of: m,
                lo,
                hi,
            });
        }
        let (clamp_lo, clamp_hi) = options.multiple_of_float_clamp;
        lo = lo.max(clamp_lo);
        hi = hi.min(clamp_hi);
        if lo > hi {
            return Err(GenError::MultipleOfUnsatisfiable {
                path: path.to_string(),
                multiple_of: m,
                lo,
                hi,
            });
        }
        let abs_m = m.abs();
        let (k_lo, k_hi) = if abs_m > 1.0 {
            ((lo / m).floor() as i64, (hi / m).floor() as i64)
        } else {
            (lo.floor() as i64, hi.floor() as i64)
        };
        if k_lo > k_hi {
            return Err(GenError::MultipleOfUnsatisfiable {
                path: path.to_string(),
                multiple_of: m,
                lo,
                hi,
            });
        }
        let k = random.gen_range_i64(k_lo, k_hi);
        return Ok(json_number(k as f64 * m));
    }

    if lo > hi {
        return Err(GenError::MultipleOfUnsatisfiable {
            path: path.to_string(),
            multiple_of: 1.0,
            lo,
            hi,
        });
    }

    Ok(json_number(random.gen_range_f64(lo, hi)))
}

pub fn gen_boolean(node: &SchemaNode, random: &mut dyn RandomSource) -> Value {
    if let Some(values) = &node.enum_values {
        if !values.is_empty() {
            return sample_enum(values, random);
        }
    }
    Value::Bool(random.gen_bool(0.5))
}

fn sample_enum(values: &[Value], random: &mut dyn RandomSource) -> Value {
    if values.is_empty() {
        return Value::Null;
    }
    let idx = random.choose_index(values.len());
    values[idx].clone()
}

fn json_number(v: f64) -> Value {
    serde_json::Number::from_f64(v).map_or(Value::from(0), Value::Number)
}

/// The next representable `f64` above `x`, toward `+inf` (§4.2: exclusive
/// bounds advance "by one ULP toward the interior"). Hand-rolled because
/// `f64::next_up` is not available under this workspace's
/// `rust-version = "1.85"`.
fn next_up(x: f64) -> f64 {
    const CLEAR_SIGN_MASK: u64 = 0x7fff_ffff_ffff_ffff;
    const TINY_BITS: u64 = 0x1;

    let bits = x.to_bits();
    if x.is_nan() || bits == f64::INFINITY.to_bits() {
        return x;
    }
    let abs = bits & CLEAR_SIGN_MASK;
    let next_bits = if abs == 0 {
        TINY_BITS
    } else if bits == abs {
        bits + 1
    } else {
        bits - 1
    };
    f64::from_bits(next_bits)
}

/// The next representable `f64` below `x`, toward `-inf` (§4.2: exclusive
/// bounds advance "by one ULP toward the interior"). Hand-rolled because
/// `f64::next_down` is not available under this workspace's
/// `rust-version = "1.85"`.
fn next_down(x: f64) -> f64 {
    const CLEAR_SIGN_MASK: u64 = 0x7fff_ffff_ffff_ffff;
    const NEG_TINY_BITS: u64 = 0x8000_0000_0000_0001;

    let bits = x.to_bits();
    if x.is_nan() || bits == f64::NEG_INFINITY.to_bits() {
        return x;
    }
    let abs = bits & CLEAR_SIGN_MASK;
    let next_bits = if abs == 0 {
        NEG_TINY_BITS
    } else if bits == abs {
        bits - 1
    } else {
        bits + 1
    };
    f64::from_bits(next_bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use crate::random::TapeRecorder;
    use serde_json::json;

    fn node(v: serde_json::Value) -> SchemaNode {
        SchemaNode::from_value(&v, "root").unwrap()
    }

    #[test]
    fn integer_respects_bounds() {
        let n = node(json!({"type":"integer","minimum":0,"maximum":10}));
        let mut rng = TapeRecorder::new(SmallRng::seed_from_u64(1));
        for _ in 0..50 {
            let v = gen_integer(&n, "root", &mut rng).unwrap();
            let i = v.as_i64().unwrap();
            assert!((0..=10).contains(&i));
        }
    }

    #[test]
    fn integer_multiple_of() {
        let n = node(json!({"type":"integer","minimum":0,"maximum":10,"multipleOf":3}));
        let mut rng = TapeRecorder::new(SmallRng::seed_from_u64(1));
        for _ in 0..50 {
            let v = gen_integer(&n, "root", &mut rng).unwrap();
            let i = v.as_i64().unwrap();
            assert_eq!(i % 3, 0);
            assert!((0..=10).contains(&i));
        }
    }

    #[test]
    fn integer_multiple_of_unsatisfiable_errors() {
        let n = node(json!({"type":"integer","minimum":1,"maximum":2,"multipleOf":7}));
        let mut rng = TapeRecorder::new(SmallRng::seed_from_u64(1));
        let err = gen_integer(&n, "root", &mut rng).unwrap_err();
        assert!(matches!(err, GenError::MultipleOfUnsatisfiable { .. }));
    }

    #[test]
    fn integer_enum_overrides() {
        let n = node(json!({"type":"integer","enum":[1,2,3]}));
        let mut rng = TapeRecorder::new(SmallRng::seed_from_u64(1));
        for _ in 0..20 {
            let v = gen_integer(&n, "root", &mut rng).unwrap();
            assert!([1, 2, 3].contains(&v.as_i64().unwrap()));
        }
    }

    #[test]
    fn exclusive_bounds_shift_by_one() {
        let n = node(json!({"type":"integer","minimum":0,"maximum":1,"exclusiveMinimum":true,"exclusiveMaximum":true}));
        let mut rng = TapeRecorder::new(SmallRng::seed_from_u64(1));
        // [0,1] exclusive on both ends has no integer solutions -> error
        let err = gen_integer(&n, "root", &mut rng).unwrap_err();
        assert!(matches!(err, GenError::MultipleOfUnsatisfiable { .. }));
    }

    #[test]
    fn number_respects_bounds() {
        let n = node(json!({"type":"number","minimum":-1.0,"maximum":1.0}));
        let opts = GenOptions::default();
        let mut rng = TapeRecorder::new(SmallRng::seed_from_u64(2));
        for _ in 0..50 {
            let v = gen_number(&n, "root", &opts, &mut rng).unwrap();
            let f = v.as_f64().unwrap();
            assert!((-1.0..=1.0).contains(&f));
        }
    }

    #[test]
    fn number_multiple_of_is_clamped_and_divisible() {
        let n = node(json!({"type":"number","multipleOf":0.5}));
        let opts = GenOptions::default();
        let mut rng = TapeRecorder::new(SmallRng::seed_from_u64(2));
        for _ in 0..20 {
            let v = gen_number(&n, "root", &opts, &mut rng).unwrap();
            let f = v.as_f64().unwrap();
            let ratio = f / 0.5;
            assert!((ratio - ratio.round()).abs() < 1e-6);
        }
    }

    #[test]
    fn next_up_and_next_down_step_by_one_ulp_at_large_magnitude() {
        let x = 1e16_f64;
        assert!(next_up(x) > x);
        assert!(next_down(x) < x);
        // A fixed f64::EPSILON addition would be absorbed by rounding here;
        // a true ULP step must not be.
        assert_ne!(next_up(x), x);
        assert_ne!(next_down(x), x);
    }

    #[test]
    fn number_exclusive_bound_excludes_value_at_large_magnitude() {
        let n = node(json!({
            "type": "number",
            "minimum": 1e16,
            "maximum": 1e16,
            "exclusiveMinimum": true,
            "exclusiveMaximum": false
        }));
        let opts = GenOptions::default();
        let mut rng = TapeRecorder::new(SmallRng::seed_from_u64(1));
        // minimum is excluded and equals maximum, so the range is empty.
        let err = gen_number(&n, "root", &opts, &mut rng).unwrap_err();
        assert!(matches!(err, GenError::MultipleOfUnsatisfiable { .. }));
    }

    #[test]
    fn boolean_uniform() {
        let n = node(json!({"type":"boolean"}));
        let mut rng = TapeRecorder::new(SmallRng::seed_from_u64(3));
        let mut saw_true = false;
        let mut saw_false = false;
        for _ in 0..50 {
            match gen_boolean(&n, &mut rng) {
                Value::Bool(true) => saw_true = true,
                Value::Bool(false) => saw_false = true,
                other => panic!("unexpected {other:?}"),
            }
        }
        assert!(saw_true && saw_false);
    }
}
