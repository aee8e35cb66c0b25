//! Type-aware approximate equality between two observations of a member.
//!
//! Symmetric and reflexive. Not transitive across the float epsilon: `a ~ b`
//! and `b ~ c` does not imply `a ~ c`.

use super::Value;

/// Absolute tolerance for scalar floats
pub const FLOAT_EPSILON: f64 = 1e-4;

/// Euclidean distance below which two vectors are the same
pub const VECTOR_EPSILON: f64 = 1e-3;

/// Angular distance (degrees) below which two rotations are the same
pub const ROTATION_EPSILON_DEG: f64 = 0.1;

/// Decide whether two observations of a member are "the same".
pub fn approx_equal(old: &Value, new: &Value) -> bool {
    match (old, new) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Float(a), Value::Float(b)) => floats_close(*a, *b),
        (Value::Vec2(a), Value::Vec2(b)) => vectors_close(a, b),
        (Value::Vec3(a), Value::Vec3(b)) => vectors_close(a, b),
        (Value::Vec4(a), Value::Vec4(b)) => vectors_close(a, b),
        (Value::Quat(a), Value::Quat(b)) => rotations_close(a, b),
        (Value::Color(a), Value::Color(b)) => identical_components(a, b),
        (Value::Seq(a), Value::Seq(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| approx_equal(x, y))
        }
        (a, b) => a == b,
    }
}

fn same_float(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

fn identical_components(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| same_float(*x, *y))
}

fn floats_close(a: f64, b: f64) -> bool {
    same_float(a, b) || (a - b).abs() < FLOAT_EPSILON
}

fn vectors_close(a: &[f64], b: &[f64]) -> bool {
    if identical_components(a, b) {
        return true;
    }
    let distance = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt();
    distance < VECTOR_EPSILON
}

fn rotations_close(a: &[f64; 4], b: &[f64; 4]) -> bool {
    if identical_components(a, b) {
        return true;
    }
    let norm_a = a.iter().map(|c| c * c).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|c| c * c).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return vectors_close(a, b);
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    // q and -q encode the same rotation
    let cos_half = (dot.abs() / (norm_a * norm_b)).min(1.0);
    let angle = 2.0 * cos_half.acos().to_degrees();
    angle < ROTATION_EPSILON_DEG
}
