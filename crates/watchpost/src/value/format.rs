//! Canonical display rendering for observed values.

use super::Value;

/// Rendering of an absent value
pub const NULL_LITERAL: &str = "null";

/// Sequences up to this length are rendered in full
pub const MAX_INLINE_ITEMS: usize = 5;

/// Number of leading elements shown for longer sequences
pub const PREVIEW_ITEMS: usize = 3;

/// Render a value into its canonical display string.
///
/// Total and pure: the same value always yields the same string. Elements of a
/// sequence are formatted with the same rules, except nested containers, which
/// fall back to their default string form so output stays bounded.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => NULL_LITERAL.to_string(),
        Value::Float(x) => format_float(*x),
        Value::Vec2(c) => format_components(c),
        Value::Vec3(c) => format_components(c),
        Value::Vec4(c) => format_components(c),
        Value::Quat([x, y, z, w]) => format!(
            "(x: {}, y: {}, z: {}, w: {})",
            format_float(*x),
            format_float(*y),
            format_float(*z),
            format_float(*w)
        ),
        Value::Color([r, g, b, a]) => format!(
            "RGBA({}, {}, {}, {})",
            format_float(*r),
            format_float(*g),
            format_float(*b),
            format_float(*a)
        ),
        Value::Seq(items) => format_sequence(items),
        Value::Map { len } => format!("{{Map: {} entries}}", len),
        Value::Entity(r) => format!("{} on {}", r.type_name, r.owner),
        Value::Bool(_) | Value::Int(_) | Value::Str(_) | Value::Opaque(_) => value.to_string(),
    }
}

fn format_float(x: f64) -> String {
    format!("{:.3}", x)
}

fn format_components(components: &[f64]) -> String {
    let parts: Vec<String> = components.iter().map(|c| format_float(*c)).collect();
    format!("({})", parts.join(", "))
}

fn format_element(value: &Value) -> String {
    if value.is_container() {
        value.to_string()
    } else {
        format_value(value)
    }
}

fn format_sequence(items: &[Value]) -> String {
    if items.len() <= MAX_INLINE_ITEMS {
        let parts: Vec<String> = items.iter().map(format_element).collect();
        return format!("[{}]", parts.join(", "));
    }

    let preview: Vec<String> = items
        .iter()
        .take(PREVIEW_ITEMS)
        .map(format_element)
        .collect();
    format!("[{} items: {}, ...]", items.len(), preview.join(", "))
}
