//! Deterministic front-matter serialization.
//!
//! Output order is fixed: the hardcoded fields (`id, title, status, kind,
//! created`), then configurable fields sorted by name. Scalars are emitted
//! plain unless they need double quotes to survive a re-parse. Repeated
//! parse/render cycles therefore produce byte-identical files.

use crate::error::{DocketError, Result};
use crate::frontmatter::{WorkItem, DELIMITER};
use crate::value::{FieldValue, Number};

/// Characters that force a double-quoted scalar anywhere in the value.
const SIGNIFICANT: &[char] = &[
    ':', '#', '[', ']', '{', '}', ',', '"', '\'', '\\', '\n', '\r', '\t', '&', '*', '!', '|', '>',
    '%',
];

/// Indicators that change meaning at the start of a plain scalar.
const LEADING_INDICATORS: &[char] = &['-', '?', '@', '`'];

/// Render a full document: front matter block followed by `body`.
pub fn render(item: &WorkItem, body: &str) -> Result<String> {
    let mut out = String::new();
    out.push_str(DELIMITER);
    out.push('\n');
    for (name, value) in item.hardcoded() {
        out.push_str(name);
        out.push_str(": ");
        out.push_str(&quote_scalar(value));
        out.push('\n');
    }
    for (name, value) in &item.fields {
        write_field(&mut out, name, value)?;
    }
    out.push_str(DELIMITER);
    out.push('\n');
    out.push_str(body);
    Ok(out)
}

fn write_field(out: &mut String, name: &str, value: &FieldValue) -> Result<()> {
    let key = quote_string(name);
    match value {
        FieldValue::Mapping(map) if !map.is_empty() => {
            let block = serde_yaml::to_string(value)
                .map_err(|e| DocketError::Write(format!("field '{name}': {e}")))?;
            out.push_str(&key);
            out.push_str(":\n");
            for line in block.lines() {
                out.push_str("  ");
                out.push_str(line);
                out.push('\n');
            }
        }
        other => {
            out.push_str(&format!("{key}: {}\n", flow(other)));
        }
    }
    Ok(())
}

/// Inline (flow-style) form of a value.
fn flow(value: &FieldValue) -> String {
    match value {
        FieldValue::Null => "null".to_string(),
        FieldValue::Bool(b) => b.to_string(),
        FieldValue::Number(n) => number(*n),
        FieldValue::String(s) => quote_string(s),
        FieldValue::Sequence(items) => {
            let inner: Vec<String> = items.iter().map(flow).collect();
            format!("[{}]", inner.join(", "))
        }
        FieldValue::Mapping(map) => {
            let inner: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", quote_string(k), flow(v)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
    }
}

fn number(n: Number) -> String {
    match n {
        Number::Int(i) => i.to_string(),
        Number::UInt(u) => u.to_string(),
        Number::Float(f) if f.is_nan() => ".nan".to_string(),
        Number::Float(f) if f.is_infinite() => {
            if f > 0.0 { ".inf" } else { "-.inf" }.to_string()
        }
        Number::Float(f) => format!("{f:?}"),
    }
}

/// True when a plain scalar would not read back as the same text.
pub fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || s.trim() != s
        || s.contains(SIGNIFICANT)
        || s.starts_with(LEADING_INDICATORS)
}

/// YAML null spellings. A plain one reads back as a missing value.
fn is_null_spelling(s: &str) -> bool {
    matches!(s, "~" | "null" | "Null" | "NULL")
}

/// Quote a hardcoded field value. These are read back as raw text, so only
/// syntactically significant content and null spellings need quoting.
pub fn quote_scalar(s: &str) -> String {
    if needs_quotes(s) || is_null_spelling(s) {
        double_quoted(s)
    } else {
        s.to_string()
    }
}

/// Quote a string value of a configurable field. On top of
/// [`quote_scalar`], text that YAML would resolve to a null, boolean or
/// number (`true`, `~`, `42`) is quoted so it stays a string.
pub fn quote_string(s: &str) -> String {
    if needs_quotes(s) || !resolves_to_string(s) {
        double_quoted(s)
    } else {
        s.to_string()
    }
}

fn resolves_to_string(s: &str) -> bool {
    matches!(
        serde_yaml::from_str::<serde_yaml::Value>(s),
        Ok(serde_yaml::Value::String(ref parsed)) if parsed == s
    )
}

fn double_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() && (c as u32) < 0x100 => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
