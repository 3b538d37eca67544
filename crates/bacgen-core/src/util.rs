//! Helpers for reading annotated JSON input.

use serde_json::Value;

/// Strip `//` and `#` comments from JSON text so it can be fed to serde_json.
///
/// Comments may occupy a whole line or trail a value. Markers inside string
/// literals are left untouched. Line structure is preserved so parse errors
/// still point at the right line.
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.lines().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(strip_line(line));
    }
    out
}

fn strip_line(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;
    let mut prev = '\0';
    for (idx, ch) in line.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
        } else {
            match ch {
                '"' => in_string = true,
                '#' => return &line[..idx],
                '/' if prev == '/' => return &line[..idx - 1],
                _ => {}
            }
        }
        prev = ch;
    }
    line
}

/// JSON truthiness as config files use it: `null`, `false`, `""`, `0`, and
/// empty collections all read as "not set".
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
