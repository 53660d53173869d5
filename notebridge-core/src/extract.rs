use serde_json::Value;

use crate::GatewayError;

/// Pull the first parseable top-level JSON object out of free-form agent text.
///
/// The agent is asked for bare JSON but routinely wraps it in prose or code
/// fences. One pass over the text records every balanced `{...}` group,
/// ignoring braces inside string literals. Whenever an outermost group closes,
/// its groups are tried in order of where they start; groups left inside an
/// unclosed brace are tried once the text is exhausted.
pub fn extract_json_object(text: &str) -> Result<Value, GatewayError> {
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(text.trim()) {
        return Ok(value);
    }

    let mut open = Vec::new();
    let mut closed = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (index, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' || ch == '\n' {
                // JSON strings never hold a raw newline, so a stray quote in
                // prose cannot swallow the rest of the reply.
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' if !open.is_empty() => in_string = true,
            '{' => open.push(index),
            '}' => {
                let Some(start) = open.pop() else {
                    continue;
                };
                closed.push((start, index + 1));
                if open.is_empty() {
                    if let Some(value) = first_object(text, &mut closed) {
                        return Ok(value);
                    }
                }
            }
            _ => {}
        }
    }

    first_object(text, &mut closed).ok_or_else(|| {
        GatewayError::Unparseable(format!(
            "no JSON object found in agent reply ({} bytes)",
            text.len()
        ))
    })
}

/// Try `groups` earliest start first, then forget them.
fn first_object(text: &str, groups: &mut Vec<(usize, usize)>) -> Option<Value> {
    groups.sort_unstable_by_key(|&(start, _)| start);
    let found = groups
        .iter()
        .find_map(|&(start, end)| match serde_json::from_str::<Value>(&text[start..end]) {
            Ok(value @ Value::Object(_)) => Some(value),
            _ => None,
        });
    groups.clear();
    found
}
