use serde::Serialize;
use serde_json::Value;

const ASSISTANT_MESSAGE: &str = "assistant_message";

#[derive(Debug, Serialize)]
pub struct MessageRequest<'a> {
    pub messages: Vec<MessageCreate<'a>>,
}

impl<'a> MessageRequest<'a> {
    pub fn user(content: &'a str) -> Self {
        Self {
            messages: vec![MessageCreate {
                role: "user",
                content,
            }],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageCreate<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

/// Agent id from a create response: `agents[0].id`, then `agent.id`, then `id`.
pub fn agent_id_from_body(body: &Value) -> Option<String> {
    body.get("agents")
        .and_then(Value::as_array)
        .and_then(|agents| agents.first())
        .and_then(id_of)
        .or_else(|| body.get("agent").and_then(id_of))
        .or_else(|| id_of(body))
}

/// Agent id from a `Location` header such as `/v1/agents/agent-1234`.
pub fn agent_id_from_location(location: &str) -> Option<String> {
    location
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| segment.starts_with("agent-"))
        .map(ToOwned::to_owned)
}

fn id_of(value: &Value) -> Option<String> {
    match value.get("id")? {
        Value::String(id) if !id.trim().is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Concatenated text of every assistant message in a messages response.
pub fn assistant_text(body: &Value) -> Option<String> {
    let parts = body
        .get("messages")?
        .as_array()?
        .iter()
        .filter(|message| {
            message.get("message_type").and_then(Value::as_str) == Some(ASSISTANT_MESSAGE)
        })
        .filter_map(|message| content_text(message.get("content")?))
        .collect::<Vec<_>>();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

fn content_text(content: &Value) -> Option<String> {
    match content {
        Value::String(text) => Some(text.clone()),
        Value::Array(parts) => {
            let text = parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("");
            (!text.is_empty()).then_some(text)
        }
        _ => None,
    }
}
