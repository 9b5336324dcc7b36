//! Adapter for converting LLM messages to OpenAI format.

use crate::error::{ConnoisseurError, Result};
use crate::llm::models::{LlmMessage, LlmToolCall, MessageRole};
use base64::Engine;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;

/// Determine image type from file extension.
fn get_image_type(file_path: &str) -> &'static str {
    let ext = Path::new(file_path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" => "jpeg",
        "png" => "png",
        "gif" => "gif",
        "webp" => "webp",
        _ => "jpeg", // Default to jpeg for unknown types
    }
}

/// Read and encode an image file as a base64 data URL.
fn encode_image_as_base64(file_path: &str) -> Result<String> {
    let bytes = std::fs::read(file_path).map_err(|e| {
        ConnoisseurError::GatewayError(format!("Failed to read image {}: {}", file_path, e))
    })?;
    let base64_data = base64::engine::general_purpose::STANDARD.encode(&bytes);
    let image_type = get_image_type(file_path);
    Ok(format!("data:image/{};base64,{}", image_type, base64_data))
}

fn adapt_user_message(msg: &LlmMessage) -> Result<Value> {
    let image_paths = match msg.image_paths.as_deref() {
        Some(paths) if !paths.is_empty() => paths,
        _ => {
            return Ok(json!({
                "role": "user",
                "content": msg.content.as_deref().unwrap_or("")
            }))
        }
    };

    let mut content_parts = Vec::new();

    if let Some(text) = msg.content.as_deref().filter(|t| !t.is_empty()) {
        content_parts.push(json!({
            "type": "text",
            "text": text
        }));
    }

    // An image the model never sees would silently change the analysis, so any
    // unreadable image fails the whole request.
    for path in image_paths {
        let data_url = encode_image_as_base64(path)?;
        content_parts.push(json!({
            "type": "image_url",
            "image_url": {
                "url": data_url
            }
        }));
    }

    Ok(json!({
        "role": "user",
        "content": content_parts
    }))
}

/// Adapt LLM messages to OpenAI format.
pub fn adapt_messages_to_openai(messages: &[LlmMessage]) -> Result<Vec<Value>> {
    let mut result = Vec::with_capacity(messages.len());

    for msg in messages {
        let openai_msg = match msg.role {
            MessageRole::System => json!({
                "role": "system",
                "content": msg.content.as_deref().unwrap_or("")
            }),
            MessageRole::User => adapt_user_message(msg)?,
            MessageRole::Assistant => {
                let mut assistant_msg = json!({
                    "role": "assistant"
                });

                if let Some(ref content) = msg.content {
                    assistant_msg["content"] = json!(content);
                }

                if let Some(ref tool_calls) = msg.tool_calls {
                    let formatted_calls = tool_calls
                        .iter()
                        .map(|tc| -> Result<Value> {
                            Ok(json!({
                                "id": tc.id.as_deref().unwrap_or(""),
                                "type": "function",
                                "function": {
                                    "name": tc.name,
                                    "arguments": serde_json::to_string(&tc.arguments)?
                                }
                            }))
                        })
                        .collect::<Result<Vec<Value>>>()?;
                    assistant_msg["tool_calls"] = json!(formatted_calls);
                }

                assistant_msg
            }
            MessageRole::Tool => {
                // OpenAI pairs each tool message with the call it answers
                let tool_call_id = msg
                    .tool_calls
                    .as_ref()
                    .and_then(|tcs| tcs.first())
                    .and_then(|tc| tc.id.clone())
                    .unwrap_or_default();

                json!({
                    "role": "tool",
                    "content": msg.content.as_deref().unwrap_or(""),
                    "tool_call_id": tool_call_id
                })
            }
        };

        result.push(openai_msg);
    }

    Ok(result)
}

/// Convert tool calls from OpenAI format to internal format.
pub fn convert_tool_calls(tool_calls: &[Value]) -> Vec<LlmToolCall> {
    tool_calls
        .iter()
        .filter_map(|tc| {
            let id = tc["id"].as_str().map(String::from);
            let name = tc["function"]["name"].as_str()?.to_string();
            let args_str = tc["function"]["arguments"].as_str().unwrap_or("{}");

            let arguments: HashMap<String, Value> =
                serde_json::from_str(args_str).unwrap_or_default();

            Some(LlmToolCall {
                id,
                name,
                arguments,
            })
        })
        .collect()
}
