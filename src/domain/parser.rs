//! Response parsing: envelope extraction and roadmap tree decoding.
//!
//! The tree walk runs on an explicit work stack over a [`RoadmapArena`], so
//! document depth never maps onto call-stack depth. The only nesting bound is
//! serde_json's own parser recursion limit, which surfaces as
//! [`SchemaError::InvalidJson`].

use generational_arena::Index;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::domain::arena::{NodeData, RoadmapArena};
use crate::domain::error::{json_type_name, SchemaError};
use crate::domain::node::RoadmapNode;

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, SchemaError>;

/// Deepest roadmap accepted, counted in node levels (the root is level 1).
pub const MAX_ROADMAP_DEPTH: usize = 128;

/// How a `children` value that is present but not an array is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChildrenPolicy {
    /// Treat it as "no children".
    #[default]
    Lenient,
    /// Reject the document with [`SchemaError::ChildrenNotArray`].
    Strict,
}

impl ChildrenPolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            ChildrenPolicy::Strict
        } else {
            ChildrenPolicy::Lenient
        }
    }
}

/// Extract the model's answer from an `/api/generate` envelope.
///
/// String answers are returned verbatim; any other JSON value is returned in
/// its serde_json textual form.
pub fn extract_answer(raw: &str) -> ParseResult<String> {
    let envelope: Value = serde_json::from_str(raw)?;
    let object = envelope.as_object().ok_or(SchemaError::NotAnObject {
        path: "$".to_string(),
        found: json_type_name(&envelope),
    })?;

    log_envelope_metadata(object);

    let answer = object.get("response").ok_or(SchemaError::MissingField {
        field: "response",
        context: "generate response envelope",
    })?;

    Ok(value_as_text(answer))
}

/// Parse a roadmap document with the default (lenient) children policy.
pub fn parse_tree(json: &str) -> ParseResult<RoadmapNode> {
    parse_tree_with(json, ChildrenPolicy::default())
}

/// Parse a roadmap document into an owned tree.
///
/// Either the whole document converts or an error is returned; no partial
/// tree is ever produced.
pub fn parse_tree_with(json: &str, policy: ChildrenPolicy) -> ParseResult<RoadmapNode> {
    let root = parse_document(json)?;
    let arena = build_arena(&root, policy)?;
    debug!(nodes = arena.len(), ?policy, "parsed roadmap document");
    arena.into_tree().ok_or_else(|| SchemaError::NotAnObject {
        path: "$".to_string(),
        found: json_type_name(&root),
    })
}

/// Decode `json` into a `Value` after bounding its nesting.
///
/// Each roadmap level is two JSON levels (the node object and its `children`
/// array), so the scan allows twice [`MAX_ROADMAP_DEPTH`]. serde_json's own
/// recursion limit is lifted because the scan already bounds the stack used
/// by the decoder.
fn parse_document(json: &str) -> ParseResult<Value> {
    if exceeds_nesting(json, 2 * MAX_ROADMAP_DEPTH) {
        return Err(SchemaError::TooDeep {
            limit: MAX_ROADMAP_DEPTH,
        });
    }
    let mut de = serde_json::Deserializer::from_str(json);
    de.disable_recursion_limit();
    let value = Value::deserialize(&mut de)?;
    de.end()?;
    Ok(value)
}

/// Whether `{`/`[` nesting in `json` goes past `max`. Brackets inside strings
/// do not count; malformed input is left for the decoder to report.
fn exceeds_nesting(json: &str, max: usize) -> bool {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for byte in json.bytes() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                if depth > max {
                    return true;
                }
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    false
}

/// Fill an arena from a parsed document, depth-first, without recursion.
pub fn build_arena(root: &Value, policy: ChildrenPolicy) -> ParseResult<RoadmapArena> {
    struct Pending<'v> {
        value: &'v Value,
        parent: Option<Index>,
        path: String,
    }

    let mut arena = RoadmapArena::new();
    let mut stack = vec![Pending {
        value: root,
        parent: None,
        path: "$".to_string(),
    }];

    while let Some(pending) = stack.pop() {
        let object = pending.value.as_object().ok_or_else(|| SchemaError::NotAnObject {
            path: pending.path.clone(),
            found: json_type_name(pending.value),
        })?;

        let idx = arena.insert_node(node_data(object), pending.parent);
        trace!(path = %pending.path, "node inserted");

        let children = match object.get("children") {
            None | Some(Value::Null) => continue,
            Some(Value::Array(children)) => children,
            Some(other) => match policy {
                ChildrenPolicy::Lenient => {
                    debug!(
                        path = %pending.path,
                        found = json_type_name(other),
                        "ignoring non-array children"
                    );
                    continue;
                }
                ChildrenPolicy::Strict => {
                    return Err(SchemaError::ChildrenNotArray {
                        path: pending.path,
                        found: json_type_name(other),
                    })
                }
            },
        };

        // Reverse push: first child is popped (and appended) first
        for (i, child) in children.iter().enumerate().rev() {
            stack.push(Pending {
                value: child,
                parent: Some(idx),
                path: format!("{}.children[{}]", pending.path, i),
            });
        }
    }

    Ok(arena)
}

/// Return the body of a Markdown code fence wrapping `text`, if any.
///
/// Handles both ```` ```json ```` and bare ```` ``` ```` fences; text without
/// a complete fence is returned trimmed but otherwise unchanged.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let after_ticks = &trimmed[start + 3..];
    let Some(end) = after_ticks.find("```") else {
        return trimmed;
    };
    let fenced = &after_ticks[..end];
    let body = match fenced.find('\n') {
        // Info string such as `json` runs to the end of the opening line
        Some(newline) => &fenced[newline + 1..],
        None => skip_inline_info_string(fenced),
    };
    body.trim()
}

/// One-line fence: drop a leading word that is followed by whitespace.
fn skip_inline_info_string(fenced: &str) -> &str {
    let word_len = fenced
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(fenced.len());
    match fenced[word_len..].chars().next() {
        Some(c) if word_len > 0 && c.is_whitespace() => &fenced[word_len..],
        _ => fenced,
    }
}

fn node_data(object: &Map<String, Value>) -> NodeData {
    NodeData {
        title: optional_text(object, "title"),
        description: optional_text(object, "description"),
        link: optional_text(object, "link"),
    }
}

/// Absent and explicit `null` both map to `None`.
fn optional_text(object: &Map<String, Value>, field: &str) -> Option<String> {
    match object.get(field) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value_as_text(value)),
    }
}

fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn log_envelope_metadata(object: &Map<String, Value>) {
    let model = object.get("model").and_then(Value::as_str);
    let done = object.get("done").and_then(Value::as_bool);
    let eval_count = object.get("eval_count").and_then(Value::as_u64);
    debug!(?model, ?done, ?eval_count, "generate envelope received");
}
