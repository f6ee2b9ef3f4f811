use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

/// Type tag of a scalar default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    String,
    Number,
    Boolean,
    Null,
    /// Lists are not addressable by key, so they are treated as opaque values.
    Sequence,
}

impl ScalarKind {
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Number => "number",
            ScalarKind::Boolean => "boolean",
            ScalarKind::Null => "null",
            ScalarKind::Sequence => "sequence",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A chart's default values as a tree of objects and scalars.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueNode {
    /// `text` is the display form: strings quoted, everything else canonical.
    Scalar { text: String, kind: ScalarKind },
    Object(IndexMap<String, ValueNode>),
}

impl ValueNode {
    pub fn empty_object() -> Self {
        ValueNode::Object(IndexMap::new())
    }

    pub fn string(value: &str) -> Self {
        ValueNode::Scalar {
            text: quote(value),
            kind: ScalarKind::String,
        }
    }

    pub fn number(value: impl fmt::Display) -> Self {
        ValueNode::Scalar {
            text: value.to_string(),
            kind: ScalarKind::Number,
        }
    }

    pub fn boolean(value: bool) -> Self {
        ValueNode::Scalar {
            text: value.to_string(),
            kind: ScalarKind::Boolean,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, ValueNode::Object(_))
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, ValueNode>> {
        match self {
            ValueNode::Object(map) => Some(map),
            ValueNode::Scalar { .. } => None,
        }
    }

    /// Follow a key path from this node.
    pub fn get_path<S: AsRef<str>>(&self, path: &[S]) -> Option<&ValueNode> {
        path.iter()
            .try_fold(self, |node, key| node.as_object()?.get(key.as_ref()))
    }

    /// Convert a parsed YAML document. Mapping keys that are not strings are
    /// rendered through their scalar text; tags are dropped.
    pub fn from_yaml(value: &serde_yaml::Value) -> Self {
        use serde_yaml::Value;
        match value {
            Value::Mapping(mapping) => ValueNode::Object(
                mapping
                    .iter()
                    .map(|(k, v)| (yaml_key(k), ValueNode::from_yaml(v)))
                    .collect(),
            ),
            Value::String(s) => ValueNode::string(s),
            Value::Number(n) => ValueNode::number(n),
            Value::Bool(b) => ValueNode::boolean(*b),
            Value::Null => ValueNode::Scalar {
                text: "null".to_string(),
                kind: ScalarKind::Null,
            },
            Value::Sequence(_) => ValueNode::Scalar {
                text: serde_json::to_string(value).unwrap_or_else(|_| "[]".to_string()),
                kind: ScalarKind::Sequence,
            },
            Value::Tagged(tagged) => ValueNode::from_yaml(&tagged.value),
        }
    }

    /// Block-style YAML for this node, each line indented by `indent` spaces.
    pub fn to_yaml(&self, indent: usize) -> String {
        let mut out = String::new();
        self.write_yaml(&mut out, indent);
        out
    }

    fn write_yaml(&self, out: &mut String, indent: usize) {
        match self {
            ValueNode::Scalar { text, .. } => {
                out.push_str(&" ".repeat(indent));
                out.push_str(text);
                out.push('\n');
            }
            ValueNode::Object(map) if map.is_empty() => {
                out.push_str(&" ".repeat(indent));
                out.push_str("{}\n");
            }
            ValueNode::Object(map) => {
                for (key, child) in map {
                    out.push_str(&" ".repeat(indent));
                    out.push_str(key);
                    match child {
                        ValueNode::Scalar { text, .. } => {
                            out.push_str(": ");
                            out.push_str(text);
                            out.push('\n');
                        }
                        ValueNode::Object(inner) if inner.is_empty() => out.push_str(": {}\n"),
                        ValueNode::Object(_) => {
                            out.push_str(":\n");
                            child.write_yaml(out, indent + 2);
                        }
                    }
                }
            }
        }
    }
}

fn quote(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value))
}

fn yaml_key(key: &serde_yaml::Value) -> String {
    use serde_yaml::Value;
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}
