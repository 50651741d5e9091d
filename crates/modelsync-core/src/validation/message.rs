use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageCode {
    /// Predicate was expected to hold nothing but has values
    ExcessResources,
    /// Predicate was expected to hold a value but has none
    MissingResources,
    /// Predicate has values, none of them the expected one
    ResourcesMismatch,
}

impl MessageCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageCode::ExcessResources => "EXCESS_RESOURCES",
            MessageCode::MissingResources => "MISSING_RESOURCES",
            MessageCode::ResourcesMismatch => "RESOURCES_MISMATCH",
        }
    }
}

impl std::fmt::Display for MessageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validation finding
///
/// `args` are positional: node id, predicate, then the expected and/or found
/// values depending on `code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationMessage {
    pub node_id: String,
    pub code: MessageCode,
    pub args: Vec<String>,
}

impl ValidationMessage {
    pub fn new(node_id: impl Into<String>, code: MessageCode, args: Vec<String>) -> Self {
        Self {
            node_id: node_id.into(),
            code,
            args,
        }
    }
}

impl std::fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.code, self.node_id, self.args.join(" | "))
    }
}
