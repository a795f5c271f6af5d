//! Answer types.

use crate::types::{Citation, SourceKind};
use serde::{Deserialize, Serialize};

/// Context handed to the model when neither local nor web retrieval found anything.
pub const NO_CONTEXT_PLACEHOLDER: &str = "No context available.";

/// A generated answer and the context it was grounded on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// Model output, verbatim
    pub text: String,

    pub source_kind: SourceKind,

    /// Citations for the context actually used
    pub citations: Vec<Citation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_serialization() {
        let answer = Answer {
            text: "Cats are mammals.".to_string(),
            source_kind: SourceKind::Web,
            citations: vec![Citation::web("http://u")],
        };

        let json = serde_json::to_value(&answer).unwrap();
        assert_eq!(json["source_kind"], "web");
        assert_eq!(json["citations"][0]["type"], "web");
        assert_eq!(json["citations"][0]["label"], "http://u");
    }
}
