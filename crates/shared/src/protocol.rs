use serde::{Deserialize, Serialize};

use crate::domain::{Role, Turn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPart {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTurn {
    pub role: Role,
    pub parts: Vec<TextPart>,
}

impl From<&Turn> for WireTurn {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role(),
            parts: vec![TextPart {
                text: turn.text().to_string(),
            }],
        }
    }
}

/// Body of `POST /ask`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<WireTurn>>,
}

impl AskRequest {
    pub fn new(query: impl Into<String>, history: Option<&[Turn]>) -> Self {
        Self {
            query: query.into(),
            history: history.map(|turns| turns.iter().map(WireTurn::from).collect()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskResponse {
    pub response: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
