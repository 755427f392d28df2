use serde::Serialize;
use sonic_rs::Value;

use crate::error::FactsResult;

/// Result reported back to the invoking automation system.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Success { changed: bool, data: Option<Value> },
    Failure { failed: bool, msg: String },
}

impl Outcome {
    pub fn facts(data: Option<Value>) -> Self {
        Self::Success {
            changed: false,
            data,
        }
    }

    pub fn failure(msg: impl Into<String>) -> Self {
        Self::Failure {
            failed: true,
            msg: msg.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Success { data, .. } => data.as_ref(),
            Self::Failure { .. } => None,
        }
    }

    pub fn msg(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { msg, .. } => Some(msg),
        }
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }

    pub fn to_json(&self) -> FactsResult<String> {
        Ok(sonic_rs::to_string(self)?)
    }
}
