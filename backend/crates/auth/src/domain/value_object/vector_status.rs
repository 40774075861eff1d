//! Processing state of the AI introduction embedding

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// `users.ai_introduction_vector`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorStatus {
    #[default]
    Waiting,
    Success,
    Failure,
}

impl VectorStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            VectorStatus::Waiting => "waiting",
            VectorStatus::Success => "success",
            VectorStatus::Failure => "failure",
        }
    }
}

impl FromStr for VectorStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(VectorStatus::Waiting),
            "success" => Ok(VectorStatus::Success),
            "failure" => Ok(VectorStatus::Failure),
            other => Err(format!("Unknown vector status: {other}")),
        }
    }
}

impl fmt::Display for VectorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        for status in [VectorStatus::Waiting, VectorStatus::Success, VectorStatus::Failure] {
            assert_eq!(status.as_str().parse::<VectorStatus>(), Ok(status));
        }
        assert!("pending".parse::<VectorStatus>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&VectorStatus::Waiting).unwrap(),
            "\"waiting\""
        );
    }
}
