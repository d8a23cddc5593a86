//! Synthesis voices.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Voices accepted by the speech endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum Voice {
    Alloy,
    Ash,
    Coral,
    Echo,
    Fable,
    Onyx,
    #[default]
    Nova,
    Sage,
    Shimmer,
}

impl Voice {
    /// Every voice, in the order tool schemas list them.
    pub const ALL: [Voice; 9] = [
        Voice::Alloy,
        Voice::Ash,
        Voice::Coral,
        Voice::Echo,
        Voice::Fable,
        Voice::Onyx,
        Voice::Nova,
        Voice::Sage,
        Voice::Shimmer,
    ];

    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Voice::Alloy => "alloy",
            Voice::Ash => "ash",
            Voice::Coral => "coral",
            Voice::Echo => "echo",
            Voice::Fable => "fable",
            Voice::Onyx => "onyx",
            Voice::Nova => "nova",
            Voice::Sage => "sage",
            Voice::Shimmer => "shimmer",
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Voice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Voice::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let names: Vec<_> = Voice::ALL.iter().map(|v| v.as_str()).collect();
                format!("unknown voice '{s}'; expected one of {}", names.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_nova() {
        assert_eq!(Voice::default(), Voice::Nova);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Shimmer".parse::<Voice>().unwrap(), Voice::Shimmer);
        assert_eq!(" ash ".parse::<Voice>().unwrap(), Voice::Ash);
    }

    #[test]
    fn unknown_voice_lists_choices() {
        let err = "robot".parse::<Voice>().unwrap_err();
        assert!(err.contains("alloy"));
        assert!(err.contains("shimmer"));
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Voice::Onyx).unwrap(), "\"onyx\"");
    }
}
