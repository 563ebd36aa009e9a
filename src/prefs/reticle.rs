use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Helper reticle drawn on top of the crosshair image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reticle {
    #[default]
    Dot,
    Cross,
    Circle,
    /// Sentinel: no reticle. Also what unknown persisted values load as.
    #[serde(other)]
    None,
}

impl Reticle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reticle::None => "none",
            Reticle::Dot => "dot",
            Reticle::Cross => "cross",
            Reticle::Circle => "circle",
        }
    }

    /// The fixed catalog, in display order.
    pub fn all() -> &'static [Reticle] {
        &[Reticle::None, Reticle::Dot, Reticle::Cross, Reticle::Circle]
    }
}

impl FromStr for Reticle {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Reticle::None),
            "dot" => Ok(Reticle::Dot),
            "cross" => Ok(Reticle::Cross),
            "circle" => Ok(Reticle::Circle),
            _ => Err(ValidationError::Reticle {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Reticle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("Circle".parse::<Reticle>(), Ok(Reticle::Circle));
        assert_eq!(" none ".parse::<Reticle>(), Ok(Reticle::None));
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!("crosshair".parse::<Reticle>().is_err());
    }

    #[test]
    fn unknown_persisted_value_loads_as_none() {
        let reticle: Reticle = serde_json::from_str("\"triangle\"").unwrap();
        assert_eq!(reticle, Reticle::None);
    }

    #[test]
    fn known_values_round_trip_through_json() {
        for reticle in Reticle::all() {
            let json = serde_json::to_string(reticle).unwrap();
            assert_eq!(json, format!("\"{}\"", reticle.as_str()));
            assert_eq!(serde_json::from_str::<Reticle>(&json).unwrap(), *reticle);
        }
    }
}
