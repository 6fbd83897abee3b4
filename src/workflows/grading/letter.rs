use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Letter grades on the four-point scale, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    #[serde(rename = "FF")]
    Ff,
    #[serde(rename = "FD")]
    Fd,
    #[serde(rename = "DD")]
    Dd,
    #[serde(rename = "DC")]
    Dc,
    #[serde(rename = "CC")]
    Cc,
    #[serde(rename = "CB", alias = "BC")]
    Cb,
    #[serde(rename = "BB")]
    Bb,
    #[serde(rename = "BA")]
    Ba,
    #[serde(rename = "AA")]
    Aa,
}

impl LetterGrade {
    pub const fn ordered() -> [Self; 9] {
        [
            Self::Aa,
            Self::Ba,
            Self::Bb,
            Self::Cb,
            Self::Cc,
            Self::Dc,
            Self::Dd,
            Self::Fd,
            Self::Ff,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Aa => "AA",
            Self::Ba => "BA",
            Self::Bb => "BB",
            Self::Cb => "CB",
            Self::Cc => "CC",
            Self::Dc => "DC",
            Self::Dd => "DD",
            Self::Fd => "FD",
            Self::Ff => "FF",
        }
    }

    /// Nominal four-point coefficient of the letter.
    pub const fn coefficient(self) -> f64 {
        match self {
            Self::Aa => 4.0,
            Self::Ba => 3.5,
            Self::Bb => 3.0,
            Self::Cb => 2.5,
            Self::Cc => 2.0,
            Self::Dc => 1.5,
            Self::Dd => 1.0,
            Self::Fd => 0.5,
            Self::Ff => 0.0,
        }
    }

    /// Highest letter whose nominal coefficient does not exceed `coefficient`.
    pub fn from_coefficient(coefficient: f64) -> Self {
        Self::ordered()
            .into_iter()
            .find(|letter| coefficient >= letter.coefficient())
            .unwrap_or(Self::Ff)
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown letter grade '{0}'")]
pub struct UnknownLetterGrade(pub String);

impl FromStr for LetterGrade {
    type Err = UnknownLetterGrade;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "AA" => Ok(Self::Aa),
            "BA" => Ok(Self::Ba),
            "BB" => Ok(Self::Bb),
            "CB" | "BC" => Ok(Self::Cb),
            "CC" => Ok(Self::Cc),
            "DC" => Ok(Self::Dc),
            "DD" => Ok(Self::Dd),
            "FD" => Ok(Self::Fd),
            "FF" => Ok(Self::Ff),
            _ => Err(UnknownLetterGrade(value.to_string())),
        }
    }
}
