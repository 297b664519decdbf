use std::fmt;

use serde::{Deserialize, Serialize};

/// Site access difficulty. Anything unrecognised is treated as easy access.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Tight,
    Restricted,
    #[default]
    Easy,
}

impl Access {
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "tight" => Self::Tight,
            "restricted" | "limited" => Self::Restricted,
            _ => Self::Easy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tight => "tight",
            Self::Restricted => "restricted",
            Self::Easy => "easy",
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ground conditions on site.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ground {
    Rocky,
    Soft,
    #[default]
    Unknown,
}

impl Ground {
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "rocky" | "rock" | "stone" => Self::Rocky,
            "soft" | "sand" | "sandy" => Self::Soft,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rocky => "rocky",
            Self::Soft => "soft",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Ground {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized height key such as `1.8m`, used to look up the height multiplier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeightTag(pub String);

impl HeightTag {
    pub const DEFAULT: &'static str = "1.8m";

    /// Accepts tags (`1.8m`), metres (`1.8`), or millimetres (`1800`).
    /// Anything else resolves to [`HeightTag::DEFAULT`].
    pub fn normalize(raw: &str) -> Self {
        let height = raw.trim().to_ascii_lowercase();
        if height.ends_with('m') {
            return Self(height);
        }

        match height.parse::<f64>() {
            Ok(value) if value.is_finite() => {
                let metres = if value > 100.0 { value / 1000.0 } else { value };
                Self(format!("{metres:.1}m"))
            }
            _ => Self::default(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for HeightTag {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for HeightTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
