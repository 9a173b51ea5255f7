use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SeverityCode {
    None,
    NoneToLow,
    Low,
    LowToModerate,
    Moderate,
    ModerateToHigh,
    High,
    Unrecognized(String),
}

impl SeverityCode {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "0" => Self::None,
            "0-1" => Self::NoneToLow,
            "1" => Self::Low,
            "1-2" => Self::LowToModerate,
            "2" => Self::Moderate,
            "2-3" => Self::ModerateToHigh,
            "3" => Self::High,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::None => "0",
            Self::NoneToLow => "0-1",
            Self::Low => "1",
            Self::LowToModerate => "1-2",
            Self::Moderate => "2",
            Self::ModerateToHigh => "2-3",
            Self::High => "3",
            Self::Unrecognized(raw) => raw,
        }
    }

    pub fn tier(&self) -> SeverityTier {
        match self {
            Self::None | Self::NoneToLow => SeverityTier::None,
            Self::Low | Self::LowToModerate => SeverityTier::Low,
            Self::Moderate | Self::ModerateToHigh => SeverityTier::Moderate,
            Self::High => SeverityTier::High,
            Self::Unrecognized(_) => SeverityTier::Unrecognized,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "Keine Belastung",
            Self::NoneToLow => "Keine bis geringe Belastung",
            Self::Low => "Geringe Belastung",
            Self::LowToModerate => "Geringe bis mittlere Belastung",
            Self::Moderate => "Mittlere Belastung",
            Self::ModerateToHigh => "Mittlere bis hohe Belastung",
            Self::High => "Hohe Belastung",
            Self::Unrecognized(_) => UNRECOGNIZED_LABEL,
        }
    }
}

pub const UNRECOGNIZED_LABEL: &str = "Unbekannter Wert";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityTier {
    None,
    Low,
    Moderate,
    High,
    /// Code outside the published scale; rendered so it draws attention.
    Unrecognized,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityDisplay {
    pub code: String,
    pub tier: SeverityTier,
    pub label: String,
}

/// Maps an upstream severity code to its tier and label. Never fails; codes
/// outside the published scale are logged and get the unrecognized pair.
pub fn severity_display(raw: &str) -> SeverityDisplay {
    let code = SeverityCode::parse(raw);
    if let SeverityCode::Unrecognized(value) = &code {
        warn!(code = %value, "unrecognized severity code");
    }
    SeverityDisplay {
        code: raw.to_string(),
        tier: code.tier(),
        label: code.label().to_string(),
    }
}
