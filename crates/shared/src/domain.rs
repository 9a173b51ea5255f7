use std::fmt;

use serde::{Deserialize, Serialize};

/// Subregion id used by regions that are not split into subregions.
pub const NO_SUBREGION: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DayKey {
    #[default]
    #[serde(rename = "today")]
    Today,
    #[serde(rename = "tomorrow")]
    Tomorrow,
    #[serde(rename = "dayafter_to")]
    DayAfterTomorrow,
}

impl DayKey {
    pub const ALL: [DayKey; 3] = [DayKey::Today, DayKey::Tomorrow, DayKey::DayAfterTomorrow];

    pub fn as_str(self) -> &'static str {
        match self {
            DayKey::Today => "today",
            DayKey::Tomorrow => "tomorrow",
            DayKey::DayAfterTomorrow => "dayafter_to",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DayKey::Today => "Heute",
            DayKey::Tomorrow => "Morgen",
            DayKey::DayAfterTomorrow => "Übermorgen",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|day| day.as_str().eq_ignore_ascii_case(raw))
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub region_id: i64,
    pub subregion_id: i64,
    pub region_name: String,
    pub subregion_name: String,
}

impl Region {
    pub fn new(
        region_id: i64,
        subregion_id: i64,
        region_name: impl Into<String>,
        subregion_name: impl Into<String>,
    ) -> Self {
        Self {
            region_id,
            subregion_id,
            region_name: region_name.into(),
            subregion_name: subregion_name.into(),
        }
    }

    pub fn has_subregion(&self) -> bool {
        self.subregion_id != NO_SUBREGION
    }

    /// Selector key in the form `"{region_id}:{subregion_id}"`.
    pub fn key(&self) -> String {
        format!("{}:{}", self.region_id, self.subregion_id)
    }

    pub fn title(&self) -> String {
        if self.subregion_name.is_empty() {
            self.region_name.clone()
        } else {
            format!("{} ({})", self.subregion_name, self.region_name)
        }
    }
}

/// One severity code per forecast day, as published upstream.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ForecastValues {
    #[serde(default)]
    pub today: String,
    #[serde(default)]
    pub tomorrow: String,
    #[serde(default)]
    pub dayafter_to: String,
}

impl ForecastValues {
    pub fn new(
        today: impl Into<String>,
        tomorrow: impl Into<String>,
        dayafter_to: impl Into<String>,
    ) -> Self {
        Self {
            today: today.into(),
            tomorrow: tomorrow.into(),
            dayafter_to: dayafter_to.into(),
        }
    }

    pub fn get(&self, day: DayKey) -> &str {
        match day {
            DayKey::Today => &self.today,
            DayKey::Tomorrow => &self.tomorrow,
            DayKey::DayAfterTomorrow => &self.dayafter_to,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub values: ForecastValues,
}

impl Item {
    pub fn new(name: impl Into<String>, values: ForecastValues) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn value_for(&self, day: DayKey) -> &str {
        self.values.get(day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_key_uses_upstream_field_names() {
        assert_eq!(
            serde_json::to_string(&DayKey::DayAfterTomorrow).expect("serialize"),
            "\"dayafter_to\""
        );
        assert_eq!(DayKey::parse("Tomorrow"), Some(DayKey::Tomorrow));
        assert_eq!(DayKey::parse("yesterday"), None);
        assert_eq!(DayKey::default(), DayKey::Today);
    }

    #[test]
    fn forecast_values_index_by_day() {
        let values = ForecastValues::new("0", "1-2", "3");
        assert_eq!(values.get(DayKey::Today), "0");
        assert_eq!(values.get(DayKey::Tomorrow), "1-2");
        assert_eq!(values.get(DayKey::DayAfterTomorrow), "3");
    }

    #[test]
    fn region_title_omits_empty_subregion() {
        let region = Region::new(20, NO_SUBREGION, "Mecklenburg-Vorpommern", "");
        assert_eq!(region.title(), "Mecklenburg-Vorpommern");
        assert_eq!(region.key(), "20:-1");
        assert!(!region.has_subregion());
    }
}
