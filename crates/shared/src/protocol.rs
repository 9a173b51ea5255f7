use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::{ForecastValues, NO_SUBREGION};

const DWD_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M Uhr";

/// Pollen hazard index document as published by the DWD open data service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PollenDataset {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub last_update: String,
    #[serde(default)]
    pub next_update: String,
    #[serde(default)]
    pub content: Vec<RegionForecast>,
}

impl PollenDataset {
    pub fn last_updated_at(&self) -> Option<NaiveDateTime> {
        parse_dwd_timestamp(&self.last_update)
    }

    pub fn next_update_at(&self) -> Option<NaiveDateTime> {
        parse_dwd_timestamp(&self.next_update)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionForecast {
    pub region_id: i64,
    #[serde(default)]
    pub region_name: String,
    /// Missing upstream ids are read as [`NO_SUBREGION`].
    #[serde(default = "no_subregion")]
    pub partregion_id: i64,
    #[serde(default)]
    pub partregion_name: String,
    #[serde(rename = "Pollen", default)]
    pub pollen: IndexMap<String, ForecastValues>,
}

fn no_subregion() -> i64 {
    NO_SUBREGION
}

fn parse_dwd_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), DWD_TIMESTAMP_FORMAT).ok()
}
