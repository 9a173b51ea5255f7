use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;
use shared::{
    domain::{DayKey, Item, Region},
    error::{ErrorCode, SurfaceError},
    protocol::PollenDataset,
    severity::{severity_display, SeverityDisplay},
};
use storage::{KeyValueStore, StorageError};
use tracing::{debug, warn};

use crate::{
    fetch::DatasetSource,
    partition::{partition_view, Partition},
    pins::{PinManager, PinSet},
    view_model::{build_view_model, ViewModel},
};

pub const PINNED_SECTION_TITLE: &str = "Pinned";
pub const OTHER_SECTION_TITLE: &str = "Other";

const UPDATE_DISPLAY_FORMAT: &str = "%d.%m.%Y %H:%M";

#[derive(Debug, Clone)]
pub enum DatasetState {
    Loading,
    Loaded(Arc<PollenDataset>),
    Failed(String),
}

/// Input changes that trigger re-derivation of the view.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    RegionChanged(Region),
    DayChanged(DayKey),
    FetchStarted,
    DatasetRefreshed(PollenDataset),
    DatasetFailed(String),
    PinsChanged(PinSet),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemRow {
    pub name: String,
    pub severity: SeverityDisplay,
}

impl ItemRow {
    fn for_day(item: &Item, day: DayKey) -> Self {
        Self {
            name: item.name.clone(),
            severity: severity_display(item.value_for(day)),
        }
    }
}

/// Everything the presentation surface renders for the current selection.
#[derive(Debug, Clone, Serialize)]
pub struct PresentationModel {
    pub region: Region,
    pub day: DayKey,
    pub is_loading: bool,
    pub pinned_items: Vec<ItemRow>,
    pub unpinned_items: Vec<ItemRow>,
    pub has_pinned: bool,
    pub dataset_name: Option<String>,
    pub last_update: Option<String>,
    pub next_update: Option<String>,
    pub error: Option<SurfaceError>,
}

impl PresentationModel {
    pub fn pinned_section_title(&self) -> Option<&'static str> {
        self.has_pinned.then_some(PINNED_SECTION_TITLE)
    }

    pub fn other_section_title(&self) -> Option<&'static str> {
        self.has_pinned.then_some(OTHER_SECTION_TITLE)
    }
}

pub struct PollenSession<S, D> {
    pins: PinManager<S>,
    source: D,
    region: Region,
    day: DayKey,
    dataset: DatasetState,
    pin_snapshot: PinSet,
    view: Option<ViewModel>,
    partition: Partition,
    error: Option<SurfaceError>,
}

impl<S: KeyValueStore, D: DatasetSource> PollenSession<S, D> {
    pub fn new(pins: PinManager<S>, source: D, region: Region, day: DayKey) -> Self {
        Self {
            pins,
            source,
            region,
            day,
            dataset: DatasetState::Loading,
            pin_snapshot: PinSet::new(),
            view: None,
            partition: Partition::default(),
            error: None,
        }
    }

    /// Loads the persisted pins, then the dataset. Neither failure is fatal.
    pub async fn start(&mut self) {
        match self.pins.pinned().await {
            Ok(pins) => self.apply(SessionEvent::PinsChanged(pins)),
            Err(err) => {
                warn!(error = %err, "failed to load pinned items");
                self.error = Some(storage_failure(&err));
            }
        }
        self.refresh().await;
    }

    pub async fn refresh(&mut self) {
        self.apply(SessionEvent::FetchStarted);
        match self.source.fetch().await {
            Ok(dataset) => self.apply(SessionEvent::DatasetRefreshed(dataset)),
            Err(err) => {
                warn!(error = %err, "pollen dataset unavailable");
                self.apply(SessionEvent::DatasetFailed(err.to_string()));
            }
        }
    }

    /// Toggles a pin. On a storage fault the previous pins stay in effect and
    /// the failure is kept for the surface.
    pub async fn toggle(&mut self, name: &str) -> Result<PinSet, StorageError> {
        match self.pins.toggle_pin(name).await {
            Ok(pins) => {
                self.apply(SessionEvent::PinsChanged(pins.clone()));
                Ok(pins)
            }
            Err(err) => {
                warn!(name, error = %err, "pin toggle failed");
                self.error = Some(storage_failure(&err));
                Err(err)
            }
        }
    }

    /// Records a store fault that happened outside a toggle, e.g. when the
    /// persistent store could not be opened. The forecast stays usable.
    pub fn report_storage_fault(&mut self, err: &StorageError) {
        warn!(error = %err, "pin storage unavailable");
        self.error = Some(storage_failure(err));
    }

    pub fn select_region(&mut self, region: Region) {
        self.apply(SessionEvent::RegionChanged(region));
    }

    pub fn select_day(&mut self, day: DayKey) {
        self.apply(SessionEvent::DayChanged(day));
    }

    pub fn apply(&mut self, event: SessionEvent) {
        debug!(?event, "session event");
        match event {
            SessionEvent::RegionChanged(region) => {
                self.region = region;
                self.rebuild_view();
            }
            SessionEvent::DayChanged(day) => {
                self.day = day;
            }
            SessionEvent::FetchStarted => {
                self.dataset = DatasetState::Loading;
                self.rebuild_view();
            }
            SessionEvent::DatasetRefreshed(dataset) => {
                self.dataset = DatasetState::Loaded(Arc::new(dataset));
                if matches!(self.error, Some(SurfaceError { code: ErrorCode::Fetch, .. })) {
                    self.error = None;
                }
                self.rebuild_view();
            }
            SessionEvent::DatasetFailed(message) => {
                self.error = Some(SurfaceError::new(ErrorCode::Fetch, message.clone()));
                self.dataset = DatasetState::Failed(message);
                self.rebuild_view();
            }
            SessionEvent::PinsChanged(pins) => {
                self.pin_snapshot = pins;
                if matches!(self.error, Some(SurfaceError { code: ErrorCode::Storage, .. })) {
                    self.error = None;
                }
                self.repartition();
            }
        }
    }

    fn rebuild_view(&mut self) {
        self.view = match &self.dataset {
            DatasetState::Loaded(dataset) => build_view_model(dataset, &self.region),
            DatasetState::Loading | DatasetState::Failed(_) => None,
        };
        if self.view.is_none() && matches!(self.dataset, DatasetState::Loaded(_)) {
            debug!(region = %self.region.key(), "no forecast for region in dataset");
        }
        self.repartition();
    }

    fn repartition(&mut self) {
        self.partition = partition_view(self.view.as_ref(), &self.pin_snapshot);
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn day(&self) -> DayKey {
        self.day
    }

    pub fn dataset_state(&self) -> &DatasetState {
        &self.dataset
    }

    pub fn pinned(&self) -> &PinSet {
        &self.pin_snapshot
    }

    pub fn view(&self) -> Option<&ViewModel> {
        self.view.as_ref()
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    pub fn presentation(&self) -> PresentationModel {
        let rows = |items: &[Item]| -> Vec<ItemRow> {
            items
                .iter()
                .map(|item| ItemRow::for_day(item, self.day))
                .collect()
        };
        let dataset = match &self.dataset {
            DatasetState::Loaded(dataset) => Some(dataset.as_ref()),
            _ => None,
        };

        PresentationModel {
            region: self.region.clone(),
            day: self.day,
            is_loading: matches!(self.dataset, DatasetState::Loading),
            pinned_items: rows(&self.partition.pinned),
            unpinned_items: rows(&self.partition.unpinned),
            has_pinned: self.partition.has_pinned(),
            dataset_name: dataset.map(|d| d.name.clone()),
            last_update: dataset.map(|d| update_label(d.last_updated_at(), &d.last_update)),
            next_update: dataset.map(|d| update_label(d.next_update_at(), &d.next_update)),
            error: self.error.clone(),
        }
    }
}

/// Unparseable upstream timestamps are shown as published.
fn update_label(parsed: Option<NaiveDateTime>, raw: &str) -> String {
    match parsed {
        Some(at) => at.format(UPDATE_DISPLAY_FORMAT).to_string(),
        None => raw.to_string(),
    }
}

fn storage_failure(err: &StorageError) -> SurfaceError {
    SurfaceError::new(ErrorCode::Storage, err.to_string())
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
