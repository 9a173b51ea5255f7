use shared::{
    domain::{Item, Region},
    protocol::{PollenDataset, RegionForecast},
};

/// Items of one region, flattened in the order the dataset lists them.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub region: Region,
    pub items: Vec<Item>,
}

impl ViewModel {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Finds the dataset entry for `region`. Both ids must match exactly, so a
/// region without subregions only matches entries that also carry none.
pub fn find_region_forecast<'a>(
    dataset: &'a PollenDataset,
    region: &Region,
) -> Option<&'a RegionForecast> {
    dataset.content.iter().find(|entry| {
        entry.region_id == region.region_id && entry.partregion_id == region.subregion_id
    })
}

/// `None` means the dataset has nothing for this region yet.
pub fn build_view_model(dataset: &PollenDataset, region: &Region) -> Option<ViewModel> {
    let entry = find_region_forecast(dataset, region)?;
    let items = entry
        .pollen
        .iter()
        .map(|(name, values)| Item::new(name.clone(), values.clone()))
        .collect();
    Some(ViewModel {
        region: region.clone(),
        items,
    })
}
