use std::sync::LazyLock;

use crate::domain::{Region, NO_SUBREGION};

const REGION_TABLE: [(i64, i64, &str, &str); 27] = [
    (10, 11, "Schleswig-Holstein und Hamburg", "Inseln und Marschen"),
    (10, 12, "Schleswig-Holstein und Hamburg", "Geest,Schleswig-Holstein und Hamburg"),
    (20, NO_SUBREGION, "Mecklenburg-Vorpommern", ""),
    (30, 31, "Niedersachsen und Bremen", "Westl. Niedersachsen/Bremen"),
    (30, 32, "Niedersachsen und Bremen", "Östl. Niedersachsen"),
    (40, 41, "Nordrhein-Westfalen", "Rhein.-Westfäl. Tiefland"),
    (40, 42, "Nordrhein-Westfalen", "Ostwestfalen"),
    (40, 43, "Nordrhein-Westfalen", "Mittelgebirge NRW"),
    (50, NO_SUBREGION, "Brandenburg und Berlin", ""),
    (60, 61, "Sachsen-Anhalt", "Tiefland Sachsen-Anhalt"),
    (60, 62, "Sachsen-Anhalt", "Harz"),
    (70, 71, "Thüringen", "Tiefland Thüringen"),
    (70, 72, "Thüringen", "Mittelgebirge Thüringen"),
    (80, 81, "Sachsen", "Tiefland Sachsen"),
    (80, 82, "Sachsen", "Mittelgebirge Sachsen"),
    (90, 91, "Hessen", "Nordhessen und hess. Mittelgebirge"),
    (90, 92, "Hessen", "Rhein-Main"),
    (100, 101, "Rheinland-Pfalz und Saarland", "Rhein, Pfalz, Nahe und Mosel"),
    (100, 102, "Rheinland-Pfalz und Saarland", "Mittelgebirgsbereich Rheinland-Pfalz"),
    (100, 103, "Rheinland-Pfalz und Saarland", "Saarland"),
    (110, 111, "Baden-Württemberg", "Oberrhein und unteres Neckartal"),
    (110, 112, "Baden-Württemberg", "Hohenlohe/mittlerer Neckar/Oberschwaben"),
    (110, 113, "Baden-Württemberg", "Mittelgebirge Baden-Württemberg"),
    (120, 121, "Bayern", "Allgäu/Oberbayern/Bay. Wald"),
    (120, 122, "Bayern", "Donauniederungen"),
    (120, 123, "Bayern", "Bayern nördl. der Donau, o. Bayr. Wald, o. Mainfranken"),
    (120, 124, "Bayern", "Mainfranken"),
];

static REGIONS: LazyLock<Vec<Region>> = LazyLock::new(|| {
    REGION_TABLE
        .iter()
        .map(|(region_id, subregion_id, region_name, subregion_name)| {
            Region::new(*region_id, *subregion_id, *region_name, *subregion_name)
        })
        .collect()
});

/// All DWD forecast regions in display order.
pub fn regions() -> &'static [Region] {
    &REGIONS
}

pub fn default_region() -> &'static Region {
    &REGIONS[0]
}

/// Exact lookup on `(region_id, subregion_id)`.
pub fn find_region(region_id: i64, subregion_id: i64) -> Option<&'static Region> {
    REGIONS
        .iter()
        .find(|region| region.region_id == region_id && region.subregion_id == subregion_id)
}

/// Resolves a `"{region_id}:{subregion_id}"` key, falling back to the first
/// region when the key is malformed or unknown.
pub fn parse_region_key(key: &str) -> &'static Region {
    lookup_region_key(key).unwrap_or_else(default_region)
}

pub fn lookup_region_key(key: &str) -> Option<&'static Region> {
    let (region_id, subregion_id) = key.trim().split_once(':')?;
    let region_id = region_id.trim().parse::<i64>().ok()?;
    let subregion_id = subregion_id.trim().parse::<i64>().ok()?;
    find_region(region_id, subregion_id)
}
