use shared::domain::Item;

use crate::{pins::PinSet, view_model::ViewModel};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub pinned: Vec<Item>,
    pub unpinned: Vec<Item>,
}

impl Partition {
    /// Whether a "Pinned" group should be shown at all.
    pub fn has_pinned(&self) -> bool {
        !self.pinned.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pinned.len() + self.unpinned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Stable split of `items` by pin membership.
pub fn partition(items: &[Item], pins: &PinSet) -> Partition {
    let (pinned, unpinned): (Vec<Item>, Vec<Item>) = items
        .iter()
        .cloned()
        .partition(|item| pins.contains(&item.name));
    Partition { pinned, unpinned }
}

pub fn partition_view(view: Option<&ViewModel>, pins: &PinSet) -> Partition {
    match view {
        Some(view) => partition(&view.items, pins),
        None => Partition::default(),
    }
}

#[cfg(test)]
#[path = "tests/partition_tests.rs"]
mod tests;
