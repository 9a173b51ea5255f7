pub mod fetch;
pub mod partition;
pub mod pins;
pub mod session;
pub mod view_model;

pub use fetch::{DatasetSource, DwdClient, FetchError, DEFAULT_DATASET_URL, DEFAULT_FETCH_TIMEOUT};
pub use partition::{partition, partition_view, Partition};
pub use pins::{PinManager, PinSet, PIN_RECORD_KEY};
pub use session::{
    DatasetState, ItemRow, PollenSession, PresentationModel, SessionEvent, OTHER_SECTION_TITLE,
    PINNED_SECTION_TITLE,
};
pub use view_model::{build_view_model, find_region_forecast, ViewModel};
