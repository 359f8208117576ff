mod catalog_xml;
mod store;
mod tracker;
mod zones;

pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use tracker::{
    BrandProgress, ProgressDetails, ProgressRecord, ProgressTracker, SubscriptionId,
    PROGRESS_STORE_KEY,
};
pub use zones::{CatalogError, CatalogErrorCode, SourceLocation, Zone, ZoneBounds, ZoneCatalog};
