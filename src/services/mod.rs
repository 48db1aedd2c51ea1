pub mod cache;
pub use cache::{ResponseCache, cache_key};

pub mod enricher;
pub use enricher::Enricher;

pub mod gate;
pub use gate::RequestGate;

pub mod pacer;
pub use pacer::{PacedBatch, Pacer};

pub mod photos;
pub use photos::{CacheOutcome, CacheStatus, Page, PhotoService};

#[cfg(test)]
pub(crate) mod testing;
