//! Device status snapshots: data model, aggregation and live queries.

pub mod aggregator;
pub mod cache;
pub mod data;
pub mod format;
pub mod live;
pub mod traits;

pub use aggregator::{Providers, SnapshotAggregator};
pub use cache::SnapshotCache;
pub use data::*;
pub use live::current_time;
pub use traits::*;
