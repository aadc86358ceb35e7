//! Floorwatch kernel: the data layer behind the factory dashboard.
//!
//! Raw machine telemetry comes in from the machines API (JSON) or a static
//! CSV fixture. The kernel types it, places it on the factory map, derives
//! severity-ranked alerts, computes the chart statistics and slices lists
//! into pages. Rendering is left to the caller.

pub mod alerts;
pub mod client;
pub mod config;
pub mod error;
pub mod fixture;
pub mod grouping;
pub mod ingest;
pub mod models;
pub mod pagination;
pub mod session;
pub mod state;
pub mod stats;
pub mod topology;

pub use alerts::{derive_alerts, sort_by_severity, Alert, AlertCounts, Severity};
pub use client::MachinesClient;
pub use config::{load_config, load_config_or_default, DashboardConfig};
pub use error::{ConfigError, FetchError, IngestError, TopologyError};
pub use fixture::{load_fixture, FixtureRecord};
pub use grouping::{group_by_area, AreaBucket, AreaGrouping, FloorSummary};
pub use models::{FailureFlags, FailureKind, MachineRecord, MachineType};
pub use pagination::{load_more_prefix, paginate, Page, PageCursor};
pub use session::{LoadOutcome, ScreenSession};
pub use state::{ScreenState, Shared};
pub use topology::{Area, AreaKind, Topology};
