//! Pure request and response handling for the dataset gateway.
//!
//! Nothing in this crate performs I/O. The service layer feeds it raw query parameters and raw
//! upstream bodies and gets back typed values it can serialize as-is.

pub mod aggregate;
pub mod label;
pub mod normalize;
pub mod pagination;
pub mod query;
pub mod time_serde;
pub mod upstream;

pub use aggregate::{
	CountShare, Metric, MetricShare, ServiceClaims, StateClaims, TermTotal, YearClaims,
};
pub use normalize::{DatasetSummary, Resource, SchemaError, UpstreamPage};
pub use pagination::{AppliedFilters, SearchResult};
pub use query::{Query, SortOrder, ValidationError};
