//! Insights API core library.
//!
//! Field-type capability resolution plus the thin catalog, dashboard and query endpoints,
//! backed by a pluggable document store and get-or-compute cache.

pub mod access;
pub mod api;
pub mod cache;
pub mod capabilities;
pub mod config;
pub mod errors;
pub mod id;
pub mod keys;
pub mod query;
pub mod rpc;
pub mod store;
pub mod types;

pub use access::AccessPolicy;
pub use api::InsightsApi;
pub use cache::{KeyCache, MemoryCache, RedisCache};
pub use capabilities::{FieldType, MenuOption, MenuOptionSet, OperatorOption, TypeCategory, resolve_menu_options, resolve_operators};
pub use config::{Backend, ConfigError, InsightsConfig};
pub use errors::*;
pub use query::{Column, JoinOn, QueryBuilder, SortOrder};
pub use store::{DocumentStore, FieldFilter, MemoryStore, RedisStore};
pub use types::{
    DashboardSummary, DataSourceSummary, DocType, Document, QuerySummary, Row, TableRef, TableSummary,
};

// Re-export redis types for callers wiring up a backend.
pub use redis;
pub use redis::aio::ConnectionManager;
