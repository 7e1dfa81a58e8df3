//! Remote Search and Fetch Gateways
//!
//! The research pipeline talks to two black-box remote services besides the
//! LLM: a search engine and a page fetcher. Both are modelled as object-safe
//! async traits so stages can hold them as `Arc<dyn …>` inside spawned tasks,
//! and so tests can substitute scripted doubles.
//!
//! # Module Structure
//!
//! - [`search`](crate::gateway::search) - [`SearchGateway`] and the daedra (DuckDuckGo) backend
//! - [`fetch`](crate::gateway::fetch) - [`FetchGateway`] and the daedra page fetcher

/// Web search gateway.
pub mod search;
/// Page fetch gateway.
pub mod fetch;

pub use fetch::{DaedraFetch, FetchGateway};
pub use search::{DaedraSearch, SearchGateway};
