#![doc = "hoopstats-core: data layer for the NBA stats site."]

//! Lists and fetches the artifacts the analysis pipeline publishes to the
//! object store, indexes which league/year seasons exist, and decodes each
//! season's stats table and charts for the rendering layer.
//!
//! # Usage
//! Build a [`config::SiteConfig`] once, hand it to [`site::SiteData`], and ask
//! for page data. Lower-level pieces (store client, indexer, decoders) are
//! public for tools and tests.

pub mod config;
pub mod contract;
pub mod error;
pub mod index;
pub mod keys;
pub mod season;
pub mod site;
pub mod store;
pub mod tabular;
pub mod updated;

pub use error::DataError;
