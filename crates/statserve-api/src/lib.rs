//! Filesystem metadata as a JSON API, packaged as tower middleware.
//!
//! [`StatsApiLayer`] wraps any inner HTTP service. Requests under the
//! configured base path are answered here: `<base>/stats/<path>` resolves
//! the metadata of `<path>` (name, size, mtime) without touching file
//! contents, anything else under the base gets a JSON error envelope, and
//! everything outside the base reaches the inner service untouched.

pub mod error;
pub mod middleware;
pub mod stat;

pub use error::ApiError;
pub use middleware::{StatsApi, StatsApiLayer};
pub use stat::EntryStat;
