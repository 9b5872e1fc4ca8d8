//! Convenient re-exports for downstream crates.

pub use crate::coerce::ToNumber;
pub use crate::config::QueryConfig;
pub use crate::cursor::{AsyncCursor, Cursor, Step};
pub use crate::error::{Error, Result};
pub use crate::hash::Hash256;
pub use crate::text::{default_compare, ToText};
