#![forbid(unsafe_code)]
//! lazyq-core: the pieces every lazyq crate agrees on.
//!
//! - `cursor`: the pull protocol (`Step`, `Cursor`, `AsyncCursor`) and the
//!   drive loops terminal operations are written against.
//! - `hint`: length-hint arithmetic.
//! - `coerce` / `text`: numeric coercion and the text form used by the default
//!   comparator.
//! - `config`, `error`, `hash`, `metrics`: ambient plumbing.

pub mod coerce;
pub mod config;
pub mod cursor;
pub mod error;
pub mod hash;
pub mod hint;
pub mod metrics;
pub mod text;

pub mod prelude;

pub use config::QueryConfig;
pub use error::{Error, Result};
