#![forbid(unsafe_code)]
//! lazyq-exec: query handles and the terminal layer.
//!
//! `Linq<T>` / `AsyncLinq<T>` compose nodes from `lazyq-operators`; terminal
//! methods drive the outermost cursor through a reducer and stop as soon as
//! the answer is known.

pub mod async_linq;
pub mod linq;
pub mod ordered;
pub mod reduce;

mod async_terminal;
mod terminal;

pub use async_linq::AsyncLinq;
pub use linq::Linq;
pub use ordered::{AsyncOrderedLinq, OrderedLinq};
