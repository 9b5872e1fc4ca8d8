#![forbid(unsafe_code)]
//! lazyq: deferred, fused, LINQ-style queries over sync and async sequences.
//!
//! ```
//! use lazyq::Linq;
//!
//! let evens = Linq::range(1, 10).filter(|n| n % 2 == 0).select(|n| n * n);
//! assert_eq!(evens.to_vec(), vec![4, 16, 36, 64, 100]);
//! assert_eq!(evens.first().unwrap(), 4);
//! ```

pub use lazyq_core;
pub use lazyq_exec;
pub use lazyq_operators;

pub use lazyq_core::{Error, QueryConfig, Result};
pub use lazyq_exec::{AsyncLinq, AsyncOrderedLinq, Linq, OrderedLinq};
pub use lazyq_operators::group::Grouping;
pub use lazyq_operators::NodePlan;

pub mod prelude {
    pub use lazyq_core::prelude::*;
    pub use lazyq_exec::{AsyncLinq, AsyncOrderedLinq, Linq, OrderedLinq};
    pub use lazyq_operators::group::Grouping;
    pub use lazyq_operators::{AsyncQueryNode, NodePlan, QueryNode};
}
