#![forbid(unsafe_code)]
//! lazyq-operators: query nodes (fusion, partition, concat, zip, sort,
//! group/join, distinct) and source adapters.
//!
//! Design intent:
//! - Nodes are immutable and shared through `Rc`; builders return new nodes.
//! - Every node has a sync form (`QueryNode`, cursor = `Iterator`) and an
//!   async twin (`AsyncQueryNode`, cursor = `Stream`).
//! - Nodes that must see their whole input (sort, group, join) collect it on
//!   the first pull, never at construction.

pub mod plan;
pub mod traits;

pub mod concat;
pub mod distinct;
pub mod fusion;
pub mod partition;
pub mod source;
pub mod zip;

pub mod group;
pub mod join;
pub mod sort;

pub use plan::NodePlan;
pub use traits::{AsyncNode, AsyncQueryNode, Node, QueryNode};
