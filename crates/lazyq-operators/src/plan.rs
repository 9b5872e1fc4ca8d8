//! Plan introspection: a serializable tree describing a composed query.

use lazyq_core::hash::{hash_serde, Hash256};
use lazyq_core::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePlan {
    pub name: String,

    /// Exact length when known.
    pub len_hint: Option<usize>,

    /// Node-specific notes (stages, window bounds, sort directions).
    pub detail: Vec<String>,

    /// Upstream nodes, in the order they are read.
    pub inputs: Vec<NodePlan>,
}

impl NodePlan {
    pub fn new(name: &str, len_hint: Option<usize>) -> Self {
        Self {
            name: name.to_string(),
            len_hint,
            detail: vec![],
            inputs: vec![],
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail.push(detail.into());
        self
    }

    pub fn with_input(mut self, input: NodePlan) -> Self {
        self.inputs.push(input);
        self
    }

    /// Stable identity of the query shape.
    pub fn fingerprint(&self) -> Result<Hash256> {
        hash_serde(self)
    }

    /// Indented, one node per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str(&self.name);
        if !self.detail.is_empty() {
            out.push_str(" [");
            out.push_str(&self.detail.join(", "));
            out.push(']');
        }
        if let Some(n) = self.len_hint {
            out.push_str(&format!(" (len={n})"));
        }
        out.push('\n');
        for input in &self.inputs {
            input.render_into(out, depth + 1);
        }
    }
}
