//! Lexical scope tracking.
//!
//! The parser only needs to know whether a name was declared as a variable
//! somewhere up the block chain: `x {` after `x := ...` is a condition
//! followed by a block, while `T{` for an unknown `T` is a composite literal.

use indexmap::IndexSet;
use log::trace;

/// A stack of variable-name blocks. The outermost block always exists.
#[derive(Debug, Clone)]
pub struct Scope {
    blocks: Vec<IndexSet<String>>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    pub fn new() -> Self {
        Self {
            blocks: vec![IndexSet::new()],
        }
    }

    /// Push a new block.
    pub fn enter(&mut self) {
        self.blocks.push(IndexSet::new());
        trace!(depth = self.blocks.len(); "Entered scope block");
    }

    /// Pop the innermost block. The outermost block is never popped.
    pub fn leave(&mut self) {
        if self.blocks.len() > 1 {
            self.blocks.pop();
        }
    }

    /// Number of open blocks.
    pub fn depth(&self) -> usize {
        self.blocks.len()
    }

    /// Record `name` in the innermost block.
    pub fn add_var(&mut self, name: impl Into<String>) {
        let name = name.into();
        if name.is_empty() || name == "_" {
            return;
        }
        if let Some(block) = self.blocks.last_mut() {
            block.insert(name);
        }
    }

    pub fn add_vars<S: Into<String>>(&mut self, names: impl IntoIterator<Item = S>) {
        for name in names {
            self.add_var(name);
        }
    }

    /// Returns `true` if `name` is recorded in any open block.
    pub fn has_var(&self, name: &str) -> bool {
        self.blocks.iter().rev().any(|block| block.contains(name))
    }

    /// Every visible name, outermost first, in declaration order.
    pub fn all_vars(&self) -> Vec<&str> {
        let mut seen = IndexSet::new();
        for block in &self.blocks {
            for name in block {
                seen.insert(name.as_str());
            }
        }
        seen.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_lookup() {
        let mut scope = Scope::new();
        scope.add_var("outer");
        scope.enter();
        scope.add_vars(["inner", "_"]);
        assert!(scope.has_var("outer"));
        assert!(scope.has_var("inner"));
        assert!(!scope.has_var("_"));
        assert_eq!(scope.all_vars(), vec!["outer", "inner"]);

        scope.leave();
        assert!(!scope.has_var("inner"));
        assert!(scope.has_var("outer"));
    }

    #[test]
    fn test_root_block_survives_leave() {
        let mut scope = Scope::new();
        scope.leave();
        scope.leave();
        assert_eq!(scope.depth(), 1);
        scope.add_var("x");
        assert!(scope.has_var("x"));
    }
}
