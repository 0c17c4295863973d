//! Format-preserving, mutable source tree.
//!
//! A [`Tree`] is an arena of [`Node`]s addressed by [`NodeId`]. Every node
//! has an ordered list of children; leaves carry a [`Token`]. Concatenating
//! the leaf values reachable from a node, in depth-first order, reproduces
//! the original text of that node byte-for-byte.
//!
//! Nodes are never freed. Removing a node detaches it from its parent, after
//! which it is unreachable from the root but can still be serialized on its
//! own. This keeps every [`NodeId`] held elsewhere valid across edits.
//!
//! # Example
//!
//! ```
//! # use gigo_core::{Origin, Token, TokenKind, Tree, NodeKind};
//! let mut tree = Tree::new(Origin::Str);
//! let expr = tree.add(NodeKind::Expression);
//! let word = tree.add_token(Token::synthetic(TokenKind::Word, "hello"));
//! tree.append(expr, word);
//! tree.append(tree.root(), expr);
//! assert_eq!(tree.to_string(), "hello");
//! ```

mod decl;
mod query;

use std::fmt;

pub use decl::{
    AliasDecl, AssignDecl, AssignExpr, BinaryExpr, BodyBlock, CallExpr, CallParams, ElseStmt,
    ForStmt, FuncDecl, IfStmt, ImplementsDecl, InterfaceDecl, NodeKind, Origin, PackageDecl,
    PoireauDecl, PropDecl, PropsBlock, ReturnDecl, SignsBlock, StructDecl, TemplateDecl,
    TemplateFuncDecl, VarDecl,
};
pub use query::{slug_name, var_name};

use log::trace;
use thiserror::Error;

use crate::token::{Position, Token, TokenKind};

/// Stable index of a node inside a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node of the tree.
#[derive(Debug, Clone)]
pub struct Node {
    kind: NodeKind,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl Node {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// Structural edit failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("node {0} has no parent")]
    Detached(NodeId),

    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
}

/// An arena of nodes with a single root.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Tree {
    /// Create an empty tree whose root records `origin`.
    pub fn new(origin: Origin) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        tree.root = tree.add(NodeKind::Root(origin));
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn origin(&self) -> &Origin {
        match &self.nodes[self.root.index()].kind {
            NodeKind::Root(origin) => origin,
            _ => unreachable!("the root node always holds the origin"),
        }
    }

    /// Name of the tree for messages: the file path or `<noname>`.
    pub fn name(&self) -> String {
        self.origin().to_string()
    }

    /// Number of nodes allocated in the arena, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Allocate a detached node.
    pub fn add(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            children: Vec::new(),
            parent: None,
        });
        id
    }

    /// Allocate a detached leaf holding `token`.
    pub fn add_token(&mut self, token: Token) -> NodeId {
        self.add(NodeKind::Token(token))
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.index()].kind
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    /// The token of a leaf node.
    pub fn token(&self, id: NodeId) -> Option<&Token> {
        match &self.nodes[id.index()].kind {
            NodeKind::Token(token) => Some(token),
            _ => None,
        }
    }

    pub fn token_mut(&mut self, id: NodeId) -> Option<&mut Token> {
        match &mut self.nodes[id.index()].kind {
            NodeKind::Token(token) => Some(token),
            _ => None,
        }
    }

    /// Returns `true` if `id` is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[parent.index()].children.push(child);
        self.nodes[child.index()].parent = Some(parent);
    }

    /// Append every node of `children`, in order.
    pub fn append_all(&mut self, parent: NodeId, children: &[NodeId]) {
        for &child in children {
            self.append(parent, child);
        }
    }

    /// Insert `child` as the first child of `parent`.
    pub fn prepend(&mut self, parent: NodeId, child: NodeId) {
        self.insert_at(parent, 0, child);
    }

    /// Insert `children`, in order, before the existing children of `parent`.
    pub fn prepend_all(&mut self, parent: NodeId, children: &[NodeId]) {
        for (index, &child) in children.iter().enumerate() {
            self.insert_at(parent, index, child);
        }
    }

    /// Insert `child` at `index` in the children of `parent`. An index past
    /// the end appends.
    pub fn insert_at(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        let children = &mut self.nodes[parent.index()].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.nodes[child.index()].parent = Some(parent);
    }

    /// Insert `new` right after `anchor` in the children of anchor's parent.
    pub fn insert_after(&mut self, anchor: NodeId, new: NodeId) -> Result<(), TreeError> {
        self.detach(new);
        let (parent, index) = self.locate(anchor)?;
        self.insert_at(parent, index + 1, new);
        Ok(())
    }

    /// Detach `id` from its parent.
    pub fn remove(&mut self, id: NodeId) -> Result<(), TreeError> {
        let (parent, index) = self.locate(id)?;
        self.nodes[parent.index()].children.remove(index);
        self.nodes[id.index()].parent = None;
        trace!(node:% = id, parent:% = parent; "Removed node");
        Ok(())
    }

    /// Detach `id` like [`Tree::remove`]. When a newline precedes it, the
    /// blank run that follows it is detached too, so removing a
    /// declaration does not widen the gap between its neighbours.
    pub fn remove_line(&mut self, id: NodeId) -> Result<(), TreeError> {
        let (parent, index) = self.locate(id)?;
        let after_newline = index
            .checked_sub(1)
            .and_then(|previous| self.children(parent).get(previous))
            .is_some_and(|&previous| self.is_token(previous, &[TokenKind::Nl]));
        let blanks: Vec<NodeId> = if after_newline {
            self.children(parent)[index + 1..]
                .iter()
                .copied()
                .take_while(|&sibling| self.is_token(sibling, &[TokenKind::Nl, TokenKind::Ws]))
                .collect()
        } else {
            Vec::new()
        };
        self.remove(id)?;
        if blanks.iter().any(|&blank| self.is_token(blank, &[TokenKind::Nl])) {
            for blank in blanks {
                self.remove(blank)?;
            }
        }
        Ok(())
    }

    fn is_token(&self, id: NodeId, kinds: &[TokenKind]) -> bool {
        self.token(id).is_some_and(|token| kinds.contains(&token.kind))
    }

    /// Put `new` in place of `old`, detaching `old`.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> Result<(), TreeError> {
        let (parent, index) = self.locate(old)?;
        self.detach(new);
        // Detaching `new` may shift `old` if both share the parent.
        let index = if self.children(parent).get(index) == Some(&old) {
            index
        } else {
            self.locate(old)?.1
        };
        self.nodes[parent.index()].children[index] = new;
        self.nodes[new.index()].parent = Some(parent);
        self.nodes[old.index()].parent = None;
        Ok(())
    }

    /// Leaf nodes under `id` in document order. A leaf `id` yields itself.
    pub fn leaves(&self, id: NodeId) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = self.node(current);
            if let NodeKind::Token(_) = node.kind {
                leaves.push(current);
            } else {
                stack.extend(node.children.iter().rev());
            }
        }
        leaves
    }

    /// Tokens under `id` in document order.
    pub fn tokens(&self, id: NodeId) -> impl Iterator<Item = &Token> + '_ {
        self.leaves(id)
            .into_iter()
            .filter_map(move |leaf| self.token(leaf))
    }

    /// All nodes under `id`, `id` included, in pre-order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut nodes = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            nodes.push(current);
            stack.extend(self.children(current).iter().rev());
        }
        nodes
    }

    /// Exact text of the subtree rooted at `id`.
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_text(id, &mut out);
        out
    }

    /// Append the exact text of `id` to `out`.
    pub fn write_text(&self, id: NodeId, out: &mut String) {
        for token in self.tokens(id) {
            out.push_str(&token.value);
        }
    }

    /// First token under `id`.
    pub fn first_token(&self, id: NodeId) -> Option<&Token> {
        self.tokens(id).next()
    }

    /// Source position of the first token under `id`.
    pub fn position(&self, id: NodeId) -> Option<Position> {
        self.first_token(id).map(|token| token.pos)
    }

    /// Returns `true` if a token of `kind` exists under `id`.
    pub fn has_token(&self, id: NodeId, kind: TokenKind) -> bool {
        self.tokens(id).any(|token| token.kind == kind)
    }

    /// Set the value of every token of `kind` under `id`.
    pub fn set_token_value(&mut self, id: NodeId, kind: TokenKind, value: &str) {
        for leaf in self.leaves(id) {
            if let Some(token) = self.token_mut(leaf) {
                if token.kind == kind {
                    token.value = value.to_string();
                }
            }
        }
    }

    /// Retype every token of kind `from` under `id` to `to`.
    pub fn retype(&mut self, id: NodeId, from: TokenKind, to: TokenKind) {
        for leaf in self.leaves(id) {
            if let Some(token) = self.token_mut(leaf) {
                if token.kind == from {
                    token.kind = to;
                }
            }
        }
    }

    /// Parent of `id` and the index of `id` among its children.
    fn locate(&self, id: NodeId) -> Result<(NodeId, usize), TreeError> {
        let parent = self.parent(id).ok_or(TreeError::Detached(id))?;
        let index = self
            .children(parent)
            .iter()
            .position(|&child| child == id)
            .ok_or(TreeError::NotAChild { parent, child: id })?;
        Ok((parent, index))
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.index()].parent.take() {
            self.nodes[parent.index()]
                .children
                .retain(|&child| child != id);
        }
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in self.tokens(self.root) {
            f.write_str(&token.value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(tree: &mut Tree, value: &str) -> NodeId {
        tree.add_token(Token::synthetic(TokenKind::Word, value))
    }

    fn sample() -> (Tree, NodeId, Vec<NodeId>) {
        let mut tree = Tree::new(Origin::Str);
        let expr = tree.add(NodeKind::Expression);
        let words: Vec<_> = ["a", "b", "c"].iter().map(|w| word(&mut tree, w)).collect();
        tree.append_all(expr, &words);
        let root = tree.root();
        tree.append(root, expr);
        (tree, expr, words)
    }

    fn line(tree: &mut Tree, parts: &[(TokenKind, &str)]) -> Vec<NodeId> {
        let root = tree.root();
        let ids: Vec<_> = parts
            .iter()
            .map(|&(kind, value)| tree.add_token(Token::synthetic(kind, value)))
            .collect();
        tree.append_all(root, &ids);
        ids
    }

    #[test]
    fn test_remove_line_collapses_blank_run() {
        let mut tree = Tree::new(Origin::Str);
        let ids = line(
            &mut tree,
            &[
                (TokenKind::Word, "a"),
                (TokenKind::Nl, "\n"),
                (TokenKind::Nl, "\n"),
                (TokenKind::Word, "gone"),
                (TokenKind::Nl, "\n"),
                (TokenKind::Nl, "\n"),
                (TokenKind::Word, "b"),
            ],
        );
        tree.remove_line(ids[3]).unwrap();
        assert_eq!(tree.to_string(), "a\n\nb");
    }

    #[test]
    fn test_remove_line_keeps_separator_without_newline_before() {
        let mut tree = Tree::new(Origin::Str);
        let ids = line(
            &mut tree,
            &[
                (TokenKind::Word, "a"),
                (TokenKind::Ws, " "),
                (TokenKind::Word, "gone"),
                (TokenKind::Nl, "\n"),
                (TokenKind::Word, "b"),
            ],
        );
        tree.remove_line(ids[2]).unwrap();
        assert_eq!(tree.to_string(), "a \nb");
    }

    #[test]
    fn test_text_concatenates_leaves() {
        let (tree, expr, _) = sample();
        assert_eq!(tree.text(expr), "abc");
        assert_eq!(tree.to_string(), "abc");
    }

    #[test]
    fn test_insert_after_and_prepend() {
        let (mut tree, expr, words) = sample();
        let x = word(&mut tree, "x");
        tree.insert_after(words[0], x).unwrap();
        let y = word(&mut tree, "y");
        tree.prepend(expr, y);
        assert_eq!(tree.text(expr), "yaxbc");
    }

    #[test]
    fn test_remove_keeps_node_serializable() {
        let (mut tree, expr, words) = sample();
        tree.remove(words[1]).unwrap();
        assert_eq!(tree.text(expr), "ac");
        assert_eq!(tree.text(words[1]), "b");
        assert!(!tree.is_attached(words[1]));
        assert_eq!(tree.remove(words[1]), Err(TreeError::Detached(words[1])));
    }

    #[test]
    fn test_replace() {
        let (mut tree, expr, words) = sample();
        let z = word(&mut tree, "zz");
        tree.replace(words[2], z).unwrap();
        assert_eq!(tree.text(expr), "abzz");
        assert!(tree.is_attached(z));
        assert!(tree.parent(words[2]).is_none());
    }

    #[test]
    fn test_replace_with_sibling() {
        let (mut tree, expr, words) = sample();
        tree.replace(words[2], words[0]).unwrap();
        assert_eq!(tree.text(expr), "ba");
    }

    #[test]
    fn test_append_moves_between_parents() {
        let (mut tree, expr, words) = sample();
        let other = tree.add(NodeKind::Expression);
        tree.append(other, words[0]);
        assert_eq!(tree.text(expr), "bc");
        assert_eq!(tree.text(other), "a");
    }

    #[test]
    fn test_set_token_value_and_retype() {
        let mut tree = Tree::new(Origin::Str);
        let root = tree.root();
        let kw = tree.add_token(Token::synthetic(TokenKind::Template, "template"));
        tree.append(root, kw);
        tree.set_token_value(root, TokenKind::Template, "type");
        tree.retype(root, TokenKind::Template, TokenKind::Type);
        assert_eq!(tree.to_string(), "type");
        assert_eq!(tree.token(kw).map(|t| t.kind), Some(TokenKind::Type));
        assert!(tree.has_token(root, TokenKind::Type));
    }
}
