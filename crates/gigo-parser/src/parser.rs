//! Backtracking recursive-descent parser.
//!
//! The parser drives a [`Cursor`] over the lexer output and builds a
//! format-preserving [`Tree`]: every token read ends up as a leaf of the
//! tree, in source order, whether or not the grammar gives it a meaning.
//! Grammar rules read tokens into the cursor window and *flush* the window
//! into the node they are building once the tokens belong to it.
//!
//! Rules come in two flavors:
//!
//! - required constructs return `Result<NodeId>` and fail with a positioned
//!   [`SyntaxError`] as soon as a required token is missing;
//! - optional constructs return `Result<Option<NodeId>>`, with `Ok(None)`
//!   when the construct is absent.
//!
//! A [`Scope`] records declared variables so that `x {` after `x := 1` reads
//! as a condition followed by a block, while `T{}` reads as a composite
//! literal.
//!
//! Templated rules (the `templated` flag) additionally accept `<: ... >`
//! template blocks wherever an identifier may appear.

mod declarations;
mod expressions;
mod statements;

use gigo_core::{NodeId, NodeKind, Origin, TokenKind, Tree};
use log::{debug, trace};

use crate::{
    cursor::{Cursor, DEFAULT_LOOP_GUARD},
    error::{ErrorCode, Result, SyntaxError},
    lexer::Lexer,
    scope::Scope,
};

use TokenKind as K;

pub(crate) const WS: &[TokenKind] = &[K::Ws];
pub(crate) const WS_NL: &[TokenKind] = &[K::Ws, K::Nl];
pub(crate) const TRIVIA: &[TokenKind] = &[K::Ws, K::Nl, K::CommentLine, K::CommentBlock];
pub(crate) const COMMENTS_WS: &[TokenKind] = &[K::Ws, K::CommentLine, K::CommentBlock];

/// Parser settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseConfig {
    /// Fail when the source does not start with a package clause.
    pub require_package: bool,
    /// Reads allowed between two emits before the cursor reports an
    /// infinite loop.
    pub loop_guard: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            require_package: true,
            loop_guard: DEFAULT_LOOP_GUARD,
        }
    }
}

impl ParseConfig {
    /// Settings for snippets that have no package clause.
    pub fn snippet() -> Self {
        Self {
            require_package: false,
            ..Self::default()
        }
    }
}

pub(crate) struct Parser<'a> {
    cursor: Cursor<Lexer<'a>>,
    scope: Scope,
    tree: Tree,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(source: &'a str, origin: Origin, loop_guard: usize) -> Self {
        Self {
            cursor: Cursor::with_loop_guard(Lexer::new(source), loop_guard),
            scope: Scope::new(),
            tree: Tree::new(origin),
        }
    }

    /// Parse the whole input. A tripped loop guard wins over any other
    /// outcome.
    pub(crate) fn run(mut self, require_package: bool) -> Result<Tree> {
        let outcome = self.process(require_package);
        if let Some(fault) = self.cursor.take_fault() {
            return Err(fault);
        }
        outcome.map(|()| self.tree)
    }

    /// Read the file: the package clause, then declarations until the end
    /// of the input.
    fn process(&mut self, require_package: bool) -> Result<()> {
        let root = self.tree.root();
        match self.read_package_decl() {
            Ok(package) => self.tree.append(root, package),
            Err(err) if require_package => return Err(err),
            Err(_) => self.cursor.rewind_all(),
        }

        loop {
            self.cursor.read_many(TRIVIA);
            if self.cursor.ended() {
                self.flush_into(root);
                break;
            }
            let Some(next) = self.cursor.peek_one().map(|token| token.kind) else {
                break;
            };
            let decl = match next {
                K::Type => {
                    self.attach_comments(root);
                    self.read_type_decl()?
                }
                K::Import => {
                    self.flush_into(root);
                    self.read_import_decl()?
                }
                K::Template => {
                    self.attach_comments(root);
                    self.read_template_decl()?
                }
                K::TplOpen => {
                    self.attach_comments(root);
                    self.read_template_expr_decl()?
                }
                K::Func => {
                    self.attach_comments(root);
                    self.read_func_decl(true, false)?
                }
                K::Var => {
                    self.attach_comments(root);
                    self.read_var_decl(false)?
                }
                K::Const => {
                    self.attach_comments(root);
                    self.read_const_decl()?
                }
                _ => {
                    self.cursor.next();
                    self.flush_into(root);
                    continue;
                }
            };
            debug!(kind = self.tree.kind(decl).name(); "Read declaration");
            self.tree.append(root, decl);
        }
        Ok(())
    }

    /// Flush the window into `root`, leaving the comments right above the
    /// next declaration for it.
    fn attach_comments(&mut self, root: NodeId) {
        self.cursor.keep_previous_comment();
        self.flush_into(root);
    }

    /// Allocate a detached node.
    fn node(&mut self, kind: NodeKind) -> NodeId {
        self.tree.add(kind)
    }

    /// Replace the kind-specific data of `id`.
    fn set(&mut self, id: NodeId, kind: NodeKind) {
        *self.tree.kind_mut(id) = kind;
    }

    /// Move the window into `parent` as leaves and return them.
    fn flush_into(&mut self, parent: NodeId) -> Vec<NodeId> {
        let tokens = self.cursor.emit();
        let mut leaves = Vec::with_capacity(tokens.len());
        for token in tokens {
            let leaf = self.tree.add_token(token);
            self.tree.append(parent, leaf);
            leaves.push(leaf);
        }
        leaves
    }

    /// Move the window into a new node of `kind` appended to `parent`.
    fn flush_as(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let node = self.node(kind);
        self.flush_into(node);
        self.tree.append(parent, node);
        node
    }

    /// Read a required token of one of `kinds`.
    fn expect(&mut self, kinds: &[TokenKind], reason: &str) -> Result<()> {
        if self.cursor.read(kinds).is_some() {
            Ok(())
        } else if self.cursor.ended() {
            Err(self.error_code(ErrorCode::E101, "unexpected end of input", kinds))
        } else {
            Err(self.error(reason, kinds))
        }
    }

    /// An "unexpected token" error positioned on the next token.
    fn error(&mut self, reason: &str, wanted: &[TokenKind]) -> SyntaxError {
        self.error_code(ErrorCode::E100, reason, wanted)
    }

    fn error_code(&mut self, code: ErrorCode, reason: &str, wanted: &[TokenKind]) -> SyntaxError {
        trace!(code:% = code, reason; "Syntax error");
        self.cursor.error_here(code, reason, wanted)
    }

    /// Run `read` inside a new scope block.
    fn scoped<T>(&mut self, read: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.scope.enter();
        let result = read(self);
        self.scope.leave();
        result
    }

    /// Record the names declared by `id` in the innermost scope block.
    fn declare(&mut self, id: NodeId) {
        let names = self.tree.declared_names(id);
        trace!(names:?; "Declared variables");
        self.scope.add_vars(names);
    }

    /// Returns `true` if the cursor did not move since `before`.
    fn stalled(&self, before: usize) -> bool {
        self.cursor.index() == before
    }
}
