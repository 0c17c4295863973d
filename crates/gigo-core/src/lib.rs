//! Core data model of the gigo compiler.
//!
//! This crate holds the types shared by the parser and the mutation engine:
//!
//! - [`Token`], [`TokenKind`] and [`Position`]: lexical tokens that keep
//!   their exact source text.
//! - [`Tree`]: an arena of nodes forming a format-preserving, editable view
//!   of a source file, with the query surface used by the mutation engine
//!   and the command-line tools.
//! - [`Span`]: byte ranges for diagnostics.

pub mod span;
pub mod token;
pub mod tree;

pub use span::Span;
pub use token::{Position, Token, TokenKind};
pub use tree::{
    AliasDecl, AssignDecl, AssignExpr, BinaryExpr, BodyBlock, CallExpr, CallParams, ElseStmt,
    ForStmt, FuncDecl, IfStmt, ImplementsDecl, InterfaceDecl, Node, NodeId, NodeKind, Origin,
    PackageDecl, PoireauDecl, PropDecl, PropsBlock, ReturnDecl, SignsBlock, StructDecl,
    TemplateDecl, TemplateFuncDecl, Tree, TreeError, VarDecl, slug_name, var_name,
};
