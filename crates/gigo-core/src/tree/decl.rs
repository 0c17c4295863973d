//! Kind-specific data carried by tree nodes.
//!
//! Every field holding a [`NodeId`] is a non-owning reference into the same
//! tree. The referenced node is also reachable through the owner's children
//! (or one of its descendants), so serializing the owner serializes the
//! named part exactly once.

use std::{fmt, path::PathBuf};

use crate::{token::Token, tree::NodeId};

/// Where the source of a tree comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    File(PathBuf),
    Str,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::File(path) => write!(f, "{}", path.display()),
            Origin::Str => f.write_str("<noname>"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageDecl {
    pub name: Option<NodeId>,
}

/// `type Name Target` or `type Name = Target`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasDecl {
    pub name: Option<NodeId>,
    pub target: Option<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructDecl {
    pub name: Option<NodeId>,
    pub block: Option<NodeId>,
    /// Funcs whose receiver names this struct. Detached from the struct's
    /// children.
    pub methods: Vec<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceDecl {
    pub name: Option<NodeId>,
    pub block: Option<NodeId>,
}

/// `template Name<:...> struct {...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateDecl {
    pub name: Option<NodeId>,
    /// The struct declaration following the template name.
    pub strukt: Option<NodeId>,
    pub block: Option<NodeId>,
    pub methods: Vec<NodeId>,
}

/// `type Name implements<:...> {...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImplementsDecl {
    pub name: Option<NodeId>,
    /// The template block holding the mutator expression.
    pub template: Option<NodeId>,
    pub block: Option<NodeId>,
    pub methods: Vec<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FuncDecl {
    pub receiver: Option<NodeId>,
    pub name: Option<NodeId>,
    pub params: Option<NodeId>,
    pub out: Option<NodeId>,
    pub body: Option<NodeId>,
}

/// `<:modifier> func ...`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateFuncDecl {
    pub modifier: Option<NodeId>,
    pub func: Option<NodeId>,
}

/// Var and const declarations, and their parenthesized blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarDecl {
    pub assigns: Vec<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignDecl {
    pub left: Option<NodeId>,
    pub left_type: Option<NodeId>,
    pub assign: Option<NodeId>,
    pub right: Option<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReturnDecl {
    pub values: Vec<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IfStmt {
    pub init: Option<NodeId>,
    pub cond: Option<NodeId>,
    pub body: Option<NodeId>,
    pub else_: Option<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElseStmt {
    pub body: Option<NodeId>,
    pub if_: Option<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForStmt {
    pub init: Option<NodeId>,
    pub cond: Option<NodeId>,
    pub post: Option<NodeId>,
    /// The ranged-over expression of a `range` loop.
    pub range: Option<NodeId>,
    pub body: Option<NodeId>,
}

/// `a, b := x, y` or `a = x`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignExpr {
    pub ids: Vec<NodeId>,
    pub values: Vec<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallExpr {
    pub id: Option<NodeId>,
    pub params: Option<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallParams {
    pub params: Vec<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinaryExpr {
    pub left: Option<NodeId>,
    pub op: Option<NodeId>,
    pub right: Option<NodeId>,
}

/// A struct body or a parenthesized parameter list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropsBlock {
    pub poireaux: Vec<NodeId>,
    /// Anonymous embeddings: entries made of a type only.
    pub underlying: Vec<NodeId>,
    pub props: Vec<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropDecl {
    pub name: Option<NodeId>,
    pub ty: Option<NodeId>,
    pub tag: Option<NodeId>,
}

/// An interface body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignsBlock {
    pub underlying: Vec<NodeId>,
    pub signs: Vec<NodeId>,
}

/// A balanced block; `open` and `close` are its delimiter tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyBlock {
    pub open: Option<NodeId>,
    pub close: Option<NodeId>,
}

/// `poireau<:...>` or `*poireau<:...>` inside a struct body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoireauDecl {
    pub template: Option<NodeId>,
    pub pointer: bool,
}

/// The kind of a tree node, with its kind-specific fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Root(Origin),
    Token(Token),
    Package(PackageDecl),
    Import,
    Alias(AliasDecl),
    Struct(StructDecl),
    Interface(InterfaceDecl),
    Template(TemplateDecl),
    Implements(ImplementsDecl),
    Func(FuncDecl),
    TemplateFunc(TemplateFuncDecl),
    Var(VarDecl),
    Const(VarDecl),
    AssignsBlock(VarDecl),
    Assign(AssignDecl),
    Return(ReturnDecl),
    If(IfStmt),
    Else(ElseStmt),
    For(ForStmt),
    AssignExpr(AssignExpr),
    Call(CallExpr),
    CallParams(CallParams),
    Binary(BinaryExpr),
    Expression,
    Identifier,
    PropsBlock(PropsBlock),
    Prop(PropDecl),
    SignsBlock(SignsBlock),
    Body(BodyBlock),
    TemplateBlock(BodyBlock),
    Poireau(PoireauDecl),
}

impl NodeKind {
    /// Human readable name of the node kind.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Root(Origin::File(_)) => "File",
            NodeKind::Root(Origin::Str) => "Str",
            NodeKind::Token(_) => "Token",
            NodeKind::Package(_) => "PackageDecl",
            NodeKind::Import => "ImportDecl",
            NodeKind::Alias(_) => "AliasDecl",
            NodeKind::Struct(_) => "StructDecl",
            NodeKind::Interface(_) => "InterfaceDecl",
            NodeKind::Template(_) => "TemplateDecl",
            NodeKind::Implements(_) => "ImplementsDecl",
            NodeKind::Func(_) => "FuncDecl",
            NodeKind::TemplateFunc(_) => "TemplateFuncDecl",
            NodeKind::Var(_) => "VarDecl",
            NodeKind::Const(_) => "ConstDecl",
            NodeKind::AssignsBlock(_) => "AssignsBlock",
            NodeKind::Assign(_) => "AssignDecl",
            NodeKind::Return(_) => "ReturnDecl",
            NodeKind::If(_) => "IfStmt",
            NodeKind::Else(_) => "ElseStmt",
            NodeKind::For(_) => "ForStmt",
            NodeKind::AssignExpr(_) => "AssignExpr",
            NodeKind::Call(_) => "CallExpr",
            NodeKind::CallParams(_) => "CallParams",
            NodeKind::Binary(_) => "BinaryExpr",
            NodeKind::Expression => "Expression",
            NodeKind::Identifier => "Identifier",
            NodeKind::PropsBlock(_) => "PropsBlock",
            NodeKind::Prop(_) => "PropDecl",
            NodeKind::SignsBlock(_) => "SignsBlock",
            NodeKind::Body(_) => "BodyBlock",
            NodeKind::TemplateBlock(_) => "TemplateBlock",
            NodeKind::Poireau(_) => "PoireauDecl",
        }
    }
}
