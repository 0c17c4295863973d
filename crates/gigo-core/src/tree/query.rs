//! Query surface shared by every tree.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    token::TokenKind,
    tree::{FuncDecl, NodeId, NodeKind, Tree},
};

static TEMPLATE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("template block pattern is valid"));

/// Name of a declaration with its template blocks and pointer stars removed.
///
/// ```
/// # use gigo_core::slug_name;
/// assert_eq!(slug_name("Mutexed<:.Name>"), "Mutexed");
/// assert_eq!(slug_name("<:.Name>Slice"), "Slice");
/// assert_eq!(slug_name(" *Todo "), "Todo");
/// ```
pub fn slug_name(name: &str) -> String {
    TEMPLATE_BLOCK
        .replace_all(name, "")
        .replace('*', "")
        .trim()
        .to_string()
}

/// Variable part of a selector: the text up to the first `.`.
pub fn var_name(name: &str) -> &str {
    name.split('.').next().unwrap_or(name).trim()
}

impl Tree {
    /// Top-level declarations and tokens, in source order.
    pub fn declarations(&self) -> &[NodeId] {
        self.children(self.root())
    }

    fn find_declarations(&self, pred: impl Fn(NodeId, &NodeKind) -> bool) -> Vec<NodeId> {
        self.declarations()
            .iter()
            .copied()
            .filter(|&id| pred(id, self.kind(id)))
            .collect()
    }

    pub fn find_packages(&self) -> Vec<NodeId> {
        self.find_declarations(|_, kind| matches!(kind, NodeKind::Package(_)))
    }

    pub fn find_imports(&self) -> Vec<NodeId> {
        self.find_declarations(|_, kind| matches!(kind, NodeKind::Import))
    }

    pub fn find_aliases(&self) -> Vec<NodeId> {
        self.find_declarations(|_, kind| matches!(kind, NodeKind::Alias(_)))
    }

    pub fn find_structs(&self) -> Vec<NodeId> {
        self.find_declarations(|_, kind| matches!(kind, NodeKind::Struct(_)))
    }

    pub fn find_interfaces(&self) -> Vec<NodeId> {
        self.find_declarations(|_, kind| matches!(kind, NodeKind::Interface(_)))
    }

    pub fn find_templates(&self) -> Vec<NodeId> {
        self.find_declarations(|_, kind| matches!(kind, NodeKind::Template(_)))
    }

    pub fn find_implements(&self) -> Vec<NodeId> {
        self.find_declarations(|_, kind| matches!(kind, NodeKind::Implements(_)))
    }

    pub fn find_vars(&self) -> Vec<NodeId> {
        self.find_declarations(|_, kind| matches!(kind, NodeKind::Var(_)))
    }

    pub fn find_consts(&self) -> Vec<NodeId> {
        self.find_declarations(|_, kind| matches!(kind, NodeKind::Const(_)))
    }

    /// Plain funcs: no modifier and no template block anywhere inside.
    pub fn find_funcs(&self) -> Vec<NodeId> {
        self.find_declarations(|id, kind| {
            matches!(kind, NodeKind::Func(_)) && !self.is_templated(id)
        })
    }

    /// Funcs that belong to a template: modifier-prefixed funcs other than
    /// `define` helpers, and funcs containing a template block.
    pub fn find_template_funcs(&self) -> Vec<NodeId> {
        self.find_declarations(|id, kind| match kind {
            NodeKind::TemplateFunc(_) => !self.is_define(id),
            NodeKind::Func(_) => self.is_templated(id),
            _ => false,
        })
    }

    /// Funcs whose modifier is exactly `define`.
    pub fn find_define_funcs(&self) -> Vec<NodeId> {
        self.find_declarations(|id, _| self.is_define(id))
    }

    /// Every leaf of `kind` reachable from the root, in document order.
    pub fn find_tokens(&self, kind: TokenKind) -> Vec<NodeId> {
        self.leaves(self.root())
            .into_iter()
            .filter(|&leaf| self.token(leaf).is_some_and(|token| token.kind == kind))
            .collect()
    }

    /// Declarations whose name or slug name equals `symbol`.
    pub fn find_symbols(&self, symbol: &str) -> Vec<NodeId> {
        self.find_declarations(|id, _| {
            self.name_of(id)
                .is_some_and(|name| name == symbol || slug_name(&name) == symbol)
        })
    }

    /// Leaves positioned on `line`.
    pub fn grep_line(&self, line: usize) -> Vec<NodeId> {
        self.leaves(self.root())
            .into_iter()
            .filter(|&leaf| self.token(leaf).is_some_and(|token| token.pos.line == line))
            .collect()
    }

    /// Trimmed text of an optional node.
    pub fn text_of(&self, id: Option<NodeId>) -> Option<String> {
        id.map(|id| self.text(id).trim().to_string())
    }

    /// Name of a declaration.
    pub fn name_of(&self, id: NodeId) -> Option<String> {
        let name = match self.kind(id) {
            NodeKind::Package(decl) => decl.name,
            NodeKind::Alias(decl) => decl.name,
            NodeKind::Struct(decl) => decl.name,
            NodeKind::Interface(decl) => decl.name,
            NodeKind::Template(decl) => decl.name,
            NodeKind::Implements(decl) => decl.name,
            NodeKind::Prop(decl) => decl.name,
            NodeKind::Func(_) | NodeKind::TemplateFunc(_) => {
                self.func_of(id).and_then(|(_, decl)| decl.name)
            }
            NodeKind::Var(decl) | NodeKind::Const(decl) => decl
                .assigns
                .first()
                .and_then(|&assign| match self.kind(assign) {
                    NodeKind::Assign(assign) => assign.left,
                    _ => None,
                }),
            _ => None,
        };
        self.text_of(name)
    }

    /// Slug name of a declaration, see [`slug_name`].
    pub fn slug_of(&self, id: NodeId) -> Option<String> {
        self.name_of(id).map(|name| slug_name(&name))
    }

    /// The func of a func or template-func declaration.
    pub fn func_of(&self, id: NodeId) -> Option<(NodeId, &FuncDecl)> {
        match self.kind(id) {
            NodeKind::Func(decl) => Some((id, decl)),
            NodeKind::TemplateFunc(decl) => decl.func.and_then(|func| self.func_of(func)),
            _ => None,
        }
    }

    /// Type of the receiver of a method, as written.
    pub fn receiver_type(&self, id: NodeId) -> Option<String> {
        let (_, func) = self.func_of(id)?;
        let prop = *self.block_props(func.receiver?).first()?;
        self.prop_type(prop)
    }

    pub fn is_method(&self, id: NodeId) -> bool {
        self.func_of(id)
            .is_some_and(|(_, func)| func.receiver.is_some())
    }

    /// Returns `true` if a complete template block exists under `id`.
    pub fn is_templated(&self, id: NodeId) -> bool {
        self.has_token(id, TokenKind::TplOpen) && self.has_token(id, TokenKind::TplClose)
    }

    /// Returns `true` for template funcs whose modifier is `define`.
    pub fn is_define(&self, id: NodeId) -> bool {
        self.modifier_text(id).is_some_and(|text| text == "define")
    }

    /// Action text of a template-func modifier, without delimiters.
    pub fn modifier_text(&self, id: NodeId) -> Option<String> {
        match self.kind(id) {
            NodeKind::TemplateFunc(decl) => decl.modifier.map(|block| self.template_inner_text(block)),
            _ => None,
        }
    }

    /// Text of a template block without its delimiters, trimmed.
    pub fn template_inner_text(&self, block: NodeId) -> String {
        let (open, close) = match self.kind(block) {
            NodeKind::TemplateBlock(body) | NodeKind::Body(body) => (body.open, body.close),
            _ => (None, None),
        };
        let mut out = String::new();
        for &child in self.children(block) {
            if Some(child) != open && Some(child) != close {
                self.write_text(child, &mut out);
            }
        }
        out.trim().to_string()
    }

    /// Named props of a props block.
    pub fn block_props(&self, block: NodeId) -> &[NodeId] {
        match self.kind(block) {
            NodeKind::PropsBlock(props) => &props.props,
            _ => &[],
        }
    }

    /// Anonymous embeddings of a props block.
    pub fn block_underlying(&self, block: NodeId) -> &[NodeId] {
        match self.kind(block) {
            NodeKind::PropsBlock(props) => &props.underlying,
            _ => &[],
        }
    }

    pub fn prop_name(&self, prop: NodeId) -> Option<String> {
        match self.kind(prop) {
            NodeKind::Prop(decl) => self.text_of(decl.name),
            _ => None,
        }
    }

    pub fn prop_type(&self, prop: NodeId) -> Option<String> {
        match self.kind(prop) {
            NodeKind::Prop(decl) => self.text_of(decl.ty),
            _ => None,
        }
    }

    /// Parameter props of a func.
    pub fn args_block(&self, id: NodeId) -> Vec<NodeId> {
        self.func_of(id)
            .and_then(|(_, func)| func.params)
            .map(|params| self.block_props(params).to_vec())
            .unwrap_or_default()
    }

    /// Parameter names of a func.
    pub fn args_names(&self, id: NodeId) -> Vec<String> {
        self.args_block(id)
            .into_iter()
            .filter_map(|prop| self.prop_name(prop))
            .collect()
    }

    /// Output declaration of a func as written, empty when absent.
    pub fn out_text(&self, id: NodeId) -> String {
        self.func_of(id)
            .and_then(|(_, func)| self.text_of(func.out))
            .unwrap_or_default()
    }

    /// Methods attached to a struct, template or implements declaration.
    pub fn methods_of(&self, id: NodeId) -> &[NodeId] {
        match self.kind(id) {
            NodeKind::Struct(decl) => &decl.methods,
            NodeKind::Template(decl) => &decl.methods,
            NodeKind::Implements(decl) => &decl.methods,
            _ => &[],
        }
    }

    /// Record `method` as a method of a struct, template or implements
    /// declaration. Returns `false` for any other node kind.
    pub fn attach_method(&mut self, owner: NodeId, method: NodeId) -> bool {
        match self.kind_mut(owner) {
            NodeKind::Struct(decl) => decl.methods.push(method),
            NodeKind::Template(decl) => decl.methods.push(method),
            NodeKind::Implements(decl) => decl.methods.push(method),
            _ => return false,
        }
        true
    }

    /// Variable names declared by a node: assignment ids, named props, or
    /// the left side of var/const assignments.
    pub fn declared_names(&self, id: NodeId) -> Vec<String> {
        let ids: Vec<NodeId> = match self.kind(id) {
            NodeKind::AssignExpr(expr) => expr.ids.clone(),
            NodeKind::PropsBlock(block) => {
                return block
                    .props
                    .iter()
                    .filter_map(|&prop| self.prop_name(prop))
                    .collect();
            }
            NodeKind::Var(decl) | NodeKind::Const(decl) | NodeKind::AssignsBlock(decl) => decl
                .assigns
                .iter()
                .filter_map(|&assign| match self.kind(assign) {
                    NodeKind::Assign(assign) => assign.left,
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };
        ids.into_iter()
            .map(|id| self.text(id).trim().to_string())
            .filter(|name| !name.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_slug_name() {
        assert_eq!(slug_name("Mutexed<:.Name>"), "Mutexed");
        assert_eq!(slug_name("Mutexed<:.Name:>"), "Mutexed");
        assert_eq!(slug_name("<:.Name>Slice"), "Slice");
        assert_eq!(slug_name("*Todo"), "Todo");
        assert_eq!(slug_name("Plain"), "Plain");
    }

    #[test]
    fn test_var_name() {
        assert_eq!(var_name("t.Tokens"), "t");
        assert_eq!(var_name("x"), "x");
        assert_eq!(var_name(""), "");
    }

    proptest! {
        #[test]
        fn prop_slug_ignores_template_blocks(
            head in "[A-Za-z]{0,8}",
            body in "[.A-Za-z $:]{1,12}",
            tail in "[A-Za-z]{0,8}",
        ) {
            let templated = format!("*{head}<:{body}>{tail}");
            prop_assert_eq!(slug_name(&templated), format!("{head}{tail}"));
        }
    }
}
