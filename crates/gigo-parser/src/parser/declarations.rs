//! Top-level declarations: package, imports, types, templates, funcs and
//! var/const declarations.

use gigo_core::{
    AliasDecl, AssignDecl, FuncDecl, ImplementsDecl, InterfaceDecl, NodeId, NodeKind,
    PackageDecl, PoireauDecl, PropDecl, PropsBlock, SignsBlock, StructDecl, TemplateDecl,
    TemplateFuncDecl, Token, TokenKind as K, Tree, VarDecl,
};
use log::trace;

use super::{COMMENTS_WS, Parser, TRIVIA, WS, WS_NL};
use crate::error::{ErrorCode, Result};

/// Separators skipped between the entries of a struct body.
const PROPS_SEPARATORS: &[K] = &[
    K::Ws,
    K::Nl,
    K::CommentLine,
    K::CommentBlock,
    K::SemiColon,
    K::Comma,
];

/// Separators skipped between the entries of a parameter list.
const PARAMS_SEPARATORS: &[K] = &[K::Ws, K::Nl, K::CommentLine, K::CommentBlock, K::Comma];

/// Tokens ending an assignment that has no type and no value.
const ASSIGN_END: &[K] = &[
    K::Nl,
    K::SemiColon,
    K::ParenClose,
    K::CommentLine,
    K::CommentBlock,
];

impl Parser<'_> {
    /// `package name`.
    pub(super) fn read_package_decl(&mut self) -> Result<NodeId> {
        self.cursor.read_many(TRIVIA);
        if self.cursor.read(&[K::Package]).is_none() {
            return Err(self.error("missing package clause", &[K::Package]));
        }
        self.cursor.read_many(WS);
        if !self.cursor.at(&[K::Word]) {
            return Err(self.error("missing package name", &[K::Word]));
        }
        let package = self.node(NodeKind::Package(PackageDecl::default()));
        self.flush_into(package);
        self.cursor.next();
        let name = self.flush_as(package, NodeKind::Identifier);
        self.cursor.read_many(WS_NL);
        self.flush_into(package);
        self.set(package, NodeKind::Package(PackageDecl { name: Some(name) }));
        Ok(package)
    }

    /// `import "path"`, `import name "path"` or `import (...)`.
    pub(super) fn read_import_decl(&mut self) -> Result<NodeId> {
        let import = self.node(NodeKind::Import);
        self.expect(&[K::Import], "expected import")?;
        self.cursor.read_many(WS);
        if self.cursor.at(&[K::ParenOpen]) {
            if !self.cursor.read_block(K::ParenOpen, K::ParenClose) {
                return Err(self.error_code(ErrorCode::E101, "unclosed import block", &[K::ParenClose]));
            }
        } else {
            if self.cursor.read(&[K::Word, K::Dot]).is_some() {
                self.cursor.read_many(WS);
            }
            self.expect(&[K::Text], "expected import path")?;
        }
        self.flush_into(import);
        Ok(import)
    }

    /// `type Name struct {...}`, `type Name interface {...}`,
    /// `type Name implements<:...> {...}` or an alias `type Name [=] T`.
    pub(super) fn read_type_decl(&mut self) -> Result<NodeId> {
        self.cursor.read_many(TRIVIA);
        self.expect(&[K::Type], "expected type")?;
        self.cursor.read_many(TRIVIA);
        let head = self.cursor.emit();
        let name = self.read_var_name(false, false, false)?;
        self.cursor.read_many(WS);

        let decl = match self.cursor.peek_one().map(|token| token.kind) {
            Some(K::Struct) => self.read_struct_decl(false)?,
            Some(K::Interface) => self.read_interface_decl()?,
            Some(K::Implements) => self.read_impl_decl()?,
            _ => self.read_alias_decl()?,
        };
        self.tree.prepend(decl, name);
        let head = self.leaves(head);
        self.tree.prepend_all(decl, &head);
        self.set_name(decl, name);
        trace!(name = self.tree.text(name).as_str(); "Read type declaration");
        Ok(decl)
    }

    fn read_alias_decl(&mut self) -> Result<NodeId> {
        let alias = self.node(NodeKind::Alias(AliasDecl::default()));
        if self.cursor.read(&[K::Assign]).is_some() {
            self.cursor.read_many(WS);
        }
        self.flush_into(alias);
        let target = match self.read_type_name(false, true)? {
            Some(target) => target,
            None => {
                self.read_line_rest();
                if self.cursor.current().is_empty() {
                    return Err(self.error("expected a type", &[K::Struct, K::Interface, K::Implements, K::Word]));
                }
                self.flush_new(NodeKind::Expression)
            }
        };
        self.tree.append(alias, target);
        self.set(
            alias,
            NodeKind::Alias(AliasDecl {
                name: None,
                target: Some(target),
            }),
        );
        Ok(alias)
    }

    /// Record `name` as the name of a type declaration.
    fn set_name(&mut self, decl: NodeId, name: NodeId) {
        match self.tree.kind_mut(decl) {
            NodeKind::Struct(decl) => decl.name = Some(name),
            NodeKind::Interface(decl) => decl.name = Some(name),
            NodeKind::Implements(decl) => decl.name = Some(name),
            NodeKind::Alias(decl) => decl.name = Some(name),
            _ => {}
        }
    }

    /// Turn tokens taken out of the window into detached leaves.
    fn leaves(&mut self, tokens: Vec<Token>) -> Vec<NodeId> {
        tokens
            .into_iter()
            .map(|token| self.tree.add_token(token))
            .collect()
    }

    /// `struct {...}`.
    pub(super) fn read_struct_decl(&mut self, templated: bool) -> Result<NodeId> {
        let strukt = self.node(NodeKind::Struct(StructDecl::default()));
        self.expect(&[K::Struct], "expected struct")?;
        self.cursor.read_many(WS);
        if !self.cursor.at(&[K::BraceOpen]) {
            return Err(self.error("unexpected token", &[K::BraceOpen]));
        }
        self.flush_into(strukt);
        let block = self.read_props_block(templated, K::BraceOpen, K::BraceClose)?;
        self.tree.append(strukt, block);
        self.set(
            strukt,
            NodeKind::Struct(StructDecl {
                name: None,
                block: Some(block),
                methods: Vec::new(),
            }),
        );
        Ok(strukt)
    }

    /// A struct body: poireau markers, `name type [tag]` props and
    /// anonymous embeddings.
    pub(super) fn read_props_block(&mut self, templated: bool, open: K, close: K) -> Result<NodeId> {
        let block = self.node(NodeKind::PropsBlock(PropsBlock::default()));
        let mut data = PropsBlock::default();
        self.expect(&[open], "expected block")?;
        self.flush_into(block);

        let mut depth = 1usize;
        loop {
            self.cursor.read_many(PROPS_SEPARATORS);
            if self.cursor.read(&[open]).is_some() {
                depth += 1;
                continue;
            }
            if self.cursor.at(&[close]) {
                depth -= 1;
                if depth == 0 {
                    break;
                }
                self.cursor.next();
                continue;
            }
            if self.cursor.ended() {
                return Err(self.error_code(ErrorCode::E101, "unexpected end of input", &[close]));
            }
            self.flush_into(block);

            if self.cursor.at(&[K::Poireau, K::PoireauPointer]) {
                let poireau = self.read_poireau_decl()?;
                self.tree.append(block, poireau);
                data.poireaux.push(poireau);
                continue;
            }

            match self.read_var_name(templated, false, true) {
                Ok(name) => {
                    self.cursor.read_many(WS);
                    let ws = self.cursor.emit();
                    match self.read_type_name(templated, true)? {
                        Some(ty) => {
                            let prop = self.node(NodeKind::Prop(PropDecl::default()));
                            self.tree.append(prop, name);
                            let ws = self.leaves(ws);
                            self.tree.append_all(prop, &ws);
                            self.tree.append(prop, ty);
                            let tag = self.read_prop_tag(prop);
                            self.set(
                                prop,
                                NodeKind::Prop(PropDecl {
                                    name: Some(name),
                                    ty: Some(ty),
                                    tag,
                                }),
                            );
                            self.tree.append(block, prop);
                            data.props.push(prop);
                        }
                        None => {
                            let expr = self.node(NodeKind::Expression);
                            self.tree.append(expr, name);
                            self.tree.append(block, expr);
                            let ws = self.leaves(ws);
                            self.tree.append_all(block, &ws);
                            data.underlying.push(expr);
                        }
                    }
                }
                Err(err) => match self.read_type_name(templated, false)? {
                    Some(ty) => {
                        self.tree.append(block, ty);
                        data.underlying.push(ty);
                    }
                    None => return Err(err),
                },
            }
        }

        self.expect(&[close], "expected end of block")?;
        self.flush_into(block);
        self.set(block, NodeKind::PropsBlock(data));
        Ok(block)
    }

    /// A struct tag following a prop type.
    fn read_prop_tag(&mut self, prop: NodeId) -> Option<NodeId> {
        let saved = self.cursor.checkpoint();
        self.cursor.read_many(WS);
        if !self.cursor.at(&[K::Text]) {
            self.cursor.reset(saved);
            return None;
        }
        self.flush_into(prop);
        self.cursor.next();
        Some(self.flush_as(prop, NodeKind::Expression))
    }

    /// `poireau<:...>` or `*poireau<:...>`.
    pub(super) fn read_poireau_decl(&mut self) -> Result<NodeId> {
        let poireau = self.node(NodeKind::Poireau(PoireauDecl::default()));
        let pointer = self.cursor.at(&[K::PoireauPointer]);
        self.expect(&[K::Poireau, K::PoireauPointer], "expected poireau")?;
        self.cursor.read_many(WS);
        self.flush_into(poireau);
        if !self.cursor.at(&[K::TplOpen]) {
            return Err(self.error("expected a template block", &[K::TplOpen]));
        }
        let template = self.read_template_block()?;
        self.tree.append(poireau, template);
        self.set(
            poireau,
            NodeKind::Poireau(PoireauDecl {
                template: Some(template),
                pointer,
            }),
        );
        Ok(poireau)
    }

    /// `interface {...}`.
    pub(super) fn read_interface_decl(&mut self) -> Result<NodeId> {
        let iface = self.node(NodeKind::Interface(InterfaceDecl::default()));
        self.expect(&[K::Interface], "expected interface")?;
        self.cursor.read_many(WS);
        self.flush_into(iface);
        let block = self.read_signs_block(K::BraceOpen, K::BraceClose)?;
        self.tree.append(iface, block);
        self.set(
            iface,
            NodeKind::Interface(InterfaceDecl {
                name: None,
                block: Some(block),
            }),
        );
        Ok(iface)
    }

    /// An interface body: method signatures and embedded interfaces.
    pub(super) fn read_signs_block(&mut self, open: K, close: K) -> Result<NodeId> {
        let block = self.node(NodeKind::SignsBlock(SignsBlock::default()));
        let mut data = SignsBlock::default();
        self.expect(&[open], "expected block")?;
        self.flush_into(block);

        let mut depth = 1usize;
        loop {
            self.cursor.read_many(PROPS_SEPARATORS);
            if self.cursor.read(&[open]).is_some() {
                depth += 1;
                continue;
            }
            if self.cursor.at(&[close]) {
                depth -= 1;
                if depth == 0 {
                    break;
                }
                self.cursor.next();
                continue;
            }
            if self.cursor.ended() {
                return Err(self.error_code(ErrorCode::E101, "unexpected end of input", &[close]));
            }
            self.flush_into(block);

            let name = self.read_var_name(false, false, true)?;
            self.cursor.read_many(WS);
            if self.cursor.at(&[K::ParenOpen]) {
                let sign = self.read_func_sign(name)?;
                self.tree.append(block, sign);
                data.signs.push(sign);
            } else {
                let expr = self.node(NodeKind::Expression);
                self.tree.append(expr, name);
                self.tree.append(block, expr);
                data.underlying.push(expr);
            }
        }

        self.expect(&[close], "expected end of block")?;
        self.flush_into(block);
        self.set(block, NodeKind::SignsBlock(data));
        Ok(block)
    }

    /// `Name(params) out` inside an interface.
    pub(super) fn read_func_sign(&mut self, name: NodeId) -> Result<NodeId> {
        let func = self.node(NodeKind::Func(FuncDecl::default()));
        self.tree.append(func, name);
        self.flush_into(func);
        let params = self.read_paren_decl(false)?;
        self.tree.append(func, params);

        let saved = self.cursor.checkpoint();
        self.cursor.read_many(WS);
        let out = if self.cursor.at(&[K::ParenOpen]) {
            self.flush_into(func);
            Some(self.read_paren_decl(false)?)
        } else if self.cursor.at(&[K::Nl, K::SemiColon, K::BraceClose]) || self.cursor.at(COMMENTS_WS) {
            self.cursor.reset(saved);
            None
        } else {
            self.flush_into(func);
            self.read_out_type(false)?
        };
        if let Some(out) = out {
            self.tree.append(func, out);
        }
        self.set(
            func,
            NodeKind::Func(FuncDecl {
                receiver: None,
                name: Some(name),
                params: Some(params),
                out,
                body: None,
            }),
        );
        Ok(func)
    }

    /// `implements<:...> {...}`.
    pub(super) fn read_impl_decl(&mut self) -> Result<NodeId> {
        let decl = self.node(NodeKind::Implements(ImplementsDecl::default()));
        self.expect(&[K::Implements], "expected implements")?;
        self.cursor.read_many(WS);
        self.flush_into(decl);
        if !self.cursor.at(&[K::TplOpen]) {
            return Err(self.error("expected a template block", &[K::TplOpen]));
        }
        let template = self.read_template_block()?;
        self.tree.append(decl, template);
        self.cursor.read_many(WS);
        self.flush_into(decl);
        let block = self.read_props_block(true, K::BraceOpen, K::BraceClose)?;
        self.tree.append(decl, block);
        self.set(
            decl,
            NodeKind::Implements(ImplementsDecl {
                name: None,
                template: Some(template),
                block: Some(block),
                methods: Vec::new(),
            }),
        );
        Ok(decl)
    }

    /// `template Name<:...> struct {...}`.
    pub(super) fn read_template_decl(&mut self) -> Result<NodeId> {
        let decl = self.node(NodeKind::Template(TemplateDecl::default()));
        self.cursor.read_many(TRIVIA);
        self.expect(&[K::Template], "expected template")?;
        self.cursor.read_many(WS);
        self.flush_into(decl);
        let name = self.read_var_name(true, false, false)?;
        self.cursor.read_many(WS);
        if !self.cursor.at(&[K::Struct]) {
            return Err(self.error("unexpected token", &[K::Struct]));
        }
        let strukt = self.read_struct_decl(true)?;
        self.tree.prepend(strukt, name);
        self.set_name(strukt, name);
        self.tree.append(decl, strukt);
        let block = match self.tree.kind(strukt) {
            NodeKind::Struct(strukt) => strukt.block,
            _ => None,
        };
        self.set(
            decl,
            NodeKind::Template(TemplateDecl {
                name: Some(name),
                strukt: Some(strukt),
                block,
                methods: Vec::new(),
            }),
        );
        Ok(decl)
    }

    /// `<:modifier> func ...`.
    pub(super) fn read_template_expr_decl(&mut self) -> Result<NodeId> {
        let decl = self.node(NodeKind::TemplateFunc(TemplateFuncDecl::default()));
        self.cursor.read_many(TRIVIA);
        self.flush_into(decl);
        let modifier = self.read_template_block()?;
        self.tree.append(decl, modifier);
        self.cursor.read_many(TRIVIA);
        self.flush_into(decl);
        let func = self.read_func_decl(true, false)?;
        self.tree.append(decl, func);
        self.set(
            decl,
            NodeKind::TemplateFunc(TemplateFuncDecl {
                modifier: Some(modifier),
                func: Some(func),
            }),
        );
        Ok(decl)
    }

    /// A func declaration or, when `is_literal`, a func literal.
    pub(super) fn read_func_decl(&mut self, templated: bool, is_literal: bool) -> Result<NodeId> {
        self.scoped(|parser| parser.read_func(templated, is_literal))
    }

    fn read_func(&mut self, templated: bool, is_literal: bool) -> Result<NodeId> {
        let func = self.node(NodeKind::Func(FuncDecl::default()));
        let mut decl = FuncDecl::default();
        self.cursor.read_many(TRIVIA);
        self.expect(&[K::Func], "expected func")?;
        self.cursor.read_many(WS);
        self.flush_into(func);

        if !is_literal && self.cursor.at(&[K::ParenOpen]) {
            let receiver = self.read_paren_decl(templated)?;
            self.tree.append(func, receiver);
            self.declare(receiver);
            decl.receiver = Some(receiver);
            self.cursor.read_many(WS);
            self.flush_into(func);
        }
        if self.cursor.at(&[K::Word]) || (templated && self.cursor.at(&[K::TplOpen])) {
            let name = self.read_var_name(templated, false, false)?;
            self.tree.append(func, name);
            decl.name = Some(name);
            self.cursor.read_many(WS);
            self.flush_into(func);
        }

        let params = self.read_paren_decl(templated)?;
        self.tree.append(func, params);
        self.declare(params);
        decl.params = Some(params);

        self.cursor.read_many(WS);
        if !self.cursor.at(&[K::BraceOpen]) {
            self.flush_into(func);
            let out = if templated && self.cursor.at(&[K::TplOpen]) {
                Some(self.read_var_name(true, false, false)?)
            } else if self.cursor.at(&[K::ParenOpen]) {
                let out = self.read_paren_decl(templated)?;
                self.declare(out);
                Some(out)
            } else {
                self.read_out_type(templated)?
            };
            if let Some(out) = out {
                self.tree.append(func, out);
                decl.out = Some(out);
            }
            self.cursor.read_many(WS);
        }

        self.flush_into(func);
        let body = self.read_statements_block(templated, K::BraceOpen, K::BraceClose)?;
        self.tree.append(func, body);
        decl.body = Some(body);
        self.set(func, NodeKind::Func(decl));
        Ok(func)
    }

    /// A single result type, wrapped in a one-prop block.
    fn read_out_type(&mut self, templated: bool) -> Result<Option<NodeId>> {
        let Some(ty) = self.read_type_name(templated, true)? else {
            return Ok(None);
        };
        let prop = self.node(NodeKind::Prop(PropDecl::default()));
        self.tree.append(prop, ty);
        self.set(
            prop,
            NodeKind::Prop(PropDecl {
                name: None,
                ty: Some(ty),
                tag: None,
            }),
        );
        let block = self.node(NodeKind::PropsBlock(PropsBlock::default()));
        self.tree.append(block, prop);
        self.set(
            block,
            NodeKind::PropsBlock(PropsBlock {
                props: vec![prop],
                ..PropsBlock::default()
            }),
        );
        Ok(Some(block))
    }

    /// A parenthesized list of `name type` or bare `type` entries.
    pub(super) fn read_paren_decl(&mut self, templated: bool) -> Result<NodeId> {
        let block = self.node(NodeKind::PropsBlock(PropsBlock::default()));
        let mut data = PropsBlock::default();
        self.expect(&[K::ParenOpen], "expected parameters")?;
        self.flush_into(block);

        let mut bare = Vec::new();
        let mut depth = 1usize;
        loop {
            self.cursor.read_many(PARAMS_SEPARATORS);
            if self.cursor.read(&[K::ParenOpen]).is_some() {
                depth += 1;
                continue;
            }
            if self.cursor.at(&[K::ParenClose]) {
                depth -= 1;
                if depth == 0 {
                    break;
                }
                self.cursor.next();
                continue;
            }
            if self.cursor.ended() {
                return Err(self.error_code(ErrorCode::E101, "unexpected end of input", &[K::ParenClose]));
            }
            self.flush_into(block);

            let prop = self.node(NodeKind::Prop(PropDecl::default()));
            let mut trailing = Vec::new();
            match self.read_var_name(templated, false, true) {
                Ok(name) if self.tree.text(name).contains('.') => {
                    // A qualified name is a type, never a parameter name.
                    let expr = self.node(NodeKind::Expression);
                    self.tree.append(expr, name);
                    self.tree.append(prop, expr);
                    self.set(prop, NodeKind::Prop(PropDecl { name: None, ty: Some(expr), tag: None }));
                }
                Ok(name) => {
                    self.cursor.read_many(&[K::Ws, K::CommentBlock]);
                    let ws = self.cursor.emit();
                    match self.read_type_name(templated, true)? {
                        Some(ty) => {
                            self.tree.append(prop, name);
                            let ws = self.leaves(ws);
                            self.tree.append_all(prop, &ws);
                            self.tree.append(prop, ty);
                            self.set(prop, NodeKind::Prop(PropDecl { name: Some(name), ty: Some(ty), tag: None }));
                        }
                        None => {
                            let expr = self.node(NodeKind::Expression);
                            self.tree.append(expr, name);
                            self.tree.append(prop, expr);
                            self.set(prop, NodeKind::Prop(PropDecl { name: None, ty: Some(expr), tag: None }));
                            bare.push((prop, name));
                            trailing = self.leaves(ws);
                        }
                    }
                }
                Err(err) => match self.read_type_name(templated, true)? {
                    Some(ty) => {
                        self.tree.append(prop, ty);
                        self.set(prop, NodeKind::Prop(PropDecl { name: None, ty: Some(ty), tag: None }));
                    }
                    None => return Err(err),
                },
            }
            self.tree.append(block, prop);
            self.tree.append_all(block, &trailing);
            data.props.push(prop);
        }

        self.expect(&[K::ParenClose], "expected )")?;
        self.flush_into(block);
        self.share_group_types(&data.props, &bare);
        self.set(block, NodeKind::PropsBlock(data));
        Ok(block)
    }

    /// In `(a, b int)` the bare words before a typed name are names sharing
    /// its type. Lists without any typed name, such as `(int, error)`, are
    /// left as types.
    fn share_group_types(&mut self, props: &[NodeId], bare: &[(NodeId, NodeId)]) {
        let typed_of = |tree: &Tree, prop: NodeId| match tree.kind(prop) {
            NodeKind::Prop(PropDecl { name: Some(_), ty: Some(ty), .. }) => Some(*ty),
            _ => None,
        };
        if !props.iter().any(|&prop| typed_of(&self.tree, prop).is_some()) {
            return;
        }

        let mut shared = None;
        for &prop in props.iter().rev() {
            if let Some(ty) = typed_of(&self.tree, prop) {
                shared = Some(ty);
                continue;
            }
            if let Some(&(_, name)) = bare.iter().find(|(candidate, _)| *candidate == prop) {
                trace!(prop:?; "Grouped parameter name");
                self.set(prop, NodeKind::Prop(PropDecl { name: Some(name), ty: shared, tag: None }));
            }
        }
    }

    /// `var x T = v` or `var (...)`.
    pub(super) fn read_var_decl(&mut self, templated: bool) -> Result<NodeId> {
        let decl = self.node(NodeKind::Var(VarDecl::default()));
        self.cursor.read_many(TRIVIA);
        self.expect(&[K::Var], "expected var")?;
        let assigns = self.read_var_body(decl, templated, true)?;
        self.set(decl, NodeKind::Var(VarDecl { assigns }));
        self.declare(decl);
        Ok(decl)
    }

    /// `const x = v` or `const (...)`.
    pub(super) fn read_const_decl(&mut self) -> Result<NodeId> {
        let decl = self.node(NodeKind::Const(VarDecl::default()));
        self.cursor.read_many(TRIVIA);
        self.expect(&[K::Const], "expected const")?;
        let assigns = self.read_var_body(decl, false, false)?;
        self.set(decl, NodeKind::Const(VarDecl { assigns }));
        self.declare(decl);
        Ok(decl)
    }

    fn read_var_body(&mut self, decl: NodeId, templated: bool, can_omit_right: bool) -> Result<Vec<NodeId>> {
        self.cursor.read_many(WS);
        self.flush_into(decl);
        if self.cursor.at(&[K::ParenOpen]) {
            let block = self.read_assigns_block(K::ParenOpen, K::ParenClose)?;
            self.tree.append(decl, block);
            return Ok(match self.tree.kind(block) {
                NodeKind::AssignsBlock(block) => block.assigns.clone(),
                _ => Vec::new(),
            });
        }
        let assign = self.read_assign_decl(templated, can_omit_right)?;
        self.tree.append(decl, assign);
        Ok(vec![assign])
    }

    /// `name [type] [= value]`.
    pub(super) fn read_assign_decl(&mut self, templated: bool, can_omit_right: bool) -> Result<NodeId> {
        let assign = self.node(NodeKind::Assign(AssignDecl::default()));
        let mut data = AssignDecl::default();
        let left = self.read_var_name(templated, true, false)?;
        self.tree.append(assign, left);
        data.left = Some(left);
        self.cursor.read_many(WS);
        self.flush_into(assign);

        if !self.cursor.at(&[K::Assign]) && !self.cursor.at(ASSIGN_END) {
            if let Some(ty) = self.read_type_name(templated, true)? {
                self.tree.append(assign, ty);
                data.left_type = Some(ty);
            }
            self.cursor.read_many(WS);
        }

        if self.cursor.read(&[K::Assign]).is_some() {
            let leaves = self.flush_into(assign);
            data.assign = leaves.last().copied();
            self.cursor.read_many(WS);
            self.flush_into(assign);
            let right = self.read_expression(templated, &[K::SemiColon, K::ParenClose])?;
            self.tree.append(assign, right);
            data.right = Some(right);
        } else if !can_omit_right {
            return Err(self.error("expected assignment", &[K::Assign]));
        }
        self.set(assign, NodeKind::Assign(data));
        Ok(assign)
    }

    /// The parenthesized block of a var or const declaration.
    pub(super) fn read_assigns_block(&mut self, open: K, close: K) -> Result<NodeId> {
        let block = self.node(NodeKind::AssignsBlock(VarDecl::default()));
        let mut assigns = Vec::new();
        self.expect(&[open], "expected block")?;
        self.flush_into(block);
        loop {
            self.cursor.read_many(PROPS_SEPARATORS);
            if self.cursor.at(&[close]) {
                break;
            }
            if self.cursor.ended() {
                return Err(self.error_code(ErrorCode::E101, "unexpected end of input", &[close]));
            }
            self.flush_into(block);
            let assign = self.read_assign_decl(false, true)?;
            self.tree.append(block, assign);
            assigns.push(assign);
        }
        self.expect(&[close], "expected end of block")?;
        self.flush_into(block);
        self.set(block, NodeKind::AssignsBlock(VarDecl { assigns }));
        Ok(block)
    }
}
