//! Names, types and expressions.

use gigo_core::{
    AssignExpr, BinaryExpr, BodyBlock, CallExpr, CallParams, NodeId, NodeKind, TokenKind as K,
    var_name,
};
use log::trace;

use super::{Parser, TRIVIA, WS, WS_NL};
use crate::error::{ErrorCode, Result};

/// Operators that may prefix or join operands inside an expression.
const OPERATORS: &[K] = &[
    K::Sub,
    K::Mul,
    K::Add,
    K::Rem,
    K::Quo,
    K::Negate,
    K::And,
    K::Or,
    K::Xor,
    K::Shl,
    K::Shr,
    K::AndNot,
    K::Arrow,
];

const COMPARISONS: &[K] = &[K::Greater, K::Smeq, K::Gteq, K::Neq, K::Eq, K::Smaller];

pub(super) const ASSIGNMENTS: &[K] = &[
    K::TypeAssign,
    K::Assign,
    K::AddAssign,
    K::SubAssign,
    K::MulAssign,
    K::QuoAssign,
    K::RemAssign,
    K::AndAssign,
    K::OrAssign,
    K::XorAssign,
    K::ShlAssign,
    K::ShrAssign,
    K::AndNotAssign,
];

/// Tokens an expression never consumes on its own: they close an
/// enclosing construct.
const CLOSERS: &[K] = &[K::ParenClose, K::BracketClose, K::BraceClose, K::Comma];

impl Parser<'_> {
    /// Read an identifier: words joined by dots and, when `templated`,
    /// template blocks. The first word must start with a letter, or with
    /// `_` when `allow_underscore` is set.
    pub(super) fn read_var_name(
        &mut self,
        templated: bool,
        allow_underscore: bool,
        allow_dot: bool,
    ) -> Result<NodeId> {
        let wanted: &[K] = if templated {
            &[K::Word, K::TplOpen]
        } else {
            &[K::Word]
        };
        let Some(first) = self.cursor.peek_one().cloned() else {
            return Err(self.error_code(ErrorCode::E101, "unexpected end of input", wanted));
        };
        match first.kind {
            K::Word => {
                let c = first.value.chars().next();
                let valid = c.is_some_and(char::is_alphabetic)
                    || (allow_underscore && c == Some('_'));
                if !valid {
                    let reason = format!("Invalid value '{}', must start with char", first.value);
                    return Err(self.error_code(ErrorCode::E102, &reason, wanted));
                }
            }
            K::TplOpen if templated => {}
            _ => return Err(self.error("unexpected token", wanted)),
        }

        let ident = self.node(NodeKind::Identifier);
        loop {
            if self.cursor.read(&[K::Word]).is_some() {
                continue;
            }
            if templated && self.cursor.at(&[K::TplOpen]) {
                self.flush_into(ident);
                let block = self.read_template_block()?;
                self.tree.append(ident, block);
                continue;
            }
            if allow_dot && self.cursor.read(&[K::Dot]).is_some() {
                continue;
            }
            break;
        }
        self.flush_into(ident);
        Ok(ident)
    }

    /// Read a number literal: digits, optionally followed by `.digits`.
    pub(super) fn read_number(&mut self) -> Result<NodeId> {
        let starts_with_digit = self
            .cursor
            .peek(&[K::Word])
            .is_some_and(|token| token.value.starts_with(|c: char| c.is_ascii_digit()));
        if !starts_with_digit {
            return Err(self.error("expected a number", &[K::Word]));
        }
        self.cursor.next();
        let fraction = self.cursor.at(&[K::Dot])
            && self
                .cursor
                .peek_n(1)
                .is_some_and(|token| token.kind == K::Word && token.value.starts_with(|c: char| c.is_ascii_digit()));
        if fraction {
            self.cursor.next();
            self.cursor.next();
        }
        Ok(self.flush_new(NodeKind::Identifier))
    }

    /// A selector expression, see [`Parser::read_var_name`].
    pub(super) fn read_ident(&mut self, templated: bool, allow_underscore: bool) -> Result<NodeId> {
        let name = self.read_var_name(templated, allow_underscore, true)?;
        let expr = self.node(NodeKind::Expression);
        self.tree.append(expr, name);
        Ok(expr)
    }

    /// Read a type: optional `...`, slice/array brackets (when `brackets`),
    /// pointer stars, `map[K]` and `chan` prefixes, then a builtin type,
    /// `interface{...}`, `struct{...}`, a func type or a type name.
    ///
    /// Returns `Ok(None)` with the cursor restored when no type starts here.
    pub(super) fn read_type_name(&mut self, templated: bool, brackets: bool) -> Result<Option<NodeId>> {
        let saved = self.cursor.checkpoint();
        self.cursor.read(&[K::Elipse]);
        loop {
            if brackets && self.cursor.at(&[K::BracketOpen]) {
                if !self.cursor.read_block(K::BracketOpen, K::BracketClose) {
                    return Err(self.error_code(ErrorCode::E101, "unclosed brackets", &[K::BracketClose]));
                }
                continue;
            }
            if self.cursor.read(&[K::Mul]).is_some() {
                continue;
            }
            if self.cursor.read(&[K::Map]).is_some() {
                if !self.cursor.read_block(K::BracketOpen, K::BracketClose) {
                    return Err(self.error("expected map key type", &[K::BracketOpen]));
                }
                continue;
            }
            if self.cursor.read(&[K::Arrow, K::Chan]).is_some() {
                self.cursor.read(&[K::Chan, K::Arrow]);
                self.cursor.read_many(WS);
                continue;
            }
            break;
        }

        if let Some(ty) = self.read_type_identifier(templated)? {
            return Ok(Some(ty));
        }
        match self.read_ident(templated, false) {
            Ok(ident) => Ok(Some(ident)),
            Err(_) => {
                self.cursor.reset(saved);
                Ok(None)
            }
        }
    }

    /// Read a builtin type, `interface{...}`, `struct{...}` or a func type.
    pub(super) fn read_type_identifier(&mut self, templated: bool) -> Result<Option<NodeId>> {
        if self.cursor.read(&[K::BuiltinType]).is_some() {
            return Ok(Some(self.flush_new(NodeKind::Expression)));
        }
        if self.cursor.read(&[K::Interface]).is_some() {
            self.cursor.read_many(WS);
            if self.cursor.at(&[K::BraceOpen])
                && !self.cursor.read_block(K::BraceOpen, K::BraceClose)
            {
                return Err(self.error_code(ErrorCode::E101, "unclosed interface", &[K::BraceClose]));
            }
            return Ok(Some(self.flush_new(NodeKind::Expression)));
        }
        if self.cursor.at(&[K::Struct]) {
            return self.read_struct_decl(templated).map(Some);
        }
        if self.cursor.read(&[K::Func]).is_some() {
            self.cursor.read_many(WS);
            if !self.cursor.read_block(K::ParenOpen, K::ParenClose) {
                return Err(self.error("expected func parameters", &[K::ParenOpen]));
            }
            let expr = self.flush_new(NodeKind::Expression);
            let saved = self.cursor.checkpoint();
            self.cursor.read_many(WS);
            if self.cursor.at(&[K::ParenOpen]) {
                self.cursor.read_block(K::ParenOpen, K::ParenClose);
                self.flush_into(expr);
            } else if self.cursor.at(&[K::Word, K::BuiltinType, K::Mul, K::BracketOpen]) {
                self.flush_into(expr);
                if let Some(out) = self.read_type_name(templated, true)? {
                    self.tree.append(expr, out);
                }
            } else {
                self.cursor.reset(saved);
            }
            return Ok(Some(expr));
        }
        Ok(None)
    }

    /// Read a template block `<: ... >`. The closing `>` is retyped to
    /// [`K::TplClose`].
    pub(super) fn read_template_block(&mut self) -> Result<NodeId> {
        let block = self.node(NodeKind::TemplateBlock(BodyBlock::default()));
        let body = self.read_balanced(block, K::TplOpen, K::Greater)?;
        if let Some(close) = body.close {
            if let Some(token) = self.tree.token_mut(close) {
                token.kind = K::TplClose;
            }
        }
        self.set(block, NodeKind::TemplateBlock(body));
        Ok(block)
    }

    /// Read a balanced block into `node`, returning its delimiter leaves.
    pub(super) fn read_balanced(&mut self, node: NodeId, open: K, close: K) -> Result<BodyBlock> {
        if !self.cursor.at(&[open]) {
            return Err(self.error("unexpected token", &[open]));
        }
        if !self.cursor.read_block(open, close) {
            return Err(self.error_code(ErrorCode::E101, "unclosed block", &[close]));
        }
        let leaves = self.flush_into(node);
        let open = leaves
            .iter()
            .copied()
            .find(|&leaf| self.tree.token(leaf).is_some_and(|token| token.kind == open));
        Ok(BodyBlock {
            open,
            close: leaves.last().copied(),
        })
    }

    /// Read an expression up to one of `until`, a `;` or a newline.
    pub(super) fn read_expression(&mut self, templated: bool, until: &[K]) -> Result<NodeId> {
        let expr = self.node(NodeKind::Expression);
        loop {
            let before = self.cursor.index();

            if self.cursor.at(&[K::Struct]) {
                self.flush_into(expr);
                let strukt = self.read_struct_decl(templated)?;
                self.tree.append(expr, strukt);
                self.read_literal_body()?;
                self.flush_into(expr);
            }
            if self.cursor.read(&[K::Text, K::True, K::False]).is_some() {
                self.flush_into(expr);
            }
            self.cursor.read(WS);
            if self.cursor.read(OPERATORS).is_some() {
                self.flush_into(expr);
            }
            self.cursor.read(WS);

            if self.cursor.at(&[K::Func]) {
                self.flush_into(expr);
                let func = self.read_func_decl(templated, true)?;
                self.tree.append(expr, func);
            } else if self.cursor.at(&[K::BracketOpen]) {
                if !self.cursor.read_block(K::BracketOpen, K::BracketClose) {
                    return Err(self.error_code(ErrorCode::E101, "unclosed brackets", &[K::BracketClose]));
                }
                if self.cursor.read(&[K::BuiltinType, K::Word]).is_some() {
                    self.read_literal_body()?;
                }
                self.flush_into(expr);
            } else if self.cursor.at(&[K::Map]) {
                if let Some(ty) = self.read_type_name(templated, true)? {
                    self.tree.append(expr, ty);
                }
                self.read_literal_body()?;
                self.flush_into(expr);
            } else if self.cursor.at(&[K::ParenOpen]) {
                self.flush_into(expr);
                let params = self.read_paren_expr_block(templated)?;
                self.tree.append(expr, params);
            } else if self.cursor.at(&[K::Word]) || (templated && self.cursor.at(&[K::TplOpen])) {
                self.flush_into(expr);
                self.read_operand(templated, expr)?;
            }

            if self.cursor.read(&[K::Dot]).is_some() {
                self.flush_into(expr);
                continue;
            }
            if self.cursor.at(until) || self.cursor.at(&[K::SemiColon, K::Nl]) {
                break;
            }
            if self.stalled(before) {
                if self.cursor.ended() || self.cursor.at(CLOSERS) {
                    break;
                }
                if self.cursor.at(&[K::BraceOpen]) {
                    self.read_literal_body()?;
                } else {
                    self.cursor.next();
                }
                self.flush_into(expr);
            }
        }
        Ok(expr)
    }

    /// Read a named operand and what directly follows it: a composite
    /// literal, a call, an index, `++`/`--` or an assignment operator.
    fn read_operand(&mut self, templated: bool, expr: NodeId) -> Result<()> {
        let name = match self.read_var_name(templated, true, true) {
            Ok(name) => name,
            Err(err) => {
                match self.read_number() {
                    Ok(number) => self.tree.append(expr, number),
                    Err(_) if err.code() == ErrorCode::E102 => {
                        // Runes and other literals the lexer keeps as words.
                        self.cursor.next();
                        self.flush_into(expr);
                    }
                    Err(_) => return Err(err),
                }
                return Ok(());
            }
        };

        let text = self.tree.text(name);
        let local = self.scope.has_var(var_name(&text));
        // Composite literal: `T{` with the brace right after a name that
        // is not a known variable.
        if self.cursor.at(&[K::BraceOpen]) && !local {
            trace!(name = text.as_str(); "Composite literal");
            self.tree.append(expr, name);
            self.read_literal_body()?;
            self.flush_into(expr);
            return Ok(());
        }

        if self.cursor.read(&[K::Inc, K::Dec]).is_some() {
            self.tree.append(expr, name);
            self.flush_into(expr);
        } else if self.cursor.at(&[K::ParenOpen]) {
            let call = self.node(NodeKind::Call(CallExpr::default()));
            self.tree.append(call, name);
            let params = self.read_paren_expr_block(templated)?;
            self.tree.append(call, params);
            self.set(
                call,
                NodeKind::Call(CallExpr {
                    id: Some(name),
                    params: Some(params),
                }),
            );
            self.tree.append(expr, call);
        } else if self.cursor.at(&[K::BracketOpen]) {
            self.tree.append(expr, name);
            if !self.cursor.read_block(K::BracketOpen, K::BracketClose) {
                return Err(self.error_code(ErrorCode::E101, "unclosed brackets", &[K::BracketClose]));
            }
            self.flush_into(expr);
        } else if self.cursor.at(ASSIGNMENTS) {
            if self.cursor.at(&[K::TypeAssign]) {
                self.scope.add_var(var_name(&text));
            }
            self.tree.append(expr, name);
            self.cursor.next();
            self.flush_into(expr);
        } else {
            self.tree.append(expr, name);
        }
        Ok(())
    }

    /// Read the `{...}` body of a composite literal, when present.
    fn read_literal_body(&mut self) -> Result<()> {
        if self.cursor.at(&[K::BraceOpen]) && !self.cursor.read_block(K::BraceOpen, K::BraceClose) {
            return Err(self.error_code(ErrorCode::E101, "unclosed literal", &[K::BraceClose]));
        }
        Ok(())
    }

    /// Read comparisons joined by `&&` and `||`, up to `until`.
    pub(super) fn read_binary_expression(&mut self, templated: bool, until: K) -> Result<NodeId> {
        let binary = self.node(NodeKind::Binary(BinaryExpr::default()));
        let mut data = BinaryExpr::default();
        let left_until: Vec<K> = std::iter::once(until).chain(COMPARISONS.iter().copied()).collect();
        loop {
            let before = self.cursor.index();
            self.flush_into(binary);
            let left = self.read_expression(templated, &left_until)?;
            self.tree.append(binary, left);
            data.left = Some(left);
            self.cursor.read_many(WS);
            if self.cursor.read(COMPARISONS).is_some() {
                let leaves = self.flush_into(binary);
                data.op = leaves.last().copied();
                self.cursor.read_many(WS);
                self.flush_into(binary);
                let right = self.read_expression(templated, &[until, K::LAnd, K::LOr])?;
                self.tree.append(binary, right);
                data.right = Some(right);
            }
            if self.cursor.at(&[until]) {
                break;
            }
            self.cursor.read_many(WS);
            if self.cursor.read(&[K::LAnd, K::LOr]).is_some() {
                self.cursor.read_many(WS_NL);
                self.flush_into(binary);
                continue;
            }
            if self.cursor.at(&[until, K::Nl, K::SemiColon])
                || self.cursor.ended()
                || self.stalled(before)
            {
                break;
            }
        }
        self.set(binary, NodeKind::Binary(data));
        Ok(binary)
    }

    /// Read `a, b := x, y` style assignments up to one of `until` or a
    /// newline. The assigned names are declared in the current scope.
    pub(super) fn read_assign_expr(&mut self, templated: bool, allow_dot: bool, until: &[K]) -> Result<NodeId> {
        let assign = self.node(NodeKind::AssignExpr(AssignExpr::default()));
        let mut data = AssignExpr::default();
        let mut values = false;
        let value_until: Vec<K> = std::iter::once(K::Comma).chain(until.iter().copied()).collect();
        loop {
            let before = self.cursor.index();
            if self.cursor.at(&[K::Nl]) || self.cursor.at(until) || self.cursor.ended() {
                break;
            }
            if self.cursor.read(ASSIGNMENTS).is_some() {
                values = true;
                self.cursor.read_many(WS);
                self.flush_into(assign);
                continue;
            }
            if values {
                let value = self.read_expression(templated, &value_until)?;
                self.tree.append(assign, value);
                data.values.push(value);
            } else {
                let id = self.read_var_name(templated, true, allow_dot)?;
                self.tree.append(assign, id);
                data.ids.push(id);
            }
            self.cursor.read_many(WS);
            if self.cursor.read(&[K::Comma]).is_some() {
                self.cursor.read_many(WS_NL);
            }
            self.flush_into(assign);
            if self.stalled(before) {
                return Err(self.error("unexpected token", &[K::Comma, K::TypeAssign]));
            }
        }
        self.set(assign, NodeKind::AssignExpr(data));
        self.declare(assign);
        Ok(assign)
    }

    /// Read the parenthesized arguments of a call or a grouping.
    pub(super) fn read_paren_expr_block(&mut self, templated: bool) -> Result<NodeId> {
        let params = self.node(NodeKind::CallParams(CallParams::default()));
        let mut data = CallParams::default();
        self.expect(&[K::ParenOpen], "expected arguments")?;
        self.flush_into(params);
        let mut depth = 1usize;
        loop {
            self.cursor.read_many(TRIVIA);
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
            if self.cursor.read(&[K::Elipse, K::Comma]).is_some() {
                continue;
            }
            if self.cursor.ended() {
                return Err(self.error_code(ErrorCode::E101, "unexpected end of input", &[K::ParenClose]));
            }
            self.flush_into(params);
            let before = self.cursor.index();
            let param = self.read_expression(templated, &[K::ParenClose, K::Comma, K::Elipse])?;
            self.tree.append(params, param);
            data.params.push(param);
            if self.stalled(before) {
                self.cursor.next();
            }
        }
        self.expect(&[K::ParenClose], "expected )")?;
        self.flush_into(params);
        self.set(params, NodeKind::CallParams(data));
        Ok(params)
    }

    /// Read the rest of the line, keeping brackets balanced.
    pub(super) fn read_line_rest(&mut self) {
        let mut depth = 0usize;
        while let Some(kind) = self.cursor.peek_one().map(|token| token.kind) {
            match kind {
                K::Nl | K::CommentLine if depth == 0 => break,
                K::ParenOpen | K::BracketOpen | K::BraceOpen => depth += 1,
                K::ParenClose | K::BracketClose | K::BraceClose => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.cursor.next();
        }
    }

    /// Flush the window into a new detached node.
    pub(super) fn flush_new(&mut self, kind: NodeKind) -> NodeId {
        let node = self.node(kind);
        self.flush_into(node);
        node
    }
}
