//! Statement blocks and control flow.

use gigo_core::{BodyBlock, ElseStmt, ForStmt, IfStmt, NodeId, NodeKind, ReturnDecl, TokenKind as K};

use super::{COMMENTS_WS, Parser, TRIVIA, WS, WS_NL};
use crate::error::{ErrorCode, Result};

/// Tokens that can start an expression statement.
const EXPRESSION_START: &[K] = &[
    K::Word,
    K::Func,
    K::Mul,
    K::Arrow,
    K::ParenOpen,
    K::And,
    K::Sub,
    K::Negate,
    K::Text,
];

impl Parser<'_> {
    /// A `{...}` block of statements, in its own scope.
    pub(super) fn read_statements_block(&mut self, templated: bool, open: K, close: K) -> Result<NodeId> {
        self.scoped(|parser| parser.read_statements(templated, open, close))
    }

    fn read_statements(&mut self, templated: bool, open: K, close: K) -> Result<NodeId> {
        let body = self.node(NodeKind::Body(BodyBlock::default()));
        let mut data = BodyBlock::default();
        if !self.cursor.at(&[open]) {
            return Err(self.error("require token", &[open]));
        }
        self.cursor.next();
        data.open = self.flush_into(body).last().copied();

        let mut depth = 1usize;
        loop {
            self.cursor.read_many(TRIVIA);
            self.flush_into(body);
            if self.cursor.read(&[open]).is_some() {
                depth += 1;
                self.flush_into(body);
                continue;
            }
            if self.cursor.read(&[close]).is_some() {
                depth -= 1;
                let leaves = self.flush_into(body);
                if depth == 0 {
                    data.close = leaves.last().copied();
                    break;
                }
                continue;
            }
            let Some(next) = self.cursor.peek_one().map(|token| token.kind) else {
                return Err(self.error_code(ErrorCode::E101, "unexpected end of input", &[close]));
            };

            let before = self.cursor.index();
            let statement = match next {
                K::Var => Some(self.read_var_decl(templated)?),
                K::Const => Some(self.read_const_decl()?),
                K::Return => Some(self.read_return_decl(templated)?),
                K::For => Some(self.read_for_stmt(templated)?),
                K::If => Some(self.read_if_stmt(templated)?),
                K::Defer | K::Go => {
                    self.cursor.next();
                    self.cursor.read_many(WS);
                    let stmt = self.flush_new(NodeKind::Expression);
                    let call = self.read_expression(templated, &[K::Nl, close])?;
                    self.tree.append(stmt, call);
                    Some(stmt)
                }
                K::TplOpen if templated => Some(self.read_simple_statement(templated, close)?),
                kind if EXPRESSION_START.contains(&kind) => Some(self.read_simple_statement(templated, close)?),
                _ => None,
            };
            match statement {
                Some(statement) => self.tree.append(body, statement),
                None => {
                    self.cursor.next();
                    self.flush_into(body);
                }
            }
            if self.stalled(before) {
                self.cursor.next();
                self.flush_into(body);
            }
        }
        self.set(body, NodeKind::Body(data));
        Ok(body)
    }

    /// An assignment with a plain left side, or any other expression.
    fn read_simple_statement(&mut self, templated: bool, close: K) -> Result<NodeId> {
        let found = self.cursor.peek_until(&[
            K::TypeAssign,
            K::Assign,
            K::Nl,
            K::SemiColon,
            K::BraceOpen,
            K::ParenOpen,
            K::BracketOpen,
            close,
        ]);
        self.cursor.rewind_all();
        match found {
            Some(K::TypeAssign | K::Assign) => self.read_assign_expr(templated, true, &[K::SemiColon, close]),
            _ => self.read_expression(templated, &[K::Nl, close]),
        }
    }

    /// `return a, b`.
    pub(super) fn read_return_decl(&mut self, templated: bool) -> Result<NodeId> {
        let ret = self.node(NodeKind::Return(ReturnDecl::default()));
        let mut data = ReturnDecl::default();
        self.expect(&[K::Return], "expected return")?;
        self.flush_into(ret);
        loop {
            let before = self.cursor.index();
            self.cursor.read_many(COMMENTS_WS);
            if self.cursor.at(&[K::Nl, K::BraceClose, K::SemiColon]) || self.cursor.ended() {
                break;
            }
            self.flush_into(ret);
            let value = self.read_expression(templated, &[K::Comma, K::BraceClose])?;
            self.tree.append(ret, value);
            data.values.push(value);
            self.cursor.read_many(WS);
            if self.cursor.read(&[K::Comma]).is_some() {
                self.cursor.read_many(WS_NL);
                self.flush_into(ret);
                continue;
            }
            if self.stalled(before) {
                return Err(self.error("unexpected token", &[K::Comma, K::Nl]));
            }
            break;
        }
        self.set(ret, NodeKind::Return(data));
        Ok(ret)
    }

    /// `if [init;] cond {...} [else ...]`, in its own scope.
    pub(super) fn read_if_stmt(&mut self, templated: bool) -> Result<NodeId> {
        self.scoped(|parser| parser.read_if(templated))
    }

    fn read_if(&mut self, templated: bool) -> Result<NodeId> {
        let stmt = self.node(NodeKind::If(IfStmt::default()));
        let mut data = IfStmt::default();
        self.expect(&[K::If], "expected if")?;
        self.cursor.read_many(WS);
        self.flush_into(stmt);

        let found = self.cursor.peek_until(&[K::SemiColon, K::TypeAssign, K::BraceOpen]);
        self.cursor.rewind_all();
        match found {
            Some(K::TypeAssign) => {
                let init = self.read_assign_expr(templated, false, &[K::SemiColon])?;
                self.tree.append(stmt, init);
                data.init = Some(init);
                self.cursor.read_many(WS);
                self.expect(&[K::SemiColon], "expected ;")?;
                self.cursor.read_many(WS);
                self.flush_into(stmt);
            }
            Some(K::SemiColon) => {
                return Err(self.error_code(ErrorCode::E103, "Not an assignment", &[K::TypeAssign]));
            }
            _ => {}
        }

        let cond = self.read_binary_expression(templated, K::BraceOpen)?;
        self.tree.append(stmt, cond);
        data.cond = Some(cond);
        self.cursor.read_many(WS);
        self.flush_into(stmt);

        let body = self.read_statements_block(templated, K::BraceOpen, K::BraceClose)?;
        self.tree.append(stmt, body);
        data.body = Some(body);

        let saved = self.cursor.checkpoint();
        self.cursor.read_many(WS);
        if self.cursor.at(&[K::Else]) {
            self.flush_into(stmt);
            let else_ = self.read_else_stmt(templated)?;
            self.tree.append(stmt, else_);
            data.else_ = Some(else_);
        } else {
            self.cursor.reset(saved);
        }
        self.set(stmt, NodeKind::If(data));
        Ok(stmt)
    }

    /// `else {...}` or `else if ...`.
    pub(super) fn read_else_stmt(&mut self, templated: bool) -> Result<NodeId> {
        let stmt = self.node(NodeKind::Else(ElseStmt::default()));
        let mut data = ElseStmt::default();
        self.expect(&[K::Else], "expected else")?;
        self.cursor.read_many(WS_NL);
        self.flush_into(stmt);
        if self.cursor.at(&[K::If]) {
            let if_ = self.read_if_stmt(templated)?;
            self.tree.append(stmt, if_);
            data.if_ = Some(if_);
        } else {
            let body = self.read_statements_block(templated, K::BraceOpen, K::BraceClose)?;
            self.tree.append(stmt, body);
            data.body = Some(body);
        }
        self.set(stmt, NodeKind::Else(data));
        Ok(stmt)
    }

    /// Infinite, condition-only, three-clause and range loops, in their
    /// own scope.
    pub(super) fn read_for_stmt(&mut self, templated: bool) -> Result<NodeId> {
        self.scoped(|parser| parser.read_for(templated))
    }

    fn read_for(&mut self, templated: bool) -> Result<NodeId> {
        let stmt = self.node(NodeKind::For(ForStmt::default()));
        let mut data = ForStmt::default();
        self.expect(&[K::For], "expected for")?;
        self.cursor.read_many(WS);
        self.flush_into(stmt);

        let found = self.cursor.peek_until(&[K::Range, K::TypeAssign, K::SemiColon, K::BraceOpen]);
        let ranged = found == Some(K::TypeAssign) && {
            self.cursor.read(&[K::TypeAssign]);
            self.cursor.read_many(WS);
            self.cursor.at(&[K::Range])
        };
        self.cursor.rewind_all();

        match found {
            Some(K::Range) => {
                let range = self.read_range_clause(stmt, templated)?;
                self.tree.append(stmt, range);
                data.range = Some(range);
            }
            Some(K::TypeAssign) if ranged => {
                let init = self.read_assign_expr(templated, false, &[K::Range, K::SemiColon])?;
                self.tree.append(stmt, init);
                data.init = Some(init);
                let range = self.read_range_clause(stmt, templated)?;
                self.tree.append(stmt, range);
                data.range = Some(range);
            }
            Some(found @ (K::TypeAssign | K::SemiColon)) => {
                if !self.cursor.at(&[K::SemiColon]) {
                    let init = if found == K::TypeAssign {
                        self.read_assign_expr(templated, false, &[K::SemiColon])?
                    } else {
                        self.read_expression(templated, &[K::SemiColon])?
                    };
                    self.tree.append(stmt, init);
                    data.init = Some(init);
                }
                self.read_clause_separator()?;
                self.flush_into(stmt);
                if !self.cursor.at(&[K::SemiColon]) {
                    let cond = self.read_binary_expression(templated, K::SemiColon)?;
                    self.tree.append(stmt, cond);
                    data.cond = Some(cond);
                }
                self.read_clause_separator()?;
                self.flush_into(stmt);
                if !self.cursor.at(&[K::BraceOpen]) {
                    let post = self.read_expression(templated, &[K::BraceOpen])?;
                    self.tree.append(stmt, post);
                    data.post = Some(post);
                }
            }
            Some(_) => {
                if !self.cursor.at(&[K::BraceOpen]) {
                    let cond = self.read_binary_expression(templated, K::BraceOpen)?;
                    self.tree.append(stmt, cond);
                    data.cond = Some(cond);
                }
            }
            None => {
                return Err(self.error_code(ErrorCode::E101, "unexpected end of input", &[K::BraceOpen]));
            }
        }

        self.cursor.read_many(WS);
        self.flush_into(stmt);
        let body = self.read_statements_block(templated, K::BraceOpen, K::BraceClose)?;
        self.tree.append(stmt, body);
        data.body = Some(body);
        self.set(stmt, NodeKind::For(data));
        Ok(stmt)
    }

    /// `range expr`: the keyword goes to `stmt`, the ranged-over
    /// expression is returned.
    fn read_range_clause(&mut self, stmt: NodeId, templated: bool) -> Result<NodeId> {
        self.cursor.read_many(WS);
        self.expect(&[K::Range], "expected range")?;
        self.cursor.read_many(WS);
        self.flush_into(stmt);
        self.read_expression(templated, &[K::BraceOpen])
    }

    fn read_clause_separator(&mut self) -> Result<()> {
        self.cursor.read_many(WS);
        self.expect(&[K::SemiColon], "expected ;")?;
        self.cursor.read_many(WS);
        Ok(())
    }
}
