//! Rewindable token cursor.
//!
//! The [`Cursor`] pulls tokens from the lexer into a buffer and exposes a
//! position inside it. Tokens read since the last [`Cursor::emit`] or
//! [`Cursor::flush`] form the *window*: the parser can rewind freely inside
//! the window, which gives it unbounded lookahead without re-lexing. Emitting
//! hands the window over to the tree builder and commits the read.
//!
//! A loop guard counts reads since the last emit. Crossing the limit marks
//! the cursor as faulted: it reports every further read as the end of the
//! input and keeps the "infinite loop detected" error for the parse entry
//! point to return.

use gigo_core::{Token, TokenKind};
use log::{debug, trace};

use crate::error::{ErrorCode, SyntaxError};

/// Default number of reads allowed between two emits.
pub const DEFAULT_LOOP_GUARD: usize = 10_000;

/// A saved cursor position inside the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// Cursor over a token stream.
#[derive(Debug)]
pub struct Cursor<I: Iterator<Item = Token>> {
    source: I,
    buffer: Vec<Token>,
    /// Index of the first token of the window.
    start: usize,
    /// Index of the next token to read.
    pos: usize,
    tries: usize,
    loop_guard: usize,
    fault: Option<SyntaxError>,
}

impl<I: Iterator<Item = Token>> Cursor<I> {
    pub fn new(source: I) -> Self {
        Self::with_loop_guard(source, DEFAULT_LOOP_GUARD)
    }

    pub fn with_loop_guard(source: I, loop_guard: usize) -> Self {
        Self {
            source,
            buffer: Vec::new(),
            start: 0,
            pos: 0,
            tries: 0,
            loop_guard,
            fault: None,
        }
    }

    /// Make sure the buffer holds the token at `index`.
    fn fill(&mut self, index: usize) -> bool {
        while self.buffer.len() <= index {
            match self.source.next() {
                Some(token) => self.buffer.push(token),
                None => return false,
            }
        }
        true
    }

    /// Advance and return the token read.
    pub fn next(&mut self) -> Option<&Token> {
        if self.fault.is_some() {
            return None;
        }
        self.tries += 1;
        if self.tries > self.loop_guard {
            debug!(tries = self.tries; "Loop guard tripped");
            let error = self.error_here(ErrorCode::E104, "infinite loop detected", &[]);
            self.fault = Some(error);
            return None;
        }
        if !self.fill(self.pos) {
            return None;
        }
        self.pos += 1;
        self.buffer.get(self.pos - 1)
    }

    /// Absolute index of the next token to read.
    pub fn index(&self) -> usize {
        self.pos
    }

    /// Step back one token, never before the window start.
    pub fn rewind(&mut self) {
        if self.pos > self.start {
            self.pos -= 1;
        }
    }

    /// Step back to the window start.
    pub fn rewind_all(&mut self) {
        self.pos = self.start;
    }

    /// The last token read inside the window.
    pub fn last(&self) -> Option<&Token> {
        if self.pos > self.start {
            self.buffer.get(self.pos - 1)
        } else {
            None
        }
    }

    /// Returns `true` when no token is left to read.
    pub fn ended(&mut self) -> bool {
        self.fault.is_some() || !self.fill(self.pos)
    }

    /// Tokens read since the last emit or flush.
    pub fn current(&self) -> &[Token] {
        &self.buffer[self.start..self.pos]
    }

    /// Detach the window and reset the loop guard.
    pub fn emit(&mut self) -> Vec<Token> {
        let window = self.buffer[self.start..self.pos].to_vec();
        self.start = self.pos;
        self.tries = 0;
        if !window.is_empty() {
            trace!(count = window.len(); "Emitted tokens");
        }
        window
    }

    /// Drop the window and reset the loop guard.
    pub fn flush(&mut self) {
        self.start = self.pos;
        self.tries = 0;
    }

    /// Save the current position.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.pos)
    }

    /// Roll back to a checkpoint. Checkpoints older than the window start
    /// roll back to the window start.
    pub fn reset(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.0.max(self.start);
    }

    /// Commit everything read since the last emit, see [`Cursor::emit`].
    pub fn commit(&mut self) -> Vec<Token> {
        self.emit()
    }

    /// The next token, without advancing.
    pub fn peek_one(&mut self) -> Option<&Token> {
        self.peek_n(0)
    }

    /// The token `n` positions ahead, without advancing.
    pub fn peek_n(&mut self, n: usize) -> Option<&Token> {
        if self.fault.is_some() || !self.fill(self.pos + n) {
            return None;
        }
        self.buffer.get(self.pos + n)
    }

    /// The next token if its kind is one of `kinds`, without advancing.
    pub fn peek(&mut self, kinds: &[TokenKind]) -> Option<&Token> {
        self.peek_one().filter(|token| token.is(kinds))
    }

    /// Returns `true` if the next token kind is one of `kinds`.
    pub fn at(&mut self, kinds: &[TokenKind]) -> bool {
        self.peek(kinds).is_some()
    }

    /// Scan forward for the first token whose kind is one of `kinds`.
    ///
    /// On success the cursor stands right before the target with the
    /// skipped tokens read into the window. On failure the position is
    /// restored and `None` is returned.
    pub fn peek_until(&mut self, kinds: &[TokenKind]) -> Option<TokenKind> {
        let saved = self.checkpoint();
        loop {
            match self.next().map(|token| token.kind) {
                Some(kind) if kinds.contains(&kind) => {
                    self.rewind();
                    return Some(kind);
                }
                Some(_) => {}
                None => {
                    self.reset(saved);
                    return None;
                }
            }
        }
    }

    /// Read the next token if its kind is one of `kinds`.
    pub fn read(&mut self, kinds: &[TokenKind]) -> Option<Token> {
        if self.at(kinds) {
            self.next().cloned()
        } else {
            None
        }
    }

    /// Read the next `n` tokens if they all are of one of `kinds`.
    pub fn read_n(&mut self, n: usize, kinds: &[TokenKind]) -> bool {
        let saved = self.checkpoint();
        for _ in 0..n {
            if self.read(kinds).is_none() {
                self.reset(saved);
                return false;
            }
        }
        true
    }

    /// Read tokens as long as their kind is one of `kinds`.
    pub fn read_many(&mut self, kinds: &[TokenKind]) -> usize {
        let mut count = 0;
        while self.read(kinds).is_some() {
            count += 1;
        }
        count
    }

    /// Read one token of `kinds` and emit the window.
    pub fn get(&mut self, kinds: &[TokenKind]) -> Option<Vec<Token>> {
        self.read(kinds).map(|_| self.emit())
    }

    /// Read tokens of `kinds` and emit the window.
    pub fn get_many(&mut self, kinds: &[TokenKind]) -> Vec<Token> {
        self.read_many(kinds);
        self.emit()
    }

    /// Read a balanced block starting with `open` and ending with the
    /// matching `close`, counting nested `open`/`close` pairs.
    ///
    /// Returns `false` when the next token is not `open` or the input ends
    /// before the block is balanced; in the latter case the position is
    /// restored.
    pub fn read_block(&mut self, open: TokenKind, close: TokenKind) -> bool {
        let saved = self.checkpoint();
        if self.read(&[open]).is_none() {
            return false;
        }
        let mut depth = 1usize;
        while depth > 0 {
            match self.next().map(|token| token.kind) {
                Some(kind) if kind == open => depth += 1,
                Some(kind) if kind == close => depth -= 1,
                Some(_) => {}
                None => {
                    self.reset(saved);
                    return false;
                }
            }
        }
        true
    }

    /// Move back over the trailing comments of the window that sit right
    /// above the next token, so they are read again with it. A blank line
    /// ends the run of comments.
    pub fn keep_previous_comment(&mut self) {
        let window = self.current();
        let mut index = window.len();
        let mut cut = window.len();
        let mut newlines = 0;
        while index > 0 {
            let token = &window[index - 1];
            match token.kind {
                TokenKind::Ws => index -= 1,
                TokenKind::Nl => {
                    newlines += 1;
                    if newlines > 1 {
                        break;
                    }
                    index -= 1;
                }
                TokenKind::CommentLine => {
                    newlines = 0;
                    index -= 1;
                    cut = index;
                }
                TokenKind::CommentBlock => {
                    index -= 1;
                    cut = index;
                    break;
                }
                _ => break,
            }
        }
        self.pos = self.start + cut;
    }

    /// Error recorded by the loop guard, if it tripped.
    pub fn fault(&self) -> Option<&SyntaxError> {
        self.fault.as_ref()
    }

    pub fn take_fault(&mut self) -> Option<SyntaxError> {
        self.fault.take()
    }

    /// A syntax error positioned on the next token, or on the last token
    /// of the input when everything was read.
    pub fn error_here(
        &mut self,
        code: ErrorCode,
        reason: impl Into<String>,
        wanted: &[TokenKind],
    ) -> SyntaxError {
        let found = if self.fill(self.pos) {
            self.buffer.get(self.pos).cloned()
        } else {
            None
        };
        let anchor = found.clone().or_else(|| self.buffer.last().cloned());
        SyntaxError::new(code, reason, found, anchor, wanted.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use TokenKind as K;

    fn cursor(input: &str) -> Cursor<Lexer<'_>> {
        Cursor::new(Lexer::new(input))
    }

    #[test]
    fn test_read_and_emit() {
        let mut c = cursor("a b");
        assert!(c.read(&[K::Word]).is_some());
        assert!(c.read(&[K::Word]).is_none());
        assert_eq!(c.read_many(&[K::Ws]), 1);
        let window = c.emit();
        assert_eq!(window.len(), 2);
        assert!(c.current().is_empty());
        assert_eq!(c.get(&[K::Word]).map(|w| w.len()), Some(1));
        assert!(c.ended());
    }

    #[test]
    fn test_rewind_stays_in_window() {
        let mut c = cursor("a b c");
        c.next();
        c.emit();
        c.next();
        c.next();
        c.rewind_all();
        assert_eq!(c.peek_one().map(|t| t.kind), Some(K::Ws));
        c.rewind();
        assert_eq!(c.peek_one().map(|t| t.kind), Some(K::Ws));
    }

    #[test]
    fn test_peek_until() {
        let mut c = cursor("i := 0; i < 5 {");
        assert_eq!(c.peek_until(&[K::SemiColon, K::TypeAssign, K::BraceOpen]), Some(K::TypeAssign));
        assert_eq!(c.current().len(), 2);
        assert_eq!(c.peek_one().map(|t| t.kind), Some(K::TypeAssign));
        c.rewind_all();
        assert_eq!(c.peek_until(&[K::Range]), None);
        assert!(c.current().is_empty());
    }

    #[test]
    fn test_read_block_counts_nesting() {
        let mut c = cursor("{ { } } x");
        assert!(c.read_block(K::BraceOpen, K::BraceClose));
        assert_eq!(c.emit().len(), 7);

        let mut c = cursor("{ { }");
        assert!(!c.read_block(K::BraceOpen, K::BraceClose));
        assert!(c.current().is_empty());
    }

    #[test]
    fn test_checkpoint_reset() {
        let mut c = cursor("a b c");
        let cp = c.checkpoint();
        c.next();
        c.next();
        c.reset(cp);
        assert_eq!(c.peek_one().map(|t| t.value.as_str()), Some("a"));
    }

    #[test]
    fn test_keep_previous_comment() {
        let mut c = cursor("}\n\n// doc\nfunc");
        c.next();
        c.emit();
        c.read_many(&[K::Nl, K::Ws, K::CommentLine]);
        c.keep_previous_comment();
        assert_eq!(c.current().len(), 2);
        assert_eq!(c.peek_one().map(|t| t.kind), Some(K::CommentLine));
    }

    #[test]
    fn test_keep_previous_comment_stops_at_blank_line() {
        let mut c = cursor("// far\n\nfunc");
        c.read_many(&[K::Nl, K::Ws, K::CommentLine]);
        c.keep_previous_comment();
        assert_eq!(c.current().len(), 3);
    }

    #[test]
    fn test_loop_guard_trips() {
        let input = "a ".repeat(20);
        let mut c = Cursor::with_loop_guard(Lexer::new(&input), 10);
        let mut count = 0;
        while c.next().is_some() {
            count += 1;
        }
        assert_eq!(count, 10);
        assert!(c.ended());
        let fault = c.take_fault().expect("guard must trip");
        assert!(fault.to_string().contains("infinite loop detected"));
    }

    #[test]
    fn test_emit_resets_loop_guard() {
        let input = "a ".repeat(20);
        let mut c = Cursor::with_loop_guard(Lexer::new(&input), 10);
        while c.next().is_some() {
            c.emit();
        }
        assert!(c.fault().is_none());
    }
}
