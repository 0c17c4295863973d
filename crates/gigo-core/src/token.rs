//! Tokens produced by the lexer.
//!
//! A [`Token`] keeps its exact source text so that a tree built from tokens
//! can always be written back byte-for-byte. The kind and the value of a
//! token may be rewritten in place by the mutation engine, for instance to
//! retype the `template` keyword to `type`.

use std::fmt;

use crate::span::Span;

/// The kind of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Generic tokens
    Ws,
    Nl,
    CommentLine,
    CommentBlock,
    /// Catch-all for identifiers and numbers.
    Word,
    /// Quoted string or raw string.
    Text,
    Number,
    Eof,
    /// Synthesized token standing in for a removed subtree.
    Placeholder,

    // Keywords
    Package,
    Type,
    Struct,
    Implements,
    Template,
    Import,
    Interface,
    Const,
    ConstName,
    Var,
    Func,
    Return,
    For,
    Range,
    Defer,
    Else,
    If,
    True,
    False,
    Chan,
    Break,
    Continue,
    Go,
    Goto,
    Map,
    Fallthrough,
    Default,
    Poireau,
    PoireauPointer,
    /// Builtin type names such as `string`, `int64` or `float32`.
    BuiltinType,

    // Delimiters
    ParenOpen,
    ParenClose,
    BracketOpen,
    BracketClose,
    BraceOpen,
    BraceClose,
    Comma,
    Dot,
    SemiColon,
    Colon,
    Elipse,

    // Comparison and assignment
    Assign,
    TypeAssign,
    Smaller,
    Greater,
    Eq,
    Neq,
    Smeq,
    Gteq,
    Negate,

    // Arithmetic and bitwise
    Add,
    Sub,
    Mul,
    Quo,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    AndNot,

    // Compound assignment
    AddAssign,
    SubAssign,
    MulAssign,
    QuoAssign,
    RemAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    ShlAssign,
    ShrAssign,
    AndNotAssign,

    // Logical and misc
    LAnd,
    LOr,
    Arrow,
    Inc,
    Dec,

    // Template delimiters
    TplOpen,
    TplClose,
}

impl TokenKind {
    /// Stable display name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Ws => "whitespace",
            TokenKind::Nl => "newline",
            TokenKind::CommentLine => "line comment",
            TokenKind::CommentBlock => "block comment",
            TokenKind::Word => "word",
            TokenKind::Text => "text",
            TokenKind::Number => "number",
            TokenKind::Eof => "end of input",
            TokenKind::Placeholder => "placeholder",
            TokenKind::Package => "package",
            TokenKind::Type => "type",
            TokenKind::Struct => "struct",
            TokenKind::Implements => "implements",
            TokenKind::Template => "template",
            TokenKind::Import => "import",
            TokenKind::Interface => "interface",
            TokenKind::Const => "const",
            TokenKind::ConstName => "constname",
            TokenKind::Var => "var",
            TokenKind::Func => "func",
            TokenKind::Return => "return",
            TokenKind::For => "for",
            TokenKind::Range => "range",
            TokenKind::Defer => "defer",
            TokenKind::Else => "else",
            TokenKind::If => "if",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Chan => "chan",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Go => "go",
            TokenKind::Goto => "goto",
            TokenKind::Map => "map",
            TokenKind::Fallthrough => "fallthrough",
            TokenKind::Default => "default",
            TokenKind::Poireau => "poireau",
            TokenKind::PoireauPointer => "*poireau",
            TokenKind::BuiltinType => "builtin type",
            TokenKind::ParenOpen => "(",
            TokenKind::ParenClose => ")",
            TokenKind::BracketOpen => "[",
            TokenKind::BracketClose => "]",
            TokenKind::BraceOpen => "{",
            TokenKind::BraceClose => "}",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::SemiColon => ";",
            TokenKind::Colon => ":",
            TokenKind::Elipse => "...",
            TokenKind::Assign => "=",
            TokenKind::TypeAssign => ":=",
            TokenKind::Smaller => "<",
            TokenKind::Greater => ">",
            TokenKind::Eq => "==",
            TokenKind::Neq => "!=",
            TokenKind::Smeq => "<=",
            TokenKind::Gteq => ">=",
            TokenKind::Negate => "!",
            TokenKind::Add => "+",
            TokenKind::Sub => "-",
            TokenKind::Mul => "*",
            TokenKind::Quo => "/",
            TokenKind::Rem => "%",
            TokenKind::And => "&",
            TokenKind::Or => "|",
            TokenKind::Xor => "^",
            TokenKind::Shl => "<<",
            TokenKind::Shr => ">>",
            TokenKind::AndNot => "&^",
            TokenKind::AddAssign => "+=",
            TokenKind::SubAssign => "-=",
            TokenKind::MulAssign => "*=",
            TokenKind::QuoAssign => "/=",
            TokenKind::RemAssign => "%=",
            TokenKind::AndAssign => "&=",
            TokenKind::OrAssign => "|=",
            TokenKind::XorAssign => "^=",
            TokenKind::ShlAssign => "<<=",
            TokenKind::ShrAssign => ">>=",
            TokenKind::AndNotAssign => "&^=",
            TokenKind::LAnd => "&&",
            TokenKind::LOr => "||",
            TokenKind::Arrow => "<-",
            TokenKind::Inc => "++",
            TokenKind::Dec => "--",
            TokenKind::TplOpen => "<:",
            TokenKind::TplClose => ":>",
        }
    }

    /// Returns `true` for tokens that carry no syntax: whitespace, newlines
    /// and comments.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            TokenKind::Ws | TokenKind::Nl | TokenKind::CommentLine | TokenKind::CommentBlock
        )
    }

    /// Returns `true` for comment tokens.
    pub fn is_comment(&self) -> bool {
        matches!(self, TokenKind::CommentLine | TokenKind::CommentBlock)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A source position. Lines start at 1, columns at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, col: 0 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A lexical token with its exact source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub pos: Position,
    /// Byte offset of the token in the lexed input.
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, pos: Position, offset: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            pos,
            offset,
        }
    }

    /// Create a token that does not originate from any source text.
    pub fn synthetic(kind: TokenKind, value: impl Into<String>) -> Self {
        Self::new(kind, value, Position::default(), 0)
    }

    /// Returns `true` if the token kind is one of `kinds`.
    pub fn is(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.kind)
    }

    /// Byte span covered by the token in the lexed input.
    pub fn span(&self) -> Span {
        Span::new(self.offset..self.offset + self.value.len())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}
