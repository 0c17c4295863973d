//! Longest-match lexer.
//!
//! The lexer walks a table of [`Word`]s sorted longest first and, at every
//! position, emits the longest entry that matches. Characters that match no
//! entry accumulate into a [`TokenKind::Word`] token. Nothing is skipped:
//! whitespace, newlines and comments are tokens, so concatenating the values
//! of every token gives back the input.
//!
//! Keywords are *text words*: they only match when surrounded by non-word
//! characters, so `structural` and `myfunc` stay single words.
//!
//! Comments and strings are *block-ignore* entries: once their opening
//! sequence matches, everything up to the terminator is consumed verbatim.
//! An unterminated block runs to the end of the input.

use std::sync::LazyLock;

use gigo_core::{Position, Token, TokenKind};

/// Verbatim consumption up to a terminator.
#[derive(Debug, Clone, Copy)]
pub struct BlockIgnore {
    pub end: &'static str,
    /// Leave the terminator for the next token.
    pub exclude_end: bool,
    /// Character escaping the next one inside the block.
    pub escape: Option<char>,
}

/// An entry of the lexer table.
#[derive(Debug, Clone, Copy)]
pub struct Word {
    pub value: &'static str,
    pub kind: TokenKind,
    pub text_word: bool,
    pub block: Option<BlockIgnore>,
}

impl Word {
    const fn symbol(value: &'static str, kind: TokenKind) -> Self {
        Self {
            value,
            kind,
            text_word: false,
            block: None,
        }
    }

    const fn text(value: &'static str, kind: TokenKind) -> Self {
        Self {
            value,
            kind,
            text_word: true,
            block: None,
        }
    }

    const fn block(value: &'static str, kind: TokenKind, block: BlockIgnore) -> Self {
        Self {
            value,
            kind,
            text_word: false,
            block: Some(block),
        }
    }
}

const BUILTIN_TYPES: &[&str] = &[
    "string", "int", "int8", "int16", "int32", "int64", "uint", "uint8", "uint16", "uint32",
    "uint64", "float", "float32", "float64",
];

/// The word table, longest entries first.
static WORDS: LazyLock<Vec<Word>> = LazyLock::new(|| {
    use TokenKind as K;

    let mut words = vec![
        Word::block(
            "//",
            K::CommentLine,
            BlockIgnore {
                end: "\n",
                exclude_end: true,
                escape: None,
            },
        ),
        Word::block(
            "/*",
            K::CommentBlock,
            BlockIgnore {
                end: "*/",
                exclude_end: false,
                escape: None,
            },
        ),
        Word::block(
            "\"",
            K::Text,
            BlockIgnore {
                end: "\"",
                exclude_end: false,
                escape: Some('\\'),
            },
        ),
        Word::block(
            "`",
            K::Text,
            BlockIgnore {
                end: "`",
                exclude_end: false,
                escape: None,
            },
        ),
        Word::symbol(" ", K::Ws),
        Word::symbol("\t", K::Ws),
        Word::symbol("\n", K::Nl),
        Word::symbol("+", K::Add),
        Word::symbol("-", K::Sub),
        Word::symbol("*", K::Mul),
        Word::symbol("/", K::Quo),
        Word::symbol("%", K::Rem),
        Word::symbol("&", K::And),
        Word::symbol("|", K::Or),
        Word::symbol("^", K::Xor),
        Word::symbol("<<", K::Shl),
        Word::symbol(">>", K::Shr),
        Word::symbol("&^", K::AndNot),
        Word::symbol("+=", K::AddAssign),
        Word::symbol("-=", K::SubAssign),
        Word::symbol("*=", K::MulAssign),
        Word::symbol("/=", K::QuoAssign),
        Word::symbol("%=", K::RemAssign),
        Word::symbol("&=", K::AndAssign),
        Word::symbol("|=", K::OrAssign),
        Word::symbol("^=", K::XorAssign),
        Word::symbol("<<=", K::ShlAssign),
        Word::symbol(">>=", K::ShrAssign),
        Word::symbol("&^=", K::AndNotAssign),
        Word::symbol("&&", K::LAnd),
        Word::symbol("||", K::LOr),
        Word::symbol("<-", K::Arrow),
        Word::symbol("++", K::Inc),
        Word::symbol("--", K::Dec),
        Word::symbol("==", K::Eq),
        Word::symbol("<", K::Smaller),
        Word::symbol(">", K::Greater),
        Word::symbol("=", K::Assign),
        Word::symbol("!", K::Negate),
        Word::symbol("!=", K::Neq),
        Word::symbol("<=", K::Smeq),
        Word::symbol(">=", K::Gteq),
        Word::symbol(":=", K::TypeAssign),
        Word::symbol("...", K::Elipse),
        Word::symbol("(", K::ParenOpen),
        Word::symbol("[", K::BracketOpen),
        Word::symbol("{", K::BraceOpen),
        Word::symbol(",", K::Comma),
        Word::symbol(".", K::Dot),
        Word::symbol("}", K::BraceClose),
        Word::symbol("]", K::BracketClose),
        Word::symbol(")", K::ParenClose),
        Word::symbol(";", K::SemiColon),
        Word::symbol(":", K::Colon),
        Word::symbol("<:", K::TplOpen),
        Word::text("chan", K::Chan),
        Word::text("break", K::Break),
        Word::text("continue", K::Continue),
        Word::text("go", K::Go),
        Word::text("goto", K::Goto),
        Word::text("map", K::Map),
        Word::text("fallthrough", K::Fallthrough),
        Word::text("default", K::Default),
        Word::text("if", K::If),
        Word::text("true", K::True),
        Word::text("false", K::False),
        Word::text("for", K::For),
        Word::text("var", K::Var),
        Word::text("const", K::Const),
        Word::text("func", K::Func),
        Word::text("type", K::Type),
        Word::text("else", K::Else),
        Word::text("range", K::Range),
        Word::text("defer", K::Defer),
        Word::text("struct", K::Struct),
        Word::text("return", K::Return),
        Word::text("package", K::Package),
        Word::text("import", K::Import),
        Word::text("template", K::Template),
        Word::text("constname", K::ConstName),
        Word::text("interface", K::Interface),
        Word::text("implements", K::Implements),
        Word::text("poireau", K::Poireau),
        Word::text("*poireau", K::PoireauPointer),
    ];
    words.extend(
        BUILTIN_TYPES
            .iter()
            .map(|value| Word::text(value, K::BuiltinType)),
    );
    words.sort_by(|a, b| b.value.len().cmp(&a.value.len()));
    words
});

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Pull-based lexer over an in-memory source.
///
/// # Example
///
/// ```
/// # use gigo_parser::lexer::Lexer;
/// # use gigo_core::TokenKind;
/// let kinds: Vec<_> = Lexer::new("type T struct{}").map(|t| t.kind).collect();
/// assert_eq!(kinds[0], TokenKind::Type);
/// assert_eq!(kinds[2], TokenKind::Word);
/// ```
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    offset: usize,
    pos: Position,
    words: &'static [Word],
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            offset: 0,
            pos: Position::new(1, 0),
            words: WORDS.as_slice(),
        }
    }

    /// The longest table entry matching at byte offset `at`.
    fn match_word(&self, at: usize) -> Option<&'static Word> {
        let rest = &self.input[at..];
        self.words.iter().find(|word| {
            if !rest.starts_with(word.value) {
                return false;
            }
            if !word.text_word {
                return true;
            }
            let after = rest[word.value.len()..].chars().next();
            let before = self.input[..at].chars().next_back();
            !after.is_some_and(is_word_char) && !before.is_some_and(is_word_char)
        })
    }

    /// Byte length of a matched word, block content included.
    fn word_len(&self, word: &Word, at: usize) -> usize {
        let start = at + word.value.len();
        let Some(block) = word.block else {
            return word.value.len();
        };
        let rest = &self.input[start..];
        let mut chars = rest.char_indices();
        while let Some((index, c)) = chars.next() {
            if block.escape == Some(c) {
                chars.next();
                continue;
            }
            if rest[index..].starts_with(block.end) {
                let end = if block.exclude_end {
                    index
                } else {
                    index + block.end.len()
                };
                return word.value.len() + end;
            }
        }
        self.input.len() - at
    }

    /// Byte length of an accumulated catch-all word starting at `at`.
    fn catch_all_len(&self, at: usize) -> usize {
        let rest = &self.input[at..];
        for (index, _) in rest.char_indices().skip(1) {
            if self.match_word(at + index).is_some() {
                return index;
            }
        }
        rest.len()
    }

    fn take(&mut self, kind: TokenKind, len: usize) -> Token {
        let value = &self.input[self.offset..self.offset + len];
        let token = Token::new(kind, value, self.pos, self.offset);
        for c in value.chars() {
            if c == '\n' {
                self.pos.line += 1;
                self.pos.col = 0;
            } else {
                self.pos.col += 1;
            }
        }
        self.offset += len;
        token
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.offset >= self.input.len() {
            return None;
        }
        let token = match self.match_word(self.offset) {
            Some(word) => {
                let len = self.word_len(word, self.offset);
                self.take(word.kind, len)
            }
            None => {
                let len = self.catch_all_len(self.offset);
                self.take(TokenKind::Word, len)
            }
        };
        Some(token)
    }
}

/// Lex the whole input at once.
pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).collect()
}
