//! Placeholders: tokens standing in for subtrees taken out of the tree.
//!
//! A placeholder token renders as `<:.GetResult "NAME":>`, so evaluating
//! the serialized tree asks the context for the text of each removed
//! subtree.

use gigo_core::{NodeId, Token, TokenKind, Tree, TreeError};
use log::trace;

/// What a placeholder resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    /// An implements declaration, as written in the source.
    Implements(String),
    /// A poireau marker inside the struct `host`.
    Poireau {
        host: String,
        expr: String,
        pointer: bool,
    },
    /// A comment, restored verbatim.
    Comment(String),
}

pub fn implements_name(index: usize) -> String {
    format!("placeholder{index}")
}

pub fn poireau_name(index: usize) -> String {
    format!("placeholderpoireau{index}")
}

/// `prefix` is `blockcomments` or `linecomments`.
pub fn comment_name(prefix: &str, index: usize) -> String {
    format!("placeholder{prefix}{index}")
}

/// The action text of the placeholder called `name`.
pub fn action(name: &str) -> String {
    format!("<:.GetResult \"{name}\":>")
}

/// Put a placeholder token called `name` in place of `node`. The token
/// keeps the position of the node's first token.
pub fn substitute(tree: &mut Tree, node: NodeId, name: &str) -> Result<NodeId, TreeError> {
    let (pos, offset) = tree
        .first_token(node)
        .map(|token| (token.pos, token.offset))
        .unwrap_or_default();
    let token = tree.add_token(Token::new(TokenKind::Placeholder, action(name), pos, offset));
    tree.replace(node, token)?;
    trace!(name, node:% = node; "Placed placeholder");
    Ok(token)
}

#[cfg(test)]
mod tests {
    use gigo_parser::parse_str;

    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(implements_name(0), "placeholder0");
        assert_eq!(poireau_name(2), "placeholderpoireau2");
        assert_eq!(comment_name("linecomments", 1), "placeholderlinecomments1");
        assert_eq!(action("placeholder0"), "<:.GetResult \"placeholder0\":>");
    }

    #[test]
    fn test_substitute() {
        let mut tree = parse_str("// hello\nvar a = 1\n").unwrap();
        let comment = tree.find_tokens(TokenKind::CommentLine)[0];
        let token = substitute(&mut tree, comment, "placeholderlinecomments0").unwrap();
        assert_eq!(
            tree.text(tree.root()),
            "<:.GetResult \"placeholderlinecomments0\":>\nvar a = 1\n"
        );
        assert_eq!(tree.token(token).unwrap().pos.line, 1);
        assert!(!tree.is_attached(comment));
    }
}
