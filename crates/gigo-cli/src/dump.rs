//! Pretty-printing of tree structure for the `dump` command.
//!
//! Every node is opened with `-> Kind N tokens` and closed with
//! `<- Kind`, nested nodes are indented by one space per level. Leaf tokens
//! print their position, kind and quoted value in aligned columns:
//!
//! ```text
//! -> StructDecl 7 tokens                  1:0     type                 "type"
//!                                         1:4     whitespace           " "
//! ```

use std::fmt;

use gigo::{NodeId, Token, Tree};

/// Width of the structure column.
const STRUCTURE_WIDTH: usize = 40;

/// Displays the subtree at `id`.
pub struct Dump<'a> {
    tree: &'a Tree,
    id: NodeId,
}

impl<'a> Dump<'a> {
    pub fn new(tree: &'a Tree, id: NodeId) -> Self {
        Self { tree, id }
    }

    fn write_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId, level: usize) -> fmt::Result {
        let indent = " ".repeat(level);
        let name = self.tree.kind(id).name();
        let children = self.tree.children(id);
        let count = children.len();

        if let Some(token) = self.tree.token(id) {
            return write_token(f, &format!("{indent}=> {name}"), token);
        }

        for (i, &child) in children.iter().enumerate() {
            let last = i + 1 == count;
            if let Some(token) = self.tree.token(child) {
                let marker = if count == 1 {
                    format!("=> {name} 1 token")
                } else if i == 0 {
                    format!("-> {name} {count} tokens")
                } else if last {
                    format!("<- {name}")
                } else {
                    String::new()
                };
                write_token(f, &format!("{indent}{marker}"), token)?;
            } else {
                if i == 0 {
                    writeln!(f, "{indent}-> {name} {count} tokens")?;
                }
                self.write_node(f, child, level + 1)?;
                if last {
                    writeln!(f, "{indent}<- {name} {count} tokens")?;
                }
            }
        }

        if count == 0 {
            writeln!(f, "{indent}<- {name} 0 tokens")?;
        }
        Ok(())
    }
}

impl fmt::Display for Dump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_node(f, self.id, 0)
    }
}

fn write_token(f: &mut fmt::Formatter<'_>, structure: &str, token: &Token) -> fmt::Result {
    writeln!(
        f,
        "{structure:<STRUCTURE_WIDTH$}{:<8}{:<20} {:?}",
        token.pos.to_string(),
        token.kind.name(),
        token.value
    )
}

/// Render the subtree at `id`.
pub fn dump(tree: &Tree, id: NodeId) -> String {
    Dump::new(tree, id).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_struct() {
        let tree = gigo::parse_string("type Todo struct {\n  Name string\n}\n").unwrap();
        let out = dump(&tree, tree.root());

        let first = out.lines().next().unwrap();
        assert!(first.starts_with("-> Str"), "{out}");
        assert!(out.contains(" -> StructDecl"), "{out}");
        assert!(out.contains("\"Todo\""), "{out}");
        assert!(out.contains("\"Name\""), "{out}");
    }

    #[test]
    fn test_dump_lists_every_token() {
        let source = "var a = 1\n";
        let tree = gigo::parse_string(source).unwrap();
        let out = dump(&tree, tree.root());

        let leaves = out.lines().filter(|line| line.ends_with('"')).count();
        assert_eq!(leaves, tree.tokens(tree.root()).count());
    }

    #[test]
    fn test_dump_symbol() {
        let tree = gigo::parse_string("var a = 1\n\ntype Todo struct {}\n").unwrap();
        let symbol = tree.find_symbols("Todo")[0];
        let out = dump(&tree, symbol);
        assert!(out.starts_with("-> StructDecl"), "{out}");
        assert!(!out.contains("\"a\""), "{out}");
    }
}
