//! Builds the node tree of a template from its segments.

use super::lexer::{Item, Segment};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Node {
    Text(String),
    Action {
        line: usize,
        pipe: Pipeline,
    },
    If(Branch),
    Range(Branch),
    With(Branch),
}

/// A control structure: `if`, `range` or `with`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Branch {
    pub line: usize,
    pub pipe: Pipeline,
    pub body: Vec<Node>,
    pub otherwise: Vec<Node>,
}

/// Commands joined by `|`, optionally declaring or assigning variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct Pipeline {
    pub decl: Vec<String>,
    /// `$x = ...` assigns an existing variable instead of declaring one.
    pub assign: bool,
    pub cmds: Vec<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Command {
    pub args: Vec<Arg>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Arg {
    Dot(Vec<String>),
    Variable(String, Vec<String>),
    Ident(String),
    Str(String),
    Int(i64),
    Bool(bool),
    Nil,
    Pipe(Pipeline),
}

/// Why a node list stopped.
enum Stop {
    Eof,
    End,
    Else { line: usize, rest: Vec<Item> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    If,
    Range,
    With,
}

/// A structural failure: line and reason.
pub(super) type ParseFailure = (usize, String);

pub(super) fn parse(segments: Vec<Segment>) -> Result<Vec<Node>, ParseFailure> {
    let mut parser = TreeParser {
        segments: segments.into_iter(),
        last_line: 1,
    };
    let (nodes, stop) = parser.list()?;
    match stop {
        Stop::Eof => Ok(nodes),
        Stop::End => Err((parser.last_line, "unexpected <:end:>".to_string())),
        Stop::Else { line, .. } => Err((line, "unexpected <:else:>".to_string())),
    }
}

struct TreeParser {
    segments: std::vec::IntoIter<Segment>,
    last_line: usize,
}

impl TreeParser {
    fn list(&mut self) -> Result<(Vec<Node>, Stop), ParseFailure> {
        let mut nodes = Vec::new();
        while let Some(segment) = self.segments.next() {
            let (items, line) = match segment {
                Segment::Text(text) => {
                    nodes.push(Node::Text(text));
                    continue;
                }
                Segment::Action { items, line } => (items, line),
            };
            self.last_line = line;
            let keyword = match items.first() {
                None => continue,
                Some(Item::Ident(word)) => word.as_str(),
                Some(_) => "",
            };
            match keyword {
                "end" => {
                    if items.len() > 1 {
                        return Err((line, "unexpected arguments after end".to_string()));
                    }
                    return Ok((nodes, Stop::End));
                }
                "else" => {
                    return Ok((
                        nodes,
                        Stop::Else {
                            line,
                            rest: items[1..].to_vec(),
                        },
                    ));
                }
                "if" => nodes.push(self.control(Control::If, line, &items[1..])?),
                "range" => nodes.push(self.control(Control::Range, line, &items[1..])?),
                "with" => nodes.push(self.control(Control::With, line, &items[1..])?),
                "define" | "template" | "block" | "break" | "continue" => {
                    return Err((line, format!("unsupported action {keyword:?}")));
                }
                _ => {
                    let pipe = pipeline(&items, line)?;
                    nodes.push(Node::Action { line, pipe });
                }
            }
        }
        Ok((nodes, Stop::Eof))
    }

    fn control(&mut self, control: Control, line: usize, items: &[Item]) -> Result<Node, ParseFailure> {
        let pipe = pipeline(items, line)?;
        if control == Control::Range && pipe.assign {
            return Err((line, "range can only declare variables".to_string()));
        }
        let (body, stop) = self.list()?;
        let otherwise = match stop {
            Stop::End => Vec::new(),
            Stop::Eof => return Err((line, "unexpected EOF".to_string())),
            Stop::Else { line, rest } => match rest.first() {
                None => {
                    let (otherwise, stop) = self.list()?;
                    match stop {
                        Stop::End => otherwise,
                        Stop::Eof => return Err((line, "unexpected EOF".to_string())),
                        Stop::Else { line, .. } => {
                            return Err((line, "expected end; found else".to_string()));
                        }
                    }
                }
                // `else if` and `else with` share the enclosing `end`.
                Some(Item::Ident(word)) if word == "if" && control == Control::If => {
                    vec![self.control(Control::If, line, &rest[1..])?]
                }
                Some(Item::Ident(word)) if word == "with" && control == Control::With => {
                    vec![self.control(Control::With, line, &rest[1..])?]
                }
                Some(_) => return Err((line, "unexpected arguments after else".to_string())),
            },
        };
        let branch = Branch {
            line,
            pipe,
            body,
            otherwise,
        };
        Ok(match control {
            Control::If => Node::If(branch),
            Control::Range => Node::Range(branch),
            Control::With => Node::With(branch),
        })
    }
}

/// Parse a pipeline with its optional variable declaration.
fn pipeline(items: &[Item], line: usize) -> Result<Pipeline, ParseFailure> {
    let (decl, assign, rest) = match items {
        [Item::Variable(name, fields), Item::Declare | Item::Assign, rest @ ..] if fields.is_empty() => {
            (vec![name.clone()], matches!(items[1], Item::Assign), rest)
        }
        [
            Item::Variable(first, first_fields),
            Item::Comma,
            Item::Variable(second, second_fields),
            Item::Declare,
            rest @ ..,
        ] if first_fields.is_empty() && second_fields.is_empty() => {
            (vec![first.clone(), second.clone()], false, rest)
        }
        _ => (Vec::new(), false, items),
    };
    if rest.is_empty() {
        return Err((line, "missing value for command".to_string()));
    }

    let mut cmds = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    for (index, item) in rest.iter().enumerate() {
        match item {
            Item::Open => depth += 1,
            Item::Close => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| (line, "unexpected right paren".to_string()))?;
            }
            Item::Pipe if depth == 0 => {
                cmds.push(command(&rest[start..index], line)?);
                start = index + 1;
            }
            _ => {}
        }
    }
    if depth > 0 {
        return Err((line, "unclosed left paren".to_string()));
    }
    cmds.push(command(&rest[start..], line)?);

    Ok(Pipeline { decl, assign, cmds })
}

fn command(items: &[Item], line: usize) -> Result<Command, ParseFailure> {
    if items.is_empty() {
        return Err((line, "missing value for command".to_string()));
    }
    let mut args = Vec::new();
    let mut index = 0;
    while index < items.len() {
        let arg = match &items[index] {
            Item::Open => {
                let close = matching_close(items, index)
                    .ok_or_else(|| (line, "unclosed left paren".to_string()))?;
                let inner = pipeline(&items[index + 1..close], line)?;
                index = close;
                Arg::Pipe(inner)
            }
            Item::Dot(fields) => Arg::Dot(fields.clone()),
            Item::Variable(name, fields) => Arg::Variable(name.clone(), fields.clone()),
            Item::Ident(name) => Arg::Ident(name.clone()),
            Item::Str(text) => Arg::Str(text.clone()),
            Item::Int(n) => Arg::Int(*n),
            Item::Bool(b) => Arg::Bool(*b),
            Item::Nil => Arg::Nil,
            other => return Err((line, format!("unexpected {other:?} in command"))),
        };
        args.push(arg);
        index += 1;
    }
    Ok(Command { args })
}

fn matching_close(items: &[Item], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (index, item) in items.iter().enumerate().skip(open) {
        match item {
            Item::Open => depth += 1,
            Item::Close => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}
