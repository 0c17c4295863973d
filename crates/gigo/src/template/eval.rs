//! Executes a parsed template against a value.

use log::trace;

use super::{
    Template,
    error::{TemplateError, TemplateErrorKind},
    parse::{Arg, Branch, Command, Node, Pipeline},
    value::{FuncError, Funcs, Value},
};
use crate::error::GigoError;

type Result<T> = std::result::Result<T, GigoError>;

pub(super) struct Exec<'t> {
    template: &'t Template,
    funcs: &'t Funcs,
    /// Variables in scope, innermost last. `$` is always the first.
    vars: Vec<(String, Value)>,
    out: String,
}

impl<'t> Exec<'t> {
    pub(super) fn new(template: &'t Template, funcs: &'t Funcs, data: Value) -> Self {
        Self {
            template,
            funcs,
            vars: vec![(String::new(), data)],
            out: String::new(),
        }
    }

    pub(super) fn run(mut self) -> Result<String> {
        let dot = self.vars[0].1.clone();
        let template = self.template;
        self.walk(&dot, &template.nodes)?;
        Ok(self.out)
    }

    fn error(&self, line: usize, reason: impl AsRef<str>) -> GigoError {
        TemplateError::at(
            TemplateErrorKind::Exec,
            &self.template.name,
            &self.template.text,
            line,
            reason,
        )
        .into()
    }

    fn walk(&mut self, dot: &Value, nodes: &[Node]) -> Result<()> {
        for node in nodes {
            match node {
                Node::Text(text) => self.out.push_str(text),
                Node::Action { line, pipe } => {
                    let value = self.pipeline(dot, pipe, *line)?;
                    if pipe.decl.is_empty() {
                        self.out.push_str(&value.render());
                    } else {
                        self.bind(pipe, value, *line)?;
                    }
                }
                Node::If(branch) => {
                    let mark = self.vars.len();
                    let value = self.bound_pipeline(dot, branch)?;
                    let nodes = if value.is_truthy() {
                        &branch.body
                    } else {
                        &branch.otherwise
                    };
                    self.walk(dot, nodes)?;
                    self.vars.truncate(mark);
                }
                Node::With(branch) => {
                    let mark = self.vars.len();
                    let value = self.bound_pipeline(dot, branch)?;
                    if value.is_truthy() {
                        self.walk(&value, &branch.body)?;
                    } else {
                        self.walk(dot, &branch.otherwise)?;
                    }
                    self.vars.truncate(mark);
                }
                Node::Range(branch) => self.range(dot, branch)?,
            }
        }
        Ok(())
    }

    /// Evaluate the pipeline of an `if` or `with` and bind its variables.
    fn bound_pipeline(&mut self, dot: &Value, branch: &Branch) -> Result<Value> {
        let value = self.pipeline(dot, &branch.pipe, branch.line)?;
        if !branch.pipe.decl.is_empty() {
            self.bind(&branch.pipe, value.clone(), branch.line)?;
        }
        Ok(value)
    }

    fn bind(&mut self, pipe: &Pipeline, value: Value, line: usize) -> Result<()> {
        let Some(name) = pipe.decl.first() else {
            return Ok(());
        };
        if !pipe.assign {
            self.vars.push((name.clone(), value));
            return Ok(());
        }
        if let Some(slot) = self.vars.iter_mut().rev().find(|(var, _)| var == name) {
            slot.1 = value;
            return Ok(());
        }
        Err(self.error(line, format!("undefined variable: ${name}")))
    }

    fn range(&mut self, dot: &Value, branch: &Branch) -> Result<()> {
        let value = self.pipeline(dot, &branch.pipe, branch.line)?;
        let items = match value {
            Value::List(items) => items,
            Value::Int(n) => (0..n.max(0)).map(Value::Int).collect(),
            Value::Nil => Vec::new(),
            other => {
                return Err(self.error(
                    branch.line,
                    format!("range can't iterate over {}", other.render()),
                ));
            }
        };
        if items.is_empty() {
            return self.walk(dot, &branch.otherwise);
        }

        let mark = self.vars.len();
        for (index, item) in items.into_iter().enumerate() {
            match branch.pipe.decl.as_slice() {
                [element] => self.vars.push((element.clone(), item.clone())),
                [key, element] => {
                    self.vars.push((key.clone(), Value::Int(index as i64)));
                    self.vars.push((element.clone(), item.clone()));
                }
                _ => {}
            }
            self.walk(&item, &branch.body)?;
            self.vars.truncate(mark);
        }
        Ok(())
    }

    fn pipeline(&mut self, dot: &Value, pipe: &Pipeline, line: usize) -> Result<Value> {
        let mut value = None;
        for cmd in &pipe.cmds {
            value = Some(self.command(dot, cmd, value, line)?);
        }
        Ok(value.unwrap_or_default())
    }

    /// Evaluate one command; `piped` is the result of the previous command,
    /// passed as the last argument.
    fn command(&mut self, dot: &Value, cmd: &Command, piped: Option<Value>, line: usize) -> Result<Value> {
        let Some((first, rest)) = cmd.args.split_first() else {
            return Err(self.error(line, "missing value for command"));
        };
        let mut args = Vec::with_capacity(rest.len() + 1);
        for arg in rest {
            args.push(self.arg(dot, arg, line)?);
        }
        args.extend(piped);

        match first {
            Arg::Ident(name) => self.call(name, &args, line),
            Arg::Dot(fields) => self.fields(dot.clone(), fields, &args, line),
            Arg::Variable(name, fields) => {
                let value = self.variable(name, line)?;
                self.fields(value, fields, &args, line)
            }
            other => {
                if !args.is_empty() {
                    return Err(self.error(line, format!("can't give argument to non-function {other:?}")));
                }
                self.arg(dot, other, line)
            }
        }
    }

    fn arg(&mut self, dot: &Value, arg: &Arg, line: usize) -> Result<Value> {
        match arg {
            Arg::Dot(fields) => self.fields(dot.clone(), fields, &[], line),
            Arg::Variable(name, fields) => {
                let value = self.variable(name, line)?;
                self.fields(value, fields, &[], line)
            }
            Arg::Ident(name) => self.call(name, &[], line),
            Arg::Str(text) => Ok(Value::Str(text.clone())),
            Arg::Int(n) => Ok(Value::Int(*n)),
            Arg::Bool(b) => Ok(Value::Bool(*b)),
            Arg::Nil => Ok(Value::Nil),
            Arg::Pipe(pipe) => self.pipeline(dot, pipe, line),
        }
    }

    fn variable(&self, name: &str, line: usize) -> Result<Value> {
        self.vars
            .iter()
            .rev()
            .find(|(var, _)| var == name)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| self.error(line, format!("undefined variable: ${name}")))
    }

    /// Walk a field chain; `args` go to the last field.
    fn fields(&mut self, mut value: Value, fields: &[String], args: &[Value], line: usize) -> Result<Value> {
        let Some((last, path)) = fields.split_last() else {
            if !args.is_empty() {
                return Err(self.error(line, "can't give argument to non-function ."));
            }
            return Ok(value);
        };
        for name in path {
            value = self.field(&value, name, &[], line)?;
        }
        self.field(&value, last, args, line)
    }

    fn field(&self, value: &Value, name: &str, args: &[Value], line: usize) -> Result<Value> {
        trace!(field = name, receiver:? = value; "Evaluating field");
        match value {
            Value::Object(object) => match object.field(name, args) {
                Ok(Some(value)) => Ok(value),
                Ok(None) => Err(self.error(
                    line,
                    format!("can't evaluate field {name} in type {}", object.type_name()),
                )),
                Err(err) => Err(self.func_error(line, name, err)),
            },
            Value::Nil => Err(self.error(line, format!("nil pointer evaluating {name}"))),
            other => Err(self.error(
                line,
                format!("can't evaluate field {name} in type {}", other.type_name()),
            )),
        }
    }

    fn call(&mut self, name: &str, args: &[Value], line: usize) -> Result<Value> {
        let funcs = self.funcs;
        let Some(func) = funcs.get(name) else {
            return Err(self.error(line, format!("function {name:?} not defined")));
        };
        trace!(func = name, args = args.len(); "Calling template function");
        func(args).map_err(|err| self.func_error(line, name, err))
    }

    fn func_error(&self, line: usize, name: &str, err: FuncError) -> GigoError {
        match err {
            FuncError::Message(message) => self.error(line, format!("error calling {name}: {message}")),
            FuncError::Fatal(err) => *err,
        }
    }
}
