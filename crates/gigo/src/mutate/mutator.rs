//! Type mutators and define helpers, the callable side of templates.

use std::{any::Any, rc::Rc};

use gigo_core::{NodeId, TokenKind, Tree};

use super::{set_delimiters, snapshot::StructValue};
use crate::{
    error::GigoError,
    template::{FuncError, Funcs, Object, Template, Value, expect_args},
};

/// A template declaration and its methods, callable by slug name.
///
/// Calling `Mutexed T args...` executes the template text with dot bound
/// to a [`TemplateDot`] over `T`.
#[derive(Debug, Clone)]
pub struct TypeMutator {
    name: String,
    text: String,
}

impl TypeMutator {
    /// Turn a detached template declaration into a mutator. The
    /// `template` keyword becomes `type`; every attached method follows
    /// the declaration, closed by `<:end:>` when it has a modifier.
    pub fn from_tree(tree: &mut Tree, decl: NodeId) -> Self {
        tree.set_token_value(decl, TokenKind::Template, "type");
        set_delimiters(tree, decl);
        let mut text = tree.text(decl);
        for method in tree.methods_of(decl).to_vec() {
            set_delimiters(tree, method);
            text.push('\n');
            tree.write_text(method, &mut text);
            if tree.modifier_text(method).is_some() {
                text.push_str("<:end:>");
            }
        }
        Self {
            name: tree.slug_of(decl).unwrap_or_default(),
            text,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn execute(&self, dot: Value, funcs: &Funcs) -> Result<String, GigoError> {
        Template::parse(&self.name, &self.text)?.execute(dot, funcs)
    }
}

/// A `<:define:> func` whose body is injected wherever it is called.
#[derive(Debug, Clone)]
pub struct Helper {
    name: String,
    text: String,
}

impl Helper {
    /// Register a detached define func. Its text is the body of the func
    /// without braces.
    pub fn from_tree(tree: &mut Tree, decl: NodeId) -> Self {
        set_delimiters(tree, decl);
        let text = tree
            .func_of(decl)
            .and_then(|(_, func)| func.body)
            .map(|body| tree.template_inner_text(body))
            .unwrap_or_default();
        Self {
            name: tree.name_of(decl).unwrap_or_default(),
            text,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render the body with dot bound to the single argument, or to the
    /// list of arguments.
    pub fn execute(&self, args: &[Value], funcs: &Funcs) -> Result<String, GigoError> {
        let dot = match args {
            [single] => single.clone(),
            _ => Value::List(args.to_vec()),
        };
        Template::parse(&self.name, &self.text)?.execute(dot, funcs)
    }
}

/// Dot of a mutator: the origin type, plus `Args` and `ArgType`.
pub struct TemplateDot {
    origin: Rc<StructValue>,
    args: Vec<Value>,
}

impl TemplateDot {
    pub fn new(origin: Rc<StructValue>, args: Vec<Value>) -> Self {
        Self { origin, args }
    }
}

impl Object for TemplateDot {
    fn type_name(&self) -> String {
        "TemplateTplDot".to_string()
    }

    fn field(&self, name: &str, args: &[Value]) -> Result<Option<Value>, FuncError> {
        match name {
            "Args" => Ok(Some(Value::List(self.args.clone()))),
            "ArgType" => {
                expect_args("ArgType", args, 1)?;
                Ok(Some(Value::Str(args[0].type_name())))
            }
            _ => self.origin.field(name, args),
        }
    }

    fn render(&self) -> String {
        self.origin.render()
    }

    /// Passing dot to another mutator passes the origin.
    fn as_any(&self) -> Option<&dyn Any> {
        Some(self.origin.as_ref())
    }
}
