//! Values seen by template actions.

use std::{any::Any, fmt, rc::Rc};

use indexmap::IndexMap;

use crate::error::GigoError;

/// A dynamically typed template value.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<Value>),
    Object(Rc<dyn Object>),
}

impl Value {
    pub fn str(value: impl Into<String>) -> Self {
        Value::Str(value.into())
    }

    pub fn object(object: impl Object + 'static) -> Self {
        Value::Object(Rc::new(object))
    }

    /// Truthiness as used by `if`, `with`, `and`, `or` and `not`: the zero
    /// value of each type and empty collections are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Object(_) => true,
        }
    }

    /// Name of the value's type, as reported by `ArgType` and in errors.
    pub fn type_name(&self) -> String {
        match self {
            Value::Nil => "nil".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::Str(_) => "string".to_string(),
            Value::List(_) => "slice".to_string(),
            Value::Object(object) => object.type_name(),
        }
    }

    /// Text written to the output when the value ends an action.
    pub fn render(&self) -> String {
        match self {
            Value::Nil => "<no value>".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(n) => n.to_string(),
            Value::Str(s) => s.clone(),
            Value::List(items) => {
                let items: Vec<String> = items.iter().map(Value::render).collect();
                format!("[{}]", items.join(" "))
            }
            Value::Object(object) => object.render(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Rc<dyn Object>> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(items) => f.debug_list().entries(items).finish(),
            Value::Object(object) => write!(f, "<{}>", object.type_name()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

/// A value with named fields and methods.
///
/// `field` returns `Ok(None)` when the object has no member called `name`,
/// which the evaluator reports as an unknown field.
pub trait Object {
    fn type_name(&self) -> String;

    fn field(&self, name: &str, args: &[Value]) -> Result<Option<Value>, FuncError>;

    fn render(&self) -> String;

    /// The concrete value, for functions that only accept one kind of
    /// object.
    fn as_any(&self) -> Option<&dyn Any> {
        None
    }
}

/// Failure of a function or method called from a template.
#[derive(Debug)]
pub enum FuncError {
    /// Reported as an execution error of the calling template.
    Message(String),
    /// Propagated unchanged through every enclosing evaluation.
    Fatal(Box<GigoError>),
}

impl FuncError {
    pub fn message(message: impl Into<String>) -> Self {
        FuncError::Message(message.into())
    }
}

impl From<GigoError> for FuncError {
    fn from(err: GigoError) -> Self {
        FuncError::Fatal(Box::new(err))
    }
}

/// A function callable by name from a template.
pub type Func = Rc<dyn Fn(&[Value]) -> Result<Value, FuncError>>;

/// Functions available to a template, by name.
pub type Funcs = IndexMap<String, Func>;

/// Checks that `args` holds exactly `count` values.
pub fn expect_args(name: &str, args: &[Value], count: usize) -> Result<(), FuncError> {
    if args.len() == count {
        Ok(())
    } else {
        Err(FuncError::message(format!(
            "wrong number of args for {name}: want {count} got {}",
            args.len()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::str("").is_truthy());
        assert!(Value::str("x").is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::List(Vec::new()).is_truthy());
        assert!(Value::from(vec!["a"]).is_truthy());
    }

    #[test]
    fn test_render() {
        assert_eq!(Value::from(vec![1i64, 2]).render(), "[1 2]");
        assert_eq!(Value::Nil.render(), "<no value>");
        assert_eq!(Value::Bool(true).render(), "true");
    }

    #[test]
    fn test_type_name() {
        assert_eq!(Value::str("Name").type_name(), "string");
        assert_eq!(Value::Int(3).type_name(), "int");
    }
}
