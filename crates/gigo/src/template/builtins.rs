//! Functions every template can call.

use std::{cmp::Ordering, rc::Rc};

use super::value::{Func, FuncError, Funcs, Value, expect_args};

/// The builtin functions: `joinexpr` plus the usual comparison, logic and
/// formatting helpers.
pub fn builtins() -> Funcs {
    let mut funcs = Funcs::new();
    let mut add = |name: &str, func: fn(&[Value]) -> Result<Value, FuncError>| {
        funcs.insert(name.to_string(), Rc::new(func) as Func);
    };
    add("joinexpr", joinexpr);
    add("and", and);
    add("or", or);
    add("not", not);
    add("len", len);
    add("index", index);
    add("print", print);
    add("println", println);
    add("printf", printf);
    add("eq", eq);
    add("ne", ne);
    add("lt", |args| compare("lt", args, Ordering::is_lt));
    add("le", |args| compare("le", args, Ordering::is_le));
    add("gt", |args| compare("gt", args, Ordering::is_gt));
    add("ge", |args| compare("ge", args, Ordering::is_ge));
    funcs
}

/// `joinexpr GLUE LIST`: the rendered items of LIST joined by GLUE.
fn joinexpr(args: &[Value]) -> Result<Value, FuncError> {
    expect_args("joinexpr", args, 2)?;
    let glue = args[0].render();
    let joined = match &args[1] {
        Value::List(items) => items
            .iter()
            .map(|item| item.render().trim().to_string())
            .collect::<Vec<_>>()
            .join(&glue),
        Value::Nil => String::new(),
        other => other.render(),
    };
    Ok(Value::Str(joined))
}

fn and(args: &[Value]) -> Result<Value, FuncError> {
    let Some(last) = args.last() else {
        return Err(FuncError::message("wrong number of args for and: want at least 1 got 0"));
    };
    Ok(args
        .iter()
        .find(|arg| !arg.is_truthy())
        .unwrap_or(last)
        .clone())
}

fn or(args: &[Value]) -> Result<Value, FuncError> {
    let Some(last) = args.last() else {
        return Err(FuncError::message("wrong number of args for or: want at least 1 got 0"));
    };
    Ok(args.iter().find(|arg| arg.is_truthy()).unwrap_or(last).clone())
}

fn not(args: &[Value]) -> Result<Value, FuncError> {
    expect_args("not", args, 1)?;
    Ok(Value::Bool(!args[0].is_truthy()))
}

fn len(args: &[Value]) -> Result<Value, FuncError> {
    expect_args("len", args, 1)?;
    match &args[0] {
        Value::List(items) => Ok(Value::Int(items.len() as i64)),
        Value::Str(s) => Ok(Value::Int(s.len() as i64)),
        other => Err(FuncError::message(format!(
            "len of type {}",
            other.type_name()
        ))),
    }
}

fn index(args: &[Value]) -> Result<Value, FuncError> {
    let Some((mut value, keys)) = args.split_first().map(|(first, rest)| (first.clone(), rest)) else {
        return Err(FuncError::message("wrong number of args for index: want at least 1 got 0"));
    };
    for key in keys {
        value = match (&value, key) {
            (Value::List(items), Value::Int(n)) => usize::try_from(*n)
                .ok()
                .and_then(|n| items.get(n).cloned())
                .ok_or_else(|| FuncError::message(format!("index out of range: {n}")))?,
            (Value::Object(object), Value::Str(name)) => object
                .field(name, &[])?
                .ok_or_else(|| FuncError::message(format!("no entry for key {name:?}")))?,
            (value, key) => {
                return Err(FuncError::message(format!(
                    "can't index item of type {} with {}",
                    value.type_name(),
                    key.type_name()
                )));
            }
        };
    }
    Ok(value)
}

/// Operands are separated by a space when neither is a string.
fn print(args: &[Value]) -> Result<Value, FuncError> {
    let mut out = String::new();
    for (i, arg) in args.iter().enumerate() {
        let is_str = matches!(arg, Value::Str(_));
        if i > 0 && !is_str && !matches!(args[i - 1], Value::Str(_)) {
            out.push(' ');
        }
        out.push_str(&arg.render());
    }
    Ok(Value::Str(out))
}

fn println(args: &[Value]) -> Result<Value, FuncError> {
    let items: Vec<String> = args.iter().map(Value::render).collect();
    Ok(Value::Str(format!("{}\n", items.join(" "))))
}

/// `printf FORMAT ARGS...` with the `%v`, `%s`, `%d`, `%q` and `%%` verbs.
fn printf(args: &[Value]) -> Result<Value, FuncError> {
    let Some((format, values)) = args.split_first() else {
        return Err(FuncError::message("wrong number of args for printf: want at least 1 got 0"));
    };
    let format = format.render();
    let mut values = values.iter();
    let mut out = String::new();
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => out.push('%'),
            Some(verb @ ('v' | 's' | 'd' | 'q')) => match values.next() {
                Some(value) if verb == 'q' => out.push_str(&format!("{:?}", value.render())),
                Some(value) => out.push_str(&value.render()),
                None => out.push_str(&format!("%!{verb}(MISSING)")),
            },
            Some(other) => out.push_str(&format!("%!{other}(BADVERB)")),
            None => out.push_str("%!(NOVERB)"),
        }
    }
    Ok(Value::Str(out))
}

fn eq(args: &[Value]) -> Result<Value, FuncError> {
    let Some((first, others)) = args.split_first() else {
        return Err(FuncError::message("wrong number of args for eq: want at least 1 got 0"));
    };
    if others.is_empty() {
        return Err(FuncError::message("missing argument for comparison"));
    }
    Ok(Value::Bool(others.iter().any(|other| other == first)))
}

fn ne(args: &[Value]) -> Result<Value, FuncError> {
    expect_args("ne", args, 2)?;
    Ok(Value::Bool(args[0] != args[1]))
}

fn compare(name: &str, args: &[Value], pred: fn(Ordering) -> bool) -> Result<Value, FuncError> {
    expect_args(name, args, 2)?;
    let ordering = match (&args[0], &args[1]) {
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        (Value::Str(a), Value::Str(b)) => a.cmp(b),
        (a, b) => {
            return Err(FuncError::message(format!(
                "incompatible types for comparison: {} and {}",
                a.type_name(),
                b.type_name()
            )));
        }
    };
    Ok(Value::Bool(pred(ordering)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: &[Value]) -> Value {
        let funcs = builtins();
        let func = funcs.get(name).unwrap();
        func(args).unwrap()
    }

    #[test]
    fn test_joinexpr() {
        let list = Value::from(vec!["item Todo", " n int "]);
        assert_eq!(call("joinexpr", &[Value::str(","), list]), Value::str("item Todo,n int"));
        assert_eq!(call("joinexpr", &[Value::str(","), Value::List(Vec::new())]), Value::str(""));
    }

    #[test]
    fn test_logic() {
        assert_eq!(call("and", &[Value::Int(1), Value::str("")]), Value::str(""));
        assert_eq!(call("or", &[Value::str(""), Value::Int(2)]), Value::Int(2));
        assert_eq!(call("not", &[Value::Nil]), Value::Bool(true));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(call("eq", &[Value::str("a"), Value::str("b"), Value::str("a")]), Value::Bool(true));
        assert_eq!(call("ne", &[Value::Int(1), Value::Int(1)]), Value::Bool(false));
        assert_eq!(call("lt", &[Value::Int(1), Value::Int(2)]), Value::Bool(true));
        assert_eq!(call("ge", &[Value::str("b"), Value::str("a")]), Value::Bool(true));
    }

    #[test]
    fn test_incompatible_comparison() {
        let funcs = builtins();
        let err = funcs["lt"](&[Value::Int(1), Value::str("a")]).unwrap_err();
        assert!(matches!(err, FuncError::Message(message) if message.contains("incompatible")));
    }

    #[test]
    fn test_formatting() {
        assert_eq!(call("print", &[Value::str("a"), Value::Int(1), Value::Int(2)]), Value::str("a1 2"));
        assert_eq!(call("println", &[Value::str("a"), Value::Int(1)]), Value::str("a 1\n"));
        assert_eq!(
            call("printf", &[Value::str("%s=%d %q 100%%"), Value::str("x"), Value::Int(3), Value::str("y")]),
            Value::str("x=3 \"y\" 100%")
        );
    }

    #[test]
    fn test_len_and_index() {
        let list = Value::from(vec!["a", "b"]);
        assert_eq!(call("len", &[list.clone()]), Value::Int(2));
        assert_eq!(call("index", &[list, Value::Int(1)]), Value::str("b"));
    }
}
