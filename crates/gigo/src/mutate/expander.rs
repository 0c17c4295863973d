//! Evaluation of a prepared tree.
//!
//! The [`Expander`] owns everything a mutation run registered: mutators,
//! helpers, plain structs and placeholders. Template functions hold a weak
//! reference back to it, so a mutator called from any template can call
//! other mutators, and placeholders can be resolved from inside other
//! evaluations.

use std::{
    any::Any,
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use gigo_core::{NodeKind, Origin, Token, TokenKind};
use gigo_parser::ParseConfig;
use indexmap::{IndexMap, IndexSet};
use log::{debug, trace};

use super::{
    mutator::{Helper, TemplateDot, TypeMutator},
    placeholder::Placeholder,
    set_delimiters,
    snapshot::StructValue,
};
use crate::{
    error::{GigoError, MutationError},
    template::{Func, FuncError, Funcs, Object, Template, Value, builtins, expect_args},
};

type Result<T> = std::result::Result<T, GigoError>;

pub struct Expander {
    max_depth: usize,
    parse: ParseConfig,
    mutators: IndexMap<String, TypeMutator>,
    helpers: IndexMap<String, Helper>,
    structs: IndexMap<String, Rc<StructValue>>,
    placeholders: IndexMap<String, Placeholder>,
    funcs: Funcs,
    /// Resolved placeholders.
    results: RefCell<IndexMap<String, String>>,
    depth: Cell<usize>,
    /// Types generated by mutators, one frame per expansion in progress.
    generated: RefCell<Vec<Vec<Rc<StructValue>>>>,
    /// Declarations generated by poireau expansions, written after the
    /// evaluated source.
    appendix: RefCell<Vec<String>>,
    /// Names of the generated types already written.
    emitted: RefCell<IndexSet<String>>,
}

/// Everything a run registered before evaluation.
pub struct Parts {
    pub mutators: IndexMap<String, TypeMutator>,
    pub helpers: IndexMap<String, Helper>,
    pub structs: IndexMap<String, Rc<StructValue>>,
    pub placeholders: IndexMap<String, Placeholder>,
}

impl Expander {
    pub fn new(parts: Parts, max_depth: usize, parse: ParseConfig) -> Rc<Self> {
        Rc::new_cyclic(|this: &Weak<Expander>| {
            let mut funcs = builtins();
            for name in parts.mutators.keys() {
                funcs.insert(name.clone(), mutator_func(this, name));
            }
            for name in parts.helpers.keys() {
                funcs.insert(name.clone(), helper_func(this, name));
            }
            Self {
                max_depth,
                parse,
                mutators: parts.mutators,
                helpers: parts.helpers,
                structs: parts.structs,
                placeholders: parts.placeholders,
                funcs,
                results: RefCell::new(IndexMap::new()),
                depth: Cell::new(0),
                generated: RefCell::new(Vec::new()),
                appendix: RefCell::new(Vec::new()),
                emitted: RefCell::new(IndexSet::new()),
            }
        })
    }

    /// Evaluate the serialized tree, then append the declarations that
    /// poireau expansions generated.
    pub fn evaluate(self: &Rc<Self>, name: &str, text: &str) -> Result<String> {
        let template = Template::parse(name, text)?;
        let mut out = template.execute(Value::Object(self.context()), &self.funcs)?;
        for generated in self.appendix.borrow().iter() {
            out.push('\n');
            out.push_str(generated);
        }
        Ok(out)
    }

    fn context(self: &Rc<Self>) -> Rc<Context> {
        Rc::new(Context {
            expander: Rc::clone(self),
        })
    }

    /// Count one more nested evaluation for as long as the guard lives.
    fn enter(&self, name: &str) -> Result<DepthGuard<'_>> {
        let depth = self.depth.get() + 1;
        if depth > self.max_depth {
            return Err(MutationError::RecursionLimit {
                name: name.to_string(),
                limit: self.max_depth,
            }
            .into());
        }
        self.depth.set(depth);
        Ok(DepthGuard { depth: &self.depth })
    }

    /// Run `expand` with a fresh frame recording generated types, and
    /// return them with its outcome.
    fn recording<T>(&self, expand: impl FnOnce() -> Result<T>) -> (Result<T>, Vec<Rc<StructValue>>) {
        self.generated.borrow_mut().push(Vec::new());
        let outcome = expand();
        let generated = self.generated.borrow_mut().pop().unwrap_or_default();
        (outcome, generated)
    }

    /// Declarations of the generated types not written yet. A type
    /// generated again, by another implements declaration or poireau, is
    /// written once.
    fn emit(&self, generated: &[Rc<StructValue>]) -> Vec<String> {
        let mut emitted = self.emitted.borrow_mut();
        let mut out = Vec::new();
        for strukt in generated {
            if emitted.insert(strukt.name().to_string()) {
                out.push(strukt.declarations_text());
            } else {
                trace!(generated = strukt.name(); "Skipped generated type");
            }
        }
        out
    }

    /// Text of the placeholder called `name`, computed once.
    pub fn get_result(self: &Rc<Self>, name: &str) -> Result<String> {
        if let Some(result) = self.results.borrow().get(name) {
            return Ok(result.clone());
        }
        let placeholder = self
            .placeholders
            .get(name)
            .ok_or_else(|| MutationError::UnknownPlaceholder(name.to_string()))?;
        let _guard = self.enter(name)?;
        let result = match placeholder {
            Placeholder::Comment(text) => text.clone(),
            Placeholder::Implements(text) => self.expand_implements(name, text)?,
            Placeholder::Poireau { host, expr, pointer } => {
                self.expand_poireau(name, host, expr, *pointer)?
            }
        };
        trace!(name, bytes = result.len(); "Resolved placeholder");
        self.results
            .borrow_mut()
            .insert(name.to_string(), result.clone());
        Ok(result)
    }

    /// Evaluate an implements declaration and rewrite it as a struct
    /// embedding the last generated type.
    fn expand_implements(self: &Rc<Self>, name: &str, text: &str) -> Result<String> {
        let mut tree = gigo_parser::parse(text, Origin::Str, &self.parse)?;
        let decl = tree
            .find_implements()
            .first()
            .copied()
            .ok_or_else(|| MutationError::MissingStruct {
                mutator: name.to_string(),
            })?;
        set_delimiters(&mut tree, decl);

        let template = Template::parse(name, tree.text(decl))?;
        let (outcome, generated) =
            self.recording(|| template.execute(Value::Object(self.context()), &self.funcs));
        outcome?;
        debug!(placeholder = name, generated = generated.len(); "Expanded implements");

        let (template, block) = match tree.kind(decl) {
            NodeKind::Implements(decl) => (decl.template, decl.block),
            _ => (None, None),
        };
        tree.set_token_value(decl, TokenKind::Implements, "struct");
        tree.retype(decl, TokenKind::Implements, TokenKind::Struct);
        if let Some(template) = template {
            tree.remove(template)?;
        }

        let mut out = String::new();
        if let (Some(last), Some(block)) = (generated.last(), block) {
            let nl = tree.add_token(Token::synthetic(TokenKind::Nl, "\n"));
            let ws = tree.add_token(Token::synthetic(TokenKind::Ws, "\t"));
            let word = tree.add_token(Token::synthetic(TokenKind::Word, last.name()));
            let ident = tree.add(NodeKind::Identifier);
            tree.append(ident, word);
            let embed = tree.add(NodeKind::Expression);
            tree.append(embed, ident);
            tree.insert_at(block, 1, nl);
            tree.insert_at(block, 2, ws);
            tree.insert_at(block, 3, embed);
            if let NodeKind::PropsBlock(props) = tree.kind_mut(block) {
                props.underlying.push(embed);
            }
            out.push_str(&self.emit(&generated).concat());
        }
        tree.write_text(decl, &mut out);
        Ok(out)
    }

    /// Evaluate a poireau expression with dot on the host struct. The
    /// marker becomes the last generated type name.
    fn expand_poireau(self: &Rc<Self>, name: &str, host: &str, expr: &str, pointer: bool) -> Result<String> {
        let template = Template::parse(name, format!("<:{expr}:>"))?;
        let dot = PoireauDot {
            host: self.structs.get(host).cloned(),
            context: self.context(),
        };
        let (outcome, generated) = self.recording(|| template.execute(Value::object(dot), &self.funcs));
        outcome?;
        let last = generated.last().ok_or_else(|| MutationError::MissingStruct {
            mutator: expr.to_string(),
        })?;
        debug!(placeholder = name, host, generated = generated.len(); "Expanded poireau");

        let embedded = if pointer {
            format!("*{}", last.name())
        } else {
            last.name().to_string()
        };
        let declarations = self.emit(&generated);
        self.appendix.borrow_mut().extend(declarations);
        Ok(embedded)
    }

    /// Execute the mutator `name` on the struct in `args[0]`, parse its
    /// output and record the generated struct.
    fn call_mutator(&self, name: &str, args: &[Value]) -> std::result::Result<Value, FuncError> {
        let Some((first, rest)) = args.split_first() else {
            return Err(FuncError::message(format!(
                "wrong number of args for {name}: want at least 1 got 0"
            )));
        };
        let origin = StructValue::of_value(first).ok_or_else(|| {
            FuncError::message(format!("{name} expects a struct, got {}", first.type_name()))
        })?;
        let mutator = self
            .mutators
            .get(name)
            .ok_or_else(|| FuncError::message(format!("function {name:?} not defined")))?;
        let _guard = self.enter(name)?;

        let dot = Value::object(TemplateDot::new(origin, rest.to_vec()));
        let out = mutator.execute(dot, &self.funcs)?;
        let mut tree = gigo_parser::parse(&out, Origin::Str, &self.parse).map_err(GigoError::from)?;
        let strukt = tree
            .find_structs()
            .first()
            .copied()
            .ok_or_else(|| GigoError::from(MutationError::MissingStruct {
                mutator: name.to_string(),
            }))?;
        for func in tree.find_funcs() {
            tree.attach_method(strukt, func);
        }
        let generated = Rc::new(StructValue::from_tree(&tree, strukt));
        debug!(mutator = name, generated = generated.name(); "Generated type");

        if let Some(frame) = self.generated.borrow_mut().last_mut() {
            frame.push(Rc::clone(&generated));
        }
        Ok(Value::Object(generated))
    }

    fn call_helper(&self, name: &str, args: &[Value]) -> std::result::Result<Value, FuncError> {
        let helper = self
            .helpers
            .get(name)
            .ok_or_else(|| FuncError::message(format!("function {name:?} not defined")))?;
        let _guard = self.enter(name)?;
        Ok(Value::Str(helper.execute(args, &self.funcs)?))
    }
}

fn mutator_func(this: &Weak<Expander>, name: &str) -> Func {
    let this = Weak::clone(this);
    let name = name.to_string();
    Rc::new(move |args: &[Value]| upgrade(&this)?.call_mutator(&name, args))
}

fn helper_func(this: &Weak<Expander>, name: &str) -> Func {
    let this = Weak::clone(this);
    let name = name.to_string();
    Rc::new(move |args: &[Value]| upgrade(&this)?.call_helper(&name, args))
}

fn upgrade(this: &Weak<Expander>) -> std::result::Result<Rc<Expander>, FuncError> {
    this.upgrade()
        .ok_or_else(|| FuncError::message("mutation run is over"))
}

struct DepthGuard<'a> {
    depth: &'a Cell<usize>,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

/// Dot of the evaluated file: plain structs by name and `GetResult`.
struct Context {
    expander: Rc<Expander>,
}

impl Object for Context {
    fn type_name(&self) -> String {
        "Context".to_string()
    }

    fn field(&self, name: &str, args: &[Value]) -> std::result::Result<Option<Value>, FuncError> {
        if name == "GetResult" {
            expect_args("GetResult", args, 1)?;
            let Some(placeholder) = args[0].as_str() else {
                return Err(FuncError::message(format!(
                    "GetResult expects a string, got {}",
                    args[0].type_name()
                )));
            };
            return Ok(Some(Value::Str(self.expander.get_result(placeholder)?)));
        }
        Ok(self
            .expander
            .structs
            .get(name)
            .map(|strukt| Value::Object(Rc::clone(strukt) as Rc<dyn Object>)))
    }

    fn render(&self) -> String {
        "Context".to_string()
    }
}

/// Dot of a poireau expression: fields of the host struct, falling back
/// to the context.
struct PoireauDot {
    host: Option<Rc<StructValue>>,
    context: Rc<Context>,
}

impl Object for PoireauDot {
    fn type_name(&self) -> String {
        "PoireauDot".to_string()
    }

    fn field(&self, name: &str, args: &[Value]) -> std::result::Result<Option<Value>, FuncError> {
        if let Some(host) = &self.host {
            if let Some(value) = host.field(name, args)? {
                return Ok(Some(value));
            }
        }
        self.context.field(name, args)
    }

    fn render(&self) -> String {
        self.host
            .as_ref()
            .map(|host| host.render())
            .unwrap_or_else(|| self.context.render())
    }

    fn as_any(&self) -> Option<&dyn Any> {
        self.host.as_deref().map(|host| host as &dyn Any)
    }
}
