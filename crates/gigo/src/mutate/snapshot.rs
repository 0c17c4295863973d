//! Declarations copied out of a tree, exposed to templates as objects.
//!
//! A snapshot owns its data, so it outlives edits to the tree it was taken
//! from and can be shared between nested evaluations.

use std::{any::Any, rc::Rc};

use gigo_core::{NodeId, NodeKind, Tree, slug_name};

use crate::template::{FuncError, Object, Value};

/// A struct declaration and its methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructValue {
    name: String,
    text: String,
    props: Vec<PropValue>,
    underlying: Vec<String>,
    methods: Vec<MethodValue>,
}

impl StructValue {
    /// Snapshot of a struct or implements declaration.
    pub fn from_tree(tree: &Tree, id: NodeId) -> Self {
        let block = match tree.kind(id) {
            NodeKind::Struct(decl) => decl.block,
            NodeKind::Implements(decl) => decl.block,
            _ => None,
        };
        let props = block
            .map(|block| {
                tree.block_props(block)
                    .iter()
                    .map(|&prop| PropValue::from_tree(tree, prop))
                    .collect()
            })
            .unwrap_or_default();
        let underlying = block
            .map(|block| {
                tree.block_underlying(block)
                    .iter()
                    .map(|&member| tree.text(member).trim().to_string())
                    .collect()
            })
            .unwrap_or_default();
        Self {
            name: tree.name_of(id).unwrap_or_default(),
            text: tree.text(id).trim().to_string(),
            props,
            underlying,
            methods: tree
                .methods_of(id)
                .iter()
                .map(|&method| MethodValue::from_tree(tree, method))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn methods(&self) -> &[MethodValue] {
        &self.methods
    }

    pub fn props(&self) -> &[PropValue] {
        &self.props
    }

    /// The declaration then each method, every one followed by a newline.
    pub fn declarations_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.text);
        out.push('\n');
        for method in &self.methods {
            out.push_str(&method.text);
            out.push('\n');
        }
        out
    }

    /// The struct behind a template value, if any.
    pub fn of_value(value: &Value) -> Option<Rc<StructValue>> {
        value
            .as_object()?
            .as_any()?
            .downcast_ref::<StructValue>()
            .map(|strukt| Rc::new(strukt.clone()))
    }
}

impl Object for StructValue {
    fn type_name(&self) -> String {
        "StructDecl".to_string()
    }

    fn field(&self, name: &str, _args: &[Value]) -> Result<Option<Value>, FuncError> {
        Ok(match name {
            "Name" | "GetName" => Some(Value::str(&self.name)),
            "GetSlugName" => Some(Value::Str(slug_name(&self.name))),
            "Methods" => Some(Value::List(
                self.methods.iter().cloned().map(Value::object).collect(),
            )),
            "Props" => Some(Value::List(
                self.props.iter().cloned().map(Value::object).collect(),
            )),
            "Underlying" => Some(Value::from(self.underlying.clone())),
            "String" => Some(Value::str(&self.text)),
            _ => None,
        })
    }

    fn render(&self) -> String {
        self.name.clone()
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

/// A func declaration attached to a struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodValue {
    name: String,
    receiver: String,
    args: Vec<PropValue>,
    out: String,
    text: String,
}

impl MethodValue {
    pub fn from_tree(tree: &Tree, id: NodeId) -> Self {
        Self {
            name: tree.name_of(id).unwrap_or_default(),
            receiver: tree.receiver_type(id).unwrap_or_default(),
            args: tree
                .args_block(id)
                .into_iter()
                .map(|prop| PropValue::from_tree(tree, prop))
                .collect(),
            out: tree.out_text(id),
            text: tree.text(id).trim().to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Object for MethodValue {
    fn type_name(&self) -> String {
        "FuncDecl".to_string()
    }

    fn field(&self, name: &str, _args: &[Value]) -> Result<Option<Value>, FuncError> {
        Ok(match name {
            "Name" | "GetName" => Some(Value::str(&self.name)),
            "GetArgsBlock" => Some(Value::List(
                self.args.iter().cloned().map(Value::object).collect(),
            )),
            "GetArgsNames" => Some(Value::List(
                self.args
                    .iter()
                    .filter_map(|arg| arg.name.clone())
                    .map(Value::Str)
                    .collect(),
            )),
            "Out" | "GetOut" => Some(Value::str(&self.out)),
            "GetReceiverType" => Some(Value::str(&self.receiver)),
            "String" => Some(Value::str(&self.text)),
            _ => None,
        })
    }

    fn render(&self) -> String {
        self.text.clone()
    }
}

/// A struct field or a func parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropValue {
    name: Option<String>,
    ty: String,
    tag: Option<String>,
}

impl PropValue {
    pub fn from_tree(tree: &Tree, id: NodeId) -> Self {
        let tag = match tree.kind(id) {
            NodeKind::Prop(decl) => tree.text_of(decl.tag),
            _ => None,
        };
        Self {
            name: tree.prop_name(id),
            ty: tree.prop_type(id).unwrap_or_default(),
            tag,
        }
    }
}

impl Object for PropValue {
    fn type_name(&self) -> String {
        "PropDecl".to_string()
    }

    fn field(&self, name: &str, _args: &[Value]) -> Result<Option<Value>, FuncError> {
        Ok(match name {
            "Name" => Some(Value::Str(self.name.clone().unwrap_or_default())),
            "Type" => Some(Value::str(&self.ty)),
            "Tag" => Some(Value::Str(self.tag.clone().unwrap_or_default())),
            _ => None,
        })
    }

    /// `name type`, or the type alone for embeddings.
    fn render(&self) -> String {
        match &self.name {
            Some(name) => format!("{name} {}", self.ty),
            None => self.ty.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use gigo_parser::parse_str;

    use super::*;

    const SOURCE: &str = "type Todos struct {\n  sync.Mutex\n  Items []Todo `json:\"items\"`\n}\n\nfunc (t *Todos) Find(name string, done bool) (Todo, bool) {\n  return Todo{}, false\n}\n";

    fn todos() -> StructValue {
        let mut tree = parse_str(SOURCE).unwrap();
        let strukt = tree.find_structs()[0];
        let method = tree.find_funcs()[0];
        tree.attach_method(strukt, method);
        StructValue::from_tree(&tree, strukt)
    }

    fn field(object: &dyn Object, name: &str) -> Value {
        object.field(name, &[]).unwrap().unwrap()
    }

    #[test]
    fn test_struct_fields() {
        let todos = todos();
        assert_eq!(field(&todos, "Name"), Value::str("Todos"));
        assert_eq!(field(&todos, "Underlying"), Value::from(vec!["sync.Mutex"]));
        assert_eq!(todos.props().len(), 1);
        assert_eq!(todos.methods().len(), 1);
        assert!(todos.field("Nope", &[]).unwrap().is_none());
    }

    #[test]
    fn test_method_fields() {
        let todos = todos();
        let method = &todos.methods()[0];
        assert_eq!(method.name(), "Find");
        assert_eq!(field(method, "Out"), Value::str("(Todo, bool)"));
        assert_eq!(field(method, "GetArgsNames"), Value::from(vec!["name", "done"]));
        assert_eq!(field(method, "GetReceiverType"), Value::str("*Todos"));
        let Value::List(args) = field(method, "GetArgsBlock") else {
            panic!("Expected a list");
        };
        let rendered: Vec<String> = args.iter().map(Value::render).collect();
        assert_eq!(rendered, vec!["name string", "done bool"]);
    }

    #[test]
    fn test_prop_tag() {
        let todos = todos();
        let prop = &todos.props()[0];
        assert_eq!(field(prop, "Tag"), Value::str("`json:\"items\"`"));
        assert_eq!(prop.render(), "Items []Todo");
    }

    #[test]
    fn test_declarations_text() {
        let text = todos().declarations_text();
        assert!(text.starts_with("type Todos struct {"));
        assert!(text.ends_with("return Todo{}, false\n}\n"));
    }

    #[test]
    fn test_of_value() {
        let value = Value::object(todos());
        assert_eq!(StructValue::of_value(&value).unwrap().name(), "Todos");
        assert!(StructValue::of_value(&Value::str("Todos")).is_none());
    }
}
