//! Unit tests for the gigo parser.
//!
//! These tests cover the declarations the mutation engine relies on, the
//! statement forms found in template methods, scope-based disambiguation of
//! composite literals and the error reporting of failing rules.

use gigo_core::{NodeId, NodeKind, Origin, Tree};
use proptest::prelude::*;

use crate::{ErrorCode, ParseConfig, parse, parse_str, parse_str_with_package};

const DEMO: &str = include_str!("../../../demos/demo.gigo.go");

/// Parse a snippet and assert success.
fn parse_ok(source: &str) -> Tree {
    match parse_str(source) {
        Ok(tree) => tree,
        Err(err) => panic!("Expected parsing to succeed, but got error: {}", err.render_context()),
    }
}

/// The assign declarations of a var or const declaration.
fn assigns(tree: &Tree, decl: NodeId) -> Vec<NodeId> {
    match tree.kind(decl) {
        NodeKind::Var(decl) | NodeKind::Const(decl) => decl.assigns.clone(),
        other => panic!("Expected a var or const, got {}", other.name()),
    }
}

fn right_text(tree: &Tree, assign: NodeId) -> Option<String> {
    match tree.kind(assign) {
        NodeKind::Assign(assign) => tree.text_of(assign.right),
        other => panic!("Expected an assign, got {}", other.name()),
    }
}

/// Every node of `kind_name` under `id`.
fn find_kind(tree: &Tree, id: NodeId, kind_name: &str) -> Vec<NodeId> {
    tree.descendants(id)
        .into_iter()
        .filter(|&node| tree.kind(node).name() == kind_name)
        .collect()
}

#[test]
fn test_struct_props() {
    let tree = parse_ok("type Todo struct {\n A string\n B int\n}");
    let structs = tree.find_structs();
    assert_eq!(structs.len(), 1);
    assert_eq!(tree.name_of(structs[0]).as_deref(), Some("Todo"));

    let NodeKind::Struct(strukt) = tree.kind(structs[0]) else {
        panic!("Expected a struct");
    };
    let block = strukt.block.expect("struct has a block");
    let props = tree.block_props(block);
    assert_eq!(props.len(), 2);
    assert_eq!(tree.prop_name(props[0]).as_deref(), Some("A"));
    assert_eq!(tree.prop_type(props[0]).as_deref(), Some("string"));
    assert_eq!(tree.prop_name(props[1]).as_deref(), Some("B"));
    assert_eq!(tree.prop_type(props[1]).as_deref(), Some("int"));
}

#[test]
fn test_struct_embedding_and_tags() {
    let source = "type Todo struct {\n  *sync.Mutex\n  Base\n  Name string `json:\"name\"`\n  Tags []string\n}";
    let tree = parse_ok(source);
    let NodeKind::Struct(strukt) = tree.kind(tree.find_structs()[0]) else {
        panic!("Expected a struct");
    };
    let block = strukt.block.expect("struct has a block");
    assert_eq!(tree.block_underlying(block).len(), 2);
    let props = tree.block_props(block);
    assert_eq!(props.len(), 2);
    assert_eq!(tree.prop_type(props[1]).as_deref(), Some("[]string"));
    let NodeKind::Prop(name) = tree.kind(props[0]) else {
        panic!("Expected a prop");
    };
    assert_eq!(tree.text_of(name.tag).as_deref(), Some("`json:\"name\"`"));
    assert_eq!(tree.text(tree.root()), source);
}

#[test]
fn test_var_decls_keep_right_text() {
    let tree = parse_ok("var x = \"content\"\nvar y string = \"content1\"");
    let vars = tree.find_vars();
    assert_eq!(vars.len(), 2);

    let first = assigns(&tree, vars[0]);
    assert_eq!(right_text(&tree, first[0]).as_deref(), Some("\"content\""));

    let second = assigns(&tree, vars[1]);
    assert_eq!(right_text(&tree, second[0]).as_deref(), Some("\"content1\""));
    let NodeKind::Assign(assign) = tree.kind(second[0]) else {
        panic!("Expected an assign");
    };
    assert_eq!(tree.text_of(assign.left_type).as_deref(), Some("string"));
}

#[test]
fn test_const_block() {
    let tree = parse_ok("const (\n  A = iota\n  B\n  C\n)\n");
    let consts = tree.find_consts();
    assert_eq!(consts.len(), 1);
    assert_eq!(assigns(&tree, consts[0]).len(), 3);
    assert_eq!(tree.declared_names(consts[0]), vec!["A", "B", "C"]);
}

#[test]
fn test_single_const_requires_value() {
    let err = parse_str("const x\n").unwrap_err();
    assert_eq!(err.code(), ErrorCode::E100);
    assert_eq!(err.reason(), "expected assignment");
}

#[test]
fn test_struct_without_brace_fails() {
    let err = parse_str("type tomate struct qsdqd{}").unwrap_err();
    assert_eq!(err.reason(), "unexpected token");
    assert_eq!(err.found().map(|token| token.value.as_str()), Some("qsdqd"));
    assert_eq!(err.position().line, 1);
    assert_eq!(err.position().col, 19);
    assert!(err.render_context().contains("1  type tomate struct qsdqd{}\n   ---------------------↑"));
}

#[test]
fn test_loop_guard_aborts() {
    let source = "package main\n\nimport (\n  \"fmt\"\n  \"os\"\n  \"strings\"\n)\n";
    let config = ParseConfig {
        require_package: true,
        loop_guard: 4,
    };
    let err = parse(source, Origin::Str, &config).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E104);
    assert_eq!(err.reason(), "infinite loop detected");

    assert!(parse(source, Origin::Str, &ParseConfig::default()).is_ok());
}

#[test]
fn test_if_init_must_be_an_assignment() {
    let err = parse_str("func f() {\n  if true;i<5 { }\n}").unwrap_err();
    assert_eq!(err.code(), ErrorCode::E103);
    assert_eq!(err.reason(), "Not an assignment");
}

#[test]
fn test_missing_package() {
    let err = parse_str_with_package("type T struct {}").unwrap_err();
    assert_eq!(err.reason(), "missing package clause");
    assert!(parse_str("type T struct {}").is_ok());
}

#[test]
fn test_invalid_identifier() {
    let err = parse_str("type 5x struct {}").unwrap_err();
    assert_eq!(err.code(), ErrorCode::E102);
    assert_eq!(err.reason(), "Invalid value '5x', must start with char");
}

#[test]
fn test_unclosed_block_is_incomplete() {
    let err = parse_str("func f() {\n  x := 1\n").unwrap_err();
    assert_eq!(err.code(), ErrorCode::E101);
}

#[test]
fn test_local_variable_is_not_a_literal() {
    let tree = parse_ok("func f() {\n  x := true\n  if x{\n    return\n  }\n}");
    let ifs = find_kind(&tree, tree.root(), "IfStmt");
    assert_eq!(ifs.len(), 1);
    let NodeKind::If(stmt) = tree.kind(ifs[0]) else {
        panic!("Expected an if");
    };
    assert_eq!(tree.text_of(stmt.cond).as_deref(), Some("x"));
    assert!(stmt.body.is_some());
}

#[test]
fn test_unknown_name_reads_a_literal() {
    let tree = parse_ok("func f() T {\n  return T{}\n}");
    let returns = find_kind(&tree, tree.root(), "ReturnDecl");
    let NodeKind::Return(ret) = tree.kind(returns[0]) else {
        panic!("Expected a return");
    };
    assert_eq!(ret.values.len(), 1);
    assert_eq!(tree.text(ret.values[0]).trim(), "T{}");
}

#[test]
fn test_parameters_are_in_scope() {
    let tree = parse_ok("func f(ok bool) {\n  if ok{\n  }\n}");
    let ifs = find_kind(&tree, tree.root(), "IfStmt");
    let NodeKind::If(stmt) = tree.kind(ifs[0]) else {
        panic!("Expected an if");
    };
    assert_eq!(tree.text_of(stmt.cond).as_deref(), Some("ok"));
}

#[test]
fn test_func_parts() {
    let tree = parse_ok("func (t *Todos) Find(name string, n int) (Todo, bool) {\n  return Todo{}, false\n}");
    let funcs = tree.find_funcs();
    assert_eq!(funcs.len(), 1);
    assert!(tree.is_method(funcs[0]));
    assert_eq!(tree.receiver_type(funcs[0]).as_deref(), Some("*Todos"));
    assert_eq!(tree.name_of(funcs[0]).as_deref(), Some("Find"));
    assert_eq!(tree.args_names(funcs[0]), vec!["name", "n"]);
    assert_eq!(tree.out_text(funcs[0]), "(Todo, bool)");
}

#[test]
fn test_grouped_parameters_share_their_type() {
    let tree = parse_ok("func (t Todo) Add(a, b int, label string) int {\n  return a + b\n}");
    let func = tree.find_funcs()[0];
    assert_eq!(tree.args_names(func), vec!["a", "b", "label"]);

    let types: Vec<_> = tree
        .args_block(func)
        .into_iter()
        .map(|prop| tree.prop_type(prop))
        .collect();
    assert_eq!(
        types,
        vec![Some("int".to_string()), Some("int".to_string()), Some("string".to_string())]
    );
    assert_eq!(tree.text(tree.root()), "func (t Todo) Add(a, b int, label string) int {\n  return a + b\n}");
}

#[test]
fn test_unnamed_parameters_stay_types() {
    let tree = parse_ok("func f(int, error) {\n}");
    let func = tree.find_funcs()[0];
    assert!(tree.args_names(func).is_empty());
    let types: Vec<_> = tree
        .args_block(func)
        .into_iter()
        .filter_map(|prop| tree.prop_type(prop))
        .collect();
    assert_eq!(types, vec!["int", "error"]);
}

#[test]
fn test_grouped_parameters_are_in_scope() {
    let tree = parse_ok("func f(ok, done bool) {\n  if ok{\n  }\n}");
    let ifs = find_kind(&tree, tree.root(), "IfStmt");
    let NodeKind::If(stmt) = tree.kind(ifs[0]) else {
        panic!("Expected an if");
    };
    assert_eq!(tree.text_of(stmt.cond).as_deref(), Some("ok"));
}

#[test]
fn test_for_forms() {
    let source = "func f() {\n  for {\n  }\n  for x < 5 {\n  }\n  for i := 0; i < 5; i++ {\n  }\n  for i, v := range items {\n  }\n}";
    let tree = parse_ok(source);
    let loops = find_kind(&tree, tree.root(), "ForStmt");
    assert_eq!(loops.len(), 4);
    let data: Vec<_> = loops
        .iter()
        .map(|&id| match tree.kind(id) {
            NodeKind::For(stmt) => stmt.clone(),
            _ => unreachable!(),
        })
        .collect();
    assert!(data[0].cond.is_none() && data[0].range.is_none());
    assert_eq!(tree.text_of(data[1].cond).as_deref(), Some("x < 5"));
    assert_eq!(tree.text_of(data[2].post).as_deref(), Some("i++"));
    assert_eq!(tree.text_of(data[3].range).as_deref(), Some("items"));
    assert_eq!(tree.declared_names(data[3].init.expect("range init")), vec!["i", "v"]);
    assert_eq!(tree.text(tree.root()), source);
}

#[test]
fn test_if_else_chain() {
    let source = "func f(a int) {\n  if v := a; v > 1 {\n    a++\n  } else if a == 0 {\n  } else {\n    defer close()\n  }\n}";
    let tree = parse_ok(source);
    let ifs = find_kind(&tree, tree.root(), "IfStmt");
    assert_eq!(ifs.len(), 2);
    let NodeKind::If(first) = tree.kind(ifs[0]) else {
        panic!("Expected an if");
    };
    assert!(first.init.is_some());
    assert!(first.else_.is_some());
    assert_eq!(tree.text(tree.root()), source);
}

#[test]
fn test_interface_and_alias() {
    let tree = parse_ok("type Reader interface {\n  io.Closer\n  Read(p []byte) (n int, err error)\n}\ntype ID = string\ntype Names []string\n");
    let interfaces = tree.find_interfaces();
    assert_eq!(interfaces.len(), 1);
    let NodeKind::Interface(iface) = tree.kind(interfaces[0]) else {
        panic!("Expected an interface");
    };
    let NodeKind::SignsBlock(signs) = tree.kind(iface.block.expect("interface block")) else {
        panic!("Expected a signs block");
    };
    assert_eq!(signs.signs.len(), 1);
    assert_eq!(signs.underlying.len(), 1);

    let aliases = tree.find_aliases();
    assert_eq!(aliases.len(), 2);
    assert_eq!(tree.name_of(aliases[0]).as_deref(), Some("ID"));
    let NodeKind::Alias(alias) = tree.kind(aliases[1]) else {
        panic!("Expected an alias");
    };
    assert_eq!(tree.text_of(alias.target).as_deref(), Some("[]string"));
}

#[test]
fn test_imports() {
    let tree = parse_str_with_package("package main\n\nimport \"fmt\"\nimport (\n  \"os\"\n  str \"strings\"\n)\n").unwrap();
    assert_eq!(tree.find_imports().len(), 2);
    assert_eq!(tree.find_packages().len(), 1);
    assert_eq!(tree.name_of(tree.find_packages()[0]).as_deref(), Some("main"));
}

#[test]
fn test_implements_decl() {
    let tree = parse_ok("type Todos implements<:Mutexed (Slice .Todo \"Name\")> {\n  // a list\n}\n");
    let implements = tree.find_implements();
    assert_eq!(implements.len(), 1);
    assert_eq!(tree.name_of(implements[0]).as_deref(), Some("Todos"));
    let NodeKind::Implements(decl) = tree.kind(implements[0]) else {
        panic!("Expected an implements declaration");
    };
    let template = decl.template.expect("implements has a template");
    assert_eq!(tree.template_inner_text(template), "Mutexed (Slice .Todo \"Name\")");
}

#[test]
fn test_template_decl_and_methods() {
    let source = "template <:.Name>Slice struct {\n  items []<:.Name>\n}\n\n<:range $a := .Args> func (m <:$.Name>Slice) FindBy<:$a>(<:$a> <:$.ArgType $a>) (<:$.Name>,bool) {\n  return <:$.Name>{}, false\n}\n\nfunc (s <:.Name>Slice) Push(item <:.Name>) int {\n  s.items = append(s.items, item)\n  return len(s.items)\n}\n\n<:define> func helper(x int) {\n}\n";
    let tree = parse_ok(source);
    let templates = tree.find_templates();
    assert_eq!(templates.len(), 1);
    assert_eq!(tree.slug_of(templates[0]).as_deref(), Some("Slice"));

    let template_funcs = tree.find_template_funcs();
    assert_eq!(template_funcs.len(), 2);
    assert_eq!(tree.modifier_text(template_funcs[0]).as_deref(), Some("range $a := .Args"));
    assert_eq!(tree.receiver_type(template_funcs[1]).as_deref(), Some("<:.Name>Slice"));

    assert_eq!(tree.find_define_funcs().len(), 1);
    assert!(tree.find_funcs().is_empty());
    assert_eq!(tree.text(tree.root()), source);
}

#[test]
fn test_poireau_marker() {
    let tree = parse_ok("type Host struct {\n  *poireau<:Mutexed .Todo>\n  Name string\n}\n");
    let NodeKind::Struct(strukt) = tree.kind(tree.find_structs()[0]) else {
        panic!("Expected a struct");
    };
    let NodeKind::PropsBlock(block) = tree.kind(strukt.block.expect("struct block")) else {
        panic!("Expected a props block");
    };
    assert_eq!(block.poireaux.len(), 1);
    assert_eq!(block.props.len(), 1);
    let NodeKind::Poireau(poireau) = tree.kind(block.poireaux[0]) else {
        panic!("Expected a poireau");
    };
    assert!(poireau.pointer);
}

#[test]
fn test_comments_attach_to_declarations() {
    let tree = parse_ok("// unrelated\n\n// a todo\ntype Todo struct {}\n");
    let todo = tree.find_structs()[0];
    assert!(tree.text(todo).starts_with("// a todo\ntype Todo"));
    assert!(!tree.text(todo).contains("unrelated"));
}

#[test]
fn test_demo_round_trip() {
    let tree = parse(DEMO, Origin::File("demo.gigo.go".into()), &ParseConfig::default()).unwrap();
    assert_eq!(tree.text(tree.root()), DEMO);
    assert_eq!(tree.find_templates().len(), 2);
    assert_eq!(tree.find_implements().len(), 1);
    assert_eq!(tree.find_symbols("Todo").len(), 1);
}

fn fragment() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "type Todo struct {\n  Name string\n  Done bool\n}\n",
        "var x = \"content\"\n",
        "const (\n  A = iota\n  B\n)\n",
        "func (t *Todo) Hello() {\n  fmt.Println(\"Hello\")\n}\n",
        "func f(n int) int {\n  for i := 0; i < n; i++ {\n    n += i\n  }\n  return n\n}\n",
        "// a comment\n",
        "/* a block\n comment */\n",
        "type Todos implements<:Mutexed .Todo> {\n}\n",
        "template Mutexed<:.Name> struct {\n  lock *sync.Mutex\n  embed <:.Name>\n}\n",
        "\n",
    ])
}

proptest! {
    #[test]
    fn test_text_round_trip(fragments in prop::collection::vec(fragment(), 0..8)) {
        let source = format!("package main\n\n{}", fragments.concat());
        let tree = parse_str_with_package(&source).unwrap();
        prop_assert_eq!(tree.text(tree.root()), source);
    }

    #[test]
    fn test_reparse_is_idempotent(fragments in prop::collection::vec(fragment(), 0..8)) {
        let source = fragments.concat();
        let first = parse_str(&source).unwrap();
        let second = parse_str(&first.text(first.root())).unwrap();
        prop_assert_eq!(second.text(second.root()), first.text(first.root()));
        prop_assert_eq!(second.declarations().len(), first.declarations().len());
    }
}
