//! The mutation engine: template expansion over a parsed tree.
//!
//! A run prepares the tree, evaluates it as one template, then parses the
//! result again:
//!
//! 1. implements declarations are replaced by placeholders;
//! 2. template declarations are removed and become type mutators, called
//!    from templates by their slug name (`Mutexed`, `Slice`);
//! 3. templated funcs are removed and attached to their template;
//! 4. `define` funcs are removed and become helpers;
//! 5. plain methods are attached to the struct and implements declarations
//!    of their receiver;
//! 6. poireau markers and then comments are replaced by placeholders;
//! 7. the serialized tree is evaluated with the plain structs and
//!    `GetResult` as dot, each placeholder expanding on first use;
//! 8. the evaluated text is parsed into a fresh tree.

mod expander;
mod mutator;
mod placeholder;
mod snapshot;

use std::rc::Rc;

use gigo_core::{NodeId, NodeKind, TokenKind, Tree, slug_name};
use gigo_parser::ParseConfig;
use indexmap::IndexMap;
use log::{debug, info};

use crate::{
    config::AppConfig,
    error::{GigoError, MutationError},
};
use expander::{Expander, Parts};
use mutator::{Helper, TypeMutator};
use placeholder::Placeholder;
use snapshot::StructValue;

/// Set every template delimiter under `id` to `<:` and `:>`.
pub(crate) fn set_delimiters(tree: &mut Tree, id: NodeId) {
    tree.set_token_value(id, TokenKind::TplOpen, "<:");
    tree.set_token_value(id, TokenKind::TplClose, ":>");
}

/// Expand every template construct of `tree`.
///
/// # Errors
///
/// Returns a [`GigoError::Template`] when a template fails to parse or
/// execute, a [`GigoError::Syntax`] when generated code does not parse, and
/// a [`GigoError::Mutation`] for orphan template methods, runaway
/// recursion and mutators generating no struct.
pub fn mutate(mut tree: Tree, config: &AppConfig) -> Result<Tree, GigoError> {
    info!(origin:% = tree.origin(), declarations = tree.declarations().len(); "Mutating tree");
    let has_package = !tree.find_packages().is_empty();
    let mut placeholders = IndexMap::new();

    let implements = placehold_implements(&mut tree, &mut placeholders)?;
    let templates = tree.find_templates();
    for &decl in &templates {
        tree.remove_line(decl)?;
    }
    attach_template_funcs(&mut tree, &templates)?;
    let mut mutators = IndexMap::new();
    for decl in templates {
        let mutator = TypeMutator::from_tree(&mut tree, decl);
        debug!(mutator = mutator.name(), methods = tree.methods_of(decl).len(); "Registered mutator");
        mutators.insert(mutator.name().to_string(), mutator);
    }
    let helpers = register_helpers(&mut tree)?;
    attach_methods(&mut tree, &implements);
    placehold_poireaux(&mut tree, &mut placeholders)?;
    placehold_comments(&mut tree, &mut placeholders)?;
    let root = tree.root();
    set_delimiters(&mut tree, root);

    let structs: IndexMap<String, Rc<StructValue>> = tree
        .find_structs()
        .into_iter()
        .map(|strukt| StructValue::from_tree(&tree, strukt))
        .filter(|strukt| !strukt.name().is_empty())
        .map(|strukt| (strukt.name().to_string(), Rc::new(strukt)))
        .collect();
    info!(
        mutators = mutators.len(),
        helpers = helpers.len(),
        structs = structs.len(),
        placeholders = placeholders.len();
        "Evaluating tree"
    );

    let parts = Parts {
        mutators,
        helpers,
        structs,
        placeholders,
    };
    let expander = Expander::new(parts, config.mutation().max_depth(), config.parser().for_snippet());
    let out = expander.evaluate(&tree.name(), &tree.text(root))?;

    let reparse = ParseConfig {
        require_package: has_package,
        loop_guard: config.parser().loop_guard(),
    };
    let mutated = gigo_parser::parse(&out, tree.origin().clone(), &reparse)?;
    info!(bytes = out.len(); "Mutated tree");
    Ok(mutated)
}

/// Replace each implements declaration by a placeholder, keeping its text.
fn placehold_implements(
    tree: &mut Tree,
    placeholders: &mut IndexMap<String, Placeholder>,
) -> Result<Vec<NodeId>, GigoError> {
    let implements = tree.find_implements();
    for (index, &decl) in implements.iter().enumerate() {
        let name = placeholder::implements_name(index);
        let text = tree.text(decl);
        placeholder::substitute(tree, decl, &name)?;
        debug!(placeholder = name.as_str(), implements:? = tree.name_of(decl); "Placed implements");
        placeholders.insert(name, Placeholder::Implements(text));
    }
    Ok(implements)
}

/// Detach templated funcs and attach each to the template of its receiver.
fn attach_template_funcs(tree: &mut Tree, templates: &[NodeId]) -> Result<(), GigoError> {
    for func in tree.find_template_funcs() {
        tree.remove_line(func)?;
        let receiver = tree
            .receiver_type(func)
            .map(|receiver| slug_name(&receiver))
            .unwrap_or_default();
        let owner = templates
            .iter()
            .copied()
            .find(|&decl| tree.slug_of(decl).is_some_and(|slug| slug == receiver));
        let Some(owner) = owner else {
            return Err(MutationError::OrphanTemplateMethod {
                method: tree.name_of(func).unwrap_or_default(),
                receiver,
            }
            .into());
        };
        tree.attach_method(owner, func);
    }
    Ok(())
}

fn register_helpers(tree: &mut Tree) -> Result<IndexMap<String, Helper>, GigoError> {
    let mut helpers = IndexMap::new();
    for decl in tree.find_define_funcs() {
        tree.remove_line(decl)?;
        let helper = Helper::from_tree(tree, decl);
        debug!(helper = helper.name(); "Registered helper");
        helpers.insert(helper.name().to_string(), helper);
    }
    Ok(helpers)
}

/// Attach plain methods to the structs and implements declarations named
/// by their receiver. Methods stay in place in the tree.
fn attach_methods(tree: &mut Tree, implements: &[NodeId]) {
    let owners: Vec<NodeId> = tree
        .find_structs()
        .into_iter()
        .chain(implements.iter().copied())
        .collect();
    for func in tree.find_funcs() {
        if !tree.is_method(func) {
            continue;
        }
        let Some(receiver) = tree.receiver_type(func).map(|receiver| slug_name(&receiver)) else {
            continue;
        };
        let owner = owners
            .iter()
            .copied()
            .find(|&owner| tree.slug_of(owner).is_some_and(|slug| slug == receiver));
        if let Some(owner) = owner {
            tree.attach_method(owner, func);
        }
    }
}

/// Replace each poireau marker of a plain struct by a placeholder.
fn placehold_poireaux(
    tree: &mut Tree,
    placeholders: &mut IndexMap<String, Placeholder>,
) -> Result<(), GigoError> {
    let mut index = 0;
    for strukt in tree.find_structs() {
        let Some(host) = tree.name_of(strukt) else {
            continue;
        };
        let block = match tree.kind(strukt) {
            NodeKind::Struct(decl) => decl.block,
            _ => None,
        };
        let poireaux = match block.map(|block| tree.kind(block)) {
            Some(NodeKind::PropsBlock(props)) => props.poireaux.clone(),
            _ => Vec::new(),
        };
        for poireau in poireaux {
            let NodeKind::Poireau(decl) = tree.kind(poireau) else {
                continue;
            };
            let pointer = decl.pointer;
            let expr = decl
                .template
                .map(|template| tree.template_inner_text(template))
                .unwrap_or_default();
            let name = placeholder::poireau_name(index);
            index += 1;
            placeholder::substitute(tree, poireau, &name)?;
            debug!(placeholder = name.as_str(), host = host.as_str(), expr = expr.as_str(); "Placed poireau");
            placeholders.insert(
                name,
                Placeholder::Poireau {
                    host: host.clone(),
                    expr,
                    pointer,
                },
            );
        }
    }
    Ok(())
}

/// Replace comments by placeholders so their content is never evaluated.
fn placehold_comments(
    tree: &mut Tree,
    placeholders: &mut IndexMap<String, Placeholder>,
) -> Result<(), GigoError> {
    for (kind, prefix) in [
        (TokenKind::CommentBlock, "blockcomments"),
        (TokenKind::CommentLine, "linecomments"),
    ] {
        for (index, comment) in tree.find_tokens(kind).into_iter().enumerate() {
            let name = placeholder::comment_name(prefix, index);
            let text = tree.text(comment);
            placeholder::substitute(tree, comment, &name)?;
            placeholders.insert(name, Placeholder::Comment(text));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use gigo_parser::parse_str_with_package;

    use super::*;
    use crate::config::{MutationConfig, ParserConfig};

    fn demo(name: &str) -> String {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos").join(name);
        fs::read_to_string(path).unwrap()
    }

    fn run(source: &str) -> Result<Tree, GigoError> {
        mutate(parse_str_with_package(source).unwrap(), &AppConfig::default())
    }

    fn text(tree: &Tree) -> String {
        tree.text(tree.root())
    }

    #[test]
    fn test_implements_expansion() {
        let tree = run(&demo("demo.gigo.go")).unwrap();
        let out = text(&tree);

        assert!(out.contains("type TodoSlice struct {\n  items []Todo\n}"));
        assert!(out.contains("func (m TodoSlice) FindByName(Name string) (Todo,bool) {"));
        assert!(out.contains("func (s TodoSlice) Push(item Todo) int {"));
        assert!(out.contains("type MutexedTodoSlice struct {"));
        assert!(out.contains("func (m MutexedTodoSlice) Push(item Todo) int {"));
        assert!(out.contains("m.embed.Push(item)"));
        assert!(out.contains("type Todos struct {\n\tMutexedTodoSlice\n"));
        assert!(!out.contains("<:"));

        for name in ["Todo", "TodoSlice", "MutexedTodoSlice", "Todos"] {
            assert!(!tree.find_symbols(name).is_empty(), "missing {name}");
        }
        assert!(tree.find_templates().is_empty());
    }

    #[test]
    fn test_generated_types_precede_implementing_type() {
        let out = text(&run(&demo("demo.gigo.go")).unwrap());
        let slice = out.find("type TodoSlice struct").unwrap();
        let mutexed = out.find("type MutexedTodoSlice struct").unwrap();
        let todos = out.find("type Todos struct").unwrap();
        assert!(slice < mutexed && mutexed < todos);
    }

    #[test]
    fn test_comments_are_restored() {
        let out = text(&run(&demo("demo.gigo.go")).unwrap());
        assert!(out.contains("// type Todos implements<.Todo | Slice | Mutexed>\n"));
        assert!(out.contains("func (t *Todos) Hello(){fmt.Println(\"Hello\")}"));
    }

    #[test]
    fn test_plain_file_is_unchanged() {
        let source = demo("plain.gigo.go");
        let tree = run(&source).unwrap();
        assert_eq!(text(&tree), source);
    }

    #[test]
    fn test_mutation_is_deterministic() {
        let source = demo("demo.gigo.go");
        assert_eq!(text(&run(&source).unwrap()), text(&run(&source).unwrap()));
    }

    #[test]
    fn test_poireau_expansion() {
        let out = text(&run(&demo("poireau.gigo.go")).unwrap());
        assert!(out.contains("type Store struct {\n  *MutexedTodo\n  Owner string\n}"));
        assert!(out.contains("type MutexedTodo struct {"));
        assert!(out.contains("m.embed.Touch()"));
        assert!(out.find("type MutexedTodo struct").unwrap() > out.find("type Store struct").unwrap());
    }

    #[test]
    fn test_define_helper() {
        let source = "package main

type Todo struct {
  Name string
}

func (t Todo) Touch() {
}

type Todos implements<:Locked .Todo> {
}

<:define> func guard() {
  m.lock.Lock()
  defer m.lock.Unlock()
  m.before<:.Name>()
}

template Locked<:.Name> struct {
  lock sync.Mutex
  embed <:.Name>
}

<:range $m := .Methods> func (m Locked<:$.Name>) <:$m.Name>() {
  <:guard $m>
  m.embed.<:$m.Name>()
}
";
        let out = text(&run(source).unwrap());
        assert!(out.contains("func (m LockedTodo) Touch() {"));
        assert!(out.contains("defer m.lock.Unlock()"));
        assert!(out.contains("m.beforeTouch()"));
        assert!(!out.contains("guard"));
    }

    #[test]
    fn test_generated_types_keep_template_comment() {
        let tree = run(&demo("demo.gigo.go")).unwrap();
        let out = text(&tree);
        assert!(out.contains("// a template to generate a type Slice of .\ntype TodoSlice struct {"));
        assert!(out.contains("// a template to mutex .\ntype MutexedTodoSlice struct {"));
    }

    #[test]
    fn test_grouped_parameters_are_forwarded() {
        let source = "package main

type Todo struct {
  Name string
}

func (t Todo) Add(a, b int) int {
  return a + b
}

type Locked implements<:Mutexed .Todo> {
}

template Mutexed<:.Name> struct {
  embed <:.Name>
}

<:range $m := .Methods> func (m Mutexed<:$.Name>) <:$m.Name>(<:$m.GetArgsBlock | joinexpr \",\">) <:$m.Out> {
  return m.embed.<:$m.GetName>(<:$m.GetArgsNames | joinexpr \",\">)
}
";
        let out = text(&run(source).unwrap());
        assert!(out.contains("func (m MutexedTodo) Add(a int,b int) int {"), "{out}");
        assert!(out.contains("return m.embed.Add(a,b)"), "{out}");
    }

    #[test]
    fn test_same_mutation_is_generated_once() {
        let source = "package main

type Todo struct {
  Name string
}

type A implements<:Slice .Todo> {
}

type B implements<:Slice .Todo> {
}

template <:.Name>Slice struct {
  items []<:.Name>
}

func (s <:.Name>Slice) Len() int {
  return len(s.items)
}
";
        let tree = run(source).unwrap();
        let out = text(&tree);
        assert_eq!(out.matches("type TodoSlice struct").count(), 1, "{out}");
        assert_eq!(out.matches("func (s TodoSlice) Len() int").count(), 1, "{out}");
        assert!(out.contains("type A struct {\n\tTodoSlice\n}"), "{out}");
        assert!(out.contains("type B struct {\n\tTodoSlice\n}"), "{out}");
        assert_eq!(tree.find_symbols("TodoSlice").len(), 1);
    }

    #[test]
    fn test_removed_declarations_leave_no_blank_run() {
        let source = "package main

type Todo struct {
  Name string
}

template <:.Name>Slice struct {
  items []<:.Name>
}

func (s <:.Name>Slice) Len() int {
  return len(s.items)
}

<:define> func guard() {
  lock()
}

var x = 1
";
        let out = text(&run(source).unwrap());
        assert_eq!(
            out,
            "package main\n\ntype Todo struct {\n  Name string\n}\n\nvar x = 1\n"
        );
    }

    #[test]
    fn test_orphan_template_method() {
        let err = run(&demo("errors/orphan_method.gigo.go")).unwrap_err();
        let GigoError::Mutation(MutationError::OrphanTemplateMethod { receiver, .. }) = err else {
            panic!("Expected an orphan method error, got {err:?}");
        };
        assert_eq!(receiver, "Nowhere");
    }

    #[test]
    fn test_unknown_mutator() {
        let err = run(&demo("errors/unknown_mutator.gigo.go")).unwrap_err();
        let GigoError::Template(err) = err else {
            panic!("Expected a template error, got {err:?}");
        };
        assert_eq!(err.name(), "placeholder0");
        assert!(err.message().contains("function \"Unknown\" not defined"));
    }

    #[test]
    fn test_recursion_limit() {
        let source = "package main

type Todo struct {
  Name string
}

type Loop implements<:Again .Todo> {
}

template Again<:.Name> struct {
  inner <:Again .>
}
";
        let config = AppConfig::new(ParserConfig::default(), MutationConfig::new(4));
        let err = mutate(parse_str_with_package(source).unwrap(), &config).unwrap_err();
        assert!(matches!(
            err,
            GigoError::Mutation(MutationError::RecursionLimit { limit: 4, .. })
        ));
    }

    #[test]
    fn test_snippet_without_package() {
        let tree = gigo_parser::parse_str("type Todo struct {\n  Name string\n}\n").unwrap();
        let out = mutate(tree, &AppConfig::default()).unwrap();
        assert!(out.find_packages().is_empty());
        assert_eq!(out.find_structs().len(), 1);
    }
}
