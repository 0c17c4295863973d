//! Integration tests for the Gigo builder API
//!
//! These tests verify that the public API works and is usable.

use std::fs;

use gigo::{
    Gigo, GigoError, MutationError, Origin,
    config::{AppConfig, MutationConfig, ParserConfig},
};
use tempfile::tempdir;

const TEMPLATED: &str = r#"package main

type Todo struct {
  Name string
}

type Todos implements<:Slice .Todo> {
}

template <:.Name>Slice struct {
  items []<:.Name>
}

func (s *<:.Name>Slice) Len() int {
  return len(s.items)
}
"#;

#[test]
fn test_builder_api_exists() {
    let gigo = Gigo::new(AppConfig::default());
    assert_eq!(gigo.config().mutation().max_depth(), 32);
}

#[test]
fn test_parse_source_round_trips() {
    let source = "package main\n\nvar a = 1 // one\n";
    let result = Gigo::default().parse_source(source);
    let tree = result.expect("Should parse valid source");
    assert_eq!(tree.text(tree.root()), source);
}

#[test]
fn test_parse_string_accepts_snippets() {
    let tree = gigo::parse_string("type Todo struct {}\n").unwrap();
    assert_eq!(tree.find_structs().len(), 1);
    assert!(Gigo::default().parse_source("type Todo struct {}\n").is_err());
}

#[test]
fn test_parse_file_keeps_origin() {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("todo.gigo.go");
    fs::write(&path, TEMPLATED).unwrap();

    let tree = gigo::parse_file(&path).unwrap();
    assert_eq!(tree.origin(), &Origin::File(path.clone()));
    assert_eq!(tree.find_templates().len(), 1);
    assert_eq!(tree.find_implements().len(), 1);
}

#[test]
fn test_parse_file_missing_is_io_error() {
    let dir = tempdir().expect("Failed to create temp directory");
    let result = gigo::parse_file(dir.path().join("nope.gigo.go"));
    assert!(matches!(result, Err(GigoError::Io(_))));
}

#[test]
fn test_generate_file() {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("todo.gigo.go");
    fs::write(&path, TEMPLATED).unwrap();

    let out = Gigo::default().generate_file(&path).unwrap();
    assert!(out.contains("type TodoSlice struct {\n  items []Todo\n}"), "{out}");
    assert!(out.contains("func (s *TodoSlice) Len() int"), "{out}");
    assert!(out.contains("type Todos struct {\n\tTodoSlice\n"), "{out}");
    assert!(!out.contains("<:"), "{out}");
    assert!(!out.contains("template"), "{out}");
}

#[test]
fn test_mutate_output_parses_again() {
    let tree = Gigo::default().parse_source(TEMPLATED).unwrap();
    let mutated = gigo::mutate(tree).unwrap();
    let text = mutated.text(mutated.root());

    let again = Gigo::default().parse_source(&text).unwrap();
    assert_eq!(again.text(again.root()), text);
    assert_eq!(again.find_symbols("TodoSlice").len(), 1);
}

#[test]
fn test_builder_with_config() {
    let config = AppConfig::new(ParserConfig::new(10_000, false), MutationConfig::new(8));
    let gigo = Gigo::new(config);

    let tree = gigo.parse_source("type Todo struct {}\n").unwrap();
    let mutated = gigo.mutate(tree).unwrap();
    assert_eq!(mutated.text(mutated.root()), "type Todo struct {}\n");
}

#[test]
fn test_parse_invalid_syntax_returns_error() {
    let result = gigo::parse_string("type tomate struct qsdqd{}");
    assert!(
        matches!(result, Err(GigoError::Syntax(_))),
        "Should return a syntax error"
    );
}

#[test]
fn test_orphan_template_method_is_an_error() {
    let source = "package main\n\nfunc (s *<:.Name>Nowhere) Len() int {\n  return 0\n}\n";
    let tree = Gigo::default().parse_source(source).unwrap();
    let err = gigo::mutate(tree).unwrap_err();
    assert!(matches!(
        err,
        GigoError::Mutation(MutationError::OrphanTemplateMethod { .. })
    ));
}
