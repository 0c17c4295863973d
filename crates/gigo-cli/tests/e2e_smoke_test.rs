use std::{
    fs,
    path::{Path, PathBuf},
};

use log::LevelFilter;
use tempfile::tempdir;

use gigo_cli::{Args, Command, run};

/// Collects all .gigo.go files from a directory
fn collect_gigo_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .file_name()
                        .and_then(|s| s.to_str())
                        .is_some_and(|name| name.ends_with(".gigo.go"))
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

/// Demos are at workspace root, relative to workspace not the crate
fn demos_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

fn args(command: Command, files: &[&PathBuf], output: &Path) -> Args {
    Args {
        command,
        files: files
            .iter()
            .map(|path| path.to_string_lossy().to_string())
            .collect(),
        symbol: None,
        output: Some(output.to_string_lossy().to_string()),
        config: None,
        log_level: LevelFilter::Off,
    }
}

fn output_name(prefix: &str, path: &Path) -> String {
    format!(
        "{prefix}_{}.txt",
        path.file_name().unwrap().to_string_lossy()
    )
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let valid_demos = collect_gigo_files(demos_path());
    assert!(!valid_demos.is_empty(), "No valid demos found in demos/");

    let mut failed_demos = Vec::new();

    for demo_path in &valid_demos {
        let output_path = temp_dir.path().join(output_name("gen", demo_path));

        match run(&args(Command::Gen, &[demo_path], &output_path)) {
            Ok(()) => {
                let generated = fs::read_to_string(&output_path).unwrap();
                assert!(!generated.is_empty(), "{}", demo_path.display());
                assert!(
                    !generated.contains("<:"),
                    "{} still holds template actions:\n{generated}",
                    demo_path.display()
                );
            }
            Err(e) => failed_demos.push((demo_path.clone(), e)),
        }
    }

    if !failed_demos.is_empty() {
        eprintln!("\nValid demos that failed:");
        for (path, err) in &failed_demos {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} valid demo(s) failed unexpectedly", failed_demos.len());
    }

    println!("✅ All {} valid demos passed", valid_demos.len());
}

#[test]
fn e2e_smoke_test_str_reproduces_sources() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    for demo_path in collect_gigo_files(demos_path()) {
        let output_path = temp_dir.path().join(output_name("str", &demo_path));
        run(&args(Command::Str, &[&demo_path], &output_path)).unwrap();

        let source = fs::read_to_string(&demo_path).unwrap();
        let printed = fs::read_to_string(&output_path).unwrap();
        assert_eq!(printed, source, "{}", demo_path.display());
    }
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let error_demos = collect_gigo_files(demos_path().join("errors"));
    assert!(
        !error_demos.is_empty(),
        "No error demos found in demos/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for demo_path in &error_demos {
        let output_path = temp_dir.path().join(output_name("error", demo_path));

        if run(&args(Command::Gen, &[demo_path], &output_path)).is_ok() {
            unexpectedly_succeeded.push(demo_path.clone());
        }
        assert!(
            !output_path.exists(),
            "{} left partial output",
            demo_path.display()
        );
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }

    println!(
        "✅ All {} error demos failed as expected",
        error_demos.len()
    );
}

#[test]
fn e2e_multiple_files_are_processed_in_order() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let demos = demos_path();
    let plain = demos.join("plain.gigo.go");
    let demo = demos.join("demo.gigo.go");
    let output_path = temp_dir.path().join("both.txt");

    run(&args(Command::Str, &[&plain, &demo], &output_path)).unwrap();

    let expected = format!(
        "{}{}",
        fs::read_to_string(&plain).unwrap(),
        fs::read_to_string(&demo).unwrap()
    );
    assert_eq!(fs::read_to_string(&output_path).unwrap(), expected);
}

#[test]
fn e2e_symbol_lookup() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let demo = demos_path().join("demo.gigo.go");

    let output_path = temp_dir.path().join("symbol.txt");
    let mut symbol_args = args(Command::Gen, &[&demo], &output_path);
    symbol_args.symbol = Some("TodoSlice".to_string());
    run(&symbol_args).unwrap();
    let printed = fs::read_to_string(&output_path).unwrap();
    assert!(
        printed.starts_with("// a template to generate a type Slice of .\ntype TodoSlice struct"),
        "{printed}"
    );

    let output_path = temp_dir.path().join("missing.txt");
    let mut missing_args = args(Command::Str, &[&demo], &output_path);
    missing_args.symbol = Some("Nope".to_string());
    run(&missing_args).unwrap();
    assert_eq!(
        fs::read_to_string(&output_path).unwrap(),
        "No symbol found for Nope\n"
    );

    let output_path = temp_dir.path().join("dump.txt");
    let mut dump_args = args(Command::Dump, &[&demo], &output_path);
    dump_args.symbol = Some("Todo".to_string());
    run(&dump_args).unwrap();
    let printed = fs::read_to_string(&output_path).unwrap();
    assert!(printed.starts_with("-> StructDecl"), "{printed}");
}
