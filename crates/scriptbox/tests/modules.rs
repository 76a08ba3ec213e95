//! Module resolution: search order, the shared compiled-module cache, and
//! the sandbox switch.

use std::sync::Arc;

use scriptbox::{
    ScriptBindings, ScriptConfig, ScriptError, ScriptExecutor,
    testutils::{RecordingHost, scripts_dir},
};

#[test]
fn import_calls_into_a_resolved_module() {
    let dir = scripts_dir(&[("util.rhai", "fn double(x) { x * 2 }")]);
    let executor = ScriptExecutor::new(Arc::new(()), ScriptConfig::new(dir.path()));
    let result = executor
        .evaluate(
            r#"import "util" as u; u::double(21)"#.as_bytes(),
            "main.rhai",
            ScriptBindings::new(),
        )
        .expect("script runs");
    assert_eq!(result.as_int().unwrap(), 42);
}

#[test]
fn module_initializer_runs_once_across_runs() {
    let dir = scripts_dir(&[("counter.rhai", r#"print("init"); export const READY = true;"#)]);
    let host = Arc::new(RecordingHost::default());
    let executor = ScriptExecutor::new(Arc::clone(&host), ScriptConfig::new(dir.path()));

    for _ in 0..2 {
        let result = executor
            .evaluate(
                r#"import "counter" as c; c::READY"#.as_bytes(),
                "main.rhai",
                ScriptBindings::new(),
            )
            .expect("script runs");
        assert!(result.as_bool().unwrap());
    }

    assert_eq!(host.printed(), vec!["init".to_string()]);
}

#[test]
fn cache_is_keyed_by_resolved_file_not_request_string() {
    let dir = scripts_dir(&[("util.rhai", r#"print("compiled"); export const N = 7;"#)]);
    let host = Arc::new(RecordingHost::default());
    let executor = ScriptExecutor::new(Arc::clone(&host), ScriptConfig::new(dir.path()));

    for request in [r#"import "util" as u; u::N"#, r#"import "./util" as u; u::N"#] {
        let result = executor
            .evaluate(request.as_bytes(), "main.rhai", ScriptBindings::new())
            .expect("script runs");
        assert_eq!(result.as_int().unwrap(), 7);
    }

    // Two lookup strings, one canonical file, one compilation.
    assert_eq!(host.printed(), vec!["compiled".to_string()]);
}

#[test]
fn first_search_path_wins() {
    let first = scripts_dir(&[("helper.rhai", "export const ORIGIN = 1;")]);
    let second = scripts_dir(&[("helper.rhai", "export const ORIGIN = 2;")]);

    let config = ScriptConfig {
        search_paths: vec![first.path().to_path_buf(), second.path().to_path_buf()],
        ..ScriptConfig::default()
    };
    let executor = ScriptExecutor::new(Arc::new(()), config);
    let result = executor
        .evaluate(
            r#"import "helper" as h; h::ORIGIN"#.as_bytes(),
            "main.rhai",
            ScriptBindings::new(),
        )
        .expect("script runs");
    assert_eq!(result.as_int().unwrap(), 1);
}

#[test]
fn missing_module_is_a_script_level_error() {
    let dir = scripts_dir(&[]);
    let executor = ScriptExecutor::new(Arc::new(()), ScriptConfig::new(dir.path()));
    let result = executor.evaluate(
        r#"import "nowhere" as n;"#.as_bytes(),
        "main.rhai",
        ScriptBindings::new(),
    );
    match result {
        Err(ScriptError::Runtime { message, .. }) => {
            assert!(message.contains("nowhere"), "message: {message}");
        }
        other => panic!("expected runtime error, got {other:?}"),
    }
}

#[test]
fn unsandboxed_resolution_may_escape_the_scripts_dir() {
    let root = scripts_dir(&[
        ("secret.rhai", "export const LEAK = 99;"),
        ("scripts/placeholder.rhai", ""),
    ]);
    let executor = ScriptExecutor::new(
        Arc::new(()),
        ScriptConfig::new(root.path().join("scripts")),
    );
    let result = executor
        .evaluate(
            r#"import "../secret" as s; s::LEAK"#.as_bytes(),
            "main.rhai",
            ScriptBindings::new(),
        )
        .expect("traversal resolves by default");
    assert_eq!(result.as_int().unwrap(), 99);
}

#[test]
fn sandboxed_resolution_rejects_traversal() {
    let root = scripts_dir(&[
        ("secret.rhai", "export const LEAK = 99;"),
        ("scripts/placeholder.rhai", ""),
    ]);
    let config = ScriptConfig {
        sandboxed: true,
        ..ScriptConfig::new(root.path().join("scripts"))
    };
    let executor = ScriptExecutor::new(Arc::new(()), config);
    let result = executor.evaluate(
        r#"import "../secret" as s; s::LEAK"#.as_bytes(),
        "main.rhai",
        ScriptBindings::new(),
    );
    assert!(matches!(result, Err(ScriptError::Runtime { .. })));
}

#[test]
fn module_caches_are_per_executor() {
    let dir = scripts_dir(&[("once.rhai", r#"print("build"); export const OK = true;"#)]);

    let host_a = Arc::new(RecordingHost::default());
    let executor_a = ScriptExecutor::new(Arc::clone(&host_a), ScriptConfig::new(dir.path()));
    executor_a
        .evaluate(
            r#"import "once" as o; o::OK"#.as_bytes(),
            "main.rhai",
            ScriptBindings::new(),
        )
        .expect("script runs");

    let host_b = Arc::new(RecordingHost::default());
    let executor_b = ScriptExecutor::new(Arc::clone(&host_b), ScriptConfig::new(dir.path()));
    executor_b
        .evaluate(
            r#"import "once" as o; o::OK"#.as_bytes(),
            "main.rhai",
            ScriptBindings::new(),
        )
        .expect("script runs");

    // A fresh executor has a fresh cache and recompiles.
    assert_eq!(host_a.printed(), vec!["build".to_string()]);
    assert_eq!(host_b.printed(), vec!["build".to_string()]);
}
