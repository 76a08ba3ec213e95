use std::path::PathBuf;

/// Limits and configuration for script execution.
///
/// `search_paths` roots module resolution: `import` identifiers are looked
/// up against each path in order and the first match wins. The remaining
/// fields bound engine resources per evaluation. The wall-clock time limit
/// is not part of this struct; it lives on the executor instance and can
/// change between runs.
#[derive(Debug, Clone)]
pub struct ScriptConfig {
    /// Base directories searched for `import` identifiers, in order.
    pub search_paths: Vec<PathBuf>,
    /// Reject module resolutions that escape the search paths.
    pub sandboxed: bool,
    /// Maximum number of operations the engine may perform; `0` = unlimited.
    pub max_operations: u64,
    /// Maximum call stack depth.
    pub max_call_levels: usize,
    /// Maximum expression nesting depth.
    pub max_expr_depth: usize,
    /// Maximum depth for function expressions.
    pub max_function_expr_depth: usize,
    /// Maximum size of any string value.
    pub max_string_size: usize,
    /// Maximum size of any array.
    pub max_array_size: usize,
    /// Maximum size of any map.
    pub max_map_size: usize,
    /// Maximum number of variables in scope.
    pub max_variables: usize,
    /// Maximum number of functions allowed.
    pub max_functions: usize,
    /// Maximum number of modules that can be loaded.
    pub max_modules: usize,
}

impl ScriptConfig {
    /// Configuration rooted at a single scripts directory.
    pub fn new(scripts_dir: impl Into<PathBuf>) -> Self {
        Self {
            search_paths: vec![scripts_dir.into()],
            ..Self::default()
        }
    }
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            search_paths: Vec::new(),
            sandboxed: false,
            // Unlimited: runaway scripts are stopped by the wall clock,
            // not an operation count.
            max_operations: 0,
            max_call_levels: 64,
            max_expr_depth: 64,
            max_function_expr_depth: 32,
            max_string_size: 1_000_000,
            max_array_size: 100_000,
            max_map_size: 100_000,
            max_variables: 10_000,
            max_functions: 1_000,
            max_modules: 32,
        }
    }
}
