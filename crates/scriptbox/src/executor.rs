use std::{io::Read, sync::Arc};

use rhai::{Dynamic, Scope};
use tracing::debug;

use crate::{
    bindings::{ScriptBindings, inject},
    config::ScriptConfig,
    engine::build_engine,
    error::{ScriptError, ScriptResult, translate},
    host::HostApi,
    resolver::{ModuleCache, PathModuleResolver},
};

/// Executes scripts against a host API under a wall-clock budget.
///
/// Every [`evaluate`](Self::evaluate) call runs in a fresh engine and scope,
/// so concurrent calls on one executor never observe each other's state. The
/// only thing evaluations share is the compiled-module cache, which supports
/// concurrent population. The time limit is instance configuration: changing
/// it affects subsequent calls, never calls already in flight.
pub struct ScriptExecutor<A> {
    api: Arc<A>,
    config: ScriptConfig,
    time_limit_ms: u64,
    modules: ModuleCache,
}

impl<A: HostApi> ScriptExecutor<A> {
    /// Create a new executor with the provided host API and configuration.
    pub fn new(api: Arc<A>, config: ScriptConfig) -> Self {
        Self {
            api,
            config,
            time_limit_ms: 0,
            modules: ModuleCache::default(),
        }
    }

    /// Set the wall-clock budget in milliseconds; `0` means unlimited.
    pub fn set_time_limit(&mut self, milliseconds: u64) {
        self.time_limit_ms = milliseconds;
    }

    /// The current wall-clock budget in milliseconds; `0` means unlimited.
    pub fn time_limit(&self) -> u64 {
        self.time_limit_ms
    }

    /// The configuration this executor was built with.
    pub fn config(&self) -> &ScriptConfig {
        &self.config
    }

    /// Evaluate a script and return its final expression value.
    ///
    /// `filename` is used purely for diagnostics. The source reader is
    /// consumed and released on every exit path. On failure the result is
    /// exactly one [`ScriptError`]; a [`HostException`](crate::HostException)
    /// raised by host-registered code comes back unchanged inside
    /// [`ScriptError::Host`].
    pub fn evaluate(
        &self,
        mut source: impl Read,
        filename: &str,
        bindings: ScriptBindings,
    ) -> ScriptResult<Dynamic> {
        let mut text = String::new();
        source
            .read_to_string(&mut text)
            .map_err(|err| ScriptError::Fatal(format!("failed to read {filename}: {err}")))?;
        drop(source);

        let limit_ms = self.time_limit_ms;
        let mut engine = build_engine(&self.config, limit_ms);
        engine.set_module_resolver(PathModuleResolver::with_cache(
            self.config.search_paths.clone(),
            self.config.sandboxed,
            Arc::clone(&self.modules),
        ));

        self.api.register(&mut engine);
        let api = Arc::clone(&self.api);
        engine.on_print(move |text| api.on_print(text));
        let api = Arc::clone(&self.api);
        engine.on_debug(move |text, source, pos| api.on_debug(text, source, pos));

        let mut scope = Scope::new();
        inject(&mut scope, bindings)?;

        // Compile against the scope so strict-variables checking sees the
        // injected bindings. Positions start at line 1 of `text`.
        let mut ast = engine
            .compile_with_scope(&scope, &text)
            .map_err(|err| ScriptError::from_parse_error(err, filename))?;
        ast.set_source(filename);

        debug!(filename, limit_ms, "evaluating script");
        engine
            .eval_ast_with_scope::<Dynamic>(&mut scope, &ast)
            .map_err(|err| translate(err, filename, limit_ms))
    }
}
