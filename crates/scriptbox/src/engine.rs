use std::time::Instant;

use rhai::{
    Dynamic, Engine,
    default_limits::MAX_STRINGS_INTERNED,
    packages::{Package, StandardPackage},
};

use crate::{config::ScriptConfig, error::ScriptError};

/// Operations between wall-clock samples in the timeout hook.
///
/// The progress callback fires on every engine operation; reading the clock
/// that often is wasted overhead, so the hook only samples every this many
/// operations. A timed-out script therefore overruns its budget by at most
/// one sampling interval.
pub(crate) const TIMEOUT_SAMPLE_OPS: u64 = 256;

/// Build one isolated engine for a single evaluation.
///
/// Fresh per call: nothing in the returned engine is shared with any other
/// evaluation. A nonzero `time_limit_ms` installs the wall-clock watchdog;
/// zero disables it.
pub(crate) fn build_engine(config: &ScriptConfig, time_limit_ms: u64) -> Engine {
    let mut engine = Engine::new_raw();
    engine.register_global_module(StandardPackage::new().as_shared_module());

    engine.set_max_strings_interned(MAX_STRINGS_INTERNED);
    engine.set_strict_variables(true);
    engine.set_fail_on_invalid_map_property(true);

    engine.set_max_operations(config.max_operations);
    engine.set_max_call_levels(config.max_call_levels);
    engine.set_max_expr_depths(config.max_expr_depth, config.max_function_expr_depth);
    engine.set_max_string_size(config.max_string_size);
    engine.set_max_array_size(config.max_array_size);
    engine.set_max_map_size(config.max_map_size);
    engine.set_max_variables(config.max_variables);
    engine.set_max_functions(config.max_functions);
    engine.set_max_modules(config.max_modules);

    if time_limit_ms > 0 {
        let start = Instant::now();
        engine.on_progress(move |ops| {
            if ops % TIMEOUT_SAMPLE_OPS != 0 {
                return None;
            }
            let elapsed_ms = start.elapsed().as_millis() as u64;
            if elapsed_ms > time_limit_ms {
                Some(Dynamic::from(ScriptError::Timeout {
                    limit_ms: time_limit_ms,
                    elapsed_ms,
                }))
            } else {
                None
            }
        });
    }

    engine
}
