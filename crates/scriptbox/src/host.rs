use rhai::{Dynamic, Engine, EvalAltResult, Position};
use serde::{Deserialize, Serialize};

/// API surface that a host exposes to scripts.
///
/// `register` is where the host installs its capabilities on the engine:
/// free functions, custom types reachable by short name
/// (`Engine::register_type_with_name`), and whole modules. Functions
/// registered here re-enter host code synchronously when a script calls
/// them, and may fail with a [`HostException`] that travels back to the
/// embedding caller unmodified.
pub trait HostApi: Send + Sync + 'static {
    /// Register functions, types, and modules on the engine.
    fn register(&self, _engine: &mut Engine) {}

    /// Callback invoked when the script prints.
    fn on_print(&self, text: &str) {
        tracing::info!(target: "scriptbox::script", "{text}");
    }

    /// Callback invoked when the script emits debug output.
    fn on_debug(&self, text: &str, source: Option<&str>, pos: Position) {
        tracing::debug!(target: "scriptbox::script", ?source, ?pos, "{text}");
    }
}

/// A host with no script-visible API of its own. Bindings still work.
impl HostApi for () {}

/// A domain-specific exception raised by host-registered code.
///
/// When a script calls into the host and the host fails with one of these,
/// the exception is carried through the engine and handed back to the
/// embedding caller exactly as raised, never rewritten into the generic
/// script error taxonomy. `kind` identifies the host's own error
/// category; `details` is an optional structured payload.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct HostException {
    /// Host-defined error category.
    pub kind: String,
    /// Human-readable message.
    pub message: String,
    /// Optional structured payload.
    pub details: Option<serde_json::Value>,
}

impl HostException {
    /// Create a new exception with the given category and message.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Attach a structured payload.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convert into the error shape a registered host function returns.
    ///
    /// The exception rides inside the engine error as an opaque value, which
    /// is how the error translator recognizes it and passes it through
    /// untouched.
    pub fn into_eval_error(self) -> Box<EvalAltResult> {
        Box::new(EvalAltResult::ErrorRuntime(
            Dynamic::from(self),
            Position::NONE,
        ))
    }
}
