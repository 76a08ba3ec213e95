#![warn(missing_docs)]

//! Embeddable script execution with host bindings, module resolution, and
//! a wall-clock budget.
//!
//! A host hands [`ScriptExecutor::evaluate`] source text, a diagnostics
//! filename, and named [`bindings`](ScriptBindings); the script runs in a
//! fresh, isolated engine and the call returns either the script's final
//! expression value or one structured [`ScriptError`]. Scripts may `import`
//! modules resolved from configured directories and compiled once into a
//! cache shared across runs, and may call host capabilities registered
//! through [`HostApi`], whose domain failures ([`HostException`]) travel
//! back to the embedding caller unmodified.
//!
//! ```no_run
//! use std::sync::Arc;
//! use scriptbox::{ScriptBindings, ScriptConfig, ScriptExecutor};
//!
//! let mut executor = ScriptExecutor::new(Arc::new(()), ScriptConfig::new("scripts"));
//! executor.set_time_limit(5_000);
//!
//! let mut bindings = ScriptBindings::new();
//! bindings.insert("radius".into(), 12i64.into());
//!
//! let value = executor
//!     .evaluate("radius * 2".as_bytes(), "double.rhai", bindings)
//!     .expect("script runs");
//! assert_eq!(value.as_int().unwrap(), 24);
//! ```

mod bindings;
mod config;
mod engine;
mod error;
mod executor;
mod host;
mod resolver;
pub mod testutils;

pub use bindings::{BindingValue, ScriptBindings};
pub use config::ScriptConfig;
pub use error::{ScriptError, ScriptErrorInfo, ScriptResult};
pub use executor::ScriptExecutor;
pub use host::{HostApi, HostException};
pub use resolver::PathModuleResolver;

// Re-export the underlying engine for hosts implementing `HostApi`.
pub use rhai;
pub use rhai::Dynamic;
