use rhai::EvalAltResult;
use serde::{Deserialize, Serialize};

use crate::host::HostException;

/// Result type for script execution.
pub type ScriptResult<T> = Result<T, ScriptError>;

/// Errors that can occur while evaluating a script.
///
/// Every failure an evaluation can produce is normalized into exactly one of
/// these variants, so callers never have to understand the underlying
/// engine's own error types. The one exception is [`ScriptError::Host`],
/// which carries a [`HostException`] raised by host-registered code through
/// the script untouched.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ScriptError {
    /// The script failed to parse.
    #[error("syntax error in {filename} at {}: {message}", line_label(.line))]
    Syntax {
        /// Parser message.
        message: String,
        /// Diagnostics filename supplied with the source.
        filename: String,
        /// 1-based source line, when the engine reported one.
        line: Option<usize>,
    },

    /// The script failed at runtime, including uncaught `throw` values.
    #[error("runtime error in {filename} at {}: {message}", line_label(.line))]
    Runtime {
        /// String form of the thrown value, or the engine's message.
        message: String,
        /// Diagnostics filename supplied with the source.
        filename: String,
        /// 1-based source line, when the engine reported one.
        line: Option<usize>,
    },

    /// The script exceeded the configured wall-clock budget.
    #[error("script exceeded time limit of {limit_ms}ms (ran for {elapsed_ms}ms)")]
    Timeout {
        /// Configured limit in milliseconds.
        limit_ms: u64,
        /// Wall-clock time observed when the run was aborted.
        elapsed_ms: u64,
    },

    /// A domain exception raised by host-registered code, passed through
    /// unchanged.
    #[error(transparent)]
    Host(#[from] HostException),

    /// An unrecoverable engine fault. Not retryable.
    #[error("engine fault: {0}")]
    Fatal(String),
}

impl ScriptError {
    pub(crate) fn from_parse_error(err: rhai::ParseError, filename: &str) -> Self {
        Self::Syntax {
            message: err.0.to_string(),
            filename: filename.to_string(),
            line: err.1.line().filter(|line| *line > 0),
        }
    }

    /// Convert the error into its serializable report form.
    pub fn to_info(&self) -> ScriptErrorInfo {
        match self {
            Self::Syntax {
                message,
                filename,
                line,
            } => ScriptErrorInfo {
                error_type: "syntax".to_string(),
                message: message.clone(),
                filename: Some(filename.clone()),
                line: *line,
                details: None,
            },
            Self::Runtime {
                message,
                filename,
                line,
            } => ScriptErrorInfo {
                error_type: "runtime".to_string(),
                message: message.clone(),
                filename: Some(filename.clone()),
                line: *line,
                details: None,
            },
            Self::Timeout { .. } => ScriptErrorInfo {
                error_type: "timeout".to_string(),
                message: self.to_string(),
                filename: None,
                line: None,
                details: None,
            },
            Self::Host(exception) => ScriptErrorInfo {
                error_type: "host".to_string(),
                message: exception.message.clone(),
                filename: None,
                line: None,
                details: serde_json::to_value(exception).ok(),
            },
            Self::Fatal(message) => ScriptErrorInfo {
                error_type: "fatal".to_string(),
                message: message.clone(),
                filename: None,
                line: None,
                details: None,
            },
        }
    }
}

/// Serializable error details for a failed evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptErrorInfo {
    /// Short error category: `syntax`, `runtime`, `timeout`, `host` or `fatal`.
    pub error_type: String,
    /// Human-readable error message.
    pub message: String,
    /// Diagnostics filename, when the failure is tied to a source location.
    pub filename: Option<String>,
    /// 1-based source line, when available.
    pub line: Option<usize>,
    /// Structured error details.
    pub details: Option<serde_json::Value>,
}

/// Map an engine failure into the [`ScriptError`] taxonomy.
///
/// Priority order: a [`HostException`] smuggled through the engine is
/// surfaced unchanged before anything else; the timeout token from the
/// progress hook comes next; then uncaught thrown values, parse failures
/// and resource exhaustion. Any other engine-reported failure is a
/// script-level runtime error. Nothing is dropped.
pub(crate) fn translate(err: Box<EvalAltResult>, filename: &str, limit_ms: u64) -> ScriptError {
    let inner = innermost(&err);

    if let EvalAltResult::ErrorRuntime(value, _) = inner {
        if let Some(exception) = value.clone().try_cast::<HostException>() {
            return ScriptError::Host(exception);
        }
    }

    let line = inner
        .position()
        .line()
        .or_else(|| err.position().line())
        .filter(|line| *line > 0);

    match inner {
        EvalAltResult::ErrorTerminated(token, _) => token
            .clone()
            .try_cast::<ScriptError>()
            .unwrap_or(ScriptError::Timeout {
                limit_ms,
                elapsed_ms: limit_ms,
            }),
        EvalAltResult::ErrorRuntime(value, _) => ScriptError::Runtime {
            message: value.to_string(),
            filename: filename.to_string(),
            line,
        },
        EvalAltResult::ErrorParsing(parse_err, _) => ScriptError::Syntax {
            message: parse_err.to_string(),
            filename: filename.to_string(),
            line,
        },
        EvalAltResult::ErrorStackOverflow(_)
        | EvalAltResult::ErrorDataTooLarge(_, _)
        | EvalAltResult::ErrorTooManyOperations(_)
        | EvalAltResult::ErrorTooManyModules(_) => ScriptError::Fatal(inner.to_string()),
        EvalAltResult::ErrorSystem(_, _) => ScriptError::Fatal(inner.to_string()),
        _ => ScriptError::Runtime {
            message: inner.to_string(),
            filename: filename.to_string(),
            line,
        },
    }
}

/// Strip the engine's call/module wrappers so the translator classifies the
/// failure that actually occurred, not the frame it surfaced through.
fn innermost(err: &EvalAltResult) -> &EvalAltResult {
    match err {
        EvalAltResult::ErrorInFunctionCall(_, _, inner, _)
        | EvalAltResult::ErrorInModule(_, inner, _) => innermost(inner),
        _ => err,
    }
}

fn line_label(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!("line {line}"),
        None => "unknown line".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_line_is_labelled() {
        let err = ScriptError::Runtime {
            message: "boom".to_string(),
            filename: "t.rhai".to_string(),
            line: None,
        };
        assert_eq!(
            err.to_string(),
            "runtime error in t.rhai at unknown line: boom"
        );
    }

    #[test]
    fn known_line_is_rendered() {
        let err = ScriptError::Syntax {
            message: "unexpected token".to_string(),
            filename: "t.rhai".to_string(),
            line: Some(3),
        };
        assert_eq!(
            err.to_string(),
            "syntax error in t.rhai at line 3: unexpected token"
        );
    }

    #[test]
    fn info_uses_stable_error_types() {
        let cases = [
            (
                ScriptError::Syntax {
                    message: "x".into(),
                    filename: "f".into(),
                    line: None,
                },
                "syntax",
            ),
            (
                ScriptError::Runtime {
                    message: "x".into(),
                    filename: "f".into(),
                    line: Some(1),
                },
                "runtime",
            ),
            (
                ScriptError::Timeout {
                    limit_ms: 10,
                    elapsed_ms: 12,
                },
                "timeout",
            ),
            (
                ScriptError::Host(HostException::new("denied", "no access")),
                "host",
            ),
            (ScriptError::Fatal("oom".into()), "fatal"),
        ];
        for (err, expected) in cases {
            assert_eq!(err.to_info().error_type, expected);
        }
    }

    #[test]
    fn host_info_carries_exception_details() {
        let info = ScriptError::Host(HostException::new("denied", "no access")).to_info();
        assert_eq!(info.message, "no access");
        let details = info.details.expect("details");
        assert_eq!(details["kind"], "denied");
    }

    #[test]
    fn timeout_token_round_trips_through_dynamic() {
        let token = rhai::Dynamic::from(ScriptError::Timeout {
            limit_ms: 50,
            elapsed_ms: 61,
        });
        let err = Box::new(EvalAltResult::ErrorTerminated(token, rhai::Position::NONE));
        match translate(err, "t.rhai", 50) {
            ScriptError::Timeout {
                limit_ms,
                elapsed_ms,
            } => {
                assert_eq!(limit_ms, 50);
                assert_eq!(elapsed_ms, 61);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
