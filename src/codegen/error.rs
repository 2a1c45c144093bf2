//! Internal faults raised while lowering a checked program.
//!
//! These indicate a bug in an earlier stage, not a problem in the user's
//! program: the type checker guarantees every lookup below succeeds.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    #[error("internal error: unknown class '{0}'")]
    UnknownClass(String),

    #[error("internal error: class '{class}' has no method '{method}'")]
    UnknownMethod { class: String, method: String },

    #[error("internal error: cannot resolve '{name}' in class '{class}'")]
    UnknownVariable { class: String, name: String },

    #[error("internal error: receiver of '{0}' has no static class")]
    UntypedReceiver(String),

    #[error("failed to write IR")]
    Write(#[from] std::fmt::Error),
}
