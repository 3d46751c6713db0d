// Public modules
pub mod backup;
pub mod binding;
pub mod changeset;
pub mod cleanup;
pub mod clip;
pub mod discover;
pub mod error;
pub mod executor;
pub mod parse;
pub mod session;
pub mod text;
pub mod validate;

// Re-export common types for convenience
pub use binding::{
    BindingKind, ChangeRecord, CleanupReason, CleanupRecord, Curve, CurveBinding, Keyframe,
    OperationResult, Validation, ValidationStatus,
};
pub use error::{Error, ErrorCode, Result};
