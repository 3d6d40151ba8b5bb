//! Signature declaration validation for gradus.
//!
//! Builds on the relation checker in `gradus-solver` to report declarations
//! whose type applications, instance variables or module mixins are
//! inconsistent. Diagnostics are accumulated, never raised.

pub mod diagnostics;
pub mod validator;

pub use diagnostics::SignatureDiagnostic;
pub use validator::Validator;
