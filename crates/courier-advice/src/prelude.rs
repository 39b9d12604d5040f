//! Prelude module - commonly used types for convenient import.
//!
//! Use `use courier_advice::prelude::*;` to import all essential types.

// Advising
pub use crate::{AdvisedMethod, Advisor, Phase, advise};

// Method tables
pub use crate::{Advisable, Method, MethodResult, MethodTable, invoke, method};

// Errors
pub use crate::{AdviceError, AdviceResult};
