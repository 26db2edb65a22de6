//! MIPS C Compiler - Common Types and Utilities
//! 
//! This crate contains shared types, error definitions, and the symbol-table
//! service used across all components of the MIPS C compiler back end.

pub mod error;
pub mod types;
pub mod source_loc;

pub use error::{CompilerError, Diagnostic, ErrorReporter, Severity};
pub use types::*;
pub use source_loc::{SourceLocation, SourceSpan};
