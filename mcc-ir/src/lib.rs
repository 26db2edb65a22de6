//! Three-address code for the MIPS C compiler
//! 
//! The front end emits a flat stream of quadruples; control flow is carried by
//! jump instructions whose targets are filled in later by backpatching.
//! 
//! ## Architecture
//! 
//! The crate is structured as follows:
//! - `operand` - Operand references and literal parsing
//! - `ops` - Operators and relations
//! - `instructions` - Quadruples, jumps and conditional jumps
//! - `patch` - Patch lists of jumps awaiting a target
//! - `builder` - Position-issuing instruction arena and backpatching
//! - `program` - The finished, ordered instruction stream

// Public exports - clean API surface
pub use self::builder::TacBuilder;
pub use self::error::IrError;
pub use self::instructions::{Condition, InstrId, InstrKind, Instruction, JumpTarget, Quad};
pub use self::operand::{parse_float_literal, parse_int_literal, Operand};
pub use self::ops::{Operator, Relation};
pub use self::patch::PatchList;
pub use self::program::TacProgram;

// Internal modules
mod builder;
mod error;
mod instructions;
mod operand;
mod ops;
mod patch;
mod program;

#[cfg(test)]
mod tests;
