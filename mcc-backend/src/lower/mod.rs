//! Lowering
//!
//! - `module` - splits the program into functions and assembles the unit
//! - `function` - per-function state and the walk over its instructions
//! - `instruction` - dispatch, control flow and arithmetic
//! - `operand` - getting operands into registers
//! - `long` - 64-bit integer sequences
//! - `cast` - assignments and conversions
//! - `memory` - address-of, loads and stores through pointers
//! - `call` - parameters, calls and returns

mod call;
mod cast;
mod function;
mod instruction;
mod long;
mod memory;
mod module;
mod operand;

pub use function::lower_function;
pub use module::lower_program;
pub use operand::literal_words;
