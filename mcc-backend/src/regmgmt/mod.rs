//! Register Management
//!
//! - `descriptors` - register and address descriptors
//! - `pool` - one allocatable pool and its selection policy
//! - `allocator` - both pools plus the output buffer of a function

pub use self::allocator::{RegisterAllocator, SavedRegister};
pub use self::descriptors::{Descriptors, Half, Location, ValueKey, Var};
pub use self::pool::{Choice, RegisterPool};

mod allocator;
mod descriptors;
mod pool;

#[cfg(test)]
mod tests;
