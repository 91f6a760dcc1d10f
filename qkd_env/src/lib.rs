//! QKD Environment Abstraction Layer
//!
//! This crate isolates the one source of non-determinism in a BB84 run:
//! randomness. Every stage of the protocol draws from a single
//! [`RandomSource`] handle passed down by the caller, so a run is
//! reproducible from its 64-bit seed and independent runs share nothing.
//!
//! # Implementations
//!
//! - **Simulation**: [`SeededSource`] - ChaCha8 stream derived from a seed
//! - **Production**: [`OsEntropySource`] - seeded once from OS entropy
//!
//! # Example
//!
//! ```
//! use qkd_env::{source_for, RandomSource};
//!
//! let mut a = source_for(Some(42));
//! let mut b = source_for(Some(42));
//! assert_eq!(a.next_bit(), b.next_bit());
//! assert_eq!(a.seed(), Some(42));
//! ```

mod source;
mod seeded;
mod os_impl;

pub use source::{source_for, RandomSource};
pub use seeded::SeededSource;
pub use os_impl::OsEntropySource;
