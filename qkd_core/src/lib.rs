//! QKD-Lab Core - BB84 Quantum Key Distribution Simulation Engine
//!
//! Classical-probability model of the BB84 protocol end to end:
//! 1. **Preparation**: Alice's random bits and bases
//! 2. **Attack**: optional intercept-resend by Eve
//! 3. **Transmission**: fiber attenuation and detector efficiency
//! 4. **Measurement**: Bob's bases, complementarity and bit-flip noise
//! 5. **Post-processing**: sifting, QBER and the asymptotic key rate
//!
//! No state vectors are simulated. Matching bases are deterministic,
//! mismatched bases are a fair coin, noise and loss are independent per
//! photon.
//!
//! # Usage
//!
//! ```
//! use qkd_core::{pipeline, SimulationParameters, SecurityStatus};
//!
//! let params = SimulationParameters::builder(10_000)
//!     .attenuation(0.0)
//!     .seed(Some(42))
//!     .build()
//!     .unwrap();
//!
//! let result = pipeline::run_seeded(&params).unwrap();
//! assert_eq!(result.security_status, SecurityStatus::Secure);
//! ```

pub mod alice;
pub mod bob;
pub mod channel;
pub mod entropy;
pub mod error;
pub mod eve;
pub mod metrics;
pub mod params;
pub mod pipeline;
pub mod privacy;
pub mod sifting;
pub mod types;

// Re-export key types for convenience
pub use error::{QkdError, Result};
pub use eve::EveOutcome;
pub use params::{SimulationParameters, SimulationParametersBuilder};
pub use pipeline::{run, run_seeded, SimulationResult};
pub use sifting::SiftResult;
pub use types::{sample_bits, Basis, BasisSequence, BitSequence, SecurityStatus};
