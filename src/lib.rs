//! NTRU: a lattice-based public-key cryptosystem over the truncated
//! polynomial ring `R = Z[x] / (x^N - 1)`.
//!
//! The core is strictly single-threaded and synchronous: a session owns
//! its parameters, its key material, and the RNG it is handed. Nothing
//! here is constant-time, and none of the padding schemes (NAEP/OAEP)
//! that a production NTRU deployment would need are implemented — see
//! the crate-level design document for the full list of non-goals.

pub mod cipher;
pub mod codec;
pub mod error;
pub mod inverter;
pub mod keyfile;
pub mod keygen;
pub mod numeric;
pub mod params;
pub mod ring;
pub mod sampler;

pub use error::{NtruError, Result};
pub use keygen::{
    KeyEngine, KeyPair, KeygenObserver, KeyspaceReport, NullObserver, SparsityReport,
};
pub use params::Params;
pub use ring::RingElement;
