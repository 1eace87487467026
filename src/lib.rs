//! Three-dimensional wave function collapse driven by kernel rules
//!
//! Authored voxel samples are scanned with a fixed-size window; every distinct window
//! becomes a kernel. Generation starts from a seeded cell and repeatedly collapses the
//! most constrained cell, keeping only symbols that some kernel can place, until the
//! whole volume is decided.

#![forbid(unsafe_code)]

/// Domains, propagation, selection and the collapse driver
pub mod algorithm;
/// Kernel extraction and rule sets
pub mod analysis;
/// Input/output operations and error handling
pub mod io;
/// Symbols, grids and kernel storage
pub mod spatial;

pub use io::error::{AlgorithmError, Result};
