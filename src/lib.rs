//! Docscan Server Library
//!
//! Turns a digital PDF into one that looks photocopied, optionally stamping
//! a signature image onto pages first. The binary in main.rs serves the
//! pipeline over HTTP.
//!
//! # Modules
//!
//! - `scan`: pipeline entry point (request in, PDF bytes out)
//! - `placement` / `geometry`: signature placement parsing and page mapping
//! - `signature`: signature decoding and stamping
//! - `raster`: page rendering via MuPDF
//! - `effects`: photocopy effect chain
//! - `assemble`: output PDF construction
//! - `pdf`: lopdf helpers for page boxes, resources and image XObjects

pub mod assemble;
pub mod config;
pub mod document;
pub mod effects;
pub mod error;
pub mod geometry;
pub mod pdf;
pub mod placement;
pub mod raster;
pub mod routes;
pub mod scan;
pub mod signature;
pub mod state;

#[cfg(test)]
mod test_support;

pub use error::{PlacementError, ScanError, ScanResult};
pub use scan::{process, process_with_thread_rng, ScanOptions, ScanRequest};
