//! guia-core
//!
//! Shared vocabulary of the guide export service: the export request,
//! page orientation and geometry, and the fixed response metadata.
//! No browser or HTTP dependency lives here.

pub mod error;
pub mod models;
