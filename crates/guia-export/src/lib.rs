//! guia-export
//!
//! HTML fragment → paginated, branded PDF.
//!
//! The pipeline runs in three stages: [`document`] wraps the caller's
//! markup in the themed page shell, [`pdf`] drives a headless Chromium to
//! print it, and [`pipeline`] ties both together under a deadline.

pub mod bands;
pub mod brand;
pub mod document;
pub mod error;
pub mod pdf;
pub mod pipeline;
pub mod styles;
mod templates;
