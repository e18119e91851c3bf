//! # dlbridge types - core types with no workspace dependencies
//!
//! This is a leaf crate providing the canonical definitions of:
//! - [`ScalarType`] - Element kinds of the internal tensor library
//! - [`Element`] - Rust element types tagged with their [`ScalarType`]
//! - [`Half`] - Bit container for binary16 elements
//! - [`Backend`] / [`Device`] - Where tensor storage resides
//!
//! `dlbridge_core` maps these onto the DLPack exchange format.

pub mod device;
pub mod dtype;

pub use device::{Backend, Device};
pub use dtype::{Element, Half, ScalarType};
