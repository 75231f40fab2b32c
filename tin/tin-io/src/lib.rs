//! Mesh file I/O for surface model generation.
//!
//! Reads and writes triangle meshes in the legacy VTK polydata format
//! (ASCII), the interchange format of this pipeline's mesh stages.
//!
//! # Example
//!
//! ```no_run
//! use tin_io::{load_vtk, save_vtk};
//!
//! let mesh = load_vtk("Component1.vtk").unwrap();
//! save_vtk(&mesh, "Component1_optimized.vtk").unwrap();
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod vtk;

pub use error::{IoError, IoResult};
pub use vtk::{load_vtk, save_vtk};
