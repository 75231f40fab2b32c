//! Triangle mesh (TIN) types for surface model generation.
//!
//! This crate provides the mesh representation shared by the isosurface
//! extractor, the optimizer and the mesh I/O layer:
//!
//! - [`TriangleMesh`] - indexed triangle surface with optional normals
//! - [`Triangle`] - a concrete triangle with vertex positions
//! - [`Aabb`] - axis-aligned bounding box
//!
//! # Coordinate System
//!
//! Right-handed, physical units (typically millimeters). Face winding is
//! counter-clockwise when viewed from outside, so normals point outward
//! by the right-hand rule once orientation has been unified.
//!
//! # Example
//!
//! ```
//! use tin_types::{Point3, TriangleMesh};
//!
//! let mut mesh = TriangleMesh::new();
//! mesh.positions.push(Point3::new(0.0, 0.0, 0.0));
//! mesh.positions.push(Point3::new(1.0, 0.0, 0.0));
//! mesh.positions.push(Point3::new(0.0, 1.0, 0.0));
//! mesh.faces.push([0, 1, 2]);
//!
//! assert_eq!(mesh.face_count(), 1);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod bounds;
mod mesh;
mod triangle;

pub use bounds::Aabb;
pub use mesh::{unit_cube, TriangleMesh};
pub use triangle::Triangle;

// Re-export nalgebra types for convenience.
pub use nalgebra::{Point3, Vector3};
