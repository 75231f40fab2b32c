//! Legacy VTK polydata support (ASCII).
//!
//! The legacy VTK format starts with a version comment, a title line,
//! an encoding keyword and a dataset keyword, followed by data
//! sections:
//!
//! ```text
//! # vtk DataFile Version 3.0
//! surface model
//! ASCII
//! DATASET POLYDATA
//! POINTS 8 float
//! 0.0 0.0 0.0 ...
//! POLYGONS 12 48
//! 3 0 2 1 ...
//! ```
//!
//! Only ASCII POLYDATA is supported. Polygons with more than three
//! vertices are fan-triangulated on load; per-vertex normals are read
//! from and written to a `POINT_DATA` / `NORMALS` section when present.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use tin_types::{Point3, TriangleMesh, Vector3};
use tracing::debug;

use crate::error::{IoError, IoResult};

/// Version comment written at the top of every output file.
const VTK_VERSION_LINE: &str = "# vtk DataFile Version 3.0";

/// Load a triangle mesh from a legacy VTK polydata file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not ASCII POLYDATA,
/// or references points outside the point list.
///
/// # Example
///
/// ```no_run
/// use tin_io::load_vtk;
///
/// let mesh = load_vtk("Component1.vtk").unwrap();
/// println!("{} faces", mesh.face_count());
/// ```
pub fn load_vtk<P: AsRef<Path>>(path: P) -> IoResult<TriangleMesh> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IoError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IoError::Io(e)
        }
    })?;
    let mut text = String::new();
    file.read_to_string(&mut text)?;

    let mesh = parse_polydata(&text)?;
    debug!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "loaded VTK polydata"
    );
    Ok(mesh)
}

/// Save a triangle mesh as legacy VTK ASCII polydata.
///
/// Writes per-vertex normals as a `POINT_DATA` section when the mesh
/// carries them.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_vtk<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> IoResult<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{VTK_VERSION_LINE}")?;
    writeln!(writer, "surface model")?;
    writeln!(writer, "ASCII")?;
    writeln!(writer, "DATASET POLYDATA")?;

    writeln!(writer, "POINTS {} float", mesh.vertex_count())?;
    for p in &mesh.positions {
        writeln!(writer, "{} {} {}", p.x, p.y, p.z)?;
    }

    // Each triangle row is its vertex count plus three indices.
    writeln!(
        writer,
        "POLYGONS {} {}",
        mesh.face_count(),
        mesh.face_count() * 4
    )?;
    for [a, b, c] in &mesh.faces {
        writeln!(writer, "3 {a} {b} {c}")?;
    }

    if let Some(normals) = &mesh.normals {
        writeln!(writer, "POINT_DATA {}", normals.len())?;
        writeln!(writer, "NORMALS normals float")?;
        for n in normals {
            writeln!(writer, "{} {} {}", n.x, n.y, n.z)?;
        }
    }

    writer.flush()?;
    debug!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "saved VTK polydata"
    );
    Ok(())
}

/// Parse the body of a legacy VTK ASCII polydata file.
fn parse_polydata(text: &str) -> IoResult<TriangleMesh> {
    let mut lines = text.lines();

    let version = lines
        .next()
        .ok_or_else(|| IoError::invalid_header("empty file"))?;
    if !version.trim_start().starts_with("# vtk DataFile") {
        return Err(IoError::invalid_header(format!(
            "expected '# vtk DataFile' version line, got {version:?}"
        )));
    }
    // Title line, free-form.
    lines
        .next()
        .ok_or_else(|| IoError::invalid_header("missing title line"))?;

    let encoding = next_nonblank(&mut lines)
        .ok_or_else(|| IoError::invalid_header("missing encoding line"))?;
    if !encoding.eq_ignore_ascii_case("ASCII") {
        return Err(IoError::UnsupportedEncoding {
            encoding: encoding.to_owned(),
        });
    }

    let dataset_line = next_nonblank(&mut lines)
        .ok_or_else(|| IoError::invalid_header("missing DATASET line"))?;
    let dataset = dataset_line
        .strip_prefix("DATASET")
        .map(str::trim)
        .ok_or_else(|| IoError::invalid_header(format!("expected DATASET line, got {dataset_line:?}")))?;
    if !dataset.eq_ignore_ascii_case("POLYDATA") {
        return Err(IoError::UnsupportedDataset {
            dataset: dataset.to_owned(),
        });
    }

    // Everything past the dataset line is whitespace-separated tokens.
    let remainder: String = lines.collect::<Vec<_>>().join("\n");
    let mut tokens = remainder.split_ascii_whitespace();

    let mut mesh = TriangleMesh::new();

    while let Some(keyword) = tokens.next() {
        match keyword {
            "POINTS" => {
                let count: usize = take_token(&mut tokens, "POINTS count")?.parse()?;
                // Data type token (float/double), not needed in ASCII.
                take_token(&mut tokens, "POINTS data type")?;
                mesh.positions.reserve(count);
                for _ in 0..count {
                    let x: f64 = take_token(&mut tokens, "point coordinate")?.parse()?;
                    let y: f64 = take_token(&mut tokens, "point coordinate")?.parse()?;
                    let z: f64 = take_token(&mut tokens, "point coordinate")?.parse()?;
                    mesh.positions.push(Point3::new(x, y, z));
                }
            }
            "POLYGONS" => {
                let count: usize = take_token(&mut tokens, "POLYGONS count")?.parse()?;
                take_token(&mut tokens, "POLYGONS size")?;
                for _ in 0..count {
                    let arity: usize = take_token(&mut tokens, "polygon vertex count")?.parse()?;
                    let mut indices = Vec::with_capacity(arity);
                    for _ in 0..arity {
                        let index: u32 = take_token(&mut tokens, "polygon index")?.parse()?;
                        if index as usize >= mesh.positions.len() {
                            return Err(IoError::IndexOutOfRange {
                                index: index as usize,
                                point_count: mesh.positions.len(),
                            });
                        }
                        indices.push(index);
                    }
                    if arity < 3 {
                        return Err(IoError::invalid_content(format!(
                            "polygon with {arity} vertices"
                        )));
                    }
                    // Fan triangulation for polygons beyond triangles.
                    for i in 1..arity - 1 {
                        mesh.faces.push([indices[0], indices[i], indices[i + 1]]);
                    }
                }
            }
            "POINT_DATA" => {
                // Count token, then attribute sections follow.
                take_token(&mut tokens, "POINT_DATA count")?;
            }
            "NORMALS" => {
                // Attribute name and data type.
                take_token(&mut tokens, "NORMALS name")?;
                take_token(&mut tokens, "NORMALS data type")?;
                let mut normals = Vec::with_capacity(mesh.positions.len());
                for _ in 0..mesh.positions.len() {
                    let x: f64 = take_token(&mut tokens, "normal component")?.parse()?;
                    let y: f64 = take_token(&mut tokens, "normal component")?.parse()?;
                    let z: f64 = take_token(&mut tokens, "normal component")?.parse()?;
                    normals.push(Vector3::new(x, y, z));
                }
                mesh.normals = Some(normals);
            }
            // Sections we do not model (LINES, VERTICES, CELL_DATA
            // attributes) are not produced by this pipeline.
            other => {
                return Err(IoError::invalid_content(format!(
                    "unsupported VTK section: {other}"
                )));
            }
        }
    }

    Ok(mesh)
}

fn next_nonblank<'a, I: Iterator<Item = &'a str>>(lines: &mut I) -> Option<&'a str> {
    lines.map(str::trim).find(|line| !line.is_empty())
}

fn take_token<'a, I: Iterator<Item = &'a str>>(tokens: &mut I, what: &str) -> IoResult<&'a str> {
    tokens
        .next()
        .ok_or_else(|| IoError::invalid_content(format!("unexpected end of file, expected {what}")))
}
