//! File readers: the boundary to on-disk model data.
//!
//! Surface meshes come from OBJ/STL files; volumetric scans from single-slice
//! DICOM files or a directory of slices. Every reader returns
//! [`EngineError::GeometryLoad`] on malformed input instead of panicking.

mod dicom;
mod obj;
mod stl;

use std::fs;
use std::path::Path;

use glam::DVec3;

use crate::error::EngineError;
use crate::geometry::Geometry;
use crate::volume::Volume;

pub use dicom::{parse_dicom_slice, DicomSlice};
pub use obj::parse_obj;
pub use stl::parse_stl;

/// Lowercased extension of a path, if any.
pub fn file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Read a surface mesh file, dispatching on the (case-insensitive) extension.
pub fn load_surface_mesh(path: &Path) -> Result<Geometry, EngineError> {
    match file_extension(path).as_deref() {
        Some("obj") => {
            let text = fs::read_to_string(path)
                .map_err(|e| EngineError::load(path, e.to_string()))?;
            parse_obj(&text).map_err(|reason| EngineError::load(path, reason))
        }
        Some("stl") => {
            let bytes = fs::read(path).map_err(|e| EngineError::load(path, e.to_string()))?;
            parse_stl(&bytes).map_err(|reason| EngineError::load(path, reason))
        }
        other => Err(EngineError::UnsupportedFileKind {
            extension: other.unwrap_or_default().to_string(),
        }),
    }
}

/// Read a single-slice volumetric scan file into a one-slice [`Volume`].
pub fn load_volume_single_file(path: &Path) -> Result<Volume, EngineError> {
    let bytes = fs::read(path).map_err(|e| EngineError::load(path, e.to_string()))?;
    parse_dicom_slice(&bytes)
        .map(|slice| slice.into_volume())
        .map_err(|reason| EngineError::load(path, reason))
}

/// Read a directory of `.dcm` slices (sorted by file name) into a stacked
/// multi-slice [`Volume`]. Distinct entry point from the single-file path.
pub fn load_volume_series(dir: &Path) -> Result<Volume, EngineError> {
    let mut slice_paths: Vec<_> = fs::read_dir(dir)
        .map_err(|e| EngineError::load(dir, e.to_string()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| file_extension(p).as_deref() == Some("dcm"))
        .collect();
    slice_paths.sort();

    if slice_paths.is_empty() {
        return Err(EngineError::load(dir, "no .dcm slices in directory"));
    }

    let mut slices = Vec::with_capacity(slice_paths.len());
    for path in &slice_paths {
        let bytes = fs::read(path).map_err(|e| EngineError::load(path, e.to_string()))?;
        let slice =
            parse_dicom_slice(&bytes).map_err(|reason| EngineError::load(path, reason))?;
        slices.push(slice);
    }

    let first = &slices[0];
    let (rows, columns) = (first.rows, first.columns);
    for slice in &slices[1..] {
        if slice.rows != rows || slice.columns != columns {
            return Err(EngineError::load(dir, "slice dimensions differ across series"));
        }
    }

    let mut samples = Vec::with_capacity(rows * columns * slices.len());
    for slice in &slices {
        samples.extend_from_slice(&slice.samples);
    }

    Ok(Volume::new(
        [columns, rows, slices.len()],
        DVec3::new(first.pixel_spacing[0], first.pixel_spacing[1], first.slice_thickness),
        DVec3::ZERO,
        samples,
    ))
}
