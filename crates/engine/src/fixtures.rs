//! Factory functions for test data: small geometries, volumes, and synthetic
//! scan-slice files used across the crate's tests.

use glam::DVec3;

use crate::geometry::Geometry;
use crate::volume::Volume;

/// Indexed axis-aligned box between `min` and `max`, outward winding.
pub fn box_geometry(min: DVec3, max: DVec3) -> Geometry {
    let points = vec![
        DVec3::new(min.x, min.y, min.z),
        DVec3::new(max.x, min.y, min.z),
        DVec3::new(max.x, max.y, min.z),
        DVec3::new(min.x, max.y, min.z),
        DVec3::new(min.x, min.y, max.z),
        DVec3::new(max.x, min.y, max.z),
        DVec3::new(max.x, max.y, max.z),
        DVec3::new(min.x, max.y, max.z),
    ];
    let triangles = vec![
        // Bottom (-Z) and top (+Z)
        [0, 3, 2],
        [0, 2, 1],
        [4, 5, 6],
        [4, 6, 7],
        // Front (-Y) and back (+Y)
        [0, 1, 5],
        [0, 5, 4],
        [2, 3, 7],
        [2, 7, 6],
        // Left (-X) and right (+X)
        [0, 4, 7],
        [0, 7, 3],
        [1, 2, 6],
        [1, 6, 5],
    ];
    Geometry::new(points, triangles)
}

/// Unit cube centered at the origin.
pub fn unit_cube() -> Geometry {
    box_geometry(DVec3::splat(-0.5), DVec3::splat(0.5))
}

/// 2x2x2 volume of fully-set samples, unit spacing, origin at zero.
pub fn solid_volume() -> Volume {
    Volume::new([2, 2, 2], DVec3::ONE, DVec3::ZERO, vec![1.0; 8])
}

/// Build a minimal explicit-VR DICOM slice file in memory: `rows` x `columns`
/// 16-bit samples with unit spacing.
pub fn dicom_slice_bytes(rows: u16, columns: u16, samples: &[u16]) -> Vec<u8> {
    assert_eq!(samples.len(), rows as usize * columns as usize);

    fn push_element(out: &mut Vec<u8>, group: u16, element: u16, vr: &[u8; 2], value: &[u8]) {
        out.extend_from_slice(&group.to_le_bytes());
        out.extend_from_slice(&element.to_le_bytes());
        out.extend_from_slice(vr);
        match vr {
            b"OB" | b"OW" => {
                out.extend_from_slice(&[0, 0]);
                out.extend_from_slice(&(value.len() as u32).to_le_bytes());
            }
            _ => out.extend_from_slice(&(value.len() as u16).to_le_bytes()),
        }
        out.extend_from_slice(value);
    }

    let mut data = vec![0u8; 128];
    data.extend_from_slice(b"DICM");
    push_element(&mut data, 0x0018, 0x0050, b"DS", b"1.0");
    push_element(&mut data, 0x0028, 0x0010, b"US", &rows.to_le_bytes());
    push_element(&mut data, 0x0028, 0x0011, b"US", &columns.to_le_bytes());
    push_element(&mut data, 0x0028, 0x0030, b"DS", b"1.0\\1.0");
    push_element(&mut data, 0x0028, 0x0100, b"US", &16u16.to_le_bytes());

    let mut pixels = Vec::with_capacity(samples.len() * 2);
    for sample in samples {
        pixels.extend_from_slice(&sample.to_le_bytes());
    }
    push_element(&mut data, 0x7FE0, 0x0010, b"OW", &pixels);
    data
}
