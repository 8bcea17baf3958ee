//! Minimal Wavefront OBJ reader: vertex positions and faces only.
//!
//! Texture/normal indices in `f` records are accepted and ignored; the
//! preprocessing pipeline recomputes point normals anyway. Faces with more
//! than three vertices are fan-triangulated.

use glam::DVec3;

use crate::geometry::Geometry;

pub fn parse_obj(text: &str) -> Result<Geometry, String> {
    let mut points: Vec<DVec3> = Vec::new();
    let mut triangles: Vec<[u32; 3]> = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        let mut fields = line.split_whitespace();
        match fields.next() {
            Some("v") => {
                let mut coord = || -> Result<f64, String> {
                    fields
                        .next()
                        .ok_or_else(|| format!("line {}: short vertex record", line_no + 1))?
                        .parse::<f64>()
                        .map_err(|e| format!("line {}: {e}", line_no + 1))
                };
                let x = coord()?;
                let y = coord()?;
                let z = coord()?;
                points.push(DVec3::new(x, y, z));
            }
            Some("f") => {
                let mut indices: Vec<u32> = Vec::new();
                for field in fields {
                    indices.push(parse_face_index(field, points.len(), line_no + 1)?);
                }
                if indices.len() < 3 {
                    return Err(format!("line {}: face with fewer than 3 vertices", line_no + 1));
                }
                for i in 1..indices.len() - 1 {
                    triangles.push([indices[0], indices[i], indices[i + 1]]);
                }
            }
            // Comments, groups, materials, vt/vn records: skipped
            _ => {}
        }
    }

    if points.is_empty() {
        return Err("no vertex data".to_string());
    }

    Ok(Geometry::new(points, triangles))
}

/// Parse the vertex index out of `v`, `v/vt`, `v//vn`, or `v/vt/vn` forms.
/// OBJ indices are 1-based; negative indices count back from the end.
fn parse_face_index(field: &str, point_count: usize, line_no: usize) -> Result<u32, String> {
    let vertex_part = field.split('/').next().unwrap_or(field);
    let raw: i64 = vertex_part
        .parse()
        .map_err(|_| format!("line {line_no}: bad face index {field:?}"))?;

    let resolved = if raw > 0 {
        raw - 1
    } else if raw < 0 {
        point_count as i64 + raw
    } else {
        return Err(format!("line {line_no}: face index 0 is invalid"));
    };

    if resolved < 0 || resolved as usize >= point_count {
        return Err(format!("line {line_no}: face index {raw} out of range"));
    }
    Ok(resolved as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
# a unit quad
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
f 1 2 3 4
";

    #[test]
    fn test_parse_quad_fan_triangulates() {
        let geometry = parse_obj(QUAD).unwrap();
        assert_eq!(geometry.point_count(), 4);
        assert_eq!(geometry.triangles, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_parse_slash_forms_and_negative_indices() {
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
f 1/5/2 2//3 -1
";
        let geometry = parse_obj(text).unwrap();
        assert_eq!(geometry.triangles, vec![[0, 1, 2]]);
    }

    #[test]
    fn test_out_of_range_index_is_an_error() {
        let text = "v 0 0 0\nf 1 2 3\n";
        assert!(parse_obj(text).is_err());
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert!(parse_obj("# nothing here\n").is_err());
    }
}
