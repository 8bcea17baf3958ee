//! STL reader for binary and ASCII formats.
//!
//! Facet normals stored in the file are ignored; per-point normals are
//! recomputed by the preprocessing pipeline.

use glam::DVec3;
use nom::{
    bytes::complete::tag,
    character::complete::{multispace0, multispace1, not_line_ending},
    multi::many0,
    number::complete::float,
    sequence::preceded,
    IResult,
};

use crate::geometry::Geometry;

/// Detect and parse an STL file (binary or ASCII).
pub fn parse_stl(data: &[u8]) -> Result<Geometry, String> {
    // Files starting with "solid" might be ASCII; binary files can carry the
    // same prefix in their free-form header, so fall through on parse failure.
    if data.len() > 5 && &data[0..5] == b"solid" {
        if let Ok(text) = std::str::from_utf8(data) {
            if let Ok(geometry) = parse_ascii_stl(text) {
                return Ok(geometry);
            }
        }
    }

    parse_binary_stl(data)
}

/// Parse a binary STL file: 80-byte header, u32 facet count, then 50-byte
/// facet records (normal, 3 vertices, attribute bytes).
pub fn parse_binary_stl(data: &[u8]) -> Result<Geometry, String> {
    if data.len() < 84 {
        return Err("file too small to be a valid STL".to_string());
    }

    let data = &data[80..];
    let triangle_count =
        u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;

    let mut geometry = Geometry {
        points: Vec::with_capacity(triangle_count * 3),
        triangles: Vec::with_capacity(triangle_count),
        normals: None,
    };

    let mut offset = 4;
    for _ in 0..triangle_count {
        if offset + 50 > data.len() {
            return Err("unexpected end of file".to_string());
        }

        // Skip the facet normal (3 floats)
        offset += 12;

        let base = geometry.points.len() as u32;
        for _ in 0..3 {
            let x = read_f32(data, offset);
            let y = read_f32(data, offset + 4);
            let z = read_f32(data, offset + 8);
            geometry.points.push(DVec3::new(x as f64, y as f64, z as f64));
            offset += 12;
        }
        geometry.triangles.push([base, base + 1, base + 2]);

        // Skip attribute byte count
        offset += 2;
    }

    Ok(geometry)
}

fn read_f32(data: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str) -> Result<Geometry, String> {
    match parse_ascii_stl_impl(input) {
        Ok((_, geometry)) => Ok(geometry),
        Err(e) => Err(format!("failed to parse ASCII STL: {e:?}")),
    }
}

fn parse_ascii_stl_impl(input: &str) -> IResult<&str, Geometry> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    let (input, _) = not_line_ending(input)?; // optional name
    let (input, facets) = many0(parse_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;

    let mut geometry = Geometry {
        points: Vec::with_capacity(facets.len() * 3),
        triangles: Vec::with_capacity(facets.len()),
        normals: None,
    };
    for facet in facets {
        let base = geometry.points.len() as u32;
        geometry.points.extend_from_slice(&facet);
        geometry.triangles.push([base, base + 1, base + 2]);
    }

    Ok((input, geometry))
}

fn parse_facet(input: &str) -> IResult<&str, [DVec3; 3]> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, _normal) = parse_vector3(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, v0) = parse_vertex(input)?;
    let (input, v1) = parse_vertex(input)?;
    let (input, v2) = parse_vertex(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((input, [v0, v1, v2]))
}

fn parse_vertex(input: &str) -> IResult<&str, DVec3> {
    let (input, _) = preceded(multispace0, tag("vertex"))(input)?;
    parse_vector3(input)
}

fn parse_vector3(input: &str) -> IResult<&str, DVec3> {
    let (input, _) = multispace0(input)?;
    let (input, x) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = float(input)?;
    Ok((input, DVec3::new(x as f64, y as f64, z as f64)))
}
