//! Minimal DICOM slice reader.
//!
//! Supports uncompressed little-endian transfer syntaxes, explicit or implicit
//! VR, with 8- or 16-bit pixel data. This is intentionally a small subset:
//! just enough to pull Rows, Columns, PixelSpacing, SliceThickness, and
//! PixelData out of scan slices.

use glam::DVec3;

use crate::volume::Volume;

const TAG_SLICE_THICKNESS: (u16, u16) = (0x0018, 0x0050);
const TAG_ROWS: (u16, u16) = (0x0028, 0x0010);
const TAG_COLUMNS: (u16, u16) = (0x0028, 0x0011);
const TAG_PIXEL_SPACING: (u16, u16) = (0x0028, 0x0030);
const TAG_BITS_ALLOCATED: (u16, u16) = (0x0028, 0x0100);
const TAG_PIXEL_DATA: (u16, u16) = (0x7FE0, 0x0010);

/// One decoded scan slice.
#[derive(Debug, Clone)]
pub struct DicomSlice {
    pub rows: usize,
    pub columns: usize,
    /// Sample spacing as (x, y), i.e. (column spacing, row spacing)
    pub pixel_spacing: [f64; 2],
    pub slice_thickness: f64,
    /// Row-major samples, `columns` fastest
    pub samples: Vec<f64>,
}

impl DicomSlice {
    /// Wrap this slice in a one-slice volume at the origin.
    pub fn into_volume(self) -> Volume {
        Volume::new(
            [self.columns, self.rows, 1],
            DVec3::new(self.pixel_spacing[0], self.pixel_spacing[1], self.slice_thickness),
            DVec3::ZERO,
            self.samples,
        )
    }
}

/// Parse a single DICOM file into a [`DicomSlice`].
pub fn parse_dicom_slice(data: &[u8]) -> Result<DicomSlice, String> {
    if data.len() < 132 || &data[128..132] != b"DICM" {
        return Err("missing DICM preamble".to_string());
    }

    let mut cursor = Cursor {
        data,
        offset: 132,
    };

    let mut rows: Option<usize> = None;
    let mut columns: Option<usize> = None;
    let mut bits_allocated: usize = 16;
    let mut pixel_spacing = [1.0, 1.0];
    let mut slice_thickness = 1.0;
    let mut pixel_data: Option<&[u8]> = None;

    while cursor.remaining() >= 8 {
        let group = cursor.read_u16()?;
        let element = cursor.read_u16()?;
        let (length, _vr) = cursor.read_value_length()?;
        if length == u32::MAX {
            return Err("undefined-length elements are not supported".to_string());
        }
        let value = cursor.read_bytes(length as usize)?;

        match (group, element) {
            TAG_ROWS => rows = Some(read_us(value)? as usize),
            TAG_COLUMNS => columns = Some(read_us(value)? as usize),
            TAG_BITS_ALLOCATED => bits_allocated = read_us(value)? as usize,
            TAG_PIXEL_SPACING => {
                let (row_spacing, col_spacing) = read_spacing_pair(value)?;
                pixel_spacing = [col_spacing, row_spacing];
            }
            TAG_SLICE_THICKNESS => slice_thickness = read_ds(value)?,
            TAG_PIXEL_DATA => {
                pixel_data = Some(value);
                break;
            }
            _ => {}
        }
    }

    let rows = rows.ok_or("missing Rows element")?;
    let columns = columns.ok_or("missing Columns element")?;
    let pixel_data = pixel_data.ok_or("missing PixelData element")?;

    let expected = rows * columns;
    let samples: Vec<f64> = match bits_allocated {
        8 => {
            if pixel_data.len() < expected {
                return Err("pixel data shorter than Rows x Columns".to_string());
            }
            pixel_data[..expected].iter().map(|&v| v as f64).collect()
        }
        16 => {
            if pixel_data.len() < expected * 2 {
                return Err("pixel data shorter than Rows x Columns".to_string());
            }
            pixel_data[..expected * 2]
                .chunks_exact(2)
                .map(|c| u16::from_le_bytes([c[0], c[1]]) as f64)
                .collect()
        }
        other => return Err(format!("unsupported BitsAllocated: {other}")),
    };

    Ok(DicomSlice {
        rows,
        columns,
        pixel_spacing,
        slice_thickness,
        samples,
    })
}

struct Cursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], String> {
        if self.remaining() < n {
            return Err("unexpected end of file".to_string());
        }
        let slice = &self.data[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }

    fn read_u16(&mut self) -> Result<u16, String> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn read_u32(&mut self) -> Result<u32, String> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read the VR/length portion of a data element, handling both explicit
    /// and implicit VR little-endian encodings.
    fn read_value_length(&mut self) -> Result<(u32, Option<[u8; 2]>), String> {
        let peek = self.read_bytes(2)?;
        let vr = [peek[0], peek[1]];

        if vr.iter().all(|c| c.is_ascii_uppercase()) {
            // Explicit VR
            let length = match &vr {
                b"OB" | b"OW" | b"OF" | b"SQ" | b"UT" | b"UN" => {
                    self.read_bytes(2)?; // reserved
                    self.read_u32()?
                }
                _ => self.read_u16()? as u32,
            };
            Ok((length, Some(vr)))
        } else {
            // Implicit VR: the two bytes just read are the low half of a u32 length
            let high = self.read_bytes(2)?;
            let length =
                u32::from_le_bytes([vr[0], vr[1], high[0], high[1]]);
            Ok((length, None))
        }
    }
}

fn read_us(value: &[u8]) -> Result<u16, String> {
    if value.len() < 2 {
        return Err("short US value".to_string());
    }
    Ok(u16::from_le_bytes([value[0], value[1]]))
}

fn read_ds(value: &[u8]) -> Result<f64, String> {
    std::str::from_utf8(value)
        .map_err(|_| "non-ASCII DS value".to_string())?
        .trim()
        .trim_end_matches('\0')
        .parse::<f64>()
        .map_err(|e| format!("bad DS value: {e}"))
}

/// PixelSpacing is a two-value DS: `row_spacing\column_spacing`.
fn read_spacing_pair(value: &[u8]) -> Result<(f64, f64), String> {
    let text = std::str::from_utf8(value).map_err(|_| "non-ASCII DS value".to_string())?;
    let mut parts = text.trim().trim_end_matches('\0').split('\\');
    let row = parts
        .next()
        .ok_or("empty PixelSpacing")?
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("bad PixelSpacing: {e}"))?;
    let col = match parts.next() {
        Some(part) => part
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("bad PixelSpacing: {e}"))?,
        None => row,
    };
    Ok((row, col))
}
