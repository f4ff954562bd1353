//! Named colors and zone color vectors.
//!
//! A color-table upload paints the whole keyboard at once: the firmware
//! expects a full color matrix on the bulk endpoint, written once per matrix
//! row. The matrix is 8 rows of 16 cells, 4 bytes `[red, green, blue, 0x00]`
//! per cell, row-major.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Error, Result};

/// Rows in the firmware color matrix.
pub const MATRIX_ROWS: usize = 8;

/// Cells per matrix row.
pub const MATRIX_COLS: usize = 16;

/// Bytes per cell: red, green, blue, padding.
const CELL_LEN: usize = 4;

/// Length of one full color vector.
pub const VECTOR_LEN: usize = MATRIX_ROWS * MATRIX_COLS * CELL_LEN;

type Rgb = (u8, u8, u8);

/// Look up a color name. Names are lowercase and matched exactly.
fn rgb(name: &str) -> Result<Rgb> {
    let rgb = match name {
        "red" => (0xff, 0x00, 0x00),
        "green" => (0x00, 0x80, 0x00),
        "blue" => (0x00, 0x00, 0xff),
        "teal" => (0x00, 0x80, 0x80),
        "pink" => (0xff, 0xc0, 0xcb),
        "purple" => (0x80, 0x00, 0x80),
        "white" => (0xff, 0xff, 0xff),
        "yellow" => (0xff, 0xff, 0x00),
        "orange" => (0xff, 0xa5, 0x00),
        "olive" => (0x80, 0x80, 0x00),
        "maroon" => (0x80, 0x00, 0x00),
        "brown" => (0xa5, 0x2a, 0x2a),
        "gray" => (0x80, 0x80, 0x80),
        "skyblue" => (0x87, 0xce, 0xeb),
        "navy" => (0x00, 0x00, 0x80),
        "crimson" => (0xdc, 0x14, 0x3c),
        "darkgreen" => (0x00, 0x64, 0x00),
        "lightgreen" => (0x90, 0xee, 0x90),
        "gold" => (0xff, 0xd7, 0x00),
        "violet" => (0xee, 0x82, 0xee),
        _ => return Err(Error::UnknownColor(name.to_owned())),
    };

    Ok(rgb)
}

/// Uniform color over the whole matrix.
pub fn mono_vector(name: &str) -> Result<Bytes> {
    let color = rgb(name)?;
    Ok(build_vector(|_, _| color))
}

/// Horizontal stripes: rows alternate between the two colors.
pub fn horizontal_alt_vector(name_a: &str, name_b: &str) -> Result<Bytes> {
    let a = rgb(name_a)?;
    let b = rgb(name_b)?;
    Ok(build_vector(|row, _| if row % 2 == 0 { a } else { b }))
}

/// Vertical stripes: columns alternate between the two colors.
pub fn vertical_alt_vector(name_a: &str, name_b: &str) -> Result<Bytes> {
    let a = rgb(name_a)?;
    let b = rgb(name_b)?;
    Ok(build_vector(|_, col| if col % 2 == 0 { a } else { b }))
}

fn build_vector(cell: impl Fn(usize, usize) -> Rgb) -> Bytes {
    let mut buf = BytesMut::with_capacity(VECTOR_LEN);

    for row in 0..MATRIX_ROWS {
        for col in 0..MATRIX_COLS {
            let (r, g, b) = cell(row, col);
            buf.put_u8(r);
            buf.put_u8(g);
            buf.put_u8(b);
            buf.put_u8(0x00);
        }
    }

    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Cell at (row, col) as an RGB triple.
    fn cell_at(vector: &Bytes, row: usize, col: usize) -> Rgb {
        let offset = (row * MATRIX_COLS + col) * CELL_LEN;
        (vector[offset], vector[offset + 1], vector[offset + 2])
    }

    #[test]
    fn mono_fills_every_cell() {
        let vector = mono_vector("red").unwrap();
        assert_eq!(vector.len(), VECTOR_LEN);

        for row in 0..MATRIX_ROWS {
            for col in 0..MATRIX_COLS {
                assert_eq!(cell_at(&vector, row, col), (0xff, 0x00, 0x00));
            }
        }
    }

    #[test]
    fn padding_byte_is_zero() {
        let vector = mono_vector("white").unwrap();
        assert!(vector.iter().skip(3).step_by(CELL_LEN).all(|&byte| byte == 0x00));
    }

    #[test]
    fn horizontal_alternates_rows() {
        let vector = horizontal_alt_vector("red", "blue").unwrap();
        assert_eq!(vector.len(), VECTOR_LEN);
        assert_eq!(cell_at(&vector, 0, 0), (0xff, 0x00, 0x00));
        assert_eq!(cell_at(&vector, 1, 0), (0x00, 0x00, 0xff));
        assert_eq!(cell_at(&vector, 2, 5), (0xff, 0x00, 0x00));
        // Same color along a row.
        assert_eq!(cell_at(&vector, 1, 15), (0x00, 0x00, 0xff));
    }

    #[test]
    fn vertical_alternates_columns() {
        let vector = vertical_alt_vector("gold", "navy").unwrap();
        assert_eq!(cell_at(&vector, 0, 0), (0xff, 0xd7, 0x00));
        assert_eq!(cell_at(&vector, 0, 1), (0x00, 0x00, 0x80));
        // Same color along a column.
        assert_eq!(cell_at(&vector, 7, 1), (0x00, 0x00, 0x80));
    }

    #[test]
    fn unknown_names_are_rejected() {
        for result in [
            mono_vector("chartreuse"),
            horizontal_alt_vector("red", "chartreuse"),
            vertical_alt_vector("chartreuse", "red"),
        ] {
            match result {
                Err(Error::UnknownColor(name)) => assert_eq!(name, "chartreuse"),
                other => panic!("expected UnknownColor, got {other:?}"),
            }
        }
    }

    #[test]
    fn names_are_case_sensitive() {
        assert!(mono_vector("Red").is_err());
    }
}
