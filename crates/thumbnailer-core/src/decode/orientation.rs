//! EXIF orientation reading.

use std::io::Cursor;

use exif::{In, Reader, Tag};

use super::{CodecError, Orientation};

/// Read the primary-image EXIF orientation tag from encoded bytes.
///
/// Returns `Ok(None)` when the container carries EXIF data without an
/// orientation field.
///
/// # Errors
///
/// Returns `CodecError::Exif` when the container cannot be parsed or holds
/// no EXIF data at all. Callers treat this as "no correction needed".
pub fn read_orientation(bytes: &[u8]) -> Result<Option<Orientation>, CodecError> {
    let mut cursor = Cursor::new(bytes);
    let exif = Reader::new()
        .read_from_container(&mut cursor)
        .map_err(|e| CodecError::Exif(e.to_string()))?;

    Ok(exif
        .get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .map(Orientation::from))
}
