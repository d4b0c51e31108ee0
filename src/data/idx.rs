//! Parsers for the IDX binary files MNIST ships in.
//!
//! # IDX3 image file layout
//! ```text
//! bytes  0-1:   0x00 0x00   (reserved, must be zero)
//! byte   2:     0x08        (dtype = uint8)
//! byte   3:     0x03        (number of dimensions = 3)
//! bytes  4-7:   N           (number of images, big-endian u32)
//! bytes  8-11:  rows        (image height in pixels, big-endian u32)
//! bytes 12-15:  cols        (image width in pixels, big-endian u32)
//! bytes 16..:   N * rows * cols bytes, row-major, uint8
//! ```
//!
//! # IDX1 label file layout
//! ```text
//! bytes  0-1:   0x00 0x00   (reserved, must be zero)
//! byte   2:     0x08        (dtype = uint8)
//! byte   3:     0x01        (number of dimensions = 1)
//! bytes  4-7:   N           (number of labels, big-endian u32)
//! bytes  8..:   N bytes, each a class index in [0, n_classes)
//! ```

/// Parses an IDX3 image file into per-image pixel vectors, each pixel
/// divided by 255.0 so values lie in `[0.0, 1.0]`.
///
/// Returns `(images, rows, cols)`.
pub fn parse_images(bytes: &[u8]) -> Result<(Vec<Vec<f64>>, usize, usize), String> {
    if bytes.len() < 16 {
        return Err(format!(
            "IDX image file too short: expected at least 16 header bytes, got {}.",
            bytes.len()
        ));
    }

    if bytes[0] != 0x00 || bytes[1] != 0x00 {
        return Err(format!(
            "IDX image file: bytes 0-1 must be 0x00 0x00 (reserved), got 0x{:02X} 0x{:02X}.",
            bytes[0], bytes[1]
        ));
    }
    if bytes[2] != 0x08 {
        return Err(format!(
            "IDX image file: byte 2 (dtype) must be 0x08 (uint8), got 0x{:02X}.",
            bytes[2]
        ));
    }
    if bytes[3] != 0x03 {
        return Err(format!(
            "IDX image file: byte 3 (dimensions) must be 3, got {}. \
             This does not appear to be an IDX3 image file.",
            bytes[3]
        ));
    }

    let n_items = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
    let rows = u32::from_be_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
    let cols = u32::from_be_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]) as usize;

    let n_pixels = rows.checked_mul(cols).ok_or_else(|| {
        format!(
            "IDX image file: rows * cols overflows usize (rows={}, cols={}).",
            rows, cols
        )
    })?;
    let data_len = n_items.checked_mul(n_pixels).ok_or_else(|| {
        format!(
            "IDX image file: n_items * n_pixels overflows usize (n_items={}, n_pixels={}).",
            n_items, n_pixels
        )
    })?;

    if bytes.len() < 16 + data_len {
        return Err(format!(
            "IDX image file too short: header declares {} items of {}×{} pixels \
             ({} data bytes needed after header), but file is only {} bytes total.",
            n_items,
            rows,
            cols,
            data_len,
            bytes.len()
        ));
    }

    let images = bytes[16..16 + data_len]
        .chunks_exact(n_pixels)
        .map(|chunk| chunk.iter().map(|&px| px as f64 / 255.0).collect())
        .collect();

    Ok((images, rows, cols))
}

/// Parses an IDX1 label file into integer class labels, rejecting any label
/// outside `[0, n_classes)`.
pub fn parse_labels(bytes: &[u8], n_classes: usize) -> Result<Vec<u8>, String> {
    if bytes.len() < 8 {
        return Err(format!(
            "IDX label file too short: expected at least 8 header bytes, got {}.",
            bytes.len()
        ));
    }

    if bytes[0] != 0x00 || bytes[1] != 0x00 {
        return Err(format!(
            "IDX label file: bytes 0-1 must be 0x00 0x00 (reserved), got 0x{:02X} 0x{:02X}.",
            bytes[0], bytes[1]
        ));
    }
    if bytes[2] != 0x08 {
        return Err(format!(
            "IDX label file: byte 2 (dtype) must be 0x08 (uint8), got 0x{:02X}.",
            bytes[2]
        ));
    }
    if bytes[3] != 0x01 {
        return Err(format!(
            "IDX label file: byte 3 (dimensions) must be 1, got {}. \
             This does not appear to be an IDX1 label file.",
            bytes[3]
        ));
    }

    let n_items = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;

    if bytes.len() < 8 + n_items {
        return Err(format!(
            "IDX label file too short: header declares {} labels but file is only {} bytes \
             (need at least {} bytes).",
            n_items,
            bytes.len(),
            8 + n_items
        ));
    }

    let labels = bytes[8..8 + n_items].to_vec();
    for (i, &label) in labels.iter().enumerate() {
        if label as usize >= n_classes {
            return Err(format!(
                "IDX label at index {}: class index {} is out of range for n_classes={}.",
                i, label, n_classes
            ));
        }
    }

    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_file(n: u32, rows: u32, cols: u32, pixels: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0x00, 0x00, 0x08, 0x03];
        bytes.extend_from_slice(&n.to_be_bytes());
        bytes.extend_from_slice(&rows.to_be_bytes());
        bytes.extend_from_slice(&cols.to_be_bytes());
        bytes.extend_from_slice(pixels);
        bytes
    }

    fn label_file(labels: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0x00, 0x00, 0x08, 0x01];
        bytes.extend_from_slice(&(labels.len() as u32).to_be_bytes());
        bytes.extend_from_slice(labels);
        bytes
    }

    #[test]
    fn parses_images_and_normalizes() {
        let bytes = image_file(2, 2, 2, &[0, 51, 102, 255, 255, 0, 0, 255]);
        let (images, rows, cols) = parse_images(&bytes).unwrap();
        assert_eq!((rows, cols), (2, 2));
        assert_eq!(images.len(), 2);
        assert_eq!(images[0], vec![0.0, 0.2, 0.4, 1.0]);
        assert_eq!(images[1], vec![1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn parses_labels() {
        let bytes = label_file(&[3, 1, 4, 1, 5, 9]);
        let labels = parse_labels(&bytes, 10).unwrap();
        assert_eq!(labels, vec![3, 1, 4, 1, 5, 9]);
    }

    #[test]
    fn rejects_wrong_magic() {
        let mut bytes = image_file(1, 1, 1, &[0]);
        bytes[3] = 0x01; // label dimensionality in an image file
        let err = parse_images(&bytes).unwrap_err();
        assert!(err.contains("byte 3"), "unexpected error: {}", err);
    }

    #[test]
    fn rejects_truncated_image_data() {
        let bytes = image_file(2, 2, 2, &[0; 4]); // declares 8 pixel bytes, has 4
        assert!(parse_images(&bytes).is_err());
    }

    #[test]
    fn rejects_out_of_range_label() {
        let bytes = label_file(&[0, 9, 10]);
        let err = parse_labels(&bytes, 10).unwrap_err();
        assert!(err.contains("out of range"), "unexpected error: {}", err);
    }
}
