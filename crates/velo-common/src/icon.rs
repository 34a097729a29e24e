//! In-memory icon decoding shared by the tray and the window chrome.
//!
//! Accepts any container the `image` crate is built with here (ICO with
//! several resolutions, PNG, BMP). Multi-resolution ICO files decode to the
//! largest entry; the native side scales down as needed.

use crate::errors::PlatformError;

/// Decoded straight RGBA8 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconImage {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl IconImage {
    pub fn into_parts(self) -> (Vec<u8>, u32, u32) {
        (self.rgba, self.width, self.height)
    }
}

/// Decode an icon from raw image bytes.
pub fn decode_icon(bytes: &[u8]) -> Result<IconImage, PlatformError> {
    if bytes.is_empty() {
        return Err(PlatformError::IconDecode("empty icon data".into()));
    }

    let img = image::load_from_memory(bytes)
        .map_err(|e| PlatformError::IconDecode(e.to_string()))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(PlatformError::IconDecode("icon has zero size".into()));
    }

    Ok(IconImage {
        rgba: rgba.into_raw(),
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode(width: u32, height: u32, format: image::ImageFormat) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    #[test]
    fn decodes_png() {
        let bytes = encode(16, 8, image::ImageFormat::Png);
        let icon = decode_icon(&bytes).unwrap();
        assert_eq!(icon.width, 16);
        assert_eq!(icon.height, 8);
        assert_eq!(icon.rgba.len(), 16 * 8 * 4);
        assert_eq!(&icon.rgba[0..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn decodes_ico() {
        let bytes = encode(32, 32, image::ImageFormat::Ico);
        let icon = decode_icon(&bytes).unwrap();
        assert_eq!((icon.width, icon.height), (32, 32));
    }

    #[test]
    fn rejects_empty_bytes() {
        let err = decode_icon(&[]).unwrap_err();
        assert!(matches!(err, PlatformError::IconDecode(_)));
    }

    #[test]
    fn rejects_garbage() {
        let err = decode_icon(b"definitely not an image").unwrap_err();
        assert!(matches!(err, PlatformError::IconDecode(_)));
    }

    #[test]
    fn into_parts_hands_back_pixels() {
        let bytes = encode(2, 2, image::ImageFormat::Png);
        let (rgba, w, h) = decode_icon(&bytes).unwrap().into_parts();
        assert_eq!((w, h), (2, 2));
        assert_eq!(rgba.len(), 16);
    }
}
