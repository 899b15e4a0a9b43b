//! BMP dump of an XRGB8888 buffer.
//!
//! 32bpp uncompressed BI_RGB, negative height so rows go top-down and
//! the buffer can be written as-is without flipping.

use std::fs::File;
use std::io::{self, Write};
use std::mem::size_of;
use std::path::Path;

#[repr(C, packed)]
struct BmpFileHeader {
    magic: [u8; 2],
    file_size: u32,
    reserved: u32,
    data_offset: u32,
}

#[repr(C, packed)]
struct BmpInfoHeader {
    header_size: u32,
    width: i32,
    height: i32,
    planes: u16,
    bpp: u16,
    compression: u32,
    image_size: u32,
    x_ppm: i32,
    y_ppm: i32,
    colors_used: u32,
    colors_important: u32,
}

const HEADERS_LEN: usize = size_of::<BmpFileHeader>() + size_of::<BmpInfoHeader>();

/// The 54 header bytes for a width x height 32bpp image.
pub fn encode_headers(width: u32, height: u32) -> [u8; HEADERS_LEN] {
    let image_size = width * height * 4;
    let file = BmpFileHeader {
        magic: *b"BM",
        file_size: HEADERS_LEN as u32 + image_size,
        reserved: 0,
        data_offset: HEADERS_LEN as u32,
    };
    let info = BmpInfoHeader {
        header_size: size_of::<BmpInfoHeader>() as u32,
        width: width as i32,
        height: -(height as i32),
        planes: 1,
        bpp: 32,
        compression: 0,
        image_size,
        x_ppm: 0,
        y_ppm: 0,
        colors_used: 0,
        colors_important: 0,
    };

    let mut out = [0u8; HEADERS_LEN];
    unsafe {
        std::ptr::copy_nonoverlapping(
            &file as *const _ as *const u8,
            out.as_mut_ptr(),
            size_of::<BmpFileHeader>(),
        );
        std::ptr::copy_nonoverlapping(
            &info as *const _ as *const u8,
            out.as_mut_ptr().add(size_of::<BmpFileHeader>()),
            size_of::<BmpInfoHeader>(),
        );
    }
    out
}

/// Write `data` (tightly packed XRGB8888 rows) to `path`.
pub fn write_bmp(path: &Path, data: &[u8], width: u32, height: u32) -> io::Result<()> {
    let expected = (width * height * 4) as usize;
    if data.len() < expected {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "buffer smaller than image",
        ));
    }
    let mut f = File::create(path)?;
    f.write_all(&encode_headers(width, height))?;
    f.write_all(&data[..expected])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        assert_eq!(HEADERS_LEN, 54);
        let h = encode_headers(720, 1280);
        assert_eq!(&h[0..2], b"BM");
        // File size.
        assert_eq!(
            u32::from_le_bytes([h[2], h[3], h[4], h[5]]),
            54 + 720 * 1280 * 4
        );
        // Pixel data offset.
        assert_eq!(u32::from_le_bytes([h[10], h[11], h[12], h[13]]), 54);
        // Info header size, width, negative height.
        assert_eq!(u32::from_le_bytes([h[14], h[15], h[16], h[17]]), 40);
        assert_eq!(i32::from_le_bytes([h[18], h[19], h[20], h[21]]), 720);
        assert_eq!(i32::from_le_bytes([h[22], h[23], h[24], h[25]]), -1280);
        // One plane, 32 bpp, BI_RGB.
        assert_eq!(u16::from_le_bytes([h[26], h[27]]), 1);
        assert_eq!(u16::from_le_bytes([h[28], h[29]]), 32);
        assert_eq!(u32::from_le_bytes([h[30], h[31], h[32], h[33]]), 0);
    }

    #[test]
    fn test_write_rejects_short_buffer() {
        let tmp = std::env::temp_dir().join("kmstest-short.bmp");
        let err = write_bmp(&tmp, &[0u8; 16], 720, 1280);
        assert!(err.is_err());
    }

    #[test]
    fn test_write_round_trip() {
        let tmp = std::env::temp_dir().join(format!("kmstest-{}.bmp", std::process::id()));
        let data = vec![0x42u8; 2 * 2 * 4];
        write_bmp(&tmp, &data, 2, 2).unwrap();
        let bytes = std::fs::read(&tmp).unwrap();
        assert_eq!(bytes.len(), 54 + 16);
        assert_eq!(&bytes[0..2], b"BM");
        assert_eq!(&bytes[54..], &data[..]);
        let _ = std::fs::remove_file(&tmp);
    }
}
