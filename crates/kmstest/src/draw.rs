//! Test-pattern fills for mapped XRGB8888 buffers.

/// Eight vertical color bars.
const BAR_COLORS: [u32; 8] = [
    0x00ff_ffff, // white
    0x00ff_ff00, // yellow
    0x0000_ffff, // cyan
    0x0000_ff00, // green
    0x00ff_00ff, // magenta
    0x00ff_0000, // red
    0x0000_00ff, // blue
    0x0000_0000, // black
];

fn put_pixel(buf: &mut [u8], pitch: u32, x: u32, y: u32, color: u32) {
    let off = (y * pitch + x * 4) as usize;
    buf[off..off + 4].copy_from_slice(&color.to_le_bytes());
}

/// Color bars across the full width.
pub fn fill_bars(buf: &mut [u8], width: u32, height: u32, pitch: u32) {
    let bar_w = (width / BAR_COLORS.len() as u32).max(1);
    for y in 0..height {
        for x in 0..width {
            let bar = ((x / bar_w) as usize).min(BAR_COLORS.len() - 1);
            put_pixel(buf, pitch, x, y, BAR_COLORS[bar]);
        }
    }
}

/// Checkerboard with `cell` pixel squares in two fixed colors.
pub fn fill_checker(buf: &mut [u8], width: u32, height: u32, pitch: u32, cell: u32) {
    let cell = cell.max(1);
    for y in 0..height {
        for x in 0..width {
            let on = ((x / cell) + (y / cell)) % 2 == 0;
            let color = if on { 0x00cc_cccc } else { 0x0033_3333 };
            put_pixel(buf, pitch, x, y, color);
        }
    }
}

/// Solid fill.
pub fn fill_solid(buf: &mut [u8], width: u32, height: u32, pitch: u32, color: u32) {
    for y in 0..height {
        for x in 0..width {
            put_pixel(buf, pitch, x, y, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(buf: &[u8], pitch: u32, x: u32, y: u32) -> u32 {
        let off = (y * pitch + x * 4) as usize;
        u32::from_le_bytes([buf[off], buf[off + 1], buf[off + 2], buf[off + 3]])
    }

    #[test]
    fn test_fill_bars_first_and_last() {
        let (w, h) = (64u32, 4u32);
        let pitch = w * 4;
        let mut buf = vec![0u8; (pitch * h) as usize];
        fill_bars(&mut buf, w, h, pitch);
        assert_eq!(pixel(&buf, pitch, 0, 0), 0x00ff_ffff);
        assert_eq!(pixel(&buf, pitch, w - 1, h - 1), 0x0000_0000);
    }

    #[test]
    fn test_fill_checker_alternates() {
        let (w, h) = (8u32, 8u32);
        let pitch = w * 4;
        let mut buf = vec![0u8; (pitch * h) as usize];
        fill_checker(&mut buf, w, h, pitch, 4);
        assert_eq!(pixel(&buf, pitch, 0, 0), 0x00cc_cccc);
        assert_eq!(pixel(&buf, pitch, 4, 0), 0x0033_3333);
        assert_eq!(pixel(&buf, pitch, 4, 4), 0x00cc_cccc);
    }

    #[test]
    fn test_fill_solid_respects_pitch() {
        let (w, h) = (2u32, 2u32);
        // Pitch wider than the row, padding untouched.
        let pitch = 16u32;
        let mut buf = vec![0xEE; (pitch * h) as usize];
        fill_solid(&mut buf, w, h, pitch, 0x0012_3456);
        assert_eq!(pixel(&buf, pitch, 1, 1), 0x0012_3456);
        assert_eq!(buf[8], 0xEE);
    }
}
