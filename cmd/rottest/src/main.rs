//! IPP rotator demo.
//!
//! Memory-to-memory 90 degree rotation of a 720x1280 XRGB8888 test
//! pattern. The source buffer holds color bars; each pass starts the
//! rotator, waits for the frame-done event and re-queues the output
//! slot. With `-o` the first rotated frame is dumped as a BMP.
//!
//! Usage: rottest [-n <frames>] [-o <out.bmp>]

use drm_core::{event, Device, EventHandler};
use drm_exynos::sys::{IppBufCtrl, IppCmd, IppDegree, IppFlip};
use drm_exynos::{gem, ipp, sys as exynos_sys};
use kmstest::evloop::{wait_device_or_stdin, Wake};
use kmstest::{bmp, draw};

use std::path::PathBuf;
use std::process::exit;

const SRC_W: u32 = 720;
const SRC_H: u32 = 1280;
const DEGREE: IppDegree = IppDegree::D90;
const DEFAULT_FRAMES: u32 = 60;
const EVENT_TIMEOUT_MS: u16 = 3000;

fn usage() -> ! {
    eprintln!("usage: rottest [-n <frames>] [-o <out.bmp>]");
    exit(1);
}

struct FrameDone {
    buf_idx: Option<u32>,
}

impl EventHandler for FrameDone {
    fn vendor(&mut self, event_type: u32, record: &[u8]) {
        if event_type != exynos_sys::DRM_EXYNOS_IPP_EVENT {
            return;
        }
        if let Some(ev) = ipp::parse_event(record) {
            self.buf_idx = Some(ev.buf_idx);
        }
    }
}

/// Wait for one frame-done event. None on timeout or keypress.
fn wait_frame(dev: &Device) -> drm_core::Result<Option<u32>> {
    loop {
        match wait_device_or_stdin(dev.fd(), EVENT_TIMEOUT_MS)? {
            Wake::Timeout => {
                println!("timeout waiting for frame-done event");
                return Ok(None);
            }
            Wake::Stdin => return Ok(None),
            Wake::Device => {}
        }
        let mut done = FrameDone { buf_idx: None };
        event::handle_event(dev, &mut done)?;
        if done.buf_idx.is_some() {
            return Ok(done.buf_idx);
        }
    }
}

fn run(frames: u32, out: Option<PathBuf>) -> drm_core::Result<()> {
    let dev = drm_exynos::open_device()?;

    let (dst_w, dst_h) = ipp::rotated_size(SRC_W, SRC_H, DEGREE);
    let src_size = (SRC_W * SRC_H * 4) as u64;
    let dst_size = (dst_w * dst_h * 4) as u64;

    let src = gem::create(&dev, src_size, exynos_sys::EXYNOS_BO_CONTIG)?;
    let dst = gem::create(&dev, dst_size, exynos_sys::EXYNOS_BO_CONTIG)?;
    let mut src_map = gem::map_direct(&dev, src, src_size)?;
    let dst_map = gem::map_direct(&dev, dst, dst_size)?;

    draw::fill_bars(src_map.as_mut_slice(), SRC_W, SRC_H, SRC_W * 4);

    let src_cfg = ipp::config(
        exynos_sys::EXYNOS_DRM_OPS_SRC,
        IppFlip::None,
        IppDegree::D0,
        drm_core::sys::DRM_FORMAT_XRGB8888,
        SRC_W,
        SRC_H,
    );
    let dst_cfg = ipp::config(
        exynos_sys::EXYNOS_DRM_OPS_DST,
        IppFlip::None,
        DEGREE,
        drm_core::sys::DRM_FORMAT_XRGB8888,
        dst_w,
        dst_h,
    );
    ipp::set_property(&dev, src_cfg, dst_cfg)?;

    ipp::queue_buf(
        &dev,
        exynos_sys::EXYNOS_DRM_OPS_SRC,
        IppBufCtrl::Map,
        0,
        [src, 0, 0],
    )?;
    ipp::queue_buf(
        &dev,
        exynos_sys::EXYNOS_DRM_OPS_DST,
        IppBufCtrl::Map,
        0,
        [dst, 0, 0],
    )?;

    ipp::ctrl(&dev, IppCmd::M2m, true)?;
    println!(
        "rotating {}x{} -> {}x{}, {} frames",
        SRC_W, SRC_H, dst_w, dst_h, frames
    );

    let mut dumped = false;
    for frame in 0..frames {
        let Some(buf_idx) = wait_frame(&dev)? else {
            break;
        };

        if let (Some(path), false) = (out.as_deref(), dumped) {
            gem::cache_op(
                &dev,
                dst_map.as_ptr() as u64,
                dst_size as u32,
                exynos_sys::EXYNOS_DRM_ALL_CACHE | exynos_sys::EXYNOS_DRM_CACHE_INV,
            )?;
            if let Err(e) = bmp::write_bmp(path, dst_map.as_slice(), dst_w, dst_h) {
                eprintln!("bmp dump failed: {}", e);
            } else {
                println!("dumped frame {} to {}", frame, path.display());
            }
            dumped = true;
        }

        // Hand the finished output slot back for the next frame.
        ipp::queue_buf(
            &dev,
            exynos_sys::EXYNOS_DRM_OPS_DST,
            IppBufCtrl::Queue,
            buf_idx,
            [dst, 0, 0],
        )?;
    }

    ipp::ctrl(&dev, IppCmd::M2m, false)?;
    ipp::queue_buf(
        &dev,
        exynos_sys::EXYNOS_DRM_OPS_SRC,
        IppBufCtrl::Unmap,
        0,
        [src, 0, 0],
    )?;
    ipp::queue_buf(
        &dev,
        exynos_sys::EXYNOS_DRM_OPS_DST,
        IppBufCtrl::Unmap,
        0,
        [dst, 0, 0],
    )?;

    drop(src_map);
    drop(dst_map);
    drm_core::gem::gem_close(&dev, src)?;
    drm_core::gem::gem_close(&dev, dst)?;
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut frames = DEFAULT_FRAMES;
    let mut out: Option<PathBuf> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-n" => {
                i += 1;
                let v = args.get(i).unwrap_or_else(|| usage());
                frames = v.parse().unwrap_or_else(|_| usage());
            }
            "-o" => {
                i += 1;
                let v = args.get(i).unwrap_or_else(|| usage());
                out = Some(PathBuf::from(v));
            }
            _ => usage(),
        }
        i += 1;
    }

    if let Err(e) = run(frames, out) {
        eprintln!("rottest: {}", e);
        exit(1);
    }
}
