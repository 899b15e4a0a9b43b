//! FIMC camera/post-processor demo.
//!
//! Two paths through the FIMC IPP driver:
//!
//! - `m2m`: memory-to-memory color conversion with scaling, XRGB8888
//!   source to YUV444 destination, one frame-done event per pass.
//! - `wb`: display writeback into a three-buffer capture ring. Frames
//!   are re-queued by the slot index the event reports; halfway through
//!   the run the operation is stopped, reconfigured with a 180 degree
//!   rotation and restarted.
//!
//! Usage: fimctest <m2m|wb> [-n <frames>]

use drm_core::{event, mode, Device, EventHandler};
use drm_exynos::sys::{IppBufCtrl, IppCmd, IppDegree, IppFlip};
use drm_exynos::{gem, ipp, sys as exynos_sys};
use kmstest::draw;
use kmstest::evloop::{wait_device_or_stdin, Wake};

use std::process::exit;

const SRC_W: u32 = 720;
const SRC_H: u32 = 1280;
const DST_W: u32 = 360;
const DST_H: u32 = 640;

const WB_BUF_NR: u32 = 3;
const DEFAULT_FRAMES: u32 = 60;
const EVENT_TIMEOUT_MS: u16 = 3000;

fn usage() -> ! {
    eprintln!("usage: fimctest <m2m|wb> [-n <frames>]");
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

// ── Memory-to-memory scale and color conversion ──

fn run_m2m(dev: &Device, frames: u32) -> drm_core::Result<()> {
    let src_size = (SRC_W * SRC_H * 4) as u64;
    // YUV444: three full-resolution planes in one object.
    let dst_size = (DST_W * DST_H * 3) as u64;

    let src = gem::create(dev, src_size, exynos_sys::EXYNOS_BO_CONTIG)?;
    let dst = gem::create(dev, dst_size, exynos_sys::EXYNOS_BO_CONTIG)?;
    let mut src_map = gem::map_direct(dev, src, src_size)?;
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
        IppDegree::D0,
        drm_core::sys::DRM_FORMAT_YUV444,
        DST_W,
        DST_H,
    );
    ipp::set_property(dev, src_cfg, dst_cfg)?;

    ipp::queue_buf(
        dev,
        exynos_sys::EXYNOS_DRM_OPS_SRC,
        IppBufCtrl::Map,
        0,
        [src, 0, 0],
    )?;
    ipp::queue_buf(
        dev,
        exynos_sys::EXYNOS_DRM_OPS_DST,
        IppBufCtrl::Map,
        0,
        [dst, 0, 0],
    )?;

    ipp::ctrl(dev, IppCmd::M2m, true)?;
    println!(
        "scale/csc {}x{} XRGB -> {}x{} YUV444, {} frames",
        SRC_W, SRC_H, DST_W, DST_H, frames
    );

    for _ in 0..frames {
        let Some(buf_idx) = wait_frame(dev)? else {
            break;
        };
        ipp::queue_buf(
            dev,
            exynos_sys::EXYNOS_DRM_OPS_DST,
            IppBufCtrl::Queue,
            buf_idx,
            [dst, 0, 0],
        )?;
    }

    ipp::ctrl(dev, IppCmd::M2m, false)?;
    ipp::queue_buf(
        dev,
        exynos_sys::EXYNOS_DRM_OPS_SRC,
        IppBufCtrl::Unmap,
        0,
        [src, 0, 0],
    )?;
    ipp::queue_buf(
        dev,
        exynos_sys::EXYNOS_DRM_OPS_DST,
        IppBufCtrl::Unmap,
        0,
        [dst, 0, 0],
    )?;

    drop(src_map);
    drm_core::gem::gem_close(dev, src)?;
    drm_core::gem::gem_close(dev, dst)?;
    Ok(())
}

// ── Display writeback ──

fn wb_property(dev: &Device, degree: IppDegree) -> drm_core::Result<()> {
    // Writeback source is the display path; only the destination plane
    // is described from userspace.
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
        degree,
        drm_core::sys::DRM_FORMAT_XRGB8888,
        SRC_W,
        SRC_H,
    );
    ipp::set_property(dev, src_cfg, dst_cfg)
}

fn run_wb(dev: &Device, frames: u32) -> drm_core::Result<()> {
    wb_property(dev, IppDegree::D0)?;

    // Capture ring of dumb buffers, all mapped and queued up front.
    let mut ring = Vec::with_capacity(WB_BUF_NR as usize);
    for id in 0..WB_BUF_NR {
        let buf = mode::create_dumb(dev, SRC_W, SRC_H, 32)?;
        ipp::queue_buf(
            dev,
            exynos_sys::EXYNOS_DRM_OPS_DST,
            IppBufCtrl::Map,
            id,
            [buf.handle, 0, 0],
        )?;
        ring.push(buf);
    }

    ipp::ctrl(dev, IppCmd::Wb, true)?;
    println!("writeback capture, {} buffers, {} frames", WB_BUF_NR, frames);

    let mut rotated = false;
    for frame in 0..frames {
        let Some(buf_idx) = wait_frame(dev)? else {
            break;
        };
        if buf_idx >= WB_BUF_NR {
            println!("unexpected slot {} in frame-done event", buf_idx);
            break;
        }

        // Halfway through: stop, rotate the capture, restart.
        if frame == frames / 2 && !rotated {
            ipp::ctrl(dev, IppCmd::Wb, false)?;
            wb_property(dev, IppDegree::D180)?;
            ipp::ctrl(dev, IppCmd::Wb, true)?;
            rotated = true;
            println!("reconfigured writeback with 180 degree rotation");
        }

        ipp::queue_buf(
            dev,
            exynos_sys::EXYNOS_DRM_OPS_DST,
            IppBufCtrl::Queue,
            buf_idx,
            [ring[buf_idx as usize].handle, 0, 0],
        )?;
    }

    ipp::ctrl(dev, IppCmd::Wb, false)?;
    for (id, buf) in ring.iter().enumerate() {
        ipp::queue_buf(
            dev,
            exynos_sys::EXYNOS_DRM_OPS_DST,
            IppBufCtrl::Unmap,
            id as u32,
            [buf.handle, 0, 0],
        )?;
        mode::destroy_dumb(dev, buf.handle)?;
    }
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        usage();
    }
    let cmd = args[0].as_str();

    let mut frames = DEFAULT_FRAMES;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-n" => {
                i += 1;
                let v = args.get(i).unwrap_or_else(|| usage());
                frames = v.parse().unwrap_or_else(|_| usage());
            }
            _ => usage(),
        }
        i += 1;
    }

    let result = match drm_exynos::open_device() {
        Ok(dev) => match cmd {
            "m2m" => run_m2m(&dev, frames),
            "wb" => run_wb(&dev, frames),
            _ => usage(),
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("fimctest: {}", e);
        exit(1);
    }
}
