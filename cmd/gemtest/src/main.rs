//! Exynos GEM and mode-setting demo.
//!
//! Dump options list encoders, connectors, CRTCs and framebuffers.
//! The mode-set path exercises every allocation route (vendor GEM with
//! both mapping paths, userptr import, UMP export), puts a framebuffer
//! on screen and runs a page-flip loop that reports flips per second
//! every 60 swaps. A keypress ends the loop.
//!
//! Usage: gemtest [-ecpfP] [-s <connector_id>@<crtc_id>:<mode>]

use drm_core::sys::DRM_MODE_PAGE_FLIP_EVENT;
use drm_core::{event, mode, Device, EventHandler, PageFlipEvent};
use drm_exynos::{gem, sys as exynos_sys};
use kmstest::draw;
use kmstest::evloop::{wait_device_or_stdin, Wake};
use kmstest::resources;

use std::process::exit;

fn usage() -> ! {
    eprintln!("usage: gemtest [-ecpfP] [-s <connector_id>@<crtc_id>:<mode>]");
    eprintln!("  -e         dump encoders");
    eprintln!("  -c         dump connectors (with modes)");
    eprintln!("  -p         dump CRTCs");
    eprintln!("  -f         dump framebuffers");
    eprintln!("  -P         dump planes");
    eprintln!("  -s spec    set a mode and run the page-flip loop");
    exit(1);
}

/// `<connector_id>@<crtc_id>:<mode>` with an optional mode name.
struct ModeSpec {
    connector_id: u32,
    crtc_id: u32,
    mode_name: Option<String>,
}

fn parse_spec(s: &str) -> Option<ModeSpec> {
    let (con, rest) = s.split_once('@')?;
    let (crtc, mode_name) = match rest.split_once(':') {
        Some((crtc, name)) => (crtc, Some(name.to_string())),
        None => (rest, None),
    };
    Some(ModeSpec {
        connector_id: con.parse().ok()?,
        crtc_id: crtc.parse().ok()?,
        mode_name,
    })
}

// ── GEM allocation smoke ──

fn gem_smoke(dev: &Device) -> drm_core::Result<()> {
    println!("GEM allocation paths:");

    let size = 4096 * 16u64;
    let handle = gem::create(dev, size, exynos_sys::EXYNOS_BO_CONTIG)?;
    println!("  create: handle {} size {}", handle, size);

    // Fake-offset mapping plus a cache flush over it.
    let mapping = gem::map(dev, handle, size)?;
    gem::cache_op(
        dev,
        mapping.as_ptr() as u64,
        size as u32,
        exynos_sys::EXYNOS_DRM_ALL_CACHE | exynos_sys::EXYNOS_DRM_CACHE_FSH,
    )?;
    println!("  map offset path: {:p}, cache flushed", mapping.as_ptr());

    // Vendor in-kernel mmap path on a second object.
    let handle2 = gem::create(dev, size, exynos_sys::EXYNOS_BO_CONTIG)?;
    let direct = gem::map_direct(dev, handle2, size)?;
    println!("  direct mmap path: {:p}", direct.as_ptr());

    // Userptr import over the first mapping.
    match gem::import_userptr(dev, mapping.as_ptr() as u64, size as u32) {
        Ok(imp) => {
            println!("  userptr import: handle {}", imp);
            drm_core::gem::gem_close(dev, imp)?;
        }
        Err(e) => println!("  userptr import unsupported: {}", e),
    }

    // UMP secure id.
    match gem::export_ump(dev, handle) {
        Ok(id) => println!("  ump secure id: {}", id),
        Err(e) => println!("  ump export unsupported: {}", e),
    }

    drop(direct);
    drop(mapping);
    drm_core::gem::gem_close(dev, handle2)?;
    drm_core::gem::gem_close(dev, handle)?;
    Ok(())
}

// ── Page-flip loop ──

struct FlipState {
    flipped: bool,
}

impl EventHandler for FlipState {
    fn page_flip(&mut self, _ev: &PageFlipEvent) {
        self.flipped = true;
    }
}

struct Framebuffer {
    fb_id: u32,
    handle: u32,
}

fn make_fb(dev: &Device, width: u32, height: u32, color_seed: u32) -> drm_core::Result<Framebuffer> {
    let pitch = width * 4;
    let size = (pitch * height) as u64;
    let handle = gem::create(dev, size, exynos_sys::EXYNOS_BO_CONTIG)?;
    let mut mapping = gem::map(dev, handle, size)?;
    if color_seed % 2 == 0 {
        draw::fill_bars(mapping.as_mut_slice(), width, height, pitch);
    } else {
        draw::fill_checker(mapping.as_mut_slice(), width, height, pitch, 32);
    }
    let fb_id = mode::add_fb(dev, width, height, 24, 32, pitch, handle)?;
    Ok(Framebuffer { fb_id, handle })
}

fn run_modeset(dev: &Device, spec: &ModeSpec) -> drm_core::Result<()> {
    let pipe = resources::find_pipe(dev, spec.connector_id, spec.mode_name.as_deref())?;
    let crtc_id = if spec.crtc_id != 0 {
        spec.crtc_id
    } else {
        pipe.crtc_id
    };
    let (w, h) = (pipe.mode.hdisplay as u32, pipe.mode.vdisplay as u32);
    println!(
        "setting mode {} on connector {} crtc {}",
        pipe.mode.name_str(),
        spec.connector_id,
        crtc_id
    );

    let fbs = [make_fb(dev, w, h, 0)?, make_fb(dev, w, h, 1)?];
    mode::set_crtc(dev, crtc_id, fbs[0].fb_id, 0, 0, &[spec.connector_id], &pipe.mode)?;

    // Flip loop: swap buffers on every completion, report the rate
    // every 60 swaps, stop on a keypress.
    let mut front = 0usize;
    let mut swaps = 0u32;
    let mut window_start = std::time::Instant::now();
    mode::page_flip(
        dev,
        crtc_id,
        fbs[1].fb_id,
        DRM_MODE_PAGE_FLIP_EVENT,
        0,
    )?;

    loop {
        match wait_device_or_stdin(dev.fd(), 3000)? {
            Wake::Stdin => break,
            Wake::Timeout => {
                println!("timeout waiting for flip event");
                break;
            }
            Wake::Device => {}
        }
        let mut state = FlipState { flipped: false };
        event::handle_event(dev, &mut state)?;
        if !state.flipped {
            continue;
        }

        front ^= 1;
        swaps += 1;
        if swaps % 60 == 0 {
            let dt = window_start.elapsed().as_secs_f64();
            println!("freq: {:.2}Hz", 60.0 / dt);
            window_start = std::time::Instant::now();
        }
        mode::page_flip(
            dev,
            crtc_id,
            fbs[front ^ 1].fb_id,
            DRM_MODE_PAGE_FLIP_EVENT,
            0,
        )?;
    }

    for fb in &fbs {
        mode::rm_fb(dev, fb.fb_id)?;
        drm_core::gem::gem_close(dev, fb.handle)?;
    }
    Ok(())
}

fn run() -> drm_core::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut spec: Option<ModeSpec> = None;
    let mut dumps: Vec<char> = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-s" => {
                i += 1;
                let raw = args.get(i).unwrap_or_else(|| usage());
                spec = Some(parse_spec(raw).unwrap_or_else(|| usage()));
            }
            flag if flag.starts_with('-') => {
                for c in flag.chars().skip(1) {
                    match c {
                        'e' | 'c' | 'p' | 'f' | 'P' => dumps.push(c),
                        _ => usage(),
                    }
                }
            }
            _ => usage(),
        }
        i += 1;
    }

    let dev = drm_exynos::open_device()?;

    if dumps.is_empty() && spec.is_none() {
        dumps = vec!['e', 'c', 'p', 'f'];
    }
    for c in &dumps {
        match c {
            'e' => resources::dump_encoders(&dev)?,
            'c' => resources::dump_connectors(&dev)?,
            'p' => resources::dump_crtcs(&dev)?,
            'f' => resources::dump_framebuffers(&dev)?,
            'P' => resources::dump_planes(&dev)?,
            _ => {}
        }
    }

    if let Some(spec) = spec {
        gem_smoke(&dev)?;
        run_modeset(&dev, &spec)?;
    }
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("gemtest: {}", e);
        exit(1);
    }
}
