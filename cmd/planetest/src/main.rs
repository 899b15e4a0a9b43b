//! Overlay plane demo.
//!
//! Sets a mode on the primary framebuffer, then stacks overlay planes
//! on top of it. Each plane gets its own buffer, a shrinking size, a
//! diagonal offset and an explicit z-position, so the stacking order is
//! visible on screen. A keypress tears everything down.
//!
//! Usage: planetest [-s <connector_id>@<crtc_id>[/<count>[/<start>]]]

use drm_core::{mode, Device};
use drm_exynos::{gem, sys as exynos_sys};
use kmstest::draw;
use kmstest::evloop::{wait_device_or_stdin, Wake};
use kmstest::resources;

use std::process::exit;

const DEFAULT_CONNECTOR: u32 = 11;
const DEFAULT_PLANES: usize = 5;
const STEP: u32 = 40;

fn usage() -> ! {
    eprintln!("usage: planetest [-s <connector_id>@<crtc_id>[/<count>[/<start>]]]");
    eprintln!("  count  number of overlay planes to stack (default {})", DEFAULT_PLANES);
    eprintln!("  start  index of the first plane to use (default 0)");
    exit(1);
}

struct PlaneFb {
    plane_id: u32,
    fb_id: u32,
    handle: u32,
}

fn make_buffer(dev: &Device, w: u32, h: u32, pattern: usize) -> drm_core::Result<(u32, u32)> {
    let pitch = w * 4;
    let size = (pitch * h) as u64;
    let handle = gem::create(dev, size, exynos_sys::EXYNOS_BO_CONTIG)?;
    let mut mapping = gem::map(dev, handle, size)?;
    match pattern % 3 {
        0 => draw::fill_bars(mapping.as_mut_slice(), w, h, pitch),
        1 => draw::fill_checker(mapping.as_mut_slice(), w, h, pitch, 32),
        _ => draw::fill_solid(mapping.as_mut_slice(), w, h, pitch, 0x00ff_8000),
    }
    let fb_id = mode::add_fb(dev, w, h, 24, 32, pitch, handle)?;
    Ok((fb_id, handle))
}

fn run(
    connector_id: u32,
    crtc_override: u32,
    plane_count: usize,
    plane_start: usize,
) -> drm_core::Result<()> {
    let dev = drm_exynos::open_device()?;

    let pipe = resources::find_pipe(&dev, connector_id, None)?;
    let crtc_id = if crtc_override != 0 {
        crtc_override
    } else {
        pipe.crtc_id
    };
    let (w, h) = (pipe.mode.hdisplay as u32, pipe.mode.vdisplay as u32);

    // Fullscreen base layer.
    let (base_fb, base_handle) = make_buffer(&dev, w, h, 2)?;
    mode::set_crtc(&dev, crtc_id, base_fb, 0, 0, &[connector_id], &pipe.mode)?;
    println!(
        "mode {} on connector {} crtc {}",
        pipe.mode.name_str(),
        connector_id,
        crtc_id
    );

    let plane_ids = mode::get_plane_resources(&dev)?;
    let available = plane_ids.len().saturating_sub(plane_start);
    if available < plane_count {
        println!("only {} planes available, wanted {}", available, plane_count);
    }

    let mut planes: Vec<PlaneFb> = Vec::new();
    for (i, plane_id) in plane_ids
        .iter()
        .skip(plane_start)
        .take(plane_count)
        .enumerate()
    {
        let i32_idx = i as u32;
        // Each layer is smaller than the one below and offset diagonally.
        let pw = (w / 2).saturating_sub(i32_idx * STEP).max(STEP);
        let ph = (h / 2).saturating_sub(i32_idx * STEP).max(STEP);
        let (fb_id, handle) = make_buffer(&dev, pw, ph, i)?;

        gem::plane_set_zpos(&dev, *plane_id, i as i32)?;
        mode::set_plane(
            &dev,
            *plane_id,
            crtc_id,
            fb_id,
            (i32_idx * STEP) as i32,
            (i32_idx * STEP) as i32,
            pw,
            ph,
            0,
            0,
            pw,
            ph,
        )?;
        println!(
            "plane {} zpos {} {}x{} at ({},{})",
            plane_id,
            i,
            pw,
            ph,
            i32_idx * STEP,
            i32_idx * STEP
        );
        planes.push(PlaneFb {
            plane_id: *plane_id,
            fb_id,
            handle,
        });
    }

    println!("press enter to exit");
    loop {
        if wait_device_or_stdin(dev.fd(), 3000)? == Wake::Stdin {
            break;
        }
    }

    for p in &planes {
        mode::disable_plane(&dev, p.plane_id)?;
        mode::rm_fb(&dev, p.fb_id)?;
        drm_core::gem::gem_close(&dev, p.handle)?;
    }
    mode::rm_fb(&dev, base_fb)?;
    drm_core::gem::gem_close(&dev, base_handle)?;
    Ok(())
}

/// `<connector_id>@<crtc_id>[/<count>[/<start>]]`.
fn parse_spec(raw: &str) -> Option<(u32, u32, usize, usize)> {
    let (con, rest) = raw.split_once('@')?;
    let mut parts = rest.split('/');
    let crtc = parts.next()?.parse().ok()?;
    let count = match parts.next() {
        Some(v) => v.parse().ok()?,
        None => DEFAULT_PLANES,
    };
    let start = match parts.next() {
        Some(v) => v.parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }
    Some((con.parse().ok()?, crtc, count, start))
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (connector_id, crtc_id, plane_count, plane_start) = match args.as_slice() {
        [] => (DEFAULT_CONNECTOR, 0, DEFAULT_PLANES, 0),
        [flag, value] if flag == "-s" => parse_spec(value).unwrap_or_else(|| usage()),
        _ => usage(),
    };

    if let Err(e) = run(connector_id, crtc_id, plane_count, plane_start) {
        eprintln!("planetest: {}", e);
        exit(1);
    }
}
