//! G2D 2D accelerator demo.
//!
//! Sets a mode, then runs the accelerator against the scanned-out
//! framebuffer: a solid fill submitted with a completion event, then a
//! copy from a second buffer. The result is visible on screen while the
//! demo waits for a keypress.
//!
//! Usage: g2dtest [-s <connector_id>@<crtc_id>:<mode>]

use drm_core::{event, mode, Device, EventHandler};
use drm_exynos::{g2d, gem, sys as exynos_sys};
use kmstest::draw;
use kmstest::evloop::{wait_device_or_stdin, Wake};
use kmstest::resources;

use std::process::exit;

const DEFAULT_CONNECTOR: u32 = 12;
const DEFAULT_MODE: &str = "720x1280";

const FILL_USER_DATA: u64 = 1234;
const EVENT_TIMEOUT_MS: u16 = 3000;

fn usage() -> ! {
    eprintln!("usage: g2dtest [-s <connector_id>@<crtc_id>:<mode>]");
    exit(1);
}

struct G2dWait {
    done: bool,
}

impl EventHandler for G2dWait {
    fn vendor(&mut self, event_type: u32, record: &[u8]) {
        if event_type != exynos_sys::DRM_EXYNOS_G2D_EVENT {
            return;
        }
        if let Some(ev) = g2d::parse_event(record) {
            println!(
                "g2d complete: cmdlist {} user_data {} at {}.{:06}",
                ev.cmdlist_no, ev.user_data, ev.tv_sec, ev.tv_usec
            );
            self.done = true;
        }
    }
}

/// Kick the hardware and block until the completion event lands.
fn exec_and_wait(dev: &Device) -> drm_core::Result<()> {
    g2d::exec(dev, true)?;
    loop {
        match wait_device_or_stdin(dev.fd(), EVENT_TIMEOUT_MS)? {
            Wake::Timeout => {
                println!("timeout waiting for g2d event");
                return Ok(());
            }
            Wake::Stdin => return Ok(()),
            Wake::Device => {}
        }
        let mut wait = G2dWait { done: false };
        event::handle_event(dev, &mut wait)?;
        if wait.done {
            return Ok(());
        }
    }
}

fn run(spec_arg: Option<&str>) -> drm_core::Result<()> {
    let dev = drm_exynos::open_device()?;
    let (major, minor) = g2d::check_version(&dev)?;
    println!("g2d driver version {}.{}", major, minor);

    let (connector_id, crtc_override, mode_name) = match spec_arg {
        Some(raw) => {
            let (con, rest) = raw.split_once('@').unwrap_or_else(|| usage());
            let (crtc, name) = match rest.split_once(':') {
                Some((crtc, name)) => (crtc, Some(name.to_string())),
                None => (rest, None),
            };
            (
                con.parse().unwrap_or_else(|_| usage()),
                crtc.parse().unwrap_or_else(|_| usage()),
                name,
            )
        }
        None => (DEFAULT_CONNECTOR, 0u32, Some(DEFAULT_MODE.to_string())),
    };

    let pipe = resources::find_pipe(&dev, connector_id, mode_name.as_deref())?;
    let crtc_id = if crtc_override != 0 {
        crtc_override
    } else {
        pipe.crtc_id
    };
    let (w, h) = (pipe.mode.hdisplay as u32, pipe.mode.vdisplay as u32);
    let pitch = w * 4;
    let size = (pitch * h) as u64;

    // Scan-out buffer, initially color bars.
    let dst = gem::create(&dev, size, exynos_sys::EXYNOS_BO_CONTIG)?;
    let mut dst_map = gem::map(&dev, dst, size)?;
    draw::fill_bars(dst_map.as_mut_slice(), w, h, pitch);
    let fb_id = mode::add_fb(&dev, w, h, 24, 32, pitch, dst)?;
    mode::set_crtc(&dev, crtc_id, fb_id, 0, 0, &[connector_id], &pipe.mode)?;
    println!(
        "mode {} on connector {} crtc {}",
        pipe.mode.name_str(),
        connector_id,
        crtc_id
    );

    // Solid fill of the visible buffer, completion by event.
    let mut fill = g2d::Cmdlist::new();
    fill.solid_fill(dst, w, h, 0xff00_ff00)?;
    fill.submit(&dev, exynos_sys::G2D_EVENT_NONSTOP, FILL_USER_DATA)?;
    exec_and_wait(&dev)?;

    // Copy a checkerboard from a second buffer over it.
    let src = gem::create(&dev, size, exynos_sys::EXYNOS_BO_CONTIG)?;
    let mut src_map = gem::map(&dev, src, size)?;
    draw::fill_checker(src_map.as_mut_slice(), w, h, pitch, 64);
    gem::cache_op(
        &dev,
        src_map.as_ptr() as u64,
        size as u32,
        exynos_sys::EXYNOS_DRM_ALL_CACHE | exynos_sys::EXYNOS_DRM_CACHE_CLN,
    )?;

    let mut copy = g2d::Cmdlist::new();
    copy.copy(src, dst, w, h, pitch)?;
    copy.submit(&dev, exynos_sys::G2D_EVENT_NONSTOP, FILL_USER_DATA + 1)?;
    exec_and_wait(&dev)?;

    println!("press enter to exit");
    loop {
        match wait_device_or_stdin(dev.fd(), EVENT_TIMEOUT_MS)? {
            Wake::Stdin => break,
            // Drain stray events so the fd stays quiet.
            Wake::Device => {
                let mut wait = G2dWait { done: false };
                event::handle_event(&dev, &mut wait)?;
            }
            Wake::Timeout => {}
        }
    }

    drop(src_map);
    drop(dst_map);
    mode::rm_fb(&dev, fb_id)?;
    drm_core::gem::gem_close(&dev, src)?;
    drm_core::gem::gem_close(&dev, dst)?;
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let spec = match args.as_slice() {
        [] => None,
        [flag, value] if flag == "-s" => Some(value.as_str()),
        _ => usage(),
    };
    if let Err(e) = run(spec) {
        eprintln!("g2dtest: {}", e);
        exit(1);
    }
}
