//! Mode-setting wrappers over the DRM mode ioctls.
//!
//! Array-carrying queries (resources, connector, plane formats) follow the
//! kernel's two-call protocol: one ioctl with zero counts to learn sizes,
//! one with userspace buffers plugged into the `*_ptr` fields. Returned
//! structs own their vectors; nothing borrows kernel memory.

use crate::device::Device;
use crate::error::{ioctl_err, Result};
use crate::sys;

/// Card-wide resource ids from `DRM_IOCTL_MODE_GETRESOURCES`.
#[derive(Debug, Clone, Default)]
pub struct Resources {
    pub fbs: Vec<u32>,
    pub crtcs: Vec<u32>,
    pub connectors: Vec<u32>,
    pub encoders: Vec<u32>,
    pub min_width: u32,
    pub max_width: u32,
    pub min_height: u32,
    pub max_height: u32,
}

pub fn get_resources(dev: &Device) -> Result<Resources> {
    let mut arg = sys::DrmModeCardRes::zeroed();
    unsafe { sys::drm_ioctl_mode_getresources(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_IOCTL_MODE_GETRESOURCES", e))?;

    let mut fbs = vec![0u32; arg.count_fbs as usize];
    let mut crtcs = vec![0u32; arg.count_crtcs as usize];
    let mut connectors = vec![0u32; arg.count_connectors as usize];
    let mut encoders = vec![0u32; arg.count_encoders as usize];

    arg.fb_id_ptr = fbs.as_mut_ptr() as u64;
    arg.crtc_id_ptr = crtcs.as_mut_ptr() as u64;
    arg.connector_id_ptr = connectors.as_mut_ptr() as u64;
    arg.encoder_id_ptr = encoders.as_mut_ptr() as u64;

    unsafe { sys::drm_ioctl_mode_getresources(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_IOCTL_MODE_GETRESOURCES", e))?;

    // A hotplug between the two calls can shrink the counts.
    fbs.truncate(arg.count_fbs as usize);
    crtcs.truncate(arg.count_crtcs as usize);
    connectors.truncate(arg.count_connectors as usize);
    encoders.truncate(arg.count_encoders as usize);

    Ok(Resources {
        fbs,
        crtcs,
        connectors,
        encoders,
        min_width: arg.min_width,
        max_width: arg.max_width,
        min_height: arg.min_height,
        max_height: arg.max_height,
    })
}

/// Physical connector state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connection {
    Connected,
    Disconnected,
    Unknown,
}

impl Connection {
    fn from_raw(v: u32) -> Self {
        match v {
            1 => Connection::Connected,
            2 => Connection::Disconnected,
            _ => Connection::Unknown,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Connector {
    pub connector_id: u32,
    pub encoder_id: u32,
    pub connector_type: u32,
    pub connector_type_id: u32,
    pub connection: Connection,
    pub mm_width: u32,
    pub mm_height: u32,
    pub subpixel: u32,
    pub modes: Vec<sys::DrmModeInfo>,
    pub encoders: Vec<u32>,
    pub props: Vec<u32>,
    pub prop_values: Vec<u64>,
}

pub fn get_connector(dev: &Device, connector_id: u32) -> Result<Connector> {
    let mut arg = sys::DrmModeGetConnector::zeroed();
    arg.connector_id = connector_id;
    unsafe { sys::drm_ioctl_mode_getconnector(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_IOCTL_MODE_GETCONNECTOR", e))?;

    let mut modes = vec![sys::DrmModeInfo::zeroed(); arg.count_modes as usize];
    let mut encoders = vec![0u32; arg.count_encoders as usize];
    let mut props = vec![0u32; arg.count_props as usize];
    let mut prop_values = vec![0u64; arg.count_props as usize];

    arg.modes_ptr = modes.as_mut_ptr() as u64;
    arg.encoders_ptr = encoders.as_mut_ptr() as u64;
    arg.props_ptr = props.as_mut_ptr() as u64;
    arg.prop_values_ptr = prop_values.as_mut_ptr() as u64;

    unsafe { sys::drm_ioctl_mode_getconnector(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_IOCTL_MODE_GETCONNECTOR", e))?;

    modes.truncate(arg.count_modes as usize);
    encoders.truncate(arg.count_encoders as usize);
    props.truncate(arg.count_props as usize);
    prop_values.truncate(arg.count_props as usize);

    Ok(Connector {
        connector_id: arg.connector_id,
        encoder_id: arg.encoder_id,
        connector_type: arg.connector_type,
        connector_type_id: arg.connector_type_id,
        connection: Connection::from_raw(arg.connection),
        mm_width: arg.mm_width,
        mm_height: arg.mm_height,
        subpixel: arg.subpixel,
        modes,
        encoders,
        props,
        prop_values,
    })
}

#[derive(Debug, Clone, Copy)]
pub struct Encoder {
    pub encoder_id: u32,
    pub encoder_type: u32,
    pub crtc_id: u32,
    pub possible_crtcs: u32,
    pub possible_clones: u32,
}

pub fn get_encoder(dev: &Device, encoder_id: u32) -> Result<Encoder> {
    let mut arg = sys::DrmModeGetEncoder::zeroed();
    arg.encoder_id = encoder_id;
    unsafe { sys::drm_ioctl_mode_getencoder(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_IOCTL_MODE_GETENCODER", e))?;

    Ok(Encoder {
        encoder_id: arg.encoder_id,
        encoder_type: arg.encoder_type,
        crtc_id: arg.crtc_id,
        possible_crtcs: arg.possible_crtcs,
        possible_clones: arg.possible_clones,
    })
}

#[derive(Debug, Clone)]
pub struct Crtc {
    pub crtc_id: u32,
    pub fb_id: u32,
    pub x: u32,
    pub y: u32,
    pub gamma_size: u32,
    pub mode_valid: bool,
    pub mode: sys::DrmModeInfo,
}

pub fn get_crtc(dev: &Device, crtc_id: u32) -> Result<Crtc> {
    let mut arg = sys::DrmModeCrtc::zeroed();
    arg.crtc_id = crtc_id;
    unsafe { sys::drm_ioctl_mode_getcrtc(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_IOCTL_MODE_GETCRTC", e))?;

    Ok(Crtc {
        crtc_id: arg.crtc_id,
        fb_id: arg.fb_id,
        x: arg.x,
        y: arg.y,
        gamma_size: arg.gamma_size,
        mode_valid: arg.mode_valid != 0,
        mode: arg.mode,
    })
}

/// Program a CRTC: scan out `fb_id` at `(x, y)` with `mode` on the given
/// connectors.
pub fn set_crtc(
    dev: &Device,
    crtc_id: u32,
    fb_id: u32,
    x: u32,
    y: u32,
    connectors: &[u32],
    mode: &sys::DrmModeInfo,
) -> Result<()> {
    let mut arg = sys::DrmModeCrtc::zeroed();
    arg.crtc_id = crtc_id;
    arg.fb_id = fb_id;
    arg.x = x;
    arg.y = y;
    arg.set_connectors_ptr = connectors.as_ptr() as u64;
    arg.count_connectors = connectors.len() as u32;
    arg.mode = *mode;
    arg.mode_valid = 1;

    unsafe { sys::drm_ioctl_mode_setcrtc(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_IOCTL_MODE_SETCRTC", e))?;
    Ok(())
}

#[derive(Debug, Clone, Copy)]
pub struct Fb {
    pub fb_id: u32,
    pub width: u32,
    pub height: u32,
    pub pitch: u32,
    pub bpp: u32,
    pub depth: u32,
    pub handle: u32,
}

pub fn get_fb(dev: &Device, fb_id: u32) -> Result<Fb> {
    let mut arg = sys::DrmModeFbCmd::zeroed();
    arg.fb_id = fb_id;
    unsafe { sys::drm_ioctl_mode_getfb(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_IOCTL_MODE_GETFB", e))?;

    Ok(Fb {
        fb_id: arg.fb_id,
        width: arg.width,
        height: arg.height,
        pitch: arg.pitch,
        bpp: arg.bpp,
        depth: arg.depth,
        handle: arg.handle,
    })
}

/// Legacy single-plane framebuffer. Returns the new fb id.
pub fn add_fb(
    dev: &Device,
    width: u32,
    height: u32,
    depth: u32,
    bpp: u32,
    pitch: u32,
    handle: u32,
) -> Result<u32> {
    let mut arg = sys::DrmModeFbCmd::zeroed();
    arg.width = width;
    arg.height = height;
    arg.depth = depth;
    arg.bpp = bpp;
    arg.pitch = pitch;
    arg.handle = handle;

    unsafe { sys::drm_ioctl_mode_addfb(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_IOCTL_MODE_ADDFB", e))?;
    Ok(arg.fb_id)
}

/// Format-aware multi-plane framebuffer (ADDFB2). Returns the new fb id.
pub fn add_fb2(
    dev: &Device,
    width: u32,
    height: u32,
    pixel_format: u32,
    handles: &[u32; 4],
    pitches: &[u32; 4],
    offsets: &[u32; 4],
    flags: u32,
) -> Result<u32> {
    let mut arg = sys::DrmModeFbCmd2::zeroed();
    arg.width = width;
    arg.height = height;
    arg.pixel_format = pixel_format;
    arg.flags = flags;
    arg.handles = *handles;
    arg.pitches = *pitches;
    arg.offsets = *offsets;

    unsafe { sys::drm_ioctl_mode_addfb2(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_IOCTL_MODE_ADDFB2", e))?;
    Ok(arg.fb_id)
}

pub fn rm_fb(dev: &Device, fb_id: u32) -> Result<()> {
    let mut id: libc::c_uint = fb_id;
    unsafe { sys::drm_ioctl_mode_rmfb(dev.fd(), &mut id) }
        .map_err(|e| ioctl_err("DRM_IOCTL_MODE_RMFB", e))?;
    Ok(())
}

/// Queue a page flip. With `DRM_MODE_PAGE_FLIP_EVENT` in `flags` the
/// kernel posts a flip-complete event carrying `user_data` to the fd.
pub fn page_flip(dev: &Device, crtc_id: u32, fb_id: u32, flags: u32, user_data: u64) -> Result<()> {
    let mut arg = sys::DrmModeCrtcPageFlip::zeroed();
    arg.crtc_id = crtc_id;
    arg.fb_id = fb_id;
    arg.flags = flags;
    arg.user_data = user_data;

    unsafe { sys::drm_ioctl_mode_page_flip(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_IOCTL_MODE_PAGE_FLIP", e))?;
    Ok(())
}

// ── Dumb buffers ──

#[derive(Debug, Clone, Copy)]
pub struct DumbBuffer {
    pub handle: u32,
    pub pitch: u32,
    pub size: u64,
}

pub fn create_dumb(dev: &Device, width: u32, height: u32, bpp: u32) -> Result<DumbBuffer> {
    let mut arg = sys::DrmModeCreateDumb::zeroed();
    arg.width = width;
    arg.height = height;
    arg.bpp = bpp;

    unsafe { sys::drm_ioctl_mode_create_dumb(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_IOCTL_MODE_CREATE_DUMB", e))?;

    Ok(DumbBuffer {
        handle: arg.handle,
        pitch: arg.pitch,
        size: arg.size,
    })
}

/// Fake mmap offset for a dumb buffer handle.
pub fn map_dumb(dev: &Device, handle: u32) -> Result<u64> {
    let mut arg = sys::DrmModeMapDumb::zeroed();
    arg.handle = handle;
    unsafe { sys::drm_ioctl_mode_map_dumb(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_IOCTL_MODE_MAP_DUMB", e))?;
    Ok(arg.offset)
}

pub fn destroy_dumb(dev: &Device, handle: u32) -> Result<()> {
    let mut arg = sys::DrmModeDestroyDumb::zeroed();
    arg.handle = handle;
    unsafe { sys::drm_ioctl_mode_destroy_dumb(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_IOCTL_MODE_DESTROY_DUMB", e))?;
    Ok(())
}

// ── Planes ──

pub fn get_plane_resources(dev: &Device) -> Result<Vec<u32>> {
    let mut arg = sys::DrmModeGetPlaneRes::zeroed();
    unsafe { sys::drm_ioctl_mode_getplaneresources(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_IOCTL_MODE_GETPLANERESOURCES", e))?;

    let mut planes = vec![0u32; arg.count_planes as usize];
    arg.plane_id_ptr = planes.as_mut_ptr() as u64;

    unsafe { sys::drm_ioctl_mode_getplaneresources(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_IOCTL_MODE_GETPLANERESOURCES", e))?;

    planes.truncate(arg.count_planes as usize);
    Ok(planes)
}

#[derive(Debug, Clone)]
pub struct Plane {
    pub plane_id: u32,
    pub crtc_id: u32,
    pub fb_id: u32,
    pub possible_crtcs: u32,
    pub gamma_size: u32,
    pub formats: Vec<u32>,
}

pub fn get_plane(dev: &Device, plane_id: u32) -> Result<Plane> {
    let mut arg = sys::DrmModeGetPlane::zeroed();
    arg.plane_id = plane_id;
    unsafe { sys::drm_ioctl_mode_getplane(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_IOCTL_MODE_GETPLANE", e))?;

    let mut formats = vec![0u32; arg.count_format_types as usize];
    arg.format_type_ptr = formats.as_mut_ptr() as u64;

    unsafe { sys::drm_ioctl_mode_getplane(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_IOCTL_MODE_GETPLANE", e))?;

    formats.truncate(arg.count_format_types as usize);

    Ok(Plane {
        plane_id: arg.plane_id,
        crtc_id: arg.crtc_id,
        fb_id: arg.fb_id,
        possible_crtcs: arg.possible_crtcs,
        gamma_size: arg.gamma_size,
        formats,
    })
}

/// Attach `fb_id` to an overlay plane. `src_*` are in whole pixels here;
/// the 16.16 fixed-point conversion the ABI wants happens internally.
#[allow(clippy::too_many_arguments)]
pub fn set_plane(
    dev: &Device,
    plane_id: u32,
    crtc_id: u32,
    fb_id: u32,
    crtc_x: i32,
    crtc_y: i32,
    crtc_w: u32,
    crtc_h: u32,
    src_x: u32,
    src_y: u32,
    src_w: u32,
    src_h: u32,
) -> Result<()> {
    let mut arg = sys::DrmModeSetPlane::zeroed();
    arg.plane_id = plane_id;
    arg.crtc_id = crtc_id;
    arg.fb_id = fb_id;
    arg.crtc_x = crtc_x;
    arg.crtc_y = crtc_y;
    arg.crtc_w = crtc_w;
    arg.crtc_h = crtc_h;
    arg.src_x = src_x << 16;
    arg.src_y = src_y << 16;
    arg.src_w = src_w << 16;
    arg.src_h = src_h << 16;

    unsafe { sys::drm_ioctl_mode_setplane(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_IOCTL_MODE_SETPLANE", e))?;
    Ok(())
}

/// Disable a plane (detach it from its CRTC).
pub fn disable_plane(dev: &Device, plane_id: u32) -> Result<()> {
    let mut arg = sys::DrmModeSetPlane::zeroed();
    arg.plane_id = plane_id;
    unsafe { sys::drm_ioctl_mode_setplane(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_IOCTL_MODE_SETPLANE", e))?;
    Ok(())
}
