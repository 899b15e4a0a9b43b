//! Resource dumps and display-pipe lookup.
//!
//! The dump functions print the xrandr-style tables the demo binaries
//! show before touching the hardware. `find_pipe` resolves a connector
//! id plus an optional mode name into everything a mode-set needs.

use drm_core::mode::{self, Connection, Connector};
use drm_core::sys::DrmModeInfo;
use drm_core::{Device, DrmError, Result};

const CONNECTOR_TYPE_NAMES: &[&str] = &[
    "unknown", "VGA", "DVI-I", "DVI-D", "DVI-A", "composite", "s-video", "LVDS", "component",
    "9-pin DIN", "DP", "HDMI-A", "HDMI-B", "TV", "eDP",
];

const ENCODER_TYPE_NAMES: &[&str] = &["none", "DAC", "TMDS", "LVDS", "TVDAC"];

pub fn connector_type_name(type_: u32) -> &'static str {
    CONNECTOR_TYPE_NAMES
        .get(type_ as usize)
        .copied()
        .unwrap_or("unknown")
}

pub fn encoder_type_name(type_: u32) -> &'static str {
    ENCODER_TYPE_NAMES
        .get(type_ as usize)
        .copied()
        .unwrap_or("unknown")
}

pub fn connection_name(c: Connection) -> &'static str {
    match c {
        Connection::Connected => "connected",
        Connection::Disconnected => "disconnected",
        Connection::Unknown => "unknown",
    }
}

fn print_mode(m: &DrmModeInfo) {
    println!(
        "  {:<16} {} {} {} {} {} {} {} {} {} {}",
        m.name_str(),
        m.vrefresh,
        m.hdisplay,
        m.hsync_start,
        m.hsync_end,
        m.htotal,
        m.vdisplay,
        m.vsync_start,
        m.vsync_end,
        m.vtotal,
        m.clock
    );
}

pub fn dump_connectors(dev: &Device) -> Result<()> {
    let res = mode::get_resources(dev)?;
    println!("Connectors:");
    println!("id\tencoder\tstatus\t\ttype\tsize (mm)\tmodes\tencoders");
    for id in &res.connectors {
        let con = mode::get_connector(dev, *id)?;
        let encoders: Vec<String> = con.encoders.iter().map(|e| e.to_string()).collect();
        println!(
            "{}\t{}\t{}\t{}\t{}x{}\t\t{}\t{}",
            con.connector_id,
            con.encoder_id,
            connection_name(con.connection),
            connector_type_name(con.connector_type),
            con.mm_width,
            con.mm_height,
            con.modes.len(),
            encoders.join(",")
        );
        if !con.modes.is_empty() {
            println!("  modes:");
            for m in &con.modes {
                print_mode(m);
            }
        }
    }
    Ok(())
}

pub fn dump_encoders(dev: &Device) -> Result<()> {
    let res = mode::get_resources(dev)?;
    println!("Encoders:");
    println!("id\tcrtc\ttype\tpossible crtcs\tpossible clones");
    for id in &res.encoders {
        let enc = mode::get_encoder(dev, *id)?;
        println!(
            "{}\t{}\t{}\t{:#010x}\t{:#010x}",
            enc.encoder_id,
            enc.crtc_id,
            encoder_type_name(enc.encoder_type),
            enc.possible_crtcs,
            enc.possible_clones
        );
    }
    Ok(())
}

pub fn dump_crtcs(dev: &Device) -> Result<()> {
    let res = mode::get_resources(dev)?;
    println!("CRTCs:");
    println!("id\tfb\tpos\tsize");
    for id in &res.crtcs {
        let crtc = mode::get_crtc(dev, *id)?;
        println!(
            "{}\t{}\t({},{})\t({}x{})",
            crtc.crtc_id,
            crtc.fb_id,
            crtc.x,
            crtc.y,
            crtc.mode.hdisplay,
            crtc.mode.vdisplay
        );
        if crtc.mode_valid {
            print_mode(&crtc.mode);
        }
    }
    Ok(())
}

pub fn dump_framebuffers(dev: &Device) -> Result<()> {
    let res = mode::get_resources(dev)?;
    println!("Frame buffers:");
    println!("id\tsize\tpitch");
    for id in &res.fbs {
        let fb = mode::get_fb(dev, *id)?;
        println!(
            "{}\t({}x{})\t{}",
            fb.fb_id, fb.width, fb.height, fb.pitch
        );
    }
    Ok(())
}

pub fn dump_planes(dev: &Device) -> Result<()> {
    let planes = mode::get_plane_resources(dev)?;
    println!("Planes:");
    println!("id\tcrtc\tfb\tpossible crtcs\tformats");
    for id in &planes {
        let plane = mode::get_plane(dev, *id)?;
        let fmts: Vec<String> = plane
            .formats
            .iter()
            .map(|f| {
                let b = f.to_le_bytes();
                String::from_utf8_lossy(&b).into_owned()
            })
            .collect();
        println!(
            "{}\t{}\t{}\t{:#010x}\t{}",
            plane.plane_id,
            plane.crtc_id,
            plane.fb_id,
            plane.possible_crtcs,
            fmts.join(" ")
        );
    }
    Ok(())
}

/// Everything a mode-set needs for one connector.
pub struct Pipe {
    pub connector: Connector,
    pub mode: DrmModeInfo,
    pub crtc_id: u32,
}

/// Pick the mode: by name when given, otherwise the connector's first
/// (preferred) mode.
fn choose_mode(con: &Connector, mode_name: Option<&str>) -> Result<DrmModeInfo> {
    match mode_name {
        Some(name) => con
            .modes
            .iter()
            .find(|m| m.name_str() == name)
            .copied()
            .ok_or(DrmError::NotFound("mode")),
        None => con.modes.first().copied().ok_or(DrmError::NotFound("mode")),
    }
}

/// Resolve a connected connector into a full pipe. The CRTC comes from
/// the connector's current encoder when one is attached, otherwise from
/// the first encoder/CRTC combination the hardware allows.
pub fn find_pipe(dev: &Device, connector_id: u32, mode_name: Option<&str>) -> Result<Pipe> {
    let res = mode::get_resources(dev)?;
    let con = mode::get_connector(dev, connector_id)?;
    if con.connection != Connection::Connected {
        return Err(DrmError::NotFound("connected connector"));
    }
    let chosen = choose_mode(&con, mode_name)?;

    if con.encoder_id != 0 {
        let enc = mode::get_encoder(dev, con.encoder_id)?;
        if enc.crtc_id != 0 {
            return Ok(Pipe {
                connector: con,
                mode: chosen,
                crtc_id: enc.crtc_id,
            });
        }
    }

    for enc_id in &con.encoders {
        let enc = mode::get_encoder(dev, *enc_id)?;
        for (i, crtc_id) in res.crtcs.iter().enumerate() {
            if enc.possible_crtcs & (1 << i) != 0 {
                return Ok(Pipe {
                    connector: con,
                    mode: chosen,
                    crtc_id: *crtc_id,
                });
            }
        }
    }
    Err(DrmError::NotFound("crtc for connector"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connector_type_names() {
        assert_eq!(connector_type_name(11), "HDMI-A");
        assert_eq!(connector_type_name(7), "LVDS");
        assert_eq!(connector_type_name(999), "unknown");
    }

    #[test]
    fn test_choose_mode_by_name() {
        let mut m1 = DrmModeInfo::zeroed();
        m1.name[..9].copy_from_slice(b"1920x1080");
        let mut m2 = DrmModeInfo::zeroed();
        m2.name[..8].copy_from_slice(b"720x1280");
        m2.vrefresh = 60;

        let con = Connector {
            connector_id: 1,
            encoder_id: 0,
            connector_type: 11,
            connector_type_id: 1,
            connection: Connection::Connected,
            mm_width: 0,
            mm_height: 0,
            subpixel: 0,
            modes: vec![m1, m2],
            encoders: vec![],
            props: vec![],
            prop_values: vec![],
        };

        let chosen = choose_mode(&con, Some("720x1280")).unwrap();
        assert_eq!(chosen.vrefresh, 60);

        let preferred = choose_mode(&con, None).unwrap();
        assert_eq!(preferred.name_str(), "1920x1080");

        assert!(choose_mode(&con, Some("640x480")).is_err());
    }
}
