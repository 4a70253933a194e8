//! Coarse device classification from a User-Agent string.

use std::fmt;

use serde::{Deserialize, Serialize};

const MOBILE_MARKERS: &[&str] = &["mobile", "iphone", "ipod"];
const TABLET_MARKERS: &[&str] = &["tablet", "ipad", "android"];
const WINDOWS_MARKERS: &[&str] = &["windows"];
const MAC_MARKERS: &[&str] = &["macintosh", "mac os"];
const LINUX_MARKERS: &[&str] = &["linux", "x11"];

/// The device family a session was opened from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceClass {
    Mobile,
    Tablet,
    WindowsPc,
    Mac,
    LinuxPc,
    Unknown,
}

impl DeviceClass {
    /// Classifies a User-Agent header.
    ///
    /// Mobile and tablet markers are checked before OS families: phone and
    /// tablet agents embed desktop OS tokens ("like Mac OS X", "Linux").
    /// An Android agent without a "Mobile" token is a tablet.
    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        let Some(ua) = user_agent else {
            return Self::Unknown;
        };
        let ua = ua.to_ascii_lowercase();
        let has = |markers: &[&str]| markers.iter().any(|m| ua.contains(m));

        if has(MOBILE_MARKERS) {
            Self::Mobile
        } else if has(TABLET_MARKERS) {
            Self::Tablet
        } else if has(WINDOWS_MARKERS) {
            Self::WindowsPc
        } else if has(MAC_MARKERS) {
            Self::Mac
        } else if has(LINUX_MARKERS) {
            Self::LinuxPc
        } else {
            Self::Unknown
        }
    }

    /// Human-readable label stored in `Session::device_info`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mobile => "Mobile Device",
            Self::Tablet => "Tablet",
            Self::WindowsPc => "Windows PC",
            Self::Mac => "Mac",
            Self::LinuxPc => "Linux PC",
            Self::Unknown => "Unknown Device",
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
