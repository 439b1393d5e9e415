// crates/trimpress-core/src/helpers/encode_params.rs
//
// Parsing for the two free-text fields of the compress panel: the target
// resolution (`WxH`) and the target video bitrate (`500k`, `2M`, `800000`).
// Both are validated on the UI thread before a save dialog is ever shown.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Largest accepted frame dimension; x264 rejects anything bigger anyway.
pub const MAX_DIMENSION: u32 = 16_384;

/// Output frame size for a transcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width:  u32,
    pub height: u32,
}

impl Resolution {
    /// Both dimensions rounded up to the nearest even number (required for
    /// H.264 YUV420P encoding).
    ///
    /// ```
    /// use trimpress_core::helpers::encode_params::Resolution;
    /// let r = Resolution { width: 641, height: 360 };
    /// assert_eq!(r.even(), Resolution { width: 642, height: 360 });
    /// ```
    pub fn even(self) -> Self {
        Self {
            width:  self.width.saturating_add(1) & !1,
            height: self.height.saturating_add(1) & !1,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = SessionError;

    /// Parse `WxH`. Surrounding whitespace is ignored and the separator may be
    /// `x` or `X`. Zero and dimensions above `MAX_DIMENSION` are rejected.
    ///
    /// ```
    /// use trimpress_core::helpers::encode_params::Resolution;
    /// let r: Resolution = " 640x360 ".parse().unwrap();
    /// assert_eq!((r.width, r.height), (640, 360));
    /// assert!("abcxdef".parse::<Resolution>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SessionError::InvalidResolution(s.trim().to_string());
        let (w, h) = s.trim()
            .split_once(['x', 'X'])
            .ok_or_else(invalid)?;
        let width:  u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;
        if !(1..=MAX_DIMENSION).contains(&width) || !(1..=MAX_DIMENSION).contains(&height) {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

/// Video bitrate in the form FFmpeg accepts for `-b:v`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bitrate {
    raw: String,
}

impl Bitrate {
    /// The string passed to FFmpeg, e.g. `500k`.
    pub fn as_arg(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for Bitrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Bitrate {
    type Err = SessionError;

    /// Parse a positive number with an optional `k`, `M` or `G` suffix
    /// (case-insensitive).
    ///
    /// ```
    /// use trimpress_core::helpers::encode_params::Bitrate;
    /// assert_eq!("500k".parse::<Bitrate>().unwrap().as_arg(), "500k");
    /// assert_eq!("1.5m".parse::<Bitrate>().unwrap().as_arg(), "1.5M");
    /// assert!("fast".parse::<Bitrate>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || SessionError::InvalidBitrate(trimmed.to_string());

        let (number, scale) = match trimmed.char_indices().last() {
            Some((i, 'k' | 'K')) => (&trimmed[..i], 1_000.0),
            Some((i, 'm' | 'M')) => (&trimmed[..i], 1_000_000.0),
            Some((i, 'g' | 'G')) => (&trimmed[..i], 1_000_000_000.0),
            Some(_)              => (trimmed, 1.0),
            None                 => return Err(invalid()),
        };
        if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return Err(invalid());
        }
        let value: f64 = number.parse().map_err(|_| invalid())?;
        if (value * scale).round() < 1.0 {
            return Err(invalid());
        }

        // FFmpeg only understands the lower-case kilo suffix and upper-case
        // mega/giga suffixes.
        let suffix = match scale as u64 {
            1_000         => "k",
            1_000_000     => "M",
            1_000_000_000 => "G",
            _             => "",
        };
        Ok(Self { raw: format!("{number}{suffix}") })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_rejects_garbage() {
        for bad in ["abcxdef", "640", "640x", "x360", "0x360", "640x0", "640x360x2", "-640x360", "",
                    "4294967295x360", "640x99999999999", "16385x360"] {
            let err = bad.parse::<Resolution>().unwrap_err();
            assert!(matches!(err, SessionError::InvalidResolution(_)), "{bad}");
        }
    }

    #[test]
    fn largest_resolution_still_rounds_even() {
        let r: Resolution = "16383x16384".parse().unwrap();
        assert_eq!(r.even(), Resolution { width: 16_384, height: 16_384 });
        let huge = Resolution { width: u32::MAX, height: 1 };
        assert_eq!(huge.even(), Resolution { width: u32::MAX - 1, height: 2 });
    }

    #[test]
    fn resolution_accepts_upper_case_separator() {
        let r: Resolution = "1280X720".parse().unwrap();
        assert_eq!(r.to_string(), "1280x720");
    }

    #[test]
    fn bitrate_normalises_suffix_case() {
        assert_eq!("500K".parse::<Bitrate>().unwrap().as_arg(), "500k");
        assert_eq!("2m".parse::<Bitrate>().unwrap().as_arg(), "2M");
        assert_eq!("800000".parse::<Bitrate>().unwrap().as_arg(), "800000");
    }

    #[test]
    fn bitrate_rejects_zero_and_words() {
        for bad in ["0", "0k", "k", "", "12kb", "1e6", "-500k"] {
            let err = bad.parse::<Bitrate>().unwrap_err();
            assert!(matches!(err, SessionError::InvalidBitrate(_)), "{bad}");
        }
    }
}
