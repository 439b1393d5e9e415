// crates/trimpress-core/src/helpers/time.rs
//
// Time conversions and formatting shared by the controller, the media crate
// and the UI labels. Sliders work in whole milliseconds, the session in
// seconds; every conversion between the two goes through here.

/// Seconds → whole milliseconds, truncating. Negative input maps to 0.
///
/// Truncation keeps `ms_to_secs(secs_to_ms(d)) <= d`, so a slider parked at
/// its maximum never lands past the end of the clip.
///
/// ```
/// use trimpress_core::helpers::time::secs_to_ms;
/// assert_eq!(secs_to_ms(10.0),   10_000);
/// assert_eq!(secs_to_ms(1.2345), 1_234);
/// assert_eq!(secs_to_ms(-2.0),   0);
/// ```
pub fn secs_to_ms(secs: f64) -> u64 {
    if secs.is_finite() && secs > 0.0 {
        (secs * 1000.0) as u64
    } else {
        0
    }
}

pub fn ms_to_secs(ms: u64) -> f64 {
    ms as f64 / 1000.0
}

/// Format seconds as `HH:MM:SS`, the format shown next to the range sliders.
///
/// ```
/// use trimpress_core::helpers::time::format_hms;
/// assert_eq!(format_hms(0.0),     "00:00:00");
/// assert_eq!(format_hms(61.9),    "00:01:01");
/// assert_eq!(format_hms(3725.0),  "01:02:05");
/// ```
pub fn format_hms(secs: f64) -> String {
    let total = secs.max(0.0) as u64;
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    format!("{h:02}:{m:02}:{s:02}")
}

/// Format seconds as `HH:MM:SS.mmm` for tooltips and the transport readout,
/// where the 100 ms handle gap needs to be visible.
///
/// ```
/// use trimpress_core::helpers::time::format_precise;
/// assert_eq!(format_precise(3.1),    "00:00:03.100");
/// assert_eq!(format_precise(3725.5), "01:02:05.500");
/// ```
pub fn format_precise(secs: f64) -> String {
    let ms_total = secs_to_ms(secs + 0.0005);
    let frac = ms_total % 1000;
    format!("{}.{frac:03}", format_hms((ms_total / 1000) as f64))
}

/// Seconds as the decimal string FFmpeg expects for `-ss` / `-t`.
///
/// ```
/// use trimpress_core::helpers::time::ffmpeg_secs;
/// assert_eq!(ffmpeg_secs(3.1), "3.100000");
/// ```
pub fn ffmpeg_secs(secs: f64) -> String {
    format!("{:.6}", secs.max(0.0))
}
