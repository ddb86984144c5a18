//! Timestamp parsing and segment selection
//!
//! Form fields accept `MM:SS` or plain `SS`. Parsing is forgiving: anything
//! malformed silently becomes the caller's default so a typo never fails the
//! form.

use serde::Serialize;

/// Parse a `MM:SS` or `SS` timestamp into whole seconds.
///
/// Returns `default` for empty input and for anything that does not parse
/// (non-numeric parts, negative numbers, more than one colon, overflow).
///
/// # Examples
///
/// ```
/// use vsep_common::time::parse_timestamp;
///
/// assert_eq!(parse_timestamp("01:30", 0), 90);
/// assert_eq!(parse_timestamp("45", 0), 45);
/// assert_eq!(parse_timestamp("", 180), 180);
/// assert_eq!(parse_timestamp("1:2:3", 7), 7);
/// ```
pub fn parse_timestamp(text: &str, default: u32) -> u32 {
    let text = text.trim();
    if text.is_empty() {
        return default;
    }

    let parts: Vec<&str> = text.split(':').collect();
    let parsed = match parts.as_slice() {
        [secs] => parse_part(secs),
        [mins, secs] => parse_part(mins)
            .zip(parse_part(secs))
            .and_then(|(m, s)| m.checked_mul(60)?.checked_add(s)),
        _ => None,
    };

    parsed.unwrap_or(default)
}

fn parse_part(part: &str) -> Option<u32> {
    part.trim().parse::<u32>().ok()
}

/// Format whole seconds as `MM:SS`.
///
/// Minutes are zero-padded to two digits and keep growing past 99.
pub fn format_timestamp(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// A contiguous time range of a track, in whole seconds.
///
/// Invariant: `start < end <= duration` for the duration it was resolved
/// against (except for a zero-length track, which resolves to `0..0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub start: u32,
    pub end: u32,
}

impl Segment {
    /// Whole-track segment.
    pub fn full(duration: u32) -> Self {
        Self {
            start: 0,
            end: duration,
        }
    }

    /// Resolve a requested range against the track duration.
    ///
    /// Invalid requests (`end <= start`, or `end` past the track end) fall
    /// back to the whole track.
    pub fn resolve(start: u32, end: u32, duration: u32) -> Self {
        if end <= start || end > duration {
            Self::full(duration)
        } else {
            Self { start, end }
        }
    }

    /// Resolve directly from the raw form field text.
    ///
    /// Start defaults to 0 and end defaults to the track duration.
    pub fn from_fields(start: &str, end: &str, duration: u32) -> Self {
        Self::resolve(
            parse_timestamp(start, 0),
            parse_timestamp(end, duration),
            duration,
        )
    }

    pub fn duration(&self) -> u32 {
        self.end - self.start
    }

    /// True when this segment covers the whole track.
    pub fn is_full(&self, duration: u32) -> bool {
        self.start == 0 && self.end >= duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minutes_and_seconds() {
        assert_eq!(parse_timestamp("01:30", 0), 90);
        assert_eq!(parse_timestamp("2:00", 0), 120);
        assert_eq!(parse_timestamp(" 10:05 ", 0), 605);
        // Seconds past 59 are accepted as-is
        assert_eq!(parse_timestamp("1:75", 0), 135);
    }

    #[test]
    fn test_parse_raw_seconds() {
        assert_eq!(parse_timestamp("0", 9), 0);
        assert_eq!(parse_timestamp("125", 9), 125);
    }

    #[test]
    fn test_malformed_returns_default() {
        for bad in ["", "   ", "abc", "1:xx", "1:2:3", "::", ":", "-5", "1.5", "99999999999"] {
            assert_eq!(parse_timestamp(bad, 42), 42, "input {:?}", bad);
        }
    }

    #[test]
    fn test_overflowing_minutes_returns_default() {
        assert_eq!(parse_timestamp("4294967295:00", 3), 3);
    }

    #[test]
    fn test_format_parse_round_trip() {
        for s in 0..3600 {
            assert_eq!(parse_timestamp(&format_timestamp(s), u32::MAX), s);
        }
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "00:00");
        assert_eq!(format_timestamp(90), "01:30");
        assert_eq!(format_timestamp(6000), "100:00");
    }

    #[test]
    fn test_segment_from_fields() {
        assert_eq!(
            Segment::from_fields("01:30", "02:00", 180),
            Segment { start: 90, end: 120 }
        );
        assert_eq!(Segment::from_fields("00:00", "", 180), Segment::full(180));
    }

    #[test]
    fn test_segment_invalid_falls_back_to_full() {
        assert_eq!(Segment::resolve(60, 60, 180), Segment::full(180));
        assert_eq!(Segment::resolve(90, 30, 180), Segment::full(180));
        assert_eq!(Segment::resolve(10, 181, 180), Segment::full(180));
        assert_eq!(Segment::resolve(0, 0, 0), Segment::full(0));
    }

    #[test]
    fn test_segment_is_full() {
        assert!(Segment::full(180).is_full(180));
        assert!(!Segment::resolve(0, 120, 180).is_full(180));
        assert!(!Segment::resolve(10, 180, 180).is_full(180));
        assert_eq!(Segment::resolve(10, 40, 180).duration(), 30);
    }
}
