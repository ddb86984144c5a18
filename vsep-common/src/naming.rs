//! Output file naming

use std::path::Path;

/// Base name used when sanitization leaves nothing usable.
const FALLBACK_BASE: &str = "output";

/// Replace every character outside `[A-Za-z0-9_.-]` with `_`.
///
/// One output character per input character, so the result has the same
/// `chars().count()` as the input.
///
/// ```
/// use vsep_common::naming::sanitize_filename;
///
/// assert_eq!(sanitize_filename("My Song (Remix)"), "My_Song__Remix_");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Sanitized base name for separation outputs.
///
/// Uses `explicit` when given, otherwise the input file stem.
pub fn output_base_for(input: &Path, explicit: Option<&str>) -> String {
    let raw = match explicit {
        Some(base) => base.to_string(),
        None => input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    let base = sanitize_filename(&raw);
    if base.is_empty() {
        FALLBACK_BASE.to_string()
    } else {
        base
    }
}

/// Output file name for one derived track, e.g. `song_vocals.wav`.
pub fn track_file_name(base: &str, track: &str) -> String {
    format!("{}_{}.wav", base, track)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_sanitize_keeps_allowed_characters() {
        assert_eq!(sanitize_filename("abc_XYZ-0.9"), "abc_XYZ-0.9");
    }

    #[test]
    fn test_sanitize_replaces_everything_else() {
        let inputs = ["My Song (Remix)", "naïve café", "a/b\\c", "tab\there", "日本語", ""];
        for input in inputs {
            let out = sanitize_filename(input);
            assert_eq!(out.chars().count(), input.chars().count());
            assert!(out
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')));
        }
        assert_eq!(sanitize_filename("naïve café"), "na_ve_caf_");
    }

    #[test]
    fn test_output_base_from_input_stem() {
        let input = PathBuf::from("/tmp/My Song (Remix).mp3");
        let base = output_base_for(&input, None);
        assert_eq!(base, "My_Song__Remix_");
        assert_eq!(track_file_name(&base, "vocals"), "My_Song__Remix__vocals.wav");
        assert_eq!(track_file_name(&base, "melody"), "My_Song__Remix__melody.wav");
    }

    #[test]
    fn test_output_base_explicit_wins() {
        let input = PathBuf::from("/tmp/input.wav");
        assert_eq!(output_base_for(&input, Some("take 2")), "take_2");
    }

    #[test]
    fn test_output_base_never_empty() {
        assert_eq!(output_base_for(Path::new("/"), None), "output");
        assert_eq!(output_base_for(Path::new("x.wav"), Some("")), "output");
    }
}
