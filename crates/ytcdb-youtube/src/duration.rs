//! ISO-8601 video duration parsing.

use std::sync::OnceLock;

use regex::Regex;

fn duration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").expect("duration regex is valid")
    })
}

/// Parse a `YouTube` ISO-8601 duration (`PT1H2M3S`) into whole seconds.
///
/// Unparseable input yields 0, which the shorts classifier already treats
/// as "not a short" (a short needs `0 < secs <= 60`).
#[must_use]
pub fn parse_iso8601_duration(duration: &str) -> u64 {
    let Some(captures) = duration_re().captures(duration) else {
        return 0;
    };
    let part = |i: usize| -> u64 {
        captures
            .get(i)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };
    part(1) * 3600 + part(2) * 60 + part(3)
}
