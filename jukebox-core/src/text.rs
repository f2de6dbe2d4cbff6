use std::time::Duration;

use itertools::Itertools;

/// Expands the plugin's palette tags into `&#RRGGBB` legacy colour codes.
#[must_use]
pub fn brand(text: &str) -> String {
    text.replace("<title>", "&#FB4BAE")
        .replace("<light>", "&#FFE1F2")
        .replace("<dull>", "&#bbb1c4")
        .replace("<zap>", "⚡")
        .replace("<arrow>", "⤷")
        .replace("<green>", "&#00E676")
        .replace("<error>", "&#FF331C")
}

/// Short human form of a wait, e.g. `1m 5s`. Sub-second leftovers round up
/// so a running cooldown never shows as `0s`.
#[must_use]
pub fn pretty_duration(duration: Duration) -> String {
    let mut secs = duration.as_secs();
    if duration.subsec_nanos() > 0 {
        secs += 1;
    }
    if secs == 0 {
        return "0s".to_string();
    }
    let (hours, minutes, seconds) = (secs / 3600, secs / 60 % 60, secs % 60);
    [(hours, "h"), (minutes, "m"), (seconds, "s")]
        .into_iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{value}{unit}"))
        .join(" ")
}
