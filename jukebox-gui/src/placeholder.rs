//! Text placeholders describing a jukebox, e.g. `now-playing_10_64_-3`.
//!
//! Coordinates are resolved in the world of the player asking.

use jukebox_core::text::pretty_duration;
use jukebox_core::{Actor, Location};

use crate::jukebox::JukeboxRegistry;

#[derive(Debug, PartialEq, Eq)]
enum Placeholder<'a> {
    NowPlaying([i32; 3]),
    Cooldown([i32; 3]),
    /// The fallback swallows the rest of the input, underscores included.
    CooldownOr([i32; 3], &'a str),
}

impl<'a> Placeholder<'a> {
    fn parse(params: &'a str) -> Option<Self> {
        let (name, rest) = params.split_once('_')?;
        let mut parts = rest.splitn(4, '_');
        let mut coordinate = || parts.next()?.parse::<i32>().ok();
        let position = [coordinate()?, coordinate()?, coordinate()?];
        let otherwise = parts.next();

        match (name, otherwise) {
            ("now-playing", None) => Some(Placeholder::NowPlaying(position)),
            ("cooldown", None) => Some(Placeholder::Cooldown(position)),
            ("cooldown-or", Some(otherwise)) => Some(Placeholder::CooldownOr(position, otherwise)),
            _ => None,
        }
    }

    const fn position(&self) -> [i32; 3] {
        match self {
            Placeholder::NowPlaying(position)
            | Placeholder::Cooldown(position)
            | Placeholder::CooldownOr(position, _) => *position,
        }
    }
}

/// `None` if `params` names no known placeholder.
#[must_use]
pub fn resolve(registry: &JukeboxRegistry, requester: Option<&Actor>, params: &str) -> Option<String> {
    let placeholder = Placeholder::parse(params)?;

    let Some(requester) = requester else {
        return Some("Invalid world".to_string());
    };
    let [x, y, z] = placeholder.position();
    let Some(jukebox) = registry.get(&Location::new(requester.world.clone(), x, y, z)) else {
        return Some("Unknown jukebox".to_string());
    };

    let value = match placeholder {
        Placeholder::NowPlaying(_) => jukebox.current_track().map_or_else(
            || "Nothing".to_string(),
            |track| format!("<lang:{}>", track.song_translation_key(requester.is_legacy_client())),
        ),
        Placeholder::Cooldown(_) => {
            let wait = jukebox.limiter().remaining_wait(&requester.uuid);
            if wait.is_zero() {
                String::new()
            } else {
                pretty_duration(wait)
            }
        }
        Placeholder::CooldownOr(_, otherwise) => {
            let wait = jukebox.limiter().remaining_wait(&requester.uuid);
            if wait.is_zero() {
                otherwise.to_string()
            } else {
                pretty_duration(wait)
            }
        }
    };
    Some(value)
}
