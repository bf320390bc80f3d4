//! Display metadata for streaming platforms

use smlcore::PlatformId;

/// How a platform button is presented on a SmartLink page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformDisplay {
    pub name: &'static str,
    /// CSS brand color
    pub color: &'static str,
    /// Lower comes first
    pub priority: u8,
}

/// Display entry for `platform`.
///
/// The match is exhaustive: a new [`PlatformId`] variant does not compile
/// until it gets an entry here, so no platform ever falls back to a default
/// priority.
pub fn display(platform: PlatformId) -> PlatformDisplay {
    let (name, color, priority) = match platform {
        PlatformId::Spotify => ("Spotify", "#1DB954", 1),
        PlatformId::Apple => ("Apple Music", "#FA243C", 2),
        PlatformId::Youtube => ("YouTube", "#FF0000", 3),
        PlatformId::Deezer => ("Deezer", "#A238FF", 4),
        PlatformId::Tidal => ("TIDAL", "#000000", 5),
        PlatformId::Amazon => ("Amazon Music", "#25D1DA", 6),
        PlatformId::Soundcloud => ("SoundCloud", "#FF5500", 7),
        PlatformId::Bandcamp => ("Bandcamp", "#629AA9", 8),
        PlatformId::Pandora => ("Pandora", "#3668FF", 9),
        PlatformId::Napster => ("Napster", "#2259FF", 10),
    };
    PlatformDisplay {
        name,
        color,
        priority,
    }
}
