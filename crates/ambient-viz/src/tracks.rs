//! Track table of the player, grouped by mood category.

/// One selectable track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Track {
    pub key: &'static str,
    pub bpm: u32,
    /// Theme category key
    pub category: &'static str,
}

const fn track(key: &'static str, bpm: u32, category: &'static str) -> Track {
    Track { key, bpm, category }
}

pub const TRACKS: [Track; 24] = [
    // Focus
    track("deepfocus", 70, "focus"),
    track("flow", 80, "focus"),
    track("minimal", 75, "focus"),
    track("study", 72, "focus"),
    // Chill
    track("lofi", 85, "chill"),
    track("coffee", 90, "chill"),
    track("jazz", 68, "chill"),
    track("vinyl", 75, "chill"),
    // Nature
    track("rain", 72, "nature"),
    track("ocean", 55, "nature"),
    track("forest", 65, "nature"),
    track("thunder", 50, "nature"),
    // Ambient
    track("ambient", 60, "ambient"),
    track("drone", 40, "ambient"),
    track("ethereal", 55, "ambient"),
    track("cosmos", 45, "ambient"),
    // Wellness
    track("meditation", 50, "wellness"),
    track("breathing", 48, "wellness"),
    track("sleep", 40, "wellness"),
    track("healing", 52, "wellness"),
    // Moody
    track("night", 65, "moody"),
    track("melancholy", 58, "moody"),
    track("noir", 55, "moody"),
    track("mystery", 60, "moody"),
];

/// Cursor into [`TRACKS`] that wraps at both ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackCursor {
    index: usize,
}

impl TrackCursor {
    /// Start at the track named `key`, or the first track if unknown
    pub fn starting_at(key: Option<&str>) -> Self {
        let index = key
            .and_then(|k| TRACKS.iter().position(|t| t.key == k))
            .unwrap_or(0);
        Self { index }
    }

    pub fn current(&self) -> &'static Track {
        &TRACKS[self.index]
    }

    pub fn next(&mut self) -> &'static Track {
        self.index = (self.index + 1) % TRACKS.len();
        self.current()
    }

    pub fn previous(&mut self) -> &'static Track {
        self.index = (self.index + TRACKS.len() - 1) % TRACKS.len();
        self.current()
    }
}
