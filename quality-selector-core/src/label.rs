use super::models::{Quality, QualityLevel};

/// Human-readable label for a level, e.g. `720p (2500kb)`.
pub fn nice_label(level: &QualityLevel) -> String {
    let kb = bitrate_kb(level.bitrate);
    match (level.height, kb) {
        (0, kb) => format!("{kb}kb"),
        (height, 0) => format!("{height}p"),
        (height, kb) => format!("{height}p ({kb}kb)"),
    }
}

// Rounded to the nearest kilobit.
fn bitrate_kb(bitrate: u64) -> u64 {
    bitrate / 1000 + u64::from(bitrate % 1000 >= 500)
}

impl Quality {
    pub fn label(&self) -> String {
        match self {
            Quality::Auto => "auto".to_string(),
            Quality::Level(level) => nice_label(level),
        }
    }
}
