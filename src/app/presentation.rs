use std::collections::BTreeSet;

use crate::domain::theme::Mood;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SurfaceFlag {
    Cloudy,
    CloudHeavy,
    Rainy,
    Snowy,
    Cold,
}

impl SurfaceFlag {
    pub const ALL: [SurfaceFlag; 5] = [
        SurfaceFlag::Cloudy,
        SurfaceFlag::CloudHeavy,
        SurfaceFlag::Rainy,
        SurfaceFlag::Snowy,
        SurfaceFlag::Cold,
    ];

    pub fn class_name(self) -> &'static str {
        match self {
            SurfaceFlag::Cloudy => "is-cloudy",
            SurfaceFlag::CloudHeavy => "is-cloudy-heavy",
            SurfaceFlag::Rainy => "is-rainy",
            SurfaceFlag::Snowy => "is-snowy",
            SurfaceFlag::Cold => "is-cold",
        }
    }
}

pub fn mood_class(mood: Mood) -> Option<&'static str> {
    match mood {
        Mood::Good => Some("theme-good"),
        Mood::Bad => Some("theme-bad"),
        Mood::Neutral => None,
    }
}

/// What the theme pipeline may change on the shared presentation surface.
/// The stylesheet-level meaning of each flag lives with the implementor.
pub trait PresentationSurface {
    /// Replaces the mood class; `Mood::Neutral` leaves none set.
    fn set_mood_class(&mut self, mood: Mood);

    fn set_cloud_opacity(&mut self, opacity: Option<f32>);

    fn set_flag(&mut self, flag: SurfaceFlag, on: bool);
}

/// In-memory presentation surface. The terminal renderer reads it to tint
/// the sky.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentationState {
    mood: Mood,
    flags: BTreeSet<SurfaceFlag>,
    cloud_opacity: Option<String>,
}

impl Default for PresentationState {
    fn default() -> Self {
        Self {
            mood: Mood::Neutral,
            flags: BTreeSet::new(),
            cloud_opacity: None,
        }
    }
}

impl PresentationState {
    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn has(&self, flag: SurfaceFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// The cloud opacity variable exactly as written, two decimals.
    pub fn cloud_opacity_var(&self) -> Option<&str> {
        self.cloud_opacity.as_deref()
    }

    pub fn cloud_opacity(&self) -> Option<f32> {
        self.cloud_opacity.as_deref()?.parse().ok()
    }

    pub fn classes(&self) -> Vec<&'static str> {
        mood_class(self.mood)
            .into_iter()
            .chain(self.flags.iter().map(|flag| flag.class_name()))
            .collect()
    }
}

impl PresentationSurface for PresentationState {
    fn set_mood_class(&mut self, mood: Mood) {
        self.mood = mood;
    }

    fn set_cloud_opacity(&mut self, opacity: Option<f32>) {
        self.cloud_opacity = opacity.map(|value| format!("{value:.2}"));
    }

    fn set_flag(&mut self, flag: SurfaceFlag, on: bool) {
        if on {
            self.flags.insert(flag);
        } else {
            self.flags.remove(&flag);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cloud_opacity_is_written_with_two_decimals() {
        let mut state = PresentationState::default();
        state.set_cloud_opacity(Some(0.35 + 0.8 * 0.55));
        assert_eq!(state.cloud_opacity_var(), Some("0.79"));
        assert_eq!(state.cloud_opacity(), Some(0.79));

        state.set_cloud_opacity(None);
        assert_eq!(state.cloud_opacity_var(), None);
    }

    #[test]
    fn classes_list_mood_then_flags() {
        let mut state = PresentationState::default();
        state.set_flag(SurfaceFlag::Cold, true);
        state.set_flag(SurfaceFlag::Cloudy, true);
        state.set_mood_class(Mood::Good);
        assert_eq!(state.classes(), vec!["theme-good", "is-cloudy", "is-cold"]);

        state.set_mood_class(Mood::Neutral);
        state.set_flag(SurfaceFlag::Cold, false);
        assert_eq!(state.classes(), vec!["is-cloudy"]);
    }
}
