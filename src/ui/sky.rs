#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};

use crate::{
    app::presentation::{PresentationState, SurfaceFlag},
    domain::theme::Mood,
};

type Rgb = (u8, u8, u8);

const CLOUD_GREY: Rgb = (148, 163, 184);
const FROST: Rgb = (200, 225, 255);

/// Top and bottom sky colours for a mood.
fn mood_gradient(mood: Mood) -> (Rgb, Rgb) {
    match mood {
        Mood::Good => ((40, 110, 190), (140, 195, 235)),
        Mood::Bad => ((38, 46, 60), (78, 90, 108)),
        Mood::Neutral => ((15, 23, 42), (30, 41, 59)),
    }
}

/// The sky behind the particle layers, tinted by the presentation state the
/// theme pipeline writes.
pub struct SkyBackground<'a> {
    pub presentation: &'a PresentationState,
}

impl SkyBackground<'_> {
    pub fn colors(&self) -> (Rgb, Rgb) {
        let (mut top, mut bottom) = mood_gradient(self.presentation.mood());
        if let Some(opacity) = self.presentation.cloud_opacity() {
            let t = opacity * 0.6;
            top = mix_rgb(top, CLOUD_GREY, t);
            bottom = mix_rgb(bottom, CLOUD_GREY, t);
        }
        if self.presentation.has(SurfaceFlag::Cold) {
            top = mix_rgb(top, FROST, 0.15);
            bottom = mix_rgb(bottom, FROST, 0.25);
        }
        (top, bottom)
    }
}

impl Widget for SkyBackground<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (top, bottom) = self.colors();
        for y in area.top()..area.bottom() {
            let (r, g, b) = mix_rgb(top, bottom, gradient_ratio(area, y));
            for x in area.left()..area.right() {
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_char(' ').set_bg(Color::Rgb(r, g, b));
                }
            }
        }
    }
}

fn gradient_ratio(area: Rect, y: u16) -> f32 {
    if area.height <= 1 {
        0.0
    } else {
        f32::from(y - area.top()) / f32::from(area.height - 1)
    }
}

fn mix_rgb(a: Rgb, b: Rgb, t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| -> u8 {
        (f32::from(x) + (f32::from(y) - f32::from(x)) * t)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}
