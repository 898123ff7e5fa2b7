pub mod canvas;
pub mod sky;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{
    app::state::{AppMode, AppState, ConditionsSource},
    domain::weather::{quick_city_count, weather_label},
    ui::sky::SkyBackground,
};

/// Terminal rows reserved below the sky.
pub const STATUS_ROWS: u16 = 1;

pub fn render(frame: &mut Frame, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(STATUS_ROWS)])
        .split(frame.area());

    render_sky(frame, chunks[0], state);
    frame.render_widget(Paragraph::new(status_line(state)), chunks[1]);
}

fn render_sky(frame: &mut Frame, area: Rect, state: &AppState) {
    frame.render_widget(
        SkyBackground {
            presentation: &state.presentation,
        },
        area,
    );
    let buf = frame.buffer_mut();
    if let Some(snow) = state.effects.snow().surface() {
        snow.paint(area, buf);
    }
    if let Some(rain) = state.effects.rain().surface() {
        rain.paint(area, buf);
    }
}

pub fn status_line(state: &AppState) -> Line<'static> {
    let muted = Style::default().fg(Color::Gray);
    let mut spans = vec![Span::styled(
        format!(" {} ", state.location.name),
        Style::default().add_modifier(Modifier::BOLD),
    )];

    let current = state.snapshot.as_ref().map(|s| s.current).or(match state.source {
        ConditionsSource::Static(current) => Some(current),
        ConditionsSource::Live => None,
    });

    match (state.mode, current) {
        (AppMode::Loading, None) => {
            let text = match &state.pending_city {
                Some(city) => format!("Looking up {city}..."),
                None => "Fetching weather...".to_string(),
            };
            spans.push(Span::styled(text, muted));
        }
        (AppMode::Error, None) => spans.push(Span::styled(
            format!(
                "⚠ {}",
                state.last_error.as_deref().unwrap_or("weather unavailable")
            ),
            Style::default().fg(Color::LightRed),
        )),
        (_, Some(current)) => {
            spans.push(Span::raw(weather_label(current.weather_code)));
            if let Some(temp) = current.temperature_2m_c {
                spans.push(Span::raw(format!("  {temp:.0}°C")));
            }
        }
        (_, None) => {}
    }

    let classes = state.presentation.classes();
    if !classes.is_empty() {
        spans.push(Span::styled(format!("  [{}]", classes.join(" ")), muted));
    }
    if let Some(snapshot) = &state.snapshot {
        spans.push(Span::styled(
            format!("  updated {}m ago", snapshot.age_minutes().max(0)),
            muted,
        ));
        if state.last_error.is_some() {
            spans.push(Span::styled("  ⚠ stale", Style::default().fg(Color::Yellow)));
        }
    }
    if !state.settings.animation {
        spans.push(Span::styled("  paused", muted));
    }
    let keys = match state.source {
        ConditionsSource::Live => {
            format!("  q quit · r refresh · space pause · 1-{} city", quick_city_count())
        }
        ConditionsSource::Static(_) => "  q quit · space pause".to_string(),
    };
    spans.push(Span::styled(keys, muted));
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::{app::settings::RuntimeSettings, cli::Cli};

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn state(args: &[&str]) -> AppState {
        let cli = Cli::parse_from(std::iter::once("weather-fx").chain(args.iter().copied()));
        AppState::new(&cli, RuntimeSettings::from_cli_defaults(&cli), (40, 11))
    }

    #[test]
    fn loading_status_before_first_fetch() {
        let text = line_text(&status_line(&state(&[])));
        assert!(text.contains("Warszawa"));
        assert!(text.contains("Fetching weather..."));
    }

    #[test]
    fn pending_city_lookup_is_shown() {
        let text = line_text(&status_line(&state(&["--city", "Gdańsk"])));
        assert!(text.contains("Looking up Gdańsk..."));
        assert!(text.contains("1-5 city"));
    }

    #[test]
    fn static_status_shows_label_and_temperature() {
        let text = line_text(&status_line(&state(&["--code", "73", "--temp", "-3.4"])));
        assert!(text.contains("Moderate snowfall"));
        assert!(text.contains("-3°C"));
        assert!(!text.contains("refresh"));
    }

    #[test]
    fn renders_sky_and_status_into_frame() {
        let app = state(&["--code", "0"]);
        let mut terminal = Terminal::new(TestBackend::new(40, 11)).expect("terminal");
        terminal.draw(|frame| render(frame, &app)).expect("draw");

        let buffer = terminal.backend().buffer();
        let status: String = (0..40)
            .filter_map(|x| buffer.cell((x, 10)).map(|c| c.symbol().to_string()))
            .collect();
        assert!(status.contains("Warszawa"));
        assert!(matches!(
            buffer.cell((0, 0)).map(|c| c.bg),
            Some(Color::Rgb(..))
        ));
    }
}
