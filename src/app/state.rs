use std::time::Instant;

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEventKind};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::{
    app::{
        effects::EffectsContext,
        events::{AppEvent, schedule_retry, start_frame_task, start_refresh_task},
        presentation::PresentationState,
        settings::RuntimeSettings,
        theme::on_weather_refresh,
    },
    cli::Cli,
    data::{forecast::ForecastClient, geocode::GeocodeClient},
    domain::{
        theme::ThemeDescriptor,
        weather::{ConditionsSnapshot, CurrentConditions, Location, quick_city},
    },
    fx::Viewport,
    timing::backoff::Backoff,
    ui::{
        STATUS_ROWS,
        canvas::{CELL_HEIGHT_PX, CELL_WIDTH_PX, CellCanvas},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Loading,
    Ready,
    Error,
    Quit,
}

/// Where the current conditions come from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConditionsSource {
    /// Fixed conditions from the command line; no network.
    Static(CurrentConditions),
    Live,
}

#[derive(Debug)]
pub struct AppState {
    pub mode: AppMode,
    pub running: bool,
    pub settings: RuntimeSettings,
    pub location: Location,
    pub source: ConditionsSource,
    pub effects: EffectsContext<CellCanvas>,
    pub presentation: PresentationState,
    pub descriptor: ThemeDescriptor,
    pub snapshot: Option<ConditionsSnapshot>,
    pub last_error: Option<String>,
    pub backoff: Backoff,
    pub fetch_in_flight: bool,
    /// City still waiting to be looked up before the first fetch.
    pub pending_city: Option<String>,
    forecast_url: Option<String>,
    geocode_url: Option<String>,
}

/// Sky viewport for a terminal of `cols` x `rows`, minus the status line.
pub fn viewport_for(cols: u16, rows: u16, pixel_ratio: f32) -> Viewport {
    Viewport::new(
        f32::from(cols) * CELL_WIDTH_PX,
        f32::from(rows.saturating_sub(STATUS_ROWS)) * CELL_HEIGHT_PX,
        pixel_ratio,
    )
}

impl AppState {
    pub fn new(cli: &Cli, settings: RuntimeSettings, (cols, rows): (u16, u16)) -> Self {
        let viewport = viewport_for(cols, rows, settings.pixel_ratio);
        let source = cli
            .static_conditions()
            .map_or(ConditionsSource::Live, ConditionsSource::Static);

        Self {
            mode: AppMode::Loading,
            running: true,
            location: settings.location.clone().unwrap_or_else(Location::warsaw),
            settings,
            source,
            effects: EffectsContext::new(
                Some(CellCanvas::new()),
                Some(CellCanvas::new()),
                viewport,
            ),
            presentation: PresentationState::default(),
            descriptor: ThemeDescriptor::NEUTRAL,
            snapshot: None,
            last_error: None,
            backoff: Backoff::from_secs(10, 300),
            fetch_in_flight: false,
            pending_city: cli
                .city_query()
                .filter(|_| !cli.is_static())
                .map(str::to_string),
            forecast_url: cli.forecast_url.clone(),
            geocode_url: cli.geocode_url.clone(),
        }
    }

    /// Settings worth persisting at exit.
    pub fn settings_to_save(&self) -> RuntimeSettings {
        RuntimeSettings {
            location: Some(self.location.clone()),
            ..self.settings.clone()
        }
    }

    pub async fn handle_event(
        &mut self,
        event: AppEvent,
        tx: &mpsc::Sender<AppEvent>,
    ) -> Result<()> {
        match event {
            AppEvent::Bootstrap => {
                start_frame_task(tx.clone(), self.settings.fps);
                match self.source {
                    ConditionsSource::Static(current) => {
                        info!(?current, "using static conditions");
                        self.apply_conditions(&current);
                        self.mode = AppMode::Ready;
                    }
                    ConditionsSource::Live => {
                        start_refresh_task(tx.clone(), self.settings.refresh_interval_secs);
                        match self.pending_city.clone() {
                            Some(city) => self.start_geocode(city, tx),
                            None => self.start_fetch(tx).await?,
                        }
                    }
                }
            }
            AppEvent::TickFrame => self.on_frame_tick(Instant::now()),
            AppEvent::TickRefresh => {
                if self.mode != AppMode::Quit {
                    self.start_fetch(tx).await?;
                }
            }
            AppEvent::Input(event) => self.handle_input(event, tx).await?,
            AppEvent::FetchStarted => {
                if self.snapshot.is_none() {
                    self.mode = AppMode::Loading;
                }
            }
            AppEvent::LocationResolved(location) => {
                info!(city = ?self.pending_city, location = %location.name, "city resolved");
                self.pending_city = None;
                self.location = location;
                self.start_fetch(tx).await?;
            }
            AppEvent::GeocodeFailed(err) => {
                warn!(error = %err, fallback = %self.location.name, "city lookup failed");
                self.pending_city = None;
                self.last_error = Some(err);
                self.start_fetch(tx).await?;
            }
            AppEvent::FetchSucceeded(snapshot) => {
                self.fetch_in_flight = false;
                if snapshot.location != self.location {
                    // Answer for a location the user has since left.
                    self.start_fetch(tx).await?;
                    return Ok(());
                }
                self.apply_conditions(&snapshot.current);
                info!(location = %snapshot.location.name, "conditions refreshed");
                self.snapshot = Some(snapshot);
                self.mode = AppMode::Ready;
                self.last_error = None;
                self.backoff.reset();
            }
            AppEvent::FetchFailed(err) => {
                self.fetch_in_flight = false;
                let delay = self.backoff.next_delay();
                warn!(error = %err, retry_in = ?delay, "conditions refresh failed");
                self.last_error = Some(err);
                if self.snapshot.is_none() {
                    self.mode = AppMode::Error;
                }
                schedule_retry(tx.clone(), delay);
            }
            AppEvent::Quit => {
                self.mode = AppMode::Quit;
            }
        }

        Ok(())
    }

    /// A settled resize lands even while paused; frames only while animating.
    fn on_frame_tick(&mut self, now: Instant) {
        self.effects.apply_pending_resize(now);
        if self.settings.animation {
            self.effects.pump(now);
        }
    }

    /// Switches to `location` and fetches its conditions. The current theme
    /// stays up until the new answer arrives.
    async fn select_location(
        &mut self,
        location: Location,
        tx: &mpsc::Sender<AppEvent>,
    ) -> Result<()> {
        if matches!(self.source, ConditionsSource::Static(_)) || location == self.location {
            return Ok(());
        }
        info!(location = %location.name, "location selected");
        self.location = location;
        self.start_fetch(tx).await
    }

    fn apply_conditions(&mut self, current: &CurrentConditions) {
        self.descriptor = on_weather_refresh(
            current,
            &mut self.effects,
            &mut self.presentation,
            Instant::now(),
        );
    }

    async fn handle_input(&mut self, event: Event, tx: &mpsc::Sender<AppEvent>) -> Result<()> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => {
                    tx.send(AppEvent::Quit).await?;
                }
                KeyCode::Char('r') => {
                    self.start_fetch(tx).await?;
                }
                KeyCode::Char(' ') => {
                    self.settings.animation = !self.settings.animation;
                    info!(animation = self.settings.animation, "animation toggled");
                }
                KeyCode::Char(digit @ '1'..='9') => {
                    let slot = digit.to_digit(10).map_or(0, |d| d as usize - 1);
                    if let Some(location) = quick_city(slot) {
                        self.select_location(location, tx).await?;
                    }
                }
                _ => {}
            },
            Event::Resize(cols, rows) => {
                self.effects.viewport_changed(
                    viewport_for(cols, rows, self.settings.pixel_ratio),
                    Instant::now(),
                );
            }
            _ => {}
        }

        Ok(())
    }

    fn start_geocode(&mut self, city: String, tx: &mpsc::Sender<AppEvent>) {
        let client = match &self.geocode_url {
            Some(url) => GeocodeClient::with_base_url(url.clone()),
            None => GeocodeClient::new(),
        };
        let tx2 = tx.clone();
        tokio::spawn(async move {
            let result = match client {
                Ok(client) => client.resolve(&city).await,
                Err(err) => Err(err),
            };
            let event = match result {
                Ok(location) => AppEvent::LocationResolved(location),
                Err(err) => AppEvent::GeocodeFailed(err.to_string()),
            };
            let _ = tx2.send(event).await;
        });
    }

    async fn start_fetch(&mut self, tx: &mpsc::Sender<AppEvent>) -> Result<()> {
        if self.fetch_in_flight
            || self.pending_city.is_some()
            || matches!(self.source, ConditionsSource::Static(_))
        {
            return Ok(());
        }
        self.fetch_in_flight = true;
        tx.send(AppEvent::FetchStarted).await?;

        let client = match &self.forecast_url {
            Some(url) => ForecastClient::with_base_url(url.clone()),
            None => ForecastClient::new(),
        };
        let location = self.location.clone();
        let tx2 = tx.clone();
        tokio::spawn(async move {
            let result = match client {
                Ok(client) => client.fetch(location).await,
                Err(err) => Err(err),
            };
            let event = match result {
                Ok(snapshot) => AppEvent::FetchSucceeded(snapshot),
                Err(err) => AppEvent::FetchFailed(err.to_string()),
            };
            let _ = tx2.send(event).await;
        });
        Ok(())
    }
}
