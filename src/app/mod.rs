pub mod effects;
pub mod events;
pub mod presentation;
pub mod settings;
pub mod state;
pub mod theme;
