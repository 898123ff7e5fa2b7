pub mod theme;
pub mod weather;
