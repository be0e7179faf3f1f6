//! Terminal host for the chessboard: a ratatui surface, mouse-driven drag and
//! drop, and a rules-checked game against a random opponent.

pub mod actor;
pub mod app;
pub mod game;
pub mod hooks;
pub mod scene;
pub mod settings;
pub mod surface;
pub mod theme;
pub mod widgets;
