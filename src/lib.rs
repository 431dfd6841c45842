//! Nautilus: an interactive dashboard over a table of maritime incidents.
//!
//! The [`data`] module is the reusable core (load, filter, aggregate); the
//! rest is the egui front-end that renders its output.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod state;
pub mod ui;
