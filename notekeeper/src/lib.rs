//! Notekeeper library
//!
//! Local note storage with live queries, a pass-through repository and a
//! view-model for a card-grid notes UI.

pub mod app;
pub mod config;
pub mod database;
pub mod error;
pub mod repository;
pub mod services;
