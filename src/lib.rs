//! Outreach console library
//!
//! Core components for the agent operator console.

pub mod app;
pub mod client;
pub mod controller;
pub mod event;
pub mod poll;
pub mod state;
pub mod ui;
