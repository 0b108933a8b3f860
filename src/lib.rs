//! Spotify preview streamer
//!
//! A playlist-driven playback session around an abstract media decoder, with a
//! single-task controller, a now-playing poller and a terminal front end.

pub mod audio;
pub mod config;
pub mod controller;
pub mod logging;
pub mod model;
pub mod session;
pub mod view;
