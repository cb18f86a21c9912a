//! HTTP service for location-based trivia hunts.
//!
//! Hunts live in memory for their duration. A background task moves roving
//! checkpoints every couple of seconds; everything else happens in request
//! handlers.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod ticker;
pub mod verify;
pub mod views;

pub use routes::create_router;
pub use state::AppState;
