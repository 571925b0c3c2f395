//! Forward-auth edge: delegates the authorization of every protected
//! request to an external authentication service (`/api/verify`) and
//! either relays its rejection or hands the asserted identity to the
//! next stage.
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
