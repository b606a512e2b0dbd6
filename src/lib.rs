//! Disease image portal core.
//!
//! Authenticated users upload images tagged with a disease name; the images
//! are kept as blobs in a SQLite catalog and can later be browsed, renamed or
//! deleted. Rendering is left to the caller; this crate provides the catalog
//! ([`state::RecordStore`]), the login gate ([`auth::SessionGate`]) and the
//! controller joining them ([`portal::Portal`]).

pub mod auth;
pub mod config;
pub mod error;
pub mod portal;
pub mod state;
pub mod upload;

pub use error::{Error, Result};
