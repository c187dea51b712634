//! Router Module Index
//!
//! Splits the edge's routes by who answers them: the edge itself, or the page
//! renderer behind it. The access guard runs in front of both (see `access_guard`),
//! but only acts on paths inside the configured matcher set.

/// Routes the edge answers itself (health, access preview).
pub mod public;

/// The fallback that forwards everything else to the page renderer.
pub mod pages;
