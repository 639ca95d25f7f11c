//! Multi-floor tile maps: the map model, a char-grid parser, a camera that
//! drives a [`lightview::LightView`] while painting the scene, and (with the
//! `ratatui` feature) a half-block terminal blit.

pub mod core;
pub mod parse;
pub mod prelude;
#[cfg(feature = "ratatui")]
pub mod render;
pub mod view;
