//! Per-frame light buffer for multi-floor tile maps.
//!
//! A map view feeds light sources and shades into a [`LightView`] while it
//! paints the scene, floor by floor. Once the scene is drawn, the view
//! recomposites its off-screen buffer (ambient fill, shade stamps, light
//! bubbles) when a repaint is due and multiplies the result over the scene.
//!
//! Painting goes through the [`DrawSink`], [`Painter`] and [`FrameBuffer`]
//! traits. [`Canvas`] and [`SoftFrameBuffer`] implement them in software.

pub mod canvas;
pub mod color;
pub mod compositor;
pub mod config;
pub mod draw;
pub mod error;
pub mod framebuffer;
pub mod geometry;
pub mod light;
pub mod metrics;
pub mod orchestrator;
pub mod registry;
pub mod texture;
pub mod view;

pub use canvas::Canvas;
pub use color::Color;
pub use compositor::Compositor;
pub use config::LightingConfig;
pub use draw::{
    BlendEquation, CompositionMode, DrawCommand, DrawShape, DrawSink, Painter, PainterState,
    SavedState,
};
pub use error::ConfigError;
pub use framebuffer::{FrameBuffer, FrameBufferStats, MIN_TIME_UPDATE, SoftFrameBuffer};
pub use geometry::{Point, Rect, Size};
pub use light::{Light, LightSource, ShadeBlock};
pub use metrics::{MAX_FLOOR, TILE_PIXELS, ViewMetrics};
pub use orchestrator::{DrawPool, DrawPoolType, FrameOrchestrator, MapWidget};
pub use registry::{FloorSession, LightRegistry};
pub use texture::{Texture, generate_light_texture, generate_shade_texture};
pub use view::{DARKNESS_THRESHOLD, LightView};
