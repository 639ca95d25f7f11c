use std::time::Duration;

use tracing::{debug, trace};

use crate::compositor::Compositor;
use crate::config::LightingConfig;
use crate::draw::{CompositionMode, Painter, SavedState};
use crate::framebuffer::{FrameBuffer, SoftFrameBuffer};
use crate::geometry::Rect;
use crate::light::Light;
use crate::metrics::ViewMetrics;
use crate::registry::{FloorSession, LightRegistry};

/// Ambient intensity at or above which the scene counts as fully lit.
pub const DARKNESS_THRESHOLD: u8 = 250;

/// Light buffer of one map view.
///
/// Each frame the scene traversal fills the registry through
/// [`LightView::set_floor`]; [`LightView::draw`] then recomposites the buffer
/// when it is due and multiplies it over the painted scene.
pub struct LightView<F: FrameBuffer = SoftFrameBuffer> {
    global_light: Light,
    buffer: F,
    compositor: Compositor,
    registry: LightRegistry,
    min_update_interval: Duration,
}

impl<F: FrameBuffer> LightView<F> {
    pub fn new(buffer: F, config: &LightingConfig, metrics: &dyn ViewMetrics) -> Self {
        let mut view = Self {
            global_light: Light::default(),
            buffer,
            compositor: Compositor::new(config),
            registry: LightRegistry::new(),
            min_update_interval: config.min_update_interval(),
        };
        view.resize(metrics);
        view
    }

    pub fn global_light(&self) -> Light {
        self.global_light
    }

    pub fn set_global_light(&mut self, light: Light) {
        self.global_light = light;
    }

    pub fn is_dark(&self) -> bool {
        self.global_light.intensity < DARKNESS_THRESHOLD
    }

    pub fn can_update(&self) -> bool {
        self.is_dark() && self.buffer.can_update()
    }

    /// Requests a recomposite after the configured minimum interval.
    pub fn schedule_painting(&mut self) {
        self.schedule_painting_in(self.min_update_interval);
    }

    /// Lit scenes never composite, so requests are dropped while not dark.
    pub fn schedule_painting_in(&mut self, delay: Duration) {
        if self.is_dark() {
            self.buffer.schedule_painting(delay);
        }
    }

    /// Matches the buffer to the view's frame and rebuilds the shade table.
    pub fn resize(&mut self, metrics: &dyn ViewMetrics) {
        let frame = metrics.frame_size();
        let slots = metrics.draw_dimension().area();
        self.buffer.resize(frame);
        self.registry.resize_shades(slots);
        debug!(
            width = frame.width,
            height = frame.height,
            slots,
            "resized light buffer"
        );
    }

    /// Starts submitting lights and shades for floor `z`.
    pub fn set_floor<'a>(&'a mut self, z: u8, metrics: &'a dyn ViewMetrics) -> FloorSession<'a> {
        FloorSession::new(&mut self.registry, metrics, z)
    }

    /// Multiplies the light buffer over `dest` of the painter.
    ///
    /// Does nothing while the scene is lit. Otherwise the buffer is
    /// recomposited from the registry when due, and its `src` region is drawn
    /// with [`CompositionMode::Light`]. Painter state is reset for the duration
    /// of the call and restored afterwards. Pending lights are consumed either
    /// way.
    pub fn draw(
        &mut self,
        painter: &mut dyn Painter,
        metrics: &dyn ViewMetrics,
        dest: Rect,
        src: Rect,
    ) {
        if !self.is_dark() {
            self.registry.clear_lights();
            return;
        }

        let mut painter = SavedState::new(painter);

        if self.buffer.can_update() {
            let size = self.buffer.size();
            let pending = self.registry.pending_lights();
            let target = self.buffer.bind();
            self.compositor.draw_lights(
                target,
                self.global_light,
                size,
                &mut self.registry,
                metrics,
            );
            self.buffer.release();
            trace!(pending, "recomposited light buffer");
        } else {
            self.registry.clear_lights();
        }

        self.buffer.draw(&mut *painter, CompositionMode::Light, dest, src);
    }

    pub fn registry(&self) -> &LightRegistry {
        &self.registry
    }

    pub fn buffer(&self) -> &F {
        &self.buffer
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }
}
