use std::time::{Duration, Instant};

use crate::canvas::Canvas;
use crate::color::Color;
use crate::draw::{CompositionMode, DrawCommand, DrawSink, Painter};
use crate::geometry::{Rect, Size};

/// Default repaint delay handed to `schedule_painting`.
pub const MIN_TIME_UPDATE: Duration = Duration::from_millis(16);

/// Off-screen render target the light buffer is composited into.
pub trait FrameBuffer {
    /// Resizes the target; previous contents are undefined afterwards.
    fn resize(&mut self, size: Size);

    fn size(&self) -> Size;

    /// Whether a pending repaint is due. Consulted once per frame; a false
    /// answer means the cached contents are reused.
    fn can_update(&self) -> bool;

    fn schedule_painting(&mut self, delay: Duration);

    /// Routes subsequent draws into this target until `release`.
    fn bind(&mut self) -> &mut dyn DrawSink;

    fn release(&mut self);

    /// Stretches `src` of this target over `dest` of the painter.
    fn draw(&mut self, painter: &mut dyn Painter, mode: CompositionMode, dest: Rect, src: Rect);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameBufferStats {
    pub binds: u32,
    pub releases: u32,
    pub draws: u32,
    pub resizes: u32,
}

#[derive(Clone, Copy, Debug)]
struct RepaintTimer {
    due: Option<Instant>,
}

impl RepaintTimer {
    fn armed() -> Self {
        Self {
            due: Some(Instant::now()),
        }
    }

    fn arm(&mut self, delay: Duration) {
        let at = Instant::now() + delay;
        self.due = Some(match self.due {
            Some(current) if current <= at => current,
            _ => at,
        });
    }

    fn disarm(&mut self) {
        self.due = None;
    }

    fn is_due(&self) -> bool {
        self.due.is_some_and(|at| Instant::now() >= at)
    }
}

/// `Canvas`-backed frame buffer. Repaints are demand driven: a fresh or
/// resized buffer is due immediately, `schedule_painting` arms the earliest
/// deadline and a completed bind/release cycle disarms it.
#[derive(Clone, Debug)]
pub struct SoftFrameBuffer {
    canvas: Canvas,
    timer: RepaintTimer,
    bound: bool,
    stats: FrameBufferStats,
}

impl SoftFrameBuffer {
    pub fn new() -> Self {
        let mut canvas = Canvas::new(Size::default());
        canvas.set_smooth(true);
        Self {
            canvas,
            timer: RepaintTimer::armed(),
            bound: false,
            stats: FrameBufferStats::default(),
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn stats(&self) -> FrameBufferStats {
        self.stats
    }
}

impl Default for SoftFrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer for SoftFrameBuffer {
    fn resize(&mut self, size: Size) {
        self.stats.resizes += 1;
        if self.canvas.size() == size {
            return;
        }
        self.canvas.resize(size);
        self.timer = RepaintTimer::armed();
    }

    fn size(&self) -> Size {
        self.canvas.size()
    }

    fn can_update(&self) -> bool {
        !self.bound && self.timer.is_due()
    }

    fn schedule_painting(&mut self, delay: Duration) {
        self.timer.arm(delay);
    }

    fn bind(&mut self) -> &mut dyn DrawSink {
        self.stats.binds += 1;
        self.bound = true;
        &mut self.canvas
    }

    fn release(&mut self) {
        if !self.bound {
            return;
        }
        self.stats.releases += 1;
        self.bound = false;
        self.timer.disarm();
    }

    fn draw(&mut self, painter: &mut dyn Painter, mode: CompositionMode, dest: Rect, src: Rect) {
        self.stats.draws += 1;
        let command =
            DrawCommand::textured_rect_from(dest, src, self.canvas.snapshot(), Color::WHITE)
                .with_mode(mode);
        painter.submit(command);
    }
}
