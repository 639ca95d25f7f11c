use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::color::Color;
use crate::geometry::Rect;
use crate::texture::Texture;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompositionMode {
    /// Source-over alpha blending.
    #[default]
    Normal,
    /// Overwrite the destination.
    Replace,
    /// Multiply the destination by the source color.
    Light,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlendEquation {
    #[default]
    Add,
    Max,
}

#[derive(Clone, Debug)]
pub enum DrawShape {
    FilledRect(Rect),
    TexturedRect {
        dest: Rect,
        src: Rect,
        texture: Arc<Texture>,
    },
}

impl DrawShape {
    pub fn dest(&self) -> Rect {
        match self {
            DrawShape::FilledRect(rect) => *rect,
            DrawShape::TexturedRect { dest, .. } => *dest,
        }
    }
}

/// A self-contained draw: everything the sink needs travels with the command,
/// so no blend state outlives it.
#[derive(Clone, Debug)]
pub struct DrawCommand {
    pub mode: CompositionMode,
    pub equation: BlendEquation,
    pub color: Color,
    pub shape: DrawShape,
}

impl DrawCommand {
    pub fn filled_rect(rect: Rect, color: Color) -> Self {
        Self {
            mode: CompositionMode::Normal,
            equation: BlendEquation::Add,
            color,
            shape: DrawShape::FilledRect(rect),
        }
    }

    /// Stretches the whole texture over `dest`, tinted by `color`.
    pub fn textured_rect(dest: Rect, texture: Arc<Texture>, color: Color) -> Self {
        let src = Rect::from_size(texture.size());
        Self::textured_rect_from(dest, src, texture, color)
    }

    pub fn textured_rect_from(dest: Rect, src: Rect, texture: Arc<Texture>, color: Color) -> Self {
        Self {
            mode: CompositionMode::Normal,
            equation: BlendEquation::Add,
            color,
            shape: DrawShape::TexturedRect { dest, src, texture },
        }
    }

    pub fn with_mode(mut self, mode: CompositionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_equation(mut self, equation: BlendEquation) -> Self {
        self.equation = equation;
        self
    }

    pub fn dest(&self) -> Rect {
        self.shape.dest()
    }

    pub fn is_textured(&self) -> bool {
        matches!(self.shape, DrawShape::TexturedRect { .. })
    }
}

pub trait DrawSink {
    fn submit(&mut self, command: DrawCommand);
}

impl DrawSink for Vec<DrawCommand> {
    fn submit(&mut self, command: DrawCommand) {
        self.push(command);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PainterState {
    pub clip: Option<Rect>,
    pub opacity: f32,
}

impl Default for PainterState {
    fn default() -> Self {
        Self {
            clip: None,
            opacity: 1.0,
        }
    }
}

pub trait Painter: DrawSink {
    /// Pushes the current state and resets to defaults.
    fn save_and_reset_state(&mut self);

    /// Pops the last saved state; resets to defaults when nothing was saved.
    fn restore_saved_state(&mut self);
}

/// Saves painter state on creation and restores it on drop.
pub struct SavedState<'a, P: Painter + ?Sized> {
    painter: &'a mut P,
}

impl<'a, P: Painter + ?Sized> SavedState<'a, P> {
    pub fn new(painter: &'a mut P) -> Self {
        painter.save_and_reset_state();
        Self { painter }
    }
}

impl<P: Painter + ?Sized> Deref for SavedState<'_, P> {
    type Target = P;

    fn deref(&self) -> &P {
        self.painter
    }
}

impl<P: Painter + ?Sized> DerefMut for SavedState<'_, P> {
    fn deref_mut(&mut self) -> &mut P {
        self.painter
    }
}

impl<P: Painter + ?Sized> Drop for SavedState<'_, P> {
    fn drop(&mut self) {
        self.painter.restore_saved_state();
    }
}
