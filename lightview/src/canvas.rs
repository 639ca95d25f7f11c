use std::sync::Arc;

use image::{Rgba, RgbaImage};

use crate::color::Color;
use crate::draw::{
    BlendEquation, CompositionMode, DrawCommand, DrawShape, DrawSink, Painter, PainterState,
};
use crate::geometry::{Rect, Size};
use crate::texture::Texture;

/// Software RGBA render target. Stands in for a GPU surface: the scene is
/// painted here and the light buffer composites onto it.
#[derive(Clone, Debug)]
pub struct Canvas {
    texture: Arc<Texture>,
    state: PainterState,
    saved: Vec<PainterState>,
}

impl Canvas {
    pub fn new(size: Size) -> Self {
        Self {
            texture: Arc::new(Texture::blank(size)),
            state: PainterState::default(),
            saved: Vec::new(),
        }
    }

    pub fn size(&self) -> Size {
        self.texture.size()
    }

    /// Drops the old contents.
    pub fn resize(&mut self, size: Size) {
        let smooth = self.texture.is_smooth();
        self.texture = Arc::new(Texture::blank(size).with_smooth(smooth));
    }

    pub fn set_smooth(&mut self, smooth: bool) {
        if self.texture.is_smooth() != smooth {
            Arc::make_mut(&mut self.texture).set_smooth(smooth);
        }
    }

    pub fn clear(&mut self, color: Color) {
        let pixel: Rgba<u8> = color.into();
        for target in self.image_mut().pixels_mut() {
            *target = pixel;
        }
    }

    pub fn set_clip(&mut self, clip: Option<Rect>) {
        self.state.clip = clip;
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.state.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn state(&self) -> PainterState {
        self.state
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        if x < 0 || y < 0 {
            return None;
        }
        self.texture.pixel(x as u32, y as u32)
    }

    pub fn image(&self) -> &RgbaImage {
        self.texture.image()
    }

    /// Shares the current contents as a texture without copying.
    pub fn snapshot(&self) -> Arc<Texture> {
        Arc::clone(&self.texture)
    }

    fn image_mut(&mut self) -> &mut RgbaImage {
        Arc::make_mut(&mut self.texture).image_mut()
    }

    fn visible_area(&self, dest: Rect) -> Option<Rect> {
        let area = Rect::from_size(self.size()).intersect(dest)?;
        match self.state.clip {
            Some(clip) => area.intersect(clip),
            None => Some(area),
        }
    }

    fn rasterize(&mut self, command: &DrawCommand) {
        let dest = command.dest();
        let Some(area) = self.visible_area(dest) else {
            return;
        };

        let mut tint = command.color.to_unit();
        tint[3] *= self.state.opacity;
        let mode = command.mode;
        let equation = command.equation;
        let image = self.image_mut();

        match &command.shape {
            DrawShape::FilledRect(_) => {
                for y in area.y..area.bottom() {
                    for x in area.x..area.right() {
                        blend(image.get_pixel_mut(x as u32, y as u32), tint, mode, equation);
                    }
                }
            }
            DrawShape::TexturedRect { src, texture, .. } => {
                let scale_x = src.width as f32 / dest.width as f32;
                let scale_y = src.height as f32 / dest.height as f32;
                for y in area.y..area.bottom() {
                    let v = src.y as f32 + (y as f32 + 0.5 - dest.y as f32) * scale_y;
                    for x in area.x..area.right() {
                        let u = src.x as f32 + (x as f32 + 0.5 - dest.x as f32) * scale_x;
                        let texel = texture.sample(u, v);
                        let color = [
                            texel[0] * tint[0],
                            texel[1] * tint[1],
                            texel[2] * tint[2],
                            texel[3] * tint[3],
                        ];
                        blend(image.get_pixel_mut(x as u32, y as u32), color, mode, equation);
                    }
                }
            }
        }
    }
}

impl DrawSink for Canvas {
    fn submit(&mut self, command: DrawCommand) {
        self.rasterize(&command);
    }
}

impl Painter for Canvas {
    fn save_and_reset_state(&mut self) {
        self.saved.push(self.state);
        self.state = PainterState::default();
    }

    fn restore_saved_state(&mut self) {
        self.state = self.saved.pop().unwrap_or_default();
    }
}

fn blend(target: &mut Rgba<u8>, src: [f32; 4], mode: CompositionMode, equation: BlendEquation) {
    let dst = Color::from(*target).to_unit();
    let out = match mode {
        CompositionMode::Replace => src,
        CompositionMode::Light => [
            dst[0] * src[0],
            dst[1] * src[1],
            dst[2] * src[2],
            dst[3] * src[3],
        ],
        CompositionMode::Normal => match equation {
            BlendEquation::Add => {
                let alpha = src[3];
                let keep = 1.0 - alpha;
                [
                    src[0] * alpha + dst[0] * keep,
                    src[1] * alpha + dst[1] * keep,
                    src[2] * alpha + dst[2] * keep,
                    alpha + dst[3] * keep,
                ]
            }
            BlendEquation::Max => [
                src[0].max(dst[0]),
                src[1].max(dst[1]),
                src[2].max(dst[2]),
                src[3].max(dst[3]),
            ],
        },
    };

    *target = Rgba(out.map(|channel| (channel.clamp(0.0, 1.0) * 255.0).round() as u8));
}
