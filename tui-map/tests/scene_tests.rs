use lightview::{
    Canvas, Light, LightView, LightingConfig, Point, Rect, SoftFrameBuffer, ViewMetrics,
};
use pretty_assertions::assert_eq;
use tui_map::prelude::*;

const CAVE: &str = concat!(
    "      ##\n",
    "      ##\n",
    "---\n",
    "........\n",
    "...t....\n",
    "........\n",
    "---\n",
    "llllllll\n",
    "llllllll\n",
    "llllllll\n",
);

fn scene() -> (TileMap, MapView, LightView) {
    let map = parse_floors("cave", CAVE, &Legend::default(), &ParseOptions::default())
        .expect("cave parses");
    let mut view = MapView::new(MapSize::new(8, 3), 0.5);
    view.focus(&map, 4, 1, 0);
    let config = LightingConfig {
        bubble_radius: 16,
        ..LightingConfig::default()
    };
    let lights = LightView::new(SoftFrameBuffer::new(), &config, &view);
    (map, view, lights)
}

#[test]
fn parsed_cave_has_three_floors() {
    let (map, view, _) = scene();
    assert_eq!(map.floor_count(), 3);
    assert_eq!(map.size(), MapSize::new(8, 3));
    assert_eq!(view.floor_range(), 0..=2);
    assert_eq!(view.tile_size(), 16);
}

#[test]
fn torch_lights_the_dark_ground_floor() {
    let (map, view, mut lights) = scene();
    lights.set_global_light(Light::new(30, 215));
    let mut canvas = Canvas::new(view.frame_size());
    let frame = Rect::from_size(view.frame_size());

    view.draw_scene(&map, &mut canvas, &mut lights, &[]);
    // the torch on floor 1 plus every lava tile on floor 2
    assert_eq!(lights.registry().lights_on(1).len(), 1);
    assert_eq!(lights.registry().lights_on(2).len(), 24);

    let unlit = canvas.pixel(8, 8).expect("pixel");
    lights.draw(&mut canvas, &view, frame, frame);
    assert_eq!(lights.registry().pending_lights(), 0);

    let torch = view.tile_center(3, 1);
    let near = canvas.pixel(torch.x, torch.y).expect("torch pixel");
    let corner = canvas.pixel(8, 8).expect("corner pixel");
    assert!(near.r > corner.r, "torch {near:?} vs corner {corner:?}");
    assert!(corner.r < unlit.r);
}

#[test]
fn daylight_skips_the_light_buffer() {
    let (map, view, mut lights) = scene();
    lights.set_global_light(Light::new(255, 215));
    let mut canvas = Canvas::new(view.frame_size());
    let frame = Rect::from_size(view.frame_size());

    view.draw_scene(&map, &mut canvas, &mut lights, &[]);
    let before = canvas.image().clone();
    lights.draw(&mut canvas, &view, frame, frame);

    assert_eq!(lights.buffer().stats().binds, 0);
    assert_eq!(canvas.image(), &before);
}

#[test]
fn walls_on_top_shade_the_ground_below() {
    let (map, view, mut lights) = scene();
    let mut canvas = Canvas::new(view.frame_size());
    view.draw_scene(&map, &mut canvas, &mut lights, &[]);

    let shades = lights.registry().shades();
    assert_eq!(shades.len(), 24);
    assert_eq!(shades[6].floor, Some(0));
    assert_eq!(shades[6].pos, Point::new(6 * 16, 0));
    assert_eq!(shades[0].floor, Some(1));
}
