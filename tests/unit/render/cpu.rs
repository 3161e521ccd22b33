use super::*;
use crate::{
    foundation::core::Rect,
    render::target::{RenderTarget, RenderTargetOptions},
    shader::{definition::UniformValue, library::ShaderLib},
};

fn ctx(w: u32, h: u32) -> CpuContext {
    CpuContext::new(CpuContextOpts::new(w, h)).unwrap()
}

fn red_square() -> Vec<Drawable> {
    vec![Drawable::rect(
        Rect::new(0.0, 0.0, 8.0, 8.0),
        Rgba8::new(255, 0, 0, 255),
    )]
}

#[test]
fn zero_sized_screen_is_rejected() {
    assert!(matches!(
        CpuContext::new(CpuContextOpts::new(0, 4)),
        Err(PostchainError::InvalidDimension { width: 0, height: 4 })
    ));
}

#[test]
fn scene_draw_fills_target_and_clears_to_colour() {
    let mut c = ctx(8, 8);
    let t = RenderTarget::new(16, 16, RenderTargetOptions::default()).unwrap();
    let items = red_square();
    c.render(
        DrawCall::Scene {
            items: &items,
            camera: &Camera::pixels(),
            clear_color: Some(Rgba8::new(0, 0, 255, 255)),
        },
        Destination::Target(&t),
        true,
    )
    .unwrap();

    let px = c.read_pixels(Destination::Target(&t)).unwrap();
    assert_eq!((px.width, px.height), (16, 16));
    assert_eq!(px.pixel(3, 3), [255, 0, 0, 255]);
    assert_eq!(px.pixel(12, 12), [0, 0, 255, 255]);
    assert_eq!(c.stats().scene_draws, 1);
}

#[test]
fn unwritten_target_reads_back_transparent() {
    let mut c = ctx(4, 4);
    let t = RenderTarget::new(3, 2, RenderTargetOptions::nearest()).unwrap();
    let px = c.read_pixels(Destination::Target(&t)).unwrap();
    assert_eq!(px.data, vec![0u8; 3 * 2 * 4]);
    assert_eq!(c.resident_targets(), 0);
}

#[test]
fn dropped_targets_release_storage() {
    let mut c = ctx(4, 4);
    let keep = RenderTarget::new(4, 4, RenderTargetOptions::default()).unwrap();
    let items = red_square();
    {
        let temp = RenderTarget::new(4, 4, RenderTargetOptions::default()).unwrap();
        for t in [&keep, &temp] {
            c.render(
                DrawCall::Scene {
                    items: &items,
                    camera: &Camera::pixels(),
                    clear_color: None,
                },
                Destination::Target(t),
                true,
            )
            .unwrap();
        }
        assert_eq!(c.resident_targets(), 2);
    }
    c.collect_garbage();
    assert_eq!(c.resident_targets(), 1);
}

#[test]
fn fullscreen_copy_to_screen_and_shader_cache() {
    let lib = ShaderLib::new();
    let mut c = ctx(8, 8);
    let src = RenderTarget::new(8, 8, RenderTargetOptions::nearest()).unwrap();
    let items = red_square();
    c.render(
        DrawCall::Scene {
            items: &items,
            camera: &Camera::pixels(),
            clear_color: None,
        },
        Destination::Target(&src),
        true,
    )
    .unwrap();

    let mut m = Material::new(lib.get("copy").unwrap());
    m.set_texture("DIFFUSE_MAP", &src);
    m.set_uniform("opacity", UniformValue::Float(1.0));
    for _ in 0..3 {
        c.render(
            DrawCall::Fullscreen { material: &m },
            Destination::Screen,
            false,
        )
        .unwrap();
    }

    let screen = c.read_pixels(Destination::Screen).unwrap();
    assert_eq!(screen.pixel(4, 4), [255, 0, 0, 255]);
    let stats = c.stats();
    assert_eq!(stats.compiled_shaders, 1);
    assert_eq!(stats.screen_draws, 3);
    assert_eq!(stats.draw_calls, 4);
}

#[test]
fn fullscreen_without_binding_fails_before_drawing() {
    let lib = ShaderLib::new();
    let mut c = ctx(2, 2);
    let m = Material::new(lib.get("copy").unwrap());
    let err = c
        .render(
            DrawCall::Fullscreen { material: &m },
            Destination::Screen,
            false,
        )
        .unwrap_err();
    assert!(matches!(err, PostchainError::MissingBinding { .. }));
    assert_eq!(c.stats().draw_calls, 0);
}

#[test]
fn screen_starts_at_clear_colour() {
    let mut c = CpuContext::new(CpuContextOpts {
        screen_width: 2,
        screen_height: 2,
        clear_rgba: Some([10, 20, 30, 255]),
    })
    .unwrap();
    let s = c.read_pixels(Destination::Screen).unwrap();
    assert_eq!(s.pixel(1, 1), [10, 20, 30, 255]);
}
