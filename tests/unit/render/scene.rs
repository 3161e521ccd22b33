use super::*;
use crate::foundation::core::Point;

#[test]
fn ortho_camera_maps_view_to_destination() {
    let cam = Camera::ortho(Rect::new(-1.0, -1.0, 1.0, 1.0));
    let t = cam.view_transform(256, 224);
    assert_eq!(t * Point::new(-1.0, -1.0), Point::new(0.0, 0.0));
    assert_eq!(t * Point::new(1.0, 1.0), Point::new(256.0, 224.0));
}

#[test]
fn degenerate_view_falls_back_to_pixels() {
    let cam = Camera::ortho(Rect::new(0.0, 0.0, 0.0, 10.0));
    assert_eq!(cam.view_transform(8, 8), Affine::IDENTITY);
    assert_eq!(Camera::pixels().view_transform(8, 8), Affine::IDENTITY);
}

#[test]
fn shared_list_is_visible_through_clones() {
    let list = SharedRenderList::new();
    let handle = list.clone();
    handle.push(Drawable::rect(Rect::new(0.0, 0.0, 1.0, 1.0), Rgba8::WHITE));
    assert_eq!(list.len(), 1);
    list.replace(Vec::new());
    assert!(handle.is_empty());
    assert_eq!(handle.with_items(|items| items.len()), 0);
}
