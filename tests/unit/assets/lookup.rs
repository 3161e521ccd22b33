use super::*;

#[test]
fn identity_layout_places_blue_slices_side_by_side() {
    let t = LookupTable::identity(4).unwrap();
    assert_eq!((t.width, t.height), (16, 4));
    assert_eq!(t.texel(0, 0), [0, 0, 0, 255]);
    // r = 3, g = 1, b = 2
    assert_eq!(t.texel(2 * 4 + 3, 1), [255, 85, 170, 255]);
}

#[test]
fn palette_maps_to_nearest_entry() {
    let pal = [[0, 0, 0], [255, 255, 255], [200, 30, 30]];
    let t = LookupTable::from_palette(2, &pal).unwrap();
    // (255, 0, 0) is closest to the red entry.
    assert_eq!(t.texel(1, 0), [200, 30, 30, 255]);
    assert_eq!(t.texel(0, 0), [0, 0, 0, 255]);
    assert_eq!(t.texel(3, 1), [255, 255, 255, 255]);
}

#[test]
fn invalid_sizes_and_empty_palettes_are_rejected() {
    assert!(LookupTable::identity(1).is_err());
    assert!(LookupTable::identity(257).is_err());
    assert!(LookupTable::from_palette(4, &[]).is_err());
}

#[test]
fn slot_transitions() {
    let slot = LookupSlot::pending();
    let handle = slot.clone();
    assert_eq!(slot.state(), LookupState::Pending);
    assert!(slot.texture().is_none());

    handle.fail("boom");
    assert_eq!(slot.state(), LookupState::Failed("boom".to_string()));
    assert!(!slot.is_ready());

    let tex = Arc::new(LookupTable::identity(2).unwrap());
    handle.fulfil(tex.clone());
    assert!(slot.is_ready());
    assert!(Arc::ptr_eq(&slot.texture().unwrap(), &tex));
}
