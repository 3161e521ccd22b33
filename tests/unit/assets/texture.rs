use super::*;

fn encode_png(w: u32, h: u32, rgba: &[u8]) -> Vec<u8> {
    let mut out = std::io::Cursor::new(Vec::new());
    image::write_buffer_with_format(
        &mut out,
        rgba,
        w,
        h,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .unwrap();
    out.into_inner()
}

#[test]
fn decode_png_premultiplies() {
    let png = encode_png(2, 1, &[255, 0, 0, 255, 255, 255, 255, 0]);
    let tex = Texture::decode(&png, FilterMode::Nearest).unwrap();
    assert_eq!((tex.width, tex.height), (2, 1));
    assert_eq!(tex.texel(0, 0), [255, 0, 0, 255]);
    assert_eq!(tex.texel(1, 0), [0, 0, 0, 0]);
}

#[test]
fn decode_rejects_garbage() {
    let err = Texture::decode(b"not an image", FilterMode::Linear).unwrap_err();
    assert!(err.to_string().contains("decode image"));
}

#[test]
fn byte_length_is_validated() {
    assert!(Texture::from_premul_rgba8(2, 2, FilterMode::Linear, vec![0; 15]).is_err());
    assert!(matches!(
        Texture::from_premul_rgba8(0, 2, FilterMode::Linear, vec![]),
        Err(PostchainError::InvalidDimension { .. })
    ));
}

#[test]
fn texel_clamps_to_edges() {
    let tex = Texture::from_premul_rgba8(
        2,
        1,
        FilterMode::Nearest,
        vec![1, 2, 3, 4, 5, 6, 7, 8],
    )
    .unwrap();
    assert_eq!(tex.texel(-3, 0), [1, 2, 3, 4]);
    assert_eq!(tex.texel(9, 9), [5, 6, 7, 8]);
}
