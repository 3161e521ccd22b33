use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PostchainError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(PostchainError::asset("x").to_string().contains("asset error:"));
    assert!(
        PostchainError::shader_compile("convolution", "bad define")
            .to_string()
            .contains("shader compile error in 'convolution'")
    );
    assert!(
        PostchainError::missing_binding("dog", "BLUR1")
            .to_string()
            .contains("missing binding 'BLUR1'")
    );
}

#[test]
fn invalid_dimension_reports_both_sides() {
    let err = PostchainError::InvalidDimension {
        width: 0,
        height: 224,
    };
    assert_eq!(err.to_string(), "invalid render target dimension: 0x224");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PostchainError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
