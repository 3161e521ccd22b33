use super::*;

fn conv(size: usize) -> Arc<ShaderDefinition> {
    ShaderDefinition::builder("convolution", "fn main() {}\n")
        .define("KERNEL_SIZE_INT", size.to_string())
        .define("KERNEL_SIZE_FLOAT", format!("{size}.0"))
        .sampler("DIFFUSE_MAP")
        .build()
        .unwrap()
}

#[test]
fn preprocess_prepends_defines_as_consts() {
    let src = conv(5).preprocessed_source();
    assert!(src.starts_with("const KERNEL_SIZE_FLOAT = 5.0;\nconst KERNEL_SIZE_INT = 5;\n"));
    assert!(src.ends_with("fn main() {}\n"));
}

#[test]
fn key_changes_with_defines_only_when_values_differ() {
    assert_eq!(conv(5).key(), conv(5).key());
    assert_ne!(conv(5).key(), conv(7).key());
}

#[test]
fn to_builder_derives_variant_without_touching_original() {
    let base = conv(5);
    let variant = base.to_builder().define("KERNEL_SIZE_INT", "9").build().unwrap();
    assert_eq!(base.define("KERNEL_SIZE_INT"), Some("5"));
    assert_eq!(variant.define("KERNEL_SIZE_INT"), Some("9"));
}

#[test]
fn malformed_defines_fail_to_build() {
    let bad_name = ShaderDefinition::builder("x", "")
        .define("9LIVES", "1")
        .build()
        .unwrap_err();
    assert!(matches!(bad_name, PostchainError::ShaderCompile { .. }));

    let bad_value = ShaderDefinition::builder("x", "")
        .define("KERNEL_SIZE_INT", "5;\nfn evil() {}")
        .build()
        .unwrap_err();
    assert!(matches!(bad_value, PostchainError::ShaderCompile { .. }));

    assert!(
        ShaderDefinition::builder("x", "")
            .define("EMPTY", " ")
            .build()
            .is_err()
    );
}

#[test]
fn samplers_are_deduplicated() {
    let def = ShaderDefinition::builder("copy", "")
        .sampler("DIFFUSE_MAP")
        .sampler("DIFFUSE_MAP")
        .build()
        .unwrap();
    assert_eq!(def.samplers(), ["DIFFUSE_MAP".to_string()]);
}
