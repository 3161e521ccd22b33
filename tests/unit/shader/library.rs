use super::*;

#[test]
fn builtins_are_registered() {
    let lib = ShaderLib::new();
    assert_eq!(
        lib.names(),
        vec![CONVOLUTION, COPY, DIFFERENCE_OF_GAUSSIANS, PALETTE_REMAP]
    );
    let dog = lib.get(DIFFERENCE_OF_GAUSSIANS).unwrap();
    assert_eq!(dog.samplers(), [BLUR1, BLUR2, ORIGINAL].map(String::from));
    assert!(dog.source().contains("fs_main"));
}

#[test]
fn unknown_shader_is_a_compile_error() {
    let err = ShaderLib::empty().get(COPY).unwrap_err();
    assert!(matches!(err, PostchainError::ShaderCompile { ref shader, .. } if shader == COPY));
}

#[test]
fn register_replaces_existing_definition() {
    let mut lib = ShaderLib::new();
    let custom = ShaderDefinition::builder(COPY, "// custom")
        .uniform("opacity", UniformValue::Float(0.5))
        .sampler(DIFFUSE_MAP)
        .build()
        .unwrap();
    lib.register(custom.clone());
    assert_eq!(lib.get(COPY).unwrap(), custom);
}

#[test]
fn every_builtin_builder_succeeds() {
    for builder in builtin_builders() {
        let def = builder.build().unwrap();
        assert!(ShaderLib::new().get(def.name()).is_ok(), "{}", def.name());
    }
}
