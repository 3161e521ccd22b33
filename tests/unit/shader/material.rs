use super::*;
use crate::render::target::RenderTargetOptions;

fn shader() -> Arc<ShaderDefinition> {
    ShaderDefinition::builder("copy", "")
        .uniform("opacity", UniformValue::Float(1.0))
        .sampler("DIFFUSE_MAP")
        .build()
        .unwrap()
}

#[test]
fn new_material_starts_from_shader_defaults() {
    let m = Material::new(shader());
    assert_eq!(m.params().float("copy", "opacity").unwrap(), 1.0);
}

#[test]
fn failed_update_leaves_parameters_untouched() {
    let mut m = Material::new(shader());
    let err = m
        .update(|p| {
            p.set_uniform("opacity", UniformValue::Float(0.25));
            Err(PostchainError::validation("abort"))
        })
        .unwrap_err();
    assert!(matches!(err, PostchainError::Validation(_)));
    assert_eq!(m.params().float("copy", "opacity").unwrap(), 1.0);

    m.update(|p| {
        p.set_uniform("opacity", UniformValue::Float(0.25));
        Ok(())
    })
    .unwrap();
    assert_eq!(m.params().float("copy", "opacity").unwrap(), 0.25);
}

#[test]
fn unbound_sampler_is_missing_binding() {
    let mut m = Material::new(shader());
    let err = m.check_bindings().unwrap_err();
    assert!(matches!(
        err,
        PostchainError::MissingBinding { ref binding, .. } if binding == "DIFFUSE_MAP"
    ));

    let t = RenderTarget::new(2, 2, RenderTargetOptions::default()).unwrap();
    m.set_texture("DIFFUSE_MAP", &t);
    m.check_bindings().unwrap();
    assert!(matches!(
        m.params().texture("DIFFUSE_MAP"),
        Some(TextureBinding::Target { id, .. }) if *id == t.id()
    ));
}

#[test]
fn typed_getters_report_mismatch_and_absence() {
    let m = Material::new(shader());
    assert!(matches!(
        m.params().vec2("copy", "opacity"),
        Err(PostchainError::Validation(_))
    ));
    assert!(matches!(
        m.params().float("copy", "threshold"),
        Err(PostchainError::MissingBinding { .. })
    ));
}
