use super::*;

const BASIC: &str = r#"{
    "width": 64,
    "height": 48,
    "clear_color": [0, 0, 0, 255],
    "scene": [
        { "rect": [8, 8, 40, 40], "color": [255, 0, 0, 255] },
        { "path": "M0 0 L10 0 L10 10 Z", "color": [0, 0, 255, 128], "transform": [1, 0, 0, 1, 20, 4] }
    ],
    "passes": [
        { "type": "scene" },
        { "type": "convolution", "sigma": 1.0 },
        { "type": "dog", "threshold": 0.02 },
        { "type": "copy", "renderToScreen": true }
    ]
}"#;

fn build(cfg: &PipelineConfig) -> PostchainResult<BuiltPipeline> {
    let lib = ShaderLib::new();
    let mut loader = TextureLoader::new()?;
    let mut cache = TextureCache::new();
    cfg.build(&lib, &mut loader, &mut cache)
}

#[test]
fn parses_and_builds_basic_pipeline() {
    let cfg = PipelineConfig::from_json_str(BASIC).unwrap();
    assert_eq!(cfg.passes[3].render_to_screen, Some(true));
    assert_eq!(cfg.passes[2].kind, PassType::Dog);
    assert_eq!(cfg.screen_size(), (64, 48));

    let built = build(&cfg).unwrap();
    assert_eq!(built.composer.passes().len(), 4);
    assert_eq!(built.render_list.len(), 2);
    assert!(built.lookups.is_empty());
    assert!(built.renders_to_screen());
    assert_eq!(built.clear_color, Some([0, 0, 0, 255]));

    let names: Vec<_> = built.composer.passes().iter().map(Pass::name).collect();
    assert_eq!(
        names,
        ["scene", "convolution", "difference_of_gaussians", "fullscreen"]
    );
    let Pass::Convolution(conv) = &built.composer.passes()[1] else {
        panic!("expected convolution pass");
    };
    assert_eq!(conv.settings().width, 64);
    assert_eq!(conv.settings().height, 48);
    assert_eq!(conv.kernel().len(), 7);

    let Pass::Difference(dog) = &built.composer.passes()[2] else {
        panic!("expected difference pass");
    };
    assert_eq!(dog.threshold().unwrap(), 0.02);
}

#[test]
fn flag_overrides_apply() {
    let cfg = PipelineConfig::from_json_str(
        r#"{ "width": 8, "height": 8, "passes": [
            { "type": "copy", "enabled": false, "clear": true, "needs_swap": false },
            { "type": "copy", "target": { "width": 4, "height": 2, "filter": "nearest" } }
        ] }"#,
    )
    .unwrap();
    let built = build(&cfg).unwrap();
    let f = built.composer.passes()[0].flags();
    assert!(!f.enabled && f.clear && !f.needs_swap);
    let t = built.composer.passes()[1].target().unwrap();
    assert_eq!((t.width(), t.height(), t.filter()), (4, 2, FilterMode::Nearest));
    assert!(!built.renders_to_screen());
}

#[test]
fn inline_palette_is_ready_immediately() {
    let cfg = PipelineConfig::from_json_str(
        r#"{ "width": 8, "height": 8, "passes": [
            { "type": "palette", "lookup": { "palette": [[0, 0, 0], [255, 255, 255]], "size": 4 } }
        ] }"#,
    )
    .unwrap();
    let built = build(&cfg).unwrap();
    assert!(built.lookups.is_empty());
    assert!(built.composer.passes()[0].is_active());
}

#[test]
fn lookup_file_resolves_against_base_dir_after_poll() {
    let dir = PathBuf::from("target").join("config_unit").join("lut");
    std::fs::create_dir_all(&dir).unwrap();
    let lut = LookupTable::identity(2).unwrap();
    image::save_buffer_with_format(
        dir.join("lut.png"),
        &lut.rgba8_premul,
        lut.width,
        lut.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .unwrap();

    let mut cfg = PipelineConfig::from_json_str(
        r#"{ "width": 8, "height": 8, "passes": [
            { "type": "palette", "lookup": { "path": "lut.png" } }
        ] }"#,
    )
    .unwrap();
    cfg.base_dir = Some(dir);

    let lib = ShaderLib::new();
    let mut loader = TextureLoader::new().unwrap();
    let mut cache = TextureCache::new();
    let built = cfg.build(&lib, &mut loader, &mut cache).unwrap();
    assert_eq!(built.lookups.len(), 1);
    assert!(!built.composer.passes()[0].is_active());

    loader
        .wait_all(&mut cache, std::time::Duration::from_secs(10))
        .unwrap();
    assert!(built.lookups[0].is_ready());
    assert!(built.composer.passes()[0].is_active());
}

#[test]
fn validation_errors() {
    let zero = PipelineConfig::from_json_str(r#"{ "width": 0, "height": 8, "passes": [{ "type": "copy" }] }"#)
        .unwrap();
    assert!(matches!(
        zero.validate(),
        Err(PostchainError::InvalidDimension { width: 0, height: 8 })
    ));

    let cases = [
        r#"{ "width": 8, "height": 8, "passes": [] }"#,
        r#"{ "width": 8, "height": 8, "passes": [{ "type": "texture" }] }"#,
        r#"{ "width": 8, "height": 8, "passes": [{ "type": "palette" }] }"#,
        r#"{ "width": 8, "height": 8, "passes": [{ "type": "convolution", "sigma": -1 }] }"#,
        r#"{ "width": 8, "height": 8, "scene": [{ "color": [0,0,0,0] }], "passes": [{ "type": "scene" }] }"#,
        r#"{ "width": 8, "height": 8, "passes": [{ "type": "palette", "lookup": { "path": "a.png", "palette": [[0,0,0]] } }] }"#,
    ];
    for json in cases {
        let cfg = PipelineConfig::from_json_str(json).unwrap();
        assert!(
            matches!(cfg.validate(), Err(PostchainError::Validation(_))),
            "{json}"
        );
    }
}

#[test]
fn screen_pass_must_be_last() {
    let cfg = PipelineConfig::from_json_str(
        r#"{ "width": 8, "height": 8, "passes": [
            { "type": "copy", "render_to_screen": true },
            { "type": "copy" }
        ] }"#,
    )
    .unwrap();
    assert!(matches!(build(&cfg), Err(PostchainError::Validation(_))));
}

#[test]
fn unknown_pass_type_is_a_parse_error() {
    let err = PipelineConfig::from_json_str(
        r#"{ "width": 8, "height": 8, "passes": [{ "type": "bloom" }] }"#,
    )
    .unwrap_err();
    assert!(matches!(err, PostchainError::Other(_)));
}
