use super::*;
use crate::{
    render::target::FilterMode,
    shader::{
        definition::UniformValue,
        kernel::build_kernel,
        library::ShaderLib,
        material::Material,
    },
};

fn conv_def(int: &str, float: &str) -> PostchainResult<Program> {
    let def = ShaderLib::new()
        .get(CONVOLUTION)?
        .to_builder()
        .define(KERNEL_SIZE_INT, int)
        .define(KERNEL_SIZE_FLOAT, float)
        .build()?;
    Program::compile(&def)
}

#[test]
fn convolution_defines_are_validated() {
    assert_eq!(conv_def("5", "5.0").unwrap(), Program::Convolution { taps: 5 });
    for (int, float) in [("4", "4.0"), ("27", "27.0"), ("x", "5.0"), ("5", "7.0"), ("5", "5")] {
        assert!(
            matches!(conv_def(int, float), Err(PostchainError::ShaderCompile { .. })),
            "{int}/{float}"
        );
    }

    let bare = ShaderLib::new().get(CONVOLUTION).unwrap();
    assert!(matches!(
        Program::compile(&bare),
        Err(PostchainError::ShaderCompile { .. })
    ));
}

#[test]
fn kernel_defines_compile_for_every_sigma() {
    let base = ShaderLib::new().get(CONVOLUTION).unwrap();
    for sigma in [0.1, 0.6, 0.96, 1.0, 1.7, 2.5, 9.0] {
        let kernel = build_kernel(sigma).unwrap();
        let def = base.to_builder().defines(kernel.defines()).build().unwrap();
        assert_eq!(
            Program::compile(&def).unwrap(),
            Program::Convolution { taps: kernel.len() },
            "sigma {sigma}"
        );
    }
}

#[test]
fn unknown_shader_has_no_program() {
    let def = ShaderDefinition::builder("sepia", "").build().unwrap();
    assert!(matches!(
        Program::compile(&def),
        Err(PostchainError::ShaderCompile { ref shader, .. }) if shader == "sepia"
    ));
}

fn mk(d: &[u8]) -> SampleView<'_> {
    SampleView {
        width: 2,
        height: 2,
        filter: FilterMode::Nearest,
        data: Some(d),
    }
}

fn flat(rgba: &[u8; 4], n: usize) -> Vec<u8> {
    rgba.repeat(n)
}

#[test]
fn convolution_preserves_flat_input() {
    let data = flat(&[40, 80, 120, 255], 16);
    let view = SampleView {
        width: 4,
        height: 4,
        filter: FilterMode::Linear,
        data: Some(&data),
    };
    let k = build_kernel(0.6).unwrap();
    let mut m = Material::new(
        ShaderLib::new()
            .get(CONVOLUTION)
            .unwrap()
            .to_builder()
            .defines(k.defines())
            .build()
            .unwrap(),
    );
    m.set_uniform("cKernel", UniformValue::FloatArray(k.weights().to_vec()));
    m.set_uniform("uImageIncrement", UniformValue::Vec2([0.125, 0.0]));
    let program = Program::compile(m.shader()).unwrap();
    let out = program
        .shade(CONVOLUTION, m.params(), |_| Ok(view), 4, 4)
        .unwrap();
    assert_eq!(out, data);
}

#[test]
fn convolution_requires_matching_weight_count() {
    let def = ShaderLib::new()
        .get(CONVOLUTION)
        .unwrap()
        .to_builder()
        .define(KERNEL_SIZE_INT, "5")
        .define(KERNEL_SIZE_FLOAT, "5.0")
        .build()
        .unwrap();
    let mut m = Material::new(def);
    m.set_uniform("cKernel", UniformValue::FloatArray(vec![1.0]));
    let data = flat(&[0, 0, 0, 255], 1);
    let view = SampleView {
        width: 1,
        height: 1,
        filter: FilterMode::Nearest,
        data: Some(&data),
    };
    let err = Program::Convolution { taps: 5 }
        .shade(CONVOLUTION, m.params(), |_| Ok(view), 1, 1)
        .unwrap_err();
    assert!(matches!(err, PostchainError::MissingBinding { .. }));
}

#[test]
fn difference_suppresses_equal_blurs_and_keeps_edges() {
    let blur = flat(&[100, 100, 100, 255], 4);
    let darker = flat(&[60, 60, 60, 255], 4);
    let original = flat(&[200, 10, 30, 255], 4);
    let m = Material::new(ShaderLib::new().get(DIFFERENCE_OF_GAUSSIANS).unwrap());

    let same = Program::Difference
        .shade(
            DIFFERENCE_OF_GAUSSIANS,
            m.params(),
            |name| Ok(if name == ORIGINAL { mk(&original) } else { mk(&blur) }),
            2,
            2,
        )
        .unwrap();
    assert_eq!(same, flat(&[0, 0, 0, 255], 4));

    let edge = Program::Difference
        .shade(
            DIFFERENCE_OF_GAUSSIANS,
            m.params(),
            |name| {
                Ok(match name {
                    BLUR1 => mk(&blur),
                    BLUR2 => mk(&darker),
                    _ => mk(&original),
                })
            },
            2,
            2,
        )
        .unwrap();
    assert_eq!(edge, flat(&[200, 10, 30, 255], 4));
}
