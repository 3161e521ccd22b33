use std::{cell::RefCell, rc::Rc};

use super::*;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("loader_unit").join(name);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_png(path: &Path, w: u32, h: u32, rgba: &[u8]) {
    image::save_buffer_with_format(
        path,
        rgba,
        w,
        h,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .unwrap();
}

#[test]
fn callbacks_run_only_inside_poll() {
    let dir = scratch_dir("poll");
    let path = dir.join("lut.png");
    write_png(&path, 2, 1, &[255, 0, 0, 255, 0, 255, 0, 255]);

    let mut loader = TextureLoader::new().unwrap();
    let mut cache = TextureCache::new();
    let got: Rc<RefCell<Option<Arc<Texture>>>> = Rc::default();
    let sink = got.clone();
    loader
        .load(
            &cache,
            &path,
            FilterMode::Nearest,
            move |t| *sink.borrow_mut() = Some(t),
            |e| panic!("unexpected load failure: {e}"),
        )
        .unwrap();

    assert!(got.borrow().is_none());
    assert_eq!(loader.pending(), 1);
    let n = loader.wait_all(&mut cache, Duration::from_secs(10)).unwrap();
    assert_eq!(n, 1);
    assert_eq!(loader.pending(), 0);

    let tex = got.borrow().clone().unwrap();
    assert_eq!((tex.width, tex.height), (2, 1));
    assert_eq!(tex.texel(1, 0), [0, 255, 0, 255]);
    assert_eq!(cache.len(), 1);
}

#[test]
fn cache_hit_is_delivered_on_next_poll() {
    let mut loader = TextureLoader::new().unwrap();
    let mut cache = TextureCache::new();
    let path = PathBuf::from("never/read.png");
    cache.insert(
        path.clone(),
        FilterMode::Linear,
        Texture::solid(1, 1, [9, 9, 9, 255]).unwrap(),
    );

    let hits = Rc::new(RefCell::new(0));
    let h = hits.clone();
    loader
        .load(
            &cache,
            &path,
            FilterMode::Linear,
            move |_| *h.borrow_mut() += 1,
            |e| panic!("{e}"),
        )
        .unwrap();
    assert_eq!(*hits.borrow(), 0);
    assert_eq!(loader.poll(&mut cache), 1);
    assert_eq!(*hits.borrow(), 1);
    assert_eq!(loader.poll(&mut cache), 0);
}

#[test]
fn missing_file_reports_error_once() {
    let dir = scratch_dir("missing");
    let mut loader = TextureLoader::new().unwrap();
    let mut cache = TextureCache::new();
    let errors: Rc<RefCell<Vec<String>>> = Rc::default();
    let sink = errors.clone();
    loader
        .load(
            &cache,
            dir.join("does_not_exist.png"),
            FilterMode::Nearest,
            |_| panic!("should not load"),
            move |e| sink.borrow_mut().push(e.to_string()),
        )
        .unwrap();

    loader.wait_all(&mut cache, Duration::from_secs(10)).unwrap();
    assert_eq!(errors.borrow().len(), 1);
    assert!(errors.borrow()[0].contains("does_not_exist.png"));
    assert!(cache.is_empty());
    assert_eq!(loader.poll(&mut cache), 0);
}
