use std::path::PathBuf;

use lenswarp::{
    load_raster, save_raster, CorrectionReport, DistortionConfig, DistortionEngine, Error,
    Extrapolation, Mode, Pixel, PixelRaster,
};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("lenswarp-it-{}-{name}", std::process::id()))
}

fn checker(width: usize, height: usize) -> PixelRaster {
    PixelRaster::from_fn(width, height, |row, col| {
        let v = if (row / 8 + col / 8) % 2 == 0 { 40 } else { 210 };
        Pixel::new(v, v, v, 255)
    })
}

#[test]
fn solid_image_file_round_trip() {
    let solid = Pixel::new(100, 150, 200, 255);
    let input = temp_path("solid-in.png");
    let output = temp_path("solid-out.png");
    save_raster(&PixelRaster::filled(4, 4, solid), &input).unwrap();

    let mut engine = DistortionEngine::new(DistortionConfig::default());
    engine.load_file(&input).unwrap();
    engine.add_distortion().unwrap();
    engine.correct_distortion().unwrap();
    engine.save_file(&output).unwrap();

    let back = load_raster(&output).unwrap();
    let _ = std::fs::remove_file(&input);
    let _ = std::fs::remove_file(&output);

    assert_eq!((back.width(), back.height()), (4, 4));
    assert!(back.pixels().iter().all(|&p| p == solid));
}

#[test]
fn operations_fail_before_load_and_leave_engine_empty() {
    let mut engine = DistortionEngine::new(DistortionConfig::default());
    assert!(matches!(engine.add_distortion(), Err(Error::NoImageLoaded)));
    assert!(matches!(engine.correct_distortion(), Err(Error::NoImageLoaded)));
    assert!(matches!(
        engine.save_file(&temp_path("never.png")),
        Err(Error::NoImageLoaded)
    ));
    assert!(engine.raster().is_none());
}

#[test]
fn failed_load_keeps_previous_raster() {
    let raster = checker(16, 16);
    let mut engine = DistortionEngine::new(DistortionConfig::default());
    engine.load(raster.clone());
    let err = engine
        .load_file(&temp_path("does-not-exist.png"))
        .unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
    assert_eq!(engine.raster(), Some(&raster));
}

#[test]
fn distortion_keeps_dimensions_and_alpha() {
    let mut engine = DistortionEngine::new(DistortionConfig::default());
    engine.load(checker(48, 32));
    let report = engine.add_distortion().unwrap();
    assert_eq!(report.mode, Mode::Distortion);
    assert_eq!(report.image_size, [48, 32]);
    assert_eq!(report.passes, 1);

    let out = engine.raster().unwrap();
    assert_eq!((out.width(), out.height()), (48, 32));
    assert!(out.pixels().iter().all(|p| p.alpha == 255));
}

#[test]
fn correction_report_serializes_fit() {
    let config = DistortionConfig {
        extrapolation: Extrapolation::Linear,
        ..Default::default()
    };
    let mut engine = DistortionEngine::new(config);
    engine.load(checker(80, 64));
    let report = engine.correct_distortion().unwrap();

    let json = serde_json::to_string_pretty(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["mode"], "correction");
    assert_eq!(value["passes"], 2);
    assert_eq!(value["fit"]["inverse"]["coeffs"].as_array().unwrap().len(), 4);

    let back: CorrectionReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back.operation.mode, Mode::Correction);
    assert_eq!(back.fit.n_samples, report.fit.n_samples);
    assert_eq!(back.fit.used_model_fallback, report.fit.used_model_fallback);
}
