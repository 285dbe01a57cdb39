use lenswarp::{DistortionConfig, DistortionEngine};
use std::error::Error;
use std::path::Path;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        eprintln!(
            "Usage: {} <input.png> <distorted.png> <corrected.png> [report.json]",
            args[0]
        );
        std::process::exit(2);
    }

    let mut engine = DistortionEngine::new(DistortionConfig::default());
    engine.load_file(Path::new(&args[1]))?;

    let distortion = engine.add_distortion()?;
    engine.save_file(Path::new(&args[2]))?;
    println!(
        "Distorted {}x{} (ratio {:.4}..{:.4}) -> {}",
        distortion.image_size[0],
        distortion.image_size[1],
        distortion.ratio_range[0],
        distortion.ratio_range[1],
        args[2]
    );

    let correction = engine.correct_distortion()?;
    engine.save_file(Path::new(&args[3]))?;
    println!(
        "Corrected with inverse {:?} over {} passes -> {}",
        correction.fit.inverse.coeffs, correction.operation.passes, args[3]
    );

    if let Some(out_path) = args.get(4) {
        let json = serde_json::to_string_pretty(&correction)?;
        std::fs::write(out_path, json)?;
        println!("Wrote {out_path}");
    }
    Ok(())
}
