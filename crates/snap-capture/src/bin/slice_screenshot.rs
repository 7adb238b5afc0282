//! CLI tool to slice a saved board screenshot into its five regions.
//! Usage: cargo run -p snap-capture --features cli --bin slice_screenshot -- <screenshot.png> [output_dir]

use snap_capture::BoardRegion;
use std::path::PathBuf;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <screenshot.png> [output_dir]", args[0]);
        std::process::exit(1);
    }

    let input_path = PathBuf::from(&args[1]);
    let output_dir = match args.get(2) {
        Some(dir) => PathBuf::from(dir),
        None => input_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    let (w, h) = match image::image_dimensions(&input_path) {
        Ok(dims) => dims,
        Err(e) => {
            eprintln!("Failed to read {}: {}", input_path.display(), e);
            std::process::exit(1);
        }
    };
    println!("Image size: {}x{}", w, h);

    for region in BoardRegion::ALL {
        let (left, top, right, bottom) = region.bounds().to_pixels(w, h);
        println!(
            "  {:<13} left={} top={} right={} bottom={}",
            region.name(), left, top, right, bottom
        );
    }

    match snap_capture::slice_board(&input_path, &output_dir) {
        Ok(saved) => {
            for (region, path) in &saved {
                println!("{} -> {}", region, path.display());
            }
        }
        Err(e) => {
            eprintln!("Error dividing screenshot: {:#}", e);
            std::process::exit(1);
        }
    }
}
