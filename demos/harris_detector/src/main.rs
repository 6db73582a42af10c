use argh::FromArgs;
use std::path::{Path, PathBuf};

use harris::{
    image::Image,
    imgproc::{
        draw,
        features::{GoodFeaturesConfig, GoodFeaturesDetector, HarrisConfig, HarrisDetector},
    },
};

/// Detect Harris corners on an image.
#[derive(FromArgs)]
struct Args {
    /// path to the image to detect corners on
    #[argh(option)]
    image_path: PathBuf,

    /// directory where the visualization images are written
    #[argh(option)]
    output_dir: Option<PathBuf>,

    /// path to a json file with the detector configuration
    #[argh(option)]
    config: Option<PathBuf>,

    /// standard deviation of the gaussian kernel
    #[argh(option)]
    sigma: Option<f32>,

    /// harris sensitivity constant
    #[argh(option)]
    k: Option<f32>,

    /// fraction of the maximum response used as threshold
    #[argh(option)]
    threshold_ratio: Option<f32>,

    /// half-width of the non-maximum suppression window
    #[argh(option)]
    nms_radius: Option<usize>,

    /// also run the good-features-to-track selection
    #[argh(switch)]
    good_features: bool,
}

fn load_config(args: &Args) -> Result<HarrisConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => HarrisConfig::default(),
    };

    if let Some(sigma) = args.sigma {
        config = config.with_sigma(sigma);
    }
    if let Some(k) = args.k {
        config = config.with_k(k);
    }
    if let Some(threshold_ratio) = args.threshold_ratio {
        config = config.with_threshold_ratio(threshold_ratio);
    }
    if let Some(nms_radius) = args.nms_radius {
        config = config.with_nms_radius(nms_radius);
    }

    Ok(config)
}

fn save_gray(img: &Image<u8, 1>, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    image::GrayImage::from_raw(img.width() as u32, img.height() as u32, img.as_slice().to_vec())
        .ok_or("invalid gray image buffer")?
        .save(path)?;
    log::info!("wrote {}", path.display());
    Ok(())
}

fn save_rgb(img: &Image<u8, 3>, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    image::RgbImage::from_raw(img.width() as u32, img.height() as u32, img.as_slice().to_vec())
        .ok_or("invalid rgb image buffer")?
        .save(path)?;
    log::info!("wrote {}", path.display());
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let config = load_config(&args)?;
    let detector = HarrisDetector::new(config)?;

    // read the image as grayscale
    let gray = image::open(&args.image_path)?.to_luma8();
    let (width, height) = gray.dimensions();
    let img_gray8 = Image::<u8, 1>::new([width as usize, height as usize].into(), gray.into_raw())?;

    let detection = detector.detect_with_intermediates(&img_gray8)?;
    log::info!("found {} harris corners", detection.corners.len());

    let good_features = if args.good_features {
        let gftt = GoodFeaturesDetector::new(GoodFeaturesConfig {
            sigma: config.sigma,
            strategy: config.strategy,
            ..Default::default()
        })?;
        let corners = gftt.detect(&img_gray8)?;
        log::info!("found {} good features", corners.len());
        Some(corners)
    } else {
        None
    };

    if let Some(output_dir) = &args.output_dir {
        std::fs::create_dir_all(output_dir)?;
        save_gray(&detection.smoothed_u8()?, &output_dir.join("smoothed.png"))?;
        save_gray(&detection.gradient_magnitude_u8()?, &output_dir.join("gradient.png"))?;
        save_gray(&detection.gradient_angle_u8()?, &output_dir.join("angle.png"))?;
        save_gray(&detection.response_u8()?, &output_dir.join("response.png"))?;

        // red disks for harris, green for good features
        let mut annotated: Image<u8, 3> = draw::gray_to_channels(&img_gray8)?;
        for corner in &detection.corners {
            let center = (corner.x as i64, corner.y as i64);
            draw::draw_filled_circle(&mut annotated, center, 5, [255, 0, 0]);
        }
        for corner in good_features.iter().flatten() {
            let center = (corner.x as i64, corner.y as i64);
            draw::draw_filled_circle(&mut annotated, center, 5, [0, 255, 0]);
        }
        save_rgb(&annotated, &output_dir.join("corners.png"))?;
    }

    let output = serde_json::json!({
        "config": config,
        "harris": detection.corners,
        "good_features": good_features,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
