//! Environment self-check.
//!
//! Verifies the external tooling and configuration the pipeline needs
//! before it handles real traffic. Run it once after deployment.

use anyhow::Result;

use spress_pipeline::PipelineConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    println!("StickerPress environment self-check");
    println!("===================================");

    let mut failures = 0;

    match spress_media::check_ffmpeg() {
        Ok(path) => println!("[ok]   ffmpeg found at {}", path.display()),
        Err(_) => {
            println!("[FAIL] ffmpeg not found on PATH");
            failures += 1;
        }
    }

    match spress_media::check_ffprobe() {
        Ok(path) => println!("[ok]   ffprobe found at {}", path.display()),
        Err(_) => {
            println!("[FAIL] ffprobe not found on PATH");
            failures += 1;
        }
    }

    let config = PipelineConfig::from_env();

    match tokio::fs::create_dir_all(&config.staging_root).await {
        Ok(()) => println!(
            "[ok]   staging root writable: {}",
            config.staging_root.display()
        ),
        Err(err) => {
            println!(
                "[FAIL] cannot create staging root {}: {}",
                config.staging_root.display(),
                err
            );
            failures += 1;
        }
    }

    if config.tenor_api_key.is_empty() {
        println!("[warn] TENOR_API_KEY not set; link conversion will fail");
    } else {
        println!("[ok]   TENOR_API_KEY present");
    }

    println!();
    if failures > 0 {
        anyhow::bail!("{failures} check(s) failed");
    }
    println!("All checks passed.");
    Ok(())
}
