use rtryon::{
    decode_data_url, logger, EncodedImage, GeminiClient, GeminiConfig, DEFAULT_RESULT_FILENAME,
};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    logger::init_with_config(
        logger::LoggerConfig::development().with_level(logger::LogLevel::Info),
    )?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let args: Vec<String> = env::args().skip(1).collect();
    let (person_path, garment_path) = match (args.first(), args.get(1)) {
        (Some(person), Some(garment)) => (person, garment),
        _ => {
            eprintln!("usage: rtryon <person-image> <garment-image> [output.png]");
            std::process::exit(2);
        }
    };
    let output_path = args
        .get(2)
        .map(String::as_str)
        .unwrap_or(DEFAULT_RESULT_FILENAME);

    let config = GeminiConfig::from_env();
    logger::log_config_info(&config);

    let client = GeminiClient::new(config)?;

    let person = EncodedImage::from_file(person_path).await?;
    let garment = EncodedImage::from_file(garment_path).await?;
    log::info!("🧍 Person image: {} ({})", person_path, person.mime_type().unwrap_or("unknown"));
    log::info!("👕 Garment image: {} ({})", garment_path, garment.mime_type().unwrap_or("unknown"));

    let image_url = match client.try_on().generate_try_on(&person, &garment).await {
        Ok(url) => url,
        Err(e) => {
            log::error!("❌ Try-on failed: {}", e);
            return Err(e.into());
        }
    };

    let bytes = decode_data_url(&image_url)?;
    tokio::fs::write(output_path, &bytes).await?;
    log::info!("💾 Saved {} bytes to {}", bytes.len(), output_path);

    Ok(())
}
