use pdf2tts::controllers::convert::ConvertController;
use pdf2tts::domain::conversion::{ConversionService, SynthesisService, TextExtractor};
use pdf2tts::infrastructure::config::Config;
use pdf2tts::infrastructure::http::start_http_server;
use pdf2tts::infrastructure::logging::init_logging;
use pdf2tts::infrastructure::repositories::{LopdfLoader, OpenAiSpeechEngine};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config.log_format, "pdf2tts=debug,tower_http=debug");

    tracing::info!(
        "Starting pdf2tts service on {}:{}",
        config.host,
        config.port
    );

    std::fs::create_dir_all(&config.temp_root)?;
    tracing::info!(
        temp_root = %config.temp_root.display(),
        max_upload_bytes = config.max_upload_bytes,
        "Upload staging configured"
    );

    tracing::info!(
        api_base = %config.tts_api_base,
        model = %config.tts_model,
        has_api_key = !config.tts_api_key.is_empty(),
        timeout_secs = config.synthesis_timeout_secs,
        "Initializing speech engine client"
    );
    let engine = Arc::new(OpenAiSpeechEngine::from_endpoint(
        &config.tts_api_base,
        &config.tts_api_key,
        config.tts_model.clone(),
    ));

    // === DEPENDENCY INJECTION SETUP ===
    let extractor = TextExtractor::new(Arc::new(LopdfLoader::new()));
    let synthesis = SynthesisService::new(engine, config.synthesis_timeout());
    let conversion_service = Arc::new(ConversionService::new(extractor, synthesis));

    let convert_controller = Arc::new(ConvertController::new(
        conversion_service,
        config.temp_root.clone(),
    ));

    start_http_server(Arc::new(config), convert_controller).await?;

    Ok(())
}
