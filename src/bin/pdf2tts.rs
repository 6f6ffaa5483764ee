use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use pdf2tts::domain::conversion::{
    ConversionOptions, PageRange, SynthesisService, TextExtractor, Voice,
};
use pdf2tts::infrastructure::config::Config;
use pdf2tts::infrastructure::logging::init_logging;
use pdf2tts::infrastructure::repositories::{LopdfLoader, OpenAiSpeechEngine};

/// Turn a PDF into a single MP3 narration
#[derive(Debug, Parser)]
#[command(name = "pdf2tts", version)]
struct Cli {
    /// Input PDF file
    pdf: PathBuf,

    /// Output MP3 file (defaults to the input path with an .mp3 extension)
    #[arg(short = 'o', long = "out")]
    out: Option<PathBuf>,

    /// Voice: alloy, echo, fable, onyx, nova or shimmer
    #[arg(long, default_value = "alloy")]
    voice: Voice,

    /// Playback speed, 0.25 to 4.0 (1.0 is normal)
    #[arg(long, default_value_t = 1.0)]
    speed: f32,

    /// Maximum characters per synthesis chunk
    #[arg(long = "max-length", default_value_t = 1000)]
    max_length: usize,

    /// First page to read (1-based)
    #[arg(long = "start-page", visible_alias = "start", allow_negative_numbers = true)]
    start_page: Option<i64>,

    /// Last page to read (inclusive)
    #[arg(long = "end-page", visible_alias = "end", allow_negative_numbers = true)]
    end_page: Option<i64>,
}

fn default_output(input: &Path) -> PathBuf {
    input.with_extension("mp3")
}

fn now() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

async fn run(cli: Cli) -> Result<PathBuf> {
    let config = Config::cli_from_env().map_err(|e| anyhow::anyhow!("{}", e))?;
    init_logging(&config.log_format, "pdf2tts=warn");

    let options = ConversionOptions {
        voice: cli.voice,
        speed: cli.speed,
        max_chunk_length: cli.max_length,
        page_range: PageRange::new(cli.start_page, cli.end_page),
    };
    options.validate()?;

    let output = cli.out.clone().unwrap_or_else(|| default_output(&cli.pdf));

    let engine = Arc::new(OpenAiSpeechEngine::from_endpoint(
        &config.tts_api_base,
        &config.tts_api_key,
        config.tts_model.clone(),
    ));
    let extractor = TextExtractor::new(Arc::new(LopdfLoader::new()));
    let synthesis = SynthesisService::new(engine, config.synthesis_timeout());

    let start = Instant::now();
    println!("[{}] Reading PDF: {}", now(), cli.pdf.display());

    let input = cli.pdf.clone();
    let page_range = options.page_range;
    let text = tokio::task::spawn_blocking(move || extractor.extract(&input, page_range))
        .await
        .context("extraction task failed")??;
    println!(
        "[{}] PDF read in {:.2}s ({} characters)",
        now(),
        start.elapsed().as_secs_f64(),
        text.char_count()
    );

    let tts_start = Instant::now();
    println!(
        "[{}] Generating speech (long text is split and merged automatically)...",
        now()
    );
    let written = synthesis
        .synthesize(
            text,
            &output,
            options.voice,
            options.speed,
            options.max_chunk_length,
        )
        .await?;
    println!(
        "[{}] Speech generated in {:.2}s",
        now(),
        tts_start.elapsed().as_secs_f64()
    );

    println!(
        "[{}] Done! Output file: {}, total time: {:.2}s",
        now(),
        written.display(),
        start.elapsed().as_secs_f64()
    );

    Ok(written)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
