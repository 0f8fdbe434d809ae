//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here.

use dotenv::dotenv;
use review_insight::adapters::ai::{GeminiAdapter, OpenAiAdapter};
use review_insight::adapters::classifier::HuggingFaceLoader;
use review_insight::adapters::persistence::SqliteReviewRepo;
use review_insight::adapters::ui::tui::TuiInputPort;
use review_insight::domain::KeywordTable;
use review_insight::ports::{ClassifierLoader, InputPort, KeyPointGenerator, ReviewRepo};
use review_insight::shared::config::{AppConfig, GeneratorChoice};
use review_insight::usecases::{KeyPointExtractor, ReviewService, SentimentAnalyzer};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    review_insight::adapters::ui::init_ui();

    let cfg = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "config load failed; using defaults");
        AppConfig::default()
    });

    let data_path = cfg.data_dir_or_default();
    let data_dir_abs = data_path
        .canonicalize()
        .unwrap_or_else(|_| data_path.clone());
    info!(path = %data_dir_abs.display(), "data directory");

    // --- Keyword table (built-in unless a JSON override is configured) ---
    let keywords = match cfg.keywords_path() {
        Some(path) => {
            let table = KeywordTable::from_json_file(&path)
                .map_err(|e| anyhow::anyhow!("{}", e))?;
            info!(path = %path.display(), "loaded keyword table");
            table
        }
        None => KeywordTable::default(),
    };
    let keywords = Arc::new(keywords);

    // --- Review store ---
    let repo: Arc<dyn ReviewRepo> = Arc::new(
        SqliteReviewRepo::connect(&data_path)
            .await
            .map_err(|e| anyhow::anyhow!("SQLite connect failed: {}", e))?,
    );

    // --- Key points: generative backend (optional) + local fallback ---
    let generator: Option<Arc<dyn KeyPointGenerator>> = match cfg.generator_choice() {
        GeneratorChoice::Gemini {
            api_key,
            model,
            api_base,
        } => {
            info!(model = %model, "key points: Gemini enabled");
            let adapter: Arc<dyn KeyPointGenerator> =
                Arc::new(GeminiAdapter::new(api_base, api_key, model));
            Some(adapter)
        }
        GeneratorChoice::OpenAi {
            api_key,
            model,
            api_url,
        } => {
            info!(model = %model, url = %api_url, "key points: OpenAI-compatible adapter enabled");
            let adapter: Arc<dyn KeyPointGenerator> =
                Arc::new(OpenAiAdapter::new(api_url, api_key, model));
            Some(adapter)
        }
        GeneratorChoice::None => {
            warn!("GEMINI_API_KEY not found or invalid; using lightweight fallback mode");
            None
        }
    };
    let key_points = Arc::new(KeyPointExtractor::new(
        generator,
        Arc::clone(&keywords),
        cfg.ai_timeout(),
    ));

    // --- Sentiment: Hugging Face inference, loaded lazily on first analysis ---
    let hf_key = cfg.huggingface_api_key();
    if hf_key.is_none() {
        info!("HUGGINGFACE_API_KEY not set; using anonymous inference tier");
    }
    let loader: Arc<dyn ClassifierLoader> = Arc::new(
        HuggingFaceLoader::new(cfg.hf_api_url_or_default(), hf_key, cfg.hf_timeout())
            .map_err(|e| anyhow::anyhow!("{}", e))?,
    );
    let sentiment = Arc::new(SentimentAnalyzer::new(
        loader,
        cfg.sentiment_model_or_default(),
        cfg.sentiment_fallback_model_or_default(),
        Arc::clone(&keywords),
    ));

    let service = Arc::new(ReviewService::new(repo, sentiment, key_points));

    let input_port: Arc<dyn InputPort> =
        Arc::new(TuiInputPort::new(service, data_path.join("exports")));

    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    info!("bye");
    Ok(())
}
