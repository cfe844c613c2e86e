//! PDF RAG server binary
//!
//! Run with: cargo run -p pdf-rag --bin pdf-rag-server

use pdf_rag::{config::RagConfig, server::RagServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                        PDF RAG                             ║
║         Document Q&A Chat over a PDF Corpus                ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    // Load configuration (PDF_RAG_CONFIG can point at a TOML file)
    let config = RagConfig::load()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - PDF directory: {}", config.storage.pdf_dir.display());
    tracing::info!("  - Index snapshot: {}", config.storage.index_path.display());
    tracing::info!("  - Embedding model: {}", config.llm.embed_model);
    tracing::info!("  - Chat model: {}", config.llm.chat_model);
    tracing::info!(
        "  - Chunking: size {}, overlap {}",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );

    // Check Ollama
    tracing::info!("Checking Ollama at {}...", config.llm.base_url);
    let client = reqwest::Client::new();
    match client
        .get(format!("{}/api/tags", config.llm.base_url))
        .send()
        .await
    {
        Ok(resp) if resp.status().is_success() => {
            tracing::info!("Ollama is running");
        }
        _ => {
            tracing::warn!("Ollama not available at {}", config.llm.base_url);
            tracing::warn!("Please start Ollama:");
            tracing::warn!("  1. Start: ollama serve");
            tracing::warn!(
                "  2. Pull models: ollama pull {} && ollama pull {}",
                config.llm.embed_model,
                config.llm.chat_model
            );
        }
    }

    // Create and start server
    let server = RagServer::new(config).await?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST   /chat                      - Ask a question");
    println!("  GET    /conversation/:thread_id   - Fetch a conversation");
    println!("  GET    /pdfs                      - List stored PDFs");
    println!("  POST   /upload/pdf                - Upload PDFs");
    println!("  DELETE /remove/pdf/:name          - Remove one PDF");
    println!("  DELETE /remove/pdfs               - Remove all PDFs");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
