//! article2md - convert saved article HTML to Markdown with local assets

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use kodegen_tools_article2md::{
    ArticleSource, AssetSink, ConversionContext, ConversionContextBuilder, ConversionSession, HttpImageFetcher, ImageFetcher,
    merge_articles,
};
use kodegen_tools_article2md::utils::sanitize_file_name;

#[derive(Parser)]
#[command(name = "article2md")]
#[command(version, about = "Convert article HTML to Markdown", long_about = None)]
#[command(after_help = "EXAMPLES:
    article2md post.html -o out                  Convert one article
    article2md a.html b.html -o out --merge Col  Merge articles into out/Col.md
    RUST_LOG=debug article2md post.html -o out   Show localization decisions")]
struct Cli {
    /// Article HTML files (full pages or the article body)
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory for Markdown and assets
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output: PathBuf,

    /// JSON settings file (camelCase keys, all optional)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Merge all inputs into one document with this name
    #[arg(short, long, value_name = "NAME")]
    merge: Option<String>,

    /// Do not download remote images
    #[arg(long)]
    offline: bool,
}

async fn load_context(path: Option<&Path>) -> Result<ConversionContext> {
    let Some(path) = path else {
        return Ok(ConversionContext::default());
    };
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read settings {}", path.display()))?;
    let context: ConversionContext = serde_json::from_str(&json)
        .with_context(|| format!("Invalid settings in {}", path.display()))?;
    ConversionContextBuilder::from(context).build()
}

fn article_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "untitled".to_string())
}

async fn write_markdown(dir: &Path, name: &str, markdown: &str) -> Result<PathBuf> {
    let target = dir.join(format!("{}.md", sanitize_file_name(name)));
    tokio::fs::write(&target, markdown)
        .await
        .with_context(|| format!("Failed to write {}", target.display()))?;
    Ok(target)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let context = load_context(cli.config.as_deref()).await?;
    tokio::fs::create_dir_all(&cli.output)
        .await
        .with_context(|| format!("Failed to create {}", cli.output.display()))?;

    let sink = Arc::new(AssetSink::new());
    let mut written = Vec::new();

    if let Some(name) = &cli.merge {
        let mut articles = Vec::with_capacity(cli.inputs.len());
        for path in &cli.inputs {
            let html = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            articles.push(ArticleSource {
                title: article_title(path),
                html,
            });
        }
        let markdown = merge_articles(&articles, &context, Arc::clone(&sink))
            .await
            .context("Merge failed")?;
        written.push(write_markdown(&cli.output, name, &markdown).await?);
    } else {
        for path in &cli.inputs {
            let html = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let title = article_title(path);
            let session = ConversionSession::with_sink(context.clone(), Arc::clone(&sink));
            let markdown = session
                .convert_html(&html)
                .await
                .with_context(|| format!("Failed to convert {}", path.display()))?;
            written.push(write_markdown(&cli.output, &title, &markdown).await?);
        }
    }

    let fetcher = HttpImageFetcher::default();
    let fetcher: Option<&dyn ImageFetcher> = if cli.offline { None } else { Some(&fetcher) };
    let assets = sink
        .write_to_dir(&cli.output, fetcher)
        .await
        .context("Failed to write assets")?;

    for path in &written {
        println!("{}", path.display());
    }
    log::info!("Wrote {} documents and {} assets", written.len(), assets.len());
    Ok(())
}
