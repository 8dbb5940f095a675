use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use wordfeed::dispatch::SiteRegistry;
use wordfeed::extract::{Extractor, Schema, parse_and_extract};

#[derive(Parser)]
#[command(name = "extract_words")]
#[command(about = "Extract words from a saved typing-practice page")]
struct Cli {
    html_path: String,
    /// Address the page was saved from; picks the schema.
    #[arg(short, long)]
    url: String,
    /// Force a schema instead of matching on the url.
    #[arg(short, long)]
    schema: Option<String>,
    #[arg(short, long)]
    pretty: bool,
}

#[derive(Debug, Serialize)]
struct Extraction {
    url: String,
    schema: String,
    count: usize,
    words: Vec<String>,
}

fn extract(html: &str, url: &str, schema: Option<&str>) -> Result<Extraction> {
    let extractor: Arc<dyn Extractor> = match schema {
        Some(name) => Schema::from_str(name)
            .with_context(|| format!("unknown schema: {}", name))?
            .extractor()
            .into(),
        None => SiteRegistry::default().resolve(url),
    };
    let words = parse_and_extract(extractor.as_ref(), html);

    Ok(Extraction {
        url: url.to_string(),
        schema: extractor.name().to_string(),
        count: words.len(),
        words,
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let path = Path::new(&cli.html_path);

    if !path.is_file() {
        anyhow::bail!("Path is not a file: {}", path.display());
    }

    let html = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let extraction = extract(&html, &cli.url, cli.schema.as_deref())?;

    if cli.pretty {
        println!("{}", serde_json::to_string_pretty(&extraction)?);
    } else {
        println!("{}", serde_json::to_string(&extraction)?);
    }

    Ok(())
}
