use std::path::PathBuf;

use clap::Parser;

use assessdb_cli::page::fetch_page_text;
use assessdb_core::types::SearchOptions;
use assessdb_engine::Recommender;

#[derive(Parser, Debug)]
#[command(name = "assessdb-search", about = "Recommend assessments for a hiring query or job-description URL")]
struct Cli {
    /// Hiring query or job description text.
    #[arg(required_unless_present = "url", conflicts_with = "url")]
    query: Option<String>,

    /// Fetch the job description from this http(s) URL instead.
    #[arg(long)]
    url: Option<String>,

    /// Number of results. Defaults to `retrieval.default_top_k`.
    #[arg(long)]
    top_k: Option<usize>,

    /// Keep retrieval order instead of asking the language service to rerank.
    #[arg(long)]
    no_rerank: bool,

    /// Ask the language service for a short justification per result.
    #[arg(long)]
    explain: bool,

    /// Print the full response as JSON.
    #[arg(long)]
    json: bool,

    /// Index directory override.
    #[arg(long)]
    index_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    assessdb_cli::init_tracing();
    let cli = Cli::parse();
    let mut settings = assessdb_cli::load_settings()?;
    if let Some(dir) = &cli.index_dir {
        settings.data.index_dir = dir.display().to_string();
    }

    let query = match (&cli.query, &cli.url) {
        (Some(query), _) => query.clone(),
        (None, Some(url)) => fetch_page_text(url)?,
        (None, None) => anyhow::bail!("a query or --url is required"),
    };

    let recommender = Recommender::from_settings(&settings);
    let options = SearchOptions {
        top_k: cli.top_k.unwrap_or(settings.retrieval.default_top_k),
        rerank: !cli.no_rerank,
        explain: cli.explain,
    };
    let response = recommender.search(&query, options);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("🔍 assessdb-search\n=================");
    println!("Rewritten query: {}", response.rewritten_query);
    if let Some(fallback) = &response.fallback {
        println!("\n{fallback}");
    }
    for (i, result) in response.results.iter().enumerate() {
        let record = &result.record;
        println!("\n  {}. {}  score={:.4}", i + 1, record.name, result.score);
        println!("     {} | {} min | {}", record.test_types_joined(), record.duration_text, record.job_levels);
        println!(
            "     remote={} adaptive={}  {}",
            if record.remote_support { "Yes" } else { "No" },
            if record.adaptive_support { "Yes" } else { "No" },
            record.url
        );
        if let Some(explanation) = &result.explanation {
            println!("     💡 {explanation}");
        }
    }
    Ok(())
}
