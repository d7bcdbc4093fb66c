use anyhow::{bail, Result};
use clap::Parser;
use movierec::utils::validation::{validate_count, validate_title};
use movierec::{init_tracing, Config, MovieRecommender, RecommendOutcome};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Print content-based recommendations for one movie", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Movie metadata CSV; overrides `data.movies_path`.
    #[arg(short, long)]
    data: Option<String>,

    #[arg(short, long)]
    title: String,

    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Position among movies sharing the exact title.
    #[arg(long)]
    choice: Option<usize>,

    /// Target dimension for the reduction; overrides `reduction.n_components`.
    #[arg(long)]
    components: Option<usize>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let mut config = Config::load_or_default(&args.config)?;
    if let Some(data) = args.data {
        config.data.movies_path = data;
    }
    if let Some(components) = args.components {
        config.reduction.n_components = components;
    }
    let count = args.count.unwrap_or(config.recommendation.default_count);
    validate_title(&args.title)?;
    validate_count(count)?;

    info!("Building recommender from {}", config.data.movies_path);
    let (recommender, ratio) = MovieRecommender::build_from_path(&config, &config.data.movies_path)?;
    println!("Explained variance ratio: {:.2}", ratio);

    match recommender.recommend(&args.title, count, args.choice)? {
        RecommendOutcome::Recommendations(result) => {
            println!("\nRecommendations for '{}':", result.query_title);
            for (rank, item) in result.items.iter().enumerate() {
                println!(
                    "{:>2}. {} ({}) [{}] similarity {:.3}",
                    rank + 1,
                    item.title,
                    item.release_date.as_deref().unwrap_or("unknown"),
                    item.genres.join(", "),
                    item.similarity_score
                );
            }

            let metrics = recommender.evaluate(&result, result.query_index)?;
            println!("\nGenre overlap:      {:.2}%", metrics.genre_overlap);
            println!(
                "Rating difference:  {:.2} ({} skipped)",
                metrics.rating_difference, metrics.rating_skipped
            );
            println!("Content relevance:  {:.2}%", metrics.content_relevance);
        }
        RecommendOutcome::Ambiguous { candidates } => {
            println!("Multiple movies found with title '{}':", args.title);
            for candidate in &candidates {
                println!(
                    "  {}. {} (Released: {})",
                    candidate.position,
                    candidate.title,
                    candidate.release_date.as_deref().unwrap_or("unknown")
                );
            }
            println!("Rerun with --choice <position>.");
        }
        RecommendOutcome::NotFound { suggestions } => {
            if suggestions.is_empty() {
                bail!("Movie '{}' not found in dataset", args.title);
            }
            println!("Movie '{}' not found. Did you mean:", args.title);
            for suggestion in &suggestions {
                println!("  {}", suggestion.title);
            }
        }
    }

    Ok(())
}
