use movierec::*;

fn catalogue() -> Vec<MovieRecord> {
    vec![
        MovieRecord::new("862", "Toy Story")
            .with_overview("Led by Woody, Andy's toys live happily in his room until Buzz Lightyear arrives.")
            .with_genres(["Animation", "Comedy", "Family"])
            .with_collection("Toy Story Collection")
            .with_numbers(Some(30_000_000.0), Some(373_554_033.0), Some(81.0))
            .with_rating(7.7)
            .with_release_date("1995-10-30"),
        MovieRecord::new("863", "Toy Story 2")
            .with_overview("Andy heads off to Cowboy Camp, leaving his toys to their own devices.")
            .with_genres(["Animation", "Comedy", "Family"])
            .with_collection("Toy Story Collection")
            .with_numbers(Some(90_000_000.0), Some(497_366_869.0), Some(92.0))
            .with_rating(7.3)
            .with_release_date("1999-10-30"),
        MovieRecord::new("949", "Heat")
            .with_overview("Obsessive master thief Neil McCauley leads a top-notch crew on daring heists.")
            .with_genres(["Action", "Crime", "Drama", "Thriller"])
            .with_numbers(Some(60_000_000.0), Some(187_436_818.0), Some(170.0))
            .with_rating(7.7)
            .with_release_date("1995-12-15"),
        MovieRecord::new("8844", "Jumanji")
            .with_overview("When siblings Judy and Peter discover an enchanted board game, a jungle awaits.")
            .with_genres(["Adventure", "Fantasy", "Family"])
            .with_numbers(Some(65_000_000.0), Some(262_797_249.0), Some(104.0))
            .with_rating(6.9)
            .with_release_date("1995-12-15"),
        MovieRecord::new("710", "GoldenEye")
            .with_overview("James Bond must stop a crime syndicate from using a space weapon.")
            .with_genres(["Adventure", "Action", "Thriller"])
            .with_collection("James Bond Collection")
            .with_numbers(Some(58_000_000.0), Some(352_194_034.0), Some(130.0))
            .with_rating(6.6)
            .with_release_date("1995-11-16"),
        MovieRecord::new("10858", "Nixon")
            .with_overview("An all-star cast powers this epic look at American President Richard M. Nixon.")
            .with_genres(["History", "Drama"])
            .with_numbers(Some(44_000_000.0), Some(13_681_765.0), Some(192.0))
            .with_rating(7.1)
            .with_release_date("1995-12-22"),
        MovieRecord::new("1408", "Cutthroat Island")
            .with_overview("Morgan Adams and her slave Shaw race rival pirates for a treasure map.")
            .with_genres(["Action", "Adventure"])
            .with_numbers(Some(98_000_000.0), Some(10_017_322.0), Some(119.0))
            .with_rating(5.7)
            .with_release_date("1995-12-22"),
        MovieRecord::new("5", "Echo")
            .with_overview("A boy and an alien go on an adventure.")
            .with_genres(["Family", "Adventure"])
            .with_release_date("2014-07-02"),
        MovieRecord::new("6", "Echo")
            .with_overview("A silent thriller about a radio signal.")
            .with_genres(["Thriller"])
            .with_release_date("2008-04-11"),
    ]
}

fn print_outcome(recommender: &MovieRecommender, outcome: RecommendOutcome) -> anyhow::Result<()> {
    match outcome {
        RecommendOutcome::Recommendations(result) => {
            println!("🎯 Recommendations for '{}':", result.query_title);
            for item in &result.items {
                println!(
                    "  {:<20} {:.3}  [{}]",
                    item.title,
                    item.similarity_score,
                    item.genres.join(", ")
                );
            }
            let metrics = recommender.evaluate(&result, result.query_index)?;
            println!(
                "📊 genre overlap {:.1}%, rating difference {:.2}, content relevance {:.1}%",
                metrics.genre_overlap, metrics.rating_difference, metrics.content_relevance
            );
        }
        RecommendOutcome::Ambiguous { candidates } => {
            println!("❓ Multiple movies share that title:");
            for candidate in &candidates {
                println!(
                    "  {}. {} ({})",
                    candidate.position,
                    candidate.title,
                    candidate.release_date.as_deref().unwrap_or("unknown")
                );
            }
        }
        RecommendOutcome::NotFound { suggestions } => {
            println!("🚫 Not found, {} suggestions", suggestions.len());
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    println!("🚀 movierec basic usage");

    // 1. Configuration
    let mut config = Config::default();
    config.reduction.n_components = 6;
    println!("✅ Config loaded: {} components", config.reduction.n_components);

    // 2. Build the pipeline step by step
    let mut recommender = MovieRecommender::new(&config);
    let loaded = recommender.ingest(catalogue())?;
    println!("📦 Ingested {} movies", loaded);

    recommender.build_features()?;
    if let Some(space) = recommender.feature_space() {
        println!("🧱 Feature blocks: {:?}", space.encoders.widths());
    }

    let ratio = recommender.build_similarity(config.reduction.n_components)?;
    println!("📉 Explained variance ratio: {:.2}", ratio);

    // 3. Recommend
    print_outcome(&recommender, recommender.recommend("toy story", 3, None)?)?;
    print_outcome(&recommender, recommender.recommend("heat", 3, None)?)?;

    // 4. Duplicate titles come back as candidates; pass a position to choose
    print_outcome(&recommender, recommender.recommend("Echo", 3, None)?)?;
    print_outcome(&recommender, recommender.recommend("Echo", 3, Some(1))?)?;

    // 5. Substring fallback
    print_outcome(&recommender, recommender.recommend("golden", 3, None)?)?;

    println!("\n✨ Done");
    Ok(())
}
