use criterion::{black_box, criterion_group, criterion_main, Criterion};
use movierec::algorithms::build_feature_space;
use movierec::algorithms::similarity::SimilarityMatrix;
use movierec::algorithms::svd::TruncatedSvd;
use movierec::config::FeatureConfig;
use movierec::*;

const GENRES: [&str; 8] = [
    "Action", "Adventure", "Comedy", "Crime", "Drama", "Family", "Horror", "Romance",
];
const WORDS: [&str; 16] = [
    "space", "love", "war", "ghost", "heist", "family", "river", "city", "detective", "robot",
    "island", "secret", "journey", "revenge", "school", "king",
];

fn synthetic_corpus(n: usize) -> Vec<MovieRecord> {
    (0..n)
        .map(|i| {
            let overview: Vec<&str> = (0..12).map(|k| WORDS[(i * 7 + k * 3) % WORDS.len()]).collect();
            let mut record = MovieRecord::new(i.to_string(), format!("Movie {}", i))
                .with_genres([GENRES[i % GENRES.len()], GENRES[(i / 3) % GENRES.len()]])
                .with_overview(overview.join(" "))
                .with_numbers(
                    Some(((i % 50) as f64) * 1_000_000.0),
                    Some(((i % 70) as f64) * 2_500_000.0),
                    Some(80.0 + (i % 60) as f64),
                )
                .with_rating(4.0 + (i % 6) as f64);
            if i % 10 == 0 {
                record = record.with_collection(format!("Collection {}", i / 40));
            }
            record
        })
        .collect()
}

fn benchmark_feature_building(c: &mut Criterion) {
    let records = synthetic_corpus(1000);
    let config = FeatureConfig::default();

    c.bench_function("build_feature_space_1000", |b| {
        b.iter(|| black_box(build_feature_space(&records, &config)));
    });
}

fn benchmark_reduction_and_similarity(c: &mut Criterion) {
    let records = synthetic_corpus(1000);
    let space = build_feature_space(&records, &FeatureConfig::default());

    c.bench_function("truncated_svd_1000x50", |b| {
        b.iter(|| black_box(TruncatedSvd::new(50).fit_transform(&space.combined).unwrap()));
    });

    let (_, reduced) = TruncatedSvd::new(50).fit_transform(&space.combined).unwrap();
    c.bench_function("similarity_matrix_1000", |b| {
        b.iter(|| black_box(SimilarityMatrix::build(&reduced)));
    });
}

fn benchmark_recommend(c: &mut Criterion) {
    let mut config = Config::default();
    config.reduction.n_components = 50;
    let (recommender, _) = MovieRecommender::build(&config, synthetic_corpus(1000)).unwrap();

    c.bench_function("recommend_top10", |b| {
        b.iter(|| black_box(recommender.recommend("Movie 500", 10, None).unwrap()));
    });

    c.bench_function("recommend_and_evaluate_top10", |b| {
        b.iter(|| {
            if let RecommendOutcome::Recommendations(result) =
                recommender.recommend("Movie 500", 10, None).unwrap()
            {
                black_box(recommender.evaluate(&result, result.query_index).unwrap());
            }
        });
    });
}

criterion_group!(
    benches,
    benchmark_feature_building,
    benchmark_reduction_and_similarity,
    benchmark_recommend
);
criterion_main!(benches);
