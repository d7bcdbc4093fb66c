use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// One row of source metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: String,
    pub title: String,
    pub overview: String,
    pub genres: Vec<String>,
    pub budget: Option<f64>,
    pub revenue: Option<f64>,
    pub runtime: Option<f64>,
    pub collection: Option<String>,
    pub vote_average: Option<f64>,
    pub release_date: Option<String>,
}

impl MovieRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_overview(mut self, overview: impl Into<String>) -> Self {
        self.overview = overview.into();
        self
    }

    /// Duplicate and blank names are dropped, first occurrence wins.
    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for genre in genres {
            let genre = genre.into();
            if !genre.trim().is_empty() && !unique.contains(&genre) {
                unique.push(genre);
            }
        }
        self.genres = unique;
        self
    }

    pub fn with_numbers(mut self, budget: Option<f64>, revenue: Option<f64>, runtime: Option<f64>) -> Self {
        self.budget = budget;
        self.revenue = revenue;
        self.runtime = runtime;
        self
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        let collection = collection.into();
        self.collection = if collection.is_empty() { None } else { Some(collection) };
        self
    }

    pub fn with_rating(mut self, vote_average: f64) -> Self {
        self.vote_average = Some(vote_average);
        self
    }

    pub fn with_release_date(mut self, release_date: impl Into<String>) -> Self {
        self.release_date = Some(release_date.into());
        self
    }

    /// Genre names joined with spaces, used by the content relevance metric.
    pub fn genre_text(&self) -> String {
        self.genres.join(" ")
    }
}

/// A record sharing the query title, offered back for disambiguation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Position among the duplicates; pass it back as the disambiguation index.
    pub position: usize,
    pub index: usize,
    pub id: String,
    pub title: String,
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleSuggestion {
    pub title: String,
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub index: usize,
    pub id: String,
    pub title: String,
    pub genres: Vec<String>,
    pub vote_average: Option<f64>,
    pub release_date: Option<String>,
    pub similarity_score: f64,
    pub overview: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub query_index: usize,
    pub query_title: String,
    pub items: Vec<RecommendationItem>,
    pub generated_at: DateTime<Utc>,
}

impl RecommendationResult {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn indices(&self) -> Vec<usize> {
        self.items.iter().map(|item| item.index).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecommendOutcome {
    Recommendations(RecommendationResult),
    Ambiguous { candidates: Vec<Candidate> },
    NotFound { suggestions: Vec<TitleSuggestion> },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    /// Mean Jaccard index of genre sets, in percent.
    pub genre_overlap: f64,
    /// Mean absolute rating difference on the source rating scale.
    pub rating_difference: f64,
    /// Mean cosine similarity of genre-text TF-IDF vectors, in percent.
    pub content_relevance: f64,
    pub evaluated: usize,
    pub rating_skipped: usize,
}
