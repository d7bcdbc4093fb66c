use super::sparse::CsrMatrix;
use super::text::{FittedTfidf, TfidfVectorizer};
use super::{FeatureEncoder, FittedEncoder};
use crate::models::MovieRecord;
use crate::utils::median;
use std::collections::{BTreeSet, HashMap};

/// Binary indicator per genre observed at fit time.
#[derive(Debug, Clone, Default)]
pub struct GenreEncoder;

#[derive(Debug, Clone)]
pub struct FittedGenreEncoder {
    classes: Vec<String>,
    columns: HashMap<String, usize>,
}

impl FeatureEncoder for GenreEncoder {
    type Fitted = FittedGenreEncoder;

    fn fit(&self, records: &[MovieRecord]) -> FittedGenreEncoder {
        let classes: Vec<String> = records
            .iter()
            .flat_map(|r| r.genres.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let columns = classes.iter().enumerate().map(|(i, g)| (g.clone(), i)).collect();
        FittedGenreEncoder { classes, columns }
    }
}

impl FittedGenreEncoder {
    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

impl FittedEncoder for FittedGenreEncoder {
    fn name(&self) -> &'static str {
        "genres"
    }

    fn width(&self) -> usize {
        self.classes.len()
    }

    fn transform(&self, records: &[MovieRecord]) -> CsrMatrix {
        let rows = records
            .iter()
            .map(|record| {
                let mut row: Vec<(usize, f64)> = record
                    .genres
                    .iter()
                    .filter_map(|g| self.columns.get(g).map(|&c| (c, 1.0)))
                    .collect();
                row.sort_by_key(|&(c, _)| c);
                row.dedup_by_key(|&mut (c, _)| c);
                row
            })
            .collect();
        CsrMatrix::from_rows(rows, self.width())
    }
}

/// Weighted one-hot over collection names.
#[derive(Debug, Clone)]
pub struct CollectionEncoder {
    pub weight: f64,
    pub include_empty: bool,
}

impl Default for CollectionEncoder {
    fn default() -> Self {
        Self {
            weight: 2.0,
            include_empty: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FittedCollectionEncoder {
    weight: f64,
    categories: Vec<String>,
    columns: HashMap<String, usize>,
}

fn collection_key(record: &MovieRecord) -> &str {
    record.collection.as_deref().unwrap_or("")
}

impl FeatureEncoder for CollectionEncoder {
    type Fitted = FittedCollectionEncoder;

    fn fit(&self, records: &[MovieRecord]) -> FittedCollectionEncoder {
        let categories: Vec<String> = records
            .iter()
            .map(collection_key)
            .filter(|name| self.include_empty || !name.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let columns = categories.iter().enumerate().map(|(i, c)| (c.clone(), i)).collect();
        FittedCollectionEncoder {
            weight: self.weight,
            categories,
            columns,
        }
    }
}

impl FittedCollectionEncoder {
    pub fn categories(&self) -> &[String] {
        &self.categories
    }
}

impl FittedEncoder for FittedCollectionEncoder {
    fn name(&self) -> &'static str {
        "collection"
    }

    fn width(&self) -> usize {
        self.categories.len()
    }

    fn transform(&self, records: &[MovieRecord]) -> CsrMatrix {
        let rows = records
            .iter()
            .map(|record| match self.columns.get(collection_key(record)) {
                Some(&column) => vec![(column, self.weight)],
                None => Vec::new(),
            })
            .collect();
        CsrMatrix::from_rows(rows, self.width())
    }
}

/// TF-IDF block over the overview text.
#[derive(Debug, Clone, Default)]
pub struct OverviewEncoder {
    vectorizer: TfidfVectorizer,
}

#[derive(Debug, Clone)]
pub struct FittedOverviewEncoder {
    tfidf: FittedTfidf,
}

impl FeatureEncoder for OverviewEncoder {
    type Fitted = FittedOverviewEncoder;

    fn fit(&self, records: &[MovieRecord]) -> FittedOverviewEncoder {
        let overviews: Vec<&str> = records.iter().map(|r| r.overview.as_str()).collect();
        FittedOverviewEncoder {
            tfidf: self.vectorizer.fit(&overviews),
        }
    }
}

impl FittedOverviewEncoder {
    pub fn tfidf(&self) -> &FittedTfidf {
        &self.tfidf
    }
}

impl FittedEncoder for FittedOverviewEncoder {
    fn name(&self) -> &'static str {
        "overview"
    }

    fn width(&self) -> usize {
        self.tfidf.vocabulary_size()
    }

    fn transform(&self, records: &[MovieRecord]) -> CsrMatrix {
        let overviews: Vec<&str> = records.iter().map(|r| r.overview.as_str()).collect();
        self.tfidf.transform(&overviews)
    }
}

pub const NUMERIC_FIELDS: [&str; 3] = ["budget", "revenue", "runtime"];

fn numeric_values(record: &MovieRecord) -> [Option<f64>; 3] {
    [record.budget, record.revenue, record.runtime]
}

/// Median imputation of zero and missing values, then z-score scaling.
#[derive(Debug, Clone, Default)]
pub struct NumericEncoder;

#[derive(Debug, Clone, PartialEq)]
pub struct FittedNumericEncoder {
    medians: [f64; 3],
    means: [f64; 3],
    scales: [f64; 3],
}

impl FeatureEncoder for NumericEncoder {
    type Fitted = FittedNumericEncoder;

    fn fit(&self, records: &[MovieRecord]) -> FittedNumericEncoder {
        let mut medians = [0.0; 3];
        for (column, slot) in medians.iter_mut().enumerate() {
            let present: Vec<f64> = records
                .iter()
                .filter_map(|r| numeric_values(r)[column])
                .filter(|&v| v != 0.0)
                .collect();
            *slot = median(&present).unwrap_or(0.0);
        }

        let mut means = [0.0; 3];
        let mut scales = [1.0; 3];
        let n = records.len().max(1) as f64;
        for column in 0..3 {
            let filled: Vec<f64> = records
                .iter()
                .map(|r| impute(numeric_values(r)[column], medians[column]))
                .collect();
            let mean = filled.iter().sum::<f64>() / n;
            let variance = filled.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let std = variance.sqrt();
            means[column] = mean;
            scales[column] = if std > 0.0 { std } else { 1.0 };
        }

        FittedNumericEncoder {
            medians,
            means,
            scales,
        }
    }
}

fn impute(value: Option<f64>, median: f64) -> f64 {
    match value {
        Some(v) if v != 0.0 => v,
        _ => median,
    }
}

impl FittedNumericEncoder {
    pub fn medians(&self) -> [f64; 3] {
        self.medians
    }

    pub fn means(&self) -> [f64; 3] {
        self.means
    }

    pub fn scales(&self) -> [f64; 3] {
        self.scales
    }

    /// Values after zero/missing substitution, before scaling.
    pub fn impute(&self, record: &MovieRecord) -> [f64; 3] {
        let values = numeric_values(record);
        [0, 1, 2].map(|c| impute(values[c], self.medians[c]))
    }
}

impl FittedEncoder for FittedNumericEncoder {
    fn name(&self) -> &'static str {
        "numeric"
    }

    fn width(&self) -> usize {
        NUMERIC_FIELDS.len()
    }

    fn transform(&self, records: &[MovieRecord]) -> CsrMatrix {
        let rows = records
            .iter()
            .map(|record| {
                self.impute(record)
                    .iter()
                    .enumerate()
                    .map(|(c, v)| (c, (v - self.means[c]) / self.scales[c]))
                    .collect()
            })
            .collect();
        CsrMatrix::from_rows(rows, self.width())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<MovieRecord> {
        vec![
            MovieRecord::new("1", "Alien")
                .with_genres(["Horror", "Science Fiction"])
                .with_collection("Alien Collection"),
            MovieRecord::new("2", "Aliens")
                .with_genres(["Action", "Horror", "Science Fiction"])
                .with_collection("Alien Collection"),
            MovieRecord::new("3", "Heat").with_genres(["Action", "Crime", "Drama"]),
            MovieRecord::new("4", "Untitled"),
        ]
    }

    #[test]
    fn test_genre_row_sum_equals_genre_count() {
        let records = corpus();
        let fitted = GenreEncoder.fit(&records);
        let matrix = fitted.transform(&records);
        assert_eq!(fitted.width(), 5);
        assert_eq!(fitted.classes()[0], "Action");
        for (i, record) in records.iter().enumerate() {
            assert_eq!(matrix.row_sum(i), record.genres.len() as f64);
        }
    }

    #[test]
    fn test_unknown_genre_is_ignored() {
        let fitted = GenreEncoder.fit(&corpus());
        let unseen = vec![MovieRecord::new("9", "New").with_genres(["Western", "Drama"])];
        let matrix = fitted.transform(&unseen);
        assert_eq!(matrix.row_sum(0), 1.0);
    }

    #[test]
    fn test_collection_excludes_empty_bucket() {
        let records = corpus();
        let fitted = CollectionEncoder::default().fit(&records);
        let matrix = fitted.transform(&records);
        assert_eq!(fitted.categories(), &["Alien Collection".to_string()]);
        assert_eq!(matrix.get(0, 0), 2.0);
        assert_eq!(matrix.get(1, 0), 2.0);
        assert_eq!(matrix.row(2).count(), 0);
        assert_eq!(matrix.row(3).count(), 0);
    }

    #[test]
    fn test_collection_parity_mode_keeps_empty_bucket() {
        let records = corpus();
        let encoder = CollectionEncoder {
            weight: 2.0,
            include_empty: true,
        };
        let fitted = encoder.fit(&records);
        let matrix = fitted.transform(&records);
        assert_eq!(fitted.width(), 2);
        assert_eq!(matrix.get(2, 0), 2.0);
        assert_eq!(matrix.get(3, 0), 2.0);
    }

    #[test]
    fn test_zero_budget_replaced_by_nonzero_median() {
        let records: Vec<MovieRecord> = [0.0, 0.0, 100.0, 0.0]
            .iter()
            .map(|&b| MovieRecord::new("x", "x").with_numbers(Some(b), None, None))
            .collect();
        let fitted = NumericEncoder.fit(&records);
        assert_eq!(fitted.medians()[0], 100.0);
        for record in &records {
            assert_eq!(fitted.impute(record)[0], 100.0);
        }

        let matrix = fitted.transform(&records);
        assert_eq!(fitted.scales()[0], 1.0);
        for i in 0..records.len() {
            assert_eq!(matrix.get(i, 0), 0.0);
        }
    }

    #[test]
    fn test_numeric_standardization() {
        let records: Vec<MovieRecord> = [Some(10.0), None, Some(30.0)]
            .iter()
            .map(|&r| MovieRecord::new("x", "x").with_numbers(None, None, r))
            .collect();
        let fitted = NumericEncoder.fit(&records);
        assert_eq!(fitted.medians()[2], 20.0);

        let matrix = fitted.transform(&records);
        let column: Vec<f64> = (0..3).map(|i| matrix.get(i, 2)).collect();
        let mean: f64 = column.iter().sum::<f64>() / 3.0;
        let var: f64 = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / 3.0;
        assert!(mean.abs() < 1e-12);
        assert!((var - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_overview_encoder_width_matches_vocabulary() {
        let records = vec![
            MovieRecord::new("1", "A").with_overview("a hero falls"),
            MovieRecord::new("2", "B").with_overview(""),
        ];
        let fitted = OverviewEncoder::default().fit(&records);
        assert_eq!(fitted.width(), 2);
        assert_eq!(fitted.transform(&records).row(1).count(), 0);
    }
}
