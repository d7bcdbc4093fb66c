pub mod literal;

use crate::error::IngestionError;
use crate::models::MovieRecord;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Columns the feature encoders read. Their absence is reported when
/// features are built, not at ingestion.
pub const FEATURE_COLUMNS: [&str; 6] = [
    "overview",
    "genres",
    "belongs_to_collection",
    "budget",
    "revenue",
    "runtime",
];

/// The ingested records plus the feature columns the source lacked.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub records: Vec<MovieRecord>,
    pub missing_columns: Vec<String>,
}

impl Corpus {
    pub fn new(records: Vec<MovieRecord>) -> Self {
        Self {
            records,
            missing_columns: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Anything that can produce a corpus of movie records.
pub trait RecordSource {
    fn read_corpus(self) -> Result<Corpus, IngestionError>;
}

impl RecordSource for Vec<MovieRecord> {
    fn read_corpus(self) -> Result<Corpus, IngestionError> {
        Ok(Corpus::new(self))
    }
}

impl RecordSource for Corpus {
    fn read_corpus(self) -> Result<Corpus, IngestionError> {
        Ok(self)
    }
}

/// Row-oriented CSV source with a header line naming the columns.
pub struct CsvSource<R: Read> {
    reader: R,
}

impl<R: Read> CsvSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl CsvSource<File> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, IngestionError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| IngestionError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::new(file))
    }
}

impl<R: Read> RecordSource for CsvSource<R> {
    fn read_corpus(self) -> Result<Corpus, IngestionError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(self.reader);

        let headers = reader.headers()?.clone();
        let columns: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim(), i))
            .collect();

        let title_col = *columns.get("title").ok_or(IngestionError::MissingTitleColumn)?;
        let missing_columns: Vec<String> = FEATURE_COLUMNS
            .iter()
            .filter(|name| !columns.contains_key(*name))
            .map(|name| name.to_string())
            .collect();

        let col = |name: &str| columns.get(name).copied();
        let layout = ColumnLayout {
            id: col("id"),
            title: title_col,
            overview: col("overview"),
            genres: col("genres"),
            collection: col("belongs_to_collection"),
            budget: col("budget"),
            revenue: col("revenue"),
            runtime: col("runtime"),
            vote_average: col("vote_average"),
            release_date: col("release_date"),
        };

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            records.push(layout.record(&row));
        }

        debug!("Parsed {} rows, missing feature columns: {:?}", records.len(), missing_columns);
        Ok(Corpus {
            records,
            missing_columns,
        })
    }
}

struct ColumnLayout {
    id: Option<usize>,
    title: usize,
    overview: Option<usize>,
    genres: Option<usize>,
    collection: Option<usize>,
    budget: Option<usize>,
    revenue: Option<usize>,
    runtime: Option<usize>,
    vote_average: Option<usize>,
    release_date: Option<usize>,
}

impl ColumnLayout {
    fn record(&self, row: &csv::StringRecord) -> MovieRecord {
        let cell = |col: Option<usize>| col.and_then(|i| row.get(i)).unwrap_or("");
        let text = |col: Option<usize>| {
            let value = cell(col).trim();
            if value.is_empty() { None } else { Some(value.to_string()) }
        };

        MovieRecord {
            id: cell(self.id).trim().to_string(),
            title: cell(Some(self.title)).trim().to_string(),
            overview: cell(self.overview).to_string(),
            genres: literal::parse_genre_names(cell(self.genres)),
            budget: parse_number(cell(self.budget)),
            revenue: parse_number(cell(self.revenue)),
            runtime: parse_number(cell(self.runtime)),
            collection: literal::parse_collection_name(cell(self.collection)),
            vote_average: parse_number(cell(self.vote_average)),
            release_date: text(self.release_date),
        }
    }
}

/// Numeric coercion; anything unparsable or non-finite is missing.
pub fn parse_number(cell: &str) -> Option<f64> {
    cell.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

pub fn ingest<S: RecordSource>(source: S) -> Result<Corpus, IngestionError> {
    info!("Loading movie data...");
    let corpus = source.read_corpus()?;
    info!("Loaded {} movies.", corpus.len());
    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
id,title,overview,genres,belongs_to_collection,budget,revenue,runtime,vote_average,release_date
862,Toy Story,\"Led by Woody, Andy's toys live happily.\",\"[{'id': 16, 'name': 'Animation'}, {'id': 35, 'name': 'Comedy'}]\",\"{'id': 10194, 'name': 'Toy Story Collection'}\",30000000,373554033,81.0,7.7,1995-10-30
8844,Jumanji,,\"[{'id': 12, 'name': 'Adventure'}]\",,65000000,262797249,104.0,6.9,1995-12-15
100,Broken,text,garbage,{bad,/poster.jpg,,,,
";

    #[test]
    fn test_csv_source() {
        let corpus = ingest(CsvSource::new(CSV.as_bytes())).unwrap();
        assert_eq!(corpus.len(), 3);
        assert!(corpus.missing_columns.is_empty());

        let toy_story = &corpus.records[0];
        assert_eq!(toy_story.id, "862");
        assert_eq!(toy_story.overview, "Led by Woody, Andy's toys live happily.");
        assert_eq!(toy_story.genres, vec!["Animation", "Comedy"]);
        assert_eq!(toy_story.collection.as_deref(), Some("Toy Story Collection"));
        assert_eq!(toy_story.budget, Some(30_000_000.0));
        assert_eq!(toy_story.vote_average, Some(7.7));
        assert_eq!(toy_story.release_date.as_deref(), Some("1995-10-30"));

        let jumanji = &corpus.records[1];
        assert_eq!(jumanji.overview, "");
        assert_eq!(jumanji.collection, None);
    }

    #[test]
    fn test_malformed_cells_degrade_to_missing() {
        let corpus = ingest(CsvSource::new(CSV.as_bytes())).unwrap();
        let broken = &corpus.records[2];
        assert!(broken.genres.is_empty());
        assert_eq!(broken.collection, None);
        assert_eq!(broken.budget, None);
        assert_eq!(broken.revenue, None);
        assert_eq!(broken.vote_average, None);
        assert_eq!(broken.release_date, None);
    }

    #[test]
    fn test_short_rows_are_accepted() {
        let csv = "title,overview,genres\nAlien,in space\n";
        let corpus = ingest(CsvSource::new(csv.as_bytes())).unwrap();
        assert_eq!(corpus.records[0].title, "Alien");
        assert!(corpus.records[0].genres.is_empty());
    }

    #[test]
    fn test_missing_title_column() {
        let csv = "name,overview\nAlien,in space\n";
        let result = ingest(CsvSource::new(csv.as_bytes()));
        assert!(matches!(result, Err(IngestionError::MissingTitleColumn)));
    }

    #[test]
    fn test_missing_feature_columns_are_recorded() {
        let csv = "title,overview\nAlien,in space\n";
        let corpus = ingest(CsvSource::new(csv.as_bytes())).unwrap();
        assert_eq!(
            corpus.missing_columns,
            vec!["genres", "belongs_to_collection", "budget", "revenue", "runtime"]
        );
    }

    #[test]
    fn test_unreadable_path() {
        let result = CsvSource::from_path("/definitely/not/here.csv");
        assert!(matches!(result, Err(IngestionError::Io { .. })));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 12.5 "), Some(12.5));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number(""), None);
    }
}
