pub mod encoders;
pub mod similarity;
pub mod sparse;
pub mod stopwords;
pub mod svd;
pub mod text;

use crate::config::FeatureConfig;
use crate::models::MovieRecord;
use encoders::*;
use sparse::CsrMatrix;
use tracing::info;

/// Fit step of an encoder. Fitting captures every learned parameter in the
/// returned value; nothing is re-derived on later transforms.
pub trait FeatureEncoder {
    type Fitted: FittedEncoder;

    fn fit(&self, records: &[MovieRecord]) -> Self::Fitted;

    fn fit_transform(&self, records: &[MovieRecord]) -> (Self::Fitted, CsrMatrix) {
        let fitted = self.fit(records);
        let matrix = fitted.transform(records);
        (fitted, matrix)
    }
}

pub trait FittedEncoder: Send + Sync {
    fn name(&self) -> &'static str;
    fn width(&self) -> usize;
    fn transform(&self, records: &[MovieRecord]) -> CsrMatrix;
}

/// Frozen encoders in block order: genres, overview, numeric, collection.
#[derive(Debug, Clone)]
pub struct FittedEncoders {
    pub genres: FittedGenreEncoder,
    pub overview: FittedOverviewEncoder,
    pub numeric: FittedNumericEncoder,
    pub collection: FittedCollectionEncoder,
}

impl FittedEncoders {
    pub fn blocks(&self) -> [&dyn FittedEncoder; 4] {
        [&self.genres, &self.overview, &self.numeric, &self.collection]
    }

    /// Column width of each block, in block order.
    pub fn widths(&self) -> [(&'static str, usize); 4] {
        self.blocks().map(|block| (block.name(), block.width()))
    }

    /// Encodes records into the combined column layout.
    pub fn transform(&self, records: &[MovieRecord]) -> CsrMatrix {
        let blocks: Vec<CsrMatrix> = self.blocks().iter().map(|b| b.transform(records)).collect();
        let refs: Vec<&CsrMatrix> = blocks.iter().collect();
        CsrMatrix::hstack(&refs)
    }
}

/// Encoders fitted on the corpus together with the combined feature space.
#[derive(Debug, Clone)]
pub struct FeatureSpace {
    pub encoders: FittedEncoders,
    pub genre_block: CsrMatrix,
    pub combined: CsrMatrix,
}

pub fn build_feature_space(records: &[MovieRecord], config: &FeatureConfig) -> FeatureSpace {
    info!("Processing genres...");
    let (genres, genre_block) = GenreEncoder.fit_transform(records);

    info!("Processing collection information...");
    let collection_encoder = CollectionEncoder {
        weight: config.collection_weight,
        include_empty: config.include_empty_collection,
    };
    let (collection, collection_block) = collection_encoder.fit_transform(records);

    info!("Processing textual features...");
    let (overview, overview_block) = OverviewEncoder::default().fit_transform(records);

    info!("Processing numerical features...");
    let (numeric, numeric_block) = NumericEncoder.fit_transform(records);

    info!("Combining features...");
    let combined = CsrMatrix::hstack(&[&genre_block, &overview_block, &numeric_block, &collection_block]);

    let encoders = FittedEncoders {
        genres,
        overview,
        numeric,
        collection,
    };
    info!(
        "Feature space: {} rows x {} columns {:?}, {} non-zeros",
        combined.n_rows(),
        combined.n_cols(),
        encoders.widths(),
        combined.nnz()
    );

    FeatureSpace {
        encoders,
        genre_block,
        combined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<MovieRecord> {
        vec![
            MovieRecord::new("1", "A")
                .with_genres(["Action", "Drama"])
                .with_overview("a hero falls")
                .with_collection("Saga"),
            MovieRecord::new("2", "B").with_genres(["Action"]).with_overview("a hero rises"),
            MovieRecord::new("3", "C").with_genres(["Comedy"]).with_overview("a clown falls"),
        ]
    }

    #[test]
    fn test_combined_width_is_sum_of_blocks() {
        let records = corpus();
        let space = build_feature_space(&records, &FeatureConfig::default());
        let widths: usize = space.encoders.widths().iter().map(|(_, w)| w).sum();
        assert_eq!(space.combined.n_cols(), widths);
        assert_eq!(space.combined.n_rows(), records.len());
        assert_eq!(space.encoders.widths()[0], ("genres", 3));
        assert_eq!(space.encoders.widths()[1], ("overview", 4));
        assert_eq!(space.encoders.widths()[2], ("numeric", 3));
        assert_eq!(space.encoders.widths()[3], ("collection", 1));
    }

    #[test]
    fn test_transform_reproduces_fit_layout() {
        let records = corpus();
        let space = build_feature_space(&records, &FeatureConfig::default());
        assert_eq!(space.encoders.transform(&records), space.combined);
    }
}
