//! Corpus assembly: spatial/temporal filtering of selected datasets.

use crate::dataset::DatasetHandle;
use crate::error::TrainingResult;
use crate::geo::BoundingBox;
use crate::store::LabelStore;
use crate::window::TimeWindow;
use cropmask_abstraction::Corpus;
use tracing::{debug, info};

/// Auxiliary reanalysis feature source toggled by `skip_era5`.
pub const ERA5_FEATURE_SOURCE: &str = "era5";

/// Filters applied to every dataset of a selection.
#[derive(Debug, Clone, Copy)]
pub struct CorpusFilter {
    pub bbox: BoundingBox,
    pub window: TimeWindow,
    pub skip_era5: bool,
}

/// Load each dataset, keep records inside the box and window, and append them
/// in selection order. Datasets whose footprint or date range cannot overlap
/// are not loaded; they and datasets filtered down to nothing contribute an
/// empty entry.
pub fn assemble_corpus(
    store: &dyn LabelStore,
    datasets: &[&DatasetHandle],
    filter: &CorpusFilter,
) -> TrainingResult<Corpus> {
    let mut corpus = Corpus::new();

    for dataset in datasets {
        let disjoint = !dataset.footprint.intersects(&filter.bbox)
            || !filter.window.overlaps(dataset.start_date, dataset.end_date);
        if disjoint {
            debug!(dataset = %dataset.name, window = %filter.window, "Dataset cannot overlap run extent, skipping load");
            corpus.extend_from(&dataset.name, Vec::new());
            continue;
        }

        let loaded = store.load(dataset)?;
        let total = loaded.len();
        let kept: Vec<_> = loaded
            .into_iter()
            .filter(|r| filter.bbox.contains(r.lat, r.lon) && filter.window.contains(r.date))
            .collect();

        info!(dataset = %dataset.name, kept = kept.len(), total, "Filtered dataset");
        corpus.extend_from(&dataset.name, kept);
    }

    if filter.skip_era5 && corpus.exclude_feature_source(ERA5_FEATURE_SOURCE) {
        debug!("Excluded {} features from corpus", ERA5_FEATURE_SOURCE);
    }

    Ok(corpus)
}
