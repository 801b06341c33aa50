//! Multi-source loading with all-or-nothing semantics.
//!
//! The requested sources are read and normalized concurrently. The load waits
//! for all of them; if any one fails, the whole load fails with that one error
//! and none of the sources that did parse are exposed.

use std::collections::BTreeSet;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::data::source::SourceReader;
use crate::domain::{
    AgeGroupRecord, CumulativeCasesRecord, DeathRecord, InfectionRecord, LoadDiagnostics, Series, SourceId,
};
use crate::error::{LoadError, SourceError};
use crate::io::ingest::parse_series;

/// One normalized source, tagged by record type.
#[derive(Debug, Clone)]
pub enum LoadedSeries {
    Infection(Series<InfectionRecord>),
    Deaths(Series<DeathRecord>),
    CumulativeCases(Series<CumulativeCasesRecord>),
    AgeGroups(Series<AgeGroupRecord>),
}

impl LoadedSeries {
    pub fn source(&self) -> SourceId {
        match self {
            LoadedSeries::Infection(s) => s.source(),
            LoadedSeries::Deaths(s) => s.source(),
            LoadedSeries::CumulativeCases(s) => s.source(),
            LoadedSeries::AgeGroups(s) => s.source(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            LoadedSeries::Infection(s) => s.len(),
            LoadedSeries::Deaths(s) => s.len(),
            LoadedSeries::CumulativeCases(s) => s.len(),
            LoadedSeries::AgeGroups(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn diagnostics(&self) -> LoadDiagnostics {
        match self {
            LoadedSeries::Infection(s) => *s.diagnostics(),
            LoadedSeries::Deaths(s) => *s.diagnostics(),
            LoadedSeries::CumulativeCases(s) => *s.diagnostics(),
            LoadedSeries::AgeGroups(s) => *s.diagnostics(),
        }
    }
}

/// The finished, immutable result of a successful load.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    infection: Option<Series<InfectionRecord>>,
    deaths: Option<Series<DeathRecord>>,
    deaths_cumulative: Option<Series<DeathRecord>>,
    cumulative_cases: Option<Series<CumulativeCasesRecord>>,
    age_groups: Option<Series<AgeGroupRecord>>,
}

impl Dataset {
    fn from_loaded(loaded: Vec<LoadedSeries>) -> Self {
        let mut dataset = Dataset::default();
        for series in loaded {
            match series {
                LoadedSeries::Infection(s) => dataset.infection = Some(s),
                LoadedSeries::Deaths(s) if s.source() == SourceId::DeathsCumulative => {
                    dataset.deaths_cumulative = Some(s)
                }
                LoadedSeries::Deaths(s) => dataset.deaths = Some(s),
                LoadedSeries::CumulativeCases(s) => dataset.cumulative_cases = Some(s),
                LoadedSeries::AgeGroups(s) => dataset.age_groups = Some(s),
            }
        }
        dataset
    }

    pub fn infection(&self) -> Option<&Series<InfectionRecord>> {
        self.infection.as_ref()
    }

    /// Daily death increments (`SourceId::Deaths`).
    pub fn deaths(&self) -> Option<&Series<DeathRecord>> {
        self.deaths.as_ref()
    }

    /// Publisher-accumulated deaths (`SourceId::DeathsCumulative`).
    pub fn deaths_cumulative(&self) -> Option<&Series<DeathRecord>> {
        self.deaths_cumulative.as_ref()
    }

    /// Whichever death source was loaded, preferring the accumulated one.
    pub fn any_deaths(&self) -> Option<&Series<DeathRecord>> {
        self.deaths_cumulative.as_ref().or(self.deaths.as_ref())
    }

    pub fn cumulative_cases(&self) -> Option<&Series<CumulativeCasesRecord>> {
        self.cumulative_cases.as_ref()
    }

    pub fn age_groups(&self) -> Option<&Series<AgeGroupRecord>> {
        self.age_groups.as_ref()
    }

    /// `(source, records, diagnostics)` for every loaded source, in `SourceId` order.
    pub fn summary(&self) -> Vec<(SourceId, usize, LoadDiagnostics)> {
        let mut out = Vec::new();
        if let Some(s) = &self.infection {
            out.push((s.source(), s.len(), *s.diagnostics()));
        }
        if let Some(s) = &self.deaths {
            out.push((s.source(), s.len(), *s.diagnostics()));
        }
        if let Some(s) = &self.deaths_cumulative {
            out.push((s.source(), s.len(), *s.diagnostics()));
        }
        if let Some(s) = &self.cumulative_cases {
            out.push((s.source(), s.len(), *s.diagnostics()));
        }
        if let Some(s) = &self.age_groups {
            out.push((s.source(), s.len(), *s.diagnostics()));
        }
        out
    }
}

/// Read and normalize one source.
pub fn load_source(reader: &dyn SourceReader, source_id: SourceId) -> Result<LoadedSeries, LoadError> {
    let bytes = reader
        .read(source_id)
        .map_err(|error| LoadError::Source { source_id, error })?;
    let text = String::from_utf8(bytes).map_err(|e| LoadError::Source {
        source_id,
        error: SourceError::Utf8(e),
    })?;

    let loaded = match source_id {
        SourceId::InfectionTrend => LoadedSeries::Infection(parse_series(source_id, &text)?),
        SourceId::Deaths | SourceId::DeathsCumulative => LoadedSeries::Deaths(parse_series(source_id, &text)?),
        SourceId::CumulativeCases => LoadedSeries::CumulativeCases(parse_series(source_id, &text)?),
        SourceId::AgeGroups => LoadedSeries::AgeGroups(parse_series(source_id, &text)?),
    };
    if loaded.is_empty() {
        warn!(source = %source_id, "source has no usable rows");
    } else {
        debug!(source = %source_id, records = loaded.len(), "loaded source");
    }
    Ok(loaded)
}

/// Load every requested source concurrently; fail as a whole on any error.
///
/// Duplicate ids in `sources` are loaded once.
pub fn load_dataset(reader: &dyn SourceReader, sources: &[SourceId]) -> Result<Dataset, LoadError> {
    let unique: Vec<SourceId> = sources.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
    info!(from = %reader.describe(), sources = unique.len(), "loading sources");

    // Every source runs to completion; the first error (in source order) wins.
    let results: Vec<Result<LoadedSeries, LoadError>> =
        unique.par_iter().map(|&id| load_source(reader, id)).collect();

    let mut loaded = Vec::with_capacity(results.len());
    for result in results {
        loaded.push(result?);
    }

    info!(sources = loaded.len(), "load complete");
    Ok(Dataset::from_loaded(loaded))
}

/// Load pipeline state.
///
/// `Unloaded → Loading → {Loaded | Failed}`. `Unloaded` only precedes the
/// first attempt. Both outcomes are terminal for that attempt; the next
/// `Loader::begin` discards them and moves back to `Loading`.
#[derive(Debug, Clone, Default)]
pub enum LoadState {
    #[default]
    Unloaded,
    Loading,
    Loaded(Dataset),
    Failed(String),
}

impl LoadState {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadState::Loaded(_))
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        match self {
            LoadState::Loaded(dataset) => Some(dataset),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Owns the single load-state record and drives its transitions.
#[derive(Debug, Default)]
pub struct Loader {
    state: LoadState,
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Start a new attempt: any previous outcome is discarded and the state
    /// becomes `Loading`.
    pub fn begin(&mut self) -> &LoadState {
        self.state = LoadState::Loading;
        &self.state
    }

    /// Record the outcome of the attempt started by `begin`.
    pub fn finish(&mut self, result: Result<Dataset, LoadError>) -> &LoadState {
        self.state = match result {
            Ok(dataset) => LoadState::Loaded(dataset),
            Err(e) => {
                warn!(source = %e.source_id(), "load failed: {e}");
                LoadState::Failed(e.to_string())
            }
        };
        &self.state
    }

    /// Run one blocking load attempt and return the terminal state it reached.
    pub fn load(&mut self, reader: &dyn SourceReader, sources: &[SourceId]) -> &LoadState {
        self.begin();
        let result = load_dataset(reader, sources);
        self.finish(result)
    }

    /// Consume the loader, yielding the dataset if the last attempt succeeded.
    pub fn into_dataset(self) -> Option<Dataset> {
        match self.state {
            LoadState::Loaded(dataset) => Some(dataset),
            _ => None,
        }
    }
}
