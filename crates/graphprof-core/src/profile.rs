//! Profile orchestration: the two-phase compute → post-process pipeline.
//!
//! Phase 1 runs every enabled measure's algorithm sequentially — algorithms
//! are not assumed thread-safe relative to each other, and the graph handle
//! stays read-only throughout. Phase 2 fans statistics, correlations and
//! plot rendering out onto the worker pool; sub-phases are separated by
//! full drains because each consumes the previous one's results. A failure
//! anywhere inside the pipeline drops that one measure or result and never
//! aborts the profile.

use crate::config::{Config, CorrelationKind, Preset, PropertyKey};
use crate::correlation::{self, CorrelationEntry, CorrelationMatrix};
use crate::graph::Graph;
use crate::plot::{MeasureView, PlotData, PlotRenderer, Style, SvgRenderer, Theme};
use crate::pool::{JobKind, WorkerPool};
use crate::registry::{Category, MeasureKey, ALL_MEASURES};
use crate::report::{self, MeasureSection, OutputKind, ReportInputs};
use crate::stat::{self, Stats};
use crate::algo::{self, Algorithm};
use crate::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Immutable per-profile settings, passed in explicitly instead of living
/// in shared global state.
#[derive(Debug, Clone)]
pub struct ProfileSettings {
    parallelism: usize,
    render_scatter: bool,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            parallelism: crate::pool::default_workers(),
            render_scatter: false,
        }
    }
}

impl ProfileSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of post-processing workers. Fails for zero.
    pub fn with_parallelism(mut self, parallelism: usize) -> Result<Self> {
        if parallelism < 1 {
            return Err(Error::InvalidParallelism(parallelism));
        }
        self.parallelism = parallelism;
        Ok(self)
    }

    /// Also render scatter plots for every correlation pair.
    pub fn with_scatter_plots(mut self, enabled: bool) -> Self {
        self.render_scatter = enabled;
        self
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }
}

/// Wall-clock timings for one measure, per pipeline step.
#[derive(Debug, Clone, Copy, Default)]
pub struct Timings {
    pub run: Duration,
    pub sort: Duration,
    pub rank: Duration,
    pub assortativity: Duration,
    pub centralization: Duration,
}

/// One computed measure owned by a profile.
#[derive(Debug, Clone)]
pub struct Measure {
    pub(crate) key: MeasureKey,
    pub(crate) sample: Vec<f64>,
    pub(crate) sorted: Vec<f64>,
    pub(crate) ranks: Vec<f64>,
    pub(crate) assortativity: f64,
    pub(crate) centralization: f64,
    pub(crate) stats: Option<Stats>,
    pub(crate) images: [Option<String>; 3],
    pub(crate) timings: Timings,
}

impl Measure {
    pub fn key(&self) -> MeasureKey {
        self.key
    }

    pub fn sample(&self) -> &[f64] {
        &self.sample
    }

    pub fn assortativity(&self) -> f64 {
        self.assortativity
    }

    pub fn centralization(&self) -> f64 {
        self.centralization
    }
}

/// Graph-level properties computed for every profile. Gated estimates are
/// `None` when disabled or when their estimator failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Properties {
    pub nodes: usize,
    pub edges: usize,
    pub density: f64,
    pub directed: bool,
    pub weighted: bool,
    pub self_loops: usize,
    pub connected_components: Option<usize>,
    pub diameter_range: Option<(usize, usize)>,
    pub effective_diameter: Option<f64>,
}

/// Receives an assembled HTML report for interactive display.
pub trait DisplaySink {
    /// Whether the sink is attached to an interactive environment.
    fn interactive(&self) -> bool {
        true
    }

    fn display_html(&mut self, html: &str) -> Result<()>;
}

/// Results travelling back from the worker pool.
enum JobOutput {
    Stats(MeasureKey, Stats),
    Correlation {
        category: Category,
        a: MeasureKey,
        b: MeasureKey,
        values: BTreeMap<CorrelationKind, f64>,
    },
    Image {
        key: MeasureKey,
        slot: usize,
        svg: String,
    },
    ScatterImage {
        category: Category,
        a: MeasureKey,
        b: MeasureKey,
        svg: String,
    },
}

/// An automated profile of one graph.
pub struct Profile {
    config: Config,
    settings: ProfileSettings,
    graph: Arc<Graph>,
    token: String,
    measures: Vec<Measure>,
    correlations: CorrelationMatrix,
    properties: Properties,
    page_count: usize,
}

impl Profile {
    /// Profile `graph` with a named preset.
    pub fn create(graph: Graph, preset: Preset) -> Result<Self> {
        Self::create_with(graph, Config::from_preset(preset), ProfileSettings::default())
    }

    /// Profile `graph` with an explicit configuration.
    pub fn create_with(graph: Graph, config: Config, settings: ProfileSettings) -> Result<Self> {
        let graph = Arc::new(graph);
        let token = session_token();
        info!(token = %token, nodes = graph.node_count(), "profiling graph");

        let mut profile = Profile {
            properties: Properties {
                nodes: graph.node_count(),
                edges: graph.edge_count(),
                density: graph.density(),
                directed: graph.is_directed(),
                weighted: graph.is_weighted(),
                self_loops: graph.self_loop_count(),
                connected_components: None,
                diameter_range: None,
                effective_diameter: None,
            },
            config,
            settings,
            graph,
            token,
            measures: Vec::new(),
            correlations: CorrelationMatrix::new(),
            page_count: 0,
        };

        profile.load_measures();
        profile.load_properties();
        profile.post_process();
        Ok(profile)
    }

    /// Phase 1: run every enabled measure's algorithm, in registration
    /// order, dropping measures whose construction or execution fails.
    fn load_measures(&mut self) {
        for key in ALL_MEASURES {
            if !self.config.measure(key) {
                continue;
            }
            let spec = key.spec();

            let mut instance = match key.construct(&self.graph) {
                Ok(instance) => instance,
                Err(e) => {
                    error!(measure = %key, error = %e, "construction failed, measure removed");
                    continue;
                }
            };

            let started = Instant::now();
            if let Err(e) = instance.run() {
                error!(measure = %key, error = %e, "run failed, measure removed");
                continue;
            }
            let sample = match key.extract(instance.as_ref()) {
                Ok(sample) => sample,
                Err(e) => {
                    error!(measure = %key, error = %e, "extraction failed, measure removed");
                    continue;
                }
            };
            let run = started.elapsed();
            debug!(measure = %key, elapsed = ?run, "measure computed");

            let started = Instant::now();
            let mut sorted = sample.clone();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let sort = started.elapsed();

            let started = Instant::now();
            let ranks = stat::ranked(&sample);
            let rank = started.elapsed();

            // Assortativity and centralization only apply to node scores;
            // they depend on the frozen sample and the graph alone.
            let (assortativity, centralization, t_assort, t_central) =
                if spec.category == Category::NodeCentrality {
                    let started = Instant::now();
                    let assort = stat::assortativity(&self.graph, &sample);
                    let t_assort = started.elapsed();

                    let started = Instant::now();
                    let central = instance.centralization().unwrap_or(f64::NAN);
                    let t_central = started.elapsed();
                    (assort, central, t_assort, t_central)
                } else {
                    (f64::NAN, f64::NAN, Duration::ZERO, Duration::ZERO)
                };

            self.measures.push(Measure {
                key,
                sample,
                sorted,
                ranks,
                assortativity,
                centralization,
                stats: None,
                images: [None, None, None],
                timings: Timings {
                    run,
                    sort,
                    rank,
                    assortativity: t_assort,
                    centralization: t_central,
                },
            });
        }
    }

    /// Graph-level properties. Diameter estimates are gated by config and
    /// fall back to "not available" on failure instead of aborting.
    fn load_properties(&mut self) {
        let mut components = algo::ConnectedComponents::new(Arc::clone(&self.graph));
        self.properties.connected_components = match components.run() {
            Ok(()) => Some(components.count()),
            Err(e) => {
                error!(error = %e, "connected components unavailable");
                None
            }
        };

        if self.config.property(PropertyKey::Diameter) {
            self.properties.diameter_range = match algo::diameter_range(&self.graph) {
                Ok(range) => Some(range),
                Err(e) => {
                    error!(error = %e, "diameter estimate unavailable");
                    None
                }
            };
        }
        if self.config.property(PropertyKey::EffectiveDiameter) {
            self.properties.effective_diameter = match algo::effective_diameter(&self.graph) {
                Ok(value) => Some(value),
                Err(e) => {
                    error!(error = %e, "effective diameter estimate unavailable");
                    None
                }
            };
        }
    }

    /// Phase 2: statistics, then correlations, each sub-phase fully drained
    /// before the next starts.
    fn post_process(&mut self) {
        let pool: WorkerPool<JobOutput> = WorkerPool::new(self.settings.parallelism);

        for measure in &self.measures {
            let key = measure.key;
            let is_partition = key.spec().category == Category::Partition;
            let sample = measure.sample.clone();
            let sorted = measure.sorted.clone();
            let ranks = measure.ranks.clone();
            pool.submit(JobKind::Stat, key.name(), move || {
                Ok(JobOutput::Stats(
                    key,
                    stat::compute(&sample, &sorted, &ranks, is_partition),
                ))
            });
        }
        self.drain(&pool);

        let kinds = self.config.enabled_correlations();
        if !kinds.is_empty() {
            for category in [Category::NodeCentrality, Category::Partition] {
                let eligible: Vec<usize> = (0..self.measures.len())
                    .filter(|&i| {
                        let spec = self.measures[i].key.spec();
                        spec.category == category && spec.correlate
                    })
                    .collect();
                for (position, &i) in eligible.iter().enumerate() {
                    let a = self.measures[i].key;
                    self.correlations.insert_self_pair(category, a, &kinds);
                    // One job per unordered pair: only earlier measures.
                    for &j in &eligible[..position] {
                        let b = self.measures[j].key;
                        let kinds = kinds.clone();
                        let sample_a = self.measures[i].sample.clone();
                        let ranks_a = self.measures[i].ranks.clone();
                        let sample_b = self.measures[j].sample.clone();
                        let ranks_b = self.measures[j].ranks.clone();
                        pool.submit(
                            JobKind::Correlation,
                            format!("{a} <-> {b}"),
                            move || {
                                let mut values = BTreeMap::new();
                                for kind in kinds {
                                    values.insert(
                                        kind,
                                        correlation::coefficient(
                                            kind, &sample_a, &ranks_a, &sample_b, &ranks_b,
                                        ),
                                    );
                                }
                                Ok(JobOutput::Correlation {
                                    category,
                                    a,
                                    b,
                                    values,
                                })
                            },
                        );
                    }
                }
            }
            self.drain(&pool);
        }

        pool.join();
    }

    /// Block until every outstanding pool job has been collected, applying
    /// successful results and logging failed ones.
    fn drain(&mut self, pool: &WorkerPool<JobOutput>) {
        while pool.pending() > 0 {
            let Some(done) = pool.poll() else { break };
            match done.result {
                Ok(JobOutput::Stats(key, stats)) => {
                    debug!(measure = %key, "statistics ready");
                    if let Some(measure) = self.measures.iter_mut().find(|m| m.key == key) {
                        measure.stats = Some(stats);
                    }
                }
                Ok(JobOutput::Correlation {
                    category,
                    a,
                    b,
                    values,
                }) => {
                    debug!(pair = %done.tag, "correlation ready");
                    self.correlations.insert(
                        category,
                        a,
                        b,
                        CorrelationEntry {
                            values,
                            image: None,
                        },
                    );
                }
                Ok(JobOutput::Image { key, slot, svg }) => {
                    if let Some(measure) = self.measures.iter_mut().find(|m| m.key == key) {
                        if slot < measure.images.len() {
                            measure.images[slot] = Some(svg);
                        }
                    }
                }
                Ok(JobOutput::ScatterImage {
                    category,
                    a,
                    b,
                    svg,
                }) => {
                    if let Some(entry) = self.correlations.get_mut(category, a, b) {
                        entry.image = Some(svg);
                    }
                }
                Err(e) => {
                    error!(job = %done.tag, error = %e, "post-processing job failed");
                }
            }
        }
    }

    fn find(&self, key: MeasureKey) -> Result<&Measure> {
        self.measures
            .iter()
            .find(|m| m.key == key)
            .ok_or_else(|| Error::MeasureNotFound(key.name().to_string()))
    }

    /// Statistics bundle for a computed measure.
    pub fn stat(&self, key: MeasureKey) -> Result<&Stats> {
        self.find(key)?.stats.as_ref().ok_or_else(|| {
            Error::PostProcessing(format!("statistics unavailable for {key}"))
        })
    }

    /// Category of a computed measure.
    pub fn category(&self, key: MeasureKey) -> Result<Category> {
        Ok(self.find(key)?.key.spec().category)
    }

    /// Per-step timings of a computed measure.
    pub fn elapsed(&self, key: MeasureKey) -> Result<&Timings> {
        Ok(&self.find(key)?.timings)
    }

    /// Keys of the measures that survived phase 1, in registration order.
    pub fn active_measures(&self) -> Vec<MeasureKey> {
        self.measures.iter().map(|m| m.key).collect()
    }

    pub fn measure(&self, key: MeasureKey) -> Result<&Measure> {
        self.find(key)
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Correlation value for a measure pair; lookups are symmetric.
    pub fn correlation(
        &self,
        kind: CorrelationKind,
        a: MeasureKey,
        b: MeasureKey,
    ) -> Option<f64> {
        let category = a.spec().category;
        self.correlations
            .get(category, a, b)
            .and_then(|entry| entry.values.get(&kind).copied())
    }

    pub fn correlations(&self) -> &CorrelationMatrix {
        &self.correlations
    }

    /// Render every plot view into the measure image slots (and scatter
    /// images into correlation entries when enabled). `parallel` routes
    /// rendering through the worker pool; otherwise plots render inline.
    fn render_plots(&mut self, theme: Theme, parallel: bool) {
        let renderer = SvgRenderer::default();
        let mut requests: Vec<(MeasureKey, usize, PlotData)> = Vec::new();
        for measure in &self.measures {
            let spec = measure.key.spec();
            requests.push((
                measure.key,
                MeasureView::Distribution.slot(),
                PlotData::Histogram {
                    values: measure.sample.clone(),
                    label: spec.axis_label.to_string(),
                    title: spec.display_name.to_string(),
                },
            ));
            requests.push((
                measure.key,
                MeasureView::Ranked.slot(),
                PlotData::Ranked {
                    sorted: measure.sorted.clone(),
                    label: spec.axis_label.to_string(),
                    title: format!("{} (ranked)", spec.display_name),
                },
            ));
            if spec.category == Category::Partition {
                requests.push((
                    measure.key,
                    MeasureView::Pie.slot(),
                    PlotData::Pie {
                        sizes: measure.sample.clone(),
                        title: spec.display_name.to_string(),
                    },
                ));
            }
        }

        let mut scatter_requests: Vec<(Category, MeasureKey, MeasureKey, PlotData)> = Vec::new();
        if self.settings.render_scatter {
            for (i, a) in self.measures.iter().enumerate() {
                let spec_a = a.key.spec();
                if !spec_a.correlate {
                    continue;
                }
                for b in self.measures.iter().take(i) {
                    let spec_b = b.key.spec();
                    if spec_b.category != spec_a.category || !spec_b.correlate {
                        continue;
                    }
                    scatter_requests.push((
                        spec_a.category,
                        a.key,
                        b.key,
                        PlotData::Scatter {
                            xs: a.sample.clone(),
                            ys: b.sample.clone(),
                            label_x: spec_a.display_name.to_string(),
                            label_y: spec_b.display_name.to_string(),
                            title: format!("{} vs {}", spec_a.display_name, spec_b.display_name),
                        },
                    ));
                }
            }
        }

        if parallel {
            let pool: WorkerPool<JobOutput> = WorkerPool::new(self.settings.parallelism);
            for (key, slot, data) in requests {
                pool.submit(JobKind::Plot, key.name(), move || {
                    let svg = renderer.render(&data, &theme)?;
                    Ok(JobOutput::Image { key, slot, svg })
                });
            }
            for (category, a, b, data) in scatter_requests {
                pool.submit(JobKind::Plot, format!("{a} <-> {b}"), move || {
                    let svg = renderer.render(&data, &theme)?;
                    Ok(JobOutput::ScatterImage {
                        category,
                        a,
                        b,
                        svg,
                    })
                });
            }
            self.drain(&pool);
            pool.join();
        } else {
            for (key, slot, data) in requests {
                match renderer.render(&data, &theme) {
                    Ok(svg) => {
                        if let Some(measure) = self.measures.iter_mut().find(|m| m.key == key) {
                            measure.images[slot] = Some(svg);
                        }
                    }
                    Err(e) => error!(measure = %key, error = %e, "plot rendering failed"),
                }
            }
            for (category, a, b, data) in scatter_requests {
                match renderer.render(&data, &theme) {
                    Ok(svg) => {
                        if let Some(entry) = self.correlations.get_mut(category, a, b) {
                            entry.image = Some(svg);
                        }
                    }
                    Err(e) => error!(pair = %format!("{a} <-> {b}"), error = %e, "scatter rendering failed"),
                }
            }
        }
    }

    /// Render plots and assemble the document for the given page index.
    fn format_document(
        &mut self,
        kind: OutputKind,
        style: Style,
        color: (f64, f64, f64),
        parallel: bool,
        page_index: usize,
    ) -> String {
        self.render_plots(Theme::new(style, color), parallel);

        let measures: Vec<MeasureSection<'_>> = self
            .measures
            .iter()
            .map(|m| {
                let spec = m.key.spec();
                MeasureSection {
                    key: m.key,
                    name: spec.display_name,
                    category: spec.category,
                    algorithm: spec.algorithm_name,
                    stats: m.stats.as_ref().unwrap_or(&EMPTY_STATS),
                    assortativity: m.assortativity,
                    centralization: m.centralization,
                    images: &m.images,
                }
            })
            .collect();
        let kinds = self.config.enabled_correlations();
        let inputs = ReportInputs {
            token: &self.token,
            page_index,
            properties: &self.properties,
            measures,
            enabled_correlations: &kinds,
            correlations: &self.correlations,
        };
        report::render(kind, &inputs)
    }

    /// Write the assembled report to disk.
    ///
    /// HTML goes to `directory/filename.html`; LaTeX creates
    /// `directory/filename/` containing `filename.tex` plus an `assets/`
    /// directory with the rendered images.
    pub fn output(
        &mut self,
        kind: OutputKind,
        directory: impl AsRef<Path>,
        filename: &str,
        style: Style,
        color: (f64, f64, f64),
        parallel: bool,
    ) -> Result<()> {
        let directory = directory.as_ref();
        let document = self.format_document(kind, style, color, parallel, 0);

        match kind {
            OutputKind::Html => {
                fs::create_dir_all(directory)?;
                let path = directory.join(format!("{filename}.html"));
                fs::write(&path, document)?;
                info!(path = %path.display(), "report written");
            }
            OutputKind::Latex => {
                let bundle = directory.join(filename);
                let assets = bundle.join("assets");
                fs::create_dir_all(&assets)?;
                for measure in &self.measures {
                    for (slot, image) in measure.images.iter().enumerate() {
                        if let Some(svg) = image {
                            fs::write(assets.join(format!("{}_{slot}.svg", measure.key)), svg)?;
                        }
                    }
                }
                let path = bundle.join(format!("{filename}.tex"));
                fs::write(&path, document)?;
                info!(path = %path.display(), "report bundle written");
            }
        }
        Ok(())
    }

    /// Route the assembled HTML report to an interactive display sink.
    ///
    /// Fails with a missing-dependency error when no sink is supplied and
    /// with an unsupported-environment error when the sink is not attached
    /// to an interactive environment.
    pub fn show(
        &mut self,
        sink: Option<&mut dyn DisplaySink>,
        style: Style,
        color: (f64, f64, f64),
        parallel: bool,
    ) -> Result<()> {
        let Some(sink) = sink else {
            return Err(Error::MissingDependency("display sink".to_string()));
        };
        if !sink.interactive() {
            return Err(Error::UnsupportedEnvironment(
                "display requires an interactive environment".to_string(),
            ));
        }
        let page_index = self.page_count;
        let document = self.format_document(OutputKind::Html, style, color, parallel, page_index);
        sink.display_html(&document)?;
        self.page_count += 1;
        Ok(())
    }
}

static EMPTY_STATS: Stats = Stats {
    count: 0,
    min: f64::NAN,
    max: f64::NAN,
    mean: f64::NAN,
    median: f64::NAN,
    variance: f64::NAN,
    stddev: f64::NAN,
    quartiles: None,
    deciles: None,
    skewness: None,
    kurtosis: None,
};

fn session_token() -> String {
    let mut rng = rand::thread_rng();
    (0..16)
        .map(|_| char::from_digit(rng.gen_range(0..16u32), 16).expect("hex digit"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_reject_zero_parallelism() {
        let err = ProfileSettings::new().with_parallelism(0).unwrap_err();
        assert!(matches!(err, Error::InvalidParallelism(0)));
        assert!(ProfileSettings::new().with_parallelism(3).is_ok());
    }

    #[test]
    fn session_tokens_are_hex_and_distinct() {
        let a = session_token();
        let b = session_token();
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b, "tokens scope independent reports");
    }
}
