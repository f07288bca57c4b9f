//! Report assembly.
//!
//! The renderer receives explicit named-field structures — it declares
//! exactly which fields each template consumes — and produces a complete
//! HTML document or a LaTeX bundle body. Nothing in here computes; it only
//! formats what the orchestrator collected.

use crate::config::CorrelationKind;
use crate::correlation::CorrelationMatrix;
use crate::profile::Properties;
use crate::registry::{Category, MeasureKey};
use crate::stat::Stats;
use crate::{Error, Result};
use std::fmt::Write as _;
use std::str::FromStr;
use tracing::warn;

/// Report document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Html,
    Latex,
}

impl OutputKind {
    pub const SUPPORTED: &'static str = "HTML, LaTeX";

    pub fn extension(self) -> &'static str {
        match self {
            OutputKind::Html => "html",
            OutputKind::Latex => "tex",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            OutputKind::Html => "HTML",
            OutputKind::Latex => "LaTeX",
        }
    }
}

impl FromStr for OutputKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "HTML" => Ok(OutputKind::Html),
            "LaTeX" => Ok(OutputKind::Latex),
            other => Err(Error::UnsupportedOutput {
                given: other.to_string(),
                supported: Self::SUPPORTED.to_string(),
            }),
        }
    }
}

/// Human-readable description per measure, looked up at render time.
pub fn description(key: MeasureKey) -> Option<&'static str> {
    match key {
        MeasureKey::Degree => Some(
            "The degree of a node is the number of edges incident to it. \
             Degree centrality ranks nodes by how many direct connections they have.",
        ),
        MeasureKey::CoreDecomposition => Some(
            "The k-core decomposition assigns each node the largest k such that \
             the node belongs to a subgraph in which every node has at least k neighbors.",
        ),
        MeasureKey::ClusteringCoefficient => Some(
            "The local clustering coefficient measures how close a node's \
             neighborhood is to a clique: the fraction of neighbor pairs that are connected.",
        ),
        MeasureKey::PageRank => Some(
            "PageRank scores nodes by the stationary distribution of a random \
             surfer that follows edges and occasionally teleports.",
        ),
        MeasureKey::Katz => Some(
            "Katz centrality counts paths arriving at a node, attenuating longer \
             paths geometrically, so even peripheral nodes receive a baseline score.",
        ),
        MeasureKey::Betweenness => Some(
            "Betweenness measures how often a node lies on shortest paths between \
             other nodes; estimated here from a sample of source nodes.",
        ),
        MeasureKey::Closeness => Some(
            "Closeness scores nodes by the inverse of their average shortest-path \
             distance to the rest of the graph; estimated from sampled pivots.",
        ),
        MeasureKey::Communities => Some(
            "A community partition groups nodes that are densely connected \
             internally and sparsely connected to the rest of the graph.",
        ),
        MeasureKey::ConnectedComponents => Some(
            "Connected components partition the graph into maximal sets of \
             mutually reachable nodes.",
        ),
        MeasureKey::CoreShells => Some(
            "The shells of the k-core decomposition partition nodes by their \
             core number.",
        ),
        MeasureKey::KPath => None,
    }
}

/// Everything a per-measure section embeds.
pub struct MeasureSection<'a> {
    pub key: MeasureKey,
    pub name: &'a str,
    pub category: Category,
    pub algorithm: &'a str,
    pub stats: &'a Stats,
    pub assortativity: f64,
    pub centralization: f64,
    /// Rendered images by view slot (distribution, ranked, pie).
    pub images: &'a [Option<String>; 3],
}

/// Everything the profile-level wrapper embeds.
pub struct ReportInputs<'a> {
    pub token: &'a str,
    pub page_index: usize,
    pub properties: &'a Properties,
    /// Measure sections in registration order.
    pub measures: Vec<MeasureSection<'a>>,
    pub enabled_correlations: &'a [CorrelationKind],
    pub correlations: &'a CorrelationMatrix,
}

fn fmt_value(v: f64) -> String {
    if v.is_nan() {
        "N/A".to_string()
    } else {
        format!("{v:.4}")
    }
}

fn fmt_count(v: Option<usize>) -> String {
    v.map_or_else(|| "N/A".to_string(), |c| c.to_string())
}

fn latex_escape(s: &str) -> String {
    s.replace('\\', "\\textbackslash{}")
        .replace('&', "\\&")
        .replace('%', "\\%")
        .replace('#', "\\#")
        .replace('_', "\\_")
}

/// Measures of `category` that participate in correlation, in section order.
fn eligible<'a>(inputs: &'a ReportInputs<'_>, category: Category) -> Vec<&'a MeasureSection<'a>> {
    inputs
        .measures
        .iter()
        .filter(|m| m.category == category && m.key.spec().correlate)
        .collect()
}

fn resolve_description(key: MeasureKey) -> &'static str {
    description(key).unwrap_or_else(|| {
        warn!(measure = %key, "no description available");
        "N/A"
    })
}

/// Render the full report document.
pub fn render(kind: OutputKind, inputs: &ReportInputs<'_>) -> String {
    match kind {
        OutputKind::Html => render_html(inputs),
        OutputKind::Latex => render_latex(inputs),
    }
}

// HTML

const HTML_CSS: &str = r#"
body { font-family: sans-serif; margin: 2em; }
h2 { border-bottom: 1px solid #888; }
table.stats td { padding: 0.15em 0.8em; }
.Measure { margin: 1.5em 0; padding: 0.5em; border: 1px solid #ddd; }
.HeatTable { margin: 1em 0; }
.HeatCell { display: inline-block; width: 3.2em; text-align: center; padding: 0.3em 0; color: #fff; }
.HeatCellName { display: inline-block; padding-left: 0.5em; }
.Thumbnail_Overview { display: inline-block; margin: 0.3em; }
.Description { font-style: italic; }
"#;

fn heat_color(value: f64) -> String {
    // Positive correlations in red, negative in blue, magnitude as alpha.
    if value.is_nan() {
        return "background-color: #999".to_string();
    }
    let alpha = value.abs().clamp(0.0, 1.0);
    if value >= 0.0 {
        format!("background-color: rgba(160, 0, 0, {alpha:.3})")
    } else {
        format!("background-color: rgba(0, 0, 160, {alpha:.3})")
    }
}

fn heatmap_html(
    inputs: &ReportInputs<'_>,
    category: Category,
    kind: CorrelationKind,
) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<div class=\"SubCategory HeatTable\" data-title=\"{}\">",
        kind.display_name()
    );
    let rows = eligible(inputs, category);
    // Lower-triangular walk: row i covers pairs with the first i+1 measures.
    for (i, row) in rows.iter().enumerate() {
        for col in rows.iter().take(i + 1) {
            let value = inputs
                .correlations
                .get(category, row.key, col.key)
                .and_then(|entry| entry.values.get(&kind).copied())
                .unwrap_or(f64::NAN);
            let _ = write!(
                out,
                "<div class=\"HeatCell\" title=\"{} - {}\" style=\"{}\">{:+.3}</div>",
                col.name,
                row.name,
                heat_color(value),
                value
            );
        }
        let _ = write!(out, "<div class=\"HeatCellName\">{}</div><br>", row.name);
    }
    out.push_str("</div>");
    out
}

fn measure_html(section: &MeasureSection<'_>, token: &str, page_index: usize) -> String {
    let stats = section.stats;
    let mut images = String::new();
    for image in section.images.iter().flatten() {
        let _ = write!(images, "<div class=\"plot\">{image}</div>");
    }

    let quartiles = stats
        .quartiles
        .map(|q| {
            format!(
                "<tr><td>Quartiles</td><td>{} / {} / {}</td></tr>",
                fmt_value(q[0]),
                fmt_value(q[1]),
                fmt_value(q[2])
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div class="Measure" id="Graphprof_Page_{page_index}_{key}_{token}">
<h3>{name}</h3>
<p class="Description">{description}</p>
{images}
<table class="stats">
<tr><td>Count</td><td>{count}</td></tr>
<tr><td>Min</td><td>{min}</td></tr>
<tr><td>Max</td><td>{max}</td></tr>
<tr><td>Mean</td><td>{mean}</td></tr>
<tr><td>Median</td><td>{median}</td></tr>
<tr><td>Std. Deviation</td><td>{stddev}</td></tr>
{quartiles}
<tr><td>Assortativity</td><td>{assortativity}</td></tr>
<tr><td>Centralization</td><td>{centralization}</td></tr>
<tr><td>Algorithm</td><td>{algorithm}</td></tr>
</table>
</div>"#,
        page_index = page_index,
        key = section.key,
        token = token,
        name = section.name,
        description = resolve_description(section.key),
        images = images,
        count = stats.count,
        min = fmt_value(stats.min),
        max = fmt_value(stats.max),
        mean = fmt_value(stats.mean),
        median = fmt_value(stats.median),
        stddev = fmt_value(stats.stddev),
        quartiles = quartiles,
        assortativity = fmt_value(section.assortativity),
        centralization = fmt_value(section.centralization),
        algorithm = section.algorithm,
    )
}

fn properties_html(p: &Properties) -> String {
    let diameter = p
        .diameter_range
        .map(|(lo, hi)| format!("[{lo}, {hi}]"))
        .unwrap_or_else(|| "N/A".to_string());
    let effective = p
        .effective_diameter
        .map(|d| format!("{d:.2}"))
        .unwrap_or_else(|| "N/A".to_string());
    format!(
        r#"<table class="stats">
<tr><td>Nodes</td><td>{nodes}</td></tr>
<tr><td>Edges</td><td>{edges}</td></tr>
<tr><td>Density</td><td>{density:.6}</td></tr>
<tr><td>Directed</td><td>{directed}</td></tr>
<tr><td>Weighted</td><td>{weighted}</td></tr>
<tr><td>Self Loops</td><td>{self_loops}</td></tr>
<tr><td>Connected Components</td><td>{components}</td></tr>
<tr><td>Diameter Range</td><td>{diameter}</td></tr>
<tr><td>Effective Diameter</td><td>{effective}</td></tr>
</table>"#,
        nodes = p.nodes,
        edges = p.edges,
        density = p.density,
        directed = p.directed,
        weighted = p.weighted,
        self_loops = p.self_loops,
        components = fmt_count(p.connected_components),
        diameter = diameter,
        effective = effective,
    )
}

fn render_html(inputs: &ReportInputs<'_>) -> String {
    let mut body = String::new();
    let _ = write!(
        body,
        "<h1>Network Profile</h1>\n{}",
        properties_html(inputs.properties)
    );

    for category in [Category::NodeCentrality, Category::Partition] {
        let sections: Vec<&MeasureSection<'_>> = inputs
            .measures
            .iter()
            .filter(|m| m.category == category)
            .collect();
        if sections.is_empty() {
            continue;
        }
        let _ = write!(body, "\n<h2>{category}</h2>\n");

        // Overview: ranked-view thumbnails linking to the sections.
        body.push_str("<div class=\"Overview\">");
        for section in &sections {
            if let Some(image) = &section.images[1] {
                let _ = write!(
                    body,
                    "<div class=\"Thumbnail_Overview\" data-title=\"{}\">\
                     <a href=\"#Graphprof_Page_{}_{}_{}\">{}</a></div>",
                    section.name, inputs.page_index, section.key, inputs.token, image
                );
            }
        }
        body.push_str("</div>");

        if category == Category::NodeCentrality && !inputs.enabled_correlations.is_empty() {
            body.push_str("\n<h3>Correlations</h3>\n");
            for &kind in inputs.enabled_correlations {
                body.push_str(&heatmap_html(inputs, category, kind));
            }
            // Scatter images, when rendered, hang off the correlation
            // entries; walk the lower triangle so each pair embeds once.
            for (i, section) in sections.iter().enumerate() {
                if !section.key.spec().correlate {
                    continue;
                }
                for other in sections.iter().take(i) {
                    if let Some(entry) =
                        inputs.correlations.get(category, section.key, other.key)
                    {
                        if let Some(image) = &entry.image {
                            let _ = write!(
                                body,
                                "<div class=\"Thumbnail_ScatterPlot\" data-title=\"{} - {}\">{}</div>",
                                section.name, other.name, image
                            );
                        }
                    }
                }
            }
        }

        for section in &sections {
            body.push_str("\n");
            body.push_str(&measure_html(section, inputs.token, inputs.page_index));
        }
    }

    format!(
        r#"<!DOCTYPE HTML>
<html>
<head>
<meta charset="utf-8">
<style>{HTML_CSS}</style>
</head>
<body>
{body}
</body>
</html>
"#
    )
}

// LaTeX

fn heatmap_latex(
    inputs: &ReportInputs<'_>,
    category: Category,
    kind: CorrelationKind,
) -> String {
    let rows = eligible(inputs, category);
    let n = rows.len();
    let mut out = String::new();
    let _ = writeln!(out, "\\subsection{{{}}}", latex_escape(kind.display_name()));
    let _ = writeln!(out, "\\begin{{tabular}}{{{}}}", "l".repeat(n + 1));
    for (i, row) in rows.iter().enumerate() {
        for col in rows.iter().take(i + 1) {
            let value = inputs
                .correlations
                .get(category, row.key, col.key)
                .and_then(|entry| entry.values.get(&kind).copied())
                .unwrap_or(f64::NAN);
            let color = if value >= 0.0 { "red" } else { "blue" };
            let strength = (value.abs().clamp(0.0, 1.0) * 100.0) as u32;
            let _ = write!(out, "\\cellcolor{{{color}!{strength}}}{value:+.3} & ");
        }
        let _ = writeln!(
            out,
            "\\multicolumn{{{}}}{{l}}{{{}}} \\\\",
            n - i,
            latex_escape(row.name)
        );
    }
    out.push_str("\\end{tabular}\n");
    out
}

fn measure_latex(section: &MeasureSection<'_>, asset_dir: &str) -> String {
    let stats = section.stats;
    let mut images = String::new();
    for (slot, image) in section.images.iter().enumerate() {
        if image.is_some() {
            let _ = writeln!(
                images,
                "\\includegraphics[width=0.5\\textwidth]{{{asset_dir}/{}_{slot}.svg}}",
                section.key
            );
        }
    }
    format!(
        r#"\subsection{{{name}}}
{description}

{images}
\begin{{tabular}}{{ll}}
Count & {count} \\
Min & {min} \\
Max & {max} \\
Mean & {mean} \\
Median & {median} \\
Std. Deviation & {stddev} \\
Assortativity & {assortativity} \\
Centralization & {centralization} \\
Algorithm & {algorithm} \\
\end{{tabular}}
"#,
        name = latex_escape(section.name),
        description = latex_escape(resolve_description(section.key)),
        images = images,
        count = stats.count,
        min = fmt_value(stats.min),
        max = fmt_value(stats.max),
        mean = fmt_value(stats.mean),
        median = fmt_value(stats.median),
        stddev = fmt_value(stats.stddev),
        assortativity = fmt_value(section.assortativity),
        centralization = fmt_value(section.centralization),
        algorithm = latex_escape(section.algorithm),
    )
}

fn render_latex(inputs: &ReportInputs<'_>) -> String {
    let p = inputs.properties;
    let diameter = p
        .diameter_range
        .map(|(lo, hi)| format!("[{lo}, {hi}]"))
        .unwrap_or_else(|| "N/A".to_string());
    let effective = p
        .effective_diameter
        .map(|d| format!("{d:.2}"))
        .unwrap_or_else(|| "N/A".to_string());
    let asset_dir = "assets";

    let mut body = String::new();
    let _ = writeln!(
        body,
        r#"\section{{Properties}}
\begin{{tabular}}{{ll}}
Nodes & {nodes} \\
Edges & {edges} \\
Density & {density:.6} \\
Directed & {directed} \\
Weighted & {weighted} \\
Self Loops & {self_loops} \\
Connected Components & {components} \\
Diameter Range & {diameter} \\
Effective Diameter & {effective} \\
\end{{tabular}}"#,
        nodes = p.nodes,
        edges = p.edges,
        density = p.density,
        directed = p.directed,
        weighted = p.weighted,
        self_loops = p.self_loops,
        components = fmt_count(p.connected_components),
        diameter = diameter,
        effective = effective,
    );

    for category in [Category::NodeCentrality, Category::Partition] {
        let sections: Vec<&MeasureSection<'_>> = inputs
            .measures
            .iter()
            .filter(|m| m.category == category)
            .collect();
        if sections.is_empty() {
            continue;
        }
        let _ = writeln!(body, "\\section{{{category}}}");
        if category == Category::NodeCentrality {
            for &kind in inputs.enabled_correlations {
                body.push_str(&heatmap_latex(inputs, category, kind));
            }
        }
        for section in &sections {
            body.push_str(&measure_latex(section, asset_dir));
        }
    }

    format!(
        r#"\documentclass{{article}}
\usepackage[table]{{xcolor}}
\usepackage{{graphicx}}
\begin{{document}}
{body}
\end{{document}}
"#
    )
}
