//! Batch profiling: walk a directory tree and write one report per
//! matching graph file.
//!
//! A thin driver over [`Profile`]: read failures and profiling failures are
//! caught per file, logged, and never abort the walk.

use crate::config::{Config, Preset};
use crate::graph::{Graph, GraphFormat};
use crate::plot::{colors, Style};
use crate::profile::{Profile, ProfileSettings};
use crate::report::OutputKind;
use crate::Result;
use std::fs;
use std::path::Path;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// Options for [`walk`].
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Accepted file names, fnmatch-style (`*`, `?`), e.g. `*.edges`.
    pub pattern: String,
    /// Explicit configuration; the preset is used when absent.
    pub config: Option<Config>,
    pub preset: Preset,
    pub output: OutputKind,
    pub style: Style,
    pub color: (f64, f64, f64),
    /// Also search subdirectories.
    pub recursive: bool,
    /// Parallel plot rendering per report.
    pub parallel: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            pattern: "*".to_string(),
            config: None,
            preset: Preset::Default,
            output: OutputKind::Html,
            style: Style::Light,
            color: colors::GREEN,
            recursive: false,
            parallel: false,
        }
    }
}

/// Match `name` against an fnmatch-style pattern (`*` and `?`).
fn glob_match(pattern: &str, name: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let n: Vec<char> = name.chars().collect();
    let (mut pi, mut ni) = (0usize, 0usize);
    let mut star: Option<usize> = None;
    let mut mark = 0usize;
    while ni < n.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == n[ni]) {
            pi += 1;
            ni += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some(pi);
            mark = ni;
            pi += 1;
        } else if let Some(s) = star {
            // Backtrack: let the last * swallow one more character.
            pi = s + 1;
            mark += 1;
            ni = mark;
        } else {
            return false;
        }
    }
    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}

/// Profile every matching graph file under `input_dir` and write a report
/// per file into `output_dir`.
pub fn walk(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    format: GraphFormat,
    options: &WalkOptions,
) -> Result<()> {
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;
    let config = options
        .config
        .clone()
        .unwrap_or_else(|| Config::from_preset(options.preset));

    let max_depth = if options.recursive { usize::MAX } else { 1 };
    for entry in WalkDir::new(input_dir).max_depth(max_depth) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "directory entry skipped");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !glob_match(&options.pattern, &name) {
            debug!(file = %name, "skipped: does not match pattern");
            continue;
        }

        let path = entry.path();
        info!(file = %path.display(), "profiling");
        let graph = match Graph::read(path, format) {
            Ok(graph) => graph,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "could not read graph");
                continue;
            }
        };

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "graph".to_string());
        match Profile::create_with(graph, config.clone(), ProfileSettings::default()) {
            Ok(mut profile) => {
                if let Err(e) = profile.output(
                    options.output,
                    output_dir,
                    &stem,
                    options.style,
                    options.color,
                    options.parallel,
                ) {
                    error!(file = %path.display(), error = %e, "report failed");
                }
            }
            Err(e) => {
                error!(file = %path.display(), error = %e, "profiling failed");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_basics() {
        assert!(glob_match("*", "anything.edges"));
        assert!(glob_match("*.edges", "karate.edges"));
        assert!(!glob_match("*.edges", "karate.metis"));
        assert!(glob_match("graph-?.txt", "graph-1.txt"));
        assert!(!glob_match("graph-?.txt", "graph-10.txt"));
        assert!(glob_match("a*b*c", "aXXbYYc"));
        assert!(!glob_match("a*b*c", "aXXbYY"));
        assert!(glob_match("", ""));
        assert!(!glob_match("", "x"));
    }

    #[test]
    fn walk_writes_reports_and_skips_bad_files() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();

        std::fs::write(input.path().join("tri.edges"), "0 1\n1 2\n2 0\n").unwrap();
        std::fs::write(input.path().join("bad.edges"), "0 not-a-node\n").unwrap();
        std::fs::write(input.path().join("ignored.txt"), "not a graph").unwrap();

        let options = WalkOptions {
            pattern: "*.edges".to_string(),
            preset: Preset::Minimal,
            ..WalkOptions::default()
        };
        walk(input.path(), output.path(), GraphFormat::EdgeList, &options).unwrap();

        assert!(output.path().join("tri.html").exists());
        assert!(!output.path().join("bad.html").exists());
        assert!(!output.path().join("ignored.html").exists());
    }

    #[test]
    fn walk_recursive_descends() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let sub = input.path().join("nested");
        std::fs::create_dir_all(&sub).unwrap();
        std::fs::write(sub.join("deep.edges"), "0 1\n").unwrap();

        let mut options = WalkOptions {
            pattern: "*.edges".to_string(),
            preset: Preset::Minimal,
            ..WalkOptions::default()
        };
        walk(input.path(), output.path(), GraphFormat::EdgeList, &options).unwrap();
        assert!(!output.path().join("deep.html").exists(), "non-recursive by default");

        options.recursive = true;
        walk(input.path(), output.path(), GraphFormat::EdgeList, &options).unwrap();
        assert!(output.path().join("deep.html").exists());
    }
}
