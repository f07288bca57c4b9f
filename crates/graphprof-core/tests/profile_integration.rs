//! Integration tests for the profiling pipeline.
//!
//! These exercise the full compute → post-process → report flow on small
//! graphs with known structure.

use graphprof_core::{
    Category, Config, CorrelationKind, Error, Graph, MeasureKey, OutputKind, Preset, Profile,
    ProfileSettings, Style, ALL_MEASURES,
};

/// 10-node undirected graph: a ring plus one chord.
fn ring_graph() -> Graph {
    let mut g = Graph::new(false, false);
    for i in 0..10 {
        g.add_edge(i, (i + 1) % 10, 1.0);
    }
    g.add_edge(0, 5, 1.0);
    g
}

/// Small graph with hubs and periphery so measures are non-degenerate.
fn lollipop_graph() -> Graph {
    let mut g = Graph::new(false, false);
    // Clique on {0,1,2,3}
    for i in 0..4 {
        for j in (i + 1)..4 {
            g.add_edge(i, j, 1.0);
        }
    }
    // Tail 3-4-5-6-7
    for i in 3..7 {
        g.add_edge(i, i + 1, 1.0);
    }
    g
}

#[test]
fn minimal_preset_end_to_end() {
    let mut profile = Profile::create(ring_graph(), Preset::Minimal).unwrap();

    assert_eq!(
        profile.active_measures(),
        vec![MeasureKey::Degree, MeasureKey::ConnectedComponents]
    );
    assert_eq!(profile.properties().nodes, 10);
    assert_eq!(profile.properties().edges, 11);
    assert_eq!(profile.properties().connected_components, Some(1));
    // Diameter is not part of the minimal preset.
    assert!(profile.properties().diameter_range.is_none());

    let degree_stats = profile.stat(MeasureKey::Degree).unwrap();
    assert_eq!(degree_stats.count, 10);
    // Ring + chord: eight nodes of degree 2, two of degree 3.
    assert_eq!(degree_stats.min, 2.0);
    assert_eq!(degree_stats.max, 3.0);

    let cc_stats = profile.stat(MeasureKey::ConnectedComponents).unwrap();
    assert_eq!(cc_stats.count, 1);
    assert_eq!(cc_stats.max, 10.0);

    let dir = tempfile::tempdir().unwrap();
    profile
        .output(
            OutputKind::Html,
            dir.path(),
            "graph",
            Style::Light,
            graphprof_core::colors::GREEN,
            false,
        )
        .unwrap();
    let html = std::fs::read_to_string(dir.path().join("graph.html")).unwrap();
    assert!(!html.is_empty());
    assert!(html.contains("Centrality.Degree"));
    assert!(html.contains("Partition.ConnectedComponents"));
}

#[test]
fn unknown_preset_is_rejected() {
    let err = "everything".parse::<Preset>().unwrap_err();
    assert!(matches!(err, Error::UnknownPreset(_)));
}

#[test]
fn queries_on_disabled_measures_fail() {
    let profile = Profile::create(ring_graph(), Preset::Minimal).unwrap();
    for key in [MeasureKey::PageRank, MeasureKey::Betweenness, MeasureKey::Communities] {
        assert!(matches!(
            profile.stat(key),
            Err(Error::MeasureNotFound(_))
        ));
        assert!(matches!(
            profile.category(key),
            Err(Error::MeasureNotFound(_))
        ));
        assert!(matches!(
            profile.elapsed(key),
            Err(Error::MeasureNotFound(_))
        ));
    }
}

#[test]
fn dropped_measure_vanishes_from_every_surface() {
    // On an empty graph the core-shell partition cannot be extracted, so
    // the measure is dropped while the rest of the profile survives.
    let empty = Graph::new(false, false);
    let profile = Profile::create(empty, Preset::Complete).unwrap();

    assert!(!profile.active_measures().contains(&MeasureKey::CoreShells));
    assert!(matches!(
        profile.stat(MeasureKey::CoreShells),
        Err(Error::MeasureNotFound(_))
    ));
    assert!(matches!(
        profile.elapsed(MeasureKey::CoreShells),
        Err(Error::MeasureNotFound(_))
    ));

    // Degree survives even with an empty sample.
    assert!(profile.active_measures().contains(&MeasureKey::Degree));
}

#[test]
fn correlation_lookup_is_symmetric_bit_for_bit() {
    let mut config = Config::from_preset(Preset::Complete);
    config.set_correlation(CorrelationKind::Pearson, true);
    config.set_correlation(CorrelationKind::Fechner, true);
    let profile =
        Profile::create_with(lollipop_graph(), config, ProfileSettings::default()).unwrap();

    let eligible: Vec<MeasureKey> = profile
        .active_measures()
        .into_iter()
        .filter(|k| k.spec().correlate)
        .collect();
    assert!(eligible.len() >= 2);

    for kind in [
        CorrelationKind::Pearson,
        CorrelationKind::Spearman,
        CorrelationKind::Fechner,
    ] {
        for &a in &eligible {
            for &b in &eligible {
                let forward = profile.correlation(kind, a, b);
                let backward = profile.correlation(kind, b, a);
                assert!(forward.is_some(), "{kind}: missing entry for {a} / {b}");
                let (f, r) = (forward.unwrap(), backward.unwrap());
                assert_eq!(
                    f.to_bits(),
                    r.to_bits(),
                    "{kind}: {a} vs {b} asymmetric ({f} != {r})"
                );
            }
        }
    }
}

#[test]
fn self_correlation_is_exactly_one() {
    let profile = Profile::create(lollipop_graph(), Preset::Complete).unwrap();
    for key in profile.active_measures() {
        if !key.spec().correlate {
            continue;
        }
        assert_eq!(
            profile.correlation(CorrelationKind::Spearman, key, key),
            Some(1.0),
            "{key}"
        );
    }
}

#[test]
fn no_correlation_entry_for_disabled_measure() {
    // Default preset leaves Closeness disabled.
    let profile = Profile::create(lollipop_graph(), Preset::Default).unwrap();
    assert!(!profile.active_measures().contains(&MeasureKey::Closeness));
    assert_eq!(
        profile.correlation(CorrelationKind::Spearman, MeasureKey::Degree, MeasureKey::Closeness),
        None
    );
    assert_eq!(
        profile.correlation(CorrelationKind::Spearman, MeasureKey::Closeness, MeasureKey::Closeness),
        None
    );
}

#[test]
fn partition_measures_are_never_correlated() {
    let profile = Profile::create(lollipop_graph(), Preset::Complete).unwrap();
    assert_eq!(
        profile.correlation(
            CorrelationKind::Spearman,
            MeasureKey::ConnectedComponents,
            MeasureKey::Communities
        ),
        None
    );
}

#[test]
fn output_is_idempotent() {
    let mut profile = Profile::create(lollipop_graph(), Preset::Default).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let color = graphprof_core::colors::GREEN;

    profile
        .output(OutputKind::Html, dir.path(), "first", Style::Light, color, false)
        .unwrap();
    profile
        .output(OutputKind::Html, dir.path(), "second", Style::Light, color, false)
        .unwrap();

    let first = std::fs::read(dir.path().join("first.html")).unwrap();
    let second = std::fs::read(dir.path().join("second.html")).unwrap();
    assert_eq!(first, second, "same profile, same style: identical bytes");
}

#[test]
fn parallel_and_sequential_results_agree() {
    let sequential = Profile::create_with(
        lollipop_graph(),
        Config::from_preset(Preset::Complete),
        ProfileSettings::new().with_parallelism(1).unwrap(),
    )
    .unwrap();
    let parallel = Profile::create_with(
        lollipop_graph(),
        Config::from_preset(Preset::Complete),
        ProfileSettings::new().with_parallelism(4).unwrap(),
    )
    .unwrap();

    assert_eq!(sequential.active_measures(), parallel.active_measures());
    for key in sequential.active_measures() {
        assert_eq!(
            sequential.stat(key).unwrap(),
            parallel.stat(key).unwrap(),
            "{key}: stats must not depend on worker count"
        );
    }
    let eligible: Vec<MeasureKey> = sequential
        .active_measures()
        .into_iter()
        .filter(|k| k.spec().correlate)
        .collect();
    for &a in &eligible {
        for &b in &eligible {
            assert_eq!(
                sequential.correlation(CorrelationKind::Spearman, a, b),
                parallel.correlation(CorrelationKind::Spearman, a, b),
                "{a} vs {b}"
            );
        }
    }
}

#[test]
fn complete_preset_activates_all_measures() {
    let profile = Profile::create(lollipop_graph(), Preset::Complete).unwrap();
    assert_eq!(profile.active_measures().len(), ALL_MEASURES.len());
    for key in profile.active_measures() {
        assert!(profile.stat(key).is_ok(), "{key}");
        let category = profile.category(key).unwrap();
        assert_eq!(category, key.spec().category);
    }
    // Gated properties were enabled and computable.
    assert!(profile.properties().diameter_range.is_some());
    assert!(profile.properties().effective_diameter.is_some());
}

#[test]
fn centrality_measures_carry_assortativity_partitions_do_not() {
    let profile = Profile::create(lollipop_graph(), Preset::Complete).unwrap();
    for key in profile.active_measures() {
        let measure = profile.measure(key).unwrap();
        match key.spec().category {
            Category::NodeCentrality => {
                assert!(
                    measure.assortativity().is_finite(),
                    "{key}: expected finite assortativity"
                );
            }
            Category::Partition => {
                assert!(measure.assortativity().is_nan(), "{key}");
                assert!(measure.centralization().is_nan(), "{key}");
            }
        }
    }
    // Degree defines centralization; the lollipop is not regular.
    let degree = profile.measure(MeasureKey::Degree).unwrap();
    assert!(degree.centralization() > 0.0);
}

#[test]
fn latex_output_writes_bundle() {
    let mut profile = Profile::create(ring_graph(), Preset::Minimal).unwrap();
    let dir = tempfile::tempdir().unwrap();
    profile
        .output(
            OutputKind::Latex,
            dir.path(),
            "ring",
            Style::Light,
            graphprof_core::colors::RED,
            false,
        )
        .unwrap();

    let bundle = dir.path().join("ring");
    let tex = std::fs::read_to_string(bundle.join("ring.tex")).unwrap();
    assert!(tex.starts_with("\\documentclass"));
    // Image assets land inside the bundle.
    let assets: Vec<_> = std::fs::read_dir(bundle.join("assets"))
        .unwrap()
        .collect();
    assert!(!assets.is_empty());
}

#[test]
fn show_without_sink_is_missing_dependency() {
    let mut profile = Profile::create(ring_graph(), Preset::Minimal).unwrap();
    let err = profile
        .show(None, Style::Light, graphprof_core::colors::GREEN, false)
        .unwrap_err();
    assert!(matches!(err, Error::MissingDependency(_)));
}

#[test]
fn show_routes_html_to_sink_and_counts_pages() {
    struct Capture {
        pages: Vec<String>,
    }
    impl graphprof_core::DisplaySink for Capture {
        fn display_html(&mut self, html: &str) -> graphprof_core::Result<()> {
            self.pages.push(html.to_string());
            Ok(())
        }
    }
    struct Headless;
    impl graphprof_core::DisplaySink for Headless {
        fn interactive(&self) -> bool {
            false
        }
        fn display_html(&mut self, _html: &str) -> graphprof_core::Result<()> {
            Ok(())
        }
    }

    let mut profile = Profile::create(ring_graph(), Preset::Minimal).unwrap();
    let color = graphprof_core::colors::GREEN;

    let mut headless = Headless;
    let err = profile
        .show(Some(&mut headless), Style::Light, color, false)
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedEnvironment(_)));

    let mut capture = Capture { pages: Vec::new() };
    profile
        .show(Some(&mut capture), Style::Light, color, false)
        .unwrap();
    profile
        .show(Some(&mut capture), Style::Light, color, false)
        .unwrap();
    assert_eq!(capture.pages.len(), 2);
    assert!(capture.pages[0].contains("Graphprof_Page_0"));
    assert!(capture.pages[1].contains("Graphprof_Page_1"));
}

#[test]
fn directed_graph_uses_strongly_connected_components() {
    let mut g = Graph::new(true, false);
    // Directed chain: every node its own SCC.
    for i in 0..5 {
        g.add_edge(i, i + 1, 1.0);
    }
    let profile = Profile::create(g, Preset::Minimal).unwrap();
    let stats = profile.stat(MeasureKey::ConnectedComponents).unwrap();
    assert_eq!(stats.count, 6);
    assert_eq!(stats.max, 1.0);
    assert_eq!(profile.properties().connected_components, Some(6));
}
