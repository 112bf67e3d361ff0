use subminer::{AnalysisError, ExtractorConfig, FeatureSelection, StopWords, TfidfVectorizer};

const CORPUS: [&str; 3] = ["prova de tcc", "tcc e orientador", "clima hoje"];

fn small_cfg() -> ExtractorConfig {
    ExtractorConfig::default().with_max_features(10)
}

#[test]
fn three_document_scenario_shape_and_sparsity() {
    let sw = StopWords::from_words(["de", "e"]);
    let m = TfidfVectorizer::new(&sw, small_cfg()).fit_transform(&CORPUS).unwrap();

    assert_eq!(m.shape(), (3, 8));
    let expected = ["clima", "clima hoje", "hoje", "orientador", "prova", "prova tcc", "tcc", "tcc orientador"];
    assert_eq!(m.terms, expected);

    let tcc = m.column("tcc").unwrap();
    assert!(tcc[0] > 0.0 && tcc[1] > 0.0);
    assert_eq!(tcc[2], 0.0);
    for t in ["clima", "hoje"] {
        let col = m.column(t).unwrap();
        assert_eq!(col[0], 0.0);
        assert_eq!(col[1], 0.0);
        assert!(col[2] > 0.0);
    }

    // Rows are unit length and weights non-negative.
    for row in &m.rows {
        let norm: f64 = row.iter().map(|v| v * v).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
        assert!(row.iter().all(|v| *v >= 0.0));
    }
}

#[test]
fn smoothed_idf_weights_rarer_terms_higher() {
    let sw = StopWords::from_words(["de", "e"]);
    let m = TfidfVectorizer::new(&sw, small_cfg()).fit_transform(&CORPUS).unwrap();
    let idf = |t: &str| m.idf[m.term_index(t).unwrap()];
    assert!((idf("tcc") - ((4.0f64 / 3.0).ln() + 1.0)).abs() < 1e-12);
    assert!((idf("prova") - (2.0f64.ln() + 1.0)).abs() < 1e-12);
    assert!(m.weight(0, "prova").unwrap() > m.weight(0, "tcc").unwrap());
}

#[test]
fn stop_word_is_never_a_feature() {
    let sw = StopWords::from_words(["de", "e", "tcc"]);
    let m = TfidfVectorizer::new(&sw, small_cfg()).fit_transform(&CORPUS).unwrap();
    assert!(m.term_index("tcc").is_none());
    assert!(m.terms.iter().all(|t| !t.split(' ').any(|w| w == "tcc")));
    assert_eq!(m.terms, ["clima", "clima hoje", "hoje", "orientador", "prova"]);
}

#[test]
fn stop_words_are_removed_before_bigrams() {
    let sw = StopWords::from_words(["de"]);
    let m = TfidfVectorizer::new(&sw, small_cfg()).fit_transform(&["prova de tcc hoje"]).unwrap();
    assert!(m.term_index("prova tcc").is_some());
    assert!(m.term_index("prova de").is_none());
}

#[test]
fn max_features_bounds_dimensionality() {
    let sw = StopWords::from_words(["de", "e"]);
    let m = TfidfVectorizer::new(&sw, ExtractorConfig::default().with_max_features(3))
        .fit_transform(&CORPUS)
        .unwrap();
    assert_eq!(m.n_features(), 3);
    let mut sorted = m.terms.clone();
    sorted.sort();
    assert_eq!(m.terms, sorted);
}

#[test]
fn selection_modes_break_ties_lexicographically() {
    let sw = StopWords::from_words(["de", "e"]);
    let by_variance = TfidfVectorizer::new(&sw, ExtractorConfig::default().with_max_features(1))
        .fit_transform(&CORPUS)
        .unwrap();
    // Every single-document term has the same, highest variance.
    assert_eq!(by_variance.terms, ["clima"]);

    let by_count = TfidfVectorizer::new(
        &sw,
        ExtractorConfig::default().with_max_features(1).with_selection(FeatureSelection::TermFrequency),
    )
    .fit_transform(&CORPUS)
    .unwrap();
    assert_eq!(by_count.terms, ["tcc"]);
}

#[test]
fn document_permutation_only_permutes_rows() {
    let sw = StopWords::from_words(["de", "e"]);
    let cfg = ExtractorConfig::default().with_max_features(4);
    let fwd = TfidfVectorizer::new(&sw, cfg.clone()).fit_transform(&CORPUS).unwrap();
    let rev_docs: Vec<&str> = CORPUS.iter().rev().copied().collect();
    let rev = TfidfVectorizer::new(&sw, cfg).fit_transform(&rev_docs).unwrap();

    assert_eq!(fwd.terms, rev.terms);
    assert_eq!(fwd.idf, rev.idf);
    for (i, row) in fwd.rows.iter().enumerate() {
        assert_eq!(row, &rev.rows[CORPUS.len() - 1 - i]);
    }
}

#[test]
fn short_corpus_is_insufficient_content() {
    let sw = StopWords::empty();
    let v = TfidfVectorizer::new(&sw, ExtractorConfig::default());
    // Exactly 10 characters is still not enough.
    let err = v.fit_transform(&["abcde", "fghij"]).unwrap_err();
    assert!(matches!(err, AnalysisError::InsufficientContent { found: 10, required: 10, .. }));
    assert!(err.is_skip());

    assert!(v.fit_transform(&["abcde", "fghijk"]).is_ok());
    assert!(matches!(v.fit_transform::<&str>(&[]), Err(AnalysisError::InsufficientContent { .. })));
}

#[test]
fn all_stop_words_is_empty_vocabulary() {
    let sw = StopWords::from_words(["de", "para", "com"]);
    let err = TfidfVectorizer::new(&sw, ExtractorConfig::default())
        .fit_transform(&["de para com de para", "com com de e a"])
        .unwrap_err();
    assert!(matches!(err, AnalysisError::EmptyVocabulary { .. }));
    assert!(err.is_skip());
}

#[test]
fn zero_feature_budget_yields_no_matrix() {
    let sw = StopWords::from_words(["de", "e"]);
    let cfg = ExtractorConfig { max_features: 0, ..ExtractorConfig::default() };
    let err = TfidfVectorizer::new(&sw, cfg).fit_transform(&CORPUS).unwrap_err();
    assert!(matches!(err, AnalysisError::EmptyVocabulary { stage: "tfidf" }));
}

#[test]
fn portuguese_list_with_domain_extras() {
    let sw = StopWords::portuguese().with_domain_extras();
    assert!(sw.is_stop("de") && sw.is_stop("não") && sw.is_stop("tcc") && sw.is_stop("vc"));
    assert!(!sw.is_stop("orientador"));

    let m = TfidfVectorizer::new(&sw, small_cfg()).fit_transform(&CORPUS).unwrap();
    assert!(m.term_index("tcc").is_none());
    assert!(m.term_index("orientador").is_some());
}
