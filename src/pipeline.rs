use crate::centrality::{degree_centrality, eigenvector_centrality, ranking, EigenvectorConfig};
use crate::community::{louvain, LouvainConfig};
use crate::config::AnalysisOptions;
use crate::date::YearMonth;
use crate::error::AnalysisError;
use crate::export::{write_csv, NetworkRow, PostRow};
use crate::graph::{clustering_coefficients, degree_sequence, interactions, post_graph, summarize, GraphSummary, InteractionGraph};
use crate::keywords::{extract_keywords, word_frequencies, Keyword, KeywordConfig, WordFrequency};
use crate::kmeans::{elbow, fit, silhouette_score, top_terms_per_cluster, ElbowPoint, KMeansConfig};
use crate::normalize::{char_len, normalize_text};
use crate::progress::make_count_progress;
use crate::query::FetchQuery;
use crate::record::{Corpus, Post};
use crate::report::{emit, Diagnostics};
use crate::scale::StandardScaler;
use crate::source::{DumpSource, PostSource};
use crate::stats::{correlation_matrix, describe, value_counts, Summary};
use crate::stopwords::StopWords;
use crate::tfidf::{ExtractorConfig, TfidfVectorizer};
use crate::util::{init_parallelism_once, init_tracing_once};
use ahash::AHashMap;
use anyhow::{Context, Result};
use petgraph::graph::NodeIndex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Documents whose cleaned body is this short carry no topic signal.
const MIN_DOC_CHARS: usize = 10;
const TEXT_K_RANGE: std::ops::RangeInclusive<usize> = 2..=10;
const TEXT_K: usize = 4;
const TOP_TERMS: usize = 10;
const SAMPLES_PER_CLUSTER: usize = 3;
const SAMPLE_SEED: u64 = 1;
const EXCERPT_CHARS: usize = 200;
const WORD_CLOUD_WORDS: usize = 200;

const KDD_STAT_COLUMNS: [&str; 6] = ["score", "num_comments", "upvote_ratio", "hour_of_day", "title_length", "selftext_length"];
const KDD_CLUSTER_FEATURES: [&str; 5] = ["score", "num_comments", "title_length", "selftext_length", "hour_of_day"];
const KDD_K_RANGE: std::ops::RangeInclusive<usize> = 1..=10;
const KDD_K: usize = 3;

const MEMBER_SAMPLE: usize = 10;
const HEAD: usize = 10;

#[derive(Clone, Debug, Default)]
pub struct Analysis {
    pub(crate) opts: AnalysisOptions,
}

// -------- Reports --------

#[derive(Clone, Debug, Serialize)]
pub struct SamplePost {
    pub id: String,
    pub title: String,
    pub excerpt: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct TopicCluster {
    pub cluster: usize,
    pub size: usize,
    pub top_terms: Vec<String>,
    pub samples: Vec<SamplePost>,
}

#[derive(Clone, Debug, Serialize)]
pub struct TextMiningReport {
    pub posts: usize,
    pub documents: usize,
    pub word_frequencies: Vec<WordFrequency>,
    /// (documents, features) of the TF-IDF matrix, when one was built.
    pub matrix_shape: Option<(usize, usize)>,
    pub elbow: Vec<ElbowPoint>,
    pub clusters: Vec<TopicCluster>,
    pub diagnostics: Diagnostics,
}

#[derive(Clone, Debug, Serialize)]
pub struct ColumnSummary {
    pub column: &'static str,
    #[serde(flatten)]
    pub summary: Summary,
}

#[derive(Clone, Debug, Serialize)]
pub struct Correlation {
    pub columns: Vec<&'static str>,
    pub matrix: Vec<Vec<f64>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct MissingCount {
    pub column: &'static str,
    pub missing: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProfileCluster {
    pub cluster: usize,
    pub size: usize,
    /// Centroid in the original feature units, keyed by feature name.
    pub centroid: BTreeMap<&'static str, f64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct KddReport {
    pub posts: usize,
    pub describe: Vec<ColumnSummary>,
    pub correlation: Correlation,
    pub missing: Vec<MissingCount>,
    pub flair_counts: Vec<(String, usize)>,
    pub day_of_week_counts: Vec<(u8, usize)>,
    pub features: Vec<&'static str>,
    pub elbow: Vec<ElbowPoint>,
    pub clusters: Vec<ProfileCluster>,
    pub silhouette: Option<f64>,
    pub csv: Option<PathBuf>,
    pub diagnostics: Diagnostics,
}

#[derive(Clone, Debug, Serialize)]
pub struct CommunitySummary {
    pub community: usize,
    pub size: usize,
    pub sample: Vec<String>,
    pub members_with_text: usize,
    pub keywords: Vec<Keyword>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CommunityReport {
    pub posts: usize,
    pub comments: usize,
    pub interactions: usize,
    pub graph: GraphSummary,
    pub modularity: f64,
    pub communities: Vec<CommunitySummary>,
    pub diagnostics: Diagnostics,
}

#[derive(Clone, Debug, Serialize)]
pub struct NodeScore {
    pub node: usize,
    pub id: String,
    pub score: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct PostNetworkReport {
    pub graph: GraphSummary,
    pub degree_head: Vec<usize>,
    pub clustering_head: Vec<f64>,
    pub degree_centrality: Vec<f64>,
    pub eigenvector_centrality: Vec<f64>,
    pub top_degree: Vec<NodeScore>,
    pub top_eigenvector: Vec<NodeScore>,
    pub csv: Option<PathBuf>,
    pub diagnostics: Diagnostics,
}

impl Analysis {
    pub fn new() -> Self {
        Self { opts: AnalysisOptions::default() }
    }

    pub fn from_options(opts: AnalysisOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.opts
    }

    // -------- Builder methods --------
    pub fn base_dir(mut self, base: impl AsRef<Path>) -> Self { self.opts = self.opts.with_base_dir(base); self }
    pub fn subreddit(mut self, sub: impl AsRef<str>) -> Self { self.opts = self.opts.with_subreddit(sub); self }
    pub fn search(mut self, term: impl AsRef<str>) -> Self { self.opts = self.opts.with_search(term); self }
    pub fn limit(mut self, n: usize) -> Self { self.opts = self.opts.with_limit(n); self }
    pub fn date_range(mut self, start: Option<YearMonth>, end: Option<YearMonth>) -> Self { self.opts = self.opts.with_date_range(start, end); self }
    pub fn parallelism(mut self, threads: usize) -> Self { self.opts = self.opts.with_parallelism(threads); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn progress_label(mut self, label: impl Into<String>) -> Self { self.opts = self.opts.with_progress_label(label); self }
    pub fn out_dir(mut self, dir: impl AsRef<Path>) -> Self { self.opts = self.opts.with_out_dir(dir); self }
    pub fn seed(mut self, seed: u64) -> Self { self.opts = self.opts.with_seed(seed); self }
    pub fn io_buffers(mut self, read_bytes: usize, write_bytes: usize) -> Self { self.opts = self.opts.with_io_buffers(read_bytes, write_bytes); self }
    pub fn env_overrides(mut self) -> Self { self.opts = self.opts.with_env_overrides(); self }

    fn query(&self, include_comments: bool) -> FetchQuery {
        FetchQuery::new(&self.opts.subreddit, &self.opts.search, self.opts.limit).with_comments(include_comments)
    }

    fn out_dir_path(&self) -> Option<&Path> {
        self.opts.out_dir.as_deref()
    }

    /// A failed export is a diagnostic; the analysis keeps going without the file.
    fn export_csv<T: Serialize>(&self, rows: &[T], dest: PathBuf, diagnostics: &mut Diagnostics) -> Option<PathBuf> {
        match write_csv(rows, &dest, self.opts.write_buffer_bytes) {
            Ok(_) => Some(dest),
            Err(e) => {
                diagnostics.record("csv export", format!("{e:#}"));
                None
            }
        }
    }

    // -------- Fetch --------

    /// Fetch from the dump corpus under `base_dir`.
    pub fn fetch(&self, include_comments: bool) -> Result<Corpus> {
        self.fetch_from(&DumpSource::from_options(&self.opts), include_comments)
    }

    /// Fetch from any source. A result without posts is fatal
    /// ([`AnalysisError::EmptyResult`]).
    pub fn fetch_from(&self, source: &dyn PostSource, include_comments: bool) -> Result<Corpus> {
        init_tracing_once();
        init_parallelism_once(self.opts.parallelism);
        let q = self.query(include_comments);
        let corpus = source
            .fetch(&q)
            .with_context(|| format!("fetching r/{} for {:?}", q.subreddit, q.search))?;
        if corpus.is_empty() {
            return Err(AnalysisError::EmptyResult { subreddit: q.subreddit, query: q.search }.into());
        }
        tracing::info!("{} posts collected.", corpus.posts.len());
        Ok(corpus)
    }

    // -------- Text mining --------

    /// Topic clustering of post bodies: word frequencies, TF-IDF, elbow sweep,
    /// K-Means with a fixed k, top terms and sample posts per cluster.
    pub fn text_mining(&self, corpus: &Corpus, stopwords: &StopWords) -> Result<TextMiningReport> {
        let mut diagnostics = Diagnostics::default();
        let docs: Vec<(&Post, String)> = corpus
            .posts
            .iter()
            .map(|p| (p, normalize_text(&p.body)))
            .filter(|(_, cleaned)| char_len(cleaned) > MIN_DOC_CHARS)
            .collect();
        tracing::info!("{} posts left after cleaning.", docs.len());

        let texts: Vec<&str> = docs.iter().map(|(_, t)| t.as_str()).collect();
        let word_frequencies = word_frequencies(&texts, stopwords, WORD_CLOUD_WORDS);

        let mut report = TextMiningReport {
            posts: corpus.posts.len(),
            documents: docs.len(),
            word_frequencies,
            matrix_shape: None,
            elbow: Vec::new(),
            clusters: Vec::new(),
            diagnostics: Diagnostics::default(),
        };

        let vectorizer = TfidfVectorizer::new(stopwords, ExtractorConfig::default());
        let matrix = match vectorizer.fit_transform(&texts) {
            Ok(m) => m,
            Err(e) if e.is_skip() => {
                diagnostics.record("tfidf", e);
                report.diagnostics = diagnostics;
                emit(self.out_dir_path(), "text_mining", &report);
                return Ok(report);
            }
            Err(e) => return Err(e.into()),
        };
        tracing::info!(shape = ?matrix.shape(), "tf-idf matrix built");
        report.matrix_shape = Some(matrix.shape());

        report.elbow = elbow(&matrix.rows, TEXT_K_RANGE, self.opts.seed);

        match fit(&matrix.rows, &KMeansConfig::new(TEXT_K).with_seed(self.opts.seed)) {
            Ok(km) => {
                let sizes = km.cluster_sizes();
                let top = top_terms_per_cluster(&km.centroids, &matrix.terms, TOP_TERMS);
                for (c, (size, top_terms)) in sizes.into_iter().zip(top).enumerate() {
                    let members: Vec<&Post> = docs
                        .iter()
                        .zip(&km.labels)
                        .filter(|(_, &l)| l == c)
                        .map(|((p, _), _)| *p)
                        .collect();
                    let mut rng = StdRng::seed_from_u64(SAMPLE_SEED);
                    let samples = members
                        .choose_multiple(&mut rng, SAMPLES_PER_CLUSTER)
                        .map(|p| SamplePost {
                            id: p.id.clone(),
                            title: p.title.clone(),
                            excerpt: p.body.chars().take(EXCERPT_CHARS).collect(),
                        })
                        .collect();
                    tracing::info!(cluster = c, size, "topic terms: {}", top_terms.join(", "));
                    report.clusters.push(TopicCluster { cluster: c, size, top_terms, samples });
                }
            }
            Err(e) if e.is_skip() => diagnostics.record("kmeans", e),
            Err(e) => return Err(e.into()),
        }

        report.diagnostics = diagnostics;
        emit(self.out_dir_path(), "text_mining", &report);
        Ok(report)
    }

    // -------- KDD profiling --------

    /// Descriptive profile of posts plus K-Means over standardized
    /// engagement/length features.
    pub fn kdd_profile(&self, corpus: &Corpus) -> Result<KddReport> {
        let mut diagnostics = Diagnostics::default();
        let rows: Vec<PostRow> = corpus.posts.iter().map(|p| PostRow::from_post(p, &self.opts.subreddit)).collect();

        let csv = self
            .out_dir_path()
            .and_then(|dir| self.export_csv(&rows, dir.join("posts_kdd.csv"), &mut diagnostics));

        let column = |name: &str, r: &PostRow| -> f64 {
            match name {
                "score" => r.score as f64,
                "num_comments" => r.num_comments as f64,
                "upvote_ratio" => r.upvote_ratio.unwrap_or(f64::NAN),
                "hour_of_day" => r.hour_of_day as f64,
                "title_length" => r.title_length as f64,
                "selftext_length" => r.selftext_length as f64,
                _ => f64::NAN,
            }
        };

        let stat_columns: Vec<Vec<f64>> = KDD_STAT_COLUMNS.iter().map(|c| rows.iter().map(|r| column(c, r)).collect()).collect();
        let describe_out: Vec<ColumnSummary> = KDD_STAT_COLUMNS
            .iter()
            .zip(&stat_columns)
            .filter_map(|(&column, values)| describe(values).map(|summary| ColumnSummary { column, summary }))
            .collect();
        let correlation = Correlation { columns: KDD_STAT_COLUMNS.to_vec(), matrix: correlation_matrix(&stat_columns) };

        let missing = vec![
            MissingCount { column: "author", missing: corpus.posts.iter().filter(|p| p.author.is_none()).count() },
            MissingCount { column: "upvote_ratio", missing: corpus.posts.iter().filter(|p| p.upvote_ratio.is_none()).count() },
            MissingCount { column: "link_flair_text", missing: corpus.posts.iter().filter(|p| p.flair.is_none()).count() },
            MissingCount { column: "url", missing: corpus.posts.iter().filter(|p| p.url.is_none()).count() },
        ];
        for m in &missing {
            if m.missing > 0 {
                tracing::info!(column = m.column, missing = m.missing, "missing values replaced by sentinel");
            }
        }
        let flair_counts = value_counts(rows.iter().map(|r| r.link_flair_text.clone()));
        let day_of_week_counts = value_counts(rows.iter().map(|r| r.day_of_week));

        let features: Vec<Vec<f64>> = rows
            .iter()
            .map(|r| KDD_CLUSTER_FEATURES.iter().map(|c| column(c, r)).collect::<Vec<f64>>())
            .filter(|v| v.iter().all(|x| !x.is_nan()))
            .collect();
        tracing::info!("{} samples for clustering.", features.len());

        let mut report = KddReport {
            posts: rows.len(),
            describe: describe_out,
            correlation,
            missing,
            flair_counts,
            day_of_week_counts,
            features: KDD_CLUSTER_FEATURES.to_vec(),
            elbow: Vec::new(),
            clusters: Vec::new(),
            silhouette: None,
            csv,
            diagnostics: Diagnostics::default(),
        };

        let (scaler, scaled) = StandardScaler::fit_transform(&features);
        report.elbow = elbow(&scaled, KDD_K_RANGE, self.opts.seed);
        match fit(&scaled, &KMeansConfig::new(KDD_K).with_seed(self.opts.seed)) {
            Ok(km) => {
                let centroids = scaler.inverse_transform(&km.centroids);
                for (c, (size, centroid)) in km.cluster_sizes().into_iter().zip(centroids).enumerate() {
                    let centroid = KDD_CLUSTER_FEATURES.iter().copied().zip(centroid).collect();
                    report.clusters.push(ProfileCluster { cluster: c, size, centroid });
                }
                match silhouette_score(&scaled, &km.labels) {
                    Ok(s) => {
                        tracing::info!("silhouette coefficient: {s:.3}");
                        report.silhouette = Some(s);
                    }
                    Err(e) => diagnostics.record("silhouette", e),
                }
            }
            Err(e) if e.is_skip() => diagnostics.record("kmeans", e),
            Err(e) => return Err(e.into()),
        }

        report.diagnostics = diagnostics;
        emit(self.out_dir_path(), "kdd_profile", &report);
        Ok(report)
    }

    // -------- Community analysis --------

    /// Author interaction network, Louvain communities and keywords per community.
    pub fn community_analysis(&self, corpus: &Corpus, stopwords: &StopWords) -> Result<CommunityReport> {
        let mut diagnostics = Diagnostics::default();
        let texts = author_texts(corpus);
        let edges = interactions(corpus);
        tracing::info!("{} interactions found.", edges.len());

        let mut g = InteractionGraph::from_edges(edges.iter().copied());
        g.remove_isolates();
        tracing::info!("network has {} authors and {} edges.", g.node_count(), g.edge_count());

        let partition = louvain(&g.graph, &LouvainConfig::default());
        let members = partition.members();
        tracing::info!("{} communities detected.", members.len());

        let kw_cfg = KeywordConfig::default();
        let pb = self.opts.progress.then(|| make_count_progress(members.len() as u64, "community keywords"));
        let mut communities = Vec::with_capacity(members.len());
        for (id, nodes) in members.iter().enumerate() {
            let names: Vec<&str> = nodes.iter().map(|&n| g.name(NodeIndex::new(n))).collect();
            let with_text: Vec<&str> = names
                .iter()
                .filter_map(|n| texts.get(*n).map(|t| t.as_str()))
                .filter(|t| !t.trim().is_empty())
                .collect();
            let merged = with_text.join(" ");
            let keywords = match extract_keywords(&merged, stopwords, &kw_cfg) {
                Ok(k) => k,
                Err(e) if e.is_skip() => {
                    diagnostics.record(format!("community {id} keywords"), e);
                    Vec::new()
                }
                Err(e) => return Err(e.into()),
            };
            communities.push(CommunitySummary {
                community: id,
                size: names.len(),
                sample: names.iter().take(MEMBER_SAMPLE).map(|s| s.to_string()).collect(),
                members_with_text: with_text.len(),
                keywords,
            });
            if let Some(pb) = &pb { pb.inc(1); }
        }
        if let Some(pb) = pb { pb.finish_and_clear(); }

        let report = CommunityReport {
            posts: corpus.posts.len(),
            comments: corpus.comments.len(),
            interactions: edges.len(),
            graph: summarize(&g.graph),
            modularity: partition.modularity,
            communities,
            diagnostics,
        };
        emit(self.out_dir_path(), "community", &report);
        Ok(report)
    }

    // -------- Post network --------

    /// Graph of posts linked by equal comment counts, with degree and
    /// eigenvector centrality.
    pub fn post_network(&self, corpus: &Corpus) -> Result<PostNetworkReport> {
        let mut diagnostics = Diagnostics::default();
        let posts = &corpus.posts;

        let csv = self.out_dir_path().and_then(|dir| {
            let rows: Vec<NetworkRow> = posts.iter().map(NetworkRow::from).collect();
            self.export_csv(&rows, dir.join("posts_network.csv"), &mut diagnostics)
        });

        let g = post_graph(posts);
        let graph = summarize(&g);
        tracing::info!(nodes = graph.nodes, edges = graph.edges, "post network built");

        let degree_head: Vec<usize> = degree_sequence(&g).into_iter().take(HEAD).collect();
        let clustering_head: Vec<f64> = clustering_coefficients(&g).into_iter().take(HEAD).collect();
        let degree = degree_centrality(&g);
        let eigen = match eigenvector_centrality(&g, &EigenvectorConfig::default()) {
            Ok(v) => v,
            Err(e) => {
                diagnostics.record("eigenvector centrality", e);
                Vec::new()
            }
        };

        let top = |scores: &[f64]| -> Vec<NodeScore> {
            ranking(scores)
                .into_iter()
                .take(HEAD)
                .map(|i| NodeScore { node: i, id: posts[i].id.clone(), score: scores[i] })
                .collect()
        };

        let report = PostNetworkReport {
            graph,
            degree_head,
            clustering_head,
            top_degree: top(&degree),
            top_eigenvector: top(&eigen),
            degree_centrality: degree,
            eigenvector_centrality: eigen,
            csv,
            diagnostics,
        };
        emit(self.out_dir_path(), "post_network", &report);
        Ok(report)
    }
}

/// Cleaned text per author: post titles and bodies, plus bodies of comments
/// that reply to a known author.
pub fn author_texts(corpus: &Corpus) -> AHashMap<String, String> {
    let mut out: AHashMap<String, String> = AHashMap::new();
    for p in &corpus.posts {
        if let Some(a) = p.author.as_deref() {
            let t = out.entry(a.to_string()).or_default();
            t.push(' ');
            t.push_str(&normalize_text(&p.title));
            t.push(' ');
            t.push_str(&normalize_text(&p.body));
        }
    }
    let idx = corpus.author_index();
    for c in &corpus.comments {
        let (Some(a), Some(_)) = (c.author.as_deref(), idx.parent_author(&c.parent)) else { continue };
        let t = out.entry(a.to_string()).or_default();
        t.push(' ');
        t.push_str(&normalize_text(&c.body));
    }
    out
}
