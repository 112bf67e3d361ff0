use anyhow::Result;
use subminer::{init_tracing_once, Analysis, StopWords};

const DATA_ROOT: &str = "./data";
const OUT_ROOT: &str = "./reports";
const NETWORK_LIMIT: usize = 500;

fn main() -> Result<()> {
    init_tracing_once();
    let hw = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(8);

    let base = Analysis::new()
        .base_dir(DATA_ROOT)
        .out_dir(OUT_ROOT)
        .subreddit("faculdadeBR")
        .search("TCC")
        .parallelism(hw)
        .progress(true)
        .env_overrides();

    let stopwords = StopWords::portuguese().with_domain_extras().with_env_extras();

    let corpus = base.clone().progress_label("Collecting posts").fetch(true)?;

    let text = base.text_mining(&corpus, &stopwords)?;
    println!("Text mining: {} documents, shape {:?}, {} topics", text.documents, text.matrix_shape, text.clusters.len());

    let kdd = base.kdd_profile(&corpus)?;
    println!("KDD profile: {} posts, {} clusters, silhouette {:?}", kdd.posts, kdd.clusters.len(), kdd.silhouette);

    let community = base.community_analysis(&corpus, &stopwords)?;
    println!(
        "Communities: {} authors, {} interactions, {} communities",
        community.graph.nodes,
        community.interactions,
        community.communities.len()
    );

    let network_base = base.clone().limit(NETWORK_LIMIT).progress_label("Collecting network posts");
    let network_corpus = network_base.fetch(false)?;
    let network = network_base.post_network(&network_corpus)?;
    println!("Post network: {} nodes, {} edges", network.graph.nodes, network.graph.edges);

    Ok(())
}
