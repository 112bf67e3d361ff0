#![allow(dead_code)]

use serde_json::json;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use subminer::{Comment, Parent, Post};

/// 2023-01-10T12:00:00Z, a Tuesday.
pub const JAN_10_NOON: i64 = 1_673_352_000;
/// 2023-02-05T00:00:00Z.
pub const FEB_05: i64 = 1_675_555_200;

/// Write a compressed `.zst` file containing the provided JSONL lines.
/// This mirrors the corpus's RC_/RS_ monthly files but with tiny content.
pub fn write_zst_lines(path: &Path, lines: &[String]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let f = File::create(path).unwrap();
    let mut enc = zstd::stream::write::Encoder::new(f, 3).unwrap();
    for l in lines {
        writeln!(&mut enc, "{}", l).unwrap();
    }
    enc.finish().unwrap();
}

/// Build a tiny corpus in r/faculdadebr:
/// - RS_2023-01: p1 (ana), p2 (bruno), p3 ([deleted]) mention "TCC"; p4 (carla) does not;
///   p5 mentions TCC but lives in r/brasil.
/// - RS_2023-02: p6 (daniel) mentions TCC.
/// - RC_2023-01:
///     c1 bruno -> p1 (ana)
///     c2 ana -> c1 (bruno), comment-parent resolution
///     c3 carla -> p2 (bruno)
///     c4 [deleted] -> p1, pseudo user
///     c5 ana -> p1 (ana), self reply
///     c6 eva -> p4, post outside the fetch
pub fn make_corpus_basic() -> PathBuf {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.into_path();

    let rs_jan = base.join("submissions").join("RS_2023-01.zst");
    let rs_lines = vec![
        json!({
            "id":"p1", "subreddit":"faculdadebr", "author":"ana", "created_utc":JAN_10_NOON,
            "score":10, "num_comments":3, "upvote_ratio":0.9, "is_self":true,
            "title":"Dúvida sobre o TCC",
            "selftext":"Meu orientador sumiu e a banca do TCC está marcada. Alguém sabe como lidar com a metodologia?",
            "link_flair_text":"Dúvida",
            "url":"https://www.reddit.com/r/faculdadebr/comments/p1/duvida_sobre_o_tcc/"
        }).to_string(),
        json!({
            "id":"p2", "subreddit":"FaculdadeBR", "author":"bruno", "created_utc":JAN_10_NOON + 3600,
            "score":5, "num_comments":3, "upvote_ratio":0.75,
            "title":"Meu TCC atrasou",
            "selftext":"O prazo de entrega do tcc acabou e a coordenação não respondeu meu email",
            "link_flair_text":null,
            "url":"https://www.reddit.com/r/faculdadebr/comments/p2/meu_tcc_atrasou/"
        }).to_string(),
        json!({
            "id":"p3", "subreddit":"faculdadebr", "author":"[deleted]", "created_utc":JAN_10_NOON + 7200,
            "score":1, "num_comments":1,
            "title":"tcc em grupo?",
            "selftext":"Alguém já fez tcc em grupo? http://exemplo.com/grupo",
            "url":"http://exemplo.com/grupo"
        }).to_string(),
        json!({
            "id":"p4", "subreddit":"faculdadebr", "author":"carla", "created_utc":JAN_10_NOON + 10800,
            "score":7, "num_comments":2, "upvote_ratio":1.0,
            "title":"Estágio remunerado",
            "selftext":"Vagas de estágio na área de dados, alguém indica empresas?",
            "url":"https://www.reddit.com/r/faculdadebr/comments/p4/estagio/"
        }).to_string(),
        json!({
            "id":"p5", "subreddit":"brasil", "author":"eva", "created_utc":JAN_10_NOON,
            "score":2, "num_comments":0, "title":"TCC",
            "selftext":"post sobre tcc no lugar errado"
        }).to_string(),
    ];
    write_zst_lines(&rs_jan, &rs_lines);

    let rs_feb = base.join("submissions").join("RS_2023-02.zst");
    let rs_feb_lines = vec![json!({
        "id":"p6", "subreddit":"faculdadebr", "author":"daniel", "created_utc":FEB_05,
        "score":3, "num_comments":0, "upvote_ratio":0.8,
        "title":"Apresentação do TCC amanhã",
        "selftext":"Estou nervoso com a apresentação, dicas para slides e para a banca?"
    })
    .to_string()];
    write_zst_lines(&rs_feb, &rs_feb_lines);

    let rc_jan = base.join("comments").join("RC_2023-01.zst");
    let rc_lines = vec![
        json!({"id":"c1", "author":"bruno", "link_id":"t3_p1", "parent_id":"t3_p1", "subreddit":"faculdadebr",
               "created_utc":JAN_10_NOON + 60, "body":"Fala com a coordenação sobre o orientador"}).to_string(),
        json!({"id":"c2", "author":"ana", "link_id":"t3_p1", "parent_id":"t1_c1", "subreddit":"faculdadebr",
               "created_utc":JAN_10_NOON + 120, "body":"Obrigada, vou tentar falar com a coordenação"}).to_string(),
        json!({"id":"c3", "author":"carla", "link_id":"t3_p2", "parent_id":"t3_p2", "subreddit":"faculdadebr",
               "created_utc":JAN_10_NOON + 3700, "body":"Manda email de novo para a secretaria"}).to_string(),
        json!({"id":"c4", "author":"[deleted]", "link_id":"t3_p1", "parent_id":"t3_p1", "subreddit":"faculdadebr",
               "created_utc":JAN_10_NOON + 180, "body":"[removed]"}).to_string(),
        json!({"id":"c5", "author":"ana", "link_id":"t3_p1", "parent_id":"t3_p1", "subreddit":"faculdadebr",
               "created_utc":JAN_10_NOON + 240, "body":"Atualizando: o orientador respondeu"}).to_string(),
        json!({"id":"c6", "author":"eva", "link_id":"t3_p4", "parent_id":"t3_p4", "subreddit":"faculdadebr",
               "created_utc":JAN_10_NOON + 10900, "body":"Tenta o portal de estágios"}).to_string(),
    ];
    write_zst_lines(&rc_jan, &rc_lines);

    base
}

/// In-memory post with only the fields the graph/profile code reads.
pub fn post(id: &str, author: Option<&str>, num_comments: u64, body: &str) -> Post {
    Post {
        id: id.to_string(),
        subreddit: "faculdadebr".to_string(),
        title: format!("post {id}"),
        body: body.to_string(),
        author: author.map(str::to_string),
        score: 1,
        num_comments,
        created_utc: JAN_10_NOON,
        upvote_ratio: None,
        flair: None,
        url: None,
        is_self: None,
    }
}

pub fn comment(id: &str, post_id: &str, author: Option<&str>, parent: Parent, body: &str) -> Comment {
    Comment {
        id: id.to_string(),
        post_id: post_id.to_string(),
        author: author.map(str::to_string),
        parent,
        body: body.to_string(),
    }
}
