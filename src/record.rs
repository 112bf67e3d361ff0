//! Post/comment records as fetched from the upstream source, and the fetched corpus.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Substituted when a record has no usable author.
pub const UNKNOWN_AUTHOR: &str = "Unknown";
/// Substituted when a post carries no flair.
pub const NO_FLAIR: &str = "Nenhum";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub subreddit: String,
    pub title: String,
    pub body: String,
    pub author: Option<String>,
    pub score: i64,
    pub num_comments: u64,
    pub created_utc: i64,
    pub upvote_ratio: Option<f64>,
    pub flair: Option<String>,
    pub url: Option<String>,
    pub is_self: Option<bool>,
}

impl Post {
    pub fn author_or_unknown(&self) -> &str {
        self.author.as_deref().unwrap_or(UNKNOWN_AUTHOR)
    }
    pub fn flair_or_none(&self) -> &str {
        self.flair.as_deref().unwrap_or(NO_FLAIR)
    }
}

/// What a comment replies to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Parent {
    Post(String),
    Comment(String),
}

impl Parent {
    /// Parses `t3_<id>` (post) and `t1_<id>` (comment); bare ids are treated as posts.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Some(id) = raw.strip_prefix("t1_") {
            return Some(Parent::Comment(id.to_string()));
        }
        Some(Parent::Post(raw.strip_prefix("t3_").unwrap_or(raw).to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    pub author: Option<String>,
    pub parent: Parent,
    pub body: String,
}

/// Deleted/removed placeholders and blank names count as absent.
pub fn clean_author(raw: Option<&str>) -> Option<String> {
    let a = raw?.trim();
    if a.is_empty() || a.eq_ignore_ascii_case("[deleted]") || a.eq_ignore_ascii_case("[removed]") {
        None
    } else {
        Some(a.to_string())
    }
}

/// Dump-line schema. Extra fields are ignored by serde; `selftext`/`body` and
/// the numeric fields are optional because the corpus is not uniform.
#[derive(Debug, Deserialize)]
pub struct RawRecord {
    pub id: Option<String>,
    pub subreddit: Option<String>,
    pub author: Option<String>,
    pub created_utc: Option<Value>,
    pub score: Option<Value>,
    pub num_comments: Option<Value>,
    pub upvote_ratio: Option<f64>,
    pub title: Option<String>,
    pub selftext: Option<String>,
    pub body: Option<String>,
    pub link_flair_text: Option<String>,
    pub url: Option<String>,
    pub is_self: Option<bool>,
    pub parent_id: Option<String>,
    pub link_id: Option<String>,
}

// Some dumps write integers (created_utc, score, num_comments) as strings or floats.
fn int_of(v: &Option<Value>) -> Option<i64> {
    match v {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().map(|f| f as i64),
        _ => None,
    }
}

impl RawRecord {
    pub fn created_epoch(&self) -> Option<i64> {
        int_of(&self.created_utc)
    }

    pub fn is_comment(&self) -> bool {
        self.body.is_some() && self.parent_id.is_some()
    }

    pub fn into_post(self) -> Option<Post> {
        let created_utc = self.created_epoch().unwrap_or(0);
        Some(Post {
            id: self.id?,
            subreddit: self.subreddit.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            body: self.selftext.unwrap_or_default(),
            author: clean_author(self.author.as_deref()),
            score: int_of(&self.score).unwrap_or(0),
            num_comments: int_of(&self.num_comments).map_or(0, |n| n.max(0) as u64),
            created_utc,
            upvote_ratio: self.upvote_ratio,
            flair: self.link_flair_text.filter(|f| !f.trim().is_empty()),
            url: self.url,
            is_self: self.is_self,
        })
    }

    pub fn into_comment(self) -> Option<Comment> {
        let parent = Parent::parse(self.parent_id.as_deref()?)?;
        let post_id = match self.link_id.as_deref() {
            Some(l) => l.strip_prefix("t3_").unwrap_or(l).to_string(),
            None => match &parent {
                Parent::Post(id) => id.clone(),
                Parent::Comment(_) => return None,
            },
        };
        Some(Comment {
            id: self.id?,
            post_id,
            author: clean_author(self.author.as_deref()),
            parent,
            body: self.body.unwrap_or_default(),
        })
    }
}

/// Everything one fetch returned. Comments only reference posts in `posts`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Corpus {
    pub posts: Vec<Post>,
    pub comments: Vec<Comment>,
}

impl Corpus {
    pub fn new(posts: Vec<Post>, comments: Vec<Comment>) -> Self {
        Self { posts, comments }
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn author_index(&self) -> AuthorIndex<'_> {
        AuthorIndex {
            posts: self.posts.iter().map(|p| (p.id.as_str(), p.author.as_deref())).collect(),
            comments: self.comments.iter().map(|c| (c.id.as_str(), c.author.as_deref())).collect(),
        }
    }
}

/// id -> author lookups for parent resolution.
pub struct AuthorIndex<'a> {
    posts: AHashMap<&'a str, Option<&'a str>>,
    comments: AHashMap<&'a str, Option<&'a str>>,
}

impl<'a> AuthorIndex<'a> {
    /// Author of whatever `parent` names, when it is in the corpus and not anonymous.
    pub fn parent_author(&self, parent: &Parent) -> Option<&'a str> {
        match parent {
            Parent::Post(id) => self.posts.get(id.as_str()).copied().flatten(),
            Parent::Comment(id) => self.comments.get(id.as_str()).copied().flatten(),
        }
    }
}
