//! Display-oriented views over an aggregate. Nothing here mutates articles.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::article::{AggregateResult, Article, BiasPct};
use crate::sentiment::{self, Tone};

/// Number of articles in the spotlight view.
pub const SPOTLIGHT_SIZE: usize = 2;

/// Default length of the latest-news list.
pub const DEFAULT_LIST_SIZE: usize = 10;

/// Categories that make up the business view, matched case-insensitively.
pub const BUSINESS_TOPICS: &[&str] = &["business", "tech", "technology", "markets", "economy"];

/// First `n` articles of `daily`.
pub fn bounded_slice(daily: &[Article], n: usize) -> &[Article] {
    &daily[..n.min(daily.len())]
}

/// All articles, most extreme polarity first. Ties keep input order.
pub fn polarity_ranking(result: &AggregateResult) -> Vec<&Article> {
    let mut scored: Vec<(f64, &Article)> = result.all().map(|a| (a.polarity().abs(), a)).collect();
    // sort_by is stable
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().map(|(_, a)| a).collect()
}

pub fn spotlight(result: &AggregateResult) -> Vec<&Article> {
    let mut ranked = polarity_ranking(result);
    ranked.truncate(SPOTLIGHT_SIZE);
    ranked
}

pub fn is_business(article: &Article) -> bool {
    article
        .category
        .as_deref()
        .map(|c| {
            let c = c.trim();
            BUSINESS_TOPICS.iter().any(|topic| c.eq_ignore_ascii_case(topic))
        })
        .unwrap_or(false)
}

/// Business articles from `daily`, or all of `daily` when none match.
pub fn category_filter(daily: &[Article]) -> Vec<&Article> {
    let matching: Vec<&Article> = daily.iter().filter(|a| is_business(a)).collect();
    if matching.is_empty() {
        daily.iter().collect()
    } else {
        matching
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BiasLabel {
    Left,
    Neutral,
    Right,
}

impl fmt::Display for BiasLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BiasLabel::Left => "Left",
            BiasLabel::Neutral => "Neutral",
            BiasLabel::Right => "Right",
        };
        f.write_str(label)
    }
}

/// Argmax of the weights. Center wins any tie it is part of; Left wins a
/// Left/Right tie.
pub fn bias_label(bias: &BiasPct) -> BiasLabel {
    if bias.center >= bias.left && bias.center >= bias.right {
        BiasLabel::Neutral
    } else if bias.left >= bias.right {
        BiasLabel::Left
    } else {
        BiasLabel::Right
    }
}

/// Case-insensitive substring match on title or source name. A blank query matches.
pub fn matches_query(article: &Article, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    article.title.to_lowercase().contains(&query)
        || article.source_name.to_lowercase().contains(&query)
}

pub fn filter_by_tone<'a>(articles: &'a [Article], tone: Tone) -> Vec<&'a Article> {
    articles
        .iter()
        .filter(|a| sentiment::classify(a.polarity()) == tone)
        .collect()
}

/// Tone shares for one outlet, in whole percent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutletSentiment {
    pub source_name: String,
    pub count: usize,
    pub positive: u8,
    pub neutral: u8,
    pub negative: u8,
}

/// Per-outlet tone breakdown, outlets in first-seen order.
pub fn outlet_leaderboard<'a, I>(articles: I) -> Vec<OutletSentiment>
where
    I: IntoIterator<Item = &'a Article>,
{
    let mut tallies: Vec<(String, [usize; 3])> = Vec::new();

    for article in articles {
        let slot = match sentiment::classify(article.polarity()) {
            Tone::Positive => 0,
            Tone::Neutral => 1,
            Tone::Negative => 2,
        };
        match tallies.iter_mut().find(|(name, _)| *name == article.source_name) {
            Some((_, counts)) => counts[slot] += 1,
            None => {
                let mut counts = [0; 3];
                counts[slot] = 1;
                tallies.push((article.source_name.clone(), counts));
            }
        }
    }

    tallies
        .into_iter()
        .map(|(source_name, [pos, neu, neg])| {
            let count = pos + neu + neg;
            let share = |n: usize| ((n as f64 / count as f64) * 100.0).round() as u8;
            OutletSentiment {
                source_name,
                count,
                positive: share(pos),
                neutral: share(neu),
                negative: share(neg),
            }
        })
        .collect()
}

/// An article together with its resolved score and display transforms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredArticle {
    #[serde(flatten)]
    pub article: Article,
    pub score: f64,
    pub percent: u8,
    pub tone: Tone,
}

impl ScoredArticle {
    pub fn new(article: &Article) -> Self {
        let score = article.polarity();
        Self {
            article: article.clone(),
            score,
            percent: sentiment::to_percent(score),
            tone: sentiment::classify(score),
        }
    }
}

fn scored<'a, I>(articles: I) -> Vec<ScoredArticle>
where
    I: IntoIterator<Item = &'a Article>,
{
    articles.into_iter().map(ScoredArticle::new).collect()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BriefingOptions {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub sentiment: Option<Tone>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl BriefingOptions {
    fn keeps(&self, article: &Article) -> bool {
        let query_ok = self
            .q
            .as_deref()
            .map(|q| matches_query(article, q))
            .unwrap_or(true);
        let tone_ok = self
            .sentiment
            .map(|tone| sentiment::classify(article.polarity()) == tone)
            .unwrap_or(true);
        query_ok && tone_ok
    }
}

/// Every derived view the front page needs, computed from one aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Briefing {
    pub ok: bool,
    pub main: Option<ScoredArticle>,
    pub latest: Vec<ScoredArticle>,
    pub spotlight: Vec<ScoredArticle>,
    pub business: Vec<ScoredArticle>,
    pub leaderboard: Vec<OutletSentiment>,
}

impl Briefing {
    /// Filters from `options` run first; the lead story is the first
    /// article that survives them.
    pub fn build(result: &AggregateResult, options: &BriefingOptions) -> Self {
        let kept: Vec<Article> = result.all().filter(|a| options.keeps(a)).cloned().collect();
        let view = AggregateResult::from_articles(kept);
        let limit = options.limit.unwrap_or(DEFAULT_LIST_SIZE);

        Self {
            ok: result.ok,
            main: view.main.as_ref().map(ScoredArticle::new),
            latest: scored(bounded_slice(&view.daily, limit)),
            spotlight: scored(spotlight(&view)),
            business: scored(category_filter(&view.daily)),
            leaderboard: outlet_leaderboard(view.all()),
        }
    }
}
