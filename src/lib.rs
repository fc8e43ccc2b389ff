//! Briefing News - an RSS news aggregator
//!
//! Fetches many independently operated feeds concurrently, normalizes their
//! items into articles, scores each article's tone, and derives the views a
//! news front page shows (lead story, daily list, spotlight, business).
//! A small index ticker rides alongside.

pub mod aggregator;
pub mod article;
pub mod config;
pub mod fetcher;
pub mod image;
pub mod markets;
pub mod normalize;
pub mod ranking;
pub mod report;
pub mod routes;
pub mod sentiment;
