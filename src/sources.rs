// src/sources.rs
//! The fixed catalogue of trend sources: store keys, panel titles, display caps
//! and the section each panel belongs to.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Youtube,
    Tiktok,
    #[serde(rename = "google_trends")]
    GoogleTrends,
    Wikipedia,
    HackerNews,
    Github,
}

impl Source {
    /// Board order. `index()` is the position in this array.
    pub const ALL: [Source; 6] = [
        Source::Youtube,
        Source::Tiktok,
        Source::GoogleTrends,
        Source::Wikipedia,
        Source::HackerNews,
        Source::Github,
    ];

    /// Partition key value in the trend table.
    pub fn key(self) -> &'static str {
        match self {
            Source::Youtube => "youtube",
            Source::Tiktok => "tiktok",
            Source::GoogleTrends => "google_trends",
            Source::Wikipedia => "wikipedia",
            Source::HackerNews => "hackernews",
            Source::Github => "github",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn title(self) -> &'static str {
        match self {
            Source::Youtube => "YouTube Trending",
            Source::Tiktok => "TikTok Viral",
            Source::GoogleTrends => "Google Searches",
            Source::Wikipedia => "Wikipedia Top Reads",
            Source::HackerNews => "Hacker News",
            Source::Github => "GitHub Trending",
        }
    }

    pub fn section(self) -> Section {
        match self {
            Source::Youtube | Source::Tiktok | Source::GoogleTrends => Section::Social,
            Source::Wikipedia | Source::HackerNews | Source::Github => Section::Tech,
        }
    }

    /// Maximum number of items shown in the panel; `None` shows everything.
    pub fn display_cap(self) -> Option<usize> {
        match self {
            Source::Youtube | Source::Tiktok => Some(8),
            Source::Wikipedia => Some(10),
            Source::GoogleTrends | Source::HackerNews | Source::Github => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Social,
    Tech,
}

impl Section {
    pub const ALL: [Section; 2] = [Section::Social, Section::Tech];

    pub fn heading(self) -> &'static str {
        match self {
            Section::Social => "Social Media",
            Section::Tech => "Tech & Knowledge",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Section::Social => "social",
            Section::Tech => "tech",
        }
    }

    pub fn sources(self) -> impl Iterator<Item = Source> {
        Source::ALL.into_iter().filter(move |s| s.section() == self)
    }
}
