//! Locale negotiation.
//!
//! The storefront ships two locales. Translation bundles are loaded by the
//! client; pages only declare which locale and namespaces they need.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Namespaces every page needs.
pub const COMMON_NAMESPACES: &[&str] = &["common"];

/// Supported locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    /// Traditional Chinese (Taiwan).
    #[default]
    #[serde(rename = "zh-TW")]
    ZhTw,
    #[serde(rename = "en")]
    En,
}

/// A locale tag the storefront does not serve.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported locale: {0}")]
pub struct UnsupportedLocale(pub String);

impl Locale {
    pub const ALL: [Self; 2] = [Self::ZhTw, Self::En];

    /// BCP 47 tag.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::ZhTw => "zh-TW",
            Self::En => "en",
        }
    }

    /// Match a language tag loosely: `zh`, `zh-tw`, `zh-Hant` and `en-US`
    /// all resolve.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_ascii_lowercase();
        let primary = tag.split(['-', '_']).next().unwrap_or_default();
        match primary {
            "zh" if !tag.contains("cn") && !tag.contains("hans") => Some(Self::ZhTw),
            "en" => Some(Self::En),
            _ => None,
        }
    }

    /// Pick the locale for a request.
    ///
    /// An explicit `?lang=` wins, then the highest-weighted supported
    /// `Accept-Language` entry, then `default`.
    #[must_use]
    pub fn negotiate(query: Option<&str>, accept_language: Option<&str>, default: Self) -> Self {
        query
            .and_then(Self::from_tag)
            .or_else(|| accept_language.and_then(Self::from_accept_language))
            .unwrap_or(default)
    }

    fn from_accept_language(header: &str) -> Option<Self> {
        let mut ranges: Vec<(Self, f32)> = header
            .split(',')
            .filter_map(|range| {
                let mut parts = range.split(';');
                let locale = Self::from_tag(parts.next()?)?;
                let weight = parts
                    .find_map(|p| p.trim().strip_prefix("q="))
                    .and_then(|q| q.trim().parse::<f32>().ok())
                    .unwrap_or(1.0);
                (weight > 0.0).then_some((locale, weight))
            })
            .collect();
        // stable, so equal weights keep header order
        ranges.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranges.first().map(|(locale, _)| *locale)
    }
}

impl FromStr for Locale {
    type Err = UnsupportedLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| UnsupportedLocale(s.to_string()))
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
