//! Type definitions for the drama-watcher application.
//!
//! This module contains the catalog records returned by the DramaBox API:
//! dramas, their episodes, and the CDN groups and bitrate variants each
//! episode can be streamed from.
//!
//! The upstream data is partial and not always well-typed, so every field
//! is deserialized leniently: missing or `null` lists become empty,
//! identifiers may arrive as strings or numbers, and flags arrive as `0`/`1`.

use serde::Deserialize;

/// A tag attached to a drama, with both the localized and English name.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Tag {
    #[serde(rename = "tagId", default, deserialize_with = "lenient::number")]
    pub tag_id: u64,

    #[serde(rename = "tagName", default, deserialize_with = "lenient::nullable")]
    pub tag_name: String,

    #[serde(rename = "tagEnName", default, deserialize_with = "lenient::nullable")]
    pub tag_en_name: String,
}

/// Corner badge shown over a cover ("Hot", "New", ...).
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Corner {
    #[serde(rename = "cornerType", default, deserialize_with = "lenient::number")]
    pub corner_type: u64,

    #[serde(default, deserialize_with = "lenient::nullable")]
    pub name: String,

    #[serde(default, deserialize_with = "lenient::nullable")]
    pub color: String,
}

/// Ranking metadata for trending listings.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Rank {
    #[serde(rename = "rankType", default, deserialize_with = "lenient::number")]
    pub rank_type: u64,

    #[serde(rename = "hotCode", default, deserialize_with = "lenient::nullable")]
    pub hot_code: String,

    #[serde(rename = "recCopy", default, deserialize_with = "lenient::nullable")]
    pub rec_copy: String,

    #[serde(default, deserialize_with = "lenient::number")]
    pub sort: u64,
}

/// A drama (catalog entry) as returned by the listing and detail endpoints.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Drama {
    /// Unique identifier of the drama.
    #[serde(rename = "bookId", default, deserialize_with = "lenient::id")]
    pub book_id: String,

    /// Display title.
    #[serde(rename = "bookName", default, deserialize_with = "lenient::nullable")]
    pub book_name: String,

    /// Cover image URL.
    #[serde(rename = "coverWap", default, deserialize_with = "lenient::nullable")]
    pub cover_wap: String,

    /// Number of episodes the catalog advertises.
    #[serde(rename = "chapterCount", default, deserialize_with = "lenient::number")]
    pub chapter_count: usize,

    /// Synopsis.
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub introduction: String,

    #[serde(default, deserialize_with = "lenient::nullable")]
    pub tags: Vec<String>,

    #[serde(rename = "tagV3s", default, deserialize_with = "lenient::nullable")]
    pub tag_v3s: Vec<Tag>,

    /// Pre-formatted popularity figure, e.g. "1.2M".
    #[serde(rename = "playCount", default)]
    pub play_count: Option<String>,

    #[serde(default)]
    pub corner: Option<Corner>,

    #[serde(rename = "rankVo", default)]
    pub rank_vo: Option<Rank>,

    #[serde(rename = "shelfTime", default)]
    pub shelf_time: Option<String>,
}

impl Drama {
    /// Format the drama for display in selection menus.
    ///
    /// # Examples
    ///
    /// ```
    /// use drama_watcher::types::Drama;
    ///
    /// let drama = Drama {
    ///     book_id: "41000102882".to_string(),
    ///     book_name: "The Hidden Heiress".to_string(),
    ///     chapter_count: 80,
    ///     ..Default::default()
    /// };
    /// assert_eq!(drama.to_display(), "The Hidden Heiress (80 eps)");
    /// ```
    pub fn to_display(&self) -> String {
        format!("{} ({} eps)", self.book_name, self.chapter_count)
    }

    /// All tag names, preferring the plain `tags` list and falling back to
    /// the structured `tagV3s` names.
    pub fn tag_names(&self) -> Vec<&str> {
        if !self.tags.is_empty() {
            return self.tags.iter().map(String::as_str).collect();
        }
        self.tag_v3s
            .iter()
            .map(|t| t.tag_name.as_str())
            .filter(|name| !name.is_empty())
            .collect()
    }
}

/// One bitrate variant of an episode within a CDN group.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct VideoVariant {
    /// Vertical resolution, e.g. 720.
    #[serde(default, deserialize_with = "lenient::number")]
    pub quality: u32,

    /// Playable URL.
    #[serde(rename = "videoPath", default, deserialize_with = "lenient::nullable")]
    pub video_path: String,

    /// Whether this is the group's default variant.
    #[serde(rename = "isDefault", default, deserialize_with = "lenient::flag")]
    pub is_default: bool,
}

impl VideoVariant {
    /// Format the variant's quality for display.
    ///
    /// ```
    /// use drama_watcher::types::VideoVariant;
    ///
    /// let v = VideoVariant { quality: 1080, ..Default::default() };
    /// assert_eq!(v.to_display(), "1080p");
    /// ```
    pub fn to_display(&self) -> String {
        format!("{}p", self.quality)
    }
}

/// A set of bitrate variants served from one CDN host.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct CdnGroup {
    #[serde(rename = "cdnDomain", default, deserialize_with = "lenient::nullable")]
    pub cdn_domain: String,

    /// Whether the API marks this group as the preferred one.
    #[serde(rename = "isDefault", default, deserialize_with = "lenient::flag")]
    pub is_default: bool,

    #[serde(rename = "videoPathList", default, deserialize_with = "lenient::nullable")]
    pub video_path_list: Vec<VideoVariant>,
}

/// An episode (chapter) of a drama.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Episode {
    #[serde(rename = "chapterId", default, deserialize_with = "lenient::id")]
    pub chapter_id: String,

    #[serde(rename = "chapterName", default, deserialize_with = "lenient::nullable")]
    pub chapter_name: String,

    /// Position of the episode inside its drama.
    #[serde(rename = "chapterIndex", default, deserialize_with = "lenient::number")]
    pub chapter_index: usize,

    /// Delivery groups; empty when the episode is not encoded yet.
    #[serde(rename = "cdnList", default, deserialize_with = "lenient::nullable")]
    pub cdn_list: Vec<CdnGroup>,

    /// Thumbnail URL.
    #[serde(rename = "chapterImg", default)]
    pub chapter_img: Option<String>,

    /// Whether the episode is behind a paywall upstream.
    #[serde(rename = "isCharge", default, deserialize_with = "lenient::flag")]
    pub is_charge: bool,
}

impl Episode {
    /// Label for the episode, falling back to its position when the API
    /// sends no name.
    ///
    /// ```
    /// use drama_watcher::types::Episode;
    ///
    /// let named = Episode { chapter_name: "EP 3".to_string(), ..Default::default() };
    /// assert_eq!(named.to_display(3), "EP 3");
    ///
    /// let unnamed = Episode::default();
    /// assert_eq!(unnamed.to_display(7), "EP 7");
    /// ```
    pub fn to_display(&self, number: usize) -> String {
        if self.chapter_name.trim().is_empty() {
            format!("EP {}", number)
        } else {
            self.chapter_name.clone()
        }
    }
}

/// Deserializers that tolerate the loosely-typed upstream JSON.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// `1`, `1.0`, `true` or `"1"` are set; every other value is unset.
    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Bool(b) => b,
            Value::Number(n) => n.as_f64() == Some(1.0),
            Value::String(s) => s.trim() == "1",
            _ => false,
        })
    }

    /// Identifiers arrive as strings or bare numbers.
    pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            _ => String::new(),
        })
    }

    /// Non-negative integer from a number or numeric string; anything else is 0.
    pub fn number<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<u64> + Default,
    {
        let raw = match Value::deserialize(d)? {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        Ok(raw.and_then(|v| T::try_from(v).ok()).unwrap_or_default())
    }

    /// Treat an explicit `null` the same as a missing field.
    pub fn nullable<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Default,
    {
        Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
    }
}
