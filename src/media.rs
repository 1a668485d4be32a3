//! Video URL and quality selection for an episode.
//!
//! An episode carries a list of CDN groups, each offering several bitrate
//! variants. These helpers pick one playable URL out of that structure and
//! list the qualities the user can switch between. They do no I/O and never
//! fail: missing data resolves to `None` or to a fallback list.

use crate::types::{CdnGroup, Episode, VideoVariant};

/// Quality used when the user has no stored preference.
pub const DEFAULT_QUALITY: u32 = 720;

/// Qualities offered when an episode has no usable variants yet.
pub const FALLBACK_QUALITIES: [u32; 4] = [360, 540, 720, 1080];

/// Rules tried in order when choosing a variant within a CDN group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantRule {
    /// Quality equals the user's preferred quality.
    ExactQuality,
    /// Variant flagged as the group default.
    FlaggedDefault,
    /// First variant in list order.
    FirstListed,
}

impl VariantRule {
    /// Tie-break order used by [`select_variant`].
    pub const ORDER: [VariantRule; 3] = [
        VariantRule::ExactQuality,
        VariantRule::FlaggedDefault,
        VariantRule::FirstListed,
    ];

    fn matches(self, variant: &VideoVariant, preferred_quality: u32) -> bool {
        match self {
            VariantRule::ExactQuality => variant.quality == preferred_quality,
            VariantRule::FlaggedDefault => variant.is_default,
            VariantRule::FirstListed => true,
        }
    }
}

/// The CDN group to stream from: the first one flagged default, otherwise
/// the first in the list.
pub fn preferred_group(episode: &Episode) -> Option<&CdnGroup> {
    episode
        .cdn_list
        .iter()
        .find(|group| group.is_default)
        .or_else(|| episode.cdn_list.first())
}

/// Pick a variant from `variants` by walking [`VariantRule::ORDER`].
pub fn select_variant(variants: &[VideoVariant], preferred_quality: u32) -> Option<&VideoVariant> {
    VariantRule::ORDER.iter().find_map(|rule| {
        variants
            .iter()
            .find(|variant| rule.matches(variant, preferred_quality))
    })
}

/// Resolve the URL to play for `episode` at `preferred_quality`.
///
/// Returns `None` when the episode is missing, has no CDN groups, its
/// preferred group has no variants, or the chosen variant has an empty URL.
///
/// # Examples
///
/// ```
/// use drama_watcher::media::resolve_video_url;
/// use drama_watcher::types::{CdnGroup, Episode, VideoVariant};
///
/// let episode = Episode {
///     cdn_list: vec![CdnGroup {
///         video_path_list: vec![
///             VideoVariant { quality: 540, video_path: "https://cdn/540.mp4".into(), is_default: true },
///             VideoVariant { quality: 720, video_path: "https://cdn/720.mp4".into(), is_default: false },
///         ],
///         ..Default::default()
///     }],
///     ..Default::default()
/// };
///
/// assert_eq!(resolve_video_url(Some(&episode), 720), Some("https://cdn/720.mp4"));
/// assert_eq!(resolve_video_url(Some(&episode), 1080), Some("https://cdn/540.mp4"));
/// assert_eq!(resolve_video_url(None, 720), None);
/// ```
pub fn resolve_video_url(episode: Option<&Episode>, preferred_quality: u32) -> Option<&str> {
    let group = preferred_group(episode?)?;
    let variant = select_variant(&group.video_path_list, preferred_quality)?;
    Some(variant.video_path.as_str()).filter(|url| !url.is_empty())
}

/// Qualities available for `episode`, sorted ascending.
///
/// Duplicates are kept and equal values stay in list order. When there is
/// no usable group or variant list, [`FALLBACK_QUALITIES`] is returned so
/// the quality menu always has options.
pub fn available_qualities(episode: Option<&Episode>) -> Vec<u32> {
    let variants = episode
        .and_then(preferred_group)
        .map(|group| group.video_path_list.as_slice())
        .unwrap_or_default();

    if variants.is_empty() {
        return FALLBACK_QUALITIES.to_vec();
    }

    let mut qualities: Vec<u32> = variants.iter().map(|v| v.quality).collect();
    qualities.sort();
    qualities
}
