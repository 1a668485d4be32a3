//! Integration tests for drama-watcher.
//!
//! These tests verify the integration between different modules
//! using mock data where appropriate.

use drama_watcher::api::{parse_detail, parse_dramas, parse_episodes, parse_popular_search};
use drama_watcher::config::Config;
use drama_watcher::media::{self, DEFAULT_QUALITY, FALLBACK_QUALITIES};
use drama_watcher::paging::{self, EpisodePager};
use drama_watcher::preference::{MemoryQualityStore, QualityStore};
use drama_watcher::tui::{Action, App, Screen};

const EPISODES_JSON: &str = r#"{
    "episodes": [
        {
            "chapterId": "c2",
            "chapterIndex": 1,
            "chapterName": "EP 2",
            "cdnList": [
                {
                    "cdnDomain": "backup.cdn",
                    "isDefault": 0,
                    "videoPathList": [
                        {"quality": 720, "videoPath": "https://backup.cdn/2-720.mp4", "isDefault": 1}
                    ]
                },
                {
                    "cdnDomain": "main.cdn",
                    "isDefault": 1,
                    "videoPathList": [
                        {"quality": 1080, "videoPath": "https://main.cdn/2-1080.mp4", "isDefault": 0},
                        {"quality": 540, "videoPath": "https://main.cdn/2-540.mp4", "isDefault": 1}
                    ]
                }
            ]
        },
        {
            "chapterId": "c1",
            "chapterIndex": 0,
            "chapterName": "EP 1",
            "cdnList": null
        }
    ]
}"#;

/// Test that a wrapped episode listing feeds the media resolver.
#[test]
fn test_episode_listing_to_video_url() {
    let episodes = parse_episodes(EPISODES_JSON).unwrap();
    assert_eq!(episodes.len(), 2);
    assert_eq!(episodes[0].chapter_id, "c1");

    // First episode has no delivery groups
    assert_eq!(media::resolve_video_url(episodes.first(), DEFAULT_QUALITY), None);
    assert_eq!(
        media::available_qualities(episodes.first()),
        FALLBACK_QUALITIES.to_vec()
    );

    // Second episode resolves against its default-flagged group
    let second = episodes.get(1);
    assert_eq!(
        media::resolve_video_url(second, 1080),
        Some("https://main.cdn/2-1080.mp4")
    );
    assert_eq!(
        media::resolve_video_url(second, DEFAULT_QUALITY),
        Some("https://main.cdn/2-540.mp4")
    );
    assert_eq!(media::available_qualities(second), vec![540, 1080]);
}

/// Test catalog listings in both bare and wrapped form.
#[test]
fn test_catalog_listing_shapes() {
    let bare = r#"[{"bookId": "41000100", "bookName": "The CEO's Secret", "chapterCount": 70}]"#;
    let wrapped = r#"{"data": [{"bookId": 41000101, "bookName": "Mafia Bride", "chapterCount": "45"}]}"#;

    let dramas = parse_dramas(bare).unwrap();
    assert_eq!(dramas[0].to_display(), "The CEO's Secret (70 eps)");

    let dramas = parse_dramas(wrapped).unwrap();
    assert_eq!(dramas[0].book_id, "41000101");
    assert_eq!(dramas[0].chapter_count, 45);
}

/// Test detail decoding and popular search terms.
#[test]
fn test_detail_and_popular_search() {
    let detail = parse_detail(r#"{"data": {"bookId": "7", "bookName": "Reborn", "chapterCount": 3}}"#).unwrap();
    assert_eq!(detail.book_name, "Reborn");
    assert!(parse_detail(r#"{"data": {}}"#).is_err());

    let terms = parse_popular_search(r#"["revenge", {"keyword": "ceo"}]"#).unwrap();
    assert_eq!(terms, vec!["revenge".to_string(), "ceo".to_string()]);
}

/// Test the paginator values used by the watch screen.
#[test]
fn test_paginator_integration() {
    assert_eq!(paging::page_of(31, 30), 2);
    assert_eq!(paging::episodes_on_page(2, 30, 45).len(), 15);
    assert_eq!(paging::visible_page_buttons(5, 10, 5), vec![3, 4, 5, 6, 7]);

    let mut pager = EpisodePager::new(300, 30);
    pager.show_episode(299);
    assert_eq!(pager.page(), 10);
    assert_eq!(pager.buttons(5), vec![6, 7, 8, 9, 10]);
    assert_eq!(pager.range(), Some((271, 300)));
}

/// Test that resolver output is stable across repeated calls.
#[test]
fn test_resolver_and_paginator_are_pure() {
    let episodes = parse_episodes(EPISODES_JSON).unwrap();
    let first = media::resolve_video_url(episodes.get(1), 720).map(str::to_string);
    let second = media::resolve_video_url(episodes.get(1), 720).map(str::to_string);
    assert_eq!(first, second);
    assert_eq!(
        paging::visible_page_buttons(4, 12, 5),
        paging::visible_page_buttons(4, 12, 5)
    );
}

/// Test config defaults and partial TOML.
#[test]
fn test_config_integration() {
    let config = Config::new();
    assert_eq!(config.quality, DEFAULT_QUALITY);
    assert_eq!(config.episodes_per_page, paging::EPISODES_PER_PAGE);

    let partial: Config = toml::from_str("quality = 1080\nplayer = \"vlc\"").unwrap();
    assert_eq!(partial.quality, 1080);
    assert_eq!(partial.player.as_deref(), Some("vlc"));
    assert_eq!(partial.request_timeout_secs, 30);
}

/// Test quality preference through the store trait.
#[test]
fn test_quality_store_integration() {
    let mut store = MemoryQualityStore::new(None);
    assert_eq!(store.load(), None);
    store.save(1080).unwrap();
    assert_eq!(store.load(), Some(1080));
}

/// Test the watch flow from a loaded drama through the app state.
#[test]
fn test_watch_flow_integration() {
    let episodes = parse_episodes(EPISODES_JSON).unwrap();
    let drama = parse_dramas(r#"[{"bookId": "9", "bookName": "Two Parts", "chapterCount": 2}]"#)
        .unwrap()
        .remove(0);

    let mut app = App::new(1080, 30, Default::default());
    app.set_drama(drama, episodes);
    assert_eq!(app.screen, Screen::Detail);

    assert_eq!(app.go_to_episode(1), Action::Play(1));
    assert_eq!(app.video_url(), None);

    assert_eq!(app.go_to_episode(2), Action::Play(2));
    assert_eq!(app.video_url(), Some("https://main.cdn/2-1080.mp4"));
    assert_eq!(app.go_to_episode(3), Action::None);
}
