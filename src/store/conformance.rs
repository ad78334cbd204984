//! Behaviour every [`VideoStore`] backend must show. Each backend's test
//! module runs these checks against a freshly initialised, empty store.

use std::collections::HashMap;

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use crate::entities::videos::{Insertion, SortOrder, Video, VideoQuery, MAX_PAGE_SIZE};
use crate::store::VideoStore;

pub(crate) fn video(id: &str, title: &str, minute: u32) -> Video {
    Video {
        video_id: id.to_string(),
        title: title.to_string(),
        description: Some(format!("about {title}")),
        published_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap(),
        thumbnail_url: Some(format!("https://i.ytimg.com/vi/{id}/default.jpg")),
    }
}

pub(crate) fn ids(videos: &[Video]) -> Vec<&str> {
    videos.iter().map(|v| v.video_id.as_str()).collect()
}

async fn seed(store: &dyn VideoStore) {
    // Inserted out of order: listing orders by published_at.
    for (id, title, minute) in [
        ("c", "Cricket finals", 3),
        ("a", "Morning nets", 1),
        ("e", "FOOTBALL recap", 5),
        ("b", "foo fighters live", 2),
        ("d", "Bowling Foo drills", 4),
    ] {
        store.create_if_absent(video(id, title, minute)).await.unwrap();
    }
}

async fn everything(store: &dyn VideoStore, sort: SortOrder) -> Vec<Video> {
    store
        .list(&VideoQuery {
            limit: MAX_PAGE_SIZE,
            sort,
            ..VideoQuery::default()
        })
        .await
        .unwrap()
}

async fn search(store: &dyn VideoStore, term: &str) -> Vec<Video> {
    store
        .list(&VideoQuery {
            search: Some(term.to_string()),
            ..VideoQuery::default()
        })
        .await
        .unwrap()
}

pub(crate) async fn keeps_first_write(store: &dyn VideoStore) {
    let first = store.create_if_absent(video("x", "first upload", 1)).await.unwrap();
    assert!(first.is_created());

    let mut replay = video("x", "changed title", 9);
    replay.description = None;
    let second = store.create_if_absent(replay).await.unwrap();
    assert_eq!(second, Insertion::Existing(video("x", "first upload", 1)));

    let all = store.list(&VideoQuery::default()).await.unwrap();
    assert_eq!(all, vec![video("x", "first upload", 1)]);
}

pub(crate) async fn latest_timestamp_uses_newest(store: &dyn VideoStore) {
    store.create_if_absent(video("late", "late", 30)).await.unwrap();
    store.create_if_absent(video("early", "early", 10)).await.unwrap();

    let latest = store.latest_timestamp().await.unwrap();
    assert_eq!(latest, Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap());
}

pub(crate) async fn empty_store_bootstraps_from_recent_past(store: &dyn VideoStore) {
    let before = Utc::now();

    let latest = store.latest_timestamp().await.unwrap();

    assert!(latest <= before - chrono::Duration::minutes(4));
    assert!(latest >= before - chrono::Duration::minutes(6));
    assert_eq!(store.latest_published_at().await.unwrap(), None);
}

pub(crate) async fn sorts_in_both_directions(store: &dyn VideoStore) {
    seed(store).await;

    let newest_first = store.list(&VideoQuery::default()).await.unwrap();
    assert_eq!(ids(&newest_first), vec!["e", "d", "c", "b", "a"]);

    let oldest_first = everything(store, SortOrder::Asc).await;
    assert_eq!(ids(&oldest_first), vec!["a", "b", "c", "d", "e"]);
}

pub(crate) async fn search_ignores_case(store: &dyn VideoStore) {
    seed(store).await;
    store.create_if_absent(video("f", "ÉTÉ CRICKET SPECIAL", 6)).await.unwrap();
    store.create_if_absent(video("g", "Крикет сегодня", 7)).await.unwrap();

    for term in ["foo", "FOO", "Foo"] {
        assert_eq!(ids(&search(store, term).await), vec!["e", "d", "b"], "search {term}");
    }
    for term in ["été", "ÉTÉ", "Été"] {
        assert_eq!(ids(&search(store, term).await), vec!["f"], "search {term}");
    }
    assert_eq!(ids(&search(store, "КРИКЕТ").await), vec!["g"]);
    assert_eq!(ids(&search(store, "cricket").await), vec!["f", "c"]);
}

pub(crate) async fn search_matches_wildcards_literally(store: &dyn VideoStore) {
    store.create_if_absent(video("p", "100% cricket", 1)).await.unwrap();
    store.create_if_absent(video("q", "1000 runs", 2)).await.unwrap();
    store.create_if_absent(video("r", "net_session", 3)).await.unwrap();
    store.create_if_absent(video("s", "netXsession", 4)).await.unwrap();

    assert_eq!(ids(&search(store, "100%").await), vec!["p"]);
    assert_eq!(ids(&search(store, "net_").await), vec!["r"]);
}

pub(crate) async fn skip_and_limit_window_the_sorted_sequence(store: &dyn VideoStore) {
    seed(store).await;

    let page = store
        .list(&VideoQuery {
            skip: 2,
            limit: 2,
            sort: SortOrder::Asc,
            ..VideoQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(ids(&page), vec!["c", "d"]);

    let past_the_end = store
        .list(&VideoQuery {
            skip: 10,
            ..VideoQuery::default()
        })
        .await
        .unwrap();
    assert!(past_the_end.is_empty());
}

/// A batch of inserts: (id index, title, minute). Few ids, so repeats are common.
pub(crate) fn inserts() -> impl Strategy<Value = Vec<(u8, String, u32)>> {
    prop::collection::vec((0u8..6, "[a-zA-Z ]{1,16}", 0u32..60), 1..30)
}

/// Inserts `batch` in order and checks that every id keeps its first record
/// and appears exactly once.
pub(crate) async fn first_write_wins(store: &dyn VideoStore, batch: &[(u8, String, u32)]) {
    let mut first: HashMap<String, Video> = HashMap::new();

    for (n, title, minute) in batch {
        let id = format!("vid{n}");
        let outcome = store.create_if_absent(video(&id, title, *minute)).await.unwrap();
        match first.get(&id) {
            Some(kept) => assert_eq!(outcome, Insertion::Existing(kept.clone())),
            None => {
                let candidate = video(&id, title, *minute);
                assert_eq!(outcome, Insertion::Created(candidate.clone()));
                first.insert(id, candidate);
            }
        }
    }

    let mut expected: Vec<Video> = first.into_values().collect();
    expected.sort_by(|a, b| {
        (a.published_at, &a.video_id).cmp(&(b.published_at, &b.video_id))
    });
    assert_eq!(everything(store, SortOrder::Asc).await, expected);
}

/// Inserts `batch` (first write per id wins) and checks ordering and the
/// skip/limit window against the same rows sorted in memory.
pub(crate) async fn ordered_window(
    store: &dyn VideoStore,
    batch: &[(u8, String, u32)],
    sort: SortOrder,
    skip: u32,
    limit: u32,
) {
    let mut rows: HashMap<String, Video> = HashMap::new();
    for (n, title, minute) in batch {
        let candidate = video(&format!("vid{n}"), title, *minute);
        store.create_if_absent(candidate.clone()).await.unwrap();
        rows.entry(candidate.video_id.clone()).or_insert(candidate);
    }

    let mut sorted: Vec<Video> = rows.into_values().collect();
    sorted.sort_by(|a, b| {
        (a.published_at, &a.video_id).cmp(&(b.published_at, &b.video_id))
    });
    if sort == SortOrder::Desc {
        sorted.reverse();
    }

    let listed = everything(store, sort).await;
    assert_eq!(listed, sorted);

    let window = store
        .list(&VideoQuery {
            skip,
            limit,
            sort,
            search: None,
        })
        .await
        .unwrap();
    let expected: Vec<Video> = sorted
        .into_iter()
        .skip(skip as usize)
        .take(limit as usize)
        .collect();
    assert_eq!(window, expected);
}

pub(crate) fn sort_order() -> impl Strategy<Value = SortOrder> {
    prop_oneof![Just(SortOrder::Asc), Just(SortOrder::Desc)]
}
