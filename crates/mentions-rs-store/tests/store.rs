//! Tests for mention persistence and windowed queries.

use mentions_rs_store::{
    ColumnCount, Emoji, Entity, MentionColumn, MentionQuery, MentionStore, MessageType,
    SqlitePool, StoreError, TimeInterval, ValueCount,
};
use mentions_rs_test_utils::{RecordBuilder, at, day_window, memory_store};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

fn emoji(value: &str) -> RecordBuilder<Emoji> {
    RecordBuilder::new(value)
}

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

/// Persisting the same identity key twice sums the occurrences.
#[test]
fn persist_merges_duplicate_keys() {
    let store = memory_store::<Emoji>();
    let first = emoji("tada").user("ann").room("general").occurrences(2).build();
    let second = emoji("tada").user("ann").room("general").occurrences(5).build();

    store.persist(&first).expect("first persist");
    store.persist(&second).expect("second persist");

    let stored = store.get_value(&first).expect("lookup").expect("record");
    assert_eq!(stored.occurrences, 7);
    assert_eq!(store.count_records().expect("count"), 1);
}

/// A merge keeps the stored non-key fields and only grows occurrences.
#[test]
fn persist_merge_keeps_existing_bot_flag() {
    let store = memory_store::<Emoji>();
    let human = emoji("tada").user("ann").room("general").build();
    let flagged = emoji("tada").user("ann").room("general").bot().build();

    store.persist(&human).expect("persist human");
    store.persist(&flagged).expect("persist flagged");

    let stored = store.get_value(&flagged).expect("lookup").expect("record");
    assert_eq!(stored.is_bot, false);
    assert_eq!(stored.occurrences, 2);
}

/// Zero-occurrence records are rejected instead of silently stored.
#[test]
fn persist_rejects_zero_occurrences() {
    let store = memory_store::<Emoji>();
    let err = store
        .persist(&emoji("tada").occurrences(0).build())
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidArgument(_)));
    assert_eq!(store.count_records().expect("count"), 0);
}

/// A merge that would overflow the stored count is refused and the row stays readable.
#[test]
fn persist_rejects_overflowing_merge() {
    let store = memory_store::<Emoji>();
    let full = emoji("tada")
        .user("ann")
        .room("general")
        .occurrences(i64::MAX as u64)
        .build();
    store.persist(&full).expect("first persist");

    let err = store
        .persist(&emoji("tada").user("ann").room("general").build())
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidArgument(_)));

    let stored = store.get_value(&full).expect("lookup").expect("record");
    assert_eq!(stored.occurrences, i64::MAX as u64);
    let all = store.get_all_mentions(&day_window(), &[], &[]).expect("all");
    assert_eq!(all.len(), 1);
}

/// Lookups for unknown keys report absence explicitly.
#[test]
fn get_value_reports_missing_key() {
    let store = memory_store::<Emoji>();
    store
        .persist(&emoji("tada").user("ann").build())
        .expect("persist");
    let missing = store
        .get_value(&emoji("tada").user("bob").build())
        .expect("lookup");
    assert_eq!(missing, None);
}

/// The window is inclusive at the start and exclusive at the end.
#[test]
fn window_is_half_open() {
    let store = memory_store::<Emoji>();
    store.persist(&emoji("a").hour(2).build()).expect("persist");
    store.persist(&emoji("a").hour(4).build()).expect("persist");
    let window = TimeInterval::new(at(2), at(4)).expect("window");

    let records = store
        .get_all_mentions_for_value(&Emoji::from("a"), &window, &[], &[])
        .expect("query");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].mention_time, at(2));
}

/// Room and user lists filter with set membership; empty lists do not filter.
#[test]
fn room_and_user_filters_accept_multiple_names() {
    let store = memory_store::<Emoji>();
    for (room, user) in [("r1", "ann"), ("r2", "bob"), ("r3", "ann"), ("r1", "cat")] {
        store
            .persist(&emoji("wave").room(room).user(user).build())
            .expect("persist");
    }
    let window = day_window();

    let by_room = store
        .get_all_mentions(&window, &names(&["r1", "r3"]), &[])
        .expect("rooms");
    assert_eq!(by_room.len(), 3);

    let by_both = store
        .get_all_mentions(&window, &names(&["r1", "r3"]), &names(&["ann"]))
        .expect("rooms and users");
    assert_eq!(by_both.len(), 2);

    let everything = store.get_all_mentions(&window, &[], &[]).expect("all");
    assert_eq!(everything.len(), 4);
}

/// Value lookups honour room and user filters together with the value.
#[test]
fn mentions_for_value_filter_by_room_and_user() {
    let store = memory_store::<Emoji>();
    for (value, room, user) in [
        ("wave", "r1", "ann"),
        ("wave", "r2", "ann"),
        ("wave", "r1", "bob"),
        ("tada", "r1", "ann"),
    ] {
        store
            .persist(&emoji(value).room(room).user(user).build())
            .expect("persist");
    }
    let wave = Emoji::from("wave");
    let window = day_window();

    let in_r1 = store
        .get_all_mentions_for_value(&wave, &window, &names(&["r1"]), &[])
        .expect("room filter");
    let mut users: Vec<&str> = in_r1.iter().map(|record| record.username.as_str()).collect();
    users.sort_unstable();
    assert_eq!(users, vec!["ann", "bob"]);

    let ann_in_r1 = store
        .get_all_mentions_for_value(&wave, &window, &names(&["r1"]), &names(&["ann"]))
        .expect("room and user filter");
    assert_eq!(ann_in_r1.len(), 1);
    assert_eq!(ann_in_r1[0].room_name, "r1");
    assert_eq!(ann_in_r1[0].value, wave);

    let nobody = store
        .get_all_mentions_for_value(&wave, &window, &[], &names(&["cat"]))
        .expect("unknown user");
    assert!(nobody.is_empty());
}

/// Totals are zero, not an error, when nothing matches.
#[test]
fn totals_default_to_zero() {
    let store = memory_store::<Emoji>();
    let total = store
        .get_total_mentions_for_type(&Emoji::from("none"), &day_window(), &[], &[], true)
        .expect("total");
    assert_eq!(total, 0);
    let volume = store
        .get_total_mentions_of_type(&day_window(), &[], &[], false)
        .expect("volume");
    assert_eq!(volume, 0);
}

/// Excluding bots drops bot-authored occurrences from totals.
#[test]
fn totals_can_exclude_bots() {
    let store = memory_store::<Emoji>();
    store
        .persist(&emoji("tada").user("ann").occurrences(3).build())
        .expect("persist");
    store
        .persist(&emoji("tada").user("ci-bot").occurrences(4).bot().build())
        .expect("persist");
    store
        .persist(&emoji("wave").user("ann").build())
        .expect("persist");
    let window = day_window();
    let tada = Emoji::from("tada");

    let with_bots = store
        .get_total_mentions_for_type(&tada, &window, &[], &[], true)
        .expect("with bots");
    let without_bots = store
        .get_total_mentions_for_type(&tada, &window, &[], &[], false)
        .expect("without bots");
    assert_eq!((with_bots, without_bots), (7, 3));

    let all = store
        .get_total_mentions_of_type(&window, &[], &[], false)
        .expect("all");
    assert_eq!(all, 4);
}

/// Top values come back in descending order of summed occurrences.
#[test]
fn top_values_are_ranked_descending() {
    let store = memory_store::<Emoji>();
    store
        .persist(&emoji("b").user("ann").build())
        .expect("persist");
    store
        .persist(&emoji("a").user("ann").occurrences(2).build())
        .expect("persist");
    store
        .persist(&emoji("a").user("bob").build())
        .expect("persist");

    let top = store
        .get_top_values_of_type(&day_window(), &[], &[], 10, true)
        .expect("top");
    assert_eq!(
        top,
        vec![
            ValueCount {
                value: Emoji::from("a"),
                occurrences: 3
            },
            ValueCount {
                value: Emoji::from("b"),
                occurrences: 1
            },
        ]
    );
}

/// Result size truncates the ranking and equal sums order by value.
#[test]
fn top_values_respect_size_and_tie_break() {
    let store = memory_store::<Emoji>();
    for value in ["delta", "alpha", "charlie", "bravo"] {
        store.persist(&emoji(value).build()).expect("persist");
    }
    store
        .persist(&emoji("zulu").occurrences(9).build())
        .expect("persist");

    let top = store
        .get_top_values_of_type(&day_window(), &[], &[], 3, true)
        .expect("top");
    let ranked: Vec<&str> = top.iter().map(|entry| entry.value.as_str()).collect();
    assert_eq!(ranked, vec!["zulu", "alpha", "bravo"]);
}

/// A result size beyond the SQL integer range means "everything".
#[test]
fn top_values_accept_unbounded_size() {
    let store = memory_store::<Emoji>();
    for value in ["a", "b", "c"] {
        store.persist(&emoji(value).build()).expect("persist");
    }
    let top = store
        .get_top_values_of_type(&day_window(), &[], &[], usize::MAX, true)
        .expect("top");
    assert_eq!(top.len(), 3);
}

/// Grouped column totals sum per room.
#[test]
fn column_totals_group_by_room() {
    let store = memory_store::<Entity>();
    let rust = || RecordBuilder::<Entity>::new("rust");
    store
        .persist(&rust().room("r1").user("ann").occurrences(2).build())
        .expect("persist");
    store
        .persist(&rust().room("r2").user("ann").build())
        .expect("persist");
    store
        .persist(&rust().room("r1").user("bob").build())
        .expect("persist");

    let totals = store
        .get_column_totals(MentionColumn::Room, &MentionQuery::new().within(day_window()))
        .expect("totals");
    assert_eq!(
        totals,
        vec![
            ColumnCount {
                label: "r1".to_string(),
                occurrences: 3
            },
            ColumnCount {
                label: "r2".to_string(),
                occurrences: 1
            },
        ]
    );
}

/// Stores for different value types over one pool never see each other's rows.
#[test]
fn categories_share_a_pool_without_mixing() {
    let pool = SqlitePool::open_in_memory().expect("pool");
    let emoji_store = MentionStore::<Emoji>::new(pool.clone());
    let entity_store = MentionStore::<Entity>::new(pool.clone());
    let type_store = MentionStore::<MessageType>::new(pool);

    emoji_store
        .persist(&emoji("rust").build())
        .expect("emoji");
    entity_store
        .persist(&RecordBuilder::<Entity>::new("rust").build())
        .expect("entity");
    type_store
        .persist(&RecordBuilder::<MessageType>::new(MessageType::Question).occurrences(2).build())
        .expect("type");

    assert_eq!(emoji_store.count_records().expect("emoji count"), 1);
    assert_eq!(entity_store.count_records().expect("entity count"), 1);
    let top = type_store
        .get_top_values_of_type(&day_window(), &[], &[], 5, true)
        .expect("types");
    assert_eq!(top[0].value, MessageType::Question);
    assert_eq!(top[0].occurrences, 2);
}

/// Concurrent merges into the same key never lose an update.
#[test]
fn concurrent_merges_are_not_lost() {
    let store = Arc::new(memory_store::<Emoji>());
    let record = emoji("tada").user("ann").room("general").build();

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let store = Arc::clone(&store);
            let record = record.clone();
            scope.spawn(move || {
                for _ in 0..25 {
                    store.persist(&record).expect("persist");
                }
            });
        }
    });

    let stored = store.get_value(&record).expect("lookup").expect("record");
    assert_eq!(stored.occurrences, 200);
}

/// A file-backed store keeps its rows across reopen.
#[test]
fn file_store_survives_reopen() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("mentions.db");
    let record = emoji("tada").user("ann").occurrences(4).build();
    {
        let pool = SqlitePool::open(&path, Duration::from_secs(1)).expect("open");
        MentionStore::<Emoji>::new(pool)
            .persist(&record)
            .expect("persist");
    }
    let pool = SqlitePool::open(&path, Duration::from_secs(1)).expect("reopen");
    let stored = MentionStore::<Emoji>::new(pool)
        .get_value(&record)
        .expect("lookup")
        .expect("record");
    assert_eq!(stored, record);
}

/// Query results serialise as plain records for downstream consumers.
#[test]
fn records_serialise_for_consumers() {
    let store = memory_store::<MessageType>();
    let record = RecordBuilder::<MessageType>::new(MessageType::Question)
        .user("ann")
        .room("general")
        .occurrences(3)
        .build();
    store.persist(&record).expect("persist");

    let records = store
        .get_all_mentions(&day_window(), &[], &[])
        .expect("records");
    let json = serde_json::to_value(&records).expect("json");
    assert_eq!(json[0]["value"], "question");
    assert_eq!(json[0]["room_name"], "general");
    assert_eq!(json[0]["occurrences"], 3);
    assert_eq!(json[0]["is_bot"], false);
}
