//! Tests for room and user similarity queries.

use mentions_rs_config::SimilarityConfig;
use mentions_rs_similarity::{
    EigenDecomposition, EigenSolver, SimilarityError, SimilarityService, SpectralPartitioner,
    build_co_occurrence_matrix,
};
use mentions_rs_store::{Emoji, MentionColumn, MentionStore};
use mentions_rs_test_utils::{RecordBuilder, day_window, memory_store};
use nalgebra::DMatrix;
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use std::sync::Arc;

struct UnreachableSolver;

impl EigenSolver for UnreachableSolver {
    fn symmetric_eigen(&self, _matrix: DMatrix<f64>) -> Result<EigenDecomposition, SimilarityError> {
        panic!("eigen-decomposition should not run for empty input");
    }
}

fn emoji(value: &str, room: &str, user: &str) -> RecordBuilder<Emoji> {
    RecordBuilder::new(value).room(room).user(user)
}

/// r1 and r2 share "tada", r2 and r3 share "wave".
fn chained_rooms() -> MentionStore<Emoji> {
    let store = memory_store::<Emoji>();
    for record in [
        emoji("tada", "r1", "ann").build(),
        emoji("tada", "r2", "bob").build(),
        emoji("wave", "r2", "bob").hour(2).build(),
        emoji("wave", "r3", "cat").build(),
        emoji("wave", "", "dan").build(),
    ] {
        store.persist(&record).expect("persist");
    }
    store
}

fn service(store: MentionStore<Emoji>) -> SimilarityService<Emoji> {
    SimilarityService::new(
        store,
        SpectralPartitioner::from_config(&SimilarityConfig::default()),
    )
}

fn label_set(labels: &[String]) -> BTreeSet<&str> {
    labels.iter().map(String::as_str).collect()
}

/// Three rooms that share values produce a 3x3 matrix with three labels.
#[test]
fn three_rooms_build_a_three_by_three_matrix() {
    let records = chained_rooms()
        .get_all_mentions(&day_window(), &[], &[])
        .expect("records");
    let records: Vec<_> = records
        .into_iter()
        .filter(|record| !record.room_name.is_empty())
        .collect();
    let matrix = build_co_occurrence_matrix(
        &records,
        |record| record.value.to_string(),
        |record| record.room_name.clone(),
    );
    assert_eq!(matrix.matrix().shape(), (3, 3));
    assert_eq!(label_set(matrix.labels()), BTreeSet::from(["r1", "r2", "r3"]));
    assert_eq!(
        matrix.matrix(),
        &DMatrix::from_row_slice(3, 3, &[1.0, 1.0, 0.0, 1.0, 2.0, 1.0, 0.0, 1.0, 1.0])
    );
}

/// The room linking the other two is placed between them.
#[test]
fn room_similarities_place_bridge_room_in_the_middle() {
    let matrix = service(chained_rooms())
        .get_room_similarities(&day_window(), true)
        .expect("rooms");
    assert_eq!(matrix.dimension(), 3);
    assert_eq!(matrix.labels()[1], "r2");
    assert_eq!(label_set(matrix.labels()), BTreeSet::from(["r1", "r2", "r3"]));
}

/// User similarity clusters on user names, including mentions without a room.
#[test]
fn user_similarities_use_user_names() {
    let matrix = service(chained_rooms())
        .get_user_similarities(&day_window(), true)
        .expect("users");
    assert_eq!(
        label_set(matrix.labels()),
        BTreeSet::from(["ann", "bob", "cat", "dan"])
    );
    assert_eq!(matrix.total_weight(), 13.0);
}

/// Excluding bots removes bot-only rooms from the matrix.
#[test]
fn bot_mentions_can_be_excluded() {
    let store = chained_rooms();
    store
        .persist(&emoji("tada", "builds", "ci-bot").bot().build())
        .expect("persist bot");
    let service = service(store);

    let with_bots = service
        .get_similarities(MentionColumn::Room, &day_window(), true)
        .expect("with bots");
    let without_bots = service
        .get_similarities(MentionColumn::Room, &day_window(), false)
        .expect("without bots");
    assert_eq!(with_bots.dimension(), 4);
    assert_eq!(without_bots.dimension(), 3);
    assert!(!without_bots.labels().contains(&"builds".to_string()));
}

/// A window with no mentions returns the empty matrix without decomposing.
#[test]
fn empty_window_returns_empty_matrix() {
    let service = SimilarityService::new(
        memory_store::<Emoji>(),
        SpectralPartitioner::with_solver(Arc::new(UnreachableSolver), 10),
    );
    let matrix = service
        .get_room_similarities(&day_window(), true)
        .expect("rooms");
    assert!(matrix.is_empty());
}

/// The reordered matrix serialises as labels plus row-major rows.
#[test]
fn similarity_view_serialises() {
    let matrix = service(chained_rooms())
        .get_room_similarities(&day_window(), true)
        .expect("rooms");
    let json = serde_json::to_value(matrix.to_view()).expect("json");
    assert_eq!(json["labels"].as_array().map(Vec::len), Some(3));
    assert_eq!(json["rows"][1][1], serde_json::json!(2.0));
}

/// Too many distinct rooms fail before any matrix or eigen work.
#[test]
fn oversized_requests_fail_before_building() {
    let service = SimilarityService::new(
        chained_rooms(),
        SpectralPartitioner::with_solver(Arc::new(UnreachableSolver), 2),
    );
    let err = service
        .get_room_similarities(&day_window(), true)
        .unwrap_err();
    assert!(matches!(
        err,
        SimilarityError::MatrixTooLarge {
            dimension: 3,
            limit: 2
        }
    ));
}

/// Records without a room do not count toward the dimension bound.
#[test]
fn dimension_bound_ignores_empty_names() {
    let service = SimilarityService::new(
        chained_rooms(),
        SpectralPartitioner::from_config(&SimilarityConfig {
            max_dimension: 3,
            ..SimilarityConfig::default()
        }),
    );
    let matrix = service
        .get_room_similarities(&day_window(), true)
        .expect("similarities");
    assert_eq!(matrix.dimension(), 3);
}
