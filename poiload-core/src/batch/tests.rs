//! Unit tests for batch accumulation.

use super::*;
use crate::record::PoiRecord;
use geo::Coord;
use rstest::{fixture, rstest};

fn projection(id: ExternalId, category: &str, ratings: Vec<f64>) -> Projection {
    Projection::from(
        PoiRecord::new(id, format!("poi {id}"), Coord { x: 1.0, y: 2.0 }, category)
            .with_ratings(ratings),
    )
}

#[fixture]
fn three() -> BatchSize {
    BatchSize::new(3).expect("non-zero batch size")
}

#[rstest]
fn rejects_zero_batch_size() {
    assert_eq!(BatchSize::new(0), Err(BatchSizeError::Zero));
}

#[rstest]
fn emits_batch_when_threshold_reached(three: BatchSize) {
    let mut accumulator = BatchAccumulator::new(three);
    assert!(accumulator.push(projection(1, "a", vec![1.0])).is_none());
    assert!(accumulator.push(projection(2, "a", vec![2.0])).is_none());
    let batch = accumulator
        .push(projection(3, "b", vec![3.0, 4.0]))
        .expect("third POI fills the batch");

    assert_eq!(batch.len(), 3);
    assert_eq!(batch.ratings.len(), 4);
    assert_eq!(accumulator.pending_len(), 0);
}

#[rstest]
fn deduplicates_categories_within_batch(three: BatchSize) {
    let mut accumulator = BatchAccumulator::new(three);
    accumulator.push(projection(1, "museum", vec![]));
    accumulator.push(projection(2, "museum", vec![]));
    let batch = accumulator
        .push(projection(3, "park", vec![]))
        .expect("batch is full");

    let names: Vec<_> = batch.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["museum", "park"]);
}

#[rstest]
fn categories_repeat_across_batches() {
    let mut accumulator = BatchAccumulator::new(BatchSize::new(1).expect("non-zero"));
    let first = accumulator
        .push(projection(1, "museum", vec![]))
        .expect("single-POI batch");
    let second = accumulator
        .push(projection(2, "museum", vec![]))
        .expect("single-POI batch");

    assert_eq!(first.categories, second.categories);
}

#[rstest]
fn later_duplicate_replaces_earlier_entry(three: BatchSize) {
    let mut accumulator = BatchAccumulator::new(three);
    accumulator.push(projection(7, "museum", vec![1.0, 2.0, 3.0]));
    accumulator.push(projection(7, "gallery", vec![5.0, 6.0]));

    let batch = accumulator.finish().expect("pending batch");
    assert_eq!(batch.len(), 1);
    let poi = batch.points_of_interest.first().expect("one POI");
    assert_eq!(poi.category, "gallery");
    let values: Vec<_> = batch.ratings.iter().map(|r| (r.index, r.rating)).collect();
    assert_eq!(values, vec![(0, 5.0), (1, 6.0)]);
    let names: Vec<_> = batch.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["gallery"]);
}

#[rstest]
fn duplicate_keeps_category_still_in_use(three: BatchSize) {
    let mut accumulator = BatchAccumulator::new(three);
    accumulator.push(projection(7, "museum", vec![]));
    accumulator.push(projection(8, "museum", vec![]));
    accumulator.push(projection(7, "gallery", vec![]));

    let batch = accumulator.finish().expect("pending batch");
    let names: Vec<_> = batch.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["museum", "gallery"]);
}

#[rstest]
fn duplicate_does_not_count_towards_threshold(three: BatchSize) {
    let mut accumulator = BatchAccumulator::new(three);
    accumulator.push(projection(1, "a", vec![]));
    accumulator.push(projection(1, "a", vec![]));
    assert!(accumulator.push(projection(2, "a", vec![])).is_none());
    assert_eq!(accumulator.pending_len(), 2);
}

#[rstest]
fn finish_never_emits_empty_batch(three: BatchSize) {
    let mut accumulator = BatchAccumulator::new(three);
    assert!(accumulator.finish().is_none());

    accumulator.push(projection(1, "a", vec![]));
    accumulator.push(projection(2, "a", vec![]));
    accumulator.push(projection(3, "a", vec![]));
    assert!(
        accumulator.finish().is_none(),
        "full batch was already emitted by push"
    );
}

#[rstest]
#[case(1, vec![1, 1, 1, 1, 1])]
#[case(2, vec![2, 2, 1])]
#[case(5, vec![5])]
#[case(10, vec![5])]
fn batches_cover_every_projection(#[case] size: usize, #[case] expected: Vec<usize>) {
    let projections =
        (1..=5).map(|id| Ok::<_, &'static str>(projection(id, "a", vec![1.0])));
    let sizes: Vec<_> = Batches::new(projections, BatchSize::new(size).expect("non-zero"))
        .map(|batch| batch.map(|b| b.len()))
        .collect::<Result<_, _>>()
        .expect("no errors");
    assert_eq!(sizes, expected);
}

#[rstest]
fn empty_stream_yields_no_batches(three: BatchSize) {
    let projections = std::iter::empty::<Result<Projection, &'static str>>();
    assert_eq!(Batches::new(projections, three).count(), 0);
}

#[rstest]
fn error_discards_pending_batch_and_stops(three: BatchSize) {
    let projections = vec![
        Ok(projection(1, "a", vec![])),
        Ok(projection(2, "a", vec![])),
        Ok(projection(3, "a", vec![])),
        Ok(projection(4, "a", vec![])),
        Err("bad record"),
        Ok(projection(5, "a", vec![])),
    ];
    let outcomes: Vec<_> = Batches::new(projections, three).collect();

    assert_eq!(outcomes.len(), 2);
    let first = outcomes.first().expect("first outcome");
    assert_eq!(first.as_ref().map(Batch::len), Ok(3));
    let second = outcomes.get(1).expect("second outcome");
    assert_eq!(second.as_ref().map(Batch::len), Err(&"bad record"));
}
