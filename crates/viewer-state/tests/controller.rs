//! Controller behavior against an in-memory reader.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use om_reader::{CompressionType, DimRange, LocalFile, OmDataType, ViewerInput};
use test_utils::{MockOpener, MockReader};
use viewer_state::{ViewerConfig, ViewerController, ViewerState};

const URL: &str = "https://example.com/temperature_2m.om";

fn controller(reader: MockReader) -> (ViewerController<Arc<MockOpener>>, Arc<MockReader>) {
    let reader = Arc::new(reader);
    let opener = Arc::new(MockOpener::new(reader.clone()));
    (ViewerController::new(opener, ViewerConfig::default()), reader)
}

async fn loaded(dimensions: Vec<u64>) -> (ViewerController<Arc<MockOpener>>, Arc<MockReader>) {
    let (controller, reader) = controller(MockReader::new(dimensions));
    controller.load_file(ViewerInput::url(URL)).await;
    (controller, reader)
}

#[tokio::test]
async fn test_load_file_initializes_state() {
    let (controller, _reader) = loaded(vec![4, 5, 3]).await;
    let state = controller.state();

    assert!(state.has_reader());
    assert!(!state.loading);
    assert_eq!(state.error, None);
    assert_eq!(state.dimensions, vec![4, 5, 3]);
    assert_eq!(state.current_index, 0);
    assert_eq!(state.max_index, 2);
    assert_eq!(state.metadata.variable_name.as_deref(), Some("temperature_2m"));
    assert_eq!(state.metadata.compression.as_deref(), Some("PforDelta2dInt16"));
    assert_eq!(state.metadata.data_type.as_deref(), Some("FloatArray"));
    assert_eq!(state.metadata.dimensions, vec![4, 5, 3]);
    assert!(state.plot.is_none());
}

#[tokio::test]
async fn test_load_file_uses_http_backend_for_urls() {
    let reader = Arc::new(MockReader::new(vec![2, 2, 2]));
    let opener = Arc::new(MockOpener::new(reader));
    let controller = ViewerController::new(opener.clone(), ViewerConfig::default());

    controller.load_file(ViewerInput::url(URL)).await;

    assert_eq!(opener.opened(), vec!["http"]);
}

#[tokio::test]
async fn test_load_file_uses_file_backend_for_local_files() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(tmp.path(), b"OM\x03 some payload").unwrap();

    let reader = Arc::new(MockReader::new(vec![2, 2, 2]));
    let opener = Arc::new(MockOpener::new(reader));
    let controller = ViewerController::new(opener.clone(), ViewerConfig::default());

    let file = LocalFile::open(tmp.path()).await.unwrap();
    controller.load_file(ViewerInput::from(file)).await;

    assert_eq!(opener.opened(), vec!["file"]);
    assert!(controller.state().has_reader());
}

#[tokio::test]
async fn test_single_axis_data_is_rejected() {
    let (controller, reader) = loaded(vec![10]).await;
    let state = controller.state();

    assert_eq!(
        state.error.as_deref(),
        Some("Data must have at least 2 dimensions")
    );
    assert!(!state.loading);
    assert!(state.plot.is_none());
    assert_eq!(reader.read_count(), 0);
}

#[tokio::test]
async fn test_default_roles_slice_last_axis() {
    let (controller, reader) = loaded(vec![4, 5, 3]).await;
    controller.load_data().await;

    assert_eq!(
        reader.reads(),
        vec![vec![DimRange::full(4), DimRange::full(5), DimRange::single(0)]]
    );

    let plot = controller.state().plot.unwrap();
    assert_eq!((plot.rows(), plot.cols()), (4, 5));
    // Values are flat offsets: (row * 5 + col) * 3 + time.
    assert_eq!(plot.grid[0][0], 0.0);
    assert_eq!(plot.grid[1][0], 15.0);
    assert_eq!(plot.grid[3][4], 57.0);
    assert_eq!(plot.value_min, 0.0);
    assert_eq!(plot.value_max, 57.0);
    assert_eq!(plot.kind, "heatmap");
    assert_eq!(plot.colorscale, "Viridis");
}

#[tokio::test]
async fn test_time_first_navigation() {
    let (controller, reader) = loaded(vec![3, 4, 5]).await;

    controller.update_axis_roles(1, 2, 0);
    let state = controller.state();
    assert_eq!(state.max_index, 2);
    assert_eq!(state.current_index, 0);
    assert!(state.plot.is_none());

    controller.load_data().await;
    assert!(controller.step_forward().await);
    assert!(controller.step_forward().await);
    assert!(!controller.step_forward().await);

    let state = controller.state();
    assert_eq!(state.current_index, 2);
    assert_eq!(reader.read_count(), 3);
    assert_eq!(
        reader.reads()[2],
        vec![DimRange::new(2, 3), DimRange::full(4), DimRange::full(5)]
    );

    let plot = state.plot.unwrap();
    assert_eq!(plot.index, 2);
    assert_eq!((plot.rows(), plot.cols()), (4, 5));
    assert_eq!(plot.grid[0][0], 40.0);
    assert_eq!(plot.grid[3][4], 59.0);
}

#[tokio::test]
async fn test_step_backward_at_start_is_noop() {
    let (controller, reader) = loaded(vec![4, 5, 3]).await;
    let before = controller.state();

    assert!(!controller.step_backward().await);

    assert_eq!(controller.state(), before);
    assert_eq!(reader.read_count(), 0);
}

#[tokio::test]
async fn test_step_forward_at_end_is_noop() {
    let (controller, reader) = loaded(vec![4, 5, 1]).await;
    let before = controller.state();
    assert_eq!(before.max_index, 0);

    assert!(!controller.step_forward().await);

    assert_eq!(controller.state(), before);
    assert_eq!(reader.read_count(), 0);
}

#[tokio::test]
async fn test_step_backward_reloads_previous_slice() {
    let (controller, reader) = loaded(vec![2, 2, 3]).await;

    controller.step_forward().await;
    controller.step_forward().await;
    assert!(controller.step_backward().await);

    assert_eq!(controller.state().current_index, 1);
    assert_eq!(reader.reads().last().unwrap()[2], DimRange::single(1));
}

#[tokio::test]
async fn test_go_to() {
    let (controller, reader) = loaded(vec![2, 2, 5]).await;

    assert!(controller.go_to(3).await);
    assert_eq!(controller.state().current_index, 3);
    assert!(!controller.go_to(3).await);
    assert!(!controller.go_to(5).await);
    assert_eq!(reader.read_count(), 1);
}

#[tokio::test]
async fn test_nan_values_are_skipped_in_range() {
    let reader = MockReader::new(vec![2, 2, 1]).returning(vec![1.0, f32::NAN, 3.0, -2.0]);
    let (controller, _reader) = controller(reader);
    controller.load_file(ViewerInput::url(URL)).await;
    controller.load_data().await;

    let plot = controller.state().plot.unwrap();
    assert_eq!(plot.value_min, -2.0);
    assert_eq!(plot.value_max, 3.0);
    assert!(plot.grid[0][1].is_nan());
}

#[tokio::test]
async fn test_all_nan_slice_has_infinite_range() {
    let reader = MockReader::new(vec![1, 2, 1]).returning(vec![f32::NAN, f32::NAN]);
    let (controller, _reader) = controller(reader);
    controller.load_file(ViewerInput::url(URL)).await;
    controller.load_data().await;

    let plot = controller.state().plot.unwrap();
    assert_eq!(plot.value_min, f32::INFINITY);
    assert_eq!(plot.value_max, f32::NEG_INFINITY);
}

#[tokio::test]
async fn test_reset_returns_to_initial_state() {
    let (controller, _reader) = loaded(vec![4, 5, 3]).await;
    controller.load_data().await;
    controller.step_forward().await;

    controller.reset();

    assert_eq!(
        controller.state(),
        ViewerState::initial(controller.config().axis_roles)
    );
}

#[tokio::test]
async fn test_reset_releases_reader() {
    let (controller, reader) = loaded(vec![4, 5, 3]).await;
    assert!(Arc::strong_count(&reader) > 1);

    controller.reset();
    drop(controller);

    assert_eq!(Arc::strong_count(&reader), 1);
}

#[tokio::test]
async fn test_failed_open_keeps_previous_reader_and_plot() {
    let first = Arc::new(MockReader::new(vec![4, 5, 3]));
    let opener = Arc::new(MockOpener::sequence(vec![
        Ok(first.clone()),
        Err("not an OM file".to_string()),
    ]));
    let controller = ViewerController::new(opener, ViewerConfig::default());

    controller.load_file(ViewerInput::url(URL)).await;
    controller.load_data().await;
    let before = controller.state();

    controller.load_file(ViewerInput::url(URL)).await;
    let after = controller.state();

    assert!(after.error.as_deref().unwrap().contains("not an OM file"));
    assert!(!after.loading);
    assert_eq!(after.plot, before.plot);
    assert_eq!(after.dimensions, before.dimensions);
    assert!(Arc::ptr_eq(
        after.reader.as_ref().unwrap(),
        before.reader.as_ref().unwrap()
    ));
}

#[tokio::test]
async fn test_metadata_failure_is_not_fatal() {
    let reader = MockReader::new(vec![4, 5, 3]).failing_metadata("no attributes");
    let (controller, _reader) = controller(reader);
    controller.load_file(ViewerInput::url(URL)).await;

    let state = controller.state();
    assert_eq!(state.error, None);
    assert!(state.metadata.is_empty());
    assert_eq!(state.max_index, 2);
}

#[tokio::test]
async fn test_load_data_without_reader() {
    let (controller, _reader) = controller(MockReader::new(vec![2, 2, 2]));
    controller.load_data().await;

    let state = controller.state();
    assert_eq!(state.error.as_deref(), Some("Reader not initialized"));
    assert!(!state.loading);
    assert!(state.plot.is_none());
}

#[tokio::test]
async fn test_shape_mismatch_keeps_previous_plot() {
    let reader = Arc::new(MockReader::new(vec![2, 2, 2]));
    let short = Arc::new(MockReader::new(vec![2, 2, 2]).returning(vec![1.0, 2.0, 3.0]));
    let opener = Arc::new(MockOpener::sequence(vec![Ok(reader), Ok(short)]));
    let controller = ViewerController::new(opener, ViewerConfig::default());

    controller.load_file(ViewerInput::url(URL)).await;
    controller.load_data().await;
    let before = controller.state().plot;
    assert!(before.is_some());

    controller.load_file(ViewerInput::url(URL)).await;
    controller.load_data().await;

    let state = controller.state();
    assert!(state.error.is_some());
    assert!(!state.loading);
    assert_eq!(state.plot, before);
}

#[tokio::test]
async fn test_read_failure_sets_error() {
    let reader = MockReader::new(vec![2, 2, 2]).failing_reads("chunk corrupt");
    let (controller, _reader) = controller(reader);
    controller.load_file(ViewerInput::url(URL)).await;
    controller.load_data().await;

    let state = controller.state();
    assert!(state.error.as_deref().unwrap().contains("chunk corrupt"));
    assert!(!state.loading);
    assert!(state.plot.is_none());
}

#[tokio::test]
async fn test_update_axis_roles_without_reader_is_noop() {
    let (controller, _reader) = controller(MockReader::new(vec![2, 2, 2]));
    let before = controller.state();

    controller.update_axis_roles(1, 2, 0);

    assert_eq!(controller.state(), before);
}

#[tokio::test]
async fn test_subscribers_observe_loading_transitions() {
    let (controller, _reader) = controller(MockReader::new(vec![4, 5, 3]));
    let seen: Arc<Mutex<Vec<(bool, bool)>>> = Arc::new(Mutex::new(Vec::new()));

    let sink = seen.clone();
    let _sub = controller.subscribe(move |state: &ViewerState| {
        sink.lock().unwrap().push((state.loading, state.plot.is_some()));
    });

    controller.load_file(ViewerInput::url(URL)).await;
    controller.load_data().await;

    let seen = seen.lock().unwrap();
    // Initial value on subscribe, then loading set and finally cleared with a plot.
    assert_eq!(seen.first(), Some(&(false, false)));
    assert!(seen.contains(&(true, false)));
    assert_eq!(seen.last(), Some(&(false, true)));
}

#[tokio::test]
async fn test_cancelled_subscription_stops_notifications() {
    let (controller, _reader) = controller(MockReader::new(vec![2, 2, 2]));
    let count = Arc::new(Mutex::new(0usize));

    let sink = count.clone();
    let sub = controller.subscribe(move |_| *sink.lock().unwrap() += 1);
    assert_eq!(*count.lock().unwrap(), 1);

    sub.cancel();
    controller.load_file(ViewerInput::url(URL)).await;

    assert_eq!(*count.lock().unwrap(), 1);
    assert_eq!(controller.store().observer_count(), 0);
}

#[tokio::test]
async fn test_metadata_names_known_codes() {
    let reader = MockReader::new(vec![2, 2, 2]).with_codes(
        CompressionType::FpxXor2d.code(),
        OmDataType::DoubleArray.code(),
    );
    let (controller, _reader) = controller(reader);
    controller.load_file(ViewerInput::url(URL)).await;

    let metadata = controller.state().metadata;
    assert_eq!(metadata.compression.as_deref(), Some("FpxXor2d"));
    assert_eq!(metadata.data_type.as_deref(), Some("DoubleArray"));
}

#[tokio::test]
async fn test_metadata_unknown_codes_have_no_name() {
    let reader = MockReader::new(vec![2, 2, 2]).with_codes(99, 200);
    let (controller, _reader) = controller(reader);
    controller.load_file(ViewerInput::url(URL)).await;

    let state = controller.state();
    assert_eq!(state.error, None);
    assert_eq!(state.metadata.compression, None);
    assert_eq!(state.metadata.data_type, None);
    assert_eq!(state.metadata.variable_name.as_deref(), Some("temperature_2m"));
}

#[tokio::test]
async fn test_overlapping_steps_last_publisher_wins() {
    let reader = MockReader::new(vec![2, 2, 3]).with_read_delay(Duration::from_millis(20));
    let (controller, reader) = controller(reader);
    controller.load_file(ViewerInput::url(URL)).await;

    let (first, second) = tokio::join!(controller.step_forward(), controller.step_forward());
    assert!(first);
    assert!(second);

    let state = controller.state();
    assert_eq!(state.current_index, 2);
    assert!(!state.loading);
    assert_eq!(state.error, None);

    let requested: Vec<DimRange> = reader.reads().iter().map(|ranges| ranges[2]).collect();
    assert_eq!(requested, vec![DimRange::single(1), DimRange::single(2)]);

    // Whichever read finished last is shown; its index may lag current_index.
    let plot = state.plot.unwrap();
    assert!(plot.index == 1 || plot.index == 2);
    // Values are flat offsets with time last, so the first cell is the index.
    assert_eq!(plot.grid[0][0], plot.index as f32);
}
