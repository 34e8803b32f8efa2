//! Fallback-adapter behavior against a drifting vendor.

use std::sync::{Arc, Mutex};

use plotlink::{
    AutomationApi, AxisKind, BridgeError, GraphLayer, Handle, MockAutomation, PageKind, ScaleType,
    SharedApi, TickStyle,
};
use tracing_test::traced_test;

fn mock_with_layer() -> (Arc<Mutex<MockAutomation>>, Handle) {
    let mut mock = MockAutomation::new();
    let root = mock.root_folder().unwrap();
    let page = mock
        .create_page(root, PageKind::Graph, "TestGraph", "line")
        .unwrap();
    let layer = mock.layers(page).unwrap()[0];
    (Arc::new(Mutex::new(mock)), layer)
}

fn shared(mock: &Arc<Mutex<MockAutomation>>) -> SharedApi {
    mock.clone()
}

fn attempts_of(err: BridgeError) -> usize {
    match err {
        BridgeError::CapabilityUnavailable(inner) => inner.attempts.len(),
        other => panic!("expected CapabilityUnavailable, got {other}"),
    }
}

#[test]
fn scale_set_then_get_roundtrips_for_every_type() {
    let (mock, handle) = mock_with_layer();
    let layer = GraphLayer::from_handle(shared(&mock), handle);

    for axis in [layer.x_axis(), layer.y_axis()] {
        for scale in ScaleType::ALL {
            axis.set_scale(scale).unwrap();
            assert_eq!(axis.scale().unwrap(), scale, "scale {scale} did not survive");
        }
    }
}

#[test]
fn z_axis_operations_on_2d_target_are_unavailable() {
    let (mock, handle) = mock_with_layer();
    let layer = GraphLayer::from_handle(shared(&mock), handle);
    let z = layer.z_axis();

    assert!(matches!(
        z.range(),
        Err(BridgeError::CapabilityUnavailable(_))
    ));
    assert!(matches!(
        z.set_range(0.0, 1.0),
        Err(BridgeError::CapabilityUnavailable(_))
    ));
    assert!(matches!(
        z.scale(),
        Err(BridgeError::CapabilityUnavailable(_))
    ));
    assert!(matches!(
        z.set_scale(ScaleType::Log10),
        Err(BridgeError::CapabilityUnavailable(_))
    ));
    assert!(matches!(
        z.set_title("depth"),
        Err(BridgeError::CapabilityUnavailable(_))
    ));
    assert!(matches!(
        z.is_reversed(),
        Err(BridgeError::CapabilityUnavailable(_))
    ));

    // Never a silent no-op: the 2D layer's X/Y state is untouched.
    assert_eq!(layer.x_range().unwrap(), (0.0, 10.0));
}

#[test]
fn z_axis_works_on_a_3d_target() {
    let mut mock = MockAutomation::new();
    let root = mock.root_folder().unwrap();
    let page = mock
        .create_page(root, PageKind::Graph, "Surface", "line3d")
        .unwrap();
    let handle = mock.layers(page).unwrap()[0];
    let mock = Arc::new(Mutex::new(mock));
    let layer = GraphLayer::from_handle(shared(&mock), handle);

    layer.set_z_range(-3.0, 3.0).unwrap();
    assert_eq!(layer.z_range().unwrap(), (-3.0, 3.0));
}

#[test]
fn secondary_strategy_succeeds_with_the_same_shape() {
    let (mock, handle) = mock_with_layer();

    // Baseline: no drift, primary strategy serves the read.
    let layer = GraphLayer::from_handle(shared(&mock), handle);
    layer.set_x_range(2.0, 20.0).unwrap();
    let baseline = layer.x_range().unwrap();

    // Same vendor state, but this "release" renamed the range properties.
    {
        let mut vendor = mock.lock().unwrap();
        vendor.retire_property("x.from");
        vendor.retire_property("x.to");
    }
    let drifted = layer.x_range().unwrap();
    assert_eq!(drifted, baseline);
}

#[test]
fn set_falls_through_to_the_command_strategy() {
    let (mock, handle) = mock_with_layer();
    {
        let mut vendor = mock.lock().unwrap();
        vendor.retire_property("x.from");
        vendor.retire_property("x.to");
    }
    let layer = GraphLayer::from_handle(shared(&mock), handle);

    // Direct property writes fail; the command-string fallback applies.
    layer.set_x_range(0.0, 100.0).unwrap();
    assert_eq!(layer.x_range().unwrap(), (0.0, 100.0));
}

#[test]
fn title_survives_a_renamed_title_property() {
    let (mock, handle) = mock_with_layer();
    mock.lock().unwrap().retire_property("x.label.text");
    let layer = GraphLayer::from_handle(shared(&mock), handle);
    let x = layer.x_axis();

    // Write goes through the command form, read through the old alias.
    x.set_title("Time (s)").unwrap();
    assert_eq!(x.title().unwrap(), "Time (s)");
}

#[test]
fn exhausted_chain_reports_one_error_per_strategy() {
    let (mock, handle) = mock_with_layer();
    {
        let mut vendor = mock.lock().unwrap();
        vendor.retire_property("x.type");
        vendor.retire_property("x.scale");
        vendor.fail_commands(true);
    }
    let layer = GraphLayer::from_handle(shared(&mock), handle);
    let x = layer.x_axis();

    // set_scale has three registered strategies, get_scale two.
    let err = x.set_scale(ScaleType::Ln).unwrap_err();
    assert_eq!(attempts_of(err), 3);
    let err = x.scale().unwrap_err();
    assert_eq!(attempts_of(err), 2);
}

#[test]
fn exhausted_chain_message_names_operation_target_and_reasons() {
    let (mock, handle) = mock_with_layer();
    {
        let mut vendor = mock.lock().unwrap();
        vendor.retire_property("y.type");
        vendor.retire_property("y.scale");
        vendor.fail_commands(true);
    }
    let layer = GraphLayer::from_handle(shared(&mock), handle);

    let message = layer
        .y_axis()
        .set_scale(ScaleType::Log10)
        .unwrap_err()
        .to_string();
    assert!(message.contains("set_scale"), "missing operation: {message}");
    assert!(message.contains("Y axis"), "missing target: {message}");
    assert!(
        message.contains("unknown property 'y.type'"),
        "missing strategy reason: {message}"
    );
    assert!(
        message.contains("command interpreter rejected"),
        "missing command failure: {message}"
    );
}

#[test]
fn range_roundtrip_then_rescale_without_data_does_not_raise() {
    let (mock, handle) = mock_with_layer();
    let layer = GraphLayer::from_handle(shared(&mock), handle);
    let x = layer.x_axis();

    x.set_range(0.0, 100.0).unwrap();
    assert_eq!(x.range().unwrap(), (0.0, 100.0));

    // Nothing is plotted; rescaling still succeeds.
    layer.rescale().unwrap();
    x.rescale().unwrap();
}

#[test]
fn rescale_falls_back_to_the_command_when_the_method_is_gone() {
    let (mock, handle) = mock_with_layer();
    mock.lock().unwrap().fail_methods(true);
    let layer = GraphLayer::from_handle(shared(&mock), handle);

    layer.rescale().unwrap();
}

#[test]
fn negative_minor_tick_count_never_reaches_the_vendor() {
    let (mock, handle) = mock_with_layer();
    let layer = GraphLayer::from_handle(shared(&mock), handle);
    let x = layer.x_axis();

    mock.lock().unwrap().reset_call_log();
    let err = x.set_minor_ticks(-4).unwrap_err();
    assert!(matches!(err, BridgeError::InvalidArgument(_)));
    assert_eq!(
        mock.lock().unwrap().vendor_calls(),
        0,
        "validation must reject before any vendor call"
    );

    // The valid path still works afterwards.
    x.set_minor_ticks(4).unwrap();
    assert_eq!(x.minor_ticks().unwrap(), 4);
}

#[test]
fn non_finite_range_bounds_never_reach_the_vendor() {
    let (mock, handle) = mock_with_layer();
    let layer = GraphLayer::from_handle(shared(&mock), handle);

    mock.lock().unwrap().reset_call_log();
    let err = layer.set_x_range(f64::NAN, 1.0).unwrap_err();
    assert!(matches!(err, BridgeError::InvalidArgument(_)));
    assert_eq!(mock.lock().unwrap().vendor_calls(), 0);
}

#[test]
fn tick_style_and_reversed_roundtrip() {
    let (mock, handle) = mock_with_layer();
    let layer = GraphLayer::from_handle(shared(&mock), handle);
    let y = layer.y_axis();

    for style in TickStyle::ALL {
        y.set_major_ticks(style).unwrap();
        assert_eq!(y.major_ticks().unwrap(), style);
    }

    assert!(!y.is_reversed().unwrap());
    y.set_reversed(true).unwrap();
    assert!(y.is_reversed().unwrap());
    y.set_reversed(false).unwrap();
    assert!(!y.is_reversed().unwrap());
}

#[test]
fn error_axis_supports_range_but_not_scale() {
    let (mock, handle) = mock_with_layer();
    let layer = GraphLayer::from_handle(shared(&mock), handle);
    let error_axis = layer.axis(AxisKind::Error);

    error_axis.set_range(0.0, 2.5).unwrap();
    assert_eq!(error_axis.range().unwrap(), (0.0, 2.5));
    assert!(matches!(
        error_axis.scale(),
        Err(BridgeError::CapabilityUnavailable(_))
    ));
}

#[traced_test]
#[test]
fn exhausted_chain_is_logged() {
    let (mock, handle) = mock_with_layer();
    {
        let mut vendor = mock.lock().unwrap();
        vendor.retire_property("x.type");
        vendor.retire_property("x.scale");
        vendor.fail_commands(true);
    }
    let layer = GraphLayer::from_handle(shared(&mock), handle);
    let _ = layer.x_axis().set_scale(ScaleType::Probit);

    assert!(logs_contain("all strategies exhausted"));
    assert!(logs_contain("strategy failed; trying next"));
}
