//! Focused unit tests covering dispatch configuration and input loading.

use super::helpers::{StubBackendBuilder, sample_request, workspace, write_request, write_utf8};
use super::*;
use crate::dispatch::{
    DispatchArgs, DispatchCommandConfig, WorkdayOverrides, execute_dispatch, load_json,
    resolve_settings,
};
use camino::Utf8PathBuf;
use rstest::rstest;
use tanker_core::{DispatchConfig, DispatchRequest, ScheduleStatus};

fn command_config(request_path: Utf8PathBuf) -> DispatchCommandConfig {
    DispatchCommandConfig {
        request_path,
        dispatch_config: None,
        matrix: None,
        osrm_base_url: None,
        output: None,
        overrides: WorkdayOverrides::default(),
    }
}

#[rstest]
fn converting_dispatch_without_request_errors() {
    let err = DispatchCommandConfig::try_from(DispatchArgs::default())
        .expect_err("missing request should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_DISPATCH_REQUEST);
            assert_eq!(env, ENV_DISPATCH_REQUEST);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn converting_dispatch_collects_workday_overrides() {
    let args = DispatchArgs {
        request_path: Some(Utf8PathBuf::from("request.json")),
        day_start: Some(480),
        max_rounds: Some(3),
        ..DispatchArgs::default()
    };

    let config = DispatchCommandConfig::try_from(args).expect("config should build");

    assert_eq!(config.request_path, Utf8PathBuf::from("request.json"));
    assert_eq!(
        config.overrides,
        WorkdayOverrides {
            day_start: Some(480),
            day_close: None,
            max_rounds: Some(3),
            round_time_limit_secs: None,
        }
    );
}

#[rstest]
fn overrides_replace_only_given_values() {
    let mut settings = DispatchConfig::default();
    WorkdayOverrides {
        day_start: None,
        day_close: Some(1020),
        max_rounds: None,
        round_time_limit_secs: Some(5),
    }
    .apply(&mut settings)
    .expect("valid day");

    assert_eq!(settings.workday.day_start, 420);
    assert_eq!(settings.workday.day_close, 1020);
    assert_eq!(settings.workday.max_rounds, 5);
    assert_eq!(settings.workday.round_time_limit_secs, 5);
}

#[rstest]
#[case::reversed(Some(600), Some(500))]
#[case::empty(Some(600), Some(600))]
#[case::close_before_default_start(None, Some(400))]
fn overrides_reject_empty_days(#[case] day_start: Option<u32>, #[case] day_close: Option<u32>) {
    let mut settings = DispatchConfig::default();
    let err = WorkdayOverrides {
        day_start,
        day_close,
        ..WorkdayOverrides::default()
    }
    .apply(&mut settings)
    .expect_err("empty day should be rejected");
    assert!(matches!(err, CliError::InvalidWorkday { .. }));
}

#[rstest]
#[case::config(ARG_DISPATCH_CONFIG)]
#[case::matrix(ARG_DISPATCH_MATRIX)]
fn validate_sources_reports_missing_optional_inputs(#[case] field: &'static str) {
    let (_tmp, root) = workspace();
    let request_path = root.join("request.json");
    write_utf8(&request_path, b"{}");
    let mut config = command_config(request_path);
    let absent = root.join("absent.json");
    if field == ARG_DISPATCH_CONFIG {
        config.dispatch_config = Some(absent);
    } else {
        config.matrix = Some(absent);
    }

    let err = config.validate_sources().expect_err("expected failure");
    match err {
        CliError::MissingSourceFile { field: reported, .. } => assert_eq!(reported, field),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_reports_not_file() {
    let (_tmp, root) = workspace();
    let request_path = root.join("request.json");
    std::fs::create_dir(&request_path).expect("request directory");

    let err = command_config(request_path.clone())
        .validate_sources()
        .expect_err("expected directory path to fail validation");
    match err {
        CliError::SourcePathNotFile { field, path } => {
            assert_eq!(field, ARG_DISPATCH_REQUEST);
            assert_eq!(path, request_path);
        }
        other => panic!("expected SourcePathNotFile, found {other:?}"),
    }
}

#[rstest]
fn load_json_decodes_requests() {
    let (_tmp, root) = workspace();
    let request_path = root.join("request.json");
    write_request(&request_path, &sample_request());

    let decoded: DispatchRequest =
        load_json(&request_path, ARG_DISPATCH_REQUEST).expect("request should decode");
    assert_eq!(decoded, sample_request());
}

#[rstest]
fn load_json_rejects_invalid_json() {
    let (_tmp, root) = workspace();
    let request_path = root.join("request.json");
    write_utf8(&request_path, b"{ not valid json");

    let err = load_json::<DispatchRequest>(&request_path, ARG_DISPATCH_REQUEST)
        .expect_err("invalid json should error");
    match err {
        CliError::ParseInput { field, path, .. } => {
            assert_eq!(field, ARG_DISPATCH_REQUEST);
            assert_eq!(path, request_path);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
fn settings_layer_file_then_overrides() {
    let (_tmp, root) = workspace();
    let settings_path = root.join("settings.json");
    write_utf8(
        &settings_path,
        br#"{"workday": {"max_rounds": 2, "reload_minutes": 45}, "no_progress": "retry_reachable"}"#,
    );
    let mut config = command_config(root.join("request.json"));
    config.dispatch_config = Some(settings_path);
    config.overrides.day_start = Some(480);

    let settings = resolve_settings(&config).expect("settings should resolve");

    assert_eq!(settings.workday.max_rounds, 2);
    assert_eq!(settings.workday.reload_minutes, 45);
    assert_eq!(settings.workday.day_start, 480);
    assert_eq!(settings.no_progress, tanker_core::NoProgressPolicy::RetryReachable);
    assert!(!settings.detail_legs);
}

#[rstest]
fn osrm_url_enables_leg_detail() {
    let mut config = command_config(Utf8PathBuf::from("request.json"));
    config.osrm_base_url = Some("http://localhost:5000".to_owned());

    let settings = resolve_settings(&config).expect("settings should resolve");

    assert!(settings.detail_legs);
}

#[rstest]
fn execute_dispatch_uses_the_distance_file() {
    let (_tmp, root) = workspace();
    let request_path = root.join("request.json");
    let matrix_path = root.join("distances.json");
    write_request(&request_path, &sample_request());
    write_utf8(
        &matrix_path,
        br#"[{"from": "Depot", "to": "A", "value": 10}, {"from": "A", "to": "B", "value": 25}]"#,
    );
    let mut config = command_config(request_path);
    config.matrix = Some(matrix_path);

    let result = execute_dispatch(&config, &StubBackendBuilder).expect("dispatch should run");

    let light = result.family("light").expect("light family is scheduled");
    assert_eq!(light.status, ScheduleStatus::Success);
    let trip = light.routes.first().expect("one trip");
    let first = trip.stops.first().expect("first stop");
    assert_eq!(first.order_id, "A");
    // 10 km at 30 km/h.
    assert_eq!(first.arrival, 440);
}

#[rstest]
fn default_config_is_printed_as_json() {
    let mut buffer = Vec::new();
    write_default_config(&mut buffer).expect("defaults should print");

    let printed: DispatchConfig =
        serde_json::from_slice(&buffer).expect("output should be a dispatch config");
    assert_eq!(printed, DispatchConfig::default());
}
