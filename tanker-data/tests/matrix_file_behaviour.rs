//! Behavioural tests for loading distance files from disk.

use std::cell::RefCell;
use std::sync::Arc;

use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tanker_core::{DistanceMatrix, LayeredEstimator, Location, TravelTimeEstimator};
use tanker_data::{MatrixLoadError, load_distance_matrix};
use tempfile::TempDir;

#[derive(Default)]
struct MatrixWorld {
    dir: RefCell<Option<TempDir>>,
    path: RefCell<Option<Utf8PathBuf>>,
    loaded: RefCell<Option<Result<DistanceMatrix, MatrixLoadError>>>,
}

impl MatrixWorld {
    fn target(&self) -> Utf8PathBuf {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("distances.json"))
            .expect("temp path is UTF-8");
        self.dir.replace(Some(dir));
        self.path.replace(Some(path.clone()));
        path
    }

    fn matrix(&self) -> DistanceMatrix {
        match self.loaded.borrow().as_ref().expect("file should be loaded") {
            Ok(matrix) => matrix.clone(),
            Err(err) => panic!("loading failed: {err}"),
        }
    }

    fn error(&self) -> String {
        match self.loaded.borrow().as_ref().expect("file should be loaded") {
            Ok(_) => panic!("loading should fail"),
            Err(err) => format!("{err:?}"),
        }
    }
}

#[fixture]
fn world() -> MatrixWorld {
    MatrixWorld::default()
}

#[given("a distance file with {from} to {to} at {there} and {back_from} to {back_to} at {back}")]
fn given_file(
    world: &MatrixWorld,
    from: String,
    to: String,
    there: f64,
    back_from: String,
    back_to: String,
    back: f64,
) {
    let path = world.target();
    let body = serde_json::json!([
        { "from": from, "to": to, "value": there },
        { "from": back_from, "to": back_to, "value": back },
    ]);
    std::fs::write(&path, body.to_string()).expect("write distance file");
}

#[given("no distance file exists")]
fn given_missing(world: &MatrixWorld) {
    let _ = world.target();
}

#[when("the distance file is loaded")]
fn when_loaded(world: &MatrixWorld) {
    let path = world.path.borrow().clone().expect("path should be set");
    world.loaded.replace(Some(load_distance_matrix(&path)));
}

#[then("the dataset holds {count} pairs")]
fn then_pairs(world: &MatrixWorld, count: usize) {
    assert_eq!(world.matrix().len(), count);
}

#[then("travel from {from} to {to} takes {minutes} minutes")]
fn then_travel(world: &MatrixWorld, from: String, to: String, minutes: u32) {
    let estimator = LayeredEstimator::new(Arc::new(world.matrix()));
    assert_eq!(
        estimator.estimate(&Location::named(from), &Location::named(to)),
        minutes
    );
}

#[then("loading fails because the file cannot be read")]
fn then_open_error(world: &MatrixWorld) {
    assert!(world.error().starts_with("Open"));
}

#[then("loading fails because of an invalid value")]
fn then_invalid_value(world: &MatrixWorld) {
    assert!(world.error().starts_with("InvalidValue"));
}

#[scenario(path = "tests/features/matrix_file.feature", index = 0)]
fn loads_mixed_units(world: MatrixWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/matrix_file.feature", index = 1)]
fn missing_file(world: MatrixWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/matrix_file.feature", index = 2)]
fn negative_distance(world: MatrixWorld) {
    let _ = world;
}
