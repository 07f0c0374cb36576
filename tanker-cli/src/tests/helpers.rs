//! Test helpers for composing dispatch inputs on disk.

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use geo::Coord;
use tanker_core::test_support::{GreedySolver, order, truck};
use tanker_core::{DispatchRequest, Location, MappingProvider, RoutingSolver, TimeWindow};
use tanker_data::routing::test_support::StubMappingProvider;
use tempfile::TempDir;

use crate::CliError;
use crate::dispatch::DispatchBackendBuilder;

/// Minutes every stubbed mapping lookup answers with.
pub(super) const STUB_LEG_MINUTES: f64 = 17.0;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write test file");
}

pub(super) fn workspace() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

/// Two orders for one light truck, all places geolocated.
pub(super) fn sample_request() -> DispatchRequest {
    DispatchRequest {
        depot: Location::at("Depot", Coord { x: 0.0, y: 0.0 }),
        locations: vec![
            Location::at("A", Coord { x: 0.1, y: 0.0 }),
            Location::at("B", Coord { x: 0.2, y: 0.0 }),
        ],
        orders: vec![
            order("A", 50, TimeWindow::new(420, 600), 1),
            order("B", 80, TimeWindow::new(540, 1080), 2),
        ],
        vehicles: vec![truck("T1", 150)],
    }
}

pub(super) fn write_request(path: &Utf8Path, request: &DispatchRequest) {
    let payload = serde_json::to_string_pretty(request).expect("serialise request");
    write_utf8(path, payload.as_bytes());
}

/// Backends that never leave the process.
#[derive(Debug, Default)]
pub(super) struct StubBackendBuilder;

impl DispatchBackendBuilder for StubBackendBuilder {
    fn solver(&self) -> Result<Box<dyn RoutingSolver>, CliError> {
        Ok(Box::new(GreedySolver))
    }

    fn mapping(
        &self,
        _base_url: &str,
        _timeout: Duration,
    ) -> Result<Box<dyn MappingProvider>, CliError> {
        Ok(Box::new(StubMappingProvider::with_minutes(STUB_LEG_MINUTES)))
    }
}
