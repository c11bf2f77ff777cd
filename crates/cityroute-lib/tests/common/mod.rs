#![allow(dead_code)]

use std::path::PathBuf;

use cityroute_lib::{load_routes_file, RouteGraph, TableOptions};

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

pub fn global_graph() -> RouteGraph {
    let path = fixtures_dir().join("global_routes.csv");
    load_routes_file(&path, &TableOptions::default()).expect("load fixture global_routes.csv")
}

pub fn domestic_graph() -> RouteGraph {
    let path = fixtures_dir().join("domestic_routes.csv");
    let options = TableOptions::default().with_cost_column("cost_inr");
    load_routes_file(&path, &options).expect("load fixture domestic_routes.csv")
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
