// HTTP endpoints end-to-end over a synthetic proc tree

mod common;

use std::sync::Arc;

use axum_test::TestServer;
use common::{ProcFixture, stat_content};
use hostagent::collector::Collector;
use hostagent::docker_repo::DockerRepo;
use hostagent::logs_repo::LogsRepo;

/// Fixture-backed agent: synthetic /proc, no docker socket, logs disabled.
fn test_server(fx: &ProcFixture) -> TestServer {
    let collector = Arc::new(Collector::new(
        Arc::new(fx.repo()),
        Arc::new(DockerRepo::new(fx.sys_dir().join("no-docker.sock"))),
        Arc::new(LogsRepo::new(0)),
        8,
        10,
    ));
    TestServer::new(hostagent::routes::app(collector))
}

fn populate_baseline(fx: &ProcFixture) {
    fx.write_proc("uptime", "100.0 90.0\n");
    fx.write_proc("stat", &stat_content(800, 200, 1000));
    fx.write_proc("meminfo", "MemTotal: 1000 kB\nMemAvailable: 500 kB\n");
    fx.write_proc("loadavg", "0.1 0.2 0.3 1/100 999\n");
    fx.write_proc("mounts", "");
    fx.write_proc("diskstats", "   8 0 sda 10 0 1000 5 20 0 2000 8 0 100 13\n");
    fx.write_proc(
        "net/dev",
        "h\nh\n  eth0: 100 1 0 0 0 0 0 0 200 2 0 0 0 0 0 0\n",
    );
    fx.write_proc("net/tcp", "h\n 0: A:1 B:0 01 0:0 0:0 0 0\n");
}

#[tokio::test]
async fn health_is_ok_even_with_no_sources_at_all() {
    let fx = ProcFixture::new();
    let server = test_server(&fx);
    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");
}

#[tokio::test]
async fn unknown_path_is_404() {
    let fx = ProcFixture::new();
    let server = test_server(&fx);
    let response = server.get("/nope").await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn version_reports_package_identity() {
    let fx = ProcFixture::new();
    let server = test_server(&fx);
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json.get("name").and_then(|v| v.as_str()), Some("hostagent"));
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn metrics_sets_json_and_no_cache_headers() {
    let fx = ProcFixture::new();
    populate_baseline(&fx);
    let server = test_server(&fx);
    let response = server.get("/metrics").await;
    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "application/json");
    assert_eq!(response.header("cache-control"), "no-cache, no-store");
}

#[tokio::test]
async fn compact_and_pretty_bodies_carry_the_same_structure() {
    let fx = ProcFixture::new();
    populate_baseline(&fx);
    let server = test_server(&fx);

    let pretty = server.get("/metrics").await.text();
    let compact = server.get("/metrics?compact=1").await.text();
    assert!(pretty.contains('\n'));
    assert!(!compact.contains('\n'));

    let pretty: serde_json::Value = serde_json::from_str(&pretty).unwrap();
    let compact: serde_json::Value = serde_json::from_str(&compact).unwrap();
    let keys = |v: &serde_json::Value| -> Vec<String> {
        v.as_object().unwrap().keys().cloned().collect()
    };
    assert_eq!(keys(&pretty), keys(&compact));
}

#[tokio::test]
async fn compact_true_also_minifies() {
    let fx = ProcFixture::new();
    populate_baseline(&fx);
    let server = test_server(&fx);
    let body = server.get("/metrics?compact=true").await.text();
    assert!(!body.contains('\n'));
}

#[tokio::test]
async fn failed_sources_degrade_to_defaults_not_errors() {
    // Empty proc tree: every collector fails, the response is still 200
    // with zero values and no optional fields.
    let fx = ProcFixture::new();
    let server = test_server(&fx);
    let response = server.get("/metrics").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["cpu"]["percent"], 0.0);
    assert_eq!(json["memory"]["total"], 0);
    assert_eq!(json["containers"], serde_json::json!([]));
    assert!(json.get("entropy").is_none());
    assert!(json.get("cpu_freq").is_none());
}

#[tokio::test]
async fn optional_fields_appear_when_sources_exist() {
    let fx = ProcFixture::new();
    populate_baseline(&fx);
    fx.write_proc("sys/kernel/random/entropy_avail", "512\n");
    fx.write_proc("sys/fs/file-nr", "100 0 1000\n");
    let server = test_server(&fx);
    let json: serde_json::Value = server.get("/metrics").await.json();
    assert_eq!(json["entropy"], 512);
    assert_eq!(json["file_descriptors"]["allocated"], 100);
}

#[tokio::test]
async fn cpu_percent_follows_the_rate_formula_across_two_snapshots() {
    let fx = ProcFixture::new();
    populate_baseline(&fx);
    let server = test_server(&fx);

    // First pass establishes the baselines; no rate yet.
    let first: serde_json::Value = server.get("/metrics").await.json();
    assert_eq!(first["cpu"]["percent"], 0.0);

    // Advance the counters: idle +50, total +200 => 75% busy.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    fx.write_proc("stat", &stat_content(850, 350, 2000));

    let second: serde_json::Value = server.get("/metrics").await.json();
    assert_eq!(second["cpu"]["percent"], 75.0);
    // Context switches advanced by 1000 over ~50ms: positive rate.
    assert!(second["cpu"]["context_switches_sec"].as_f64().unwrap() > 0.0);
    // Per-core usage also follows the tick deltas, clamped to [0, 100].
    for core in second["cpu"]["cores"].as_array().unwrap() {
        let p = core["percent"].as_f64().unwrap();
        assert!((0.0..=100.0).contains(&p));
    }
}
