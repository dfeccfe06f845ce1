//! End-to-end CLI tests
//!
//! Runs scripts from files through the CLI runtime with a configuration
//! loaded the way the binary loads it.

use bridge_cli::{Cli, Runtime};
use clap::Parser as ClapParser;
use host_runtime::HostValue;
use std::fs;

/// Test: a script file runs with a configuration file
#[test]
fn test_file_with_config() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("main.js");
    let config = dir.path().join("bridge.json");
    fs::write(
        &script,
        "function Point(x) { this.x = x; }\n\
         Point.prototype.__hostPackage = 'Point';\n\
         Point.prototype.double = function() { return this.x * 2; };\n\
         new Point(21)",
    )
    .unwrap();
    fs::write(&config, r#"{"enable_blessing": true, "bless_prefix": "Cli::"}"#).unwrap();

    let cli = Cli::try_parse_from([
        "corten-bridge",
        "--config",
        config.to_str().unwrap(),
        "--file",
        script.to_str().unwrap(),
    ])
    .unwrap();
    let runtime = Runtime::new(cli.bridge_config().unwrap());
    let point = runtime.execute_file(cli.file.as_deref().unwrap()).unwrap();

    let class = point.as_ref().unwrap().blessed().unwrap();
    assert!(class.starts_with("Cli::Point::N"));
    let doubled = runtime
        .context()
        .host()
        .call_method(&point, "double", vec![], host_runtime::CallContext::Scalar)
        .unwrap();
    assert!(matches!(doubled[0], HostValue::Int(42)));
}

/// Test: a script timing out leaves the runtime usable
#[test]
fn test_timeout_then_recover() {
    let cli = Cli::try_parse_from(["corten-bridge", "--time-limit", "1"]).unwrap();
    let runtime = Runtime::new(cli.bridge_config().unwrap());
    assert!(runtime.execute_string("while (true) {}").is_err());
    assert!(matches!(runtime.execute_string("1 + 2").unwrap(), HostValue::Int(3)));
}
