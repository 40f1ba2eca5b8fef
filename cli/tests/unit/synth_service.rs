//! Offline template use-cases: synthesize, check, diff.

#![allow(clippy::unwrap_used)]

use std::path::Path;

use isovpc_cli::application::ports::TemplateFiles;
use isovpc_cli::application::services::synth;
use isovpc_cli::domain::config::IsovpcConfig;
use isovpc_cli::domain::endpoint::Region;
use isovpc_cli::domain::stack::StackSpec;
use isovpc_common::ResourceType;

use crate::mocks::{MemoryFiles, RecordingReporter};

fn spec(region: Region) -> StackSpec {
    StackSpec::from_config(&IsovpcConfig::default(), region).unwrap()
}

#[test]
fn test_synthesize_reports_passing_checks() {
    let reporter = RecordingReporter::default();
    let synthesis = synth::synthesize(&spec(Region::Agnostic), &reporter).unwrap();
    assert!(synthesis.report.passed());
    assert!(reporter.warnings().is_empty());
    assert!(
        reporter
            .events
            .borrow()
            .iter()
            .any(|e| e.starts_with("ok:synthesized"))
    );
}

#[test]
fn test_synthesize_to_writes_file() {
    let files = MemoryFiles::default();
    let out = Path::new("/tmp/stack.template.json");
    synth::synthesize_to(
        &spec(Region::Agnostic),
        &files,
        Some(out),
        &RecordingReporter::default(),
    )
    .unwrap();
    let written = files.read_template(out).unwrap();
    assert_eq!(written.resources_of(&ResourceType::VpcEndpoint).count(), 3);
}

#[test]
fn test_check_reads_given_template() {
    let files = MemoryFiles::default();
    let path = Path::new("/tmp/open.json");
    let mut template = spec(Region::Agnostic).synthesize().unwrap();
    let endpoint = template
        .resources_of(&ResourceType::VpcEndpoint)
        .map(|(id, _)| id.to_string())
        .next()
        .unwrap();
    template.resources.remove(&endpoint);
    files.write_template(path, &template).unwrap();

    let report = synth::check(
        &spec(Region::Agnostic),
        &files,
        Some(path),
        &RecordingReporter::default(),
    )
    .unwrap();

    assert!(!report.passed());
    assert!(
        report
            .collect_issues()
            .iter()
            .any(|i| i.starts_with("endpoint-set"))
    );
}

#[test]
fn test_check_region_mismatch_fails() {
    let template = spec(Region::Known("us-east-1".to_string()))
        .synthesize()
        .unwrap();
    let report =
        synth::check_template(&template, &Region::Known("eu-west-1".to_string())).unwrap();
    assert!(!report.passed());
}

#[test]
fn test_diff_against_own_synthesis_is_empty() {
    let spec = spec(Region::Agnostic);
    let current = spec.synthesize().unwrap();
    assert!(synth::diff_against(&spec, &current).unwrap().is_empty());
}

#[test]
fn test_diff_against_other_instance_type_modifies_instance() {
    let mut config = IsovpcConfig::default();
    config.instance.instance_type = "t3.small".to_string();
    let current = StackSpec::from_config(&config, Region::Agnostic)
        .unwrap()
        .synthesize()
        .unwrap();

    let diff = synth::diff_against(&spec(Region::Agnostic), &current).unwrap();

    assert_eq!(diff.resources.len(), 1);
    assert_eq!(diff.resources[0].resource_type, "AWS::EC2::Instance");
}
