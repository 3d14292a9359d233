//! Reconcile regression tests against a live-shaped node-group template.
//!
//! The fixture carries leading and trailing blank lines on purpose: the
//! reconciler must hand them back untouched.

use nodegrid_core::NodeGroupSpec;
use nodegrid_scale::{BoundsViolation, ReconcileError, ReconcileOutcome, reconcile};

const NODEGROUP_RESOURCE: &str = r#"
{
  "Resources": {
    "NodeGroup": {
      "Type": "AWS::AutoScaling::AutoScalingGroup",
      "Properties": {
        "DesiredCapacity": "3",
        "MaxSize": "6",
        "MinSize": "1"
      }
    }
  }
}

"#;

fn expected(desired: u32, max: u32, min: u32) -> String {
    format!(
        "\n{{\n  \"Resources\": {{\n    \"NodeGroup\": {{\n      \"Type\": \"AWS::AutoScaling::AutoScalingGroup\",\n      \"Properties\": {{\n        \"DesiredCapacity\": \"{desired}\",\n        \"MaxSize\": \"{max}\",\n        \"MinSize\": \"{min}\"\n      }}\n    }}\n  }}\n}}\n\n"
    )
}

fn nodegroup() -> NodeGroupSpec {
    let mut ng = NodeGroupSpec::new("12345");
    ng.instance_type = "t2.medium".to_string();
    ng
}

fn updated(spec: &NodeGroupSpec) -> String {
    match reconcile(NODEGROUP_RESOURCE, spec).unwrap() {
        ReconcileOutcome::Updated(t) => t,
        ReconcileOutcome::Unchanged => panic!("expected an updated template"),
    }
}

#[test]
fn fixture_matches_expected_layout() {
    assert_eq!(NODEGROUP_RESOURCE, expected(3, 6, 1));
}

#[test]
fn updates_desired_capacity() {
    assert_eq!(updated(&nodegroup().with_desired_capacity(4)), expected(4, 6, 1));
}

#[test]
fn updates_min_size() {
    assert_eq!(updated(&nodegroup().with_min_size(2)), expected(3, 6, 2));
}

#[test]
fn updates_max_size() {
    assert_eq!(updated(&nodegroup().with_max_size(10)), expected(3, 10, 1));
}

#[test]
fn updates_all_fields() {
    let spec = nodegroup()
        .with_min_size(2)
        .with_desired_capacity(4)
        .with_max_size(10);
    assert_eq!(updated(&spec), expected(4, 10, 2));
}

#[test]
fn update_reports_changed() {
    let out = reconcile(NODEGROUP_RESOURCE, &nodegroup().with_desired_capacity(5)).unwrap();
    assert!(out.changed());
    assert_eq!(out.template(), expected(5, 6, 1));
}

#[test]
fn every_valid_target_rewrites_only_capacity() {
    for min in 0..=3 {
        for max in min..=7 {
            for desired in min..=max {
                if (desired, min, max) == (3, 1, 6) {
                    continue;
                }
                let spec = nodegroup()
                    .with_desired_capacity(desired)
                    .with_min_size(min)
                    .with_max_size(max);
                assert_eq!(updated(&spec), expected(desired, max, min));
            }
        }
    }
}

#[test]
fn no_op_without_requests() {
    let out = reconcile(NODEGROUP_RESOURCE, &nodegroup()).unwrap();
    assert!(!out.changed());
    assert_eq!(out.template(), "");
}

#[test]
fn no_op_for_existing_desired_capacity() {
    let out = reconcile(NODEGROUP_RESOURCE, &nodegroup().with_desired_capacity(3)).unwrap();
    assert_eq!(out, ReconcileOutcome::Unchanged);
}

#[test]
fn no_op_for_existing_desired_and_min() {
    let spec = nodegroup().with_min_size(1).with_desired_capacity(3);
    assert_eq!(reconcile(NODEGROUP_RESOURCE, &spec).unwrap(), ReconcileOutcome::Unchanged);
}

#[test]
fn no_op_for_existing_desired_and_max() {
    let spec = nodegroup().with_desired_capacity(3).with_max_size(6);
    assert_eq!(reconcile(NODEGROUP_RESOURCE, &spec).unwrap(), ReconcileOutcome::Unchanged);
}

#[test]
fn no_op_for_existing_desired_min_and_max() {
    let spec = nodegroup()
        .with_min_size(1)
        .with_desired_capacity(3)
        .with_max_size(6);
    assert_eq!(reconcile(NODEGROUP_RESOURCE, &spec).unwrap(), ReconcileOutcome::Unchanged);
}

#[test]
fn desired_above_max_is_an_error() {
    let err = reconcile(NODEGROUP_RESOURCE, &nodegroup().with_desired_capacity(10)).unwrap_err();
    assert_eq!(
        err,
        ReconcileError::OutOfBounds(BoundsViolation::AboveMax { desired: 10, max: 6 })
    );
    assert_eq!(
        err.to_string(),
        "the desired nodes 10 is greater than the nodes-max/maxSize 6"
    );
}

#[test]
fn desired_below_min_is_an_error() {
    let err = reconcile(NODEGROUP_RESOURCE, &nodegroup().with_desired_capacity(0)).unwrap_err();
    assert_eq!(
        err,
        ReconcileError::OutOfBounds(BoundsViolation::BelowMin { desired: 0, min: 1 })
    );
    assert_eq!(
        err.to_string(),
        "the desired nodes 0 is less than the nodes-min/minSize 1"
    );
}

#[test]
fn lowering_max_below_current_desired_is_an_error() {
    let err = reconcile(NODEGROUP_RESOURCE, &nodegroup().with_max_size(2)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "the desired nodes 3 is greater than the nodes-max/maxSize 2"
    );
}

#[test]
fn preserves_unrelated_resources_and_layout() {
    let template = "{\"AWSTemplateFormatVersion\":\"2010-09-09\",\n\t\"Resources\" : {\n\t\t\"NodeGroup\" :{ \"Type\":\"AWS::AutoScaling::AutoScalingGroup\",\"Properties\":{\"MinSize\" :  \"1\",\"LaunchTemplate\":{\"Version\":\"3\"},\"MaxSize\":\"6\", \"DesiredCapacity\":\"3\"}},\n\t\t\"Role\":{\"Type\":\"AWS::IAM::Role\",\"Properties\":{\"MaxSessionDuration\":\"3600\"}}},\n\"Outputs\":{}}   \n";
    let out = reconcile(template, &nodegroup().with_desired_capacity(5)).unwrap();
    assert_eq!(
        out.template(),
        template.replace("\"DesiredCapacity\":\"3\"", "\"DesiredCapacity\":\"5\"")
    );
}

#[test]
fn malformed_templates_are_parse_errors() {
    for template in ["", "Resources: {}", r#"{"Resources":{"NodeGroup":{"Properties":{}}}}"#] {
        let err = reconcile(template, &nodegroup().with_desired_capacity(4)).unwrap_err();
        assert!(matches!(err, ReconcileError::Parse(_)), "template {template:?}");
    }
}
