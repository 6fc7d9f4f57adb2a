mod common;

use common::FakeProvider;
use envsweep_core::{
    FilterRequest, SafetyGate, SafetyOverride, SafetyPolicy, SafetyViolation, SweepError,
    plan_teardown,
};

fn violation(err: SweepError) -> SafetyViolation {
    match err {
        SweepError::Configuration(v) => v,
        other => panic!("expected a safety violation, got: {}", other),
    }
}

#[tokio::test]
async fn test_short_filter_aborts_before_any_call() {
    let provider = FakeProvider::new().instances("ab", 3, "img-A");
    let err = plan_teardown(&provider, &SafetyGate::default(), &FilterRequest::literal("ab"))
        .await
        .unwrap_err();

    assert!(err.is_configuration());
    assert!(err.to_string().contains("minimum length of 8"));
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_three_instances_on_one_image_proceed() {
    let provider = FakeProvider::new().instances("abcd1234", 3, "img-A");
    let checked = plan_teardown(
        &provider,
        &SafetyGate::default(),
        &FilterRequest::literal("abcd1234"),
    )
    .await
    .unwrap();

    assert_eq!(checked.plan.instance_count(), 3);
    assert!(!checked.plan.images_differ());
    assert!(checked.warnings.is_empty());
}

#[tokio::test]
async fn test_no_match_aborts() {
    let provider = FakeProvider::new().instances("other-env", 2, "img-A");
    let err = plan_teardown(
        &provider,
        &SafetyGate::default(),
        &FilterRequest::literal("abcd1234"),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        violation(err),
        SafetyViolation::NoMatchingInstances { .. }
    ));
    assert!(provider.mutating_calls().is_empty());
}

#[tokio::test]
async fn test_too_many_instances_abort() {
    let provider = FakeProvider::new().instances("abcd1234", 9, "img-A");
    let err = plan_teardown(
        &provider,
        &SafetyGate::default(),
        &FilterRequest::literal("abcd1234"),
    )
    .await
    .unwrap_err();

    let v = violation(err);
    assert_eq!(v, SafetyViolation::TooManyInstances { count: 9, max: 6 });
    assert!(v.to_string().contains("exceeds maximum"));
}

#[tokio::test]
async fn test_per_rule_override() {
    let provider = FakeProvider::new().instances("abcd1234", 9, "img-A");
    let gate = SafetyGate::new(
        SafetyPolicy::default(),
        SafetyOverride {
            allow_many_instances: true,
            ..SafetyOverride::none()
        },
    );
    let checked = plan_teardown(&provider, &gate, &FilterRequest::literal("abcd1234"))
        .await
        .unwrap();

    assert_eq!(checked.plan.instance_count(), 9);
    assert_eq!(
        checked.warnings,
        vec![SafetyViolation::TooManyInstances { count: 9, max: 6 }]
    );
}

#[tokio::test]
async fn test_custom_policy() {
    let provider = FakeProvider::new().instances("env-7", 2, "img-A");
    let gate = SafetyGate::new(
        SafetyPolicy {
            min_filter_length: 4,
            max_instances: 1,
        },
        SafetyOverride::none(),
    );
    let err = plan_teardown(&provider, &gate, &FilterRequest::literal("env-7"))
        .await
        .unwrap_err();

    assert_eq!(
        violation(err),
        SafetyViolation::TooManyInstances { count: 2, max: 1 }
    );
}

#[tokio::test]
async fn test_regex_filter() {
    let provider = FakeProvider::new()
        .instances("abcd1234-east", 2, "img-A")
        .instances("abcd1234-west", 2, "img-A");
    let checked = plan_teardown(
        &provider,
        &SafetyGate::default(),
        &FilterRequest::regex("^abcd1234-east-"),
    )
    .await
    .unwrap();
    assert_eq!(checked.plan.instance_count(), 2);

    let err = plan_teardown(
        &provider,
        &SafetyGate::default(),
        &FilterRequest::regex("abcd1234-(east"),
    )
    .await
    .unwrap_err();
    assert!(err.is_configuration());
}
