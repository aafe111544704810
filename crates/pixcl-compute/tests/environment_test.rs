//! Lifecycle tests for the compute environment.

mod common;

use common::{Kind, MockDriver, Stage};
use pixcl_compute::{ComputeEnvironment, ComputeError};

#[test]
fn test_initialize_probes_capabilities() {
    let driver = MockDriver::with_int_width(8);
    let mut env = ComputeEnvironment::new(driver);
    env.initialize().unwrap();

    assert!(env.is_initialized());
    assert_eq!(env.device_name().unwrap(), "Mock GPU");
    let caps = env.capabilities().unwrap();
    assert_eq!(caps.preferred_vector_width_int, 8);
    assert_eq!(caps.preferred_vector_width_float, 4);
}

#[test]
fn test_second_initialize_reuses_handles() {
    let driver = MockDriver::new();
    let state = driver.state();
    let mut env = ComputeEnvironment::new(driver);

    env.initialize().unwrap();
    env.initialize().unwrap();

    let s = state.borrow();
    assert_eq!(s.created(Kind::Context), 1);
    assert_eq!(s.created(Kind::Queue), 1);
    assert_eq!(s.live(Kind::Context), 1);
    assert_eq!(s.live(Kind::Queue), 1);
}

#[test]
fn test_teardown_releases_queue_then_context() {
    let driver = MockDriver::new();
    let state = driver.state();
    let mut env = ComputeEnvironment::new(driver);
    env.initialize().unwrap();

    env.teardown();

    let s = state.borrow();
    assert_eq!(s.released, [Kind::Queue, Kind::Context]);
    assert_eq!(s.live(Kind::Context), 0);
    assert_eq!(s.live(Kind::Queue), 0);
    drop(s);
    assert!(!env.is_initialized());
    assert!(matches!(env.queue(), Err(ComputeError::NotInitialized)));
}

#[test]
fn test_teardown_uninitialized_is_noop() {
    let driver = MockDriver::new();
    let state = driver.state();
    let mut env = ComputeEnvironment::new(driver);

    env.teardown();
    env.teardown();

    assert!(state.borrow().released.is_empty());
    assert!(!env.is_initialized());
}

#[test]
fn test_drop_tears_down() {
    let driver = MockDriver::new();
    let state = driver.state();
    {
        let mut env = ComputeEnvironment::new(driver);
        env.initialize().unwrap();
    }
    let s = state.borrow();
    assert_eq!(s.released, [Kind::Queue, Kind::Context]);
}

#[test]
fn test_discovery_failure_leaves_nothing() {
    let driver = MockDriver::new();
    driver.fail(Stage::Discovery);
    let state = driver.state();
    let mut env = ComputeEnvironment::new(driver);

    let err = env.initialize().unwrap_err();
    assert!(matches!(err, ComputeError::DeviceDiscoveryFailure(_)));
    assert!(err.is_environment_failure());
    assert!(!env.is_initialized());
    assert_eq!(state.borrow().created(Kind::Context), 0);
}

#[test]
fn test_context_failure_is_environment_failure() {
    let driver = MockDriver::new();
    driver.fail(Stage::Context);
    let mut env = ComputeEnvironment::new(driver);

    let err = env.initialize().unwrap_err();
    assert!(matches!(err, ComputeError::ContextCreationFailure(_)));
    assert!(!env.is_initialized());
}

#[test]
fn test_queue_failure_releases_context_and_retry_succeeds() {
    let driver = MockDriver::new();
    driver.fail(Stage::Queue);
    let state = driver.state();
    let mut env = ComputeEnvironment::new(driver);

    let err = env.initialize().unwrap_err();
    assert!(matches!(err, ComputeError::QueueCreationFailure(_)));
    assert!(!env.is_initialized());
    {
        let s = state.borrow();
        assert_eq!(s.created(Kind::Context), 1);
        assert_eq!(s.live(Kind::Context), 0);
        assert_eq!(s.released, [Kind::Context]);
    }

    state.borrow_mut().fail.clear();
    env.initialize().unwrap();
    assert!(env.is_initialized());
    assert_eq!(state.borrow().live(Kind::Context), 1);
}

#[test]
fn test_capability_failure_degrades_to_scalar() {
    let driver = MockDriver::new();
    driver.fail(Stage::VectorWidth);
    let mut env = ComputeEnvironment::new(driver);

    env.initialize().unwrap();
    let caps = env.capabilities().unwrap();
    assert_eq!(caps.preferred_vector_width_int, 1);
    assert_eq!(caps.preferred_vector_width_float, 1);
}

#[test]
fn test_zero_width_reads_as_scalar() {
    let driver = MockDriver::with_int_width(0);
    let mut env = ComputeEnvironment::new(driver);
    env.initialize().unwrap();
    assert_eq!(env.capabilities().unwrap().preferred_vector_width_int, 1);
}

#[test]
fn test_accessors_before_initialize() {
    let env = ComputeEnvironment::new(MockDriver::new());
    assert!(matches!(env.device(), Err(ComputeError::NotInitialized)));
    assert!(matches!(env.context(), Err(ComputeError::NotInitialized)));
    assert!(matches!(env.capabilities(), Err(ComputeError::NotInitialized)));
}
