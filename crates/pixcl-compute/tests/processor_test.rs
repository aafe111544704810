//! Processor backend selection and CPU fallback.

mod common;

use common::{Kind, MockDriver, Stage, gradient};
use pixcl_compute::{
    Backend, ComputeError, Processor, ProcessorBuilder, ProcessorConfig, describe_backends,
    detect_with,
};
use pixcl_core::{Bitmap, Rect};

#[test]
fn test_cpu_backend_available() {
    assert!(Backend::Cpu.is_available());
    assert!(Backend::Auto.is_available());
}

#[test]
fn test_describe_backends() {
    let desc = describe_backends();
    assert!(desc.contains("CPU"));
    assert!(desc.contains("OpenCL"));
}

#[test]
fn test_detect_lists_usable_accelerator_first() {
    let backends = detect_with(&MockDriver::new());
    let order: Vec<_> = backends.iter().map(|b| (b.backend, b.available)).collect();
    assert_eq!(order, [(Backend::OpenCl, true), (Backend::Cpu, true)]);
}

#[test]
fn test_auto_uses_accelerator_when_present() {
    let proc = Processor::new(MockDriver::new(), ProcessorConfig::default()).unwrap();
    assert_eq!(proc.backend_name(), "opencl");
    assert_eq!(proc.device_name(), Some("Mock GPU"));
}

#[test]
fn test_auto_falls_back_when_init_fails() {
    let driver = MockDriver::new();
    driver.fail(Stage::Queue);
    let state = driver.state();

    let proc = Processor::new(driver, ProcessorConfig::default()).unwrap();
    assert_eq!(proc.backend_name(), "cpu");
    assert_eq!(state.borrow().live(Kind::Context), 0);

    let src = gradient(4, 3);
    let mut expected = Bitmap::new(4, 3).unwrap();
    pixcl_ops::grayscale(&src, &mut expected).unwrap();
    assert_eq!(proc.grayscale(&src).unwrap(), expected);
}

#[test]
fn test_cpu_backend_never_initializes() {
    let driver = MockDriver::new();
    let state = driver.state();
    let proc = ProcessorBuilder::new()
        .backend(Backend::Cpu)
        .build_with(driver)
        .unwrap();
    assert_eq!(proc.backend_name(), "cpu");
    assert_eq!(state.borrow().created(Kind::Context), 0);
}

#[test]
fn test_required_backend_reports_init_error() {
    let driver = MockDriver::new();
    driver.fail(Stage::Discovery);
    let err = ProcessorBuilder::new()
        .backend(Backend::OpenCl)
        .build_with(driver)
        .unwrap_err();
    assert!(matches!(err, ComputeError::DeviceDiscoveryFailure(_)));
}

#[test]
fn test_failed_job_falls_back_to_cpu() {
    let driver = MockDriver::new();
    let state = driver.state();
    let proc = ProcessorBuilder::new()
        .backend(Backend::OpenCl)
        .build_with(driver)
        .unwrap();
    state.borrow_mut().fail.insert(Stage::Enqueue);

    let src = gradient(6, 6);
    let mut expected = Bitmap::new(6, 6).unwrap();
    pixcl_ops::sepia(&src, &mut expected).unwrap();

    assert_eq!(proc.sepia(&src).unwrap(), expected);
    assert_eq!(state.borrow().live_job_handles(), 0);
}

#[test]
fn test_failed_job_without_fallback_errors() {
    let driver = MockDriver::new();
    let state = driver.state();
    let proc = ProcessorBuilder::new()
        .backend(Backend::OpenCl)
        .fallback_to_cpu(false)
        .build_with(driver)
        .unwrap();
    state.borrow_mut().fail.insert(Stage::Readback);

    let err = proc.grayscale(&gradient(3, 3)).unwrap_err();
    assert!(matches!(err, ComputeError::ReadbackFailure(_)));
}

#[test]
fn test_accelerated_scale_nearest() {
    let driver = MockDriver::new();
    let state = driver.state();
    let proc = Processor::new(driver, ProcessorConfig::default()).unwrap();

    let src = gradient(8, 8);
    let out = proc.scale_nearest(&src, 4, 2).unwrap();
    let mut expected = Bitmap::new(4, 2).unwrap();
    pixcl_ops::scale_nearest(&src, &mut expected).unwrap();

    assert_eq!(out, expected);
    assert_eq!(state.borrow().launches.len(), 1);
}

#[test]
fn test_sepia_image_runs_image_kernel() {
    let driver = MockDriver::new();
    let state = driver.state();
    let proc = Processor::new(driver, ProcessorConfig::default()).unwrap();

    let src = gradient(6, 4);
    let out = proc.sepia_image(&src).unwrap();
    assert_eq!(out, proc.sepia(&src).unwrap());

    let s = state.borrow();
    assert_eq!(s.launches[0].entry, "sepia_image");
    assert_eq!(s.launches[0].global.len(), 2);
}

#[test]
fn test_sepia_image_falls_back_to_cpu_sepia() {
    let driver = MockDriver::new();
    let state = driver.state();
    let proc = Processor::new(driver, ProcessorConfig::default()).unwrap();
    state.borrow_mut().fail.insert(Stage::Enqueue);

    let src = gradient(5, 3);
    let mut expected = Bitmap::new(5, 3).unwrap();
    pixcl_ops::sepia(&src, &mut expected).unwrap();
    assert_eq!(proc.sepia_image(&src).unwrap(), expected);
}

#[test]
fn test_bilinear_and_crop_stay_on_cpu() {
    let driver = MockDriver::new();
    let state = driver.state();
    let proc = Processor::new(driver, ProcessorConfig::default()).unwrap();
    let src = gradient(10, 8);

    let scaled = proc.scale_bilinear(&src, 5, 4).unwrap();
    assert_eq!((scaled.width(), scaled.height()), (5, 4));

    let cropped = proc.crop(&src, Rect::new(2, 1, 3, 3)).unwrap();
    assert_eq!(cropped.pixel(0, 0).unwrap(), src.pixel(2, 1).unwrap());
    assert_eq!(cropped.pixel(2, 2).unwrap(), src.pixel(4, 3).unwrap());

    assert!(state.borrow().launches.is_empty());
}

#[test]
fn test_zero_target_size_is_error() {
    let proc = ProcessorBuilder::new()
        .backend(Backend::Cpu)
        .build_with(MockDriver::new())
        .unwrap();
    let err = proc.scale_nearest(&gradient(4, 4), 0, 4).unwrap_err();
    assert!(matches!(err, ComputeError::Core(_)));
}
