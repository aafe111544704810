//! Backend detection.

use crate::driver::{ComputeDriver, DefaultDriver};
use crate::processor::Backend;

/// Information about a compute backend.
#[derive(Debug, Clone)]
pub struct BackendInfo {
    /// Backend type.
    pub backend: Backend,
    /// Human-readable name.
    pub name: &'static str,
    /// Whether backend is available.
    pub available: bool,
    /// Description.
    pub description: &'static str,
}

/// Detect all backends compiled into this build, available ones first.
pub fn detect_backends() -> Vec<BackendInfo> {
    detect_with(&DefaultDriver::default())
}

/// Same as [`detect_backends`] but probes `driver` for the accelerator.
pub fn detect_with<D: ComputeDriver>(driver: &D) -> Vec<BackendInfo> {
    let accel_available = driver.is_available();
    let mut backends = vec![
        BackendInfo {
            backend: Backend::OpenCl,
            name: "OpenCL",
            available: accel_available,
            description: if cfg!(feature = "opencl") {
                "first GPU device via OpenCL"
            } else {
                "not compiled in (enable the `opencl` feature)"
            },
        },
        BackendInfo {
            backend: Backend::Cpu,
            name: "CPU",
            available: true,
            description: cpu_description(),
        },
    ];

    // stable: the accelerator stays ahead of the CPU when both are usable
    backends.sort_by_key(|b| !b.available);
    backends
}

/// One line per backend: `[+] name: description`, `-` when unavailable.
pub fn describe_backends() -> String {
    describe(&detect_backends())
}

pub(crate) fn describe(backends: &[BackendInfo]) -> String {
    let mut desc = String::new();
    for info in backends {
        let status = if info.available { "+" } else { "-" };
        desc.push_str(&format!("[{}] {}: {}\n", status, info.name, info.description));
    }
    desc
}

fn cpu_description() -> &'static str {
    if cfg!(feature = "parallel") {
        "CPU with rayon parallelization"
    } else {
        "CPU, single thread"
    }
}
