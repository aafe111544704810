//! Scripted in-memory driver for dispatch tests.
//!
//! Every handle bumps a live counter on creation and drops it on release,
//! so tests can assert that nothing leaks. Any stage can be told to fail.
//! Launches run the packed and image kernels on the host, honoring the
//! padded global size and each kernel's bound check.

#![allow(dead_code)]

use pixcl_compute::{
    ComputeDriver, ComputeError, ComputeResult, KernelArg, MemAccess, PlatformInfo, ScalarType,
};
use pixcl_core::Rgba;
use pixcl_ops::pixel::{grayscale_pixel, sepia_pixel};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

pub type Shared = Rc<RefCell<MockState>>;

/// Kinds of released device objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Context,
    Queue,
    Program,
    Kernel,
    Buffer,
}

/// Driver calls that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Discovery,
    Context,
    Queue,
    VectorWidth,
    Build,
    Kernel,
    Upload,
    SetArg,
    WorkGroup,
    Enqueue,
    Finish,
    Readback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launch {
    pub entry: String,
    pub global: Vec<usize>,
    pub local: Vec<usize>,
}

#[derive(Debug)]
pub struct MockState {
    pub live: HashMap<Kind, i64>,
    pub created: HashMap<Kind, usize>,
    pub released: Vec<Kind>,
    pub fail: HashSet<Stage>,
    /// Zero-based index of the buffer allocation that fails.
    pub fail_allocation: Option<usize>,
    pub allocations: usize,
    pub int_width: u32,
    pub float_width: u32,
    pub work_group: usize,
    pub build_log: String,
    pub launches: Vec<Launch>,
    pub build_options: Vec<String>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            live: HashMap::new(),
            created: HashMap::new(),
            released: Vec::new(),
            fail: HashSet::new(),
            fail_allocation: None,
            allocations: 0,
            int_width: 4,
            float_width: 4,
            work_group: 8,
            build_log: "error: unexpected token".into(),
            launches: Vec::new(),
            build_options: Vec::new(),
        }
    }
}

impl MockState {
    pub fn live(&self, kind: Kind) -> i64 {
        self.live.get(&kind).copied().unwrap_or(0)
    }

    pub fn created(&self, kind: Kind) -> usize {
        self.created.get(&kind).copied().unwrap_or(0)
    }

    /// Live programs, kernels and buffers.
    pub fn live_job_handles(&self) -> i64 {
        self.live(Kind::Program) + self.live(Kind::Kernel) + self.live(Kind::Buffer)
    }

    fn check(&self, stage: Stage) -> ComputeResult<()> {
        if !self.fail.contains(&stage) {
            return Ok(());
        }
        let msg = format!("injected {stage:?} failure");
        Err(match stage {
            Stage::Discovery | Stage::VectorWidth => ComputeError::DeviceDiscoveryFailure(msg),
            Stage::Context => ComputeError::ContextCreationFailure(msg),
            Stage::Queue => ComputeError::QueueCreationFailure(msg),
            Stage::Build => ComputeError::ProgramBuildFailure {
                log: self.build_log.clone(),
            },
            Stage::Kernel => ComputeError::KernelCreationFailure(msg),
            Stage::Upload => ComputeError::UploadFailure(msg),
            Stage::SetArg => ComputeError::ArgumentBindingFailure(msg),
            Stage::WorkGroup => ComputeError::WorkGroupQueryFailure(msg),
            Stage::Enqueue | Stage::Finish => ComputeError::ExecutionFailure(msg),
            Stage::Readback => ComputeError::ReadbackFailure(msg),
        })
    }
}

/// Counts itself in [`MockState::live`] until dropped.
#[derive(Debug)]
pub struct Tracked {
    kind: Kind,
    state: Shared,
}

impl Tracked {
    fn new(kind: Kind, state: &Shared) -> Self {
        {
            let mut s = state.borrow_mut();
            *s.live.entry(kind).or_default() += 1;
            *s.created.entry(kind).or_default() += 1;
        }
        Self {
            kind,
            state: Rc::clone(state),
        }
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        let mut s = self.state.borrow_mut();
        *s.live.entry(self.kind).or_default() -= 1;
        s.released.push(self.kind);
    }
}

#[derive(Debug)]
pub struct MockDevice {
    name: String,
}

#[derive(Debug)]
pub struct MockContext(Tracked);

#[derive(Debug)]
pub struct MockQueue(Tracked);

#[derive(Debug)]
pub struct MockProgram {
    _tracked: Tracked,
    source: String,
}

#[derive(Debug, Clone)]
enum ArgValue {
    Mem {
        data: Rc<RefCell<Vec<u8>>>,
        image: Option<(usize, usize)>,
    },
    U32(u32),
}

#[derive(Debug)]
pub struct MockKernel {
    _tracked: Tracked,
    entry: String,
    args: Vec<Option<ArgValue>>,
}

#[derive(Debug)]
pub struct MockBuffer {
    _tracked: Tracked,
    data: Rc<RefCell<Vec<u8>>>,
    image: Option<(usize, usize)>,
}

#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    state: Shared,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Driver reporting `lanes` as the preferred int width.
    pub fn with_int_width(lanes: u32) -> Self {
        let driver = Self::new();
        driver.state.borrow_mut().int_width = lanes;
        driver
    }

    /// Handle on the shared state, valid after the driver is moved.
    pub fn state(&self) -> Shared {
        Rc::clone(&self.state)
    }

    pub fn fail(&self, stage: Stage) {
        self.state.borrow_mut().fail.insert(stage);
    }

    fn tracked(&self, kind: Kind) -> Tracked {
        Tracked::new(kind, &self.state)
    }

    fn check(&self, stage: Stage) -> ComputeResult<()> {
        self.state.borrow().check(stage)
    }

    fn new_buffer(&self, size: usize, image: Option<(usize, usize)>) -> ComputeResult<MockBuffer> {
        {
            let mut s = self.state.borrow_mut();
            let index = s.allocations;
            s.allocations += 1;
            if s.fail_allocation == Some(index) {
                return Err(ComputeError::BufferAllocationFailure(format!(
                    "injected failure on allocation {index}"
                )));
            }
        }
        Ok(MockBuffer {
            _tracked: self.tracked(Kind::Buffer),
            data: Rc::new(RefCell::new(vec![0; size])),
            image,
        })
    }
}

impl ComputeDriver for MockDriver {
    type Device = MockDevice;
    type Context = MockContext;
    type Queue = MockQueue;
    type Program = MockProgram;
    type Kernel = MockKernel;
    type Buffer = MockBuffer;

    fn name(&self) -> &'static str {
        "mock"
    }

    fn platforms(&self) -> ComputeResult<Vec<PlatformInfo>> {
        Ok(vec![PlatformInfo {
            name: "Mock Platform".into(),
            vendor: "pixcl".into(),
            version: "OpenCL 1.2 mock".into(),
            profile: "FULL_PROFILE".into(),
            extensions: String::new(),
        }])
    }

    fn gpu_device(&self) -> ComputeResult<MockDevice> {
        self.check(Stage::Discovery)?;
        Ok(MockDevice {
            name: "Mock GPU".into(),
        })
    }

    fn device_name(&self, device: &MockDevice) -> String {
        device.name.clone()
    }

    fn create_context(&self, _device: &MockDevice) -> ComputeResult<MockContext> {
        self.check(Stage::Context)?;
        Ok(MockContext(self.tracked(Kind::Context)))
    }

    fn create_queue(
        &self,
        _context: &MockContext,
        _device: &MockDevice,
    ) -> ComputeResult<MockQueue> {
        self.check(Stage::Queue)?;
        Ok(MockQueue(self.tracked(Kind::Queue)))
    }

    fn preferred_vector_width(
        &self,
        _device: &MockDevice,
        scalar: ScalarType,
    ) -> ComputeResult<u32> {
        self.check(Stage::VectorWidth)?;
        let s = self.state.borrow();
        Ok(match scalar {
            ScalarType::Int => s.int_width,
            ScalarType::Float => s.float_width,
        })
    }

    fn build_program(
        &self,
        _context: &MockContext,
        _device: &MockDevice,
        source: &str,
        options: &str,
    ) -> ComputeResult<MockProgram> {
        self.check(Stage::Build)?;
        self.state.borrow_mut().build_options.push(options.to_string());
        Ok(MockProgram {
            _tracked: self.tracked(Kind::Program),
            source: source.to_string(),
        })
    }

    fn create_kernel(&self, program: &MockProgram, entry_point: &str) -> ComputeResult<MockKernel> {
        self.check(Stage::Kernel)?;
        if !program
            .source
            .contains(&format!("__kernel void {entry_point}("))
        {
            return Err(ComputeError::KernelCreationFailure(format!(
                "no entry point {entry_point}"
            )));
        }
        Ok(MockKernel {
            _tracked: self.tracked(Kind::Kernel),
            entry: entry_point.to_string(),
            args: Vec::new(),
        })
    }

    fn create_buffer(
        &self,
        _context: &MockContext,
        _access: MemAccess,
        size: usize,
    ) -> ComputeResult<MockBuffer> {
        self.new_buffer(size, None)
    }

    fn create_image(
        &self,
        _context: &MockContext,
        _access: MemAccess,
        width: usize,
        height: usize,
    ) -> ComputeResult<MockBuffer> {
        self.new_buffer(width * height * 4, Some((width, height)))
    }

    fn write(&self, _queue: &MockQueue, buffer: &mut MockBuffer, data: &[u8]) -> ComputeResult<()> {
        self.check(Stage::Upload)?;
        buffer.data.borrow_mut().copy_from_slice(data);
        Ok(())
    }

    fn read(&self, _queue: &MockQueue, buffer: &MockBuffer, out: &mut [u8]) -> ComputeResult<()> {
        self.check(Stage::Readback)?;
        out.copy_from_slice(&buffer.data.borrow());
        Ok(())
    }

    fn set_arg(
        &self,
        kernel: &mut MockKernel,
        index: u32,
        arg: KernelArg<'_, MockBuffer>,
    ) -> ComputeResult<()> {
        self.check(Stage::SetArg)?;
        let value = match arg {
            KernelArg::Mem(buffer) => ArgValue::Mem {
                data: Rc::clone(&buffer.data),
                image: buffer.image,
            },
            KernelArg::U32(v) => ArgValue::U32(v),
        };
        let index = index as usize;
        if kernel.args.len() <= index {
            kernel.args.resize(index + 1, None);
        }
        kernel.args[index] = Some(value);
        Ok(())
    }

    fn work_group_size(&self, _kernel: &MockKernel, _device: &MockDevice) -> ComputeResult<usize> {
        self.check(Stage::WorkGroup)?;
        Ok(self.state.borrow().work_group)
    }

    fn enqueue(
        &self,
        _queue: &MockQueue,
        kernel: &MockKernel,
        global: &[usize],
        local: &[usize],
    ) -> ComputeResult<()> {
        self.check(Stage::Enqueue)?;
        let uneven = global
            .iter()
            .zip(local)
            .any(|(g, l)| *l == 0 || g % l != 0);
        if global.len() != local.len() || uneven {
            return Err(ComputeError::ExecutionFailure(format!(
                "invalid work size {global:?} / {local:?}"
            )));
        }
        self.state.borrow_mut().launches.push(Launch {
            entry: kernel.entry.clone(),
            global: global.to_vec(),
            local: local.to_vec(),
        });
        emulate(kernel, global)
    }

    fn finish(&self, _queue: &MockQueue) -> ComputeResult<()> {
        self.check(Stage::Finish)
    }
}

// ============================================================================
// Kernel emulation
// ============================================================================

fn emulate(kernel: &MockKernel, global: &[usize]) -> ComputeResult<()> {
    let (name, lanes) = match kernel.entry.rsplit_once("_x") {
        Some((name, w)) => (name, w.parse::<usize>().map_err(exec_err)?),
        None => (kernel.entry.as_str(), 1),
    };
    match name {
        "grayscale" => emulate_packed(kernel, global[0], lanes, grayscale_pixel),
        "sepia" => emulate_packed(kernel, global[0], lanes, sepia_pixel),
        "sepia_image" => emulate_image_pixels(kernel, global, sepia_pixel),
        "scale_nearest" => emulate_nearest(kernel, global),
        other => Err(exec_err(format!("unknown kernel {other}"))),
    }
}

fn emulate_packed(
    kernel: &MockKernel,
    items: usize,
    lanes: usize,
    op: fn(Rgba) -> Rgba,
) -> ComputeResult<()> {
    let (input, _) = mem_arg(kernel, 0)?;
    let (output, _) = mem_arg(kernel, 1)?;
    let count = u32_arg(kernel, 2)? as usize;
    let input = input.borrow();
    let mut output = output.borrow_mut();

    for item in 0..items {
        let base = item * lanes;
        if base >= count {
            continue;
        }
        for k in base..(base + lanes).min(count) {
            let word = u32::from_le_bytes(word_at(&input, k));
            let px = op(Rgba::from_word(word));
            output[k * 4..k * 4 + 4].copy_from_slice(&px.to_word().to_le_bytes());
        }
    }
    Ok(())
}

/// Per-pixel image kernel with a `(width, height)` bound check.
fn emulate_image_pixels(
    kernel: &MockKernel,
    global: &[usize],
    op: fn(Rgba) -> Rgba,
) -> ComputeResult<()> {
    let (input, in_dims) = mem_arg(kernel, 0)?;
    let (output, out_dims) = mem_arg(kernel, 1)?;
    if in_dims.is_none() || out_dims.is_none() {
        return Err(exec_err("sepia_image needs image arguments"));
    }
    let width = u32_arg(kernel, 2)? as usize;
    let height = u32_arg(kernel, 3)? as usize;
    let input = input.borrow();
    let mut output = output.borrow_mut();

    for y in 0..global[1] {
        for x in 0..global[0] {
            if x >= width || y >= height {
                continue;
            }
            let i = y * width + x;
            let px = op(Rgba::from_word(u32::from_le_bytes(word_at(&input, i))));
            output[i * 4..i * 4 + 4].copy_from_slice(&px.to_word().to_le_bytes());
        }
    }
    Ok(())
}

fn emulate_nearest(kernel: &MockKernel, global: &[usize]) -> ComputeResult<()> {
    let (input, in_dims) = mem_arg(kernel, 0)?;
    let (output, _) = mem_arg(kernel, 1)?;
    let (image_w, image_h) = in_dims.ok_or_else(|| exec_err("input is not an image"))?;
    let out_w = u32_arg(kernel, 2)? as u64;
    let out_h = u32_arg(kernel, 3)? as u64;
    let in_w = u32_arg(kernel, 4)? as u64;
    let in_h = u32_arg(kernel, 5)? as u64;
    if (in_w as usize, in_h as usize) != (image_w, image_h) {
        return Err(exec_err("source size argument differs from the input image"));
    }
    let input = input.borrow();
    let mut output = output.borrow_mut();

    for y in 0..global[1] as u64 {
        for x in 0..global[0] as u64 {
            if x >= out_w || y >= out_h {
                continue;
            }
            let sx = ((x * in_w / out_w) as usize).min(image_w - 1);
            let sy = ((y * in_h / out_h) as usize).min(image_h - 1);
            let (x, y, out_w) = (x as usize, y as usize, out_w as usize);
            let dst = (y * out_w + x) * 4;
            output[dst..dst + 4].copy_from_slice(&word_at(&input, sy * image_w + sx));
        }
    }
    Ok(())
}

fn word_at(bytes: &[u8], index: usize) -> [u8; 4] {
    let i = index * 4;
    [bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]
}

fn arg(kernel: &MockKernel, index: usize) -> ComputeResult<&ArgValue> {
    kernel
        .args
        .get(index)
        .and_then(Option::as_ref)
        .ok_or_else(|| exec_err(format!("argument {index} not set")))
}

fn mem_arg(
    kernel: &MockKernel,
    index: usize,
) -> ComputeResult<(Rc<RefCell<Vec<u8>>>, Option<(usize, usize)>)> {
    match arg(kernel, index)? {
        ArgValue::Mem { data, image } => Ok((Rc::clone(data), *image)),
        other => Err(exec_err(format!("argument {index} is {other:?}, expected memory"))),
    }
}

fn u32_arg(kernel: &MockKernel, index: usize) -> ComputeResult<u32> {
    match arg(kernel, index)? {
        ArgValue::U32(v) => Ok(*v),
        other => Err(exec_err(format!("argument {index} is {other:?}, expected uint"))),
    }
}

fn exec_err(e: impl ToString) -> ComputeError {
    ComputeError::ExecutionFailure(e.to_string())
}

// ============================================================================
// Fixtures
// ============================================================================

/// Deterministic opaque-ish gradient with varied alpha.
pub fn gradient(width: u32, height: u32) -> pixcl_core::Bitmap {
    let pixels = (0..width * height)
        .map(|i| {
            let x = i % width;
            let y = i / width;
            Rgba::new(
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                ((x * 7 + y * 13) % 256) as u8,
                (255 - (i % 64)) as u8,
            )
        })
        .collect();
    match pixcl_core::Bitmap::from_pixels(width, height, pixels) {
        Ok(bitmap) => bitmap,
        Err(e) => panic!("fixture {width}x{height}: {e}"),
    }
}
