use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Device and queue shared by the drawing target and the compositor, plus the
/// limits and health flag the target selector needs. Independent of any
/// window surface.
pub(crate) struct SharedDevice {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub max_texture_dimension: u32,
    lost: Arc<AtomicBool>,
}

impl SharedDevice {
    pub(crate) fn request(adapter: &wgpu::Adapter) -> Result<Self, wgpu::RequestDeviceError> {
        let limits = adapter.limits();
        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("surfbench device"),
            required_features: wgpu::Features::empty(),
            required_limits: limits.clone(),
            experimental_features: wgpu::ExperimentalFeatures::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        }))?;

        let lost = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&lost);
        device.set_device_lost_callback(move |reason, message| {
            flag.store(true, Ordering::Release);
            tracing::warn!(?reason, %message, "GPU device lost");
        });

        Ok(Self {
            device,
            queue,
            max_texture_dimension: limits.max_texture_dimension_2d,
            lost,
        })
    }

    /// Device on a compute-capable adapter with no surface attached. `None`
    /// when the machine has no such adapter.
    #[cfg(test)]
    pub(crate) fn headless() -> Option<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok()?;
        Self::request(&adapter).ok()
    }

    /// True once the driver reported the device as lost. Never resets.
    pub(crate) fn is_lost(&self) -> bool {
        self.lost.load(Ordering::Acquire)
    }

    /// Runs `allocate` inside validation and out-of-memory error scopes and
    /// reports the first captured error.
    pub(crate) fn scoped<T>(&self, allocate: impl FnOnce(&wgpu::Device) -> T) -> Result<T, String> {
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = allocate(&self.device);
        let validation = pollster::block_on(self.device.pop_error_scope());
        let memory = pollster::block_on(self.device.pop_error_scope());
        match validation.or(memory) {
            Some(err) => Err(err.to_string()),
            None => Ok(value),
        }
    }
}
