use bytemuck::{Pod, Zeroable};

/// Number of fragment-stage uniform bindings the playground contract fixes.
pub(crate) const SCRATCH_BINDING_COUNT: u32 = 4;

/// Uniform buffers are allocated at this size regardless of payload so every
/// binding satisfies the strictest backend layout rules.
const SCRATCH_BUFFER_SIZE: u64 = 16;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(crate) struct ResolutionUniform {
    pub size: [f32; 2],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(crate) struct TimeUniform {
    pub seconds: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(crate) struct VolumeUniform {
    pub level: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(crate) struct GravityUniform {
    pub vector: [f32; 3],
}

/// The four per-frame uniform scratch buffers, bound at fragment-stage
/// bindings 0-3 in this order: resolution, time, volume, gravity.
///
/// Each holds a single value with no history; the frame loop overwrites
/// time, volume, and gravity every draw, and resize events overwrite
/// resolution. Created once and never reallocated.
pub(crate) struct ScratchBuffers {
    pub resolution: wgpu::Buffer,
    pub time: wgpu::Buffer,
    pub volume: wgpu::Buffer,
    pub gravity: wgpu::Buffer,
}

impl ScratchBuffers {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            resolution: create_scratch(device, "resolution scratch"),
            time: create_scratch(device, "time scratch"),
            volume: create_scratch(device, "volume scratch"),
            gravity: create_scratch(device, "gravity scratch"),
        }
    }

    pub fn write_resolution(&self, queue: &wgpu::Queue, width: f32, height: f32) {
        let uniform = ResolutionUniform {
            size: [width, height],
        };
        queue.write_buffer(&self.resolution, 0, bytemuck::bytes_of(&uniform));
    }

    pub fn write_time(&self, queue: &wgpu::Queue, seconds: f32) {
        let uniform = TimeUniform { seconds };
        queue.write_buffer(&self.time, 0, bytemuck::bytes_of(&uniform));
    }

    pub fn write_volume(&self, queue: &wgpu::Queue, level: f32) {
        let uniform = VolumeUniform { level };
        queue.write_buffer(&self.volume, 0, bytemuck::bytes_of(&uniform));
    }

    pub fn write_gravity(&self, queue: &wgpu::Queue, vector: [f32; 3]) {
        let uniform = GravityUniform { vector };
        queue.write_buffer(&self.gravity, 0, bytemuck::bytes_of(&uniform));
    }

    /// Bind group entries in the contract's binding order.
    pub fn bind_group_entries(&self) -> [wgpu::BindGroupEntry<'_>; SCRATCH_BINDING_COUNT as usize] {
        let buffers = [&self.resolution, &self.time, &self.volume, &self.gravity];
        std::array::from_fn(|index| wgpu::BindGroupEntry {
            binding: index as u32,
            resource: buffers[index].as_entire_binding(),
        })
    }
}

fn create_scratch(device: &wgpu::Device, label: &str) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: SCRATCH_BUFFER_SIZE,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

pub(crate) fn scratch_layout_entries() -> [wgpu::BindGroupLayoutEntry; SCRATCH_BINDING_COUNT as usize]
{
    std::array::from_fn(|index| wgpu::BindGroupLayoutEntry {
        binding: index as u32,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_payloads_fit_the_scratch_buffers() {
        assert_eq!(std::mem::size_of::<ResolutionUniform>(), 8);
        assert_eq!(std::mem::size_of::<TimeUniform>(), 4);
        assert_eq!(std::mem::size_of::<VolumeUniform>(), 4);
        assert_eq!(std::mem::size_of::<GravityUniform>(), 12);
        assert!(std::mem::size_of::<GravityUniform>() as u64 <= SCRATCH_BUFFER_SIZE);
    }

    #[test]
    fn layout_covers_the_four_contract_bindings() {
        let entries = scratch_layout_entries();
        assert_eq!(entries.len(), 4);
        for (index, entry) in entries.iter().enumerate() {
            assert_eq!(entry.binding, index as u32);
            assert_eq!(entry.visibility, wgpu::ShaderStages::FRAGMENT);
        }
    }
}
