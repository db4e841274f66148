use wgpu::{Buffer, BufferUsages, Device, Queue};

use ripple_matrix::config::{CELL_COUNT, DISPLAY_RADIUS, GRID_HEIGHT, GRID_WIDTH};
use ripple_matrix::Frame;

/// LED radius relative to the cell pitch
const LED_FILL: f32 = 0.42;

/// Brightness of an unlit LED, so the disk outline stays visible
const LED_IDLE_GLOW: f32 = 0.04;

/// Matrix parameters passed to the render shader (32 bytes, aligned to 16)
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MatrixParams {
    // Grid info (16 bytes)
    pub grid_width: u32,
    pub grid_height: u32,
    pub display_radius: f32,
    pub led_fill: f32,

    // Look (16 bytes)
    pub idle_glow: f32,
    pub _padding: [f32; 3],
}

/// Per-cell intensity storage buffer and the shader's uniform parameters
pub struct MatrixBuffers {
    pub intensity_buffer: Buffer,
    pub params_buffer: Buffer,
}

impl MatrixBuffers {
    /// Create the buffers and upload the first frame
    pub fn new(device: &Device, queue: &Queue, first: &Frame) -> Self {
        let intensity_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("matrix-intensity-buffer"),
            size: (CELL_COUNT * std::mem::size_of::<f32>()) as u64,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("matrix-params-buffer"),
            size: std::mem::size_of::<MatrixParams>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let params = MatrixParams {
            grid_width: GRID_WIDTH as u32,
            grid_height: GRID_HEIGHT as u32,
            display_radius: DISPLAY_RADIUS,
            led_fill: LED_FILL,
            idle_glow: LED_IDLE_GLOW,
            _padding: [0.0; 3],
        };
        queue.write_buffer(&params_buffer, 0, bytemuck::bytes_of(&params));

        let buffers = Self {
            intensity_buffer,
            params_buffer,
        };
        buffers.upload(queue, first);
        buffers
    }

    /// Push a rendered frame to the GPU
    pub fn upload(&self, queue: &Queue, frame: &Frame) {
        let intensities = frame.intensities();
        queue.write_buffer(&self.intensity_buffer, 0, bytemuck::cast_slice(&intensities));
    }
}
