//! Window collaborator seam
//!
//! The engine never talks to a windowing library directly. A
//! [`WindowSource`] hands it one [`FrameInput`] per frame and signals the end
//! of the loop by returning `None`.

use std::collections::VecDeque;

/// Per-frame input from the window collaborator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Seconds since the previous frame
    pub delta_time: f32,
    /// Framebuffer size in pixels
    pub viewport: (u32, u32),
}

impl FrameInput {
    /// Width / height of the viewport; `None` while minimized
    pub fn aspect_ratio(&self) -> Option<f32> {
        let (width, height) = self.viewport;
        (width > 0 && height > 0).then(|| width as f32 / height as f32)
    }
}

/// Source of frames: a real window, a replay or a fixed-step driver
pub trait WindowSource {
    /// Next frame, or `None` once the window wants to close
    fn next_frame(&mut self) -> Option<FrameInput>;
}

/// Headless source producing a fixed number of equally spaced frames
#[derive(Debug, Clone)]
pub struct FixedStepWindow {
    remaining: u64,
    delta_time: f32,
    viewport: (u32, u32),
    resizes: VecDeque<(u64, (u32, u32))>,
    frame: u64,
}

impl FixedStepWindow {
    /// `frames` frames of `delta_time` seconds at `viewport`
    pub fn new(frames: u64, delta_time: f32, viewport: (u32, u32)) -> Self {
        Self {
            remaining: frames,
            delta_time,
            viewport,
            resizes: VecDeque::new(),
            frame: 0,
        }
    }

    /// Switch to `viewport` starting with frame `frame` (zero-based).
    /// Resizes must be added in frame order.
    pub fn with_resize(mut self, frame: u64, viewport: (u32, u32)) -> Self {
        self.resizes.push_back((frame, viewport));
        self
    }
}

impl WindowSource for FixedStepWindow {
    fn next_frame(&mut self) -> Option<FrameInput> {
        if self.remaining == 0 {
            return None;
        }
        while let Some(&(frame, viewport)) = self.resizes.front() {
            if frame > self.frame {
                break;
            }
            self.viewport = viewport;
            self.resizes.pop_front();
        }
        self.remaining -= 1;
        self.frame += 1;
        Some(FrameInput {
            delta_time: self.delta_time,
            viewport: self.viewport,
        })
    }
}
