// src/pipeline/window.rs
//! Render target owned by a pipeline

/// Platform surface the pipeline presents into
pub trait PlatformWindow: Send {
    /// Ask the platform to schedule the next frame
    fn request_frame(&mut self);

    /// Release the surface; called once, from the UI role
    fn destroy(&mut self);
}

/// Pipeline-side wrapper around a [`PlatformWindow`]
pub struct Window {
    platform: Box<dyn PlatformWindow>,
    frames_requested: u64,
    destroyed: bool,
}

impl Window {
    pub fn new(platform: Box<dyn PlatformWindow>) -> Self {
        Self {
            platform,
            frames_requested: 0,
            destroyed: false,
        }
    }

    pub fn request_frame(&mut self) {
        if self.destroyed {
            return;
        }
        self.frames_requested += 1;
        self.platform.request_frame();
    }

    pub fn destroy(&mut self) {
        if !self.destroyed {
            self.destroyed = true;
            self.platform.destroy();
        }
    }

    pub fn frames_requested(&self) -> u64 {
        self.frames_requested
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}
