// Copyright @yucwang 2026

/// Per-bounce policy shared by every integrator. Bounce 1 is the primary hit;
/// bounce 0 stands for light emitted directly toward the camera.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BounceController {
    min_bounces: u32,
    max_bounces: u32,
}

impl BounceController {
    pub fn new(min_bounces: u32, max_bounces: u32) -> Self {
        Self { min_bounces, max_bounces }
    }

    pub fn min_bounces(&self) -> u32 {
        self.min_bounces
    }

    pub fn max_bounces(&self) -> u32 {
        self.max_bounces
    }

    /// Whether the direct lighting gathered at `bounce` goes into the estimate.
    pub fn check_counts(&self, bounce: u32) -> bool {
        bounce >= self.min_bounces && bounce <= self.max_bounces
    }

    /// Whether the bounce loop stops before processing `bounce`.
    pub fn check_done(&self, bounce: u32) -> bool {
        bounce > self.max_bounces
    }

    /// Controller for a sub-path whose first hit is one bounce further along.
    pub fn copy_after_bounce(&self) -> Self {
        Self {
            min_bounces: self.min_bounces.saturating_sub(1),
            max_bounces: self.max_bounces.saturating_sub(1),
        }
    }
}

impl Default for BounceController {
    fn default() -> Self {
        Self::new(1, 3)
    }
}
