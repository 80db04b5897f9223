/// Runtime-tunable parameters for a [`crate::Runner`].
///
/// Unlike a driver's own on-disk configuration, `RunConfig` is constructed
/// programmatically by the embedding application — there is no file format
/// owned by this crate — but it keeps the plain-struct-plus-builder shape
/// used elsewhere in this codebase so a driver crate can still deserialize
/// one with `serde` if it wants to expose these as user settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub fps: u32,
    pub inbox_capacity: usize,
    pub record_frames: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig { fps: 60, inbox_capacity: 256, record_frames: false }
    }
}

impl RunConfig {
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    pub fn with_inbox_capacity(mut self, cap: usize) -> Self {
        self.inbox_capacity = cap;
        self
    }

    pub fn with_record_frames(mut self, record: bool) -> Self {
        self.record_frames = record;
        self
    }

    pub(crate) fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(1000 / self.fps.max(1) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_caps_at_sixty_fps() {
        assert_eq!(RunConfig::default().fps, 60);
    }

    #[test]
    fn builder_overrides_fields() {
        let cfg = RunConfig::default().with_fps(30).with_inbox_capacity(8);
        assert_eq!(cfg.fps, 30);
        assert_eq!(cfg.inbox_capacity, 8);
    }
}
