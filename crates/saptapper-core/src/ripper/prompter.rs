use crate::ripper::Phase;

/// Source of manual answers when a signature scan comes up empty.
///
/// Implementations may block (e.g. reading a terminal); the rip waits.
pub trait ManualOverrideProvider {
    /// File offset of the routine `phase` was looking for, or `None` to give up.
    fn request_offset(&self, phase: Phase) -> Option<u32>;

    /// Name to credit in the `gsfby` tag after overrides were used.
    fn request_credit(&self) -> Option<String>;
}

/// Declines every request, keeping batch runs deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonInteractive;

impl ManualOverrideProvider for NonInteractive {
    fn request_offset(&self, _phase: Phase) -> Option<u32> {
        None
    }

    fn request_credit(&self) -> Option<String> {
        None
    }
}

impl<T: ManualOverrideProvider + ?Sized> ManualOverrideProvider for &T {
    fn request_offset(&self, phase: Phase) -> Option<u32> {
        (**self).request_offset(phase)
    }

    fn request_credit(&self) -> Option<String> {
        (**self).request_credit()
    }
}
