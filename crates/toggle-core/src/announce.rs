//! Screen reader announcements.
//!
//! One polite live region exists per session, created lazily on first use.
//! Each announcement clears the region immediately and sets the new text on the
//! next animation frame; repeating the same text without an observable clear
//! is not re-announced by assistive technology.

use std::cell::RefCell;

use crate::platform::TogglePlatform;

/// State change messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Announcement {
    OutputHidden,
    OutputShown,
    AllHidden,
    AllShown,
}

impl Announcement {
    /// Message for a single group changing to `hidden`.
    pub fn single(hidden: bool) -> Self {
        if hidden {
            Announcement::OutputHidden
        } else {
            Announcement::OutputShown
        }
    }

    /// Message for a multi-group change to `hidden`.
    pub fn plural(hidden: bool) -> Self {
        if hidden {
            Announcement::AllHidden
        } else {
            Announcement::AllShown
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Announcement::OutputHidden => "Output hidden",
            Announcement::OutputShown => "Output shown",
            Announcement::AllHidden => "All outputs hidden",
            Announcement::AllShown => "All outputs shown",
        }
    }
}

/// Owner of the single live region.
pub struct Announcer<R> {
    region: RefCell<Option<R>>,
}

impl<R> Default for Announcer<R> {
    fn default() -> Self {
        Self {
            region: RefCell::new(None),
        }
    }
}

impl<R> Announcer<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the live region has been created.
    pub fn is_ready(&self) -> bool {
        self.region.borrow().is_some()
    }

    /// Create the live region if it does not exist yet.
    ///
    /// Returns `false` if the platform could not create it; announcements are
    /// then dropped until a later call succeeds.
    pub fn setup<P>(&self, platform: &P) -> bool
    where
        P: TogglePlatform<LiveRegion = R>,
    {
        let mut slot = self.region.borrow_mut();
        if slot.is_some() {
            return true;
        }
        match platform.create_live_region() {
            Ok(region) => {
                *slot = Some(region);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not create live region");
                false
            }
        }
    }

    pub fn announce<P>(&self, platform: &P, announcement: Announcement)
    where
        P: TogglePlatform<LiveRegion = R>,
    {
        if !self.setup(platform) {
            return;
        }
        let slot = self.region.borrow();
        if let Some(region) = slot.as_ref() {
            platform.clear_live_region(region);
            platform.announce_next_frame(region, announcement.message());
        }
    }

    /// Remove the live region from the page. A later announcement recreates it.
    pub fn teardown<P>(&self, platform: &P)
    where
        P: TogglePlatform<LiveRegion = R>,
    {
        if let Some(region) = self.region.borrow_mut().take() {
            platform.remove_live_region(&region);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryPage;

    #[test]
    fn test_single_region_created_lazily() {
        let page = MemoryPage::new("/");
        let announcer = Announcer::new();
        assert!(!announcer.is_ready());
        assert_eq!(page.live_region_count(), 0);

        announcer.announce(&page, Announcement::OutputHidden);
        announcer.announce(&page, Announcement::OutputShown);
        assert!(announcer.is_ready());
        assert_eq!(page.live_region_count(), 1);
    }

    #[test]
    fn test_clear_then_set_on_next_frame() {
        let page = MemoryPage::new("/");
        let announcer = Announcer::new();

        announcer.announce(&page, Announcement::OutputHidden);
        assert_eq!(page.live_text().as_deref(), Some(""));
        page.run_frame();
        assert_eq!(page.live_text().as_deref(), Some("Output hidden"));

        // Same message again is observably cleared first.
        announcer.announce(&page, Announcement::OutputHidden);
        assert_eq!(page.live_text().as_deref(), Some(""));
        page.run_frame();
        assert_eq!(page.live_text().as_deref(), Some("Output hidden"));
    }

    #[test]
    fn test_teardown_removes_region() {
        let page = MemoryPage::new("/");
        let announcer = Announcer::new();
        announcer.setup(&page);
        assert_eq!(page.live_region_count(), 1);

        announcer.teardown(&page);
        assert!(!announcer.is_ready());
        assert_eq!(page.live_region_count(), 0);
    }

    #[test]
    fn test_plural_messages() {
        assert_eq!(Announcement::plural(true).message(), "All outputs hidden");
        assert_eq!(Announcement::plural(false).message(), "All outputs shown");
        assert_eq!(Announcement::single(false).message(), "Output shown");
    }
}
