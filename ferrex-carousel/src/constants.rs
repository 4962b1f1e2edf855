//! Carousel constants
//!
//! Compiled defaults for every tunable the carousel reads. `CarouselConfig`
//! overrides any of them; anything left unset falls back to these.

/// Page and window sizes.
pub mod paging {
    /// Records requested per forward page or look-behind window.
    pub const PAGE_SIZE: usize = 40;
    /// Items loaded before a jump target so stepping back is already warm.
    pub const LOOK_BEHIND_ITEMS: usize = 5;
}

/// Keyboard-driven viewport scrolling.
pub mod autoscroll {
    /// Effective steps in one direction between scroll requests.
    pub const EVERY_STEPS: usize = 3;
    /// Item strides scrolled per request.
    pub const ITEMS: usize = 3;
}

/// Card geometry used to turn item strides into pixels.
pub mod layout {
    pub const ITEM_WIDTH: f32 = 200.0;
    pub const ITEM_SPACING: f32 = 15.0;
}

pub mod keys {
    pub const PREV: &str = "ArrowLeft";
    pub const NEXT: &str = "ArrowRight";
}

pub mod logging {
    /// Filter used when `RUST_LOG` is unset.
    pub const DEFAULT_FILTER: &str = "info";
}

/// Environment variable naming a TOML or JSON config file.
pub const CONFIG_PATH_ENV: &str = "CAROUSEL_CONFIG_PATH";
