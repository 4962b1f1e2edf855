//! Windowed, cursor-paginated virtualization engine for media carousels.
//!
//! The engine keeps an append-only ordinal map of records for one grouping
//! key ([`store::ItemStore`]), fetches pages through an injected
//! [`PageSource`](ferrex_contracts::source::PageSource) with at most one
//! request in flight ([`pager::CursorPager`], [`session::Session`]), answers
//! batch requests from a virtualization layer and manages per-item renderer
//! lifecycles ([`renderer::VirtualRenderer`]), and keeps a single focused
//! item in sync with an external viewer ([`focus::FocusController`]).
//!
//! [`Carousel`] bundles all of it behind one handle per mounted strip.

#![allow(missing_docs)]

pub mod carousel;
pub mod config;
pub mod constants;
pub mod error;
pub mod focus;
pub mod logging;
pub mod memory;
pub mod pager;
pub mod pending;
pub mod renderer;
pub mod session;
pub mod store;

pub use carousel::{Carousel, CarouselDeps};
pub use config::{CarouselConfig, ConfigError, ConfigSource};
pub use error::{CarouselError, Result};
pub use focus::input::{InputState, JumpError};
pub use focus::{
    ExternalFocus, FocusController, FocusOutcome, FocusTarget, FocusedItem,
    JumpOutcome, StepDirection, StepOutcome,
};
pub use memory::MemorySource;
pub use renderer::batch::{BatchFuture, RenderBatch};
pub use renderer::keyboard::{KeyBindings, KeyOutcome, NavKey, ScrollRequest};
pub use renderer::slot::SlotState;
pub use renderer::{RenderOutcome, VirtualRenderer};
pub use session::{FetchStatus, Session, StoreChange};
pub use store::{BatchItem, ItemStore};
