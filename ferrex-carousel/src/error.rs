use ferrex_contracts::render::RenderError;
use ferrex_contracts::source::SourceError;
use ferrex_model::{GroupKey, RecordId};
use thiserror::Error;

use crate::config::ConfigError;
use crate::focus::input::JumpError;

#[derive(Error, Debug)]
pub enum CarouselError {
    #[error("Page fetch failed for group {group}: {source}")]
    Fetch {
        group: GroupKey,
        #[source]
        source: SourceError,
    },

    #[error("Renderer failed for {id}: {source}")]
    Renderer {
        id: RecordId,
        #[source]
        source: RenderError,
    },

    #[error("Renderer slot for {id} is already destroyed")]
    SlotDestroyed { id: RecordId },

    #[error("Batch request for page {page_key} cancelled by teardown")]
    Cancelled { page_key: u32 },

    #[error("Invalid jump input: {0}")]
    Jump(#[from] JumpError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, CarouselError>;
