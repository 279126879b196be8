pub mod batch;
pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod parse;
pub mod pipeline;
pub mod region;
pub mod signal;
pub mod synthesize;

#[cfg(feature = "fetch")]
pub use batch::BatchDriver;
pub use batch::{batch_number, checkpoint_path, load_urls, prioritize, write_records};
pub use classify::{ClassifiedFeatures, DifficultyTier, RouteType, Tag, WalkType, classify};
pub use config::{BatchConfig, PipelineConfig, PipelineConfigBuilder};
pub use error::{Result, TrailmarkError};
pub use extract::{extract_listing, extract_page, extract_row, select_popular};
pub use fetch::FetchConfig;
#[cfg(feature = "fetch")]
pub use fetch::fetch_url;
pub use fetch::{fetch_file, fetch_stdin};
pub use normalize::{StageRecord, WalkRecord, normalize, slugify};
pub use parse::{Document, Element};
pub use pipeline::{BatchReport, Pipeline};
pub use region::{Region, region_key_from_url, region_slug};
pub use signal::{ListingRow, RawWalkSignal};
pub use synthesize::{Synthesized, synthesize};
