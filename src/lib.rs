mod api;
mod error;
mod pvlive;
mod types;
mod utils;

pub use api::backoff::{BackoffPolicy, ExponentialBackoff, NoBackoff};
pub use error::{ErrorKind, PvLiveError};
pub use pvlive::{ClientConfig, PvLive};
pub use types::generation::{GenerationRow, GenerationSeries, BASELINE_COLUMNS};
pub use types::pes_id::PesId;
pub use utils::nearest_half_hour;
