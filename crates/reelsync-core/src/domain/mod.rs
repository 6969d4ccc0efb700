//! Domain model (ids, video records, driver state, outcomes, errors).

pub mod errors;
pub mod ids;
pub mod outcome;
pub mod state;
pub mod video;

pub use self::errors::{ConfigError, PersistenceError, UploadError};
pub use self::ids::VideoId;
pub use self::outcome::{OutcomeKind, RecordOutcome};
pub use self::state::DriverState;
pub use self::video::{HostedLink, VideoRecord, VideoUpload};
