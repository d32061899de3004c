pub mod bbox;
pub mod classify;
pub mod config;
pub mod detection;
pub mod error;
pub mod formation;
pub mod frame;
pub mod math;
pub mod play;
pub mod reconcile;
pub mod scan;
pub mod segmenter;
pub mod session;
pub mod team;
pub mod window;

mod track;

pub use config::Config;
pub use detection::{Detection, ObjectClass};
pub use error::Error;
pub use frame::FrameRecord;
pub use play::{KeyEvent, PlaySegment, PlayType};
pub use scan::{CancellationToken, PlayScanner};
pub use session::{Analysis, AnalysisSession};
pub use team::{TeamColor, TeamColorCache};
pub use track::{Track, TrackedObject};
