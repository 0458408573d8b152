pub mod analysis;
pub mod column;
pub mod input;
pub mod metrics;
pub mod notify;
pub mod patterns;
pub mod progression;
pub mod session;
pub mod settings;
pub mod signal;
pub mod state;
pub mod types;

pub use analysis::{analyze_full_session, AnalysisResult, Checklist};
pub use column::{classify_column, Column};
pub use input::{extract_spins, parse_bulk, parse_spin, InputError};
pub use notify::Notification;
pub use progression::{BankrollConfig, SetupError, PROGRESSION};
pub use session::{recalculate, recalculate_session, SessionSnapshot};
pub use settings::SessionSettings;
pub use signal::{generate_signal, Signal, SignalLevel};
pub use state::{SessionEvent, SessionHolder, SessionState};
pub use types::{Observation, Spin};
