pub mod command;
pub mod controller;
pub mod error;
pub mod recall;

pub use command::{Command, Outcome};
pub use controller::{Loaded, PersistWarning, SessionController, Step};
pub use error::SessionError;
pub use recall::{RecallStage, RecallState, Verdict};
