//! Local play: two people on one board, or one against the computer.

mod driver;
mod settings;
mod state;
mod timer;

pub use driver::{LocalCommand, LocalMatchDriver, LocalMatchHandle, seeded_rng};
pub use settings::{COMPUTER_MARK, HUMAN_MARK, MatchMode, MatchSettings, SeatNames};
pub use state::{Fired, LocalMatch, MatchSnapshot, MoveApplied, NameError, Phase, RoundEnd, Scores};
pub use timer::{PendingTimer, TimerKind};
