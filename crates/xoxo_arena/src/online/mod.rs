//! Online play against another client through the shared document store.

mod coordinator;
mod lobby;
mod view;

pub use coordinator::{OnlineCoordinator, OnlineError};
pub use lobby::LobbyQuery;
pub use view::OnlineView;
