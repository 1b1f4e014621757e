pub mod events;
pub mod game_session;
pub mod manager;
pub mod settings;

pub use events::SessionEvent;
pub use game_session::*;
pub use manager::{GameSessionManager, ManagedSession, ManagerError, ManagerResult, SessionStats};
pub use settings::{GameMode, GameSettings, SettingsUpdate};
