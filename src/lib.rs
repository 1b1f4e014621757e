//! リバーシ対局エンジン
//! ルールエンジン、AI着手選択、対局セッション、棋譜再生とHTTP APIを提供する。

pub mod ai;
pub mod api;
pub mod config;
pub mod error;
pub mod game;
pub mod replay;
pub mod session;
pub mod telemetry;

pub use config::{Config, ConfigError};
pub use error::{ActionRejected, GameError, RecordError, Result};
