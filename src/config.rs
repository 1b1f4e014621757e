//! アプリケーション設定管理モジュール
//! サーバー、セッション管理、対局の既定値、ログ出力の設定を
//! 設定ファイルと環境変数から読み込んで管理する。

use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, time::Duration};

use crate::ai::Difficulty;
use crate::session::settings::duration_ms;
use crate::session::GameSettings;

/// 設定ファイルの探索順
pub const CONFIG_SEARCH_PATHS: [&str; 3] = ["config.json", "config/app.json", "/etc/reversi/config.json"];

/// サーバーの設定を管理する構造体
/// ポート番号、ホスト名、CORS設定などを含む
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub enable_cors: bool,
    pub enable_logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
            enable_cors: true,
            enable_logging: true,
        }
    }
}

/// セッション管理の設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub max_sessions: usize,
    pub session_timeout_minutes: i64,
    /// 非アクティブセッションを掃除する間隔（秒）
    pub cleanup_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: 100,
            session_timeout_minutes: 30,
            cleanup_interval_secs: 60,
        }
    }
}

/// 新規対局の既定値
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameDefaults {
    pub default_difficulty: Difficulty,
    #[serde(with = "duration_ms", rename = "ai_move_delay_ms")]
    pub ai_move_delay: Duration,
}

impl Default for GameDefaults {
    fn default() -> Self {
        Self {
            default_difficulty: Difficulty::Easy,
            ai_move_delay: Duration::from_millis(800),
        }
    }
}

/// ログ出力の設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `RUST_LOG` が未設定の場合に使うフィルタ
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "reversi_engine=info".to_string(),
            json: false,
        }
    }
}

/// アプリケーション全体の設定
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub sessions: SessionConfig,
    pub game: GameDefaults,
    pub logging: LoggingConfig,
}

/// 設定関連のエラーを表すenum
/// ファイル読み込み、パース、検証エラーなどを含む
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("設定ファイル読み込みエラー: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("設定ファイル解析エラー: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("環境変数エラー: {name} = {value}")]
    EnvVarError { name: String, value: String },

    #[error("設定値が無効です: {field} = {value}")]
    InvalidValue { field: String, value: String },
}

fn parse_var<T: std::str::FromStr>(name: &str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::EnvVarError {
        name: name.to_string(),
        value,
    })
}

impl Config {
    /// 指定したファイルパスから設定を読み込む
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 環境変数から設定を読み込む
    /// デフォルト値をベースに環境変数で上書きする
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_overrides(|name| env::var(name).ok())?;
        Ok(config)
    }

    /// `lookup` が返す値で設定を上書きする
    /// 値が存在しない項目は変更しない
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("SERVER_PORT") {
            self.server.port = parse_var("SERVER_PORT", port)?;
        }

        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }

        if let Some(max_sessions) = lookup("MAX_SESSIONS") {
            self.sessions.max_sessions = parse_var("MAX_SESSIONS", max_sessions)?;
        }

        if let Some(timeout) = lookup("SESSION_TIMEOUT_MINUTES") {
            self.sessions.session_timeout_minutes = parse_var("SESSION_TIMEOUT_MINUTES", timeout)?;
        }

        if let Some(difficulty) = lookup("DEFAULT_DIFFICULTY") {
            self.game.default_difficulty = parse_var("DEFAULT_DIFFICULTY", difficulty)?;
        }

        if let Some(delay) = lookup("AI_MOVE_DELAY_MS") {
            self.game.ai_move_delay = Duration::from_millis(parse_var("AI_MOVE_DELAY_MS", delay)?);
        }

        if let Some(filter) = lookup("LOG_FILTER") {
            self.logging.filter = filter;
        }

        if let Some(json) = lookup("LOG_JSON") {
            self.logging.json = parse_var("LOG_JSON", json)?;
        }

        Ok(())
    }

    /// 設定ファイルと環境変数を結合して設定を読み込む
    /// 設定ファイルがなくてもデフォルト値で動作する
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = CONFIG_SEARCH_PATHS
            .iter()
            .find_map(|path| Self::from_file(path).ok())
            .unwrap_or_default();

        config.apply_overrides(|name| env::var(name).ok())?;
        Ok(config)
    }

    /// 現在の設定を指定したファイルに保存する
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// 設定値の妥当性をチェックする
    /// 不正な値がある場合はConfigErrorを返す
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                value: self.server.port.to_string(),
            });
        }

        if self.sessions.max_sessions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sessions.max_sessions".to_string(),
                value: self.sessions.max_sessions.to_string(),
            });
        }

        if self.sessions.session_timeout_minutes <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "sessions.session_timeout_minutes".to_string(),
                value: self.sessions.session_timeout_minutes.to_string(),
            });
        }

        if self.sessions.cleanup_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sessions.cleanup_interval_secs".to_string(),
                value: self.sessions.cleanup_interval_secs.to_string(),
            });
        }

        Ok(())
    }

    /// 新規対局の設定（未指定項目は既定値）
    pub fn default_game_settings(&self) -> GameSettings {
        GameSettings {
            difficulty: self.game.default_difficulty,
            ai_move_delay: self.game.ai_move_delay,
            ..GameSettings::default()
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup_from(&[
                ("SERVER_PORT", "8080"),
                ("MAX_SESSIONS", "5"),
                ("DEFAULT_DIFFICULTY", "hard"),
                ("AI_MOVE_DELAY_MS", "0"),
                ("LOG_JSON", "true"),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.sessions.max_sessions, 5);
        assert_eq!(config.game.default_difficulty, Difficulty::Hard);
        assert_eq!(config.game.ai_move_delay, Duration::ZERO);
        assert!(config.logging.json);
    }

    #[test]
    fn test_invalid_override() {
        let mut config = Config::default();
        let result = config.apply_overrides(lookup_from(&[("SERVER_PORT", "not_a_port")]));

        match result {
            Err(ConfigError::EnvVarError { name, value }) => {
                assert_eq!(name, "SERVER_PORT");
                assert_eq!(value, "not_a_port");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_validation_rejects_zero_values() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sessions.max_sessions = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sessions.session_timeout_minutes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_game_settings() {
        let mut config = Config::default();
        config.game.default_difficulty = Difficulty::Medium;

        let settings = config.default_game_settings();
        assert_eq!(settings.difficulty, Difficulty::Medium);
        assert_eq!(settings.ai_move_delay, Duration::from_millis(800));
    }
}
