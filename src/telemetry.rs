//! ログ出力の初期化

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// `RUST_LOG` があればそれを、なければ設定のフィルタを使ってサブスクライバを登録する
/// 二重登録は無視する
pub fn init_tracing(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if config.json {
        registry
            .with(fmt::layer().with_target(false).with_ansi(false).json())
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(false)).try_init()
    };

    if let Err(err) = result {
        eprintln!("ログ初期化をスキップ: {}", err);
    }
}
