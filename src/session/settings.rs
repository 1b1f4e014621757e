//! ゲーム設定（対戦モード、AI難易度、持ち時間、AI思考演出時間）

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ai::Difficulty;
use crate::game::Player;

/// Durationをミリ秒の整数としてシリアライズするためのモジュール
pub(crate) mod duration_ms {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// 対戦モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// 人間 vs AI
    #[default]
    Ai,
    /// 同じ端末で人間同士
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    pub mode: GameMode,
    pub difficulty: Difficulty,
    /// クライアント向けの持ち時間（秒）。コアでは強制しない
    pub time_limit_secs: Option<u64>,
    /// AIの「考えている」演出時間
    #[serde(with = "duration_ms", rename = "ai_move_delay_ms")]
    pub ai_move_delay: Duration,
    /// AIモードで人間が持つ色
    pub human: Player,
}

impl GameSettings {
    /// AIモードでAIが受け持つ色
    pub fn ai_player(&self) -> Option<Player> {
        match self.mode {
            GameMode::Ai => Some(self.human.opposite()),
            GameMode::Local => None,
        }
    }

    pub fn is_ai_turn(&self, current: Player) -> bool {
        self.ai_player() == Some(current)
    }

    /// 指定された項目だけを上書きする
    pub fn apply(&mut self, update: &SettingsUpdate) {
        if let Some(mode) = update.mode {
            self.mode = mode;
        }
        if let Some(difficulty) = update.difficulty {
            self.difficulty = difficulty;
        }
        if let Some(time_limit) = update.time_limit_secs {
            self.time_limit_secs = time_limit;
        }
        if let Some(delay_ms) = update.ai_move_delay_ms {
            self.ai_move_delay = Duration::from_millis(delay_ms);
        }
        if let Some(human) = update.human {
            self.human = human;
        }
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            mode: GameMode::Ai,
            difficulty: Difficulty::Easy,
            time_limit_secs: None,
            ai_move_delay: Duration::from_millis(800),
            human: Player::Black,
        }
    }
}

/// 設定の部分更新
/// `time_limit_secs` は `Some(None)` で持ち時間なしに戻す
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub mode: Option<GameMode>,
    pub difficulty: Option<Difficulty>,
    #[serde(default, with = "double_option")]
    pub time_limit_secs: Option<Option<u64>>,
    pub ai_move_delay_ms: Option<u64>,
    pub human: Option<Player>,
}

/// 未指定（None）とnull指定（Some(None)）を区別する
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(value: &Option<Option<u64>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<u64>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<u64>::deserialize(deserializer).map(Some)
    }
}
