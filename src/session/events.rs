//! セッションイベント
//! 効果音・触覚フィードバック・演出などの購読者へ通知するだけで、
//! 購読者側から合法手判定やスコアに影響を与えることはできない。

use serde::Serialize;

use crate::game::{Move, Player, Score, Winner};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    GameStarted,
    MoveMade { mv: Move },
    /// 手番のプレイヤーに合法手がなく、相手に手番が戻った
    TurnPassed { player: Player },
    MoveUndone { mv: Move },
    AiThinkingStarted,
    AiThinkingStopped,
    Paused,
    Resumed,
    /// 手動終了の場合、盤面が終局していなければ winner はNone
    GameFinished { score: Score, winner: Option<Winner> },
    GameReset,
}
