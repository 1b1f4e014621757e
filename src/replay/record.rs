//! 永続化・リプレイ保存用の手レコード
//! 外部ストレージとは `{x, y, player: "black"|"white", timestamp, flippedDiscs}` 形式でやり取りする。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::reconstruct::ReplayMove;
use crate::error::RecordError;
use crate::game::{Move, Player, Position};

/// レコード上の座標（x = row, y = col）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPosition {
    pub x: usize,
    pub y: usize,
}

impl From<Position> for RecordPosition {
    fn from(position: Position) -> Self {
        Self { x: position.row, y: position.col }
    }
}

impl TryFrom<RecordPosition> for Position {
    type Error = RecordError;

    fn try_from(value: RecordPosition) -> Result<Self, Self::Error> {
        Position::new(value.x, value.y).ok_or(RecordError::OutOfBounds { x: value.x, y: value.y })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    pub x: usize,
    pub y: usize,
    pub player: Player,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub flipped_discs: Vec<RecordPosition>,
}

impl From<&Move> for MoveRecord {
    fn from(game_move: &Move) -> Self {
        Self {
            x: game_move.position.row,
            y: game_move.position.col,
            player: game_move.player,
            timestamp: game_move.timestamp,
            flipped_discs: game_move.flipped.iter().copied().map(RecordPosition::from).collect(),
        }
    }
}

impl TryFrom<&MoveRecord> for ReplayMove {
    type Error = RecordError;

    fn try_from(record: &MoveRecord) -> Result<Self, Self::Error> {
        let position = Position::try_from(RecordPosition { x: record.x, y: record.y })?;
        Ok(ReplayMove::new(position, record.player))
    }
}

/// レコード列を再生用の手列に変換する
/// 座標が盤外のレコードが1つでもあればエラー
pub fn records_to_replay(records: &[MoveRecord]) -> Result<Vec<ReplayMove>, RecordError> {
    records.iter().map(ReplayMove::try_from).collect()
}
