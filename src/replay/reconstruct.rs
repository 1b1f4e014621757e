//! 棋譜から盤面の列を再構築するモジュール
//! 初期盤面から順に手を適用し、各手の直後の盤面スナップショットを返す。
//! セッションやAIの状態には一切依存しない純粋関数。

use serde::{Deserialize, Serialize};

use crate::game::{Board, Player, Position, ReversiRules};

/// 棋譜の1エントリ（盤面状態は含まない）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayMove {
    pub position: Position,
    pub player: Player,
}

impl ReplayMove {
    pub fn new(position: Position, player: Player) -> Self {
        Self { position, player }
    }
}

/// 再構築の結果
/// `snapshots` は初期盤面 + 各手の後の盤面で、長さは常に手数 + 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconstruction {
    pub snapshots: Vec<Board>,
    /// 非合法で適用されなかった手のインデックス（0始まり）
    pub invalid_steps: Vec<usize>,
}

impl Reconstruction {
    pub fn move_count(&self) -> usize {
        self.snapshots.len().saturating_sub(1)
    }

    pub fn is_valid_step(&self, index: usize) -> bool {
        index < self.move_count() && !self.invalid_steps.contains(&index)
    }

    pub fn is_fully_valid(&self) -> bool {
        self.invalid_steps.is_empty()
    }

    /// 最後のスナップショット。`reconstruct` の結果は初期盤面を必ず含む
    pub fn final_board(&self) -> Option<&Board> {
        self.snapshots.last()
    }
}

/// 棋譜を初期盤面から再生する
/// 非合法な手はその時点の盤面を複製して無効としてマークし、再生は中断しない
pub fn reconstruct(moves: &[ReplayMove]) -> Reconstruction {
    let mut board = Board::new();
    let mut snapshots = Vec::with_capacity(moves.len() + 1);
    let mut invalid_steps = Vec::new();
    snapshots.push(board);

    for (index, entry) in moves.iter().enumerate() {
        if ReversiRules::is_legal(&board, entry.position, entry.player) {
            let applied = ReversiRules::apply(&mut board, entry.position, entry.player);
            debug_assert!(applied.is_ok(), "legal replay move failed to apply: {:?}", applied);
        } else {
            tracing::warn!(
                step = index,
                position = %entry.position,
                player = %entry.player,
                "replay contains an illegal move; board frozen for this step"
            );
            invalid_steps.push(index);
        }
        snapshots.push(board);
    }

    Reconstruction { snapshots, invalid_steps }
}

/// スナップショットの列のみを返す簡易版
pub fn reconstruct_game_from_moves(moves: &[ReplayMove]) -> Vec<Board> {
    reconstruct(moves).snapshots
}
