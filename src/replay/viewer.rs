//! 再構築済みの盤面列を読み取り専用でたどるビューア

use super::reconstruct::{reconstruct, Reconstruction, ReplayMove};
use crate::game::{Board, Score};

/// カーソル位置 0 は初期盤面、n はn手目の直後の盤面
#[derive(Debug, Clone)]
pub struct ReplayViewer {
    reconstruction: Reconstruction,
    cursor: usize,
}

impl ReplayViewer {
    /// スナップショットが空なら初期盤面を補う
    pub fn new(mut reconstruction: Reconstruction) -> Self {
        if reconstruction.snapshots.is_empty() {
            reconstruction.snapshots.push(Board::new());
        }
        Self { reconstruction, cursor: 0 }
    }

    pub fn from_moves(moves: &[ReplayMove]) -> Self {
        Self::new(reconstruct(moves))
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.reconstruction.snapshots.len()
    }

    /// 初期盤面を必ず含むので常にfalse
    pub fn is_empty(&self) -> bool {
        self.reconstruction.snapshots.is_empty()
    }

    pub fn current(&self) -> &Board {
        &self.reconstruction.snapshots[self.cursor]
    }

    /// 1手進める。末尾なら進まずにNone
    pub fn step_forward(&mut self) -> Option<&Board> {
        if self.cursor + 1 >= self.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    pub fn step_back(&mut self) -> Option<&Board> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    /// 範囲外の位置は末尾に丸める
    pub fn seek(&mut self, index: usize) -> &Board {
        self.cursor = index.min(self.len() - 1);
        self.current()
    }

    /// 現在表示中の盤面を作った手が有効だったか（初期盤面はtrue）
    pub fn is_current_step_valid(&self) -> bool {
        self.cursor == 0 || self.reconstruction.is_valid_step(self.cursor - 1)
    }

    pub fn score_at(&self, index: usize) -> Option<Score> {
        self.reconstruction.snapshots.get(index).map(Board::count_pieces)
    }

    pub fn reconstruction(&self) -> &Reconstruction {
        &self.reconstruction
    }
}
