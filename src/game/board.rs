//! リバーシゲームの盤面状態を管理するモジュール
//! 8x8グリッドと座標系のみを扱い、ルールは持たない。
//! 盤面は `Copy` で、履歴やリプレイに保存するときは必ず値としてコピーされる。

use super::types::{Cell, Player, Position, Score, BOARD_SIZE};
use crate::error::{GameError, Result};
use serde::{Deserialize, Serialize};

/// 8x8リバーシ盤面を表現する構造体
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// 標準初期配置の盤面を作成する
    /// 黒は (3,4) と (4,3)、白は (3,3) と (4,4)
    pub fn new() -> Self {
        let mut board = Self::empty();

        board.cells[3][3] = Cell::White;
        board.cells[3][4] = Cell::Black;
        board.cells[4][3] = Cell::Black;
        board.cells[4][4] = Cell::White;

        board
    }

    /// 石が1つもない盤面
    pub fn empty() -> Self {
        Board {
            cells: [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// 文字列の行から盤面を組み立てる
    /// `B` / `X` が黒、`W` / `O` が白、`.` / `-` が空。空白は無視する
    pub fn from_rows(rows: &[&str]) -> Result<Self> {
        if rows.len() != BOARD_SIZE {
            return Err(GameError::InvalidLayout {
                reason: format!("expected {} rows, got {}", BOARD_SIZE, rows.len()),
            });
        }

        let mut board = Self::empty();
        for (row, line) in rows.iter().enumerate() {
            let symbols: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            if symbols.len() != BOARD_SIZE {
                return Err(GameError::InvalidLayout {
                    reason: format!("row {} has {} cells", row, symbols.len()),
                });
            }
            for (col, symbol) in symbols.into_iter().enumerate() {
                board.cells[row][col] = match symbol {
                    'B' | 'X' => Cell::Black,
                    'W' | 'O' => Cell::White,
                    '.' | '-' => Cell::Empty,
                    other => {
                        return Err(GameError::InvalidLayout {
                            reason: format!("unknown symbol '{}' at row {}", other, row),
                        })
                    }
                };
            }
        }

        Ok(board)
    }

    /// 指定した位置のセル状態を取得する
    /// 範囲外の場合はNoneを返す
    pub fn get_cell(&self, position: Position) -> Option<Cell> {
        if position.is_valid() {
            Some(self.cells[position.row][position.col])
        } else {
            None
        }
    }

    /// 指定した位置が盤内かつ空かチェックする
    pub fn is_empty(&self, position: Position) -> bool {
        matches!(self.get_cell(position), Some(Cell::Empty))
    }

    /// 指定プレイヤーの石を置く（既存の石は上書きされる）
    /// 盤面を変更できる唯一の操作で、フリップ処理からのみ呼ばれる
    pub(crate) fn place_disc(&mut self, position: Position, player: Player) {
        debug_assert!(position.is_valid(), "place_disc outside the board: {:?}", position);
        self.cells[position.row][position.col] = player.to_cell();
    }

    /// 行単位の読み取り専用ビュー
    pub fn cells(&self) -> &[[Cell; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }

    /// 盤面上の黒石と白石の数を数える
    pub fn count_pieces(&self) -> Score {
        let mut score = Score::default();

        for row in &self.cells {
            for &cell in row {
                match cell {
                    Cell::Black => score.black += 1,
                    Cell::White => score.white += 1,
                    Cell::Empty => {}
                }
            }
        }

        score
    }

    pub fn count_empty(&self) -> u8 {
        (BOARD_SIZE * BOARD_SIZE) as u8 - self.count_pieces().total()
    }

    /// デバッグ用の盤面表示文字列を生成する
    /// ●で黒、○で白、.で空マスを表現
    pub fn display(&self) -> String {
        let mut result = String::new();
        result.push_str("  a b c d e f g h\n");

        for (row_idx, row) in self.cells.iter().enumerate() {
            result.push_str(&format!("{} ", row_idx + 1));
            for &cell in row {
                let symbol = match cell {
                    Cell::Empty => ".",
                    Cell::Black => "●",
                    Cell::White => "○",
                };
                result.push_str(&format!("{} ", symbol));
            }
            result.push('\n');
        }

        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
