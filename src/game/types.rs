//! ゲームの基本型定義モジュール
//! リバーシエンジンとセッションで共有する型（セル、プレイヤー、座標、手、スコア）を定義する。

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// 盤面の一辺のマス数
pub const BOARD_SIZE: usize = 8;

/// 盤面の各マスの状態を表現するenum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cell {
    Empty,
    Black,
    White,
}

impl Cell {
    /// セルに置かれている石の持ち主を返す
    pub fn owner(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Black => Some(Player::Black),
            Cell::White => Some(Player::White),
        }
    }
}

/// ゲームのプレイヤーを表すenum
/// 新規ゲームでは常に黒が先手。
/// 永続化レコードとの互換のため "black" / "white" でシリアライズする
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    Black,
    White,
}

impl Player {
    /// 相手プレイヤーを返す
    pub fn opposite(self) -> Player {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }

    /// プレイヤーを対応するセル状態に変換する
    pub fn to_cell(self) -> Cell {
        match self {
            Player::Black => Cell::Black,
            Player::White => Cell::White,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Player::Black => "black",
            Player::White => "white",
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Player {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "black" => Ok(Player::Black),
            "white" => Ok(Player::White),
            _ => Err(RecordError::UnknownPlayer { value: s.to_string() }),
        }
    }
}

/// 8x8盤面上の座標
/// row, colともに0-7の範囲で有効。外部仕様の (x, y) は (row, col) に対応する
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    /// 4つの角
    pub const CORNERS: [Position; 4] = [
        Position { row: 0, col: 0 },
        Position { row: 0, col: 7 },
        Position { row: 7, col: 0 },
        Position { row: 7, col: 7 },
    ];

    /// 範囲チェック付きのコンストラクタ
    /// 8x8盤面の範囲外の座標の場合はNoneを返す
    pub fn new(row: usize, col: usize) -> Option<Position> {
        if row < BOARD_SIZE && col < BOARD_SIZE {
            Some(Position { row, col })
        } else {
            None
        }
    }

    /// 座標が有効範囲内かチェックする
    pub fn is_valid(&self) -> bool {
        self.row < BOARD_SIZE && self.col < BOARD_SIZE
    }

    pub fn is_corner(&self) -> bool {
        Self::CORNERS.contains(self)
    }

    /// 指定方向に1マス進めた座標を返す。盤外に出る場合はNone
    pub fn offset(&self, dr: i8, dc: i8) -> Option<Position> {
        let row = self.row as i8 + dr;
        let col = self.col as i8 + dc;
        if (0..BOARD_SIZE as i8).contains(&row) && (0..BOARD_SIZE as i8).contains(&col) {
            Some(Position { row: row as usize, col: col as usize })
        } else {
            None
        }
    }
}

/// "d3" 形式の棋譜表記（列a-h、行1-8）
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = (b'a' + self.col as u8) as char;
        write!(f, "{}{}", file, self.row + 1)
    }
}

impl FromStr for Position {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RecordError::InvalidNotation { value: s.to_string() };
        let mut chars = s.trim().chars();
        let file = chars.next().ok_or_else(invalid)?.to_ascii_lowercase();
        let rank = chars.next().ok_or_else(invalid)?;
        if chars.next().is_some() || !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return Err(invalid());
        }
        Ok(Position {
            row: rank as usize - '1' as usize,
            col: file as usize - 'a' as usize,
        })
    }
}

/// ゲームの1手を表現する構造体
/// flippedはこの手で裏返った相手の石の正確な集合で、
/// 着手直前の盤面・位置・プレイヤーだけから再現できる
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub position: Position,
    pub player: Player,
    pub flipped: Vec<Position>,
    pub move_number: u32,
    pub timestamp: DateTime<Utc>,
}

impl Move {
    /// 新しい手を作成する
    /// タイムスタンプは現在時刻で自動設定される
    pub fn new(position: Position, player: Player, flipped: Vec<Position>, move_number: u32) -> Self {
        Self {
            position,
            player,
            flipped,
            move_number,
            timestamp: Utc::now(),
        }
    }
}

/// 黒と白の石数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub black: u8,
    pub white: u8,
}

impl Score {
    pub fn total(&self) -> u8 {
        self.black + self.white
    }

    /// 石数を比較して勝者を決める
    pub fn leader(&self) -> Winner {
        use std::cmp::Ordering;
        match self.black.cmp(&self.white) {
            Ordering::Greater => Winner::Black,
            Ordering::Less => Winner::White,
            Ordering::Equal => Winner::Tie,
        }
    }
}

/// 終局時の勝敗
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Black,
    White,
    Tie,
}
