//! AI戦略の実装モジュール
//! 難易度ごとの着手選択（ランダム、最多反転、角優先）を
//! 統一されたインターフェースで提供する。先読み探索は行わない。

use std::str::FromStr;

use rand::seq::IndexedRandom;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::game::{Board, Player, Position, ReversiRules};

/// AIの難易度を表すenum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// 合法手から一様ランダムに選ぶ
    #[default]
    Easy,
    /// 最も多く裏返せる手を選ぶ
    Medium,
    /// 角が取れれば角、そうでなければMediumと同じ
    Hard,
    /// 現状Hardと同じ戦略
    Expert,
}

impl Difficulty {
    pub fn all() -> Vec<Difficulty> {
        vec![Difficulty::Easy, Difficulty::Medium, Difficulty::Hard, Difficulty::Expert]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Expert => "Expert",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Difficulty::Easy => "初級 - ランダムな手を選択",
            Difficulty::Medium => "中級 - 最も多く石を返す手を選択",
            Difficulty::Hard => "上級 - 角を優先し、なければ最多反転",
            Difficulty::Expert => "最上級 - 上級と同じ戦略",
        }
    }

    /// この難易度に対応する着手選択器を返す
    pub fn selector(&self) -> Box<dyn MoveSelector> {
        create_selector(*self)
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            "expert" => Ok(Difficulty::Expert),
            _ => Err(format!("Invalid difficulty: {}. Valid options: easy, medium, hard, expert", s)),
        }
    }
}

/// 着手選択の共通インターフェース
/// 合法手・盤面・手番（と乱数源）だけから決まる純粋な選択で、
/// セッションの待ち時間処理とは独立してテストできる
pub trait MoveSelector: Send + Sync {
    /// `legal_moves` の中から1手を選ぶ。空ならNone（呼び出し側はパスする）
    fn select_move(
        &self,
        legal_moves: &[Position],
        board: &Board,
        player: Player,
        rng: &mut dyn RngCore,
    ) -> Option<Position>;

    fn get_name(&self) -> &'static str;
}

#[derive(Debug, Clone, Default)]
pub struct RandomSelector;

impl MoveSelector for RandomSelector {
    fn select_move(
        &self,
        legal_moves: &[Position],
        _board: &Board,
        _player: Player,
        rng: &mut dyn RngCore,
    ) -> Option<Position> {
        legal_moves.choose(rng).copied()
    }

    fn get_name(&self) -> &'static str {
        "RandomSelector"
    }
}

/// 試しに置いてみて反転数が最大の手を選ぶ
/// 同数の場合は `legal_moves` で先に現れた手
#[derive(Debug, Clone, Default)]
pub struct GreedySelector;

impl GreedySelector {
    fn most_flips(legal_moves: &[Position], board: &Board, player: Player) -> Option<Position> {
        let mut best: Option<(Position, usize)> = None;

        for &position in legal_moves {
            let count = ReversiRules::flips(board, position, player).len();
            if best.map_or(true, |(_, best_count)| count > best_count) {
                best = Some((position, count));
            }
        }

        best.map(|(position, _)| position)
    }
}

impl MoveSelector for GreedySelector {
    fn select_move(
        &self,
        legal_moves: &[Position],
        board: &Board,
        player: Player,
        _rng: &mut dyn RngCore,
    ) -> Option<Position> {
        Self::most_flips(legal_moves, board, player)
    }

    fn get_name(&self) -> &'static str {
        "GreedySelector"
    }
}

/// 角が取れるなら最初に見つかった角、なければ最多反転
#[derive(Debug, Clone, Default)]
pub struct CornerSelector;

impl MoveSelector for CornerSelector {
    fn select_move(
        &self,
        legal_moves: &[Position],
        board: &Board,
        player: Player,
        _rng: &mut dyn RngCore,
    ) -> Option<Position> {
        legal_moves
            .iter()
            .copied()
            .find(Position::is_corner)
            .or_else(|| GreedySelector::most_flips(legal_moves, board, player))
    }

    fn get_name(&self) -> &'static str {
        "CornerSelector"
    }
}

/// 難易度に応じた選択器を生成するファクトリ関数
pub fn create_selector(difficulty: Difficulty) -> Box<dyn MoveSelector> {
    match difficulty {
        Difficulty::Easy => Box::new(RandomSelector),
        Difficulty::Medium => Box::new(GreedySelector),
        Difficulty::Hard | Difficulty::Expert => Box::new(CornerSelector),
    }
}
