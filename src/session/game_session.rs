//! ゲームセッション状態管理モジュール
//! 盤面、手番、合法手キャッシュ、パス判定、履歴、終局判定、スコアを1つのオブジェクトで所有する。
//! 状態の変更はすべてこのオブジェクトのメソッド経由で行い、
//! 拒否された操作は `Err(ActionRejected)` を返して状態を変更しない。

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::events::SessionEvent;
use super::settings::{GameSettings, SettingsUpdate};
use crate::error::ActionRejected;
use crate::game::{Board, Move, Player, Position, ReversiRules, Score, Winner};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// セッションの進行状態
/// Waiting → Playing → {Paused ⇄ Playing} → Finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Waiting,
    Playing,
    Paused,
    Finished,
}

/// 取り消し用の履歴エントリ
/// 着手直前の盤面を値として保持するので、以後の盤面変更の影響を受けない
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub prior_board: Board,
    pub player: Player,
    pub mv: Move,
}

/// 着手が受理された結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveOutcome {
    pub mv: Move,
    /// 着手後に手番を持つプレイヤー
    pub next_player: Player,
    /// 合法手がなく自動的にパスしたプレイヤー
    pub auto_passed: Option<Player>,
    pub finished: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AiMoveOutcome {
    Moved(MoveOutcome),
    Passed,
    /// 思考待ちの間にキャンセルされ、盤面には触れていない
    Cancelled,
}

#[derive(Debug)]
pub struct GameSession {
    board: Board,
    current_player: Player,
    legal_moves: Vec<Position>,
    must_pass: bool,
    history: Vec<HistoryEntry>,
    score: Score,
    status: SessionStatus,
    settings: GameSettings,
    ai_thinking: bool,
    events: broadcast::Sender<SessionEvent>,
}

impl GameSession {
    /// 開始前（Waiting）のセッションを作成する
    pub fn new(settings: GameSettings) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let board = Board::new();
        let mut session = Self {
            board,
            current_player: Player::Black,
            legal_moves: Vec::new(),
            must_pass: false,
            history: Vec::new(),
            score: board.count_pieces(),
            status: SessionStatus::Waiting,
            settings,
            ai_thinking: false,
            events,
        };
        session.refresh_legal_moves();
        session
    }

    /// 任意の局面から対局中のセッションを作る
    /// どちらも打てない局面なら即座に終局する
    pub fn from_position(board: Board, player: Player, settings: GameSettings) -> Self {
        let mut session = Self::new(settings);
        session.board = board;
        session.current_player = player;
        session.score = board.count_pieces();
        session.status = SessionStatus::Playing;
        session.refresh_legal_moves();
        if ReversiRules::is_game_over(&session.board) {
            session.finish();
        }
        session
    }

    /// 初期配置に戻して対局を開始する（黒番）
    pub fn initialize_game(&mut self) {
        self.board = Board::new();
        self.current_player = Player::Black;
        self.history.clear();
        self.score = self.board.count_pieces();
        self.set_ai_thinking(false);
        self.status = SessionStatus::Playing;
        self.refresh_legal_moves();

        info!(mode = ?self.settings.mode, difficulty = ?self.settings.difficulty, "game initialized");
        self.emit(SessionEvent::GameStarted);
    }

    /// 開始前の状態に戻す。設定は保持する
    pub fn reset_game(&mut self) {
        if self.ai_thinking {
            self.set_ai_thinking(false);
        }
        self.board = Board::new();
        self.current_player = Player::Black;
        self.history.clear();
        self.score = self.board.count_pieces();
        self.status = SessionStatus::Waiting;
        self.refresh_legal_moves();

        info!("game reset");
        self.emit(SessionEvent::GameReset);
    }

    pub fn make_move(&mut self, row: usize, col: usize) -> Result<MoveOutcome, ActionRejected> {
        self.make_move_at(Position { row, col })
    }

    /// 現在の手番のプレイヤーとして着手する
    pub fn make_move_at(&mut self, position: Position) -> Result<MoveOutcome, ActionRejected> {
        self.ensure_playing()?;
        if self.ai_thinking {
            return Err(ActionRejected::AiThinking);
        }

        let mover = self.current_player;
        if !self.legal_moves.contains(&position) {
            return Err(ActionRejected::IllegalMove { position, player: mover });
        }

        let prior_board = self.board;
        let flipped = ReversiRules::apply(&mut self.board, position, mover)
            .map_err(|_| ActionRejected::IllegalMove { position, player: mover })?;

        let mv = Move::new(position, mover, flipped, self.history.len() as u32 + 1);
        self.history.push(HistoryEntry { prior_board, player: mover, mv: mv.clone() });
        self.score = self.board.count_pieces();

        debug!(player = %mover, position = %position, flipped = mv.flipped.len(), "move applied");
        self.emit(SessionEvent::MoveMade { mv: mv.clone() });

        self.current_player = mover.opposite();
        self.refresh_legal_moves();

        let mut auto_passed = None;
        if ReversiRules::is_game_over(&self.board) {
            self.finish();
        } else if self.legal_moves.is_empty() {
            // 相手は打てないが自分は打てる：自動パスで手番を戻す
            let passed = self.current_player;
            self.current_player = mover;
            self.refresh_legal_moves();
            auto_passed = Some(passed);

            debug!(player = %passed, "auto pass");
            self.emit(SessionEvent::TurnPassed { player: passed });
        }

        Ok(MoveOutcome {
            mv,
            next_player: self.current_player,
            auto_passed,
            finished: self.status == SessionStatus::Finished,
        })
    }

    /// 合法手がないときに手番を相手へ渡す
    /// 相手も打てなければ終局する。戻り値は新しい手番のプレイヤー
    pub fn pass_move(&mut self) -> Result<Player, ActionRejected> {
        self.ensure_playing()?;
        if !self.must_pass {
            return Err(ActionRejected::PassNotAllowed);
        }

        let passed = self.current_player;
        self.current_player = passed.opposite();
        self.refresh_legal_moves();
        self.emit(SessionEvent::TurnPassed { player: passed });

        if self.legal_moves.is_empty() {
            self.finish();
        }

        Ok(self.current_player)
    }

    /// 直前の1手を取り消す
    /// 盤面と手番を着手前に戻し、合法手はその状態から再計算する
    pub fn undo_move(&mut self) -> Result<Move, ActionRejected> {
        self.ensure_playing()?;
        if self.ai_thinking {
            return Err(ActionRejected::AiThinking);
        }

        let entry = self.history.pop().ok_or(ActionRejected::NothingToUndo)?;
        self.board = entry.prior_board;
        self.current_player = entry.player;
        self.score = self.board.count_pieces();
        self.refresh_legal_moves();

        debug!(player = %entry.player, position = %entry.mv.position, "move undone");
        self.emit(SessionEvent::MoveUndone { mv: entry.mv.clone() });
        Ok(entry.mv)
    }

    pub fn pause_game(&mut self) -> Result<(), ActionRejected> {
        self.ensure_playing()?;
        self.status = SessionStatus::Paused;
        self.emit(SessionEvent::Paused);
        Ok(())
    }

    pub fn resume_game(&mut self) -> Result<(), ActionRejected> {
        match self.status {
            SessionStatus::Paused => {
                self.status = SessionStatus::Playing;
                self.emit(SessionEvent::Resumed);
                Ok(())
            }
            SessionStatus::Finished => Err(ActionRejected::Finished),
            _ => Err(ActionRejected::NotPlaying),
        }
    }

    /// 対局を終了させ、以降の変更を受け付けなくする
    pub fn finish_game(&mut self) -> Result<(), ActionRejected> {
        match self.status {
            SessionStatus::Playing | SessionStatus::Paused => {
                if self.ai_thinking {
                    self.set_ai_thinking(false);
                }
                self.finish();
                Ok(())
            }
            SessionStatus::Finished => Err(ActionRejected::Finished),
            SessionStatus::Waiting => Err(ActionRejected::NotPlaying),
        }
    }

    /// 現在の盤面で任意のプレイヤーの合法手を計算する（キャッシュは変更しない）
    pub fn calculate_valid_moves(&self, player: Player) -> Vec<Position> {
        ReversiRules::legal_moves(&self.board, player)
    }

    pub fn set_ai_thinking(&mut self, thinking: bool) {
        if self.ai_thinking == thinking {
            return;
        }
        self.ai_thinking = thinking;
        self.emit(if thinking {
            SessionEvent::AiThinkingStarted
        } else {
            SessionEvent::AiThinkingStopped
        });
    }

    /// 思考フラグを下ろし、難易度に応じた選択器で現在の手番の手を打つ
    /// 打てる手がなくパスが必要な場合はパスする
    /// 拒否された場合は思考フラグも含めて何も変更しない
    pub fn complete_ai_move(&mut self, rng: &mut dyn RngCore) -> Result<AiMoveOutcome, ActionRejected> {
        self.ensure_playing()?;

        if self.must_pass {
            self.set_ai_thinking(false);
            self.pass_move()?;
            return Ok(AiMoveOutcome::Passed);
        }

        let choice = self
            .settings
            .difficulty
            .selector()
            .select_move(&self.legal_moves, &self.board, self.current_player, rng)
            .ok_or(ActionRejected::NoAiMove)?;

        self.set_ai_thinking(false);
        self.make_move_at(choice).map(AiMoveOutcome::Moved)
    }

    /// AIの手番を実行する
    /// 設定の演出時間だけ待ってから着手する。待機中に `cancel` されたら盤面に触れずに戻る
    pub async fn make_ai_move(&mut self, cancel: &CancellationToken) -> Result<AiMoveOutcome, ActionRejected> {
        self.ensure_playing()?;
        if self.ai_thinking {
            return Err(ActionRejected::AiThinking);
        }

        self.set_ai_thinking(true);
        let delay = self.settings.ai_move_delay;

        tokio::select! {
            _ = cancel.cancelled() => {
                warn!("ai move cancelled while thinking");
                self.set_ai_thinking(false);
                return Ok(AiMoveOutcome::Cancelled);
            }
            _ = tokio::time::sleep(delay) => {}
        }

        let mut rng = rand::rng();
        let result = self.complete_ai_move(&mut rng);
        if result.is_err() {
            self.set_ai_thinking(false);
        }
        result
    }

    /// AIの思考中以外はいつでも設定を変更できる
    pub fn update_game_settings(&mut self, update: &SettingsUpdate) -> Result<(), ActionRejected> {
        if self.ai_thinking {
            return Err(ActionRejected::AiThinking);
        }
        self.settings.apply(update);
        debug!(settings = ?self.settings, "settings updated");
        Ok(())
    }

    /// 盤面が終局している場合のみ勝者を返す
    pub fn winner(&self) -> Option<Winner> {
        ReversiRules::winner(&self.board)
    }

    pub fn is_ai_turn(&self) -> bool {
        self.status == SessionStatus::Playing && self.settings.is_ai_turn(self.current_player)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn legal_moves(&self) -> &[Position] {
        &self.legal_moves
    }

    pub fn must_pass(&self) -> bool {
        self.must_pass
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// 取り消されていない手を古い順に返す
    pub fn moves(&self) -> impl Iterator<Item = &Move> {
        self.history.iter().map(|entry| &entry.mv)
    }

    pub fn move_count(&self) -> usize {
        self.history.len()
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn ai_thinking(&self) -> bool {
        self.ai_thinking
    }

    fn ensure_playing(&self) -> Result<(), ActionRejected> {
        match self.status {
            SessionStatus::Playing => Ok(()),
            SessionStatus::Finished => Err(ActionRejected::Finished),
            SessionStatus::Waiting | SessionStatus::Paused => Err(ActionRejected::NotPlaying),
        }
    }

    /// 盤面変更の直後に必ず呼ぶ
    fn refresh_legal_moves(&mut self) {
        self.legal_moves = ReversiRules::legal_moves(&self.board, self.current_player);
        self.must_pass = self.legal_moves.is_empty()
            && ReversiRules::has_legal_moves(&self.board, self.current_player.opposite());
    }

    fn finish(&mut self) {
        self.status = SessionStatus::Finished;
        let winner = self.winner();
        info!(black = self.score.black, white = self.score.white, ?winner, "game finished");
        self.emit(SessionEvent::GameFinished { score: self.score, winner });
    }

    fn emit(&self, event: SessionEvent) {
        // 購読者がいない場合の送信失敗は無視する
        let _ = self.events.send(event);
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(GameSettings::default())
    }
}
