//! ゲームセッション管理モジュール
//! 複数の対局セッションを保持し、セッション数制限、タイムアウト処理、
//! キャンセル可能なAI着手のスケジューリングを担当する。

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::game_session::{AiMoveOutcome, GameSession, SessionStatus};
use super::settings::{GameSettings, SettingsUpdate};
use crate::ai::Difficulty;
use crate::error::ActionRejected;
use crate::game::{Move, Player};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManagerError {
    #[error("Game session not found: {game_id}")]
    NotFound { game_id: Uuid },

    #[error("Session limit reached (max: {max})")]
    MaxSessionsReached { max: usize },

    #[error(transparent)]
    Rejected(#[from] ActionRejected),
}

pub type ManagerResult<T> = std::result::Result<T, ManagerError>;

/// マネージャーが保持するセッションと付随情報
#[derive(Debug)]
pub struct ManagedSession {
    pub id: Uuid,
    pub session: GameSession,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    /// 実行待ちのAI着手を止めるためのトークン
    pending_ai: Option<CancellationToken>,
}

impl ManagedSession {
    fn new(session: GameSession) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            session,
            created_at: now,
            last_activity: now,
            pending_ai: None,
        }
    }

    pub fn has_pending_ai(&self) -> bool {
        self.pending_ai.is_some()
    }

    fn cancel_pending_ai(&mut self) -> bool {
        match self.pending_ai.take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}

/// セッション管理のメイン構造体
/// DashMapで複数リクエストからの同時アクセスを処理する。
/// 1セッション内の変更は常にエントリのロック下で同期的に行う
#[derive(Debug, Clone)]
pub struct GameSessionManager {
    sessions: Arc<DashMap<Uuid, ManagedSession>>,
    max_sessions: usize,
    session_timeout_minutes: i64,
}

impl GameSessionManager {
    /// デフォルトタイムアウト（30分）でセッションマネージャーを作成
    pub fn new(max_sessions: usize) -> Self {
        Self::with_timeout(max_sessions, 30)
    }

    pub fn with_timeout(max_sessions: usize, timeout_minutes: i64) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            max_sessions,
            session_timeout_minutes: timeout_minutes,
        }
    }

    /// 新しいセッションを作成して対局を開始する
    /// AIが先手の設定なら最初のAI着手も予約する
    pub fn create_session(&self, settings: GameSettings) -> ManagerResult<Uuid> {
        if self.sessions.len() >= self.max_sessions {
            return Err(ManagerError::MaxSessionsReached { max: self.max_sessions });
        }

        let mut session = GameSession::new(settings);
        session.initialize_game();
        let managed = ManagedSession::new(session);
        let id = managed.id;
        self.sessions.insert(id, managed);

        info!(game_id = %id, total = self.sessions.len(), "session created");
        self.schedule_ai_if_due(id)?;
        Ok(id)
    }

    /// セッションを読み取り専用で参照する
    pub fn with_session<R>(&self, id: &Uuid, f: impl FnOnce(&ManagedSession) -> R) -> ManagerResult<R> {
        self.sessions
            .get(id)
            .map(|entry| f(entry.value()))
            .ok_or(ManagerError::NotFound { game_id: *id })
    }

    /// セッションを変更する。成功時は最終操作時刻を更新する
    pub fn with_session_mut<R>(
        &self,
        id: &Uuid,
        f: impl FnOnce(&mut GameSession) -> Result<R, ActionRejected>,
    ) -> ManagerResult<R> {
        let mut entry = self.sessions.get_mut(id).ok_or(ManagerError::NotFound { game_id: *id })?;
        let result = f(&mut entry.session)?;
        entry.last_activity = Utc::now();
        Ok(result)
    }

    /// 人間の着手。AIモードで手番がAIに移ったらAI着手を予約する
    /// AIの手番には打てない
    pub fn make_move(&self, id: &Uuid, row: usize, col: usize) -> ManagerResult<super::MoveOutcome> {
        let outcome = self.with_session_mut(id, |session| {
            ensure_human_turn(session)?;
            session.make_move(row, col)
        })?;
        self.schedule_ai_if_due(*id)?;
        Ok(outcome)
    }

    pub fn pass_move(&self, id: &Uuid) -> ManagerResult<Player> {
        let next = self.with_session_mut(id, |session| {
            ensure_human_turn(session)?;
            session.pass_move()
        })?;
        self.schedule_ai_if_due(*id)?;
        Ok(next)
    }

    /// 直前の手を取り消す。取り消した手を新しい順に返す
    /// AIモードでは人間の手番に戻るまで続けて取り消し、AIが先手で履歴が尽きたらAI着手を予約し直す
    pub fn undo_move(&self, id: &Uuid) -> ManagerResult<Vec<Move>> {
        let undone = self.with_session_mut(id, |session| {
            let mut undone = vec![session.undo_move()?];
            while session.is_ai_turn() && session.move_count() > 0 {
                undone.push(session.undo_move()?);
            }
            Ok(undone)
        })?;
        debug!(game_id = %id, count = undone.len(), "moves undone");
        self.schedule_ai_if_due(*id)?;
        Ok(undone)
    }

    /// 盤面をリセットし、実行待ちのAI着手があればキャンセルする
    pub fn reset_game(&self, id: &Uuid) -> ManagerResult<()> {
        let mut entry = self.sessions.get_mut(id).ok_or(ManagerError::NotFound { game_id: *id })?;
        if entry.cancel_pending_ai() {
            warn!(game_id = %id, "pending ai move cancelled by reset");
        }
        entry.session.reset_game();
        entry.last_activity = Utc::now();
        Ok(())
    }

    /// 一時停止。実行待ちのAI着手は破棄し、再開時に予約し直す
    pub fn pause_game(&self, id: &Uuid) -> ManagerResult<()> {
        let mut entry = self.sessions.get_mut(id).ok_or(ManagerError::NotFound { game_id: *id })?;
        if entry.session.status() != SessionStatus::Playing {
            return Err(ActionRejected::NotPlaying.into());
        }
        if entry.cancel_pending_ai() {
            entry.session.set_ai_thinking(false);
        }
        entry.session.pause_game()?;
        entry.last_activity = Utc::now();
        Ok(())
    }

    pub fn resume_game(&self, id: &Uuid) -> ManagerResult<()> {
        self.with_session_mut(id, GameSession::resume_game)?;
        self.schedule_ai_if_due(*id)
    }

    pub fn finish_game(&self, id: &Uuid) -> ManagerResult<()> {
        let mut entry = self.sessions.get_mut(id).ok_or(ManagerError::NotFound { game_id: *id })?;
        entry.session.finish_game()?;
        entry.cancel_pending_ai();
        entry.last_activity = Utc::now();
        Ok(())
    }

    /// 設定変更。モードや担当色の変更でAIの手番になった場合は予約する
    pub fn update_settings(&self, id: &Uuid, update: &SettingsUpdate) -> ManagerResult<()> {
        self.with_session_mut(id, |session| session.update_game_settings(update))?;
        self.schedule_ai_if_due(*id)
    }

    /// リセット後の待機状態から対局を開始する
    pub fn start_game(&self, id: &Uuid) -> ManagerResult<()> {
        self.with_session_mut(id, |session| {
            if session.status() != SessionStatus::Waiting {
                return Err(ActionRejected::NotPlaying);
            }
            session.initialize_game();
            Ok(())
        })?;
        self.schedule_ai_if_due(*id)
    }

    /// AIの手番ならAI着手を予約する
    fn schedule_ai_if_due(&self, id: Uuid) -> ManagerResult<()> {
        let due = self.with_session(&id, |managed| {
            managed.session.is_ai_turn() && !managed.session.ai_thinking() && !managed.has_pending_ai()
        })?;
        if due {
            self.schedule_ai_move(&id)?;
        }
        Ok(())
    }

    /// 思考フラグを立て、演出時間後にAIが着手するタスクを起動する
    /// 待機中に `cancel_ai_move`・リセット・削除されるとタスクは何もせずに終わる
    pub fn schedule_ai_move(&self, id: &Uuid) -> ManagerResult<()> {
        let token = CancellationToken::new();
        let delay = {
            let mut entry = self.sessions.get_mut(id).ok_or(ManagerError::NotFound { game_id: *id })?;
            if entry.session.status() != SessionStatus::Playing {
                return Err(ActionRejected::NotPlaying.into());
            }
            if entry.session.ai_thinking() {
                return Err(ActionRejected::AiThinking.into());
            }
            entry.session.set_ai_thinking(true);
            entry.pending_ai = Some(token.clone());
            entry.session.settings().ai_move_delay
        };

        let manager = self.clone();
        let id = *id;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!(game_id = %id, "scheduled ai move cancelled");
                }
                _ = tokio::time::sleep(delay) => {
                    manager.run_pending_ai_move(id, &token);
                }
            }
        });

        debug!(game_id = %id, delay_ms = delay.as_millis() as u64, "ai move scheduled");
        Ok(())
    }

    /// 予約されたAI着手を実行する
    /// トークンが差し替え・キャンセル済みなら何もしない
    fn run_pending_ai_move(&self, id: Uuid, token: &CancellationToken) {
        let outcome = {
            let Some(mut entry) = self.sessions.get_mut(&id) else {
                return;
            };
            if token.is_cancelled() || entry.pending_ai.is_none() {
                return;
            }
            entry.pending_ai = None;
            let mut rng = rand::rng();
            let outcome = entry.session.complete_ai_move(&mut rng);
            if outcome.is_err() {
                entry.session.set_ai_thinking(false);
            }
            entry.last_activity = Utc::now();
            outcome
        };

        match outcome {
            Ok(AiMoveOutcome::Moved(result)) => {
                debug!(game_id = %id, position = %result.mv.position, "ai moved");
            }
            Ok(other) => debug!(game_id = %id, ?other, "ai turn finished without a move"),
            Err(err) => warn!(game_id = %id, %err, "ai move rejected"),
        }

        // 相手が自動パスした場合などAIの手番が続くことがある
        if let Err(err) = self.schedule_ai_if_due(id) {
            warn!(game_id = %id, %err, "failed to reschedule ai move");
        }
    }

    /// 実行待ちのAI着手をキャンセルし、思考フラグを下ろす
    /// キャンセルするものがあればtrue
    pub fn cancel_ai_move(&self, id: &Uuid) -> ManagerResult<bool> {
        let mut entry = self.sessions.get_mut(id).ok_or(ManagerError::NotFound { game_id: *id })?;
        let cancelled = entry.cancel_pending_ai();
        if cancelled {
            entry.session.set_ai_thinking(false);
        }
        Ok(cancelled)
    }

    pub fn remove_session(&self, id: &Uuid) -> ManagerResult<()> {
        match self.sessions.remove(id) {
            Some((_, mut managed)) => {
                managed.cancel_pending_ai();
                info!(game_id = %id, "session removed");
                Ok(())
            }
            None => Err(ManagerError::NotFound { game_id: *id }),
        }
    }

    pub fn list_sessions(&self) -> Vec<Uuid> {
        self.sessions.iter().map(|entry| *entry.key()).collect()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn session_exists(&self, id: &Uuid) -> bool {
        self.sessions.contains_key(id)
    }

    /// 一定時間操作のないセッションを削除する
    pub fn cleanup_inactive_sessions(&self) -> usize {
        let cutoff_time = Utc::now() - Duration::minutes(self.session_timeout_minutes);

        let expired_ids: Vec<Uuid> = self
            .sessions
            .iter()
            .filter(|entry| entry.value().last_activity < cutoff_time)
            .map(|entry| *entry.key())
            .collect();

        let removed_count = expired_ids
            .iter()
            .filter(|id| self.remove_session(id).is_ok())
            .count();

        if removed_count > 0 {
            info!(removed = removed_count, "inactive sessions cleaned up");
        }
        removed_count
    }

    pub fn get_stats(&self) -> SessionStats {
        let mut ai_thinking_count = 0;
        let mut status_counts = HashMap::new();
        let mut difficulty_counts = HashMap::new();

        for entry in self.sessions.iter() {
            let session = &entry.value().session;
            if session.ai_thinking() {
                ai_thinking_count += 1;
            }
            *status_counts.entry(session.status()).or_insert(0) += 1;
            *difficulty_counts.entry(session.settings().difficulty).or_insert(0) += 1;
        }

        SessionStats {
            total_sessions: self.sessions.len(),
            max_sessions: self.max_sessions,
            ai_thinking_count,
            status_counts,
            difficulty_counts,
        }
    }
}

fn ensure_human_turn(session: &GameSession) -> Result<(), ActionRejected> {
    if session.is_ai_turn() {
        return Err(ActionRejected::AiTurn);
    }
    Ok(())
}

impl Default for GameSessionManager {
    fn default() -> Self {
        Self::new(100)
    }
}

#[derive(Debug)]
pub struct SessionStats {
    pub total_sessions: usize,
    pub max_sessions: usize,
    pub ai_thinking_count: usize,
    pub status_counts: HashMap<SessionStatus, usize>,
    pub difficulty_counts: HashMap<Difficulty, usize>,
}
