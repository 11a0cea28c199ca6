//! Session guard
//!
//! The access-control state machine that gates protected views. The guard
//! never performs a redirect itself; it returns a declarative decision
//! that the router shell interprets, so the transitions stay testable
//! without any UI.

use async_trait::async_trait;

use crate::storage::ProfileStorage;
use crate::{AuthError, SessionStore};

/// ガードの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// まだ何も検証していない初期状態
    Unknown,
    /// 有効なセッションなし
    Unauthenticated,
    /// 永続化トークンを検証中
    Verifying,
    /// 検証済み
    Authenticated,
}

/// ガードの判定結果
///
/// `Authenticated` 以外の状態では保護コンテンツを描画しないこと。
/// 判定が `RenderContent` の場合だけ描画する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// 保護されたコンテンツを描画してよい
    RenderContent,
    /// 指定パスへ遷移する
    NavigateTo(String),
}

/// トークン検証の能力
///
/// ガードが認証クライアントへ依存するための seam。テストではモック実装に
/// 差し替える。
#[async_trait]
pub trait TokenValidator {
    /// トークンが有効かどうかを検証する
    async fn validate_token(&self, token: &str) -> Result<bool, AuthError>;
}

/// ログイン画面への遷移先を構築
///
/// 元々要求されたパスを `ref` パラメータとして URL エンコードで保持し、
/// ログイン成功後に戻れるようにする。
pub fn login_redirect(requested_path: &str) -> String {
    format!("/login?ref={}", urlencoding::encode(requested_path))
}

/// セッションガード
pub struct SessionGuard<V> {
    store: SessionStore,
    storage: ProfileStorage,
    validator: V,
    state: GuardState,
}

impl<V: TokenValidator> SessionGuard<V> {
    /// 新しいガードを作成
    pub fn new(store: SessionStore, storage: ProfileStorage, validator: V) -> Self {
        Self {
            store,
            storage,
            validator,
            state: GuardState::Unknown,
        }
    }

    /// 現在の状態
    pub fn state(&self) -> GuardState {
        self.state
    }

    /// 保護ビューの表示可否を判定
    ///
    /// ストアが認証済みならネットワーク呼び出しなしで即描画を許可する。
    /// そうでなければ永続化プロフィールの復元を試み、検証に失敗した場合は
    /// セッションを破棄してログインへの遷移を返す。認証済みフラグや要求
    /// パスが変わるたびに呼び直してよい。
    pub async fn check(&mut self, requested_path: &str) -> GuardDecision {
        if self.store.is_authenticated() {
            self.state = GuardState::Authenticated;
            return GuardDecision::RenderContent;
        }

        let profile = match self.storage.load() {
            Some(profile) => profile,
            None => {
                self.state = GuardState::Unauthenticated;
                return GuardDecision::NavigateTo(login_redirect(requested_path));
            }
        };

        self.state = GuardState::Verifying;

        match self.validator.validate_token(&profile.token).await {
            Ok(true) => {
                self.store
                    .set_profile(&profile.name, &profile.email, "", &profile.user_id, "");
                self.store.set_token(&profile.token);
                self.store.set_authenticated(true);
                self.state = GuardState::Authenticated;
                GuardDecision::RenderContent
            }
            // 無効・期限切れトークンも通信エラーも「セッションなし」と同じ扱い
            Ok(false) | Err(_) => {
                self.storage.clear();
                self.store.reset();
                self.state = GuardState::Unauthenticated;
                GuardDecision::NavigateTo(login_redirect(requested_path))
            }
        }
    }
}
