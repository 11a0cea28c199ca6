//! Gym admin auth client for Rust
//!
//! This crate provides the authentication side of the gym admin dashboard:
//! staff login, token validation, the process-wide session store, durable
//! profile persistence, and the session guard that gates protected views.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::RwLock;
use thiserror::Error;

pub mod guard;
pub mod storage;

pub use guard::{login_redirect, GuardDecision, GuardState, SessionGuard, TokenValidator};
pub use storage::{ProfileStorage, StoredProfile, USER_PROFILE_KEY};

/// エラー型
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// バックエンドのエラーペイロード (`{"error": {"message": ...}}`)
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetails>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetails {
    message: Option<String>,
}

/// エラーレスポンスを単一のメッセージへ正規化
fn normalize_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|body| body.error)
        .and_then(|error| error.message)
        .unwrap_or_else(|| "Something went wrong!".to_string())
}

/// バックエンドのエンドポイント定義
pub mod endpoints {
    /// トークン検証
    pub const VALIDATE_TOKEN: &str = "/internal/auth/validate-token";
    /// ログイン
    pub const LOGIN: &str = "/internal/auth/login";
    /// スタッフ登録
    pub const REGISTER: &str = "/internal/auth/register";
}

/// 現在のセッション状態
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub name: String,
    pub email: String,
    pub profile_pic: String,
    pub token: String,
    pub user_id: String,
    pub role: String,
    pub is_authenticated: bool,
}

/// プロセス全体で共有するセッションストア
///
/// Clone しても内部状態は共有される。UI 以外のコードパス（members
/// クライアントなど）からもトークンを読めるように `Arc<RwLock<_>>` で
/// 保持する。書き込みはユーザー操作起点で直列化される前提。
///
/// 不変条件: `is_authenticated == true` のときトークンは空でないこと。
/// `set_token` を済ませてから `set_authenticated(true)` を呼ぶ。
#[derive(Clone, Default)]
pub struct SessionStore {
    state: Arc<RwLock<SessionState>>,
}

impl SessionStore {
    /// 新しい空のセッションストアを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 現在の状態のスナップショットを取得
    pub fn snapshot(&self) -> SessionState {
        self.state.read().unwrap().clone()
    }

    /// 現在のトークンを取得
    pub fn token(&self) -> String {
        self.state.read().unwrap().token.clone()
    }

    /// 認証済みかどうか
    pub fn is_authenticated(&self) -> bool {
        self.state.read().unwrap().is_authenticated
    }

    /// プロフィールを設定
    pub fn set_profile(
        &self,
        name: &str,
        email: &str,
        profile_pic: &str,
        user_id: &str,
        role: &str,
    ) {
        let mut state = self.state.write().unwrap();
        state.name = name.to_string();
        state.email = email.to_string();
        state.profile_pic = profile_pic.to_string();
        state.user_id = user_id.to_string();
        state.role = role.to_string();
    }

    /// トークンを設定
    pub fn set_token(&self, token: &str) {
        let mut state = self.state.write().unwrap();
        state.token = token.to_string();
    }

    /// 認証フラグを設定
    pub fn set_authenticated(&self, value: bool) {
        let mut state = self.state.write().unwrap();
        state.is_authenticated = value;
    }

    /// すべてのフィールドを初期値へ戻す
    ///
    /// 何度呼んでも結果は同じ。
    pub fn reset(&self) {
        let mut state = self.state.write().unwrap();
        *state = SessionState::default();
    }
}

/// ログインレスポンスに含まれるスタッフ詳細
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDetails {
    pub name: String,
    pub email: String,
    pub username: String,
    pub profile_pic: String,
    pub role: String,
}

/// ログインレスポンス
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub status: String,
    pub user_id: String,
    pub details: UserDetails,
    pub token: String,
    pub role: String,
}

/// トークン検証レスポンス
#[derive(Debug, Deserialize)]
struct ValidateTokenResponse {
    is_valid: bool,
}

/// 認証クライアント
#[derive(Clone)]
pub struct AuthClient {
    base_url: String,
    http_client: Client,
}

impl AuthClient {
    /// 新しい認証クライアントを作成
    pub fn new(base_url: &str, http_client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        }
    }

    /// トークンを検証
    ///
    /// 認証前の検証ステップで使うため、セッションストアではなく引数の
    /// トークンを明示的に送る。
    pub async fn validate_token(&self, token: &str) -> Result<bool, AuthError> {
        let url = format!("{}{}", self.base_url, endpoints::VALIDATE_TOKEN);

        let payload = serde_json::json!({
            "token": token,
        });

        let response = self
            .http_client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(AuthError::ApiError(normalize_error_message(&error_text)));
        }

        let body: ValidateTokenResponse = response.json().await?;

        Ok(body.is_valid)
    }

    /// メール・パスワードでログイン
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let url = format!("{}{}", self.base_url, endpoints::LOGIN);

        let payload = serde_json::json!({
            "email": email,
            "password": password,
        });

        let response = self
            .http_client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(AuthError::AuthenticationError(normalize_error_message(
                &error_text,
            )));
        }

        let login: LoginResponse = response.json().await?;

        Ok(login)
    }

    /// スタッフアカウントを登録
    ///
    /// # 引数
    ///
    /// * `name` - 表示名
    /// * `email` - メールアドレス
    /// * `password` - パスワード
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<LoginResponse, AuthError> {
        let url = format!("{}{}", self.base_url, endpoints::REGISTER);

        let payload = serde_json::json!({
            "name": name,
            "email": email,
            "password": password,
        });

        let response = self
            .http_client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(AuthError::ApiError(normalize_error_message(&error_text)));
        }

        let login: LoginResponse = response.json().await?;

        Ok(login)
    }
}

#[async_trait::async_trait]
impl TokenValidator for AuthClient {
    async fn validate_token(&self, token: &str) -> Result<bool, AuthError> {
        AuthClient::validate_token(self, token).await
    }
}

/// サインアウト
///
/// 永続化されたプロフィールを削除し、セッションストアを初期値へ戻す。
/// ストレージ操作の成否を返す。
pub fn sign_out(store: &SessionStore, storage: &ProfileStorage) -> bool {
    let cleared = storage.clear();
    store.reset();
    cleared
}
