//! Gym member roster client for Rust
//!
//! This crate provides the member-records side of the gym admin dashboard:
//! typed CRUD against the record service, aggregate statistics, membership
//! lifecycle computation, and the directory controller that drives the
//! member-management view.
//!
//! # Features
//!
//! - Paginated member listing
//! - Member registration, update, and delete (keyed by document id)
//! - Aggregate statistics and latest registrations
//! - Pure membership lifecycle functions (`lifecycle`)
//! - Directory controller with search, pagination, and confirm-gated
//!   delete (`directory`)

use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use gymdash_rust_auth::SessionStore;

pub mod directory;
pub mod lifecycle;

pub use directory::{DirectoryError, MemberDirectory, MemberForm, MemberRow, PageWindow};
pub use lifecycle::{compute_end_date, compute_status, compute_status_on, DerivedStatus};

/// エラー型
#[derive(Error, Debug)]
pub enum MembersError {
    #[error("API error: {0}")]
    ApiError(String),

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
async fn api_error(response: reqwest::Response) -> MembersError {
    let error_text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&error_text)
        .ok()
        .and_then(|body| body.error)
        .and_then(|error| error.message)
        .unwrap_or_else(|| "Something went wrong!".to_string());
    MembersError::ApiError(message)
}

/// バックエンドのエンドポイント定義
pub mod endpoints {
    /// 会員コレクション
    pub const MEMBERS: &str = "/api/members";
    /// 会員統計
    pub const STATS: &str = "/api/members/stats";
    /// 直近の登録会員
    pub const LATEST: &str = "/api/members/latest";

    /// 会員一覧（ページ指定）
    pub fn members_data(page: u32, page_size: u32) -> String {
        format!(
            "{}?pagination[page]={}&pagination[pageSize]={}",
            MEMBERS, page, page_size
        )
    }

    /// 単一会員（ドキュメント ID 指定）
    pub fn member(document_id: &str) -> String {
        format!("{}/{}", MEMBERS, document_id)
    }
}

/// 会員種別
///
/// 更新の周期を決める閉じた列挙。ワイヤ上の表記は `monthly` /
/// `quarterly` / `half yearly` / `yearly`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MembershipType {
    #[serde(rename = "monthly")]
    Monthly,
    #[serde(rename = "quarterly")]
    Quarterly,
    #[serde(rename = "half yearly")]
    HalfYearly,
    #[serde(rename = "yearly")]
    Yearly,
}

impl Default for MembershipType {
    fn default() -> Self {
        MembershipType::Monthly
    }
}

impl MembershipType {
    /// バッジ表示用ラベル
    pub fn label(&self) -> &'static str {
        match self {
            MembershipType::Monthly => "Monthly",
            MembershipType::Quarterly => "Quarterly",
            MembershipType::HalfYearly => "Half Yearly",
            MembershipType::Yearly => "Yearly",
        }
    }
}

/// サーバーが計算する会員状態
///
/// 一覧表示で使う二値の [`DerivedStatus`] とは出所が異なる。こちらは
/// 取得した値をそのまま保持するだけで、クライアント側では導出しない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MembershipStatus {
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "expiring_soon")]
    ExpiringSoon,
    #[serde(rename = "expired")]
    Expired,
}

/// 会員レコード
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,

    /// 変更系エンドポイントのキーになる不透明な ID
    #[serde(rename = "documentId", skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,

    pub full_name: String,

    pub phone_number: String,

    #[serde(default)]
    pub email: Option<String>,

    pub membership_type: MembershipType,

    pub start_date: NaiveDate,

    pub end_date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,

    pub membership_status: MembershipStatus,

    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// 会員の登録・更新ペイロード
#[derive(Debug, Clone, Serialize)]
pub struct MemberDraft {
    pub full_name: String,
    pub email: Option<String>,
    pub phone_number: String,
    pub membership_type: MembershipType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// ページネーション情報
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub start: u32,
    pub limit: u32,
    pub total: u32,
}

/// 一覧レスポンスのメタ情報
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMeta {
    pub pagination: Pagination,
}

/// 会員一覧レスポンス
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembersPage {
    pub data: Vec<Member>,
    pub meta: ResponseMeta,
}

/// 単一リソースのレスポンス (`{"data": ...}` で包まれる)
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// 変更系リクエストのボディ (`{"data": ...}` で包む)
#[derive(Debug, Serialize)]
struct DataBody<'a, T> {
    data: &'a T,
}

/// 統計スナップショット
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_members: u64,
    pub active_members: u64,
    pub monthly_revenue: f64,
    /// 月名 → その月に期限を迎える会員数
    pub expiring_by_month: HashMap<String, u32>,
    /// 会員種別ごとの内訳
    pub membership_breakdown: HashMap<MembershipType, u32>,
}

impl StatsSnapshot {
    /// 指定した月に期限を迎える会員数
    ///
    /// 月名が見つからない場合は 0。
    pub fn expiring_in(&self, month_name: &str) -> u32 {
        self.expiring_by_month.get(month_name).copied().unwrap_or(0)
    }

    /// 今月期限を迎える会員数
    pub fn expiring_this_month(&self) -> u32 {
        let month = chrono::Local::now().format("%B").to_string();
        self.expiring_in(&month)
    }

    /// 指定した会員種別の会員数
    pub fn breakdown_for(&self, membership_type: MembershipType) -> u32 {
        self.membership_breakdown
            .get(&membership_type)
            .copied()
            .unwrap_or(0)
    }
}

/// 会員レコードサービスのクライアント
///
/// 保護された呼び出しには、明示トークンが無ければセッションストアの
/// トークンを Bearer として付与する。リトライはしない。失敗は正規化
/// されたメッセージ付きのエラーとして呼び出し側へそのまま返す。
pub struct MembersClient {
    base_url: String,
    session: SessionStore,
    http_client: Client,
}

impl MembersClient {
    /// 新しい会員クライアントを作成
    pub fn new(base_url: &str, http_client: Client, session: SessionStore) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            http_client,
        }
    }

    /// 認証ヘッダーに載せるトークンを解決
    ///
    /// 認証前に明示トークンで叩く口は auth 側の検証だけなので、ここは
    /// 常にセッションストアから取る。
    fn bearer_token(&self) -> String {
        self.session.token()
    }

    /// 会員一覧を 1 ページ取得
    pub async fn get_members(&self, page: u32, page_size: u32) -> Result<MembersPage, MembersError> {
        let url = format!("{}{}", self.base_url, endpoints::members_data(page, page_size));
        log::debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.bearer_token()),
            )
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let page: MembersPage = response.json().await?;

        Ok(page)
    }

    /// 会員を登録
    pub async fn add_member(&self, draft: &MemberDraft) -> Result<Member, MembersError> {
        let url = format!("{}{}", self.base_url, endpoints::MEMBERS);

        let response = self
            .http_client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.bearer_token()),
            )
            .header("Content-Type", "application/json")
            .json(&DataBody { data: draft })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let created: DataEnvelope<Member> = response.json().await?;

        Ok(created.data)
    }

    /// 会員を更新
    pub async fn update_member(
        &self,
        document_id: &str,
        draft: &MemberDraft,
    ) -> Result<Member, MembersError> {
        let url = format!("{}{}", self.base_url, endpoints::member(document_id));

        let response = self
            .http_client
            .put(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.bearer_token()),
            )
            .header("Content-Type", "application/json")
            .json(&DataBody { data: draft })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let updated: DataEnvelope<Member> = response.json().await?;

        Ok(updated.data)
    }

    /// 会員を削除
    pub async fn delete_member(&self, document_id: &str) -> Result<(), MembersError> {
        let url = format!("{}{}", self.base_url, endpoints::member(document_id));

        let response = self
            .http_client
            .delete(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.bearer_token()),
            )
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        Ok(())
    }

    /// 統計スナップショットを取得
    pub async fn get_stats(&self) -> Result<StatsSnapshot, MembersError> {
        let url = format!("{}{}", self.base_url, endpoints::STATS);

        let response = self
            .http_client
            .get(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.bearer_token()),
            )
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let stats: StatsSnapshot = response.json().await?;

        Ok(stats)
    }

    /// 直近の登録会員を取得
    ///
    /// 並びは新しい順で、サーバー側の順序をそのまま使う。
    pub async fn get_latest_registrations(&self) -> Result<Vec<Member>, MembersError> {
        let url = format!("{}{}", self.base_url, endpoints::LATEST);

        let response = self
            .http_client
            .get(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.bearer_token()),
            )
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let latest: DataEnvelope<Vec<Member>> = response.json().await?;

        Ok(latest.data)
    }
}
