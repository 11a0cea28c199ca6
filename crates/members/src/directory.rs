//! Member directory controller
//!
//! Drives the member-management view: one loaded page of members, the
//! search query, the pagination window, and the create/update/delete
//! flows. The controller owns its state behind `&mut self`, so a late
//! response can never be written into a view that has moved on.

use chrono::{Local, NaiveDate};
use thiserror::Error;

use crate::lifecycle::{compute_end_date, compute_status_on, DerivedStatus};
use crate::{Member, MemberDraft, MembersClient, MembersError, MembershipType};

/// エラー型
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// 必須フィールド不足（フィールド名を保持する）
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// 削除の確認が取れていない
    #[error("delete not confirmed")]
    DeleteNotConfirmed,

    #[error(transparent)]
    Service(#[from] MembersError),
}

/// ページネーションウィンドウ
///
/// `current_page` は 1 始まりで、常に `[1, total_pages]` に収まる。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub current_page: usize,
    pub page_size: usize,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self {
            current_page: 1,
            page_size: 10,
        }
    }
}

/// 登録・編集フォームの内容
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberForm {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub membership_type: MembershipType,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl MemberForm {
    /// 新規登録用のフォームを用意
    ///
    /// 開始日は今日、種別は月額、終了日はそこから計算した値で埋める。
    pub fn primed(today: NaiveDate) -> Self {
        Self {
            membership_type: MembershipType::Monthly,
            start_date: Some(today),
            end_date: Some(compute_end_date(today, MembershipType::Monthly)),
            ..Self::default()
        }
    }

    /// 会員レコードからフォームを起こす
    pub fn from_member(member: &Member) -> Self {
        Self {
            full_name: member.full_name.clone(),
            email: member.email.clone().unwrap_or_default(),
            phone_number: member.phone_number.clone(),
            membership_type: member.membership_type,
            start_date: Some(member.start_date),
            end_date: Some(member.end_date),
        }
    }

    /// 必須フィールドを検証して送信ペイロードへ変換
    ///
    /// 足りないフィールドがあれば名前入りのエラーで送信をブロックする。
    pub fn to_draft(&self) -> Result<MemberDraft, DirectoryError> {
        if self.full_name.trim().is_empty() {
            return Err(DirectoryError::MissingField("full_name"));
        }
        if self.phone_number.trim().is_empty() {
            return Err(DirectoryError::MissingField("phone_number"));
        }
        let start_date = self
            .start_date
            .ok_or(DirectoryError::MissingField("start_date"))?;
        let end_date = self
            .end_date
            .ok_or(DirectoryError::MissingField("end_date"))?;

        Ok(MemberDraft {
            full_name: self.full_name.clone(),
            email: if self.email.trim().is_empty() {
                None
            } else {
                Some(self.email.clone())
            },
            phone_number: self.phone_number.clone(),
            membership_type: self.membership_type,
            start_date,
            end_date,
        })
    }
}

/// 一覧の 1 行分の表示内容
///
/// 保存済みフィールドから描画ごとに再計算する。状態としては持たない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRow {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub membership_label: &'static str,
    pub joined: String,
    pub expires: String,
    pub status: DerivedStatus,
}

impl MemberRow {
    fn from_member(member: &Member, today: NaiveDate) -> Self {
        Self {
            full_name: member.full_name.clone(),
            email: member.email.clone().unwrap_or_default(),
            phone_number: member.phone_number.clone(),
            membership_label: member.membership_type.label(),
            joined: member.start_date.format("%d %b %Y").to_string(),
            expires: member.end_date.format("%d %b %Y").to_string(),
            status: compute_status_on(member.end_date, today),
        }
    }
}

/// 会員ディレクトリコントローラ
pub struct MemberDirectory {
    client: MembersClient,
    members: Vec<Member>,
    query: String,
    window: PageWindow,
    loading: bool,
    server_total: u32,
    editing: Option<String>,
    pending_delete: Option<String>,
    form: MemberForm,
}

impl MemberDirectory {
    /// 新しいコントローラを作成
    pub fn new(client: MembersClient) -> Self {
        Self {
            client,
            members: Vec::new(),
            query: String::new(),
            window: PageWindow::default(),
            loading: false,
            server_total: 0,
            editing: None,
            pending_delete: None,
            form: MemberForm::primed(Local::now().date_naive()),
        }
    }

    /// 読み込み済みの会員
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// 読み込み中かどうか
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// 現在の検索クエリ
    pub fn query(&self) -> &str {
        &self.query
    }

    /// 現在のページネーションウィンドウ
    pub fn window(&self) -> PageWindow {
        self.window
    }

    /// サーバーが報告したコレクション全体の件数
    pub fn server_total(&self) -> u32 {
        self.server_total
    }

    /// フォームの内容
    pub fn form(&self) -> &MemberForm {
        &self.form
    }

    /// フォームの内容（編集用）
    pub fn form_mut(&mut self) -> &mut MemberForm {
        &mut self.form
    }

    /// 編集中の会員のドキュメント ID
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    /// 削除確認中の会員のドキュメント ID
    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    /// 現在のページをサーバーから取り直す
    ///
    /// 読み込みフラグは成功・失敗のどちらでも必ず解除する。失敗時は
    /// 読み込み済みの一覧に手を付けない。
    pub async fn refresh(&mut self) -> Result<(), DirectoryError> {
        self.loading = true;
        let result = self
            .client
            .get_members(self.window.current_page as u32, self.window.page_size as u32)
            .await;
        self.loading = false;

        let page = result?;
        self.server_total = page.meta.pagination.total;
        self.members = page.data;
        Ok(())
    }

    /// 検索クエリを設定
    ///
    /// ページは 1 に戻る。絞り込みは読み込み済みのページ内だけで行う。
    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.window.current_page = 1;
    }

    /// 検索条件に合う会員
    ///
    /// 名前・メールは大文字小文字を無視した部分一致、電話番号はそのまま
    /// の部分一致。
    pub fn filtered(&self) -> Vec<&Member> {
        let needle = self.query.to_lowercase();
        self.members
            .iter()
            .filter(|member| {
                member.full_name.to_lowercase().contains(&needle)
                    || member
                        .email
                        .as_deref()
                        .unwrap_or("")
                        .to_lowercase()
                        .contains(&needle)
                    || member.phone_number.contains(&self.query)
            })
            .collect()
    }

    /// 絞り込み後の総ページ数（最低 1）
    pub fn total_pages(&self) -> usize {
        let total = self.filtered().len();
        std::cmp::max(1, (total + self.window.page_size - 1) / self.window.page_size)
    }

    /// ページを移動
    ///
    /// 範囲外の指定は `[1, total_pages]` へ丸める。移動が起きた場合は
    /// サーバーから取り直す。
    pub async fn goto_page(&mut self, page: usize) -> Result<(), DirectoryError> {
        let clamped = page.clamp(1, self.total_pages());
        if clamped == self.window.current_page {
            return Ok(());
        }
        self.window.current_page = clamped;
        self.refresh().await
    }

    /// 1 ページの件数を変更
    ///
    /// ページは 1 に戻り、サーバーから取り直す。
    pub async fn set_page_size(&mut self, page_size: usize) -> Result<(), DirectoryError> {
        self.window.page_size = std::cmp::max(1, page_size);
        self.window.current_page = 1;
        self.refresh().await
    }

    /// 現在のページに表示する行（基準日を指定）
    pub fn visible_rows_on(&self, today: NaiveDate) -> Vec<MemberRow> {
        let start = (self.window.current_page - 1) * self.window.page_size;
        self.filtered()
            .into_iter()
            .skip(start)
            .take(self.window.page_size)
            .map(|member| MemberRow::from_member(member, today))
            .collect()
    }

    /// 現在のページに表示する行（今日基準）
    pub fn visible_rows(&self) -> Vec<MemberRow> {
        self.visible_rows_on(Local::now().date_naive())
    }

    /// "Showing X to Y of Z" 用の範囲
    pub fn showing_range(&self) -> (usize, usize, usize) {
        let total = self.filtered().len();
        let start = (self.window.current_page - 1) * self.window.page_size;
        let from = if total == 0 { 0 } else { start + 1 };
        let to = std::cmp::min(start + self.window.page_size, total);
        (from, to, total)
    }

    /// 新規登録用にフォームを初期化
    pub fn open_blank_form(&mut self) {
        self.editing = None;
        self.form = MemberForm::primed(Local::now().date_naive());
    }

    /// 既存会員をフォームへ読み込んで編集を開始
    pub fn begin_edit(&mut self, member: &Member) {
        self.editing = member.document_id.clone();
        self.form = MemberForm::from_member(member);
    }

    /// フォームを送信
    ///
    /// 編集中なら更新、そうでなければ新規登録。成功時はサーバーを正と
    /// して一覧を取り直し、フォームと編集状態を初期化する。失敗時は
    /// 修正できるようフォームをそのまま残す。
    pub async fn submit(&mut self) -> Result<(), DirectoryError> {
        let draft = self.form.to_draft()?;

        self.loading = true;
        let result = match &self.editing {
            Some(document_id) => self.client.update_member(document_id, &draft).await,
            None => self.client.add_member(&draft).await,
        };
        self.loading = false;
        result?;

        self.editing = None;
        self.form = MemberForm::primed(Local::now().date_naive());
        self.refresh().await
    }

    /// 削除確認を開始
    pub fn request_delete(&mut self, document_id: &str) {
        self.pending_delete = Some(document_id.to_string());
    }

    /// 削除確認を取り消す
    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// 確認済みの削除を実行
    ///
    /// `request_delete` で確認が取れていなければバックエンドは呼ばない。
    /// 成功時は取り直さずローカルの一覧から取り除く。失敗時は確認状態を
    /// 維持したままエラーを返す。
    pub async fn confirm_delete(&mut self) -> Result<(), DirectoryError> {
        let document_id = self
            .pending_delete
            .clone()
            .ok_or(DirectoryError::DeleteNotConfirmed)?;

        self.loading = true;
        let result = self.client.delete_member(&document_id).await;
        self.loading = false;
        result?;

        self.members
            .retain(|member| member.document_id.as_deref() != Some(document_id.as_str()));
        self.pending_delete = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MembershipStatus;
    use gymdash_rust_auth::SessionStore;

    fn make_member(id: i64, name: &str, email: Option<&str>, phone: &str) -> Member {
        Member {
            id,
            document_id: Some(format!("doc_{}", id)),
            full_name: name.to_string(),
            phone_number: phone.to_string(),
            email: email.map(|e| e.to_string()),
            membership_type: MembershipType::Monthly,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            is_active: None,
            membership_status: MembershipStatus::Active,
            created_at: None,
            updated_at: None,
        }
    }

    fn directory_with(members: Vec<Member>) -> MemberDirectory {
        let client = MembersClient::new(
            "http://localhost:0",
            reqwest::Client::new(),
            SessionStore::new(),
        );
        let mut directory = MemberDirectory::new(client);
        directory.members = members;
        directory
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let mut directory = directory_with(vec![
            make_member(1, "Amit", Some("amit@example.com"), "9876500001"),
            make_member(2, "Priya", Some("priya@example.com"), "9876500002"),
        ]);

        directory.set_query("am");
        let filtered = directory.filtered();

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].full_name, "Amit");
    }

    #[test]
    fn test_search_matches_email_and_phone() {
        let mut directory = directory_with(vec![
            make_member(1, "Amit", Some("amit@example.com"), "9876500001"),
            make_member(2, "Priya", Some("priya@example.com"), "9812300002"),
        ]);

        directory.set_query("PRIYA@");
        assert_eq!(directory.filtered().len(), 1);
        assert_eq!(directory.filtered()[0].full_name, "Priya");

        directory.set_query("98123");
        assert_eq!(directory.filtered().len(), 1);
        assert_eq!(directory.filtered()[0].full_name, "Priya");
    }

    #[test]
    fn test_search_skips_missing_email() {
        let mut directory = directory_with(vec![
            make_member(1, "Amit", None, "9876500001"),
            make_member(2, "Priya", Some("priya@example.com"), "9876500002"),
        ]);

        directory.set_query("example.com");
        assert_eq!(directory.filtered().len(), 1);
    }

    #[test]
    fn test_query_change_resets_page() {
        let mut directory = directory_with(
            (1..=23)
                .map(|i| make_member(i, &format!("Member {}", i), None, "98765"))
                .collect(),
        );
        directory.window.current_page = 3;

        directory.set_query("member");

        assert_eq!(directory.window().current_page, 1);
    }

    #[test]
    fn test_total_pages_for_filtered_rows() {
        let directory = directory_with(
            (1..=23)
                .map(|i| make_member(i, &format!("Member {}", i), None, "98765"))
                .collect(),
        );

        // 23 件をページサイズ 10 で割ると 3 ページ
        assert_eq!(directory.total_pages(), 3);
    }

    #[test]
    fn test_total_pages_is_at_least_one() {
        let directory = directory_with(Vec::new());
        assert_eq!(directory.total_pages(), 1);
    }

    #[test]
    fn test_visible_rows_slices_current_window() {
        let mut directory = directory_with(
            (1..=23)
                .map(|i| make_member(i, &format!("Member {}", i), None, "98765"))
                .collect(),
        );
        directory.window.current_page = 3;

        let today = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let rows = directory.visible_rows_on(today);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].full_name, "Member 21");
        assert_eq!(directory.showing_range(), (21, 23, 23));
    }

    #[test]
    fn test_rows_derive_status_and_labels() {
        let mut expired = make_member(1, "Amit", None, "98765");
        expired.end_date = NaiveDate::from_ymd_opt(2025, 1, 14).unwrap();
        expired.membership_type = MembershipType::HalfYearly;
        let directory = directory_with(vec![expired]);

        let today = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let rows = directory.visible_rows_on(today);

        assert_eq!(rows[0].status, DerivedStatus::Expired);
        assert_eq!(rows[0].membership_label, "Half Yearly");
        assert_eq!(rows[0].expires, "14 Jan 2025");
    }

    #[test]
    fn test_showing_range_empty() {
        let directory = directory_with(Vec::new());
        assert_eq!(directory.showing_range(), (0, 0, 0));
    }

    #[test]
    fn test_form_validation_names_missing_field() {
        let mut form = MemberForm::primed(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());

        assert!(matches!(
            form.to_draft(),
            Err(DirectoryError::MissingField("full_name"))
        ));

        form.full_name = "Amit".to_string();
        assert!(matches!(
            form.to_draft(),
            Err(DirectoryError::MissingField("phone_number"))
        ));

        form.phone_number = "9876500001".to_string();
        form.end_date = None;
        assert!(matches!(
            form.to_draft(),
            Err(DirectoryError::MissingField("end_date"))
        ));
    }

    #[test]
    fn test_primed_form_prefills_monthly_window() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let form = MemberForm::primed(today);

        assert_eq!(form.membership_type, MembershipType::Monthly);
        assert_eq!(form.start_date, Some(today));
        assert_eq!(
            form.end_date,
            Some(NaiveDate::from_ymd_opt(2025, 2, 28).unwrap())
        );
    }

    #[test]
    fn test_blank_email_becomes_none() {
        let mut form = MemberForm::primed(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        form.full_name = "Amit".to_string();
        form.phone_number = "9876500001".to_string();

        let draft = form.to_draft().unwrap();
        assert_eq!(draft.email, None);
    }

    #[test]
    fn test_begin_edit_copies_member_into_form() {
        let member = make_member(7, "Priya", Some("priya@example.com"), "9812300002");
        let mut directory = directory_with(vec![member.clone()]);

        directory.begin_edit(&member);

        assert_eq!(directory.editing(), Some("doc_7"));
        assert_eq!(directory.form().full_name, "Priya");
        assert_eq!(directory.form().email, "priya@example.com");
    }

    #[test]
    fn test_cancel_delete_disarms() {
        let mut directory = directory_with(Vec::new());

        directory.request_delete("doc_9");
        assert_eq!(directory.pending_delete(), Some("doc_9"));

        directory.cancel_delete();
        assert_eq!(directory.pending_delete(), None);
    }
}
