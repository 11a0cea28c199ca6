//! Membership lifecycle logic
//!
//! Pure date computations: the expiry date implied by a start date and a
//! membership tier, and the two-valued status used for list display.
//! Nothing here touches the network or storage.

use chrono::{Local, Months, NaiveDate};
use std::fmt;

use crate::MembershipType;

/// 一覧表示用の二値ステータス
///
/// サーバーが返す三値の `membership_status` とは別物で、保存済みの
/// 終了日から描画のたびに導出する。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedStatus {
    Active,
    Expired,
}

impl DerivedStatus {
    /// バッジ表示用ラベル
    pub fn label(&self) -> &'static str {
        match self {
            DerivedStatus::Active => "Active",
            DerivedStatus::Expired => "Expired",
        }
    }
}

impl fmt::Display for DerivedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 会員種別ごとの有効期間を開始日に加算して終了日を計算
///
/// 月単位の加算はカレンダーに従い、加算先に存在しない日は月末へ丸める
/// （2025-01-31 の 1 ヶ月後は 2025-02-28、2024-02-29 の 1 年後は
/// 2025-02-28）。固定日数の加算ではない。
pub fn compute_end_date(start_date: NaiveDate, membership_type: MembershipType) -> NaiveDate {
    let months = match membership_type {
        MembershipType::Monthly => 1,
        MembershipType::Quarterly => 3,
        MembershipType::HalfYearly => 6,
        MembershipType::Yearly => 12,
    };

    start_date + Months::new(months)
}

/// 終了日から表示用ステータスを導出（基準日を指定）
///
/// 日付のみで比較する。終了日が基準日以降なら Active。
pub fn compute_status_on(end_date: NaiveDate, today: NaiveDate) -> DerivedStatus {
    if end_date >= today {
        DerivedStatus::Active
    } else {
        DerivedStatus::Expired
    }
}

/// 終了日から表示用ステータスを導出（今日基準）
pub fn compute_status(end_date: NaiveDate) -> DerivedStatus {
    compute_status_on(end_date, Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_end_date_offsets_per_tier() {
        let start = date(2025, 3, 10);

        assert_eq!(
            compute_end_date(start, MembershipType::Monthly),
            date(2025, 4, 10)
        );
        assert_eq!(
            compute_end_date(start, MembershipType::Quarterly),
            date(2025, 6, 10)
        );
        assert_eq!(
            compute_end_date(start, MembershipType::HalfYearly),
            date(2025, 9, 10)
        );
        assert_eq!(
            compute_end_date(start, MembershipType::Yearly),
            date(2026, 3, 10)
        );
    }

    #[test]
    fn test_end_date_clamps_to_month_end() {
        // 1 月 31 日の 1 ヶ月後は 2 月末
        assert_eq!(
            compute_end_date(date(2025, 1, 31), MembershipType::Monthly),
            date(2025, 2, 28)
        );
        assert_eq!(
            compute_end_date(date(2024, 1, 31), MembershipType::Monthly),
            date(2024, 2, 29)
        );
        assert_eq!(
            compute_end_date(date(2025, 8, 31), MembershipType::Quarterly),
            date(2025, 11, 30)
        );
    }

    #[test]
    fn test_end_date_leap_day_plus_year() {
        // うるう日の 1 年後は 2 月 28 日
        assert_eq!(
            compute_end_date(date(2024, 2, 29), MembershipType::Yearly),
            date(2025, 2, 28)
        );
    }

    #[test]
    fn test_end_date_year_rollover() {
        assert_eq!(
            compute_end_date(date(2025, 11, 20), MembershipType::Quarterly),
            date(2026, 2, 20)
        );
    }

    #[test]
    fn test_status_boundary_is_inclusive() {
        let today = date(2025, 6, 15);

        // 終了日 == 今日 は Active
        assert_eq!(compute_status_on(today, today), DerivedStatus::Active);
        // 終了日 == 昨日 は Expired
        assert_eq!(
            compute_status_on(date(2025, 6, 14), today),
            DerivedStatus::Expired
        );
        assert_eq!(
            compute_status_on(date(2025, 6, 16), today),
            DerivedStatus::Active
        );
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(DerivedStatus::Active.to_string(), "Active");
        assert_eq!(DerivedStatus::Expired.label(), "Expired");
    }
}
