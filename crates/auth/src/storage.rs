//! Durable profile persistence
//!
//! Stores the signed-in profile as one JSON record under a well-known
//! storage key so the session survives a restart. Storage failures are
//! reported as boolean results and logged, never propagated.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// 永続化プロフィールのストレージキー
pub const USER_PROFILE_KEY: &str = "user_profile";

/// 永続化されるプロフィールレコード
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProfile {
    pub name: String,
    pub email: String,
    pub token: String,
    pub user_id: String,
}

/// プロフィールの永続化ストレージ
///
/// ストレージ障害（ディレクトリ不可、壊れたファイル）は「セッションなし」
/// へ縮退させる。呼び出し側にエラーを投げない。
#[derive(Debug, Clone)]
pub struct ProfileStorage {
    dir: PathBuf,
}

impl ProfileStorage {
    /// 指定ディレクトリの下にストレージを作成
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn profile_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", USER_PROFILE_KEY))
    }

    /// プロフィールを保存
    pub fn save(&self, profile: &StoredProfile) -> bool {
        let json = match serde_json::to_string(profile) {
            Ok(json) => json,
            Err(err) => {
                log::error!("failed to serialize profile: {}", err);
                return false;
            }
        };

        if let Err(err) = fs::create_dir_all(&self.dir) {
            log::error!("failed to create storage dir: {}", err);
            return false;
        }

        match fs::write(self.profile_path(), json) {
            Ok(()) => true,
            Err(err) => {
                log::error!("failed to persist profile: {}", err);
                false
            }
        }
    }

    /// プロフィールを読み込み
    ///
    /// ファイルが無い・壊れている場合は「セッションなし」として `None`。
    pub fn load(&self) -> Option<StoredProfile> {
        let data = fs::read_to_string(self.profile_path()).ok()?;
        serde_json::from_str(&data).ok()
    }

    /// プロフィールを削除
    pub fn clear(&self) -> bool {
        match fs::remove_file(self.profile_path()) {
            Ok(()) => true,
            // 未保存なら消すものがないだけ
            Err(err) if err.kind() == ErrorKind::NotFound => true,
            Err(err) => {
                log::error!("failed to clear profile: {}", err);
                false
            }
        }
    }
}
