pub mod records;
pub mod share;
pub mod templates;
pub mod transfer;

pub use records::*;
pub use share::*;
pub use templates::*;
pub use transfer::*;

use crate::storage::{PayloadSource, StdinPayload, TextPayload};
use anyhow::Result;

/// 引数のテキスト、省略時は標準入力を読み込む
pub async fn read_pasted(text: Option<String>) -> Result<String> {
    match text {
        Some(text) => TextPayload(text).read_text().await,
        None => StdinPayload.read_text().await,
    }
}
