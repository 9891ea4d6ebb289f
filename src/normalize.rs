//! Text Normalizer Module
//!
//! ラベル照合用にセル文字列を正規化するモジュール。
//! 正規化結果は比較専用であり、表示用のデータには使用しません。

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// 比較用の正規形に変換する
///
/// 1. ノーブレークスペースを通常の空白に置換
/// 2. 前後の空白を除去し、連続する空白を1つに圧縮
/// 3. NFKD分解を行い、結合文字（アクセント記号）を除去
/// 4. 小文字化
///
/// ベトナム語の`đ`/`Đ`は分解されないため、個別に`d`へ畳み込みます。
///
/// # 使用例
///
/// ```rust
/// use ucdoc::normalize_text;
///
/// assert_eq!(normalize_text("  Tên\u{a0}Use-case "), "ten use-case");
/// assert_eq!(normalize_text("Độ   phức tạp"), "do phuc tap");
/// ```
pub fn normalize_text(text: &str) -> String {
    let collapsed = collapse_whitespace(text);
    collapsed
        .nfkd()
        .filter(|ch| !is_combining_mark(*ch))
        .map(|ch| match ch {
            'đ' | 'Đ' => 'd',
            other => other,
        })
        .flat_map(char::to_lowercase)
        .collect()
}

/// ヘッダー表示用に整形する（大文字・アクセントは保持）
pub fn clean_header(text: &str) -> String {
    collapse_whitespace(text)
}

fn collapse_whitespace(text: &str) -> String {
    text.replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
