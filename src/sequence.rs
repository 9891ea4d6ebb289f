//! Sequence Classifier Module
//!
//! STT（連番）セルを構文的に分類するモジュール。
//!
//! - Level1: 英大文字1文字（`A`, `B.`, `C)`）→ モジュール
//! - Level2: ローマ数字 I〜XX（大文字小文字を区別しない）→ グループ
//! - Level3: 整数（`1`, `2.`, `3)`, `4.0`）→ Use-case
//! - None: それ以外（継続行）

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static RE_LEVEL1: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z])[.)]?$").expect("valid level-1 pattern"));

static RE_LEVEL2: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(XVIII|XVII|XIII|VIII|XIV|XVI|XIX|III|XII|XV|XI|XX|IV|VI|VII|IX|II|I|V|X)[.)]?$")
        .expect("valid level-2 pattern")
});

static RE_LEVEL3: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)[.)]?$").expect("valid level-3 pattern"));

static RE_INTEGRAL_DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.0+$").expect("valid decimal pattern"));

/// I〜XXのローマ数字（インデックス + 1 が値）
const ROMAN_NUMERALS: [&str; 20] = [
    "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII", "XIII", "XIV",
    "XV", "XVI", "XVII", "XVIII", "XIX", "XX",
];

/// STTセルの分類結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SequenceCode {
    /// モジュール（英大文字1文字）
    Level1(char),
    /// グループ（正規化済みの大文字ローマ数字）
    Level2(String),
    /// Use-case（整数）
    Level3(u64),
    /// 連番なし（継続行）
    None,
}

/// 数値として読めるセル文字列を正規化する（`"1.0"` → `"1"`）
///
/// 整数でない小数（`"1.5"`）はトリムした文字列のまま返します。
pub fn normalize_sequence_text(raw: &str) -> String {
    let text = raw.trim();
    match RE_INTEGRAL_DECIMAL.captures(text) {
        Some(caps) => caps[1].to_string(),
        None => text.to_string(),
    }
}

/// 文脈を使わずにSTTセルを分類する
///
/// 判定は上から順に行われ、最初に一致した規則が採用されます。
/// 1文字のローマ数字（`I`, `V`, `X`）はLevel1として扱われるため、
/// 階層構築時は[`classify_in`]を使用してください。
///
/// # 使用例
///
/// ```rust
/// use ucdoc::{classify, SequenceCode};
///
/// assert_eq!(classify("B."), SequenceCode::Level1('B'));
/// assert_eq!(classify("iv"), SequenceCode::Level2("IV".to_string()));
/// assert_eq!(classify("1.0"), SequenceCode::Level3(1));
/// assert_eq!(classify("Bước 1"), SequenceCode::None);
/// ```
pub fn classify(raw: &str) -> SequenceCode {
    let text = normalize_sequence_text(raw);
    if text.is_empty() {
        return SequenceCode::None;
    }

    if let Some(caps) = RE_LEVEL1.captures(&text) {
        if let Some(letter) = caps[1].chars().next() {
            return SequenceCode::Level1(letter);
        }
    }

    if let Some(caps) = RE_LEVEL2.captures(&text) {
        return SequenceCode::Level2(caps[1].to_uppercase());
    }

    match parse_integer_code(&text) {
        Some(number) => SequenceCode::Level3(number),
        None => SequenceCode::None,
    }
}

/// 階層構築中の文脈
///
/// `I` / `V` / `X` の1文字は、モジュール記号ともローマ数字とも読めます。
/// 現在のモジュールで次に来るはずのグループ番号と一致する場合のみ
/// Level2として扱い、それ以外はLevel1とします。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifyContext {
    /// 現在のモジュール内で最後に開いた番号付きグループ
    pub last_group: Option<String>,
}

impl ClassifyContext {
    /// 次に期待されるグループ番号（グループがなければ`I`）
    pub fn expected_group(&self) -> Option<&'static str> {
        match &self.last_group {
            None => Some(ROMAN_NUMERALS[0]),
            Some(last) => ROMAN_NUMERALS
                .iter()
                .position(|r| r == last)
                .and_then(|idx| ROMAN_NUMERALS.get(idx + 1).copied()),
        }
    }
}

/// 文脈を考慮してSTTセルを分類する
pub fn classify_in(raw: &str, context: &ClassifyContext) -> SequenceCode {
    match classify(raw) {
        SequenceCode::Level1(letter @ ('I' | 'V' | 'X')) => {
            let numeral = letter.to_string();
            if context.expected_group() == Some(numeral.as_str()) {
                SequenceCode::Level2(numeral)
            } else {
                SequenceCode::Level1(letter)
            }
        }
        other => other,
    }
}

/// 整数のSTT値を取り出す（小数安全）
///
/// `"7"`, `"7.0"`, `"7."`, `"7)"` は`Some(7)`、
/// `"7.5"`, `"A"`, `""`は`None`になります。
pub fn parse_integer_code(raw: &str) -> Option<u64> {
    let text = normalize_sequence_text(raw);
    RE_LEVEL3
        .captures(&text)
        .and_then(|caps| caps[1].parse::<u64>().ok())
}

/// Use-case名の先頭にある番号を回収する
///
/// 先頭トークンが整数として読める場合、その番号と残りの名前を返します。
///
/// ```rust
/// use ucdoc::recover_from_name;
///
/// assert_eq!(recover_from_name("12. Đăng nhập"), Some((12, "Đăng nhập".to_string())));
/// assert_eq!(recover_from_name("Đăng nhập"), None);
/// ```
pub fn recover_from_name(name: &str) -> Option<(u64, String)> {
    let trimmed = name.trim();
    let (token, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, rest.trim()),
        None => (trimmed, ""),
    };
    parse_integer_code(token).map(|code| (code, rest.to_string()))
}

/// STT列のデータ品質レポート
///
/// 変換を止めることはなく、情報として報告されます。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SequenceReport {
    /// 整数として読めたSTTの件数
    pub total: usize,
    /// 2回以上出現した番号（昇順）
    pub duplicates: Vec<u64>,
    /// 連番の抜け（昇順）
    pub missing: Vec<u64>,
}

impl SequenceReport {
    /// STT値の並びを解析する
    ///
    /// ```rust
    /// use ucdoc::SequenceReport;
    ///
    /// let report = SequenceReport::analyze(["1", "2", "2", "4"]);
    /// assert_eq!(report.duplicates, vec![2]);
    /// assert_eq!(report.missing, vec![3]);
    /// ```
    pub fn analyze<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counts: BTreeMap<u64, usize> = BTreeMap::new();
        let mut total = 0;
        for value in values {
            if let Some(number) = parse_integer_code(value.as_ref()) {
                *counts.entry(number).or_default() += 1;
                total += 1;
            }
        }

        let duplicates = counts
            .iter()
            .filter(|(_, &count)| count > 1)
            .map(|(&number, _)| number)
            .collect();

        let distinct: Vec<u64> = counts.keys().copied().collect();
        let missing = distinct
            .windows(2)
            .flat_map(|pair| (pair[0] + 1)..pair[1])
            .collect();

        Self {
            total,
            duplicates,
            missing,
        }
    }

    /// 重複も欠番もないかどうか
    pub fn is_clean(&self) -> bool {
        self.duplicates.is_empty() && self.missing.is_empty()
    }
}
