//! Parser Module
//!
//! calamineを使用したスプレッドシート読み込みの実装。
//! 選択した1シートを、セル値を文字列化した密な2次元配列として取り出します。

mod workbook;

pub(crate) use workbook::WorkbookParser;
