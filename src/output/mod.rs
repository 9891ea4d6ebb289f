//! Output Module
//!
//! 文書ツリーまたはフラットなレコード列をWord文書に描画するモジュール。
//! 描画方式はレイアウトごとのenumで表現します（Strategy Pattern）。

mod consolidated;
mod document;
mod per_use_case;

pub use document::{DocumentBuilder, Paragraph, Run, Table, TableCell};

use crate::api::{FontSpec, TitleNumbering};
use crate::types::{FlatUseCaseRecord, Module};

/// 描画オプション
#[derive(Debug, Clone)]
pub(crate) struct RenderOptions {
    pub font: FontSpec,
    pub title_numbering: TitleNumbering,
}

/// 描画方式（Strategy Pattern）
///
/// 上流パイプラインの出力形状ごとに1つのバリアントを持ちます。
#[derive(Debug, Clone, Copy)]
pub(crate) enum Renderer<'a> {
    /// Use-caseごとの見出しと8行×2列の表
    PerUseCase(&'a [FlatUseCaseRecord]),
    /// 全体を1つの6列の表にまとめる
    Consolidated(&'a [Module]),
}

impl Renderer<'_> {
    /// 文書を組み立てる
    pub fn render(&self, options: &RenderOptions) -> DocumentBuilder {
        let mut doc = DocumentBuilder::new(options.font.clone());
        match self {
            Renderer::PerUseCase(records) => {
                per_use_case::render(&mut doc, records, options.title_numbering)
            }
            Renderer::Consolidated(modules) => consolidated::render(&mut doc, modules),
        }
        doc
    }
}
