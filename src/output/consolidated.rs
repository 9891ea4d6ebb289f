//! Consolidated Renderer
//!
//! 文書ツリー全体を1つの6列の表に出力します。
//! モジュール行は薄緑、番号付きグループ行は薄青で塗りつぶします。

use super::document::{DocumentBuilder, Paragraph, Run, Table, TableCell};
use crate::columns::CanonicalField;
use crate::types::{Module, UseCase};

const MODULE_FILL: &str = "D9EAD3";
const GROUP_FILL: &str = "D9E1F2";

pub(super) fn render(doc: &mut DocumentBuilder, modules: &[Module]) {
    let mut table = Table::new(CanonicalField::ALL.len());

    table.add_row(
        CanonicalField::ALL
            .iter()
            .map(|field| TableCell::new(bold(field.label()).centered()))
            .collect(),
    );

    for module in modules {
        table.add_row(vec![
            TableCell::new(bold(&module.code).centered()).shaded(MODULE_FILL),
            TableCell::new(bold(&module.name)).shaded(MODULE_FILL),
            TableCell::empty().shaded(MODULE_FILL),
            TableCell::empty().shaded(MODULE_FILL),
            TableCell::empty().shaded(MODULE_FILL),
            TableCell::empty().shaded(MODULE_FILL),
        ]);

        for group in &module.groups {
            if let Some(code) = &group.code {
                table.add_row(vec![
                    TableCell::new(bold(code).centered()).shaded(GROUP_FILL),
                    TableCell::new(bold(&group.name)).shaded(GROUP_FILL),
                    TableCell::empty().shaded(GROUP_FILL),
                    TableCell::empty().shaded(GROUP_FILL),
                    TableCell::empty().shaded(GROUP_FILL),
                    TableCell::empty().shaded(GROUP_FILL),
                ]);
            }
            for use_case in &group.use_cases {
                add_use_case_rows(&mut table, use_case);
            }
        }
    }

    doc.add_table(table);
}

/// Use-case 1件をトランザクション行ごとに出力する
///
/// 識別情報は先頭行のみに記載し、トランザクションがなくても1行は出力します。
fn add_use_case_rows(table: &mut Table, use_case: &UseCase) {
    let first = use_case.transactions.first().map(String::as_str).unwrap_or("");
    table.add_row(vec![
        TableCell::new(plain(&use_case.code).centered()),
        TableCell::new(plain(&use_case.name)),
        TableCell::new(plain(&use_case.actor)),
        TableCell::new(plain(first)),
        TableCell::new(plain(&use_case.business_measure).centered()),
        TableCell::new(plain(&use_case.complexity).centered()),
    ]);

    for line in use_case.transactions.iter().skip(1) {
        table.add_row(vec![
            TableCell::empty(),
            TableCell::empty(),
            TableCell::empty(),
            TableCell::new(plain(line)),
        ]);
    }
}

fn plain(text: &str) -> Paragraph {
    Paragraph::new().with_run(Run::new(text))
}

fn bold(text: &str) -> Paragraph {
    Paragraph::new().with_run(Run::new(text).bold())
}
