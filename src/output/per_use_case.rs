//! Per-use-case Renderer
//!
//! レコードごとに黄色の見出しと固定の8行×2列の表を出力します。
//! 見出し・ラベルはベトナム語の定型文言をそのまま使用します。

use super::document::{DocumentBuilder, Paragraph, Run, Table, TableCell};
use crate::api::TitleNumbering;
use crate::types::FlatUseCaseRecord;

const LABEL_NAME: &str = "Tên Usecase:";
const LABEL_BUSINESS_MEASURE: &str = "Mức độ BMT:";
const LABEL_ACTOR: &str = "Tên tác nhân:";
const LABEL_COMPLEXITY: &str = "Độ phức tạp:";
const LABEL_EVENTS: &str = "Trình tự các sự kiện:";

/// 値を持たない全幅行のラベル（上から順に、イベント行は除く）
const LABEL_DESCRIPTION: &str = "Mô tả Usecase:";
const LABEL_PRE_CONDITION: &str = "Điều kiện để bắt đầu Use-case (Pre-Condition):";
const LABEL_POST_CONDITION: &str = "Điều kiện để kết thúc Use-case (Post Condition):";
const LABEL_NON_FUNCTIONAL: &str = "Các yêu cầu phi chức năng:";
const LABEL_ACTIVITY_DIAGRAM: &str = "Biểu đồ hoạt động (theo trình tự các sự kiện):";

pub(super) fn render(doc: &mut DocumentBuilder, records: &[FlatUseCaseRecord], numbering: TitleNumbering) {
    for (idx, record) in records.iter().enumerate() {
        let number = match numbering {
            TitleNumbering::SequenceCode => record.code,
            TitleNumbering::RunningIndex => idx as u64 + 1,
        };
        doc.add_paragraph(title(number, &record.name));
        doc.add_table(use_case_table(record));
        doc.add_empty_paragraph();
    }
}

/// `"<番号>. UC <名前の大文字>"`（太字・斜体・黄色の蛍光ペン）
fn title(number: u64, name: &str) -> Paragraph {
    Paragraph::new().with_run(
        Run::new(format!("{}. UC {}", number, name.to_uppercase()))
            .bold()
            .italic()
            .highlight("yellow"),
    )
}

fn label_value(label: &str, value: &str) -> Paragraph {
    Paragraph::new()
        .with_run(Run::new(format!("{} ", label)).bold())
        .with_run(Run::new(value))
}

fn use_case_table(record: &FlatUseCaseRecord) -> Table {
    let mut table = Table::new(2);
    table.add_row(vec![
        TableCell::new(label_value(LABEL_NAME, &record.name)),
        TableCell::new(label_value(LABEL_BUSINESS_MEASURE, &record.business_measure)),
    ]);
    table.add_row(vec![
        TableCell::new(label_value(LABEL_ACTOR, &record.actor)),
        TableCell::new(label_value(LABEL_COMPLEXITY, &record.complexity)),
    ]);
    table.add_merged_row(label_value(LABEL_DESCRIPTION, ""));
    table.add_merged_row(label_value(LABEL_PRE_CONDITION, ""));
    table.add_merged_row(label_value(LABEL_POST_CONDITION, ""));

    let mut events = Paragraph::new().with_run(Run::new(LABEL_EVENTS).bold());
    if !record.transaction.is_empty() {
        events = events.with_run(Run::new(format!("\n\n{}", record.transaction)));
    }
    table.add_merged_row(events);

    table.add_merged_row(label_value(LABEL_NON_FUNCTIONAL, ""));
    table.add_merged_row(label_value(LABEL_ACTIVITY_DIAGRAM, ""));
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> FlatUseCaseRecord {
        FlatUseCaseRecord {
            code: 7,
            name: "Đăng nhập".to_string(),
            actor: "User".to_string(),
            business_measure: "B".to_string(),
            complexity: "Đơn giản".to_string(),
            transaction: "Enter creds\nClick submit".to_string(),
        }
    }

    #[test]
    fn test_title_uppercases_name() {
        let paragraph = title(3, "Đăng nhập");
        assert_eq!(paragraph.text(), "3. UC ĐĂNG NHẬP");
        assert!(paragraph.runs[0].bold && paragraph.runs[0].italic);
        assert_eq!(paragraph.runs[0].highlight, Some("yellow"));
    }

    #[test]
    fn test_table_shape() {
        let table = use_case_table(&record());
        assert_eq!(table.rows().len(), 8);
        assert_eq!(table.rows()[0].len(), 2);
        assert_eq!(table.rows()[1].len(), 2);
        for row in &table.rows()[2..] {
            assert_eq!(row.len(), 1);
            assert_eq!(row[0].span, 2);
        }
        assert_eq!(table.rows()[0][0].paragraph.text(), "Tên Usecase: Đăng nhập");
        assert_eq!(table.rows()[1][1].paragraph.text(), "Độ phức tạp: Đơn giản");
    }

    #[test]
    fn test_event_cell_lists_transactions() {
        let table = use_case_table(&record());
        assert_eq!(
            table.rows()[5][0].paragraph.text(),
            "Trình tự các sự kiện:\n\nEnter creds\nClick submit"
        );

        let empty = FlatUseCaseRecord {
            transaction: String::new(),
            ..record()
        };
        let table = use_case_table(&empty);
        assert_eq!(table.rows()[5][0].paragraph.text(), "Trình tự các sự kiện:");
    }

    #[test]
    fn test_title_numbering() {
        let records = vec![record(), FlatUseCaseRecord { code: 9, ..record() }];

        let titles = |numbering| {
            let mut doc = DocumentBuilder::new(Default::default());
            render(&mut doc, &records, numbering);
            assert_eq!(doc.table_count(), 2);
            doc.paragraphs()
                .map(Paragraph::text)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
        };

        assert_eq!(
            titles(TitleNumbering::SequenceCode),
            vec!["7. UC ĐĂNG NHẬP", "9. UC ĐĂNG NHẬP"]
        );
        assert_eq!(
            titles(TitleNumbering::RunningIndex),
            vec!["1. UC ĐĂNG NHẬP", "2. UC ĐĂNG NHẬP"]
        );
    }
}
