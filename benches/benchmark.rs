//! パフォーマンスベンチマーク
//!
//! 生成したワークブックに対して、読み込みから文書生成までの所要時間を測定します。
//!
//! - 階層パイプライン（統合表）: 20モジュール × 5グループ × 10 Use-case × 3行
//! - フラットパイプライン（Use-caseごとの表）: 同じ入力

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rust_xlsxwriter::{Workbook, XlsxError};
use std::io::Cursor;
use ucdoc::{ConverterBuilder, OutputLayout};

const MODULES: usize = 20;
const GROUPS: usize = 5;
const USE_CASES: usize = 10;
const LINES: usize = 3;

const ROMAN: [&str; 5] = ["I", "II", "III", "IV", "V"];

/// ベンチマーク用のワークブックを生成する
fn generate_workbook() -> Result<(Vec<u8>, usize), XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let header = ["STT", "Tên Use-case", "Tác nhân", "Giao dịch", "BMT", "Độ phức tạp"];
    for (col, label) in header.iter().enumerate() {
        worksheet.write_string(0, col as u16, *label)?;
    }

    let mut row: u32 = 1;
    let mut number = 1;
    for m in 0..MODULES {
        let letter = (b'A' + m as u8) as char;
        worksheet.write_string(row, 0, letter.to_string())?;
        worksheet.write_string(row, 1, format!("Phân hệ {}", letter))?;
        row += 1;

        for roman in ROMAN.iter().take(GROUPS) {
            worksheet.write_string(row, 0, *roman)?;
            worksheet.write_string(row, 1, format!("Nhóm {}", roman))?;
            row += 1;

            for _ in 0..USE_CASES {
                worksheet.write_number(row, 0, number as f64)?;
                worksheet.write_string(row, 1, format!("Use-case {}", number))?;
                worksheet.write_string(row, 2, "Người dùng")?;
                worksheet.write_string(row, 4, "B")?;
                worksheet.write_string(row, 5, "Trung bình")?;
                for line in 0..LINES {
                    worksheet.write_string(row, 3, format!("Bước {}", line + 1))?;
                    row += 1;
                }
                number += 1;
            }
        }
    }

    Ok((workbook.save_to_buffer()?, row as usize))
}

fn benchmark_pipelines(c: &mut Criterion) {
    let (data, rows) = match generate_workbook() {
        Ok(generated) => generated,
        Err(e) => {
            eprintln!("Warning: Failed to generate workbook: {}. Skipping benchmark.", e);
            return;
        }
    };

    let mut group = c.benchmark_group("pipelines");
    group.throughput(Throughput::Elements(rows as u64));

    for (name, layout) in [
        ("consolidated", OutputLayout::Consolidated),
        ("per_use_case", OutputLayout::PerUseCase),
    ] {
        let converter = match ConverterBuilder::new().with_layout(layout).build() {
            Ok(converter) => converter,
            Err(e) => {
                eprintln!("Warning: Failed to build converter: {}. Skipping benchmark.", e);
                continue;
            }
        };

        group.bench_function(name, |b| {
            b.iter(|| {
                let mut output = Vec::new();
                let report = converter
                    .convert(Cursor::new(black_box(&data)), &mut output)
                    .expect("conversion failed");
                black_box((report, output));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_pipelines);
criterion_main!(benches);
