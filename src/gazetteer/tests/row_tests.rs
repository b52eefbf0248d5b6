//! Row normalization tests

use crate::gazetteer::header::{ClassifiedColumns, ColumnRef};
use crate::gazetteer::row::{
    DateKind, RowSkip, SheetContext, excel_serial_to_date, is_placeholder_code, normalize_name,
    normalize_row, title_case,
};
use crate::models::{AdminLevel, CellValue};
use chrono::NaiveDate;

fn column(index: usize, name: &str) -> ColumnRef {
    ColumnRef {
        index,
        name: name.to_string(),
    }
}

/// Level 2 context over `ADM2_PCODE, ADM2_FR, ADM1_PCODE, validOn`
fn level_two_context() -> SheetContext {
    SheetContext {
        country: "CMR".to_string(),
        level: AdminLevel::new(2).unwrap(),
        parent_level: AdminLevel::new(1),
        columns: ClassifiedColumns {
            code: column(0, "ADM2_PCODE"),
            name: column(1, "ADM2_FR"),
            parent: Some(column(2, "ADM1_PCODE")),
            date: Some(column(3, "validOn")),
        },
    }
}

fn row(cells: &[&str]) -> Vec<CellValue> {
    cells
        .iter()
        .map(|c| {
            if c.is_empty() {
                CellValue::Empty
            } else {
                CellValue::from(*c)
            }
        })
        .collect()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_normalize_typical_row() {
    let context = level_two_context();
    let pcode = normalize_row(
        &row(&["CM032", "Adamaoua", "CM03", "2019-06-01"]),
        &context,
        "2020-01-01",
    )
    .unwrap();

    assert_eq!(pcode.location, "CMR");
    assert_eq!(pcode.admin_level, "2");
    assert_eq!(pcode.code, "CM032");
    assert_eq!(pcode.name, "Adamaoua");
    assert_eq!(pcode.parent_code, "CM03");
    assert_eq!(pcode.valid_from_date, "2019-06-01");
}

#[test]
fn test_comment_marker_skips_row() {
    let context = level_two_context();
    let result = normalize_row(
        &row(&["#REF", "Adamaoua", "CM03", "2019-06-01"]),
        &context,
        "2019-06-01",
    );
    assert_eq!(result, Err(RowSkip::CommentMarker));

    let result = normalize_row(
        &row(&["#adm2+code", "#adm2+name", "#adm1+code", "#date"]),
        &context,
        "2019-06-01",
    );
    assert_eq!(result, Err(RowSkip::CommentMarker));
}

#[test]
fn test_placeholder_codes_skip_row() {
    let context = level_two_context();
    for code in ["", "-", "None", " not reported "] {
        let result = normalize_row(
            &row(&[code, "Adamaoua", "CM03", "2019-06-01"]),
            &context,
            "2019-06-01",
        );
        assert_eq!(result, Err(RowSkip::PlaceholderCode), "code {:?}", code);
    }
}

#[test]
fn test_missing_name_skips_row() {
    let context = level_two_context();
    let result = normalize_row(&row(&["CM032", "", "CM03"]), &context, "2019-06-01");
    assert_eq!(result, Err(RowSkip::MissingName));

    let nan = vec![
        CellValue::from("CM032"),
        CellValue::Float(f64::NAN),
        CellValue::from("CM03"),
    ];
    assert_eq!(
        normalize_row(&nan, &context, "2019-06-01"),
        Err(RowSkip::MissingName)
    );
}

#[test]
fn test_short_row_reads_missing_cells_as_empty() {
    let context = level_two_context();
    let pcode = normalize_row(&row(&["CM032", "Djerem"]), &context, "2019-06-01").unwrap();

    assert_eq!(pcode.parent_code, "");
    assert_eq!(pcode.valid_from_date, "");
}

#[test]
fn test_level_one_parent_is_country() {
    let context = SheetContext {
        country: "CMR".to_string(),
        level: AdminLevel::new(1).unwrap(),
        parent_level: None,
        columns: ClassifiedColumns {
            code: column(0, "ADM1_PCODE"),
            name: column(1, "ADM1_FR"),
            parent: None,
            date: None,
        },
    };

    let pcode = normalize_row(&row(&["CM03", "ADAMAOUA"]), &context, "2019-06-01").unwrap();

    assert_eq!(pcode.parent_code, pcode.location);
    assert_eq!(pcode.name, "Adamaoua");
    assert_eq!(pcode.valid_from_date, "2019-06-01");
}

#[test]
fn test_numeric_codes_render_without_decimals() {
    let context = level_two_context();
    let cells = vec![
        CellValue::Float(1201.0),
        CellValue::from("Ville"),
        CellValue::Int(12),
        CellValue::Float(43617.0),
    ];

    let pcode = normalize_row(&cells, &context, "2020-01-01").unwrap();

    assert_eq!(pcode.code, "1201");
    assert_eq!(pcode.parent_code, "12");
    assert_eq!(pcode.valid_from_date, "2019-06-01");
}

#[test]
fn test_date_kinds() {
    let datetime = date(2019, 6, 1).and_hms_opt(0, 0, 0).unwrap();
    assert_eq!(
        DateKind::from_cell(&CellValue::DateTime(datetime)),
        DateKind::Calendar(date(2019, 6, 1))
    );
    assert_eq!(
        DateKind::from_cell(&CellValue::Int(43617)),
        DateKind::LegacyEpochOffset(43617)
    );
    assert_eq!(
        DateKind::from_cell(&CellValue::from("2019-06-01 00:00:00")),
        DateKind::Calendar(date(2019, 6, 1))
    );
    assert_eq!(
        DateKind::from_cell(&CellValue::from("June 2019")),
        DateKind::Unparsed("June 2019".to_string())
    );
    assert_eq!(
        DateKind::from_cell(&CellValue::Float(43617.5)),
        DateKind::Unparsed("43617.5".to_string())
    );
}

#[test]
fn test_date_rendering() {
    assert_eq!(DateKind::LegacyEpochOffset(43617).render(), "2019-06-01");
    assert_eq!(DateKind::LegacyEpochOffset(-3).render(), "-3");
    assert_eq!(DateKind::Calendar(date(2021, 11, 17)).render(), "2021-11-17");
    assert_eq!(DateKind::Unparsed("n/a".to_string()).render(), "n/a");
}

#[test]
fn test_excel_serial_to_date() {
    assert_eq!(excel_serial_to_date(1), Some(date(1900, 1, 1)));
    assert_eq!(excel_serial_to_date(59), Some(date(1900, 2, 28)));
    assert_eq!(excel_serial_to_date(61), Some(date(1900, 3, 1)));
    assert_eq!(excel_serial_to_date(43617), Some(date(2019, 6, 1)));
    assert_eq!(excel_serial_to_date(-1), None);
}

#[test]
fn test_is_placeholder_code() {
    assert!(is_placeholder_code(""));
    assert!(is_placeholder_code("  "));
    assert!(is_placeholder_code("-"));
    assert!(is_placeholder_code("NONE"));
    assert!(is_placeholder_code("Not Reported"));
    assert!(!is_placeholder_code("CM03"));
    assert!(!is_placeholder_code("0"));
}

#[test]
fn test_normalize_name_transliterates_and_title_cases() {
    assert_eq!(normalize_name("YAOUNDÉ"), "Yaounde");
    assert_eq!(normalize_name("mfoundi"), "Mfoundi");
    assert_eq!(normalize_name("NORD-OUEST"), "Nord-Ouest");
    assert_eq!(normalize_name("Mayo-Banyo"), "Mayo-Banyo");
    assert_eq!(normalize_name("Ségou"), "Segou");
    assert_eq!(normalize_name("McLean"), "McLean");
    assert_eq!(normalize_name("123"), "123");
}

#[test]
fn test_normalize_name_drops_non_latin_characters() {
    assert_eq!(normalize_name("Ереван"), "");
    assert_eq!(normalize_name("Kabul کابل"), "Kabul ");
}

#[test]
fn test_normalize_name_is_idempotent() {
    for raw in ["YAOUNDÉ", "l'extrême-nord", "Mayo-Banyo", "ÎLE DE GORÉE", "Ségou"] {
        let once = normalize_name(raw);
        assert_eq!(normalize_name(&once), once, "name {:?}", raw);
    }
}

#[test]
fn test_title_case() {
    assert_eq!(title_case("l'extreme-nord"), "L'Extreme-Nord");
    assert_eq!(title_case("ile de goree"), "Ile De Goree");
    assert_eq!(title_case("adm2 zone"), "Adm2 Zone");
}
