use basket_model::{read_transactions, read_transactions_from_path, CsvOptions, ImportError};
use pretty_assertions::assert_eq;
use std::io::Write;

const HEADER: &str = "HSHD_NUM,BASKET_NUM,DATE,PRODUCT_NUM,DEPARTMENT,COMMODITY,SPEND,UNITS,STORE_R,WEEK_NUM,YEAR,AGE_RANGE,MARITAL,INCOME_RANGE,HOMEOWNER,CHILDREN";

#[test]
fn reads_typed_lines_and_normalizes_missing_demographics() {
    let csv = format!(
        "{HEADER}\n\
         1, 100 ,17-AUG-18,5001,FOOD,PRODUCE,5.25,2,EAST,33,2018,35-44,Married,50-74K,Homeowner,1\n\
         1,100,17-AUG-18,5002,NON-FOOD,HOUSEHOLD,3,1,EAST,33,2018,null,,50-74K,Renter,NULL\n"
    );

    let lines = read_transactions(csv.as_bytes(), &CsvOptions::default()).unwrap();
    assert_eq!(lines.len(), 2);

    let first = &lines[0];
    assert_eq!(first.basket_key(), (1, 100));
    assert_eq!(first.date, "17-AUG-18");
    assert_eq!(first.product, 5001);
    assert_eq!(first.spend, 5.25);
    assert_eq!(first.units, 2);
    assert_eq!(first.store_region, "EAST");
    assert_eq!(first.week, 33);
    assert_eq!(first.year, 2018);
    assert_eq!(first.demographics.age_range.token(), "35-44");
    assert_eq!(first.demographics.children.token(), "1");

    let second = &lines[1];
    assert!(second.demographics.age_range.is_null());
    assert!(second.demographics.marital_status.is_null());
    assert!(second.demographics.children.is_null());
    assert_eq!(second.demographics.homeowner.label(), "Renter");
}

#[test]
fn supports_alternate_delimiters() {
    let csv = format!(
        "{}\n2;7;01-JAN-19;1;FOOD;DAIRY;1.5;1;WEST;1;2019;19-24;Single;UNDER 35K;Renter;null\n",
        HEADER.replace(',', ";")
    );
    let lines = read_transactions(csv.as_bytes(), &CsvOptions { delimiter: b';' }).unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].household, 2);
    assert_eq!(lines[0].demographics.income_range.token(), "UNDER 35K");
}

#[test]
fn empty_input_is_rejected() {
    let err = read_transactions("".as_bytes(), &CsvOptions::default()).unwrap_err();
    assert!(matches!(err, ImportError::EmptyInput), "{err:?}");
}

#[test]
fn missing_column_is_reported_by_name() {
    let header = HEADER.replace(",CHILDREN", "");
    let err = read_transactions(header.as_bytes(), &CsvOptions::default()).unwrap_err();
    match err {
        ImportError::MissingColumn(name) => assert_eq!(name, "CHILDREN"),
        other => panic!("expected MissingColumn, got {other:?}"),
    }
}

#[test]
fn malformed_field_reports_its_row() {
    let csv = format!(
        "{HEADER}\n\
         1,100,17-AUG-18,5001,FOOD,PRODUCE,5.25,2,EAST,33,2018,35-44,Married,50-74K,Homeowner,1\n\
         1,100,17-AUG-18,5002,FOOD,PRODUCE,abc,1,EAST,33,2018,35-44,Married,50-74K,Homeowner,1\n"
    );
    let err = read_transactions(csv.as_bytes(), &CsvOptions::default()).unwrap_err();
    match err {
        ImportError::Parse { row, .. } => assert_eq!(row, 2),
        other => panic!("expected Parse, got {other:?}"),
    }
}

#[test]
fn reads_from_a_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{HEADER}").unwrap();
    writeln!(
        file,
        "3,9,02-FEB-20,77,FOOD,BAKERY,4,1,SOUTH,5,2020,45-54,Unknown,75-99K,Homeowner,3+"
    )
    .unwrap();
    file.flush().unwrap();

    let lines = read_transactions_from_path(file.path(), &CsvOptions::default()).unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].demographics.children.token(), "3+");
}

#[test]
fn missing_file_is_an_open_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does-not-exist.csv");
    let err = read_transactions_from_path(&path, &CsvOptions::default()).unwrap_err();
    assert!(matches!(err, ImportError::Open { .. }), "{err:?}");
}
