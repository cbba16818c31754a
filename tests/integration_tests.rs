//! Integration tests for csv-scout

use csv_scout::{
    Column, ColumnSchema, CsvReader, DataType, DatePreference, NewLine, Quote, SampleSize, ScoutError,
    Sniffer, ValueFormat,
};
use encoding_rs::{UTF_8, WINDOWS_1252};
use std::fs::File;
use std::io::Cursor;
use std::io::Write;
use tempfile::NamedTempFile;

fn read_all<R: std::io::Read + std::io::Seek>(reader: &mut CsvReader<R>) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    while let Some(row) = reader.read_record().unwrap() {
        rows.push(row.fields);
    }
    rows
}

#[test]
fn test_sniff_comma_delimited() {
    let data = b"name,age,city\nAlice,30,New York\nBob,25,Los Angeles\nCharlie,35,Chicago\n";
    let sniffer = Sniffer::new();

    let metadata = sniffer.sniff_bytes(data).unwrap();

    assert_eq!(metadata.dialect.delimiter, Some(','));
    assert!(metadata.dialect.header.has_header_row);
    assert_eq!(metadata.num_fields, 3);
    assert_eq!(metadata.fields, vec!["name", "age", "city"]);
}

#[test]
fn test_sniff_tab_delimited() {
    let data = b"name\tage\tcity\nAlice\t30\tNew York\nBob\t25\tLos Angeles\n";
    let sniffer = Sniffer::new();

    let metadata = sniffer.sniff_bytes(data).unwrap();

    assert_eq!(metadata.dialect.delimiter, Some('\t'));
    assert!(metadata.dialect.header.has_header_row);
    assert_eq!(metadata.num_fields, 3);
}

#[test]
fn test_sniff_semicolon_delimited() {
    let data = b"name;price;city\nAlice;1,50;Paris\nBob;2,75;Lyon\n";
    let metadata = Sniffer::new().sniff_bytes(data).unwrap();

    assert_eq!(metadata.dialect.delimiter, Some(';'));
    assert_eq!(metadata.num_fields, 3);
}

#[test]
fn test_sniff_pipe_delimited() {
    let data = b"name|age|city\nAlice|30|New York\nBob|25|Los Angeles\n";
    let metadata = Sniffer::new().sniff_bytes(data).unwrap();

    assert_eq!(metadata.dialect.delimiter, Some('|'));
}

#[test]
fn test_sniff_quoted_comma() {
    let data = b"ID,Name\n1,Alice\n2,\"Bob, Jr.\"\n";
    let metadata = Sniffer::new().sniff_bytes(data).unwrap();
    let dialect = &metadata.dialect;

    assert_eq!(dialect.delimiter, Some(','));
    assert_eq!(dialect.quote, Quote::Some('"'));
    assert!(dialect.has_header());
    assert_eq!(dialect.skip_rows(), 0);
    assert_eq!(dialect.newline, NewLine::Lf);

    let mut reader = CsvReader::open(Cursor::new(data.to_vec()), dialect, &Default::default()).unwrap();
    assert_eq!(reader.field_names(), ["ID", "Name"]);
    assert_eq!(read_all(&mut reader), vec![vec!["1", "Alice"], vec!["2", "Bob, Jr."]]);
}

#[test]
fn test_sniff_quoted_fields() {
    let data = b"\"name\",\"value\"\n\"hello, world\",\"123\"\n\"test\",\"456\"\n";
    let metadata = Sniffer::new().sniff_bytes(data).unwrap();

    assert_eq!(metadata.dialect.delimiter, Some(','));
    assert_eq!(metadata.dialect.quote, Quote::Some('"'));
    assert_eq!(metadata.fields, vec!["name", "value"]);
    assert_eq!(metadata.types(), vec![DataType::String, DataType::Integer]);
}

#[test]
fn test_sniff_no_quotes() {
    let data = b"left,right\nx,1\ny,2\n";
    let metadata = Sniffer::new().sniff_bytes(data).unwrap();

    assert_eq!(metadata.dialect.quote, Quote::None);
}

#[test]
fn test_sniff_crlf_line_endings() {
    let data = b"name,age\r\nAlice,30\r\nBob,25\r\n";
    let metadata = Sniffer::new().sniff_bytes(data).unwrap();

    assert_eq!(metadata.dialect.newline, NewLine::CrLf);
    assert_eq!(metadata.fields, vec!["name", "age"]);
}

#[test]
fn test_sniff_type_detection() {
    let data = b"id,price,active,created\n\
        1,9.99,true,2023-01-15\n\
        2,12.50,false,2023-02-20\n\
        3,0.75,true,2023-03-01\n\
        4,100.00,false,2023-12-31\n";
    let metadata = Sniffer::new().sniff_bytes(data).unwrap();

    assert_eq!(
        metadata.types(),
        vec![DataType::Integer, DataType::Numeric, DataType::Boolean, DataType::DateTime]
    );
    let created = metadata.columns.get("created").unwrap();
    assert_eq!(created.format.describe(), "DateTime (yyyy-MM-dd)");
    assert_eq!(metadata.records_sampled, 4);
}

#[test]
fn test_sniff_null_literals_skipped() {
    let data = b"code,amount\nA,10\nB,NULL\nC,n/a\nD,\nE,25\n";
    let metadata = Sniffer::new().sniff_bytes(data).unwrap();

    assert_eq!(metadata.columns.get("amount").unwrap().format.data_type, DataType::Integer);
}

#[test]
fn test_sniff_date_preference() {
    let data = b"day,value\n01/02/2023,a\n03/04/2023,b\n05/06/2023,c\n";

    let metadata = Sniffer::new().sniff_bytes(data).unwrap();
    let day = metadata.columns.get("day").unwrap();
    assert_eq!(day.format.date_format, "MM/dd/yyyy");

    let mut sniffer = Sniffer::new();
    sniffer.date_preference(DatePreference::DmyFormat);
    let metadata = sniffer.sniff_bytes(data).unwrap();
    let day = metadata.columns.get("day").unwrap();
    assert_eq!(day.format.date_format, "dd/MM/yyyy");
}

#[test]
fn test_sniff_unambiguous_day_first() {
    let data = b"day,value\n13/01/2023,a\n25/12/2023,b\n01/02/2023,c\n";
    let metadata = Sniffer::new().sniff_bytes(data).unwrap();

    let day = metadata.columns.get("day").unwrap();
    assert_eq!(day.format.data_type, DataType::DateTime);
    assert_eq!(day.format.date_format, "dd/MM/yyyy");
}

#[test]
fn test_sniff_links_time_column() {
    let data = b"day,time,amount\n2024-01-05,08:30,1\n2024-01-06,17:45,2\n2024-01-07,09:00,3\n";
    let metadata = Sniffer::new().sniff_bytes(data).unwrap();

    let day = metadata.columns.get("day").unwrap();
    assert_eq!(day.time_part.as_deref(), Some("time"));
    assert_eq!(day.time_part_format, "HH:mm");
    assert!(metadata.columns.get("time").unwrap().ignore);
    assert!(!metadata.columns.get("amount").unwrap().ignore);
}

#[test]
fn test_sniff_preamble_rows() {
    let data = b"Quarterly export\nGenerated: today\n\n\
        id,name,score\n1,a,5\n2,b,6\n3,c,7\n4,d,8\n5,e,9\n";
    let metadata = Sniffer::new().sniff_bytes(data).unwrap();

    assert_eq!(metadata.dialect.delimiter, Some(','));
    assert_eq!(metadata.dialect.skip_rows(), 3);
    assert!(metadata.dialect.has_header());
    assert_eq!(metadata.fields, vec!["id", "name", "score"]);
    assert_eq!(metadata.records_sampled, 5);
}

#[test]
fn test_sniff_comment_lines() {
    let data = b"# exported 2024-05-01\nregion,total\nnorth,10\n# subtotal\nsouth,20\n";
    let metadata = Sniffer::new().sniff_bytes(data).unwrap();

    assert_eq!(metadata.dialect.comment_prefix, "#");
    assert_eq!(metadata.fields, vec!["region", "total"]);

    let mut reader = CsvReader::open(Cursor::new(data.to_vec()), &metadata.dialect, &Default::default()).unwrap();
    assert_eq!(read_all(&mut reader), vec![vec!["north", "10"], vec!["south", "20"]]);
}

#[test]
fn test_sniff_json_content() {
    let metadata = Sniffer::new().sniff_bytes(b"{\"name\": \"Alice\"}\n").unwrap();
    assert!(metadata.is_json);
    assert_eq!(metadata.num_fields, 0);

    let mut sniffer = Sniffer::new();
    sniffer.guess_json(false);
    let metadata = sniffer.sniff_bytes(b"[{\"a\": 1}]\n").unwrap();
    assert!(!metadata.is_json);
    assert_eq!(metadata.num_fields, 1);
}

#[test]
fn test_sniff_empty_input() {
    let result = Sniffer::new().sniff_bytes(b"");
    assert!(matches!(result, Err(ScoutError::EmptyData)));
}

#[test]
fn test_sniff_single_column() {
    let data = b"Amount\n10\n20\n30\n";
    let metadata = Sniffer::new().sniff_bytes(data).unwrap();

    assert_eq!(metadata.dialect.delimiter, None);
    assert!(metadata.dialect.has_header());
    assert_eq!(metadata.fields, vec!["Amount"]);
    assert_eq!(metadata.types(), vec![DataType::Integer]);
}

#[test]
fn test_sniff_with_hints() {
    let data = b"a;b\n1;2\n3;4\n";
    let mut sniffer = Sniffer::new();
    sniffer.delimiter(';').has_header(false).quote(Quote::Some('\''));

    let metadata = sniffer.sniff_bytes(data).unwrap();

    assert_eq!(metadata.dialect.delimiter, Some(';'));
    assert_eq!(metadata.dialect.quote, Quote::Some('\''));
    assert!(!metadata.dialect.has_header());
    assert_eq!(metadata.fields, vec!["Column1", "Column2"]);
}

#[test]
fn test_sniff_column_hints_upgraded() {
    let mut hints = ColumnSchema::new();
    let mut amount = Column::new("amount", 1, ValueFormat::of(DataType::Double));
    amount.ignore = true;
    hints.add(amount);

    let mut sniffer = Sniffer::new();
    sniffer.column_hints(hints);
    let metadata = sniffer.sniff_bytes(b"item,amount\npen,3\nbook,12\n").unwrap();

    let amount = metadata.columns.get("amount").unwrap();
    assert_eq!(amount.format.data_type, DataType::Integer);
    assert!(amount.ignore);
}

#[test]
fn test_sniff_without_type_guessing() {
    let mut sniffer = Sniffer::new();
    sniffer.guess_types(false);
    let metadata = sniffer.sniff_bytes(b"id,name\n1,Ann\n2,Bea\n").unwrap();

    assert_eq!(metadata.num_fields, 2);
    assert!(metadata.columns.is_empty());
    assert_eq!(metadata.records_sampled, 0);
}

#[test]
fn test_sample_size_records() {
    let mut data = String::from("id,name\n");
    for i in 0..500 {
        data.push_str(&format!("{i},name{i}\n"));
    }
    let mut sniffer = Sniffer::new();
    sniffer.sample_size(SampleSize::Records(20));

    let metadata = sniffer.sniff_bytes(data.as_bytes()).unwrap();
    assert_eq!(metadata.dialect.delimiter, Some(','));
    assert_eq!(metadata.types(), vec![DataType::Integer, DataType::String]);
}

#[test]
fn test_sniff_path() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file, "name,age,city").unwrap();
    writeln!(temp_file, "Alice,30,NYC").unwrap();
    writeln!(temp_file, "Bob,25,LA").unwrap();
    temp_file.flush().unwrap();

    let metadata = Sniffer::new().sniff_path(temp_file.path()).unwrap();

    assert_eq!(metadata.dialect.delimiter, Some(','));
    assert_eq!(metadata.num_fields, 3);
}

#[test]
fn test_sniff_missing_path() {
    let result = Sniffer::new().sniff_path("/nonexistent/file.csv");
    assert!(matches!(result, Err(ScoutError::Io(_))));
}

#[test]
fn test_sniff_utf8_bom() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"\xEF\xBB\xBFid,name\n1,Ann\n2,Bea\n").unwrap();
    temp_file.flush().unwrap();

    let metadata = Sniffer::new().sniff_path(temp_file.path()).unwrap();
    assert_eq!(metadata.dialect.encoding, UTF_8);
    assert!(metadata.dialect.has_bom);
    assert_eq!(metadata.fields, vec!["id", "name"]);
}

#[test]
fn test_sniff_legacy_code_page() {
    let (bytes, _, _) = WINDOWS_1252.encode("name,city\nJosé,Zürich\nFrançois,Genève\nAndré,Besançon\n");
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(&bytes).unwrap();
    temp_file.flush().unwrap();

    let metadata = Sniffer::new().sniff_path(temp_file.path()).unwrap();
    assert_ne!(metadata.dialect.encoding, UTF_8);
    assert!(!metadata.dialect.is_utf8());

    let file = File::open(temp_file.path()).unwrap();
    let mut reader = CsvReader::open(file, &metadata.dialect, &Default::default()).unwrap();
    let first = reader.read_record().unwrap().unwrap();
    assert_eq!(first.fields, vec!["José", "Zürich"]);
}

#[test]
fn test_sniff_dialect_only() {
    let mut cursor = Cursor::new(b"a|b|c\nx|y|z\n".to_vec());
    let dialect = Sniffer::new().sniff_dialect(&mut cursor).unwrap().unwrap();

    assert_eq!(dialect.delimiter, Some('|'));
    assert_eq!(cursor.position(), 0);
}
