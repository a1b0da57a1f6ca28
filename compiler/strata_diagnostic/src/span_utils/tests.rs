use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_newline_belongs_to_line_it_ends() {
    let lines = LineOffsetTable::build("line1\nline2\nline3");
    assert_eq!(lines.line(0), 1);
    assert_eq!(lines.line(5), 1);
    assert_eq!(lines.line(6), 2);
    assert_eq!(lines.line(12), 3);
    assert_eq!(lines.line_count(), 3);
}

#[test]
fn test_line_col() {
    let source = "abc\ndefgh\nij";
    assert_eq!(line_col(source, 0), (1, 1));
    assert_eq!(line_col(source, 2), (1, 3));
    assert_eq!(line_col(source, 4), (2, 1));
    assert_eq!(line_col(source, 7), (2, 4));
    assert_eq!(line_col(source, 11), (3, 2));
}

#[test]
fn test_columns_count_characters() {
    // 'x' starts at byte 3, the third character
    assert_eq!(line_col("é x", 3), (1, 3));
}

#[test]
fn test_offset_past_end_is_clamped() {
    assert_eq!(line_col("ab", 10), (1, 3));
    assert_eq!(line_col("", 0), (1, 1));
}

#[test]
fn test_span_start() {
    let source = "a\nbc";
    let lines = LineOffsetTable::build(source);
    assert_eq!(lines.span_start(source, Span::new(3, 4)), (2, 2));
}
