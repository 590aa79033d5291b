use centre_extract::*;
use pretty_assertions::assert_eq;

#[test]
fn test_extract_date() {
    let body = "Booking confirmed.\nDate: 2024-03-15 09:30:00\nPlease arrive early.";
    let fields = extract_fields(body);

    assert_eq!(fields.date, "2024-03-15 09:30:00");
}

#[test]
fn test_extract_date_without_space_after_label() {
    let fields = extract_fields("Date:2024-03-15   09:30:00");
    assert_eq!(fields.date, "2024-03-15   09:30:00");
}

#[test]
fn test_extract_centre_trims_whitespace() {
    let body = "Test Centre:   London Bridge  \nDate: 2024-03-15 09:30:00";
    let fields = extract_fields(body);

    assert_eq!(fields.centre, "London Bridge");
}

#[test]
fn test_extract_centre_stops_at_end_of_line() {
    let fields = extract_fields("Test Centre: Oxford\nNext-Line: ignored");
    assert_eq!(fields.centre, "Oxford");
}

#[test]
fn test_extract_centre_crlf() {
    let fields = extract_fields("Test Centre: Leeds\r\nDate: 2024-01-01 00:00:00\r\n");
    assert_eq!(fields.centre, "Leeds");
    assert_eq!(fields.date, "2024-01-01 00:00:00");
}

#[test]
fn test_no_match_yields_sentinel() {
    let fields = extract_fields("Hello, nothing to see here.");

    assert_eq!(fields.date, NOT_FOUND);
    assert_eq!(fields.centre, NOT_FOUND);
    assert!(!fields.is_complete());
}

#[test]
fn test_fields_are_independent() {
    let only_centre = extract_fields("Test Centre: Bristol");
    assert_eq!(only_centre.date, NOT_FOUND);
    assert_eq!(only_centre.centre, "Bristol");

    let only_date = extract_fields("Date: 2023-12-31 23:59:59");
    assert_eq!(only_date.date, "2023-12-31 23:59:59");
    assert_eq!(only_date.centre, NOT_FOUND);
}

#[test]
fn test_first_occurrence_wins() {
    let body = "Date: 2024-01-01 08:00:00\n\
                Test Centre: First\n\
                Date: 2025-02-02 09:00:00\n\
                Test Centre: Second\n";
    let fields = extract_fields(body);

    assert_eq!(fields.date, "2024-01-01 08:00:00");
    assert_eq!(fields.centre, "First");
    assert!(fields.is_complete());
}

#[test]
fn test_malformed_date_is_skipped_for_later_match() {
    let body = "Date: Thu, 01 Jan 2025 12:00:00 +0000\nDate: 2025-01-01 12:00:00";
    assert_eq!(extract_fields(body).date, "2025-01-01 12:00:00");
}

#[test]
fn test_date_requires_strict_digits() {
    assert_eq!(extract_fields("Date: 24-03-15 09:30:00").date, NOT_FOUND);
    assert_eq!(extract_fields("Date: 2024-3-15 09:30:00").date, NOT_FOUND);
    assert_eq!(extract_fields("Date: 2024-03-15 9:30:00").date, NOT_FOUND);
}

#[test]
fn test_empty_centre_line_is_not_a_match() {
    let fields = extract_fields("Test Centre:   \nSomething else");
    assert_eq!(fields.centre, NOT_FOUND);
}

#[test]
fn test_first_centre_label_wins_even_when_blank() {
    assert_eq!(extract_fields("Test Centre:\nTest Centre: Second").centre, NOT_FOUND);
    assert_eq!(extract_fields("Test Centre: \nTest Centre: Second").centre, NOT_FOUND);
    assert_eq!(extract_fields("Test Centre:\t\r\nTest Centre: Second").centre, NOT_FOUND);
}

#[test]
fn test_extraction_is_idempotent() {
    let body = "Date: 2024-03-15 09:30:00\nTest Centre: London Bridge";
    assert_eq!(extract_fields(body), extract_fields(body));
}

#[test]
fn test_record_from_message() {
    let message = Message::new(
        "Your booking",
        MessageBody::Single(MessagePart::PlainText(
            "Date: 2024-03-15 09:30:00\nTest Centre: Croydon\n".to_string(),
        )),
    );
    let record = ExtractedRecord::from_message(&message).unwrap();

    assert_eq!(
        record,
        ExtractedRecord::new("Your booking", "2024-03-15 09:30:00", "Croydon")
    );
    assert_eq!(record.as_row(), ["Your booking", "2024-03-15 09:30:00", "Croydon"]);
    assert!(!record.is_empty());
}

#[test]
fn test_record_without_fields_is_empty() {
    let message = Message::new(
        "Newsletter",
        MessageBody::Single(MessagePart::PlainText("Hi there".to_string())),
    );
    let record = ExtractedRecord::from_message(&message).unwrap();

    assert!(record.is_empty());
    assert_eq!(record.to_string(), "Newsletter | N/A | N/A");
}
