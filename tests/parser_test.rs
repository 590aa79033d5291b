use centre_extract::*;
use pretty_assertions::assert_eq;

#[test]
fn test_parse_single_part() {
    let raw = b"From: bookings@example.com\r\n\
                Subject: Booking confirmed\r\n\
                \r\n\
                Date: 2024-03-15 09:30:00\r\nTest Centre: London Bridge\r\n";

    let message = parse_message(raw).unwrap();

    assert_eq!(message.subject, "Booking confirmed");
    assert!(matches!(message.body, MessageBody::Single(_)));
    let body = extract_body(&message).unwrap();
    assert!(body.contains("Test Centre: London Bridge"));
}

#[test]
fn test_single_part_html_returned_verbatim() {
    let raw = b"Subject: Html only\r\n\
                Content-Type: text/html; charset=utf-8\r\n\
                \r\n\
                <p>Test Centre: Reading</p>";

    let message = parse_message(raw).unwrap();
    let body = extract_body(&message).unwrap();

    assert_eq!(body, "<p>Test Centre: Reading</p>");
    assert_eq!(extract_fields(&body).centre, "Reading</p>");
}

#[test]
fn test_multipart_first_plain_text_part() {
    let raw = b"Subject: Multi\r\n\
                MIME-Version: 1.0\r\n\
                Content-Type: multipart/mixed; boundary=\"XYZ\"\r\n\
                \r\n\
                --XYZ\r\n\
                Content-Type: text/html\r\n\
                \r\n\
                <b>Date: 1999-01-01 00:00:00</b>\r\n\
                --XYZ\r\n\
                Content-Type: text/plain\r\n\
                \r\n\
                Date: 2024-01-01 00:00:00\nTest Centre: X\r\n\
                --XYZ\r\n\
                Content-Type: text/plain\r\n\
                \r\n\
                second text part\r\n\
                --XYZ\r\n\
                Content-Type: application/pdf\r\n\
                Content-Transfer-Encoding: base64\r\n\
                \r\n\
                JVBERi0=\r\n\
                --XYZ--\r\n";

    let message = parse_message(raw).unwrap();
    assert!(matches!(message.body, MessageBody::Multi(_)));

    let body = extract_body(&message).unwrap();
    assert_eq!(body.trim_end(), "Date: 2024-01-01 00:00:00\nTest Centre: X");
}

#[test]
fn test_multipart_nested_alternative() {
    let raw = b"Subject: Nested\r\n\
                Content-Type: multipart/mixed; boundary=\"outer\"\r\n\
                \r\n\
                --outer\r\n\
                Content-Type: multipart/alternative; boundary=\"inner\"\r\n\
                \r\n\
                --inner\r\n\
                Content-Type: text/plain; charset=utf-8\r\n\
                \r\n\
                Test Centre: Nested Hall\r\n\
                --inner\r\n\
                Content-Type: text/html\r\n\
                \r\n\
                <p>Test Centre: Nested Hall</p>\r\n\
                --inner--\r\n\
                --outer\r\n\
                Content-Type: image/png\r\n\
                \r\n\
                png\r\n\
                --outer--\r\n";

    let message = parse_message(raw).unwrap();
    let MessageBody::Multi(parts) = &message.body else {
        panic!("expected multipart body");
    };

    assert_eq!(parts.len(), 3);
    assert!(parts[0].is_plain_text());
    assert_eq!(parts[1].content_type(), "text/html");
    assert_eq!(parts[2].content_type(), "image/png");
    assert_eq!(
        extract_body(&message).unwrap().trim_end(),
        "Test Centre: Nested Hall"
    );
}

#[test]
fn test_multipart_without_text_part() {
    let raw = b"Subject: Attachments only\r\n\
                Content-Type: multipart/mixed; boundary=\"B\"\r\n\
                \r\n\
                --B\r\n\
                Content-Type: text/html\r\n\
                \r\n\
                <p>hi</p>\r\n\
                --B--\r\n";

    let message = parse_message(raw).unwrap();
    let err = extract_body(&message).unwrap_err();

    assert!(matches!(err, ExtractError::NoTextContent));
    assert!(err.is_per_message());
}

#[test]
fn test_quoted_printable_body_decoded() {
    let raw = b"Subject: QP\r\n\
                Content-Type: text/plain; charset=utf-8\r\n\
                Content-Transfer-Encoding: quoted-printable\r\n\
                \r\n\
                Test Centre: Z=C3=BCrich\r\n";

    let message = parse_message(raw).unwrap();
    assert_eq!(extract_fields(&extract_body(&message).unwrap()).centre, "Z\u{fc}rich");
}

#[test]
fn test_invalid_utf8_in_other_part_is_lossy() {
    let raw = b"Subject: Binary\r\n\
                Content-Type: application/octet-stream\r\n\
                \r\n\
                Test Centre: Hull \xff\r\n";

    let message = parse_message(raw).unwrap();
    let body = extract_body(&message).unwrap();

    assert!(body.contains('\u{fffd}'));
    assert_eq!(extract_fields(&body).centre, "Hull \u{fffd}");
}

#[test]
fn test_encoded_subject_decoded() {
    let raw = b"Subject: =?UTF-8?B?Qm9va2luZyDinJM=?=\r\n\
                \r\n\
                body";

    let message = parse_message(raw).unwrap();
    assert_eq!(message.subject, "Booking \u{2713}");
}

#[test]
fn test_missing_subject_is_empty() {
    let message = parse_message(b"From: a@example.com\r\n\r\nbody").unwrap();
    assert_eq!(message.subject, "");
}

#[test]
fn test_bad_base64_is_decode_error() {
    let raw = b"Subject: Broken\r\n\
                Content-Type: text/plain\r\n\
                Content-Transfer-Encoding: base64\r\n\
                \r\n\
                !!!not base64!!!\r\n";

    let err = parse_message(raw).unwrap_err();
    assert!(matches!(err, ExtractError::Decode(_)));
    assert_eq!(err.exit_code(), 7);
}

#[test]
fn test_process_message() {
    let raw = b"Subject: Confirmation\r\n\
                \r\n\
                Date: 2024-03-15 09:30:00\r\nTest Centre: Camden\r\n";

    let record = process_message(raw).unwrap();
    assert_eq!(
        record,
        ExtractedRecord::new("Confirmation", "2024-03-15 09:30:00", "Camden")
    );
}
