use std::fmt;

use super::{FormatError, RecordBuffer};

struct Failing;

impl fmt::Display for Failing {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        Err(fmt::Error)
    }
}

#[test]
fn append_reports_bytes_written() {
    let mut buffer = RecordBuffer::with_capacity(64);
    assert_eq!(buffer.append_fmt(format_args!("int {} str {}", 7, "x")), Ok(11));
    assert_eq!(buffer.as_bytes(), b"int 7 str x");
}

#[test]
fn limit_applies_per_call_not_per_buffer() {
    let mut buffer = RecordBuffer::with_capacity(4);
    assert_eq!(buffer.append_fmt(format_args!("abcd")), Ok(4));
    assert!(buffer.is_full());
    assert_eq!(buffer.append_fmt(format_args!("efgh")), Ok(4));
    assert_eq!(buffer.len(), 8);
}

#[test]
fn overflow_restores_previous_contents() {
    let mut buffer = RecordBuffer::with_capacity(5);
    buffer.push_bytes(b"keep");
    assert_eq!(
        buffer.append_fmt(format_args!("{}{}", "abc", "def")),
        Err(FormatError::Overflow { capacity: 5 })
    );
    assert_eq!(buffer.as_bytes(), b"keep");
}

#[test]
fn display_errors_are_not_overflow() {
    let mut buffer = RecordBuffer::with_capacity(64);
    assert_eq!(
        buffer.append_fmt(format_args!("a{}", Failing)),
        Err(FormatError::Fmt)
    );
    assert!(buffer.is_empty());
}

#[test]
fn rewind_keeps_capacity() {
    let mut buffer = RecordBuffer::with_capacity(32);
    buffer.append_fmt(format_args!("record")).unwrap();
    buffer.rewind();
    assert!(buffer.is_empty());
    assert_eq!(buffer.capacity(), 32);
}

#[test]
fn zero_capacity_is_clamped() {
    let mut buffer = RecordBuffer::with_capacity(0);
    assert_eq!(buffer.capacity(), 1);
    buffer.set_capacity(0);
    assert_eq!(buffer.capacity(), 1);
}
