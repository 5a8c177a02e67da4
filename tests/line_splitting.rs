// tests/line_splitting.rs

use proptest::prelude::*;

use tailrelay::relay::StreamKind;
use tailrelay::relay::lines::{
    ChunkDecoder, is_truncation_notice, split_keep_ends, split_strip_ends,
};
use tailrelay::types::Event;

#[test]
fn partial_lines_are_passed_on_immediately() {
    let mut dec = ChunkDecoder::new();
    assert_eq!(dec.push(b"one\ntwo").as_deref(), Some("one\ntwo"));
    assert_eq!(dec.pending_len(), 0);
    assert_eq!(dec.push(b" more\n").as_deref(), Some(" more\n"));
    assert_eq!(dec.finish(), None);
}

#[test]
fn empty_chunk_yields_nothing() {
    let mut dec = ChunkDecoder::new();
    assert_eq!(dec.push(b""), None);
}

#[test]
fn multibyte_character_split_across_reads() {
    let bytes = "caf\u{e9}\n".as_bytes();
    let (head, rest) = bytes.split_at(4);
    let mut dec = ChunkDecoder::new();
    assert_eq!(dec.push(head).as_deref(), Some("caf"));
    assert_eq!(dec.pending_len(), 1);
    assert_eq!(dec.push(rest).as_deref(), Some("\u{e9}\n"));
}

#[test]
fn four_byte_character_split_one_byte_at_a_time() {
    let bytes = "\u{1F600}".as_bytes();
    let mut dec = ChunkDecoder::new();
    for b in &bytes[..3] {
        assert_eq!(dec.push(std::slice::from_ref(b)), None);
    }
    assert_eq!(dec.pending_len(), 3);
    assert_eq!(dec.push(&bytes[3..]).as_deref(), Some("\u{1F600}"));
}

#[test]
fn dangling_sequence_is_flushed_at_end() {
    let mut dec = ChunkDecoder::new();
    assert_eq!(dec.push(b"ab\xe2\x82").as_deref(), Some("ab"));
    assert_eq!(dec.finish().as_deref(), Some("\u{fffd}"));
}

#[test]
fn invalid_utf8_is_replaced() {
    let mut dec = ChunkDecoder::new();
    let text = dec.push(b"bad \xff byte\n").unwrap();
    assert_eq!(text, "bad \u{fffd} byte\n");
}

#[test]
fn long_stream_without_newline_is_not_accumulated() {
    let mut dec = ChunkDecoder::new();
    let chunk = vec![b'a'; 1 << 20];
    for _ in 0..64 {
        let text = dec.push(&chunk).expect("chunk passed on");
        assert_eq!(text.len(), chunk.len());
        assert_eq!(dec.pending_len(), 0);
    }
}

#[test]
fn stray_continuation_bytes_are_not_carried() {
    let mut dec = ChunkDecoder::new();
    assert!(dec.push(b"x\x80\x80\x80\x80").is_some());
    assert_eq!(dec.pending_len(), 0);
}

#[test]
fn partial_line_becomes_unterminated_data_entry() {
    let event = StreamKind::Stdout.to_event("/f", "one\ntwo");
    assert_eq!(
        event,
        Event::Data {
            file: "/f".into(),
            lines: vec!["one\n".into(), "two".into()],
        }
    );
}

#[test]
fn keep_ends_splits_on_newline_only() {
    assert_eq!(
        split_keep_ends("a\nb\r\nc\n"),
        vec!["a\n".to_string(), "b\r\n".into(), "c\n".into()]
    );
    assert_eq!(split_keep_ends("x\ry\n"), vec!["x\ry\n".to_string()]);
}

#[test]
fn strip_ends_removes_line_terminators() {
    assert_eq!(
        split_strip_ends("a\nb\r\n"),
        vec!["a".to_string(), "b".into()]
    );
}

#[test]
fn truncation_notice_must_end_the_block() {
    assert!(is_truncation_notice("tail: /var/log/app.log: file truncated\n"));
    assert!(is_truncation_notice(
        "tail: other noise\ntail: /f: file truncated\n"
    ));
    assert!(!is_truncation_notice("tail: /f: file truncated\nmore\n"));
    assert!(!is_truncation_notice("tail: /f: file truncated"));
}

#[test]
fn stdout_text_becomes_data_with_line_ends() {
    let event = StreamKind::Stdout.to_event("/f", "one\ntwo\n");
    assert_eq!(
        event,
        Event::Data {
            file: "/f".into(),
            lines: vec!["one\n".into(), "two\n".into()],
        }
    );
}

#[test]
fn stderr_text_becomes_error_or_truncated() {
    assert_eq!(
        StreamKind::Stderr.to_event("/f", "tail: cannot open '/f'\n"),
        Event::Error {
            file: "/f".into(),
            lines: vec!["tail: cannot open '/f'".into()],
        }
    );
    assert_eq!(
        StreamKind::Stderr.to_event("/f", "tail: /f: file truncated\n"),
        Event::Truncated { file: "/f".into() }
    );
    // A truncation notice on stdout is just data.
    assert!(matches!(
        StreamKind::Stdout.to_event("/f", "tail: /f: file truncated\n"),
        Event::Data { .. }
    ));
}

proptest! {
    /// However the bytes are chunked, the concatenated output equals the
    /// input and no more than a partial character is ever carried over.
    #[test]
    fn chunking_does_not_change_text(
        text in "[a-z\u{e9}\u{4e2d}\u{1F600} \n]{0,64}",
        cuts in proptest::collection::vec(any::<prop::sample::Index>(), 0..8),
    ) {
        let bytes = text.as_bytes();

        let mut points: Vec<usize> = cuts.iter().map(|i| i.index(bytes.len() + 1)).collect();
        points.push(0);
        points.push(bytes.len());
        points.sort_unstable();
        points.dedup();

        let mut dec = ChunkDecoder::new();
        let mut out = String::new();
        for w in points.windows(2) {
            if let Some(decoded) = dec.push(&bytes[w[0]..w[1]]) {
                out.push_str(&decoded);
            }
            prop_assert!(dec.pending_len() <= 3);
        }
        prop_assert_eq!(dec.finish(), None);

        prop_assert!(!out.contains('\u{fffd}'), "output contains U+FFFD replacement character");
        prop_assert_eq!(out, text);
    }
}
