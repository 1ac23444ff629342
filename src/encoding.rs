//! Text/byte conversions driven by an encoding label such as `"utf-8"` or
//! `"latin1"`.
//!
//! Labels are resolved with [`Encoding::for_label`], so every WHATWG alias is
//! accepted, with two exceptions. WHATWG folds the ISO-8859-1 and US-ASCII
//! labels into windows-1252; here they keep their own meaning: ISO-8859-1
//! maps U+0000..U+00FF one to one and ASCII only covers 7 bits. `encoding_rs`
//! also encodes UTF-16 as UTF-8, so both UTF-16 flavours are encoded directly.
//!
//! Characters an encoding cannot represent are written as a single `?`.

use std::borrow::Cow;

use encoding_rs::{Encoding, EncoderResult, UTF_16BE, UTF_16LE, UTF_8};

use crate::{DataError, Result, LOG_PREFIX};

const REPLACEMENT_BYTE: u8 = b'?';

const LATIN1_LABELS: [&str; 8] = [
    "iso-8859-1",
    "iso8859-1",
    "iso_8859-1",
    "iso88591",
    "latin1",
    "l1",
    "cp819",
    "ibm819",
];
const ASCII_LABELS: [&str; 4] =
    ["ascii", "us-ascii", "ansi_x3.4-1968", "iso-ir-6"];

/// Resolved encoding label
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Charset {
    Utf8,
    Utf16Le,
    Utf16Be,
    Latin1,
    Ascii,
    Other(&'static Encoding),
}

impl Charset {
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Utf8 => UTF_8.name(),
            Charset::Utf16Le => UTF_16LE.name(),
            Charset::Utf16Be => UTF_16BE.name(),
            Charset::Latin1 => "ISO-8859-1",
            Charset::Ascii => "US-ASCII",
            Charset::Other(enc) => enc.name(),
        }
    }
}

pub fn lookup(label: &str) -> Result<Charset> {
    let normalized = label.trim().to_ascii_lowercase();
    if LATIN1_LABELS.contains(&normalized.as_str()) {
        return Ok(Charset::Latin1);
    }
    if ASCII_LABELS.contains(&normalized.as_str()) {
        return Ok(Charset::Ascii);
    }
    let encoding = Encoding::for_label(normalized.as_bytes()).ok_or_else(|| {
        DataError::Encoding(format!("unknown encoding '{}'", label))
    })?;
    Ok(match encoding {
        enc if enc == UTF_8 => Charset::Utf8,
        enc if enc == UTF_16LE => Charset::Utf16Le,
        enc if enc == UTF_16BE => Charset::Utf16Be,
        enc => Charset::Other(enc),
    })
}

pub fn encode<'a>(text: &'a str, label: &str) -> Result<Cow<'a, [u8]>> {
    let bytes = match lookup(label)? {
        Charset::Utf8 => Cow::Borrowed(text.as_bytes()),
        Charset::Utf16Le => Cow::Owned(
            text.encode_utf16()
                .flat_map(|unit| unit.to_le_bytes())
                .collect(),
        ),
        Charset::Utf16Be => Cow::Owned(
            text.encode_utf16()
                .flat_map(|unit| unit.to_be_bytes())
                .collect(),
        ),
        Charset::Latin1 => Cow::Owned(encode_narrow(text, 0xff)),
        Charset::Ascii => Cow::Owned(encode_narrow(text, 0x7f)),
        Charset::Other(enc) => Cow::Owned(encode_with(enc, text)),
    };
    Ok(bytes)
}

/// Single-byte encodings whose code points equal their byte values
fn encode_narrow(text: &str, max: u32) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            code if code <= max => code as u8,
            _ => REPLACEMENT_BYTE,
        })
        .collect()
}

fn encode_with(encoding: &'static Encoding, text: &str) -> Vec<u8> {
    let mut encoder = encoding.new_encoder();
    let mut out = Vec::with_capacity(text.len());
    let mut rest = text;
    let mut unmappable = 0;
    loop {
        let needed = encoder
            .max_buffer_length_from_utf8_without_replacement(rest.len())
            .unwrap_or(rest.len());
        out.reserve(needed);
        let (result, read) = encoder
            .encode_from_utf8_to_vec_without_replacement(rest, &mut out, true);
        rest = &rest[read..];
        match result {
            EncoderResult::InputEmpty => break,
            EncoderResult::OutputFull => continue,
            EncoderResult::Unmappable(_) => {
                out.push(REPLACEMENT_BYTE);
                unmappable += 1;
            }
        }
    }
    if unmappable > 0 {
        log::debug!(
            "{} {} characters not representable in {} were replaced",
            LOG_PREFIX,
            unmappable,
            encoding.name()
        );
    }
    out
}

/// Encode a character buffer, e.g. one accumulated by a writer.
pub fn encode_chars(chars: &[char], label: &str) -> Result<Vec<u8>> {
    let text: String = chars.iter().collect();
    Ok(encode(&text, label)?.into_owned())
}

/// Decode `bytes`, replacing malformed sequences with U+FFFD.
pub fn decode(bytes: &[u8], label: &str) -> Result<String> {
    let encoding = match lookup(label)? {
        Charset::Latin1 => return Ok(bytes.iter().map(|&b| b as char).collect()),
        Charset::Ascii => {
            return Ok(bytes
                .iter()
                .map(|&b| if b < 0x80 { b as char } else { '\u{fffd}' })
                .collect())
        }
        Charset::Utf8 => UTF_8,
        Charset::Utf16Le => UTF_16LE,
        Charset::Utf16Be => UTF_16BE,
        Charset::Other(enc) => enc,
    };
    let (text, malformed) = encoding.decode_without_bom_handling(bytes);
    if malformed {
        log::debug!(
            "{} malformed {} input was replaced",
            LOG_PREFIX,
            encoding.name()
        );
    }
    Ok(text.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1252;
    use rstest::rstest;

    #[rstest]
    #[case("utf-8", "hello", b"hello".to_vec())]
    #[case("UTF8", "héllo", "héllo".as_bytes().to_vec())]
    #[case("latin1", "héllo", vec![b'h', 0xe9, b'l', b'l', b'o'])]
    #[case("utf-16le", "hi", vec![b'h', 0, b'i', 0])]
    #[case("utf-16be", "hi", vec![0, b'h', 0, b'i'])]
    fn encodes_with_label(
        #[case] label: &str,
        #[case] text: &str,
        #[case] expected: Vec<u8>,
    ) {
        let bytes = encode(text, label).unwrap();
        assert_eq!(&*bytes, expected.as_slice());
        assert_eq!(decode(&bytes, label).unwrap(), text);
    }

    #[rstest]
    #[case("latin1", "日本", b"??".to_vec())]
    #[case("latin1", "a€b", b"a?b".to_vec())]
    #[case("us-ascii", "née", b"n?e".to_vec())]
    #[case("windows-1252", "€日", vec![0x80, b'?'])]
    #[case("shift_jis", "a\u{1f600}", b"a?".to_vec())]
    fn unmappable_characters_become_question_marks(
        #[case] label: &str,
        #[case] text: &str,
        #[case] expected: Vec<u8>,
    ) {
        assert_eq!(&*encode(text, label).unwrap(), expected.as_slice());
    }

    #[rstest]
    #[case("latin1", Charset::Latin1)]
    #[case(" ISO-8859-1 ", Charset::Latin1)]
    #[case("ascii", Charset::Ascii)]
    #[case("utf8", Charset::Utf8)]
    #[case("utf-16be", Charset::Utf16Be)]
    #[case("windows-1252", Charset::Other(WINDOWS_1252))]
    fn labels_resolve(#[case] label: &str, #[case] expected: Charset) {
        assert_eq!(lookup(label).unwrap(), expected);
    }

    #[test]
    fn latin1_keeps_c1_controls() {
        let text = "\u{80}\u{9f}";
        let bytes = encode(text, "iso-8859-1").unwrap();
        assert_eq!(&*bytes, &[0x80u8, 0x9f][..]);
        assert_eq!(decode(&bytes, "iso-8859-1").unwrap(), text);
        // windows-1252 reads the same bytes differently
        assert_ne!(decode(&bytes, "windows-1252").unwrap(), text);
    }

    #[test]
    fn ascii_rejects_high_bytes_on_decode() {
        assert_eq!(decode(&[b'o', 0xe9], "us-ascii").unwrap(), "o\u{fffd}");
    }

    #[test]
    fn utf8_is_borrowed() {
        assert!(matches!(encode("abc", "utf-8").unwrap(), Cow::Borrowed(_)));
    }

    #[test]
    fn unknown_label_fails() {
        assert!(matches!(
            encode("abc", "no-such-charset"),
            Err(DataError::Encoding(_))
        ));
        assert!(matches!(
            decode(b"abc", "no-such-charset"),
            Err(DataError::Encoding(_))
        ));
    }

    #[test]
    fn malformed_input_is_replaced() {
        let text = decode(&[b'a', 0xff, b'b'], "utf-8").unwrap();
        assert_eq!(text, "a\u{fffd}b");
    }

    #[test]
    fn chars_are_encoded() {
        let chars: Vec<char> = "ça va".chars().collect();
        assert_eq!(
            encode_chars(&chars, "utf-8").unwrap(),
            "ça va".as_bytes().to_vec()
        );
    }
}
