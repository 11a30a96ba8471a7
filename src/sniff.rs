//! Content-type sniffing for byte streams of unknown type.
//!
//! A subset of the WHATWG MIME Sniffing Standard: the signatures that matter
//! for a server answering with raw bytes. Only the first [`SNIFF_LEN`] bytes
//! are ever considered.

/// How many leading bytes the sniffer looks at.
pub(crate) const SNIFF_LEN: usize = 512;

const OCTET_STREAM: &str = "application/octet-stream";
const TEXT_UTF8: &str = "text/plain; charset=utf-8";
const HTML_UTF8: &str = "text/html; charset=utf-8";

/// Exact-prefix signatures. `0xFF` in the mask means "must match", `0x00`
/// means "ignore this byte".
const MASKED: &[(&[u8], &[u8], &str)] = &[
    (b"\xFE\xFF", b"\xFF\xFF", "text/plain; charset=utf-16be"),
    (b"\xFF\xFE", b"\xFF\xFF", "text/plain; charset=utf-16le"),
    (b"\xEF\xBB\xBF", b"\xFF\xFF\xFF", TEXT_UTF8),
    (b"%PDF-", b"\xFF\xFF\xFF\xFF\xFF", "application/pdf"),
    (b"%!PS-Adobe-", b"\xFF\xFF\xFF\xFF\xFF\xFF\xFF\xFF\xFF\xFF\xFF", "application/postscript"),
    (b"GIF87a", b"\xFF\xFF\xFF\xFF\xFF\xFF", "image/gif"),
    (b"GIF89a", b"\xFF\xFF\xFF\xFF\xFF\xFF", "image/gif"),
    (b"\x89PNG\r\n\x1A\n", b"\xFF\xFF\xFF\xFF\xFF\xFF\xFF\xFF", "image/png"),
    (b"\xFF\xD8\xFF", b"\xFF\xFF\xFF", "image/jpeg"),
    (b"BM", b"\xFF\xFF", "image/bmp"),
    (b"RIFF\x00\x00\x00\x00WEBPVP", b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF\xFF\xFF", "image/webp"),
    (b"\x00\x00\x01\x00", b"\xFF\xFF\xFF\xFF", "image/x-icon"),
    (b"\x00\x00\x02\x00", b"\xFF\xFF\xFF\xFF", "image/x-icon"),
    (b"OggS\x00", b"\xFF\xFF\xFF\xFF\xFF", "application/ogg"),
    (b"RIFF\x00\x00\x00\x00WAVE", b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF", "audio/wave"),
    (b"ID3", b"\xFF\xFF\xFF", "audio/mpeg"),
    (b"\x1A\x45\xDF\xA3", b"\xFF\xFF\xFF\xFF", "video/webm"),
    (b"PK\x03\x04", b"\xFF\xFF\xFF\xFF", "application/zip"),
    (b"\x1F\x8B\x08", b"\xFF\xFF\xFF", "application/x-gzip"),
    (b"Rar!\x1A\x07\x00", b"\xFF\xFF\xFF\xFF\xFF\xFF\xFF", "application/x-rar-compressed"),
    (b"Rar!\x1A\x07\x01\x00", b"\xFF\xFF\xFF\xFF\xFF\xFF\xFF\xFF", "application/x-rar-compressed"),
    (b"\x00asm", b"\xFF\xFF\xFF\xFF", "application/wasm"),
];

/// HTML openers, matched case-insensitively after leading whitespace and
/// followed by a space or `>`.
const HTML_TAGS: &[&[u8]] = &[
    b"<!DOCTYPE HTML", b"<HTML", b"<HEAD", b"<SCRIPT", b"<IFRAME", b"<H1", b"<DIV",
    b"<FONT", b"<TABLE", b"<A", b"<STYLE", b"<TITLE", b"<B", b"<BODY", b"<BR", b"<P",
    b"<!--",
];

/// Best-guess content type of `data`. Never fails: unknown binary data is
/// `application/octet-stream`.
pub fn content_type(data: &[u8]) -> &'static str {
    let data = &data[..data.len().min(SNIFF_LEN)];

    if let Some((_, _, ct)) = MASKED.iter().find(|(pat, mask, _)| masked_prefix(data, pat, mask)) {
        return *ct;
    }

    let text = trim_leading_ws(data);
    if HTML_TAGS.iter().any(|tag| html_prefix(text, tag)) {
        return HTML_UTF8;
    }
    if text.starts_with(b"<?xml") {
        return "text/xml; charset=utf-8";
    }
    if mp4(data) {
        return "video/mp4";
    }

    if data.iter().copied().any(is_binary) { OCTET_STREAM } else { TEXT_UTF8 }
}

fn masked_prefix(data: &[u8], pattern: &[u8], mask: &[u8]) -> bool {
    data.len() >= pattern.len()
        && pattern.iter().zip(mask).zip(data).all(|((p, m), d)| d & m == *p)
}

fn html_prefix(data: &[u8], tag: &[u8]) -> bool {
    data.len() > tag.len()
        && data[..tag.len()].eq_ignore_ascii_case(tag)
        && matches!(data[tag.len()], b' ' | b'>')
}

/// ISO base media file with an `ftyp` box naming an `mp4` brand.
fn mp4(data: &[u8]) -> bool {
    if data.len() < 12 {
        return false;
    }
    let box_size = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if box_size % 4 != 0 || data.len() < box_size || &data[4..8] != b"ftyp" {
        return false;
    }
    (8..box_size)
        .step_by(4)
        .filter(|&i| i != 12)
        .any(|i| data.get(i..i + 3) == Some(b"mp4".as_slice()))
}

fn trim_leading_ws(data: &[u8]) -> &[u8] {
    let start = data.iter()
        .position(|b| !matches!(b, b'\t' | b'\n' | b'\x0C' | b'\r' | b' '))
        .unwrap_or(data.len());
    &data[start..]
}

fn is_binary(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text() {
        assert_eq!(content_type(b"This is a test!"), TEXT_UTF8);
        assert_eq!(content_type(b""), TEXT_UTF8);
    }

    #[test]
    fn binary_bytes() {
        assert_eq!(content_type(b"\x00\x01\x02\x03abc"), OCTET_STREAM);
    }

    #[test]
    fn html_needs_terminator() {
        assert_eq!(content_type(b"  \n<html><body>hi</body></html>"), HTML_UTF8);
        assert_eq!(content_type(b"<!doctype html>"), HTML_UTF8);
        assert_eq!(content_type(b"<!-- comment"), HTML_UTF8);
        assert_eq!(content_type(b"<!--x-->"), TEXT_UTF8);
        assert_eq!(content_type(b"<htmlish"), TEXT_UTF8);
    }

    #[test]
    fn signatures() {
        assert_eq!(content_type(b"\x89PNG\r\n\x1A\n\x00\x00"), "image/png");
        assert_eq!(content_type(b"GIF89a...."), "image/gif");
        assert_eq!(content_type(b"%PDF-1.7"), "application/pdf");
        assert_eq!(content_type(b"PK\x03\x04rest"), "application/zip");
        assert_eq!(content_type(b"RIFF\x24\x00\x00\x00WAVEfmt "), "audio/wave");
        assert_eq!(content_type(b"<?xml version=\"1.0\"?>"), "text/xml; charset=utf-8");
    }

    #[test]
    fn mp4_brand() {
        let mut data = vec![0, 0, 0, 0x18];
        data.extend_from_slice(b"ftypmp42");
        data.extend_from_slice(&[0, 0, 0, 0]);
        data.extend_from_slice(b"isommp42");
        assert_eq!(content_type(&data), "video/mp4");
    }

    #[test]
    fn only_the_sniff_window_counts() {
        let mut data = vec![b'a'; SNIFF_LEN];
        data.push(0);
        assert_eq!(content_type(&data), TEXT_UTF8);
    }
}
