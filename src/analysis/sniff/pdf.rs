//! Pulls a descriptive line out of a PDF: the Info dictionary's `/Title`, or
//! failing that the first line of text drawn on the first page.
//!
//! Only uncompressed Info dictionaries are understood; titles hidden inside
//! compressed object streams yield `None`. Page content may be stored plain or
//! FlateDecode-compressed.

use flate2::read::ZlibDecoder;
use std::io::Read;

use super::exif::find;

const MAX_INFLATED_BYTES: u64 = 4 * 1024 * 1024;

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .rposition(|window| window == needle)
}

fn skip_whitespace(data: &[u8], mut pos: usize) -> usize {
    while data.get(pos).is_some_and(|b| b.is_ascii_whitespace()) {
        pos += 1;
    }
    pos
}

fn read_number(data: &[u8], pos: usize) -> Option<(u32, usize)> {
    let end = pos + data.get(pos..)?.iter().take_while(|b| b.is_ascii_digit()).count();
    let text = std::str::from_utf8(data.get(pos..end)?).ok()?;
    Some((text.parse().ok()?, end))
}

/// Parses an indirect reference `N G R` starting at `pos`.
fn reference(data: &[u8], pos: usize) -> Option<(u32, u32)> {
    let pos = skip_whitespace(data, pos);
    let (number, pos) = read_number(data, pos)?;
    let pos = skip_whitespace(data, pos);
    let (generation, pos) = read_number(data, pos)?;
    let pos = skip_whitespace(data, pos);
    (data.get(pos) == Some(&b'R')).then_some((number, generation))
}

/// Body of `N G obj`, up to its `endobj`.
fn object(data: &[u8], (number, generation): (u32, u32)) -> Option<&[u8]> {
    let header = format!("{} {} obj", number, generation);
    let start = find_object(data, header.as_bytes())?;
    let body = &data[start..];
    let end = find(body, b"endobj").unwrap_or(body.len());
    Some(&body[..end])
}

/// Object headers must start a token: "12 0 obj" must not match "112 0 obj".
fn find_object(data: &[u8], header: &[u8]) -> Option<usize> {
    let mut offset = 0;
    while let Some(pos) = find(&data[offset..], header) {
        let absolute = offset + pos;
        if absolute == 0 || !data[absolute - 1].is_ascii_digit() {
            return Some(absolute + header.len());
        }
        offset = absolute + header.len();
    }
    None
}

/// The last `/Info` reference wins, as incremental updates append trailers.
fn info_dictionary(data: &[u8]) -> Option<&[u8]> {
    let key = rfind(data, b"/Info")?;
    object(data, reference(data, key + 5)?)
}

/// Parses a literal string whose opening `(` sits just before `pos`.
/// Returns the bytes and the position after the closing `)`.
fn literal_string(data: &[u8], mut pos: usize) -> Option<(Vec<u8>, usize)> {
    let mut out = Vec::new();
    let mut depth = 1usize;
    while let Some(&byte) = data.get(pos) {
        pos += 1;
        match byte {
            b'\\' => {
                let escaped = *data.get(pos)?;
                pos += 1;
                match escaped {
                    b'n' => out.push(b'\n'),
                    b'r' => out.push(b'\r'),
                    b't' => out.push(b'\t'),
                    b'b' => out.push(0x08),
                    b'f' => out.push(0x0C),
                    b'\r' | b'\n' => {
                        if escaped == b'\r' && data.get(pos) == Some(&b'\n') {
                            pos += 1;
                        }
                    }
                    b'0'..=b'7' => {
                        let mut value = u32::from(escaped - b'0');
                        for _ in 0..2 {
                            match data.get(pos) {
                                Some(d @ b'0'..=b'7') => {
                                    value = value * 8 + u32::from(d - b'0');
                                    pos += 1;
                                }
                                _ => break,
                            }
                        }
                        out.push((value & 0xFF) as u8);
                    }
                    other => out.push(other),
                }
            }
            b'(' => {
                depth += 1;
                out.push(byte);
            }
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some((out, pos));
                }
                out.push(byte);
            }
            _ => out.push(byte),
        }
    }
    None
}

/// Parses a hex string whose opening `<` sits just before `pos`. An odd
/// final digit is padded with 0.
fn hex_string(data: &[u8], pos: usize) -> Option<(Vec<u8>, usize)> {
    let end = pos + data.get(pos..)?.iter().position(|b| *b == b'>')?;
    let digits: Vec<u8> = data[pos..end]
        .iter()
        .filter(|b| !b.is_ascii_whitespace())
        .map(|b| (*b as char).to_digit(16).map(|d| d as u8))
        .collect::<Option<_>>()?;
    let bytes = digits
        .chunks(2)
        .map(|pair| (pair[0] << 4) | pair.get(1).copied().unwrap_or(0))
        .collect();
    Some((bytes, end + 1))
}

fn string_at(data: &[u8], pos: usize) -> Option<(Vec<u8>, usize)> {
    match data.get(pos)? {
        b'(' => literal_string(data, pos + 1),
        b'<' => hex_string(data, pos + 1),
        _ => None,
    }
}

/// UTF-16BE when BOM-prefixed, otherwise PDFDocEncoding read as Latin-1.
/// A dangling odd byte in UTF-16 text becomes U+FFFD.
fn decode_text(raw: &[u8]) -> String {
    if let Some(utf16) = raw.strip_prefix(&[0xFE, 0xFF]) {
        let pairs = utf16.chunks_exact(2);
        let dangling = !pairs.remainder().is_empty();
        let units: Vec<u16> = pairs
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        let mut text = String::from_utf16_lossy(&units);
        if dangling {
            text.push(char::REPLACEMENT_CHARACTER);
        }
        return text;
    }
    raw.iter().map(|&b| b as char).collect()
}

pub fn title(data: &[u8]) -> Option<String> {
    let info = info_dictionary(data)?;
    let key = find(info, b"/Title")?;
    let pos = skip_whitespace(info, key + 6);
    let (raw, _) = string_at(info, pos)?;
    let text = decode_text(&raw);
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// First `/Type /Page` object in file order.
fn first_page(data: &[u8]) -> Option<&[u8]> {
    let mut offset = 0;
    while let Some(found) = find(&data[offset..], b"/Type") {
        let key = offset + found;
        let pos = skip_whitespace(data, key + 5);
        let rest = &data[pos..];
        if rest.starts_with(b"/Page") && !rest.get(5).is_some_and(|b| b.is_ascii_alphanumeric()) {
            let start = rfind(&data[..key], b" obj").map_or(0, |p| p + 4);
            let end = find(&data[key..], b"endobj").map_or(data.len(), |p| key + p);
            return Some(&data[start..end]);
        }
        offset = key + 5;
    }
    None
}

/// Splits a stream object body into its dictionary and raw stream bytes.
fn stream(body: &[u8]) -> Option<(&[u8], &[u8])> {
    let keyword = find(body, b"stream")?;
    let mut start = keyword + 6;
    if body.get(start) == Some(&b'\r') {
        start += 1;
    }
    if body.get(start) == Some(&b'\n') {
        start += 1;
    }
    let end = start + find(body.get(start..)?, b"endstream")?;
    Some((&body[..keyword], &body[start..end]))
}

fn inflate(raw: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(raw)
        .take(MAX_INFLATED_BYTES)
        .read_to_end(&mut out)
        .ok()?;
    Some(out)
}

/// Decoded content of the first page's first content stream.
fn page_content(data: &[u8]) -> Option<Vec<u8>> {
    let page = first_page(data)?;
    let key = find(page, b"/Contents")?;
    let mut pos = skip_whitespace(page, key + 9);
    if page.get(pos) == Some(&b'[') {
        pos += 1;
    }
    let body = object(data, reference(page, pos)?)?;
    let (dict, raw) = stream(body)?;
    if find(dict, b"/FlateDecode").is_some() {
        inflate(raw)
    } else {
        Some(raw.to_vec())
    }
}

fn is_delimiter(byte: u8) -> bool {
    byte.is_ascii_whitespace() || b"()<>[]{}/%".contains(&byte)
}

/// Text shown by `Tj`, `TJ`, `'` and `"`, with a line break at each text
/// object and positioning operator.
fn shown_text(content: &[u8]) -> String {
    let mut text = String::new();
    let mut operands: Vec<Vec<u8>> = Vec::new();
    let mut pos = 0;

    while let Some(&byte) = content.get(pos) {
        match byte {
            b'%' => {
                pos += content[pos..]
                    .iter()
                    .position(|b| *b == b'\n' || *b == b'\r')
                    .unwrap_or(content.len() - pos);
            }
            b'/' => {
                pos += 1 + content[pos + 1..].iter().take_while(|b| !is_delimiter(**b)).count();
            }
            b'<' if content.get(pos + 1) == Some(&b'<') => pos += 2,
            b'(' | b'<' => match string_at(content, pos) {
                Some((raw, end)) => {
                    operands.push(raw);
                    pos = end;
                }
                None => break,
            },
            b'\'' | b'"' => {
                pos += 1;
                text.push('\n');
                for raw in operands.drain(..) {
                    text.push_str(&decode_text(&raw));
                }
            }
            b if b.is_ascii_alphabetic() => {
                let len = content[pos..]
                    .iter()
                    .take_while(|b| b.is_ascii_alphabetic() || **b == b'*')
                    .count();
                let operator = &content[pos..pos + len];
                pos += len;
                match operator {
                    b"Tj" | b"TJ" => {
                        for raw in operands.drain(..) {
                            text.push_str(&decode_text(&raw));
                        }
                    }
                    b"Td" | b"TD" | b"T*" | b"Tm" | b"BT" | b"ET" => {
                        text.push('\n');
                        operands.clear();
                    }
                    // Inline image data runs until `EI`.
                    b"ID" => {
                        pos = find(&content[pos..], b"EI").map_or(content.len(), |p| pos + p + 2);
                        operands.clear();
                    }
                    _ => operands.clear(),
                }
            }
            _ => pos += 1,
        }
    }
    text
}

/// First non-empty line of text on the first page. Lines made of glyph ids
/// from embedded fonts come out as control characters and are rejected.
pub fn first_text_line(data: &[u8]) -> Option<String> {
    let content = page_content(data)?;
    let text = shown_text(&content);
    let line = text.lines().map(str::trim).find(|line| !line.is_empty())?;
    let readable =
        line.chars().any(char::is_alphanumeric) && !line.chars().any(char::is_control);
    readable.then(|| line.to_string())
}
