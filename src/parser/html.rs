//! HTML markup stripping with character reference decoding.
//!
//! Never fails: unterminated tags and comments swallow the rest of the input,
//! and a `<` that cannot start a tag is kept as text.

/// Named references decoded to literal characters. References not listed
/// here are left untouched.
const NAMED_ENTITIES: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("nbsp", '\u{a0}'),
    ("copy", '©'),
    ("reg", '®'),
    ("trade", '™'),
    ("hellip", '…'),
    ("mdash", '—'),
    ("ndash", '–'),
    ("lsquo", '‘'),
    ("rsquo", '’'),
    ("sbquo", '‚'),
    ("ldquo", '“'),
    ("rdquo", '”'),
    ("bdquo", '„'),
    ("laquo", '«'),
    ("raquo", '»'),
    ("bull", '•'),
    ("middot", '·'),
    ("euro", '€'),
    ("pound", '£'),
    ("yen", '¥'),
    ("cent", '¢'),
    ("sect", '§'),
    ("para", '¶'),
    ("deg", '°'),
    ("plusmn", '±'),
    ("times", '×'),
    ("divide", '÷'),
    ("frac12", '½'),
    ("frac14", '¼'),
    ("frac34", '¾'),
    ("iexcl", '¡'),
    ("iquest", '¿'),
    ("shy", '\u{ad}'),
    ("zwnj", '\u{200c}'),
    ("zwj", '\u{200d}'),
    ("aacute", 'á'),
    ("eacute", 'é'),
    ("iacute", 'í'),
    ("oacute", 'ó'),
    ("uacute", 'ú'),
    ("agrave", 'à'),
    ("egrave", 'è'),
    ("auml", 'ä'),
    ("ouml", 'ö'),
    ("uuml", 'ü'),
    ("ntilde", 'ñ'),
    ("ccedil", 'ç'),
    ("szlig", 'ß'),
];

/// Names that browsers also accept without the trailing `;`.
const LEGACY_ENTITIES: &[&str] = &["nbsp", "quot", "copy", "amp", "reg", "lt", "gt"];

/// Elements whose content is raw text: no tags or references inside.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Remove all markup from `html`, keeping character data in document order
/// with character references decoded.
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut pos = 0;

    while let Some(rel) = html[pos..].find('<') {
        let start = pos + rel;
        decode_entities_into(&html[pos..start], &mut out);
        let rest = &html[start..];

        if rest.starts_with("<!--") {
            match rest[4..].find("-->") {
                Some(end) => pos = start + 4 + end + 3,
                None => return out,
            }
            continue;
        }

        let next = rest[1..].chars().next();
        let is_markup = matches!(next, Some(c) if c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'));
        if !is_markup {
            out.push('<');
            pos = start + 1;
            continue;
        }

        let Some(end) = find_tag_end(rest) else {
            return out;
        };
        pos = start + end + 1;

        if let Some(name) = start_tag_name(&rest[..end]) {
            if let Some(element) = RAW_TEXT_ELEMENTS
                .iter()
                .find(|e| e.eq_ignore_ascii_case(name))
            {
                let close = find_closing_tag(&html[pos..], element).unwrap_or(html.len() - pos);
                out.push_str(&html[pos..pos + close]);
                pos += close;
            }
        }
    }

    decode_entities_into(&html[pos..], &mut out);
    out
}

/// Byte offset of the `>` closing the tag at the start of `tag`,
/// skipping over quoted attribute values.
fn find_tag_end(tag: &str) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (i, &b) in tag.as_bytes().iter().enumerate().skip(1) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return Some(i),
            None => {}
        }
    }
    None
}

/// Name of a start tag (`<name ...`), or `None` for end tags and declarations.
fn start_tag_name(tag: &str) -> Option<&str> {
    let body = tag.strip_prefix('<')?;
    let len = body
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(body.len());
    (len > 0 && body.as_bytes()[0].is_ascii_alphabetic()).then(|| &body[..len])
}

/// Offset of `</element` (case-insensitive) in `text`.
fn find_closing_tag(text: &str, element: &str) -> Option<usize> {
    let needle = format!("</{element}");
    text.to_ascii_lowercase().find(&needle)
}

/// Decode character references in `text`, appending the result to `out`.
pub fn decode_entities_into(text: &str, out: &mut String) {
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        match decode_reference(after) {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &after[consumed..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
}

/// Decode entity references in `text` to a new string.
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    decode_entities_into(text, &mut out);
    out
}

/// Decode the reference following a `&`. Returns the character and the number
/// of bytes consumed after the `&`.
fn decode_reference(s: &str) -> Option<(char, usize)> {
    if let Some(num) = s.strip_prefix('#') {
        let (digits, radix, prefix) = match num.strip_prefix(['x', 'X']) {
            Some(hex) => (hex, 16, 2),
            None => (num, 10, 1),
        };
        let len = digits
            .find(|c: char| !c.is_digit(radix))
            .unwrap_or(digits.len());
        if len == 0 {
            return None;
        }
        let ch = u32::from_str_radix(&digits[..len], radix)
            .ok()
            .filter(|&n| n != 0)
            .and_then(char::from_u32)
            .unwrap_or('\u{fffd}');
        let semi = usize::from(digits[len..].starts_with(';'));
        return Some((ch, prefix + len + semi));
    }

    let len = s
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(s.len());
    let name = &s[..len];

    if s[len..].starts_with(';') {
        if let Some(&(_, ch)) = NAMED_ENTITIES.iter().find(|(n, _)| *n == name) {
            return Some((ch, len + 1));
        }
    }

    // Legacy references without `;`: longest matching prefix wins.
    LEGACY_ENTITIES
        .iter()
        .filter(|legacy| name.starts_with(**legacy))
        .max_by_key(|legacy| legacy.len())
        .and_then(|legacy| {
            NAMED_ENTITIES
                .iter()
                .find(|(n, _)| n == legacy)
                .map(|&(_, ch)| (ch, legacy.len()))
        })
}
