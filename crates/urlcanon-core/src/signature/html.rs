//! Minimal HTML tag scanning for signature extraction.
//!
//! This is not a conforming HTML parser; it is a tolerant tokenizer that
//! splits markup into tags and text, enough to pull out titles, strip tags
//! from body text, and build a text-blanked structural skeleton. Malformed
//! input degrades to treating the remainder as text, never to a panic.

/// `<meta name=...>` tags whose content is per-request noise (instance IDs,
/// tree IDs, serving metadata) and must not influence structural hashes.
const EPHEMERAL_META_NAMES: [&str; 7] = [
    "bprPageInstance",
    "clientPageInstanceId",
    "applicationInstance",
    "requestIpCountryCode",
    "serviceInstance",
    "serviceVersion",
    "treeID",
];

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    /// Tag contents without the surrounding `<` and `>`.
    Tag(String),
}

fn tokenize(html: &str) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut rest = html;
    while !rest.is_empty() {
        match rest.find('<') {
            None => {
                nodes.push(Node::Text(rest.to_string()));
                break;
            }
            Some(start) => {
                if start > 0 {
                    nodes.push(Node::Text(rest[..start].to_string()));
                }
                rest = &rest[start..];
                if rest.starts_with("<!--") {
                    // Comments are dropped outright.
                    match rest.find("-->") {
                        Some(end) => rest = &rest[end + 3..],
                        None => break,
                    }
                    continue;
                }
                match rest.find('>') {
                    Some(end) => {
                        nodes.push(Node::Tag(rest[1..end].to_string()));
                        rest = &rest[end + 1..];
                    }
                    None => {
                        // Unterminated tag: keep as text so nothing is lost.
                        nodes.push(Node::Text(rest.to_string()));
                        break;
                    }
                }
            }
        }
    }
    nodes
}

/// Lowercased tag name and whether this is a closing tag.
fn tag_name(raw: &str) -> (String, bool) {
    let trimmed = raw.trim_start();
    let (closing, trimmed) = match trimmed.strip_prefix('/') {
        Some(t) => (true, t),
        None => (false, trimmed),
    };
    let name: String = trimmed
        .chars()
        .take_while(|c| !c.is_whitespace() && *c != '/' && *c != '>')
        .collect();
    (name.to_ascii_lowercase(), closing)
}

/// Attribute list as (lowercased name, unquoted value) pairs. Valueless
/// attributes yield an empty value.
fn attributes(raw: &str) -> Vec<(String, String)> {
    let trimmed = raw.trim_start().trim_start_matches('/');
    let after_name = trimmed
        .char_indices()
        .find(|(_, c)| c.is_whitespace())
        .map(|(i, _)| &trimmed[i..])
        .unwrap_or("");

    let mut attrs = Vec::new();
    let mut chars = after_name.char_indices().peekable();
    let bytes = after_name;
    while let Some((i, c)) = chars.next() {
        if c.is_whitespace() || c == '/' {
            continue;
        }
        // Attribute name.
        let name_start = i;
        let mut name_end = bytes.len();
        for (j, c2) in bytes[i..].char_indices() {
            if c2 == '=' || c2.is_whitespace() {
                name_end = i + j;
                break;
            }
        }
        let name = bytes[name_start..name_end].to_ascii_lowercase();
        while chars.peek().is_some_and(|(j, _)| *j < name_end) {
            chars.next();
        }
        // Optional value.
        let mut value = String::new();
        if bytes[name_end..].starts_with('=') {
            chars.next(); // consume '='
            let value_start = name_end + 1;
            match bytes[value_start..].chars().next() {
                Some(quote @ ('"' | '\'')) => {
                    let inner_start = value_start + 1;
                    let end = bytes[inner_start..]
                        .find(quote)
                        .map(|j| inner_start + j)
                        .unwrap_or(bytes.len());
                    value = bytes[inner_start..end].to_string();
                    let consume_to = (end + 1).min(bytes.len());
                    while chars.peek().is_some_and(|(j, _)| *j < consume_to) {
                        chars.next();
                    }
                }
                Some(_) => {
                    let end = bytes[value_start..]
                        .find(|c: char| c.is_whitespace())
                        .map(|j| value_start + j)
                        .unwrap_or(bytes.len());
                    value = bytes[value_start..end].to_string();
                    while chars.peek().is_some_and(|(j, _)| *j < end) {
                        chars.next();
                    }
                }
                None => {}
            }
        }
        if !name.is_empty() {
            attrs.push((name, value));
        }
    }
    attrs
}

fn attr_value<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

/// Index just past the matching closing tag for `name`, or the end.
fn skip_element(nodes: &[Node], mut i: usize, name: &str) -> usize {
    while i < nodes.len() {
        if let Node::Tag(raw) = &nodes[i] {
            let (n, closing) = tag_name(raw);
            if closing && n == name {
                return i + 1;
            }
        }
        i += 1;
    }
    i
}

/// Page title for signatures: `<meta property="og:title">` content when
/// present, otherwise the text of the first `<title>` element.
pub fn page_title(html: &str) -> String {
    let nodes = tokenize(html);
    let mut og_title: Option<String> = None;
    let mut title: Option<String> = None;

    let mut i = 0;
    while i < nodes.len() {
        if let Node::Tag(raw) = &nodes[i] {
            let (name, closing) = tag_name(raw);
            if !closing && name == "meta" && og_title.is_none() {
                let attrs = attributes(raw);
                if attr_value(&attrs, "property") == Some("og:title") {
                    if let Some(content) = attr_value(&attrs, "content") {
                        og_title = Some(content.trim().to_string());
                    }
                }
            } else if !closing && name == "title" && title.is_none() {
                let mut text = String::new();
                let mut j = i + 1;
                while j < nodes.len() {
                    match &nodes[j] {
                        Node::Tag(r) if tag_name(r) == ("title".to_string(), true) => break,
                        Node::Text(t) => text.push_str(t),
                        Node::Tag(_) => {}
                    }
                    j += 1;
                }
                title = Some(text.trim().to_string());
                i = j;
            }
        }
        i += 1;
    }

    og_title.filter(|t| !t.is_empty()).or(title).unwrap_or_default()
}

/// Rendered text with markup removed: script/style contents dropped, tags
/// stripped, whitespace runs collapsed to single spaces.
pub fn visible_text(html: &str) -> String {
    let nodes = tokenize(html);
    let mut out = String::new();
    let mut pending_space = false;

    let mut i = 0;
    while i < nodes.len() {
        match &nodes[i] {
            Node::Tag(raw) => {
                let (name, closing) = tag_name(raw);
                if !closing && (name == "script" || name == "style") && !raw.ends_with('/') {
                    i = skip_element(&nodes, i + 1, &name);
                    continue;
                }
            }
            Node::Text(text) => {
                for ch in text.chars() {
                    if ch.is_whitespace() {
                        pending_space = true;
                    } else {
                        if pending_space && !out.is_empty() {
                            out.push(' ');
                        }
                        pending_space = false;
                        out.push(ch);
                    }
                }
            }
        }
        i += 1;
    }
    out
}

/// Markup skeleton with every text node blanked, scripts and comments
/// removed, `nonce` attributes dropped, and ephemeral meta tags discarded.
/// Two fetches of the same page template hash identically even when their
/// text, nonces and instance IDs differ.
pub fn structural_markup(html: &str) -> String {
    let nodes = tokenize(html);
    let mut out = String::new();

    let mut i = 0;
    while i < nodes.len() {
        if let Node::Tag(raw) = &nodes[i] {
            let (name, closing) = tag_name(raw);
            if closing {
                out.push_str("</");
                out.push_str(&name);
                out.push('>');
            } else if name == "script" {
                if !raw.ends_with('/') {
                    i = skip_element(&nodes, i + 1, "script");
                    continue;
                }
            } else if name == "meta" && is_ephemeral_meta(raw) {
                // dropped
            } else {
                out.push('<');
                out.push_str(&name);
                for (k, v) in attributes(raw) {
                    if k == "nonce" {
                        continue;
                    }
                    out.push(' ');
                    out.push_str(&k);
                    out.push_str("=\"");
                    out.push_str(&v);
                    out.push('"');
                }
                if raw.ends_with('/') {
                    out.push('/');
                }
                out.push('>');
            }
        }
        i += 1;
    }
    out
}

fn is_ephemeral_meta(raw: &str) -> bool {
    let attrs = attributes(raw);
    match attr_value(&attrs, "name") {
        Some(name) => EPHEMERAL_META_NAMES
            .iter()
            .any(|e| e.eq_ignore_ascii_case(name)),
        None => false,
    }
}
