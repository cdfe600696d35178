//! Minimal HTML template rewriter
//!
//! Indexes the elements of a template by scanning tags, then splices edits
//! into the source text. Every mutation re-indexes the document, so element
//! handles (`usize`) are only valid until the next mutation. Callers that
//! touch several elements work from the last one backwards: an edit never
//! shifts the handles of elements that start before it.
//!
//! The scanner understands comments, doctype, void and self-closing tags,
//! raw-text elements (`script`, `style`, `textarea`, `title`) and quoted
//! attribute values. Unclosed elements run to the end of their parent.

use std::ops::Range;

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

const RAW_TEXT_TAGS: &[&str] = &["script", "style", "textarea", "title"];

/// Elements whose content is not read as text
const NON_TEXT_TAGS: &[&str] = &["script", "style", "textarea", "form", "template"];

/// Element selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector<'a> {
    Id(&'a str),
    Class(&'a str),
    Tag(&'a str),
    /// Has the attribute, whatever its value
    Attr(&'a str),
    TagClass(&'a str, &'a str),
}

impl Selector<'_> {
    fn matches(&self, element: &Element) -> bool {
        match *self {
            Selector::Id(id) => element.attr("id") == Some(id),
            Selector::Class(class) => element.has_class(class),
            Selector::Tag(tag) => element.tag == tag,
            Selector::Attr(name) => element.attrs.iter().any(|(n, _)| n == name),
            Selector::TagClass(tag, class) => element.tag == tag && element.has_class(class),
        }
    }
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attrs: Vec<(String, Option<String>)>,
    /// `<tag ...>`
    open: Range<usize>,
    /// Content between the tags; empty for void elements
    inner: Range<usize>,
    /// Position after the closing tag
    end: usize,
}

impl Element {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|c| c.split_ascii_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    fn render_open(&self) -> String {
        let mut out = format!("<{}", self.tag);
        for (name, value) in &self.attrs {
            match value {
                Some(value) => out.push_str(&format!(" {}=\"{}\"", name, escape_attr(value))),
                None => out.push_str(&format!(" {}", name)),
            }
        }
        out.push('>');
        out
    }
}

/// A parsed template
#[derive(Debug, Clone)]
pub struct Document {
    html: String,
    elements: Vec<Element>,
}

impl Document {
    pub fn parse(html: impl Into<String>) -> Self {
        let html = html.into();
        let elements = scan(&html);
        Self { html, elements }
    }

    pub fn into_html(self) -> String {
        self.html
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    /// First element matching `selector`, in document order
    pub fn first(&self, selector: Selector<'_>) -> Option<usize> {
        self.elements.iter().position(|e| selector.matches(e))
    }

    /// Every element matching `selector`, in document order
    pub fn all(&self, selector: Selector<'_>) -> Vec<usize> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| selector.matches(e))
            .map(|(i, _)| i)
            .collect()
    }

    /// First descendant of `parent` matching `selector`
    pub fn first_within(&self, parent: usize, selector: Selector<'_>) -> Option<usize> {
        let scope = self.elements.get(parent)?.inner.clone();
        self.elements
            .iter()
            .enumerate()
            .skip(parent + 1)
            .take_while(|(_, e)| e.open.start < scope.end)
            .find(|(_, e)| scope.contains(&e.open.start) && selector.matches(e))
            .map(|(i, _)| i)
    }

    pub fn tag(&self, element: usize) -> &str {
        self.elements.get(element).map(|e| e.tag.as_str()).unwrap_or_default()
    }

    pub fn attr(&self, element: usize, name: &str) -> Option<&str> {
        self.elements.get(element)?.attr(name)
    }

    pub fn inner_html(&self, element: usize) -> &str {
        self.elements
            .get(element)
            .map(|e| &self.html[e.inner.clone()])
            .unwrap_or_default()
    }

    /// Readable text of the element: tags dropped, entities decoded
    ///
    /// Every tag reads as a space. Scripts, styles and forms contribute
    /// nothing.
    pub fn text(&self, element: usize) -> String {
        let Some(e) = self.elements.get(element) else {
            return String::new();
        };
        let scope = e.inner.clone();
        let cuts = self
            .elements
            .iter()
            .skip(element + 1)
            .take_while(|d| d.open.start < scope.end)
            .filter(|d| scope.contains(&d.open.start))
            .map(|d| {
                if NON_TEXT_TAGS.contains(&d.tag.as_str()) {
                    d.open.start..d.end.min(scope.end)
                } else {
                    d.open.clone()
                }
            });

        let mut out = String::new();
        let mut pos = scope.start;
        for cut in cuts {
            if cut.start < pos {
                pos = pos.max(cut.end);
                continue;
            }
            strip_tags(&self.html[pos..cut.start], &mut out);
            out.push(' ');
            pos = cut.end;
        }
        strip_tags(&self.html[pos..scope.end], &mut out);
        decode_entities(&out)
    }

    /// Replace the element's content with raw HTML
    pub fn set_inner_html(&mut self, element: usize, html: &str) {
        let Some(e) = self.elements.get(element) else {
            return;
        };
        if VOID_TAGS.contains(&e.tag.as_str()) {
            return;
        }
        let range = e.inner.clone();
        self.splice(range, html);
    }

    /// Replace the element's content with escaped text
    pub fn set_text(&mut self, element: usize, text: &str) {
        self.set_inner_html(element, &escape_text(text));
    }

    pub fn set_attr(&mut self, element: usize, name: &str, value: &str) {
        self.edit_attrs(element, |attrs| {
            match attrs.iter_mut().find(|(n, _)| n == name) {
                Some((_, v)) => *v = Some(value.to_string()),
                None => attrs.push((name.to_string(), Some(value.to_string()))),
            }
        });
    }

    /// Valueless attribute such as `hidden` or `selected`
    pub fn set_flag(&mut self, element: usize, name: &str) {
        self.edit_attrs(element, |attrs| {
            if !attrs.iter().any(|(n, _)| n == name) {
                attrs.push((name.to_string(), None));
            }
        });
    }

    pub fn remove_attr(&mut self, element: usize, name: &str) {
        self.edit_attrs(element, |attrs| attrs.retain(|(n, _)| n != name));
    }

    pub fn add_class(&mut self, element: usize, class: &str) {
        self.edit_attrs(element, |attrs| match attrs.iter_mut().find(|(n, _)| n == "class") {
            Some((_, value)) => {
                let current = value.clone().unwrap_or_default();
                if !current.split_ascii_whitespace().any(|c| c == class) {
                    let joined = if current.trim().is_empty() {
                        class.to_string()
                    } else {
                        format!("{} {}", current.trim(), class)
                    };
                    *value = Some(joined);
                }
            }
            None => attrs.push(("class".to_string(), Some(class.to_string()))),
        });
    }

    /// Set one inline style property, keeping the others
    pub fn set_style(&mut self, element: usize, property: &str, value: &str) {
        let current = self.attr(element, "style").unwrap_or_default().to_string();
        let mut declarations: Vec<(String, String)> = current
            .split(';')
            .filter_map(|decl| {
                let (p, v) = decl.split_once(':')?;
                Some((p.trim().to_string(), v.trim().to_string()))
            })
            .filter(|(p, _)| !p.is_empty())
            .collect();

        match declarations.iter_mut().find(|(p, _)| p == property) {
            Some((_, v)) => *v = value.to_string(),
            None => declarations.push((property.to_string(), value.to_string())),
        }

        let style = declarations
            .iter()
            .map(|(p, v)| format!("{}: {}", p, v))
            .collect::<Vec<_>>()
            .join("; ");
        self.set_attr(element, "style", &style);
    }

    /// Remove the element and its content
    pub fn remove(&mut self, element: usize) {
        let Some(e) = self.elements.get(element) else {
            return;
        };
        let range = e.open.start..e.end;
        self.splice(range, "");
    }

    /// Insert HTML as the element's first content
    pub fn prepend_html(&mut self, element: usize, html: &str) {
        let Some(e) = self.elements.get(element) else {
            return;
        };
        let at = e.open.end;
        self.splice(at..at, html);
    }

    /// Insert HTML as the element's last content
    pub fn append_html(&mut self, element: usize, html: &str) {
        let Some(e) = self.elements.get(element) else {
            return;
        };
        let at = e.inner.end;
        self.splice(at..at, html);
    }

    /// Insert HTML at the start of `<body>`, or of the document without one
    pub fn prepend_to_body(&mut self, html: &str) {
        match self.first(Selector::Tag("body")) {
            Some(body) => self.prepend_html(body, html),
            None => self.splice(0..0, html),
        }
    }

    /// Insert HTML at the end of `<head>`; ignored without one
    pub fn append_to_head(&mut self, html: &str) {
        if let Some(head) = self.first(Selector::Tag("head")) {
            self.append_html(head, html);
        }
    }

    fn edit_attrs(&mut self, element: usize, edit: impl FnOnce(&mut Vec<(String, Option<String>)>)) {
        let Some(e) = self.elements.get(element) else {
            return;
        };
        let mut updated = e.clone();
        edit(&mut updated.attrs);
        let range = e.open.clone();
        self.splice(range, &updated.render_open());
    }

    fn splice(&mut self, range: Range<usize>, replacement: &str) {
        self.html.replace_range(range, replacement);
        self.elements = scan(&self.html);
    }
}

/// Escape text content
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a double-quoted attribute value
pub fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    raw.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Copy `segment` minus closing tags and comments, each read as a space
fn strip_tags(segment: &str, out: &mut String) {
    let mut rest = segment;
    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        out.push(' ');
        let (close, skip) = if rest[start..].starts_with("<!--") { ("-->", 3) } else { (">", 1) };
        rest = match rest[start..].find(close) {
            Some(end) => &rest[start + end + skip..],
            None => "",
        };
    }
    out.push_str(rest);
}

struct Open {
    index: usize,
    tag: String,
}

fn scan(html: &str) -> Vec<Element> {
    let bytes = html.as_bytes();
    let mut elements: Vec<Element> = Vec::new();
    let mut stack: Vec<Open> = Vec::new();
    let mut pos = 0;

    while let Some(offset) = html[pos..].find('<') {
        let start = pos + offset;
        let rest = &html[start..];

        if rest.starts_with("<!--") {
            pos = match rest.find("-->") {
                Some(end) => start + end + 3,
                None => html.len(),
            };
            continue;
        }

        if rest.starts_with("<!") || rest.starts_with("<?") {
            pos = match rest.find('>') {
                Some(end) => start + end + 1,
                None => html.len(),
            };
            continue;
        }

        if let Some(name) = rest.strip_prefix("</") {
            let name_len = name
                .find(|c: char| !c.is_ascii_alphanumeric() && c != '-')
                .unwrap_or(name.len());
            let tag = name[..name_len].to_ascii_lowercase();
            let close_end = match rest.find('>') {
                Some(end) => start + end + 1,
                None => html.len(),
            };
            if let Some(depth) = stack.iter().rposition(|open| open.tag == tag) {
                for open in stack.drain(depth..).rev() {
                    let element = &mut elements[open.index];
                    if open.tag == tag {
                        element.inner.end = start;
                        element.end = close_end;
                    } else {
                        element.inner.end = start;
                        element.end = start;
                    }
                }
            }
            pos = close_end;
            continue;
        }

        if !bytes.get(start + 1).map(u8::is_ascii_alphabetic).unwrap_or(false) {
            pos = start + 1;
            continue;
        }

        let (tag, attrs, open_end, self_closing) = parse_open_tag(html, start);
        let void = self_closing || VOID_TAGS.contains(&tag.as_str());
        let index = elements.len();
        elements.push(Element {
            tag: tag.clone(),
            attrs,
            open: start..open_end,
            inner: open_end..open_end,
            end: open_end,
        });

        if void {
            pos = open_end;
            continue;
        }

        if RAW_TEXT_TAGS.contains(&tag.as_str()) {
            let closing = format!("</{}", tag);
            let lower = html[open_end..].to_ascii_lowercase();
            let (inner_end, end) = match lower.find(&closing) {
                Some(at) => {
                    let inner_end = open_end + at;
                    let end = html[inner_end..]
                        .find('>')
                        .map(|e| inner_end + e + 1)
                        .unwrap_or(html.len());
                    (inner_end, end)
                }
                None => (html.len(), html.len()),
            };
            let element = &mut elements[index];
            element.inner.end = inner_end;
            element.end = end;
            pos = end;
            continue;
        }

        stack.push(Open { index, tag });
        pos = open_end;
    }

    for open in stack {
        let element = &mut elements[open.index];
        element.inner.end = html.len();
        element.end = html.len();
    }

    elements
}

/// Parse `<tag attrs...>` starting at `start`
///
/// Returns the lowercased tag name, attributes, the position after `>` and
/// whether the tag was self-closing.
fn parse_open_tag(html: &str, start: usize) -> (String, Vec<(String, Option<String>)>, usize, bool) {
    let bytes = html.as_bytes();
    let mut pos = start + 1;
    while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'-') {
        pos += 1;
    }
    let tag = html[start + 1..pos].to_ascii_lowercase();
    let mut attrs = Vec::new();

    loop {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= bytes.len() {
            return (tag, attrs, html.len(), false);
        }
        match bytes[pos] {
            b'>' => return (tag, attrs, pos + 1, false),
            b'/' if bytes.get(pos + 1) == Some(&b'>') => return (tag, attrs, pos + 2, true),
            b'/' => {
                pos += 1;
                continue;
            }
            _ => {}
        }

        let name_start = pos;
        while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() && !matches!(bytes[pos], b'=' | b'>' | b'/') {
            pos += 1;
        }
        let name = html[name_start..pos].to_ascii_lowercase();

        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if bytes.get(pos) != Some(&b'=') {
            attrs.push((name, None));
            continue;
        }
        pos += 1;
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }

        let value = match bytes.get(pos) {
            Some(&quote @ (b'"' | b'\'')) => {
                let value_start = pos + 1;
                let value_end = html[value_start..]
                    .find(quote as char)
                    .map(|e| value_start + e)
                    .unwrap_or(html.len());
                pos = (value_end + 1).min(html.len());
                &html[value_start..value_end]
            }
            _ => {
                let value_start = pos;
                while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() && bytes[pos] != b'>' {
                    pos += 1;
                }
                &html[value_start..pos]
            }
        };
        attrs.push((name, Some(decode_entities(value))));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>a < b</title></head>
<body class="page">
  <!-- <div id="ghost"></div> -->
  <div id="outer"><div class="inner x">one</div><img src="a.png" data-field="coverImage"><br/></div>
  <script>if (a < b) { document.write("<div id='fake'>"); }</script>
  <a id="crumb" href='projects.html'>Crumb</a>
</body></html>"#;

    #[test]
    fn test_finds_elements_outside_comments_and_scripts() {
        let doc = Document::parse(PAGE);
        assert!(doc.first(Selector::Id("ghost")).is_none());
        assert!(doc.first(Selector::Id("fake")).is_none());
        assert!(doc.first(Selector::Class("inner")).is_some());
        assert_eq!(doc.all(Selector::Attr("data-field")).len(), 1);
    }

    #[test]
    fn test_nested_same_tag_inner_html() {
        let doc = Document::parse(PAGE);
        let outer = doc.first(Selector::Id("outer")).unwrap();
        assert_eq!(
            doc.inner_html(outer),
            r#"<div class="inner x">one</div><img src="a.png" data-field="coverImage"><br/>"#
        );
    }

    #[test]
    fn test_text_skips_markup_scripts_and_comments() {
        let doc = Document::parse(PAGE);
        let body = doc.first(Selector::Tag("body")).unwrap();
        let text = doc.text(body);
        assert_eq!(text.split_whitespace().collect::<Vec<_>>(), vec!["one", "Crumb"]);

        let doc = Document::parse(
            r#"<article class="blog-post"><h1>R&amp;D</h1><p>First<br>second</p><form><textarea>draft</textarea><button>Save</button></form></article>"#,
        );
        let article = doc.first(Selector::Class("blog-post")).unwrap();
        assert_eq!(doc.text(article).split_whitespace().collect::<Vec<_>>(), vec!["R&D", "First", "second"]);
    }

    #[test]
    fn test_set_text_escapes() {
        let mut doc = Document::parse(PAGE);
        let inner = doc.first(Selector::Class("inner")).unwrap();
        doc.set_text(inner, "R&D <beta>");
        assert!(doc.html().contains(r#"<div class="inner x">R&amp;D &lt;beta&gt;</div>"#));
    }

    #[test]
    fn test_set_attr_rewrites_open_tag() {
        let mut doc = Document::parse(PAGE);
        let crumb = doc.first(Selector::Id("crumb")).unwrap();
        doc.set_attr(crumb, "href", "projects.html?category=A%20\"B\"");
        assert!(doc
            .html()
            .contains(r#"<a id="crumb" href="projects.html?category=A%20&quot;B&quot;">Crumb</a>"#));
    }

    #[test]
    fn test_add_class_and_style() {
        let mut doc = Document::parse(r#"<div class="a" style="color: red">x</div>"#);
        doc.add_class(0, "b");
        doc.add_class(0, "b");
        doc.set_style(0, "display", "none");
        doc.set_style(0, "color", "blue");
        assert_eq!(doc.html(), r#"<div class="a b" style="color: blue; display: none">x</div>"#);
    }

    #[test]
    fn test_remove_element() {
        let mut doc = Document::parse(r#"<p>a<span id="s">b<i>c</i></span>d</p>"#);
        let span = doc.first(Selector::Id("s")).unwrap();
        doc.remove(span);
        assert_eq!(doc.html(), "<p>ad</p>");
    }

    #[test]
    fn test_first_within_scopes_to_descendants() {
        let doc = Document::parse(r#"<h1>outside</h1><article class="blog-post"><h1>in</h1></article>"#);
        let article = doc.first(Selector::Class("blog-post")).unwrap();
        let h1 = doc.first_within(article, Selector::Tag("h1")).unwrap();
        assert_eq!(doc.inner_html(h1), "in");
    }

    #[test]
    fn test_prepend_to_body() {
        let mut doc = Document::parse(PAGE);
        doc.prepend_to_body("<aside id=\"sidebar\"></aside>");
        assert!(doc.html().contains("<body class=\"page\"><aside id=\"sidebar\"></aside>"));
        assert!(doc.first(Selector::Id("sidebar")).is_some());
    }

    #[test]
    fn test_unclosed_element_runs_to_parent_end() {
        let doc = Document::parse("<ul><li>one<li>two</ul><p id=\"after\">x</p>");
        let items = doc.all(Selector::Tag("li"));
        assert_eq!(items.len(), 2);
        assert!(doc.first(Selector::Id("after")).is_some());
    }
}
