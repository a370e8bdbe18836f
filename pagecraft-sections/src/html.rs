//! Converts a rendered [`VisualNode`] tree to safe HTML.
//! No script, no inline event handlers; only structure and styles.

use log::debug;
use regex::Regex;
use std::collections::HashSet;
use std::fmt::Write;
use std::sync::OnceLock;

use crate::catalog::ListCache;
use crate::design::{BackgroundType, ResolvedDesign};
use crate::error::SectionsResult;
use crate::page::Page;
use crate::render;
use crate::visual::{
    AlignItems, Dimension, FlexDirection, NoticeLevel, Style, TextAlign, VisualNode,
};

/// Base document styles (html, body, section wrapper, markdown bodies).
const BASE_STYLES: &str = "html,body{margin:0;font-family:system-ui,-apple-system,sans-serif;}\
.pc-section{position:relative;overflow:hidden;}\
.pc-overlay{position:absolute;inset:0;pointer-events:none;}\
.pc-inner{position:relative;max-width:1200px;margin:0 auto;padding:0 24px;}\
.pc-markdown{line-height:1.7;}\
.pc-markdown h1,.pc-markdown h2,.pc-markdown h3{font-weight:700;margin:1.5em 0 0.5em;line-height:1.25;}\
.pc-markdown p{margin:0.75em 0;}\
.pc-markdown a{color:inherit;text-decoration:underline;}\
.pc-markdown code{font-family:monospace;font-size:0.875em;}\
.pc-markdown blockquote{border-left:3px solid currentColor;margin:1em 0;padding:0.5em 1em;opacity:0.85;}\
.pc-markdown table{border-collapse:collapse;width:100%;margin:1em 0;}\
.pc-markdown th,.pc-markdown td{border:1px solid rgba(127,127,127,0.4);padding:0.5em 0.75em;text-align:left;}\
.pc-loading{padding:32px;text-align:center;opacity:0.7;}\
.pc-notice{padding:16px;border-radius:8px;margin:16px 0;}\
.pc-notice-info{background:#eff6ff;color:#1e3a8a;}\
.pc-notice-error{background:#fef2f2;color:#991b1b;}\
.pc-diagnostic pre{white-space:pre-wrap;font-size:13px;background:#fff;padding:12px;border-radius:6px;}";

/// Allowed HTML tags for markdown output (safe subset).
const MARKDOWN_ALLOWED_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "ul", "ol", "li", "table", "thead", "tbody", "tr", "th", "td",
    "a", "strong", "em", "del", "code", "pre", "blockquote", "hr", "br", "span", "div", "img",
];

/// Tags kept in editor-supplied HTML, on top of the markdown set.
const CUSTOM_HTML_EXTRA_TAGS: &[&str] = &[
    "section", "article", "header", "footer", "figure", "figcaption", "small", "b", "i", "u", "s",
    "sub", "sup", "mark",
];

/// Render a page to a standalone HTML document.
pub fn page_to_html(page: &Page, cache: &ListCache) -> SectionsResult<String> {
    let root = render::render_page(page, cache);
    let body = render_fragment(&root)?;

    let title = if page.title.trim().is_empty() {
        "Page"
    } else {
        page.title.as_str()
    };
    let description = page
        .meta_description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .map(|d| format!("\n<meta name=\"description\" content=\"{}\">", escape_html(d)))
        .unwrap_or_default();

    let mut html = String::new();
    write!(
        html,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1">{}
<title>{}</title>
<style>{}</style>
</head>
<body>
{}
</body>
</html>
"#,
        description,
        escape_html(title),
        BASE_STYLES,
        body
    )?;

    Ok(html)
}

/// Serialize a node and its descendants to an HTML fragment
pub fn render_fragment(node: &VisualNode) -> SectionsResult<String> {
    let mut out = String::new();
    node_to_html(node, &mut out)?;
    Ok(out)
}

pub fn node_to_html(node: &VisualNode, out: &mut String) -> std::fmt::Result {
    match node {
        VisualNode::Section(frame) => {
            write!(
                out,
                "<section class=\"pc-section\" data-section-id=\"{}\" data-section-type=\"{}\" style=\"{}\">",
                escape_html(&frame.key),
                escape_html(&frame.kind),
                design_to_css(&frame.design)
            )?;
            if let Some(overlay) = overlay_css(&frame.design) {
                write!(out, "<div class=\"pc-overlay\" style=\"{}\"></div>", overlay)?;
            }
            write!(out, "<div class=\"pc-inner\">")?;
            children_to_html(&frame.children, out)?;
            write!(out, "</div></section>")?;
        }
        VisualNode::Container(container) => {
            write!(out, "<div{}>", style_attr(container.style.as_ref(), ""))?;
            children_to_html(&container.children, out)?;
            write!(out, "</div>")?;
        }
        VisualNode::Flex(flex) => {
            let mut layout = String::from("display:flex;");
            let dir = match flex.direction {
                FlexDirection::Row => "row",
                FlexDirection::Column => "column",
            };
            layout.push_str(&format!("flex-direction:{};", dir));
            if let Some(a) = &flex.align {
                layout.push_str(&format!("align-items:{};", align_items_to_css(a)));
            }
            if flex.wrap {
                layout.push_str("flex-wrap:wrap;");
            }
            if let Some(g) = flex.gap {
                layout.push_str(&format!("gap:{}px;", g));
            }
            write!(out, "<div{}>", style_attr(flex.style.as_ref(), &layout))?;
            children_to_html(&flex.children, out)?;
            write!(out, "</div>")?;
        }
        VisualNode::Grid(grid) => {
            let mut layout = format!(
                "display:grid;grid-template-columns:repeat({},minmax(0,1fr));",
                grid.columns.max(1)
            );
            if let Some(g) = grid.gap {
                layout.push_str(&format!("gap:{}px;", g));
            }
            write!(out, "<div{}>", style_attr(grid.style.as_ref(), &layout))?;
            children_to_html(&grid.children, out)?;
            write!(out, "</div>")?;
        }
        VisualNode::Text(text) => {
            write!(
                out,
                "<p{}>{}</p>",
                style_attr(text.style.as_ref(), "margin:0;"),
                escape_html(&text.text)
            )?;
        }
        VisualNode::Heading(heading) => {
            let level = heading.level.clamp(1, 6);
            write!(
                out,
                "<h{}{}>{}</h{}>",
                level,
                style_attr(heading.style.as_ref(), "margin:0;"),
                escape_html(&heading.text),
                level
            )?;
        }
        VisualNode::Markdown(markdown) => {
            write!(
                out,
                "<div class=\"pc-markdown\"{}>{}</div>",
                style_attr(markdown.style.as_ref(), ""),
                markdown_to_sanitized_html(&markdown.source)
            )?;
        }
        VisualNode::Image(image) => {
            write!(
                out,
                "<img src=\"{}\" alt=\"{}\"{}>",
                escape_html(&safe_url(&image.src)),
                escape_html(&image.alt),
                style_attr(image.style.as_ref(), "display:block;")
            )?;
        }
        VisualNode::Button(button) => {
            let target = if button.new_tab {
                " target=\"_blank\" rel=\"noopener noreferrer\""
            } else {
                ""
            };
            write!(
                out,
                "<a href=\"{}\"{}{}>{}</a>",
                escape_html(&safe_url(&button.href)),
                target,
                style_attr(button.style.as_ref(), "display:inline-block;text-decoration:none;"),
                escape_html(&button.text)
            )?;
        }
        VisualNode::EmailForm(form) => {
            let action = if form.action.trim().is_empty() {
                "#".to_string()
            } else {
                safe_url(&form.action)
            };
            write!(
                out,
                "<form method=\"post\" action=\"{}\"{}>",
                escape_html(&action),
                style_attr(form.style.as_ref(), "display:flex;gap:8px;flex-wrap:wrap;")
            )?;
            write!(
                out,
                "<input type=\"email\" name=\"email\" required placeholder=\"{}\" style=\"flex:1;min-width:220px;padding:12px;border-radius:8px;border:1px solid #d4d4d8;\">",
                escape_html(&form.placeholder)
            )?;
            write!(
                out,
                "<button type=\"submit\"{}>{}</button>",
                style_attr(form.button_style.as_ref(), "border:none;cursor:pointer;"),
                escape_html(&form.button_text)
            )?;
            write!(out, "</form>")?;
        }
        VisualNode::Divider(divider) => {
            let style = divider.style.clone().unwrap_or_default();
            let mut css = String::from("border:none;");
            css.push_str(&format!(
                "border-top:{}px solid {};",
                style.border_width.unwrap_or(1.0),
                style.border_color.as_deref().unwrap_or("currentColor")
            ));
            let spacing = Style {
                margin_top: style.margin_top,
                margin_bottom: style.margin_bottom,
                ..Style::default()
            };
            css.push_str(&style_to_css(&spacing));
            write!(out, "<hr style=\"{}\">", css)?;
        }
        VisualNode::Spacer(spacer) => {
            write!(out, "<div aria-hidden=\"true\" style=\"height:{}px;\"></div>", spacer.size)?;
        }
        VisualNode::Html(raw) => {
            write!(out, "<div class=\"pc-html\">{}</div>", sanitize_custom_html(&raw.html))?;
        }
        VisualNode::Video(video) => {
            let src = escape_html(&safe_url(&video.src));
            let style = style_attr(video.style.as_ref(), "display:block;border:none;aspect-ratio:16/9;");
            if is_video_file(&video.src) {
                let autoplay = if video.autoplay { " autoplay muted loop playsinline" } else { "" };
                write!(out, "<video src=\"{}\" controls{}{}></video>", src, autoplay, style)?;
            } else {
                write!(
                    out,
                    "<iframe src=\"{}\" allow=\"autoplay; encrypted-media; picture-in-picture\" allowfullscreen{}></iframe>",
                    src, style
                )?;
            }
        }
        VisualNode::Loading(loading) => {
            write!(
                out,
                "<div class=\"pc-loading\" role=\"status\">{}</div>",
                escape_html(&loading.label)
            )?;
        }
        VisualNode::Notice(notice) => {
            let (class, role) = match notice.level {
                NoticeLevel::Info => ("pc-notice-info", "status"),
                NoticeLevel::Error => ("pc-notice-error", "alert"),
            };
            write!(
                out,
                "<div class=\"pc-notice {}\" role=\"{}\">{}</div>",
                class,
                role,
                escape_html(&notice.message)
            )?;
        }
        VisualNode::Diagnostic(diag) => {
            write!(
                out,
                "<div class=\"pc-diagnostic\"><strong>Unknown section type: {}</strong><pre>{}</pre></div>",
                escape_html(&diag.kind),
                escape_html(&diag.dump)
            )?;
        }
    }
    Ok(())
}

fn children_to_html(children: &[VisualNode], out: &mut String) -> std::fmt::Result {
    for child in children {
        node_to_html(child, out)?;
    }
    Ok(())
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Script URLs become `#`
fn safe_url(url: &str) -> String {
    let trimmed = url.trim();
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("javascript:") || lower.starts_with("vbscript:") || lower.starts_with("data:text/html") {
        debug!("dropping unsafe url '{}'", trimmed);
        return "#".to_string();
    }
    trimmed.to_string()
}

fn is_video_file(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or("").to_ascii_lowercase();
    [".mp4", ".webm", ".ogg", ".mov"].iter().any(|ext| path.ends_with(ext))
}

/// ` style="..."` with `prefix` declarations first; empty when there is nothing to emit
fn style_attr(style: Option<&Style>, prefix: &str) -> String {
    let mut css = prefix.to_string();
    if let Some(style) = style {
        css.push_str(&style_to_css(style));
    }
    if css.is_empty() {
        String::new()
    } else {
        format!(" style=\"{}\"", escape_html(&css))
    }
}

fn style_to_css(style: &Style) -> String {
    let mut css = String::new();

    // Dimensions
    if let Some(w) = &style.width {
        css.push_str(&format!("width:{};", dimension_to_css(w)));
    }
    if let Some(w) = style.max_width {
        css.push_str(&format!("max-width:{}px;margin-left:auto;margin-right:auto;", w));
    }
    if let Some(h) = style.height {
        css.push_str(&format!("height:{}px;", h));
    }

    // Padding: shorthand first, sides override it
    if let Some(p) = style.padding {
        css.push_str(&format!("padding:{}px;", p));
    }
    if let Some(v) = style.padding_top {
        css.push_str(&format!("padding-top:{}px;", v));
    }
    if let Some(v) = style.padding_bottom {
        css.push_str(&format!("padding-bottom:{}px;", v));
    }
    if let Some(v) = style.margin_top {
        css.push_str(&format!("margin-top:{}px;", v));
    }
    if let Some(v) = style.margin_bottom {
        css.push_str(&format!("margin-bottom:{}px;", v));
    }

    // Colors
    if let Some(c) = &style.color {
        css.push_str(&format!("color:{};", c));
    }
    if let Some(c) = &style.background_color {
        css.push_str(&format!("background-color:{};", c));
    }
    if let Some(b) = &style.background {
        css.push_str(&format!("background:{};", b));
    }
    if let Some(o) = style.opacity {
        css.push_str(&format!("opacity:{};", o));
    }

    // Border
    if let Some(w) = style.border_width {
        let color = style.border_color.as_deref().unwrap_or("currentColor");
        css.push_str(&format!("border:{}px solid {};", w, color));
    } else if let Some(c) = &style.border_color {
        css.push_str(&format!("border-color:{};", c));
    }
    if let Some(r) = style.border_radius {
        css.push_str(&format!("border-radius:{}px;", r));
    }

    // Typography
    if let Some(s) = style.font_size {
        css.push_str(&format!("font-size:{}px;", s));
    }
    if let Some(w) = style.font_weight {
        css.push_str(&format!("font-weight:{};", w));
    }
    if let Some(a) = &style.text_align {
        css.push_str(&format!("text-align:{};", text_align_to_css(a)));
    }
    if let Some(l) = style.letter_spacing {
        css.push_str(&format!("letter-spacing:{}px;", l));
    }
    if style.uppercase == Some(true) {
        css.push_str("text-transform:uppercase;");
    }

    css
}

/// Declarations for a section wrapper: background per mode, text color, paddings
pub fn design_to_css(design: &ResolvedDesign) -> String {
    let mut css = String::new();
    match design.background_type {
        BackgroundType::Color => {
            css.push_str(&format!("background-color:{};", design.background_color));
        }
        BackgroundType::Gradient => {
            css.push_str(&format!(
                "background:linear-gradient(135deg,{},{});",
                design.gradient_from, design.gradient_to
            ));
        }
        BackgroundType::Image => {
            css.push_str(&format!("background-color:{};", design.background_color));
            let url = safe_url(&design.background_image_url);
            if !url.is_empty() && url != "#" {
                css.push_str(&format!(
                    "background-image:url('{}');background-size:cover;background-position:center;",
                    escape_css_string(&url)
                ));
            }
        }
    }
    css.push_str(&format!("color:{};", design.text_color));
    css.push_str(&format!(
        "padding-top:{}px;padding-bottom:{}px;",
        design.padding_top, design.padding_bottom
    ));
    escape_html(&css)
}

/// Overlay shown over image backgrounds. Opacity is emitted as stored.
fn overlay_css(design: &ResolvedDesign) -> Option<String> {
    if design.background_type != BackgroundType::Image || design.overlay_opacity == 0.0 {
        return None;
    }
    Some(format!("background:rgba(0,0,0,{});", design.overlay_opacity))
}

fn escape_css_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

fn dimension_to_css(d: &Dimension) -> String {
    match d {
        Dimension::Pixels(p) => format!("{}px", p),
        Dimension::Percent(s) => s.clone(),
    }
}

fn align_items_to_css(a: &AlignItems) -> &'static str {
    match a {
        AlignItems::Start => "flex-start",
        AlignItems::Center => "center",
        AlignItems::End => "flex-end",
        AlignItems::Stretch => "stretch",
    }
}

fn text_align_to_css(a: &TextAlign) -> &'static str {
    match a {
        TextAlign::Left => "left",
        TextAlign::Center => "center",
        TextAlign::Right => "right",
        TextAlign::Justify => "justify",
    }
}

/// Render markdown to sanitized HTML (safe tags only, no script URLs).
pub fn markdown_to_sanitized_html(md: &str) -> String {
    use pulldown_cmark::{Options, Parser};
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(md, opts);
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);
    let html = strip_script_urls(&html);
    let html = sanitize_html_fragment(&html, MARKDOWN_ALLOWED_TAGS, &[]);
    strip_event_handlers(&html)
}

/// Sanitize editor-supplied HTML for `custom_html` blocks and `html` sections.
pub fn sanitize_custom_html(html: &str) -> String {
    let html = strip_script_urls(html);
    let html = sanitize_html_fragment(&html, MARKDOWN_ALLOWED_TAGS, CUSTOM_HTML_EXTRA_TAGS);
    strip_event_handlers(&html)
}

fn strip_script_urls(html: &str) -> String {
    static SCRIPT_URL_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = SCRIPT_URL_REGEX
        .get_or_init(|| Regex::new(r"(?i)(javascript|vbscript)\s*:").expect("valid script url pattern"));
    re.replace_all(html, "").into_owned()
}

/// Remove `on*=` attributes from tags that survived sanitizing
fn strip_event_handlers(html: &str) -> String {
    static EVENT_ATTR_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = EVENT_ATTR_REGEX.get_or_init(|| {
        Regex::new(r#"(?i)\s+on[a-z]+\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#).expect("valid event attribute pattern")
    });
    re.replace_all(html, "").into_owned()
}

/// Keep only allowed tags; escape others so they display as text.
fn sanitize_html_fragment(html: &str, allowed: &[&str], extra: &[&str]) -> String {
    let allowed: HashSet<&str> = allowed.iter().chain(extra.iter()).copied().collect();
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let tag_text = &rest[start + 1..];
        let name: String = tag_text
            .trim_start_matches('/')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match tag_text.find('>') {
            Some(end) if !name.is_empty() && allowed.contains(name.as_str()) => {
                out.push_str(&rest[start..start + 1 + end + 1]);
                rest = &tag_text[end + 1..];
            }
            _ => {
                out.push_str("&lt;");
                rest = tag_text;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SectionKind;
    use crate::section::Section;
    use crate::visual::{Button, RawHtml};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn escapes_text() {
        let html = render_fragment(&VisualNode::text("<b>&\"", None)).unwrap();
        assert_eq!(html, "<p style=\"margin:0;\">&lt;b&gt;&amp;&quot;</p>");
    }

    #[test]
    fn markdown_drops_scripts_and_handlers() {
        let html = markdown_to_sanitized_html(
            "# Title\n\n[x](javascript:alert(1))\n\n<script>alert(1)</script>\n\n<a href=\"/\" onclick=\"x()\">a</a>",
        );
        assert!(html.contains("<h1>Title</h1>"));
        assert!(!html.contains("javascript:"));
        assert!(!html.contains("<script>"));
        assert!(!html.contains("onclick"));
    }

    #[test]
    fn custom_html_keeps_allowed_tags() {
        let html = sanitize_custom_html("<section><b onmouseover='x'>Hi</b><iframe src=x></iframe></section>");
        assert_eq!(html, "<section><b>Hi</b>&lt;iframe src=x>&lt;/iframe></section>");
    }

    #[test]
    fn unsafe_button_links_are_neutralised() {
        let node = VisualNode::Button(Button {
            text: "Go".to_string(),
            href: "JavaScript:alert(1)".to_string(),
            new_tab: true,
            style: None,
        });
        let html = render_fragment(&node).unwrap();
        assert!(html.starts_with("<a href=\"#\" target=\"_blank\""));
    }

    #[test]
    fn raw_html_node_is_sanitized() {
        let node = VisualNode::Html(RawHtml {
            html: "<p>ok</p><script>bad()</script>".to_string(),
        });
        let html = render_fragment(&node).unwrap();
        assert_eq!(
            html,
            "<div class=\"pc-html\"><p>ok</p>&lt;script>bad()&lt;/script></div>"
        );
    }

    #[test]
    fn gradient_design_css() {
        let design = ResolvedDesign::gradient("#0f172a", "#1e293b", "#ffffff", 96);
        assert_eq!(
            design_to_css(&design),
            "background:linear-gradient(135deg,#0f172a,#1e293b);color:#ffffff;padding-top:96px;padding-bottom:96px;"
        );
        assert_eq!(overlay_css(&design), None);
    }

    #[test]
    fn image_design_emits_overlay() {
        let mut design = ResolvedDesign::solid("#000000", "#ffffff", 80).with_overlay(0.4);
        design.background_type = BackgroundType::Image;
        design.background_image_url = "https://cdn.example.com/bg.jpg".to_string();
        assert!(design_to_css(&design).contains("background-image:url('https://cdn.example.com/bg.jpg')"));
        assert_eq!(overlay_css(&design).as_deref(), Some("background:rgba(0,0,0,0.4);"));
    }

    #[test]
    fn page_document_has_title_description_and_section_ids() {
        let mut hero = Section::new(SectionKind::Hero);
        hero.id = Some("sec_hero".into());
        let unknown: Section = serde_json::from_value(json!({
            "type": "carousel",
            "data": { "slides": [] }
        }))
        .unwrap();
        let page = Page {
            title: "Home <1>".to_string(),
            slug: "home".to_string(),
            meta_description: Some("Welcome".to_string()),
            content: vec![hero, unknown],
            ..Page::default()
        };
        let html = page_to_html(&page, &ListCache::new()).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Home &lt;1&gt;</title>"));
        assert!(html.contains("<meta name=\"description\" content=\"Welcome\">"));
        assert!(html.contains("data-section-id=\"sec_hero\" data-section-type=\"hero\""));
        assert!(html.contains("data-section-id=\"section-1\" data-section-type=\"carousel\""));
        assert!(html.contains("Unknown section type: carousel"));
    }
}
