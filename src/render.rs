// src/render.rs
//! HTML rendering of a trend board: two sections of fixed-height scrollable panels,
//! one panel per source, each with its own item template.

use std::fmt::Write as _;

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::sources::{Section, Source};
use crate::trends::types::{Metric, SourceSlot, TrendBoard, TrendItem};

const PLACEHOLDER_TEXT: &str = "Connecting to DynamoDB...";

const STYLE: &str = r#"
*{box-sizing:border-box}
body{margin:0;min-height:100vh;background:#0a0a0a;color:#f5f5f5;font-family:system-ui,-apple-system,"Segoe UI",sans-serif}
main{padding:24px}
@media(min-width:768px){main{padding:48px}}
header{margin-bottom:48px;text-align:center}
h1{font-size:2.5rem;font-weight:800;margin:0 0 16px;background:linear-gradient(90deg,#fb923c,#fbbf24);-webkit-background-clip:text;background-clip:text;color:transparent}
header p{color:#a3a3a3;margin:0}
.sections{max-width:80rem;margin:0 auto;display:flex;flex-direction:column;gap:48px}
.section-head h2{font-size:1.5rem;margin:0 0 24px}
.grid{display:grid;grid-template-columns:1fr;gap:24px}
@media(min-width:768px){.grid{grid-template-columns:repeat(2,1fr)}}
@media(min-width:1024px){.grid{grid-template-columns:repeat(3,1fr)}}
.card{background:rgba(23,23,23,.5);border:1px solid rgba(255,255,255,.05);border-radius:12px;overflow:hidden}
.card-head{padding:16px;border-bottom:1px solid rgba(255,255,255,.05);background:rgba(255,255,255,.05)}
.card-head h3{margin:0;font-size:1rem;font-weight:600;color:#e5e5e5}
.card-body{padding:16px;height:400px;overflow-y:auto}
.item{padding:12px 0;border-bottom:1px solid #262626;font-size:.875rem}
.item:last-child{border-bottom:0}
.row{display:flex;align-items:center;justify-content:space-between;gap:12px}
.meta{display:flex;justify-content:space-between;gap:8px;font-size:.75rem;color:#737373;margin-top:4px}
.rank{color:#737373;font-family:ui-monospace,monospace;font-size:.75rem;min-width:20px}
.views{color:#737373;font-size:.75rem}
.score{color:#f97316}
.star{color:#eab308}
.desc{margin:4px 0 0;font-size:.75rem;color:#737373}
a{color:inherit;text-decoration:none}
a:hover{color:#fb923c}
.placeholder{height:100%;display:flex;flex-direction:column;align-items:center;justify-content:center;gap:8px;color:#525252}
.spinner{width:24px;height:24px;border:2px solid #404040;border-top-color:#737373;border-radius:50%;animation:spin 1s linear infinite}
@keyframes spin{to{transform:rotate(360deg)}}
footer{margin-top:48px;text-align:center;font-size:.75rem;color:#525252}
"#;

/// Items shown for `source`: the stored order, truncated to the display cap.
pub fn visible_items(source: Source, items: &[TrendItem]) -> &[TrendItem] {
    match source.display_cap() {
        Some(cap) => &items[..items.len().min(cap)],
        None => items,
    }
}

pub fn render_page(board: &TrendBoard) -> String {
    let mut out = String::with_capacity(16 * 1024);
    out.push_str("<!doctype html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">");
    out.push_str("<title>Trending Pulse</title><style>");
    out.push_str(STYLE);
    out.push_str("</style></head><body><main>");
    out.push_str("<header><h1>Trending Pulse (AWS)</h1><p>Real-time insights. Powered by DynamoDB.</p></header>");
    out.push_str("<div class=\"sections\">");

    for section in Section::ALL {
        let _ = write!(
            out,
            "<section data-section=\"{}\"><div class=\"section-head\"><h2>{}</h2></div><div class=\"grid\">",
            section.slug(),
            encode_text(section.heading())
        );
        for source in section.sources() {
            render_card(&mut out, board.slot(source));
        }
        out.push_str("</div></section>");
    }

    let _ = write!(
        out,
        "</div><footer>Generated {}</footer></main></body></html>",
        board.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    out
}

fn render_card(out: &mut String, slot: &SourceSlot) {
    let source = slot.source;
    let _ = write!(
        out,
        "<article class=\"card\" data-source=\"{}\" data-state=\"{}\"><div class=\"card-head\"><h3>{}</h3></div><div class=\"card-body\">",
        source.key(),
        slot.status.as_str(),
        encode_text(source.title())
    );

    let items = visible_items(source, &slot.items);
    if items.is_empty() {
        render_placeholder(out);
    } else {
        for (i, item) in items.iter().enumerate() {
            let position = i + 1;
            out.push_str("<div class=\"item\">");
            match source {
                Source::Youtube => video_item(out, item),
                Source::Tiktok => short_video_item(out, item, position),
                Source::GoogleTrends => search_item(out, item, position),
                Source::Wikipedia => encyclopedia_item(out, item, position),
                Source::HackerNews => forum_item(out, item),
                Source::Github => repository_item(out, item),
            }
            out.push_str("</div>");
        }
    }
    out.push_str("</div></article>");
}

/// Same placeholder for "still loading", "confirmed empty" and "read failed".
fn render_placeholder(out: &mut String) {
    let _ = write!(
        out,
        "<div class=\"placeholder\"><div class=\"spinner\"></div><span>{PLACEHOLDER_TEXT}</span></div>"
    );
}

fn video_item(out: &mut String, item: &TrendItem) {
    let _ = write!(
        out,
        "<span class=\"title\">{}</span><div class=\"meta\"><span class=\"channel\">{}</span><span class=\"views\">{} views</span></div>",
        text(&item.title),
        text(&item.channel),
        metric(&item.views)
    );
}

fn short_video_item(out: &mut String, item: &TrendItem, position: usize) {
    let _ = write!(
        out,
        "<div class=\"row\"><span><span class=\"rank\">#{}</span> <span class=\"name\">{}</span></span><span class=\"views\">{}</span></div>",
        encode_text(&item.rank_label(position)),
        text(&item.name),
        metric(&item.views)
    );
}

fn search_item(out: &mut String, item: &TrendItem, position: usize) {
    let _ = write!(
        out,
        "<span class=\"rank\">{}</span> <span class=\"name\">{}</span>",
        position,
        text(&item.name)
    );
}

fn encyclopedia_item(out: &mut String, item: &TrendItem, position: usize) {
    let _ = write!(
        out,
        "<div class=\"row\"><span><span class=\"rank\">#{}</span> <span class=\"title\">{}</span></span><span class=\"views\">{}</span></div>",
        position,
        text(&item.title),
        metric(&item.views)
    );
}

fn forum_item(out: &mut String, item: &TrendItem) {
    link(out, "title", item.url.as_deref(), &text(&item.title));
    let _ = write!(
        out,
        "<div class=\"meta\"><span class=\"score\">{} pts</span><span>&bull;</span><span class=\"glyph\">&#8599;</span></div>",
        metric(&item.score)
    );
}

fn repository_item(out: &mut String, item: &TrendItem) {
    out.push_str("<div class=\"row\">");
    link(out, "name", item.url.as_deref(), &text(&item.name));
    let _ = write!(
        out,
        "<span class=\"stars\"><span class=\"star\">&#9733;</span> {}</span></div><p class=\"desc\">{}</p>",
        metric(&item.stars),
        text(&item.description)
    );
}

/// Outbound link in a new browsing context; plain label when the url is unusable.
fn link(out: &mut String, class: &str, url: Option<&str>, label_html: &str) {
    match url.and_then(safe_href) {
        Some(href) => {
            let _ = write!(
                out,
                "<a class=\"{class}\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{label_html}</a>",
                encode_double_quoted_attribute(href)
            );
        }
        None => {
            let _ = write!(out, "<span class=\"{class}\">{label_html}</span>");
        }
    }
}

/// Only http(s) targets become links.
fn safe_href(url: &str) -> Option<&str> {
    let u = url.trim();
    let lower = u.get(..8).unwrap_or(u).to_ascii_lowercase();
    (lower.starts_with("http://") || lower.starts_with("https://")).then_some(u)
}

fn text(v: &Option<String>) -> String {
    v.as_deref().map(|s| encode_text(s).into_owned()).unwrap_or_default()
}

fn metric(v: &Option<Metric>) -> String {
    v.as_ref()
        .map(|m| encode_text(&m.to_string()).into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trends::types::SourceSlot;
    use chrono::Utc;

    fn named(n: usize) -> Vec<TrendItem> {
        (1..=n)
            .map(|i| TrendItem {
                title: Some(format!("t{i}")),
                name: Some(format!("n{i}")),
                ..Default::default()
            })
            .collect()
    }

    fn card<'a>(html: &'a str, source: Source) -> &'a str {
        let start = html
            .find(&format!("data-source=\"{}\"", source.key()))
            .expect("card present");
        let end = html[start..].find("</article>").expect("card closed");
        &html[start..start + end]
    }

    #[test]
    fn caps_apply_per_source() {
        let items = named(12);
        assert_eq!(visible_items(Source::Youtube, &items).len(), 8);
        assert_eq!(visible_items(Source::Tiktok, &items).len(), 8);
        assert_eq!(visible_items(Source::Wikipedia, &items).len(), 10);
        assert_eq!(visible_items(Source::GoogleTrends, &items).len(), 12);
        assert_eq!(visible_items(Source::HackerNews, &items).len(), 12);
        assert_eq!(visible_items(Source::Github, &items).len(), 12);
        assert_eq!(visible_items(Source::Youtube, &items[..3]).len(), 3);
    }

    #[test]
    fn empty_slots_render_the_placeholder() {
        let html = render_page(&TrendBoard::empty(Utc::now()));
        for s in Source::ALL {
            let c = card(&html, s);
            assert!(c.contains(PLACEHOLDER_TEXT), "{s:?} should show placeholder");
            assert!(!c.contains("class=\"item\""));
        }
    }

    #[test]
    fn short_video_rank_falls_back_to_position() {
        let mut items = named(3);
        items[0].rank = Some(Metric::Int(5));
        let board =
            TrendBoard::empty(Utc::now()).with_slot(SourceSlot::loaded(Source::Tiktok, items));
        let html = render_page(&board);
        let c = card(&html, Source::Tiktok);
        assert!(c.contains(">#5<"));
        assert!(c.contains(">#2<"));
        assert!(c.contains(">#3<"));
    }

    #[test]
    fn short_video_text_rank_is_escaped_not_replaced() {
        let mut items = named(2);
        items[0].rank = Some(Metric::Text("<b>top</b>".into()));
        items[1].rank = Some(Metric::Float(1.5));
        let board =
            TrendBoard::empty(Utc::now()).with_slot(SourceSlot::loaded(Source::Tiktok, items));
        let html = render_page(&board);
        let c = card(&html, Source::Tiktok);
        assert!(c.contains(">#&lt;b&gt;top&lt;/b&gt;<"));
        assert!(c.contains(">#1.5<"));
        assert!(!c.contains("<b>top</b>"));
    }

    #[test]
    fn links_open_in_new_context_and_reject_script_urls() {
        let items = vec![
            TrendItem {
                title: Some("Show HN".into()),
                url: Some("https://example.com/a?x=1&y=2".into()),
                score: Some(Metric::Int(321)),
                ..Default::default()
            },
            TrendItem {
                title: Some("sneaky".into()),
                url: Some("javascript:alert(1)".into()),
                ..Default::default()
            },
        ];
        let board =
            TrendBoard::empty(Utc::now()).with_slot(SourceSlot::loaded(Source::HackerNews, items));
        let html = render_page(&board);
        let c = card(&html, Source::HackerNews);
        assert!(c.contains("href=\"https://example.com/a?x=1&amp;y=2\" target=\"_blank\""));
        assert!(c.contains("321 pts"));
        assert!(!c.contains("javascript:"));
        assert!(c.contains("<span class=\"title\">sneaky</span>"));
    }

    #[test]
    fn store_text_is_escaped_and_nulls_are_blank() {
        let items = vec![TrendItem {
            name: Some("<script>x</script>".into()),
            stars: Some(Metric::Int(9)),
            description: None,
            ..Default::default()
        }];
        let board =
            TrendBoard::empty(Utc::now()).with_slot(SourceSlot::loaded(Source::Github, items));
        let html = render_page(&board);
        let c = card(&html, Source::Github);
        assert!(c.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(!c.contains("<script>"));
        assert!(c.contains("<p class=\"desc\"></p>"));
        assert!(!c.contains("null"));
    }
}
