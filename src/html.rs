//! HTML rendering of page views.

use anyhow::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt::Write;

use crate::feedback::{DEFAULT_RATING, MAX_RATING, MIN_RATING};
use crate::pages::{Block, ImageRef, NoticeKind, Page, PageView, Section, USER_GUIDE};
use crate::player::PlaybackOutcome;

pub const PAGE_TITLE: &str = "Real-Time Crowd Monitoring";

/// Where the played frame image is linked from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DocumentOptions<'a> {
    pub frame_src: &'a str,
    /// Append `?n=<frames>` so browsers refetch after each playback.
    pub cache_bust: bool,
}

impl Default for DocumentOptions<'_> {
    /// The HTTP service's `/frame.png` route.
    fn default() -> Self {
        Self {
            frame_src: "/frame.png",
            cache_bust: true,
        }
    }
}

const STYLE: &str = "body{margin:0;font-family:sans-serif;display:flex}\
nav{width:280px;min-height:100vh;background:#f0f2f6;padding:16px;box-sizing:border-box}\
nav a{display:block;padding:6px 8px;color:#262730;text-decoration:none;border-radius:4px}\
nav a.active{background:#ff4b4b;color:#fff}\
main{flex:1;padding:24px 48px}\
img{max-width:100%}\
.section{display:flex;gap:24px;align-items:center}\
.section>div{flex:1}\
.cards,.heatmaps{display:flex;flex-wrap:wrap;gap:12px}\
.card{flex:1;padding:10px;border-radius:5px;text-align:center;color:#fff}\
.heatmaps figure{flex:1 1 45%;margin:0}\
.notice{padding:12px;border-radius:5px;margin:12px 0}\
.warning{background:#fffce7;color:#926c05}\
.success{background:#edf9f0;color:#177233}\
.button{display:inline-block;padding:8px 16px;border:1px solid #ccc;border-radius:6px;text-decoration:none}";

/// Escape text for element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Full HTML document: navigation sidebar plus the page body.
pub fn render_document(view: &PageView) -> Result<String> {
    render_document_with(view, &DocumentOptions::default())
}

pub fn render_document_with(view: &PageView, options: &DocumentOptions<'_>) -> Result<String> {
    let mut out = String::new();
    write!(
        out,
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title><style>{}</style></head><body>",
        PAGE_TITLE, STYLE
    )?;
    render_sidebar(&mut out, view.page)?;
    write!(out, "<main><h1>{}</h1>", escape(&view.title))?;
    let mut in_heatmaps = false;
    for block in &view.blocks {
        let is_heatmap = matches!(block, Block::Heatmap { .. });
        if is_heatmap && !in_heatmaps {
            out.push_str("<div class=\"heatmaps\">");
        } else if !is_heatmap && in_heatmaps {
            out.push_str("</div>");
        }
        in_heatmaps = is_heatmap;
        render_block(&mut out, block, options)?;
    }
    if in_heatmaps {
        out.push_str("</div>");
    }
    out.push_str("</main></body></html>");
    Ok(out)
}

fn render_sidebar(out: &mut String, active: Page) -> Result<()> {
    out.push_str("<nav><h3>Navigation</h3>");
    for page in Page::ALL {
        let class = if page == active { " class=\"active\"" } else { "" };
        write!(
            out,
            "<a href=\"/pages/{}\"{}>{}</a>",
            page.slug(),
            class,
            escape(page.label())
        )?;
    }
    out.push_str("<h3>📘 User Guide &amp; Overview</h3>");
    for (title, topics) in USER_GUIDE {
        write!(out, "<details><summary>{}</summary><ul>", escape(title))?;
        for (topic, text) in topics {
            write!(out, "<li><b>{}:</b> {}</li>", escape(topic), escape(text))?;
        }
        out.push_str("</ul></details>");
    }
    out.push_str("<h3>Feedback</h3><form action=\"/feedback\" method=\"get\">");
    write!(
        out,
        "<label>Rate your experience <input type=\"range\" name=\"rating\" min=\"{}\" max=\"{}\" value=\"{}\"></label>",
        MIN_RATING, MAX_RATING, DEFAULT_RATING
    )?;
    out.push_str("<button type=\"submit\">Submit Rating</button></form></nav>");
    Ok(())
}

fn render_block(out: &mut String, block: &Block, options: &DocumentOptions<'_>) -> Result<()> {
    match block {
        Block::Heading(text) => write!(out, "<h3>{}</h3>", escape(text))?,
        Block::Paragraph(text) => write!(out, "<p>{}</p>", escape(text))?,
        Block::Bullets(items) => render_bullets(out, items)?,
        Block::Image(image) => render_image(out, image)?,
        Block::Section(section) => render_section(out, section)?,
        Block::Rule => out.push_str("<hr>"),
        Block::Download { href, label } => write!(
            out,
            "<a class=\"button\" href=\"{}\" download>{}</a>",
            escape(href),
            escape(label)
        )?,
        Block::PlayButton { href } => write!(
            out,
            "<a class=\"button\" href=\"{}\">▶️ Play Video</a>",
            escape(href)
        )?,
        Block::Playback(report) => {
            if report.frames_emitted > 0 {
                write!(out, "<img src=\"{}", escape(options.frame_src))?;
                if options.cache_bust {
                    write!(out, "?n={}", report.frames_emitted)?;
                }
                out.push_str("\" alt=\"last frame\">");
            }
            write!(
                out,
                "<p><i>Played {} frames ({}).</i></p>",
                report.frames_emitted,
                outcome_text(report.outcome)
            )?;
        }
        Block::Detected(labels) => write!(out, "<p>Detected: <b>{}</b></p>", escape(labels))?,
        Block::CountCards(counts) => {
            out.push_str("<div class=\"cards\">");
            for (class, count) in counts.iter() {
                write!(
                    out,
                    "<div class=\"card\" style=\"background-color:{}\">{}<br><h2>{}</h2></div>",
                    class.card_color(),
                    escape(class.card_title()),
                    count
                )?;
            }
            out.push_str("</div>");
        }
        Block::Heatmap { caption, frame } => {
            let png = frame.to_png()?;
            write!(
                out,
                "<figure><img src=\"data:image/png;base64,{}\" alt=\"heatmap\"><figcaption>{}</figcaption></figure>",
                STANDARD.encode(png),
                escape(caption)
            )?;
        }
        Block::Notice { kind, text } => {
            let class = match kind {
                NoticeKind::Warning => "warning",
                NoticeKind::Success => "success",
            };
            write!(out, "<div class=\"notice {}\">{}</div>", class, escape(text))?;
        }
    }
    Ok(())
}

fn render_bullets(out: &mut String, items: &[String]) -> Result<()> {
    out.push_str("<ul>");
    for item in items {
        write!(out, "<li>{}</li>", escape(item))?;
    }
    out.push_str("</ul>");
    Ok(())
}

fn render_image(out: &mut String, image: &ImageRef) -> Result<()> {
    write!(
        out,
        "<figure><img src=\"{}\" alt=\"{}\"><figcaption>{}</figcaption></figure>",
        escape(&image.src),
        escape(&image.caption),
        escape(&image.caption)
    )?;
    Ok(())
}

fn render_section(out: &mut String, section: &Section) -> Result<()> {
    let mut text = String::new();
    write!(
        text,
        "<div><h3>{}</h3><p>{}</p>",
        escape(&section.title),
        escape(&section.text)
    )?;
    render_bullets(&mut text, &section.bullets)?;
    text.push_str("</div>");

    let mut image = String::from("<div>");
    render_image(&mut image, &section.image)?;
    image.push_str("</div>");

    out.push_str("<div class=\"section\">");
    if section.image_first {
        out.push_str(&image);
        out.push_str(&text);
    } else {
        out.push_str(&text);
        out.push_str(&image);
    }
    out.push_str("</div>");
    Ok(())
}

fn outcome_text(outcome: PlaybackOutcome) -> &'static str {
    match outcome {
        PlaybackOutcome::Exhausted => "end of video",
        PlaybackOutcome::CapReached => "frame limit reached",
        PlaybackOutcome::SourceUnavailable => "video unavailable",
        PlaybackOutcome::DecodeFailed => "decode error",
    }
}
