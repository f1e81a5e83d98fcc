//! Lays out rendered Markdown as an egui text job.

use client_core::{
    markdown::{LineKind, SpanStyle, StyledLine},
    StyledText,
};
use eframe::egui::{self, text::LayoutJob, FontId, Stroke, TextFormat};

use crate::ui::theme::Palette;

const BODY_SIZE: f32 = 14.0;

fn heading_size(level: u8) -> f32 {
    match level {
        1 => 22.0,
        2 => 19.0,
        3 => 17.0,
        _ => 15.0,
    }
}

fn line_prefix(kind: LineKind) -> String {
    match kind {
        LineKind::ListItem { depth, marker } => {
            let indent = "    ".repeat(depth);
            match marker {
                Some(n) => format!("{indent}{n}. "),
                None => format!("{indent}• "),
            }
        }
        LineKind::Quote => "▎ ".to_string(),
        _ => String::new(),
    }
}

fn span_format(kind: LineKind, style: &SpanStyle, palette: &Palette) -> TextFormat {
    let size = match kind {
        LineKind::Heading(level) => heading_size(level),
        _ => BODY_SIZE,
    };
    let monospace = style.code || kind == LineKind::Code;

    let mut format = TextFormat {
        font_id: if monospace {
            FontId::monospace(size - 1.0)
        } else {
            FontId::proportional(size)
        },
        color: palette.text,
        italics: style.emphasis || kind == LineKind::Quote,
        ..Default::default()
    };

    // The default fonts have no bold face; strong text is drawn at full contrast instead.
    if style.strong || matches!(kind, LineKind::Heading(_)) {
        format.color = palette.strong_text;
        format.extra_letter_spacing = 0.4;
    }
    if monospace {
        format.background = palette.code_background;
    }
    if style.strikethrough {
        format.strikethrough = Stroke::new(1.0, palette.text);
    }
    if style.link.is_some() {
        format.color = palette.link;
        format.underline = Stroke::new(1.0, palette.link);
    }
    format
}

fn append_line(job: &mut LayoutJob, line: &StyledLine, palette: &Palette) {
    if line.kind == LineKind::Rule {
        job.append(
            "────────────",
            0.0,
            TextFormat {
                font_id: FontId::proportional(BODY_SIZE),
                color: palette.hint_text,
                ..Default::default()
            },
        );
        return;
    }

    let prefix = line_prefix(line.kind);
    if !prefix.is_empty() {
        job.append(
            &prefix,
            0.0,
            TextFormat {
                font_id: FontId::proportional(BODY_SIZE),
                color: palette.hint_text,
                ..Default::default()
            },
        );
    }
    for span in &line.spans {
        job.append(&span.text, 0.0, span_format(line.kind, &span.style, palette));
    }
}

pub fn layout_styled_text(text: &StyledText, palette: &Palette, wrap_width: f32) -> LayoutJob {
    let mut job = LayoutJob::default();
    job.wrap.max_width = wrap_width;
    for (i, line) in text.lines.iter().enumerate() {
        if i > 0 {
            job.append(
                "\n",
                0.0,
                TextFormat {
                    font_id: FontId::proportional(BODY_SIZE),
                    color: palette.text,
                    ..Default::default()
                },
            );
        }
        append_line(&mut job, line, palette);
    }
    job
}

/// Plain user text, laid out verbatim.
pub fn layout_plain_text(text: &str, palette: &Palette, wrap_width: f32) -> LayoutJob {
    let mut job = LayoutJob::default();
    job.wrap.max_width = wrap_width;
    job.append(
        text,
        0.0,
        TextFormat {
            font_id: egui::FontId::proportional(BODY_SIZE),
            color: palette.text,
            ..Default::default()
        },
    );
    job
}
