//! Line-oriented transcript with ANSI styling.

use std::io::Write;

use client_core::{
    markdown::{LineKind, StyledLine, StyledSpan},
    StyledText, ThemePresenter, TranscriptView,
};
use crossterm::{
    cursor, queue,
    style::{Color, Stylize},
    terminal::{Clear, ClearType},
};
use shared::domain::Theme;

const LIGHT_ICON: &str = "☀";
const DARK_ICON: &str = "☾";

#[derive(Debug, Clone, Copy)]
struct Palette {
    user: Color,
    assistant: Color,
    error: Color,
    code: Color,
    muted: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                user: Color::Cyan,
                assistant: Color::Green,
                error: Color::Red,
                code: Color::Yellow,
                muted: Color::DarkGrey,
            },
            Theme::Light => Self {
                user: Color::DarkBlue,
                assistant: Color::DarkGreen,
                error: Color::DarkRed,
                code: Color::DarkMagenta,
                muted: Color::Grey,
            },
        }
    }
}

pub struct TerminalView<W: Write> {
    out: W,
    theme: Option<Theme>,
    palette: Palette,
    light_icon_visible: bool,
    dark_icon_visible: bool,
    typing_visible: bool,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            theme: None,
            palette: Palette::for_theme(Theme::Dark),
            light_icon_visible: false,
            dark_icon_visible: false,
            typing_visible: false,
        }
    }

    pub fn banner(&mut self, server_url: &str) {
        let line = format!(
            "Connected to {server_url}. Type a question, /theme to switch theme, /quit to leave."
        );
        let styled = line.with(self.palette.muted).to_string();
        self.emit_line(&styled);
    }

    pub fn prompt(&mut self) {
        let icon = if self.light_icon_visible {
            LIGHT_ICON
        } else if self.dark_icon_visible {
            DARK_ICON
        } else {
            ""
        };
        let prompt = format!("{icon} you> ").with(self.palette.user).bold().to_string();
        self.emit(&prompt);
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(err) = write!(self.out, "{text}").and_then(|()| self.out.flush()) {
            tracing::warn!("failed to write to terminal: {err}");
        }
    }

    fn emit_line(&mut self, text: &str) {
        self.clear_typing();
        self.emit(&format!("{text}\n"));
    }

    fn clear_typing(&mut self) {
        if !self.typing_visible {
            return;
        }
        self.typing_visible = false;
        if let Err(err) = queue!(
            self.out,
            cursor::MoveToColumn(0),
            Clear(ClearType::CurrentLine)
        ) {
            tracing::warn!("failed to clear typing indicator: {err}");
        }
    }

    fn entry(&mut self, label: &str, color: Color, body: &StyledText) {
        let header = label.with(color).bold().to_string();
        self.emit_line(&header);
        let lines: Vec<String> = body
            .lines
            .iter()
            .map(|line| render_line(line, self.palette))
            .collect();
        for line in lines {
            self.emit_line(&line);
        }
        self.emit_line("");
    }
}

impl<W: Write> TranscriptView for TerminalView<W> {
    type Markup = StyledText;

    fn append_user_turn(&mut self, text: &str) {
        let header = "you".with(self.palette.user).bold().to_string();
        self.emit_line(&header);
        // Shown as typed, no Markdown.
        for line in text.lines() {
            self.emit_line(line);
        }
        self.emit_line("");
    }

    fn append_ai_turn(&mut self, markup: StyledText) {
        self.entry("assistant", self.palette.assistant, &markup);
    }

    fn append_error(&mut self, markup: StyledText) {
        self.entry("error", self.palette.error, &markup);
    }

    fn set_pending(&mut self, pending: bool) {
        if pending {
            let indicator = "assistant is typing…".with(self.palette.muted).italic().to_string();
            self.emit(&indicator);
            self.typing_visible = true;
        } else {
            self.clear_typing();
            if let Err(err) = self.out.flush() {
                tracing::warn!("failed to flush terminal: {err}");
            }
        }
    }
}

impl<W: Write> ThemePresenter for TerminalView<W> {
    fn theme_attribute(&self) -> Option<Theme> {
        self.theme
    }

    fn set_theme_attribute(&mut self, theme: Theme) {
        self.theme = Some(theme);
        self.palette = Palette::for_theme(theme);
    }

    fn set_icon_visibility(&mut self, light_icon_visible: bool, dark_icon_visible: bool) {
        self.light_icon_visible = light_icon_visible;
        self.dark_icon_visible = dark_icon_visible;
    }
}

fn render_line(line: &StyledLine, palette: Palette) -> String {
    let mut out = match line.kind {
        LineKind::Paragraph | LineKind::Heading(_) => String::new(),
        LineKind::ListItem { depth, marker } => {
            let bullet = marker.map_or_else(|| "•".to_string(), |n| format!("{n}."));
            format!("{}{bullet} ", "  ".repeat(depth))
        }
        LineKind::Code => "    ".to_string(),
        LineKind::Quote => "│ ".with(palette.muted).to_string(),
        LineKind::Rule => return "─".repeat(40).with(palette.muted).to_string(),
    };
    let heading = matches!(line.kind, LineKind::Heading(_));
    for span in &line.spans {
        out.push_str(&render_span(span, heading, palette));
    }
    out
}

fn render_span(span: &StyledSpan, heading: bool, palette: Palette) -> String {
    let mut styled = span.text.as_str().stylize();
    if span.style.strong || heading {
        styled = styled.bold();
    }
    if span.style.emphasis {
        styled = styled.italic();
    }
    if span.style.strikethrough {
        styled = styled.crossed_out();
    }
    if span.style.code {
        styled = styled.with(palette.code);
    }
    match &span.style.link {
        Some(url) if url != &span.text => format!("{} ({url})", styled.underlined()),
        Some(_) => styled.underlined().to_string(),
        None => styled.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_core::{MarkdownRenderer, StyledMarkdown};

    fn output(view: TerminalView<Vec<u8>>) -> String {
        String::from_utf8(view.into_inner()).expect("utf8")
    }

    #[test]
    fn user_text_is_printed_verbatim() {
        let mut view = TerminalView::new(Vec::new());
        view.append_user_turn("**not bold**");
        assert!(output(view).contains("**not bold**"));
    }

    #[test]
    fn ai_markdown_loses_its_markers() {
        let mut view = TerminalView::new(Vec::new());
        view.append_ai_turn(StyledMarkdown.render("**hi** there"));
        let out = output(view);
        assert!(out.contains("hi"));
        assert!(out.contains(" there"));
        assert!(!out.contains("**"));
    }

    #[test]
    fn typing_indicator_is_shown_while_pending() {
        let mut view = TerminalView::new(Vec::new());
        view.set_pending(true);
        assert!(view.typing_visible);
        view.append_error(StyledMarkdown.render("server down"));
        assert!(!view.typing_visible);
        view.set_pending(false);
        let out = output(view);
        assert!(out.contains("assistant is typing"));
        assert!(out.contains("server down"));
    }

    #[test]
    fn prompt_offers_the_other_theme_icon() {
        let mut view = TerminalView::new(Vec::new());
        view.set_theme_attribute(Theme::Dark);
        view.set_icon_visibility(true, false);
        view.prompt();
        assert_eq!(view.theme_attribute(), Some(Theme::Dark));
        assert!(output(view).contains(LIGHT_ICON));
    }

    #[test]
    fn ordered_items_keep_their_numbers() {
        let text = StyledMarkdown.render("1. one\n2. two");
        let palette = Palette::for_theme(Theme::Light);
        assert!(render_line(&text.lines[1], palette).starts_with("2. "));
    }
}
