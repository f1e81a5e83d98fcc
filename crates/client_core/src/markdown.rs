//! Markdown rendering for model answers and error bubbles.
//!
//! User text never goes through here; it is displayed literally.

use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd};

pub trait MarkdownRenderer {
    type Markup;

    fn render(&self, text: &str) -> Self::Markup;
}

fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Markdown to an HTML fragment.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlMarkdown;

impl MarkdownRenderer for HtmlMarkdown {
    type Markup = String;

    fn render(&self, text: &str) -> String {
        let parser = Parser::new_ext(text, parser_options());
        let mut out = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }
}

/// Markdown to [`StyledText`], for front ends that draw their own spans.
#[derive(Debug, Clone, Copy, Default)]
pub struct StyledMarkdown;

impl MarkdownRenderer for StyledMarkdown {
    type Markup = StyledText;

    fn render(&self, text: &str) -> StyledText {
        StyledTextBuilder::default().build(Parser::new_ext(text, parser_options()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanStyle {
    pub strong: bool,
    pub emphasis: bool,
    pub code: bool,
    pub strikethrough: bool,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledSpan {
    pub text: String,
    pub style: SpanStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Paragraph,
    Heading(u8),
    /// `marker` is the ordinal for ordered lists.
    ListItem { depth: usize, marker: Option<u64> },
    Code,
    Quote,
    Rule,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledLine {
    pub kind: LineKind,
    pub spans: Vec<StyledSpan>,
}

impl StyledLine {
    fn new(kind: LineKind) -> Self {
        Self {
            kind,
            spans: Vec::new(),
        }
    }

    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyledText {
    pub lines: Vec<StyledLine>,
}

impl StyledText {
    /// Text without styling, one line per block line.
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(StyledLine::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Default)]
struct StyledTextBuilder {
    lines: Vec<StyledLine>,
    current: Option<StyledLine>,
    strong: usize,
    emphasis: usize,
    strikethrough: usize,
    link: Option<String>,
    // Next ordinal per open list; `None` for bullet lists.
    lists: Vec<Option<u64>>,
    quote_depth: usize,
    in_code_block: bool,
}

impl StyledTextBuilder {
    fn build<'a>(mut self, parser: impl Iterator<Item = Event<'a>>) -> StyledText {
        for event in parser {
            match event {
                Event::Start(tag) => self.start(tag),
                Event::End(tag) => self.end(tag),
                Event::Text(text) => {
                    if self.in_code_block {
                        self.push_code_block_text(&text);
                    } else {
                        self.push_span(&text, false);
                    }
                }
                Event::Code(code) => self.push_span(&code, true),
                Event::SoftBreak => self.push_span(" ", false),
                Event::HardBreak => {
                    let kind = match self.block_kind() {
                        LineKind::ListItem { .. } => LineKind::Paragraph,
                        kind => kind,
                    };
                    self.flush();
                    self.current = Some(StyledLine::new(kind));
                }
                Event::Rule => {
                    self.flush();
                    self.lines.push(StyledLine::new(LineKind::Rule));
                }
                Event::TaskListMarker(checked) => {
                    self.push_span(if checked { "[x] " } else { "[ ] " }, false)
                }
                Event::Html(raw) | Event::InlineHtml(raw) => self.push_span(&raw, false),
                _ => {}
            }
        }
        self.flush();
        StyledText { lines: self.lines }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                // The first paragraph of a list item continues the item line.
                let continues_item = matches!(
                    &self.current,
                    Some(line) if matches!(line.kind, LineKind::ListItem { .. }) && line.spans.is_empty()
                );
                if !continues_item {
                    let kind = self.block_kind();
                    self.begin(kind);
                }
            }
            Tag::Heading { level, .. } => self.begin(LineKind::Heading(level as u8)),
            Tag::BlockQuote(_) => {
                self.flush();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(_) => {
                self.flush();
                self.in_code_block = true;
            }
            Tag::List(first) => {
                self.flush();
                self.lists.push(first);
            }
            Tag::Item => {
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(next)) => {
                        let marker = *next;
                        *next += 1;
                        Some(marker)
                    }
                    _ => None,
                };
                self.begin(LineKind::ListItem { depth, marker });
            }
            Tag::Emphasis => self.emphasis += 1,
            Tag::Strong => self.strong += 1,
            Tag::Strikethrough => self.strikethrough += 1,
            Tag::Link { dest_url, .. } => self.link = Some(dest_url.to_string()),
            Tag::TableRow | Tag::TableHead => self.begin(LineKind::Paragraph),
            Tag::TableCell => {
                if self.current.as_ref().is_some_and(|line| !line.spans.is_empty()) {
                    self.push_span(" | ", false);
                }
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item => self.flush(),
            TagEnd::TableRow | TagEnd::TableHead => self.flush(),
            TagEnd::BlockQuote(_) => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            TagEnd::CodeBlock => {
                self.flush();
                self.in_code_block = false;
            }
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
            }
            TagEnd::Emphasis => self.emphasis = self.emphasis.saturating_sub(1),
            TagEnd::Strong => self.strong = self.strong.saturating_sub(1),
            TagEnd::Strikethrough => self.strikethrough = self.strikethrough.saturating_sub(1),
            TagEnd::Link => self.link = None,
            _ => {}
        }
    }

    fn block_kind(&self) -> LineKind {
        match &self.current {
            Some(line) => line.kind,
            None if self.quote_depth > 0 => LineKind::Quote,
            None => LineKind::Paragraph,
        }
    }

    fn begin(&mut self, kind: LineKind) {
        self.flush();
        self.current = Some(StyledLine::new(kind));
    }

    fn flush(&mut self) {
        if let Some(line) = self.current.take() {
            if !line.spans.is_empty() || matches!(line.kind, LineKind::ListItem { .. }) {
                self.lines.push(line);
            }
        }
    }

    fn style(&self, code: bool) -> SpanStyle {
        SpanStyle {
            strong: self.strong > 0,
            emphasis: self.emphasis > 0,
            code,
            strikethrough: self.strikethrough > 0,
            link: self.link.clone(),
        }
    }

    fn push_span(&mut self, text: &str, code: bool) {
        let style = self.style(code);
        let kind = self.block_kind();
        let line = self.current.get_or_insert_with(|| StyledLine::new(kind));
        match line.spans.last_mut() {
            Some(last) if last.style == style => last.text.push_str(text),
            _ => line.spans.push(StyledSpan {
                text: text.to_string(),
                style,
            }),
        }
    }

    fn push_code_block_text(&mut self, text: &str) {
        for raw in text.lines() {
            let mut line = StyledLine::new(LineKind::Code);
            line.spans.push(StyledSpan {
                text: raw.to_string(),
                style: SpanStyle {
                    code: true,
                    ..SpanStyle::default()
                },
            });
            self.lines.push(line);
        }
    }
}
