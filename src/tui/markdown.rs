//! Markdown → ratatui `Text` for bot replies.
//!
//! GitHub-flavoured, with line breaks kept: a single newline in a reply
//! starts a new line instead of being folded into a space. Fenced code is
//! highlighted with syntect when the language is known.
//!
//! Partial input is fine. While a reply is being revealed the prefix may
//! end inside `**bold` or an open fence; pulldown-cmark renders whatever is
//! there and the next frame corrects it.

use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME: LazyLock<Theme> = LazyLock::new(|| {
    let mut themes = ThemeSet::load_defaults().themes;
    themes
        .remove("base16-ocean.dark")
        .unwrap_or_default()
});

const GUTTER: Color = Color::DarkGray;

/// Formats `content` as markdown. Plain text takes `base`.
pub fn format_reply(content: &str, base: Style) -> Text<'static> {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_TASKLISTS);

    let mut out = Renderer::new(base);
    for event in Parser::new_ext(content, opts) {
        out.event(event);
    }
    out.finish()
}

/// Fenced code in progress.
enum Code {
    Highlighted(HighlightLines<'static>),
    Plain,
}

struct Renderer {
    base: Style,
    lines: Vec<Line<'static>>,
    /// The line being assembled. `None` between blocks.
    current: Option<Vec<Span<'static>>>,
    inline: Vec<Style>,
    /// `"│ "` per open blockquote.
    quote_depth: usize,
    /// `None` = bullet list, `Some(n)` = next number.
    lists: Vec<Option<u64>>,
    code: Option<Code>,
    link: Option<String>,
    /// A blank line goes before the next block.
    spaced: bool,
}

impl Renderer {
    fn new(base: Style) -> Self {
        Self {
            base,
            lines: Vec::new(),
            current: None,
            inline: Vec::new(),
            quote_depth: 0,
            lists: Vec::new(),
            code: None,
            link: None,
            spaced: false,
        }
    }

    fn finish(mut self) -> Text<'static> {
        self.end_line();
        Text::from(self.lines)
    }

    fn style(&self) -> Style {
        self.inline.last().copied().unwrap_or(self.base)
    }

    fn push_inline(&mut self, overlay: Style) {
        self.inline.push(self.style().patch(overlay));
    }

    fn prefix(&self) -> Vec<Span<'static>> {
        (0..self.quote_depth)
            .map(|_| Span::styled("│ ", Style::default().fg(GUTTER)))
            .collect()
    }

    fn start_line(&mut self) {
        self.end_line();
        self.current = Some(self.prefix());
    }

    fn end_line(&mut self) {
        if let Some(spans) = self.current.take() {
            self.lines.push(Line::from(spans));
        }
    }

    fn span(&mut self, span: Span<'static>) {
        if self.current.is_none() {
            self.current = Some(self.prefix());
        }
        if let Some(spans) = self.current.as_mut() {
            spans.push(span);
        }
    }

    fn block_gap(&mut self) {
        self.end_line();
        if self.spaced && !self.lines.is_empty() {
            self.lines.push(Line::default());
        }
        self.spaced = false;
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.span(Span::styled(
                code.to_string(),
                Style::default().fg(Color::Yellow).bg(Color::Black),
            )),
            // Line breaks are kept as typed.
            Event::SoftBreak | Event::HardBreak => self.start_line(),
            Event::Rule => {
                self.block_gap();
                self.lines
                    .push(Line::styled("─".repeat(32), Style::default().fg(GUTTER)));
                self.spaced = true;
            }
            Event::TaskListMarker(done) => {
                self.span(Span::raw(if done { "☑ " } else { "☐ " }));
            }
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                self.block_gap();
                self.start_line();
            }
            Tag::Heading { level, .. } => {
                self.block_gap();
                self.start_line();
                let style = match level {
                    HeadingLevel::H1 => Modifier::BOLD | Modifier::UNDERLINED,
                    HeadingLevel::H2 => Modifier::BOLD,
                    _ => Modifier::BOLD | Modifier::ITALIC,
                };
                self.push_inline(Style::default().add_modifier(style));
            }
            Tag::BlockQuote(_) => {
                self.block_gap();
                self.quote_depth += 1;
                self.push_inline(Style::default().add_modifier(Modifier::ITALIC));
            }
            Tag::CodeBlock(kind) => {
                self.block_gap();
                let lang = match &kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().unwrap_or_default().to_string()
                    }
                    CodeBlockKind::Indented => String::new(),
                };
                if !lang.is_empty() {
                    self.lines.push(Line::styled(
                        format!("  {lang}"),
                        Style::default().fg(GUTTER).add_modifier(Modifier::ITALIC),
                    ));
                }
                self.code = Some(
                    SYNTAXES
                        .find_syntax_by_token(&lang)
                        .filter(|_| !lang.is_empty())
                        .map(|syntax| Code::Highlighted(HighlightLines::new(syntax, &THEME)))
                        .unwrap_or(Code::Plain),
                );
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.block_gap();
                } else {
                    self.end_line();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.start_line();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{indent}{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => format!("{indent}• "),
                };
                self.span(Span::styled(marker, Style::default().fg(GUTTER)));
            }
            Tag::TableRow | Tag::TableHead => self.start_line(),
            Tag::TableCell => {
                if self.current.as_ref().is_some_and(|spans| spans.len() > self.quote_depth) {
                    self.span(Span::styled(" │ ", Style::default().fg(GUTTER)));
                }
            }
            Tag::Table(_) => self.block_gap(),
            Tag::Emphasis => self.push_inline(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_inline(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_inline(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link { dest_url, .. } => {
                self.link = Some(dest_url.to_string());
                self.push_inline(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::UNDERLINED),
                );
            }
            _ => {}
        }
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.end_line();
                self.spaced = true;
            }
            TagEnd::Heading(_) => {
                self.inline.pop();
                self.end_line();
                self.spaced = true;
            }
            TagEnd::BlockQuote(_) => {
                self.end_line();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.inline.pop();
                self.spaced = true;
            }
            TagEnd::CodeBlock => {
                self.code = None;
                self.spaced = true;
            }
            TagEnd::List(_) => {
                self.end_line();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.spaced = true;
                }
            }
            TagEnd::Table => {
                self.end_line();
                self.spaced = true;
            }
            TagEnd::TableHead => {
                // Header row in bold; pulldown-cmark emits no separate rule.
                if let Some(spans) = self.current.as_mut() {
                    for span in spans.iter_mut() {
                        span.style = span.style.add_modifier(Modifier::BOLD);
                    }
                }
                self.end_line();
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.inline.pop();
            }
            TagEnd::Link => {
                self.inline.pop();
                if let Some(url) = self.link.take() {
                    self.span(Span::styled(format!(" <{url}>"), Style::default().fg(GUTTER)));
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        // ratatui draws tabs as zero width
        let text = text.replace('\t', "    ");
        match self.code.as_mut() {
            Some(Code::Highlighted(highlighter)) => {
                let mut rendered = Vec::new();
                for source_line in LinesWithEndings::from(&text) {
                    let mut spans = vec![Span::styled("  ", Style::default())];
                    match highlighter.highlight_line(source_line, &SYNTAXES) {
                        Ok(ranges) => spans.extend(ranges.into_iter().map(|(style, piece)| {
                            let fg = style.foreground;
                            Span::styled(
                                piece.trim_end_matches('\n').to_string(),
                                Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b)),
                            )
                        })),
                        Err(_) => spans.push(Span::raw(source_line.trim_end_matches('\n').to_string())),
                    }
                    rendered.push(Line::from(spans));
                }
                self.lines.extend(rendered);
            }
            Some(Code::Plain) => {
                let style = Style::default().fg(Color::Gray);
                self.lines.extend(
                    text.lines()
                        .map(|l| Line::from(vec![Span::raw("  "), Span::styled(l.to_string(), style)])),
                );
            }
            None => {
                let style = self.style();
                self.span(Span::styled(text, style));
            }
        }
    }
}
