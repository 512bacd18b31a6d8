//! Markdown rendering for assistant replies.
//!
//! Assistant content is interpreted as markdown: prose lines become styled
//! spans (headers, bullets, **bold**, `inline code`), and fenced code
//! blocks are highlighted with syntect, keyed by the fence's language tag
//! with a plain-text fallback. User content never goes through any of this
//! -- it is rendered literally, so markup typed by the user stays markup.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;

const CODE_THEME: &str = "base16-ocean.dark";

/// Markdown renderer for assistant replies. Holds the loaded syntax and
/// theme sets, which are expensive to construct.
pub struct AnswerRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl AnswerRenderer {
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    /// Render a complete markdown reply. Code fences go through syntect;
    /// everything else through the prose styler.
    pub fn render(&self, markdown: &str) -> Text<'static> {
        let mut lines: Vec<Line<'static>> = Vec::new();
        let mut in_code_block = false;
        let mut code_lang = String::new();
        let mut code_buf = String::new();

        for line in markdown.lines() {
            if line.trim_start().starts_with("```") && !in_code_block {
                // Opening code fence
                in_code_block = true;
                code_lang = line.trim_start().trim_start_matches('`').trim().to_string();
                code_buf.clear();
            } else if line.trim_start().starts_with("```") && in_code_block {
                // Closing code fence -- render the accumulated code
                in_code_block = false;
                lines.extend(self.highlight(&code_buf, &code_lang));
            } else if in_code_block {
                code_buf.push_str(line);
                code_buf.push('\n');
            } else {
                lines.push(style_prose_line(line));
            }
        }

        // Unclosed code block
        if in_code_block && !code_buf.is_empty() {
            lines.extend(self.highlight(&code_buf, &code_lang));
        }

        Text::from(lines)
    }

    /// Highlight a code block, falling back to the plain-text syntax when
    /// the language tag is unrecognized.
    pub fn highlight(&self, code: &str, lang: &str) -> Vec<Line<'static>> {
        let syntax = if lang.is_empty() {
            self.syntax_set.find_syntax_plain_text()
        } else {
            self.syntax_set
                .find_syntax_by_token(lang)
                .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
        };

        let theme = &self.theme_set.themes[CODE_THEME];
        let mut highlighter = HighlightLines::new(syntax, theme);

        let mut lines = Vec::new();
        for code_line in code.lines() {
            let ranges = highlighter
                .highlight_line(code_line, &self.syntax_set)
                .unwrap_or_default();

            let mut spans: Vec<Span<'static>> = vec![Span::raw("  ")];
            for (style, text) in ranges {
                let fg = style.foreground;
                let mut span_style = Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b));
                if style
                    .font_style
                    .contains(syntect::highlighting::FontStyle::BOLD)
                {
                    span_style = span_style.add_modifier(Modifier::BOLD);
                }
                spans.push(Span::styled(text.to_string(), span_style));
            }
            lines.push(Line::from(spans));
        }

        lines
    }
}

impl Default for AnswerRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Render user-controlled text as-is, one literal line per input line.
pub fn literal(content: &str) -> Vec<Line<'static>> {
    content
        .lines()
        .map(|line| Line::raw(line.to_string()))
        .collect()
}

/// Convert one prose line to styled spans: `#` headers, `-`/`*` bullets,
/// **bold** and `inline code`.
fn style_prose_line(text: &str) -> Line<'static> {
    let trimmed = text.trim_start();

    if trimmed.starts_with('#') {
        let heading = trimmed.trim_start_matches('#').trim_start();
        return Line::from(Span::styled(
            heading.to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
    }

    if let Some(rest) = trimmed.strip_prefix("- ").or_else(|| trimmed.strip_prefix("* ")) {
        let mut spans = vec![Span::styled("\u{2022} ", Style::default().fg(Color::Cyan))];
        spans.extend(inline_spans(rest));
        return Line::from(spans);
    }

    Line::from(inline_spans(text))
}

/// Parse **bold** and `inline code` runs out of a line of text.
fn inline_spans(text: &str) -> Vec<Span<'static>> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current = String::new();

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'*') {
            // Consume the second *
            chars.next();

            // Find closing **
            let mut bold = String::new();
            let mut closed = false;
            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next();
                    closed = true;
                    break;
                }
                bold.push(c);
            }

            if closed && !bold.is_empty() {
                if !current.is_empty() {
                    spans.push(Span::raw(std::mem::take(&mut current)));
                }
                spans.push(Span::styled(
                    bold,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            } else {
                // No closing **, treat as literal
                current.push_str("**");
                current.push_str(&bold);
            }
        } else if c == '`' {
            let mut code = String::new();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '`' {
                    closed = true;
                    break;
                }
                code.push(c);
            }

            if closed && !code.is_empty() {
                if !current.is_empty() {
                    spans.push(Span::raw(std::mem::take(&mut current)));
                }
                spans.push(Span::styled(code, Style::default().fg(Color::Yellow)));
            } else {
                current.push('`');
                current.push_str(&code);
            }
        } else {
            current.push(c);
        }
    }

    if !current.is_empty() {
        spans.push(Span::raw(current));
    }

    if spans.is_empty() {
        spans.push(Span::raw(String::new()));
    }

    spans
}
