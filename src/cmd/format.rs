/*!
format.rs

Human-readable rendering for command output: colors, a boxed title, aligned
tables and key/value blocks. JSON output never goes through here.

Style is decided once per run by `StyleOptions::detect()`:
  - NO_COLOR   disables ANSI colors
  - NO_EMOJI   disables status glyphs
  - COLUMNS    terminal width hint (clamped to 40..=220, default 100)

Everything returns `String`; callers decide where to print.
*/

use std::borrow::Cow;

#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub use_color: bool,
    pub use_emoji: bool,
    pub term_width: usize,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self::detect()
    }
}

impl StyleOptions {
    pub fn detect() -> Self {
        let term_width = std::env::var("COLUMNS")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .map(|w| w.clamp(40, 220))
            .unwrap_or(100);
        StyleOptions {
            use_color: std::env::var_os("NO_COLOR").is_none(),
            use_emoji: std::env::var_os("NO_EMOJI").is_none(),
            term_width,
        }
    }

    /// No color, no emoji, fixed width. Used by tests.
    pub fn plain(term_width: usize) -> Self {
        StyleOptions {
            use_color: false,
            use_emoji: false,
            term_width,
        }
    }
}

/* ---- Color / glyphs ---- */

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Title,
    Muted,
    Header,
    Good,
    Warn,
    Bad,
    Dim,
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Title => "1;38;5;45",
        Role::Muted => "38;5;250",
        Role::Header => "38;5;213",
        Role::Good => "38;5;82",
        Role::Warn => "38;5;214",
        Role::Bad => "38;5;196",
        Role::Dim => "2",
    };
    format!("\x1b[{code}m{}\x1b[0m", text.as_ref())
}

#[derive(Debug, Clone, Copy)]
pub enum Glyph {
    Ok,
    Fail,
    Info,
    Cluster,
    Subsystem,
    Chart,
}

pub fn glyph(g: Glyph, style: &StyleOptions) -> &'static str {
    if !style.use_emoji {
        return "";
    }
    match g {
        Glyph::Ok => "✔",
        Glyph::Fail => "✖",
        Glyph::Info => "ℹ",
        Glyph::Cluster => "🗄",
        Glyph::Subsystem => "🧩",
        Glyph::Chart => "📊",
    }
}

/// Prefix `text` with a glyph and a space, or nothing when glyphs are off.
pub fn with_glyph(g: Glyph, text: impl AsRef<str>, style: &StyleOptions) -> String {
    let mark = glyph(g, style);
    if mark.is_empty() {
        text.as_ref().to_string()
    } else {
        format!("{mark} {}", text.as_ref())
    }
}

/// Render a yes/no value with color.
pub fn flag(value: bool, style: &StyleOptions) -> String {
    if value {
        color(Role::Good, "yes", style)
    } else {
        color(Role::Bad, "no", style)
    }
}

/* ---- Box title ---- */

/// One-line boxed title with an optional dimmed subtitle.
///
/// ```text
/// ┌──────────────────────────────┐
/// │ Clusters (3)  env=prod       │
/// └──────────────────────────────┘
/// ```
pub fn box_header(title: &str, subtitle: Option<&str>, style: &StyleOptions) -> String {
    let mut inner = color(Role::Title, title, style);
    if let Some(sub) = subtitle.filter(|s| !s.is_empty()) {
        inner.push_str("  ");
        inner.push_str(&color(Role::Muted, sub, style));
    }

    let max_inner = style.term_width.saturating_sub(4).max(10);
    let inner = if display_width(&inner) > max_inner {
        // Drop styling rather than cut through an escape sequence.
        let plain = match subtitle {
            Some(sub) if !sub.is_empty() => format!("{title}  {sub}"),
            _ => title.to_string(),
        };
        truncate_ellipsis(&plain, max_inner)
    } else {
        inner
    };

    let width = display_width(&inner);
    let bar = "─".repeat(width + 2);
    format!("┌{bar}┐\n│ {inner} │\n└{bar}┘")
}

/* ---- Tables ---- */

/// Column-aligned table. Columns shrink (widest first) to fit the terminal,
/// and cells that no longer fit are cut with an ellipsis.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    min_col_width: usize,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            min_col_width: 3,
        }
    }

    pub fn row<I, S>(&mut self, cells: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    fn column_widths(&self, limit: usize) -> Vec<usize> {
        let cols = self.headers.len();
        let mut widths: Vec<usize> = self.headers.iter().map(|h| display_width(h)).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate().take(cols) {
                widths[i] = widths[i].max(display_width(cell));
            }
        }

        let gaps = cols.saturating_sub(1) * 2;
        let mut total: usize = widths.iter().sum::<usize>() + gaps;
        while total > limit {
            let Some((idx, &w)) = widths.iter().enumerate().max_by_key(|(_, w)| **w) else {
                break;
            };
            if w <= self.min_col_width {
                break;
            }
            widths[idx] -= 1;
            total -= 1;
        }
        widths
    }

    pub fn render(&self, style: &StyleOptions) -> String {
        if self.headers.is_empty() {
            return String::new();
        }
        let widths = self.column_widths(style.term_width);
        let mut lines = Vec::with_capacity(self.rows.len() + 2);

        let header: Vec<String> = self
            .headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| color(Role::Header, fit(h, *w), style))
            .collect();
        lines.push(header.join("  ").trim_end().to_string());

        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        lines.push(color(Role::Dim, rule.join("  "), style));

        for row in &self.rows {
            let cells: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(i, w)| fit(row.get(i).map(String::as_str).unwrap_or(""), *w))
                .collect();
            lines.push(cells.join("  ").trim_end().to_string());
        }
        lines.join("\n")
    }
}

/// Aligned `key: value` lines for detail views.
pub fn key_values(pairs: &[(&str, String)], style: &StyleOptions) -> String {
    let key_width = pairs.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    pairs
        .iter()
        .map(|(k, v)| {
            let label = format!("{k:<key_width$}");
            let value = if v.is_empty() { "-" } else { v.as_str() };
            format!("  {}  {value}", color(Role::Muted, label, style))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pad to exactly `width` display columns, truncating with an ellipsis if needed.
fn fit(s: &str, width: usize) -> String {
    let len = display_width(s);
    if len <= width {
        return format!("{s}{}", " ".repeat(width - len));
    }
    truncate_ellipsis(&strip_ansi(s), width)
}

/* ---- Text helpers ---- */

pub fn truncate_ellipsis(s: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

/// Human size for megabyte counts: `512 MB`, `1.5 GB`, `2.0 TB`.
pub fn human_mb(mb: i64) -> String {
    let abs = mb.unsigned_abs() as f64;
    let sign = if mb < 0 { "-" } else { "" };
    if abs >= 1024.0 * 1024.0 {
        format!("{sign}{:.1} TB", abs / (1024.0 * 1024.0))
    } else if abs >= 1024.0 {
        format!("{sign}{:.1} GB", abs / 1024.0)
    } else {
        format!("{sign}{abs} MB")
    }
}

/// Human size for byte counts.
pub fn human_bytes(bytes: i64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes.unsigned_abs() as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let sign = if bytes < 0 { "-" } else { "" };
    if unit == 0 {
        format!("{sign}{value} {}", UNITS[unit])
    } else {
        format!("{sign}{value:.1} {}", UNITS[unit])
    }
}

/* ---- ANSI ---- */

fn strip_ansi(s: &str) -> Cow<'_, str> {
    if !s.contains('\x1b') {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            // CSI runs until the first ASCII letter.
            for t in chars.by_ref() {
                if t.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        out.push(c);
    }
    Cow::Owned(out)
}

fn display_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}
