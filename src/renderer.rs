//! Ratatui-based dashboard renderer for Pulseboard.
//!
//! This module is purely presentational -- it takes references to the loaded
//! document and renders into a Ratatui `Frame`.  It does **not** own any
//! state; all reshaping is re-run per draw via `crate::reshape`.

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{BarChart, Block, Borders, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use crate::document::{format_count, percent_of, Slot, StatsDocument};
use crate::loader::LoadedDocument;
use crate::reshape::{build_heatmap, pillar_columns, pivot_by_week, top_senders};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const SENDER_NAME_WIDTH: usize = 14;
const SENDER_BAR_WIDTH: usize = 20;
const PILLAR_LABEL_WIDTH: usize = 12;
const HEATMAP_CELL_WIDTH: usize = 6;
const HEATMAP_LABEL_WIDTH: usize = 10;

const SPARK_BLOCKS: &[char] = &[' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

// ---------------------------------------------------------------------------
// Small helpers
// ---------------------------------------------------------------------------

/// Truncate a string to `max` display columns, appending `…` when cut.
fn truncate_label(input: &str, max: usize) -> String {
    if UnicodeWidthStr::width(input) <= max {
        return input.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in input.chars() {
        let w = UnicodeWidthStr::width(ch.to_string().as_str());
        if used + w >= max {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// Pad a string with trailing spaces up to `width` display columns.
fn pad_label(input: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(input);
    if w >= width {
        input.to_string()
    } else {
        format!("{}{}", input, " ".repeat(width - w))
    }
}

/// Map a heatmap intensity ratio (0..=1) to a density glyph.
fn intensity_glyph(intensity: f64) -> char {
    if intensity <= 0.0 {
        '·'
    } else if intensity < 0.25 {
        '░'
    } else if intensity < 0.5 {
        '▒'
    } else if intensity < 0.75 {
        '▓'
    } else {
        '█'
    }
}

/// Map a heatmap intensity ratio to a cell colour, cold to hot.
fn intensity_color(intensity: f64) -> Color {
    if intensity <= 0.0 {
        Color::DarkGray
    } else if intensity < 0.25 {
        Color::Blue
    } else if intensity < 0.5 {
        Color::Cyan
    } else if intensity < 0.75 {
        Color::Yellow
    } else {
        Color::Red
    }
}

/// Map a count to a sparkline block character, scaled against `max`.
fn spark_char(count: u64, max: u64) -> char {
    if max == 0 {
        return SPARK_BLOCKS[0];
    }
    let level = ((count * 8) / max).min(8) as usize;
    SPARK_BLOCKS[level]
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Render the header area (title, document name, watch indicator).
fn render_header(frame: &mut Frame, area: Rect, loaded: &LoadedDocument, watching: bool) {
    let title_line = Line::from(vec![
        Span::styled(
            " Pulseboard ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            "Message Analytics",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
    ]);

    let doc_line = Line::from(vec![
        Span::styled(" Document: ", Style::default().fg(Color::DarkGray)),
        Span::styled(loaded.name.clone(), Style::default().fg(Color::White)),
        Span::styled(
            format!("  (loaded {})", loaded.loaded_at.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let status_line = if watching {
        Line::from(vec![
            Span::styled(
                " ● WATCH ",
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "  Reloading on file change  ",
                Style::default().fg(Color::Green),
            ),
            Span::styled("q to quit", Style::default().fg(Color::DarkGray)),
        ])
    } else {
        Line::from(vec![Span::styled(
            " r to reload, q to quit ",
            Style::default().fg(Color::DarkGray),
        )])
    };

    let text = Text::from(vec![title_line, doc_line, status_line]);
    frame.render_widget(Paragraph::new(text), area);
}

// ---------------------------------------------------------------------------
// Summary cards
// ---------------------------------------------------------------------------

/// One labelled value, centred, in the style of a stat card.
fn summary_card(label: &str, value: String, color: Color) -> Paragraph<'static> {
    Paragraph::new(vec![
        Line::from(Span::styled(
            label.to_string(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
    ])
    .alignment(Alignment::Center)
}

/// Render the summary row: totals, sender count, date range, top pillar share.
fn render_summary(frame: &mut Frame, area: Rect, doc: &StatsDocument) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            " SUMMARY ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(28),
            Constraint::Percentage(22),
        ])
        .split(inner);

    frame.render_widget(
        summary_card(
            "Messages",
            format_count(doc.summary.total_messages as f64),
            Color::White,
        ),
        cols[0],
    );
    frame.render_widget(
        summary_card(
            "Senders",
            format_count(doc.summary.unique_senders as f64),
            Color::White,
        ),
        cols[1],
    );

    let range = match (&doc.summary.first_message_at, &doc.summary.last_message_at) {
        (Some(first), Some(last)) => format!("{} → {}", first, last),
        (Some(first), None) => format!("{} →", first),
        (None, Some(last)) => format!("→ {}", last),
        (None, None) => "—".to_string(),
    };
    frame.render_widget(summary_card("Range", range, Color::Cyan), cols[2]);

    // Top pillar by count, with its share of all pillar counts.
    let total_pillar: u64 = doc.by_pillar.iter().map(|p| p.count).sum();
    let top_pillar = doc.by_pillar.iter().max_by_key(|p| p.count);
    let share = match top_pillar {
        Some(p) => format!(
            "{} ({}%)",
            truncate_label(&p.pillar, 12),
            percent_of(p.count, total_pillar)
        ),
        None => "—".to_string(),
    };
    frame.render_widget(summary_card("Top pillar", share, Color::Magenta), cols[3]);
}

// ---------------------------------------------------------------------------
// Pillar bar chart
// ---------------------------------------------------------------------------

/// Render `by_pillar` as a bar chart. The section is shown as-is: no
/// deduplication, duplicate pillar entries become separate bars.
fn render_pillars(frame: &mut Frame, area: Rect, doc: &StatsDocument) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" BY PILLAR ");

    if doc.by_pillar.is_empty() {
        frame.render_widget(placeholder("no pillar data").block(block), area);
        return;
    }

    let labels: Vec<String> = doc
        .by_pillar
        .iter()
        .map(|p| truncate_label(&p.pillar, PILLAR_LABEL_WIDTH))
        .collect();
    let bar_data: Vec<(&str, u64)> = labels
        .iter()
        .zip(doc.by_pillar.iter())
        .map(|(label, p)| (label.as_str(), p.count))
        .collect();

    let barchart = BarChart::default()
        .block(block)
        .data(&bar_data)
        .bar_width(9)
        .bar_gap(2)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));

    frame.render_widget(barchart, area);
}

// ---------------------------------------------------------------------------
// Sender ranking
// ---------------------------------------------------------------------------

/// Render the top-N sender ranking as labelled proportional bars, with the
/// average response time appended when the document carries one.
fn render_senders(frame: &mut Frame, area: Rect, doc: &StatsDocument, top_n: usize) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" TOP SENDERS ({}) ", top_n));

    let ranked = top_senders(&doc.by_sender, top_n);
    if ranked.is_empty() {
        frame.render_widget(placeholder("no sender data").block(block), area);
        return;
    }

    let max = ranked.iter().map(|s| s.count).max().unwrap_or(0).max(1);

    let mut lines: Vec<Line<'static>> = Vec::with_capacity(ranked.len());
    for entry in &ranked {
        let filled = ((entry.count as usize) * SENDER_BAR_WIDTH) / max as usize;
        let bar = "█".repeat(filled);
        let rest = " ".repeat(SENDER_BAR_WIDTH - filled);

        let mut spans = vec![
            Span::styled(
                format!(
                    " {} ",
                    pad_label(
                        &truncate_label(&entry.sender, SENDER_NAME_WIDTH),
                        SENDER_NAME_WIDTH
                    )
                ),
                Style::default().fg(Color::White),
            ),
            Span::styled(bar, Style::default().fg(Color::Green)),
            Span::raw(rest),
            Span::styled(
                format!(" {:>9}", format_count(entry.count as f64)),
                Style::default().fg(Color::Cyan),
            ),
        ];

        let avg = doc
            .avg_response_time_by_sender
            .iter()
            .find(|r| r.sender == entry.sender)
            .map(|r| r.avg_response_mins);
        if let Some(mins) = avg {
            spans.push(Span::styled(
                format!("  {:.0}m avg", mins),
                Style::default().fg(Color::DarkGray),
            ));
        }

        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
}

// ---------------------------------------------------------------------------
// Weekly trend
// ---------------------------------------------------------------------------

/// Render the weekly pillar trend: one sparkline row per pillar, weeks left
/// to right in ascending order.
fn render_trend(frame: &mut Frame, area: Rect, doc: &StatsDocument) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" WEEKLY TREND ");

    let rows = pivot_by_week(&doc.pillar_trend_week);
    let pillars = pillar_columns(&doc.pillar_trend_week);
    if rows.is_empty() || pillars.is_empty() {
        frame.render_widget(placeholder("no trend data").block(block), area);
        return;
    }

    // One scale across all cells so the rows are comparable.
    let max = rows
        .iter()
        .flat_map(|r| r.counts.values())
        .copied()
        .max()
        .unwrap_or(0);

    let mut lines: Vec<Line<'static>> = Vec::with_capacity(pillars.len() + 1);
    for pillar in &pillars {
        let mut spark = String::with_capacity(rows.len());
        let mut total: u64 = 0;
        for row in &rows {
            let count = row.pillar_count(pillar);
            total += count;
            spark.push(spark_char(count, max));
        }

        lines.push(Line::from(vec![
            Span::styled(
                format!(
                    " {} ",
                    pad_label(
                        &truncate_label(pillar, PILLAR_LABEL_WIDTH),
                        PILLAR_LABEL_WIDTH
                    )
                ),
                Style::default().fg(Color::White),
            ),
            Span::styled(spark, Style::default().fg(Color::Magenta)),
            Span::styled(
                format!(" {:>9}", format_count(total as f64)),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }

    // Week range footer.
    let first = rows.first().map(|r| r.week.as_str()).unwrap_or("");
    let last = rows.last().map(|r| r.week.as_str()).unwrap_or("");
    lines.push(Line::from(Span::styled(
        format!(" {} → {}  ({} weeks)", first, last, rows.len()),
        Style::default().fg(Color::DarkGray),
    )));

    frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
}

// ---------------------------------------------------------------------------
// Heatmap
// ---------------------------------------------------------------------------

/// Render the date × slot heatmap grid. Returns the maximum horizontal scroll
/// (in date columns) so the caller can clamp its offset.
fn render_heatmap(frame: &mut Frame, area: Rect, doc: &StatsDocument, scroll: usize) -> usize {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" ACTIVITY HEATMAP ");

    let heatmap = build_heatmap(&doc.heatmap_date_slot);
    if heatmap.date_axis.is_empty() {
        frame.render_widget(placeholder("no heatmap data").block(block), area);
        return 0;
    }

    let inner_width = area.width.saturating_sub(2) as usize;
    let visible_cols = inner_width
        .saturating_sub(HEATMAP_LABEL_WIDTH)
        .max(HEATMAP_CELL_WIDTH)
        / HEATMAP_CELL_WIDTH;
    let max_scroll = heatmap.date_axis.len().saturating_sub(visible_cols);
    let scroll = scroll.min(max_scroll);

    let visible_dates: Vec<&str> = heatmap
        .date_axis
        .iter()
        .skip(scroll)
        .take(visible_cols)
        .map(|d| d.as_str())
        .collect();

    let mut lines: Vec<Line<'static>> = Vec::with_capacity(Slot::ALL.len() + 2);

    // Column header: the day part of each date (dates sort as full strings,
    // the header only needs to disambiguate neighbours).
    let mut header_spans = vec![Span::raw(" ".repeat(HEATMAP_LABEL_WIDTH))];
    for date in &visible_dates {
        let chars: Vec<char> = date.chars().collect();
        let short: String = chars[chars.len().saturating_sub(5)..].iter().collect();
        header_spans.push(Span::styled(
            format!("{:^width$}", short, width = HEATMAP_CELL_WIDTH),
            Style::default().fg(Color::DarkGray),
        ));
    }
    lines.push(Line::from(header_spans));

    // One row per canonical slot, zero cells included.
    for slot in Slot::ALL {
        let mut spans = vec![Span::styled(
            pad_label(&format!(" {}", slot.label()), HEATMAP_LABEL_WIDTH),
            Style::default().fg(Color::White),
        )];
        for date in &visible_dates {
            let intensity = heatmap.intensity(date, slot);
            let glyph = intensity_glyph(intensity);
            let cell: String = std::iter::repeat(glyph).take(3).collect();
            spans.push(Span::styled(
                format!("{:^width$}", cell, width = HEATMAP_CELL_WIDTH),
                Style::default().fg(intensity_color(intensity)),
            ));
        }
        lines.push(Line::from(spans));
    }

    // Footer: scale info plus a scroll indicator when columns overflow.
    let mut footer = format!(
        " peak {} msgs · {} days",
        format_count(heatmap.max_count as f64),
        heatmap.date_axis.len()
    );
    if max_scroll > 0 {
        footer.push_str(&format!(
            "  [{}-{}/{}]",
            scroll + 1,
            scroll + visible_dates.len(),
            heatmap.date_axis.len()
        ));
    }
    lines.push(Line::from(Span::styled(
        footer,
        Style::default().fg(Color::DarkGray),
    )));

    frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
    max_scroll
}

// ---------------------------------------------------------------------------
// Status bar
// ---------------------------------------------------------------------------

/// Render the bottom status bar: key legend, transient feedback (export,
/// reload) in green, last error in red.
fn render_status(
    frame: &mut Frame,
    area: Rect,
    status_message: Option<&str>,
    last_error: Option<&str>,
) {
    let mut spans: Vec<Span<'static>> = vec![Span::styled(
        " q quit  r reload  e export  ←/→ heatmap",
        Style::default().fg(Color::DarkGray),
    )];

    if let Some(msg) = status_message {
        spans.push(Span::styled(
            format!("  {}", msg),
            Style::default().fg(Color::Green),
        ));
    }

    if let Some(err) = last_error {
        spans.push(Span::styled(
            format!("  [!] {}", err),
            Style::default().fg(Color::Red),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn placeholder(text: &str) -> Paragraph<'static> {
    Paragraph::new(Line::from(Span::styled(
        format!(" {}", text),
        Style::default().fg(Color::DarkGray),
    )))
}

// ---------------------------------------------------------------------------
// Main render entry point
// ---------------------------------------------------------------------------

/// Top-level render function.  Call this from the main loop with the current
/// document and UI state -- this avoids circular dependencies on an `App`
/// struct.  Returns the heatmap's maximum horizontal scroll so the caller can
/// clamp its offset.
pub fn render_ui(
    frame: &mut Frame,
    loaded: &LoadedDocument,
    top_n: usize,
    watching: bool,
    heatmap_scroll: usize,
    status_message: Option<&str>,
    last_error: Option<&str>,
) -> usize {
    let size = frame.area();
    let doc = &loaded.document;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Length(4), // summary cards
            Constraint::Min(8),    // panels
            Constraint::Length(1), // status bar
        ])
        .split(size);

    render_header(frame, chunks[0], loaded, watching);
    render_summary(frame, chunks[1], doc);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(46), Constraint::Percentage(54)])
        .split(chunks[2]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(columns[0]);
    render_pillars(frame, left[0], doc);
    render_senders(frame, left[1], doc, top_n);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(columns[1]);
    render_trend(frame, right[0], doc);
    let max_scroll = render_heatmap(frame, right[1], doc, heatmap_scroll);

    render_status(frame, chunks[3], status_message, last_error);

    max_scroll
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intensity_glyph_ramp() {
        assert_eq!(intensity_glyph(0.0), '·');
        assert_eq!(intensity_glyph(0.1), '░');
        assert_eq!(intensity_glyph(0.3), '▒');
        assert_eq!(intensity_glyph(0.6), '▓');
        assert_eq!(intensity_glyph(0.75), '█');
        assert_eq!(intensity_glyph(1.0), '█');
    }

    #[test]
    fn test_intensity_color_cold_to_hot() {
        assert_eq!(intensity_color(0.0), Color::DarkGray);
        assert_eq!(intensity_color(0.2), Color::Blue);
        assert_eq!(intensity_color(0.4), Color::Cyan);
        assert_eq!(intensity_color(0.6), Color::Yellow);
        assert_eq!(intensity_color(0.9), Color::Red);
    }

    #[test]
    fn test_spark_char_scaling() {
        assert_eq!(spark_char(0, 8), ' ');
        assert_eq!(spark_char(8, 8), '█');
        assert_eq!(spark_char(4, 8), '▄');
        // Zero max means a flat line, not a division panic.
        assert_eq!(spark_char(3, 0), ' ');
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("short", 10), "short");
        assert_eq!(truncate_label("exactly-ten", 11), "exactly-ten");
        assert_eq!(truncate_label("a-very-long-pillar-name", 8), "a-very-…");
    }

    #[test]
    fn test_pad_label() {
        assert_eq!(pad_label("ab", 4), "ab  ");
        assert_eq!(pad_label("abcd", 4), "abcd");
        assert_eq!(pad_label("abcdef", 4), "abcdef");
    }
}
