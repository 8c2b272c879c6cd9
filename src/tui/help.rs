use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::state::{Focus, BAR_COLOR, SORTED_COLOR};

fn key_line(key: &str, pad: usize, what: &str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key.to_string(), Style::default().fg(Color::Magenta)),
        Span::raw(" ".repeat(pad)),
        Span::raw(what.to_string()),
    ])
}

fn legend_line(color: Color, what: &str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled("██", Style::default().fg(color)),
        Span::raw(format!("  {what}")),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("q", Style::default().fg(Color::Magenta)),
            Span::raw(" / "),
            Span::styled("Ctrl-C", Style::default().fg(Color::Magenta)),
            Span::raw("  Quit"),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("space", Style::default().fg(Color::Magenta)),
            Span::raw(" / "),
            Span::styled("s", Style::default().fg(Color::Magenta)),
            Span::raw("   Start sorting"),
        ]),
        key_line("p", 11, "Pause/Resume"),
        key_line("r", 11, "Reset (cancel the run, keep the bars)"),
        key_line("g", 11, "Generate a new random sequence"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("←/→", Style::default().fg(Color::Magenta)),
            Span::raw(" or "),
            Span::styled("1-8", Style::default().fg(Color::Magenta)),
            Span::raw("  Choose algorithm"),
        ]),
        key_line("+/-", 9, "Speed up / slow down"),
        key_line("[/]", 9, "Fewer / more bars"),
        key_line("tab", 9, "Switch tabs"),
        key_line("?", 11, "Show this help"),
        Line::from(""),
        Line::from("Colors:"),
        legend_line(BAR_COLOR, "Unsorted"),
        legend_line(Focus::Compare.color(), "Comparing"),
        legend_line(Focus::Swap.color(), "Swapping"),
        legend_line(Focus::Write.color(), "Writing from a buffer"),
        legend_line(Focus::Inspect.color(), "Reading a key"),
        legend_line(SORTED_COLOR, "In final position"),
        Line::from(""),
        Line::from("Algorithm, size and new sequences are locked while a run is active."),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
