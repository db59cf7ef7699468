use ratatui::{
    Frame,
    layout::{Layout, Direction, Constraint, Rect, Alignment},
    widgets::{Block, Borders, BorderType, Cell, List, ListItem, Paragraph, Row, Table, Wrap},
    style::{Color, Style, Modifier},
    text::{Line, Span},
};
use crate::dashboard::ViewModel;
use crate::types::{LoadStatus, NetworkStatus};

const ACCENT: Color = Color::LightBlue;
const DIM: Color = Color::DarkGray;

// ===============================
// Top-level draw
// ===============================
pub fn draw(f:&mut Frame, view:&ViewModel<'_>){
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),          // header
            Constraint::Percentage(60),     // leaderboard
            Constraint::Min(0),             // market
            Constraint::Length(1),          // footer
        ])
        .split(f.area());

    header(f, chunks[0], view);
    leaderboard(f, chunks[1], view);
    market(f, chunks[2], view);
    footer(f, chunks[3], view);
}

fn header(f:&mut Frame, area:Rect, view:&ViewModel<'_>){
    let mut spans = vec![
        Span::styled("Galactic-Fishing Game", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled("Live Leaderboard & Market", Style::default().fg(ACCENT)),
    ];
    // Offline only flags staleness; the data shown stays as loaded.
    if view.network_status == NetworkStatus::Offline {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(" OFFLINE ", Style::default().fg(Color::Black).bg(Color::Yellow)));
    }
    let p = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM).border_type(BorderType::Plain));
    f.render_widget(p, area);
}

fn cached_label(saved_at_ms:Option<i64>) -> String {
    match saved_at_ms.and_then(chrono::DateTime::from_timestamp_millis) {
        Some(t) => format!(" (cached {})", t.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")),
        None => " (cached)".to_string(),
    }
}

fn section(title:String, stale:bool, saved_at_ms:Option<i64>) -> Block<'static> {
    let mut spans = vec![Span::styled(title, Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))];
    if stale {
        spans.push(Span::styled(cached_label(saved_at_ms), Style::default().fg(Color::Yellow)));
    }
    Block::default().borders(Borders::ALL).border_type(BorderType::Rounded).title(Line::from(spans))
}

fn placeholder(f:&mut Frame, area:Rect, block:Block<'static>, text:&str){
    let p = Paragraph::new(Span::styled(text.to_string(), Style::default().fg(DIM).add_modifier(Modifier::ITALIC)))
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(p, area);
}

// ===============================
// Leaderboard
// ===============================
fn leaderboard(f:&mut Frame, area:Rect, view:&ViewModel<'_>){
    let block = section(format!("Leaderboard - {}", view.window.label), view.players_stale, view.players_saved_at_ms);
    match (view.load_status, view.players_status) {
        (LoadStatus::Pending, _) => return placeholder(f, area, block, "Loading leaderboard..."),
        (_, LoadStatus::Unavailable) => return placeholder(f, area, block, "No leaderboard data available (offline and nothing cached)"),
        _ => {}
    }
    if view.total_players == 0 {
        return placeholder(f, area, block, "No players yet.");
    }

    let header = Row::new(["Rank", "Username", "Level", "XP", "Gold"])
        .style(Style::default().fg(DIM).add_modifier(Modifier::BOLD));
    let rows = view.players.iter().map(|p| {
        Row::new(vec![
            Cell::from(format!("#{}", p.rank)).style(Style::default().fg(ACCENT)),
            Cell::from(p.username.clone()),
            Cell::from(p.level.to_string()),
            Cell::from(p.xp.to_string()),
            Cell::from(p.gold.to_string()),
        ])
    });
    let widths = [
        Constraint::Length(6),
        Constraint::Min(12),
        Constraint::Length(6),
        Constraint::Length(10),
        Constraint::Length(10),
    ];
    let table = Table::new(rows, widths).header(header).block(block);
    f.render_widget(table, area);
}

// ===============================
// Market
// ===============================
fn market(f:&mut Frame, area:Rect, view:&ViewModel<'_>){
    let block = section("Market".to_string(), view.market_stale, view.market_saved_at_ms);
    match (view.load_status, view.market_status) {
        (LoadStatus::Pending, _) => return placeholder(f, area, block, "Loading market items..."),
        (_, LoadStatus::Unavailable) => return placeholder(f, area, block, "No market data available (offline and nothing cached)"),
        _ => {}
    }
    if view.market_items.is_empty() {
        return placeholder(f, area, block, "The market is empty.");
    }

    let items: Vec<ListItem> = view.market_items.iter().map(|item| {
        ListItem::new(Line::from(vec![
            Span::styled(item.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(item.kind.clone(), Style::default().fg(ACCENT).add_modifier(Modifier::ITALIC)),
            Span::raw("  "),
            Span::raw(item.description.clone()),
            Span::raw("  "),
            Span::styled(format!("{} gold", item.cost), Style::default().fg(ACCENT)),
        ]))
    }).collect();
    f.render_widget(List::new(items).block(block), area);
}

fn footer(f:&mut Frame, area:Rect, view:&ViewModel<'_>){
    let w = &view.window;
    let mut hints: Vec<Span> = Vec::new();
    if w.controls_visible {
        let on = |enabled: bool| if enabled { Style::default() } else { Style::default().fg(DIM) };
        if w.paged {
            hints.push(Span::styled("← prev  ", on(w.can_prev)));
            hints.push(Span::styled("→ next  ", on(w.can_next)));
        } else {
            hints.push(Span::styled("m load more  ", on(w.can_load_more)));
        }
    }
    hints.push(Span::styled("q quit", Style::default().fg(DIM)));
    f.render_widget(Paragraph::new(Line::from(hints)), area);
}
