//! UI rendering functions for the TUI.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use super::state::{App, GRID_COLUMNS};
use super::types::{Focus, Screen};
use crate::api::Section;
use crate::types::Drama;

fn highlight_style() -> Style {
    Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD)
}

/// Draw the UI.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let size = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Search bar
            Constraint::Min(0),    // Content (sidebar + main)
            Constraint::Length(3), // Footer
        ])
        .split(size);

    draw_header(frame, app, chunks[0]);
    draw_search_bar(frame, app, chunks[1]);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(24), // Sidebar (fixed width)
            Constraint::Min(0),     // Main content
        ])
        .split(chunks[2]);

    draw_sidebar(frame, app, content_chunks[0]);

    match app.screen {
        Screen::Loading => draw_loading(frame, app, content_chunks[1]),
        Screen::Home => draw_home(frame, app, content_chunks[1]),
        Screen::Search => draw_popular_searches(frame, app, content_chunks[1]),
        Screen::SearchResults => draw_search_results(frame, app, content_chunks[1]),
        Screen::Detail => draw_detail(frame, app, content_chunks[1]),
        Screen::Watch => draw_watch(frame, app, content_chunks[1]),
        Screen::QualitySelect => draw_quality_select(frame, app, content_chunks[1]),
    }

    draw_footer(frame, app, chunks[3]);

    if let Some(error) = &app.error_message {
        draw_error_popup(frame, error);
    }

    if app.show_help {
        draw_help_modal(frame, app);
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let location = match app.screen {
        Screen::Home => app.selected_section().title().to_string(),
        Screen::Search => "Search".to_string(),
        Screen::SearchResults => format!("Results for '{}'", app.search_query),
        Screen::Detail | Screen::Watch | Screen::QualitySelect => app
            .drama
            .as_ref()
            .map(|d| d.book_name.clone())
            .unwrap_or_default(),
        Screen::Loading => String::new(),
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "drama-watcher",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("[{}p]", app.quality),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  "),
        Span::styled(location, Style::default().fg(Color::Cyan)),
    ]))
    .block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

fn draw_search_bar(frame: &mut Frame, app: &App, area: Rect) {
    let border_style = if app.search_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let search_text = if app.search_input.is_empty() && !app.search_focused {
        "Press '/' to search..."
    } else {
        &app.search_input
    };

    let search = Paragraph::new(search_text)
        .style(if app.search_focused {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Search")
                .border_style(border_style),
        );

    frame.render_widget(search, area);

    if app.search_focused {
        let offset = app.search_input.chars().count() as u16;
        frame.set_cursor_position((area.x + offset + 1, area.y + 1));
    }
}

fn draw_sidebar(frame: &mut Frame, app: &mut App, area: Rect) {
    let border_style = if app.focus == Focus::Sidebar {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let items: Vec<ListItem> = Section::ALL
        .iter()
        .map(|section| {
            let count = app
                .feed
                .get(*section)
                .map(|s| s.dramas.len())
                .unwrap_or(0);
            ListItem::new(format!("{} ({})", section.title(), count))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Browse")
                .border_style(border_style),
        )
        .highlight_style(highlight_style())
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.section_list_state);
}

fn drama_details(drama: &Drama) -> String {
    let mut lines = vec![
        drama.book_name.clone(),
        format!("Episodes: {}", drama.chapter_count),
    ];
    if let Some(plays) = &drama.play_count {
        lines.push(format!("Plays: {}", plays));
    }
    if let Some(rank) = drama.rank_vo.as_ref().filter(|r| !r.hot_code.is_empty()) {
        lines.push(format!("Hot: {}", rank.hot_code));
    }
    let tags = drama.tag_names();
    if !tags.is_empty() {
        lines.push(format!("Tags: {}", tags.join(", ")));
    }
    if !drama.introduction.is_empty() {
        lines.push(String::new());
        lines.push(drama.introduction.clone());
    }
    lines.join("\n")
}

fn draw_drama_list(
    frame: &mut Frame,
    area: Rect,
    title: String,
    dramas: &[Drama],
    highlighted: Option<&Drama>,
    state: &mut ratatui::widgets::ListState,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let items: Vec<ListItem> = dramas
        .iter()
        .map(|d| ListItem::new(d.to_display()))
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(highlight_style())
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[0], state);

    let details = highlighted
        .map(|d| format!("{}\n\nPress Enter for details", drama_details(d)))
        .unwrap_or_default();

    let details_widget = Paragraph::new(details)
        .block(Block::default().borders(Borders::ALL).title("Details"))
        .wrap(Wrap { trim: true });

    frame.render_widget(details_widget, chunks[1]);
}

fn draw_home(frame: &mut Frame, app: &mut App, area: Rect) {
    let section = app.selected_section();
    let title = format!("{} - {}", section.title(), section.subtitle());

    if let Some(error) = app.section_error() {
        let message = Paragraph::new(format!("Could not load this section.\n\n{}\n\nPress 'r' to retry", error))
            .style(Style::default().fg(Color::Red))
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(message, area);
        return;
    }

    let dramas = app.section_dramas().to_vec();
    let highlighted = app.highlighted_drama().cloned();
    draw_drama_list(
        frame,
        area,
        title,
        &dramas,
        highlighted.as_ref(),
        &mut app.feed_list_state,
    );
}

fn draw_popular_searches(frame: &mut Frame, app: &mut App, area: Rect) {
    if app.popular_searches.is_empty() {
        let help = Paragraph::new("Type your search query and press Enter\n\nPress Esc to cancel")
            .block(Block::default().borders(Borders::ALL).title("Search"))
            .wrap(Wrap { trim: true });
        frame.render_widget(help, area);
        return;
    }

    let items: Vec<ListItem> = app
        .popular_searches
        .iter()
        .map(|term| ListItem::new(term.as_str()))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Popular searches"),
        )
        .highlight_style(highlight_style())
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.popular_list_state);
}

fn draw_search_results(frame: &mut Frame, app: &mut App, area: Rect) {
    let title = format!("Search Results ({})", app.search_results.len());
    let dramas = app.search_results.clone();
    let highlighted = app.highlighted_drama().cloned();
    draw_drama_list(
        frame,
        area,
        title,
        &dramas,
        highlighted.as_ref(),
        &mut app.results_list_state,
    );
}

fn draw_detail(frame: &mut Frame, app: &App, area: Rect) {
    let body = match &app.drama {
        Some(drama) => {
            let mut text = drama_details(drama);
            if let Some(corner) = drama.corner.as_ref().filter(|c| !c.name.is_empty()) {
                text.push_str(&format!("\n\n[{}]", corner.name));
            }
            if let Some(shelf_time) = &drama.shelf_time {
                text.push_str(&format!("\nReleased: {}", shelf_time));
            }
            text.push_str(&format!(
                "\n\n{} episodes loaded. Press Enter to watch episode 1",
                app.episodes.len()
            ));
            text
        }
        None => "Invalid drama".to_string(),
    };

    let detail = Paragraph::new(body)
        .block(Block::default().borders(Borders::ALL).title("Detail"))
        .wrap(Wrap { trim: true });

    frame.render_widget(detail, area);
}

fn draw_watch(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Player status
            Constraint::Length(3), // Page buttons
            Constraint::Min(0),    // Episode grid
        ])
        .split(area);

    let total = app.total_episodes();
    let name = app
        .current_episode_data()
        .map(|e| e.to_display(app.current_episode))
        .unwrap_or_else(|| format!("EP {}", app.current_episode));

    let status_style = if app.video_error {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(name, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("   {} / {}", app.current_episode, total)),
            Span::styled(
                format!("   {}p", app.quality),
                Style::default().fg(Color::Green),
            ),
        ]),
        Line::raw(""),
    ];
    let message = app.playback_message();
    lines.extend(
        message
            .lines()
            .map(|l| Line::styled(l.to_string(), status_style)),
    );

    let player = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Now Playing"))
        .wrap(Wrap { trim: true });

    frame.render_widget(player, chunks[0]);

    let page = app.pager.page();
    let mut buttons = vec![Span::raw("< ")];
    if app.pager.total_pages() > 1 {
        for p in app.page_buttons() {
            let style = if p == page {
                Style::default().bg(Color::Magenta).fg(Color::White)
            } else {
                Style::default()
            };
            buttons.push(Span::styled(format!(" {} ", p), style));
        }
    }
    buttons.push(Span::raw(" >"));

    let range = app
        .pager
        .range()
        .map(|(first, last)| format!("Episode {} - {}", first, last))
        .unwrap_or_else(|| "No episodes".to_string());

    let page_bar = Paragraph::new(Line::from(buttons))
        .block(Block::default().borders(Borders::ALL).title(range));
    frame.render_widget(page_bar, chunks[1]);

    let lines: Vec<Line> = app
        .pager
        .episodes()
        .chunks(GRID_COLUMNS)
        .map(|row| {
            Line::from(
                row.iter()
                    .map(|&ep| {
                        let mut style = Style::default();
                        if ep == app.current_episode {
                            style = style.bg(Color::Magenta).fg(Color::White);
                        }
                        if ep == app.cursor_episode {
                            style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
                        }
                        Span::styled(format!("{:>4} ", ep), style)
                    })
                    .collect::<Vec<_>>(),
            )
        })
        .collect();

    let grid = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Episodes ({})", total)),
    );
    frame.render_widget(grid, chunks[2]);
}

fn draw_quality_select(frame: &mut Frame, app: &mut App, area: Rect) {
    let items: Vec<ListItem> = app
        .available_qualities()
        .into_iter()
        .map(|q| {
            let marker = if q == app.quality { " *" } else { "" };
            ListItem::new(format!("{}p{}", q, marker))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Select Quality"),
        )
        .highlight_style(highlight_style())
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.quality_list_state);
}

fn draw_loading(frame: &mut Frame, app: &App, area: Rect) {
    let loading = Paragraph::new(app.loading_message.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title("Loading"));

    frame.render_widget(loading, area);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = if app.search_focused {
        "[Enter] search  [↑↓] popular  [Tab] browse  [Esc] cancel"
    } else {
        match app.screen {
            Screen::Home => "[/] search  [Tab] switch  [↑↓] navigate  [Enter] select  [r] refresh  [?] help  [q] quit",
            Screen::Search => "[/] type  [↑↓] navigate  [Enter] search  [Esc] back  [?] help  [q] quit",
            Screen::SearchResults => "[/] search  [↑↓] navigate  [Enter] select  [Esc] back  [?] help  [q] quit",
            Screen::Detail => "[Enter/w] watch  [Esc] back  [/] search  [?] help  [q] quit",
            Screen::Watch => "[←→↑↓] move  [Enter] play  [n/p] next/prev  [ [ ] ] page  [c] quality  [Esc] back  [?] help",
            Screen::QualitySelect => "[↑↓] navigate  [Enter] select  [Esc] back  [?] help  [q] quit",
            Screen::Loading => "[?] help  [q] quit",
        }
    };

    let text = match &app.status_message {
        Some(status) if !app.search_focused => format!("{}  |  {}", status, help_text),
        _ => help_text.to_string(),
    };

    let footer = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}

fn draw_error_popup(frame: &mut Frame, error: &str) {
    let area = centered_rect(60, 20, frame.area());
    frame.render_widget(Clear, area);

    let popup = Paragraph::new(error)
        .style(Style::default().fg(Color::Red))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Error")
                .border_style(Style::default().fg(Color::Red)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(popup, area);
}

fn draw_help_modal(frame: &mut Frame, app: &App) {
    let area = centered_rect(70, 80, frame.area());
    frame.render_widget(Clear, area);

    let (title, content) = get_help_content(app);

    let help_text = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Help - {}", title))
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(help_text, area);
}

fn get_help_content(app: &App) -> (&'static str, String) {
    let global_keys = "\
Global Commands
───────────────
  ?           Show/hide this help
  Ctrl+C      Force quit
  /           Open search
  Tab         Switch sidebar/main focus
  q           Quit

";

    let navigation_keys = "\
Navigation
──────────
  j / ↓       Move down
  k / ↑       Move up
  Enter       Select item
  Esc         Go back

";

    let search_keys = "\
Search Bar
──────────
  Enter       Search typed text, or the highlighted popular term
  ↑ / ↓       Pick a popular term
  Esc         Cancel search

";

    let watch_keys = "\
Watching
────────
  h/j/k/l     Move in the episode grid
  Enter       Play highlighted episode
  n / p       Next / previous episode
  [ / ]       Previous / next page
  c           Change quality
  Esc         Back to detail

";

    match app.screen {
        Screen::Home => (
            "Home",
            format!("{}{}  r           Reload feed\n\nPress ? to close", global_keys, navigation_keys),
        ),
        Screen::Search => (
            "Search",
            format!("{}{}Press ? to close", global_keys, search_keys),
        ),
        Screen::SearchResults | Screen::QualitySelect => (
            "Lists",
            format!("{}{}Press ? to close", global_keys, navigation_keys),
        ),
        Screen::Detail => (
            "Detail",
            format!(
                "{}  Enter / w   Watch from episode 1\n  Esc         Back\n\nPress ? to close",
                global_keys
            ),
        ),
        Screen::Watch => (
            "Watch",
            format!("{}{}Press ? to close", global_keys, watch_keys),
        ),
        Screen::Loading => ("Loading", format!("{}Press ? to close", global_keys)),
    }
}

/// Helper function to create a centered rect.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rank;

    #[test]
    fn test_drama_details_lists_metadata() {
        let drama = Drama {
            book_name: "Hidden Heiress".to_string(),
            chapter_count: 60,
            play_count: Some("1.5M".to_string()),
            tags: vec!["Romance".to_string(), "Revenge".to_string()],
            rank_vo: Some(Rank {
                hot_code: "99K".to_string(),
                ..Default::default()
            }),
            introduction: "She returns.".to_string(),
            ..Default::default()
        };

        let details = drama_details(&drama);
        assert!(details.starts_with("Hidden Heiress\nEpisodes: 60"));
        assert!(details.contains("Plays: 1.5M"));
        assert!(details.contains("Hot: 99K"));
        assert!(details.contains("Tags: Romance, Revenge"));
        assert!(details.ends_with("She returns."));
    }

    #[test]
    fn test_centered_rect_inside_parent() {
        let parent = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(60, 20, parent);
        assert!(popup.x >= parent.x && popup.right() <= parent.right());
        assert!(popup.y >= parent.y && popup.bottom() <= parent.bottom());
    }
}
