//! UI rendering

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap};

use crate::controller::{BrowserStatus, QueryContext};
use crate::core::model::format_relative_time;
use crate::core::outcome::Outcome;
use crate::tui::app::{App, Screen};
use crate::tui::theme::Theme;

const SPINNER: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Status bar
        ])
        .split(frame.area());

    render_header(frame, chunks[0], app);
    match app.screen {
        Screen::Repositories => render_repositories(frame, chunks[1], app),
        Screen::Branches => render_branches(frame, chunks[1], app),
    }
    render_status_bar(frame, chunks[2], app);

    if app.show_help {
        render_help_overlay(frame, app);
    }
}

fn spinner(app: &App) -> &'static str {
    SPINNER[(app.tick_counter as usize) % SPINNER.len()]
}

/// Render the header
fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let screen_name = match app.screen {
        Screen::Repositories => "Repositories".to_string(),
        Screen::Branches => format!(
            "Branches of {}",
            app.branch_repo.as_deref().unwrap_or("?")
        ),
    };

    let header = Paragraph::new(format!(" ghview │ {} ", screen_name))
        .style(Theme::HEADER)
        .block(Block::default().borders(Borders::BOTTOM));

    frame.render_widget(header, area);
}

/// Render the repository list with its search box
fn render_repositories(frame: &mut Frame, area: Rect, app: &App) {
    if !app.session.is_authenticated() {
        let text = vec![
            Line::from(""),
            Line::from("  Not signed in."),
            Line::from(""),
            Line::from("  Run 'ghview auth login' (or 'ghview auth login --pat') and start ghview again."),
            Line::from(""),
            Line::from(Span::styled("  Press [Esc] to quit", Theme::MUTED)),
        ];
        frame.render_widget(
            Paragraph::new(text).block(Block::default().borders(Borders::ALL)),
            area,
        );
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let search = Paragraph::new(format!(" {}▏", app.search_input)).block(
        Block::default()
            .title(" Search ")
            .borders(Borders::ALL)
            .border_style(Theme::SEARCH_BORDER),
    );
    frame.render_widget(search, chunks[0]);

    let state = &app.browser_state;
    let mut items: Vec<ListItem> = state
        .items
        .iter()
        .enumerate()
        .map(|(i, repo)| {
            let mut spans = vec![Span::raw(format!("  {}", repo.full_name()))];
            if repo.private {
                spans.push(Span::styled(" 🔒", Theme::LOCK));
            }
            if let Some(language) = &repo.language {
                spans.push(Span::styled(format!("  {}", language), Theme::MUTED));
            }
            spans.push(Span::styled(format!("  ★ {}", repo.stars), Theme::MUTED));
            if let Some(updated) = repo.updated() {
                spans.push(Span::styled(
                    format!("  {}", format_relative_time(updated)),
                    Theme::MUTED,
                ));
            }

            let item = ListItem::new(Line::from(spans));
            if i == app.selection.selected {
                item.style(Theme::SELECTED)
            } else {
                item
            }
        })
        .collect();

    match &state.status {
        BrowserStatus::Idle => {}
        BrowserStatus::Loading => {
            items.push(ListItem::new(format!("  {} Loading...", spinner(app))).style(Theme::MUTED));
        }
        BrowserStatus::LoadedEmpty => {
            let text = match &state.active_query {
                QueryContext::Search(term) => format!("  No repositories match '{}'", term),
                QueryContext::Default => "  No repositories yet".to_string(),
            };
            items.push(ListItem::new(text));
        }
        BrowserStatus::Loaded if state.has_more => {
            items.push(ListItem::new("  ↓ more").style(Theme::MUTED));
        }
        BrowserStatus::Loaded => {}
        BrowserStatus::Error(message) => {
            items.push(ListItem::new(""));
            items.push(ListItem::new(format!("  Error: {}", message)).style(Theme::ERROR));
            items.push(ListItem::new("  Press [Ctrl+R] to retry"));
        }
    }

    let list = List::new(items).block(
        Block::default()
            .title(format!(" Repositories ({}) ", state.items.len()))
            .borders(Borders::ALL)
            .border_style(Theme::LIST_BORDER),
    );
    frame.render_widget(list, chunks[1]);
}

/// Render the branch pane
fn render_branches(frame: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = match &app.branches {
        Outcome::Pending => vec![ListItem::new(format!(
            "  {} Fetching branches...",
            spinner(app)
        ))],
        Outcome::Failed { message, .. } => vec![
            ListItem::new(format!("  Error: {}", message)).style(Theme::ERROR),
            ListItem::new(""),
            ListItem::new("  Press [Ctrl+R] to retry"),
        ],
        Outcome::Ok(branches) if branches.is_empty() => vec![ListItem::new("  No branches")],
        Outcome::Ok(branches) => branches
            .iter()
            .enumerate()
            .map(|(i, branch)| {
                let mut spans = vec![
                    Span::styled(format!("  {}  ", branch.short_sha()), Theme::MUTED),
                    Span::raw(branch.name.clone()),
                ];
                if branch.protected {
                    spans.push(Span::styled(" 🔒", Theme::LOCK));
                }
                let item = ListItem::new(Line::from(spans));
                if i == app.branch_selection.selected {
                    item.style(Theme::SELECTED)
                } else {
                    item
                }
            })
            .collect(),
    };

    let count = app.branches.value().map_or(0, Vec::len);
    let list = List::new(items).block(
        Block::default()
            .title(format!(" Branches ({}) ", count))
            .borders(Borders::ALL),
    );
    frame.render_widget(list, area);
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let status_text = match app.screen {
        Screen::Repositories => {
            let state = &app.browser_state;
            let mode = match &state.active_query {
                QueryContext::Search(term) => format!("search '{}'", term),
                QueryContext::Default => "all repositories".to_string(),
            };
            format!(" {} │ page {} │ F1 for help ", mode, state.page.max(1))
        }
        Screen::Branches => " Esc back │ F1 for help ".to_string(),
    };

    let status = Paragraph::new(status_text)
        .style(Theme::STATUS_BAR)
        .block(Block::default().borders(Borders::TOP));

    frame.render_widget(status, area);
}

/// Render the help overlay
fn render_help_overlay(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let popup_width = (area.width * 60 / 100).min(60);
    let popup_height = (area.height * 70 / 100).min(14);
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let (title, help_lines) = get_help_content(app.screen);

    let text: Vec<Line> = help_lines
        .into_iter()
        .map(|(key, desc)| {
            Line::from(vec![
                Span::styled(format!("  {:12}", key), Style::default().fg(Color::Cyan)),
                Span::raw(desc),
            ])
        })
        .collect();

    let help = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(format!(" {} ", title))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .style(Style::default().bg(Color::Black));

    frame.render_widget(help, popup_area);
}

/// Get help content for the current screen
fn get_help_content(screen: Screen) -> (&'static str, Vec<(&'static str, &'static str)>) {
    match screen {
        Screen::Repositories => (
            "Repositories",
            vec![
                ("type", "Search your repositories"),
                ("Backspace", "Edit search"),
                ("↑/↓", "Move; ↓ at the end loads more"),
                ("Enter", "Show branches"),
                ("Ctrl+R", "Refresh, or retry after an error"),
                ("Esc", "Clear search, then quit"),
                ("Ctrl+C", "Quit"),
            ],
        ),
        Screen::Branches => (
            "Branches",
            vec![
                ("↑/↓", "Move"),
                ("Ctrl+R", "Reload"),
                ("Esc", "Back to repositories"),
                ("Ctrl+C", "Quit"),
            ],
        ),
    }
}
