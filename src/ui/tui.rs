//! Ratatui-based search box wired to the async host.
//!
//! The terminal loop runs on a blocking thread. Keystrokes become
//! [`HostEvent`]s; the dropdown is redrawn from the host's watch snapshot.

use anyhow::Result;
use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::TestBackend;
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::SearchBoxConfig;
use crate::controller::{ClickTarget, DropdownContent, DropdownState, SearchBoxController};
use crate::host::{HostEvent, HostHandle, spawn_host};
use crate::navigate::{BrowserNavigator, Navigator, results_url};
use crate::render::{DisplayItem, PriceLabel, StockStatus};
use crate::search::AlgoliaClient;
use crate::ui::components::theme::{
    ThemePalette, kbd_style, old_price_style, price_style, stock_style,
};
use crate::ui::shortcuts;

const HEADLESS_WIDTH: u16 = 80;
const HEADLESS_HEIGHT: u16 = 24;

/// What a keystroke asks the loop to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuiAction {
    Send(HostEvent),
    /// Open a result page directly, bypassing the results URL.
    Open(String),
    Quit,
}

/// Input-side state the host does not own.
#[derive(Debug, Clone)]
pub struct TuiState {
    pub input: String,
    pub selected: Option<usize>,
    pub focused: bool,
    pub show_help: bool,
    pub palette: ThemePalette,
    pub status: String,
}

impl TuiState {
    pub fn new(palette: ThemePalette) -> Self {
        Self {
            input: String::new(),
            selected: None,
            focused: true,
            show_help: false,
            palette,
            status: format!(
                "Type to search ({} help, {} quit)",
                shortcuts::HELP,
                shortcuts::QUIT
            ),
        }
    }

    /// Drop a selection that no longer points at a visible row.
    pub fn clamp_selection(&mut self, dropdown: &DropdownState) {
        let len = dropdown.content.items().len();
        if !dropdown.visible || self.selected.is_some_and(|i| i >= len) {
            self.selected = None;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, dropdown: &DropdownState) -> Vec<TuiAction> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if (ctrl && key.code == KeyCode::Char('c')) || key.code == KeyCode::F(10) {
            return vec![TuiAction::Quit];
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::F(1)) {
                self.show_help = false;
            }
            return Vec::new();
        }

        let items = if dropdown.visible {
            dropdown.content.items()
        } else {
            &[]
        };

        match key.code {
            KeyCode::F(1) => {
                self.show_help = true;
                Vec::new()
            }
            KeyCode::F(2) => {
                self.palette = self.palette.toggled();
                Vec::new()
            }
            KeyCode::Char('a') if ctrl => {
                self.selected = None;
                self.input.clear();
                vec![TuiAction::Send(HostEvent::ViewAll)]
            }
            KeyCode::Char('u') if ctrl => {
                self.input.clear();
                self.selected = None;
                vec![TuiAction::Send(HostEvent::Input(String::new()))]
            }
            KeyCode::Char(c) if !ctrl => {
                self.input.push(c);
                self.focused = true;
                self.selected = None;
                vec![TuiAction::Send(HostEvent::Input(self.input.clone()))]
            }
            KeyCode::Backspace => {
                self.input.pop();
                self.selected = None;
                vec![TuiAction::Send(HostEvent::Input(self.input.clone()))]
            }
            KeyCode::Down if !items.is_empty() => {
                self.selected = Some(match self.selected {
                    Some(i) => (i + 1).min(items.len() - 1),
                    None => 0,
                });
                Vec::new()
            }
            KeyCode::Up if !items.is_empty() => {
                self.selected = match self.selected {
                    Some(0) | None => None,
                    Some(i) => Some(i - 1),
                };
                Vec::new()
            }
            KeyCode::Enter => match self.selected.and_then(|i| items.get(i)) {
                Some(item) => {
                    self.selected = None;
                    self.focused = false;
                    if item.url == "#" {
                        self.status = "Selected result has no link".to_string();
                        return vec![TuiAction::Send(HostEvent::Click(ClickTarget::Outside))];
                    }
                    self.status = format!("Opening {}", item.title);
                    vec![
                        TuiAction::Open(item.url.clone()),
                        TuiAction::Send(HostEvent::Click(ClickTarget::Outside)),
                    ]
                }
                None => {
                    let text = std::mem::take(&mut self.input);
                    if text.trim().is_empty() {
                        return Vec::new();
                    }
                    self.status = format!("Opening results for \"{}\"", text.trim());
                    vec![TuiAction::Send(HostEvent::Submit(text))]
                }
            },
            KeyCode::Esc if dropdown.visible => {
                self.focused = false;
                self.selected = None;
                vec![TuiAction::Send(HostEvent::Click(ClickTarget::Outside))]
            }
            KeyCode::Esc => vec![TuiAction::Quit],
            KeyCode::Tab => {
                self.focused = true;
                vec![TuiAction::Send(HostEvent::Focus)]
            }
            _ => Vec::new(),
        }
    }
}

/// Run the interactive search box until the user quits.
pub async fn run_tui(config: SearchBoxConfig, once: bool) -> Result<()> {
    let config = Arc::new(config);
    let controller = SearchBoxController::with_shared_config(Arc::clone(&config))?;

    if once {
        let state = TuiState::new(ThemePalette::dark());
        for line in render_headless(&state, controller.dropdown(), &config)? {
            println!("{line}");
        }
        return Ok(());
    }

    let backend = Arc::new(AlgoliaClient::new(&config.service)?);
    let navigator = BrowserNavigator::new(config.results.origin.clone());
    let (handle, join) = spawn_host(controller, backend, navigator.clone());

    let loop_handle = handle.clone();
    let loop_config = Arc::clone(&config);
    let result =
        tokio::task::spawn_blocking(move || event_loop(loop_handle, &loop_config, &navigator))
            .await?;

    handle.send(HostEvent::Shutdown);
    if let Err(e) = join.await {
        warn!(component = "tui", "host task ended abnormally: {e}");
    }
    result
}

/// Draw one frame into an off-screen buffer and return its rows.
pub fn render_headless(
    state: &TuiState,
    dropdown: &DropdownState,
    config: &SearchBoxConfig,
) -> Result<Vec<String>> {
    let mut terminal = Terminal::new(TestBackend::new(HEADLESS_WIDTH, HEADLESS_HEIGHT))?;
    terminal.draw(|f| draw(f, state, dropdown, config))?;
    let buffer = terminal.backend().buffer();
    let width = usize::from(buffer.area.width).max(1);
    Ok(buffer
        .content()
        .chunks(width)
        .map(|row| {
            row.iter()
                .map(|cell| cell.symbol())
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect())
}

fn event_loop(
    handle: HostHandle,
    config: &SearchBoxConfig,
    navigator: &BrowserNavigator,
) -> Result<()> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = drive(&mut terminal, handle, config, navigator);
    teardown_terminal()?;
    result
}

fn drive(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    handle: HostHandle,
    config: &SearchBoxConfig,
    navigator: &BrowserNavigator,
) -> Result<()> {
    let mut state = TuiState::new(ThemePalette::dark());
    let mut dropdown_rx = handle.dropdown.clone();
    let tick_rate = Duration::from_millis(50);
    let mut needs_draw = true;

    loop {
        match dropdown_rx.has_changed() {
            Ok(changed) => needs_draw |= changed,
            Err(_) => {
                debug!(component = "tui", "host stopped, leaving event loop");
                return Ok(());
            }
        }
        let dropdown = dropdown_rx.borrow_and_update().clone();
        state.clamp_selection(&dropdown);

        if needs_draw {
            terminal.draw(|f| draw(f, &state, &dropdown, config))?;
            needs_draw = false;
        }

        if event::poll(tick_rate)?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            needs_draw = true;
            for action in state.handle_key(key, &dropdown) {
                match action {
                    TuiAction::Send(event) => {
                        if !handle.send(event) {
                            return Ok(());
                        }
                    }
                    TuiAction::Open(url) => {
                        if let Err(e) = navigator.navigate(&url) {
                            warn!(component = "tui", url = %url, "failed to open result: {e}");
                            state.status = format!("Could not open {url}: {e}");
                        }
                    }
                    TuiAction::Quit => return Ok(()),
                }
            }
        }
    }
}

pub fn draw(frame: &mut Frame, state: &TuiState, dropdown: &DropdownState, config: &SearchBoxConfig) {
    let palette = state.palette;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3), // search bar
                Constraint::Min(0),    // dropdown
                Constraint::Length(1), // footer
            ]
            .as_ref(),
        )
        .split(frame.area());

    frame.render_widget(search_bar(state, config), chunks[0]);

    if dropdown.visible {
        render_dropdown_panel(frame, chunks[1], state, dropdown, config);
    }

    let footer = Line::from(vec![
        Span::styled(shortcuts::SUBMIT, kbd_style(palette)),
        Span::styled(" search  ", palette.hint_style()),
        Span::styled(shortcuts::SELECT, kbd_style(palette)),
        Span::styled(" select  ", palette.hint_style()),
        Span::styled(shortcuts::VIEW_ALL, kbd_style(palette)),
        Span::styled(" view all  ", palette.hint_style()),
        Span::styled("| ", palette.hint_style()),
        Span::styled(state.status.clone(), palette.text_style()),
    ]);
    frame.render_widget(Paragraph::new(footer), chunks[2]);

    if state.show_help {
        render_help_overlay(frame, palette);
    }
}

fn search_bar<'a>(state: &'a TuiState, config: &SearchBoxConfig) -> Paragraph<'a> {
    let palette = state.palette;
    let border = if state.focused {
        palette.border_focus_style()
    } else {
        palette.border_style()
    };
    let block = Block::default()
        .title(Span::styled(" Search ", palette.title()))
        .borders(Borders::ALL)
        .border_style(border);

    let line = if state.input.is_empty() {
        Line::from(Span::styled(
            format!(
                "Type at least {} characters to search",
                config.input.min_chars
            ),
            palette.hint_style(),
        ))
    } else {
        let mut spans = vec![Span::styled(state.input.as_str(), palette.text_style())];
        if state.focused {
            spans.push(Span::styled("▏", palette.title()));
        }
        Line::from(spans)
    };
    Paragraph::new(line).block(block)
}

fn render_dropdown_panel(
    frame: &mut Frame,
    area: Rect,
    state: &TuiState,
    dropdown: &DropdownState,
    config: &SearchBoxConfig,
) {
    let palette = state.palette;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border_style())
        .style(Style::default().bg(palette.surface));

    match &dropdown.content {
        DropdownContent::Empty => {}
        DropdownContent::NoResults { query } => {
            let line = Line::from(vec![
                Span::styled(format!("{} ", config.dropdown.no_results), palette.hint_style()),
                Span::styled(format!("\"{query}\""), palette.title()),
            ]);
            frame.render_widget(
                Paragraph::new(line).block(block).wrap(Wrap { trim: true }),
                area,
            );
        }
        DropdownContent::Results {
            query,
            items,
            total,
        } => {
            let title = match results_url(&config.results, query) {
                Some(_) => format!(" {} ({}) ", config.dropdown.view_all, shortcuts::VIEW_ALL),
                None => String::new(),
            };
            let count = match total {
                Some(total) => format!(" {} of {total} ", items.len()),
                None => format!(" {} ", items.len()),
            };
            let block = block
                .title(Span::styled(count, palette.hint_style()))
                .title_bottom(Span::styled(title, kbd_style(palette)));
            let rows: Vec<ListItem> = items
                .iter()
                .map(|item| result_row(item, config, palette))
                .collect();
            let list = List::new(rows)
                .block(block)
                .highlight_style(palette.selected_style());
            let mut list_state = ListState::default();
            list_state.select(state.selected);
            frame.render_stateful_widget(list, area, &mut list_state);
        }
    }
}

fn result_row<'a>(item: &'a DisplayItem, config: &SearchBoxConfig, palette: ThemePalette) -> ListItem<'a> {
    let title: Vec<Span> = item
        .title_segments
        .iter()
        .map(|seg| {
            let style = if seg.matched {
                palette.highlight_style()
            } else {
                palette.text_style()
            };
            Span::styled(seg.text.as_str(), style)
        })
        .collect();

    let mut detail: Vec<Span> = match &item.price {
        PriceLabel::Discounted { sale, regular } => vec![
            Span::styled(sale.as_str(), price_style(palette)),
            Span::raw(" "),
            Span::styled(regular.as_str(), old_price_style(palette)),
        ],
        PriceLabel::Regular { price } => vec![Span::styled(price.as_str(), price_style(palette))],
        PriceLabel::OnRequest => vec![Span::styled(
            config.dropdown.price_on_request.clone(),
            palette.hint_style(),
        )],
    };
    if let Some(stock) = item.stock {
        let label = match stock {
            StockStatus::InStock => &config.dropdown.in_stock,
            StockStatus::OutOfStock => &config.dropdown.out_of_stock,
        };
        detail.push(Span::raw("  "));
        detail.push(Span::styled(label.clone(), stock_style(stock)));
    }
    if let Some(manufacturer) = &item.manufacturer {
        detail.push(Span::styled(format!("  {manufacturer}"), palette.hint_style()));
    }
    if let Some(ean) = &item.ean {
        detail.push(Span::styled(format!("  EAN {ean}"), palette.hint_style()));
    }

    ListItem::new(vec![Line::from(title), Line::from(detail)])
}

fn help_lines(palette: ThemePalette) -> Vec<Line<'static>> {
    let entry = |key: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("{key:<12}"), kbd_style(palette)),
            Span::styled(what, palette.text_style()),
        ])
    };
    vec![
        entry(shortcuts::SUBMIT, "open the results page (or the selected result)"),
        entry(shortcuts::SELECT, "move through results"),
        entry(shortcuts::VIEW_ALL, "view all results"),
        entry(shortcuts::DISMISS, "hide the dropdown, quit when hidden"),
        entry(shortcuts::REFOCUS, "focus the input and show the last results"),
        entry(shortcuts::CLEAR, "clear the input"),
        entry(shortcuts::THEME, "toggle dark/light theme"),
        entry(shortcuts::HELP, "toggle this help"),
        entry(shortcuts::QUIT, "quit"),
    ]
}

fn render_help_overlay(frame: &mut Frame, palette: ThemePalette) {
    let popup_area = centered_rect(70, 60, frame.area());
    let block = Block::default()
        .title(Span::styled("Help / Shortcuts", palette.title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent));

    frame.render_widget(Clear, popup_area);
    frame.render_widget(
        Paragraph::new(help_lines(palette))
            .block(block)
            .wrap(Wrap { trim: true }),
        popup_area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}

fn teardown_terminal() -> Result<()> {
    let mut stdout = io::stdout();
    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::TitleSegment;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn item(title: &str, url: &str) -> DisplayItem {
        DisplayItem {
            object_id: None,
            title: title.into(),
            title_segments: vec![
                TitleSegment {
                    text: title[..3].into(),
                    matched: true,
                },
                TitleSegment {
                    text: title[3..].into(),
                    matched: false,
                },
            ],
            url: url.into(),
            image: String::new(),
            image_is_placeholder: true,
            manufacturer: Some("Kring".into()),
            ean: None,
            sku: None,
            price: PriceLabel::Regular {
                price: "450 RON".into(),
            },
            stock: Some(StockStatus::InStock),
        }
    }

    fn shown(items: Vec<DisplayItem>) -> DropdownState {
        DropdownState {
            visible: true,
            content: DropdownContent::Results {
                query: "sca".into(),
                total: Some(40),
                items,
            },
        }
    }

    fn valid_config() -> SearchBoxConfig {
        let mut config = SearchBoxConfig::default();
        config.service.app_id = "APP".into();
        config.service.api_key = "key".into();
        config.service.index = "products".into();
        config
    }

    #[test]
    fn typing_sends_the_whole_input() {
        let mut state = TuiState::new(ThemePalette::dark());
        let hidden = DropdownState::default();
        state.handle_key(key(KeyCode::Char('s')), &hidden);
        let actions = state.handle_key(key(KeyCode::Char('c')), &hidden);
        assert_eq!(
            actions,
            vec![TuiAction::Send(HostEvent::Input("sc".into()))]
        );
        let actions = state.handle_key(key(KeyCode::Backspace), &hidden);
        assert_eq!(actions, vec![TuiAction::Send(HostEvent::Input("s".into()))]);
    }

    #[test]
    fn enter_submits_and_clears_input() {
        let mut state = TuiState::new(ThemePalette::dark());
        state.input = "scaun".into();
        let actions = state.handle_key(key(KeyCode::Enter), &DropdownState::default());
        assert_eq!(
            actions,
            vec![TuiAction::Send(HostEvent::Submit("scaun".into()))]
        );
        assert!(state.input.is_empty());
    }

    #[test]
    fn enter_on_blank_input_does_nothing() {
        let mut state = TuiState::new(ThemePalette::dark());
        state.input = "   ".into();
        assert!(
            state
                .handle_key(key(KeyCode::Enter), &DropdownState::default())
                .is_empty()
        );
    }

    #[test]
    fn selection_moves_within_bounds_and_opens_item() {
        let dropdown = shown(vec![item("Scaun", "/p/1"), item("Scaunel", "/p/2")]);
        let mut state = TuiState::new(ThemePalette::dark());

        state.handle_key(key(KeyCode::Down), &dropdown);
        state.handle_key(key(KeyCode::Down), &dropdown);
        state.handle_key(key(KeyCode::Down), &dropdown);
        assert_eq!(state.selected, Some(1));
        state.handle_key(key(KeyCode::Up), &dropdown);
        assert_eq!(state.selected, Some(0));

        let actions = state.handle_key(key(KeyCode::Enter), &dropdown);
        assert_eq!(
            actions,
            vec![
                TuiAction::Open("/p/1".into()),
                TuiAction::Send(HostEvent::Click(ClickTarget::Outside)),
            ]
        );
        assert_eq!(state.selected, None);
    }

    #[test]
    fn arrows_ignored_while_hidden() {
        let mut dropdown = shown(vec![item("Scaun", "/p/1")]);
        dropdown.visible = false;
        let mut state = TuiState::new(ThemePalette::dark());
        state.handle_key(key(KeyCode::Down), &dropdown);
        assert_eq!(state.selected, None);
    }

    #[test]
    fn esc_dismisses_then_quits() {
        let dropdown = shown(vec![item("Scaun", "/p/1")]);
        let mut state = TuiState::new(ThemePalette::dark());
        assert_eq!(
            state.handle_key(key(KeyCode::Esc), &dropdown),
            vec![TuiAction::Send(HostEvent::Click(ClickTarget::Outside))]
        );
        assert_eq!(
            state.handle_key(key(KeyCode::Esc), &DropdownState::default()),
            vec![TuiAction::Quit]
        );
    }

    #[test]
    fn control_keys() {
        let mut state = TuiState::new(ThemePalette::dark());
        let hidden = DropdownState::default();
        assert_eq!(
            state.handle_key(ctrl('a'), &hidden),
            vec![TuiAction::Send(HostEvent::ViewAll)]
        );
        assert_eq!(
            state.handle_key(key(KeyCode::Tab), &hidden),
            vec![TuiAction::Send(HostEvent::Focus)]
        );
        assert_eq!(state.handle_key(ctrl('c'), &hidden), vec![TuiAction::Quit]);
        assert_eq!(
            state.handle_key(key(KeyCode::F(10)), &hidden),
            vec![TuiAction::Quit]
        );
    }

    #[test]
    fn help_swallows_keys_until_closed() {
        let mut state = TuiState::new(ThemePalette::dark());
        let hidden = DropdownState::default();
        state.handle_key(key(KeyCode::F(1)), &hidden);
        assert!(state.show_help);
        assert!(state.handle_key(key(KeyCode::Char('x')), &hidden).is_empty());
        assert!(state.input.is_empty());
        state.handle_key(key(KeyCode::Esc), &hidden);
        assert!(!state.show_help);
    }

    #[test]
    fn clamp_drops_stale_selection() {
        let mut state = TuiState::new(ThemePalette::dark());
        state.selected = Some(3);
        state.clamp_selection(&shown(vec![item("Scaun", "/p/1")]));
        assert_eq!(state.selected, None);
    }

    #[test]
    fn headless_frame_shows_results() {
        let state = TuiState::new(ThemePalette::dark());
        let rows = render_headless(&state, &shown(vec![item("Scaun", "/p/1")]), &valid_config())
            .unwrap();
        let screen = rows.join("\n");
        assert!(screen.contains("Search"));
        assert!(screen.contains("Scaun"));
        assert!(screen.contains("450 RON"));
        assert!(screen.contains("1 of 40"));
        assert!(screen.contains("În stoc"));
    }

    #[test]
    fn headless_frame_shows_no_results_query() {
        let state = TuiState::new(ThemePalette::dark());
        let dropdown = DropdownState {
            visible: true,
            content: DropdownContent::NoResults {
                query: "xyzq".into(),
            },
        };
        let screen = render_headless(&state, &dropdown, &valid_config())
            .unwrap()
            .join("\n");
        assert!(screen.contains("\"xyzq\""));
    }
}
