use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::api::{FetchError, JobsApi};
use crate::config::{Contact, Settings};
use crate::dates::display_date;
use crate::fetch::{FetchController, FetchTicket};
use crate::models::Job;
use crate::view::{self, DatePosted, PageView, ViewState, derive_page, normalize_tags, summarize_tags};

type FetchOutcome = (FetchTicket, Result<Vec<Job>, FetchError>);

const TICK: Duration = Duration::from_millis(100);
const SEARCH_PROMPT: &str = "Search jobs, companies, tags...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Search,
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct AppState {
    view: ViewState,
    fetch: FetchController,
    mode: Mode,
    highlighted: usize,
    detail_scroll: u16,
    contact: Contact,
    // Last drawn overlay areas, for click-outside handling.
    detail_area: Option<Rect>,
    contact_area: Option<Rect>,
}

impl AppState {
    fn new(view: ViewState, contact: Contact) -> Self {
        Self {
            view,
            fetch: FetchController::new(),
            mode: Mode::Browse,
            highlighted: 0,
            detail_scroll: 0,
            contact,
            detail_area: None,
            contact_area: None,
        }
    }

    fn page(&self, now: DateTime<Utc>) -> PageView<'_> {
        derive_page(
            &self.fetch.state().jobs,
            self.view.date_posted(),
            self.view.current_page(),
            now,
        )
    }

    fn apply(&mut self, ticket: FetchTicket, result: Result<Vec<Job>, FetchError>) {
        if self.fetch.complete(&ticket, result) {
            self.highlighted = 0;
            self.detail_scroll = 0;
            self.view.close_detail();
        }
    }

    fn filters_changed(&mut self) {
        self.highlighted = 0;
        self.view.close_detail();
    }

    fn next(&mut self, page_len: usize) {
        if page_len > 0 && self.highlighted < page_len - 1 {
            self.highlighted += 1;
        }
    }

    fn prev(&mut self) {
        self.highlighted = self.highlighted.saturating_sub(1);
    }

    fn scroll_down(&mut self) {
        self.detail_scroll = self.detail_scroll.saturating_add(3);
    }

    fn scroll_up(&mut self) {
        self.detail_scroll = self.detail_scroll.saturating_sub(3);
    }
}

/// Sends requests on the runtime and hands results back to the UI thread.
struct Fetcher {
    api: JobsApi,
    runtime: Handle,
    tx: UnboundedSender<FetchOutcome>,
}

impl Fetcher {
    fn request(&self, state: &mut AppState) {
        let ticket = state.fetch.begin(state.view.search());
        tracing::debug!(seq = ticket.seq, search = %ticket.search, "request issued");
        let api = self.api.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = api.fetch_jobs(&ticket.search).await;
            // Receiver gone means the UI already exited.
            let _ = tx.send((ticket, result));
        });
    }
}

pub fn run_browse(settings: &Settings, runtime: Handle, search: String, posted: DatePosted) -> Result<()> {
    let api = JobsApi::new(settings.api_url.clone(), settings.timeout)?;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let fetcher = Fetcher { api, runtime, tx };

    let mut view = ViewState::new();
    view.set_search(search);
    view.set_date_posted(posted);
    let mut state = AppState::new(view, settings.contact.clone());
    fetcher.request(&mut state);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state, &fetcher, &mut rx);

    // Restore terminal
    stdout().execute(DisableMouseCapture)?;
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
    fetcher: &Fetcher,
    rx: &mut UnboundedReceiver<FetchOutcome>,
) -> Result<()> {
    let mut list_state = ListState::default();

    loop {
        while let Ok((ticket, result)) = rx.try_recv() {
            state.apply(ticket, result);
        }

        list_state.select(Some(state.highlighted));
        terminal
            .draw(|frame| draw(frame, state, &mut list_state, Utc::now()))
            .context("Failed to draw terminal frame")?;

        if !event::poll(TICK)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if handle_key(state, key, fetcher) == Flow::Quit {
                    break;
                }
            }
            Event::Mouse(mouse) => handle_mouse(state, mouse),
            _ => {}
        }
    }
    Ok(())
}

fn handle_key(state: &mut AppState, key: KeyEvent, fetcher: &Fetcher) -> Flow {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Flow::Quit;
    }

    if state.mode == Mode::Search {
        let changed = match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                state.mode = Mode::Browse;
                false
            }
            KeyCode::Backspace => state.view.pop_search_char(),
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                state.view.set_search("")
            }
            KeyCode::Char(c) => state.view.push_search_char(c),
            _ => false,
        };
        if changed {
            state.filters_changed();
            fetcher.request(state);
        }
        return Flow::Continue;
    }

    // The popover swallows the key that dismisses it.
    if state.view.show_contact() {
        state.view.close_contact();
        return Flow::Continue;
    }

    let now = Utc::now();
    let (page_len, page_no, total) = {
        let page = state.page(now);
        (page.items.len(), page.page, page.total_pages)
    };

    if state.view.selected_job().is_some() {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => {
                state.view.close_detail();
                state.detail_scroll = 0;
            }
            KeyCode::Down | KeyCode::Char('j') | KeyCode::PageDown => state.scroll_down(),
            KeyCode::Up | KeyCode::Char('k') | KeyCode::PageUp => state.scroll_up(),
            _ => {}
        }
        return Flow::Continue;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
        KeyCode::Char('/') => state.mode = Mode::Search,
        KeyCode::Char('c') => state.view.toggle_contact(),
        KeyCode::Char('d') => {
            state.view.cycle_date_posted();
            state.filters_changed();
        }
        KeyCode::Char(c @ '1'..='4') => {
            let idx = c as usize - '1' as usize;
            state.view.set_date_posted(DatePosted::ALL[idx]);
            state.filters_changed();
        }
        KeyCode::Down | KeyCode::Char('j') => state.next(page_len),
        KeyCode::Up | KeyCode::Char('k') => state.prev(),
        KeyCode::Right | KeyCode::Char('n') | KeyCode::PageDown => {
            state.view.set_page(page_no);
            state.view.next_page(total);
            state.highlighted = 0;
        }
        KeyCode::Left | KeyCode::Char('p') | KeyCode::PageUp => {
            state.view.set_page(page_no);
            state.view.prev_page();
            state.highlighted = 0;
        }
        KeyCode::Enter => {
            if state.highlighted < page_len {
                state.view.select(state.highlighted);
                state.detail_scroll = 0;
            }
        }
        _ => {}
    }
    Flow::Continue
}

fn handle_mouse(state: &mut AppState, mouse: MouseEvent) {
    let clicked = Position::new(mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if state.view.show_contact() && !state.contact_area.is_some_and(|a| a.contains(clicked)) {
                state.view.close_contact();
            }
            if state.view.selected_job().is_some() && !state.detail_area.is_some_and(|a| a.contains(clicked)) {
                state.view.close_detail();
                state.detail_scroll = 0;
            }
        }
        MouseEventKind::ScrollDown if state.view.selected_job().is_some() => state.scroll_down(),
        MouseEventKind::ScrollUp if state.view.selected_job().is_some() => state.scroll_up(),
        _ => {}
    }
}

fn draw(frame: &mut Frame, state: &mut AppState, list_state: &mut ListState, now: DateTime<Utc>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let header = Line::from(vec![
        Span::styled(" Job Aggregator", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::styled("   c:contact", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(header), chunks[0]);

    draw_controls(frame, state, chunks[1]);

    let page = state.page(now);
    let fetch = state.fetch.state();
    let placeholder = view::placeholder(
        fetch.loading,
        fetch.error.as_deref(),
        fetch.jobs.len(),
        page.filtered_count,
        state.view.filters_active(),
    );

    let title = format!(" Jobs ({}) ", page.filtered_count);
    match placeholder {
        Some(p) => {
            let style = match p {
                view::Placeholder::Error(_) => Style::default().fg(Color::Red),
                _ => Style::default().fg(Color::Blue),
            };
            let widget = Paragraph::new(p.message().to_string())
                .style(style)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title(title));
            frame.render_widget(widget, chunks[2]);
        }
        None => {
            let items: Vec<ListItem> = page
                .items
                .iter()
                .map(|job| ListItem::new(Text::from(card_lines(job))))
                .collect();
            let list = List::new(items)
                .block(Block::default().borders(Borders::ALL).title(title))
                .highlight_style(Style::default().bg(Color::DarkGray))
                .highlight_symbol("> ");
            frame.render_stateful_widget(list, chunks[2], list_state);
        }
    }

    frame.render_widget(Paragraph::new(pagination_line(&page)), chunks[3]);

    let help = help_text(state.mode, state.view.selected_job().is_some());
    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        chunks[4],
    );

    let selected = state.view.selected_job().and_then(|idx| page.items.get(idx).copied());
    let detail_area = selected.map(|job| {
        let area = centered_rect(80, 80, frame.area());
        let width = area.width.saturating_sub(4) as usize;
        let widget = Paragraph::new(Text::from(detail_lines(job, width)))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Details ")
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .wrap(Wrap { trim: false })
            .scroll((state.detail_scroll, 0));
        frame.render_widget(Clear, area);
        frame.render_widget(widget, area);
        area
    });

    let contact_area = state.view.show_contact().then(|| {
        let area = contact_rect(frame.area());
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(Text::from(contact_lines(&state.contact)))
                .block(Block::default().borders(Borders::ALL).title(" Contact ")),
            area,
        );
        area
    });

    state.detail_area = detail_area;
    state.contact_area = contact_area;
}

fn help_text(mode: Mode, detail_open: bool) -> &'static str {
    match (mode, detail_open) {
        (Mode::Search, _) => " type to search  Backspace:delete  Ctrl-U:clear  Enter/Esc:done",
        (Mode::Browse, true) => " j/k:scroll  Esc/q:close  click outside:close",
        (Mode::Browse, false) => {
            " /:search  d,1-4:date  j/k:move  n/p:page  Enter:details  c:contact  q:quit"
        }
    }
}

fn draw_controls(frame: &mut Frame, state: &AppState, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(20)])
        .split(area);

    let searching = state.mode == Mode::Search;
    let search_text = if state.view.search().is_empty() && !searching {
        Span::styled(SEARCH_PROMPT, Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(state.view.search().to_string())
    };
    let border = if searching {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    frame.render_widget(
        Paragraph::new(Line::from(search_text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Search ")
                .border_style(border),
        ),
        cols[0],
    );
    if searching {
        let x = cols[0].x + 1 + state.view.search().chars().count() as u16;
        frame.set_cursor_position(Position::new(x.min(cols[0].right().saturating_sub(2)), cols[0].y + 1));
    }

    frame.render_widget(
        Paragraph::new(state.view.date_posted().to_string())
            .block(Block::default().borders(Borders::ALL).title(" Posted ")),
        cols[1],
    );
}

fn card_lines(job: &Job) -> Vec<Line<'static>> {
    let mut title = vec![Span::styled(
        job.display_title().to_string(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];
    for badge in [job.job_type(), job.source()].into_iter().flatten() {
        title.push(Span::raw(" "));
        title.push(Span::styled(format!("[{}]", badge), Style::default().fg(Color::Yellow)));
    }

    let company = job.company().unwrap_or("?");
    let where_line = match job.location() {
        Some(location) => format!("{} · {}", company, location),
        None => company.to_string(),
    };

    let mut posted = vec![Span::styled(
        format!("Posted: {}", display_date(job.publication_date.as_deref())),
        Style::default().fg(Color::Blue),
    )];
    if let Some(salary) = job.salary() {
        posted.push(Span::raw("  "));
        posted.push(Span::styled(salary.to_string(), Style::default().fg(Color::Green)));
    }

    let tags = summarize_tags(&job.tags);
    let mut tag_line: Vec<String> = tags.shown.iter().map(|t| format!("#{}", t)).collect();
    tag_line.extend(tags.more_label());

    vec![
        Line::from(title),
        Line::from(where_line),
        Line::from(posted),
        Line::from(Span::styled(tag_line.join(" "), Style::default().fg(Color::Magenta))),
        Line::from(""),
    ]
}

fn detail_lines(job: &Job, width: usize) -> Vec<Line<'static>> {
    let mut lines: Vec<Line> = Vec::new();
    let bold = Style::default().add_modifier(Modifier::BOLD);

    lines.push(Line::from(Span::styled(job.display_title().to_string(), bold)));
    if let Some(company) = job.company() {
        lines.push(Line::from(format!("at {}", company)));
    }
    lines.push(Line::from(""));

    let fields = [
        ("Location", job.location().map(str::to_string)),
        ("Posted", Some(display_date(job.publication_date.as_deref()))),
        ("Salary", job.salary().map(str::to_string)),
        ("Type", job.job_type().map(str::to_string)),
        ("Source", job.source().map(str::to_string)),
        ("URL", job.url().map(str::to_string)),
        ("ID", Some(job.job_id.to_string())),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            lines.push(Line::from(vec![
                Span::styled(format!("{:<10}", label), Style::default().fg(Color::DarkGray)),
                Span::raw(value),
            ]));
        }
    }

    let tags = normalize_tags(&job.tags);
    if !tags.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Tags", bold)));
        for line in textwrap::fill(&tags.join(", "), width.max(20)).lines() {
            lines.push(Line::from(format!("  {}", line)));
        }
    }

    match job.description.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(text) => {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Description", bold)));
            for line in textwrap::fill(text, width.max(20)).lines() {
                lines.push(Line::from(line.to_string()));
            }
        }
        None => {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "(No description provided)",
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    lines
}

fn contact_lines(contact: &Contact) -> Vec<Line<'static>> {
    if contact.is_empty() {
        return vec![Line::from(Span::styled(
            "No contact details configured",
            Style::default().fg(Color::DarkGray),
        ))];
    }
    let mut lines = Vec::new();
    if let Some(email) = &contact.email {
        lines.push(Line::from(format!("Email: {}", email)));
    }
    if let Some(phone) = &contact.phone {
        lines.push(Line::from(format!("Phone: {}", phone)));
    }
    lines
}

fn pagination_line(page: &PageView) -> Line<'static> {
    let enabled = Style::default().fg(Color::Cyan);
    let disabled = Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM);
    Line::from(vec![
        Span::styled(" < Previous", if page.has_prev() { enabled } else { disabled }),
        Span::raw(format!("   Page {} of {}   ", page.page, page.total_pages)),
        Span::styled("Next >", if page.has_next() { enabled } else { disabled }),
    ])
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn contact_rect(area: Rect) -> Rect {
    let width = area.width.min(44);
    let height = area.height.min(4);
    Rect {
        x: area.right().saturating_sub(width),
        y: area.y + 1u16.min(area.height.saturating_sub(height)),
        width,
        height,
    }
}
