use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;

use crate::dates::{days_before, parse_timestamp};
use crate::models::{Job, Tags};

pub const PAGE_SIZE: usize = 15;
pub const MAX_CARD_TAGS: usize = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DatePosted {
    #[default]
    Any,
    Last24h,
    Last7d,
    Last30d,
}

impl DatePosted {
    pub const ALL: [DatePosted; 4] = [
        DatePosted::Any,
        DatePosted::Last24h,
        DatePosted::Last7d,
        DatePosted::Last30d,
    ];

    pub fn window_days(self) -> Option<i64> {
        match self {
            DatePosted::Any => None,
            DatePosted::Last24h => Some(1),
            DatePosted::Last7d => Some(7),
            DatePosted::Last30d => Some(30),
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            DatePosted::Any => "",
            DatePosted::Last24h => "24h",
            DatePosted::Last7d => "7d",
            DatePosted::Last30d => "30d",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DatePosted::Any => "Any time",
            DatePosted::Last24h => "Last 24h",
            DatePosted::Last7d => "Last 7 days",
            DatePosted::Last30d => "Last 30 days",
        }
    }

    pub fn next(self) -> Self {
        match self {
            DatePosted::Any => DatePosted::Last24h,
            DatePosted::Last24h => DatePosted::Last7d,
            DatePosted::Last7d => DatePosted::Last30d,
            DatePosted::Last30d => DatePosted::Any,
        }
    }

    /// Whether a job with this raw publication date survives the filter.
    /// Unparsable dates only survive `Any`.
    pub fn admits(self, publication_date: Option<&str>, now: DateTime<Utc>) -> bool {
        let Some(days) = self.window_days() else {
            return true;
        };
        match publication_date.and_then(parse_timestamp) {
            Some(posted) => posted >= days_before(now, days),
            None => {
                tracing::debug!(?publication_date, filter = self.code(), "unparsable date excluded");
                false
            }
        }
    }
}

impl fmt::Display for DatePosted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DatePosted {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "any" => Ok(DatePosted::Any),
            "24h" => Ok(DatePosted::Last24h),
            "7d" => Ok(DatePosted::Last7d),
            "30d" => Ok(DatePosted::Last30d),
            other => Err(anyhow!("Unknown date filter '{}'. Available: any, 24h, 7d, 30d", other)),
        }
    }
}

/// Everything the user controls during a session.
#[derive(Debug, Clone)]
pub struct ViewState {
    search: String,
    date_posted: DatePosted,
    current_page: usize,
    selected_job: Option<usize>,
    show_contact: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search: String::new(),
            date_posted: DatePosted::Any,
            current_page: 1,
            selected_job: None,
            show_contact: false,
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn date_posted(&self) -> DatePosted {
        self.date_posted
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn selected_job(&self) -> Option<usize> {
        self.selected_job
    }

    pub fn show_contact(&self) -> bool {
        self.show_contact
    }

    pub fn filters_active(&self) -> bool {
        !self.search.is_empty() || self.date_posted != DatePosted::Any
    }

    /// Returns `true` when the search actually changed, meaning a new fetch
    /// is due.
    pub fn set_search(&mut self, search: impl Into<String>) -> bool {
        let search = search.into();
        if search == self.search {
            return false;
        }
        self.search = search;
        self.current_page = 1;
        true
    }

    pub fn push_search_char(&mut self, c: char) -> bool {
        let mut next = self.search.clone();
        next.push(c);
        self.set_search(next)
    }

    pub fn pop_search_char(&mut self) -> bool {
        let mut next = self.search.clone();
        next.pop();
        self.set_search(next)
    }

    pub fn set_date_posted(&mut self, date_posted: DatePosted) {
        if date_posted != self.date_posted {
            self.date_posted = date_posted;
            self.current_page = 1;
        }
    }

    pub fn cycle_date_posted(&mut self) {
        self.set_date_posted(self.date_posted.next());
    }

    pub fn set_page(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    pub fn next_page(&mut self, total_pages: usize) {
        if self.current_page < total_pages {
            self.current_page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        if self.current_page > 1 {
            self.current_page -= 1;
        }
    }

    pub fn select(&mut self, index: usize) {
        self.selected_job = Some(index);
    }

    pub fn close_detail(&mut self) {
        self.selected_job = None;
    }

    pub fn toggle_contact(&mut self) {
        self.show_contact = !self.show_contact;
    }

    pub fn close_contact(&mut self) {
        self.show_contact = false;
    }
}

/// The visible slice plus what the pagination controls need.
#[derive(Debug)]
pub struct PageView<'a> {
    pub items: Vec<&'a Job>,
    pub filtered_count: usize,
    pub page: usize,
    pub total_pages: usize,
}

impl PageView<'_> {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// 1-based position of the first item on this page within the filtered set.
    pub fn first_position(&self) -> usize {
        (self.page - 1) * PAGE_SIZE + 1
    }
}

pub fn filter_jobs<'a>(jobs: &'a [Job], date_posted: DatePosted, now: DateTime<Utc>) -> Vec<&'a Job> {
    jobs.iter()
        .filter(|job| date_posted.admits(job.publication_date.as_deref(), now))
        .collect()
}

pub fn total_pages(filtered: usize) -> usize {
    filtered.div_ceil(PAGE_SIZE).max(1)
}

/// Recomputed from scratch on every render.
pub fn derive_page<'a>(
    jobs: &'a [Job],
    date_posted: DatePosted,
    current_page: usize,
    now: DateTime<Utc>,
) -> PageView<'a> {
    let filtered = filter_jobs(jobs, date_posted, now);
    let filtered_count = filtered.len();
    let total_pages = total_pages(filtered_count);
    let page = current_page.clamp(1, total_pages);

    let items = filtered
        .into_iter()
        .skip((page - 1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .collect();

    PageView {
        items,
        filtered_count,
        page,
        total_pages,
    }
}

pub fn normalize_tags(tags: &Tags) -> Vec<&str> {
    match tags {
        Tags::Csv(s) if s.is_empty() => Vec::new(),
        Tags::Csv(s) => s.split(',').collect(),
        Tags::List(list) => list.iter().map(String::as_str).collect(),
        Tags::Other(_) => Vec::new(),
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct TagSummary<'a> {
    pub shown: Vec<&'a str>,
    pub more: usize,
}

impl TagSummary<'_> {
    pub fn more_label(&self) -> Option<String> {
        (self.more > 0).then(|| format!("+{} more", self.more))
    }
}

pub fn summarize_tags(tags: &Tags) -> TagSummary<'_> {
    let all = normalize_tags(tags);
    let more = all.len().saturating_sub(MAX_CARD_TAGS);
    let shown = all.into_iter().take(MAX_CARD_TAGS).collect();
    TagSummary { shown, more }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    Loading,
    Error(String),
    BackendUnavailable,
    NoMatches,
    NoneAvailable,
}

impl Placeholder {
    pub fn message(&self) -> &str {
        match self {
            Placeholder::Loading => "Loading jobs...",
            Placeholder::Error(msg) => msg,
            Placeholder::BackendUnavailable => "No jobs found. Please check if the backend is running.",
            Placeholder::NoMatches => {
                "No jobs found matching your filters. Try adjusting your search or date range."
            }
            Placeholder::NoneAvailable => "No jobs available at the moment.",
        }
    }
}

/// What to show instead of the job list, if anything.
pub fn placeholder(
    loading: bool,
    error: Option<&str>,
    fetched: usize,
    filtered: usize,
    filters_active: bool,
) -> Option<Placeholder> {
    if loading {
        return Some(Placeholder::Loading);
    }
    if let Some(msg) = error {
        return Some(Placeholder::Error(msg.to_string()));
    }
    if filtered > 0 {
        return None;
    }
    Some(if fetched == 0 {
        Placeholder::BackendUnavailable
    } else if filters_active {
        Placeholder::NoMatches
    } else {
        Placeholder::NoneAvailable
    })
}
