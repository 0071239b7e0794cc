mod api;
mod config;
mod dates;
mod fetch;
mod health;
mod logging;
mod models;
mod query;
mod tui;
mod view;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use config::Settings;
use fetch::FetchController;
use models::Job;
use view::{DatePosted, derive_page, normalize_tags, summarize_tags};

#[derive(Parser)]
#[command(name = "jobboard")]
#[command(about = "Browse, filter and page through job postings from a jobs API")]
struct Cli {
    /// Base URL of the jobs API (requests go to <URL>/jobs)
    #[arg(long, env = "JOBS_API_URL", global = true)]
    api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = config::DEFAULT_TIMEOUT_SECS, global = true)]
    timeout_secs: u64,

    /// Email shown in the contact popover
    #[arg(long, env = "JOBS_CONTACT_EMAIL", global = true)]
    contact_email: Option<String>,

    /// Phone number shown in the contact popover
    #[arg(long, env = "JOBS_CONTACT_PHONE", global = true)]
    contact_phone: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive browser (default)
    Browse {
        /// Initial search text
        #[arg(short, long, default_value = "")]
        search: String,

        /// Initial date filter (any, 24h, 7d, 30d)
        #[arg(short, long, default_value = "any")]
        posted: DatePosted,
    },

    /// Print one page of jobs
    List {
        /// Search text passed to the API
        #[arg(short, long, default_value = "")]
        search: String,

        /// Date filter (any, 24h, 7d, 30d)
        #[arg(short, long, default_value = "any")]
        posted: DatePosted,

        /// Page number, starting at 1
        #[arg(long, default_value = "1")]
        page: usize,
    },

    /// Show job details
    Show {
        /// Job ID
        id: String,

        /// Search text passed to the API when looking the job up
        #[arg(short, long, default_value = "")]
        search: String,
    },

    /// Serve the liveness endpoint at /api/health
    Health {
        /// Address to listen on
        #[arg(short, long, default_value = config::DEFAULT_HEALTH_BIND)]
        bind: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Browse {
        search: String::new(),
        posted: DatePosted::Any,
    });

    match &command {
        Commands::Browse { .. } => logging::init_file(&config::log_path(), "info")?,
        Commands::Health { .. } => logging::init_stderr("info")?,
        _ => logging::init_stderr("warn")?,
    }

    let settings = Settings::new(
        cli.api_url,
        cli.timeout_secs,
        cli.contact_email,
        cli.contact_phone,
    );
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    match command {
        Commands::Browse { search, posted } => {
            tui::run_browse(&settings, runtime.handle().clone(), search, posted)?;
        }

        Commands::List { search, posted, page } => {
            let api = api::JobsApi::new(settings.api_url.clone(), settings.timeout)?;
            let mut controller = FetchController::new();
            let state = runtime.block_on(controller.refresh(&api, &search));

            let page_view = derive_page(&state.jobs, posted, page, Utc::now());
            let filters_active = !search.is_empty() || posted != DatePosted::Any;
            if let Some(placeholder) = view::placeholder(
                state.loading,
                state.error.as_deref(),
                state.jobs.len(),
                page_view.filtered_count,
                filters_active,
            ) {
                println!("{}", placeholder.message());
                return Ok(());
            }

            if let Some(days) = posted.window_days() {
                println!(
                    "{} posted since {}",
                    posted,
                    dates::format_date(dates::days_ago(days))
                );
            }
            println!("{:<5} {:<30} {:<20} {:<16} {:<10} {:<24}", "#", "TITLE", "COMPANY", "LOCATION", "POSTED", "TAGS");
            println!("{}", "-".repeat(110));
            for (i, job) in page_view.items.iter().enumerate() {
                let tags = summarize_tags(&job.tags);
                let mut tag_text = tags.shown.join(",");
                if let Some(more) = tags.more_label() {
                    tag_text.push(' ');
                    tag_text.push_str(&more);
                }
                println!(
                    "{:<5} {:<30} {:<20} {:<16} {:<10} {:<24}",
                    page_view.first_position() + i,
                    truncate(job.display_title(), 28),
                    truncate(job.company().unwrap_or("-"), 18),
                    truncate(job.location().unwrap_or("-"), 14),
                    dates::display_date(job.publication_date.as_deref()),
                    truncate(&tag_text, 24)
                );
            }
            println!(
                "\nPage {} of {} ({} jobs){}{}",
                page_view.page,
                page_view.total_pages,
                page_view.filtered_count,
                if page_view.has_prev() { "  [--page to go back]" } else { "" },
                if page_view.has_next() { "  [more with --page]" } else { "" }
            );
        }

        Commands::Show { id, search } => {
            let api = api::JobsApi::new(settings.api_url.clone(), settings.timeout)?;
            let mut controller = FetchController::new();
            let state = runtime.block_on(controller.refresh(&api, &search));
            if let Some(error) = &state.error {
                return Err(anyhow!("{}", error));
            }

            match state.jobs.iter().find(|job| job.job_id.matches(&id)) {
                Some(job) => print_job(job),
                None => {
                    println!("Job {} not found.", id);
                }
            }
        }

        Commands::Health { bind } => {
            runtime.block_on(health::listen(&bind))?;
        }
    }

    Ok(())
}

fn print_job(job: &Job) {
    println!("Job {}", job.job_id);
    println!("Title: {}", job.display_title());
    if let Some(company) = job.company() {
        println!("Company: {}", company);
    }
    if let Some(location) = job.location() {
        println!("Location: {}", location);
    }
    println!("Posted: {}", dates::display_date(job.publication_date.as_deref()));
    if let Some(salary) = job.salary() {
        println!("Salary: {}", salary);
    }
    if let Some(job_type) = job.job_type() {
        println!("Type: {}", job_type);
    }
    if let Some(source) = job.source() {
        println!("Source: {}", source);
    }
    if let Some(url) = job.url() {
        println!("URL: {}", url);
    }
    let tags = normalize_tags(&job.tags);
    if !tags.is_empty() {
        println!("Tags: {}", tags.join(", "));
    }
    if let Some(description) = &job.description {
        println!("\n--- Description ---\n{}", textwrap::fill(description, 80));
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_is_browse() {
        let cli = Cli::try_parse_from(["jobboard"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_list_args() {
        let cli = Cli::try_parse_from(["jobboard", "list", "-s", "rust", "-p", "7d", "--page", "2"]).unwrap();
        match cli.command {
            Some(Commands::List { search, posted, page }) => {
                assert_eq!(search, "rust");
                assert_eq!(posted, DatePosted::Last7d);
                assert_eq!(page, 2);
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_bad_date_filter_rejected() {
        assert!(Cli::try_parse_from(["jobboard", "list", "--posted", "90d"]).is_err());
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Développeur Rust senior", 10), "Dévelop...");
    }
}
