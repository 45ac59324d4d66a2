//! Denshikawa CLI - browse and read manga from the terminal.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use denshikawa::error::ApiError;
use denshikawa::models::manga::MangaSummary;
use denshikawa::models::Paginated;
use denshikawa::query::InfinitePages;
use denshikawa::{Config, Console, Denshikawa};
use std::future::Future;

/// Client for the Denshikawa manga-reading service.
#[derive(Parser, Debug)]
#[command(name = "denshikawa")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Override the configured API base URL.
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in with email and password.
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Create an account.
    Register {
        email: String,
        username: String,
        #[arg(long)]
        password: String,
    },

    /// Log out and clear the local session.
    Logout,

    /// Show the current user profile.
    Whoami,

    /// Search titles.
    Search {
        query: String,
        /// Fetch up to N pages of results.
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },

    /// List popular titles.
    Popular {
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },

    /// List recently updated titles.
    Latest {
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },

    /// Show details for one manga.
    Info { id: String },

    /// List chapters for one manga.
    Chapters { id: String },

    /// List page images for one chapter.
    Pages { chapter_id: String },

    /// Show the bookmark list.
    Bookmarks,

    /// Bookmark a manga.
    Bookmark { manga_id: String },

    /// Remove a bookmark.
    Unbookmark { manga_id: String },

    /// Show the library (bookmarks with progress).
    Library,

    /// Show reading history.
    History,

    /// Mark a chapter as read.
    MarkRead { chapter_id: String },

    /// Record reading progress for a manga.
    Progress {
        manga_id: String,
        chapter_id: String,
        #[arg(long, default_value_t = 0)]
        page: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let console = Console::new();

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(base_url) = args.base_url {
        config.api.base_url = base_url;
    }
    config.validate().context("Invalid configuration")?;

    let service = Denshikawa::connect(&config).context("Failed to initialize client")?;

    let result = run(&args.command, &service, &console).await;
    if let Err(err) = &result {
        if let Some(ApiError::Auth) = err.downcast_ref::<ApiError>() {
            console.error("Session expired. Run `denshikawa login` to sign in again.");
            return Ok(());
        }
    }
    result
}

async fn run(command: &Command, service: &Denshikawa, console: &Console) -> Result<()> {
    match command {
        Command::Login { email, password } => {
            match service.login(email, password).await {
                Ok(user) => console.success(&format!("Logged in as {}", user.username)),
                Err(ApiError::Auth) => console.error("Login failed: invalid credentials"),
                Err(err) => return Err(err.into()),
            }
        }

        Command::Register {
            email,
            username,
            password,
        } => {
            let user = service.register(email, username, password).await?;
            console.success(&format!("Account created: {}", user.username));
        }

        Command::Logout => {
            service.logout().await;
            console.success("Logged out");
        }

        Command::Whoami => {
            let user = service.me().await?;
            console.section(&user.username);
            console.field("id", &user.id);
            console.field("email", &user.email);
            console.field("role", &user.role);
            console.field("member since", &user.created_at);
        }

        Command::Search { query, pages } => {
            print_listing(console, *pages, |offset| service.search(query, offset)).await?;
        }

        Command::Popular { pages } => {
            print_listing(console, *pages, |offset| service.popular(offset)).await?;
        }

        Command::Latest { pages } => {
            print_listing(console, *pages, |offset| service.latest(offset)).await?;
        }

        Command::Info { id } => {
            let details = service.manga_details(id).await?;
            console.section(&details.title);
            if !details.alt_titles.is_empty() {
                console.field("also known as", &details.alt_titles.join(" / "));
            }
            console.field("status", &details.status);
            if let Some(year) = details.year {
                console.field("year", &year.to_string());
            }
            console.field("rating", &details.content_rating);
            if !details.author_names.is_empty() {
                console.field("authors", &details.author_names.join(", "));
            }
            if !details.artist_names.is_empty() {
                console.field("artists", &details.artist_names.join(", "));
            }
            let tags: Vec<&str> = details.tags.iter().map(|t| t.name.as_str()).collect();
            if !tags.is_empty() {
                console.field("tags", &tags.join(", "));
            }
            if !details.description.is_empty() {
                println!("\n{}", details.description);
            }
        }

        Command::Chapters { id } => {
            let chapters = service.manga_chapters(id).await?;
            console.info(&format!("{} chapters", chapters.len()));
            for chapter in &chapters {
                let number = chapter.chapter_number.as_deref().unwrap_or("-");
                let title = chapter.title.as_deref().unwrap_or("");
                let group = chapter.scanlation_group_name.as_deref().unwrap_or("unknown");
                println!("  {:>6}  {}  [{}]  {}", number, chapter.mangadex_id, group, title);
            }
        }

        Command::Pages { chapter_id } => {
            let pages = service.chapter_pages(chapter_id).await?;
            let nav = service.chapter_navigation(chapter_id).await?;
            for page in &pages.pages {
                println!("  {:>3}  {}x{}  {}", page.page_number, page.width, page.height, page.url);
            }
            if let Some(previous) = &nav.previous {
                console.info(&format!("previous: {}", previous.mangadex_id));
            }
            if let Some(next) = &nav.next {
                console.info(&format!("next: {}", next.mangadex_id));
            }
        }

        Command::Bookmarks => {
            let bookmarks = service.bookmarks().await?;
            if bookmarks.is_empty() {
                console.info("No bookmarks yet");
            }
            for bookmark in &bookmarks {
                println!("  {}  {}", bookmark.manga_id, bookmark.title);
            }
        }

        Command::Bookmark { manga_id } => {
            service.add_bookmark(manga_id).await?;
            console.success("Bookmarked");
        }

        Command::Unbookmark { manga_id } => {
            service.remove_bookmark(manga_id).await?;
            console.success("Bookmark removed");
        }

        Command::Library => {
            let library = service.library().await?;
            if library.is_empty() {
                console.info("Library is empty");
            }
            for item in &library {
                let progress = match (&item.current_chapter_id, item.current_page) {
                    (Some(chapter), Some(page)) => format!("at {chapter} p.{page}"),
                    (Some(chapter), None) => format!("at {chapter}"),
                    _ => "unread".to_string(),
                };
                println!("  {}  {}  ({}, {})", item.manga_id, item.title, item.status, progress);
            }
        }

        Command::History => {
            let history = service.history().await?;
            if history.is_empty() {
                console.info("No reading history");
            }
            for item in &history {
                let number = item.chapter_number.as_deref().unwrap_or("-");
                println!("  {}  ch.{}  read {}", item.chapter_id, number, item.read_at);
            }
        }

        Command::MarkRead { chapter_id } => {
            service.mark_chapter_read(chapter_id).await?;
            console.success("Marked as read");
        }

        Command::Progress {
            manga_id,
            chapter_id,
            page,
        } => {
            service.update_progress(manga_id, chapter_id, *page).await?;
            console.success("Progress saved");
        }
    }

    Ok(())
}

/// Fetches up to `max_pages` pages of a listing and prints the titles.
async fn print_listing<F, Fut>(
    console: &Console,
    max_pages: u32,
    mut fetch_page: F,
) -> Result<()>
where
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = std::result::Result<Paginated<MangaSummary>, ApiError>>,
{
    let mut pages = InfinitePages::new();
    let mut fetched = 0u32;

    while fetched < max_pages {
        let Some(offset) = pages.next_offset() else {
            break;
        };
        let page = fetch_page(offset).await?;
        let exhausted = page.data.is_empty();
        pages.push(page);
        fetched += 1;
        if exhausted {
            break;
        }
    }

    for manga in pages.items() {
        println!("  {}  {}  ({})", manga.id, manga.title, manga.status);
    }
    console.info(&format!(
        "showing {} of {} titles",
        pages.items().count(),
        pages.total()
    ));
    Ok(())
}
