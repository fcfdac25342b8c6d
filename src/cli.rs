use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gramprobe", about = "Headless-browser profile scraper & page renderer")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP service
    Serve {
        /// Bind address (overrides the config file)
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Scrape one profile and print the record as JSON
    Scrape {
        /// Profile URL or bare handle
        profile: String,

        /// Login username (falls back to INSTAGRAM_USERNAME)
        #[arg(short, long)]
        username: Option<String>,

        /// Login password (falls back to INSTAGRAM_PASSWORD)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Capture a PNG screenshot of a page
    Screenshot {
        /// Target URL (https assumed when the scheme is omitted)
        url: String,

        /// Output file
        #[arg(short, long, default_value = "screenshot.png")]
        output: String,

        /// Capture the full page instead of the viewport
        #[arg(long)]
        full_page: bool,
    },
    /// Render a page to PDF
    Pdf {
        /// Target URL
        url: String,

        /// Output file
        #[arg(short, long, default_value = "page.pdf")]
        output: String,
    },
    /// Print a JSON digest of a page's content
    Content {
        /// Target URL
        url: String,
    },
}
