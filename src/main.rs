use autoeq::config::Settings;
use autoeq::format::{format_count_or, truncate_chars};
use autoeq::render::cluster_color;
use autoeq::serve::AppState;
use autoeq::tracks::{flatten, TrackQuery};
use autoeq::Snapshot;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "autoeq")]
#[command(author, version, about = "Browse liked-track clusters and their EQ presets")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Directory containing the JSON datasets
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the dashboard web UI
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Don't open a browser
        #[arg(long)]
        no_open: bool,
    },

    /// Write the dashboard as a static site
    Build {
        /// Output directory
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Don't prompt to open the site
        #[arg(long)]
        no_open: bool,

        /// Only print errors
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print one page of the track table
    Tracks {
        /// Search title, artist and genre
        #[arg(short, long, default_value = "")]
        search: String,

        /// Only tracks from this cluster id
        #[arg(short, long)]
        cluster: Option<String>,

        /// title, artist, duration, plays or liked_at
        #[arg(long, default_value = "liked_at")]
        sort: String,

        /// Page number (50 tracks per page)
        #[arg(short, long, default_value = "1")]
        page: usize,
    },
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };
    if let Some(dir) = args.data_dir {
        settings.data_dir = dir;
    }

    let snapshot = match autoeq::load(&settings.data_dir) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, dir = %settings.data_dir.display(), "failed to load datasets");
            std::process::exit(1);
        }
    };

    match args.command {
        Command::Serve { port, no_open } => {
            let port = port.unwrap_or(settings.port);
            let open_browser = settings.open_browser && !no_open;
            if let Err(e) = autoeq::serve::start(port, AppState::new(snapshot), open_browser) {
                error!(error = %e, "server error");
                std::process::exit(1);
            }
        }
        Command::Build { out, no_open, quiet } => {
            let out = out.unwrap_or(settings.site_dir);
            build_site(&snapshot, out, !no_open && settings.open_browser, quiet);
        }
        Command::Tracks { search, cluster, sort, page } => {
            if let Some(id) = cluster.as_deref().filter(|c| !c.is_empty()) {
                if snapshot.clusters.get(id).is_none() {
                    let known: Vec<&str> = snapshot.clusters.clusters.iter().map(|c| c.id.as_str()).collect();
                    eprintln!("\x1b[31mNo cluster '{}'\x1b[0m (known: {})", id, known.join(", "));
                    std::process::exit(2);
                }
            }
            let query = TrackQuery {
                q: search,
                cluster: cluster.unwrap_or_default(),
                sort,
                page: Some(page),
            };
            print_tracks(&snapshot, &query);
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "autoeq=debug" } else { "autoeq=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn build_site(snapshot: &Snapshot, out: PathBuf, offer_open: bool, quiet: bool) {
    let written = match autoeq::site::build(snapshot, &out, !quiet) {
        Ok(w) => w,
        Err(e) => {
            error!(error = %e, dir = %out.display(), "failed to write site");
            std::process::exit(1);
        }
    };

    if quiet {
        return;
    }
    eprintln!("\n\x1b[32mSite saved: {} ({} files)\x1b[0m", out.display(), written.len());

    if offer_open {
        eprint!("\nOpen site in browser? [Y/n] ");
        io::stderr().flush().ok();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_ok() {
            let input = input.trim().to_lowercase();
            if input.is_empty() || input == "y" || input == "yes" {
                if let Err(e) = open::that(out.join("index.html")) {
                    eprintln!("Failed to open site: {}", e);
                }
            }
        }
    }
}

fn print_tracks(snapshot: &Snapshot, query: &TrackQuery) {
    let all = flatten(&snapshot.clusters.clusters);
    let table = query.apply(&all);

    if let Some(page) = query.page {
        if page != table.current_page() {
            eprintln!(
                "\x1b[33mPage {} does not exist ({} pages), showing page {}\x1b[0m",
                page,
                table.total_pages(),
                table.current_page()
            );
        }
    }

    for t in table.visible() {
        let track = &t.track;
        println!(
            "{}{:<18}\x1b[0m {:<40}  {:<24}  {:>8}  {:>10}",
            ansi_color(cluster_color(&t.cluster_id)),
            truncate_chars(&t.cluster_name, 18),
            truncate_chars(track.title(), 40),
            truncate_chars(track.artist(), 24),
            track.duration.as_deref().unwrap_or("-"),
            format_count_or(track.plays, "-"),
        );
    }

    eprintln!("\n{}", "─".repeat(70));
    eprintln!("{}", autoeq::render::tracks::range_label(&table));

    let pagination = table.pagination();
    let pages: Vec<String> = pagination
        .page_numbers()
        .into_iter()
        .map(|n| if n == table.current_page() { format!("[{}]", n) } else { n.to_string() })
        .collect();
    if !pages.is_empty() {
        eprintln!("Pages: {} of {}", pages.join(" "), table.total_pages());
    }
}

/// `#rrggbb` → 24-bit ANSI foreground
fn ansi_color(hex: &str) -> String {
    let hex = hex.trim_start_matches('#');
    let channel = |i: usize| hex.get(i..i + 2).and_then(|c| u8::from_str_radix(c, 16).ok()).unwrap_or(160);
    format!("\x1b[38;2;{};{};{}m", channel(0), channel(2), channel(4))
}
