//! draftpad - draft blog posts in the terminal with a live HTML preview.
//!
//! # Usage
//!
//! ```bash
//! draftpad edit post.md
//! draftpad render --standalone post.md -o post.html
//! draftpad split --max-tokens 256 post.md
//! draftpad export --status draft post.md
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use draftpad::app::{App, default_title};
use draftpad::config::{
    ConfigFlags, ThemeMode, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, parse_flag_tokens, save_config_flags,
};
use draftpad::highlight::{HighlightBackground, set_background_mode};
use draftpad::perf;
use draftpad::post::{PostDraft, PostStatus};
use draftpad::preview::{self, PreviewOptions};
use draftpad::splitter;
use draftpad::watcher::{DraftWatcher, WatchStatus};

/// Draft blog posts with a live HTML preview
#[derive(Parser, Debug)]
#[command(name = "draftpad", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log timing scopes through tracing
    #[arg(long, global = true)]
    perf: bool,

    /// Write detailed render/watch debug events to a file
    #[arg(long, global = true, value_name = "PATH")]
    render_debug_log: Option<PathBuf>,

    /// Save current command-line flags as defaults in the global config
    #[arg(long, global = true)]
    save: bool,

    /// Clear saved defaults in the global config
    #[arg(long, global = true)]
    clear: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the preview HTML for a markdown file
    Render {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Wrap the fragment in a complete HTML document
        #[arg(long)]
        standalone: bool,

        /// Page title for --standalone (defaults to the file stem)
        #[arg(long)]
        title: Option<String>,

        /// Escape HTML in the source before rendering
        #[arg(long)]
        escape_html: bool,

        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,

        /// Re-render whenever the file changes
        #[arg(long)]
        watch: bool,
    },

    /// Print the chunk list for a markdown file as JSON
    Split {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Title prefixed to every chunk (defaults to the file stem)
        #[arg(long)]
        title: Option<String>,

        /// Chunk budget in estimated tokens
        #[arg(long, value_name = "N")]
        max_tokens: Option<usize>,
    },

    /// Validate a draft and print the post payload as JSON
    Export {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Post title (defaults to the file stem)
        #[arg(long)]
        title: Option<String>,

        #[arg(long, value_enum)]
        status: Option<PostStatus>,

        /// Server id of an existing post
        #[arg(long)]
        id: Option<u64>,
    },

    /// Edit a draft with a live preview pane
    Edit {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Post title (defaults to the file stem)
        #[arg(long)]
        title: Option<String>,

        #[arg(long, value_enum)]
        status: Option<PostStatus>,

        /// Server id of an existing post
        #[arg(long)]
        id: Option<u64>,

        /// Reload when the file changes on disk
        #[arg(long)]
        watch: bool,

        /// Escape HTML in the source before rendering
        #[arg(long)]
        escape_html: bool,

        /// Chunk budget for the chunk view
        #[arg(long, value_name = "N")]
        max_tokens: Option<usize>,

        /// Force syntax highlight theme background
        #[arg(long, value_enum)]
        theme: Option<ThemeMode>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    perf::set_enabled(effective.perf || cli.perf);
    let render_debug_log_path = effective
        .render_debug_log
        .clone()
        .or_else(|| cli.render_debug_log.clone())
        .or_else(|| std::env::var_os("DRAFTPAD_RENDER_DEBUG_LOG").map(PathBuf::from));
    if let Err(err) = perf::set_debug_log_path(render_debug_log_path.as_deref()) {
        tracing::warn!(
            path = %render_debug_log_path
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            %err,
            "failed to initialize render debug log"
        );
    }

    match cli.command {
        Command::Render {
            file,
            standalone,
            title,
            escape_html,
            output,
            watch,
        } => {
            let job = RenderJob {
                title: title.unwrap_or_else(|| default_title(&file)),
                options: PreviewOptions {
                    escape_html: escape_html || effective.escape_html,
                },
                standalone: standalone || effective.standalone,
                output,
            };
            // Only an explicit --watch loops here; saved defaults apply to edit.
            if watch {
                run_render_watch(&file, &job)
            } else {
                job.run(&file)
            }
        }
        Command::Split {
            file,
            title,
            max_tokens,
        } => {
            let content = read_draft(&file)?;
            let title = title.unwrap_or_else(|| default_title(&file));
            let max_tokens = max_tokens
                .or(effective.max_tokens)
                .unwrap_or(splitter::DEFAULT_MAX_TOKENS);
            let chunks = splitter::split_markdown(&content, &title, max_tokens);
            println!("{}", serde_json::to_string_pretty(&chunks)?);
            Ok(())
        }
        Command::Export {
            file,
            title,
            status,
            id,
        } => {
            let content = read_draft(&file)?;
            let draft = PostDraft::new(title.unwrap_or_else(|| default_title(&file)), content)
                .with_id(id)
                .with_status(status.or(effective.status).unwrap_or_default());
            let payload = draft
                .validate()
                .with_context(|| format!("{} is not ready to export", file.display()))?;
            println!("{}", payload.to_json_pretty()?);
            Ok(())
        }
        Command::Edit {
            file,
            title,
            status,
            id,
            watch,
            escape_html,
            max_tokens,
            theme,
        } => {
            apply_theme(theme.or(effective.theme).unwrap_or(ThemeMode::Auto));
            let mut app = App::new(file)
                .with_title(title)
                .with_status(status.or(effective.status).unwrap_or_default())
                .with_post_id(id)
                .with_preview_options(PreviewOptions {
                    escape_html: escape_html || effective.escape_html,
                })
                .with_max_tokens(
                    max_tokens
                        .or(effective.max_tokens)
                        .unwrap_or(splitter::DEFAULT_MAX_TOKENS),
                )
                .with_watch(watch || effective.watch)
                .with_config_paths(
                    Some(global_path.clone()),
                    if local_path.exists() {
                        Some(local_path.clone())
                    } else {
                        None
                    },
                );
            app.run().context("Application error")
        }
    }
}

struct RenderJob {
    title: String,
    options: PreviewOptions,
    standalone: bool,
    output: Option<PathBuf>,
}

impl RenderJob {
    fn run(&self, file: &Path) -> Result<()> {
        let _scope = perf::scope("cli.render");
        let content = read_draft(file)?;
        let body = preview::render_preview_with(&content, &self.options);
        let html = if self.standalone {
            preview::render_page(&self.title, &body)
        } else {
            format!("{body}\n")
        };
        match &self.output {
            Some(out) => {
                std::fs::write(out, html)
                    .with_context(|| format!("Failed to write {}", out.display()))?;
                tracing::info!(path = %out.display(), "wrote preview");
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(html.as_bytes())?;
                stdout.flush()?;
            }
        }
        Ok(())
    }
}

fn run_render_watch(file: &Path, job: &RenderJob) -> Result<()> {
    let mut watcher = DraftWatcher::new(file, Duration::from_millis(200))
        .with_context(|| format!("Failed to watch {}", file.display()))?;
    job.run(file)?;
    loop {
        if watcher.poll() == WatchStatus::Changed {
            if let Err(err) = job.run(file) {
                tracing::warn!(%err, "re-render failed");
            }
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}

fn read_draft(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn apply_theme(theme: ThemeMode) {
    match theme {
        ThemeMode::Auto => set_background_mode(detect_theme()),
        ThemeMode::Light => set_background_mode(Some(HighlightBackground::Light)),
        ThemeMode::Dark => set_background_mode(Some(HighlightBackground::Dark)),
    }
}

// Query the terminal background using OSC 11.
// We talk to /dev/tty so the terminal responds even when stdout is piped.
// On non-Unix platforms the query is skipped and COLORFGBG decides.
#[cfg(not(unix))]
fn query_terminal_background() -> std::io::Result<Option<(u8, u8, u8)>> {
    Ok(None)
}

#[cfg(unix)]
fn query_terminal_background() -> std::io::Result<Option<(u8, u8, u8)>> {
    use std::io::Read;
    use std::sync::mpsc;

    let (tx, rx) = mpsc::channel();

    let mut io = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open("/dev/tty")?;
    let reader = io.try_clone()?;

    // OSC 11 query: ESC ] 11 ; ? BEL
    io.write_all(b"\x1b]11;?\x07")?;
    io.flush()?;

    std::thread::spawn(move || {
        let mut reader = reader;
        let mut buf = [0u8; 256];
        let mut collected: Vec<u8> = Vec::new();
        loop {
            match reader.read(&mut buf) {
                Ok(0) => continue,
                Ok(n) => {
                    collected.extend_from_slice(&buf[..n]);
                    if collected.contains(&b'\x07') || collected.windows(2).any(|w| w == b"\x1b\\")
                    {
                        let _ = tx.send(collected);
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    let reply = rx
        .recv_timeout(Duration::from_millis(75))
        .unwrap_or_default();
    Ok(parse_osc11_reply(&String::from_utf8_lossy(&reply)))
}

fn theme_from_rgb(r: u8, g: u8, b: u8) -> HighlightBackground {
    let luma = 0.0722f32.mul_add(
        f32::from(b),
        0.2126f32.mul_add(f32::from(r), 0.7152 * f32::from(g)),
    );
    if luma >= 140.0 {
        HighlightBackground::Light
    } else {
        HighlightBackground::Dark
    }
}

fn detect_theme() -> Option<HighlightBackground> {
    let _raw = enable_raw_mode();
    let result = query_terminal_background();
    let _ = disable_raw_mode();
    result
        .ok()
        .flatten()
        .map(|(r, g, b)| theme_from_rgb(r, g, b))
}

fn parse_osc11_reply(reply: &str) -> Option<(u8, u8, u8)> {
    // Expect: ESC ] 11 ; rgb:RRRR/GGGG/BBBB BEL or ST
    let start = reply.find("rgb:")?;
    let data = &reply[start + 4..];
    let mut parts = data.split(['/', '\x07', '\x1b']);
    let r = parts.next()?;
    let g = parts.next()?;
    let b = parts.next()?;
    Some((
        parse_osc_component(r)?,
        parse_osc_component(g)?,
        parse_osc_component(b)?,
    ))
}

fn parse_osc_component(s: &str) -> Option<u8> {
    let hex = s.trim();
    if hex.len() >= 4 {
        let v = u16::from_str_radix(&hex[..4], 16).ok()?;
        u8::try_from(v >> 8).ok()
    } else if hex.len() == 2 {
        u8::from_str_radix(hex, 16).ok()
    } else {
        None
    }
}
