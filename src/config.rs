//! Saved default flags.
//!
//! A config file is just command-line flags, one or more per line; `#` starts
//! a comment line. The global file lives in the platform config directory and
//! a `.draftpadrc` in the working directory overrides it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::post::PostStatus;

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Auto,
    Light,
    Dark,
}

impl ThemeMode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub watch: bool,
    pub escape_html: bool,
    pub standalone: bool,
    pub perf: bool,
    pub theme: Option<ThemeMode>,
    pub status: Option<PostStatus>,
    pub max_tokens: Option<usize>,
    pub render_debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge `other` over `self`: switches are OR-ed, values from `other` win.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            watch: self.watch || other.watch,
            escape_html: self.escape_html || other.escape_html,
            standalone: self.standalone || other.standalone,
            perf: self.perf || other.perf,
            theme: other.theme.or(self.theme),
            status: other.status.or(self.status),
            max_tokens: other.max_tokens.or(self.max_tokens),
            render_debug_log: other
                .render_debug_log
                .clone()
                .or_else(|| self.render_debug_log.clone()),
        }
    }

    fn to_lines(&self) -> Vec<String> {
        let mut lines = vec!["# draftpad defaults (saved with --save)".to_string()];
        for (on, flag) in [
            (self.watch, "--watch"),
            (self.escape_html, "--escape-html"),
            (self.standalone, "--standalone"),
            (self.perf, "--perf"),
        ] {
            if on {
                lines.push(flag.to_string());
            }
        }
        if let Some(theme) = self.theme {
            lines.push(format!("--theme {}", theme.as_str()));
        }
        if let Some(status) = self.status {
            lines.push(format!("--status {status}"));
        }
        if let Some(max) = self.max_tokens {
            lines.push(format!("--max-tokens {max}"));
        }
        if let Some(path) = &self.render_debug_log {
            lines.push(format!("--render-debug-log {}", path.display()));
        }
        lines
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("draftpad").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("draftpad")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("draftpad").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("draftpad")
                .join("config");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".draftpadrc")
}

/// Read flags from a config file; a missing file yields no flags.
///
/// # Errors
/// Returns an error if the file exists but cannot be read.
pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

/// # Errors
/// Returns an error if the config directory or file cannot be written.
pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", flags.to_lines().join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))?;
    tracing::info!(path = %path.display(), "saved default flags");
    Ok(())
}

/// # Errors
/// Returns an error if the file exists but cannot be removed.
pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick the flags draftpad knows out of a token list; everything else
/// (subcommands, file names, unknown flags) is ignored.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline_value) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value)),
            _ => (token, None),
        };
        let mut value = || {
            inline_value.map(ToOwned::to_owned).or_else(|| {
                let next = tokens.get(i + 1).cloned();
                if next.is_some() {
                    i += 1;
                }
                next
            })
        };

        match name {
            "--watch" => flags.watch = true,
            "--escape-html" => flags.escape_html = true,
            "--standalone" => flags.standalone = true,
            "--perf" => flags.perf = true,
            "--theme" => flags.theme = value().as_deref().and_then(parse_theme),
            "--status" => flags.status = value().and_then(|v| parse_status(&v)),
            "--max-tokens" => flags.max_tokens = value().and_then(|v| v.parse().ok()),
            "--render-debug-log" => flags.render_debug_log = value().map(PathBuf::from),
            _ => {}
        }
        i += 1;
    }
    flags
}

fn parse_status(s: &str) -> Option<PostStatus> {
    s.parse()
        .inspect_err(|err| tracing::warn!(%err, "ignoring --status"))
        .ok()
}

fn parse_theme(s: &str) -> Option<ThemeMode> {
    match s {
        "auto" => Some(ThemeMode::Auto),
        "light" => Some(ThemeMode::Light),
        "dark" => Some(ThemeMode::Dark),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let flags = parse_flag_tokens(&tokens(&[
            "draftpad",
            "edit",
            "--watch",
            "--escape-html",
            "--theme",
            "dark",
            "--status=draft",
            "--max-tokens",
            "256",
            "post.md",
        ]));
        assert!(flags.watch);
        assert!(flags.escape_html);
        assert!(!flags.standalone);
        assert_eq!(flags.theme, Some(ThemeMode::Dark));
        assert_eq!(flags.status, Some(PostStatus::Draft));
        assert_eq!(flags.max_tokens, Some(256));
    }

    #[test]
    fn test_invalid_values_are_dropped() {
        let flags = parse_flag_tokens(&tokens(&[
            "--theme=neon",
            "--status=archived",
            "--max-tokens",
            "lots",
        ]));
        assert_eq!(flags.theme, None);
        assert_eq!(flags.status, None);
        assert_eq!(flags.max_tokens, None);
    }

    #[test]
    fn test_value_flag_at_end_has_no_value() {
        let flags = parse_flag_tokens(&tokens(&["--render-debug-log"]));
        assert_eq!(flags.render_debug_log, None);
    }

    #[test]
    fn test_union_prefers_later_values() {
        let file = ConfigFlags {
            watch: true,
            theme: Some(ThemeMode::Light),
            max_tokens: Some(100),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            perf: true,
            theme: Some(ThemeMode::Dark),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.watch);
        assert!(merged.perf);
        assert_eq!(merged.theme, Some(ThemeMode::Dark));
        assert_eq!(merged.max_tokens, Some(100));
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config");
        let flags = ConfigFlags {
            watch: true,
            escape_html: true,
            standalone: true,
            perf: true,
            theme: Some(ThemeMode::Light),
            status: Some(PostStatus::Draft),
            max_tokens: Some(64),
            render_debug_log: Some(PathBuf::from("debug.log")),
        };

        save_config_flags(&path, &flags).unwrap();
        assert_eq!(load_config_flags(&path).unwrap(), flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(load_config_flags(&path).unwrap(), ConfigFlags::default());
    }
}
