use anyhow::Result;
use clap::Parser;
use panelog_framework::{DEFAULT_CAPACITY, DEFAULT_PANEL_NAME, LayoutConfig, ViewerDesc};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

const LAYOUT_FILE_NAME: &str = "layout.json";

/// CLI arguments for panelog
#[derive(Parser, Debug)]
#[command(name = "panelog")]
#[command(author, version, about = "Tail log files into live terminal panels")]
#[command(long_about = r#"
panelog tails one or more log files and sorts every line into a panel by its
inline tag:

  [#process]compiling module 3      -> line in panel "process"
  [@current_progress]sync (3/10)    -> progress bar of panel "current_progress"
  anything else                     -> line in the default panel

A log file that disappears for good, or keeps failing to read, is flagged as
unavailable on the default panel.

The layout is loaded from (in priority order):
1. --config <path>                     Explicit layout file
2. ~/.config/panelog/layout.json       User layout
3. the built-in layout

Example:
  panelog --log-file build.log
  panelog --log-file a.log --log-file b.log --config layout.json --tail-only
"#)]
pub struct Cli {
    /// Log file to tail (can be specified multiple times); a lost file is
    /// flagged on the default panel
    #[arg(short = 'f', long = "log-file", value_name = "PATH", required = true)]
    pub log_files: Vec<PathBuf>,

    /// Path to the layout file (JSON)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Lines kept per panel
    #[arg(long, value_name = "N", default_value_t = DEFAULT_CAPACITY)]
    pub capacity: usize,

    /// Redraw interval in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 100)]
    pub tick_ms: u64,

    /// File poll interval in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 50)]
    pub poll_ms: u64,

    /// Only show lines written after startup
    #[arg(long)]
    pub tail_only: bool,

    /// Panel receiving untagged lines
    #[arg(long, value_name = "NAME", default_value = DEFAULT_PANEL_NAME)]
    pub default_panel: String,

    /// Show the debug log block at startup
    #[arg(long)]
    pub debug: bool,

    /// Also write the debug log to this file
    #[arg(long, value_name = "PATH")]
    pub debug_log: Option<PathBuf>,
}

impl Cli {
    pub fn viewer_desc(&self) -> ViewerDesc {
        ViewerDesc {
            tick_interval: Duration::from_millis(self.tick_ms.max(1)),
            poll_interval: Duration::from_millis(self.poll_ms.max(1)),
            capacity: self.capacity,
            default_panel: self.default_panel.clone(),
            show_debug_logs: self.debug,
            debug_log_file: self.debug_log.clone(),
            ..ViewerDesc::default()
        }
    }
}

/// user-level layout file, if the platform has a config directory
pub fn user_layout_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("panelog").join(LAYOUT_FILE_NAME))
}

/// explicit file, else the user file when present, else the built-in layout
pub fn resolve_layout(explicit: Option<&Path>, user_file: Option<&Path>) -> Result<LayoutConfig> {
    if let Some(path) = explicit {
        return LayoutConfig::from_file(path);
    }

    if let Some(path) = user_file.filter(|path| path.is_file()) {
        return LayoutConfig::from_file(path);
    }

    Ok(LayoutConfig::default_layout())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::fs;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["panelog", "--log-file", "app.log"]).unwrap();
        assert_eq!(cli.log_files, vec![PathBuf::from("app.log")]);
        assert_eq!(cli.capacity, 500);
        assert_eq!(cli.default_panel, "default");
        assert!(!cli.tail_only);

        let desc = cli.viewer_desc();
        assert_eq!(desc.tick_interval, Duration::from_millis(100));
        assert_eq!(desc.poll_interval, Duration::from_millis(50));
        assert_eq!(desc.capacity, 500);
    }

    #[test]
    fn test_repeated_log_files_and_options() {
        let cli = Cli::try_parse_from([
            "panelog",
            "-f",
            "a.log",
            "--log-file",
            "b.log",
            "--capacity",
            "20",
            "--default-panel",
            "misc",
            "--tail-only",
            "--debug",
        ])
        .unwrap();
        assert_eq!(cli.log_files.len(), 2);
        assert!(cli.tail_only);

        let desc = cli.viewer_desc();
        assert_eq!(desc.capacity, 20);
        assert_eq!(desc.default_panel, "misc");
        assert!(desc.show_debug_logs);
    }

    #[test]
    fn test_help_explains_where_lost_files_are_flagged() {
        let help = Cli::command().render_long_help().to_string();
        assert!(help.contains("unavailable on the default panel"));
    }

    #[test]
    fn test_log_file_is_required() {
        assert!(Cli::try_parse_from(["panelog"]).is_err());
    }

    #[test]
    fn test_explicit_layout_wins() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("mine.json");
        let user = dir.path().join("layout.json");
        fs::write(&explicit, r#"{"only": {"ratio": 1}}"#).unwrap();
        fs::write(&user, r#"{"user": {"ratio": 1}}"#).unwrap();

        let layout = resolve_layout(Some(&explicit), Some(&user)).unwrap();
        assert_eq!(layout.panels()[0].name, "only");

        let layout = resolve_layout(None, Some(&user)).unwrap();
        assert_eq!(layout.panels()[0].name, "user");
    }

    #[test]
    fn test_missing_user_layout_uses_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let layout = resolve_layout(None, Some(&dir.path().join("absent.json"))).unwrap();
        assert_eq!(layout, LayoutConfig::default_layout());
    }

    #[test]
    fn test_broken_explicit_layout_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("broken.json");
        fs::write(&explicit, "{ not json").unwrap();
        assert!(resolve_layout(Some(&explicit), None).is_err());
        assert!(resolve_layout(Some(&dir.path().join("absent.json")), None).is_err());
    }
}
