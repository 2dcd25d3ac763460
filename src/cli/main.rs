use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};

use exif_edit::config::{self, EditorMode};
use exif_edit::editor::Edits;
use exif_edit::exif::{id_of, name_of, TagId};
use exif_edit::images;
use exif_edit::session::{EntryView, MetadataSession};

#[derive(Parser, Debug)]
#[command(
    name = "exif-edit",
    version,
    about = "View and edit the text entries of EXIF metadata in JPEG, PNG, WebP and TIFF images"
)]
struct Cli {
    /// Image files or directories to process
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Set an entry, e.g. `--set Artist="Jane Doe"` or `--set 0x010e=Harbour`.
    /// Repeat to edit several entries in one write.
    #[arg(long = "set", value_name = "TAG=TEXT", value_parser = parse_assignment)]
    set: Vec<(TagId, String)>,

    /// Only list the entries the editor can change
    #[arg(long)]
    editable: bool,

    /// Use the fixed-field editor regardless of the config
    #[arg(long)]
    fixed: bool,

    /// Path to config file (default: exif-edit.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default exif-edit.json and exit
    #[arg(long)]
    init: bool,

    /// Preview changes without writing to files
    #[arg(long)]
    dry_run: bool,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn parse_assignment(s: &str) -> Result<(TagId, String), String> {
    let (tag, text) = s
        .split_once('=')
        .ok_or_else(|| format!("expected TAG=TEXT, got `{s}`"))?;
    let id = id_of(tag.trim()).ok_or_else(|| format!("unknown tag `{}`", tag.trim()))?;
    Ok((id, text.to_string()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = config::Config::default();
        let path = config.save(cli.config.as_deref())?;
        let fields: Vec<_> = config.editor.fixed_tags.iter().map(|&t| name_of(TagId(t))).collect();
        println!("Wrote {}", path.display());
        println!("  editor: {:?} (every text entry); --fixed limits it to {}", config.editor.mode, fields.join(", "));
        println!("  backups: {}", if config.output.backup_originals { "<name>.<ext>.bak before the first rewrite" } else { "off" });
        return Ok(());
    }

    if cli.paths.is_empty() {
        anyhow::bail!("No input files or directories specified. Use --help for usage.");
    }

    let mut config = config::Config::load(cli.config.as_deref())?;
    if cli.dry_run {
        config.output.dry_run = true;
    }
    if cli.fixed {
        config.editor.mode = EditorMode::Fixed;
    }

    let images = images::collect_images(&cli.paths);
    if images.is_empty() {
        anyhow::bail!("No supported image files found in the specified paths.");
    }

    let edits: Edits = cli.set.iter().cloned().collect();
    if !edits.is_empty() {
        log::info!("Applying {} edit(s) to {} image(s)", edits.len(), images.len());
        if config.output.dry_run {
            log::info!("Dry run: entries are shown as they would be written, files stay untouched");
        }
    }

    let mut session = MetadataSession::from_config(&config);
    let mut results = Vec::new();
    let total = images.len();

    for (i, image_path) in images.iter().enumerate() {
        log::debug!("[{}/{}] {}", i + 1, total, image_path.display());
        let outcome = process(&mut session, image_path, &edits, &config, &cli);
        if let Err(ref e) = outcome {
            log::error!("{}: {e}", image_path.display());
        }
        results.push((image_path, outcome));
        session.clear();
    }

    // JSON output
    if cli.json {
        let json_results: Vec<serde_json::Value> = results
            .iter()
            .map(|(path, outcome)| match outcome {
                Ok(entries) => serde_json::json!({
                    "path": path.display().to_string(),
                    "entries": entries.iter().map(entry_json).collect::<Vec<_>>(),
                    "error": null,
                }),
                Err(e) => serde_json::json!({
                    "path": path.display().to_string(),
                    "entries": [],
                    "error": e.to_string(),
                }),
            })
            .collect();

        println!("{}", serde_json::to_string_pretty(&json_results)?);
    }

    let failed = results.iter().filter(|(_, r)| r.is_err()).count();
    if !edits.is_empty() {
        log::info!(
            "Done: {} succeeded, {failed} failed out of {total} images",
            total - failed
        );
    }
    if failed > 0 {
        anyhow::bail!("{failed} of {total} image(s) failed");
    }
    Ok(())
}

/// One image: load, then list or edit. Returns the entries as they stand
/// afterwards (or as they would stand, for a dry run).
fn process(
    session: &mut MetadataSession,
    path: &Path,
    edits: &Edits,
    config: &config::Config,
    cli: &Cli,
) -> Result<Vec<EntryView>> {
    session.load(path)?;

    if edits.is_empty() {
        let entries = listing(session, cli.editable);
        if !cli.json {
            print_entries(path, &entries, None);
        }
        return Ok(entries);
    }

    if config.output.dry_run {
        let before = session.directory().cloned().unwrap_or_default();
        let after = session.editor().apply_bulk_edit(&before, edits)?;
        let order = after.byte_order();
        let entries: Vec<EntryView> = after
            .iter()
            .map(|(tag, value)| EntryView { tag, name: name_of(tag), text: value.display(order) })
            .collect();
        if !cli.json {
            print_entries(path, &entries, Some(edits));
        }
        return Ok(entries);
    }

    session.commit(edits)?;
    log::info!("Updated {}", path.display());
    Ok(listing(session, cli.editable))
}

fn listing(session: &MetadataSession, editable_only: bool) -> Vec<EntryView> {
    if editable_only {
        session
            .editable_entries()
            .into_iter()
            .map(|e| EntryView { tag: e.tag, name: name_of(e.tag), text: e.text })
            .collect()
    } else {
        session.current_entries().collect()
    }
}

fn entry_json(entry: &EntryView) -> serde_json::Value {
    serde_json::json!({
        "tag": entry.tag.0,
        "name": entry.name,
        "value": entry.text,
    })
}

// ANSI color codes
const GREEN: &str = "\x1b[32m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// Max width for the value column before wrapping.
const VAL_WIDTH: usize = 46;
/// Indent for continuation lines (tag column width + " : " = 25 chars + 2 leading spaces).
const INDENT: &str = "                           ";

/// Print the entries of one file. With `changed`, edited rows are marked.
fn print_entries(path: &Path, entries: &[EntryView], changed: Option<&Edits>) {
    println!();
    println!("{BOLD}File:{RESET} {}", path.display());
    println!("{DIM}{}{RESET}", "═".repeat(72));

    if entries.is_empty() {
        println!("  {DIM}(no EXIF metadata found){RESET}");
        println!();
        return;
    }

    for entry in entries {
        let is_new = changed.is_some_and(|c| c.contains_key(&entry.tag));
        print_row(&entry.name, &entry.text, is_new);
    }

    if changed.is_some() {
        println!("  {DIM}{}{RESET}", "─".repeat(70));
        println!("  {GREEN}*{RESET} = new value to be written");
    }
    println!();
}

/// Print a single row in the EXIF display table (green with * when new).
fn print_row(tag: &str, val: &str, is_new: bool) {
    let tag_col = format!("{:<22}", tag);
    let lines = wrap_text(val, VAL_WIDTH);
    let last = lines.len() - 1;
    for (i, line) in lines.iter().enumerate() {
        let mark = if is_new && i == last { " *" } else { "" };
        let (open, close) = if is_new { (GREEN, RESET) } else { ("", "") };
        if i == 0 {
            println!("  {open}{tag_col} : {line}{mark}{close}");
        } else {
            println!("  {open}{INDENT}{line}{mark}{close}");
        }
    }
}

/// Split an entry's text into lines of at most `width` characters.
///
/// Breaks at whitespace; a word longer than a line (a serial number, a
/// hash) is cut. Line breaks inside the text are kept.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        let mut len = 0;
        for word in paragraph.split_whitespace() {
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(width) {
                if len > 0 && len + 1 + piece.len() > width {
                    lines.push(std::mem::take(&mut line));
                    len = 0;
                }
                if len > 0 {
                    line.push(' ');
                    len += 1;
                }
                line.extend(piece);
                len += piece.len();
            }
        }
        lines.push(line);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_by_name_hex_and_decimal() {
        assert_eq!(parse_assignment("Artist=Jane Doe").unwrap(), (TagId(315), "Jane Doe".into()));
        assert_eq!(parse_assignment("0x010e=a=b").unwrap(), (TagId(270), "a=b".into()));
        assert_eq!(parse_assignment("33432=").unwrap(), (TagId(33432), String::new()));
    }

    #[test]
    fn assignment_errors() {
        assert!(parse_assignment("Artist").is_err());
        assert!(parse_assignment("NoSuchTag=x").is_err());
    }

    #[test]
    fn wrap_text_breaks_on_words() {
        assert_eq!(wrap_text("one two three", 7), ["one two", "three"]);
        assert_eq!(wrap_text("", 10), [""]);
    }

    #[test]
    fn wrap_text_counts_characters_and_cuts_long_words() {
        assert_eq!(wrap_text("d\u{e9}j\u{e0} vu", 4), ["d\u{e9}j\u{e0}", "vu"]);
        assert_eq!(wrap_text("0123456789", 4), ["0123", "4567", "89"]);
        assert_eq!(wrap_text("line one\nline two", 20), ["line one", "line two"]);
    }

    #[test]
    fn cli_parses_repeated_set() {
        let cli = Cli::try_parse_from(["exif-edit", "--set", "Artist=A", "--set", "270=B", "x.jpg"])
            .unwrap();
        assert_eq!(cli.set, [(TagId(315), "A".to_string()), (TagId(270), "B".to_string())]);
        assert_eq!(cli.paths, [PathBuf::from("x.jpg")]);
    }
}
