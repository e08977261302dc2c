//! Check the bot's content files before deploying them.
//!
//! Usage: cargo run --bin validate_content [content_dir]
//!
//! Reads every joke file under `chistes/`, plus `trivia.json` and
//! `mensajes.json`, with the same rules the bot uses. Exits with status 1
//! when anything would be skipped at runtime.

use std::path::{Path, PathBuf};

use chumelito::bot::Action;
use chumelito::bot::catalog::{fits_button, read_daily_messages, read_items, read_trivia};
use chumelito::config::ContentPaths;

#[derive(Default)]
struct Report {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl Report {
    fn error(&mut self, msg: String) {
        self.errors.push(format!("❌ {msg}"));
    }

    fn warning(&mut self, msg: String) {
        self.warnings.push(format!("⚠️ {msg}"));
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn check_jokes(paths: &ContentPaths, report: &mut Report) {
    let entries = match std::fs::read_dir(&paths.jokes_dir) {
        Ok(entries) => entries,
        Err(e) => {
            report.error(format!("cannot read {}: {e}", paths.jokes_dir.display()));
            return;
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();

    let mut total = 0;
    for path in &files {
        let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
        if !fits_button(&Action::JokeCategory(stem)) {
            report.error(format!("{}: category name too long for a button", file_name(path)));
        }
        match read_items(path) {
            Ok(items) => {
                if items.non_text > 0 {
                    report.warning(format!("{} has {} entries that are not text", file_name(path), items.non_text));
                }
                if items.items.is_empty() {
                    report.warning(format!("{} has no jokes", file_name(path)));
                }
                total += items.items.len();
            }
            Err(e) => report.error(e.to_string()),
        }
    }
    println!("chistes: {} file(s), {} joke(s)", files.len(), total);
}

fn check_trivia(paths: &ContentPaths, report: &mut Report) {
    let load = match read_trivia(&paths.trivia_file) {
        Ok(load) => load,
        Err(e) => {
            report.error(e.to_string());
            return;
        }
    };
    for reason in &load.rejected {
        report.error(format!("{}: {reason}", file_name(&paths.trivia_file)));
    }

    let mut total = 0;
    for (category, questions) in &load.by_category {
        if questions.is_empty() {
            report.warning(format!("trivia category '{category}' has no usable questions"));
        }
        for question in questions {
            if question.options.len() < 2 {
                report.error(format!(
                    "{category}: '{}' needs at least two options",
                    question.prompt
                ));
            }
        }
        total += questions.len();
    }
    println!("trivia: {} categor(ies), {} question(s)", load.by_category.len(), total);
}

fn check_daily_messages(paths: &ContentPaths, report: &mut Report) {
    match read_daily_messages(&paths.daily_messages_file) {
        Ok(messages) => {
            for (category, items) in &messages {
                if items.is_empty() {
                    report.warning(format!("daily message category '{category}' is empty"));
                }
            }
            let total: usize = messages.values().map(Vec::len).sum();
            println!("mensajes: {} categor(ies), {} message(s)", messages.len(), total);
        }
        Err(e) => report.error(e.to_string()),
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 2 {
        eprintln!("Usage: {} [content_dir]", args[0]);
        eprintln!();
        eprintln!("content_dir defaults to the current directory and should contain");
        eprintln!("chistes/*.json, trivia.json and mensajes.json.");
        std::process::exit(2);
    }

    let root = args.get(1).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    let paths = ContentPaths::under(&root);
    println!("Validating content in {}...", root.display());

    let mut report = Report::default();
    check_jokes(&paths, &mut report);
    check_trivia(&paths, &mut report);
    check_daily_messages(&paths, &mut report);

    for line in report.warnings.iter().chain(&report.errors) {
        println!("{line}");
    }

    if !report.errors.is_empty() {
        eprintln!("{} error(s), {} warning(s)", report.errors.len(), report.warnings.len());
        std::process::exit(1);
    }
    println!("✅ All content is valid ({} warning(s)).", report.warnings.len());
}
