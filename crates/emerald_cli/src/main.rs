use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser};
use emerald_core::core_api::Engine;
use emerald_render::{
    JsonStyle, TextRenderOptions, render_json, render_layout_json, render_layout_text,
    render_text_with_options,
};
use log::LevelFilter;
use serde_json::Value as JsonValue;

const ANOMALIES_EXIT_CODE: i32 = 3;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(value_name = "SAVE.SAV")]
    path: PathBuf,
    /// Emit the report as JSON.
    #[arg(long)]
    json: bool,
    /// Print the fixed region layout instead of auditing.
    #[arg(long)]
    layout: bool,
    /// List every section of each block, not only anomalies.
    #[arg(long)]
    sections: bool,
    /// Exit with status 3 when any anomaly is found.
    #[arg(long = "fail-on-anomalies")]
    fail_on_anomalies: bool,
    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let bytes = fs::read(&cli.path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", cli.path.display());
        process::exit(1);
    });
    log::info!("read {} bytes from {}", bytes.len(), cli.path.display());

    let session = Engine::new().open_bytes(bytes).unwrap_or_else(|e| {
        eprintln!("Error parsing save file: {}", cli.path.display());
        eprintln!("  {e}");
        process::exit(1);
    });

    if cli.layout {
        if cli.json {
            print_json(&render_layout_json(session.layout()));
        } else {
            print!("{}", render_layout_text(session.layout()));
        }
        return;
    }

    let report = session.analyze().unwrap_or_else(|e| {
        eprintln!("Error analyzing save file: {}", cli.path.display());
        eprintln!("  {e}");
        process::exit(1);
    });

    if cli.json {
        print_json(&render_json(&report, JsonStyle::CanonicalV1));
    } else {
        let options = TextRenderOptions {
            sections: cli.sections,
        };
        print!("{}", render_text_with_options(&report, options));
    }

    if cli.fail_on_anomalies && report.has_anomalies() {
        process::exit(ANOMALIES_EXIT_CODE);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn print_json(value: &JsonValue) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error rendering JSON output: {e}");
        process::exit(1);
    });
    println!("{rendered}");
}
