use anyhow::Result;
use local_keyrecorder::config::{load_config, parse_overrides, CliOverrides};
use local_keyrecorder::inspect::summarize_log;
use local_keyrecorder::{LogStore, RecorderConfig, TagStatus, IDENTIFICATION_TAG};
use std::env;
#[cfg(windows)]
use {
    local_keyrecorder::{CapturePipeline, Console},
    std::rc::Rc,
};

fn main() -> Result<()> {
    let mut args = env::args().skip(1).peekable();
    let command = args.peek().cloned();
    match command.as_deref() {
        None => run_recorder(CliOverrides::default()),
        Some(flag) if flag.starts_with("--") && flag != "--help" => run_recorder(parse_overrides(args)),
        Some("record") => {
            args.next();
            run_recorder(parse_overrides(args))
        }
        Some("inspect") => {
            args.next();
            inspect(parse_overrides(args))
        }
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    println!("local_keyrecorder");
    println!("Usage:");
    println!("  local_keyrecorder [record] [--config PATH] [--log PATH] [--title TEXT] [--w N] [--h N]");
    println!("  local_keyrecorder inspect [--config PATH] [--log PATH]");
}

#[cfg(windows)]
fn run_recorder(overrides: CliOverrides) -> Result<()> {
    use local_keyrecorder::window::TextEntryWindow;

    let config = load_config(&overrides)?;
    let mut window = TextEntryWindow::create(&config)?;
    let pipeline = Rc::new(CapturePipeline::new(prepare_log(&config), Console::stdio()));
    if pipeline.activate(&mut window) {
        println!("Recording started. Click in the text area and type.");
    }
    window.run()
}

#[cfg(not(windows))]
fn run_recorder(overrides: CliOverrides) -> Result<()> {
    load_config(&overrides)?;
    anyhow::bail!("The recorder window is only available on Windows; `inspect` works everywhere.")
}

/// Tags the log before capture starts. Failures are reported and ignored.
#[cfg_attr(not(windows), allow(dead_code))]
fn prepare_log(config: &RecorderConfig) -> LogStore {
    let store = LogStore::new(&config.log_path, IDENTIFICATION_TAG);
    match store.ensure_initialized() {
        Ok(TagStatus::Backfilled) => {
            eprintln!("Identification tag added to {}", store.path().display());
        }
        Ok(_) => {}
        Err(err) => eprintln!("Failed to prepare log file: {err}"),
    }
    store
}

fn inspect(overrides: CliOverrides) -> Result<()> {
    let config = load_config(&overrides)?;
    let summary = summarize_log(&config.log_path, IDENTIFICATION_TAG)?;
    println!("Log: {}", config.log_path.display());
    print!("{summary}");
    Ok(())
}
