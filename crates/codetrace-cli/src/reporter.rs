//! A `Reporter` that renders to the terminal: a redrawing `indicatif`
//! spinner/bar normally, or plain `{done}/{total}` lines when
//! `GITHUB_ACTIONS=true`, since CI log viewers don't redraw in place (§6).

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

use codetrace_indexer::Reporter;

enum Mode {
    Terminal(ProgressBar),
    Plain,
}

pub struct CliReporter {
    mode: Mutex<Mode>,
}

impl CliReporter {
    pub fn new(total_hint: &str) -> Self {
        let mode = if std::env::var("GITHUB_ACTIONS").as_deref() == Ok("true") {
            Mode::Plain
        } else {
            let bar = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
                bar.set_style(style);
            }
            bar.enable_steady_tick(std::time::Duration::from_millis(80));
            bar.set_message(total_hint.to_string());
            Mode::Terminal(bar)
        };
        Self {
            mode: Mutex::new(mode),
        }
    }

    pub fn finish(&self) {
        if let Mode::Terminal(bar) = &*self.mode.lock().unwrap() {
            bar.finish_and_clear();
        }
    }
}

impl Reporter for CliReporter {
    fn status(&self, worker_id: usize, msg: &str) {
        match &*self.mode.lock().unwrap() {
            Mode::Terminal(bar) => bar.set_message(format!("worker {worker_id}: {msg}")),
            Mode::Plain => println!("worker {worker_id}: {msg}"),
        }
    }

    fn progress(&self, done: usize, total: usize) {
        match &*self.mode.lock().unwrap() {
            Mode::Terminal(bar) => bar.set_message(format!("{} {}/{}", "indexed".dimmed(), done, total)),
            Mode::Plain => println!("indexed {done}/{total}"),
        }
    }
}
