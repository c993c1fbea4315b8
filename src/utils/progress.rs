use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub struct ProgressReporter {
    progress_bar: Option<ProgressBar>,
    silent: bool,
}

impl ProgressReporter {
    /// Bar over a known number of archives
    pub fn new(total: u64, message: &str, silent: bool) -> Self {
        if silent {
            return Self::silent();
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} archives")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self {
            progress_bar: Some(pb),
            silent: false,
        }
    }

    pub fn new_spinner(message: &str, silent: bool) -> Self {
        if silent {
            return Self::silent();
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self {
            progress_bar: Some(pb),
            silent: false,
        }
    }

    fn silent() -> Self {
        Self {
            progress_bar: None,
            silent: true,
        }
    }

    pub fn increment(&self, delta: u64) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(delta);
        }
    }

    pub fn set_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_message(message.to_string());
        }
    }

    pub fn finish_with_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_with_message(message.to_string());
        }
    }

    pub fn println(&self, message: &str) {
        if self.silent {
            return;
        }
        match self.progress_bar {
            Some(ref pb) => pb.println(message),
            None => println!("{}", message),
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(ref pb) = self.progress_bar {
            if !pb.is_finished() {
                pb.finish_and_clear();
            }
        }
    }
}
