use ferry_transfer::ProgressStatus;
use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;

pub trait Tracker {
    type Ctx: Clone;
    fn new(ctx: Self::Ctx) -> Self;
    fn update(&self, progress: &ProgressStatus);
    fn finish(&self, msg: Option<String>);
}

const PB_STYLE: &str = "{spinner:.blue} [{elapsed_precise}] {wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta}) {msg}";

const SPINNER_STYLE: &str = "{spinner:.blue} [{elapsed_precise}] {bytes} ({bytes_per_sec}) {msg}";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const PB_CHARS: &str = "█▓▒░  ";

static PB_TEMPLATE: Lazy<ProgressStyle> = Lazy::new(|| style(PB_STYLE));

static SPINNER_TEMPLATE: Lazy<ProgressStyle> = Lazy::new(|| style(SPINNER_STYLE));

fn style(template: &str) -> ProgressStyle {
    match ProgressStyle::with_template(template) {
        Ok(pb_style) => pb_style.tick_chars(TICK).progress_chars(PB_CHARS),
        Err(_) => ProgressStyle::default_bar(),
    }
}

pub struct ProgressTracker {
    pub pb: ProgressBar,
}

#[derive(Debug, Clone)]
pub struct ProgressTrackerConfig {
    /// Bar length; `None` draws a spinner.
    pub len: Option<u64>,
}

impl ProgressTracker {
    pub fn abandon(&self, msg: &str) { self.pb.abandon_with_message(msg.to_string()); }
}

impl Tracker for ProgressTracker {
    type Ctx = ProgressTrackerConfig;

    fn new(ctx: Self::Ctx) -> Self {
        let pb = if let Some(len) = ctx.len {
            let pb = ProgressBar::new(len);
            pb.set_style(PB_TEMPLATE.clone());
            pb
        } else {
            let pb = ProgressBar::no_length();
            pb.set_style(SPINNER_TEMPLATE.clone());
            pb
        };
        ProgressTracker { pb }
    }

    fn update(&self, progress: &ProgressStatus) { self.pb.set_position(progress.bytes_transferred); }

    fn finish(&self, msg: Option<String>) {
        match msg {
            Some(msg) => self.pb.finish_with_message(msg),
            None => self.pb.finish(),
        }
    }
}
