use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use once_cell::sync::Lazy;

pub trait Tracker {
    type Ctx: Clone;
    fn new(ctx: Self::Ctx) -> Self;
    fn finish(&self, msg: Option<String>);
}

const PB_STYLE: &str = "{spinner:.blue} [{elapsed_precise}] {wide_bar:.cyan/blue} {bytes}/{total_bytes} {msg} ({bytes_per_sec}, {eta})";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const PB_CHARS: &str = "█▓▒░  ";

static PB_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    let pb_style = match ProgressStyle::with_template(PB_STYLE) {
        Ok(pb_style) => pb_style.tick_chars(TICK).progress_chars(PB_CHARS),
        Err(_) => return None,
    };

    Some(pb_style)
});

pub struct ProgressTracker {
    pub pb: ProgressBar,
}

#[derive(Debug, Clone)]
pub struct ProgressTrackerConfig {
    pub hidden: bool,
}

impl ProgressTracker {
    /// Mirror a polled client state onto the bar.
    ///
    /// `percent` is `-1` until a transfer is running; the byte counts are
    /// absent for local sources.
    pub fn update(&self, percent: i32, bytes: Option<(u64, u64)>) {
        if let Some((progress, total)) = bytes {
            if total > 0 {
                self.pb.set_length(total);
            }
            self.pb.set_position(progress);
        }
        if percent >= 0 {
            self.pb.set_message(format!("{percent}%"));
        }
    }

    pub fn abandon(&self) { self.pb.abandon(); }
}

impl Tracker for ProgressTracker {
    type Ctx = ProgressTrackerConfig;

    fn new(ctx: Self::Ctx) -> Self {
        let pb = ProgressBar::no_length();
        if ctx.hidden {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }

        if let Some(pb_style) = PB_TEMPLATE.as_ref() {
            pb.set_style(pb_style.clone());
        }
        ProgressTracker { pb }
    }

    fn finish(&self, msg: Option<String>) {
        match msg {
            Some(msg) => self.pb.finish_with_message(msg),
            None => self.pb.finish(),
        }
    }
}
