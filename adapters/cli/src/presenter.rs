//! Presenter that turns published frames into log lines.

use path_defence_engine::{Frame, Presenter, StatusLabels};
use tracing::{debug, info};

/// Logs entity churn at `debug` and label changes at `info`.
#[derive(Debug, Default)]
pub(crate) struct LogPresenter {
    frames: u64,
    last: Option<StatusLabels>,
}

impl LogPresenter {
    /// Number of frames received so far.
    pub(crate) fn frames(&self) -> u64 {
        self.frames
    }
}

impl Presenter for LogPresenter {
    fn present(&mut self, frame: &Frame) {
        self.frames = self.frames.saturating_add(1);

        if !frame.added.is_empty() || !frame.removed.is_empty() {
            debug!(
                frame = self.frames,
                added = ?frame.added,
                removed = ?frame.removed,
                "entities changed"
            );
        }

        let labels = frame.labels;
        let changed = self.last.map_or(true, |last| {
            (last.level, last.lives, last.resources, last.score)
                != (labels.level, labels.lives, labels.resources, labels.score)
        });
        if changed {
            info!(
                level = labels.level,
                lives = labels.lives,
                resources = labels.resources,
                score = labels.score,
                countdown = labels.countdown,
                "status"
            );
        }
        self.last = Some(labels);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(countdown: u32) -> Frame {
        Frame {
            labels: StatusLabels {
                level: 1,
                lives: 20,
                resources: 100,
                score: 0,
                countdown,
            },
            added: Vec::new(),
            removed: Vec::new(),
        }
    }

    #[test]
    fn counts_frames_and_remembers_labels() {
        let mut presenter = LogPresenter::default();
        presenter.present(&frame(10));
        presenter.present(&frame(9));
        assert_eq!(presenter.frames(), 2);
        assert_eq!(presenter.last.map(|labels| labels.countdown), Some(9));
    }
}
