//! Per-conversion mutable state.

use std::sync::atomic::{AtomicUsize, Ordering};

use wordbook_shared::{BookConfig, ConversionObserver, Labels, Outcome, Report, Stage};

/// Counters and reporting for one conversion run.
///
/// The image and chapter counters start at 1 and only move forward, so every
/// generated filename is unique within the run.
pub struct ConversionSession<'a> {
    config: &'a BookConfig,
    labels: Labels,
    tally: Tally<'a>,
    image_counter: u32,
    chapter_counter: u32,
}

impl<'a> ConversionSession<'a> {
    pub fn new(config: &'a BookConfig, observer: &'a dyn ConversionObserver) -> Self {
        Self {
            config,
            labels: Labels::for_language(&config.language),
            tally: Tally {
                inner: observer,
                dropped: AtomicUsize::new(0),
                fallbacks: AtomicUsize::new(0),
            },
            image_counter: 1,
            chapter_counter: 1,
        }
    }

    pub fn config(&self) -> &'a BookConfig {
        self.config
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Observer that forwards to the caller's observer and keeps counts.
    pub fn observer(&self) -> &dyn ConversionObserver {
        &self.tally
    }

    pub fn phase(&self, name: &str) {
        self.tally.phase(name);
    }

    pub fn report(&self, stage: Stage, subject: impl Into<String>, outcome: Outcome) {
        self.tally.report(Report::new(stage, subject, outcome));
    }

    /// Filename the next extracted image will get.
    pub fn next_image_name(&self, ext: &str) -> String {
        format!("image_{:03}.{ext}", self.image_counter)
    }

    /// Advance the image counter after an image was written.
    pub fn image_written(&mut self) {
        self.image_counter += 1;
    }

    /// Take the next synthetic chapter number.
    pub fn next_chapter(&mut self) -> u32 {
        let n = self.chapter_counter;
        self.chapter_counter += 1;
        n
    }

    /// Number of `Dropped` outcomes reported so far.
    pub fn dropped(&self) -> usize {
        self.tally.dropped.load(Ordering::Relaxed)
    }

    /// Number of `FallbackSynthesized` outcomes reported so far.
    pub fn fallbacks(&self) -> usize {
        self.tally.fallbacks.load(Ordering::Relaxed)
    }
}

struct Tally<'a> {
    inner: &'a dyn ConversionObserver,
    dropped: AtomicUsize,
    fallbacks: AtomicUsize,
}

impl ConversionObserver for Tally<'_> {
    fn phase(&self, name: &str) {
        self.inner.phase(name);
    }

    fn report(&self, report: Report) {
        match report.outcome {
            Outcome::Dropped(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
            Outcome::FallbackSynthesized(_) => {
                self.fallbacks.fetch_add(1, Ordering::Relaxed);
            }
            Outcome::Matched | Outcome::Merged { .. } => {}
        }
        self.inner.report(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordbook_shared::{DropReason, Fallback, RecordingObserver};

    fn config(language: &str) -> BookConfig {
        BookConfig::new("T", "D", language, 3, "out", "assets").unwrap()
    }

    #[test]
    fn image_names_are_zero_padded_and_widen() {
        let config = config("en");
        let observer = RecordingObserver::new();
        let mut session = ConversionSession::new(&config, &observer);
        assert_eq!(session.next_image_name("png"), "image_001.png");
        assert_eq!(session.next_image_name("gif"), "image_001.gif");
        for _ in 0..999 {
            session.image_written();
        }
        assert_eq!(session.next_image_name("png"), "image_1000.png");
    }

    #[test]
    fn chapter_counter_starts_at_one() {
        let config = config("en");
        let observer = RecordingObserver::new();
        let mut session = ConversionSession::new(&config, &observer);
        assert_eq!(session.next_chapter(), 1);
        assert_eq!(session.next_chapter(), 2);
    }

    #[test]
    fn reports_are_counted_and_forwarded() {
        let config = config("zh-hans");
        let observer = RecordingObserver::new();
        let session = ConversionSession::new(&config, &observer);
        session.report(Stage::Segment, "block 0", Outcome::Dropped(DropReason::PrecedesFirstHeading));
        session.report(Stage::Toc, "!!!", Outcome::FallbackSynthesized(Fallback::ChapterName));
        session.report(Stage::Toc, "Intro", Outcome::Matched);

        assert_eq!(session.dropped(), 1);
        assert_eq!(session.fallbacks(), 1);
        assert_eq!(observer.reports().len(), 3);
        assert_eq!(session.labels().placeholder_title, "文档内容");
    }
}
