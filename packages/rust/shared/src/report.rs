//! Conversion outcomes and the observer hook they are reported through.
//!
//! Every place where the converter silently recovers (a fallback filename, an
//! image it could not place, content with no destination file) emits a
//! [`Report`] so callers and tests can assert on what happened.

use std::sync::Mutex;

/// Pipeline stage that produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Assets,
    Toc,
    Segment,
    Inline,
}

/// Which synthetic value replaced a missing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Unrecognized image signature, `png` extension used.
    ImageFormat,
    /// Empty or too-short slug, `chapter-N` used.
    ChapterName,
    /// No qualifying heading, whole document routed to `content.md`.
    SingleFile,
}

/// Why something was left out of the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// Body content before the first qualifying heading.
    PrecedesFirstHeading,
    /// Image reference whose relationship id has no extracted asset.
    UnmappedImage,
    /// Image part that could not be read or written.
    ImageUnavailable(String),
}

/// Tagged result of one decision point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The subject was resolved normally.
    Matched,
    /// A heading repeated an earlier title and was routed into that entry.
    Merged { entry: usize },
    FallbackSynthesized(Fallback),
    Dropped(DropReason),
}

/// One observed outcome with the subject it applies to (a relationship id, a
/// heading title, a node index...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub stage: Stage,
    pub subject: String,
    pub outcome: Outcome,
}

impl Report {
    pub fn new(stage: Stage, subject: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            stage,
            subject: subject.into(),
            outcome,
        }
    }
}

/// Callback for pipeline progress and outcome reporting.
pub trait ConversionObserver: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called for every tagged outcome.
    fn report(&self, report: Report);
}

/// No-op observer for headless usage.
pub struct SilentObserver;

impl ConversionObserver for SilentObserver {
    fn phase(&self, _name: &str) {}
    fn report(&self, _report: Report) {}
}

/// Observer that keeps every report, in order.
#[derive(Default)]
pub struct RecordingObserver {
    phases: Mutex<Vec<String>>,
    reports: Mutex<Vec<Report>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the reports received so far.
    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Snapshot of the phases entered so far.
    pub fn phases(&self) -> Vec<String> {
        self.phases.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Reports with the given outcome.
    pub fn with_outcome(&self, outcome: &Outcome) -> Vec<Report> {
        self.reports()
            .into_iter()
            .filter(|r| &r.outcome == outcome)
            .collect()
    }

    /// Count of `Dropped` reports of any reason.
    pub fn dropped_count(&self) -> usize {
        self.reports()
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Dropped(_)))
            .count()
    }
}

impl ConversionObserver for RecordingObserver {
    fn phase(&self, name: &str) {
        if let Ok(mut phases) = self.phases.lock() {
            phases.push(name.to_string());
        }
    }

    fn report(&self, report: Report) {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push(report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_observer_keeps_order() {
        let observer = RecordingObserver::new();
        observer.phase("Extracting images");
        observer.report(Report::new(Stage::Toc, "!!!", Outcome::FallbackSynthesized(Fallback::ChapterName)));
        observer.report(Report::new(
            Stage::Inline,
            "rId9",
            Outcome::Dropped(DropReason::UnmappedImage),
        ));

        let reports = observer.reports();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].subject, "!!!");
        assert_eq!(reports[1].stage, Stage::Inline);
        assert_eq!(observer.dropped_count(), 1);
        assert_eq!(observer.phases(), vec!["Extracting images".to_string()]);
    }

    #[test]
    fn with_outcome_filters() {
        let observer = RecordingObserver::new();
        observer.report(Report::new(Stage::Segment, "Intro", Outcome::Matched));
        observer.report(Report::new(Stage::Segment, "Notes", Outcome::Merged { entry: 0 }));
        assert_eq!(observer.with_outcome(&Outcome::Matched).len(), 1);
        assert_eq!(observer.with_outcome(&Outcome::Merged { entry: 0 })[0].subject, "Notes");
    }
}
