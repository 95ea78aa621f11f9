#[cfg(feature = "rayon")]
use std::sync::Mutex;

trait ThreadSafeReporter: Send {
    fn report(&mut self, progress: f32);
}
impl<F: FnMut(f32) + Send> ThreadSafeReporter for F {
    fn report(&mut self, progress: f32) {
        self(progress);
    }
}

pub(crate) trait Report {
    fn report(&mut self, progress: f32);
}

enum ProgressInner<'a> {
    Send(&'a mut dyn ThreadSafeReporter),
    Bound(&'a mut dyn FnMut(f32)),
}

/// A progress reporter used by the image compression functions.
///
/// This structure is just a wrapper around a function that handles progress
/// reports. A progress report is a single `f32` value between 0 to 1
/// representing the fraction of rows of blocks that have been compressed.
///
/// Reports are guaranteed to only increase or stay the same.
///
/// ### Multi-threaded progress reporting
///
/// [`compress_image_parallel`](crate::compress_image_parallel) compresses rows
/// on multiple threads. Progress is only reported from there if the reporter
/// was created with [`Progress::new()`], which requires a `Send` function.
/// Reporters created with [`Progress::new_single_threaded()`] are silently
/// ignored by the parallel driver.
pub struct Progress<'a> {
    reporter: ProgressInner<'a>,
}
impl<'a> Progress<'a> {
    /// Creates a new progress reporter.
    ///
    /// This reporter supports multi-threaded progress reporting. See the
    /// documentation of [`Progress`] for more details.
    pub fn new<F: FnMut(f32) + Send>(reporter: &'a mut F) -> Self {
        Self {
            reporter: ProgressInner::Send(reporter),
        }
    }
    /// Creates a new progress reporter.
    ///
    /// This reporter does **not** support multi-threaded progress reporting.
    /// See the documentation of [`Progress`] for more details.
    pub fn new_single_threaded<F: FnMut(f32)>(reporter: &'a mut F) -> Self {
        Self {
            reporter: ProgressInner::Bound(reporter),
        }
    }

    /// Calls the underlying reporter function with the given progress.
    ///
    /// ### Panics
    ///
    /// If the function is called with a value outside the range of `0.0..=1.0`,
    /// the function will panic **if debug assertions are enabled**.
    ///
    /// The underlying reporter may also panic.
    pub fn report(&mut self, progress: f32) {
        debug_assert!((0.0..=1.0).contains(&progress));
        match &mut self.reporter {
            ProgressInner::Send(report) => report.report(progress),
            ProgressInner::Bound(report) => report(progress),
        }
    }
}
impl Report for Progress<'_> {
    fn report(&mut self, progress: f32) {
        self.report(progress);
    }
}
impl Report for Option<&mut Progress<'_>> {
    fn report(&mut self, progress: f32) {
        if let Some(reporter) = self {
            reporter.report(progress);
        }
    }
}

/// The number of completed units and a function to report it.
#[cfg(feature = "rayon")]
type InnerState<'a> = (u64, &'a mut dyn ThreadSafeReporter);

/// Collects progress from multiple threads.
#[cfg(feature = "rayon")]
pub(crate) struct ParallelProgress<'a> {
    progress: Option<Mutex<InnerState<'a>>>,
    total: u64,
}
#[cfg(feature = "rayon")]
impl<'a> ParallelProgress<'a> {
    pub fn new(progress: &'a mut Option<&mut Progress>, total: u64) -> Self {
        Self {
            progress: match progress {
                Some(Progress {
                    reporter: ProgressInner::Send(f),
                }) => Some(Mutex::new((0, *f))),
                _ => None,
            },
            total,
        }
    }

    /// Adds `progress` completed units and reports the new total.
    pub fn submit(&self, progress: u64) {
        if let Some(mutex) = self.progress.as_ref() {
            // a panicking reporter poisons the lock, later reports are dropped
            let Ok(mut guard) = mutex.lock() else {
                return;
            };
            guard.0 += progress;
            let fraction = if self.total == 0 {
                1.0
            } else {
                (guard.0 as f32 / self.total as f32).min(1.0)
            };
            guard.1.report(fraction);
        }
    }
}
