use abmeta::engine::progress::{Progress, ProgressCallback};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

/// Drives an indicatif bar on stderr from workflow progress events.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
    bad_files: Arc<AtomicU64>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// A handler that tracks state without drawing anything.
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let pb = ProgressBar::new(0)
            .with_style(Self::spinner_style())
            .with_message("Initializing...");
        pb.set_draw_target(target);
        pb.finish_and_clear();

        Self {
            pb: Arc::new(Mutex::new(pb)),
            bad_files: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of structures reported as unreadable so far.
    pub fn bad_files(&self) -> u64 {
        self.bad_files.load(Ordering::Relaxed)
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb_clone = self.pb.clone();
        let bad_files = self.bad_files.clone();

        Box::new(move |progress: Progress| {
            let Ok(pb_guard) = pb_clone.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::LoadingInputs => {
                    pb_guard.reset();
                    pb_guard.set_length(0);
                    pb_guard.set_style(Self::spinner_style());
                    pb_guard.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    pb_guard.set_message("Loading plugins and side-tables");
                }
                Progress::StructuresFound { count } => {
                    pb_guard.disable_steady_tick();
                    pb_guard.reset();
                    pb_guard.set_length(count);
                    pb_guard.set_position(0);
                    pb_guard.set_style(Self::bar_style());
                    pb_guard.set_message("Structures");
                }
                Progress::StructureDone { path, ok } => {
                    pb_guard.inc(1);
                    if !ok {
                        bad_files.fetch_add(1, Ordering::Relaxed);
                        pb_guard.println(format!("  ⚠ Unreadable structure: {}", path));
                    }
                }
                Progress::JoiningWideTable => {
                    pb_guard.set_style(Self::spinner_style());
                    pb_guard.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    pb_guard.set_message("Joining wide table");
                }
                Progress::Finished {
                    structures,
                    bad_files: unreadable,
                } => {
                    pb_guard.disable_steady_tick();
                    pb_guard.finish_with_message(format!(
                        "✓ {} structure(s), {} unreadable",
                        structures, unreadable
                    ));
                }
            }
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<20} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .with_key(
                "eta",
                |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                    let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
                },
            )
            .progress_chars("##-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn handler_initializes_in_a_clean_state() {
        let handler = CliProgressHandler::hidden();
        let pb = handler.pb.lock().unwrap();
        assert_eq!(pb.length(), Some(0));
        assert!(pb.is_finished());
        assert_eq!(handler.bad_files(), 0);
    }

    #[test]
    fn callback_tracks_a_full_run() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.get_callback();

        callback(Progress::LoadingInputs);
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.message(), "Loading plugins and side-tables");
            assert!(!pb.is_finished());
        }

        callback(Progress::StructuresFound { count: 10 });
        callback(Progress::StructureDone {
            path: "/data/a.cif".into(),
            ok: true,
        });
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.length(), Some(10));
            assert_eq!(pb.position(), 1);
        }

        callback(Progress::JoiningWideTable);
        assert_eq!(handler.pb.lock().unwrap().message(), "Joining wide table");

        callback(Progress::Finished {
            structures: 10,
            bad_files: 0,
        });
        let pb = handler.pb.lock().unwrap();
        assert!(pb.is_finished());
        assert_eq!(pb.message(), "✓ 10 structure(s), 0 unreadable");
    }

    #[test]
    fn unreadable_structures_are_counted() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.get_callback();

        callback(Progress::StructureDone {
            path: "/data/a.cif".into(),
            ok: true,
        });
        callback(Progress::StructureDone {
            path: "/data/b.cif".into(),
            ok: false,
        });

        assert_eq!(handler.bad_files(), 1);
    }

    #[test]
    fn callback_is_thread_safe() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.get_callback();

        thread::spawn(move || {
            callback(Progress::StructuresFound { count: 1 });
            callback(Progress::StructureDone {
                path: "/data/a.cif".into(),
                ok: false,
            });
            callback(Progress::Finished {
                structures: 0,
                bad_files: 1,
            });
        })
        .join()
        .unwrap();

        assert_eq!(handler.bad_files(), 1);
        let pb = handler.pb.lock().unwrap();
        assert!(pb.is_finished());
        assert_eq!(pb.position(), 1);
    }
}
