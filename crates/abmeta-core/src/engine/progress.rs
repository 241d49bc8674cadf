/// Milestones of a metadata extraction run, in the order they are emitted.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    /// Plugin names are being resolved and side-tables loaded.
    LoadingInputs,
    /// The input directory listing is complete.
    StructuresFound { count: u64 },
    /// One structure has been processed; `ok` is false when it went to the bad-files list.
    StructureDone { path: String, ok: bool },
    /// Per-structure rows are being pivoted into the wide table.
    JoiningWideTable,
    /// The run is complete.
    Finished { structures: u64, bad_files: u64 },
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn reporter_without_callback_ignores_events() {
        ProgressReporter::new().report(Progress::JoiningWideTable);
    }

    #[test]
    fn reporter_forwards_events_to_callback() {
        let seen = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::StructureDone { path, ok } = event {
                seen.lock().unwrap().push((path, ok));
            }
        }));

        reporter.report(Progress::StructureDone {
            path: "/a.cif".into(),
            ok: false,
        });
        reporter.report(Progress::JoiningWideTable);
        drop(reporter);

        assert_eq!(seen.into_inner().unwrap(), vec![("/a.cif".to_string(), false)]);
    }
}
