use std::collections::BTreeMap;

pub use puffin;
use puffin::{GlobalFrameView, MergeScope, ScopeCollection};

pub fn enable() {
    puffin::set_scopes_on(true);
}

pub fn new_frame() {
    puffin::profile_function!();
    puffin::GlobalProfiler::lock().new_frame();
}

/// Time spent in one named scope over a recorded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeTiming {
    pub name: String,
    pub calls: usize,
    /// Recursive calls only count once, at their outermost entry.
    pub total_ns: i64,
}

/// Turns profiling on and keeps the frames finished while it is alive.
pub struct Recorder {
    view: GlobalFrameView,
}

impl Recorder {
    pub fn start() -> Self {
        enable();
        Self {
            view: GlobalFrameView::default(),
        }
    }

    /// Closes the current frame and sums its scopes by name, slowest first.
    pub fn finish(&self) -> Vec<ScopeTiming> {
        new_frame();

        let view = self.view.lock();
        let Some(frame) = view.latest_frame() else {
            log::warn!("No profiling scopes were recorded");
            return Vec::new();
        };
        let Ok(unpacked) = frame.unpacked() else {
            log::warn!("Failed to unpack profiling frame {}", frame.frame_index());
            return Vec::new();
        };
        let frames = [unpacked];

        let mut totals = BTreeMap::new();
        for thread in frames[0].thread_streams.keys() {
            match puffin::merge_scopes_for_thread(view.scope_collection(), &frames, thread) {
                Ok(scopes) => {
                    let mut path = Vec::new();
                    accumulate(view.scope_collection(), &scopes, &mut path, &mut totals);
                }
                Err(err) => log::warn!("Failed to read scopes of thread {}: {:?}", thread.name, err),
            }
        }

        let mut timings: Vec<_> = totals
            .into_iter()
            .map(|(name, (calls, total_ns))| ScopeTiming { name, calls, total_ns })
            .collect();
        timings.sort_by(|a, b| b.total_ns.cmp(&a.total_ns).then_with(|| a.name.cmp(&b.name)));
        timings
    }
}

fn accumulate(
    collection: &ScopeCollection,
    scopes: &[MergeScope<'_>],
    path: &mut Vec<String>,
    totals: &mut BTreeMap<String, (usize, i64)>,
) {
    for scope in scopes {
        let name = collection
            .fetch_by_id(&scope.id)
            .map_or_else(|| format!("{:?}", scope.id), |details| details.name().to_string());

        let entry = totals.entry(name.clone()).or_insert((0, 0));
        entry.0 += scope.num_pieces;
        if !path.contains(&name) {
            entry.1 += scope.total_duration_ns;
        }

        path.push(name);
        accumulate(collection, &scope.children, path, totals);
        path.pop();
    }
}
