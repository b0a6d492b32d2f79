use crate::kernel::diagram::DiagramJob;
use crate::models::DocPath;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one in-flight store request. Ids are unique per process, so
/// a result can be offered to every component and only its owner accepts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    pub fn next() -> Self {
        Self(NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Side effects requested by the state machines; executed by the runtime.
#[derive(Debug, Clone)]
pub enum Effect {
    Fetch {
        request: RequestId,
        path: DocPath,
    },
    FetchStatic {
        request: RequestId,
        path: DocPath,
    },
    Save {
        request: RequestId,
        path: DocPath,
        content: String,
    },
    RenderDiagram(DiagramJob),
}

impl Effect {
    pub fn request(&self) -> Option<RequestId> {
        match self {
            Effect::Fetch { request, .. }
            | Effect::FetchStatic { request, .. }
            | Effect::Save { request, .. } => Some(*request),
            Effect::RenderDiagram(_) => None,
        }
    }
}
