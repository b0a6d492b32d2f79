use crate::kernel::diagram::{DiagramKey, DiagramRender};
use crate::kernel::effect::RequestId;
use crate::kernel::services::ports::StoreError;
use crate::models::DocPath;

/// Results posted back to the UI thread. Every store result carries the
/// request that produced it so stale ones can be told apart.
#[derive(Debug)]
pub enum AppMessage {
    Fetched {
        request: RequestId,
        path: DocPath,
        result: Result<String, StoreError>,
    },
    StaticFetched {
        request: RequestId,
        path: DocPath,
        result: Result<String, StoreError>,
    },
    Saved {
        request: RequestId,
        path: DocPath,
        result: Result<(), StoreError>,
    },
    DiagramRendered {
        key: DiagramKey,
        render: DiagramRender,
    },
}
