use super::message::AppMessage;
use crate::kernel::diagram::{panic_message, DiagramError, DiagramId, DiagramJob, DiagramRender};
use crate::kernel::effect::{Effect, RequestId};
use crate::kernel::services::ports::{DocumentStore, StaticLookup, StoreError};
use crate::models::DocPath;
use std::io;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use tokio::task::{AbortHandle, JoinError};

pub struct AsyncRuntime {
    runtime: tokio::runtime::Runtime,
    tx: Sender<AppMessage>,
    store: Arc<dyn DocumentStore>,
    fallback: Option<Arc<dyn StaticLookup>>,
}

impl AsyncRuntime {
    pub fn new(
        tx: Sender<AppMessage>,
        store: Arc<dyn DocumentStore>,
        fallback: Option<Arc<dyn StaticLookup>>,
    ) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .or_else(|e| {
                tracing::error!(
                    error = %e,
                    "Failed to create multi-thread tokio runtime, falling back to current-thread"
                );
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
            })?;
        Ok(Self {
            runtime,
            tx,
            store,
            fallback,
        })
    }

    pub fn tokio_handle(&self) -> tokio::runtime::Handle {
        self.runtime.handle().clone()
    }

    pub fn has_static_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Executes one effect. Fetches return a handle so the caller can abort
    /// a superseded request.
    pub fn run(&self, effect: Effect) -> Option<AbortHandle> {
        match effect {
            Effect::Fetch { request, path } => Some(self.fetch(request, path)),
            Effect::FetchStatic { request, path } => self.fetch_static(request, path),
            Effect::Save {
                request,
                path,
                content,
            } => {
                self.save(request, path, content);
                None
            }
            Effect::RenderDiagram(job) => {
                self.render_diagram(job);
                None
            }
        }
    }

    pub fn fetch(&self, request: RequestId, path: DocPath) -> AbortHandle {
        let tx = self.tx.clone();
        let store = Arc::clone(&self.store);
        let handle = self.runtime.spawn(async move {
            tracing::debug!(%request, path = %path, "fetch");
            let path_for_read = path.clone();
            let result = tokio::task::spawn_blocking(move || store.read(&path_for_read))
                .await
                .unwrap_or_else(|e| Err(join_failure("read", e)));
            let _ = tx.send(AppMessage::Fetched {
                request,
                path,
                result,
            });
        });
        handle.abort_handle()
    }

    /// `None` when no static copy is configured.
    pub fn fetch_static(&self, request: RequestId, path: DocPath) -> Option<AbortHandle> {
        let Some(lookup) = self.fallback.as_ref().map(Arc::clone) else {
            let _ = self.tx.send(AppMessage::StaticFetched {
                request,
                path: path.clone(),
                result: Err(StoreError::NotFound(path)),
            });
            return None;
        };
        let tx = self.tx.clone();
        let handle = self.runtime.spawn(async move {
            tracing::debug!(%request, path = %path, "static lookup");
            let path_for_read = path.clone();
            let result = tokio::task::spawn_blocking(move || lookup.lookup(&path_for_read))
                .await
                .unwrap_or_else(|e| Err(join_failure("static lookup", e)));
            let _ = tx.send(AppMessage::StaticFetched {
                request,
                path,
                result,
            });
        });
        Some(handle.abort_handle())
    }

    pub fn save(&self, request: RequestId, path: DocPath, content: String) {
        let tx = self.tx.clone();
        let store = Arc::clone(&self.store);
        self.runtime.spawn(async move {
            let path_for_write = path.clone();
            let result =
                tokio::task::spawn_blocking(move || store.write(&path_for_write, &content))
                    .await
                    .unwrap_or_else(|e| Err(join_failure("write", e)));
            match &result {
                Ok(()) => tracing::debug!(%request, path = %path, "saved"),
                Err(e) => tracing::warn!(%request, path = %path, error = %e, "save failed"),
            }
            let _ = tx.send(AppMessage::Saved {
                request,
                path,
                result,
            });
        });
    }

    pub fn render_diagram(&self, job: DiagramJob) {
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let key = job.key;
            let render = match tokio::task::spawn_blocking(move || job.run()).await {
                Ok(render) => render,
                Err(e) => {
                    let detail = if e.is_panic() {
                        panic_message(e.into_panic().as_ref())
                    } else {
                        "cancelled".to_string()
                    };
                    tracing::error!(%detail, "diagram task failed");
                    DiagramRender {
                        id: DiagramId::new(),
                        result: Err(DiagramError::new(0, format!("renderer crashed: {detail}"))),
                    }
                }
            };
            let _ = tx.send(AppMessage::DiagramRendered { key, render });
        });
    }
}

fn join_failure(op: &'static str, e: JoinError) -> StoreError {
    if e.is_panic() {
        let detail = panic_message(e.into_panic().as_ref());
        tracing::error!(op, %detail, "store task panicked");
        StoreError::Unavailable(format!("{op} panicked: {detail}"))
    } else {
        StoreError::Unavailable(format!("{op} cancelled"))
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/runtime/runtime.rs"]
mod tests;
