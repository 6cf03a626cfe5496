//! Document loader - one worker thread per open document
//!
//! The worker opens the source once (resolving the page count) and then
//! serves page render requests until it is shut down. The UI thread never
//! blocks on it: responses are drained with [`DocumentLoader::poll`].

use std::collections::HashMap;
use std::sync::Arc;

use flume::{Receiver, Sender};

use super::backend::DocumentBackend;
use super::document::{Document, PageSurface, ViewerError};

/// Unique identifier for render requests
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(pub u64);

impl RequestId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Request sent to the loader worker
#[derive(Debug)]
enum LoadRequest {
    Render {
        id: RequestId,
        page: usize,
        scale: f32,
    },
    Shutdown,
}

/// Response from the loader worker
#[derive(Debug)]
pub enum LoadResponse {
    /// The source opened and its page count is known
    Opened { page_count: usize },
    /// The source could not be opened; nothing else will follow
    Failed(ViewerError),
    /// A page rendered
    Page { id: RequestId, surface: PageSurface },
    /// A single page failed to render
    PageFailed { id: RequestId, error: ViewerError },
}

/// Owns the worker thread for one document
pub struct DocumentLoader {
    request_tx: Sender<LoadRequest>,
    response_rx: Receiver<LoadResponse>,
    next_request_id: u64,
    pending: HashMap<RequestId, usize>,
}

impl DocumentLoader {
    /// Start loading `document` on a background thread
    #[must_use]
    pub fn spawn(document: Document, backend: Arc<dyn DocumentBackend>) -> Self {
        let (request_tx, request_rx) = flume::unbounded();
        let (response_tx, response_rx) = flume::unbounded();

        let failure_tx = response_tx.clone();
        let location = document.source.display().to_string();
        let spawned = std::thread::Builder::new()
            .name("docshelf-loader".into())
            .spawn(move || load_worker(&document, backend.as_ref(), request_rx, response_tx));
        if let Err(e) = spawned {
            log::error!("Failed to spawn loader thread: {e}");
            let _ = failure_tx.send(LoadResponse::Failed(ViewerError::unreachable(location, e)));
        }

        Self {
            request_tx,
            response_rx,
            next_request_id: 1,
            pending: HashMap::new(),
        }
    }

    /// Queue a page render; served once the document has opened
    pub fn request_page(&mut self, page: usize, scale: f32) -> RequestId {
        let id = RequestId::new(self.next_request_id);
        self.next_request_id += 1;

        let _ = self
            .request_tx
            .send(LoadRequest::Render { id, page, scale });
        self.pending.insert(id, page);
        id
    }

    pub fn is_page_pending(&self, page: usize) -> bool {
        self.pending.values().any(|p| *p == page)
    }

    /// Drain every response that has arrived so far
    pub fn poll(&mut self) -> Vec<LoadResponse> {
        let mut responses = vec![];
        while let Ok(response) = self.response_rx.try_recv() {
            match &response {
                LoadResponse::Page { id, .. } | LoadResponse::PageFailed { id, .. } => {
                    if self.pending.remove(id).is_none() {
                        log::debug!("Dropping response for unknown request {id:?}");
                        continue;
                    }
                }
                LoadResponse::Failed(_) => self.pending.clear(),
                LoadResponse::Opened { .. } => {}
            }
            responses.push(response);
        }
        responses
    }

    /// Block until the next response arrives; used by tests and tools
    pub fn wait(&mut self) -> Option<LoadResponse> {
        let response = self.response_rx.recv().ok()?;
        if let LoadResponse::Page { id, .. } | LoadResponse::PageFailed { id, .. } = &response {
            self.pending.remove(id);
        }
        Some(response)
    }

    pub fn shutdown(&self) {
        let _ = self.request_tx.send(LoadRequest::Shutdown);
    }
}

impl Drop for DocumentLoader {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn load_worker(
    document: &Document,
    backend: &dyn DocumentBackend,
    requests: Receiver<LoadRequest>,
    responses: Sender<LoadResponse>,
) {
    let opened = match backend.open(document) {
        Ok(opened) => opened,
        Err(error) => {
            log::warn!("Failed to open {}: {error}", document.source.display());
            let _ = responses.send(LoadResponse::Failed(error));
            return;
        }
    };
    let _ = responses.send(LoadResponse::Opened {
        page_count: opened.page_count(),
    });

    for request in requests {
        match request {
            LoadRequest::Render { id, page, scale } => {
                let response = match opened.render(page, scale) {
                    Ok(surface) => LoadResponse::Page { id, surface },
                    Err(error) => {
                        log::warn!("{error}");
                        LoadResponse::PageFailed { id, error }
                    }
                };
                if responses.send(response).is_err() {
                    break;
                }
            }
            LoadRequest::Shutdown => break,
        }
    }
    log::debug!("Loader for {} stopped", document.source.display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_helpers::StubBackend;
    use crate::viewer::document::DocumentKind;

    fn doc(path: &str) -> Document {
        Document::new(path, "Test", DocumentKind::Document)
    }

    #[test]
    fn resolves_page_count_then_renders() {
        let mut loader = DocumentLoader::spawn(doc("ok.pdf"), Arc::new(StubBackend { pages: 4 }));
        let id = loader.request_page(2, 1.0);
        assert!(loader.is_page_pending(2));

        assert!(matches!(
            loader.wait(),
            Some(LoadResponse::Opened { page_count: 4 })
        ));
        match loader.wait() {
            Some(LoadResponse::Page { id: got, surface }) => {
                assert_eq!(got, id);
                assert_eq!(surface.page, 2);
                assert_eq!(surface.lines, vec!["Page 2".to_string()]);
            }
            other => panic!("unexpected response: {other:?}"),
        }
        assert!(!loader.is_page_pending(2));
    }

    #[test]
    fn unreachable_source_fails_once() {
        let mut loader =
            DocumentLoader::spawn(doc("missing.pdf"), Arc::new(StubBackend { pages: 4 }));
        match loader.wait() {
            Some(LoadResponse::Failed(ViewerError::SourceUnreachable { reason, .. })) => {
                assert_eq!(reason, "not found");
            }
            other => panic!("unexpected response: {other:?}"),
        }
        // Worker exited, channel closes
        assert!(loader.wait().is_none());
    }

    #[test]
    fn page_failure_is_scoped_to_that_page() {
        let mut loader =
            DocumentLoader::spawn(doc("ok.pdf"), Arc::new(StubBackend { pages: 20 }));
        loader.request_page(13, 1.0);
        loader.request_page(14, 1.0);
        assert!(matches!(loader.wait(), Some(LoadResponse::Opened { .. })));
        assert!(matches!(
            loader.wait(),
            Some(LoadResponse::PageFailed {
                error: ViewerError::RenderFailed { page: 13, .. },
                ..
            })
        ));
        assert!(matches!(loader.wait(), Some(LoadResponse::Page { .. })));
    }
}
