//! HTTP server for interactive mode
//!
//! `autoeq serve --data-dir ./data` → loads the datasets, opens the browser,
//! renders pages on request.
//!
//! Requests are handled one at a time on the calling thread. The snapshot and
//! flattened track list are shared read-only; every `/tracks` request builds
//! its own [`TrackTable`](crate::tracks::TrackTable) from the query string.

use crate::chart::ChartJs;
use crate::error::{Error, Result};
use crate::loader::{Download, Snapshot};
use crate::model::ClusteredTrack;
use crate::render::{Renderer, Site};
use crate::tracks::{flatten, Pagination, TrackQuery, TrackTable};
use serde::Serialize;
use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{debug, error, info, warn};

/// Read-only state shared by all requests
pub struct AppState {
    pub snapshot: Snapshot,
    pub tracks: Vec<ClusteredTrack>,
}

impl AppState {
    pub fn new(snapshot: Snapshot) -> Self {
        let tracks = flatten(&snapshot.clusters.clusters);
        Self { snapshot, tracks }
    }
}

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self { ok: true, data: Some(data), error: None }
    }
}

/// One page of the track table as JSON
#[derive(Serialize)]
pub struct TracksPage<'a> {
    pub query: &'a TrackQuery,
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
    pub pagination: Pagination,
    pub tracks: Vec<&'a ClusteredTrack>,
}

/// A rendered response, independent of the HTTP library
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    /// Offer the body as a download under this name
    pub attachment: Option<&'static str>,
}

impl Reply {
    fn html(body: String) -> Self {
        Self { status: 200, content_type: "text/html; charset=utf-8", body, attachment: None }
    }

    fn json(body: String) -> Self {
        Self { status: 200, content_type: "application/json", body, attachment: None }
    }

    fn not_found(body: String) -> Self {
        Self { status: 404, ..Self::html(body) }
    }

    fn server_error(body: String) -> Self {
        Self { status: 500, ..Self::html(body) }
    }
}

/// Start server, open browser, serve pages
pub fn start(port: u16, state: AppState, open_browser: bool) -> Result<()> {
    let addr = format!("127.0.0.1:{}", port);
    let server = Server::http(&addr).map_err(|e| Error::Server(e.to_string()))?;

    let url = format!("http://localhost:{}", port);
    eprintln!("\n\x1b[1;32m🎚  AutoEQ\x1b[0m");
    eprintln!("   {}", url);
    eprintln!(
        "   {} tracks in {} clusters\n",
        state.tracks.len(),
        state.snapshot.clusters.clusters.len()
    );
    info!(%addr, "listening");

    if open_browser {
        if let Err(e) = open::that(&url) {
            warn!(error = %e, "could not open browser");
        }
    }

    let renderer = Renderer::new(Site::Served, &ChartJs);
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &state, &renderer) {
            warn!(error = %e, "request failed");
        }
    }

    Ok(())
}

fn handle_request(request: Request, state: &AppState, renderer: &Renderer) -> Result<()> {
    let method = request.method().clone();
    let url = request.url().to_string();
    debug!(%method, %url, "request");

    let reply = or_error_page(route(&method, &url, state, renderer), &url, renderer);

    let mut response = Response::from_string(reply.body)
        .with_status_code(reply.status)
        .with_header(header("Content-Type", reply.content_type)?);
    if let Some(name) = reply.attachment {
        response = response.with_header(header(
            "Content-Disposition",
            &format!("attachment; filename=\"{}\"", name),
        )?);
    }
    request.respond(response)?;
    Ok(())
}

fn header(name: &str, value: &str) -> Result<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes())
        .map_err(|_| Error::Server(format!("invalid header {}", name)))
}

/// A failed handler still answers, with a 500 page
fn or_error_page(result: Result<Reply>, url: &str, renderer: &Renderer) -> Reply {
    result.unwrap_or_else(|e| {
        error!(error = %e, %url, "handler failed");
        Reply::server_error(renderer.server_error(&e.to_string()))
    })
}

/// Map a request line to a reply
pub fn route(method: &Method, url: &str, state: &AppState, renderer: &Renderer) -> Result<Reply> {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));
    let snap = &state.snapshot;

    if *method != Method::Get {
        return Ok(Reply::not_found(renderer.not_found(path)));
    }

    let reply = match path {
        "/" | "/index.html" => Reply::html(renderer.dashboard(snap)),
        "/clusters" => Reply::html(renderer.clusters(snap)),
        "/eq-presets" => Reply::html(renderer.presets(snap)),

        "/tracks" => {
            let query = TrackQuery::from_query_string(query);
            let table = query.apply(&state.tracks);
            Reply::html(renderer.tracks(snap, &table, &query))
        }

        "/api/tracks" => {
            let query = TrackQuery::from_query_string(query);
            let table = query.apply(&state.tracks);
            let page = TracksPage {
                query: &query,
                total: table.filtered().len(),
                page: table.current_page(),
                total_pages: table.total_pages(),
                pagination: table.pagination(),
                tracks: table.visible().to_vec(),
            };
            Reply::json(serde_json::to_string(&ApiResponse::success(page))?)
        }

        _ => {
            if let Some(id) = path.strip_prefix("/tracks/") {
                let table = TrackTable::new(&state.tracks);
                let found = id.parse::<u64>().ok().and_then(|id| table.find(id));
                match found {
                    Some(track) => Reply::html(renderer.track_detail(track)),
                    None => Reply::not_found(renderer.not_found(&format!("No track with id {}", id))),
                }
            } else if let Some(which) = path.strip_prefix("/download/").and_then(Download::from_file_name) {
                Reply {
                    attachment: Some(which.file_name()),
                    ..Reply::json(snap.download(which)?)
                }
            } else {
                Reply::not_found(renderer.not_found(path))
            }
        }
    };

    Ok(reply)
}
