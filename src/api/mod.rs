//! Dashboard HTTP service.
//!
//! One background thread accepts connections and handles each request to
//! completion before taking the next, so playback never overlaps another
//! request. The display slot lives on that thread.

use crate::config::DashboardConfig;
use crate::detect::REFERENCE_COUNTS;
use crate::feedback::{Rating, PROFILE_LINK};
use crate::frame::DisplaySlot;
use crate::heatmap::generate_heatmap;
use crate::html::render_document;
use crate::insights::live_crowd_count;
use crate::pages::{Dashboard, Page, PageRequest, PRESENTATION_FILE_NAME};
use crate::player::BoundedPlayer;
use anyhow::{anyhow, Result};
use serde_json::json;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

const MAX_REQUEST_BYTES: usize = 8192;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub addr: String,
    pub assets_dir: PathBuf,
    pub presentation: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let cfg = DashboardConfig::default();
        Self {
            addr: cfg.addr,
            assets_dir: cfg.assets_dir,
            presentation: cfg.presentation,
        }
    }
}

impl ServerConfig {
    pub fn from_dashboard_config(cfg: &DashboardConfig) -> Self {
        Self {
            addr: cfg.addr.clone(),
            assets_dir: cfg.assets_dir.clone(),
            presentation: cfg.presentation.clone(),
        }
    }
}

#[derive(Debug)]
pub struct ServerHandle {
    pub addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl ServerHandle {
    pub fn stop(mut self) -> Result<()> {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(join) = self.join.take() {
            join.join()
                .map_err(|_| anyhow!("dashboard server thread panicked"))?;
        }
        Ok(())
    }
}

pub struct DashboardServer {
    cfg: ServerConfig,
    dashboard: Dashboard,
}

impl DashboardServer {
    pub fn new(cfg: ServerConfig, dashboard: Dashboard) -> Self {
        Self { cfg, dashboard }
    }

    /// Build the server from a fully loaded configuration.
    pub fn from_config(cfg: &DashboardConfig) -> Self {
        let player = BoundedPlayer::new(cfg.video.max_frames, cfg.video.policy);
        Self::new(
            ServerConfig::from_dashboard_config(cfg),
            Dashboard::new(player, cfg.video.path.clone()),
        )
    }

    pub fn spawn(self) -> Result<ServerHandle> {
        let configured_addr: SocketAddr = self.cfg.addr.parse()?;
        let listener = TcpListener::bind(configured_addr)?;
        let addr = listener.local_addr()?;
        if configured_addr.ip().is_loopback() && !addr.ip().is_loopback() {
            return Err(anyhow!(
                "dashboard configured for loopback address '{}', but bound to non-loopback address '{}'",
                configured_addr,
                addr
            ));
        }
        listener.set_nonblocking(true)?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_thread = shutdown.clone();
        let cfg = self.cfg;
        let dashboard = self.dashboard;
        let join = std::thread::spawn(move || {
            if let Err(err) = run_server(listener, cfg, dashboard, shutdown_thread) {
                log::error!("dashboard server stopped: {}", err);
            }
        });

        Ok(ServerHandle {
            addr,
            shutdown,
            join: Some(join),
        })
    }
}

struct ServerState {
    cfg: ServerConfig,
    dashboard: Dashboard,
    display: DisplaySlot,
}

fn run_server(
    listener: TcpListener,
    cfg: ServerConfig,
    dashboard: Dashboard,
    shutdown: Arc<AtomicBool>,
) -> Result<()> {
    let mut state = ServerState {
        cfg,
        dashboard,
        display: DisplaySlot::new(),
    };
    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        match listener.accept() {
            Ok((stream, _)) => {
                if let Err(err) = handle_connection(stream, &mut state) {
                    log::warn!("dashboard request failed: {}", err);
                }
            }
            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(Duration::from_millis(50));
                continue;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

fn handle_connection(mut stream: TcpStream, state: &mut ServerState) -> Result<()> {
    let peer = stream.peer_addr()?;
    let local = stream.local_addr()?;
    if local.ip().is_loopback() && !peer.ip().is_loopback() {
        return Response::json(403, json!({"error": "forbidden"})).write_to(&mut stream);
    }

    let request = read_request(&mut stream)?;
    log::debug!("{} {}", request.method, request.raw_path);
    let response = match route(&request, state) {
        Ok(response) => response,
        Err(err) => {
            log::error!("{} {} failed: {:#}", request.method, request.path, err);
            Response::json(500, json!({"error": "internal"}))
        }
    };
    response.write_to(&mut stream)
}

fn route(request: &HttpRequest, state: &mut ServerState) -> Result<Response> {
    let path = request.path.as_str();
    let method = request.method.as_str();

    let allowed = match path {
        "/play" => "POST",
        "/health" | "/" | "/frame.png" | "/heatmap.png" | "/counts" | "/feedback"
        | "/download/presentation" => "GET",
        _ if path.starts_with("/pages/") || path.starts_with("/assets/") => "GET",
        _ => return Ok(Response::json(404, json!({"error": "not_found"}))),
    };
    if method != allowed {
        return Ok(Response::json(405, json!({"error": "method_not_allowed"})));
    }

    match path {
        "/health" => Ok(Response::json(200, json!({"status": "ok"}))),
        "/" => {
            let page = match request.query("page") {
                Some(slug) => match Page::from_slug(slug) {
                    Some(page) => page,
                    None => return Ok(Response::json(404, json!({"error": "unknown_page"}))),
                },
                None => Page::default(),
            };
            render_page(state, page, request.query("play") == Some("1"))
        }
        "/play" => {
            let ServerState {
                dashboard, display, ..
            } = state;
            match dashboard.play(display) {
                Ok(report) => Ok(Response::json(200, json!(report))),
                Err(err) => Ok(Response::json(
                    503,
                    json!({"error": "video_unavailable", "detail": format!("{:#}", err)}),
                )),
            }
        }
        "/frame.png" => match state.display.current() {
            Some(frame) => Ok(Response::new(200, "image/png", frame.to_png()?)),
            None => Ok(Response::json(404, json!({"error": "no_frame"}))),
        },
        "/heatmap.png" => {
            let frame = generate_heatmap(&mut rand::thread_rng())?;
            Ok(Response::new(200, "image/png", frame.to_png()?))
        }
        "/counts" => Ok(Response::json(
            200,
            json!({
                "counts": REFERENCE_COUNTS,
                "detected": REFERENCE_COUNTS.detected_labels(),
                "live_crowd_count": live_crowd_count(&mut rand::thread_rng()),
            }),
        )),
        "/feedback" => {
            let raw = request.query("rating").unwrap_or_default();
            match Rating::parse(raw) {
                Ok(rating) => Ok(Response::json(
                    200,
                    json!({
                        "rating": rating.stars(),
                        "message": rating.acknowledgement(),
                        "more": PROFILE_LINK,
                    }),
                )),
                Err(err) => Ok(Response::json(
                    400,
                    json!({"error": "invalid_rating", "detail": err.to_string()}),
                )),
            }
        }
        "/download/presentation" => {
            let name = state.cfg.presentation.clone();
            match read_asset(&state.cfg.assets_dir, &name)? {
                Some(body) => {
                    let mut response = Response::new(200, content_type_for(&name), body);
                    response.attachment = Some(PRESENTATION_FILE_NAME.to_string());
                    Ok(response)
                }
                None => Ok(Response::json(404, json!({"error": "not_found"}))),
            }
        }
        _ => {
            if let Some(slug) = path.strip_prefix("/pages/") {
                return match Page::from_slug(slug) {
                    Some(page) => render_page(state, page, request.query("play") == Some("1")),
                    None => Ok(Response::json(404, json!({"error": "unknown_page"}))),
                };
            }
            let name = path.strip_prefix("/assets/").unwrap_or_default();
            match read_asset(&state.cfg.assets_dir, name)? {
                Some(body) => Ok(Response::new(200, content_type_for(name), body)),
                None => Ok(Response::json(404, json!({"error": "not_found"}))),
            }
        }
    }
}

fn render_page(state: &mut ServerState, page: Page, play: bool) -> Result<Response> {
    let request = PageRequest { page, play };
    let view = match state
        .dashboard
        .render(request, &mut state.display, &mut rand::thread_rng())
    {
        Ok(view) => view,
        Err(err) => {
            log::warn!("page {} unavailable: {:#}", page.slug(), err);
            let body = format!(
                "<!DOCTYPE html><html><body><h1>Video unavailable</h1><p>{}</p></body></html>",
                crate::html::escape(&format!("{:#}", err))
            );
            return Ok(Response::new(503, "text/html; charset=utf-8", body.into_bytes()));
        }
    };
    let body = render_document(&view)?;
    Ok(Response::new(200, "text/html; charset=utf-8", body.into_bytes()))
}

/// Read `name` from `dir`. Names with path separators or dot prefixes are refused.
fn read_asset(dir: &Path, name: &str) -> Result<Option<Vec<u8>>> {
    if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
        return Ok(None);
    }
    match std::fs::read(dir.join(name)) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn content_type_for(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "mp4" => "video/mp4",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        _ => "application/octet-stream",
    }
}

struct Response {
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
    attachment: Option<String>,
}

impl Response {
    fn new(status: u16, content_type: &'static str, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type,
            body,
            attachment: None,
        }
    }

    fn json(status: u16, value: serde_json::Value) -> Self {
        Self::new(status, "application/json", value.to_string().into_bytes())
    }

    fn write_to(&self, stream: &mut TcpStream) -> Result<()> {
        let status_line = match self.status {
            200 => "HTTP/1.1 200 OK",
            400 => "HTTP/1.1 400 Bad Request",
            403 => "HTTP/1.1 403 Forbidden",
            404 => "HTTP/1.1 404 Not Found",
            405 => "HTTP/1.1 405 Method Not Allowed",
            503 => "HTTP/1.1 503 Service Unavailable",
            _ => "HTTP/1.1 500 Internal Server Error",
        };
        let mut header = format!(
            "{status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {len}\r\nCache-Control: no-store\r\nConnection: close\r\n",
            status_line = status_line,
            content_type = self.content_type,
            len = self.body.len()
        );
        if let Some(file_name) = &self.attachment {
            header.push_str(&format!(
                "Content-Disposition: attachment; filename=\"{}\"\r\n",
                file_name
            ));
        }
        header.push_str("\r\n");
        stream.write_all(header.as_bytes())?;
        stream.write_all(&self.body)?;
        Ok(())
    }
}

fn read_request(stream: &mut TcpStream) -> Result<HttpRequest> {
    stream.set_read_timeout(Some(Duration::from_secs(2)))?;
    let mut buf = [0u8; 1024];
    let mut data = Vec::new();
    loop {
        let n = stream.read(&mut buf)?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
        if data.len() > MAX_REQUEST_BYTES {
            return Err(anyhow!("request too large"));
        }
        if data.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }
    let text = String::from_utf8_lossy(&data);
    let request_line = text.split("\r\n").next().ok_or_else(|| anyhow!("empty request"))?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().ok_or_else(|| anyhow!("missing method"))?;
    let raw_path = parts.next().ok_or_else(|| anyhow!("missing path"))?;
    let path = raw_path.split('?').next().unwrap_or(raw_path).to_string();
    Ok(HttpRequest {
        method: method.to_string(),
        path,
        raw_path: raw_path.to_string(),
    })
}

#[derive(Debug)]
struct HttpRequest {
    method: String,
    path: String,
    raw_path: String,
}

impl HttpRequest {
    fn query(&self, key: &str) -> Option<&str> {
        let query = self.raw_path.split_once('?')?.1;
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(raw_path: &str) -> HttpRequest {
        HttpRequest {
            method: "GET".to_string(),
            path: raw_path.split('?').next().unwrap().to_string(),
            raw_path: raw_path.to_string(),
        }
    }

    #[test]
    fn query_params_are_found() {
        let req = request("/pages/home?play=1&rating=4");
        assert_eq!(req.query("play"), Some("1"));
        assert_eq!(req.query("rating"), Some("4"));
        assert_eq!(req.query("page"), None);
        assert_eq!(request("/").query("play"), None);
    }

    #[test]
    fn asset_names_are_sandboxed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("image1.jpeg"), b"jpeg").unwrap();
        assert_eq!(
            read_asset(dir.path(), "image1.jpeg").unwrap(),
            Some(b"jpeg".to_vec())
        );
        assert_eq!(read_asset(dir.path(), "missing.png").unwrap(), None);
        assert_eq!(read_asset(dir.path(), "../etc/passwd").unwrap(), None);
        assert_eq!(read_asset(dir.path(), ".hidden").unwrap(), None);
        assert_eq!(read_asset(dir.path(), "").unwrap(), None);
    }

    #[test]
    fn content_types_follow_extension() {
        assert_eq!(content_type_for("a.JPG"), "image/jpeg");
        assert_eq!(content_type_for("b.png"), "image/png");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }
}
