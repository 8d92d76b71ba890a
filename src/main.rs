use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::net::TcpListener;
use viewkit::config::{self, Config};
use viewkit::http::{self as vhttp, Body};
use viewkit::render::{self, TemplateRenderer};
use viewkit::{logger, EmbeddedAssets, StaticFiles};

/// Assets compiled into the binary, keyed by path relative to the mount prefix
const ASSETS: &[(&str, &[u8])] = &[
    ("index.html", include_bytes!("../assets/index.html").as_slice()),
    ("app.js", include_bytes!("../assets/app.js").as_slice()),
    ("css/site.css", include_bytes!("../assets/css/site.css").as_slice()),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg.logging).map_err(|e| e as Box<dyn std::error::Error>)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = TcpListener::bind(addr).await?;

    let renderer = Arc::new(TemplateRenderer::new(cfg.render.clone()));
    let statics = StaticFiles::new(EmbeddedAssets::new(ASSETS), cfg.assets.clone());

    logger::log_server_start(&addr, &cfg);

    loop {
        let (stream, _peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                logger::log_error(&format!("Failed to accept connection: {e}"));
                continue;
            }
        };

        let renderer = Arc::clone(&renderer);
        let app = service_fn(move |req| handle_request(req, Arc::clone(&renderer)));
        let service = statics.wrap(app);

        tokio::spawn(async move {
            let io = TokioIo::new(stream);
            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                logger::log_connection_error(&err);
            }
        });
    }
}

/// Downstream of the static middleware: the rendered home page, 404 otherwise
async fn handle_request(
    req: Request<Incoming>,
    renderer: Arc<TemplateRenderer>,
) -> Result<Response<Body>, Infallible> {
    let (head, _body) = req.into_parts();
    if head.uri.path() != "/" || !(head.method == Method::GET || head.method == Method::HEAD) {
        return Ok(vhttp::build_404_response());
    }

    let data = json!({
        "title": "viewkit",
        "path": head.uri.path(),
        "assets": asset_paths(),
    });
    Ok(renderer
        .render_response("index.html", &data, &head)
        .unwrap_or_else(|err| render::render_error_response(&err)))
}

fn asset_paths() -> Vec<&'static str> {
    ASSETS.iter().map(|(path, _)| *path).collect()
}
