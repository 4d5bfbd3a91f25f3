use std::future::Future;
use std::io;
use std::io::ErrorKind;
use std::sync::Arc;

use chrono::Duration;
use ntex::web;
use ntex::web::HttpRequest;
use ntex_files::NamedFile;
use spdlog::{error, info, warn};

use crate::adjacent::{self, AdjacentPosts};
use crate::config::{Config, ContentApiKind};
use crate::content::projection::{project_summary, try_project_post};
use crate::content_api::memory::MemoryRepository;
use crate::content_api::prismic::PrismicClient;
use crate::content_api::ContentApi;
use crate::error::ContentError;
use crate::page_cache::{Lookup, PageCache};
use crate::pagination::{first_page, load_feed, load_next_page};
use crate::preview::{enter_cookie, exit_cookie, exit_redirect_target, PreviewContext};
use crate::query_string::QueryString;
use crate::reading_time::estimate_minutes;
use crate::view::{post_link, Views};

pub struct AppState {
    pub config: Config,
    pub api: Arc<dyn ContentApi>,
    pub pages: PageCache,
    pub views: Views,
}

type SharedState = web::types::State<Arc<AppState>>;

fn preview_context(req: &HttpRequest) -> PreviewContext {
    let cookies = req.headers().get("cookie").and_then(|v| v.to_str().ok());
    PreviewContext::from_cookie_header(cookies)
}

fn query_string(req: &HttpRequest) -> QueryString {
    QueryString::from(req.uri().query().unwrap_or_default())
}

fn html_response(body: &str) -> web::HttpResponse {
    web::HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body.to_string())
}

fn error_response(state: &AppState, err: &ContentError, uid: &str, preview: bool) -> web::HttpResponse {
    match err {
        ContentError::NotFound(_) | ContentError::MalformedDocument(_) => {
            info!("Not found: {} ({})", uid, err);
            web::HttpResponse::NotFound()
                .content_type("text/html; charset=utf-8")
                .body(state.views.not_found.render(uid, preview, &state.config.site.title))
        }
        ContentError::Fetch(_) => {
            error!("{}", err);
            web::HttpResponse::BadGateway()
                .body("Error loading content, please try again")
        }
        ContentError::InvalidCursor => web::HttpResponse::BadRequest()
            .body(err.to_string()),
        ContentError::Template(_) => {
            error!("{}", err);
            web::HttpResponse::InternalServerError()
                .body(err.to_string())
        }
    }
}

async fn render_home(state: Arc<AppState>, preview: PreviewContext, pages: u32) -> Result<String, ContentError> {
    let api = state.api.as_ref();
    let doc_type = state.config.content_api.document_type.as_str();

    let first = first_page(api, doc_type, state.config.defaults.page_size, &preview).await?;
    let feed = load_feed(api, first, pages).await;
    info!("Rendered home with {} posts from {} pages", feed.posts().len(), feed.pages_loaded());

    Ok(state.views.home.render(&feed, preview.active, &state.config.site.title))
}

async fn render_post(state: Arc<AppState>, preview: PreviewContext, uid: String) -> Result<String, ContentError> {
    let api = state.api.as_ref();
    let doc_type = state.config.content_api.document_type.as_str();

    let doc = api.get_by_uid(doc_type, &uid, preview.revision_ref()).await?
        .ok_or_else(|| ContentError::NotFound(uid.clone()))?;
    let post = try_project_post(&doc)?;

    let adjacent = match post.first_publication_date {
        Some(published_at) => match adjacent::resolve(api, doc_type, &preview, &doc.id, published_at).await {
            Ok(adjacent) => adjacent,
            Err(e) => {
                warn!("Rendering {} without navigation: {}", uid, e);
                AdjacentPosts::default()
            }
        },
        None => AdjacentPosts::default(),
    };

    let reading_time = estimate_minutes(&post.content);
    info!("Rendered post {} ({} min read)", uid, reading_time);

    Ok(state.views.post.render(&post, reading_time, &adjacent, preview.active, &state.config.site.title))
}

/// Serves `key` from the page cache. Stale pages are returned right away
/// while one background task renders the replacement.
async fn serve_cached<F, Fut>(state: Arc<AppState>, key: String, revalidate: Duration, render: F) -> Result<Arc<String>, ContentError>
where
    F: FnOnce(Arc<AppState>) -> Fut + 'static,
    Fut: Future<Output = Result<String, ContentError>> + 'static,
{
    match state.pages.lookup(&key) {
        Lookup::Fresh(body) => Ok(body),
        Lookup::Stale(body) => {
            if state.pages.begin_regeneration(&key) {
                let state = state.clone();
                let _ = ntex::rt::spawn(async move {
                    info!("Regenerating {}", key);
                    match render(state.clone()).await {
                        Ok(page) => {
                            state.pages.store(&key, page, revalidate);
                        }
                        Err(ContentError::NotFound(_)) => state.pages.remove(&key),
                        Err(e) => error!("Error regenerating {}, keeping stale page: {}", key, e),
                    }
                    state.pages.end_regeneration(&key);
                });
            }
            Ok(body)
        }
        Lookup::Missing => {
            let page = render(state.clone()).await?;
            Ok(state.pages.store(&key, page, revalidate))
        }
    }
}

#[web::get("/")]
async fn index(req: HttpRequest, state: SharedState) -> web::HttpResponse {
    let state = Arc::clone(&state);
    let preview = preview_context(&req);
    let pages = query_string(&req).get_pages(state.config.defaults.max_pages());

    let result = if preview.active {
        render_home(state.clone(), preview.clone(), pages).await.map(Arc::new)
    } else {
        let revalidate = Duration::seconds(state.config.revalidate.home_secs);
        serve_cached(state.clone(), PageCache::home_key(pages), revalidate, move |state| {
            render_home(state, PreviewContext::published(), pages)
        }).await
    };

    match result {
        Ok(body) => html_response(&body),
        Err(e) => error_response(&state, &e, "", preview.active),
    }
}

#[web::get("/post/{uid}")]
async fn post_view(req: HttpRequest, uid: web::types::Path<String>, state: SharedState) -> web::HttpResponse {
    let state = Arc::clone(&state);
    let uid = uid.into_inner();
    let preview = preview_context(&req);

    let result = if preview.active {
        render_post(state.clone(), preview.clone(), uid.clone()).await.map(Arc::new)
    } else {
        let revalidate = Duration::seconds(state.config.revalidate.post_secs);
        let post_uid = uid.clone();
        serve_cached(state.clone(), PageCache::post_key(&uid), revalidate, move |state| {
            render_post(state, PreviewContext::published(), post_uid)
        }).await
    };

    match result {
        Ok(body) => html_response(&body),
        Err(e) => error_response(&state, &e, &uid, preview.active),
    }
}

#[web::get("/api/posts")]
async fn posts_page(req: HttpRequest, state: SharedState) -> web::HttpResponse {
    let qs = query_string(&req);
    let Some(cursor) = qs.get("cursor") else {
        return web::HttpResponse::BadRequest().body("Missing cursor");
    };

    match load_next_page(state.api.as_ref(), cursor).await {
        Ok(page) => match serde_json::to_string(&page) {
            Ok(json) => web::HttpResponse::Ok()
                .content_type("application/json")
                .body(json),
            Err(e) => web::HttpResponse::InternalServerError()
                .body(format!("Error encoding page: {}", e)),
        },
        Err(e) => error_response(&state, &e, "", false),
    }
}

#[web::get("/api/preview")]
async fn enter_preview(req: HttpRequest, state: SharedState) -> web::HttpResponse {
    let qs = query_string(&req);
    let Some(token) = qs.get("token") else {
        return web::HttpResponse::BadRequest().body("Missing preview token");
    };

    let doc_type = state.config.content_api.document_type.as_str();
    let location = match qs.get("documentId") {
        None => "/".to_string(),
        Some(id) => match state.api.get_by_id(id, Some(token)).await {
            Ok(Some(doc)) if doc.doc_type == doc_type => project_summary(&doc)
                .map(|post| post_link(&post.uid))
                .unwrap_or_else(|| "/".to_string()),
            Ok(_) => "/".to_string(),
            Err(e) => {
                warn!("Could not resolve preview document {}: {}", id, e);
                "/".to_string()
            }
        },
    };

    info!("Entering preview, redirecting to {}", location);
    web::HttpResponse::TemporaryRedirect()
        .header("Location", location)
        .header("Set-Cookie", enter_cookie(token))
        .finish()
}

#[web::get("/api/exit-preview")]
async fn exit_preview(req: HttpRequest, state: SharedState) -> web::HttpResponse {
    let referer = req.headers().get("referer").and_then(|v| v.to_str().ok());
    let location = exit_redirect_target(referer, state.config.site.url.as_deref());

    web::HttpResponse::TemporaryRedirect()
        .header("Location", location)
        .header("Set-Cookie", exit_cookie())
        .finish()
}

#[web::get("/public/{file_name}")]
async fn public_files(path: web::types::Path<String>, state: SharedState) -> Result<NamedFile, web::Error> {
    if path.contains("..") {
        return Err(web::error::ErrorForbidden("Access forbidden").into());
    }

    let file_path = state.config.paths.public_dir.join(path.into_inner());
    Ok(NamedFile::open(file_path)?)
}

pub fn build_api(config: &Config) -> io::Result<Arc<dyn ContentApi>> {
    let api_config = &config.content_api;
    match api_config.kind {
        ContentApiKind::Prismic => {
            let endpoint = api_config.endpoint.as_deref()
                .ok_or_else(|| io::Error::new(ErrorKind::InvalidInput, "Missing content API endpoint"))?;
            info!("Reading content from {}", endpoint);
            Ok(Arc::new(PrismicClient::new(endpoint, api_config.access_token.clone(), api_config.timeout())))
        }
        ContentApiKind::Fixture => {
            let fixture = api_config.fixture.as_deref()
                .ok_or_else(|| io::Error::new(ErrorKind::InvalidInput, "Missing fixture path"))?;
            info!("Reading content from fixture {}", fixture.display());
            Ok(Arc::new(MemoryRepository::from_file(fixture)?))
        }
    }
}

pub async fn server_run(config: Config) -> io::Result<()> {
    let api = build_api(&config)?;
    let views = Views::load(&config.paths.template_dir)
        .map_err(|e| io::Error::new(ErrorKind::InvalidData, e.to_string()))?;

    let bind_addr = config.server.address.clone();
    let bind_port = config.server.port;
    let app_state = Arc::new(AppState {
        config,
        api,
        pages: PageCache::new(),
        views,
    });

    web::HttpServer::new(move || {
        web::App::new()
            .state(app_state.clone())
            .service(index)
            .service(post_view)
            .service(posts_page)
            .service(enter_preview)
            .service(exit_preview)
            .service(public_files)
    })
        .bind((bind_addr, bind_port))?
        .run()
        .await
}
