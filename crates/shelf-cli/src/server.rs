use actix_web::http::StatusCode;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use anyhow::Context;
use shelf_crawler::{Fetcher, HttpFetcher};
use shelf_dataset::{Buckets, GcsBuckets};

use crate::config::{AppConfig, CleanParams};
use crate::run::Reply;
use crate::trigger;

pub struct AppState<F, B> {
    pub config: AppConfig,
    pub fetcher: F,
    pub buckets: B,
    /// Bucket receiving the raw dataset of `/scrape`
    pub bucket: String,
}

/// Registers `/scrape` and `/clean`, both answering GET and POST.
pub fn routes<F, B>(cfg: &mut web::ServiceConfig)
where
    F: Fetcher + 'static,
    B: Buckets + 'static,
{
    cfg.service(
        web::resource("/scrape")
            .route(web::get().to(scrape::<F, B>))
            .route(web::post().to(scrape::<F, B>)),
    )
    .service(
        web::resource("/clean")
            .route(web::get().to(clean::<F, B>))
            .route(web::post().to(clean::<F, B>)),
    );
}

async fn scrape<F, B>(state: web::Data<AppState<F, B>>) -> HttpResponse
where
    F: Fetcher + 'static,
    B: Buckets + 'static,
{
    let store = state.buckets.bucket(&state.bucket);
    respond(trigger::scrape(&state.config, &state.fetcher, &store).await)
}

async fn clean<F, B>(
    state: web::Data<AppState<F, B>>,
    req: HttpRequest,
    body: web::Bytes,
) -> HttpResponse
where
    F: Fetcher + 'static,
    B: Buckets + 'static,
{
    let query = match web::Query::<CleanParams>::from_query(req.query_string()) {
        Ok(query) => query.into_inner(),
        Err(e) => {
            log::warn!("Ignoring query string {:?}: {e}", req.query_string());
            CleanParams::default()
        }
    };
    // A body that isn't a json object is ignored
    let body = serde_json::from_slice::<CleanParams>(&body).unwrap_or_default();
    respond(trigger::clean(&state.config, &state.buckets, body, query).await)
}

fn respond(reply: Reply) -> HttpResponse {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status)
        .content_type(reply.content_type)
        .body(reply.body)
}

/// Serves the triggered runs until the process is interrupted.
pub fn serve(config: AppConfig, bind: &str) -> anyhow::Result<()> {
    let bucket = config
        .storage
        .bucket
        .clone()
        .context("No bucket configured for scraped data, use --bucket or storage.bucket")?;
    let fetcher = HttpFetcher::new(&config.crawler)?;
    let buckets = GcsBuckets::new(&config.storage.endpoint, config.storage.token.clone())?;

    let state = web::Data::new(AppState {
        config,
        fetcher,
        buckets,
        bucket,
    });

    log::info!("Listening on {bind}");
    actix_web::rt::System::new().block_on(async move {
        HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .configure(routes::<HttpFetcher, GcsBuckets>)
        })
        .bind(bind)?
        .run()
        .await
    })?;

    Ok(())
}
