use thriftify_common::advisor::generators::{GeminiGenerator, GeminiSettings, MockGenerator};
use thriftify_common::advisor::GenerateText;
use thriftify_common::db::memory::InMemoryStore;
use thriftify_common::db::{self, BudgetStore, CredentialStore, SpendingLogStore};
use thriftify_common::illustrator::crawlers::{MockCrawler, WebImageCrawler};
use thriftify_common::illustrator::FetchImage;
use thriftify_common::session::{InMemorySessionStore, SessionStore};

use actix_web::web::Data;
use actix_web::{App, HttpServer};
use flexi_logger::{
    Age, Cleanup, Criterion, Duplicate, FileSpec, LogSpecification, Logger, Naming, WriteMode,
};
use once_cell::sync::Lazy;
use std::sync::Arc;

mod env;
mod handlers;
mod middleware;
mod services;

use handlers::ImageRoot;

const GENERATION_TEMPERATURE: f32 = 1.0;
const GENERATION_TOP_P: f32 = 0.95;
const GENERATION_MAX_OUTPUT_TOKENS: u32 = 8192;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let mut port = 9000u16;
    let mut conf_file_path: Option<String> = None;

    let mut args = std::env::args();

    // Eat the first argument, which is the relative path to the executable
    args.next();

    while let Some(arg) = args.next() {
        match arg.to_lowercase().as_str() {
            "--port" => {
                let Some(port_str) = args.next() else {
                    eprintln!("ERROR: --port option specified but no port was given");
                    std::process::exit(1);
                };

                port = match port_str.parse::<u16>() {
                    Ok(p) => p,
                    Err(_) => {
                        eprintln!("ERROR: Incorrect format for port. Integer expected");
                        std::process::exit(1);
                    }
                };
            }
            "--config" => {
                let Some(path) = args.next() else {
                    eprintln!("ERROR: --config option specified but no config file path was given");
                    std::process::exit(1);
                };

                conf_file_path = Some(path);
            }
            a => {
                eprintln!("ERROR: Invalid argument: {}", &a);
                std::process::exit(1);
            }
        }
    }

    let conf_file_path = conf_file_path.unwrap_or(String::from(".env"));
    match dotenvy::from_path(&conf_file_path) {
        Ok(()) => (),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            eprintln!("WARNING: No config file at '{conf_file_path}'. Using the environment only.");
        }
        Err(e) => {
            eprintln!("ERROR: Failed to read config file '{conf_file_path}': {e}");
            std::process::exit(1);
        }
    }

    Lazy::force(&env::CONF);

    let log_spec = match LogSpecification::parse(&env::CONF.log_level) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("ERROR: Invalid log level '{}': {e}", env::CONF.log_level);
            std::process::exit(1);
        }
    };

    let _logger = Logger::with(log_spec)
        .log_to_file(FileSpec::default().directory("./logs"))
        .rotate(
            Criterion::Age(Age::Day),
            Naming::Timestamps,
            Cleanup::KeepLogAndCompressedFiles(60, 365),
        )
        .cleanup_in_background_thread(true)
        .duplicate_to_stdout(Duplicate::All)
        .write_mode(WriteMode::Async)
        .format(|writer, now, record| {
            write!(
                writer,
                "{:5} | {} | {}:{} | {}",
                record.level(),
                now.format("%Y-%m-%dT%H:%M:%S%.6fZ"),
                record.module_path().unwrap_or("<unknown>"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .use_utc()
        .start()
        .expect("Failed to start logger");

    let actix_workers = env::CONF.actix_worker_count;

    let (credential_store, budget_store, spending_log_store): (
        Arc<dyn CredentialStore>,
        Arc<dyn BudgetStore>,
        Arc<dyn SpendingLogStore>,
    ) = match env::CONF.db_uri.as_deref() {
        Some(db_uri) => {
            log::info!("Connecting to database...");

            // To prevent resource starvation, max connections must be at least as large as the
            // number of actix workers
            let db_max_connections = env::CONF.db_max_connections.max(actix_workers as u32);

            let db_thread_pool = match db::create_db_thread_pool(
                db_uri,
                db_max_connections,
                env::CONF.db_idle_timeout,
            ) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("ERROR: Failed to connect to database: {e}");
                    std::process::exit(1);
                }
            };

            log::info!("Successfully connected to database");

            (
                Arc::new(db::credential::Dao::new(&db_thread_pool)),
                Arc::new(db::budget::Dao::new(&db_thread_pool)),
                Arc::new(db::spending_log::Dao::new(&db_thread_pool)),
            )
        }
        None => {
            log::warn!("No database configured. Data will be kept in memory and lost on exit.");

            let store = Arc::new(InMemoryStore::new());
            (store.clone(), store.clone(), store)
        }
    };

    let session_store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());

    let generator: Arc<dyn GenerateText> = if env::CONF.ai_enabled {
        let settings = GeminiSettings {
            endpoint: env::CONF.ai_endpoint.clone(),
            model: env::CONF.ai_model.clone(),
            api_key: env::CONF.ai_api_key.clone(),
            temperature: GENERATION_TEMPERATURE,
            top_p: GENERATION_TOP_P,
            max_output_tokens: GENERATION_MAX_OUTPUT_TOKENS,
            timeout: env::CONF.ai_timeout,
        };

        match GeminiGenerator::new(settings) {
            Ok(g) => Arc::new(g),
            Err(e) => {
                eprintln!("ERROR: Failed to create text generator: {e}");
                std::process::exit(1);
            }
        }
    } else {
        log::info!("AI generation is disabled. Using mock text generator.");
        Arc::new(MockGenerator::new())
    };

    let fetcher: Arc<dyn FetchImage> = if env::CONF.crawler_enabled {
        match WebImageCrawler::new(&env::CONF.image_search_url, env::CONF.crawler_timeout) {
            Ok(c) => Arc::new(c),
            Err(e) => {
                eprintln!("ERROR: Failed to create image crawler: {e}");
                std::process::exit(1);
            }
        }
    } else {
        log::info!("Image crawling is disabled. Using mock image crawler.");
        Arc::new(MockCrawler::new())
    };

    if let Err(e) = std::fs::create_dir_all(&env::CONF.image_root) {
        log::warn!(
            "Failed to create image directory {}: {e}",
            env::CONF.image_root.display()
        );
    }

    let image_root = ImageRoot(env::CONF.image_root.clone());

    let base_addr = format!("127.0.0.1:{}", &port);
    log::info!("Listening on {base_addr}");

    HttpServer::new(move || {
        App::new()
            .app_data(Data::from(credential_store.clone()))
            .app_data(Data::from(budget_store.clone()))
            .app_data(Data::from(spending_log_store.clone()))
            .app_data(Data::from(session_store.clone()))
            .app_data(Data::from(generator.clone()))
            .app_data(Data::from(fetcher.clone()))
            .app_data(Data::new(image_root.clone()))
            .configure(services::configure)
            .wrap(actix_web::middleware::Logger::default())
    })
    .workers(actix_workers)
    .bind(base_addr)?
    .run()
    .await?;

    unsafe {
        env::CONF.zeroize();
    }

    Ok(())
}
