mod api;
mod config;
mod datastore;
mod metrics;
mod social;
mod twoface;

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate prometheus;
#[macro_use]
extern crate guard;
#[macro_use]
extern crate diesel;

use crate::api::forms::RegisterForm;
use crate::config::{AdminAccount, Config};
use crate::datastore::{postgres::PostgresStore, UserStore};
use crate::twoface::{Cause, Fallible};
use actix_service::Service;
use actix_web::{dev::ServiceResponse, middleware, web, App, HttpServer};
use datastore::postgres;
use futures::future::FutureExt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};

#[allow(clippy::cognitive_complexity)]
fn main() {
    let args: Vec<_> = std::env::args().collect();
    guard!(let [_, config_file_path, ..] = &args[..] else {
        eprintln!("First argument should be path to config file");
        return
    });

    let config = Config::from_file(config_file_path);

    // Set up logger output
    let subscriber_builder = tracing_subscriber::fmt().with_max_level(Level::DEBUG);
    if config.human_logs {
        subscriber_builder.init();
    } else {
        subscriber_builder.json().init();
    }

    info!("starting murmur");

    let mut sys = actix_rt::System::new("murmur");

    // Build the postgres client
    let db = PostgresStore::new(
        postgres::Dsn::new(&config),
        config.db_pool_size,
        Duration::from_secs(config.db_connection_timeout),
    )
    .expect("couldn't connect to Postgres");
    db.initialize().expect("couldn't create database schema");
    prometheus::register(Box::new(db.clone())).expect("couldn't register DB metrics");

    if let Some(admin) = &config.bootstrap_admin {
        let (db, admin) = (db.clone(), admin.clone());
        sys.block_on(async move { bootstrap_admin(&db, &admin).await })
            .expect("couldn't create the bootstrap admin");
    }

    let state = api::State {
        ds: Arc::new(db),
        sessions: api::auth::Sessions::new(&config.session_secret, config.session_ttl_secs),
    };

    // Start the userfacing API server
    info!(
        addr = &config.listen_address[..],
        "starting userfacing API server"
    );
    let max_body_size = config.max_body_size;
    HttpServer::new(move || {
        App::new()
            // Middleware for Prometheus
            .wrap_fn(|request, srv| srv.call(request).map(increment_response_metrics))
            .data(state.clone())
            // enable logger
            .wrap(middleware::Logger::default())
            // limit size of the payload (global configuration)
            .app_data(web::JsonConfig::default().limit(max_body_size))
            .service(web::scope("/admin").configure(api::admin::configure::<PostgresStore>))
            .configure(api::userfacing::configure::<PostgresStore>)
    })
    .bind(config.listen_address.clone())
    .expect("couldn't start userfacing HTTP server")
    .run();

    // Start the metrics server
    info!(
        addr = &config.metrics_address[..],
        "starting metrics server"
    );
    HttpServer::new(|| {
        App::new().service(
            web::scope("/metrics")
                .service(web::resource("/").route(web::get().to(metrics::endpoint::gather)))
                .service(web::resource("").route(web::get().to(metrics::endpoint::gather))),
        )
    })
    .bind(config.metrics_address)
    .expect("couldn't start metrics server")
    .run();

    sys.run().expect("actix runtime terminated");
}

/// Make sure the configured admin account exists. It's fine if it already does.
/// The account has to pass the same checks as a registration form.
async fn bootstrap_admin<DS: UserStore>(db: &DS, admin: &AdminAccount) -> Fallible<()> {
    RegisterForm {
        username: admin.username.clone(),
        email: admin.email.clone(),
        password: admin.password.clone(),
        password2: admin.password.clone(),
    }
    .validate()?;
    let created =
        social::credentials::create_user(db, &admin.username, &admin.email, &admin.password, true)
            .await;
    match created {
        Ok(user) => {
            info!(username = %user.username, "created bootstrap admin");
            Ok(())
        }
        Err(e) if e.cause() == Cause::UserConflict => {
            warn!(username = %admin.username, "bootstrap admin already exists");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// If response is OK, increment the metrics for HTTP statuses.
fn increment_response_metrics<E, B>(
    response: Result<ServiceResponse<B>, E>,
) -> Result<ServiceResponse<B>, E> {
    match response {
        Ok(response) => {
            metrics::HTTP_RESPONSES
                .with_label_values(&[response.status().as_str()])
                .inc();
            Ok(response)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::mock;

    fn admin(username: &str) -> AdminAccount {
        AdminAccount {
            username: username.to_owned(),
            email: "jason@example.com".to_owned(),
            password: "password".to_owned(),
        }
    }

    #[actix_rt::test]
    async fn test_bootstrap_admin_runs_twice() {
        let ds = mock::Client::default();
        bootstrap_admin(&ds, &admin("jason")).await.unwrap();
        bootstrap_admin(&ds, &admin("jason")).await.unwrap();
        assert_eq!(ds.user_count(), 1);
        let jason = ds
            .find_user_by_username("JASON".to_owned())
            .await
            .unwrap()
            .unwrap();
        assert!(jason.is_admin);
    }

    #[actix_rt::test]
    async fn test_bootstrap_admin_needs_a_valid_username() {
        let ds = mock::Client::default();
        for bad in &["jäson", "jason smith", ""] {
            let err = bootstrap_admin(&ds, &admin(bad)).await.unwrap_err();
            assert_eq!(err.cause(), Cause::UserInvalidField);
        }
        assert_eq!(ds.user_count(), 0);
    }
}
