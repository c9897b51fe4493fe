lazy_static! {

    pub static ref HANDLER_SECS: prometheus::HistogramVec = register_histogram_vec!(
        "murmur_handler_secs",
        "Seconds taken for each response, partitioned by endpoint name",
        &["endpoint_name"],
        vec![0.01, 0.05, 0.25, 1.0, 4.0] // Prometheus buckets
    )
    .expect("couldn't make HANDLER_SECS");

    pub static ref RESPONSES: prometheus::IntCounterVec = register_int_counter_vec!(
        "murmur_responses",
        "How many responses of Ok/Err per endpoint",
        &["endpoint_name", "result"]
    )
    .expect("couldn't make RESPONSES");

    pub static ref HTTP_RESPONSES: prometheus::IntCounterVec = register_int_counter_vec!(
        "murmur_http_responses",
        "Count of each HTTP status code served by murmur responses",
        &["status"]
    )
    .expect("couldn't make HTTP_RESPONSES");

    pub static ref USERS_REGISTERED: prometheus::IntCounter = register_int_counter!(
        "murmur_users_registered",
        "How many users have registered"
    )
    .expect("couldn't make USERS_REGISTERED");

    pub static ref POSTS_CREATED: prometheus::IntCounter = register_int_counter!(
        "murmur_posts_created",
        "How many posts have been written"
    )
    .expect("couldn't make POSTS_CREATED");

    pub static ref GRAPH_CHANGES: prometheus::IntCounterVec = register_int_counter_vec!(
        "murmur_graph_changes",
        "Follow and unfollow requests served",
        &["change"]
    )
    .expect("couldn't make GRAPH_CHANGES");
}

pub mod endpoint {
    use actix_web::{http, HttpRequest, HttpResponse};
    use prometheus::Encoder;

    pub async fn gather(_req: HttpRequest) -> HttpResponse {
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = vec![];
        let metric_families = prometheus::gather();
        match encoder.encode(&metric_families, &mut buffer) {
            Ok(()) => HttpResponse::build(http::StatusCode::OK)
                .content_type(encoder.format_type())
                .body(buffer),
            Err(e) => {
                let message = format!("{:?}", e);
                HttpResponse::build(http::StatusCode::INTERNAL_SERVER_ERROR).body(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, web, App};

    #[actix_rt::test]
    async fn test_gather_exposes_murmur_metrics() {
        POSTS_CREATED.inc();
        let mut app = test::init_service(
            App::new().service(web::resource("/metrics").route(web::get().to(endpoint::gather))),
        )
        .await;
        let req = test::TestRequest::get().uri("/metrics").to_request();
        let resp = test::call_service(&mut app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("murmur_posts_created"));
    }
}
