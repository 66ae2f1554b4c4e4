use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

pub struct ApplicationMiddleware {
    pub body_limit: RequestBodyLimitLayer,
    pub trace: TraceLayer<SharedClassifier<ServerErrorsAsFailures>>,
}

pub fn create_middleware(max_http_content_len: usize) -> ApplicationMiddleware {
    let body_limit = RequestBodyLimitLayer::new(max_http_content_len);
    let trace = TraceLayer::new_for_http();

    ApplicationMiddleware { body_limit, trace }
}
