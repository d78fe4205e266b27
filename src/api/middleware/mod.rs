pub mod verify_token;

use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::request::Parts as ReqParts;
use http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::util::env::Env;

/// `*` allows any origin; anything else is a suffix the request origin must end with.
pub fn cors(env: &'static Env) -> CorsLayer {
    let cors_allowed = env.cors_allow_origins.as_str();

    let allowed = if cors_allowed == "*" {
        AllowOrigin::any()
    } else {
        AllowOrigin::predicate(move |org: &HeaderValue, _: &ReqParts| {
            org.as_bytes().ends_with(cors_allowed.as_bytes())
        })
    };

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_origin(allowed)
}
