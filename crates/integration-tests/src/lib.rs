//! Integration tests for the Sleep Outside storefront.
//!
//! [`TestApp`] builds the real router over an in-memory session store and a
//! fixed catalog, then drives it request by request, carrying the session
//! cookie like a browser would. No server or database is needed.
//!
//! ```rust,ignore
//! let mut app = TestApp::new();
//! let response = app.post_form("/cart/add", &[("id", "880RR")]).await;
//! assert_eq!(response.status, StatusCode::OK);
//! ```

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use sleep_outside_storefront::cart::CartEvents;
use sleep_outside_storefront::catalog::{Catalog, Product};
use sleep_outside_storefront::config::StorefrontConfig;
use sleep_outside_storefront::middleware::SESSION_COOKIE_NAME;
use sleep_outside_storefront::routes;
use sleep_outside_storefront::state::AppState;

/// Catalog used by every test.
pub const CATALOG_JSON: &str = r#"[
    {"id": "880RR", "name": "Marmot Ajax Tent", "brand": "Marmot", "price": "199.99",
     "image": "/images/tents/marmot-ajax.jpg", "colorName": "Pale Pumpkin/Terracotta"},
    {"id": "344YJ", "name": "Cedar Ridge Rimrock Tent", "brand": "Cedar Ridge", "price": "69.99"},
    {"id": "STAKE", "name": "Trail Stakes", "brand": "Sleep Outside", "price": "50.00"}
]"#;

/// A response with its body read.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// The parsed `HX-Trigger` header, if any.
    #[must_use]
    pub fn hx_trigger(&self) -> Option<serde_json::Value> {
        let value = self.headers.get("HX-Trigger")?.to_str().ok()?;
        serde_json::from_str(value).ok()
    }

    /// Positions of cart lines in the body, by product ID.
    #[must_use]
    pub fn line_ids(&self) -> Vec<String> {
        self.body
            .split("class=\"cart-card\"")
            .skip(1)
            .filter_map(|chunk| {
                let start = chunk.find("data-id=\"")? + "data-id=\"".len();
                let rest = chunk.get(start..)?;
                let end = rest.find('"')?;
                rest.get(..end).map(str::to_owned)
            })
            .collect()
    }

    /// The undo token offered by a removal banner.
    #[must_use]
    pub fn undo_token(&self) -> Option<String> {
        let marker = "{\"token\": \"";
        let start = self.body.find(marker)? + marker.len();
        let rest = self.body.get(start..)?;
        let end = rest.find('"')?;
        rest.get(..end).map(str::to_owned)
    }
}

/// One visitor talking to the storefront.
pub struct TestApp {
    router: Router,
    events: CartEvents,
    cookie: Option<String>,
}

impl TestApp {
    /// Build the app with the test catalog and a fresh session store.
    ///
    /// # Panics
    ///
    /// Panics if [`CATALOG_JSON`] is invalid.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        let products: Vec<Product> =
            serde_json::from_str(CATALOG_JSON).expect("test catalog is valid JSON");
        let catalog = Catalog::from_products(products).expect("test catalog has unique IDs");
        let state = AppState::new(StorefrontConfig::default(), catalog);
        let events = state.cart_events().clone();

        Self {
            router: routes::app(state, MemoryStore::default()),
            events,
            cookie: None,
        }
    }

    /// Another visitor on the same server, with no session yet.
    #[must_use]
    pub fn new_visitor(&self) -> Self {
        Self {
            router: self.router.clone(),
            events: self.events.clone(),
            cookie: None,
        }
    }

    /// The server's cart-changed channel.
    #[must_use]
    pub const fn events(&self) -> &CartEvents {
        &self.events
    }

    /// Send a GET request.
    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.send(Request::get(path), Body::empty()).await
    }

    /// Send a form POST request.
    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        let builder = Request::post(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("HX-Request", "true");
        self.send(builder, Body::from(body)).await
    }

    #[allow(clippy::expect_used)]
    async fn send(&mut self, mut builder: axum::http::request::Builder, body: Body) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder.body(body).expect("valid request");
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        self.remember_session(response.headers());

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    fn remember_session(&mut self, headers: &HeaderMap) {
        let prefix = format!("{SESSION_COOKIE_NAME}=");
        for value in headers.get_all(header::SET_COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            let pair = value.split(';').next().unwrap_or_default().trim();
            if pair.starts_with(&prefix) {
                self.cookie = Some(pair.to_owned());
            }
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
