use http::header::HOST;
use http::uri::Authority;
use http::{Request, Response};
use http_body_util::Full;
use hyper::body::Bytes;
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseRule {
    /// The listener's configured port.
    Port,
    /// The destination port named by the request authority.
    Authority,
    /// The request path minus its leading slash.
    Path,
}

/// Held while a response is produced. One is shared by every listener.
pub type ResponseLock = Arc<Mutex<()>>;

pub fn render_body<B>(rule: ResponseRule, port: &str, message: &str, req: &Request<B>) -> String {
    match rule {
        ResponseRule::Port => message.replace("{port}", port),
        ResponseRule::Authority => {
            let destination = destination_port(req).unwrap_or_else(|| port.to_string());
            message.replace("{port}", &destination)
        }
        ResponseRule::Path => {
            let raw = req.uri().path();
            let path = percent_decode_str(raw).decode_utf8().unwrap_or(raw.into());
            path.strip_prefix('/').unwrap_or(&*path).to_string()
        }
    }
}

fn destination_port<B>(req: &Request<B>) -> Option<String> {
    if let Some(authority) = req.uri().authority() {
        return authority.port().map(|p| p.as_str().to_string());
    }

    let host = req.headers().get(HOST)?.to_str().ok()?;
    let authority: Authority = host.parse().ok()?;
    authority.port().map(|p| p.as_str().to_string())
}

#[derive(Debug, Clone)]
pub struct Responder {
    rule: ResponseRule,
    port: String,
    message: String,
    lock: Option<ResponseLock>,
}

impl Responder {
    pub fn new(rule: ResponseRule, port: String, message: String, lock: Option<ResponseLock>) -> Self {
        Self {
            rule,
            port,
            message,
            lock,
        }
    }

    pub async fn respond<B>(&self, req: Request<B>) -> Response<Full<Bytes>> {
        let _guard = match &self.lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };

        let body = render_body(self.rule, &self.port, &self.message, &req);
        Response::new(Full::new(Bytes::from(body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use http_body_util::BodyExt;

    fn get(uri: &str) -> Request<()> {
        Request::builder().uri(uri).body(()).unwrap()
    }

    #[test]
    fn port_rule_returns_configured_port() {
        let req = get("/anything?x=1");
        assert_eq!(render_body(ResponseRule::Port, "2052", "{port}", &req), "2052");
    }

    #[test]
    fn port_rule_fills_message_template() {
        let req = get("/");
        assert_eq!(
            render_body(ResponseRule::Port, "8443", "requested port: {port}", &req),
            "requested port: 8443"
        );
    }

    #[test]
    fn path_rule_strips_one_leading_slash() {
        assert_eq!(render_body(ResponseRule::Path, "8888", "{port}", &get("/hello")), "hello");
        assert_eq!(render_body(ResponseRule::Path, "8888", "{port}", &get("/")), "");
        assert_eq!(render_body(ResponseRule::Path, "8888", "{port}", &get("//x")), "/x");
        assert_eq!(
            render_body(ResponseRule::Path, "8888", "{port}", &get("/a/b?q=1")),
            "a/b"
        );
    }

    #[test]
    fn path_rule_decodes_percent_escapes() {
        assert_eq!(
            render_body(ResponseRule::Path, "8888", "{port}", &get("/hello%20world")),
            "hello world"
        );
        assert_eq!(
            render_body(ResponseRule::Path, "8888", "{port}", &get("/caf%C3%A9")),
            "café"
        );
        assert_eq!(render_body(ResponseRule::Path, "8888", "{port}", &get("/%2Fx")), "/x");
    }

    #[test]
    fn path_rule_keeps_raw_path_when_not_utf8() {
        assert_eq!(
            render_body(ResponseRule::Path, "8888", "{port}", &get("/bad%FF")),
            "bad%FF"
        );
    }

    #[test]
    fn authority_rule_reads_host_header() {
        let req = Request::builder()
            .uri("/")
            .header(HOST, "example.com:2083")
            .body(())
            .unwrap();
        assert_eq!(render_body(ResponseRule::Authority, "80", "{port}", &req), "2083");
    }

    #[test]
    fn authority_rule_prefers_absolute_uri() {
        let req = Request::builder()
            .uri("http://example.com:2096/")
            .header(HOST, "example.com:2083")
            .body(())
            .unwrap();
        assert_eq!(render_body(ResponseRule::Authority, "80", "{port}", &req), "2096");
    }

    #[test]
    fn authority_rule_falls_back_to_listener_port() {
        let no_port = Request::builder()
            .uri("/")
            .header(HOST, "example.com")
            .body(())
            .unwrap();
        assert_eq!(render_body(ResponseRule::Authority, "8080", "{port}", &no_port), "8080");
        assert_eq!(render_body(ResponseRule::Authority, "8080", "{port}", &get("/")), "8080");

        let garbage = Request::builder()
            .uri("/")
            .header(HOST, "not a host")
            .body(())
            .unwrap();
        assert_eq!(render_body(ResponseRule::Authority, "8080", "{port}", &garbage), "8080");
    }

    #[tokio::test]
    async fn responder_answers_200_with_body() {
        let responder = Responder::new(
            ResponseRule::Port,
            "2095".to_string(),
            "{port}".to_string(),
            Some(Arc::new(Mutex::new(()))),
        );

        let response = responder.respond(get("/")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"2095");
    }

    #[tokio::test]
    async fn responder_releases_lock() {
        let lock: ResponseLock = Arc::new(Mutex::new(()));
        let responder = Responder::new(
            ResponseRule::Path,
            "8888".to_string(),
            "{port}".to_string(),
            Some(lock.clone()),
        );

        responder.respond(get("/one")).await;
        responder.respond(get("/two")).await;
        assert!(lock.try_lock().is_ok());
    }

    #[tokio::test]
    async fn responder_waits_for_held_lock() {
        let lock: ResponseLock = Arc::new(Mutex::new(()));
        let responder = Responder::new(
            ResponseRule::Port,
            "80".to_string(),
            "{port}".to_string(),
            Some(lock.clone()),
        );

        let guard = lock.lock().await;
        let mut pending = tokio_test::task::spawn(responder.respond(get("/")));
        tokio_test::assert_pending!(pending.poll());

        drop(guard);
        assert!(pending.is_woken());
        let response = tokio_test::assert_ready!(pending.poll());
        assert_eq!(response.status(), StatusCode::OK);
    }
}
