//! Loopback HTTP listener for the authorization redirect.
//!
//! An Actix server on `127.0.0.1` answers `GET /`. Only a request carrying
//! `state` together with `code` or `error` is forwarded to the waiting consent
//! flow. Anything else (a favicon fetch, a bare visit, an idle preconnect) is
//! answered or left to Actix and the listener keeps waiting.

use std::io;
use std::net::{Ipv4Addr, TcpListener};

use actix_web::dev::ServerHandle;
use actix_web::{App, HttpResponse, HttpServer, web};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const SHUTDOWN_TIMEOUT_SECS: u64 = 1;
const HTML: &str = "text/html; charset=utf-8";

const SIGNED_IN_PAGE: &str = "<!doctype html><title>Food Tracker</title>\
<p>Signed in. You can close this window and return to the terminal.</p>";
const DECLINED_PAGE: &str = "<!doctype html><title>Food Tracker</title>\
<p>Sign-in was not completed. Return to the terminal to try again.</p>";
const WAITING_PAGE: &str = "<!doctype html><title>Food Tracker</title>\
<p>Waiting for Google sign-in.</p>";

/// Query parameters the issuer appends to the redirect URI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub(super) struct RedirectParams {
    pub(super) code: Option<String>,
    pub(super) state: Option<String>,
    pub(super) error: Option<String>,
    pub(super) error_description: Option<String>,
}

impl RedirectParams {
    /// Whether the issuer produced this request: `state` plus a code or an error.
    pub(super) const fn is_issuer_reply(&self) -> bool {
        self.state.is_some() && (self.code.is_some() || self.error.is_some())
    }
}

/// Running loopback server. Stopped by [`RedirectListener::stop`] or on drop.
pub(super) struct RedirectListener {
    port: u16,
    handle: ServerHandle,
    replies: mpsc::UnboundedReceiver<RedirectParams>,
}

impl RedirectListener {
    /// Bind `127.0.0.1:requested_port` (`0` picks a free port) and start serving.
    ///
    /// Must be called inside a Tokio runtime.
    pub(super) fn bind(requested_port: u16) -> io::Result<Self> {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, requested_port))?;
        let port = listener.local_addr()?.port();
        let (reply_tx, replies) = mpsc::unbounded_channel();
        let sender = web::Data::new(reply_tx);

        let server = HttpServer::new(move || {
            App::new()
                .app_data(sender.clone())
                .route("/", web::get().to(receive_redirect))
        })
        .workers(1)
        .disable_signals()
        .shutdown_timeout(SHUTDOWN_TIMEOUT_SECS)
        .listen(listener)?
        .run();
        let handle = server.handle();
        tokio::spawn(async move {
            if let Err(error) = server.await {
                warn!(error = %error, "loopback listener failed");
            }
        });

        Ok(Self {
            port,
            handle,
            replies,
        })
    }

    /// Port the listener is bound to.
    pub(super) const fn port(&self) -> u16 {
        self.port
    }

    /// Wait for the next request that carries an issuer reply.
    pub(super) async fn next_redirect(&mut self) -> io::Result<RedirectParams> {
        self.replies
            .recv()
            .await
            .ok_or_else(|| io::Error::other("loopback listener stopped"))
    }

    /// Stop serving once in-flight responses are written.
    pub(super) async fn stop(self) {
        self.handle.stop(true).await;
    }
}

impl Drop for RedirectListener {
    fn drop(&mut self) {
        // The stop command is sent eagerly; the completion future is not needed.
        drop(self.handle.stop(false));
    }
}

async fn receive_redirect(
    query: web::Query<RedirectParams>,
    replies: web::Data<mpsc::UnboundedSender<RedirectParams>>,
) -> HttpResponse {
    let params = query.into_inner();
    if !params.is_issuer_reply() {
        debug!("ignored loopback request without an issuer reply");
        return HttpResponse::Ok().content_type(HTML).body(WAITING_PAGE);
    }

    let page = if params.error.is_some() {
        DECLINED_PAGE
    } else {
        SIGNED_IN_PAGE
    };
    if replies.send(params).is_err() {
        debug!("redirect arrived after the consent attempt ended");
    }
    HttpResponse::Ok().content_type(HTML).body(page)
}
