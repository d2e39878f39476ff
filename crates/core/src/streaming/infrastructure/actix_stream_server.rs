//! actix-web transport for the MJPEG feed.
//!
//! The server runs on its own thread with its own actix system so the
//! synchronous processing loop never touches the async runtime.

use std::net::{SocketAddr, TcpListener};
use std::thread::JoinHandle;
use std::time::Duration;

use actix_web::http::header;
use actix_web::{web, App, HttpResponse, HttpServer};
use tokio::sync::oneshot;

use crate::streaming::domain::multipart::stream_content_type;
use crate::streaming::domain::shared_frame_slot::SharedFrameSlot;
use crate::streaming::domain::stream_publisher::StreamPublisher;
use crate::streaming::domain::stream_server::{ServerStartError, StreamServer};
use crate::streaming::infrastructure::index_page::IndexPage;
use crate::streaming::infrastructure::mjpeg_stream::mjpeg_stream;

/// Shared state backing the HTTP handlers.
pub struct StreamState {
    pub slot: SharedFrameSlot,
    pub poll_interval: Duration,
    pub page: IndexPage,
}

/// Registers `/` and `/video_feed`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index_route))
        .route("/video_feed", web::get().to(video_feed_route));
}

async fn index_route(state: web::Data<StreamState>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(state.page.render())
}

async fn video_feed_route(state: web::Data<StreamState>) -> HttpResponse {
    let publisher = StreamPublisher::new(state.slot.clone(), state.poll_interval);
    log::debug!("[SERVER] client attached to video feed");
    HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .insert_header((header::CONTENT_TYPE, stream_content_type()))
        .streaming(mjpeg_stream(publisher))
}

struct RunningServer {
    slot: SharedFrameSlot,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
    local_addr: SocketAddr,
}

pub struct ActixStreamServer {
    address: String,
    poll_interval: Duration,
    page: IndexPage,
    running: Option<RunningServer>,
}

impl ActixStreamServer {
    pub fn new(address: impl Into<String>, poll_interval: Duration, page: IndexPage) -> Self {
        Self {
            address: address.into(),
            poll_interval,
            page,
            running: None,
        }
    }

    /// Bound address while running. Useful when binding port 0.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|r| r.local_addr)
    }
}

impl StreamServer for ActixStreamServer {
    fn start(&mut self, slot: SharedFrameSlot) -> Result<(), ServerStartError> {
        if self.running.is_some() {
            return Err(ServerStartError::AlreadyRunning);
        }

        // Bind here so address errors surface to the caller synchronously.
        let bind_err = |source| ServerStartError::Bind {
            address: self.address.clone(),
            source,
        };
        let listener = TcpListener::bind(&self.address).map_err(bind_err)?;
        let local_addr = listener.local_addr().map_err(bind_err)?;

        let state = web::Data::new(StreamState {
            slot: slot.clone(),
            poll_interval: self.poll_interval,
            page: self.page.clone(),
        });
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let handle = std::thread::Builder::new()
            .name("mjpeg-server".into())
            .spawn(move || {
                if let Err(err) = actix_web::rt::System::new().block_on(async move {
                    let server = HttpServer::new(move || {
                        App::new()
                            .app_data(state.clone())
                            .configure(configure_routes)
                    })
                    .shutdown_timeout(5)
                    .listen(listener)?
                    .run();

                    let srv_handle = server.handle();
                    actix_web::rt::spawn(async move {
                        let _ = shutdown_rx.await;
                        srv_handle.stop(true).await;
                    });

                    server.await
                }) {
                    log::error!("[ERROR] HTTP server error: {err}");
                }
            })
            .map_err(ServerStartError::Spawn)?;

        log::info!("[SERVER] MJPEG stream at http://{local_addr}/video_feed");
        self.running = Some(RunningServer {
            slot,
            shutdown: shutdown_tx,
            handle,
            local_addr,
        });
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(server) = self.running.take() {
            server.slot.close();
            let _ = server.shutdown.send(());
            if server.handle.join().is_err() {
                log::error!("[ERROR] HTTP server thread panicked");
            }
            log::info!("[SHUTDOWN] HTTP server stopped");
        }
    }
}

impl Drop for ActixStreamServer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::encoded_buffer::EncodedBuffer;
    use actix_web::test as actix_test;
    use std::io::Read;

    fn page() -> IndexPage {
        IndexPage {
            width: 640,
            height: 480,
            fps: 15,
        }
    }

    fn state(slot: SharedFrameSlot) -> web::Data<StreamState> {
        web::Data::new(StreamState {
            slot,
            poll_interval: Duration::from_millis(5),
            page: page(),
        })
    }

    #[actix_web::test]
    async fn test_index_route_serves_page() {
        let app = actix_test::init_service(
            App::new()
                .app_data(state(SharedFrameSlot::new()))
                .configure(configure_routes),
        )
        .await;
        let req = actix_test::TestRequest::get().uri("/").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        let body = actix_test::read_body(resp).await;
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("Resolution: 640x480 @ 15 FPS"));
    }

    #[actix_web::test]
    async fn test_video_feed_headers_and_parts() {
        let slot = SharedFrameSlot::new();
        slot.set(EncodedBuffer::new(vec![0xFF, 0xD8, 0xFF, 0xD9]));
        let app = actix_test::init_service(
            App::new()
                .app_data(state(slot.clone()))
                .configure(configure_routes),
        )
        .await;

        let closer = slot.clone();
        actix_web::rt::spawn(async move {
            actix_web::rt::time::sleep(Duration::from_millis(40)).await;
            closer.close();
        });

        let resp = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/video_feed").to_request(),
        )
        .await;
        assert!(resp.status().is_success());
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "multipart/x-mixed-replace; boundary=frame"
        );
        assert_eq!(resp.headers().get(header::CACHE_CONTROL).unwrap(), "no-cache");

        let body = actix_test::read_body(resp).await;
        let header = b"--frame\r\nContent-Type: image/jpeg\r\nContent-length: 4\r\n\r\n";
        assert!(body.starts_with(header));
    }

    #[actix_web::test]
    async fn test_unknown_route_is_not_found() {
        let app = actix_test::init_service(
            App::new()
                .app_data(state(SharedFrameSlot::new()))
                .configure(configure_routes),
        )
        .await;
        let req = actix_test::TestRequest::get().uri("/nope").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_start_serves_over_tcp_and_stop_closes_slot() {
        let slot = SharedFrameSlot::new();
        slot.set(EncodedBuffer::new(vec![1, 2, 3]));
        let mut server = ActixStreamServer::new("127.0.0.1:0", Duration::from_millis(5), page());
        server.start(slot.clone()).unwrap();
        let addr = server.local_addr().unwrap();

        let html = reqwest::blocking::get(format!("http://{addr}/"))
            .unwrap()
            .text()
            .unwrap();
        assert!(html.contains("/video_feed"));

        let mut feed = reqwest::blocking::get(format!("http://{addr}/video_feed")).unwrap();
        let mut buf = [0u8; 9];
        feed.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"--frame\r\n");
        drop(feed);

        server.stop();
        assert!(slot.is_closed());
        assert!(server.local_addr().is_none());
        server.stop();
    }

    #[test]
    fn test_second_start_is_rejected() {
        let mut server = ActixStreamServer::new("127.0.0.1:0", Duration::from_millis(5), page());
        server.start(SharedFrameSlot::new()).unwrap();
        assert!(matches!(
            server.start(SharedFrameSlot::new()),
            Err(ServerStartError::AlreadyRunning)
        ));
        server.stop();
    }

    #[test]
    fn test_occupied_port_is_bind_error() {
        let taken = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = taken.local_addr().unwrap();
        let mut server = ActixStreamServer::new(addr.to_string(), Duration::from_millis(5), page());
        assert!(matches!(
            server.start(SharedFrameSlot::new()),
            Err(ServerStartError::Bind { .. })
        ));
    }
}
