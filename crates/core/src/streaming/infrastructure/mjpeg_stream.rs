use actix_web::web::Bytes;
use async_stream::stream;
use futures_util::Stream;

use crate::streaming::domain::stream_publisher::{PublisherPoll, StreamPublisher};

/// Async chunk stream for one client, ticking at the publisher's poll
/// interval. Ends when the slot is closed; actix drops it on disconnect.
pub fn mjpeg_stream(
    publisher: StreamPublisher,
) -> impl Stream<Item = Result<Bytes, actix_web::Error>> {
    stream! {
        let mut interval = actix_web::rt::time::interval(publisher.poll_interval());
        loop {
            interval.tick().await;
            match publisher.poll() {
                PublisherPoll::Part(part) => {
                    yield Ok::<Bytes, actix_web::Error>(Bytes::from(part));
                }
                PublisherPoll::Pending => {}
                PublisherPoll::Closed => break,
            }
        }
    }
}
