//! Tests for the image stream channel.

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, UdpSocket};
use tokio::time::{sleep, timeout};

use simlink::{Session, SessionConfig};

const WAIT: Duration = Duration::from_secs(2);

/// Bind and start a session with ephemeral ports and tiny image frames.
async fn start_session(imaging_enabled: bool) -> Session {
    let motors = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let config = SessionConfig {
        motor_port: motors.local_addr().unwrap().port(),
        telemetry_port: 0,
        image_port: 0,
        imaging_enabled,
        image_rows: 2,
        image_cols: 3,
        timeout: Duration::ZERO,
        ..Default::default()
    };
    let mut session = Session::bind(config).unwrap();
    session.start().unwrap();
    session
}

#[tokio::test]
async fn enabled_imaging_stores_fixed_size_frames() {
    let session = start_session(true).await;

    let mut client = timeout(WAIT, TcpStream::connect(session.image_addr()))
        .await
        .expect("connect within deadline")
        .unwrap();

    // 2 x 3 x 4 bytes per frame.
    let first: Vec<u8> = (0u8..24).collect();
    client.write_all(&first).await.unwrap();

    timeout(WAIT, async {
        while session.image().is_none() {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("image frame should arrive");

    let image = session.image().unwrap();
    assert_eq!(image.rows, 2);
    assert_eq!(image.cols, 3);
    assert_eq!(&image.data[..], &first[..]);

    // A second frame replaces the first.
    let second = vec![0xABu8; 24];
    client.write_all(&second).await.unwrap();
    timeout(WAIT, async {
        while session.image().unwrap().data[0] != 0xAB {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("second frame should replace the first");

    session.shutdown().await;
}

#[tokio::test]
async fn slow_frame_delivery_keeps_frame_boundaries() {
    let session = start_session(true).await;

    let mut client = timeout(WAIT, TcpStream::connect(session.image_addr()))
        .await
        .expect("connect within deadline")
        .unwrap();

    // The first frame dribbles in with a stall longer than the loop's idle
    // deadline; the bytes buffered before the stall must not be dropped.
    let first: Vec<u8> = (0u8..24).collect();
    client.write_all(&first[..10]).await.unwrap();
    sleep(Duration::from_millis(1500)).await;
    client.write_all(&first[10..]).await.unwrap();

    timeout(WAIT, async {
        while session.image().is_none() {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("slow frame should still arrive");
    assert_eq!(&session.image().unwrap().data[..], &first[..]);

    // A prompt second frame lands exactly on the frame boundary, not
    // shifted by the stall.
    let second = vec![0xEEu8; 24];
    client.write_all(&second).await.unwrap();
    timeout(WAIT, async {
        while session.image().unwrap().data[0] != 0xEE {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("second frame should replace the first");
    assert_eq!(&session.image().unwrap().data[..], &second[..]);

    session.shutdown().await;
}

#[tokio::test]
async fn client_disconnect_does_not_end_the_session() {
    let session = start_session(true).await;

    let client = TcpStream::connect(session.image_addr()).await.unwrap();
    drop(client);

    sleep(Duration::from_millis(100)).await;
    assert!(!session.is_done(), "imaging is auxiliary and must not end the session");

    session.shutdown().await;
}

#[tokio::test]
async fn disabled_imaging_stays_inert() {
    let session = start_session(false).await;

    sleep(Duration::from_millis(50)).await;
    assert!(session.image().is_none());
    assert!(!session.is_done());

    session.shutdown().await;
}
