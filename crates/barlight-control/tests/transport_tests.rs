use std::net::UdpSocket;
use std::time::Duration;

use barlight_control::dmx::artnet::PACKET_LEN;
use barlight_control::{Engine, EngineState};
use barlight_core::{ColorMapping, Device, Topology, Universe};

fn receiver() -> (UdpSocket, u16) {
    let socket = UdpSocket::bind("127.0.0.1:0").expect("Failed to bind receiver");
    socket
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    let port = socket.local_addr().unwrap().port();
    (socket, port)
}

#[test]
fn test_packet_arrives_on_the_wire() {
    let (rx, port) = receiver();

    let mut topology = Topology::new(4);
    let u = topology.add_universe(Universe::new(5, "127.0.0.1").with_port(port));
    let g = topology.add_group(ColorMapping::new().with_entry(2, 240));
    topology.add_device(Device::rgb(u, g, 1));

    let mut engine = Engine::new(topology);
    assert!(engine.transport().is_usable(0));

    let report = engine.update_colors(&[0, 0, 128, 0]).unwrap();
    assert_eq!(report.sent, vec![5]);

    let mut buf = [0u8; 1024];
    let n = rx.recv(&mut buf).expect("No Art-Net packet received");
    assert_eq!(n, PACKET_LEN);
    assert_eq!(&buf[0..8], b"Art-Net\0");
    assert_eq!(&buf[8..10], &[0x00, 0x50]);
    assert_eq!(&buf[14..16], &[5, 0]);
    assert_eq!(&buf[16..18], &[0x02, 0x00]);
    assert_eq!(&buf[18..21], &[0, 0, 128]);

    assert_eq!(engine.stats().packets_sent, 1);
    let stats = engine.shutdown();
    assert_eq!(stats.frames_sent, 1);
}

#[test]
fn test_failed_universe_does_not_affect_others() {
    let (rx, port) = receiver();

    let mut topology = Topology::new(1);
    let broken = topology.add_universe(Universe::new(1, ""));
    let good = topology.add_universe(Universe::new(2, "127.0.0.1").with_port(port));
    let g = topology.add_group(ColorMapping::new().with_entry(0, 0));
    topology.add_device(Device::rgb(broken, g, 1));
    topology.add_device(Device::rgb(good, g, 1));

    let mut engine = Engine::new(topology);
    assert!(!engine.transport().is_usable(0));
    assert!(engine.transport().is_usable(1));

    for value in [50, 60] {
        let report = engine.update_colors(&[value]).unwrap();
        assert_eq!(report.skipped, vec![1]);
        assert_eq!(report.sent, vec![2]);
        assert!(report.failed.is_empty());

        let mut buf = [0u8; 1024];
        let n = rx.recv(&mut buf).unwrap();
        assert_eq!(n, PACKET_LEN);
        assert_eq!(buf[18], value as u8);
    }

    // The broken universe still renders, it just is not sent
    assert_eq!(engine.buffers().get(0).unwrap().channel(1), Some(60));
    assert_eq!(engine.stats().packets_sent, 2);
    assert_eq!(engine.state(), EngineState::Running);
}

#[test]
fn test_no_usable_universe_still_runs() {
    let mut topology = Topology::new(2).with_darkness_floor(3);
    let u = topology.add_universe(Universe::new(0, ""));
    let g = topology.add_group(ColorMapping::new().with_entry(1, 90));
    topology.add_device(Device::rgb(u, g, 1));

    let mut engine = Engine::new(topology);
    assert_eq!(engine.transport().usable_count(), 0);

    let report = engine.update_colors(&[0, 0]).unwrap();
    assert!(report.sent.is_empty());
    assert_eq!(report.skipped, vec![0]);
    assert_eq!(engine.stats().frames_sent, 1);
}

/// A peer with no listener answers with ICMP port unreachable, which the
/// connected socket reports on a following send
#[cfg(target_os = "linux")]
#[test]
fn test_send_failure_is_counted_and_next_frame_retried() {
    let (closed, port) = receiver();
    drop(closed);

    let mut topology = Topology::new(1);
    let u = topology.add_universe(Universe::new(1, "127.0.0.1").with_port(port));
    let g = topology.add_group(ColorMapping::new().with_entry(0, 120));
    topology.add_device(Device::rgb(u, g, 1));

    let mut engine = Engine::new(topology);
    assert!(engine.transport().is_usable(0));

    let frames = 6;
    let mut first_failure = None;
    let mut sent_after_failure = false;
    for i in 0..frames {
        let report = engine.update_colors(&[100]).unwrap();
        assert!(report.skipped.is_empty());
        assert_eq!(report.sent.len() + report.failed.len(), 1);

        if let Some((universe, message)) = report.failed.first() {
            assert_eq!(*universe, 1);
            assert!(!message.is_empty());
            first_failure.get_or_insert(i);
        } else if first_failure.is_some() {
            sent_after_failure = true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    assert!(first_failure.is_some(), "no send failed");
    assert!(sent_after_failure, "no frame was sent after a failure");

    // Still usable: a failed send is reported, not fatal
    assert!(engine.transport().is_usable(0));

    let stats = engine.shutdown();
    assert_eq!(stats.frames_sent, frames);
    assert!(stats.send_failures >= 1);
    assert_eq!(stats.packets_sent + stats.send_failures, frames);
}
