use std::io;
use std::sync::{Arc, Mutex};

use barlight_control::dmx::artnet::{HEADER_LEN, PACKET_LEN};
use barlight_control::{Engine, EngineOptions};
use barlight_core::{ColorMapping, Device, Topology, Universe};

fn offline(topology: Topology) -> Engine {
    Engine::with_options(topology, EngineOptions { connect: false })
}

/// Two universes, three groups, a handful of devices
fn rig(bars: usize, floor: u8) -> Topology {
    let mut topology = Topology::new(bars).with_darkness_floor(floor);
    let front = topology.add_universe(Universe::new(0, "127.0.0.1"));
    let back = topology.add_universe(Universe::new(0x0102, "127.0.0.1"));

    let bass = topology.add_group(ColorMapping::new().with_entry(0, 0).with_entry(1, 30));
    let mids = topology.add_group(ColorMapping::new().with_entry(4, 120));
    let highs = topology.add_group(ColorMapping::new().with_entry(bars - 1, 240));

    topology.add_device(Device::rgb(front, bass, 1));
    topology.add_device(Device::rgb(front, mids, 4));
    topology.add_device(Device::rgb(back, highs, 10));
    topology.add_device(Device::rgb(back, bass, 13));
    topology
}

/// In-memory log sink for asserting on emitted events
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn payloads(engine: &Engine) -> Vec<Vec<u8>> {
    engine.buffers().iter().map(|b| b.payload().to_vec()).collect()
}

#[test]
fn test_zero_frame_gives_zero_payload() {
    let mut engine = offline(rig(16, 0));
    engine.update_colors(&[0; 16]).unwrap();

    for buffer in engine.buffers().iter() {
        assert!(buffer.payload().iter().all(|v| *v == 0));
    }
}

#[test]
fn test_identical_frames_identical_payloads() {
    let mut engine = offline(rig(16, 0));
    let frame: Vec<i32> = (0..16).map(|i| i * 17).collect();

    engine.update_colors(&frame).unwrap();
    let first = payloads(&engine);
    let stats_first = *engine.stats();

    engine.update_colors(&frame).unwrap();
    let second = payloads(&engine);
    let stats_second = *engine.stats();

    assert_eq!(first, second);
    assert_eq!(stats_first.frames_sent, 1);
    assert_eq!(stats_second.frames_sent, 2);
    assert!(stats_second.value_exceed_count >= stats_first.value_exceed_count);
}

#[test]
fn test_shared_channel_saturates() {
    let mut topology = Topology::new(2);
    let u = topology.add_universe(Universe::new(0, "127.0.0.1"));
    let g = topology.add_group(ColorMapping::new().with_entry(0, 0));
    topology.add_device(Device::rgb(u, g, 1));
    topology.add_device(Device::new(u, g, [1, 5, 6]));

    let mut engine = offline(topology);
    engine.update_colors(&[200, 0]).unwrap();

    let buffer = engine.buffers().get(0).unwrap();
    assert_eq!(buffer.channel(1), Some(255));
}

#[test]
fn test_entries_accumulate_within_group() {
    let mut topology = Topology::new(2);
    let u = topology.add_universe(Universe::new(0, "127.0.0.1"));
    let g = topology.add_group(ColorMapping::new().with_entry(0, 0).with_entry(1, 0));
    topology.add_device(Device::rgb(u, g, 1));

    let mut engine = offline(topology);
    engine.update_colors(&[100, 50]).unwrap();
    assert_eq!(engine.buffers().get(0).unwrap().channel(1), Some(150));

    engine.update_colors(&[200, 200]).unwrap();
    assert_eq!(engine.buffers().get(0).unwrap().channel(1), Some(255));
}

#[test]
fn test_darkness_floor_substitutes_once() {
    let mut engine = offline(rig(16, 10));
    let report = engine.update_colors(&[0; 16]).unwrap();

    assert_eq!(report.passes, 2);
    assert!(report.floor_applied);

    // Bass group: band 0 red + band 1 orange, both at 10
    let front = engine.buffers().get(0).unwrap();
    assert_eq!(front.channel(1), Some(20));
    assert_eq!(front.channel(2), Some(5));
    assert_eq!(front.channel(3), Some(0));
    // Mids group: green at 10
    assert_eq!(front.channel(5), Some(10));

    assert_eq!(engine.stats().floor_substitutions, 1);
}

#[test]
fn test_darkness_floor_bounded_for_pathological_floor() {
    let mut engine = offline(rig(16, 255));

    for _ in 0..3 {
        let report = engine.update_colors(&[0; 16]).unwrap();
        assert_eq!(report.passes, 2);
    }
    assert_eq!(engine.stats().floor_substitutions, 3);

    let back = engine.buffers().get(1).unwrap();
    assert_eq!(back.channel(12), Some(255)); // highs, blue
}

#[test]
fn test_floor_not_applied_when_any_band_reaches_it() {
    let mut engine = offline(rig(16, 10));
    let mut frame = [0; 16];
    frame[7] = 10;

    let report = engine.update_colors(&frame).unwrap();
    assert_eq!(report.passes, 1);
    assert!(!report.floor_applied);
    assert!(engine.buffers().get(0).unwrap().payload().iter().all(|v| *v == 0));
}

#[test]
fn test_floor_disabled_at_zero() {
    let mut engine = offline(rig(16, 0));
    let report = engine.update_colors(&[0; 16]).unwrap();
    assert_eq!(report.passes, 1);
    assert_eq!(engine.stats().floor_substitutions, 0);
}

#[test]
fn test_channel_one_is_payload_offset_zero() {
    let mut engine = offline(rig(16, 0));
    let mut frame = [0; 16];
    frame[0] = 255;
    engine.update_colors(&frame).unwrap();

    let front = engine.buffers().get(0).unwrap();
    assert_eq!(front.payload()[0], 255);
    assert_eq!(front.as_bytes()[HEADER_LEN], 255);
}

#[test]
fn test_header_invariant_across_frames() {
    let mut engine = offline(rig(16, 5));
    let headers: Vec<Vec<u8>> = engine.buffers().iter().map(|b| b.header().to_vec()).collect();

    for i in 0..20 {
        let frame: Vec<i32> = (0..16).map(|b| (b * 31 + i * 7) % 400).collect();
        engine.update_colors(&frame).unwrap();
    }

    for (buffer, header) in engine.buffers().iter().zip(&headers) {
        assert_eq!(buffer.header(), header.as_slice());
        assert_eq!(&buffer.header()[0..8], b"Art-Net\0");
        assert_eq!(buffer.as_bytes().len(), PACKET_LEN);
    }
    let back = engine.buffers().get(1).unwrap();
    assert_eq!(&back.header()[14..16], &[0x02, 0x01]);
}

#[test]
fn test_out_of_range_band_does_not_disturb_others() {
    let mut topology = Topology::new(200);
    let u = topology.add_universe(Universe::new(0, "127.0.0.1"));
    let broken = topology.add_group(ColorMapping::new().with_entry(9999, 0).with_entry(3, 120));
    let healthy = topology.add_group(ColorMapping::new().with_entry(5, 240));
    topology.add_device(Device::rgb(u, broken, 1));
    topology.add_device(Device::rgb(u, healthy, 4));

    let mut frame = vec![0; 200];
    frame[3] = 90;
    frame[5] = 70;

    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer({
            let logs = logs.clone();
            move || logs.clone()
        })
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .without_time()
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let mut engine = offline(topology);

        for _ in 0..3 {
            let report = engine.update_colors(&frame).unwrap();
            assert_eq!(report.skipped_entries, 1);

            let buffer = engine.buffers().get(0).unwrap();
            assert_eq!(buffer.channel(1), Some(0));
            assert_eq!(buffer.channel(2), Some(90));
            assert_eq!(buffer.channel(6), Some(70));
        }
    });

    let output = logs.contents();
    let warnings: Vec<&str> = output
        .lines()
        .filter(|line| line.contains("WARN") && line.contains("band 9999"))
        .collect();
    assert_eq!(warnings.len(), 1, "log output:\n{}", output);
}

#[test]
fn test_invalid_group_device_stays_dark() {
    let mut topology = Topology::new(1);
    let u = topology.add_universe(Universe::new(0, "127.0.0.1"));
    let g = topology.add_group(ColorMapping::new().with_entry(0, 0));
    topology.add_device(Device::rgb(u, g + 7, 1));
    topology.add_device(Device::rgb(u, g, 4));

    let mut engine = offline(topology);
    engine.update_colors(&[255]).unwrap();

    let buffer = engine.buffers().get(0).unwrap();
    assert_eq!(buffer.channel(1), Some(0));
    assert_eq!(buffer.channel(4), Some(255));
    assert_eq!(engine.directory().excluded(), vec![0]);
}

#[test]
fn test_universe_without_devices_not_sent() {
    let mut topology = rig(16, 0);
    topology.add_universe(Universe::new(9, "127.0.0.1"));

    let mut engine = offline(topology);
    let report = engine.update_colors(&[0; 16]).unwrap();

    assert_eq!(report.skipped, vec![0, 0x0102]);
    assert!(!engine.buffers().is_dirty(2));
}

#[test]
fn test_engine_owns_topology_copy() {
    let mut topology = rig(16, 0);
    let mut engine = offline(topology.clone());

    topology.groups[0].entries.clear();
    topology.devices.clear();

    let mut frame = [0; 16];
    frame[0] = 255;
    engine.update_colors(&frame).unwrap();
    assert_eq!(engine.buffers().get(0).unwrap().channel(1), Some(255));
}
