use codec::{emit_baseline, emit_frame, ClientSession, EntityState, FrameStatus, PlayerState};
use msg::{MsgReader, MsgWriter};
use wire::{FrameHeader, MAX_AREA_BYTES};

const SERVER_HZ: u16 = 20;

fn entity(number: u16, x: f32) -> EntityState {
    let mut state = EntityState::default();
    state.number = number;
    state.model_index = 1;
    state.origin = [x, 0.0, 0.0];
    state
}

fn header(server_frame: i32, delta_frame: i32) -> FrameHeader {
    let mut header = FrameHeader {
        server_frame,
        delta_frame,
        suppress_count: 0,
        area_len: 1,
        area_bits: [0; MAX_AREA_BYTES],
    };
    header.area_bits[0] = 0x01;
    header
}

fn baseline_table(states: &[EntityState]) -> Vec<EntityState> {
    let mut table = vec![EntityState::default(); 32];
    for state in states {
        table[usize::from(state.number)] = *state;
    }
    table
}

fn session_with_baselines(states: &[EntityState]) -> ClientSession {
    let mut session = ClientSession::new();
    session.set_server_rate(SERVER_HZ);
    for state in states {
        let mut writer = MsgWriter::new();
        emit_baseline(&mut writer, state);
        let bytes = writer.finish();
        session.parse_baseline(&mut MsgReader::new(&bytes)).unwrap();
    }
    session
}

fn frame_bytes(
    header: &FrameHeader,
    from_ps: &PlayerState,
    to_ps: &PlayerState,
    from: &[EntityState],
    to: &[EntityState],
    baselines: &[EntityState],
) -> Vec<u8> {
    let mut writer = MsgWriter::new();
    emit_frame(&mut writer, header, from_ps, to_ps, from, to, baselines);
    writer.finish()
}

fn feed(session: &mut ClientSession, bytes: &[u8]) -> FrameStatus {
    session.parse_frame(&mut MsgReader::new(bytes)).unwrap()
}

#[test]
fn delta_frame_merges_changed_entering_and_carried_entities() {
    let b3 = entity(3, 24.0);
    let b5 = entity(5, 32.0);
    let b7 = entity(7, 160.0);
    let b9 = entity(9, 48.0);
    let table = baseline_table(&[b3, b5, b7, b9]);
    let mut session = session_with_baselines(&[b3, b5, b7, b9]);
    let ps = PlayerState::default();

    let run1 = vec![b3, b5, b9];
    let bytes = frame_bytes(&header(1, -1), &ps, &ps, &[], &run1, &table);
    assert_eq!(feed(&mut session, &bytes), FrameStatus::Valid);
    let got1: Vec<EntityState> = session.snapshot_entities(session.snapshot()).collect();
    assert_eq!(got1.len(), 3);

    // 5 moves, 7 enters, 3 and 9 ride along unchanged.
    let mut five = b5;
    five.origin = [40.0, 0.0, 0.0];
    let run2 = vec![b3, five, b7, b9];
    let bytes = frame_bytes(&header(2, 1), &ps, &ps, &run1, &run2, &table);
    assert_eq!(feed(&mut session, &bytes), FrameStatus::Valid);

    let got2: Vec<EntityState> = session.snapshot_entities(session.snapshot()).collect();
    let numbers: Vec<u16> = got2.iter().map(|state| state.number).collect();
    assert_eq!(numbers, vec![3, 5, 7, 9]);
    assert_eq!(got2[1].origin, [40.0, 0.0, 0.0]);
    // 7 was never on the wire before; its origin comes from the baseline.
    assert_eq!(got2[2].origin, [160.0, 0.0, 0.0]);
    // Carried entities reproduce the reference states exactly.
    assert_eq!(got2[0], got1[0]);
    assert_eq!(got2[3], got1[2]);
}

#[test]
fn removal_drops_the_entity_from_the_run() {
    let b3 = entity(3, 24.0);
    let b5 = entity(5, 32.0);
    let b9 = entity(9, 48.0);
    let table = baseline_table(&[b3, b5, b9]);
    let mut session = session_with_baselines(&[b3, b5, b9]);
    let ps = PlayerState::default();

    let run1 = vec![b3, b5, b9];
    let bytes = frame_bytes(&header(1, -1), &ps, &ps, &[], &run1, &table);
    assert_eq!(feed(&mut session, &bytes), FrameStatus::Valid);

    let run2 = vec![b3, b9];
    let bytes = frame_bytes(&header(2, 1), &ps, &ps, &run1, &run2, &table);
    assert_eq!(feed(&mut session, &bytes), FrameStatus::Valid);

    let numbers: Vec<u16> = session
        .snapshot_entities(session.snapshot())
        .map(|state| state.number)
        .collect();
    assert_eq!(numbers, vec![3, 9]);
}

#[test]
fn snapshots_age_out_of_the_history_ring() {
    let mut session = ClientSession::new();
    session.set_server_rate(SERVER_HZ);
    let ps = PlayerState::default();

    for frame in 1..=20 {
        let bytes = frame_bytes(&header(frame, -1), &ps, &ps, &[], &[], &[]);
        assert_eq!(feed(&mut session, &bytes), FrameStatus::Valid);
    }

    // Frame 20 reuses the ring slot frame 4 occupied.
    assert!(session.get_snapshot(20).is_some());
    assert!(session.get_snapshot(5).is_some());
    assert!(session.get_snapshot(4).is_none());
}

#[test]
fn delta_from_evicted_snapshot_invalidates_until_next_keyframe() {
    let b3 = entity(3, 24.0);
    let table = baseline_table(&[b3]);
    let mut session = session_with_baselines(&[b3]);
    let ps = PlayerState::default();

    for frame in 1..=20 {
        let bytes = frame_bytes(&header(frame, -1), &ps, &ps, &[], &[], &table);
        assert_eq!(feed(&mut session, &bytes), FrameStatus::Valid);
    }

    // Frame 21 deltas against evicted frame 4. The frame still parses and is
    // stored, but it never becomes the current snapshot.
    let run = vec![b3];
    let bytes = frame_bytes(&header(21, 4), &ps, &ps, &[], &run, &table);
    assert_eq!(feed(&mut session, &bytes), FrameStatus::Invalid);

    let stored = session.get_snapshot(21).unwrap();
    assert!(!stored.valid);
    assert_eq!(stored.num_entities, 1);
    assert_eq!(session.snapshot().server_frame, 20);

    // A keyframe recovers the stream.
    let bytes = frame_bytes(&header(22, -1), &ps, &ps, &[], &run, &table);
    assert_eq!(feed(&mut session, &bytes), FrameStatus::Valid);
    assert_eq!(session.snapshot().server_frame, 22);
    let numbers: Vec<u16> = session
        .snapshot_entities(session.snapshot())
        .map(|state| state.number)
        .collect();
    assert_eq!(numbers, vec![3]);
}

#[test]
fn header_fields_surface_in_the_snapshot() {
    let mut session = ClientSession::new();
    session.set_server_rate(SERVER_HZ);
    let ps = PlayerState::default();

    let mut h = header(40, -1);
    h.suppress_count = 3;
    h.area_len = 2;
    h.area_bits[0] = 0xAA;
    h.area_bits[1] = 0x01;
    let bytes = frame_bytes(&h, &ps, &ps, &[], &[], &[]);
    assert_eq!(feed(&mut session, &bytes), FrameStatus::Valid);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.server_frame, 40);
    assert_eq!(snapshot.server_time, 2000);
    assert_eq!(snapshot.suppress_count, 3);
    assert_eq!(snapshot.area_bits[..2], [0xAA, 0x01]);
}

#[test]
fn player_state_carries_between_deltas() {
    let mut session = ClientSession::new();
    session.set_server_rate(SERVER_HZ);

    let mut ps1 = PlayerState::default();
    ps1.pmove.origin = [64, 128, -256];
    ps1.pmove.pm_flags = 0x0010;
    ps1.stats[2] = 50;

    let bytes = frame_bytes(&header(1, -1), &PlayerState::default(), &ps1, &[], &[], &[]);
    assert_eq!(feed(&mut session, &bytes), FrameStatus::Valid);
    assert_eq!(session.snapshot().ps, ps1);

    // Only the view swings; movement state and stats ride along.
    let mut ps2 = ps1;
    ps2.view_angles = [0.0, 90.0, 0.0];
    let bytes = frame_bytes(&header(2, 1), &ps1, &ps2, &[], &[], &[]);
    assert_eq!(feed(&mut session, &bytes), FrameStatus::Valid);
    assert_eq!(session.snapshot().ps, ps2);
}
