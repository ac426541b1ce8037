//! Client snapshot session.
//!
//! A `ClientSession` owns everything one server connection accumulates: the
//! snapshot ring, the entity state arena behind it and the world entity
//! table. Frames decode in place against that state; nothing is shared and
//! nothing is locked.
//!
//! Reference problems (stale or invalid delta frames) are not errors: the
//! frame still decodes to keep the byte stream synchronized, but the result
//! is stored invalid and never surfaced as current. Errors proper mean the
//! stream itself is broken and the session is done.

use log::{trace, warn};
use msg::MsgReader;
use wire::{
    read_entity_header, read_frame_header, EntityBits, MAX_ENTITIES, MAX_SNAPSHOT_ENTITIES,
};

use crate::delta::decode_entity_delta;
use crate::error::{CodecError, CodecResult};
use crate::history::FrameHistory;
use crate::player::decode_player_state;
use crate::table::{Entity, EntityTable};
use crate::types::{EntityState, PlayerState, Snapshot};

/// Outcome of [`ClientSession::parse_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// The snapshot reconstructed against a usable reference (or none).
    Valid,
    /// The snapshot decoded but its delta reference was unusable; it was
    /// stored for the ring yet not surfaced as current.
    Invalid,
    /// The session is not ready for frames; the caller should reconnect.
    NeedReconnect,
}

/// Decoder state for one server connection.
#[derive(Debug, Clone)]
pub struct ClientSession {
    server_hz: u16,
    history: FrameHistory,
    entities: EntityTable,
    frame: Snapshot,
}

impl ClientSession {
    /// Creates a session with no configured server rate.
    ///
    /// Frames are refused with [`FrameStatus::NeedReconnect`] until
    /// [`ClientSession::set_server_rate`] is called with a nonzero rate.
    #[must_use]
    pub fn new() -> Self {
        Self {
            server_hz: 0,
            history: FrameHistory::new(),
            entities: EntityTable::new(),
            frame: Snapshot::default(),
        }
    }

    /// Sets the server frame rate used to derive snapshot timestamps.
    pub fn set_server_rate(&mut self, hz: u16) {
        self.server_hz = hz;
    }

    /// The configured server frame rate in hertz.
    #[must_use]
    pub const fn server_rate(&self) -> u16 {
        self.server_hz
    }

    /// The most recent valid snapshot.
    #[must_use]
    pub const fn snapshot(&self) -> &Snapshot {
        &self.frame
    }

    /// Looks up a snapshot still held by the ring.
    ///
    /// Invalid snapshots are returned too; check `valid` before using one
    /// as a reference.
    #[must_use]
    pub fn get_snapshot(&self, server_frame: i32) -> Option<&Snapshot> {
        self.history.get(server_frame)
    }

    /// Iterates a snapshot's entities in wire order.
    pub fn snapshot_entities(&self, snapshot: &Snapshot) -> impl Iterator<Item = EntityState> + '_ {
        self.history.entities(snapshot)
    }

    /// Returns the world table slot for an entity number.
    #[must_use]
    pub fn entity(&self, number: u16) -> Option<&Entity> {
        self.entities.get(number)
    }

    /// Decodes a spawn baseline record into the world table.
    ///
    /// Returns the entity number the baseline was stored under.
    pub fn parse_baseline(&mut self, msg: &mut MsgReader<'_>) -> CodecResult<u16> {
        let (bits, number) = read_entity_header(msg)?;
        if number == 0 || number >= MAX_ENTITIES {
            return Err(CodecError::EntityNumberOutOfRange { number });
        }

        let null_state = EntityState::default();
        let state = decode_entity_delta(msg, &null_state, number, bits)?;
        self.entities.set_baseline(number, state);
        Ok(number)
    }

    /// Decodes one frame message and stores the resulting snapshot.
    pub fn parse_frame(&mut self, msg: &mut MsgReader<'_>) -> CodecResult<FrameStatus> {
        if self.server_hz == 0 {
            warn!("unstable server rate, requesting reconnect");
            return Ok(FrameStatus::NeedReconnect);
        }

        let header = read_frame_header(msg)?;
        trace!(
            "frame {} delta {} suppress {}",
            header.server_frame,
            header.delta_frame,
            header.suppress_count
        );

        let mut snapshot = Snapshot {
            valid: false,
            server_frame: header.server_frame,
            delta_frame: header.delta_frame,
            // The product fits u64 for any frame a server can number.
            server_time: (header.server_frame.max(0) as u64 * 1000
                / u64::from(self.server_hz)) as u32,
            suppress_count: header.suppress_count,
            area_bits: header.area_bits,
            ps: PlayerState::default(),
            num_entities: 0,
            first_entity: 0,
        };

        // Resolve the delta reference. Failures do not stop the decode: the
        // record stream is consumed against whatever the slot holds so the
        // session stays byte-synchronized, and the snapshot stays invalid.
        let mut valid = true;
        let reference: Option<Snapshot> = if snapshot.is_keyframe() {
            None
        } else {
            let slot = self.history.slot(header.delta_frame);
            if !slot.valid {
                warn!("delta from invalid snapshot {}", header.delta_frame);
                valid = false;
            } else if slot.server_frame != header.delta_frame {
                warn!("delta snapshot {} too old", header.delta_frame);
                valid = false;
            } else if !self.history.states_in_window(slot) {
                warn!(
                    "entity states for snapshot {} overwritten",
                    header.delta_frame
                );
                valid = false;
            }
            Some(*slot)
        };

        let reference_ps = reference.as_ref().map_or_else(PlayerState::default, |r| r.ps);
        snapshot.ps = decode_player_state(msg, &reference_ps)?;

        self.parse_entities(msg, reference.as_ref(), &mut snapshot)?;

        snapshot.valid = valid;
        if valid {
            self.frame = snapshot;
        }
        self.history.store(snapshot);

        Ok(if valid {
            FrameStatus::Valid
        } else {
            FrameStatus::Invalid
        })
    }

    /// Reconciles the wire's entity records with the reference snapshot.
    ///
    /// Both runs are sorted by entity number, so this is a merge: reference
    /// entities below the current record carry over unchanged, a matching
    /// number deltas from the reference, a skipped-ahead number means a new
    /// entity delta'd from its baseline, and REMOVE drops the reference
    /// entity.
    fn parse_entities(
        &mut self,
        msg: &mut MsgReader<'_>,
        reference: Option<&Snapshot>,
        snapshot: &mut Snapshot,
    ) -> CodecResult<()> {
        snapshot.first_entity = self.history.next_state();
        snapshot.num_entities = 0;

        let old_first = reference.map_or(0, |r| r.first_entity);
        let old_total = reference.map_or(0, |r| u32::from(r.num_entities));
        let mut old_index: u32 = 0;
        let mut old_state = self.reference_state(old_first, old_index, old_total);

        loop {
            let (bits, number) = read_entity_header(msg)?;
            if number == 0 {
                break;
            }
            if number >= MAX_ENTITIES {
                return Err(CodecError::EntityNumberOutOfRange { number });
            }

            // Reference entities below this record were not mentioned
            // because they did not change.
            while let Some(old) = old_state {
                if old.number >= number {
                    break;
                }
                trace!("unchanged {}", old.number);
                self.delta_entity(snapshot, old.number, &old, EntityBits::empty(), msg)?;
                old_index += 1;
                old_state = self.reference_state(old_first, old_index, old_total);
            }

            if bits.has(EntityBits::REMOVE) {
                match old_state {
                    Some(old) if old.number == number => trace!("remove {number}"),
                    _ => warn!("remove of {number} without matching reference entity"),
                }
                if old_state.is_some() {
                    old_index += 1;
                    old_state = self.reference_state(old_first, old_index, old_total);
                }
                continue;
            }

            match old_state {
                Some(old) if old.number == number => {
                    trace!("delta {number}");
                    self.delta_entity(snapshot, number, &old, bits, msg)?;
                    old_index += 1;
                    old_state = self.reference_state(old_first, old_index, old_total);
                }
                _ => {
                    // Entering entity; its record deltas from the spawn
                    // baseline and the reference cursor stays put.
                    trace!("baseline {number}");
                    let base = self.entities.baseline_state(number);
                    self.delta_entity(snapshot, number, &base, bits, msg)?;
                }
            }
        }

        // Reference entities after the last record carry over unchanged.
        while let Some(old) = old_state {
            trace!("unchanged {}", old.number);
            self.delta_entity(snapshot, old.number, &old, EntityBits::empty(), msg)?;
            old_index += 1;
            old_state = self.reference_state(old_first, old_index, old_total);
        }

        Ok(())
    }

    /// Decodes one entity into the arena, the snapshot and the world table.
    fn delta_entity(
        &mut self,
        snapshot: &mut Snapshot,
        number: u16,
        from: &EntityState,
        bits: EntityBits,
        msg: &mut MsgReader<'_>,
    ) -> CodecResult<()> {
        let count = usize::from(snapshot.num_entities) + 1;
        if count > MAX_SNAPSHOT_ENTITIES {
            return Err(CodecError::TooManyEntities { count });
        }

        let state = decode_entity_delta(msg, from, number, bits)?;
        self.history.push_state(state);
        snapshot.num_entities = count as u16;

        self.entities
            .update(state, snapshot.server_frame, snapshot.server_time);
        Ok(())
    }

    /// Copies the reference snapshot's entity at `index`, if any remain.
    fn reference_state(&self, first: u32, index: u32, total: u32) -> Option<EntityState> {
        (index < total).then(|| self.history.state_at(first.wrapping_add(index)))
    }
}

impl Default for ClientSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use msg::MsgWriter;
    use wire::{write_entity_header, write_frame_header, FrameHeader};

    use crate::delta::{encode_entity_delta, encode_entity_remove};
    use crate::player::encode_player_state;

    const SERVER_HZ: u16 = 20;

    fn session() -> ClientSession {
        let mut session = ClientSession::new();
        session.set_server_rate(SERVER_HZ);
        session
    }

    fn entity_state(number: u16, x: f32) -> EntityState {
        let mut state = EntityState::default();
        state.number = number;
        state.model_index = 1;
        state.origin = [x, 0.0, 0.0];
        state
    }

    fn write_baseline(session: &mut ClientSession, number: u16, x: f32) {
        let mut writer = MsgWriter::new();
        encode_entity_delta(
            &mut writer,
            &EntityState::default(),
            &entity_state(number, x),
            true,
        );
        let bytes = writer.finish();
        let mut reader = MsgReader::new(&bytes);
        assert_eq!(session.parse_baseline(&mut reader).unwrap(), number);
    }

    /// Builds a keyframe message carrying the given entities as baseline
    /// deltas.
    fn keyframe_message(server_frame: i32, states: &[EntityState]) -> Vec<u8> {
        let mut writer = MsgWriter::new();
        let header = FrameHeader {
            server_frame,
            delta_frame: 0,
            suppress_count: 0,
            area_len: 1,
            area_bits: {
                let mut bits = [0u8; wire::MAX_AREA_BYTES];
                bits[0] = 0x01;
                bits
            },
        };
        write_frame_header(&mut writer, &header);
        encode_player_state(&mut writer, &PlayerState::default(), &PlayerState::default());
        for state in states {
            encode_entity_delta(&mut writer, &EntityState::default(), state, true);
        }
        write_entity_header(&mut writer, EntityBits::empty(), 0);
        writer.finish()
    }

    #[test]
    fn zero_rate_requests_reconnect_without_reading() {
        let mut session = ClientSession::new();
        let bytes = keyframe_message(1, &[]);
        let mut reader = MsgReader::new(&bytes);

        let status = session.parse_frame(&mut reader).unwrap();
        assert_eq!(status, FrameStatus::NeedReconnect);
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn keyframe_reconstructs_and_timestamps() {
        let mut session = session();
        let bytes = keyframe_message(40, &[entity_state(3, 24.0), entity_state(9, 48.0)]);
        let mut reader = MsgReader::new(&bytes);

        let status = session.parse_frame(&mut reader).unwrap();
        assert_eq!(status, FrameStatus::Valid);
        assert!(reader.is_empty());

        let snap = session.snapshot();
        assert!(snap.valid);
        assert_eq!(snap.server_frame, 40);
        assert_eq!(snap.server_time, 2000);
        assert_eq!(snap.num_entities, 2);
        assert_eq!(snap.area_bits[0], 0x01);

        let numbers: Vec<u16> = session
            .snapshot_entities(snap)
            .map(|s| s.number)
            .collect();
        assert_eq!(numbers, vec![3, 9]);
    }

    #[test]
    fn baseline_out_of_range_is_fatal() {
        let mut session = session();
        let mut writer = MsgWriter::new();
        encode_entity_delta(
            &mut writer,
            &EntityState::default(),
            &entity_state(MAX_ENTITIES, 0.0),
            true,
        );
        let bytes = writer.finish();
        let mut reader = MsgReader::new(&bytes);

        let err = session.parse_baseline(&mut reader).unwrap_err();
        assert!(matches!(
            err,
            CodecError::EntityNumberOutOfRange { number } if number == MAX_ENTITIES
        ));
    }

    #[test]
    fn entity_number_boundary() {
        let mut session = session();
        let bytes = keyframe_message(1, &[entity_state(MAX_ENTITIES - 1, 8.0)]);
        let mut reader = MsgReader::new(&bytes);
        assert_eq!(session.parse_frame(&mut reader).unwrap(), FrameStatus::Valid);

        let bytes = keyframe_message(2, &[entity_state(MAX_ENTITIES, 8.0)]);
        let mut reader = MsgReader::new(&bytes);
        let err = session.parse_frame(&mut reader).unwrap_err();
        assert!(matches!(err, CodecError::EntityNumberOutOfRange { .. }));
    }

    #[test]
    fn delta_frame_against_missing_reference_is_invalid_but_stored() {
        let mut session = session();

        let mut writer = MsgWriter::new();
        let header = FrameHeader {
            server_frame: 8,
            delta_frame: 3,
            suppress_count: 0,
            area_len: 0,
            area_bits: [0u8; wire::MAX_AREA_BYTES],
        };
        write_frame_header(&mut writer, &header);
        encode_player_state(&mut writer, &PlayerState::default(), &PlayerState::default());
        write_entity_header(&mut writer, EntityBits::empty(), 0);
        let bytes = writer.finish();

        let mut reader = MsgReader::new(&bytes);
        let status = session.parse_frame(&mut reader).unwrap();
        assert_eq!(status, FrameStatus::Invalid);

        // Stored for the ring, flagged invalid, not surfaced as current.
        let stored = session.get_snapshot(8).unwrap();
        assert!(!stored.valid);
        assert_ne!(session.snapshot().server_frame, 8);
    }

    #[test]
    fn remove_without_reference_match_still_parses() {
        let mut session = session();
        let bytes = keyframe_message(1, &[entity_state(3, 24.0)]);
        let mut reader = MsgReader::new(&bytes);
        session.parse_frame(&mut reader).unwrap();

        // Remove entity 7, which the reference never contained.
        let mut writer = MsgWriter::new();
        let header = FrameHeader {
            server_frame: 2,
            delta_frame: 1,
            suppress_count: 0,
            area_len: 0,
            area_bits: [0u8; wire::MAX_AREA_BYTES],
        };
        write_frame_header(&mut writer, &header);
        encode_player_state(&mut writer, &PlayerState::default(), &PlayerState::default());
        encode_entity_remove(&mut writer, 7);
        write_entity_header(&mut writer, EntityBits::empty(), 0);
        let bytes = writer.finish();

        let mut reader = MsgReader::new(&bytes);
        let status = session.parse_frame(&mut reader).unwrap();
        assert_eq!(status, FrameStatus::Valid);

        // 3 carried over past the bogus removal, 7 was never added.
        let numbers: Vec<u16> = session
            .snapshot_entities(session.snapshot())
            .map(|s| s.number)
            .collect();
        assert_eq!(numbers, vec![3]);
    }

    #[test]
    fn snapshot_entity_overflow_is_fatal() {
        let mut session = session();
        let states: Vec<EntityState> = (1..=MAX_SNAPSHOT_ENTITIES as u16 + 1)
            .map(|n| entity_state(n, f32::from(n)))
            .collect();
        let bytes = keyframe_message(1, &states);
        let mut reader = MsgReader::new(&bytes);

        let err = session.parse_frame(&mut reader).unwrap_err();
        assert!(matches!(
            err,
            CodecError::TooManyEntities { count } if count == MAX_SNAPSHOT_ENTITIES + 1
        ));
    }

    #[test]
    fn full_snapshot_at_capacity_is_accepted() {
        let mut session = session();
        let states: Vec<EntityState> = (1..=MAX_SNAPSHOT_ENTITIES as u16)
            .map(|n| entity_state(n, f32::from(n)))
            .collect();
        let bytes = keyframe_message(1, &states);
        let mut reader = MsgReader::new(&bytes);

        assert_eq!(session.parse_frame(&mut reader).unwrap(), FrameStatus::Valid);
        assert_eq!(session.snapshot().num_entities as usize, MAX_SNAPSHOT_ENTITIES);
    }

    #[test]
    fn baseline_seeds_entering_entity() {
        let mut session = session();
        write_baseline(&mut session, 7, 160.0);

        // Keyframe without 7, then a delta frame introducing 7 with only a
        // skin change; everything else must come from the baseline.
        let bytes = keyframe_message(1, &[entity_state(3, 24.0)]);
        let mut reader = MsgReader::new(&bytes);
        session.parse_frame(&mut reader).unwrap();

        let mut writer = MsgWriter::new();
        let header = FrameHeader {
            server_frame: 2,
            delta_frame: 1,
            suppress_count: 0,
            area_len: 0,
            area_bits: [0u8; wire::MAX_AREA_BYTES],
        };
        write_frame_header(&mut writer, &header);
        encode_player_state(&mut writer, &PlayerState::default(), &PlayerState::default());
        let mut entering = entity_state(7, 160.0);
        entering.skin = 2;
        encode_entity_delta(&mut writer, &entity_state(7, 160.0), &entering, true);
        write_entity_header(&mut writer, EntityBits::empty(), 0);
        let bytes = writer.finish();

        let mut reader = MsgReader::new(&bytes);
        assert_eq!(session.parse_frame(&mut reader).unwrap(), FrameStatus::Valid);

        let states: Vec<EntityState> = session
            .snapshot_entities(session.snapshot())
            .collect();
        assert_eq!(states.len(), 2);
        assert_eq!(states[0].number, 3);
        assert_eq!(states[1].number, 7);
        assert_eq!(states[1].origin[0], 160.0);
        assert_eq!(states[1].skin, 2);
    }
}
