use msg::{MsgReader, MsgWriter, ANGLE16_UNIT, ANGLE_UNIT, COORD_UNIT};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    U8(u8),
    I16(i16),
    I32(i32),
    Coord(i16),
    Angle(u8),
    Angle16(i16),
    Data(Vec<u8>),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<u8>().prop_map(Op::U8),
        any::<i16>().prop_map(Op::I16),
        any::<i32>().prop_map(Op::I32),
        any::<i16>().prop_map(Op::Coord),
        any::<u8>().prop_map(Op::Angle),
        any::<i16>().prop_map(Op::Angle16),
        prop::collection::vec(any::<u8>(), 0..32).prop_map(Op::Data),
    ]
}

proptest! {
    // Values are generated on the wire grid (raw integer steps), so the
    // fixed-point conversions must survive a write/read cycle exactly.
    #[test]
    fn prop_roundtrip_ops(ops in prop::collection::vec(op_strategy(), 1..64)) {
        let mut writer = MsgWriter::new();

        for op in &ops {
            match op {
                Op::U8(v) => writer.write_u8(*v),
                Op::I16(v) => writer.write_i16(*v),
                Op::I32(v) => writer.write_i32(*v),
                Op::Coord(raw) => writer.write_coord(f32::from(*raw) * COORD_UNIT),
                Op::Angle(raw) => writer.write_angle(f32::from(*raw) * ANGLE_UNIT),
                Op::Angle16(raw) => writer.write_angle16(f32::from(*raw) * ANGLE16_UNIT),
                Op::Data(data) => writer.write_data(data),
            }
        }

        let bytes = writer.finish();
        let mut reader = MsgReader::new(&bytes);

        for op in &ops {
            match op {
                Op::U8(v) => prop_assert_eq!(reader.read_u8().unwrap(), *v),
                Op::I16(v) => prop_assert_eq!(reader.read_i16().unwrap(), *v),
                Op::I32(v) => prop_assert_eq!(reader.read_i32().unwrap(), *v),
                Op::Coord(raw) => {
                    prop_assert_eq!(reader.read_coord().unwrap(), f32::from(*raw) * COORD_UNIT);
                }
                Op::Angle(raw) => {
                    prop_assert_eq!(reader.read_angle().unwrap(), f32::from(*raw) * ANGLE_UNIT);
                }
                Op::Angle16(raw) => {
                    prop_assert_eq!(
                        reader.read_angle16().unwrap(),
                        f32::from(*raw) * ANGLE16_UNIT
                    );
                }
                Op::Data(data) => prop_assert_eq!(reader.read_data(data.len()).unwrap(), &data[..]),
            }
        }

        prop_assert!(reader.is_empty());
    }

    #[test]
    fn prop_truncated_reads_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..16)) {
        let mut reader = MsgReader::new(&bytes);
        // Run the cursor off the end; every failure must be a clean error.
        while reader.read_i32().is_ok() {}
        let _ = reader.read_i16();
        let _ = reader.read_u8();
        let _ = reader.read_data(usize::MAX);
    }
}
