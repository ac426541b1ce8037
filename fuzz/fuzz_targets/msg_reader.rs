#![no_main]

use libfuzzer_sys::fuzz_target;
use msg::MsgReader;

fuzz_target!(|data: &[u8]| {
    let mut reader = MsgReader::new(data);
    let mut idx = 0usize;

    // Use input bytes to drive a bounded sequence of operations.
    while idx < data.len() && idx < 1024 {
        let op = data[idx] % 8;
        idx += 1;

        match op {
            0 => {
                let _ = reader.read_u8();
            }
            1 => {
                let _ = reader.read_i16();
            }
            2 => {
                let _ = reader.read_i32();
            }
            3 => {
                let _ = reader.read_coord();
            }
            4 => {
                let _ = reader.read_pos();
            }
            5 => {
                let _ = reader.read_angle();
            }
            6 => {
                let _ = reader.read_angle16();
            }
            _ => {
                let len = usize::from(data[idx.saturating_sub(1)]) % 64;
                let _ = reader.read_data(len);
            }
        }
    }

    assert!(reader.position() <= data.len());
});
