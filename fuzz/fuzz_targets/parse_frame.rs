#![no_main]

use codec::ClientSession;
use libfuzzer_sys::fuzz_target;
use msg::MsgReader;

fuzz_target!(|data: &[u8]| {
    let mut session = ClientSession::new();
    session.set_server_rate(20);

    // Use input bytes to frame a stream of baseline and frame messages.
    let mut idx = 0usize;
    while idx + 1 < data.len() && idx < 4096 {
        let kind = data[idx];
        let len = (data[idx + 1] as usize % 200).saturating_add(1);
        idx += 2;
        let end = (idx + len).min(data.len());
        let chunk = &data[idx..end];
        idx = end;

        let mut reader = MsgReader::new(chunk);
        if kind % 4 == 0 {
            let _ = session.parse_baseline(&mut reader);
        } else {
            let _ = session.parse_frame(&mut reader);
        }
    }

    // A session with no configured rate must refuse frames without reading.
    let mut cold = ClientSession::new();
    let _ = cold.parse_frame(&mut MsgReader::new(data));
});
