#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Write;

use stereo_exp::container::read_container;
use stereo_exp::diagnostics::NullSink;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes as a container: reading must return an error, never panic.
    let Ok(mut file) = tempfile::NamedTempFile::new() else {
        return;
    };
    if file.write_all(data).is_err() {
        return;
    }
    let _ = read_container(file.path(), &NullSink);
});
