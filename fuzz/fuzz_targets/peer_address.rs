#![no_main]

use libfuzzer_sys::fuzz_target;

use rostopo_core::{split_host_port, url_to_address};

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };

    // anything the resolver accepts must split back into host and port
    if let Ok(address) = url_to_address(raw) {
        assert!(split_host_port(&address).is_ok(), "{raw:?} -> {address:?}");
    }
});
