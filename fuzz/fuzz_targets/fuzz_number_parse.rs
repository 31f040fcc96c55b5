#![no_main]

use gstbill::core::InvoiceNumber;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(number) = InvoiceNumber::parse(s) {
            // Anything accepted must print back unchanged.
            assert_eq!(number.to_string(), s);
        }
    }
});
