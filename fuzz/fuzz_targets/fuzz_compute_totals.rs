#![no_main]

use gstbill::core::*;
use libfuzzer_sys::fuzz_target;
use rust_decimal::Decimal;

fn decimal(bytes: &[u8]) -> Decimal {
    let mut buf = [0u8; 16];
    buf[..bytes.len()].copy_from_slice(bytes);
    // Flags: only the scale (0..=28) and the sign bit may be set.
    buf[0] = 0;
    buf[1] = 0;
    buf[2] %= 29;
    buf[3] &= 0x80;
    Decimal::deserialize(buf)
}

fuzz_target!(|data: &[u8]| {
    let items: Vec<LineItem> = data
        .chunks_exact(16 * 8 + 1)
        .map(|c| {
            let mut item = LineItemBuilder::new("fuzz", "0000")
                .room_rent(decimal(&c[0..16]))
                .additional_charges(decimal(&c[16..32]))
                .in_room_service(decimal(&c[32..48]))
                .service_charge(decimal(&c[48..64]))
                .transportation(decimal(&c[64..80]));
            // Low three bits pick which of combined / cgst / sgst are set.
            let mask = c[128];
            if mask & 1 != 0 {
                item = item.combined_rate(decimal(&c[80..96]));
            }
            if mask & 2 != 0 {
                item = item.cgst_rate(decimal(&c[96..112]));
            }
            if mask & 4 != 0 {
                item = item.sgst_rate(decimal(&c[112..128]));
            }
            item.build()
        })
        .collect();
    let place = if data.first().is_some_and(|b| b % 2 == 0) { "KA" } else { "MH" };

    // Must not panic — errors are fine, panics are bugs.
    if let Ok(totals) = compute_invoice_totals(&items, "KA", place) {
        assert_eq!(Some(totals.total_tax), totals.tax_details.total());
        assert_eq!(
            Some(totals.round_off),
            totals
                .total_before_round_off()
                .and_then(|before| totals.total_amount.checked_sub(before))
        );
        assert!(validate_totals(&items, SupplyKind::determine("KA", place), &totals).is_empty());
    }
});
