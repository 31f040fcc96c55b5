use chrono::NaiveDate;
use gstbill::core::*;
use gstbill::issuer::*;
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), BillingError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
        .init();

    let desk = InvoiceDesk::new(InMemoryCounterStore::new(), EngineConfig::default())?;

    let hotel = HotelBuilder::new("lakeview-blr", "Lake View Residency", "KA")
        .gstin("29ABCDE1234F1Z5")
        .address("12 MG Road, Bengaluru 560001")
        .build();
    desk.register_hotel(&hotel)?;

    let lines = vec![
        LineItemBuilder::new("Deluxe Room (2 nights)", "996311")
            .quantity(2)
            .room_rent(dec!(7000))
            .additional_charges(dec!(500))
            .combined_rate(dec!(12))
            .build(),
        LineItemBuilder::new("Room service", "996331")
            .in_room_service(dec!(1240.50))
            .service_charge(dec!(124.05))
            .combined_rate(dec!(5))
            .build(),
        LineItemBuilder::new("Airport transfer", "996412")
            .transportation(dec!(1500))
            .build(),
    ];

    for (guest, state) in [("Asha Rao", "KA"), ("Vikram Shah", "MH")] {
        let invoice = desk.create_invoice(InvoiceRequest {
            hotel: hotel.clone(),
            customer: CustomerBuilder::new(guest).state_code(state).build(),
            place_of_supply: None,
            lines: lines.clone(),
            issue_date: NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date"),
            notes: vec!["Thank you for staying with us".into()],
        })?;

        let t = &invoice.totals;
        println!("Invoice {} ({:?})", invoice.number, invoice.supply_kind);
        println!("  Subtotal:     {:>10}", t.subtotal);
        println!("  CGST:         {:>10}", t.tax_details.cgst_total().unwrap_or_default());
        println!("  SGST:         {:>10}", t.tax_details.sgst_total().unwrap_or_default());
        println!("  IGST:         {:>10}", t.tax_details.igst_total().unwrap_or_default());
        println!("  Round-off:    {:>10}", t.round_off);
        println!("  Total:        {:>10}", t.total_amount);
    }

    Ok(())
}
