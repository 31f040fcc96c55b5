use std::collections::BTreeSet;

use gstbill::core::*;
use gstbill::issuer::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), BillingError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let issuer = InvoiceNumberIssuer::new(InMemoryCounterStore::new());
    let hotel = HotelId::new("lakeview-blr");
    issuer.register_hotel(&hotel, HotelNumberingState::default())?;

    let issued: Vec<(InvoiceNumber, u32)> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..50)
            .map(|_| {
                s.spawn(|| {
                    let mut retries = 0;
                    loop {
                        match issuer.issue_next(&hotel) {
                            Ok(number) => return Ok((number, retries)),
                            Err(e) if e.is_retryable() => retries += 1,
                            Err(e) => return Err(e),
                        }
                    }
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("issuing thread panicked"))
            .collect::<Result<_, BillingError>>()
    })?;

    let unique: BTreeSet<String> = issued.iter().map(|(n, _)| n.to_string()).collect();
    let retries: u32 = issued.iter().map(|(_, r)| r).sum();
    println!(
        "issued {} numbers, {} unique, {} conflicts retried",
        issued.len(),
        unique.len(),
        retries
    );
    if let (Some(first), Some(last)) = (unique.first(), unique.last()) {
        println!("range: {first} .. {last}");
    }
    Ok(())
}
