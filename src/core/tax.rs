//! GST computation: subtotal, CGST/SGST or IGST per category group, round-off.
//!
//! The engine is a pure function of its input. All items are validated
//! before anything is accumulated, so an error never comes with partial totals.

use rust_decimal::Decimal;
use tracing::debug;

use super::config::EngineConfig;
use super::error::BillingError;
use super::types::{InvoiceTotals, LineItem, SupplyKind, TaxBreakdown, TaxRates};

/// Rates of one line after defaults are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveRates {
    pub combined: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
}

/// Configured tax calculator. Cheap to clone and safe to share between threads.
#[derive(Debug, Clone, Default)]
pub struct TaxEngine {
    config: EngineConfig,
}

impl TaxEngine {
    pub fn new(config: EngineConfig) -> Result<Self, BillingError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolve a line's rates against the configured defaults.
    ///
    /// When only the combined rate is given, it is split evenly. When only
    /// both halves are given, the combined rate is their sum. The halves must
    /// always add up to the combined rate.
    pub fn resolve_rates(&self, rates: &TaxRates) -> Result<EffectiveRates, BillingError> {
        self.resolve_rates_for(rates, "rates")
    }

    fn resolve_rates_for(&self, rates: &TaxRates, path: &str) -> Result<EffectiveRates, BillingError> {
        let cfg = &self.config;
        let given = [("combined", rates.combined), ("cgst", rates.cgst), ("sgst", rates.sgst)];
        for (name, rate) in given {
            if let Some(rate) = rate {
                self.check_rate(rate, path, name)?;
            }
        }

        let (combined, cgst, sgst) = match (rates.combined, rates.cgst, rates.sgst) {
            (Some(c), None, None) => (c, c / Decimal::TWO, c / Decimal::TWO),
            (None, Some(cg), Some(sg)) => {
                let combined = cg.checked_add(sg).ok_or_else(|| {
                    BillingError::rate(format!("{path}.combined"), "cgst + sgst overflows")
                })?;
                self.check_rate(combined, path, "combined")?;
                (combined, cg, sg)
            }
            (c, cg, sg) => (
                c.unwrap_or(cfg.default_combined_rate),
                cg.unwrap_or(cfg.default_cgst_rate),
                sg.unwrap_or(cfg.default_sgst_rate),
            ),
        };

        if cgst.checked_add(sgst) != Some(combined) {
            return Err(BillingError::rate(
                format!("{path}.cgst"),
                format!("cgst {cgst}% + sgst {sgst}% does not equal combined rate {combined}%"),
            ));
        }

        Ok(EffectiveRates {
            combined,
            cgst,
            sgst,
        })
    }

    fn check_rate(&self, rate: Decimal, path: &str, name: &str) -> Result<(), BillingError> {
        if rate < Decimal::ZERO {
            return Err(BillingError::rate(
                format!("{path}.{name}"),
                format!("{rate}% is negative"),
            ));
        }
        if rate > self.config.max_rate {
            return Err(BillingError::rate(
                format!("{path}.{name}"),
                format!("{rate}% exceeds the maximum of {}%", self.config.max_rate),
            ));
        }
        Ok(())
    }

    /// Compute the totals of an invoice.
    ///
    /// `supply_state` is the hotel's jurisdiction, `place_of_supply` the
    /// customer's. They are compared exactly; an empty list of items yields
    /// zero totals.
    pub fn compute(
        &self,
        items: &[LineItem],
        supply_state: &str,
        place_of_supply: &str,
    ) -> Result<InvoiceTotals, BillingError> {
        if supply_state.trim().is_empty() {
            return Err(BillingError::MalformedJurisdiction(
                "supply state must not be empty".into(),
            ));
        }
        if place_of_supply.trim().is_empty() {
            return Err(BillingError::MalformedJurisdiction(
                "place of supply must not be empty".into(),
            ));
        }
        let kind = SupplyKind::determine(supply_state, place_of_supply);

        let mut resolved = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            check_item(item, i)?;
            resolved.push(self.resolve_rates_for(&item.rates, &format!("items[{i}].rates"))?);
        }

        let mut subtotal = Decimal::ZERO;
        let mut tax = TaxBreakdown::default();
        for (i, (item, rates)) in items.iter().zip(&resolved).enumerate() {
            let overflow = || BillingError::amount(format!("items[{i}]"), "amount overflows");
            let room_rent_group = item.room_rent_group().ok_or_else(overflow)?;
            let service_group = item.service_group().ok_or_else(overflow)?;
            subtotal = item
                .amount()
                .and_then(|amount| subtotal.checked_add(amount))
                .ok_or_else(overflow)?;

            match kind {
                SupplyKind::InterState => {
                    tax.room_rent_igst = add_share(tax.room_rent_igst, room_rent_group, rates.combined, i)?;
                    tax.service_igst = add_share(tax.service_igst, service_group, rates.combined, i)?;
                }
                SupplyKind::IntraState => {
                    tax.room_rent_cgst = add_share(tax.room_rent_cgst, room_rent_group, rates.cgst, i)?;
                    tax.room_rent_sgst = add_share(tax.room_rent_sgst, room_rent_group, rates.sgst, i)?;
                    tax.service_cgst = add_share(tax.service_cgst, service_group, rates.cgst, i)?;
                    tax.service_sgst = add_share(tax.service_sgst, service_group, rates.sgst, i)?;
                }
            }
        }

        let total_tax = tax
            .total()
            .ok_or_else(|| BillingError::amount("total_tax", "tax total overflows"))?;
        let total_before_round_off = subtotal
            .checked_add(total_tax)
            .ok_or_else(|| BillingError::amount("total", "grand total overflows"))?;
        let total_amount = self.config.rounding.round_unit(total_before_round_off);
        let round_off = total_amount
            .checked_sub(total_before_round_off)
            .ok_or_else(|| BillingError::amount("total", "round-off overflows"))?;

        debug!(
            supply_kind = ?kind,
            items = items.len(),
            %subtotal,
            %total_tax,
            %total_amount,
            "computed invoice totals"
        );

        Ok(InvoiceTotals {
            subtotal,
            tax_details: tax,
            total_tax,
            round_off,
            total_amount,
        })
    }
}

/// Compute totals with the default configuration (18% / 9% + 9%, half-up rounding).
pub fn compute_invoice_totals(
    items: &[LineItem],
    supply_state: &str,
    place_of_supply: &str,
) -> Result<InvoiceTotals, BillingError> {
    TaxEngine::default().compute(items, supply_state, place_of_supply)
}

fn check_item(item: &LineItem, index: usize) -> Result<(), BillingError> {
    for (name, value) in item.amount_fields() {
        if value < Decimal::ZERO {
            return Err(BillingError::amount(
                format!("items[{index}].{name}"),
                format!("{value} is negative"),
            ));
        }
    }
    if item.quantity == 0 {
        return Err(BillingError::amount(
            format!("items[{index}].quantity"),
            "quantity must be positive",
        ));
    }
    Ok(())
}

/// `acc + base * rate / 100`
fn add_share(acc: Decimal, base: Decimal, rate: Decimal, index: usize) -> Result<Decimal, BillingError> {
    base.checked_mul(rate)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
        .and_then(|v| acc.checked_add(v))
        .ok_or_else(|| BillingError::amount(format!("items[{index}]"), "tax amount overflows"))
}
