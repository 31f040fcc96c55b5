use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::error::ValidationError;
use super::types::*;

/// Re-check a (possibly persisted and re-loaded) invoice snapshot.
/// Returns all validation errors found (not just the first).
pub fn validate_invoice(invoice: &Invoice) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if invoice.hotel.name.trim().is_empty() {
        errors.push(ValidationError::new("hotel.name", "hotel name must not be empty"));
    }
    if invoice.customer.name.trim().is_empty() {
        errors.push(ValidationError::new(
            "customer.name",
            "customer name must not be empty",
        ));
    }
    if invoice.supply_state.trim().is_empty() || invoice.place_of_supply.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            "place_of_supply",
            "supply state and place of supply must both be present",
            "JURISDICTION",
        ));
    } else if SupplyKind::determine(&invoice.supply_state, &invoice.place_of_supply)
        != invoice.supply_kind
    {
        errors.push(ValidationError::with_rule(
            "supply_kind",
            format!(
                "supply kind {:?} does not match {} -> {}",
                invoice.supply_kind, invoice.supply_state, invoice.place_of_supply
            ),
            "JURISDICTION",
        ));
    }

    for (i, line) in invoice.lines.iter().enumerate() {
        validate_line(line, i, &mut errors);
    }

    errors.extend(validate_totals(
        &invoice.lines,
        invoice.supply_kind,
        &invoice.totals,
    ));

    errors
}

fn validate_line(line: &LineItem, index: usize, errors: &mut Vec<ValidationError>) {
    let prefix = format!("lines[{index}]");

    if line.name.trim().is_empty() {
        errors.push(ValidationError::new(
            format!("{prefix}.name"),
            "line item name must not be empty",
        ));
    }
    if line.quantity == 0 {
        errors.push(ValidationError::new(
            format!("{prefix}.quantity"),
            "quantity must be positive",
        ));
    }
    for (name, value) in line.amount_fields() {
        if value < Decimal::ZERO {
            errors.push(ValidationError::new(
                format!("{prefix}.{name}"),
                format!("amount {value} is negative"),
            ));
        }
    }
}

/// Check the arithmetic invariants of a set of totals against its lines.
pub fn validate_totals(
    lines: &[LineItem],
    supply_kind: SupplyKind,
    totals: &InvoiceTotals,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let tax = &totals.tax_details;

    let expected_subtotal = lines
        .iter()
        .try_fold(Decimal::ZERO, |acc, l| acc.checked_add(l.amount()?));
    match expected_subtotal {
        None => errors.push(ValidationError::with_rule(
            "lines",
            "sum of line amounts overflows",
            "SUBTOTAL-ADDITIVITY",
        )),
        Some(expected) if expected != totals.subtotal => {
            errors.push(ValidationError::with_rule(
                "totals.subtotal",
                format!(
                    "subtotal {} does not equal sum of line amounts {}",
                    totals.subtotal, expected
                ),
                "SUBTOTAL-ADDITIVITY",
            ))
        }
        Some(_) => {}
    }

    match tax.total() {
        None => errors.push(ValidationError::with_rule(
            "totals.tax_details",
            "sum of tax breakdown overflows",
            "TAX-CONSERVATION",
        )),
        Some(breakdown) if breakdown != totals.total_tax => {
            errors.push(ValidationError::with_rule(
                "totals.total_tax",
                format!(
                    "total tax {} does not equal sum of breakdown {}",
                    totals.total_tax, breakdown
                ),
                "TAX-CONSERVATION",
            ))
        }
        Some(_) => {}
    }

    let (wrong_regime, label) = match supply_kind {
        SupplyKind::InterState => (
            tax.cgst_total()
                .zip(tax.sgst_total())
                .and_then(|(c, s)| c.checked_add(s)),
            "CGST/SGST",
        ),
        SupplyKind::IntraState => (tax.igst_total(), "IGST"),
    };
    if wrong_regime != Some(Decimal::ZERO) {
        errors.push(ValidationError::with_rule(
            "totals.tax_details",
            format!("{label} must be zero for {supply_kind:?} supply"),
            "SINGLE-REGIME",
        ));
    }

    let fields = [
        ("room_rent_igst", tax.room_rent_igst),
        ("room_rent_cgst", tax.room_rent_cgst),
        ("room_rent_sgst", tax.room_rent_sgst),
        ("service_igst", tax.service_igst),
        ("service_cgst", tax.service_cgst),
        ("service_sgst", tax.service_sgst),
    ];
    for (name, value) in fields {
        if value < Decimal::ZERO {
            errors.push(ValidationError::new(
                format!("totals.tax_details.{name}"),
                format!("tax amount {value} is negative"),
            ));
        }
    }

    if totals.total_amount.fract() != Decimal::ZERO {
        errors.push(ValidationError::with_rule(
            "totals.total_amount",
            format!("total amount {} is not a whole unit", totals.total_amount),
            "ROUNDING",
        ));
    }
    if totals.round_off.abs() > dec!(0.5) {
        errors.push(ValidationError::with_rule(
            "totals.round_off",
            format!("round-off {} exceeds half a unit", totals.round_off),
            "ROUNDING",
        ));
    }
    let before = totals.total_before_round_off();
    let reconciled = before
        .and_then(|b| totals.total_amount.checked_sub(b))
        .is_some_and(|diff| diff == totals.round_off);
    if !reconciled {
        let before = before.map_or_else(|| "an overflowing sum".to_string(), |b| b.to_string());
        errors.push(ValidationError::with_rule(
            "totals.round_off",
            format!(
                "total amount {} minus {} does not equal round-off {}",
                totals.total_amount, before, totals.round_off
            ),
            "ROUNDING",
        ));
    }

    errors
}
