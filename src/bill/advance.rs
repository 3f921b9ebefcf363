use super::types::Advance;
use crate::core::{Amount, CalcError};

/// Resolve an advance against the document's total with tax.
///
/// Percentage advances are taken from the total with tax and stored on the
/// advance. Fixed amounts are kept as given on the advance, like outlays.
/// Either way the returned amount is at currency precision. Advances never
/// depend on each other.
pub fn resolve_advance(
    advance: &mut Advance,
    total_with_tax: Amount,
    currency_scale: u32,
    path: &str,
) -> Result<Amount, CalcError> {
    match (advance.percent, advance.amount) {
        (Some(percent), _) => {
            let amount = percent
                .of_rounded(total_with_tax, currency_scale)
                .map_err(CalcError::precision(format!("{path}.amount")))?;
            advance.amount = Some(amount);
            Ok(amount)
        }
        (None, Some(amount)) => amount
            .rescale(currency_scale)
            .map_err(CalcError::precision(format!("{path}.amount"))),
        (None, None) => Err(CalcError::malformed(
            path,
            "advance requires either a percent or an amount",
        )),
    }
}
