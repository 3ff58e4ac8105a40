//! Constant-product price and fill math.
//!
//! Pure functions over the virtual reserves `(x, y)` with `k = x * y`.
//! All arithmetic stays in `rust_decimal::Decimal`; nothing on this path
//! touches binary floating point.

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("invalid curve: virtual token reserve must be positive")]
    InvalidCurve,
    #[error("invalid input: amounts and reserves must be positive")]
    InvalidInput,
}

/// Instantaneous price in SOL per token: `y / x`.
///
/// # Errors
/// Returns [`PriceError::InvalidCurve`] when the token reserve is not positive.
pub fn spot_price(v_tokens: Decimal, v_sol: Decimal) -> Result<Decimal, PriceError> {
    if v_tokens <= Decimal::ZERO {
        return Err(PriceError::InvalidCurve);
    }
    Ok(v_sol / v_tokens)
}

/// Tokens received for `sol_in` SOL: `x - k / (y + sol_in)`, floored at zero.
///
/// # Errors
/// Returns [`PriceError::InvalidInput`] when any argument is not positive.
pub fn tokens_out(
    sol_in: Decimal,
    v_tokens: Decimal,
    v_sol: Decimal,
) -> Result<Decimal, PriceError> {
    if sol_in <= Decimal::ZERO || v_tokens <= Decimal::ZERO || v_sol <= Decimal::ZERO {
        return Err(PriceError::InvalidInput);
    }
    let k = v_tokens * v_sol;
    let out = v_tokens - k / (v_sol + sol_in);
    Ok(out.max(Decimal::ZERO))
}

/// SOL received for `tokens_in` tokens: `y - k / (x + tokens_in)`, floored at zero.
///
/// # Errors
/// Returns [`PriceError::InvalidInput`] when any argument is not positive.
pub fn sol_out(
    tokens_in: Decimal,
    v_tokens: Decimal,
    v_sol: Decimal,
) -> Result<Decimal, PriceError> {
    if tokens_in <= Decimal::ZERO || v_tokens <= Decimal::ZERO || v_sol <= Decimal::ZERO {
        return Err(PriceError::InvalidInput);
    }
    let k = v_tokens * v_sol;
    let out = v_sol - k / (v_tokens + tokens_in);
    Ok(out.max(Decimal::ZERO))
}
