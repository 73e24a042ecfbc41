//! Rental and purchase price computation
//!
//! Rentals are charged per started day: the span between start and end is
//! rounded up to whole days, then converted to units of the listing's
//! billing cadence (hours, days, weeks or 30-day months), rounding partial
//! weeks and months up. Purchases cost the listing's purchase price.

use chrono::{Duration, NaiveDateTime};
use rust_decimal::Decimal;

use super::error::PricingError;
use super::types::{BookingRequest, ListingPriceModel, PricingResult, RequestMode};

/// Stateless price calculator shared by the checkout flow
#[derive(Debug, Default, Clone, Copy)]
pub struct PricingEngine;

impl PricingEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn compute_price(
        &self,
        model: &ListingPriceModel,
        request: &BookingRequest,
    ) -> Result<PricingResult, PricingError> {
        compute_price(model, request)
    }
}

/// Price `request` against `model`.
///
/// Pure: reads no clock and touches no storage, so identical inputs always
/// produce identical results.
pub fn compute_price(
    model: &ListingPriceModel,
    request: &BookingRequest,
) -> Result<PricingResult, PricingError> {
    model.validate()?;

    if !model.transaction_mode.permits(request.mode) {
        return Err(PricingError::UnsupportedMode {
            requested: request.mode,
            allowed: model.transaction_mode,
        });
    }

    match request.mode {
        RequestMode::Rent => price_rental(model, request),
        RequestMode::Purchase => price_purchase(model),
    }
}

fn price_rental(
    model: &ListingPriceModel,
    request: &BookingRequest,
) -> Result<PricingResult, PricingError> {
    let (Some(start), Some(end)) = (request.start, request.end) else {
        return Err(PricingError::MissingDateRange);
    };
    if end <= start {
        return Err(PricingError::InvalidDateRange);
    }

    let elapsed_days = started_days(start, end);
    let billable_units = model.billing_cadence.units_for_days(elapsed_days);
    let total_price = model
        .unit_price
        .checked_mul(Decimal::from(billable_units))
        .ok_or(PricingError::PriceOverflow)?;

    Ok(PricingResult {
        total_price,
        billable_units: Some(billable_units),
        effective_duration_days: Some(elapsed_days),
    })
}

fn price_purchase(model: &ListingPriceModel) -> Result<PricingResult, PricingError> {
    let total_price = model
        .purchase_price
        .ok_or(PricingError::MissingPurchasePrice)?;

    Ok(PricingResult {
        total_price,
        billable_units: None,
        effective_duration_days: None,
    })
}

/// Whole days from `start` to `end`, counting a partial last day as one.
/// Requires `end > start`.
fn started_days(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    let span = end - start;
    let whole_days = span.num_days();
    if span > Duration::days(whole_days) {
        whole_days + 1
    } else {
        whole_days
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::types::{BillingCadence, TransactionMode};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rental_model(unit_price: Decimal, cadence: BillingCadence) -> ListingPriceModel {
        ListingPriceModel::new(unit_price, cadence, None, TransactionMode::RentOnly).unwrap()
    }

    fn span(days: u32) -> BookingRequest {
        let start = date(2024, 1, 1);
        BookingRequest::rent_dates(start, start + Duration::days(days as i64))
    }

    #[test]
    fn test_daily_rental() {
        let model = rental_model(dec!(100), BillingCadence::Daily);
        let request = BookingRequest::rent_dates(date(2024, 1, 1), date(2024, 1, 4));

        let result = compute_price(&model, &request).unwrap();

        assert_eq!(result.billable_units, Some(3));
        assert_eq!(result.effective_duration_days, Some(3));
        assert_eq!(result.total_price, dec!(300));
    }

    #[test]
    fn test_weekly_rounds_partial_week_up() {
        let model = rental_model(dec!(700), BillingCadence::Weekly);

        let result = compute_price(&model, &span(10)).unwrap();

        assert_eq!(result.billable_units, Some(2));
        assert_eq!(result.effective_duration_days, Some(10));
        assert_eq!(result.total_price, dec!(1400));
    }

    #[test]
    fn test_exact_week_is_one_unit() {
        let model = rental_model(dec!(700), BillingCadence::Weekly);

        let result = compute_price(&model, &span(7)).unwrap();

        assert_eq!(result.billable_units, Some(1));
        assert_eq!(result.total_price, dec!(700));
    }

    #[test]
    fn test_monthly_uses_thirty_day_months() {
        let model = rental_model(dec!(1000), BillingCadence::Monthly);

        let result = compute_price(&model, &span(31)).unwrap();
        assert_eq!(result.billable_units, Some(2));
        assert_eq!(result.total_price, dec!(2000));

        let result = compute_price(&model, &span(30)).unwrap();
        assert_eq!(result.billable_units, Some(1));
    }

    #[test]
    fn test_hourly_charges_full_days() {
        let model = rental_model(dec!(5), BillingCadence::Hourly);

        let result = compute_price(&model, &span(2)).unwrap();

        assert_eq!(result.billable_units, Some(48));
        assert_eq!(result.effective_duration_days, Some(2));
        assert_eq!(result.total_price, dec!(240));
    }

    #[test]
    fn test_partial_day_rounds_up() {
        let model = rental_model(dec!(40), BillingCadence::Daily);
        let start = date(2024, 3, 1).and_hms_opt(9, 0, 0).unwrap();
        let end = date(2024, 3, 3).and_hms_opt(10, 30, 0).unwrap();

        let result = compute_price(&model, &BookingRequest::rent(start, end)).unwrap();

        assert_eq!(result.effective_duration_days, Some(3));
        assert_eq!(result.total_price, dec!(120));
    }

    #[test]
    fn test_sub_day_rental_is_one_day() {
        let model = rental_model(dec!(3.5), BillingCadence::Hourly);
        let start = date(2024, 3, 1).and_hms_opt(9, 0, 0).unwrap();
        let end = date(2024, 3, 1).and_hms_opt(11, 0, 0).unwrap();

        let result = compute_price(&model, &BookingRequest::rent(start, end)).unwrap();

        assert_eq!(result.billable_units, Some(24));
        assert_eq!(result.total_price, dec!(84.0));
    }

    #[test]
    fn test_purchase_returns_purchase_price() {
        let model = ListingPriceModel::new(
            dec!(45),
            BillingCadence::Daily,
            Some(dec!(18999.99)),
            TransactionMode::RentOrPurchase,
        )
        .unwrap();

        let result = compute_price(&model, &BookingRequest::purchase()).unwrap();

        assert_eq!(result.total_price, dec!(18999.99));
        assert_eq!(result.billable_units, None);
        assert_eq!(result.effective_duration_days, None);
    }

    #[test]
    fn test_purchase_only_listing_with_zero_rent_price() {
        let model = ListingPriceModel::new(
            Decimal::ZERO,
            BillingCadence::Daily,
            Some(dec!(1200)),
            TransactionMode::PurchaseOnly,
        )
        .unwrap();

        let result = compute_price(&model, &BookingRequest::purchase()).unwrap();
        assert_eq!(result.total_price, dec!(1200));

        let err = compute_price(&model, &span(3)).unwrap_err();
        assert!(matches!(err, PricingError::UnsupportedMode { .. }));
    }

    #[test]
    fn test_backwards_range_rejected() {
        let model = rental_model(dec!(100), BillingCadence::Daily);
        let request = BookingRequest::rent_dates(date(2024, 2, 10), date(2024, 2, 5));

        let err = compute_price(&model, &request).unwrap_err();

        assert_eq!(err, PricingError::InvalidDateRange);
        assert_eq!(err.field(), "dates");
    }

    #[test]
    fn test_zero_length_range_rejected() {
        let model = rental_model(dec!(100), BillingCadence::Daily);
        let request = BookingRequest::rent_dates(date(2024, 2, 10), date(2024, 2, 10));

        assert_eq!(
            compute_price(&model, &request),
            Err(PricingError::InvalidDateRange)
        );
    }

    #[test]
    fn test_missing_dates_rejected() {
        let model = rental_model(dec!(100), BillingCadence::Daily);
        let request = BookingRequest {
            mode: RequestMode::Rent,
            start: Some(date(2024, 2, 1).and_hms_opt(0, 0, 0).unwrap()),
            end: None,
        };

        assert_eq!(
            compute_price(&model, &request),
            Err(PricingError::MissingDateRange)
        );
    }

    #[test]
    fn test_purchase_on_rent_only_listing_rejected() {
        let model = rental_model(dec!(100), BillingCadence::Daily);

        let err = compute_price(&model, &BookingRequest::purchase()).unwrap_err();

        assert_eq!(
            err,
            PricingError::UnsupportedMode {
                requested: RequestMode::Purchase,
                allowed: TransactionMode::RentOnly,
            }
        );
        assert_eq!(err.field(), "mode");
    }

    #[test]
    fn test_purchase_without_price_rejected() {
        let model = ListingPriceModel::new(
            dec!(10),
            BillingCadence::Daily,
            None,
            TransactionMode::RentOrPurchase,
        )
        .unwrap();

        assert_eq!(
            compute_price(&model, &BookingRequest::purchase()),
            Err(PricingError::MissingPurchasePrice)
        );
    }

    #[test]
    fn test_negative_prices_rejected() {
        let err = ListingPriceModel::new(
            dec!(-1),
            BillingCadence::Daily,
            None,
            TransactionMode::RentOnly,
        )
        .unwrap_err();
        assert_eq!(err, PricingError::NegativePrice);

        let model = ListingPriceModel {
            unit_price: dec!(10),
            billing_cadence: BillingCadence::Daily,
            purchase_price: Some(dec!(-5)),
            transaction_mode: TransactionMode::RentOrPurchase,
        };
        assert_eq!(
            compute_price(&model, &BookingRequest::purchase()),
            Err(PricingError::NegativePrice)
        );
    }

    #[test]
    fn test_overflow_reported() {
        let model = rental_model(Decimal::MAX, BillingCadence::Hourly);

        assert_eq!(
            compute_price(&model, &span(3)),
            Err(PricingError::PriceOverflow)
        );
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let engine = PricingEngine::new();
        let model = rental_model(dec!(19.99), BillingCadence::Weekly);
        let request = span(15);

        let first = engine.compute_price(&model, &request).unwrap();
        let second = engine.compute_price(&model, &request).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
