//! # Availability Module
//!
//! Decides whether a camera can be rented for a date range, and which
//! calendar days the date picker should grey out.
//!
//! ## Booking Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Camera Detail page                                                     │
//! │       │                                                                 │
//! │       │ BookingSource::bookings_for(camera_id)   (I/O, outside core)    │
//! │       ▼                                                                 │
//! │  compute_disabled_dates(&ranges) ──► date picker greys out days         │
//! │       │                                                                 │
//! │       │ user picks start/end                                            │
//! │       ▼                                                                 │
//! │  validate_candidate_range(start, end, &ranges)                          │
//! │       │                                                                 │
//! │       ├── InvalidRange ──► field-level message                          │
//! │       ├── Overlap      ──► "conflicts with booking from X to Y"         │
//! │       └── Ok(range)    ──► add to cart                                  │
//! │                                                                         │
//! │  Checkout re-fetches ranges and re-runs validate_candidate_range        │
//! │  right before the order is written.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Overlap Policy
//! Bookings are closed intervals of whole days. A booking that ends on
//! day X and one that starts on day X overlap: there is no same-day
//! handover, matching the inclusive-day pricing.
//!
//! The disabled-date set is UI guidance only. The authoritative check is
//! [`validate_candidate_range`].
//!
//! ## Known Gap
//! Nothing here is transactional. Two customers validating the same free
//! range at the same time will both pass; only a server-side reservation
//! could close that race.

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};
use tracing::warn;

use crate::error::AvailabilityError;
use crate::types::{BookingRange, DateRange};
use crate::AVAILABILITY_HORIZON_DAYS;

// =============================================================================
// Free Functions
// =============================================================================

/// Expands every booking into its days and unions them.
///
/// Ranges with a missing endpoint are skipped. A stored range whose end
/// precedes its start contributes nothing.
///
/// ```rust
/// use chrono::NaiveDate;
/// use lensrent_core::availability::compute_disabled_dates;
/// use lensrent_core::BookingRange;
///
/// let jul = |d| NaiveDate::from_ymd_opt(2024, 7, d).unwrap();
/// let ranges = vec![
///     BookingRange::new("b1", "cam1", jul(1), jul(3)),
///     BookingRange::new("b2", "cam1", jul(3), jul(4)),
/// ];
/// assert_eq!(compute_disabled_dates(&ranges).len(), 4);
/// ```
pub fn compute_disabled_dates(existing: &[BookingRange]) -> BTreeSet<NaiveDate> {
    let mut disabled = BTreeSet::new();

    for booking in existing {
        let Some((start, end)) = booking.endpoints() else {
            continue;
        };

        match DateRange::new(start, end) {
            Ok(range) => disabled.extend(range.iter_days()),
            Err(_) => {
                warn!(
                    booking_id = %booking.id,
                    resource_id = %booking.resource_id,
                    %start,
                    %end,
                    "Skipping stored booking with end before start"
                );
            }
        }
    }

    disabled
}

/// Closed-interval intersection test.
///
/// True iff `candidate_start <= existing_end && candidate_end >= existing_start`.
#[inline]
pub fn is_overlapping(
    candidate_start: NaiveDate,
    candidate_end: NaiveDate,
    existing_start: NaiveDate,
    existing_end: NaiveDate,
) -> bool {
    candidate_start <= existing_end && candidate_end >= existing_start
}

/// Returns the first booking (in caller order) that overlaps `range`.
///
/// Bookings with a missing endpoint cannot conflict and are passed over.
pub fn find_conflict<'a>(range: &DateRange, existing: &'a [BookingRange]) -> Option<&'a BookingRange> {
    existing.iter().find(|booking| {
        booking
            .endpoints()
            .is_some_and(|(start, end)| is_overlapping(range.start(), range.end(), start, end))
    })
}

/// Validates a candidate rental range against existing bookings.
///
/// ## Returns
/// - `Err(InvalidRange)` - a date is missing or `end < start`
/// - `Err(Overlap)` - the first conflicting booking, in caller order
/// - `Ok(range)` - the validated range, ready for the cart
///
/// The caller passes bookings already filtered to the resource; no
/// filtering happens here.
pub fn validate_candidate_range(
    candidate_start: Option<NaiveDate>,
    candidate_end: Option<NaiveDate>,
    existing: &[BookingRange],
) -> Result<DateRange, AvailabilityError> {
    let (start, end) = match (candidate_start, candidate_end) {
        (Some(start), Some(end)) => (start, end),
        (None, _) => return Err(AvailabilityError::invalid("start date is required")),
        (_, None) => return Err(AvailabilityError::invalid("end date is required")),
    };

    let range = DateRange::new(start, end)?;

    if let Some(conflicting) = find_conflict(&range, existing) {
        return Err(AvailabilityError::Overlap {
            conflicting: conflicting.clone(),
        });
    }

    Ok(range)
}

// =============================================================================
// Availability Checker
// =============================================================================

/// A resource's bookings, bundled for repeated queries from one screen.
///
/// ## Usage
/// ```rust
/// use chrono::NaiveDate;
/// use lensrent_core::{AvailabilityChecker, BookingRange};
///
/// let jul = |d| NaiveDate::from_ymd_opt(2024, 7, d).unwrap();
/// let checker = AvailabilityChecker::new(
///     "cam1",
///     vec![BookingRange::new("b1", "cam1", jul(1), jul(5))],
/// );
///
/// assert!(checker.validate(Some(jul(5)), Some(jul(8))).is_err());
/// assert!(checker.validate(Some(jul(6)), Some(jul(8))).is_ok());
/// assert_eq!(checker.first_available_from(jul(1), 2), Some(jul(6)));
/// ```
#[derive(Debug, Clone)]
pub struct AvailabilityChecker {
    resource_id: String,
    bookings: Vec<BookingRange>,
}

impl AvailabilityChecker {
    pub fn new(resource_id: impl Into<String>, bookings: Vec<BookingRange>) -> Self {
        AvailabilityChecker {
            resource_id: resource_id.into(),
            bookings,
        }
    }

    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    pub fn bookings(&self) -> &[BookingRange] {
        &self.bookings
    }

    /// Days the date picker should disable.
    pub fn disabled_dates(&self) -> BTreeSet<NaiveDate> {
        compute_disabled_dates(&self.bookings)
    }

    /// Whether `range` is free.
    pub fn is_available(&self, range: &DateRange) -> bool {
        find_conflict(range, &self.bookings).is_none()
    }

    /// See [`validate_candidate_range`].
    pub fn validate(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<DateRange, AvailabilityError> {
        validate_candidate_range(start, end, &self.bookings)
    }

    /// Earliest start on or after `from` for which a `days`-long rental fits.
    ///
    /// Searches [`AVAILABILITY_HORIZON_DAYS`] ahead; `None` when nothing
    /// fits or `days` is zero.
    pub fn first_available_from(&self, from: NaiveDate, days: u64) -> Option<NaiveDate> {
        if days == 0 {
            return None;
        }

        let first = DateRange::new(from, from.checked_add_days(Days::new(days - 1))?).ok()?;

        (0..=AVAILABILITY_HORIZON_DAYS as u64)
            .filter_map(|offset| first.shifted(offset))
            .find(|candidate| self.is_available(candidate))
            .map(|candidate| candidate.start())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn jul(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, day).unwrap()
    }

    fn booking(id: &str, start: u32, end: u32) -> BookingRange {
        BookingRange::new(id, "cam1", jul(start), jul(end))
    }

    #[test]
    fn test_disjoint_ranges_do_not_overlap() {
        assert!(!is_overlapping(jul(1), jul(3), jul(4), jul(6)));
        assert!(!is_overlapping(jul(4), jul(6), jul(1), jul(3)));
    }

    #[test]
    fn test_shared_day_overlaps() {
        // Boundary-adjacent: one ends the day the other starts
        assert!(is_overlapping(jul(5), jul(8), jul(1), jul(5)));
        assert!(is_overlapping(jul(1), jul(5), jul(5), jul(8)));
        // Containment both ways
        assert!(is_overlapping(jul(2), jul(3), jul(1), jul(10)));
        assert!(is_overlapping(jul(1), jul(10), jul(2), jul(3)));
    }

    #[test]
    fn test_range_overlaps_itself() {
        assert!(is_overlapping(jul(1), jul(1), jul(1), jul(1)));
        assert!(is_overlapping(jul(3), jul(9), jul(3), jul(9)));
    }

    #[test]
    fn test_disabled_dates_counts_each_day_once() {
        let disjoint = vec![booking("a", 1, 3), booking("b", 10, 11)];
        assert_eq!(compute_disabled_dates(&disjoint).len(), 5);

        let overlapping = vec![booking("a", 1, 5), booking("b", 3, 7), booking("c", 5, 5)];
        let disabled = compute_disabled_dates(&overlapping);
        assert_eq!(disabled.len(), 7);
        assert_eq!(disabled.first(), Some(&jul(1)));
        assert_eq!(disabled.last(), Some(&jul(7)));
    }

    #[test]
    fn test_disabled_dates_skips_incomplete_and_inverted() {
        let ranges = vec![
            BookingRange {
                id: "open".to_string(),
                resource_id: "cam1".to_string(),
                start_date: Some(jul(1)),
                end_date: None,
            },
            booking("inverted", 9, 7),
            booking("ok", 20, 21),
        ];
        let disabled = compute_disabled_dates(&ranges);
        assert_eq!(disabled.into_iter().collect::<Vec<_>>(), vec![jul(20), jul(21)]);
    }

    #[test]
    fn test_validate_rejects_end_before_start() {
        let err = validate_candidate_range(Some(jul(10)), Some(jul(5)), &[]).unwrap_err();
        assert!(matches!(err, AvailabilityError::InvalidRange { .. }));
    }

    #[test]
    fn test_validate_rejects_missing_dates() {
        assert!(matches!(
            validate_candidate_range(None, Some(jul(5)), &[]),
            Err(AvailabilityError::InvalidRange { .. })
        ));
        assert!(matches!(
            validate_candidate_range(Some(jul(5)), None, &[]),
            Err(AvailabilityError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_validate_boundary_scenario() {
        let existing = vec![booking("b1", 1, 5)];

        match validate_candidate_range(Some(jul(5)), Some(jul(8)), &existing) {
            Err(AvailabilityError::Overlap { conflicting }) => assert_eq!(conflicting.id, "b1"),
            other => panic!("expected overlap, got {:?}", other),
        }

        let range = validate_candidate_range(Some(jul(6)), Some(jul(8)), &existing).unwrap();
        assert_eq!(range.days(), 3);
    }

    #[test]
    fn test_validate_reports_first_conflict_in_caller_order() {
        let existing = vec![booking("late", 8, 9), booking("early", 1, 2)];
        match validate_candidate_range(Some(jul(1)), Some(jul(9)), &existing) {
            Err(AvailabilityError::Overlap { conflicting }) => assert_eq!(conflicting.id, "late"),
            other => panic!("expected overlap, got {:?}", other),
        }
    }

    #[test]
    fn test_incomplete_booking_never_conflicts() {
        let existing = vec![BookingRange {
            id: "open".to_string(),
            resource_id: "cam1".to_string(),
            start_date: None,
            end_date: Some(jul(5)),
        }];
        assert!(validate_candidate_range(Some(jul(1)), Some(jul(9)), &existing).is_ok());
    }

    #[test]
    fn test_first_available_from() {
        let checker = AvailabilityChecker::new("cam1", vec![booking("a", 1, 5), booking("b", 8, 9)]);

        // 2-day gap on the 6th-7th fits a 2-day rental
        assert_eq!(checker.first_available_from(jul(1), 2), Some(jul(6)));
        // but not a 3-day rental
        assert_eq!(checker.first_available_from(jul(1), 3), Some(jul(10)));
        // already free
        assert_eq!(checker.first_available_from(jul(20), 1), Some(jul(20)));
        assert_eq!(checker.first_available_from(jul(1), 0), None);
    }

    #[test]
    fn test_checker_matches_free_functions() {
        let checker = AvailabilityChecker::new("cam1", vec![booking("a", 1, 5)]);
        assert_eq!(checker.resource_id(), "cam1");
        assert_eq!(checker.disabled_dates().len(), 5);
        assert!(!checker.is_available(&DateRange::single(jul(5))));
        assert!(checker.is_available(&DateRange::single(jul(6))));
    }
}
