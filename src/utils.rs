use chrono::{DateTime, Duration, Timelike, Utc};

/// Round a timestamp up to the nearest half-hour boundary.
///
/// PV_Live labels each half-hour interval by its end, so a caller-supplied
/// timestamp snaps to the smallest boundary (minute 0 or 30, zero seconds
/// and sub-seconds) at or after it. Timestamps already on a boundary are
/// returned unchanged.
pub fn nearest_half_hour(t: DateTime<Utc>) -> DateTime<Utc> {
    let excess = Duration::minutes(i64::from(t.minute() % 30))
        + Duration::seconds(i64::from(t.second()))
        + Duration::nanoseconds(i64::from(t.nanosecond()));
    if excess.is_zero() {
        t
    } else {
        t - excess + Duration::minutes(30)
    }
}

#[cfg(test)]
mod tests {
    use super::nearest_half_hour;
    use chrono::{DateTime, TimeZone, Utc};

    fn utc(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2018, 6, 3, h, m, s).unwrap()
    }

    #[test]
    fn rounds_up_to_next_boundary() {
        assert_eq!(nearest_half_hour(utc(12, 1, 0)), utc(12, 30, 0));
        assert_eq!(nearest_half_hour(utc(12, 31, 0)), utc(13, 0, 0));
        assert_eq!(nearest_half_hour(utc(12, 30, 5)), utc(13, 0, 0));
    }

    #[test]
    fn boundary_is_unchanged() {
        assert_eq!(nearest_half_hour(utc(12, 30, 0)), utc(12, 30, 0));
        assert_eq!(nearest_half_hour(utc(12, 0, 0)), utc(12, 0, 0));
    }

    #[test]
    fn idempotent() {
        for t in [utc(12, 1, 0), utc(12, 30, 0), utc(23, 59, 59)] {
            let once = nearest_half_hour(t);
            assert_eq!(nearest_half_hour(once), once);
        }
    }

    #[test]
    fn strips_sub_second_precision() {
        let t = utc(12, 0, 0) + chrono::Duration::nanoseconds(1);
        assert_eq!(nearest_half_hour(t), utc(12, 30, 0));
    }

    #[test]
    fn rolls_over_midnight() {
        let t = utc(23, 45, 0);
        let rounded = nearest_half_hour(t);
        assert_eq!(rounded, Utc.with_ymd_and_hms(2018, 6, 4, 0, 0, 0).unwrap());
    }
}
