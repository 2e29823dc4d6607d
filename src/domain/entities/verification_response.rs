use chrono::{DateTime, Utc};

/// Subscription status as computed by the verification server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResponse {
    pub is_subscribed: bool,
    /// End of the current subscription period, in seconds since the epoch.
    pub date_end: Option<i64>,
    /// The server's clock at the time of verification, in seconds since the
    /// epoch.
    pub server_date: Option<i64>,
}

impl VerificationResponse {
    /// End of the subscription period, or the epoch if the server did not
    /// send one.
    pub fn date(&self) -> DateTime<Utc> {
        epoch_seconds_or_zero(self.date_end)
    }

    /// Server time, or the epoch if the server did not send one.
    pub fn server(&self) -> DateTime<Utc> {
        epoch_seconds_or_zero(self.server_date)
    }
}

fn epoch_seconds_or_zero(seconds: Option<i64>) -> DateTime<Utc> {
    seconds
        .and_then(|s| DateTime::from_timestamp(s, 0))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_dates_resolve_to_epoch() {
        let r = VerificationResponse {
            is_subscribed: true,
            date_end: None,
            server_date: None,
        };
        assert_eq!(r.date().timestamp(), 0);
        assert_eq!(r.server().timestamp(), 0);
    }

    #[test]
    fn out_of_range_dates_resolve_to_epoch() {
        let r = VerificationResponse {
            is_subscribed: false,
            date_end: Some(i64::MAX),
            server_date: Some(1_700_000_500),
        };
        assert_eq!(r.date().timestamp(), 0);
        assert_eq!(r.server().timestamp(), 1_700_000_500);
    }
}
