use serde::Deserialize;

/// Subscription status returned by the verification server.
///
/// Unknown fields are ignored. `dateEnd` and `serverDate` may be omitted.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VerificationResponseModel {
    pub(crate) is_subscribed: bool,
    /// End of the subscription period, in seconds since the epoch.
    #[serde(default)]
    pub(crate) date_end: Option<i64>,
    /// Server time, in seconds since the epoch.
    #[serde(default)]
    pub(crate) server_date: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_dates_may_be_omitted() {
        let m: VerificationResponseModel = serde_json::from_str(r#"{"isSubscribed":true}"#).unwrap();
        assert!(m.is_subscribed);
        assert_eq!(m.date_end, None);
        assert_eq!(m.server_date, None);
    }

    #[test]
    fn parses_dates_and_ignores_unknown_fields() {
        let m: VerificationResponseModel = serde_json::from_str(
            r#"{"isSubscribed":false,"dateEnd":1700000000,"serverDate":1700000500,"plan":"pro"}"#,
        )
        .unwrap();
        assert!(!m.is_subscribed);
        assert_eq!(m.date_end, Some(1_700_000_000));
        assert_eq!(m.server_date, Some(1_700_000_500));
    }

    #[test]
    fn subscription_flag_is_required() {
        assert!(serde_json::from_str::<VerificationResponseModel>(r#"{"dateEnd":1}"#).is_err());
    }
}
