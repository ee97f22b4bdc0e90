//! Account and credit grant models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Account row; `credits` is the spendable balance and never negative
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub credits: i64,
    pub subscription_tier: String,
    pub subscription_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sent by the auth layer the first time an identity is seen
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub id: Uuid,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(max = 120, message = "displayName is too long"))]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditGrantReason {
    TrialBonus,
    SubscriptionRenewal,
    ReferralBonus,
    CreditPack,
}

impl CreditGrantReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreditGrantReason::TrialBonus => "trial_bonus",
            CreditGrantReason::SubscriptionRenewal => "subscription_renewal",
            CreditGrantReason::ReferralBonus => "referral_bonus",
            CreditGrantReason::CreditPack => "credit_pack",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreditGrant {
    pub amount: i64,
    pub reason: CreditGrantReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_reason_wire_format() {
        let grant: CreditGrant =
            serde_json::from_str(r#"{"amount": 100, "reason": "subscription_renewal"}"#).unwrap();
        assert_eq!(grant.reason, CreditGrantReason::SubscriptionRenewal);
        assert_eq!(grant.reason.as_str(), "subscription_renewal");
    }

    #[test]
    fn test_unknown_grant_reason_rejected() {
        let result = serde_json::from_str::<CreditGrant>(r#"{"amount": 5, "reason": "gift"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_new_account_email_validation() {
        let account = NewAccount {
            id: Uuid::new_v4(),
            email: "not-an-email".to_string(),
            display_name: None,
        };
        assert!(account.validate().is_err());
    }
}
