use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use super::domain::{KycLevel, MerchantCategory, MerchantId, MerchantSnapshot};

#[derive(Debug, thiserror::Error)]
pub enum MerchantFixtureError {
    #[error("failed to read merchant fixtures: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid merchant CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid merchant row on line {line}: {message}")]
    InvalidRow { line: usize, message: String },
}

/// Loads merchant snapshots from a CSV export with a header row.
pub struct MerchantFixtureImporter;

impl MerchantFixtureImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<MerchantSnapshot>, MerchantFixtureError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<MerchantSnapshot>, MerchantFixtureError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let now = Utc::now();
        let mut merchants = Vec::new();

        for (index, record) in csv_reader.deserialize::<MerchantRow>().enumerate() {
            let row = record?;
            // header occupies line 1
            let line = index + 2;
            let merchant = row
                .into_snapshot(now)
                .map_err(|message| MerchantFixtureError::InvalidRow { line, message })?;
            merchants.push(merchant);
        }

        Ok(merchants)
    }
}

#[derive(Debug, Deserialize)]
struct MerchantRow {
    merchant_id: String,
    merchant_name: String,
    industry: String,
    #[serde(default)]
    country: String,
    transaction_volume_30d: String,
    #[serde(default)]
    transaction_count_30d: u32,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    avg_ticket_size: Option<String>,
    #[serde(default)]
    chargeback_count_30d: u32,
    chargeback_rate: f64,
    refund_rate: f64,
    velocity_multiplier: f64,
    account_age_days: u32,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    account_created_at: Option<String>,
    kyc_verified: bool,
    #[serde(default)]
    kyc_level: String,
}

impl MerchantRow {
    fn into_snapshot(self, now: DateTime<Utc>) -> Result<MerchantSnapshot, String> {
        let id = MerchantId::parse(&self.merchant_id)
            .map_err(|_| format!("merchant_id `{}` is not a UUID", self.merchant_id))?;
        let transaction_volume_30d = parse_amount("transaction_volume_30d", &self.transaction_volume_30d)?;
        let avg_ticket_size = match self.avg_ticket_size.as_deref() {
            Some(raw) => parse_amount("avg_ticket_size", raw)?,
            None if self.transaction_count_30d > 0 => {
                (transaction_volume_30d / Decimal::from(self.transaction_count_30d)).round_dp(2)
            }
            None => Decimal::ZERO,
        };
        let account_created_at = match self.account_created_at.as_deref() {
            Some(raw) => parse_timestamp(raw)
                .ok_or_else(|| format!("account_created_at `{raw}` is not a date"))?,
            None => now - Duration::days(i64::from(self.account_age_days)),
        };

        Ok(MerchantSnapshot {
            id,
            merchant_name: self.merchant_name,
            industry: MerchantCategory::parse(&self.industry),
            country: self.country,
            transaction_volume_30d,
            transaction_count_30d: self.transaction_count_30d,
            avg_ticket_size,
            chargeback_count_30d: self.chargeback_count_30d,
            chargeback_rate: self.chargeback_rate,
            refund_rate: self.refund_rate,
            velocity_multiplier: self.velocity_multiplier,
            account_age_days: self.account_age_days,
            account_created_at,
            kyc_verified: self.kyc_verified,
            kyc_level: KycLevel::parse(&self.kyc_level),
        })
    }
}

fn parse_amount(column: &str, raw: &str) -> Result<Decimal, String> {
    Decimal::from_str(raw.trim()).map_err(|err| format!("{column} `{raw}`: {err}"))
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
