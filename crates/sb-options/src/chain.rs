//! Options chain: broker records normalized into contracts plus a dual lookup index.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

use sb_types::{ChainError, HistoricalQuote, RawQuote, SbResult, StockQuote};

use crate::config::NormalizerConfig;
use crate::contract::{
    calculate_mark, extrinsic_value, interest_equivalent, intrinsic_value, leverage_ratio,
    Contract, OptionKind,
};
use crate::greeks::Greeks;

/// Greeks sub-object of a broker record. Brokers omit it entirely for
/// illiquid contracts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawGreeks {
    pub delta: Option<f64>,
    pub gamma: Option<f64>,
    pub theta: Option<f64>,
    pub rho: Option<f64>,
    pub vega: Option<f64>,
    pub mid_iv: Option<f64>,
    pub smv_vol: Option<f64>,
}

/// One contract record exactly as the broker returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawContract {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub expiration_date: Option<String>,
    #[serde(default)]
    pub strike: Option<Decimal>,
    #[serde(default)]
    pub option_type: Option<String>,
    #[serde(default)]
    pub bid: Option<f64>,
    #[serde(default)]
    pub ask: Option<f64>,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub close: Option<f64>,
    #[serde(default)]
    pub change: Option<f64>,
    #[serde(default)]
    pub last: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub volume: Option<u64>,
    #[serde(default)]
    pub open_interest: Option<u64>,
    /// Epoch milliseconds of the last trade.
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub trade_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub greeks: Option<RawGreeks>,
}

/// Everything one broker fetch returns for a ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawChainPayload {
    pub quote: RawQuote,
    pub options: Vec<RawContract>,
    #[serde(default)]
    pub historical: Vec<HistoricalQuote>,
}

/// Call and put symbols filed under one expiration or one strike, in
/// ingestion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LookupEntry {
    pub call: Vec<String>,
    pub put: Vec<String>,
}

impl LookupEntry {
    pub fn list(&self, kind: OptionKind) -> &[String] {
        match kind {
            OptionKind::Call => &self.call,
            OptionKind::Put => &self.put,
        }
    }

    pub fn push(&mut self, kind: OptionKind, symbol: String) {
        match kind {
            OptionKind::Call => self.call.push(symbol),
            OptionKind::Put => self.put.push(symbol),
        }
    }

    pub fn len(&self) -> usize {
        self.call.len() + self.put.len()
    }

    pub fn is_empty(&self) -> bool {
        self.call.is_empty() && self.put.is_empty()
    }
}

/// Two parallel indexes over the same contract set.
///
/// Every indexed symbol sits in exactly one call or put list under exactly
/// one expiration and exactly one strike.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LookupTable {
    pub by_expiration: BTreeMap<NaiveDate, LookupEntry>,
    pub by_strike: BTreeMap<Decimal, LookupEntry>,
}

impl LookupTable {
    fn insert(&mut self, contract: &Contract) {
        self.by_expiration
            .entry(contract.expiration_day())
            .or_default()
            .push(contract.option_type, contract.symbol.clone());
        self.by_strike
            .entry(contract.strike)
            .or_default()
            .push(contract.option_type, contract.symbol.clone());
    }

    pub fn expiration(&self, date: NaiveDate) -> Option<&LookupEntry> {
        self.by_expiration.get(&date)
    }

    pub fn strike(&self, strike: Decimal) -> Option<&LookupEntry> {
        self.by_strike.get(&strike)
    }
}

/// A broker record left out of the chain, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRecord {
    /// Position of the record in the broker payload.
    pub index: usize,
    pub symbol: Option<String>,
    pub reason: ChainError,
}

/// Root aggregate produced by one fetch. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionsChain {
    pub lookup: LookupTable,
    pub contracts: HashMap<String, Contract>,
    pub quote: StockQuote,
    pub spot_price: f64,
    pub fetch_date: DateTime<Utc>,
    pub historical: Vec<HistoricalQuote>,
    #[serde(default)]
    pub rejected: Vec<RejectedRecord>,
}

/// Parse a broker expiration: plain `YYYY-MM-DD` lands on midnight UTC,
/// full RFC 3339 timestamps are taken as given.
pub fn parse_expiration(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Calendar date of a broker expiration in the broker's own offset.
/// `2026-03-20T20:00:00-08:00` is the 20th even though it is the 21st in UTC.
pub fn expiration_day(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

/// Build one contract from a broker record, deriving mark, intrinsic and
/// extrinsic value, leverage and interest equivalent against `spot`.
fn build_contract(
    raw: RawContract,
    index: usize,
    spot: f64,
    fetch_date: DateTime<Utc>,
) -> Result<Contract, ChainError> {
    let symbol = match raw.symbol {
        Some(symbol) if !symbol.trim().is_empty() => symbol,
        _ => return Err(ChainError::MissingSymbol { index }),
    };
    let option_type: OptionKind = raw
        .option_type
        .as_deref()
        .and_then(|value| value.parse().ok())
        .ok_or_else(|| ChainError::InvalidOptionType {
            symbol: symbol.clone(),
            value: raw.option_type.clone().unwrap_or_default(),
        })?;
    let expiration_date = raw.expiration_date.unwrap_or_default();
    let expiration =
        parse_expiration(&expiration_date).ok_or_else(|| ChainError::InvalidExpiration {
            symbol: symbol.clone(),
            value: expiration_date.clone(),
        })?;
    let strike = raw.strike.ok_or_else(|| ChainError::MissingStrike {
        symbol: symbol.clone(),
    })?;

    let raw_greeks = raw.greeks.unwrap_or_default();
    let greeks = Greeks {
        delta: raw_greeks.delta,
        gamma: raw_greeks.gamma,
        theta: raw_greeks.theta,
        vega: raw_greeks.vega,
        rho: raw_greeks.rho,
    };

    let mut contract = Contract {
        symbol,
        expiration_date_string: expiration_date,
        expiration,
        strike,
        option_type,
        bid: raw.bid,
        ask: raw.ask,
        open: raw.open,
        close: raw.close,
        change: raw.change,
        last: raw.last,
        high: raw.high,
        low: raw.low,
        volume: raw.volume,
        open_interest: raw.open_interest,
        trade_date: raw.trade_date,
        greeks,
        implied_volatility: raw_greeks.mid_iv,
        smooth_implied_volatility: raw_greeks.smv_vol,
        mark: None,
        intrinsic_value: None,
        extrinsic_value: None,
        leverage_ratio: None,
        interest_equivalent: None,
    };

    let mark = calculate_mark(contract.bid, contract.ask);
    let intrinsic = intrinsic_value(option_type, contract.strike_f64(), spot);
    let extrinsic = extrinsic_value(Some(intrinsic), mark);
    let leverage = leverage_ratio(greeks.delta, mark, spot);

    contract.mark = mark;
    contract.intrinsic_value = Some(intrinsic);
    contract.extrinsic_value = extrinsic;
    contract.leverage_ratio = leverage;
    contract.interest_equivalent =
        interest_equivalent(greeks.delta, expiration, fetch_date, leverage, extrinsic, spot);

    Ok(contract)
}

/// Normalize broker records into an [`OptionsChain`].
///
/// In lenient mode bad records are logged and listed in
/// [`OptionsChain::rejected`]; in strict mode the first one fails the chain.
/// The first record wins when two share a symbol.
pub fn normalize(
    raw: Vec<RawContract>,
    quote: StockQuote,
    fetch_date: DateTime<Utc>,
    historical: Vec<HistoricalQuote>,
    config: &NormalizerConfig,
) -> SbResult<OptionsChain> {
    let spot_price = quote.spot_price;
    let mut lookup = LookupTable::default();
    let mut contracts: HashMap<String, Contract> = HashMap::with_capacity(raw.len());
    let mut rejected = Vec::new();

    for (index, record) in raw.into_iter().enumerate() {
        let symbol = record.symbol.clone();
        let result = build_contract(record, index, spot_price, fetch_date).and_then(|contract| {
            if contracts.contains_key(&contract.symbol) {
                Err(ChainError::DuplicateSymbol {
                    symbol: contract.symbol,
                })
            } else {
                Ok(contract)
            }
        });

        match result {
            Ok(contract) => {
                lookup.insert(&contract);
                contracts.insert(contract.symbol.clone(), contract);
            }
            Err(reason) if config.strict => return Err(reason.into()),
            Err(reason) => {
                warn!("Rejecting contract record {}: {}", index, reason);
                rejected.push(RejectedRecord {
                    index,
                    symbol,
                    reason,
                });
            }
        }
    }

    info!(
        "Normalized {} contracts across {} expirations for {} ({} rejected)",
        contracts.len(),
        lookup.by_expiration.len(),
        quote.symbol,
        rejected.len()
    );

    Ok(OptionsChain {
        lookup,
        contracts,
        quote,
        spot_price,
        fetch_date,
        historical,
        rejected,
    })
}

impl OptionsChain {
    /// Normalize a full broker payload.
    pub fn from_payload(
        payload: RawChainPayload,
        fetch_date: DateTime<Utc>,
        config: &NormalizerConfig,
    ) -> SbResult<Self> {
        normalize(
            payload.options,
            payload.quote.into(),
            fetch_date,
            payload.historical,
            config,
        )
    }

    pub fn from_json(
        json: &str,
        fetch_date: DateTime<Utc>,
        config: &NormalizerConfig,
    ) -> SbResult<Self> {
        let payload: RawChainPayload = serde_json::from_str(json)?;
        Self::from_payload(payload, fetch_date, config)
    }

    pub fn contract(&self, symbol: &str) -> Option<&Contract> {
        self.contracts.get(symbol)
    }

    pub fn require_contract(&self, symbol: &str) -> Result<&Contract, ChainError> {
        self.contract(symbol)
            .ok_or_else(|| ChainError::ContractNotFound {
                symbol: symbol.to_string(),
            })
    }

    /// Resolve a lookup list to contracts, skipping symbols with no contract.
    pub fn resolve<'a>(&'a self, symbols: &'a [String]) -> impl Iterator<Item = &'a Contract> + 'a {
        symbols.iter().filter_map(move |symbol| {
            let contract = self.contract(symbol);
            if contract.is_none() {
                debug!("Skipping {}: not present in chain", symbol);
            }
            contract
        })
    }

    /// Contracts of one type expiring on `date`, in ingestion order.
    pub fn contracts_at(&self, date: NaiveDate, kind: OptionKind) -> Vec<&Contract> {
        self.lookup
            .expiration(date)
            .map(|entry| self.resolve(entry.list(kind)).collect())
            .unwrap_or_default()
    }

    pub fn expirations(&self) -> Vec<NaiveDate> {
        self.lookup.by_expiration.keys().copied().collect()
    }

    pub fn strikes(&self) -> Vec<Decimal> {
        self.lookup.by_strike.keys().copied().collect()
    }

    /// Strike closest to spot; the lower strike wins a tie.
    pub fn atm_strike(&self) -> Option<Decimal> {
        let spot = Decimal::from_f64_retain(self.spot_price)?;
        self.lookup
            .by_strike
            .keys()
            .min_by_key(|strike| (**strike - spot).abs())
            .copied()
    }

    /// Number of contracts in the chain.
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use sb_types::SbError;

    pub(crate) fn raw(symbol: &str, expiration: &str, strike: Decimal, option_type: &str) -> RawContract {
        RawContract {
            symbol: Some(symbol.to_string()),
            expiration_date: Some(expiration.to_string()),
            strike: Some(strike),
            option_type: Some(option_type.to_string()),
            bid: Some(1.0),
            ask: Some(1.2),
            open: None,
            close: None,
            change: None,
            last: None,
            high: None,
            low: None,
            volume: Some(10),
            open_interest: Some(100),
            trade_date: None,
            greeks: Some(RawGreeks {
                delta: Some(0.5),
                mid_iv: Some(0.3),
                ..RawGreeks::default()
            }),
        }
    }

    pub(crate) fn fetch_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 2, 15, 0, 0).unwrap()
    }

    fn quote() -> StockQuote {
        StockQuote::new("XYZ", "XYZ Corp", 100.0, 1.5)
    }

    fn sample_records() -> Vec<RawContract> {
        vec![
            raw("XYZ260116C95", "2026-01-16", dec!(95), "call"),
            raw("XYZ260116P95", "2026-01-16", dec!(95), "put"),
            raw("XYZ260116C100", "2026-01-16", dec!(100), "call"),
            raw("XYZ260116P100", "2026-01-16", dec!(100), "put"),
            raw("XYZ260220C100", "2026-02-20", dec!(100), "call"),
        ]
    }

    fn lenient() -> NormalizerConfig {
        NormalizerConfig::default()
    }

    #[test]
    fn test_normalize_builds_dual_index() {
        let chain = normalize(sample_records(), quote(), fetch_date(), vec![], &lenient()).unwrap();

        assert_eq!(chain.len(), 5);
        assert_eq!(chain.spot_price, 100.0);
        let jan = NaiveDate::from_ymd_opt(2026, 1, 16).unwrap();
        let entry = chain.lookup.expiration(jan).unwrap();
        assert_eq!(entry.call, vec!["XYZ260116C95", "XYZ260116C100"]);
        assert_eq!(entry.put, vec!["XYZ260116P95", "XYZ260116P100"]);

        let strike_100 = chain.lookup.strike(dec!(100)).unwrap();
        assert_eq!(strike_100.call, vec!["XYZ260116C100", "XYZ260220C100"]);
        assert_eq!(strike_100.put, vec!["XYZ260116P100"]);
        assert_eq!(chain.expirations().len(), 2);
        assert_eq!(chain.strikes(), vec![dec!(95), dec!(100)]);
    }

    #[test]
    fn test_every_symbol_indexed_once() {
        let chain = normalize(sample_records(), quote(), fetch_date(), vec![], &lenient()).unwrap();
        for symbol in chain.contracts.keys() {
            let by_exp: usize = chain
                .lookup
                .by_expiration
                .values()
                .map(|e| e.call.iter().chain(&e.put).filter(|s| *s == symbol).count())
                .sum();
            let by_strike: usize = chain
                .lookup
                .by_strike
                .values()
                .map(|e| e.call.iter().chain(&e.put).filter(|s| *s == symbol).count())
                .sum();
            assert_eq!((by_exp, by_strike), (1, 1), "{symbol}");
        }
    }

    #[test]
    fn test_derived_fields() {
        let chain = normalize(sample_records(), quote(), fetch_date(), vec![], &lenient()).unwrap();
        let c = chain.contract("XYZ260116C95").unwrap();
        assert_eq!(c.mark, Some(1.1));
        assert_eq!(c.intrinsic_value, Some(5.0));
        assert_eq!(c.extrinsic_value, Some(0.0));
        assert_eq!(c.implied_volatility, Some(0.3));
        assert_eq!(
            c.expiration,
            Utc.with_ymd_and_hms(2026, 1, 16, 0, 0, 0).unwrap()
        );
        let leverage = c.leverage_ratio.unwrap();
        assert!((leverage - (50.0 - 1.1) / 1.1).abs() < 1e-9);

        let p = chain.contract("XYZ260116P95").unwrap();
        assert_eq!(p.intrinsic_value, Some(0.0));
        assert_eq!(p.extrinsic_value, Some(1.1));
    }

    #[test]
    fn test_missing_greeks_and_quotes() {
        let mut record = raw("XYZ260116C105", "2026-01-16", dec!(105), "call");
        record.greeks = None;
        record.bid = None;
        record.ask = None;
        let chain = normalize(vec![record], quote(), fetch_date(), vec![], &lenient()).unwrap();
        let c = chain.contract("XYZ260116C105").unwrap();
        assert_eq!(c.mark, None);
        assert_eq!(c.extrinsic_value, None);
        assert_eq!(c.leverage_ratio, None);
        assert_eq!(c.interest_equivalent, None);
        assert_eq!(c.greeks, Greeks::default());
    }

    #[test]
    fn test_lenient_rejects_bad_records() {
        let mut records = sample_records();
        records.push(raw("XYZ260116C95", "2026-01-16", dec!(95), "call"));
        records.push(raw("XYZ260116X95", "2026-01-16", dec!(95), "straddle"));
        records.push(raw("XYZ260116C90", "next friday", dec!(90), "call"));
        let mut nameless = raw("", "2026-01-16", dec!(90), "put");
        nameless.symbol = None;
        records.push(nameless);

        let chain = normalize(records, quote(), fetch_date(), vec![], &lenient()).unwrap();
        assert_eq!(chain.len(), 5);
        let reasons: Vec<_> = chain.rejected.iter().map(|r| r.reason.clone()).collect();
        assert_eq!(
            reasons,
            vec![
                ChainError::DuplicateSymbol {
                    symbol: "XYZ260116C95".to_string()
                },
                ChainError::InvalidOptionType {
                    symbol: "XYZ260116X95".to_string(),
                    value: "straddle".to_string()
                },
                ChainError::InvalidExpiration {
                    symbol: "XYZ260116C90".to_string(),
                    value: "next friday".to_string()
                },
                ChainError::MissingSymbol { index: 8 },
            ]
        );
        assert_eq!(chain.rejected[0].index, 5);
        // first record with the symbol is kept
        let jan = NaiveDate::from_ymd_opt(2026, 1, 16).unwrap();
        assert_eq!(chain.lookup.expiration(jan).unwrap().call.len(), 2);
    }

    #[test]
    fn test_strict_fails_on_duplicate() {
        let mut records = sample_records();
        records.push(raw("XYZ260116P100", "2026-01-16", dec!(100), "put"));
        let strict = NormalizerConfig { strict: true };
        let err = normalize(records, quote(), fetch_date(), vec![], &strict).unwrap_err();
        assert!(matches!(
            err,
            SbError::Chain(ChainError::DuplicateSymbol { ref symbol }) if symbol == "XYZ260116P100"
        ));
    }

    #[test]
    fn test_parse_expiration_formats() {
        assert_eq!(
            parse_expiration("2026-03-20"),
            Some(Utc.with_ymd_and_hms(2026, 3, 20, 0, 0, 0).unwrap())
        );
        assert_eq!(
            parse_expiration("2026-03-20T16:00:00-04:00"),
            Some(Utc.with_ymd_and_hms(2026, 3, 20, 20, 0, 0).unwrap())
        );
        assert_eq!(parse_expiration("20/03/2026"), None);
    }

    #[test]
    fn test_require_contract() {
        let chain = normalize(sample_records(), quote(), fetch_date(), vec![], &lenient()).unwrap();
        assert!(chain.require_contract("XYZ260116C95").is_ok());
        assert_eq!(
            chain.require_contract("NOPE").unwrap_err(),
            ChainError::ContractNotFound {
                symbol: "NOPE".to_string()
            }
        );
    }

    #[test]
    fn test_atm_strike_and_contracts_at() {
        let chain = normalize(sample_records(), quote(), fetch_date(), vec![], &lenient()).unwrap();
        assert_eq!(chain.atm_strike(), Some(dec!(100)));
        let feb = NaiveDate::from_ymd_opt(2026, 2, 20).unwrap();
        assert_eq!(chain.contracts_at(feb, OptionKind::Call).len(), 1);
        assert!(chain.contracts_at(feb, OptionKind::Put).is_empty());
    }

    #[test]
    fn test_from_json_payload() {
        let json = r#"{
            "quote": {"symbol": "XYZ", "description": "XYZ Corp", "last": 100.0, "change": -0.5},
            "options": [
                {"symbol": "XYZ260116C100", "expiration_date": "2026-01-16", "strike": 100,
                 "option_type": "call", "bid": 2.0, "ask": 2.2, "volume": 5, "open_interest": 50,
                 "trade_date": 1767369600000,
                 "greeks": {"delta": 0.52, "mid_iv": 0.31, "smv_vol": 0.3}},
                {"symbol": "XYZ260116P100", "expiration_date": "2026-01-16", "strike": 100,
                 "option_type": "put", "bid": null, "ask": 1.9}
            ],
            "historical": [
                {"date": "2026-01-02", "open": 99.0, "close": 100.0, "high": 101.0, "low": 98.5, "volume": 1000}
            ]
        }"#;
        let chain = OptionsChain::from_json(json, fetch_date(), &lenient()).unwrap();
        assert_eq!(chain.quote.name, "XYZ Corp");
        assert_eq!(chain.historical.len(), 1);
        let call = chain.contract("XYZ260116C100").unwrap();
        assert_eq!(call.mark, Some(2.1));
        assert_eq!(call.smooth_implied_volatility, Some(0.3));
        assert_eq!(
            call.trade_date,
            Some(Utc.with_ymd_and_hms(2026, 1, 2, 16, 0, 0).unwrap())
        );
        let put = chain.contract("XYZ260116P100").unwrap();
        assert_eq!(put.mark, Some(1.9));
        assert_eq!(put.greeks.delta, None);
    }

    #[test]
    fn test_null_fields_reject_only_their_record() {
        let json = r#"{
            "quote": {"symbol": "XYZ", "description": "XYZ Corp", "last": 100.0, "change": 0.0},
            "options": [
                {"symbol": "XYZ260116C100", "expiration_date": "2026-01-16", "strike": 100,
                 "option_type": "call", "bid": 2.0, "ask": 2.2},
                {"symbol": "XYZ260116P100", "expiration_date": "2026-01-16", "strike": 100,
                 "option_type": null, "bid": 1.0, "ask": 1.2},
                {"symbol": "XYZ260116P105", "expiration_date": null, "strike": 105,
                 "option_type": "put"},
                {"symbol": "XYZ260116P110", "expiration_date": "2026-01-16",
                 "option_type": "put"}
            ]
        }"#;
        let chain = OptionsChain::from_json(json, fetch_date(), &lenient()).unwrap();
        assert_eq!(chain.len(), 1);
        assert!(chain.contract("XYZ260116C100").is_some());

        let reasons: Vec<&ChainError> = chain.rejected.iter().map(|r| &r.reason).collect();
        assert_eq!(
            reasons,
            vec![
                &ChainError::InvalidOptionType {
                    symbol: "XYZ260116P100".to_string(),
                    value: String::new(),
                },
                &ChainError::InvalidExpiration {
                    symbol: "XYZ260116P105".to_string(),
                    value: String::new(),
                },
                &ChainError::MissingStrike {
                    symbol: "XYZ260116P110".to_string(),
                },
            ]
        );

        let strict = NormalizerConfig { strict: true };
        let err = OptionsChain::from_json(json, fetch_date(), &strict).unwrap_err();
        assert!(matches!(err, SbError::Chain(ChainError::InvalidOptionType { .. })));
    }

    #[test]
    fn test_offset_expiration_keeps_broker_date() {
        let records = vec![raw("XYZ260320C100", "2026-03-20T20:00:00-08:00", dec!(100), "call")];
        let chain = normalize(records, quote(), fetch_date(), vec![], &lenient()).unwrap();

        let listed = NaiveDate::from_ymd_opt(2026, 3, 20).unwrap();
        assert_eq!(chain.expirations(), vec![listed]);
        assert_eq!(chain.contracts_at(listed, OptionKind::Call).len(), 1);
        let contract = chain.contract("XYZ260320C100").unwrap();
        assert_eq!(contract.expiration, Utc.with_ymd_and_hms(2026, 3, 21, 4, 0, 0).unwrap());
        assert_eq!(contract.expiration_day(), listed);
        assert_eq!(expiration_day("2026-03-20"), Some(listed));
        assert_eq!(expiration_day("next friday"), None);
    }
}
