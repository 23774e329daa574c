use std::env;
use std::fs;

use anyhow::{bail, Context};
use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sb_options::{
    aggregate_metrics, forecast_table, AnalyticsConfig, MetricKind, OptionStrategy, OptionsChain,
    StrategySummary,
};
use sb_types::{big_number, format_price, net_profit_percentage, percent_change, percentage};

/// `SYMBOL` or `SYMBOL:SIZE`, e.g. `XYZ260116C100:-2`.
fn parse_leg(arg: &str) -> anyhow::Result<(&str, i64)> {
    match arg.split_once(':') {
        Some((symbol, size)) => {
            let size = size
                .parse()
                .with_context(|| format!("invalid position size in leg {arg}"))?;
            Ok((symbol, size))
        }
        None => Ok((arg, 1)),
    }
}

fn load_config() -> anyhow::Result<AnalyticsConfig> {
    match env::var("STRIKEBOARD_CONFIG") {
        Ok(path) => {
            info!("Loading analytics config from {}", path);
            AnalyticsConfig::from_path(&path).with_context(|| format!("loading config {path}"))
        }
        Err(_) => Ok(AnalyticsConfig::default()),
    }
}

fn print_metrics(chain: &OptionsChain, config: &AnalyticsConfig) {
    let metrics = aggregate_metrics(chain, config.metrics.implied_move_multiplier);
    let spot = chain.spot_price;

    println!("{} ({}) spot {}", chain.quote.symbol, chain.quote.name, format_price(spot));
    println!(
        "{:<12} {:>10} {:>10} {:>12} {:>9} {:>10} {:>9}",
        "Expiration", "Low", "High", "Max Pain", "Move", "OI Value", "P/C OI"
    );
    for (date, m) in &metrics {
        let (low, high) = m.implied_range(spot);
        let pc_ratio = m
            .put_call_ratio(MetricKind::TotalOpenInterest)
            .map(|r| format!("{r:.2}"))
            .unwrap_or_else(|| "N/A".to_string());
        println!(
            "{:<12} {:>10} {:>10} {:>12} {:>9} {:>10} {:>9}",
            date.to_string(),
            format_price(low),
            format_price(high),
            format!(
                "{} {}",
                format_price(m.call.maximum_pain),
                percent_change(spot, m.call.maximum_pain)
            ),
            percentage(m.call.implied_move / spot),
            format!("${}", big_number(m.call.open_interest_value + m.put.open_interest_value)),
            pc_ratio,
        );
    }
}

fn print_strategy(
    chain: &OptionsChain,
    strategy: &OptionStrategy,
    config: &AnalyticsConfig,
) -> anyhow::Result<()> {
    let summary = StrategySummary::new(strategy);
    println!();
    println!("{}: {}", summary.name, strategy.leg_description());
    println!(
        "{}: {}",
        if summary.net_premium < 0.0 { "Net Credit" } else { "Net Debit" },
        format_price(summary.net_premium.abs())
    );
    println!(
        "Max gain {}  Max loss {}  Pot odds {}",
        if summary.max_gain.is_finite() { format_price(summary.max_gain) } else { "Unlimited".to_string() },
        if summary.undefined_risk { "Unlimited".to_string() } else { format_price(summary.max_loss) },
        summary.pot_odds.map(percentage).unwrap_or_else(|| "N/A".to_string())
    );
    let g = summary.greeks;
    println!(
        "Delta {:.2}  Gamma {:.2}  Theta {:.2}  Vega {:.2}  Rho {:.2}",
        g.delta, g.gamma, g.theta, g.vega, g.rho
    );

    let (date_step, spot_step) = config.forecast.resolve(chain.spot_price)?;
    let table = forecast_table(
        strategy,
        chain.spot_price,
        chain.fetch_date,
        date_step,
        spot_step,
        config.forecast.spot_interval_count,
    )?;

    print!("{:>10}", "Spot");
    for date in &table.dates {
        print!(" {:>18}", date.format("%Y-%m-%d").to_string());
    }
    println!();
    for spot in &table.spots {
        print!("{:>10}", format!("${spot}"));
        for date in &table.dates {
            let cell = table
                .value(*date, *spot)
                .map(|v| format!("{} {}", format_price(v), net_profit_percentage(summary.net_premium, v)))
                .unwrap_or_default();
            print!(" {:>18}", cell);
        }
        println!();
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let payload_path = match args.first() {
        Some(path) => path.clone(),
        None => match env::var("STRIKEBOARD_CHAIN_FILE") {
            Ok(path) => path,
            Err(_) => bail!("usage: strikeboard-report <chain.json> [SYMBOL[:SIZE] ...]"),
        },
    };

    let config = load_config()?;
    let json = fs::read_to_string(&payload_path)
        .with_context(|| format!("reading chain payload {payload_path}"))?;
    let chain = OptionsChain::from_json(&json, Utc::now(), &config.normalizer)?;
    for rejected in &chain.rejected {
        warn!("Record {} left out: {}", rejected.index, rejected.reason);
    }

    let mut strategy = OptionStrategy::for_chain(&chain);
    for arg in args.iter().skip(1) {
        let (symbol, size) = parse_leg(arg)?;
        strategy = strategy
            .with_chain_leg(&chain, symbol)?
            .with_leg_size(symbol, size)?;
    }

    if env::var("STRIKEBOARD_OUTPUT").as_deref() == Ok("json") {
        let metrics = aggregate_metrics(&chain, config.metrics.implied_move_multiplier);
        println!("{}", serde_json::to_string_pretty(&metrics)?);
        if !strategy.legs.is_empty() {
            println!("{}", serde_json::to_string_pretty(&StrategySummary::new(&strategy))?);
        }
        return Ok(());
    }

    print_metrics(&chain, &config);
    if !strategy.legs.is_empty() {
        print_strategy(&chain, &strategy, &config)?;
    }
    Ok(())
}
