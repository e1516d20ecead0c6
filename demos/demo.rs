//! Walk through the five query shapes against the live API.
//!
//! Run with `cargo run --example demo`.

use chrono::{NaiveDate, TimeZone, Utc};
use pvlive::{PesId, PvLive};

fn main() -> Result<(), pvlive::PvLiveError> {
    let client = PvLive::new();

    println!("Latest:");
    println!("{:?}", client.latest().call()?);

    let at = Utc.with_ymd_and_hms(2018, 6, 3, 12, 35, 0).unwrap();
    println!("\nAt 2018-06-03 12:35 (snaps to 13:00):");
    println!("{:?}", client.at().datetime(at).call()?);

    let start = Utc.with_ymd_and_hms(2018, 6, 3, 12, 20, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2018, 6, 3, 14, 0, 0).unwrap();
    let series = client
        .between()
        .start(start)
        .end(end)
        .extra_fields("ucl_mw,stats_error")
        .call()?;
    println!("\nBetween 12:20 and 14:00, as a dataframe:");
    println!("{}", series.to_data_frame()?);

    let day = NaiveDate::from_ymd_opt(2018, 6, 3).unwrap();
    println!("\nPeak on 2018-06-03:");
    println!("{:?}", client.day_peak().date(day).call()?);

    println!("\nCumulative generation on 2018-06-03:");
    println!("{:?} MWh", client.day_energy().date(day).call()?);

    let region = PesId::new(23)?;
    println!("\nLatest for PES region 23:");
    println!("{:?}", client.latest().pes_id(region).call()?);

    Ok(())
}
