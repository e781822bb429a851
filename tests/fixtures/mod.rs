use chrono::{NaiveDate, NaiveTime};
use orderflow::{Price, Side, Tick};

/// Tick on 2024-06-`day`, `secs` seconds after the 09:30 open
pub fn create_tick(day: u32, secs: u32, price: i64, volume: u64, side: Side) -> Tick {
    Tick::new(
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
        NaiveTime::from_num_seconds_from_midnight_opt(34_200 + secs, 0).unwrap(),
        Price::from_ticks(price),
        volume,
        side,
    )
}

/// Deterministic multi-day session with both sides and repeated price levels
pub fn create_sample_session(days: u32, ticks_per_day: u32) -> Vec<Tick> {
    let mut ticks = Vec::with_capacity((days * ticks_per_day) as usize);
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;

    for day in 1..=days {
        for i in 0..ticks_per_day {
            // xorshift keeps the fixture reproducible without extra dependencies
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;

            let price = 18_000 + (state % 21) as i64;
            let volume = (state >> 8) % 40;
            let side = if (state >> 16) % 2 == 0 { Side::Bid } else { Side::Ask };
            ticks.push(create_tick(day, i / 3, price, volume, side));
        }
    }

    ticks
}
