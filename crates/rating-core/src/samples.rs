//! Sample instrument codes, one bucket per market and instrument class.

pub const SAMPLE_UNIVERSE: &[(&str, &[&str])] = &[
    ("US stocks", &["AAPL", "MSFT", "GOOGL", "AMZN", "NVDA", "META"]),
    (
        "India stocks",
        &["NSE:INFY", "NSE:TCS", "NSE:RELIANCE", "NSE:HDFCBANK", "NSE:ITC", "NSE:LTIM"],
    ),
    ("US ETFs", &["VOO", "VTI", "QQQ", "IWM"]),
    ("India ETFs", &["NSE:NIFTYBEES", "NSE:BANKBEES", "NSE:JUNIORBEES"]),
    ("US mutual funds", &["VFIAX", "FXAIX", "SWPPX"]),
    ("India mutual funds", &["INF109K01ZB3"]),
];
